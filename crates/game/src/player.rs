//! Player controller: on-foot movement, head bob, and footsteps.

use audio::{Sfx, SoundOutput};
use engine_core::Tick;
use glam::{Vec2, Vec3};
use renderer::Camera;

/// Camera height when standing.
pub const EYE_HEIGHT: f32 = 1.6;
const BOB_FREQUENCY: f32 = 8.0;
const BOB_AMPLITUDE: f32 = 0.03;
const STEP_INTERVAL_MS: u64 = 400;

/// Player controller handling movement and camera.
#[derive(Debug, Clone, Default)]
pub struct Player {
    /// Units per second, measured from the last move. Used for lead prediction.
    pub velocity: Vec3,
    /// Seconds spent walking, drives the head bob.
    pub bob_time: f32,
    pub last_step: Option<u64>,
}

impl Player {
    /// Walk the camera on the ground plane. Returns `true` if the player moved.
    pub fn walk(&mut self, camera: &mut Camera, movement: Vec2, speed: f32, tick: &Tick, audio: &mut dyn SoundOutput) -> bool {
        let step = camera.process_movement(movement, speed, tick.dt);
        self.velocity = if tick.dt > 0.0 { step / tick.dt } else { Vec3::ZERO };

        if step == Vec3::ZERO {
            camera.transform.position.y = EYE_HEIGHT;
            return false;
        }

        self.bob_time += tick.dt;
        camera.transform.position.y = EYE_HEIGHT + (self.bob_time * BOB_FREQUENCY).cos() * BOB_AMPLITUDE;

        let due = self.last_step.map_or(true, |t| tick.since(t) >= STEP_INTERVAL_MS);
        if due {
            audio.play(Sfx::Walk);
            self.last_step = Some(tick.now_ms);
        }
        true
    }

    /// Put the player back on foot at `position` (eye height applied).
    pub fn place(&mut self, camera: &mut Camera, position: Vec3) {
        camera.transform.position = Vec3::new(position.x, EYE_HEIGHT, position.z);
        self.velocity = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audio::RecordingSound;

    fn tick(now_ms: u64) -> Tick {
        Tick {
            now_ms,
            dt: 0.1,
            frame: 0,
        }
    }

    #[test]
    fn walking_moves_and_tracks_velocity() {
        let mut player = Player::default();
        let mut camera = Camera::new(Vec3::new(0.0, EYE_HEIGHT, 0.0));
        let mut audio = RecordingSound::default();
        assert!(player.walk(&mut camera, Vec2::new(0.0, 1.0), 7.2, &tick(100), &mut audio));
        assert!((player.velocity.length() - 7.2).abs() < 1e-3);
        assert!(camera.position().z < 0.0, "forward is -Z");
    }

    #[test]
    fn footsteps_play_every_400ms() {
        let mut player = Player::default();
        let mut camera = Camera::default();
        let mut audio = RecordingSound::default();
        for now in (0..1000).step_by(100) {
            player.walk(&mut camera, Vec2::Y, 7.2, &tick(now), &mut audio);
        }
        assert_eq!(audio.count(Sfx::Walk), 3, "at 0, 400 and 800 ms");
    }

    #[test]
    fn standing_still_resets_bob() {
        let mut player = Player::default();
        let mut camera = Camera::default();
        let mut audio = RecordingSound::default();
        player.walk(&mut camera, Vec2::Y, 7.2, &tick(0), &mut audio);
        assert!(!player.walk(&mut camera, Vec2::ZERO, 7.2, &tick(100), &mut audio));
        assert_eq!(camera.position().y, EYE_HEIGHT);
        assert_eq!(player.velocity, Vec3::ZERO);
    }
}
