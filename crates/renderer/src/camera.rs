//! First-person camera with aim-down-sights.

use engine_core::Transform;
use glam::{Quat, Vec2, Vec3};

/// Hip-fire field of view in degrees.
pub const BASE_FOV: f32 = 60.0;
/// Field of view while aiming.
pub const AIM_FOV: f32 = 45.0;
/// Per-tick FOV blend factor at 60 Hz.
const FOV_LERP: f32 = 0.15;

/// FPS camera with an aim-blended field of view.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera transform (position and rotation).
    pub transform: Transform,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    pub base_fov: f32,
    pub aim_fov: f32,
    /// Mouse sensitivity when not aiming.
    pub sensitivity: f32,
    /// Mouse sensitivity while aiming.
    pub aim_sensitivity: f32,
    aiming: bool,
    /// Current pitch (up/down rotation) in radians.
    pitch: f32,
    /// Current yaw (left/right rotation) in radians.
    yaw: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            fov_degrees: BASE_FOV,
            base_fov: BASE_FOV,
            aim_fov: AIM_FOV,
            sensitivity: 0.002,
            aim_sensitivity: 0.001,
            aiming: false,
            pitch: 0.0,
            yaw: 0.0,
        }
    }
}

impl Camera {
    /// Create a new camera at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            ..Default::default()
        }
    }

    /// Process mouse movement for FPS look controls.
    pub fn process_mouse(&mut self, delta: Vec2) {
        let sensitivity = if self.aiming {
            self.aim_sensitivity
        } else {
            self.sensitivity
        };
        self.set_yaw_pitch(self.yaw - delta.x * sensitivity, self.pitch - delta.y * sensitivity);
    }

    /// Blend FOV toward the aim or hip value.
    pub fn update_aim(&mut self, aiming: bool, dt: f32) {
        self.aiming = aiming;
        let target = if aiming { self.aim_fov } else { self.base_fov };
        let t = 1.0 - (1.0 - FOV_LERP).powf(dt * 60.0);
        self.fov_degrees += (target - self.fov_degrees) * t.clamp(0.0, 1.0);
    }

    /// Walk on the horizontal plane. Returns the displacement applied.
    pub fn process_movement(&mut self, input: Vec2, speed: f32, dt: f32) -> Vec3 {
        let forward = self.transform.forward();
        let right = self.transform.right();

        // Project forward onto horizontal plane for FPS movement
        let forward_flat = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
        let right_flat = Vec3::new(right.x, 0.0, right.z).normalize_or_zero();

        let direction = forward_flat * input.y + right_flat * input.x;
        if direction.length_squared() > 0.0 {
            let step = direction.normalize() * speed * dt;
            self.transform.translate(step);
            step
        } else {
            Vec3::ZERO
        }
    }

    /// Get camera position.
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Get camera forward direction.
    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }

    /// Get camera right direction.
    pub fn right(&self) -> Vec3 {
        self.transform.right()
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    /// Get current yaw (left/right rotation) in radians.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Get current pitch (up/down rotation) in radians.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set yaw and pitch directly (in radians) and rebuild rotation.
    pub fn set_yaw_pitch(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        let max_pitch = std::f32::consts::FRAC_PI_2 - 0.01;
        self.pitch = pitch.clamp(-max_pitch, max_pitch);
        self.transform.rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.process_mouse(Vec2::new(0.0, -100_000.0));
        assert!(cam.pitch() < std::f32::consts::FRAC_PI_2);
        cam.process_mouse(Vec2::new(0.0, 200_000.0));
        assert!(cam.pitch() > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn aiming_halves_sensitivity() {
        let mut hip = Camera::default();
        let mut ads = Camera::default();
        ads.update_aim(true, 1.0 / 60.0);
        hip.process_mouse(Vec2::new(100.0, 0.0));
        ads.process_mouse(Vec2::new(100.0, 0.0));
        assert!((hip.yaw() - 2.0 * ads.yaw()).abs() < 1e-6);
    }

    #[test]
    fn fov_converges_to_aim_value() {
        let mut cam = Camera::default();
        for _ in 0..120 {
            cam.update_aim(true, 1.0 / 60.0);
        }
        assert!((cam.fov_degrees - AIM_FOV).abs() < 0.01);
        cam.update_aim(false, 1.0 / 60.0);
        assert!(cam.fov_degrees > AIM_FOV, "releasing aim widens the view");
    }

    #[test]
    fn movement_stays_on_ground_plane() {
        let mut cam = Camera::new(Vec3::new(0.0, 1.6, 0.0));
        cam.set_yaw_pitch(0.0, 1.2);
        let step = cam.process_movement(Vec2::new(0.0, 1.0), 7.2, 1.0);
        assert!(step.y.abs() < 1e-6);
        assert!((step.length() - 7.2).abs() < 1e-4);
        assert!(step.z < 0.0, "yaw 0 walks toward -Z");
    }
}
