//! Night vision, the flashlight, and the ghosts only night vision reveals.

use engine_core::{Tick, Transform};
use glam::Vec3;
use rand::Rng;
use renderer::{NodeDesc, NodeId, Scene, Shape};

pub const MAX_GHOSTS: usize = 5;
/// Spawn chance per tick while night vision is on.
pub const SPAWN_CHANCE: f64 = 0.005;
const SPAWN_MIN: f32 = 10.0;
const SPAWN_MAX: f32 = 20.0;
const LIFETIME_MS: std::ops::Range<u64> = 8_000..15_000;
const MAX_OPACITY: f32 = 0.8;
/// Fraction of the lifetime spent fading in (and, mirrored, fading out).
const FADE: f32 = 0.3;
const DRIFT_SPEED: f32 = 0.6;
const WOBBLE: f32 = 0.4;
/// Ghosts closer than this drain sanity.
pub const HARASS_RANGE: f32 = 5.0;
/// Sanity per second per harassing ghost.
pub const HARASS_DRAIN: f32 = 0.02;
const GHOST_SIZE: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct Ghost {
    pub node: NodeId,
    pub position: Vec3,
    pub born_ms: u64,
    pub lifetime_ms: u64,
    wobble_phase: f32,
}

impl Ghost {
    /// Fade in, hold, fade out.
    pub fn opacity(&self, now_ms: u64) -> f32 {
        let t = (now_ms.saturating_sub(self.born_ms)) as f32 / self.lifetime_ms as f32;
        let ramp = if t < FADE {
            t / FADE
        } else if t < 1.0 - FADE {
            1.0
        } else {
            (1.0 - t) / FADE
        };
        ramp.clamp(0.0, 1.0) * MAX_OPACITY
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        now_ms >= self.born_ms + self.lifetime_ms
    }
}

#[derive(Debug, Default)]
pub struct NightVision {
    pub enabled: bool,
    pub flashlight: bool,
    pub ghosts: Vec<Ghost>,
}

impl NightVision {
    /// Flip night vision. Turning it off banishes every ghost.
    pub fn toggle(&mut self, scene: &mut dyn Scene) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.clear_ghosts(scene);
        }
        self.enabled
    }

    pub fn toggle_flashlight(&mut self) -> bool {
        self.flashlight = !self.flashlight;
        self.flashlight
    }

    pub fn clear_ghosts(&mut self, scene: &mut dyn Scene) {
        for ghost in self.ghosts.drain(..) {
            scene.remove(ghost.node);
        }
    }

    /// Spawn, drift, fade and retire ghosts. Returns the sanity they drained this tick.
    pub fn update(
        &mut self,
        scene: &mut dyn Scene,
        textures: &[String],
        rng: &mut impl Rng,
        player: Vec3,
        tick: &Tick,
    ) -> f32 {
        if !self.enabled || textures.is_empty() {
            return 0.0;
        }
        let now = tick.now_ms;

        self.ghosts.retain(|g| {
            let keep = !g.expired(now);
            if !keep {
                scene.remove(g.node);
            }
            keep
        });

        if self.ghosts.len() < MAX_GHOSTS && rng.gen_bool(SPAWN_CHANCE) {
            self.spawn(scene, textures, rng, player, now);
        }

        let seconds = now as f32 / 1000.0;
        let mut drain = 0.0;
        for ghost in &mut self.ghosts {
            let to_player = Vec3::new(player.x - ghost.position.x, 0.0, player.z - ghost.position.z);
            let dist = to_player.length();
            if dist > 0.5 {
                ghost.position += to_player / dist * DRIFT_SPEED * tick.dt;
            }
            let bob = (seconds * 2.0 + ghost.wobble_phase).sin() * WOBBLE;
            let mut transform = Transform::from_position(ghost.position + Vec3::Y * bob);
            transform.look_at_flat(player);
            scene.set_transform(ghost.node, transform);
            scene.set_uniform(ghost.node, "opacity", ghost.opacity(now));
            if dist < HARASS_RANGE {
                drain += HARASS_DRAIN * tick.dt;
            }
        }
        drain
    }

    fn spawn(&mut self, scene: &mut dyn Scene, textures: &[String], rng: &mut impl Rng, player: Vec3, now: u64) {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let distance = rng.gen_range(SPAWN_MIN..SPAWN_MAX);
        let position = Vec3::new(
            player.x + angle.cos() * distance,
            GHOST_SIZE * 0.5,
            player.z + angle.sin() * distance,
        );
        let texture = textures[rng.gen_range(0..textures.len())].clone();
        let node = scene.add(
            None,
            NodeDesc::new(Shape::Billboard { texture, size: GHOST_SIZE }).at(position),
        );
        scene.set_uniform(node, "opacity", 0.0);
        log::trace!("Ghost spawned {distance:.1} units away");
        self.ghosts.push(Ghost {
            node,
            position,
            born_ms: now,
            lifetime_ms: rng.gen_range(LIFETIME_MS),
            wobble_phase: rng.gen_range(0.0..std::f32::consts::TAU),
        });
    }
}
