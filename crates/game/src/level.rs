//! Level layout: starting population, the exit portal, the morphoser
//! hazard, the night-vision key, and drifting anomalies.

use std::f32::consts::TAU;

use audio::Sfx;
use engine_core::Transform;
use glam::Vec3;
use rand::Rng;
use renderer::{NodeDesc, NodeId, Scene, Shape};

use crate::creature::{self, EntityKind};
use crate::player::EYE_HEIGHT;
use crate::state::{GameState, Io};
use crate::vitals::facing_dot;

/// Walking into the portal within this distance finishes the level.
pub const PORTAL_RANGE: f32 = 5.0;
pub const KEY_RANGE: f32 = 2.0;
const ANOMALY_COUNT: usize = 5;
/// Anomalies further than this from the player are recycled.
const ANOMALY_LEASH: f32 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct Placed {
    pub position: Vec3,
    pub node: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub struct Anomaly {
    pub position: Vec3,
    /// Units per second.
    pub velocity: Vec3,
    pub node: NodeId,
}

#[derive(Debug, Default)]
pub struct LevelObjects {
    pub portal: Option<Placed>,
    pub morphoser: Option<Placed>,
    pub key: Option<Placed>,
    pub anomalies: Vec<Anomaly>,
}

/// Where the exit portal sits for `level`.
pub fn portal_position(level: u32) -> Vec3 {
    Vec3::new(0.0, 2.0, 40.0 + level as f32 * 10.0)
}

/// Populate the current level around the origin.
pub fn setup(state: &mut GameState, scene: &mut dyn Scene) {
    let level = state.progress.level;

    let hostiles = 5 + level as usize;
    for i in 0..hostiles {
        let angle = i as f32 / hostiles as f32 * TAU;
        let radius = state.rng.gen_range(20.0..40.0);
        let kind = match i % 3 {
            0 => EntityKind::Grunt,
            1 => EntityKind::Lurker,
            _ => EntityKind::Alien,
        };
        state.spawn_creature(scene, kind, Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius));
    }

    let angle = state.rng.gen_range(0.0..TAU);
    state.spawn_creature(scene, EntityKind::Friendly, Vec3::new(angle.cos() * 15.0, 0.0, angle.sin() * 15.0));

    let angle = state.rng.gen_range(0.0..TAU);
    state.spawn_creature(scene, EntityKind::Ugv, Vec3::new(angle.cos() * 50.0, 0.0, angle.sin() * 50.0));

    let position = Vec3::new(state.rng.gen_range(-20.0..20.0), 2.0, state.rng.gen_range(-20.0..20.0));
    let node = scene.add(None, NodeDesc::new(Shape::Sphere { radius: 1.5 }).at(position).color(0x660066));
    state.level.morphoser = Some(Placed { position, node });

    if !state.progress.has_nv_key {
        let angle = state.rng.gen_range(0.0..TAU);
        let radius = state.rng.gen_range(15.0..25.0);
        let position = Vec3::new(angle.cos() * radius, 1.0, angle.sin() * radius);
        let node = scene.add(
            None,
            NodeDesc::new(Shape::Cuboid { size: Vec3::new(0.3, 0.1, 0.6) }).at(position).color(0xffd700),
        );
        scene.set_visible(node, state.night_vision.enabled);
        state.level.key = Some(Placed { position, node });
    }

    for _ in 0..ANOMALY_COUNT {
        let position = random_anomaly_spot(state, Vec3::ZERO);
        let velocity = Vec3::new(
            state.rng.gen_range(-3.0..3.0),
            state.rng.gen_range(-0.6..0.6),
            state.rng.gen_range(-3.0..3.0),
        );
        let node = scene.add(None, NodeDesc::new(Shape::Sphere { radius: 0.5 }).at(position).color(0xff00ff));
        state.level.anomalies.push(Anomaly { position, velocity, node });
    }

    let position = portal_position(level);
    let node = scene.add(None, NodeDesc::new(Shape::Sphere { radius: 2.0 }).at(position).color(0x00ff00));
    state.level.portal = Some(Placed { position, node });
}

fn random_anomaly_spot(state: &mut GameState, around: Vec3) -> Vec3 {
    Vec3::new(
        around.x + state.rng.gen_range(-40.0..40.0),
        state.rng.gen_range(2.0..12.0),
        around.z + state.rng.gen_range(-40.0..40.0),
    )
}

/// Remove every creature, projectile, and level object.
pub fn clear(state: &mut GameState, scene: &mut dyn Scene) {
    let all: Vec<_> = state.registry.query::<&creature::Creature>().iter().map(|(e, _)| e).collect();
    for e in all {
        state.despawn_creature(scene, e);
    }
    for p in state.projectiles.drain(..) {
        if let Some(node) = p.node {
            scene.remove(node);
        }
    }
    let level = std::mem::take(&mut state.level);
    for placed in [level.portal, level.morphoser, level.key].into_iter().flatten() {
        scene.remove(placed.node);
    }
    for a in level.anomalies {
        scene.remove(a.node);
    }
    state.night_vision.clear_ghosts(scene);
}

/// Drift anomalies and recycle the ones that wander off.
pub fn update_anomalies(state: &mut GameState, scene: &mut dyn Scene, dt: f32) {
    let player = state.player_position();
    for i in 0..state.level.anomalies.len() {
        let mut a = state.level.anomalies[i];
        a.position += a.velocity * dt;
        if a.position.distance(player) > ANOMALY_LEASH {
            a.position = random_anomaly_spot(state, player);
        }
        scene.set_transform(a.node, Transform::from_position(a.position));
        state.level.anomalies[i] = a;
    }
}

/// Distance to the morphoser and how directly the player is looking at it.
pub fn morphoser_exposure(state: &GameState) -> Option<(f32, f32)> {
    let m = state.level.morphoser?;
    let eye = state.player_position();
    Some((eye.distance(m.position), facing_dot(eye, state.camera.forward(), m.position)))
}

/// Pick up the night-vision key. Only visible, and so only collectable,
/// while night vision is on.
pub fn collect_key(state: &mut GameState, io: &mut Io) -> bool {
    if !state.night_vision.enabled {
        return false;
    }
    let Some(key) = state.level.key else {
        return false;
    };
    if key.position.distance(state.player_position()) >= KEY_RANGE {
        return false;
    }
    io.scene.remove(key.node);
    state.level.key = None;
    state.progress.has_nv_key = true;
    state.messages.success("SPECIAL KEY ACQUIRED");
    io.audio.play(Sfx::Pickup);
    true
}

/// Advance to the next level if the player reached the portal.
pub fn check_portal(state: &mut GameState, io: &mut Io) -> bool {
    let Some(portal) = state.level.portal else {
        return false;
    };
    if portal.position.distance(state.player_position()) >= PORTAL_RANGE {
        return false;
    }
    state.progress.level += 1;
    log::info!("Entering level {}", state.progress.level);
    clear(state, io.scene);
    state.speech.clear(io.voice);
    state.player.place(&mut state.camera, Vec3::ZERO);
    io.audio.play(Sfx::NextLevel);
    state.messages.info(format!("LEVEL {}", state.progress.level));
    setup(state, io.scene);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{live_hostiles, population};
    use crate::testing::Rig;

    #[test]
    fn setup_spawns_level_population() {
        let mut rig = Rig::new();
        {
            let (state, io) = rig.parts();
            setup(state, io.scene);
        }
        // 6 hostiles, a friendly, and the UGV.
        assert_eq!(population(&rig.state.registry), 8);
        assert_eq!(live_hostiles(&rig.state.registry), 7);
        assert_eq!(rig.state.level.anomalies.len(), ANOMALY_COUNT);
        assert_eq!(rig.state.level.portal.unwrap().position, Vec3::new(0.0, 2.0, 50.0));
        assert!(rig.state.level.key.is_some());
    }

    #[test]
    fn portal_advances_level_and_resets_player() {
        let mut rig = Rig::new();
        {
            let (state, io) = rig.parts();
            setup(state, io.scene);
        }
        rig.state.camera.transform.position = Vec3::new(0.0, EYE_HEIGHT, 48.0);
        {
            let (state, mut io) = rig.parts();
            assert!(check_portal(state, &mut io));
        }
        assert_eq!(rig.state.progress.level, 2);
        assert_eq!(rig.state.player_position(), Vec3::new(0.0, EYE_HEIGHT, 0.0));
        assert_eq!(rig.state.level.portal.unwrap().position, Vec3::new(0.0, 2.0, 60.0));
        assert_eq!(population(&rig.state.registry), 9);
        assert_eq!(rig.audio.count(Sfx::NextLevel), 1);
    }

    #[test]
    fn key_needs_night_vision() {
        let mut rig = Rig::new();
        {
            let (state, io) = rig.parts();
            setup(state, io.scene);
        }
        let key = rig.state.level.key.unwrap().position;
        rig.state.camera.transform.position = key;
        {
            let (state, mut io) = rig.parts();
            assert!(!collect_key(state, &mut io));
            state.night_vision.enabled = true;
            assert!(collect_key(state, &mut io));
        }
        assert!(rig.state.progress.has_nv_key);
        assert_eq!(rig.state.messages.latest().unwrap().text, "SPECIAL KEY ACQUIRED");
    }

    #[test]
    fn anomalies_are_recycled_near_the_player() {
        let mut rig = Rig::new();
        {
            let (state, io) = rig.parts();
            setup(state, io.scene);
        }
        rig.state.camera.transform.position = Vec3::new(1000.0, EYE_HEIGHT, 0.0);
        {
            let (state, io) = rig.parts();
            update_anomalies(state, io.scene, 0.016);
        }
        for a in &rig.state.level.anomalies {
            assert!((a.position.x - 1000.0).abs() <= 40.0);
        }
    }

    #[test]
    fn morphoser_exposure_reports_facing() {
        let mut rig = Rig::new();
        let node = rig.scene.add(None, NodeDesc::new(Shape::Sphere { radius: 1.5 }));
        rig.state.level.morphoser = Some(Placed {
            position: Vec3::new(0.0, EYE_HEIGHT, -10.0),
            node,
        });
        let (d, dot) = morphoser_exposure(&rig.state).unwrap();
        assert!((d - 10.0).abs() < 1e-5);
        assert!(dot > 0.99);
    }
}
