//! The fixed-order gameplay tick.
//!
//! Order: input, AI and movement, projectiles and collision, vitals,
//! event timers, then the death check. Rendering and the HUD read the
//! results at the end.

use std::f32::consts::TAU;

use audio::Sfx;
use engine_core::Tick;
use glam::Vec3;
use input::FrameInput;
use rand::Rng;
use renderer::Scene;

use crate::chunks::StreamReport;
use crate::creature::{self, EntityKind};
use crate::events::SPAWN_RADIUS;
use crate::hud::HudFrame;
use crate::projectiles::{self, Owner, Projectile};
use crate::state::{GamePhase, GameState, Io};
use crate::ugv::{self, SHELL_COLOR, SHELL_LIFETIME};
use crate::vitals::{self, Exposure};
use crate::weapons::MAX_AMMO;
use crate::{combat, controls, dialogue, horde_ai, level};

const UGV_SHOT_VOLUME: f64 = 0.7;

/// Run one tick of gameplay. Once dead, only railgun beams keep expiring.
pub fn gameplay(state: &mut GameState, io: &mut Io, input: &FrameInput, tick: &Tick) {
    match state.phase {
        GamePhase::Playing => {}
        GamePhase::Dead => {
            combat::expire_beams(&mut state.beams, io.scene, tick.now_ms);
            return;
        }
        GamePhase::Paused => return,
    }
    let now = tick.now_ms;
    let god_mode = state.config.debug.god_mode;

    // ── Input ──────────────────────────────────────────────────────────
    controls::apply(state, io, input, tick);
    if let Some(weapon) = state.arsenal.update(now) {
        log::info!("{} reloaded", weapon.spec().name);
    }

    // ── AI and movement ────────────────────────────────────────────────
    horde_ai::update(state, io, tick);
    let player = state.player_position();
    for (shooter, shot) in ugv::update(&mut state.registry, player, state.player.velocity, tick) {
        let shell = Projectile::bullet(shot.origin, shot.velocity, SHELL_LIFETIME).owned_by(Owner::Creature(shooter));
        projectiles::spawn(&mut state.projectiles, io.scene, shell, SHELL_COLOR);
        io.audio.play_with_volume(Sfx::UgvShot, UGV_SHOT_VOLUME);
    }
    creature::sync_hitboxes(&mut state.registry, &mut state.physics);
    creature::sync_nodes(&state.registry, io.scene);
    level::update_anomalies(state, io.scene, tick.dt);
    dialogue::update(state, io, tick);

    if !state.is_driving() {
        if let Some(report) = state.chunks.update(player, now, io.scene) {
            populate_chunks(state, io.scene, report);
        }
    }
    let orbs = state.chunks.collect_orbs(player, io.scene);
    if orbs > 0 {
        state.progress.collected += orbs;
        io.audio.play(Sfx::Pickup);
    }
    level::collect_key(state, io);
    level::check_portal(state, io);

    // ── Projectiles and collision ──────────────────────────────────────
    projectiles::integrate(&mut state.projectiles, io.scene);
    projectiles::resolve_hits(state, io, now);
    combat::expire_beams(&mut state.beams, io.scene, now);

    // ── Vitals ─────────────────────────────────────────────────────────
    let player = state.player_position();
    state.exposure = Exposure {
        nearest_hostile: creature::nearest_hostile(&state.registry, player),
        morphoser: level::morphoser_exposure(state),
    };
    vitals::update(&mut state.vitals, &state.exposure, tick.dt, god_mode);
    let ghost_textures = state.assets.ghost_textures();
    let haunting = state
        .night_vision
        .update(io.scene, &ghost_textures, &mut state.rng, player, tick);
    state.vitals.adjust_sanity(-haunting);

    // ── Event timers ───────────────────────────────────────────────────
    let live = creature::live_hostiles(&state.registry);
    let report = state.events.update(
        now,
        tick.dt,
        &mut state.atmosphere,
        &mut state.vitals,
        &mut state.rng,
        live,
    );
    if let Some(kind) = report.started {
        state.messages.warning(kind.banner());
    }
    for kind in report.spawns {
        spawn_around_player(state, io.scene, kind);
    }

    // ── Death check ────────────────────────────────────────────────────
    if state.vitals.is_dead() && !god_mode {
        state.phase = GamePhase::Dead;
        state.messages.error("YOU DIED");
        log::info!(
            "Player died on level {} with {} kills",
            state.progress.level,
            state.progress.kills
        );
    }

    present(state, io, tick);
}

/// Spawn the creatures newly streamed chunks asked for, up to the
/// population cap, and tie them to their chunk.
pub fn populate_chunks(state: &mut GameState, scene: &mut dyn Scene, report: StreamReport) {
    let cap = state.config.world.max_entities;
    for (coord, spawn) in report.spawns {
        if creature::population(&state.registry) >= cap {
            log::debug!("Population cap reached; skipping chunk spawn at {:?}", coord);
            break;
        }
        let entity = state.spawn_creature(scene, EntityKind::from(spawn.kind), spawn.position);
        state.chunks.adopt(coord, entity);
    }
}

fn spawn_around_player(state: &mut GameState, scene: &mut dyn Scene, kind: EntityKind) {
    let angle = state.rng.gen_range(0.0..TAU);
    let player = state.player_position();
    let position = Vec3::new(
        player.x + angle.cos() * SPAWN_RADIUS,
        0.0,
        player.z + angle.sin() * SPAWN_RADIUS,
    );
    state.spawn_creature(scene, kind, position);
}

/// Push this tick's results to the scene, audio, and HUD.
fn present(state: &mut GameState, io: &mut Io, tick: &Tick) {
    let seconds = tick.now_ms as f32 / 1000.0;
    io.scene.set_atmosphere(&state.atmosphere);
    io.scene
        .set_camera(state.camera.position(), state.camera.rotation(), state.camera.fov_degrees);
    io.scene.set_time(seconds);
    state.chunks.animate_lights(seconds, state.atmosphere.main_light, io.scene);
    combat::follow_camera(state, io.scene);
    io.audio.set_distress(state.vitals.distress());
    io.audio.cleanup();
    state.messages.update(tick.dt);

    let frame = hud_frame(state, tick.now_ms);
    io.hud.present(&frame);
}

pub fn hud_frame(state: &GameState, now_ms: u64) -> HudFrame {
    let (ammo_text, ammo_fill) = match state.arsenal.reload_progress(now_ms) {
        Some(progress) => ("RELOADING".to_string(), progress),
        None => (
            format!("{} / ∞", state.arsenal.ammo()),
            state.arsenal.ammo() as f32 / MAX_AMMO as f32,
        ),
    };
    HudFrame {
        health_pct: (state.vitals.health() * 100.0).round() as u32,
        sanity_pct: (state.vitals.sanity() * 100.0).round() as u32,
        level: state.progress.level,
        kills: state.progress.kills,
        collected: state.progress.collected,
        weapon: state.arsenal.active().spec().name,
        ammo_text,
        ammo_fill,
        warning_opacity: state.exposure.warning_opacity(),
        event_banner: state.events.active().map(|e| e.kind.banner().to_string()),
        message: state.messages.latest().map(|m| m.text.clone()),
        caption: state.speech.current().map(|u| u.text.clone()),
        night_vision: state.night_vision.enabled,
        driving: state.is_driving(),
        dead: state.phase == GamePhase::Dead,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WorldEvent;
    use crate::testing::Rig;
    use input::Action;
    use procgen::{ChunkCoord, SpawnKind, SpawnPoint};

    #[test]
    fn nothing_happens_unless_playing() {
        let mut rig = Rig::new();
        rig.state.phase = GamePhase::Paused;
        rig.tick_ms(16);
        assert_eq!(rig.hud.presented, 0);
        assert!(rig.state.chunks.is_empty());
    }

    #[test]
    fn tick_streams_chunks_and_presents_hud() {
        let mut rig = Rig::new();
        rig.tick_ms(16);
        assert_eq!(rig.state.chunks.len(), 25);
        let frame = rig.hud.last.clone().unwrap();
        assert_eq!(frame.ammo_text, "30 / ∞");
        assert_eq!(frame.health_pct, 100);
        assert_eq!(frame.weapon, "Pistol");
        assert_eq!(rig.hud.presented, 1);
    }

    #[test]
    fn hud_shows_reloading() {
        let mut rig = Rig::new();
        rig.tick_with(FrameInput {
            actions: vec![Action::Reload],
            ..Default::default()
        });
        assert_eq!(rig.hud.last.as_ref().unwrap().ammo_text, "RELOADING");
        rig.run_for_ms(1600);
        assert_eq!(rig.hud.last.as_ref().unwrap().ammo_text, "30 / ∞");
    }

    #[test]
    fn death_ends_play() {
        let mut rig = Rig::new();
        rig.state.vitals.damage(1.0);
        rig.tick_ms(16);
        assert_eq!(rig.state.phase, GamePhase::Dead);
        assert!(rig.hud.last.as_ref().unwrap().dead);
        assert_eq!(rig.state.messages.latest().unwrap().text, "YOU DIED");

        let presented = rig.hud.presented;
        rig.tick_ms(16);
        assert_eq!(rig.hud.presented, presented, "dead sessions stop ticking");
    }

    #[test]
    fn beams_expire_on_the_death_screen() {
        let mut rig = Rig::new();
        let node = rig.scene.add(None, renderer::NodeDesc::new(renderer::Shape::Group));
        let expires_ms = rig.now() + 100;
        rig.state.beams.push(combat::Beam { node, expires_ms });
        rig.state.vitals.damage(1.0);
        rig.tick_ms(16);
        assert_eq!(rig.state.phase, GamePhase::Dead);
        assert!(rig.scene.get(node).is_some());

        rig.run_for_ms(200);
        assert!(rig.state.beams.is_empty());
        assert!(rig.scene.get(node).is_none());
    }

    #[test]
    fn god_mode_survives() {
        let mut rig = Rig::new();
        rig.state.config.debug.god_mode = true;
        rig.state.vitals.damage(1.0);
        rig.tick_ms(16);
        assert_eq!(rig.state.phase, GamePhase::Playing);
    }

    #[test]
    fn ugv_shells_are_fired_into_the_world() {
        let mut rig = Rig::new();
        let ugv = rig.spawn(EntityKind::Ugv, Vec3::new(0.0, 0.0, -20.0));
        for _ in 0..10 {
            rig.tick_ms(16);
            if rig.audio.count(Sfx::UgvShot) > 0 {
                break;
            }
        }
        assert_eq!(rig.audio.count(Sfx::UgvShot), 1);
        let shell = rig.state.projectiles.iter().find(|p| p.owner == Owner::Creature(ugv));
        assert!(shell.is_some());
    }

    #[test]
    fn spawn_event_brings_creatures_at_radius() {
        let mut rig = Rig::new();
        let now = rig.now();
        {
            let state = &mut rig.state;
            state
                .events
                .start(WorldEvent::EntitySpawn, now, &mut state.atmosphere, &mut state.vitals);
        }
        rig.tick_ms(16);
        assert_eq!(creature::population(&rig.state.registry), 1);
        assert_eq!(rig.hud.last.as_ref().unwrap().event_banner.as_deref(), Some("THEY ARE COMING"));
        let player = rig.state.player_position();
        for (_, t) in rig.state.registry.query::<&engine_core::Transform>().iter() {
            assert!((t.flat_distance(player) - SPAWN_RADIUS).abs() < 1e-3);
        }
    }

    #[test]
    fn chunk_spawns_respect_population_cap() {
        let mut rig = Rig::new();
        rig.state.config.world.max_entities = 2;
        let coord = ChunkCoord::new(0, 0);
        let spawns = (0..4)
            .map(|i| {
                (
                    coord,
                    SpawnPoint {
                        kind: SpawnKind::Grunt,
                        position: Vec3::new(i as f32 * 3.0, 0.0, 10.0),
                    },
                )
            })
            .collect();
        let report = StreamReport {
            spawns,
            ..Default::default()
        };
        {
            let (state, io) = rig.parts();
            populate_chunks(state, io.scene, report);
        }
        assert_eq!(creature::population(&rig.state.registry), 2);
    }

    /// Stream along a strip until some loaded chunk holds an orb.
    fn stream_to_an_orb(rig: &mut Rig) -> (Vec3, renderer::NodeId) {
        for step in 0..200 {
            let p = Vec3::new(step as f32 * 300.0, 0.0, 0.0);
            rig.state.chunks.stream(p, &mut rig.scene);
            let found = rig
                .state
                .chunks
                .loaded_coords()
                .into_iter()
                .filter_map(|c| rig.state.chunks.get(c))
                .find_map(|chunk| chunk.orbs.first().map(|o| (o.1, o.2)));
            if let Some(orb) = found {
                return orb;
            }
        }
        panic!("no orb along the strip");
    }

    #[test]
    fn walking_onto_an_orb_collects_it() {
        let mut rig = Rig::new();
        let (orb, node) = stream_to_an_orb(&mut rig);
        assert!(rig.scene.get(node).is_some());
        rig.state.camera.transform.position = Vec3::new(orb.x, 1.6, orb.z);
        rig.tick_ms(16);
        assert!(rig.state.progress.collected >= 1);
        assert!(rig.audio.count(Sfx::Pickup) >= 1);
        assert!(rig.scene.get(node).is_none());
    }

    #[test]
    fn level_change_leaves_no_chunk_references() {
        let mut rig = Rig::new();
        rig.tick_ms(16);
        rig.state.config.world.max_entities = 4;
        let coord = ChunkCoord::new(0, 0);
        let report = StreamReport {
            spawns: vec![(
                coord,
                SpawnPoint {
                    kind: SpawnKind::Grunt,
                    position: Vec3::new(3.0, 0.0, 10.0),
                },
            )],
            ..Default::default()
        };
        {
            let (state, io) = rig.parts();
            populate_chunks(state, io.scene, report);
        }
        assert_eq!(rig.state.chunks.get(coord).unwrap().entities.len(), 1);
        {
            let (state, io) = rig.parts();
            crate::level::clear(state, io.scene);
        }
        assert!(rig.state.chunks.get(coord).unwrap().entities.is_empty());
    }
}
