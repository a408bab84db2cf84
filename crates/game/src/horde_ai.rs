//! Creature behaviour: chase, contact damage, death grace, and respawn.
//!
//! The UGV only shares the death/respawn half of this. Its movement is
//! driven by [`crate::ugv`].

use std::f32::consts::TAU;

use audio::Sfx;
use engine_core::{Entity, Hitpoints, Tick, Transform};
use glam::Vec3;
use rand::Rng;

use crate::creature::{self, Creature, EntityKind, Pose};
use crate::state::{GameState, Io};
use crate::ugv::UgvBrain;

/// Dead creatures wait this long before respawning or being removed.
pub const RESPAWN_DELAY_MS: u64 = 2000;
pub const RESPAWN_MIN: f32 = 40.0;
pub const RESPAWN_MAX: f32 = 60.0;
/// Hostiles stop advancing inside this distance.
pub const CLOSE_CONTACT: f32 = 2.0;
/// Contact damage reaches this far.
pub const MELEE_RANGE: f32 = 1.5;
pub const ATTACK_COOLDOWN_MS: u64 = 1000;
/// Friendlies keep this far from the player.
const FOLLOW_DISTANCE: f32 = 6.0;

enum Expired {
    Respawn(Entity),
    Remove(Entity),
}

/// Run one tick of creature behaviour.
pub fn update(state: &mut GameState, io: &mut Io, tick: &Tick) {
    let player = state.player_position();

    // ── Death grace ────────────────────────────────────────────────────
    let expired: Vec<Expired> = state
        .registry
        .query::<&Creature>()
        .iter()
        .filter_map(|(e, c)| {
            let died = c.death_time?;
            if tick.since(died) < RESPAWN_DELAY_MS {
                return None;
            }
            Some(if c.kind.is_friendly() {
                Expired::Remove(e)
            } else {
                Expired::Respawn(e)
            })
        })
        .collect();

    for item in expired {
        match item {
            Expired::Respawn(e) => respawn(state, io, e, player),
            Expired::Remove(e) => {
                state.despawn_creature(io.scene, e);
                log::debug!("Friendly {:?} removed", e);
            }
        }
    }

    // ── Chase and contact ──────────────────────────────────────────────
    let mut contact = 0.0;
    for (_, (c, transform)) in state.registry.query_mut::<(&mut Creature, &mut Transform)>() {
        let distance = transform.flat_distance(player);
        c.pose = Pose::for_distance(distance, c.is_dead());
        if c.is_dead() || c.kind == EntityKind::Ugv {
            continue;
        }
        let stats = c.kind.stats();
        transform.look_at_flat(player);

        let stop = if stats.friendly { FOLLOW_DISTANCE } else { CLOSE_CONTACT };
        if distance > stop && stats.speed > 0.0 {
            let step = (stats.speed * tick.dt).min(distance - stop);
            let forward = transform.forward();
            transform.position += Vec3::new(forward.x, 0.0, forward.z) * step;
        }

        if stats.friendly || distance >= MELEE_RANGE {
            continue;
        }
        let ready = c.last_attack.map_or(true, |t| tick.since(t) >= ATTACK_COOLDOWN_MS);
        if ready {
            c.last_attack = Some(tick.now_ms);
            contact += stats.contact_damage;
        }
    }

    if contact > 0.0 {
        if !state.config.debug.god_mode {
            state.vitals.damage(contact);
        }
        io.audio.play(Sfx::PlayerHit);
    }
}

/// Bring a dead hostile back at full health 40-60 units from the player.
fn respawn(state: &mut GameState, io: &mut Io, entity: Entity, player: Vec3) {
    let angle = state.rng.gen_range(0.0..TAU);
    let radius = state.rng.gen_range(RESPAWN_MIN..RESPAWN_MAX);
    let position = Vec3::new(player.x + angle.cos() * radius, 0.0, player.z + angle.sin() * radius);

    let Ok((c, hp, transform)) = state
        .registry
        .query_one_mut::<(&mut Creature, &mut Hitpoints, &mut Transform)>(entity)
    else {
        log::debug!("respawn: {:?} is gone", entity);
        return;
    };
    c.death_time = None;
    c.last_attack = None;
    c.pose = Pose::Idle;
    hp.reset();
    transform.position = position;
    let kind = c.kind;
    if let Some(node) = c.node {
        io.scene.set_transform(node, *transform);
    }

    if kind == EntityKind::Ugv {
        let brain = UgvBrain::new(position, &mut state.rng);
        if let Err(e) = state.registry.insert_one(entity, brain) {
            log::warn!("Respawned UGV {:?} lost its brain: {}", entity, e);
        }
    }
    creature::restore_hitbox(&mut state.registry, &mut state.physics, entity);
}
