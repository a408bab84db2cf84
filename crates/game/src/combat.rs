//! Firing, hit application, and kill bookkeeping.

use audio::Sfx;
use engine_core::{Entity, Hitpoints, Tick, Transform};
use glam::{Quat, Vec3};
use rand::Rng;
use renderer::{NodeDesc, NodeId, Scene, Shape};

use crate::creature::{self, body_centre, entity_from_tag, Creature};
use crate::projectiles::{self, Projectile};
use crate::state::{GameState, Io};
use crate::weapons::{Attack, Blocked, WeaponKind, WeaponSpec};

/// Kills needed for the unlock notice.
pub const UNLOCK_KILLS: u32 = 10;
pub const UNLOCK_NOTICE: &str = "Rifle Unlocked! Press 6 to equip.";
/// Sanity restored per kill.
pub const KILL_SANITY: f32 = 0.1;
const RAIL_RANGE: f32 = 200.0;
const RAIL_COLOR: u32 = 0x00ffff;
const VIEWMODEL_OFFSET: Vec3 = Vec3::new(0.3, -0.3, -0.5);

/// Railgun beam waiting to be removed.
#[derive(Debug, Clone, Copy)]
pub struct Beam {
    pub node: NodeId,
    pub expires_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Target was gone, dead, or friendly.
    Ignored,
    Wounded,
    Killed,
}

/// Damage a creature. The lethal hit stamps the death time and counts the kill.
pub fn apply_hit(state: &mut GameState, io: &mut Io, entity: Entity, damage: u32, now_ms: u64) -> HitOutcome {
    let Ok((target, hp)) = state.registry.query_one_mut::<(&mut Creature, &mut Hitpoints)>(entity) else {
        log::debug!("apply_hit: {:?} is gone", entity);
        return HitOutcome::Ignored;
    };
    if target.is_dead() || target.kind.is_friendly() {
        return HitOutcome::Ignored;
    }
    io.audio.play(Sfx::EntityHit);
    if !hp.take_damage(damage) {
        return HitOutcome::Wounded;
    }
    target.death_time = Some(now_ms);
    let kind = target.kind;
    creature::retire_hitbox(&mut state.registry, &mut state.physics, entity);
    register_kill(state);
    log::debug!("{} killed", kind.name());
    HitOutcome::Killed
}

fn register_kill(state: &mut GameState) {
    state.progress.kills += 1;
    state.vitals.adjust_sanity(KILL_SANITY);
    if state.progress.kills == UNLOCK_KILLS {
        log::info!("Unlock threshold reached at {} kills", UNLOCK_KILLS);
        state.messages.success(UNLOCK_NOTICE);
    }
}

/// Show the active weapon's model, or nothing if it has none.
pub fn equip(state: &mut GameState, scene: &mut dyn Scene, kind: WeaponKind) {
    if let Some(node) = state.viewmodel.take() {
        scene.remove(node);
    }
    let Some(model) = kind.spec().model else {
        return;
    };
    if !state.assets.has_model(model) {
        return;
    }
    state.viewmodel = Some(scene.add(None, NodeDesc::new(Shape::Model(model))));
}

/// Keep the weapon model in front of the camera.
pub fn follow_camera(state: &GameState, scene: &mut dyn Scene) {
    if let Some(node) = state.viewmodel {
        let rotation = state.camera.rotation();
        let mut t = Transform::from_position(state.camera.position() + rotation * VIEWMODEL_OFFSET);
        t.rotation = rotation;
        scene.set_transform(node, t);
        scene.set_visible(node, !state.is_driving());
    }
}

/// Fire the active weapon if the trigger is down. Rifles fire while held,
/// everything else on press.
pub fn handle_trigger(state: &mut GameState, io: &mut Io, pressed: bool, held: bool, tick: &Tick) {
    let automatic = state.arsenal.active().spec().automatic;
    if !(pressed || (held && automatic)) {
        return;
    }
    match state.arsenal.trigger(tick.now_ms) {
        Ok(spec) => fire(state, io, spec, tick.now_ms),
        Err(Blocked::NoAmmo) if pressed => state.messages.warning("Out of ammo. Press R to reload."),
        Err(_) => {}
    }
}

fn fire(state: &mut GameState, io: &mut Io, spec: &'static WeaponSpec, now_ms: u64) {
    match spec.attack {
        Attack::Projectile {
            color,
            lifetime,
            speed,
            pellets,
            spread,
            flame,
        } => {
            let origin = state.camera.position();
            let forward = state.camera.forward();
            for _ in 0..pellets {
                let mut dir = forward;
                if spread > 0.0 {
                    dir += Vec3::new(
                        state.rng.gen_range(-0.5..0.5) * spread,
                        state.rng.gen_range(-0.5..0.5) * spread,
                        state.rng.gen_range(-0.5..0.5) * spread,
                    );
                }
                let mut p = Projectile::bullet(origin, dir.normalize_or_zero() * speed, lifetime);
                if flame {
                    p = p.flame();
                }
                projectiles::spawn(&mut state.projectiles, io.scene, p, color);
            }
        }
        Attack::Hitscan { damage, beam_ms } => {
            let (origin, dir) = (state.camera.position(), state.camera.forward());
            state.physics.update_query_pipeline();
            let hit = state.physics.raycast(origin, dir, RAIL_RANGE);
            let length = hit.map_or(RAIL_RANGE, |h| h.distance);
            if let Some(entity) = hit.and_then(|h| entity_from_tag(h.tag)) {
                apply_hit(state, io, entity, damage, now_ms);
            }
            spawn_beam(state, io.scene, origin, dir, length, now_ms + beam_ms);
        }
        Attack::Melee {
            radius,
            min_dot,
            damage,
            ..
        } => {
            for entity in melee_targets(state, radius, min_dot) {
                apply_hit(state, io, entity, damage, now_ms);
            }
        }
    }
    io.audio.play(spec.sound);
}

/// Live hostiles inside the swing cone.
fn melee_targets(state: &GameState, radius: f32, min_dot: f32) -> Vec<Entity> {
    let eye = state.camera.position();
    let f = state.camera.forward();
    let facing = Vec3::new(f.x, 0.0, f.z).normalize_or_zero();
    state
        .registry
        .query::<(&Creature, &Transform)>()
        .iter()
        .filter(|(_, (c, _))| !c.is_dead() && !c.kind.is_friendly())
        .filter(|(_, (_, t))| {
            let to = body_centre(t) - eye;
            let flat = Vec3::new(to.x, 0.0, to.z);
            let dist = flat.length();
            dist < radius && (dist < 1e-4 || facing.dot(flat / dist) > min_dot)
        })
        .map(|(e, _)| e)
        .collect()
}

fn spawn_beam(state: &mut GameState, scene: &mut dyn Scene, origin: Vec3, dir: Vec3, length: f32, expires_ms: u64) {
    let rotation = Quat::from_rotation_arc(Vec3::NEG_Z, dir.normalize_or_zero());
    let node = scene.add(
        None,
        NodeDesc::new(Shape::Beam { length })
            .at(origin)
            .rotated(rotation)
            .color(RAIL_COLOR),
    );
    state.beams.push(Beam { node, expires_ms });
}

/// Remove beams whose time is up.
pub fn expire_beams(beams: &mut Vec<Beam>, scene: &mut dyn Scene, now_ms: u64) {
    beams.retain(|b| {
        if now_ms >= b.expires_ms {
            scene.remove(b.node);
            false
        } else {
            true
        }
    });
}
