//! Projectiles and particles: per-tick integration and hit resolution.
//!
//! Integration and collision are separate passes so every hit test in a
//! tick sees the same creature positions.

use audio::Sfx;
use engine_core::{Entity, Lifetime, Transform};
use glam::Vec3;
use rand::Rng;
use renderer::{NodeDesc, NodeId, Scene, Shape};

use crate::combat;
use crate::creature::{body_centre, Creature};
use crate::state::{GameState, Io};
use crate::ugv::SHELL_DAMAGE;

/// A projectile hits anything this close.
pub const HIT_RADIUS: f32 = 1.5;
/// Downward velocity change per tick for particles.
pub const GRAVITY_PER_TICK: f32 = 0.005;
const BLOOD_PARTICLES: usize = 15;
const BLOOD_LIFETIME: u32 = 60;
const BLOOD_COLOR: u32 = 0x8a0303;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Player,
    /// Fired by a creature. Only ever hits the player.
    Creature(Entity),
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub position: Vec3,
    /// Units per tick.
    pub velocity: Vec3,
    pub lifetime: Lifetime,
    /// Cosmetic particle: falls and never collides.
    pub gravity: bool,
    pub flame: bool,
    pub owner: Owner,
    pub damage: u32,
    pub node: Option<NodeId>,
}

impl Projectile {
    pub fn bullet(position: Vec3, velocity: Vec3, lifetime: u32) -> Self {
        Self {
            position,
            velocity,
            lifetime: Lifetime::new(lifetime),
            gravity: false,
            flame: false,
            owner: Owner::Player,
            damage: 1,
            node: None,
        }
    }

    pub fn flame(mut self) -> Self {
        self.flame = true;
        self
    }

    pub fn falling(mut self) -> Self {
        self.gravity = true;
        self
    }

    pub fn owned_by(mut self, owner: Owner) -> Self {
        self.owner = owner;
        self
    }
}

/// Add a projectile with its scene node.
pub fn spawn(projectiles: &mut Vec<Projectile>, scene: &mut dyn Scene, mut projectile: Projectile, color: u32) {
    let radius = if projectile.flame {
        0.3
    } else if projectile.gravity {
        0.05
    } else {
        0.1
    };
    let node = scene.add(
        None,
        NodeDesc::new(Shape::Sphere { radius }).at(projectile.position).color(color),
    );
    projectile.node = Some(node);
    projectiles.push(projectile);
}

/// Move every projectile one tick and drop the expired ones.
pub fn integrate(projectiles: &mut Vec<Projectile>, scene: &mut dyn Scene) {
    projectiles.retain_mut(|p| {
        p.position += p.velocity;
        if p.gravity {
            p.velocity.y -= GRAVITY_PER_TICK;
        }
        let expired = p.lifetime.step();
        match p.node {
            Some(node) if expired => scene.remove(node),
            Some(node) => scene.set_transform(node, Transform::from_position(p.position)),
            None => {}
        }
        !expired
    });
}

/// First live, non-friendly creature whose body is within reach of `point`.
fn find_target(registry: &hecs::World, point: Vec3) -> Option<Entity> {
    registry
        .query::<(&Creature, &Transform)>()
        .iter()
        .find(|(_, (c, t))| !c.is_dead() && !c.kind.is_friendly() && body_centre(t).distance(point) < HIT_RADIUS)
        .map(|(e, _)| e)
}

enum Target {
    Creature(Entity),
    Player,
}

/// Resolve hits for this tick. Each projectile hits at most one target and
/// is consumed by it.
pub fn resolve_hits(state: &mut GameState, io: &mut Io, now_ms: u64) {
    let player = state.player_position();
    let mut i = 0;
    while i < state.projectiles.len() {
        let p = &state.projectiles[i];
        let target = if p.gravity {
            None
        } else {
            match p.owner {
                Owner::Player => find_target(&state.registry, p.position).map(Target::Creature),
                Owner::Creature(_) => (p.position.distance(player) < HIT_RADIUS).then_some(Target::Player),
            }
        };
        let Some(target) = target else {
            i += 1;
            continue;
        };

        let p = state.projectiles.remove(i);
        if let Some(node) = p.node {
            io.scene.remove(node);
        }
        match target {
            Target::Creature(entity) => {
                combat::apply_hit(state, io, entity, p.damage, now_ms);
                blood_splatter(state, io.scene, p.position);
            }
            Target::Player => {
                if !state.config.debug.god_mode {
                    state.vitals.damage(SHELL_DAMAGE);
                }
                io.audio.play(Sfx::PlayerHit);
            }
        }
    }
}

/// Burst of falling particles at `at`.
pub fn blood_splatter(state: &mut GameState, scene: &mut dyn Scene, at: Vec3) {
    for _ in 0..BLOOD_PARTICLES {
        let velocity = Vec3::new(
            state.rng.gen_range(-0.15..0.15),
            state.rng.gen_range(0.0..0.3),
            state.rng.gen_range(-0.15..0.15),
        );
        let particle = Projectile::bullet(at, velocity, BLOOD_LIFETIME).falling();
        spawn(&mut state.projectiles, scene, particle, BLOOD_COLOR);
    }
}
