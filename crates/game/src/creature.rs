//! Creature kinds, their components, and registry spawn/despawn helpers.
//!
//! Every creature (hostile, friendly, or UGV) is a `hecs` entity carrying
//! [`Creature`], [`Hitpoints`], [`Transform`], and [`Dialogue`]. Live
//! creatures also carry a [`Hitbox`] registered with the physics world.
//! The UGV additionally carries a [`UgvBrain`].

use engine_core::{Entity, Hitpoints, Transform, World};
use glam::Vec3;
use physics::{ColliderHandle, PhysicsWorld};
use procgen::SpawnKind;
use rand::Rng;
use renderer::{NodeDesc, NodeId, Scene, Shape};

use crate::assets::AssetCatalog;
use crate::dialogue::Dialogue;
use crate::ugv::UgvBrain;

/// Height of a creature's body centre above its feet. Hit tests and
/// hitboxes use this point.
pub const BODY_HEIGHT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Grunt,
    Lurker,
    Alien,
    Goo,
    Friendly,
    Ugv,
}

/// Per-kind constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindStats {
    pub max_health: u32,
    /// Units per second.
    pub speed: f32,
    /// Player health removed per contact hit.
    pub contact_damage: f32,
    pub hitbox: f32,
    pub friendly: bool,
    pub color: u32,
    pub emissive: u32,
}

impl EntityKind {
    pub fn stats(&self) -> KindStats {
        match self {
            EntityKind::Grunt => KindStats {
                max_health: 3,
                speed: 0.6,
                contact_damage: 0.10,
                hitbox: 0.8,
                friendly: false,
                color: 0x330000,
                emissive: 0xff0000,
            },
            EntityKind::Lurker => KindStats {
                max_health: 2,
                speed: 1.2,
                contact_damage: 0.05,
                hitbox: 0.6,
                friendly: false,
                color: 0x001a33,
                emissive: 0x0088ff,
            },
            EntityKind::Alien => KindStats {
                max_health: 5,
                speed: 0.45,
                contact_damage: 0.15,
                hitbox: 1.2,
                friendly: false,
                color: 0x1a3300,
                emissive: 0x88ff00,
            },
            EntityKind::Goo => KindStats {
                max_health: 1000,
                speed: 0.0,
                contact_damage: 0.20,
                hitbox: 2.0,
                friendly: false,
                color: 0x000000,
                emissive: 0x000000,
            },
            EntityKind::Friendly => KindStats {
                max_health: 100,
                speed: 0.6,
                contact_damage: 0.0,
                hitbox: 0.7,
                friendly: true,
                color: 0x003333,
                emissive: 0x00ffff,
            },
            EntityKind::Ugv => KindStats {
                max_health: 60,
                speed: 1.2,
                contact_damage: 0.0,
                hitbox: 3.0,
                friendly: false,
                color: 0x444444,
                emissive: 0xffa500,
            },
        }
    }

    pub fn is_friendly(&self) -> bool {
        self.stats().friendly
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Grunt => "Grunt",
            EntityKind::Lurker => "Lurker",
            EntityKind::Alien => "Alien",
            EntityKind::Goo => "Goo",
            EntityKind::Friendly => "Stranger",
            EntityKind::Ugv => "UGV",
        }
    }

    /// A random basic hostile (grunt, lurker, or alien).
    pub fn random_basic(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..3) {
            0 => EntityKind::Grunt,
            1 => EntityKind::Lurker,
            _ => EntityKind::Alien,
        }
    }
}

impl From<SpawnKind> for EntityKind {
    fn from(kind: SpawnKind) -> Self {
        match kind {
            SpawnKind::Grunt => EntityKind::Grunt,
            SpawnKind::Lurker => EntityKind::Lurker,
            SpawnKind::Alien => EntityKind::Alien,
            SpawnKind::Goo => EntityKind::Goo,
        }
    }
}

/// Cosmetic animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pose {
    #[default]
    Idle,
    Walk,
    Run,
    Attack,
    Death,
}

impl Pose {
    pub fn for_distance(distance: f32, dead: bool) -> Self {
        if dead {
            Pose::Death
        } else if distance < 2.5 {
            Pose::Attack
        } else if distance < 15.0 {
            Pose::Walk
        } else {
            Pose::Run
        }
    }
}

/// Core creature component.
#[derive(Debug, Clone)]
pub struct Creature {
    pub kind: EntityKind,
    /// Game time of the lethal hit. `None` while alive.
    pub death_time: Option<u64>,
    /// Game time of the last contact hit on the player.
    pub last_attack: Option<u64>,
    pub node: Option<NodeId>,
    pub pose: Pose,
}

impl Creature {
    pub fn new(kind: EntityKind, node: Option<NodeId>) -> Self {
        Self {
            kind,
            death_time: None,
            last_attack: None,
            node,
            pose: Pose::Idle,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.death_time.is_some()
    }
}

/// Physics hitbox handle of a live creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hitbox(pub ColliderHandle);

/// Body centre used for hit tests.
pub fn body_centre(transform: &Transform) -> Vec3 {
    transform.position + Vec3::Y * BODY_HEIGHT
}

/// Physics tag for an entity.
pub fn tag_of(entity: Entity) -> u64 {
    entity.to_bits().get()
}

/// Entity for a physics tag, if it still names one.
pub fn entity_from_tag(tag: u64) -> Option<Entity> {
    Entity::from_bits(tag)
}

fn visual(kind: EntityKind, assets: &AssetCatalog) -> NodeDesc {
    let stats = kind.stats();
    let shape = match kind {
        EntityKind::Grunt | EntityKind::Lurker if assets.has_model("zombie") => Shape::Model("zombie"),
        EntityKind::Ugv if assets.has_model("ugv") => Shape::Model("ugv"),
        EntityKind::Ugv => Shape::Cuboid {
            size: Vec3::new(3.0, 1.5, 4.0),
        },
        EntityKind::Goo => Shape::Sphere { radius: 2.0 },
        EntityKind::Alien => Shape::Sphere { radius: 1.0 },
        _ => Shape::Pillar {
            radius: stats.hitbox * 0.6,
            height: 1.8,
        },
    };
    NodeDesc::new(shape).color(stats.color)
}

/// Spawn a creature with full health at `position`.
pub fn spawn(
    registry: &mut World,
    physics: &mut PhysicsWorld,
    scene: &mut dyn Scene,
    assets: &AssetCatalog,
    rng: &mut impl Rng,
    kind: EntityKind,
    position: Vec3,
) -> Entity {
    let stats = kind.stats();
    let node = scene.add(None, visual(kind, assets).at(position));
    scene.set_uniform(node, "emissive", stats.emissive as f32);
    let transform = Transform::from_position(position);
    let entity = registry.spawn((
        Creature::new(kind, Some(node)),
        Hitpoints::new(stats.max_health),
        transform,
        Dialogue::default(),
    ));
    attach_hitbox(registry, physics, entity, body_centre(&transform), stats.hitbox);
    if kind == EntityKind::Ugv {
        if let Err(e) = registry.insert_one(entity, UgvBrain::new(position, rng)) {
            log::warn!("UGV {:?} lost its brain: {}", entity, e);
        }
    }
    entity
}

/// Add a hitbox for `entity`. If the entity is gone the collider is
/// removed again so nothing dangles in the physics world.
fn attach_hitbox(registry: &mut World, physics: &mut PhysicsWorld, entity: Entity, centre: Vec3, radius: f32) {
    let handle = physics.add_hitbox(centre, radius, tag_of(entity));
    if let Err(e) = registry.insert_one(entity, Hitbox(handle)) {
        log::warn!("Hitbox for {:?} not attached: {}", entity, e);
        physics.remove_hitbox(handle);
    }
}

/// Remove a creature with its hitbox and scene node. Returns `false` if it
/// was already gone.
pub fn despawn(registry: &mut World, physics: &mut PhysicsWorld, scene: &mut dyn Scene, entity: Entity) -> bool {
    if let Ok(creature) = registry.get::<&Creature>(entity) {
        if let Some(node) = creature.node {
            scene.remove(node);
        }
    }
    retire_hitbox(registry, physics, entity);
    registry.despawn(entity).is_ok()
}

/// Drop a dead creature's hitbox so rays pass through the body.
pub fn retire_hitbox(registry: &mut World, physics: &mut PhysicsWorld, entity: Entity) {
    if let Ok(Hitbox(handle)) = registry.remove_one::<Hitbox>(entity) {
        physics.remove_hitbox(handle);
    }
}

/// Give a respawned creature a fresh hitbox.
pub fn restore_hitbox(registry: &mut World, physics: &mut PhysicsWorld, entity: Entity) {
    let Ok((creature, transform)) = registry.query_one_mut::<(&Creature, &Transform)>(entity) else {
        log::debug!("restore_hitbox: {:?} is gone", entity);
        return;
    };
    let radius = creature.kind.stats().hitbox;
    let centre = body_centre(transform);
    retire_hitbox(registry, physics, entity);
    attach_hitbox(registry, physics, entity, centre, radius);
}

/// Keep hitboxes on top of their creatures.
pub fn sync_hitboxes(registry: &mut World, physics: &mut PhysicsWorld) {
    for (_, (transform, hitbox)) in registry.query_mut::<(&Transform, &Hitbox)>() {
        physics.move_hitbox(hitbox.0, body_centre(transform));
    }
}

/// Push creature transforms to their scene nodes.
pub fn sync_nodes(registry: &World, scene: &mut dyn Scene) {
    for (_, (creature, transform)) in registry.query::<(&Creature, &Transform)>().iter() {
        if let Some(node) = creature.node {
            scene.set_transform(node, *transform);
        }
    }
}

/// Number of creatures in the registry, dead or alive.
pub fn population(registry: &World) -> usize {
    registry.query::<&Creature>().iter().count()
}

/// Live hostiles (the UGV included).
pub fn live_hostiles(registry: &World) -> usize {
    registry
        .query::<&Creature>()
        .iter()
        .filter(|(_, c)| !c.is_dead() && !c.kind.is_friendly())
        .count()
}

/// Flat distance from `point` to the nearest live hostile.
pub fn nearest_hostile(registry: &World, point: Vec3) -> Option<f32> {
    registry
        .query::<(&Creature, &Transform)>()
        .iter()
        .filter(|(_, (c, _))| !c.is_dead() && !c.kind.is_friendly())
        .map(|(_, (_, t))| t.flat_distance(point))
        .min_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use renderer::SceneGraph;

    #[test]
    fn spawn_registers_hitbox_and_node() {
        let mut registry = World::new();
        let mut physics = PhysicsWorld::new();
        let mut scene = SceneGraph::new();
        let mut rng = StdRng::seed_from_u64(1);
        let assets = AssetCatalog::empty();
        let e = spawn(&mut registry, &mut physics, &mut scene, &assets, &mut rng, EntityKind::Alien, Vec3::new(3.0, 0.0, 4.0));

        assert_eq!(registry.get::<&Hitpoints>(e).unwrap().current(), 5);
        assert_eq!(physics.hitbox_count(), 1);
        assert_eq!(scene.len(), 1);
        let hb = registry.get::<&Hitbox>(e).unwrap().0;
        let centre = physics.hitbox_position(hb).unwrap();
        assert!((centre - Vec3::new(3.0, BODY_HEIGHT, 4.0)).length() < 1e-5);
        assert_eq!(entity_from_tag(tag_of(e)), Some(e));
    }

    #[test]
    fn ugv_gets_a_brain_and_others_do_not() {
        let mut registry = World::new();
        let mut physics = PhysicsWorld::new();
        let mut scene = SceneGraph::new();
        let mut rng = StdRng::seed_from_u64(2);
        let assets = AssetCatalog::empty();
        let ugv = spawn(&mut registry, &mut physics, &mut scene, &assets, &mut rng, EntityKind::Ugv, Vec3::ZERO);
        let grunt = spawn(&mut registry, &mut physics, &mut scene, &assets, &mut rng, EntityKind::Grunt, Vec3::ZERO);
        assert!(registry.get::<&UgvBrain>(ugv).is_ok());
        assert!(registry.get::<&UgvBrain>(grunt).is_err());
    }

    #[test]
    fn despawn_releases_everything() {
        let mut registry = World::new();
        let mut physics = PhysicsWorld::new();
        let mut scene = SceneGraph::new();
        let mut rng = StdRng::seed_from_u64(3);
        let assets = AssetCatalog::empty();
        let e = spawn(&mut registry, &mut physics, &mut scene, &assets, &mut rng, EntityKind::Friendly, Vec3::ZERO);
        assert!(despawn(&mut registry, &mut physics, &mut scene, e));
        assert!(!despawn(&mut registry, &mut physics, &mut scene, e));
        assert_eq!(physics.hitbox_count(), 0);
        assert!(scene.is_empty());
        assert_eq!(population(&registry), 0);
    }

    #[test]
    fn hitbox_for_a_vanished_entity_is_not_kept() {
        let mut registry = World::new();
        let mut physics = PhysicsWorld::new();
        let e = registry.spawn((1u8,));
        registry.despawn(e).unwrap();
        attach_hitbox(&mut registry, &mut physics, e, Vec3::ZERO, 1.0);
        assert_eq!(physics.hitbox_count(), 0);
    }

    #[test]
    fn zombie_model_replaces_primitive_when_loaded() {
        let with = AssetCatalog::empty().with_model("zombie");
        let without = AssetCatalog::empty();
        assert_eq!(visual(EntityKind::Grunt, &with).shape, Shape::Model("zombie"));
        assert!(matches!(visual(EntityKind::Grunt, &without).shape, Shape::Pillar { .. }));
    }

    #[test]
    fn pose_follows_distance_bands() {
        assert_eq!(Pose::for_distance(1.0, false), Pose::Attack);
        assert_eq!(Pose::for_distance(10.0, false), Pose::Walk);
        assert_eq!(Pose::for_distance(30.0, false), Pose::Run);
        assert_eq!(Pose::for_distance(1.0, true), Pose::Death);
    }

    #[test]
    fn nearest_hostile_ignores_friendlies_and_dead() {
        let mut registry = World::new();
        registry.spawn((Creature::new(EntityKind::Friendly, None), Transform::from_position(Vec3::new(1.0, 0.0, 0.0))));
        let mut dead = Creature::new(EntityKind::Grunt, None);
        dead.death_time = Some(5);
        registry.spawn((dead, Transform::from_position(Vec3::new(2.0, 0.0, 0.0))));
        registry.spawn((Creature::new(EntityKind::Lurker, None), Transform::from_position(Vec3::new(0.0, 0.0, 7.0))));
        assert_eq!(nearest_hostile(&registry, Vec3::new(0.0, 1.6, 0.0)), Some(7.0));
        assert_eq!(live_hostiles(&registry), 1);
    }
}
