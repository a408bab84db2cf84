//! Chunk streaming around the player.
//!
//! After every update the loaded set is exactly the Chebyshev neighbourhood
//! of the player's chunk. Layouts come from [`procgen::ChunkGenerator`], so
//! a chunk that unloads and reloads looks the same. Orbs already picked up
//! stay gone.

use std::collections::{HashMap, HashSet};

use engine_core::Entity;
use glam::{Quat, Vec3};
use procgen::{ChunkCoord, ChunkGenerator, ChunkLayout, PropKind, SpawnPoint};
use renderer::{NodeDesc, NodeId, Scene, Shape};

use crate::config::WorldConfig;

const ORB_COLOR: u32 = 0x00ffff;
const ORB_RADIUS: f32 = 0.3;
/// Orbs are picked up inside this distance.
pub const PICKUP_RANGE: f32 = 2.0;

/// A chunk that is currently in the scene.
#[derive(Debug)]
pub struct LoadedChunk {
    pub layout: ChunkLayout,
    pub root: NodeId,
    pub lights: Vec<NodeId>,
    /// Uncollected orbs: cell, world position, node.
    pub orbs: Vec<(u16, Vec3, NodeId)>,
    /// Creatures spawned here. Referenced, not owned.
    pub entities: Vec<Entity>,
}

/// Chunks created and disposed by one streaming pass.
#[derive(Debug, Default)]
pub struct StreamReport {
    pub created: Vec<ChunkCoord>,
    pub disposed: Vec<ChunkCoord>,
    /// Spawn points of newly created chunks, in creation order.
    pub spawns: Vec<(ChunkCoord, SpawnPoint)>,
}

pub struct ChunkManager {
    generator: ChunkGenerator,
    radius: i32,
    interval_ms: u64,
    loaded: HashMap<ChunkCoord, LoadedChunk>,
    collected: HashSet<(ChunkCoord, u16)>,
    last_update: Option<u64>,
}

impl ChunkManager {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            generator: ChunkGenerator::new(config.seed, config.chunk_size),
            radius: config.chunk_radius,
            interval_ms: config.chunk_update_interval_ms,
            loaded: HashMap::new(),
            collected: HashSet::new(),
            last_update: None,
        }
    }

    pub fn chunk_size(&self) -> f32 {
        self.generator.chunk_size
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.loaded.contains_key(&coord)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&LoadedChunk> {
        self.loaded.get(&coord)
    }

    pub fn loaded_coords(&self) -> HashSet<ChunkCoord> {
        self.loaded.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// Stream chunks if the update interval has elapsed since the last pass.
    pub fn update(&mut self, player: Vec3, now_ms: u64, scene: &mut dyn Scene) -> Option<StreamReport> {
        if let Some(last) = self.last_update {
            if now_ms.saturating_sub(last) < self.interval_ms {
                return None;
            }
        }
        self.last_update = Some(now_ms);
        Some(self.stream(player, scene))
    }

    /// Bring the loaded set in line with the player's neighbourhood now.
    pub fn stream(&mut self, player: Vec3, scene: &mut dyn Scene) -> StreamReport {
        let centre = ChunkCoord::from_world(player, self.generator.chunk_size);
        let wanted: HashSet<ChunkCoord> = centre.neighbourhood(self.radius).collect();
        let mut report = StreamReport::default();

        let stale: Vec<ChunkCoord> = self.loaded.keys().filter(|c| !wanted.contains(c)).copied().collect();
        for coord in stale {
            if let Some(chunk) = self.loaded.remove(&coord) {
                scene.remove(chunk.root);
                if !chunk.entities.is_empty() {
                    log::debug!("Chunk {:?} dropped {} creature references", coord, chunk.entities.len());
                }
                report.disposed.push(coord);
            }
        }

        let mut fresh: Vec<ChunkCoord> = wanted.into_iter().filter(|c| !self.loaded.contains_key(c)).collect();
        fresh.sort_by_key(|c| (c.chebyshev(centre), c.x, c.z));
        for coord in fresh {
            let chunk = self.build(coord, scene);
            report
                .spawns
                .extend(chunk.layout.spawns.iter().map(|s| (coord, *s)));
            self.loaded.insert(coord, chunk);
            report.created.push(coord);
        }

        if !report.created.is_empty() || !report.disposed.is_empty() {
            log::info!(
                "Chunks around {:?}: +{} -{} ({} loaded)",
                centre,
                report.created.len(),
                report.disposed.len(),
                self.loaded.len()
            );
        }
        report
    }

    fn build(&self, coord: ChunkCoord, scene: &mut dyn Scene) -> LoadedChunk {
        let layout = self.generator.generate(coord);
        let size = self.generator.chunk_size;
        let biome = layout.biome;
        let root = scene.add(None, NodeDesc::new(Shape::Group).at(layout.origin));

        scene.add(
            Some(root),
            NodeDesc::new(Shape::Plane { width: size, depth: size }).material(biome.floor_texture()),
        );

        for wall in &layout.walls {
            scene.add(
                Some(root),
                NodeDesc::new(Shape::Cuboid {
                    size: Vec3::new(wall.width, wall.height, wall.depth),
                })
                .at(wall.position)
                .rotated(Quat::from_rotation_y(wall.yaw))
                .material(biome.wall_texture()),
            );
        }

        let mut lights = Vec::with_capacity(layout.lights.len());
        for light in &layout.lights {
            let id = scene.add(
                Some(root),
                NodeDesc::new(Shape::PointLight {
                    color: light.color,
                    range: light.range,
                })
                .at(light.position),
            );
            scene.set_intensity(id, 0.0);
            lights.push(id);
        }

        for prop in &layout.props {
            let shape = match prop.kind {
                PropKind::Barrel => Shape::Pillar { radius: 0.6, height: 3.0 },
                PropKind::Crate => Shape::Cuboid { size: Vec3::splat(1.2) },
            };
            scene.add(Some(root), NodeDesc::new(shape).at(prop.position).color(0x5a4a3a));
        }

        let mut orbs = Vec::new();
        for orb in &layout.orbs {
            if self.collected.contains(&(coord, orb.cell)) {
                continue;
            }
            let id = scene.add(
                Some(root),
                NodeDesc::new(Shape::Sphere { radius: ORB_RADIUS }).at(orb.position).color(ORB_COLOR),
            );
            orbs.push((orb.cell, layout.origin + orb.position, id));
        }

        if let Some(spot) = layout.landmark {
            scene.add(
                Some(root),
                NodeDesc::new(Shape::Spire { radius: 1.5, height: 6.0 }).at(spot).color(0x222222),
            );
        }

        LoadedChunk {
            layout,
            root,
            lights,
            orbs,
            entities: Vec::new(),
        }
    }

    /// Record a creature spawned by `coord`.
    pub fn adopt(&mut self, coord: ChunkCoord, entity: Entity) {
        match self.loaded.get_mut(&coord) {
            Some(chunk) => chunk.entities.push(entity),
            None => log::debug!("adopt: chunk {:?} not loaded", coord),
        }
    }

    /// Forget `entity` in whichever chunk spawned it.
    pub fn release(&mut self, entity: Entity) {
        for chunk in self.loaded.values_mut() {
            chunk.entities.retain(|&e| e != entity);
        }
    }

    /// Chunk that spawned `entity`, if it is still loaded.
    pub fn owner_of(&self, entity: Entity) -> Option<ChunkCoord> {
        self.loaded
            .iter()
            .find(|(_, chunk)| chunk.entities.contains(&entity))
            .map(|(coord, _)| *coord)
    }

    /// Pick up orbs within reach. Returns how many were collected.
    pub fn collect_orbs(&mut self, player: Vec3, scene: &mut dyn Scene) -> u32 {
        let mut count = 0;
        for (coord, chunk) in self.loaded.iter_mut() {
            chunk.orbs.retain(|&(cell, pos, node)| {
                if pos.distance(player) >= PICKUP_RANGE {
                    return true;
                }
                scene.remove(node);
                self.collected.insert((*coord, cell));
                count += 1;
                false
            });
        }
        count
    }

    /// Flicker chunk lights around `base` intensity.
    pub fn animate_lights(&self, seconds: f32, base: f32, scene: &mut dyn Scene) {
        for chunk in self.loaded.values() {
            for (i, &light) in chunk.lights.iter().enumerate() {
                let phase = seconds * 3.0 + i as f32 * 1.7 + chunk.layout.coord.x as f32;
                scene.set_intensity(light, base * (0.8 + 0.2 * phase.sin()));
            }
        }
    }

    /// Remove every chunk (level change).
    pub fn clear(&mut self, scene: &mut dyn Scene) {
        for (_, chunk) in self.loaded.drain() {
            scene.remove(chunk.root);
        }
        self.last_update = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::SceneGraph;

    fn manager() -> ChunkManager {
        ChunkManager::new(&WorldConfig::default())
    }

    fn expected(player: Vec3) -> HashSet<ChunkCoord> {
        ChunkCoord::from_world(player, 60.0).neighbourhood(2).collect()
    }

    #[test]
    fn loaded_set_matches_neighbourhood_after_every_move() {
        let mut m = manager();
        let mut scene = SceneGraph::new();
        let path = [
            Vec3::ZERO,
            Vec3::new(61.0, 0.0, 0.0),
            Vec3::new(-130.0, 0.0, 45.0),
            Vec3::new(-130.0, 0.0, 400.0),
            Vec3::new(-59.9, 0.0, -0.1),
        ];
        for p in path {
            m.stream(p, &mut scene);
            assert_eq!(m.loaded_coords(), expected(p), "at {p:?}");
        }
        assert_eq!(m.len(), 25);
    }

    #[test]
    fn disposal_releases_scene_nodes() {
        let mut m = manager();
        let mut scene = SceneGraph::new();
        m.stream(Vec3::ZERO, &mut scene);
        let first = scene.len();
        let report = m.stream(Vec3::new(10_000.0, 0.0, 0.0), &mut scene);
        assert_eq!(report.disposed.len(), 25);
        assert_eq!(report.created.len(), 25);
        assert!(scene.released as usize >= first);
        m.clear(&mut scene);
        assert!(scene.is_empty());
    }

    #[test]
    fn update_is_rate_limited() {
        let mut m = manager();
        let mut scene = SceneGraph::new();
        assert!(m.update(Vec3::ZERO, 0, &mut scene).is_some());
        assert!(m.update(Vec3::new(500.0, 0.0, 0.0), 499, &mut scene).is_none());
        assert!(m.is_loaded(ChunkCoord::new(0, 0)));
        assert!(m.update(Vec3::new(500.0, 0.0, 0.0), 500, &mut scene).is_some());
        assert!(!m.is_loaded(ChunkCoord::new(0, 0)));
    }

    #[test]
    fn reloaded_chunk_has_identical_layout() {
        let mut m = manager();
        let mut scene = SceneGraph::new();
        m.stream(Vec3::ZERO, &mut scene);
        let before = m.get(ChunkCoord::new(1, 1)).unwrap().layout.clone();
        m.stream(Vec3::new(5_000.0, 0.0, 5_000.0), &mut scene);
        m.stream(Vec3::ZERO, &mut scene);
        assert_eq!(m.get(ChunkCoord::new(1, 1)).unwrap().layout, before);
    }

    #[test]
    fn lights_start_dark() {
        let mut m = manager();
        let mut scene = SceneGraph::new();
        m.stream(Vec3::ZERO, &mut scene);
        for coord in m.loaded_coords() {
            for &light in &m.get(coord).unwrap().lights {
                assert_eq!(scene.get(light).unwrap().intensity, 0.0);
            }
        }
    }

    /// Find a loaded orb by scanning far enough to hit one.
    fn find_orb(m: &mut ChunkManager, scene: &mut SceneGraph) -> Option<(ChunkCoord, Vec3)> {
        for step in 0..200 {
            let p = Vec3::new(step as f32 * 300.0, 0.0, 0.0);
            m.stream(p, scene);
            for coord in m.loaded_coords() {
                if let Some(&(_, pos, _)) = m.get(coord).unwrap().orbs.first() {
                    return Some((coord, pos));
                }
            }
        }
        None
    }

    #[test]
    fn collected_orbs_stay_collected_after_reload() {
        let mut m = manager();
        let mut scene = SceneGraph::new();
        let (coord, pos) = find_orb(&mut m, &mut scene).expect("an orb somewhere along the strip");
        let before = m.get(coord).unwrap().orbs.len();
        assert!(m.collect_orbs(pos, &mut scene) >= 1);
        assert_eq!(m.get(coord).unwrap().orbs.len(), before - 1);

        let player_chunk_origin = coord.origin(60.0);
        m.stream(player_chunk_origin + Vec3::new(10_000.0, 0.0, 0.0), &mut scene);
        m.stream(player_chunk_origin, &mut scene);
        let chunk = m.get(coord).unwrap();
        assert_eq!(chunk.orbs.len(), before - 1);
        assert_eq!(chunk.layout.orbs.len(), before, "layout itself is unchanged");
    }

    #[test]
    fn adopt_tracks_entities_per_chunk() {
        let mut m = manager();
        let mut scene = SceneGraph::new();
        m.stream(Vec3::ZERO, &mut scene);
        let mut world = hecs::World::new();
        let e = world.spawn((1u8,));
        m.adopt(ChunkCoord::new(0, 0), e);
        m.adopt(ChunkCoord::new(99, 99), e);
        assert_eq!(m.get(ChunkCoord::new(0, 0)).unwrap().entities, vec![e]);
        assert_eq!(m.owner_of(e), Some(ChunkCoord::new(0, 0)));
        m.release(e);
        assert!(m.get(ChunkCoord::new(0, 0)).unwrap().entities.is_empty());
        assert_eq!(m.owner_of(e), None);
    }

    #[test]
    fn walls_are_built_with_their_footprint() {
        let mut m = manager();
        let mut scene = SceneGraph::new();
        m.stream(Vec3::ZERO, &mut scene);
        let chunk = m
            .loaded_coords()
            .into_iter()
            .filter_map(|c| m.get(c))
            .find(|c| !c.layout.walls.is_empty())
            .expect("some wall in the starting neighbourhood");
        let sizes: Vec<Vec3> = scene
            .get(chunk.root)
            .unwrap()
            .children
            .iter()
            .filter_map(|&id| match scene.get(id).unwrap().desc.shape {
                Shape::Cuboid { size } => Some(size),
                _ => None,
            })
            .collect();
        for wall in &chunk.layout.walls {
            let footprint = Vec3::new(wall.width, wall.height, wall.depth);
            assert!(sizes.contains(&footprint), "{footprint:?} missing");
        }
    }
}
