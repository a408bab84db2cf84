//! Deterministic chunk layouts.
//!
//! A chunk is a square tile of the world addressed by integer coordinates.
//! Everything placed inside it (pillars, lights, props, orbs, spawn points) is
//! a pure function of the coordinate and the world seed, so generating the
//! same chunk twice yields the same layout.

use glam::Vec3;

use crate::biome::{Biome, BiomeMap};
use crate::hash::WorldHash;

/// Integer chunk coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing a world position (floor division).
    pub fn from_world(position: Vec3, chunk_size: f32) -> Self {
        Self {
            x: (position.x / chunk_size).floor() as i32,
            z: (position.z / chunk_size).floor() as i32,
        }
    }

    /// Chebyshev distance in chunks.
    pub fn chebyshev(&self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// World-space origin of the chunk group.
    pub fn origin(&self, chunk_size: f32) -> Vec3 {
        Vec3::new(self.x as f32 * chunk_size, 0.0, self.z as f32 * chunk_size)
    }

    /// Every coordinate within `radius` (Chebyshev) of this one.
    pub fn neighbourhood(&self, radius: i32) -> impl Iterator<Item = ChunkCoord> + '_ {
        (-radius..=radius)
            .flat_map(move |dx| (-radius..=radius).map(move |dz| ChunkCoord::new(self.x + dx, self.z + dz)))
    }
}

/// Probability cut-offs for each content type. A cell gets the content when
/// its hash exceeds the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub wall: f32,
    pub light: f32,
    pub spawn: f32,
    pub prop: f32,
    /// Above: barrel, below: crate.
    pub prop_kind: f32,
    pub collectible: f32,
    pub landmark: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            wall: 0.8,
            light: 0.98,
            spawn: 0.995,
            prop: 0.97,
            prop_kind: 0.5,
            collectible: 0.997,
            landmark: 0.995,
        }
    }
}

/// Creature rolled at a spawn point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnKind {
    Grunt,
    Lurker,
    Alien,
    Goo,
}

/// A wall pillar, positioned relative to the chunk origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallPillar {
    pub position: Vec3,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpot {
    pub position: Vec3,
    pub color: u32,
    pub range: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Barrel,
    Crate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prop {
    pub kind: PropKind,
    pub position: Vec3,
}

/// A collectible orb. `cell` identifies it within its chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orb {
    pub cell: u16,
    pub position: Vec3,
}

/// Spawn point in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub kind: SpawnKind,
    pub position: Vec3,
}

/// Everything generated for one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkLayout {
    pub coord: ChunkCoord,
    pub origin: Vec3,
    pub biome: Biome,
    pub walls: Vec<WallPillar>,
    pub lights: Vec<LightSpot>,
    pub props: Vec<Prop>,
    pub orbs: Vec<Orb>,
    pub spawns: Vec<SpawnPoint>,
    /// Local position of the landmark spire, if this chunk has one.
    pub landmark: Option<Vec3>,
}

const LIGHT_COLOR: u32 = 0xffee88;
const LIGHT_HEIGHT: f32 = 3.5;
const LIGHT_RANGE: f32 = 10.0;

/// Pure chunk generator.
#[derive(Debug)]
pub struct ChunkGenerator {
    pub chunk_size: f32,
    /// Grid cell size inside a chunk.
    pub step: i32,
    pub thresholds: Thresholds,
    hash: WorldHash,
    biomes: BiomeMap,
}

impl ChunkGenerator {
    pub fn new(seed: u32, chunk_size: f32) -> Self {
        Self {
            chunk_size,
            step: 12,
            thresholds: Thresholds::default(),
            hash: WorldHash::new(seed),
            biomes: BiomeMap::from_seed(seed),
        }
    }

    /// Generate the layout of one chunk.
    pub fn generate(&self, coord: ChunkCoord) -> ChunkLayout {
        let h = &self.hash;
        let t = &self.thresholds;
        let (cx, cz) = (coord.x, coord.z);
        let origin = coord.origin(self.chunk_size);
        let half = (self.chunk_size * 0.5) as i32;
        let step = self.step;
        let span = (step - 4) as f32;
        let cells_per_row = ((2 * half + step - 1) / step).max(1);

        let centre = origin + Vec3::new(self.chunk_size * 0.5, 0.0, self.chunk_size * 0.5);
        let mut layout = ChunkLayout {
            coord,
            origin,
            biome: self.biomes.sample_at(centre.x as f64, centre.z as f64),
            walls: Vec::new(),
            lights: Vec::new(),
            props: Vec::new(),
            orbs: Vec::new(),
            spawns: Vec::new(),
            landmark: None,
        };

        for (i, ox) in (-half..half).step_by(step as usize).enumerate() {
            for (j, oz) in (-half..half).step_by(step as usize).enumerate() {
                let (fx, fz) = (ox as f32, oz as f32);

                // ── Wall pillars ────────────────────────────────────────
                if h.at(cx + ox, cz + oz) > t.wall {
                    let width = 2.0 + h.salted(cx + ox, cz + oz, 3) * span;
                    let depth = 2.0 + h.salted(cx + oz, cz + ox, 4) * span;
                    let height = 4.0 + (h.at(cx + oz, cz + ox) * 8.0).floor();
                    let x = fx + (h.salted(cx + ox, cz + oz, 1) - 0.5) * (step as f32 - width);
                    let z = fz + (h.salted(cz + oz, cx + ox, 2) - 0.5) * (step as f32 - depth);
                    layout.walls.push(WallPillar {
                        position: Vec3::new(x, height * 0.5, z),
                        width,
                        depth,
                        height,
                        yaw: (h.at(ox, oz) - 0.5) * std::f32::consts::PI * 0.25,
                    });
                }

                // ── Lights ──────────────────────────────────────────────
                if h.at(cx + ox * 7, cz + oz * 11) > t.light {
                    layout.lights.push(LightSpot {
                        position: Vec3::new(fx, LIGHT_HEIGHT, fz),
                        color: LIGHT_COLOR,
                        range: LIGHT_RANGE,
                    });
                }

                // ── Spawns, otherwise props ─────────────────────────────
                if h.at(cx * 3 + ox, cz * 5 + oz) > t.spawn {
                    layout.spawns.push(SpawnPoint {
                        kind: self.roll_spawn_kind(ox, oz),
                        position: Vec3::new(
                            origin.x + fx + h.at(ox, oz) * 2.0,
                            0.0,
                            origin.z + fz + h.at(oz, ox) * 2.0,
                        ),
                    });
                } else if h.salted(cx * 7 + ox, cz * 13 + oz, 9) > t.prop {
                    let kind = if h.salted(cx * 7 + ox, cz * 13 + oz, 10) > t.prop_kind {
                        PropKind::Barrel
                    } else {
                        PropKind::Crate
                    };
                    let y = match kind {
                        PropKind::Barrel => 1.5,
                        PropKind::Crate => 0.6,
                    };
                    layout.props.push(Prop {
                        kind,
                        position: Vec3::new(fx, y, fz),
                    });
                }

                // ── Collectibles ────────────────────────────────────────
                if h.at(cx * 11 + ox, cz * 17 + oz) > t.collectible {
                    layout.orbs.push(Orb {
                        cell: (i as i32 * cells_per_row + j as i32) as u16,
                        position: Vec3::new(
                            fx + h.at(ox, oz) * 0.5,
                            1.0 + h.at(ox + 1, oz + 1) * 0.5,
                            fz + h.at(oz, ox) * 0.5,
                        ),
                    });
                }
            }
        }

        if h.at(cx, cz) > t.landmark {
            layout.landmark = Some(Vec3::new(0.0, 3.0, 0.0));
        }

        log::debug!(
            "Generated chunk {:?} ({:?}): {} walls, {} lights, {} orbs, {} spawns",
            coord,
            layout.biome,
            layout.walls.len(),
            layout.lights.len(),
            layout.orbs.len(),
            layout.spawns.len()
        );
        layout
    }

    /// Weighted creature choice: 30% goo, 20% alien, the rest split between
    /// the two grunt variants. Nested thresholds keep it reproducible from the
    /// cell offsets alone.
    fn roll_spawn_kind(&self, ox: i32, oz: i32) -> SpawnKind {
        let roll = self.hash.salted(ox, oz, 5);
        if roll < 0.3 {
            SpawnKind::Goo
        } else if roll < 0.5 {
            SpawnKind::Alien
        } else if (self.hash.salted(ox, oz, 6) * 2.0).floor() as i32 == 0 {
            SpawnKind::Grunt
        } else {
            SpawnKind::Lurker
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> ChunkGenerator {
        ChunkGenerator::new(0, 60.0)
    }

    /// Same coordinate and seed must produce an identical layout.
    #[test]
    fn chunk_layout_deterministic_same_coord() {
        let gen = generator();
        for x in -6..6 {
            for z in -6..6 {
                let coord = ChunkCoord::new(x, z);
                assert_eq!(gen.generate(coord), gen.generate(coord), "chunk {coord:?} differs");
            }
        }
    }

    #[test]
    fn separate_generators_agree() {
        let a = ChunkGenerator::new(1234, 60.0);
        let b = ChunkGenerator::new(1234, 60.0);
        let coord = ChunkCoord::new(-17, 42);
        assert_eq!(a.generate(coord), b.generate(coord));
    }

    #[test]
    fn neighbouring_chunks_differ() {
        let gen = generator();
        let base = gen.generate(ChunkCoord::new(0, 0));
        let differs = (1..20).any(|x| gen.generate(ChunkCoord::new(x, 0)).walls != base.walls);
        assert!(differs, "walls should vary across coordinates");
    }

    #[test]
    fn walls_stay_near_their_cell() {
        let gen = generator();
        for x in -10..10 {
            let layout = gen.generate(ChunkCoord::new(x, x * 3));
            for wall in &layout.walls {
                // Jitter never pushes a pillar centre more than half a cell out.
                assert!(wall.position.x.abs() <= 36.0, "{wall:?}");
                assert!(wall.position.z.abs() <= 36.0, "{wall:?}");
                assert!((4.0..12.0).contains(&wall.height));
                assert_eq!(wall.position.y, wall.height * 0.5);
            }
        }
    }

    #[test]
    fn grid_has_twenty_five_cells() {
        let gen = generator();
        let cells = (-30..30).step_by(gen.step as usize).count();
        assert_eq!(cells, 5);
    }

    #[test]
    fn spawn_points_lie_in_world_space_near_their_chunk() {
        let gen = generator();
        let mut seen = 0;
        for x in -40..40 {
            for z in -40..40 {
                let layout = gen.generate(ChunkCoord::new(x, z));
                for spawn in &layout.spawns {
                    seen += 1;
                    let local = spawn.position - layout.origin;
                    assert!(local.x >= -30.0 && local.x <= 32.0, "{spawn:?}");
                    assert!(local.z >= -30.0 && local.z <= 32.0, "{spawn:?}");
                }
            }
        }
        assert!(seen > 0, "a 80x80 area should contain at least one spawn");
    }

    #[test]
    fn chunk_coord_uses_floor_division() {
        assert_eq!(ChunkCoord::from_world(Vec3::new(-0.1, 0.0, 59.9), 60.0), ChunkCoord::new(-1, 0));
        assert_eq!(ChunkCoord::from_world(Vec3::new(60.0, 0.0, -60.0), 60.0), ChunkCoord::new(1, -1));
    }

    #[test]
    fn neighbourhood_is_a_square() {
        let centre = ChunkCoord::new(3, -2);
        let cells: Vec<_> = centre.neighbourhood(2).collect();
        assert_eq!(cells.len(), 25);
        assert!(cells.iter().all(|c| c.chebyshev(centre) <= 2));
    }
}
