//! Biome regions for the chunked world.
//!
//! A low-frequency Perlin field assigns each chunk one of five biomes. The
//! biome only affects presentation (fog colour and texture names); placement
//! always comes from the seeded hash so layouts stay reproducible.

use noise::{NoiseFn, Perlin};

/// Biomes the world can be carved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Biome {
    /// Yellowed office corridors.
    Backrooms,
    /// Waterlogged concrete.
    Flooded,
    /// Blood-red organic growth.
    Crimson,
    /// Overgrown brick.
    Ruins,
    /// Near-black emptiness.
    Void,
}

pub const ALL_BIOMES: [Biome; 5] = [
    Biome::Backrooms,
    Biome::Flooded,
    Biome::Crimson,
    Biome::Ruins,
    Biome::Void,
];

impl Biome {
    pub fn name(&self) -> &'static str {
        match self {
            Biome::Backrooms => "BACKROOMS",
            Biome::Flooded => "FLOODED",
            Biome::Crimson => "CRIMSON",
            Biome::Ruins => "RUINS",
            Biome::Void => "VOID",
        }
    }

    /// Fog colour as packed 0xRRGGBB.
    pub fn fog_color(&self) -> u32 {
        match self {
            Biome::Backrooms => 0x9c8f6f,
            Biome::Flooded => 0x1a3d4a,
            Biome::Crimson => 0x4d0000,
            Biome::Ruins => 0x5a6e5a,
            Biome::Void => 0x050505,
        }
    }

    pub fn wall_texture(&self) -> &'static str {
        match self {
            Biome::Backrooms => "Wallpaper",
            Biome::Flooded => "Concrete",
            Biome::Crimson => "Flesh",
            Biome::Ruins => "Bricks",
            Biome::Void => "Void",
        }
    }

    pub fn floor_texture(&self) -> &'static str {
        match self {
            Biome::Backrooms => "Carpet",
            Biome::Flooded => "Water",
            Biome::Crimson => "FleshFloor",
            Biome::Ruins => "Grass",
            Biome::Void => "Void",
        }
    }
}

/// Derive a Perlin seed from a world seed so that different worlds get
/// different region shapes while seed 0 stays fixed.
#[inline]
fn region_noise_seed(seed: u32) -> u32 {
    ((seed as u64).wrapping_mul(0x9e3779b97f4a7c15_u64) >> 32) as u32
}

/// Noise-based biome sampler.
pub struct BiomeMap {
    noise: Perlin,
    /// Lower = larger regions.
    pub region_scale: f64,
}

impl BiomeMap {
    pub fn from_seed(seed: u32) -> Self {
        Self {
            noise: Perlin::new(region_noise_seed(seed)),
            region_scale: 0.004,
        }
    }

    /// Biome at a world (x, z) position.
    pub fn sample_at(&self, x: f64, z: f64) -> Biome {
        let val = self.noise.get([x * self.region_scale, z * self.region_scale]);
        // Map noise [-1, 1] to [0, n)
        let n = ALL_BIOMES.len();
        let mapped = ((val * 0.5 + 0.5) * n as f64).clamp(0.0, (n - 1) as f64);
        ALL_BIOMES[mapped.floor() as usize]
    }
}

impl std::fmt::Debug for BiomeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiomeMap")
            .field("region_scale", &self.region_scale)
            .finish()
    }
}
