//! Procedural generation for the chunked world: the seeded hash, chunk
//! layouts, and biome regions.

pub mod biome;
pub mod chunk;
pub mod hash;

pub use biome::*;
pub use chunk::*;
pub use hash::*;
