//! Hitbox queries using Rapier3D.
//!
//! Creatures are mirrored into a collider set as spheres tagged with their
//! registry id, and hitscan weapons resolve through Rapier's query pipeline.

pub mod physics_world;
pub mod raycast;

pub use physics_world::*;
pub use raycast::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::ColliderHandle;
