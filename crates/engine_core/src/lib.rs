//! Core engine types shared by every Liminal crate.
//!
//! This crate provides the foundational types used across all game systems:
//! - Transform and spatial helpers
//! - The pausable game clock
//! - Common component types for the entity registry

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Quat, Vec2, Vec3};
pub use hecs::{Entity, World};
