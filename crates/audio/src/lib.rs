//! Audio for Liminal: fire-and-forget sound effects through Kira and a
//! serialized speech queue for creature dialogue.

pub mod sound;
pub mod speech;

pub use sound::*;
pub use speech::*;

// Re-export for convenience
pub use kira;
