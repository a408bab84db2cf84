//! Presentation boundary for Liminal.
//!
//! Gameplay code talks to a [`Scene`] and never learns how drawing happens.
//! [`SceneGraph`] is the retained, headless implementation used by the
//! terminal driver and by tests.

pub mod camera;
pub mod scene;
pub mod theme;

pub use camera::*;
pub use scene::*;
pub use theme::*;
