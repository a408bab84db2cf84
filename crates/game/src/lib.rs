//! Liminal game core: a first-person horror loop over streamed procedural
//! chunks, hostile creatures, weapons, and timed world events.
//!
//! The core never draws, plays, or speaks anything itself. Each tick it
//! calls into the [`renderer::Scene`], [`audio::SoundOutput`],
//! [`audio::Voice`] and [`Hud`] collaborators bundled in [`Io`].

pub mod assets;
pub mod chunks;
pub mod combat;
pub mod config;
pub mod controls;
pub mod creature;
pub mod dialogue;
pub mod events;
pub mod horde_ai;
pub mod hud;
pub mod level;
pub mod nightvision;
pub mod player;
pub mod projectiles;
pub mod session;
pub mod state;
pub mod truck;
pub mod ugv;
pub mod update;
pub mod vitals;
pub mod weapons;

#[cfg(test)]
pub(crate) mod testing;

pub use config::GameConfig;
pub use hud::{Hud, HudFrame, HudLog};
pub use session::Session;
pub use state::{GamePhase, GameState, Io};
