//! Game configuration (world, player, audio, events). Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// World streaming and population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Seed folded into every placement hash. 0 reproduces the reference world.
    #[serde(default)]
    pub seed: u32,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: f32,
    /// Chebyshev radius of loaded chunks around the player.
    #[serde(default = "default_chunk_radius")]
    pub chunk_radius: i32,
    #[serde(default = "default_chunk_interval")]
    pub chunk_update_interval_ms: u64,
    /// Chunk spawns are skipped once the registry holds this many creatures.
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,
}

fn default_chunk_size() -> f32 {
    60.0
}
fn default_chunk_radius() -> i32 {
    2
}
fn default_chunk_interval() -> u64 {
    500
}
fn default_max_entities() -> usize {
    64
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            chunk_size: default_chunk_size(),
            chunk_radius: default_chunk_radius(),
            chunk_update_interval_ms: default_chunk_interval(),
            max_entities: default_max_entities(),
        }
    }
}

/// Movement and look.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Walking speed in units per second.
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default = "default_aim_sensitivity")]
    pub aim_sensitivity: f32,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_aim_fov")]
    pub aim_fov: f32,
}

fn default_move_speed() -> f32 {
    7.2
}
fn default_sensitivity() -> f32 {
    0.002
}
fn default_aim_sensitivity() -> f32 {
    0.001
}
fn default_fov() -> f32 {
    60.0
}
fn default_aim_fov() -> f32 {
    45.0
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: default_move_speed(),
            sensitivity: default_sensitivity(),
            aim_sensitivity: default_aim_sensitivity(),
            fov: default_fov(),
            aim_fov: default_aim_fov(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_volume")]
    pub master_volume: f64,
    #[serde(default)]
    pub muted: bool,
    #[serde(default = "default_sound_dir")]
    pub sound_dir: PathBuf,
}

fn default_volume() -> f64 {
    0.8
}
fn default_sound_dir() -> PathBuf {
    PathBuf::from("assets/sounds")
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: default_volume(),
            muted: false,
            sound_dir: default_sound_dir(),
        }
    }
}

/// Random world event rolls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// Chance per tick to consider an event while none is active.
    #[serde(default = "default_trigger_chance")]
    pub trigger_chance: f64,
    /// Chance a considered event actually starts.
    #[serde(default = "default_accept_chance")]
    pub accept_chance: f64,
}

fn default_trigger_chance() -> f64 {
    0.001
}
fn default_accept_chance() -> f64 {
    0.3
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            trigger_chance: default_trigger_chance(),
            accept_chance: default_accept_chance(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Player takes no health damage.
    #[serde(default)]
    pub god_mode: bool,
}

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub events: EventConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    /// Root directory for models and textures.
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from("assets")
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&data)
    }

    pub fn from_ron(data: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(data)?)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Save current config to `config.ron`.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path();
        let s = self.to_ron()?;
        std::fs::write(&path, s).map_err(|source| ConfigError::Io { path, source })
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}
