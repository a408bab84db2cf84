//! Sound effect playback.

use anyhow::{Context, Result};
use kira::{
    manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings},
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    tween::Tween,
};
use std::collections::HashMap;
use std::path::Path;

/// Every sound effect the game triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sfx {
    Shoot,
    Railgun,
    EntityHit,
    SwordSwing,
    TentacleWhip,
    Flamethrower,
    Reload,
    Pickup,
    Walk,
    NextLevel,
    UgvShot,
    PlayerHit,
}

pub const ALL_SFX: [Sfx; 12] = [
    Sfx::Shoot,
    Sfx::Railgun,
    Sfx::EntityHit,
    Sfx::SwordSwing,
    Sfx::TentacleWhip,
    Sfx::Flamethrower,
    Sfx::Reload,
    Sfx::Pickup,
    Sfx::Walk,
    Sfx::NextLevel,
    Sfx::UgvShot,
    Sfx::PlayerHit,
];

impl Sfx {
    /// Asset name, also the file stem under the sounds directory.
    pub fn name(&self) -> &'static str {
        match self {
            Sfx::Shoot => "shoot",
            Sfx::Railgun => "railgun",
            Sfx::EntityHit => "entity_hit",
            Sfx::SwordSwing => "sword_swing",
            Sfx::TentacleWhip => "tentacle_whip",
            Sfx::Flamethrower => "flamethrower",
            Sfx::Reload => "reload",
            Sfx::Pickup => "pickup",
            Sfx::Walk => "walk",
            Sfx::NextLevel => "next_level",
            Sfx::UgvShot => "ugv_shot",
            Sfx::PlayerHit => "player_hit",
        }
    }
}

/// Fire-and-forget sound sink the game talks to.
pub trait SoundOutput {
    fn play(&mut self, sfx: Sfx) {
        self.play_with_volume(sfx, 1.0);
    }

    fn play_with_volume(&mut self, sfx: Sfx, volume: f64);

    /// Distress level in [0, 1]: 1 is healthy and sane, 0 is near death.
    fn set_distress(&mut self, _level: f32) {}

    /// Called once per tick to release finished voices.
    fn cleanup(&mut self) {}
}

/// Kira-backed sound effects.
pub struct AudioSystem {
    manager: AudioManager,
    sounds: HashMap<String, StaticSoundData>,
    active_sounds: Vec<StaticSoundHandle>,
    master_volume: f64,
}

impl AudioSystem {
    /// Create a new audio system. Fails when no output device is available.
    pub fn new() -> Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .context("failed to open audio device")?;
        Ok(Self {
            manager,
            sounds: HashMap::new(),
            active_sounds: Vec::new(),
            master_volume: 1.0,
        })
    }

    /// Load a sound from a file.
    pub fn load_sound(&mut self, name: &str, path: &Path) -> Result<()> {
        let sound_data = StaticSoundData::from_file(path)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        self.sounds.insert(name.to_string(), sound_data);
        Ok(())
    }

    /// Load every known effect from `dir/<name>.ogg`. Missing files are
    /// logged and skipped; returns the number loaded.
    pub fn load_effects(&mut self, dir: &Path) -> usize {
        let mut loaded = 0;
        for sfx in ALL_SFX {
            let path = dir.join(format!("{}.ogg", sfx.name()));
            match self.load_sound(sfx.name(), &path) {
                Ok(()) => loaded += 1,
                Err(e) => log::warn!("sound '{}' unavailable: {e:#}", sfx.name()),
            }
        }
        loaded
    }

    /// Play a named sound with volume control.
    pub fn play_named(&mut self, name: &str, volume: f64) -> Result<()> {
        if let Some(sound_data) = self.sounds.get(name) {
            let settings = StaticSoundSettings::new().volume(volume);
            let modified = sound_data.clone().with_settings(settings);
            let handle = self.manager.play(modified)?;
            self.active_sounds.push(handle);
        }
        Ok(())
    }

    /// Set master volume (0.0 to 1.0).
    pub fn set_master_volume(&mut self, volume: f64) {
        self.master_volume = volume.clamp(0.0, 1.0);
        self.apply_track_volume(self.master_volume);
    }

    fn apply_track_volume(&mut self, volume: f64) {
        let _ = self.manager.main_track().set_volume(volume, Tween::default());
    }
}

impl SoundOutput for AudioSystem {
    fn play_with_volume(&mut self, sfx: Sfx, volume: f64) {
        if let Err(e) = self.play_named(sfx.name(), volume) {
            log::debug!("play '{}' failed: {e:#}", sfx.name());
        }
    }

    fn set_distress(&mut self, level: f32) {
        // Muffle everything as the player deteriorates.
        let scale = 0.6 + 0.4 * level.clamp(0.0, 1.0) as f64;
        self.apply_track_volume(self.master_volume * scale);
    }

    fn cleanup(&mut self) {
        self.active_sounds.retain(|handle| handle.state() != kira::sound::PlaybackState::Stopped);
    }
}

/// Output chosen once at startup. When the device cannot be opened every
/// call becomes a no-op for the rest of the session.
pub enum AudioOutput {
    Kira(AudioSystem),
    Muted,
}

impl AudioOutput {
    /// Try to open the device and load effects from `sound_dir`.
    pub fn init(sound_dir: &Path, master_volume: f64) -> Self {
        match AudioSystem::new() {
            Ok(mut system) => {
                let loaded = system.load_effects(sound_dir);
                system.set_master_volume(master_volume);
                log::info!("audio ready, {loaded} effects loaded");
                AudioOutput::Kira(system)
            }
            Err(e) => {
                log::warn!("audio disabled: {e:#}");
                AudioOutput::Muted
            }
        }
    }

    pub fn is_muted(&self) -> bool {
        matches!(self, AudioOutput::Muted)
    }
}

impl SoundOutput for AudioOutput {
    fn play_with_volume(&mut self, sfx: Sfx, volume: f64) {
        if let AudioOutput::Kira(system) = self {
            system.play_with_volume(sfx, volume);
        }
    }

    fn set_distress(&mut self, level: f32) {
        if let AudioOutput::Kira(system) = self {
            system.set_distress(level);
        }
    }

    fn cleanup(&mut self) {
        if let AudioOutput::Kira(system) = self {
            system.cleanup();
        }
    }
}

/// In-memory sink that remembers what was played. Used headless and in tests.
#[derive(Debug, Default)]
pub struct RecordingSound {
    pub played: Vec<(Sfx, f64)>,
    pub distress: Option<f32>,
}

impl RecordingSound {
    pub fn count(&self, sfx: Sfx) -> usize {
        self.played.iter().filter(|(s, _)| *s == sfx).count()
    }
}

impl SoundOutput for RecordingSound {
    fn play_with_volume(&mut self, sfx: Sfx, volume: f64) {
        self.played.push((sfx, volume));
    }

    fn set_distress(&mut self, level: f32) {
        self.distress = Some(level);
    }
}
