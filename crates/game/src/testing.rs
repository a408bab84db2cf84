//! Test rig: a bare game state with recording collaborators and a manual clock.

use std::time::Duration;

use audio::{CaptionVoice, RecordingSound};
use engine_core::{Entity, GameClock};
use glam::Vec3;
use input::FrameInput;
use rand::rngs::StdRng;
use rand::SeedableRng;
use renderer::SceneGraph;

use crate::assets::AssetCatalog;
use crate::combat;
use crate::config::GameConfig;
use crate::creature::EntityKind;
use crate::hud::HudLog;
use crate::projectiles::{self, Projectile};
use crate::state::{GameState, Io};
use crate::update;

const STEP_MS: u64 = 16;
/// Largest step the clock accepts in one advance.
const MAX_STEP_MS: u64 = 250;

/// No level, no chunk spawns, no random events: only what a test adds.
pub struct Rig {
    pub state: GameState,
    pub scene: SceneGraph,
    pub audio: RecordingSound,
    pub voice: CaptionVoice,
    pub hud: HudLog,
    pub clock: GameClock,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_assets(AssetCatalog::empty())
    }

    pub fn with_assets(assets: AssetCatalog) -> Self {
        let mut config = GameConfig::default();
        config.world.max_entities = 0;
        config.events.trigger_chance = 0.0;
        Self {
            state: GameState::new(config, assets, StdRng::seed_from_u64(7)),
            scene: SceneGraph::new(),
            audio: RecordingSound::default(),
            voice: CaptionVoice,
            hud: HudLog::default(),
            clock: GameClock::new(),
        }
    }

    pub fn parts(&mut self) -> (&mut GameState, Io<'_>) {
        (
            &mut self.state,
            Io {
                scene: &mut self.scene,
                audio: &mut self.audio,
                voice: &mut self.voice,
                hud: &mut self.hud,
            },
        )
    }

    pub fn spawn(&mut self, kind: EntityKind, position: Vec3) -> Entity {
        self.state.spawn_creature(&mut self.scene, kind, position)
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Move game time forward without running any system.
    pub fn advance_ms(&mut self, ms: u64) {
        let mut remaining = ms;
        while remaining > 0 {
            let step = remaining.min(MAX_STEP_MS);
            self.clock.advance(Duration::from_millis(step));
            remaining -= step;
        }
    }

    /// One gameplay tick of `ms` with no input.
    pub fn tick_ms(&mut self, ms: u64) {
        self.step(ms, &FrameInput::default());
    }

    /// One 16 ms gameplay tick with `input`.
    pub fn tick_with(&mut self, input: FrameInput) {
        self.step(STEP_MS, &input);
    }

    /// Gameplay ticks of 16 ms until `ms` has passed.
    pub fn run_for_ms(&mut self, ms: u64) {
        let mut remaining = ms;
        while remaining > 0 {
            let step = remaining.min(STEP_MS);
            self.tick_ms(step);
            remaining -= step;
        }
    }

    /// Drop a stationary player projectile at `position`.
    pub fn fire_at(&mut self, position: Vec3) {
        let p = Projectile::bullet(position, Vec3::ZERO, 10);
        projectiles::spawn(&mut self.state.projectiles, &mut self.scene, p, 0xffff00);
    }

    /// Resolve projectile hits at the current time.
    pub fn resolve(&mut self) {
        let now = self.now();
        let (state, mut io) = self.parts();
        projectiles::resolve_hits(state, &mut io, now);
    }

    /// Squeeze (or hold) the trigger at the current time.
    pub fn trigger(&mut self, pressed: bool, held: bool) {
        let tick = self.clock.tick();
        let (state, mut io) = self.parts();
        combat::handle_trigger(state, &mut io, pressed, held, &tick);
    }

    fn step(&mut self, ms: u64, input: &FrameInput) {
        let Some(tick) = self.clock.advance(Duration::from_millis(ms.min(MAX_STEP_MS))) else {
            return;
        };
        let (state, mut io) = self.parts();
        update::gameplay(state, &mut io, input, &tick);
    }
}
