//! A running game: state, clock, input, and the installed collaborators.

use std::time::Duration;

use audio::{SoundOutput, Voice};
use engine_core::{GameClock, Tick};
use input::{Action, Bindings, FrameInput, InputState};
use renderer::Scene;

use crate::hud::Hud;
use crate::state::{GamePhase, GameState, Io};
use crate::update;

pub struct Session {
    pub state: GameState,
    pub clock: GameClock,
    pub input: InputState,
    pub bindings: Bindings,
    scene: Box<dyn Scene>,
    audio: Box<dyn SoundOutput>,
    voice: Box<dyn Voice>,
    hud: Box<dyn Hud>,
}

impl Session {
    pub fn new(
        state: GameState,
        scene: Box<dyn Scene>,
        audio: Box<dyn SoundOutput>,
        voice: Box<dyn Voice>,
        hud: Box<dyn Hud>,
    ) -> Self {
        Self {
            state,
            clock: GameClock::new(),
            input: InputState::new(),
            bindings: Bindings::default(),
            scene,
            audio,
            voice,
            hud,
        }
    }

    /// Build the first level. Call once before stepping.
    pub fn start(&mut self) {
        let mut io = Io {
            scene: self.scene.as_mut(),
            audio: self.audio.as_mut(),
            voice: self.voice.as_mut(),
            hud: self.hud.as_mut(),
        };
        self.state.start(&mut io);
    }

    /// Advance by the wall-clock time since the previous frame.
    pub fn frame(&mut self) -> Option<Tick> {
        let input = self.input.take_frame(&self.bindings);
        self.handle_pause(&input);
        let tick = self.clock.update()?;
        self.run(&input, &tick);
        Some(tick)
    }

    /// Advance by a fixed step. Used headless and in tests.
    pub fn step(&mut self, delta: Duration) -> Option<Tick> {
        let input = self.input.take_frame(&self.bindings);
        self.handle_pause(&input);
        let tick = self.clock.advance(delta)?;
        self.run(&input, &tick);
        Some(tick)
    }

    pub fn is_paused(&self) -> bool {
        self.state.phase == GamePhase::Paused
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == GamePhase::Dead
    }

    /// Pause or resume. Game time stops while paused, so no timer runs.
    pub fn toggle_pause(&mut self) {
        match self.state.phase {
            GamePhase::Playing => {
                self.clock.pause();
                self.state.phase = GamePhase::Paused;
                self.input.release_all();
                self.audio.set_distress(0.0);
                log::info!("Paused at {} ms", self.clock.now_ms());
            }
            GamePhase::Paused => {
                self.clock.resume();
                self.state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            GamePhase::Dead => {}
        }
    }

    fn handle_pause(&mut self, input: &FrameInput) {
        if input.triggered(Action::TogglePause) {
            self.toggle_pause();
        }
    }

    fn run(&mut self, input: &FrameInput, tick: &Tick) {
        let mut io = Io {
            scene: self.scene.as_mut(),
            audio: self.audio.as_mut(),
            voice: self.voice.as_mut(),
            hud: self.hud.as_mut(),
        };
        update::gameplay(&mut self.state, &mut io, input, tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetCatalog;
    use crate::config::GameConfig;
    use crate::hud::HudLog;
    use audio::{CaptionVoice, RecordingSound};
    use input::{ElementState, KeyCode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use renderer::SceneGraph;

    fn session() -> Session {
        let mut config = GameConfig::default();
        config.events.trigger_chance = 0.0;
        let state = GameState::new(config, AssetCatalog::empty(), StdRng::seed_from_u64(3));
        Session::new(
            state,
            Box::new(SceneGraph::new()),
            Box::new(RecordingSound::default()),
            Box::new(CaptionVoice),
            Box::new(HudLog::default()),
        )
    }

    const STEP: Duration = Duration::from_millis(16);

    #[test]
    fn start_builds_the_level() {
        let mut s = session();
        s.start();
        assert!(s.state.level.portal.is_some());
        assert!(!s.state.chunks.is_empty());
        assert!(s.step(STEP).is_some());
    }

    #[test]
    fn pausing_freezes_game_time_and_timers() {
        let mut s = session();
        s.start();
        s.step(STEP);
        s.input.process_keyboard(KeyCode::KeyR, ElementState::Pressed);
        s.step(STEP);
        s.input.process_keyboard(KeyCode::KeyR, ElementState::Released);
        assert!(s.state.arsenal.is_reloading());

        s.input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
        assert!(s.step(STEP).is_none());
        s.input.process_keyboard(KeyCode::Escape, ElementState::Released);
        assert!(s.is_paused());
        let frozen = s.clock.now_ms();
        for _ in 0..200 {
            assert!(s.step(STEP).is_none());
        }
        assert_eq!(s.clock.now_ms(), frozen);
        assert!(s.state.arsenal.is_reloading(), "reload must not finish while paused");

        s.toggle_pause();
        assert!(!s.is_paused());
        for _ in 0..100 {
            s.step(STEP);
        }
        assert!(!s.state.arsenal.is_reloading());
    }

    #[test]
    fn dead_sessions_ignore_pause() {
        let mut s = session();
        s.state.phase = GamePhase::Dead;
        s.toggle_pause();
        assert!(s.is_over());
        assert!(!s.clock.is_paused());
    }
}
