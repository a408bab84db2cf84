//! Pausable game clock.
//!
//! Every gameplay timer (reload, swing windows, beams, events, cooldowns)
//! compares against [`GameClock::now_ms`]. The clock only advances while the
//! game is running, so time spent in the pause menu never counts toward any
//! of them.

use std::time::{Duration, Instant};

/// Longest frame the clock will accept in one step. Larger gaps (debugger
/// breaks, window drags) are clamped so a single tick cannot skip a timer.
const MAX_FRAME: Duration = Duration::from_millis(250);

/// Game time in milliseconds plus the per-tick delta handed to each system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Game milliseconds since the session started (pauses excluded).
    pub now_ms: u64,
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Ticks since the session started.
    pub frame: u64,
}

impl Tick {
    /// Milliseconds elapsed since `since`, saturating at zero.
    pub fn since(&self, since: u64) -> u64 {
        self.now_ms.saturating_sub(since)
    }
}

/// Manages frame timing for the game loop.
#[derive(Debug)]
pub struct GameClock {
    /// Wall-clock instant of the last real-time update.
    last_frame: Instant,
    /// Game time accumulated while running.
    elapsed: Duration,
    /// Duration of the last step.
    delta: Duration,
    /// Step count since start.
    frame_count: u64,
    paused: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    /// Create a running clock at game time zero.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
            frame_count: 0,
            paused: false,
        }
    }

    /// Advance by the wall-clock time since the last update.
    /// Returns `None` while paused.
    pub fn update(&mut self) -> Option<Tick> {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta)
    }

    /// Advance by an explicit duration. Used by the real-time path and by
    /// tests that need deterministic timing.
    pub fn advance(&mut self, delta: Duration) -> Option<Tick> {
        if self.paused {
            return None;
        }
        self.delta = delta.min(MAX_FRAME);
        self.elapsed += self.delta;
        self.frame_count += 1;
        Some(self.tick())
    }

    /// Snapshot of the current time without advancing.
    pub fn tick(&self) -> Tick {
        Tick {
            now_ms: self.now_ms(),
            dt: self.delta.as_secs_f32(),
            frame: self.frame_count,
        }
    }

    /// Stop advancing. Further updates return `None`.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume advancing. The wall-clock interval spent paused is discarded.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_frame = Instant::now();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Game milliseconds since start.
    pub fn now_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}
