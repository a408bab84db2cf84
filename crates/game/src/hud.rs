//! HUD boundary and the on-screen message log.
//!
//! The game never owns widgets. Once per tick it builds a [`HudFrame`] of
//! plain values and hands it to whatever [`Hud`] the driver installed.

/// Everything the HUD shows for one tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HudFrame {
    pub health_pct: u32,
    pub sanity_pct: u32,
    pub level: u32,
    pub kills: u32,
    pub collected: u32,
    pub weapon: &'static str,
    /// `"{ammo} / ∞"` or `"RELOADING"`.
    pub ammo_text: String,
    /// Ammo bar fill in [0, 1].
    pub ammo_fill: f32,
    /// Proximity warning overlay opacity.
    pub warning_opacity: f32,
    pub event_banner: Option<String>,
    pub message: Option<String>,
    /// Line currently being spoken.
    pub caption: Option<String>,
    pub night_vision: bool,
    pub driving: bool,
    pub dead: bool,
}

impl HudFrame {
    /// One-line summary for a window title or log line.
    pub fn status_line(&self) -> String {
        if self.dead {
            return format!("YOU DIED | level {} | kills {}", self.level, self.kills);
        }
        let mut line = format!(
            "HP {}% | SAN {}% | {} {} | L{} | kills {} | orbs {}",
            self.health_pct, self.sanity_pct, self.weapon, self.ammo_text, self.level, self.kills, self.collected
        );
        if let Some(banner) = &self.event_banner {
            line.push_str(" | ");
            line.push_str(banner);
        }
        if let Some(msg) = &self.message {
            line.push_str(" | ");
            line.push_str(msg);
        }
        line
    }
}

pub trait Hud {
    fn present(&mut self, frame: &HudFrame);
}

/// Keeps the most recent frame. Used headless and in tests.
#[derive(Debug, Default)]
pub struct HudLog {
    pub last: Option<HudFrame>,
    pub presented: u64,
}

impl Hud for HudLog {
    fn present(&mut self, frame: &HudFrame) {
        self.last = Some(frame.clone());
        self.presented += 1;
    }
}

// ── Game Messages ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient on-screen message.
#[derive(Debug, Clone)]
pub struct GameMessage {
    pub text: String,
    pub kind: MessageKind,
    pub time_remaining: f32,
}

/// Transient messages plus the permanent datalog of everything shown.
#[derive(Debug)]
pub struct GameMessages {
    pub messages: Vec<GameMessage>,
    pub datalog: Vec<String>,
    default_duration: f32,
}

impl Default for GameMessages {
    fn default() -> Self {
        Self::new()
    }
}

impl GameMessages {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            datalog: Vec::new(),
            default_duration: 3.0,
        }
    }

    pub fn push(&mut self, text: impl Into<String>, kind: MessageKind) {
        let text = text.into();
        self.datalog.push(text.clone());
        if self.datalog.len() > 200 {
            self.datalog.remove(0);
        }
        self.messages.push(GameMessage {
            text,
            kind,
            time_remaining: self.default_duration,
        });
        if self.messages.len() > 50 {
            self.messages.remove(0);
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(text, MessageKind::Info);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(text, MessageKind::Success);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(text, MessageKind::Warning);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(text, MessageKind::Error);
    }

    /// Append to the datalog without an on-screen toast (dialogue lines).
    pub fn log(&mut self, text: impl Into<String>) {
        self.datalog.push(text.into());
    }

    /// Most recent message still on screen.
    pub fn latest(&self) -> Option<&GameMessage> {
        self.messages.last()
    }

    pub fn update(&mut self, dt: f32) {
        for msg in &mut self.messages {
            msg.time_remaining -= dt;
        }
        self.messages.retain(|m| m.time_remaining > 0.0);
    }
}
