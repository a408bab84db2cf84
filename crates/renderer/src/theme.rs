//! Wall shader themes cycled from the keyboard.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WallTheme {
    #[default]
    Normal,
    Creepy,
    Crimson,
    Void,
    Glitch,
    Rage,
    Rainbow,
    Water,
    Gold,
    Diamond,
    Emerald,
    Ruby,
    Sapphire,
    Obsidian,
    Invert,
    Noir,
    Psychedelic,
    Terminal,
    Matrix,
}

pub const ALL_THEMES: [WallTheme; 19] = [
    WallTheme::Normal,
    WallTheme::Creepy,
    WallTheme::Crimson,
    WallTheme::Void,
    WallTheme::Glitch,
    WallTheme::Rage,
    WallTheme::Rainbow,
    WallTheme::Water,
    WallTheme::Gold,
    WallTheme::Diamond,
    WallTheme::Emerald,
    WallTheme::Ruby,
    WallTheme::Sapphire,
    WallTheme::Obsidian,
    WallTheme::Invert,
    WallTheme::Noir,
    WallTheme::Psychedelic,
    WallTheme::Terminal,
    WallTheme::Matrix,
];

impl WallTheme {
    pub fn name(&self) -> &'static str {
        match self {
            WallTheme::Normal => "NORMAL",
            WallTheme::Creepy => "CREEPY",
            WallTheme::Crimson => "CRIMSON",
            WallTheme::Void => "VOID",
            WallTheme::Glitch => "GLITCH",
            WallTheme::Rage => "RAGE",
            WallTheme::Rainbow => "RAINBOW",
            WallTheme::Water => "WATER",
            WallTheme::Gold => "GOLD",
            WallTheme::Diamond => "DIAMOND",
            WallTheme::Emerald => "EMERALD",
            WallTheme::Ruby => "RUBY",
            WallTheme::Sapphire => "SAPPHIRE",
            WallTheme::Obsidian => "OBSIDIAN",
            WallTheme::Invert => "INVERT",
            WallTheme::Noir => "NOIR",
            WallTheme::Psychedelic => "PSYCHEDELIC",
            WallTheme::Terminal => "TERMINAL",
            WallTheme::Matrix => "MATRIX",
        }
    }

    /// Next theme, wrapping after the last.
    pub fn next(self) -> Self {
        let idx = ALL_THEMES.iter().position(|t| *t == self).unwrap_or(0);
        ALL_THEMES[(idx + 1) % ALL_THEMES.len()]
    }
}
