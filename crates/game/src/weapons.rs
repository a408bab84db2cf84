//! Weapon table and the player's arsenal state machine.
//!
//! All timing is expressed as game-clock timestamps checked every tick, so a
//! paused game freezes reloads, refire gates, and swing windows.

use audio::Sfx;

/// Reload lock duration.
pub const RELOAD_MS: u64 = 1500;
/// Shared ammo pool ceiling.
pub const MAX_AMMO: u32 = 30;

/// Weapon types available to the player, in slot order (keys 1-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Pistol,
    Sword,
    Tentacle,
    Railgun,
    Shotgun,
    Rifle,
    Flamethrower,
}

pub const ALL_WEAPONS: [WeaponKind; 7] = [
    WeaponKind::Pistol,
    WeaponKind::Sword,
    WeaponKind::Tentacle,
    WeaponKind::Railgun,
    WeaponKind::Shotgun,
    WeaponKind::Rifle,
    WeaponKind::Flamethrower,
];

/// How a weapon delivers damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attack {
    Projectile {
        color: u32,
        /// Lifetime in ticks.
        lifetime: u32,
        /// Units per tick.
        speed: f32,
        pellets: u32,
        spread: f32,
        flame: bool,
    },
    Hitscan {
        damage: u32,
        beam_ms: u64,
    },
    Melee {
        radius: f32,
        min_dot: f32,
        damage: u32,
        window_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSpec {
    pub kind: WeaponKind,
    pub name: &'static str,
    pub refire_ms: u64,
    pub ammo_cost: u32,
    /// Ammo after a reload started with this weapon.
    pub magazine: u32,
    pub attack: Attack,
    pub sound: Sfx,
    /// Keeps firing while the button is held.
    pub automatic: bool,
    /// Viewmodel asset, if the weapon has one.
    pub model: Option<&'static str>,
}

const PISTOL: WeaponSpec = WeaponSpec {
    kind: WeaponKind::Pistol,
    name: "Pistol",
    refire_ms: 200,
    ammo_cost: 1,
    magazine: 30,
    attack: Attack::Projectile {
        color: 0xffff00,
        lifetime: 100,
        speed: 1.2,
        pellets: 1,
        spread: 0.0,
        flame: false,
    },
    sound: Sfx::Shoot,
    automatic: false,
    model: Some("pistol"),
};

const SWORD: WeaponSpec = WeaponSpec {
    kind: WeaponKind::Sword,
    name: "Sword",
    refire_ms: 0,
    ammo_cost: 0,
    magazine: 30,
    attack: Attack::Melee {
        radius: 2.5,
        min_dot: 0.8,
        damage: 3,
        window_ms: 500,
    },
    sound: Sfx::SwordSwing,
    automatic: false,
    model: None,
};

const TENTACLE: WeaponSpec = WeaponSpec {
    kind: WeaponKind::Tentacle,
    name: "Tentacle",
    refire_ms: 0,
    ammo_cost: 0,
    magazine: 30,
    attack: Attack::Melee {
        radius: 4.0,
        min_dot: 0.7,
        damage: 2,
        window_ms: 700,
    },
    sound: Sfx::TentacleWhip,
    automatic: false,
    model: None,
};

const RAILGUN: WeaponSpec = WeaponSpec {
    kind: WeaponKind::Railgun,
    name: "Railgun",
    refire_ms: 2000,
    ammo_cost: 0,
    magazine: 30,
    attack: Attack::Hitscan {
        damage: 10,
        beam_ms: 100,
    },
    sound: Sfx::Railgun,
    automatic: false,
    model: None,
};

const SHOTGUN: WeaponSpec = WeaponSpec {
    kind: WeaponKind::Shotgun,
    name: "Shotgun",
    refire_ms: 1000,
    ammo_cost: 1,
    magazine: 8,
    attack: Attack::Projectile {
        color: 0xff8800,
        lifetime: 50,
        speed: 1.5,
        pellets: 8,
        spread: 0.1,
        flame: false,
    },
    sound: Sfx::Shoot,
    automatic: false,
    model: None,
};

const RIFLE: WeaponSpec = WeaponSpec {
    kind: WeaponKind::Rifle,
    name: "Rifle",
    refire_ms: 100,
    ammo_cost: 1,
    magazine: 30,
    attack: Attack::Projectile {
        color: 0x00ff00,
        lifetime: 100,
        speed: 2.0,
        pellets: 1,
        spread: 0.0,
        flame: false,
    },
    sound: Sfx::Shoot,
    automatic: true,
    model: Some("rifle"),
};

const FLAMETHROWER: WeaponSpec = WeaponSpec {
    kind: WeaponKind::Flamethrower,
    name: "Flamethrower",
    refire_ms: 50,
    ammo_cost: 1,
    magazine: 30,
    attack: Attack::Projectile {
        color: 0xff4400,
        lifetime: 50,
        speed: 0.5,
        pellets: 1,
        spread: 0.0,
        flame: true,
    },
    sound: Sfx::Flamethrower,
    automatic: false,
    model: None,
};

impl WeaponKind {
    pub fn spec(&self) -> &'static WeaponSpec {
        match self {
            WeaponKind::Pistol => &PISTOL,
            WeaponKind::Sword => &SWORD,
            WeaponKind::Tentacle => &TENTACLE,
            WeaponKind::Railgun => &RAILGUN,
            WeaponKind::Shotgun => &SHOTGUN,
            WeaponKind::Rifle => &RIFLE,
            WeaponKind::Flamethrower => &FLAMETHROWER,
        }
    }

    /// Map a number key (1-7) to a weapon.
    pub fn from_slot(slot: u8) -> Option<Self> {
        ALL_WEAPONS.get((slot as usize).checked_sub(1)?).copied()
    }

    pub fn is_melee(&self) -> bool {
        matches!(self.spec().attack, Attack::Melee { .. })
    }
}

/// Why a trigger pull did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocked {
    Reloading,
    Cooldown,
    NoAmmo,
    /// A melee swing is still in progress.
    Swinging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reload {
    started_ms: u64,
    weapon: WeaponKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Swing {
    started_ms: u64,
    window_ms: u64,
}

/// Player weapon state: active slot, shared ammo pool, and the timestamps
/// that gate firing.
#[derive(Debug, Clone)]
pub struct Arsenal {
    active: WeaponKind,
    ammo: u32,
    last_shot: Option<u64>,
    reload: Option<Reload>,
    swing: Option<Swing>,
}

impl Default for Arsenal {
    fn default() -> Self {
        Self::new()
    }
}

impl Arsenal {
    pub fn new() -> Self {
        Self {
            active: WeaponKind::Pistol,
            ammo: MAX_AMMO,
            last_shot: None,
            reload: None,
            swing: None,
        }
    }

    pub fn active(&self) -> WeaponKind {
        self.active
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn is_reloading(&self) -> bool {
        self.reload.is_some()
    }

    pub fn is_swinging(&self) -> bool {
        self.swing.is_some()
    }

    /// Switch the active weapon. Ammo, cooldowns and a running reload are
    /// left untouched. Returns `false` if it was already active.
    pub fn switch_to(&mut self, kind: WeaponKind) -> bool {
        if self.active == kind {
            return false;
        }
        self.active = kind;
        true
    }

    /// Begin a reload with the active weapon. Returns `false` if one is
    /// already running.
    pub fn start_reload(&mut self, now_ms: u64) -> bool {
        if self.reload.is_some() {
            return false;
        }
        self.reload = Some(Reload {
            started_ms: now_ms,
            weapon: self.active,
        });
        true
    }

    /// Expire finished timers. Returns the weapon whose reload completed
    /// this tick.
    pub fn update(&mut self, now_ms: u64) -> Option<WeaponKind> {
        if let Some(swing) = self.swing {
            if now_ms.saturating_sub(swing.started_ms) >= swing.window_ms {
                self.swing = None;
            }
        }
        let reload = self.reload?;
        if now_ms.saturating_sub(reload.started_ms) < RELOAD_MS {
            return None;
        }
        self.reload = None;
        self.ammo = reload.weapon.spec().magazine.min(MAX_AMMO);
        Some(reload.weapon)
    }

    /// Pull the trigger of the active weapon. On success the ammo cost is
    /// paid and the refire (or swing) timer restarts.
    pub fn trigger(&mut self, now_ms: u64) -> Result<&'static WeaponSpec, Blocked> {
        self.update(now_ms);
        let spec = self.active.spec();

        if let Attack::Melee { window_ms, .. } = spec.attack {
            if self.swing.is_some() {
                return Err(Blocked::Swinging);
            }
            self.swing = Some(Swing {
                started_ms: now_ms,
                window_ms,
            });
            return Ok(spec);
        }

        if self.reload.is_some() {
            return Err(Blocked::Reloading);
        }
        if let Some(last) = self.last_shot {
            if now_ms.saturating_sub(last) < spec.refire_ms {
                return Err(Blocked::Cooldown);
            }
        }
        if self.ammo < spec.ammo_cost {
            return Err(Blocked::NoAmmo);
        }
        self.ammo -= spec.ammo_cost;
        self.last_shot = Some(now_ms);
        Ok(spec)
    }

    /// Reload completion in `0..=1`, for the HUD.
    pub fn reload_progress(&self, now_ms: u64) -> Option<f32> {
        self.reload
            .map(|r| (now_ms.saturating_sub(r.started_ms) as f32 / RELOAD_MS as f32).min(1.0))
    }
}
