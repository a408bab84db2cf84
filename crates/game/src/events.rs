//! Timed world events: one at a time, rolled at random each tick.
//!
//! An event mutates the shared [`Atmosphere`] and the player's [`Vitals`]
//! on start, every tick while active, and on end. Every end restores the
//! default fog colour and main light.

use rand::Rng;
use renderer::{Atmosphere, DEFAULT_FOG_COLOR, DEFAULT_FOG_DENSITY, DEFAULT_MAIN_LIGHT};

use crate::config::EventConfig;
use crate::creature::EntityKind;
use crate::vitals::Vitals;

/// Event spawns stop once this many hostiles are alive.
pub const SPAWN_CAP: usize = 15;
/// Distance from the player at which event spawns appear.
pub const SPAWN_RADIUS: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldEvent {
    LightsFlicker,
    RealityShift,
    EntitySpawn,
    Sandstorm,
    BloodRain,
}

pub const ALL_EVENTS: [WorldEvent; 5] = [
    WorldEvent::LightsFlicker,
    WorldEvent::RealityShift,
    WorldEvent::EntitySpawn,
    WorldEvent::Sandstorm,
    WorldEvent::BloodRain,
];

impl WorldEvent {
    pub fn duration_ms(&self) -> u64 {
        match self {
            WorldEvent::LightsFlicker => 5_000,
            WorldEvent::RealityShift => 3_000,
            WorldEvent::EntitySpawn => 1_000,
            WorldEvent::Sandstorm => 15_000,
            WorldEvent::BloodRain => 10_000,
        }
    }

    /// Banner text while active.
    pub fn banner(&self) -> &'static str {
        match self {
            WorldEvent::LightsFlicker => "POWER FLUCTUATION",
            WorldEvent::RealityShift => "REALITY SHIFT",
            WorldEvent::EntitySpawn => "THEY ARE COMING",
            WorldEvent::Sandstorm => "SANDSTORM",
            WorldEvent::BloodRain => "BLOOD RAIN",
        }
    }

    fn on_start(&self, atmosphere: &mut Atmosphere, vitals: &mut Vitals) {
        match self {
            WorldEvent::Sandstorm => {
                atmosphere.sandstorm = true;
                atmosphere.fog_density = 0.1;
            }
            WorldEvent::BloodRain => {
                atmosphere.blood_rain = true;
                vitals.adjust_sanity(-0.1);
            }
            _ => {}
        }
    }

    fn on_tick(
        &self,
        atmosphere: &mut Atmosphere,
        vitals: &mut Vitals,
        rng: &mut impl Rng,
        dt: f32,
        live_hostiles: usize,
        spawns: &mut Vec<EntityKind>,
    ) {
        match self {
            WorldEvent::LightsFlicker => {
                atmosphere.main_light = 0.3 + rng.gen::<f32>() * 0.7;
            }
            WorldEvent::RealityShift => {
                atmosphere.fog_color = rng.gen::<u32>() & 0xffffff;
                vitals.adjust_sanity(-0.06 * dt);
            }
            WorldEvent::EntitySpawn => {
                if live_hostiles + spawns.len() < SPAWN_CAP {
                    spawns.push(EntityKind::random_basic(rng));
                }
            }
            WorldEvent::Sandstorm | WorldEvent::BloodRain => {}
        }
    }

    fn on_end(&self, atmosphere: &mut Atmosphere) {
        match self {
            WorldEvent::Sandstorm => {
                atmosphere.sandstorm = false;
                atmosphere.fog_density = DEFAULT_FOG_DENSITY;
            }
            WorldEvent::BloodRain => {
                atmosphere.blood_rain = false;
            }
            _ => {}
        }
        atmosphere.fog_color = DEFAULT_FOG_COLOR;
        atmosphere.main_light = DEFAULT_MAIN_LIGHT;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEvent {
    pub kind: WorldEvent,
    pub started_ms: u64,
}

/// What happened during one scheduler tick.
#[derive(Debug, Default, PartialEq)]
pub struct EventReport {
    pub started: Option<WorldEvent>,
    pub ended: Option<WorldEvent>,
    /// Creatures the entity-spawn event asked for.
    pub spawns: Vec<EntityKind>,
}

#[derive(Debug)]
pub struct EventScheduler {
    active: Option<ActiveEvent>,
    trigger_chance: f64,
    accept_chance: f64,
}

impl EventScheduler {
    pub fn new(config: &EventConfig) -> Self {
        Self {
            active: None,
            trigger_chance: config.trigger_chance,
            accept_chance: config.accept_chance,
        }
    }

    pub fn active(&self) -> Option<ActiveEvent> {
        self.active
    }

    /// Start `kind` now. Ignored while another event runs.
    pub fn start(&mut self, kind: WorldEvent, now_ms: u64, atmosphere: &mut Atmosphere, vitals: &mut Vitals) -> bool {
        if self.active.is_some() {
            return false;
        }
        log::info!("World event started: {:?}", kind);
        kind.on_start(atmosphere, vitals);
        self.active = Some(ActiveEvent {
            kind,
            started_ms: now_ms,
        });
        true
    }

    /// Run the active event's timer and effects, or roll for a new one.
    pub fn update(
        &mut self,
        now_ms: u64,
        dt: f32,
        atmosphere: &mut Atmosphere,
        vitals: &mut Vitals,
        rng: &mut impl Rng,
        live_hostiles: usize,
    ) -> EventReport {
        let mut report = EventReport::default();

        let Some(active) = self.active else {
            if rng.gen_bool(self.trigger_chance.clamp(0.0, 1.0)) && rng.gen_bool(self.accept_chance.clamp(0.0, 1.0)) {
                let kind = ALL_EVENTS[rng.gen_range(0..ALL_EVENTS.len())];
                if self.start(kind, now_ms, atmosphere, vitals) {
                    report.started = Some(kind);
                }
            }
            return report;
        };

        if now_ms.saturating_sub(active.started_ms) >= active.kind.duration_ms() {
            active.kind.on_end(atmosphere);
            self.active = None;
            log::info!("World event ended: {:?}", active.kind);
            report.ended = Some(active.kind);
            return report;
        }

        active
            .kind
            .on_tick(atmosphere, vitals, rng, dt, live_hostiles, &mut report.spawns);
        report
    }
}
