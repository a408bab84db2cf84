//! Creature chatter over the serialized speech queue.
//!
//! Each creature carries a [`Dialogue`] component with an explicit
//! `Ready → Speaking → Cooldown → Ready` cycle. Lines go through
//! [`audio::SpeechQueue`], which plays one utterance at a time, and
//! completion comes back as [`audio::SpeechDone`] on a later tick.

use audio::{SpeechDone, VoiceProfile};
use engine_core::{Entity, Tick, Transform};
use glam::Vec3;

use crate::creature::{entity_from_tag, tag_of, Creature, EntityKind};
use crate::state::{GameState, Io};

/// Player must be this close to hear a creature.
pub const HEARING_RANGE: f32 = 10.0;
pub const FRIENDLY_INTERVAL_MS: u64 = 10_000;
pub const HOSTILE_INTERVAL_MS: u64 = 20_000;
/// Friendly and hostile this close to each other trade lines.
pub const EXCHANGE_RANGE: f32 = 15.0;
pub const EXCHANGE_INTERVAL_MS: u64 = 15_000;
pub const EXCHANGE_BLOCK_MS: u64 = 6_000;
/// Pause after a line finishes before the creature may speak again.
pub const AFTER_LINE_MS: u64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chatter {
    #[default]
    Ready,
    Speaking {
        utterance: u64,
    },
    Cooldown {
        until_ms: u64,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Dialogue {
    pub chatter: Chatter,
    /// Index into the creature's current line set.
    pub line: usize,
    pub last_spoke: Option<u64>,
    /// Set by an exchange; blocks proximity chatter until then.
    pub blocked_until: Option<u64>,
}

impl Dialogue {
    fn can_speak(&self, now_ms: u64) -> bool {
        self.chatter == Chatter::Ready && self.blocked_until.map_or(true, |t| now_ms >= t)
    }

    fn interval_elapsed(&self, now_ms: u64, interval_ms: u64) -> bool {
        self.last_spoke.map_or(true, |t| now_ms.saturating_sub(t) >= interval_ms)
    }
}

const GRUNT_LINES: &[&str] = &[
    "We are one.",
    "You cannot comprehend.",
    "The pattern must be completed.",
    "Your presence is a flaw.",
    "Your light will be extinguished.",
    "The Architect sees all.",
    "Your reality is a cage.",
    "The master is coming.",
    "You are just a vessel.",
    "Your thoughts are not your own.",
];

const LURKER_LINES: &[&str] = &[
    "It is listening.",
    "The frequency is changing.",
    "You disrupt the signal.",
    "Become one with the static.",
    "We see your fear.",
    "This is not your world.",
    "You are already lost.",
    "Your memories are lies.",
];

const ALIEN_LINES: &[&str] = &[
    "The flesh is weak.",
    "We will consume.",
    "Your form is imperfect.",
    "Join the growth.",
    "The code is corrupt.",
    "There is no escape from the system.",
    "Your free will is an illusion.",
    "We are the future.",
];

const GOO_LINES: &[&str] = &["..."];

const FRIENDLY_HIGH: &[&str] = &[
    "You seem lucid. Good.",
    "The exit is real, but it moves.",
    "These walls... they listen.",
    "The yellow is a lie.",
    "Stay away from the shadows, they bite.",
    "Keep your wits about you. This place feeds on confusion.",
    "There are patterns in the static. Try to see them.",
    "The exit changes, but it always has a key.",
];

const FRIENDLY_LOW: &[&str] = &[
    "...the colors... they scream...",
    "It sees you. It knows your name.",
    "You're becoming part of this place.",
    "The static is singing to me.",
    "The walls are breathing, can't you feel it?",
    "My reflection has a different face.",
    "The whispers are getting louder.",
    "The colors taste like metal.",
];

const FRIENDLY_NORMAL: &[&str] = &[
    "You aren't supposed to be here.",
    "The buzzing... it makes them angry.",
    "Follow the green light.",
    "Don't lose your mind. They feed on fear.",
    "Hurry. This place... it remembers.",
    "The creatures here are drawn to movement.",
    "Don't trust the silence.",
    "The weapons you find are glitches. Use them.",
];

const RESPONSES: &[(&str, &str)] = &[
    ("We are one.", "I am not you."),
    ("You cannot comprehend.", "I don't want to."),
    ("The pattern must be completed.", "I will break it."),
    ("Your presence is a flaw.", "I am not a flaw."),
    ("It is listening.", "I know."),
    ("The frequency is changing.", "I can feel it."),
    ("You disrupt the signal.", "Good."),
    ("Become one with the static.", "Never."),
    ("The flesh is weak.", "But my will is strong."),
    ("We will consume.", "Not me."),
    ("Your form is imperfect.", "It's mine."),
    ("Join the growth.", "I refuse."),
    ("Your reality is a cage.", "A cage I will break."),
    ("The master is coming.", "Let him come."),
    ("You are just a vessel.", "I am my own person."),
    ("Your thoughts are not your own.", "They are mine to control."),
    ("We see your fear.", "And I see your weakness."),
];

const DEFAULT_RESPONSE: &str = "What are you talking about?";

/// Lines a creature draws from. Friendlies pick a set by player sanity.
pub fn lines_for(kind: EntityKind, sanity: f32) -> &'static [&'static str] {
    match kind {
        EntityKind::Grunt => GRUNT_LINES,
        EntityKind::Lurker => LURKER_LINES,
        EntityKind::Alien => ALIEN_LINES,
        EntityKind::Goo => GOO_LINES,
        EntityKind::Friendly if sanity > 0.8 => FRIENDLY_HIGH,
        EntityKind::Friendly if sanity < 0.4 => FRIENDLY_LOW,
        EntityKind::Friendly => FRIENDLY_NORMAL,
        EntityKind::Ugv => &[],
    }
}

/// A friendly's answer to a hostile line.
pub fn response_to(line: &str) -> &'static str {
    RESPONSES
        .iter()
        .find(|(said, _)| *said == line)
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_RESPONSE)
}

fn profile(kind: EntityKind) -> VoiceProfile {
    if kind.is_friendly() {
        VoiceProfile::Friendly
    } else {
        VoiceProfile::Hostile
    }
}

/// Exchange pacing shared by all creatures.
#[derive(Debug, Default)]
pub struct DialogueDirector {
    last_exchange: Option<u64>,
}

struct Talker {
    entity: Entity,
    kind: EntityKind,
    position: Vec3,
}

/// Advance speech playback and creature chatter.
pub fn update(state: &mut GameState, io: &mut Io, tick: &Tick) {
    let now = tick.now_ms;
    let finished = state.speech.update(now, io.voice);
    settle(state, &finished, now);

    let player = state.camera.position();
    let sanity = state.vitals.sanity();

    let talkers: Vec<Talker> = state
        .registry
        .query::<(&Creature, &Transform, &Dialogue)>()
        .iter()
        .filter(|(_, (c, _, d))| !c.is_dead() && d.can_speak(now) && !lines_for(c.kind, sanity).is_empty())
        .map(|(entity, (c, t, _))| Talker {
            entity,
            kind: c.kind,
            position: t.position,
        })
        .collect();

    let due_exchange = state
        .dialogue
        .last_exchange
        .map_or(true, |t| now.saturating_sub(t) >= EXCHANGE_INTERVAL_MS);
    if due_exchange {
        if let Some((friend, foe)) = find_pair(&talkers) {
            exchange(state, friend, foe, now);
            return;
        }
    }

    for talker in &talkers {
        let dist = Vec3::new(talker.position.x - player.x, 0.0, talker.position.z - player.z).length();
        if dist >= HEARING_RANGE {
            continue;
        }
        let interval = if talker.kind.is_friendly() {
            FRIENDLY_INTERVAL_MS
        } else {
            HOSTILE_INTERVAL_MS
        };
        let due = state
            .registry
            .get::<&Dialogue>(talker.entity)
            .map(|d| d.interval_elapsed(now, interval))
            .unwrap_or(false);
        if due {
            say(state, talker.entity, talker.kind, None, now);
        }
    }
}

/// Completed utterances start their speaker's cooldown; expired cooldowns
/// return to ready and move on to the next line.
fn settle(state: &mut GameState, finished: &[SpeechDone], now: u64) {
    for done in finished {
        let Some(entity) = done.speaker.and_then(entity_from_tag) else {
            continue;
        };
        if let Ok(mut dialogue) = state.registry.get::<&mut Dialogue>(entity) {
            if dialogue.chatter == (Chatter::Speaking { utterance: done.id }) {
                dialogue.chatter = Chatter::Cooldown {
                    until_ms: now + AFTER_LINE_MS,
                };
            }
        }
    }
    for (_, dialogue) in state.registry.query_mut::<&mut Dialogue>() {
        if let Chatter::Cooldown { until_ms } = dialogue.chatter {
            if now >= until_ms {
                dialogue.chatter = Chatter::Ready;
                dialogue.line += 1;
            }
        }
    }
}

fn find_pair(talkers: &[Talker]) -> Option<(&Talker, &Talker)> {
    talkers.iter().filter(|t| t.kind.is_friendly()).find_map(|friend| {
        talkers
            .iter()
            .filter(|t| !t.kind.is_friendly() && t.kind != EntityKind::Goo)
            .find(|foe| foe.position.distance(friend.position) < EXCHANGE_RANGE)
            .map(|foe| (friend, foe))
    })
}

fn exchange(state: &mut GameState, friend: &Talker, foe: &Talker, now: u64) {
    state.dialogue.last_exchange = Some(now);
    let Some(line) = say(state, foe.entity, foe.kind, None, now) else {
        return;
    };
    let reply = response_to(line);
    say(state, friend.entity, friend.kind, Some(reply), now);
    for entity in [friend.entity, foe.entity] {
        if let Ok(mut d) = state.registry.get::<&mut Dialogue>(entity) {
            d.blocked_until = Some(now + EXCHANGE_BLOCK_MS);
        }
    }
}

/// Queue a line for `entity`. Uses its next scripted line unless `text`
/// overrides it. Returns the line spoken.
fn say(state: &mut GameState, entity: Entity, kind: EntityKind, text: Option<&'static str>, now: u64) -> Option<&'static str> {
    let sanity = state.vitals.sanity();
    let mut dialogue = state.registry.get::<&mut Dialogue>(entity).ok()?;
    let line = match text {
        Some(t) => t,
        None => {
            let lines = lines_for(kind, sanity);
            *lines.get(dialogue.line % lines.len().max(1))?
        }
    };
    let id = state.speech.speak(line, profile(kind), Some(tag_of(entity)));
    dialogue.chatter = Chatter::Speaking { utterance: id };
    dialogue.last_spoke = Some(now);
    drop(dialogue);
    state.messages.log(format!("{}: {}", kind.name(), line));
    Some(line)
}
