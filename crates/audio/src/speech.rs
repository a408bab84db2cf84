//! Serialized speech playback.
//!
//! Lines are queued FIFO and played one at a time. The queue is polled with
//! the game clock, so pausing the game also pauses dialogue.

use std::collections::VecDeque;

/// Voice settings for a speaker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoiceProfile {
    /// Calm, slightly high voice.
    Friendly,
    /// Low, slow, distorted voice.
    Hostile,
}

impl VoiceProfile {
    pub fn pitch(&self) -> f32 {
        match self {
            VoiceProfile::Friendly => 1.1,
            VoiceProfile::Hostile => 0.5,
        }
    }

    pub fn rate(&self) -> f32 {
        match self {
            VoiceProfile::Friendly => 1.0,
            VoiceProfile::Hostile => 0.8,
        }
    }
}

/// One queued line.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: u64,
    pub text: String,
    pub profile: VoiceProfile,
    /// Opaque id of whoever is talking, returned on completion.
    pub speaker: Option<u64>,
}

/// Notification that an utterance finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechDone {
    pub id: u64,
    pub speaker: Option<u64>,
}

/// Something that can voice a line. Returns how long it will take in ms.
pub trait Voice {
    fn begin(&mut self, utterance: &Utterance) -> u64;

    fn cancel(&mut self) {}
}

/// Caption-only voice: shows text for a duration estimated from its length.
#[derive(Debug, Default, Clone, Copy)]
pub struct CaptionVoice;

const MS_PER_CHAR: f32 = 60.0;
const MIN_LINE_MS: u64 = 1200;

impl Voice for CaptionVoice {
    fn begin(&mut self, utterance: &Utterance) -> u64 {
        let chars = utterance.text.chars().count() as f32;
        let ms = (chars * MS_PER_CHAR / utterance.profile.rate()) as u64;
        ms.max(MIN_LINE_MS)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechState {
    Idle,
    Speaking { utterance: Utterance, ends_at_ms: u64 },
}

/// FIFO speech queue with a single line in flight.
#[derive(Debug)]
pub struct SpeechQueue {
    queue: VecDeque<Utterance>,
    state: SpeechState,
    next_id: u64,
}

impl Default for SpeechQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechQueue {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            state: SpeechState::Idle,
            next_id: 1,
        }
    }

    /// Queue a line. Returns its id.
    pub fn speak(&mut self, text: impl Into<String>, profile: VoiceProfile, speaker: Option<u64>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push_back(Utterance {
            id,
            text: text.into(),
            profile,
            speaker,
        });
        id
    }

    /// Finish the current line if its time is up and start the next one.
    /// Returns every line that completed during this call.
    pub fn update(&mut self, now_ms: u64, voice: &mut dyn Voice) -> Vec<SpeechDone> {
        let mut done = Vec::new();
        loop {
            match &self.state {
                SpeechState::Speaking { utterance, ends_at_ms } => {
                    if now_ms < *ends_at_ms {
                        break;
                    }
                    done.push(SpeechDone {
                        id: utterance.id,
                        speaker: utterance.speaker,
                    });
                    let next_start = *ends_at_ms;
                    self.state = SpeechState::Idle;
                    if !self.start_next(next_start, voice) {
                        break;
                    }
                }
                SpeechState::Idle => {
                    if !self.start_next(now_ms, voice) {
                        break;
                    }
                }
            }
        }
        done
    }

    fn start_next(&mut self, start_ms: u64, voice: &mut dyn Voice) -> bool {
        match self.queue.pop_front() {
            Some(utterance) => {
                let duration = voice.begin(&utterance);
                self.state = SpeechState::Speaking {
                    utterance,
                    ends_at_ms: start_ms + duration,
                };
                true
            }
            None => false,
        }
    }

    /// Line currently being spoken.
    pub fn current(&self) -> Option<&Utterance> {
        match &self.state {
            SpeechState::Speaking { utterance, .. } => Some(utterance),
            SpeechState::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SpeechState::Idle) && self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop everything (level change).
    pub fn clear(&mut self, voice: &mut dyn Voice) {
        if matches!(self.state, SpeechState::Speaking { .. }) {
            voice.cancel();
        }
        self.queue.clear();
        self.state = SpeechState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedVoice(u64);

    impl Voice for FixedVoice {
        fn begin(&mut self, _utterance: &Utterance) -> u64 {
            self.0
        }
    }

    #[test]
    fn lines_play_one_at_a_time_in_order() {
        let mut queue = SpeechQueue::new();
        let mut voice = FixedVoice(1000);
        let a = queue.speak("first", VoiceProfile::Hostile, Some(1));
        let b = queue.speak("second", VoiceProfile::Friendly, Some(2));

        assert!(queue.update(0, &mut voice).is_empty());
        assert_eq!(queue.current().map(|u| u.id), Some(a));
        assert_eq!(queue.pending(), 1, "second line waits");

        let done = queue.update(1000, &mut voice);
        assert_eq!(done, vec![SpeechDone { id: a, speaker: Some(1) }]);
        assert_eq!(queue.current().map(|u| u.id), Some(b));

        let done = queue.update(2000, &mut voice);
        assert_eq!(done[0].id, b);
        assert!(queue.is_idle());
    }

    #[test]
    fn late_poll_completes_several_lines() {
        let mut queue = SpeechQueue::new();
        let mut voice = FixedVoice(100);
        queue.speak("a", VoiceProfile::Hostile, None);
        queue.speak("b", VoiceProfile::Hostile, None);
        queue.update(0, &mut voice);
        let done = queue.update(500, &mut voice);
        assert_eq!(done.len(), 2);
        assert!(queue.is_idle());
    }

    #[test]
    fn caption_voice_has_a_floor() {
        let mut voice = CaptionVoice;
        let short = Utterance {
            id: 1,
            text: "hi".into(),
            profile: VoiceProfile::Friendly,
            speaker: None,
        };
        assert_eq!(voice.begin(&short), MIN_LINE_MS);
        let long = Utterance {
            text: "x".repeat(100),
            ..short
        };
        assert!(voice.begin(&long) > MIN_LINE_MS);
    }

    #[test]
    fn clear_resets_to_idle() {
        let mut queue = SpeechQueue::new();
        let mut voice = FixedVoice(1000);
        queue.speak("a", VoiceProfile::Hostile, None);
        queue.speak("b", VoiceProfile::Hostile, None);
        queue.update(0, &mut voice);
        queue.clear(&mut voice);
        assert!(queue.is_idle());
        assert!(queue.update(5000, &mut voice).is_empty());
    }
}
