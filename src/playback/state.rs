use crate::config::Engine;

/// Words per minute assumed for the reading-time estimate.
const READING_WPM: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    /// Waiting for the engine to report that audio has started.
    Preparing { session_id: u64 },
    Playing { session_id: u64 },
}

impl Lifecycle {
    pub fn session_id(self) -> Option<u64> {
        match self {
            Lifecycle::Idle => None,
            Lifecycle::Preparing { session_id } | Lifecycle::Playing { session_id } => {
                Some(session_id)
            }
        }
    }
}

/// Rate and pitch are multipliers in `0.5..=2.0`; volume is `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSettings {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl VoiceSettings {
    pub const MIN_MULTIPLIER: f32 = 0.5;
    pub const MAX_MULTIPLIER: f32 = 2.0;

    pub fn new(rate: f32, pitch: f32, volume: f32) -> Self {
        Self {
            rate: clamp_multiplier(rate),
            pitch: clamp_multiplier(pitch),
            volume: if volume.is_finite() {
                volume.clamp(0.0, 1.0)
            } else {
                0.8
            },
        }
    }
}

pub(crate) fn clamp_multiplier(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(VoiceSettings::MIN_MULTIPLIER, VoiceSettings::MAX_MULTIPLIER)
    } else {
        1.0
    }
}

/// How the reader paints one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordClass {
    Current,
    Read,
    Unread,
}

/// Read-only snapshot for the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_preparing: bool,
    pub current_word_index: usize,
    pub word_count: usize,
    pub engine: Engine,
}

impl PlaybackState {
    pub fn word_class(&self, index: usize) -> WordClass {
        if index == self.current_word_index && self.is_playing {
            WordClass::Current
        } else if index < self.current_word_index {
            WordClass::Read
        } else {
            WordClass::Unread
        }
    }

    pub fn percent_complete(&self) -> u32 {
        if self.word_count == 0 {
            return 0;
        }
        (self.current_word_index as f64 / self.word_count as f64 * 100.0).round() as u32
    }

    pub fn estimated_minutes(&self) -> usize {
        self.word_count.div_ceil(READING_WPM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(index: usize, playing: bool) -> PlaybackState {
        PlaybackState {
            is_playing: playing,
            is_preparing: false,
            current_word_index: index,
            word_count: 401,
            engine: Engine::Local,
        }
    }

    #[test]
    fn classifies_words_around_the_cursor() {
        let state = snapshot(5, true);
        assert_eq!(state.word_class(4), WordClass::Read);
        assert_eq!(state.word_class(5), WordClass::Current);
        assert_eq!(state.word_class(6), WordClass::Unread);
        assert_eq!(snapshot(5, false).word_class(5), WordClass::Unread);
    }

    #[test]
    fn stats_round_like_the_reader_expects() {
        let state = snapshot(200, false);
        assert_eq!(state.percent_complete(), 50);
        assert_eq!(state.estimated_minutes(), 3);
    }

    #[test]
    fn settings_are_clamped() {
        let settings = VoiceSettings::new(5.0, 0.1, 3.0);
        assert_eq!(settings.rate, 2.0);
        assert_eq!(settings.pitch, 0.5);
        assert_eq!(settings.volume, 1.0);
        assert_eq!(VoiceSettings::new(f32::NAN, 1.0, 0.8).rate, 1.0);
    }
}
