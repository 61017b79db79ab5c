//! Approximate word pacing for sources without word-boundary events.
//!
//! The index advances on a fixed cadence derived from a words-per-minute
//! baseline, so highlighting only roughly tracks the audible speech.

use std::time::{Duration, Instant};

/// Assumed speaking speed of the local engine at rate 1.0.
pub const LOCAL_BASELINE_WPM: f32 = 200.0;
/// Assumed speaking speed of the hosted model.
pub const REMOTE_BASELINE_WPM: f32 = 150.0;

const MIN_RATE: f32 = 0.1;

/// Seconds-per-word for the local engine: `60 / (rate * 200)`.
pub fn local_word_interval(rate: f32) -> Duration {
    let rate = if rate.is_finite() { rate.max(MIN_RATE) } else { 1.0 };
    Duration::from_secs_f32(60.0 / (rate * LOCAL_BASELINE_WPM))
}

/// Estimated playback length of remote audio: `words / 150 * 60` seconds.
pub fn estimate_remote_duration(word_count: usize) -> Duration {
    Duration::from_secs_f32(word_count as f32 / REMOTE_BASELINE_WPM * 60.0)
}

/// Spread `total` evenly over `words`; `None` when there is nothing to pace.
pub fn per_word_interval(total: Duration, words: usize) -> Option<Duration> {
    if words == 0 {
        return None;
    }
    let interval = total / words as u32;
    (!interval.is_zero()).then_some(interval)
}

/// Repeating word counter restricted to `[position, limit]`.
///
/// Only moves forward; once `limit` is reached further ticks are no-ops.
#[derive(Debug, Clone)]
pub struct WordTimer {
    interval: Duration,
    next_due: Instant,
    position: usize,
    limit: usize,
}

impl WordTimer {
    pub fn arm(start: usize, limit: usize, interval: Duration, now: Instant) -> Option<Self> {
        if start > limit || interval.is_zero() {
            return None;
        }
        Some(Self {
            interval,
            next_due: now + interval,
            position: start,
            limit,
        })
    }

    /// Apply every step that has come due, returning the new position if it moved.
    pub fn advance(&mut self, now: Instant) -> Option<usize> {
        let before = self.position;
        while self.position < self.limit && now >= self.next_due {
            self.position += 1;
            self.next_due += self.interval;
        }
        (self.position != before).then_some(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(actual: Duration, secs: f64) -> bool {
        (actual.as_secs_f64() - secs).abs() < 1e-4
    }

    #[test]
    fn local_interval_follows_rate() {
        assert!(close_to(local_word_interval(1.0), 0.3));
        assert!(close_to(local_word_interval(2.0), 0.15));
    }

    #[test]
    fn local_interval_survives_bad_rate() {
        assert!(!local_word_interval(0.0).is_zero());
        assert!(close_to(local_word_interval(f32::NAN), 0.3));
    }

    #[test]
    fn remote_estimate_uses_150_wpm() {
        assert_eq!(estimate_remote_duration(150), Duration::from_secs(60));
        assert_eq!(estimate_remote_duration(0), Duration::ZERO);
    }

    #[test]
    fn zero_words_has_no_interval() {
        assert_eq!(per_word_interval(Duration::from_secs(10), 0), None);
        assert_eq!(
            per_word_interval(Duration::from_secs(10), 4),
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn timer_advances_monotonically_up_to_limit() {
        let t0 = Instant::now();
        let mut timer = WordTimer::arm(3, 6, Duration::from_millis(100), t0).unwrap();
        assert_eq!(timer.advance(t0 + Duration::from_millis(50)), None);
        assert_eq!(timer.advance(t0 + Duration::from_millis(100)), Some(4));
        assert_eq!(timer.advance(t0 + Duration::from_millis(320)), Some(6));
        assert!(timer.is_exhausted());
        assert_eq!(timer.advance(t0 + Duration::from_secs(10)), None);
        assert_eq!(timer.position(), 6);
    }

    #[test]
    fn sampled_positions_never_decrease() {
        let t0 = Instant::now();
        let mut timer = WordTimer::arm(0, 50, Duration::from_millis(30), t0).unwrap();
        let mut last = timer.position();
        for step in 0..100u64 {
            timer.advance(t0 + Duration::from_millis(step * 17));
            assert!(timer.position() >= last);
            last = timer.position();
        }
    }

    #[test]
    fn arm_rejects_empty_range() {
        let now = Instant::now();
        assert!(WordTimer::arm(5, 4, Duration::from_millis(10), now).is_none());
        assert!(WordTimer::arm(0, 4, Duration::ZERO, now).is_none());
    }
}
