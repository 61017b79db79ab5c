//! Ordered back-to-back playback of generated chunks.

use crate::timing::per_word_interval;
use crate::tts::AudioHandle;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, warn};

/// One playable clip covering the inclusive word range `start_index..=end_index`.
#[derive(Debug)]
pub struct AudioChunk {
    pub audio: AudioHandle,
    pub start_index: usize,
    pub end_index: usize,
    pub estimated_duration: Duration,
}

impl AudioChunk {
    pub fn word_count(&self) -> usize {
        self.end_index + 1 - self.start_index
    }

    /// Per-word pacing for the highlight timer.
    pub fn pacing(&self) -> Option<Duration> {
        per_word_interval(self.estimated_duration, self.word_count())
    }
}

/// Holds the chunk being played plus those waiting behind it.
///
/// Chunks must arrive contiguous: each starts one past the previous end.
#[derive(Debug)]
pub struct ChunkSequencer {
    queued: VecDeque<AudioChunk>,
    current: Option<AudioChunk>,
    expected_start: usize,
    generation_done: bool,
}

impl ChunkSequencer {
    pub fn new(start_index: usize) -> Self {
        Self {
            queued: VecDeque::new(),
            current: None,
            expected_start: start_index,
            generation_done: false,
        }
    }

    /// Queue a chunk; a gap or overlap hands it back untouched.
    pub fn push(&mut self, chunk: AudioChunk) -> Result<(), AudioChunk> {
        if chunk.start_index != self.expected_start || chunk.end_index < chunk.start_index {
            warn!(
                expected = self.expected_start,
                start = chunk.start_index,
                end = chunk.end_index,
                "Rejecting non-contiguous chunk"
            );
            return Err(chunk);
        }
        self.expected_start = chunk.end_index + 1;
        self.queued.push_back(chunk);
        Ok(())
    }

    pub fn mark_generation_done(&mut self) {
        self.generation_done = true;
    }

    /// Promote the next queued chunk if nothing is playing.
    pub fn begin_next(&mut self) -> Option<&AudioChunk> {
        if self.current.is_some() {
            return None;
        }
        self.current = self.queued.pop_front();
        if let Some(chunk) = &self.current {
            debug!(
                clip_id = chunk.audio.id(),
                start = chunk.start_index,
                end = chunk.end_index,
                "Beginning chunk"
            );
        }
        self.current.as_ref()
    }

    /// Take the playing chunk's handle once its clip has ended.
    pub fn finish(&mut self, clip_id: u64) -> Option<AudioHandle> {
        let is_current = self
            .current
            .as_ref()
            .is_some_and(|chunk| chunk.audio.id() == clip_id);
        if is_current {
            self.current.take().map(|chunk| chunk.audio)
        } else {
            None
        }
    }

    /// Nothing playing, nothing queued, nothing more coming.
    pub fn is_drained(&self) -> bool {
        self.generation_done && self.current.is_none() && self.queued.is_empty()
    }

    pub fn held_count(&self) -> usize {
        self.queued.len() + usize::from(self.current.is_some())
    }

    pub fn release_all(&mut self) -> Vec<AudioHandle> {
        self.current
            .take()
            .into_iter()
            .chain(self.queued.drain(..))
            .map(|chunk| chunk.audio)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn chunk(start: usize, end: usize) -> AudioChunk {
        AudioChunk {
            audio: AudioHandle::adopt(PathBuf::from(format!("/nonexistent/clip-{start}"))),
            start_index: start,
            end_index: end,
            estimated_duration: Duration::from_secs(4),
        }
    }

    #[test]
    fn plays_chunks_in_order() {
        let mut seq = ChunkSequencer::new(3);
        seq.push(chunk(3, 9)).unwrap();
        seq.push(chunk(10, 12)).unwrap();
        seq.mark_generation_done();

        let first = seq.begin_next().map(|c| (c.start_index, c.audio.id())).unwrap();
        assert_eq!(first.0, 3);
        assert!(seq.begin_next().is_none());
        assert!(seq.finish(first.1).is_some());
        let second = seq.begin_next().map(|c| (c.start_index, c.audio.id())).unwrap();
        assert_eq!(second.0, 10);
        assert!(!seq.is_drained());
        seq.finish(second.1).unwrap();
        assert!(seq.is_drained());
    }

    #[test]
    fn rejects_gaps_and_overlaps() {
        let mut seq = ChunkSequencer::new(0);
        seq.push(chunk(0, 4)).unwrap();
        assert!(seq.push(chunk(6, 8)).is_err());
        assert!(seq.push(chunk(4, 8)).is_err());
        assert!(seq.push(chunk(5, 8)).is_ok());
    }

    #[test]
    fn finish_ignores_other_clips() {
        let mut seq = ChunkSequencer::new(0);
        seq.push(chunk(0, 1)).unwrap();
        let id = seq.begin_next().unwrap().audio.id();
        assert!(seq.finish(id + 1000).is_none());
        assert_eq!(seq.held_count(), 1);
    }

    #[test]
    fn release_all_returns_every_held_handle() {
        let mut seq = ChunkSequencer::new(0);
        seq.push(chunk(0, 1)).unwrap();
        seq.push(chunk(2, 3)).unwrap();
        seq.push(chunk(4, 5)).unwrap();
        seq.begin_next();
        assert_eq!(seq.release_all().len(), 3);
        assert_eq!(seq.held_count(), 0);
    }

    #[test]
    fn pacing_divides_estimate_by_words() {
        assert_eq!(chunk(0, 9).pacing(), Some(Duration::from_millis(400)));
    }
}
