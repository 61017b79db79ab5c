use crate::cancellation::CancellationToken;
use crate::text_utils::ChunkPlan;
use crate::tts::{AudioHandle, Utterance};
use std::path::PathBuf;
use std::time::Duration;

/// Side effects the controller asks its host to perform, in order.
#[derive(Debug)]
pub enum PlaybackCommand {
    SpeakLocal {
        session_id: u64,
        utterance: Utterance,
    },
    CancelLocal,
    GenerateChunks {
        session_id: u64,
        plans: Vec<ChunkPlan>,
        voice_id: String,
        rate: f32,
        pitch: f32,
        cancel: CancellationToken,
    },
    PlayClip {
        session_id: u64,
        clip_id: u64,
        path: PathBuf,
    },
    StopClip,
    ReleaseClip(AudioHandle),
}

/// A clip written by the generation worker, not yet owned by a session.
#[derive(Debug, Clone)]
pub struct GeneratedChunk {
    pub path: PathBuf,
    pub start_index: usize,
    pub end_index: usize,
    pub estimated_duration: Duration,
}

/// Engine feedback delivered back to the controller.
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    LocalStarted {
        session_id: u64,
    },
    LocalEnded {
        session_id: u64,
    },
    LocalFailed {
        session_id: u64,
        message: String,
    },
    ChunkGenerated {
        session_id: u64,
        chunk: GeneratedChunk,
        last: bool,
    },
    GenerationFailed {
        session_id: u64,
        message: String,
    },
    ClipEnded {
        session_id: u64,
        clip_id: u64,
    },
    ClipFailed {
        session_id: u64,
        clip_id: u64,
        message: String,
    },
}

impl PlaybackEvent {
    pub fn session_id(&self) -> u64 {
        match self {
            PlaybackEvent::LocalStarted { session_id }
            | PlaybackEvent::LocalEnded { session_id }
            | PlaybackEvent::LocalFailed { session_id, .. }
            | PlaybackEvent::ChunkGenerated { session_id, .. }
            | PlaybackEvent::GenerationFailed { session_id, .. }
            | PlaybackEvent::ClipEnded { session_id, .. }
            | PlaybackEvent::ClipFailed { session_id, .. } => *session_id,
        }
    }
}
