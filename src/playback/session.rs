//! Engine adapters behind one start/pause/event contract.
//!
//! A session picks its adapter once, at `play()`, and keeps it until it
//! completes, fails, or is torn down.

use super::events::{PlaybackCommand, PlaybackEvent};
use super::sequencer::{AudioChunk, ChunkSequencer};
use super::state::VoiceSettings;
use crate::cancellation::CancellationToken;
use crate::text_utils::{WordToken, join_words_from, plan_word_chunks};
use crate::timing::local_word_interval;
use crate::tts::{AudioHandle, Utterance};
use crate::voices::NativeVoice;
use std::time::Duration;
use tracing::{debug, warn};

/// What the controller should do after an adapter call.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterStep {
    /// Work requested, nothing audible yet.
    Pending,
    /// Audio began for `index..=limit`; pace the highlight by `interval`.
    Began {
        index: usize,
        limit: usize,
        interval: Option<Duration>,
    },
    /// Nothing changes for the controller.
    Continue,
    Completed,
    Failed(String),
}

pub trait EngineAdapter {
    fn start(
        &mut self,
        tokens: &[WordToken],
        from: usize,
        cmds: &mut Vec<PlaybackCommand>,
    ) -> AdapterStep;

    /// Cancel engine activity and release everything the session holds.
    fn pause(&mut self, cmds: &mut Vec<PlaybackCommand>);

    fn on_event(&mut self, event: PlaybackEvent, cmds: &mut Vec<PlaybackCommand>) -> AdapterStep;
}

/// Speaks the remaining text in one utterance and paces words by rate.
#[derive(Debug)]
pub struct LocalAdapter {
    session_id: u64,
    voice: NativeVoice,
    settings: VoiceSettings,
    from: usize,
    limit: usize,
}

impl LocalAdapter {
    pub fn new(session_id: u64, voice: NativeVoice, settings: VoiceSettings) -> Self {
        Self {
            session_id,
            voice,
            settings,
            from: 0,
            limit: 0,
        }
    }
}

impl EngineAdapter for LocalAdapter {
    fn start(
        &mut self,
        tokens: &[WordToken],
        from: usize,
        cmds: &mut Vec<PlaybackCommand>,
    ) -> AdapterStep {
        if from >= tokens.len() {
            return AdapterStep::Completed;
        }
        self.from = from;
        self.limit = tokens.len() - 1;
        cmds.push(PlaybackCommand::CancelLocal);
        cmds.push(PlaybackCommand::SpeakLocal {
            session_id: self.session_id,
            utterance: Utterance {
                text: join_words_from(tokens, from),
                voice: self.voice.clone(),
                rate: self.settings.rate,
                pitch: self.settings.pitch,
                volume: self.settings.volume,
            },
        });
        AdapterStep::Pending
    }

    fn pause(&mut self, cmds: &mut Vec<PlaybackCommand>) {
        cmds.push(PlaybackCommand::CancelLocal);
    }

    fn on_event(&mut self, event: PlaybackEvent, _cmds: &mut Vec<PlaybackCommand>) -> AdapterStep {
        match event {
            PlaybackEvent::LocalStarted { .. } => AdapterStep::Began {
                index: self.from,
                limit: self.limit,
                interval: Some(local_word_interval(self.settings.rate)),
            },
            PlaybackEvent::LocalEnded { .. } => AdapterStep::Completed,
            PlaybackEvent::LocalFailed { message, .. } => AdapterStep::Failed(message),
            other => {
                debug!(?other, "Local session ignoring event");
                AdapterStep::Continue
            }
        }
    }
}

/// Generates chunk clips remotely and plays them back to back.
#[derive(Debug)]
pub struct RemoteAdapter {
    session_id: u64,
    voice_id: String,
    settings: VoiceSettings,
    chunk_chars: usize,
    cancel: CancellationToken,
    sequencer: ChunkSequencer,
}

impl RemoteAdapter {
    pub fn new(
        session_id: u64,
        voice_id: String,
        settings: VoiceSettings,
        chunk_chars: usize,
    ) -> Self {
        Self {
            session_id,
            voice_id,
            settings,
            chunk_chars: chunk_chars.max(1),
            cancel: CancellationToken::new(),
            sequencer: ChunkSequencer::new(0),
        }
    }

    fn begin_if_idle(&mut self, cmds: &mut Vec<PlaybackCommand>) -> Option<AdapterStep> {
        let chunk = self.sequencer.begin_next()?;
        cmds.push(PlaybackCommand::PlayClip {
            session_id: self.session_id,
            clip_id: chunk.audio.id(),
            path: chunk.audio.path().to_path_buf(),
        });
        Some(AdapterStep::Began {
            index: chunk.start_index,
            limit: chunk.end_index,
            interval: chunk.pacing(),
        })
    }

    fn abort(&mut self, cmds: &mut Vec<PlaybackCommand>) {
        self.cancel.cancel();
        cmds.push(PlaybackCommand::StopClip);
        for handle in self.sequencer.release_all() {
            cmds.push(PlaybackCommand::ReleaseClip(handle));
        }
    }
}

impl EngineAdapter for RemoteAdapter {
    fn start(
        &mut self,
        tokens: &[WordToken],
        from: usize,
        cmds: &mut Vec<PlaybackCommand>,
    ) -> AdapterStep {
        let plans = plan_word_chunks(tokens, from, self.chunk_chars);
        if plans.is_empty() {
            return AdapterStep::Completed;
        }
        debug!(
            session_id = self.session_id,
            chunks = plans.len(),
            from,
            "Planned remote chunks"
        );
        self.sequencer = ChunkSequencer::new(from);
        cmds.push(PlaybackCommand::GenerateChunks {
            session_id: self.session_id,
            plans,
            voice_id: self.voice_id.clone(),
            rate: self.settings.rate,
            pitch: self.settings.pitch,
            cancel: self.cancel.clone(),
        });
        AdapterStep::Pending
    }

    fn pause(&mut self, cmds: &mut Vec<PlaybackCommand>) {
        self.abort(cmds);
    }

    fn on_event(&mut self, event: PlaybackEvent, cmds: &mut Vec<PlaybackCommand>) -> AdapterStep {
        match event {
            PlaybackEvent::ChunkGenerated { chunk, last, .. } => {
                let chunk = AudioChunk {
                    audio: AudioHandle::adopt(chunk.path),
                    start_index: chunk.start_index,
                    end_index: chunk.end_index,
                    estimated_duration: chunk.estimated_duration,
                };
                if let Err(rejected) = self.sequencer.push(chunk) {
                    cmds.push(PlaybackCommand::ReleaseClip(rejected.audio));
                    self.abort(cmds);
                    return AdapterStep::Failed("Received audio out of order".to_string());
                }
                if last {
                    self.sequencer.mark_generation_done();
                }
                self.begin_if_idle(cmds).unwrap_or(AdapterStep::Continue)
            }
            PlaybackEvent::ClipEnded { clip_id, .. } => {
                let Some(handle) = self.sequencer.finish(clip_id) else {
                    return AdapterStep::Continue;
                };
                cmds.push(PlaybackCommand::ReleaseClip(handle));
                if let Some(step) = self.begin_if_idle(cmds) {
                    step
                } else if self.sequencer.is_drained() {
                    AdapterStep::Completed
                } else {
                    debug!(
                        session_id = self.session_id,
                        "Waiting for the next chunk to finish generating"
                    );
                    AdapterStep::Continue
                }
            }
            PlaybackEvent::GenerationFailed { message, .. }
            | PlaybackEvent::ClipFailed { message, .. } => {
                warn!(
                    session_id = self.session_id,
                    held = self.sequencer.held_count(),
                    "Remote session failed: {message}"
                );
                self.abort(cmds);
                AdapterStep::Failed(message)
            }
            other => {
                debug!(?other, "Remote session ignoring event");
                AdapterStep::Continue
            }
        }
    }
}

/// The adapter chosen for the current session.
#[derive(Debug)]
pub enum SessionKind {
    Local(LocalAdapter),
    Remote(RemoteAdapter),
}

impl EngineAdapter for SessionKind {
    fn start(
        &mut self,
        tokens: &[WordToken],
        from: usize,
        cmds: &mut Vec<PlaybackCommand>,
    ) -> AdapterStep {
        match self {
            SessionKind::Local(adapter) => adapter.start(tokens, from, cmds),
            SessionKind::Remote(adapter) => adapter.start(tokens, from, cmds),
        }
    }

    fn pause(&mut self, cmds: &mut Vec<PlaybackCommand>) {
        match self {
            SessionKind::Local(adapter) => adapter.pause(cmds),
            SessionKind::Remote(adapter) => adapter.pause(cmds),
        }
    }

    fn on_event(&mut self, event: PlaybackEvent, cmds: &mut Vec<PlaybackCommand>) -> AdapterStep {
        match self {
            SessionKind::Local(adapter) => adapter.on_event(event, cmds),
            SessionKind::Remote(adapter) => adapter.on_event(event, cmds),
        }
    }
}
