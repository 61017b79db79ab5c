//! The playback state machine.
//!
//! The controller owns the word index and the active session. Hosts feed it
//! user intents, timer ticks and engine events, and carry out the commands
//! it returns in order.

use super::events::{PlaybackCommand, PlaybackEvent};
use super::session::{AdapterStep, EngineAdapter, LocalAdapter, RemoteAdapter, SessionKind};
use super::state::{Lifecycle, PlaybackState, VoiceSettings, clamp_multiplier};
use crate::config::{AppConfig, Engine};
use crate::text_utils::{WordToken, tokenize};
use crate::timing::WordTimer;
use crate::tts::AudioHandle;
use crate::voices::{VoiceCatalog, VoiceOption};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub skip_words: usize,
    pub restart_delay: Duration,
    pub chunk_chars: usize,
    pub settings: VoiceSettings,
}

impl ControllerOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            skip_words: config.skip_words,
            restart_delay: Duration::from_millis(config.restart_delay_ms),
            chunk_chars: config.playback_chunk_chars,
            settings: VoiceSettings::new(config.rate, config.pitch, config.volume),
        }
    }
}

pub struct PlaybackController {
    tokens: Arc<[WordToken]>,
    index: usize,
    lifecycle: Lifecycle,
    engine: Engine,
    voice: Option<VoiceOption>,
    options: ControllerOptions,
    session_seq: u64,
    session: Option<SessionKind>,
    timer: Option<WordTimer>,
    pending_restart: Option<Instant>,
    error: Option<String>,
}

impl PlaybackController {
    pub fn new(engine: Engine, options: ControllerOptions) -> Self {
        Self {
            tokens: Arc::from(Vec::new()),
            index: 0,
            lifecycle: Lifecycle::Idle,
            engine,
            voice: None,
            options,
            session_seq: 0,
            session: None,
            timer: None,
            pending_restart: None,
            error: None,
        }
    }

    /// Replace the content; any running session is torn down.
    pub fn set_content(&mut self, content: &str) -> Vec<PlaybackCommand> {
        let mut cmds = Vec::new();
        self.pending_restart = None;
        self.teardown(&mut cmds);
        self.tokens = Arc::from(tokenize(content));
        self.index = 0;
        info!(words = self.tokens.len(), "Loaded content for playback");
        cmds
    }

    pub fn tokens(&self) -> Arc<[WordToken]> {
        Arc::clone(&self.tokens)
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            is_playing: matches!(self.lifecycle, Lifecycle::Playing { .. }),
            is_preparing: matches!(self.lifecycle, Lifecycle::Preparing { .. }),
            current_word_index: self.index,
            word_count: self.tokens.len(),
            engine: self.engine,
        }
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn voice(&self) -> Option<&VoiceOption> {
        self.voice.as_ref()
    }

    pub fn settings(&self) -> VoiceSettings {
        self.options.settings
    }

    /// A session is running or about to restart.
    pub fn needs_ticks(&self) -> bool {
        self.session.is_some() || self.pending_restart.is_some()
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    pub fn play(&mut self, now: Instant) -> Vec<PlaybackCommand> {
        let mut cmds = Vec::new();
        self.pending_restart = None;
        if self.tokens.is_empty() {
            debug!("Play requested with no content");
            return cmds;
        }
        let Some(voice) = self.voice.clone() else {
            debug!("Play requested with no voice selected");
            return cmds;
        };
        self.teardown(&mut cmds);
        self.index = self.index.min(self.tokens.len() - 1);

        self.session_seq = self.session_seq.wrapping_add(1);
        let session_id = self.session_seq;
        let mut session = match self.engine {
            Engine::Local => match voice.native {
                Some(native) => {
                    SessionKind::Local(LocalAdapter::new(session_id, native, self.options.settings))
                }
                None => {
                    self.error = Some(format!("Voice {} is not available locally", voice.name));
                    return cmds;
                }
            },
            Engine::Remote => SessionKind::Remote(RemoteAdapter::new(
                session_id,
                voice.id.clone(),
                self.options.settings,
                self.options.chunk_chars,
            )),
        };
        info!(
            session_id,
            engine = ?self.engine,
            voice = %voice.id,
            from = self.index,
            "Starting playback session"
        );
        let tokens = Arc::clone(&self.tokens);
        let step = session.start(&tokens, self.index, &mut cmds);
        self.session = Some(session);
        self.lifecycle = Lifecycle::Preparing { session_id };
        self.apply_step(step, now);
        cmds
    }

    /// Stop the session and keep the current index.
    pub fn pause(&mut self) -> Vec<PlaybackCommand> {
        let mut cmds = Vec::new();
        self.pending_restart = None;
        self.teardown(&mut cmds);
        cmds
    }

    pub fn toggle(&mut self, now: Instant) -> Vec<PlaybackCommand> {
        if self.needs_ticks() {
            self.pause()
        } else {
            self.play(now)
        }
    }

    pub fn skip_forward(&mut self, now: Instant) -> Vec<PlaybackCommand> {
        let target = self.index.saturating_add(self.options.skip_words);
        self.seek_to(target, now)
    }

    pub fn skip_back(&mut self, now: Instant) -> Vec<PlaybackCommand> {
        let target = self.index.saturating_sub(self.options.skip_words);
        self.seek_to(target, now)
    }

    /// Move to `index` (clamped); a running session restarts from there
    /// after the configured delay.
    pub fn seek_to(&mut self, index: usize, now: Instant) -> Vec<PlaybackCommand> {
        let mut cmds = Vec::new();
        if self.tokens.is_empty() {
            return cmds;
        }
        let was_running = self.needs_ticks();
        self.teardown(&mut cmds);
        self.index = index.min(self.tokens.len() - 1);
        debug!(index = self.index, was_running, "Seek");
        if was_running {
            if self.options.restart_delay.is_zero() {
                cmds.extend(self.play(now));
            } else {
                self.pending_restart = Some(now + self.options.restart_delay);
            }
        }
        cmds
    }

    /// Advance the highlight timer and fire any due restart.
    pub fn tick(&mut self, now: Instant) -> Vec<PlaybackCommand> {
        if self.pending_restart.is_some_and(|due| now >= due) {
            return self.play(now);
        }
        if let Some(timer) = self.timer.as_mut() {
            if let Some(position) = timer.advance(now) {
                self.index = self.index.max(position);
            }
            if timer.is_exhausted() {
                debug!(position = timer.position(), "Word timer reached its limit");
                self.timer = None;
            }
        }
        Vec::new()
    }

    pub fn handle_event(&mut self, event: PlaybackEvent, now: Instant) -> Vec<PlaybackCommand> {
        let mut cmds = Vec::new();
        let current = self.lifecycle.session_id();
        let (Some(session), true) = (self.session.as_mut(), current == Some(event.session_id()))
        else {
            debug!(
                event_session = event.session_id(),
                current = ?current,
                "Ignoring stale playback event"
            );
            if let PlaybackEvent::ChunkGenerated { chunk, .. } = event {
                cmds.push(PlaybackCommand::ReleaseClip(AudioHandle::adopt(chunk.path)));
            }
            return cmds;
        };
        let step = session.on_event(event, &mut cmds);
        self.apply_step(step, now);
        cmds
    }

    /// Switch backends; a voice from the other engine is replaced by the
    /// new engine's default.
    pub fn switch_engine(&mut self, engine: Engine, catalog: &VoiceCatalog) -> Vec<PlaybackCommand> {
        let mut cmds = Vec::new();
        if engine == self.engine {
            return cmds;
        }
        self.pending_restart = None;
        self.teardown(&mut cmds);
        self.engine = engine;
        if self.voice.as_ref().is_none_or(|voice| voice.engine != engine) {
            self.voice = catalog.default_voice(engine).cloned();
        }
        info!(
            engine = ?engine,
            voice = ?self.voice.as_ref().map(|v| v.id.as_str()),
            "Switched engine"
        );
        cmds
    }

    /// Pick a default voice if none is selected yet.
    pub fn ensure_voice(&mut self, catalog: &VoiceCatalog) {
        if self.voice.is_none() {
            self.voice = catalog.default_voice(self.engine).cloned();
        }
    }

    pub fn select_voice(&mut self, voice: VoiceOption) {
        if voice.engine != self.engine {
            warn!(voice = %voice.id, "Ignoring voice for another engine");
            return;
        }
        self.voice = Some(voice);
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.options.settings.rate = clamp_multiplier(rate);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.options.settings.pitch = clamp_multiplier(pitch);
    }

    fn teardown(&mut self, cmds: &mut Vec<PlaybackCommand>) {
        self.timer = None;
        if let Some(mut session) = self.session.take() {
            session.pause(cmds);
            debug!(index = self.index, "Tore down playback session");
        }
        self.lifecycle = Lifecycle::Idle;
    }

    fn apply_step(&mut self, step: AdapterStep, now: Instant) {
        match step {
            AdapterStep::Pending | AdapterStep::Continue => {}
            AdapterStep::Began {
                index,
                limit,
                interval,
            } => {
                if let Some(session_id) = self.lifecycle.session_id() {
                    self.lifecycle = Lifecycle::Playing { session_id };
                }
                self.index = self.index.max(index);
                let start = self.index;
                self.timer =
                    interval.and_then(|interval| WordTimer::arm(start, limit, interval, now));
            }
            AdapterStep::Completed => {
                info!("Playback finished");
                self.session = None;
                self.timer = None;
                self.lifecycle = Lifecycle::Idle;
                self.index = 0;
            }
            AdapterStep::Failed(message) => {
                warn!(index = self.index, "Playback failed: {message}");
                self.session = None;
                self.timer = None;
                self.lifecycle = Lifecycle::Idle;
                self.error = Some(message);
            }
        }
    }
}
