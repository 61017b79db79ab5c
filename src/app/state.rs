use crate::cache;
use crate::cancellation::CancellationToken;
use crate::config::{AppConfig, Engine, ProcessMode};
use crate::playback::{ControllerOptions, PlaybackController};
use crate::tts::{ClipPlayback, LocalSpeechEngine, LocalUtterance};
use crate::voices::VoiceCatalog;
use iced::Color;
use std::path::{Path, PathBuf};

/// The clip playing for a remote session.
pub(super) struct ActiveClip {
    pub(super) session_id: u64,
    pub(super) playback: ClipPlayback,
}

/// The utterance speaking for a local session.
pub(super) struct ActiveUtterance {
    pub(super) session_id: u64,
    pub(super) utterance: LocalUtterance,
}

/// Core application state.
pub struct App {
    pub(super) config: AppConfig,
    pub(super) source_input: String,
    pub(super) content: String,
    pub(super) content_request: u64,
    pub(super) is_loading: bool,
    pub(super) controller: PlaybackController,
    pub(super) voices: VoiceCatalog,
    pub(super) local_engine: LocalSpeechEngine,
    pub(super) process_mode: ProcessMode,
    pub(super) api_key: Option<String>,
    pub(super) api_key_input: String,
    pub(super) awaiting_api_key: bool,
    pub(super) testing_connection: bool,
    pub(super) generation: Option<CancellationToken>,
    pub(super) generation_request: u64,
    pub(super) show_reader: bool,
    pub(super) show_settings: bool,
    pub(super) error: Option<String>,
    pub(super) notice: Option<String>,
    pub(super) clip: Option<ActiveClip>,
    pub(super) utterance: Option<ActiveUtterance>,
    pub(super) preview: Option<LocalUtterance>,
}

impl App {
    pub(super) fn new(config: AppConfig, initial_source: Option<String>) -> Self {
        let api_key = cache::load_api_key(Path::new(&config.cache_dir));
        let controller =
            PlaybackController::new(config.engine, ControllerOptions::from_config(&config));
        let mut app = Self {
            local_engine: LocalSpeechEngine::new(config.espeak_bin.clone()),
            process_mode: config.process_mode,
            source_input: initial_source.unwrap_or_default(),
            content: String::new(),
            content_request: 0,
            is_loading: false,
            controller,
            voices: VoiceCatalog::default(),
            api_key,
            api_key_input: String::new(),
            awaiting_api_key: false,
            testing_connection: false,
            generation: None,
            generation_request: 0,
            show_reader: false,
            show_settings: false,
            error: None,
            notice: None,
            clip: None,
            utterance: None,
            preview: None,
            config,
        };
        if app.config.engine.requires_api_key() && app.api_key.is_none() {
            tracing::warn!("Remote engine configured without an API key; falling back to local");
            for cmd in app.controller.switch_engine(Engine::Local, &app.voices) {
                app.execute_silently(cmd);
            }
            app.config.engine = Engine::Local;
        }
        app.select_configured_voice();
        app
    }

    pub(super) fn cache_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.cache_dir)
    }

    /// Honor the voice named in the config when it is available.
    pub(super) fn select_configured_voice(&mut self) {
        let engine = self.controller.engine();
        let wanted = match engine {
            Engine::Local => self.config.local_voice.as_deref(),
            Engine::Remote => self.config.remote_voice.as_deref(),
        };
        if let Some(voice) = wanted.and_then(|id| self.voices.find(engine, id)).cloned() {
            self.controller.select_voice(voice);
        } else {
            self.controller.ensure_voice(&self.voices);
        }
    }

    pub(super) fn word_count(&self) -> usize {
        self.controller.state().word_count
    }

    pub(super) fn is_generating(&self) -> bool {
        self.generation.is_some()
    }

    /// Stop everything audible; used before quitting.
    pub(super) fn stop_all_audio(&mut self) {
        for cmd in self.controller.pause() {
            self.execute_silently(cmd);
        }
        if let Some(preview) = self.preview.take() {
            preview.cancel();
        }
        if let Some(token) = self.generation.take() {
            token.cancel();
        }
    }

    pub(super) fn highlight_color(&self) -> Color {
        let base = self.config.highlight;
        Color {
            r: base.r,
            g: base.g,
            b: base.b,
            a: base.a,
        }
    }
}
