use super::super::messages::Message;
use super::super::state::App;
use super::Effect;
use crate::cancellation::CancellationToken;
use crate::config::{Engine, ProcessMode};
use crate::extract::Source;
use crate::tts::Utterance;
use crate::tts::local::VOICE_PREVIEW_PHRASE;
use crate::voices::VoiceOption;
use std::path::PathBuf;
use tracing::{info, warn};

impl App {
    pub(super) fn reduce(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::SourceInputChanged(input) => self.source_input = input,
            Message::LoadSource => self.handle_load_source(&mut effects),
            Message::ContentLoaded {
                request_id,
                content,
            } => self.handle_content_loaded(request_id, content, &mut effects),
            Message::ContentLoadFailed { request_id, error } => {
                self.handle_content_load_failed(request_id, error)
            }
            Message::LocalVoicesLoaded { voices, error } => {
                self.handle_local_voices_loaded(voices, error)
            }
            Message::EngineSelected(engine) => self.handle_engine_selected(engine, &mut effects),
            Message::VoiceSelected(voice) => self.handle_voice_selected(voice),
            Message::ProcessModeSelected(mode) => self.process_mode = mode,
            Message::ApiKeyInputChanged(input) => self.api_key_input = input,
            Message::SaveApiKey => self.handle_save_api_key(&mut effects),
            Message::CancelApiKeyPrompt => {
                self.awaiting_api_key = false;
                self.api_key_input.clear();
            }
            Message::TestConnection => self.handle_test_connection(&mut effects),
            Message::ConnectionTested { error } => self.handle_connection_tested(error),
            Message::PreviewVoice => self.handle_preview_voice(&mut effects),
            Message::StartReading => self.handle_start_reading(&mut effects),
            Message::CancelGeneration => self.handle_cancel_generation(),
            Message::AudioFileGenerated {
                request_id,
                path,
                error,
            } => self.handle_audio_file_generated(request_id, path, error),
            Message::CloseReader => self.handle_close_reader(&mut effects),
            Message::ToggleSettings => self.show_settings = !self.show_settings,
            Message::TogglePlayPause => self.handle_toggle_play_pause(&mut effects),
            Message::Play => self.handle_play(&mut effects),
            Message::Pause => self.handle_pause(&mut effects),
            Message::SkipForward => self.handle_skip_forward(&mut effects),
            Message::SkipBack => self.handle_skip_back(&mut effects),
            Message::WordClicked(index) => self.handle_word_clicked(index, &mut effects),
            Message::SetRate(rate) => self.handle_set_rate(rate),
            Message::SetPitch(pitch) => self.handle_set_pitch(pitch),
            Message::Playback(event) => self.handle_playback_event(event, &mut effects),
            Message::BackgroundTaskLost => {
                warn!("Background task ended without reporting back");
                self.is_loading = false;
                self.testing_connection = false;
                self.generation = None;
            }
            Message::DismissError => self.error = None,
            Message::KeyPressed { key, modifiers } => {
                if let Some(shortcut) = self.shortcut_message_for_key(key, modifiers) {
                    effects.extend(self.reduce(shortcut));
                }
            }
            Message::SafeQuit => effects.push(Effect::QuitSafely),
            Message::Tick(now) => self.handle_tick(now, &mut effects),
        }

        effects
    }

    fn handle_load_source(&mut self, effects: &mut Vec<Effect>) {
        let input = self.source_input.trim();
        if input.is_empty() {
            self.error = Some("Enter a URL or a path to a .txt or .pdf file.".to_string());
            return;
        }
        let source = Source::parse(input);
        self.content_request = self.content_request.wrapping_add(1);
        self.is_loading = true;
        self.error = None;
        self.notice = None;
        info!(?source, request_id = self.content_request, "Loading content");
        effects.push(Effect::LoadContent {
            request_id: self.content_request,
            source,
        });
    }

    fn handle_content_loaded(&mut self, request_id: u64, content: String, effects: &mut Vec<Effect>) {
        if request_id != self.content_request {
            return;
        }
        self.is_loading = false;
        self.show_reader = false;
        let cmds = self.controller.set_content(&content);
        self.push_playback(cmds, effects);
        self.content = content;
        info!(words = self.word_count(), "Content ready");
    }

    fn handle_content_load_failed(&mut self, request_id: u64, error: String) {
        if request_id != self.content_request {
            return;
        }
        warn!("Content extraction failed: {error}");
        self.is_loading = false;
        self.error = Some(error);
    }

    fn handle_local_voices_loaded(&mut self, voices: Vec<VoiceOption>, error: Option<String>) {
        if let Some(error) = error {
            warn!("Local voices unavailable: {error}");
            self.error = Some(format!("Local speech is unavailable: {error}"));
        }
        self.voices.set_local(voices);
        self.select_configured_voice();
    }

    fn handle_engine_selected(&mut self, engine: Engine, effects: &mut Vec<Effect>) {
        if engine.requires_api_key() && self.api_key.is_none() {
            info!("Remote engine needs an API key; prompting");
            self.awaiting_api_key = true;
            return;
        }
        if engine == Engine::Local && self.voices.voices_for(Engine::Local).is_empty() {
            effects.push(Effect::LoadLocalVoices);
        }
        self.switch_engine(engine, effects);
    }

    fn switch_engine(&mut self, engine: Engine, effects: &mut Vec<Effect>) {
        let cmds = self.controller.switch_engine(engine, &self.voices);
        self.push_playback(cmds, effects);
        self.config.engine = engine;
    }

    fn handle_voice_selected(&mut self, voice: VoiceOption) {
        match voice.engine {
            Engine::Local => self.config.local_voice = Some(voice.id.clone()),
            Engine::Remote => self.config.remote_voice = Some(voice.id.clone()),
        }
        self.controller.select_voice(voice);
    }

    fn handle_save_api_key(&mut self, effects: &mut Vec<Effect>) {
        let key = self.api_key_input.trim().to_string();
        if key.is_empty() {
            self.error = Some("Please enter a Hugging Face API key.".to_string());
            return;
        }
        self.api_key = Some(key.clone());
        self.api_key_input.clear();
        effects.push(Effect::SaveApiKey(key));
        if self.awaiting_api_key {
            self.awaiting_api_key = false;
            self.switch_engine(Engine::Remote, effects);
        }
    }

    fn handle_test_connection(&mut self, effects: &mut Vec<Effect>) {
        if self.api_key.is_none() {
            self.awaiting_api_key = true;
            return;
        }
        self.testing_connection = true;
        self.notice = None;
        effects.push(Effect::TestConnection);
    }

    fn handle_connection_tested(&mut self, error: Option<String>) {
        self.testing_connection = false;
        match error {
            Some(error) => self.error = Some(error),
            None => self.notice = Some("Connection to Hugging Face succeeded.".to_string()),
        }
    }

    fn handle_preview_voice(&mut self, effects: &mut Vec<Effect>) {
        let Some(native) = self
            .controller
            .voice()
            .and_then(|voice| voice.native.clone())
        else {
            self.notice = Some("Voice preview is available for local voices.".to_string());
            return;
        };
        if let Some(previous) = self.preview.take() {
            previous.cancel();
        }
        effects.push(Effect::PreviewVoice(Utterance {
            text: VOICE_PREVIEW_PHRASE.to_string(),
            voice: native,
            rate: 1.0,
            pitch: 1.0,
            volume: 0.8,
        }));
    }

    fn handle_start_reading(&mut self, effects: &mut Vec<Effect>) {
        if self.content.trim().is_empty() {
            return;
        }
        match self.process_mode {
            ProcessMode::Stream => self.show_reader = true,
            ProcessMode::Generate => self.handle_generate_audio_file(effects),
        }
    }

    fn handle_generate_audio_file(&mut self, effects: &mut Vec<Effect>) {
        if self.is_generating() {
            return;
        }
        let ready = self.controller.engine() == Engine::Remote && self.api_key.is_some();
        let voice_id = self
            .controller
            .voice()
            .filter(|voice| voice.engine == Engine::Remote)
            .map(|voice| voice.id.clone());
        match (ready, voice_id) {
            (true, Some(voice_id)) => {
                self.generation_request = self.generation_request.wrapping_add(1);
                let cancel = CancellationToken::new();
                self.generation = Some(cancel.clone());
                self.notice = Some("Generating audio file...".to_string());
                info!(request_id = self.generation_request, "Generating audio file");
                effects.push(Effect::GenerateAudioFile {
                    request_id: self.generation_request,
                    text: self.content.clone(),
                    voice_id,
                    cancel,
                });
            }
            _ => {
                self.notice = Some(
                    "Audio generation is available with Hugging Face Kokoro-82M. \
                     Select it as your engine and configure an API key."
                        .to_string(),
                );
            }
        }
    }

    fn handle_cancel_generation(&mut self) {
        if let Some(token) = self.generation.take() {
            token.cancel();
            self.notice = Some("Audio generation cancelled.".to_string());
        }
    }

    fn handle_audio_file_generated(
        &mut self,
        request_id: u64,
        path: Option<PathBuf>,
        error: Option<String>,
    ) {
        if request_id != self.generation_request {
            info!(request_id, "Discarding result of an earlier generation");
            return;
        }
        let was_cancelled = self.generation.take().is_none();
        if let Some(path) = path {
            self.notice = Some(format!("Saved audio to {}", path.display()));
        } else if was_cancelled {
            info!("Discarding result of a cancelled generation");
        } else if let Some(error) = error {
            self.notice = None;
            self.error = Some(error);
        }
    }

    fn handle_close_reader(&mut self, effects: &mut Vec<Effect>) {
        let cmds = self.controller.pause();
        self.push_playback(cmds, effects);
        self.show_reader = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn app_with_cache(cache: &tempfile::TempDir) -> App {
        let config = AppConfig {
            cache_dir: cache.path().display().to_string(),
            ..AppConfig::default()
        };
        App::new(config, None)
    }

    fn load_content(app: &mut App, content: &str) {
        let request_id = app.content_request;
        app.reduce(Message::ContentLoaded {
            request_id,
            content: content.to_string(),
        });
    }

    fn remote_app(cache: &tempfile::TempDir) -> App {
        let mut app = app_with_cache(cache);
        app.api_key = Some("hf_test".to_string());
        app.reduce(Message::EngineSelected(Engine::Remote));
        load_content(&mut app, "The quick brown fox. Jumps over the lazy dog.");
        app.process_mode = ProcessMode::Generate;
        app
    }

    fn generation_request(effects: &[Effect]) -> Option<u64> {
        effects.iter().find_map(|effect| match effect {
            Effect::GenerateAudioFile { request_id, .. } => Some(*request_id),
            _ => None,
        })
    }

    #[test]
    fn remote_without_key_prompts_instead_of_switching() {
        let cache = tempfile::tempdir().unwrap();
        let mut app = app_with_cache(&cache);
        app.reduce(Message::EngineSelected(Engine::Remote));
        assert!(app.awaiting_api_key);
        assert_eq!(app.controller.engine(), Engine::Local);
        assert_eq!(app.config.engine, Engine::Local);
    }

    #[test]
    fn blank_key_is_rejected() {
        let cache = tempfile::tempdir().unwrap();
        let mut app = app_with_cache(&cache);
        app.reduce(Message::EngineSelected(Engine::Remote));
        app.reduce(Message::ApiKeyInputChanged("   ".to_string()));
        let effects = app.reduce(Message::SaveApiKey);
        assert!(effects.is_empty());
        assert!(app.error.is_some());
        assert!(app.api_key.is_none());
        assert!(app.awaiting_api_key);
        assert_eq!(app.controller.engine(), Engine::Local);
    }

    #[test]
    fn saving_key_completes_pending_switch() {
        let cache = tempfile::tempdir().unwrap();
        let mut app = app_with_cache(&cache);
        app.reduce(Message::EngineSelected(Engine::Remote));
        app.reduce(Message::ApiKeyInputChanged(" hf_abc ".to_string()));
        let effects = app.reduce(Message::SaveApiKey);
        assert!(
            effects
                .iter()
                .any(|effect| matches!(effect, Effect::SaveApiKey(key) if key == "hf_abc"))
        );
        assert_eq!(app.api_key.as_deref(), Some("hf_abc"));
        assert!(!app.awaiting_api_key);
        assert_eq!(app.controller.engine(), Engine::Remote);
        assert_eq!(
            app.controller.voice().map(|voice| voice.engine),
            Some(Engine::Remote)
        );
    }

    #[test]
    fn remote_config_without_key_starts_on_local() {
        let cache = tempfile::tempdir().unwrap();
        let config = AppConfig {
            engine: Engine::Remote,
            cache_dir: cache.path().display().to_string(),
            ..AppConfig::default()
        };
        let app = App::new(config, None);
        assert_eq!(app.controller.engine(), Engine::Local);
        assert_eq!(app.config.engine, Engine::Local);
    }

    #[test]
    fn selecting_local_requeries_missing_voices() {
        let cache = tempfile::tempdir().unwrap();
        let mut app = remote_app(&cache);
        let effects = app.reduce(Message::EngineSelected(Engine::Local));
        assert!(
            effects
                .iter()
                .any(|effect| matches!(effect, Effect::LoadLocalVoices))
        );
        assert_eq!(app.controller.engine(), Engine::Local);
    }

    #[test]
    fn generate_is_refused_on_local_engine() {
        let cache = tempfile::tempdir().unwrap();
        let mut app = app_with_cache(&cache);
        app.api_key = Some("hf_test".to_string());
        load_content(&mut app, "Some words to read.");
        app.process_mode = ProcessMode::Generate;
        let effects = app.reduce(Message::StartReading);
        assert_eq!(generation_request(&effects), None);
        assert!(!app.is_generating());
        assert!(app.notice.is_some());
    }

    #[test]
    fn generate_is_refused_without_key() {
        let cache = tempfile::tempdir().unwrap();
        let mut app = remote_app(&cache);
        app.api_key = None;
        let effects = app.reduce(Message::StartReading);
        assert_eq!(generation_request(&effects), None);
        assert!(!app.is_generating());
    }

    #[test]
    fn late_result_of_cancelled_run_leaves_new_run_alone() {
        let cache = tempfile::tempdir().unwrap();
        let mut app = remote_app(&cache);

        let first = generation_request(&app.reduce(Message::StartReading)).unwrap();
        app.reduce(Message::CancelGeneration);
        assert!(!app.is_generating());
        let second = generation_request(&app.reduce(Message::StartReading)).unwrap();
        assert_ne!(first, second);

        app.reduce(Message::AudioFileGenerated {
            request_id: first,
            path: None,
            error: Some("generation cancelled".to_string()),
        });
        assert!(app.error.is_none());
        assert!(app.is_generating());

        app.reduce(Message::AudioFileGenerated {
            request_id: second,
            path: None,
            error: Some("HTTP 503".to_string()),
        });
        assert_eq!(app.error.as_deref(), Some("HTTP 503"));
        assert!(!app.is_generating());
    }

    #[test]
    fn cancelled_run_result_is_discarded() {
        let cache = tempfile::tempdir().unwrap();
        let mut app = remote_app(&cache);
        let request_id = generation_request(&app.reduce(Message::StartReading)).unwrap();
        app.reduce(Message::CancelGeneration);
        app.reduce(Message::AudioFileGenerated {
            request_id,
            path: None,
            error: Some("generation cancelled".to_string()),
        });
        assert!(app.error.is_none());
    }

    #[test]
    fn stale_content_is_ignored() {
        let cache = tempfile::tempdir().unwrap();
        let mut app = app_with_cache(&cache);
        app.reduce(Message::SourceInputChanged("first.txt".to_string()));
        app.reduce(Message::LoadSource);
        let stale = app.content_request;
        app.reduce(Message::SourceInputChanged("second.txt".to_string()));
        app.reduce(Message::LoadSource);

        app.reduce(Message::ContentLoaded {
            request_id: stale,
            content: "old words".to_string(),
        });
        assert!(app.content.is_empty());
        assert!(app.is_loading);

        app.reduce(Message::ContentLoadFailed {
            request_id: stale,
            error: "gone".to_string(),
        });
        assert!(app.error.is_none());

        let current = app.content_request;
        app.reduce(Message::ContentLoaded {
            request_id: current,
            content: "new words here".to_string(),
        });
        assert_eq!(app.content, "new words here");
        assert_eq!(app.word_count(), 3);
        assert!(!app.is_loading);
    }
}
