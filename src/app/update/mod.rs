mod playback;
mod reducer;
mod runtime;
mod shortcuts;

use super::messages::Message;
use super::state::App;
use crate::cancellation::CancellationToken;
use crate::config::AppConfig;
use crate::extract::Source;
use crate::playback::PlaybackCommand;
use crate::tts::Utterance;
use iced::event;
use iced::time;
use iced::{Subscription, Task};
use std::time::Duration;

/// Describes work that must be performed outside the pure reducer.
pub(super) enum Effect {
    LoadContent { request_id: u64, source: Source },
    LoadLocalVoices,
    Playback(PlaybackCommand),
    GenerateAudioFile {
        request_id: u64,
        text: String,
        voice_id: String,
        cancel: CancellationToken,
    },
    TestConnection,
    PreviewVoice(Utterance),
    SaveApiKey(String),
    QuitSafely,
}

impl App {
    /// Build the app and kick off voice discovery plus any initial load.
    pub(in crate::app) fn bootstrap(
        config: AppConfig,
        initial_source: Option<String>,
    ) -> (App, Task<Message>) {
        let has_source = initial_source
            .as_deref()
            .is_some_and(|source| !source.trim().is_empty());
        let mut app = App::new(config, initial_source);
        let mut effects = vec![Effect::LoadLocalVoices];
        if has_source {
            effects.extend(app.reduce(Message::LoadSource));
        }
        let task = Task::batch(effects.into_iter().map(|effect| app.run_effect(effect)));
        (app, task)
    }

    pub fn subscription(app: &App) -> Subscription<Message> {
        let mut subscriptions: Vec<Subscription<Message>> =
            vec![event::listen_with(runtime::runtime_event_to_message)];

        if app.needs_ticks() {
            let interval = Duration::from_millis(app.config.tick_interval_ms.max(10));
            subscriptions.push(time::every(interval).map(Message::Tick));
        }

        Subscription::batch(subscriptions)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let effects = self.reduce(message);
        if effects.is_empty() {
            Task::none()
        } else {
            Task::batch(effects.into_iter().map(|effect| self.run_effect(effect)))
        }
    }

    fn needs_ticks(&self) -> bool {
        self.controller.needs_ticks()
            || self.clip.is_some()
            || self.utterance.is_some()
            || self.preview.is_some()
    }
}
