use super::super::state::App;
use super::Effect;
use crate::playback::{PlaybackCommand, PlaybackEvent};
use crate::tts::UtteranceStatus;
use std::time::Instant;
use tracing::{debug, warn};

impl App {
    pub(super) fn handle_toggle_play_pause(&mut self, effects: &mut Vec<Effect>) {
        if !self.show_reader {
            return;
        }
        let cmds = self.controller.toggle(Instant::now());
        self.push_playback(cmds, effects);
    }

    pub(super) fn handle_play(&mut self, effects: &mut Vec<Effect>) {
        let cmds = self.controller.play(Instant::now());
        self.push_playback(cmds, effects);
    }

    pub(super) fn handle_pause(&mut self, effects: &mut Vec<Effect>) {
        let cmds = self.controller.pause();
        self.push_playback(cmds, effects);
    }

    pub(super) fn handle_skip_forward(&mut self, effects: &mut Vec<Effect>) {
        let cmds = self.controller.skip_forward(Instant::now());
        self.push_playback(cmds, effects);
    }

    pub(super) fn handle_skip_back(&mut self, effects: &mut Vec<Effect>) {
        let cmds = self.controller.skip_back(Instant::now());
        self.push_playback(cmds, effects);
    }

    pub(super) fn handle_word_clicked(&mut self, index: usize, effects: &mut Vec<Effect>) {
        let cmds = self.controller.seek_to(index, Instant::now());
        self.push_playback(cmds, effects);
    }

    pub(super) fn handle_set_rate(&mut self, rate: f32) {
        self.controller.set_rate(rate);
        self.config.rate = self.controller.settings().rate;
    }

    pub(super) fn handle_set_pitch(&mut self, pitch: f32) {
        self.controller.set_pitch(pitch);
        self.config.pitch = self.controller.settings().pitch;
    }

    pub(super) fn handle_playback_event(&mut self, event: PlaybackEvent, effects: &mut Vec<Effect>) {
        let cmds = self.controller.handle_event(event, Instant::now());
        self.push_playback(cmds, effects);
    }

    /// Poll the running audio, then let the controller advance its timer.
    pub(super) fn handle_tick(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        let mut events = Vec::new();

        if let Some(active) = self.utterance.as_mut() {
            let session_id = active.session_id;
            match active.utterance.poll() {
                UtteranceStatus::Running => {}
                UtteranceStatus::Finished => {
                    self.utterance = None;
                    events.push(PlaybackEvent::LocalEnded { session_id });
                }
                UtteranceStatus::Failed(message) => {
                    self.utterance = None;
                    events.push(PlaybackEvent::LocalFailed {
                        session_id,
                        message,
                    });
                }
            }
        }

        let clip_done = self
            .clip
            .as_ref()
            .is_some_and(|active| active.playback.is_finished());
        if clip_done {
            if let Some(active) = self.clip.take() {
                events.push(PlaybackEvent::ClipEnded {
                    session_id: active.session_id,
                    clip_id: active.playback.clip_id(),
                });
                active.playback.stop();
            }
        }

        let preview_done = self
            .preview
            .as_mut()
            .is_some_and(|preview| preview.poll() != UtteranceStatus::Running);
        if preview_done {
            if let Some(preview) = self.preview.take() {
                preview.cancel();
            }
        }

        for event in events {
            let cmds = self.controller.handle_event(event, now);
            self.push_playback(cmds, effects);
        }
        let cmds = self.controller.tick(now);
        self.push_playback(cmds, effects);
    }

    pub(super) fn push_playback(&mut self, cmds: Vec<PlaybackCommand>, effects: &mut Vec<Effect>) {
        effects.extend(cmds.into_iter().map(Effect::Playback));
        if let Some(error) = self.controller.take_error() {
            warn!("Playback stopped: {error}");
            self.error = Some(error);
        }
    }

    /// Run the teardown commands that need no background work.
    pub(in crate::app) fn execute_silently(&mut self, cmd: PlaybackCommand) {
        match cmd {
            PlaybackCommand::CancelLocal => self.cancel_utterance(),
            PlaybackCommand::StopClip => self.stop_clip(),
            PlaybackCommand::ReleaseClip(handle) => handle.release(),
            other => debug!(?other, "Skipping playback command"),
        }
    }

    pub(super) fn cancel_utterance(&mut self) {
        if let Some(active) = self.utterance.take() {
            debug!(session_id = active.session_id, "Cancelling local utterance");
            active.utterance.cancel();
        }
    }

    pub(super) fn stop_clip(&mut self) {
        if let Some(active) = self.clip.take() {
            debug!(
                session_id = active.session_id,
                clip_id = active.playback.clip_id(),
                "Stopping clip"
            );
            active.playback.stop();
        }
    }
}
