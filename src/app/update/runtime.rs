use super::super::messages::Message;
use super::super::state::{ActiveClip, ActiveUtterance, App};
use super::Effect;
use crate::cache;
use crate::error::{ReaderError, RemoteGenerationError};
use crate::extract::Extractor;
use crate::playback::{GeneratedChunk, PlaybackCommand, PlaybackEvent};
use crate::tts::batch::generate_audio_file;
use crate::tts::remote::generate_chunks;
use crate::tts::{AudioHandle, ClipPlayback, RemoteTtsClient};
use iced::Event;
use iced::Task;
use iced::event;
use iced::futures::channel::{mpsc, oneshot};
use iced::keyboard;
use iced::window;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

impl App {
    pub(super) fn run_effect(&mut self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::LoadContent { request_id, source } => {
                let extractor = Extractor::new(
                    self.config.pdftotext_bin.clone(),
                    Duration::from_secs(self.config.request_timeout_secs.max(1)),
                );
                spawn_blocking("extract", move || match extractor.extract(&source) {
                    Ok(content) => Message::ContentLoaded {
                        request_id,
                        content,
                    },
                    Err(err) => Message::ContentLoadFailed {
                        request_id,
                        error: banner_text(err),
                    },
                })
            }
            Effect::LoadLocalVoices => {
                let engine = self.local_engine.clone();
                spawn_blocking("local-voices", move || match engine.list_voices() {
                    Ok(voices) => Message::LocalVoicesLoaded {
                        voices,
                        error: None,
                    },
                    Err(err) => Message::LocalVoicesLoaded {
                        voices: Vec::new(),
                        error: Some(banner_text(err)),
                    },
                })
            }
            Effect::Playback(cmd) => self.run_playback_command(cmd),
            Effect::GenerateAudioFile {
                request_id,
                text,
                voice_id,
                cancel,
            } => {
                let settings = self.controller.settings();
                let client = match self.remote_client(settings.rate, settings.pitch) {
                    Ok(client) => client,
                    Err(err) => {
                        return Task::done(Message::AudioFileGenerated {
                            request_id,
                            path: None,
                            error: Some(banner_text(err)),
                        });
                    }
                };
                let max_chars = self.config.batch_chunk_chars;
                let output_dir = PathBuf::from(&self.config.output_dir);
                spawn_blocking("audio-file", move || {
                    match generate_audio_file(&client, &text, &voice_id, max_chars, &cancel, &output_dir)
                    {
                        Ok(output) => {
                            info!(
                                path = %output.path.display(),
                                chunks = output.chunk_count,
                                estimated_secs = output.estimated_duration.as_secs(),
                                request_id,
                                "Audio file ready"
                            );
                            Message::AudioFileGenerated {
                                request_id,
                                path: Some(output.path),
                                error: None,
                            }
                        }
                        Err(err) => Message::AudioFileGenerated {
                            request_id,
                            path: None,
                            error: Some(format!("{err:#}")),
                        },
                    }
                })
            }
            Effect::TestConnection => {
                let client = match self.remote_client(1.0, 1.0) {
                    Ok(client) => client,
                    Err(err) => {
                        return Task::done(Message::ConnectionTested {
                            error: Some(banner_text(err)),
                        });
                    }
                };
                spawn_blocking("connection-test", move || Message::ConnectionTested {
                    error: client.test_connection().err().map(banner_text),
                })
            }
            Effect::PreviewVoice(utterance) => {
                match self.local_engine.speak(&utterance) {
                    Ok(running) => self.preview = Some(running),
                    Err(err) => self.error = Some(banner_text(err)),
                }
                Task::none()
            }
            Effect::SaveApiKey(key) => {
                if let Err(err) = cache::save_api_key(&self.cache_dir(), &key) {
                    warn!("Failed to save API key: {err:#}");
                    self.error = Some(format!("Could not save the API key: {err}"));
                }
                Task::none()
            }
            Effect::QuitSafely => {
                info!("Quitting");
                self.stop_all_audio();
                iced::exit()
            }
        }
    }

    fn run_playback_command(&mut self, cmd: PlaybackCommand) -> Task<Message> {
        match cmd {
            PlaybackCommand::SpeakLocal {
                session_id,
                utterance,
            } => {
                self.cancel_utterance();
                match self.local_engine.speak(&utterance) {
                    Ok(running) => {
                        self.utterance = Some(ActiveUtterance {
                            session_id,
                            utterance: running,
                        });
                        Task::done(Message::Playback(PlaybackEvent::LocalStarted { session_id }))
                    }
                    Err(err) => Task::done(Message::Playback(PlaybackEvent::LocalFailed {
                        session_id,
                        message: banner_text(err),
                    })),
                }
            }
            PlaybackCommand::GenerateChunks {
                session_id,
                plans,
                voice_id,
                rate,
                pitch,
                cancel,
            } => {
                let client = match self.remote_client(rate, pitch) {
                    Ok(client) => client,
                    Err(err) => {
                        return Task::done(Message::Playback(PlaybackEvent::GenerationFailed {
                            session_id,
                            message: banner_text(err),
                        }));
                    }
                };
                let (tx, rx) = mpsc::unbounded();
                let spawned = thread::Builder::new()
                    .name("kokoro-chunks".to_string())
                    .spawn(move || {
                        let result = generate_chunks(
                            &client,
                            &plans,
                            &voice_id,
                            &cancel,
                            |plan, generated, last| {
                                let chunk = GeneratedChunk {
                                    path: generated.audio.into_path(),
                                    start_index: plan.start_index,
                                    end_index: plan.end_index,
                                    estimated_duration: generated.estimated_duration,
                                };
                                let message = Message::Playback(PlaybackEvent::ChunkGenerated {
                                    session_id,
                                    chunk,
                                    last,
                                });
                                if let Err(err) = tx.unbounded_send(message) {
                                    if let Message::Playback(PlaybackEvent::ChunkGenerated {
                                        chunk,
                                        ..
                                    }) = err.into_inner()
                                    {
                                        AudioHandle::adopt(chunk.path).release();
                                    }
                                }
                            },
                        );
                        match result {
                            Ok(()) | Err(RemoteGenerationError::Cancelled) => {}
                            Err(err) => {
                                warn!(session_id, "Chunk generation failed: {err}");
                                let _ = tx.unbounded_send(Message::Playback(
                                    PlaybackEvent::GenerationFailed {
                                        session_id,
                                        message: banner_text(err),
                                    },
                                ));
                            }
                        }
                    });
                match spawned {
                    Ok(_) => Task::run(rx, |message| message),
                    Err(err) => Task::done(Message::Playback(PlaybackEvent::GenerationFailed {
                        session_id,
                        message: err.to_string(),
                    })),
                }
            }
            PlaybackCommand::PlayClip {
                session_id,
                clip_id,
                path,
            } => {
                self.stop_clip();
                let volume = self.controller.settings().volume;
                match ClipPlayback::start(clip_id, &path, volume) {
                    Ok(playback) => {
                        self.clip = Some(ActiveClip {
                            session_id,
                            playback,
                        });
                        Task::none()
                    }
                    Err(err) => Task::done(Message::Playback(PlaybackEvent::ClipFailed {
                        session_id,
                        clip_id,
                        message: banner_text(err),
                    })),
                }
            }
            other => {
                self.execute_silently(other);
                Task::none()
            }
        }
    }

    fn remote_client(&self, rate: f32, pitch: f32) -> Result<RemoteTtsClient, RemoteGenerationError> {
        RemoteTtsClient::new(
            &self.config,
            self.api_key.as_deref(),
            rate,
            pitch,
            cache::audio_dir(&self.cache_dir()),
        )
    }
}

/// Text for the error banner.
fn banner_text(err: impl Into<ReaderError>) -> String {
    let err: ReaderError = err.into();
    err.to_string()
}

/// Run blocking work off the UI thread and deliver its message.
fn spawn_blocking<F>(name: &str, job: F) -> Task<Message>
where
    F: FnOnce() -> Message + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
        let _ = tx.send(job());
    });
    if let Err(err) = spawned {
        warn!(name, "Failed to spawn worker thread: {err}");
        return Task::done(Message::BackgroundTaskLost);
    }
    Task::perform(rx, |result| result.unwrap_or(Message::BackgroundTaskLost))
}

pub(super) fn runtime_event_to_message(
    event: Event,
    status: event::Status,
    _window_id: window::Id,
) -> Option<Message> {
    if status == event::Status::Captured {
        return None;
    }
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
            Some(Message::KeyPressed { key, modifiers })
        }
        _ => None,
    }
}
