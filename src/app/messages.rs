use crate::config::{Engine, ProcessMode};
use crate::playback::PlaybackEvent;
use crate::voices::VoiceOption;
use iced::keyboard::{Key, Modifiers};
use std::path::PathBuf;
use std::time::Instant;

/// Messages emitted by the UI and background work.
#[derive(Debug, Clone)]
pub enum Message {
    SourceInputChanged(String),
    LoadSource,
    ContentLoaded {
        request_id: u64,
        content: String,
    },
    ContentLoadFailed {
        request_id: u64,
        error: String,
    },
    LocalVoicesLoaded {
        voices: Vec<VoiceOption>,
        error: Option<String>,
    },
    EngineSelected(Engine),
    VoiceSelected(VoiceOption),
    ProcessModeSelected(ProcessMode),
    ApiKeyInputChanged(String),
    SaveApiKey,
    CancelApiKeyPrompt,
    TestConnection,
    ConnectionTested {
        error: Option<String>,
    },
    PreviewVoice,
    StartReading,
    CancelGeneration,
    AudioFileGenerated {
        request_id: u64,
        path: Option<PathBuf>,
        error: Option<String>,
    },
    CloseReader,
    ToggleSettings,
    TogglePlayPause,
    Play,
    Pause,
    SkipForward,
    SkipBack,
    WordClicked(usize),
    SetRate(f32),
    SetPitch(f32),
    Playback(PlaybackEvent),
    BackgroundTaskLost,
    DismissError,
    KeyPressed {
        key: Key,
        modifiers: Modifiers,
    },
    SafeQuit,
    Tick(Instant),
}
