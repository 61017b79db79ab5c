//! Speech backends: the hosted Kokoro model and the local espeak-ng voice.

pub mod audio;
pub mod batch;
pub mod local;
pub mod remote;

pub use audio::{AudioHandle, ClipPlayback};
pub use local::{LocalSpeechEngine, LocalUtterance, Utterance, UtteranceStatus};
pub use remote::RemoteTtsClient;
