//! Word-synchronized playback: the controller, its engine adapters and the
//! chunk sequencer used by the remote engine.

mod controller;
mod events;
mod sequencer;
mod session;
mod state;

pub use controller::{ControllerOptions, PlaybackController};
pub use events::{GeneratedChunk, PlaybackCommand, PlaybackEvent};
pub use state::WordClass;
