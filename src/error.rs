//! Error taxonomy surfaced to the user as a single banner string.

use thiserror::Error;

/// Content could not be turned into plain text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {message}")]
    Network { url: String, message: String },
    #[error("PDF conversion failed: {0}")]
    Pdf(String),
    #[error("no readable text found")]
    Empty,
}

/// Hosted TTS request failed or produced unusable audio.
#[derive(Debug, Error)]
pub enum RemoteGenerationError {
    #[error("Hugging Face API key is not configured")]
    MissingApiKey,
    #[error("Hugging Face API error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("request to Hugging Face failed: {0}")]
    Transport(String),
    #[error("Hugging Face returned an empty audio payload")]
    EmptyAudio,
    #[error("failed to store generated audio: {0}")]
    Storage(String),
    #[error("generation cancelled")]
    Cancelled,
}

/// Runtime failure of the local engine or the audio output.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
    #[error("audio output unavailable: {0}")]
    Output(String),
    #[error("could not decode audio clip: {0}")]
    Decode(String),
}

/// Any of the above, as shown in the error banner.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Remote(#[from] RemoteGenerationError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_carries_status_and_body() {
        let err = RemoteGenerationError::Status {
            status: 401,
            body: "Invalid credentials".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Hugging Face API error: 401 - Invalid credentials"
        );
    }

    #[test]
    fn umbrella_error_is_transparent() {
        let err: ReaderError = PlaybackError::Synthesis("boom".to_string()).into();
        assert_eq!(err.to_string(), "speech synthesis failed: boom");
    }
}
