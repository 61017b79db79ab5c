//! Hosted Kokoro-82M generation over the Hugging Face inference API.

use super::audio::AudioHandle;
use crate::cancellation::CancellationToken;
use crate::config::AppConfig;
use crate::error::RemoteGenerationError;
use crate::text_utils::ChunkPlan;
use crate::timing::estimate_remote_duration;
use reqwest::blocking::Client;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const CONNECTION_TEST_PHRASE: &str = "Hello, this is a test of the Kokoro TTS model.";
const DEFAULT_VOICE: &str = "default";

/// One generated clip plus the pacing estimate for it.
#[derive(Debug)]
pub struct GeneratedAudio {
    pub audio: AudioHandle,
    pub estimated_duration: Duration,
    pub word_count: usize,
}

/// Anything that can turn text into a stored audio clip.
pub trait SpeechGenerator {
    fn generate(&self, text: &str, voice_id: &str) -> Result<GeneratedAudio, RemoteGenerationError>;
}

#[derive(Serialize)]
struct InferenceBody<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
}

#[derive(Serialize)]
struct InferenceParameters<'a> {
    voice: &'a str,
    speed: f32,
    pitch: f32,
}

pub struct RemoteTtsClient {
    client: Client,
    endpoint: String,
    api_key: String,
    speed: f32,
    pitch: f32,
    audio_dir: PathBuf,
}

impl RemoteTtsClient {
    pub fn new(
        config: &AppConfig,
        api_key: Option<&str>,
        speed: f32,
        pitch: f32,
        audio_dir: PathBuf,
    ) -> Result<Self, RemoteGenerationError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(RemoteGenerationError::MissingApiKey)?
            .to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(|err| RemoteGenerationError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint_for(&config.remote_base_url, &config.remote_model),
            api_key,
            speed,
            pitch,
            audio_dir,
        })
    }

    /// Generate a short phrase to confirm the key and endpoint work.
    pub fn test_connection(&self) -> Result<(), RemoteGenerationError> {
        let generated = self.generate(CONNECTION_TEST_PHRASE, DEFAULT_VOICE)?;
        generated.audio.release();
        info!(endpoint = %self.endpoint, "Hugging Face connection test succeeded");
        Ok(())
    }
}

impl SpeechGenerator for RemoteTtsClient {
    fn generate(&self, text: &str, voice_id: &str) -> Result<GeneratedAudio, RemoteGenerationError> {
        let voice = if voice_id.trim().is_empty() {
            DEFAULT_VOICE
        } else {
            voice_id
        };
        let body = InferenceBody {
            inputs: text,
            parameters: InferenceParameters {
                voice,
                speed: self.speed,
                pitch: self.pitch,
            },
        };
        debug!(
            endpoint = %self.endpoint,
            voice,
            chars = text.chars().count(),
            "Requesting remote speech"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|err| RemoteGenerationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "Remote speech request rejected");
            return Err(RemoteGenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .map_err(|err| RemoteGenerationError::Transport(err.to_string()))?;
        let audio = AudioHandle::store(&self.audio_dir, &bytes)?;
        let word_count = text.split_whitespace().count();
        Ok(GeneratedAudio {
            audio,
            estimated_duration: estimate_remote_duration(word_count),
            word_count,
        })
    }
}

fn endpoint_for(base_url: &str, model: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        model.trim_start_matches('/')
    )
}

/// Request one clip per plan, strictly one after another.
///
/// `on_chunk` sees each clip as soon as it arrives. Stops at the first error
/// or when `cancel` fires.
pub fn generate_chunks<G, F>(
    generator: &G,
    plans: &[ChunkPlan],
    voice_id: &str,
    cancel: &CancellationToken,
    mut on_chunk: F,
) -> Result<(), RemoteGenerationError>
where
    G: SpeechGenerator + ?Sized,
    F: FnMut(&ChunkPlan, GeneratedAudio, bool),
{
    for (idx, plan) in plans.iter().enumerate() {
        cancel.check_cancelled("before_chunk")?;
        debug!(
            chunk = idx,
            start = plan.start_index,
            end = plan.end_index,
            "Generating chunk"
        );
        let generated = generator.generate(&plan.text, voice_id)?;
        debug!(
            chunk = idx,
            words = generated.word_count,
            clip_id = generated.audio.id(),
            "Chunk ready"
        );
        if cancel.is_cancelled() {
            generated.audio.release();
            return Err(RemoteGenerationError::Cancelled);
        }
        on_chunk(plan, generated, idx + 1 == plans.len());
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::text_utils::{plan_word_chunks, tokenize};
    use std::cell::RefCell;

    /// Writes placeholder clips and records the texts it was asked for.
    pub(crate) struct FakeGenerator {
        pub dir: tempfile::TempDir,
        pub requests: RefCell<Vec<String>>,
        pub fail_at: Option<usize>,
    }

    impl FakeGenerator {
        pub(crate) fn new(fail_at: Option<usize>) -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                requests: RefCell::new(Vec::new()),
                fail_at,
            }
        }
    }

    impl SpeechGenerator for FakeGenerator {
        fn generate(
            &self,
            text: &str,
            _voice_id: &str,
        ) -> Result<GeneratedAudio, RemoteGenerationError> {
            let call = self.requests.borrow().len();
            self.requests.borrow_mut().push(text.to_string());
            if self.fail_at == Some(call) {
                return Err(RemoteGenerationError::Status {
                    status: 401,
                    body: "Unauthorized".to_string(),
                });
            }
            let word_count = text.split_whitespace().count();
            Ok(GeneratedAudio {
                audio: AudioHandle::store(self.dir.path(), text.as_bytes())?,
                estimated_duration: estimate_remote_duration(word_count),
                word_count,
            })
        }
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        assert_eq!(
            endpoint_for(
                "https://api-inference.huggingface.co/models/",
                "hexgrad/Kokoro-82M"
            ),
            "https://api-inference.huggingface.co/models/hexgrad/Kokoro-82M"
        );
    }

    #[test]
    fn request_body_matches_inference_shape() {
        let body = InferenceBody {
            inputs: "hi there",
            parameters: InferenceParameters {
                voice: "kokoro-male-1",
                speed: 1.0,
                pitch: 1.0,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["inputs"], "hi there");
        assert_eq!(value["parameters"]["voice"], "kokoro-male-1");
        assert_eq!(value["parameters"]["speed"], 1.0);
    }

    #[test]
    fn missing_key_is_rejected_up_front() {
        let config = AppConfig::default();
        let result = RemoteTtsClient::new(&config, Some("  "), 1.0, 1.0, PathBuf::from("."));
        assert!(matches!(result, Err(RemoteGenerationError::MissingApiKey)));
    }

    #[test]
    fn chunks_are_requested_in_order() {
        let tokens = tokenize(&"abcd ".repeat(240));
        let plans = plan_word_chunks(&tokens, 0, 500);
        let generator = FakeGenerator::new(None);
        let mut seen = Vec::new();
        generate_chunks(
            &generator,
            &plans,
            "kokoro-female-1",
            &CancellationToken::new(),
            |plan, audio, last| {
                seen.push((plan.start_index, last));
                audio.audio.release();
            },
        )
        .unwrap();
        assert_eq!(seen.len(), plans.len());
        assert_eq!(seen.last().map(|s| s.1), Some(true));
        assert_eq!(generator.requests.borrow()[0], plans[0].text);
    }

    #[test]
    fn failure_stops_remaining_requests() {
        let tokens = tokenize(&"abcd ".repeat(240));
        let plans = plan_word_chunks(&tokens, 0, 500);
        let generator = FakeGenerator::new(Some(1));
        let mut delivered = 0;
        let result = generate_chunks(
            &generator,
            &plans,
            "kokoro-female-1",
            &CancellationToken::new(),
            |_, _, _| delivered += 1,
        );
        assert!(matches!(
            result,
            Err(RemoteGenerationError::Status { status: 401, .. })
        ));
        assert_eq!(delivered, 1);
        assert_eq!(generator.requests.borrow().len(), 2);
    }

    #[test]
    fn cancelled_token_skips_generation() {
        let tokens = tokenize("a b c");
        let plans = plan_word_chunks(&tokens, 0, 500);
        let generator = FakeGenerator::new(None);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = generate_chunks(&generator, &plans, "v", &cancel, |_, _, _| {});
        assert!(matches!(result, Err(RemoteGenerationError::Cancelled)));
        assert!(generator.requests.borrow().is_empty());
    }
}
