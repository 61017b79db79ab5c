//! Local speech through the `espeak-ng` command-line synthesizer.

use crate::config::Engine;
use crate::error::PlaybackError;
use crate::voices::{NativeVoice, VoiceOption};
use std::io::Write;
use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};

pub const VOICE_PREVIEW_PHRASE: &str = "Hello! This is how I sound.";

const BASE_WORDS_PER_MINUTE: f32 = 175.0;
const BASE_PITCH: f32 = 50.0;

#[derive(Debug, Clone)]
pub struct LocalSpeechEngine {
    espeak_bin: String,
}

/// Everything needed to speak one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub voice: NativeVoice,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Utterance {
    fn args(&self) -> Vec<String> {
        let speed = (BASE_WORDS_PER_MINUTE * self.rate).round().clamp(80.0, 450.0) as u32;
        let pitch = (BASE_PITCH * self.pitch).round().clamp(0.0, 99.0) as u32;
        let amplitude = (self.volume * 100.0).round().clamp(0.0, 200.0) as u32;
        vec![
            "-v".to_string(),
            self.voice.identifier.clone(),
            "-s".to_string(),
            speed.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
            "--stdin".to_string(),
        ]
    }
}

/// Progress of a running utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceStatus {
    Running,
    Finished,
    Failed(String),
}

pub struct LocalUtterance {
    child: Child,
}

impl LocalUtterance {
    pub fn poll(&mut self) -> UtteranceStatus {
        match self.child.try_wait() {
            Ok(None) => UtteranceStatus::Running,
            Ok(Some(status)) if status.success() => UtteranceStatus::Finished,
            Ok(Some(status)) => UtteranceStatus::Failed(format!("espeak-ng exited with {status}")),
            Err(err) => UtteranceStatus::Failed(err.to_string()),
        }
    }

    pub fn cancel(mut self) {
        if let Err(err) = self.child.kill() {
            debug!("espeak-ng already gone: {err}");
        }
        let _ = self.child.wait();
    }
}

impl LocalSpeechEngine {
    pub fn new(espeak_bin: impl Into<String>) -> Self {
        Self {
            espeak_bin: espeak_bin.into(),
        }
    }

    /// Enumerate installed voices via `espeak-ng --voices`.
    pub fn list_voices(&self) -> Result<Vec<VoiceOption>, PlaybackError> {
        let output = Command::new(&self.espeak_bin)
            .arg("--voices")
            .output()
            .map_err(|err| {
                PlaybackError::Synthesis(format!("failed to start {}: {err}", self.espeak_bin))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlaybackError::Synthesis(format!(
                "voice listing failed: {}",
                stderr.trim()
            )));
        }
        let voices = parse_voice_list(&String::from_utf8_lossy(&output.stdout));
        info!(count = voices.len(), "Loaded local voices");
        Ok(voices)
    }

    /// Start speaking; the returned handle reports completion via `poll`.
    pub fn speak(&self, utterance: &Utterance) -> Result<LocalUtterance, PlaybackError> {
        debug!(
            voice = %utterance.voice.identifier,
            rate = utterance.rate,
            pitch = utterance.pitch,
            chars = utterance.text.chars().count(),
            "Starting local utterance"
        );
        let mut child = Command::new(&self.espeak_bin)
            .args(utterance.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                PlaybackError::Synthesis(format!("failed to start {}: {err}", self.espeak_bin))
            })?;
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(utterance.text.as_bytes()) {
                warn!("Failed to send text to espeak-ng: {err}");
                let _ = child.kill();
                return Err(PlaybackError::Synthesis(err.to_string()));
            }
        }
        Ok(LocalUtterance { child })
    }
}

fn parse_voice_list(listing: &str) -> Vec<VoiceOption> {
    listing
        .lines()
        .filter(|line| !line.trim_start().starts_with("Pty"))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let language = *fields.get(1)?;
            let name = *fields.get(3)?;
            Some(VoiceOption {
                id: language.to_string(),
                name: name.replace('_', " "),
                language: language.to_string(),
                engine: Engine::Local,
                native: Some(NativeVoice {
                    identifier: language.to_string(),
                }),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 5  en-gb           --/M      English_(Great_Britain) gmw/en            (en 2)
 2  en-us           --/M      English_(America)  gmw/en-US            (en 3)
";

    #[test]
    fn parses_espeak_voice_listing() {
        let voices = parse_voice_list(LISTING);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[1].id, "en-gb");
        assert_eq!(voices[1].name, "English (Great Britain)");
        assert_eq!(voices[2].language, "en-us");
        assert!(voices.iter().all(|v| v.engine == Engine::Local));
    }

    #[test]
    fn utterance_maps_settings_to_espeak_flags() {
        let utterance = Utterance {
            text: "hi".to_string(),
            voice: NativeVoice {
                identifier: "en-us".to_string(),
            },
            rate: 2.0,
            pitch: 3.0,
            volume: 0.8,
        };
        assert_eq!(
            utterance.args(),
            vec!["-v", "en-us", "-s", "350", "-p", "99", "-a", "80", "--stdin"]
        );
    }

    #[test]
    fn missing_binary_is_a_synthesis_error() {
        let engine = LocalSpeechEngine::new("definitely-not-espeak-binary");
        assert!(matches!(
            engine.list_voices(),
            Err(PlaybackError::Synthesis(_))
        ));
    }
}
