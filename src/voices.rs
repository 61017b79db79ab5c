//! Voice options for both engines and default selection.

use crate::config::Engine;

/// Handle the local engine needs to speak with a given voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeVoice {
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceOption {
    pub id: String,
    pub name: String,
    pub language: String,
    pub engine: Engine,
    /// Present only for local voices.
    pub native: Option<NativeVoice>,
}

impl VoiceOption {
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.language)
    }

    fn is_english(&self) -> bool {
        self.language.to_ascii_lowercase().starts_with("en")
    }
}

impl std::fmt::Display for VoiceOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Voices offered by the hosted model.
pub fn remote_voices() -> Vec<VoiceOption> {
    [
        ("kokoro-female-1", "Kokoro Female 1"),
        ("kokoro-female-2", "Kokoro Female 2"),
        ("kokoro-male-1", "Kokoro Male 1"),
        ("kokoro-neutral", "Kokoro Neutral"),
    ]
    .into_iter()
    .map(|(id, name)| VoiceOption {
        id: id.to_string(),
        name: name.to_string(),
        language: "en-US".to_string(),
        engine: Engine::Remote,
        native: None,
    })
    .collect()
}

/// Local voices arrive late; the list is empty until enumeration finishes.
#[derive(Debug, Clone, Default)]
pub enum LocalVoices {
    #[default]
    NotLoaded,
    Loaded(Vec<VoiceOption>),
}

#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    local: LocalVoices,
    remote: Vec<VoiceOption>,
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self {
            local: LocalVoices::NotLoaded,
            remote: remote_voices(),
        }
    }
}

impl VoiceCatalog {
    pub fn set_local(&mut self, voices: Vec<VoiceOption>) {
        self.local = LocalVoices::Loaded(voices);
    }

    pub fn local_loaded(&self) -> bool {
        matches!(self.local, LocalVoices::Loaded(_))
    }

    pub fn voices_for(&self, engine: Engine) -> &[VoiceOption] {
        match engine {
            Engine::Remote => &self.remote,
            Engine::Local => match &self.local {
                LocalVoices::Loaded(voices) => voices,
                LocalVoices::NotLoaded => &[],
            },
        }
    }

    /// First English voice for the engine, else the first voice at all.
    pub fn default_voice(&self, engine: Engine) -> Option<&VoiceOption> {
        let voices = self.voices_for(engine);
        voices.iter().find(|v| v.is_english()).or_else(|| voices.first())
    }

    pub fn find(&self, engine: Engine, id: &str) -> Option<&VoiceOption> {
        self.voices_for(engine).iter().find(|v| v.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(id: &str, language: &str) -> VoiceOption {
        VoiceOption {
            id: id.to_string(),
            name: id.to_string(),
            language: language.to_string(),
            engine: Engine::Local,
            native: Some(NativeVoice {
                identifier: id.to_string(),
            }),
        }
    }

    #[test]
    fn remote_list_is_english() {
        let voices = remote_voices();
        assert_eq!(voices.len(), 4);
        assert!(voices.iter().all(|v| v.language == "en-US" && v.native.is_none()));
    }

    #[test]
    fn default_prefers_english() {
        let mut catalog = VoiceCatalog::default();
        catalog.set_local(vec![local("de", "de"), local("en-gb", "en-GB")]);
        assert_eq!(catalog.default_voice(Engine::Local).unwrap().id, "en-gb");
        assert_eq!(
            catalog.default_voice(Engine::Remote).unwrap().id,
            "kokoro-female-1"
        );
    }

    #[test]
    fn default_falls_back_to_first() {
        let mut catalog = VoiceCatalog::default();
        catalog.set_local(vec![local("fr", "fr"), local("de", "de")]);
        assert_eq!(catalog.default_voice(Engine::Local).unwrap().id, "fr");
    }

    #[test]
    fn unloaded_local_list_has_no_default() {
        let catalog = VoiceCatalog::default();
        assert!(!catalog.local_loaded());
        assert!(catalog.default_voice(Engine::Local).is_none());
    }
}
