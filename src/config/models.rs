use serde::Deserialize;

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub process_mode: ProcessMode,
    #[serde(default = "crate::config::defaults::default_rate")]
    pub rate: f32,
    #[serde(default = "crate::config::defaults::default_pitch")]
    pub pitch: f32,
    #[serde(default = "crate::config::defaults::default_volume")]
    pub volume: f32,
    #[serde(default = "crate::config::defaults::default_skip_words")]
    pub skip_words: usize,
    #[serde(default = "crate::config::defaults::default_restart_delay_ms")]
    pub restart_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "crate::config::defaults::default_remote_base_url")]
    pub remote_base_url: String,
    #[serde(default = "crate::config::defaults::default_remote_model")]
    pub remote_model: String,
    #[serde(default)]
    pub remote_voice: Option<String>,
    #[serde(default = "crate::config::defaults::default_playback_chunk_chars")]
    pub playback_chunk_chars: usize,
    #[serde(default = "crate::config::defaults::default_batch_chunk_chars")]
    pub batch_chunk_chars: usize,
    #[serde(default = "crate::config::defaults::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "crate::config::defaults::default_espeak_bin")]
    pub espeak_bin: String,
    #[serde(default)]
    pub local_voice: Option<String>,
    #[serde(default = "crate::config::defaults::default_pdftotext_bin")]
    pub pdftotext_bin: String,
    #[serde(default = "crate::config::defaults::default_font_size")]
    pub font_size: u32,
    #[serde(default = "crate::config::defaults::default_line_spacing")]
    pub line_spacing: f32,
    #[serde(default = "crate::config::defaults::default_highlight")]
    pub highlight: HighlightColor,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_output_dir")]
    pub output_dir: String,
    #[serde(default = "crate::config::defaults::default_key_toggle_play_pause")]
    pub key_toggle_play_pause: String,
    #[serde(default = "crate::config::defaults::default_key_safe_quit")]
    pub key_safe_quit: String,
    #[serde(default = "crate::config::defaults::default_key_skip_forward")]
    pub key_skip_forward: String,
    #[serde(default = "crate::config::defaults::default_key_skip_back")]
    pub key_skip_back: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            engine: Engine::default(),
            process_mode: ProcessMode::default(),
            rate: crate::config::defaults::default_rate(),
            pitch: crate::config::defaults::default_pitch(),
            volume: crate::config::defaults::default_volume(),
            skip_words: crate::config::defaults::default_skip_words(),
            restart_delay_ms: crate::config::defaults::default_restart_delay_ms(),
            tick_interval_ms: crate::config::defaults::default_tick_interval_ms(),
            remote_base_url: crate::config::defaults::default_remote_base_url(),
            remote_model: crate::config::defaults::default_remote_model(),
            remote_voice: None,
            playback_chunk_chars: crate::config::defaults::default_playback_chunk_chars(),
            batch_chunk_chars: crate::config::defaults::default_batch_chunk_chars(),
            request_timeout_secs: crate::config::defaults::default_request_timeout_secs(),
            espeak_bin: crate::config::defaults::default_espeak_bin(),
            local_voice: None,
            pdftotext_bin: crate::config::defaults::default_pdftotext_bin(),
            font_size: crate::config::defaults::default_font_size(),
            line_spacing: crate::config::defaults::default_line_spacing(),
            highlight: crate::config::defaults::default_highlight(),
            log_level: crate::config::defaults::default_log_level(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            output_dir: crate::config::defaults::default_output_dir(),
            key_toggle_play_pause: crate::config::defaults::default_key_toggle_play_pause(),
            key_safe_quit: crate::config::defaults::default_key_safe_quit(),
            key_skip_forward: crate::config::defaults::default_key_skip_forward(),
            key_skip_back: crate::config::defaults::default_key_skip_back(),
        }
    }
}

/// Speech backend used for a playback session.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Engine {
    Local,
    Remote,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::Local
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Engine::Local => "Local speech (espeak-ng)",
            Engine::Remote => "Hugging Face Kokoro-82M",
        };
        write!(f, "{}", label)
    }
}

impl Engine {
    pub const ALL: [Engine; 2] = [Engine::Remote, Engine::Local];

    pub fn requires_api_key(self) -> bool {
        matches!(self, Engine::Remote)
    }
}

/// What "start reading" does with the extracted content.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessMode {
    Stream,
    Generate,
}

impl ProcessMode {
    pub const ALL: [ProcessMode; 2] = [ProcessMode::Stream, ProcessMode::Generate];
}

impl Default for ProcessMode {
    fn default() -> Self {
        ProcessMode::Stream
    }
}

impl std::fmt::Display for ProcessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ProcessMode::Stream => "Stream",
            ProcessMode::Generate => "Generate",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct HighlightColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
