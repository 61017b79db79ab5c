use super::defaults;
use super::models::{AppConfig, Engine, HighlightColor, LogLevel, ProcessMode};
use serde::Deserialize;

/// On-disk layout of `conf/config.toml`: one table per concern.
#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    playback: PlaybackConfig,
    #[serde(default)]
    remote: RemoteConfig,
    #[serde(default)]
    local: LocalConfig,
    #[serde(default)]
    extraction: ExtractionConfig,
    #[serde(default)]
    appearance: AppearanceConfig,
    #[serde(default)]
    keys: KeysConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    storage: StorageConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            engine: tables.playback.engine,
            process_mode: tables.playback.process_mode,
            rate: tables.playback.rate,
            pitch: tables.playback.pitch,
            volume: tables.playback.volume,
            skip_words: tables.playback.skip_words,
            restart_delay_ms: tables.playback.restart_delay_ms,
            tick_interval_ms: tables.playback.tick_interval_ms,
            remote_base_url: tables.remote.base_url,
            remote_model: tables.remote.model,
            remote_voice: tables.remote.voice,
            playback_chunk_chars: tables.remote.playback_chunk_chars,
            batch_chunk_chars: tables.remote.batch_chunk_chars,
            request_timeout_secs: tables.remote.request_timeout_secs,
            espeak_bin: tables.local.espeak_bin,
            local_voice: tables.local.voice,
            pdftotext_bin: tables.extraction.pdftotext_bin,
            font_size: tables.appearance.font_size,
            line_spacing: tables.appearance.line_spacing,
            highlight: tables.appearance.highlight,
            log_level: tables.logging.log_level,
            cache_dir: tables.storage.cache_dir,
            output_dir: tables.storage.output_dir,
            key_toggle_play_pause: tables.keys.toggle_play_pause,
            key_safe_quit: tables.keys.safe_quit,
            key_skip_forward: tables.keys.skip_forward,
            key_skip_back: tables.keys.skip_back,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PlaybackConfig {
    #[serde(default)]
    engine: Engine,
    #[serde(default)]
    process_mode: ProcessMode,
    #[serde(default = "defaults::default_rate")]
    rate: f32,
    #[serde(default = "defaults::default_pitch")]
    pitch: f32,
    #[serde(default = "defaults::default_volume")]
    volume: f32,
    #[serde(default = "defaults::default_skip_words")]
    skip_words: usize,
    #[serde(default = "defaults::default_restart_delay_ms")]
    restart_delay_ms: u64,
    #[serde(default = "defaults::default_tick_interval_ms")]
    tick_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            engine: Engine::default(),
            process_mode: ProcessMode::default(),
            rate: defaults::default_rate(),
            pitch: defaults::default_pitch(),
            volume: defaults::default_volume(),
            skip_words: defaults::default_skip_words(),
            restart_delay_ms: defaults::default_restart_delay_ms(),
            tick_interval_ms: defaults::default_tick_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RemoteConfig {
    #[serde(default = "defaults::default_remote_base_url")]
    base_url: String,
    #[serde(default = "defaults::default_remote_model")]
    model: String,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default = "defaults::default_playback_chunk_chars")]
    playback_chunk_chars: usize,
    #[serde(default = "defaults::default_batch_chunk_chars")]
    batch_chunk_chars: usize,
    #[serde(default = "defaults::default_request_timeout_secs")]
    request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            base_url: defaults::default_remote_base_url(),
            model: defaults::default_remote_model(),
            voice: None,
            playback_chunk_chars: defaults::default_playback_chunk_chars(),
            batch_chunk_chars: defaults::default_batch_chunk_chars(),
            request_timeout_secs: defaults::default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LocalConfig {
    #[serde(default = "defaults::default_espeak_bin")]
    espeak_bin: String,
    #[serde(default)]
    voice: Option<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        LocalConfig {
            espeak_bin: defaults::default_espeak_bin(),
            voice: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ExtractionConfig {
    #[serde(default = "defaults::default_pdftotext_bin")]
    pdftotext_bin: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            pdftotext_bin: defaults::default_pdftotext_bin(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AppearanceConfig {
    #[serde(default = "defaults::default_font_size")]
    font_size: u32,
    #[serde(default = "defaults::default_line_spacing")]
    line_spacing: f32,
    #[serde(default = "defaults::default_highlight")]
    highlight: HighlightColor,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        AppearanceConfig {
            font_size: defaults::default_font_size(),
            line_spacing: defaults::default_line_spacing(),
            highlight: defaults::default_highlight(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct KeysConfig {
    #[serde(default = "defaults::default_key_toggle_play_pause")]
    toggle_play_pause: String,
    #[serde(default = "defaults::default_key_safe_quit")]
    safe_quit: String,
    #[serde(default = "defaults::default_key_skip_forward")]
    skip_forward: String,
    #[serde(default = "defaults::default_key_skip_back")]
    skip_back: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        KeysConfig {
            toggle_play_pause: defaults::default_key_toggle_play_pause(),
            safe_quit: defaults::default_key_safe_quit(),
            skip_forward: defaults::default_key_skip_forward(),
            skip_back: defaults::default_key_skip_back(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct StorageConfig {
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
    #[serde(default = "defaults::default_output_dir")]
    output_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            cache_dir: defaults::default_cache_dir(),
            output_dir: defaults::default_output_dir(),
        }
    }
}
