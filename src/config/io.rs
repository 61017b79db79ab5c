use super::models::AppConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const SECTION_NAMES: [&str; 8] = [
    "playback",
    "remote",
    "local",
    "extraction",
    "appearance",
    "keys",
    "logging",
    "storage",
];

/// Load configuration from disk, falling back to defaults on any error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err:#}");
            AppConfig::default()
        }
    }
}

/// Parse either the sectioned layout or the legacy flat layout.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let value: toml::Table = toml::from_str(contents).context("config is not valid TOML")?;
    let sectioned = SECTION_NAMES
        .iter()
        .any(|name| value.get(*name).is_some_and(toml::Value::is_table));

    if sectioned {
        let tables: ConfigTables =
            toml::from_str(contents).context("failed to parse sectioned config")?;
        Ok(tables.into())
    } else {
        toml::from_str::<AppConfig>(contents).context("failed to parse flat config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Engine, LogLevel, ProcessMode};

    #[test]
    fn empty_input_yields_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.engine, Engine::Local);
        assert_eq!(cfg.process_mode, ProcessMode::Stream);
        assert_eq!(cfg.skip_words, 20);
        assert_eq!(cfg.restart_delay_ms, 100);
        assert_eq!(cfg.playback_chunk_chars, 500);
        assert_eq!(cfg.batch_chunk_chars, 1000);
    }

    #[test]
    fn sectioned_layout_is_read() {
        let cfg = parse_config(
            r#"
            [playback]
            engine = "remote"
            rate = 1.5
            skip_words = 10

            [remote]
            voice = "kokoro-male-1"

            [logging]
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.engine, Engine::Remote);
        assert!((cfg.rate - 1.5).abs() < f32::EPSILON);
        assert_eq!(cfg.skip_words, 10);
        assert_eq!(cfg.remote_voice.as_deref(), Some("kokoro-male-1"));
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.espeak_bin, "espeak-ng");
    }

    #[test]
    fn flat_layout_is_still_accepted() {
        let cfg = parse_config("process_mode = \"generate\"\nfont_size = 24\n").unwrap();
        assert_eq!(cfg.process_mode, ProcessMode::Generate);
        assert_eq!(cfg.font_size, 24);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("absent.toml"));
        assert_eq!(cfg.key_safe_quit, "q");
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[playback\nrate = ").unwrap();
        let cfg = load_config(&path);
        assert!((cfg.rate - 1.0).abs() < f32::EPSILON);
    }
}
