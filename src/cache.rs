//! Small on-disk state kept under the cache directory.
//!
//! The API key lives in a tiny TOML file; generated audio clips are written
//! to an `audio/` subdirectory and deleted once played.

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";
const CREDENTIALS_FILE: &str = "credentials.toml";

#[derive(serde::Serialize, serde::Deserialize)]
struct Credentials {
    huggingface_api_key: String,
}

/// Read the API key once at startup; the environment wins over the stored file.
pub fn load_api_key(cache_dir: &Path) -> Option<String> {
    if let Ok(key) = env::var(API_KEY_ENV) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            debug!("Using API key from environment");
            return Some(key);
        }
    }
    read_stored_key(cache_dir)
}

fn read_stored_key(cache_dir: &Path) -> Option<String> {
    let data = fs::read_to_string(credentials_path(cache_dir)).ok()?;
    match toml::from_str::<Credentials>(&data) {
        Ok(creds) if !creds.huggingface_api_key.trim().is_empty() => {
            Some(creds.huggingface_api_key.trim().to_string())
        }
        Ok(_) => None,
        Err(err) => {
            warn!("Ignoring unreadable credentials file: {err}");
            None
        }
    }
}

pub fn save_api_key(cache_dir: &Path, key: &str) -> Result<()> {
    fs::create_dir_all(cache_dir)
        .with_context(|| format!("Creating cache dir {}", cache_dir.display()))?;
    let creds = Credentials {
        huggingface_api_key: key.trim().to_string(),
    };
    let contents = toml::to_string(&creds).context("Serializing credentials")?;
    fs::write(credentials_path(cache_dir), contents).context("Writing credentials")?;
    Ok(())
}

fn credentials_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(CREDENTIALS_FILE)
}

pub fn audio_dir(cache_dir: &Path) -> PathBuf {
    cache_dir.join("audio")
}

/// Delete clips left behind by an earlier run that did not shut down cleanly.
pub fn purge_audio_dir(cache_dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(audio_dir(cache_dir)) else {
        return 0;
    };
    let mut removed = 0;
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.extension().and_then(|ext| ext.to_str()) != Some("audio") {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(err) => warn!(path = %path.display(), "Failed to remove stale clip: {err}"),
        }
    }
    if removed > 0 {
        debug!(removed, "Purged stale audio clips");
    }
    removed
}
