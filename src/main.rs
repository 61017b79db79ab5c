//! Entry point for Web2Speech.
//!
//! - Initialize tracing and load `conf/config.toml`.
//! - Take an optional URL or file path from the command line.
//! - Launch the GUI with that source preloaded.

mod app;
mod cache;
mod cancellation;
mod config;
mod error;
mod extract;
mod playback;
mod text_utils;
mod timing;
mod tts;
mod voices;

use crate::app::run_app;
use crate::config::load_config;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    let initial_source = env::args().nth(1);
    info!(
        level = %config.log_level,
        engine = ?config.engine,
        source = initial_source.as_deref().unwrap_or("<none>"),
        "Starting Web2Speech"
    );

    let cache_dir = PathBuf::from(&config.cache_dir);
    cache::purge_audio_dir(&cache_dir);
    install_interrupt_handler(cache_dir);

    run_app(config, initial_source).context("Failed to start the GUI")?;
    Ok(())
}

fn install_interrupt_handler(cache_dir: PathBuf) {
    if let Err(err) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C; removing temporary clips");
        cache::purge_audio_dir(&cache_dir);
        std::process::exit(130);
    }) {
        warn!("Failed to install Ctrl+C signal handler: {err}");
    }
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
