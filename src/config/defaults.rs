pub(crate) fn default_rate() -> f32 {
    1.0
}

pub(crate) fn default_pitch() -> f32 {
    1.0
}

pub(crate) fn default_volume() -> f32 {
    0.8
}

pub(crate) fn default_skip_words() -> usize {
    20
}

pub(crate) fn default_restart_delay_ms() -> u64 {
    100
}

pub(crate) fn default_tick_interval_ms() -> u64 {
    50
}

pub(crate) fn default_remote_base_url() -> String {
    "https://api-inference.huggingface.co/models/".to_string()
}

pub(crate) fn default_remote_model() -> String {
    "hexgrad/Kokoro-82M".to_string()
}

pub(crate) fn default_playback_chunk_chars() -> usize {
    500
}

pub(crate) fn default_batch_chunk_chars() -> usize {
    1000
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    60
}

pub(crate) fn default_espeak_bin() -> String {
    "espeak-ng".to_string()
}

pub(crate) fn default_pdftotext_bin() -> String {
    "pdftotext".to_string()
}

pub(crate) fn default_font_size() -> u32 {
    20
}

pub(crate) fn default_line_spacing() -> f32 {
    1.4
}

pub(crate) fn default_highlight() -> crate::config::HighlightColor {
    crate::config::HighlightColor {
        r: 0.55,
        g: 0.7,
        b: 1.0,
        a: 0.45,
    }
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}

pub(crate) fn default_output_dir() -> String {
    "output".to_string()
}

pub(crate) fn default_key_toggle_play_pause() -> String {
    "space".to_string()
}

pub(crate) fn default_key_safe_quit() -> String {
    "q".to_string()
}

pub(crate) fn default_key_skip_forward() -> String {
    "f".to_string()
}

pub(crate) fn default_key_skip_back() -> String {
    "b".to_string()
}
