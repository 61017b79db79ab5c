//! Turn a URL or a `.txt`/`.pdf` file into plain text.

use crate::error::ExtractionError;
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

const HTML_WRAP_WIDTH: usize = 10_000;

/// Where the content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(std::path::PathBuf),
}

impl Source {
    /// Anything that looks like an http(s) URL is fetched; the rest is a path.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(trimmed.to_string())
        } else {
            Source::File(std::path::PathBuf::from(trimmed))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Extractor {
    pdftotext_bin: String,
    timeout: Duration,
}

impl Extractor {
    pub fn new(pdftotext_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            pdftotext_bin: pdftotext_bin.into(),
            timeout,
        }
    }

    pub fn extract(&self, source: &Source) -> Result<String, ExtractionError> {
        let raw = match source {
            Source::Url(url) => self.fetch_url(url)?,
            Source::File(path) => self.read_file(path)?,
        };
        let text = clean_text(&raw);
        if text.is_empty() {
            return Err(ExtractionError::Empty);
        }
        info!(chars = text.chars().count(), "Extracted content");
        Ok(text)
    }

    fn read_file(&self, path: &Path) -> Result<String, ExtractionError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "txt" => fs::read(path)
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .map_err(|source| ExtractionError::Io {
                    path: path.display().to_string(),
                    source,
                }),
            "pdf" => self.pdf_to_text(path),
            _ => Err(ExtractionError::UnsupportedType(
                path.display().to_string(),
            )),
        }
    }

    fn pdf_to_text(&self, path: &Path) -> Result<String, ExtractionError> {
        debug!(path = %path.display(), bin = %self.pdftotext_bin, "Converting PDF");
        let output = Command::new(&self.pdftotext_bin)
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(path)
            .arg("-")
            .output()
            .map_err(|err| {
                ExtractionError::Pdf(format!("failed to start {}: {err}", self.pdftotext_bin))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Pdf(format!(
                "{} failed for {}: {}",
                self.pdftotext_bin,
                path.display(),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn fetch_url(&self, url: &str) -> Result<String, ExtractionError> {
        let network = |message: String| ExtractionError::Network {
            url: url.to_string(),
            message,
        };
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| network(err.to_string()))?;
        let response = client
            .get(url)
            .send()
            .map_err(|err| network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(network(format!("HTTP {status}")));
        }
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|ct| ct.contains("html"));
        let body = response.bytes().map_err(|err| network(err.to_string()))?;
        debug!(url, bytes = body.len(), is_html, "Fetched page");
        if is_html {
            Ok(html_to_text(&body))
        } else {
            Ok(String::from_utf8_lossy(&body).into_owned())
        }
    }
}

fn html_to_text(html: &[u8]) -> String {
    match html2text::from_read(html, HTML_WRAP_WIDTH) {
        Ok(text) => text,
        Err(err) => {
            warn!("html2text failed: {err}");
            String::from_utf8_lossy(html).into_owned()
        }
    }
}

/// NFC-normalize, drop control characters and trim each line.
fn clean_text(raw: &str) -> String {
    let normalized: String = raw
        .nfc()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();
    normalized
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// First `max_chars` characters for the content preview.
pub fn preview(content: &str, max_chars: usize) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
