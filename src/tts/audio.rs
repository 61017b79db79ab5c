//! Generated audio clips on disk and their playback.

use crate::error::{PlaybackError, RemoteGenerationError};
use rodio::{Decoder, OutputStream, Sink, Source};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

static CLIP_SEQ: AtomicU64 = AtomicU64::new(1);

/// Exclusive owner of one temporary audio file.
///
/// The file is removed on `release` or, failing that, when the handle drops.
#[derive(Debug)]
pub struct AudioHandle {
    id: u64,
    path: Option<PathBuf>,
}

impl AudioHandle {
    /// Write `bytes` into `dir` under a unique name and take ownership of it.
    pub fn store(dir: &Path, bytes: &[u8]) -> Result<Self, RemoteGenerationError> {
        if bytes.is_empty() {
            return Err(RemoteGenerationError::EmptyAudio);
        }
        fs::create_dir_all(dir).map_err(|err| RemoteGenerationError::Storage(err.to_string()))?;
        let path = clip_path(dir, bytes);
        fs::write(&path, bytes).map_err(|err| RemoteGenerationError::Storage(err.to_string()))?;
        debug!(path = %path.display(), bytes = bytes.len(), "Stored generated audio");
        Ok(Self::adopt(path))
    }

    /// Take ownership of a file written elsewhere.
    pub fn adopt(path: PathBuf) -> Self {
        Self {
            id: CLIP_SEQ.fetch_add(1, Ordering::Relaxed),
            path: Some(path),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or(Path::new(""))
    }

    /// Hand the file over without deleting it.
    pub fn into_path(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }

    pub fn release(mut self) {
        self.remove_file();
    }

    fn remove_file(&mut self) {
        if let Some(path) = self.path.take() {
            match fs::remove_file(&path) {
                Ok(()) => debug!(id = self.id, path = %path.display(), "Released audio clip"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!(path = %path.display(), "Failed to remove audio clip: {err}"),
            }
        }
    }
}

impl Drop for AudioHandle {
    fn drop(&mut self) {
        self.remove_file();
    }
}

fn clip_path(dir: &Path, bytes: &[u8]) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let hash = format!("{:x}", hasher.finalize());
    let nonce = CLIP_SEQ.fetch_add(1, Ordering::Relaxed);
    let ts_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dir.join(format!("clip-{}-{ts_nanos}-{nonce}.audio", &hash[..16]))
}

/// A clip currently playing on the default output device.
pub struct ClipPlayback {
    clip_id: u64,
    _stream: OutputStream,
    sink: Sink,
}

impl ClipPlayback {
    pub fn start(clip_id: u64, path: &Path, volume: f32) -> Result<Self, PlaybackError> {
        let (_stream, handle) =
            OutputStream::try_default().map_err(|err| PlaybackError::Output(err.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|err| PlaybackError::Output(err.to_string()))?;
        let file = File::open(path).map_err(|err| PlaybackError::Decode(err.to_string()))?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|err| PlaybackError::Decode(err.to_string()))?;
        sink.set_volume(volume.clamp(0.0, 1.0));
        sink.append(source);
        sink.play();
        debug!(clip_id, path = %path.display(), "Started clip playback");
        Ok(Self {
            clip_id,
            _stream,
            sink,
        })
    }

    pub fn clip_id(&self) -> u64 {
        self.clip_id
    }

    pub fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    pub fn stop(self) {
        debug!(clip_id = self.clip_id, "Stopping clip playback");
        self.sink.stop();
    }
}

/// Decoded PCM of one clip.
pub struct DecodedClip {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

pub fn decode_clip(path: &Path) -> Result<DecodedClip, PlaybackError> {
    let file = File::open(path).map_err(|err| PlaybackError::Decode(err.to_string()))?;
    let decoder =
        Decoder::new(BufReader::new(file)).map_err(|err| PlaybackError::Decode(err.to_string()))?;
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    Ok(DecodedClip {
        channels,
        sample_rate,
        samples: decoder.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let handle = AudioHandle::store(dir.path(), b"RIFF").unwrap();
        let path = handle.path().to_path_buf();
        assert!(path.exists());
        handle.release();
        assert!(!path.exists());
    }

    #[test]
    fn dropping_a_handle_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let handle = AudioHandle::store(dir.path(), b"RIFF").unwrap();
            handle.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn into_path_keeps_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let handle = AudioHandle::store(dir.path(), b"RIFF").unwrap();
        let path = handle.into_path();
        assert!(path.exists());
        let adopted = AudioHandle::adopt(path.clone());
        adopted.release();
        assert!(!path.exists());
    }

    #[test]
    fn identical_payloads_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = AudioHandle::store(dir.path(), b"same").unwrap();
        let b = AudioHandle::store(dir.path(), b"same").unwrap();
        assert_ne!(a.path(), b.path());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn empty_payload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AudioHandle::store(dir.path(), b""),
            Err(RemoteGenerationError::EmptyAudio)
        ));
    }
}
