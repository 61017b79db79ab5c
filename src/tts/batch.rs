//! Generate mode: render the whole text remotely and save one WAV file.

use super::audio::{DecodedClip, decode_clip};
use super::remote::SpeechGenerator;
use crate::cancellation::CancellationToken;
use crate::text_utils::plan_sentence_chunks;
use anyhow::{Context, Result, bail};
use hound::WavSpec;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub path: PathBuf,
    pub chunk_count: usize,
    pub estimated_duration: Duration,
}

/// Default download name: `web2speech-audio-<unix millis>.wav`.
pub fn default_output_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("web2speech-audio-{millis}.wav")
}

/// Generate sentence-grouped chunks in order and merge them into one file.
pub fn generate_audio_file<G>(
    generator: &G,
    text: &str,
    voice_id: &str,
    max_chars: usize,
    cancel: &CancellationToken,
    output_dir: &Path,
) -> Result<BatchOutput>
where
    G: SpeechGenerator + ?Sized,
{
    let chunks = plan_sentence_chunks(text, max_chars);
    if chunks.is_empty() {
        bail!("Nothing to generate: the text is empty");
    }
    info!(chunks = chunks.len(), voice_id, "Generating downloadable audio");

    let mut merged: Option<DecodedClip> = None;
    let mut estimated_duration = Duration::ZERO;
    for (idx, chunk) in chunks.iter().enumerate() {
        cancel.check_cancelled("batch_chunk")?;
        let generated = generator.generate(chunk, voice_id)?;
        estimated_duration += generated.estimated_duration;
        let decoded = decode_clip(generated.audio.path());
        generated.audio.release();
        let decoded = decoded.with_context(|| format!("Decoding chunk {idx}"))?;
        debug!(chunk = idx, samples = decoded.samples.len(), "Decoded chunk");
        merged = Some(match merged {
            None => decoded,
            Some(mut acc) => {
                if acc.channels != decoded.channels || acc.sample_rate != decoded.sample_rate {
                    bail!(
                        "Chunk {idx} audio format changed ({} ch @ {} Hz, expected {} ch @ {} Hz)",
                        decoded.channels,
                        decoded.sample_rate,
                        acc.channels,
                        acc.sample_rate
                    );
                }
                acc.samples.extend(decoded.samples);
                acc
            }
        });
    }

    let merged = merged.context("No audio produced")?;
    let path = output_dir.join(default_output_name());
    write_wav(&path, &merged)?;
    info!(path = %path.display(), "Saved generated audio");
    Ok(BatchOutput {
        path,
        chunk_count: chunks.len(),
        estimated_duration,
    })
}

fn write_wav(path: &Path, clip: &DecodedClip) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating output dir {}", parent.display()))?;
    }

    let spec = WavSpec {
        channels: clip.channels,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let temp_path = unique_temp_wav_path(path);
    let mut writer = hound::WavWriter::create(&temp_path, spec)?;
    for &sample in &clip.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    if fs::rename(&temp_path, path).is_err() {
        fs::copy(&temp_path, path)?;
        let _ = fs::remove_file(&temp_path);
    }
    Ok(())
}

fn unique_temp_wav_path(path: &Path) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let nonce = SEQ.fetch_add(1, Ordering::Relaxed);
    let mut temp_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("audio.wav")
        .to_string();
    temp_name.push_str(&format!(".tmp-{nonce}"));
    path.with_file_name(temp_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteGenerationError;
    use crate::timing::estimate_remote_duration;
    use crate::tts::audio::AudioHandle;
    use crate::tts::remote::GeneratedAudio;
    use std::io::Cursor;

    struct ToneGenerator {
        dir: tempfile::TempDir,
    }

    fn tone_bytes(samples: usize) -> Vec<u8> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..samples {
                writer.write_sample((i % 100) as i16 * 100).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    impl SpeechGenerator for ToneGenerator {
        fn generate(
            &self,
            text: &str,
            _voice_id: &str,
        ) -> Result<GeneratedAudio, RemoteGenerationError> {
            let words = text.split_whitespace().count();
            Ok(GeneratedAudio {
                audio: AudioHandle::store(self.dir.path(), &tone_bytes(words * 10))?,
                estimated_duration: estimate_remote_duration(words),
                word_count: words,
            })
        }
    }

    #[test]
    fn default_name_has_download_prefix() {
        let name = default_output_name();
        assert!(name.starts_with("web2speech-audio-"));
        assert!(name.ends_with(".wav"));
    }

    #[test]
    fn merges_chunks_into_one_wav_and_cleans_up_clips() {
        let generator = ToneGenerator {
            dir: tempfile::tempdir().unwrap(),
        };
        let out = tempfile::tempdir().unwrap();
        let text = "One two three. Four five six. Seven eight nine.";
        let output = generate_audio_file(
            &generator,
            text,
            "kokoro-neutral",
            16,
            &CancellationToken::new(),
            out.path(),
        )
        .unwrap();

        assert_eq!(output.chunk_count, 3);
        let reader = hound::WavReader::open(&output.path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8_000);
        assert_eq!(reader.len(), 90);
        assert_eq!(fs::read_dir(generator.dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn empty_text_is_an_error() {
        let generator = ToneGenerator {
            dir: tempfile::tempdir().unwrap(),
        };
        let out = tempfile::tempdir().unwrap();
        let result = generate_audio_file(
            &generator,
            "   ",
            "v",
            100,
            &CancellationToken::new(),
            out.path(),
        );
        assert!(result.is_err());
    }
}
