//! Audio payload and artifact types

use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Container format of an audio payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Wav,
    Mp3,
    Ogg,
    Unknown,
}

impl AudioFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Ogg => "audio/ogg",
            Self::Unknown => "application/octet-stream",
        }
    }

    pub fn from_mime(mime: &str) -> Self {
        match mime.split(';').next().unwrap_or("").trim() {
            "audio/wav" | "audio/x-wav" | "audio/wave" => Self::Wav,
            "audio/mpeg" | "audio/mp3" => Self::Mp3,
            "audio/ogg" => Self::Ogg,
            _ => Self::Unknown,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Unknown => "bin",
        }
    }
}

/// Raw inbound audio, as received from the transport layer
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub data: Vec<u8>,
    pub format: AudioFormat,
}

impl AudioPayload {
    pub fn wav(data: Vec<u8>) -> Self {
        Self {
            data,
            format: AudioFormat::Wav,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Inspect a WAV payload for logging and provider hints.
    ///
    /// Returns `None` when the payload is not parseable WAV.
    pub fn wav_summary(&self) -> Option<WavSummary> {
        if self.format != AudioFormat::Wav {
            return None;
        }
        let reader = hound::WavReader::new(Cursor::new(&self.data)).ok()?;
        let spec = reader.spec();
        let frames = reader.duration();
        let duration_ms = if spec.sample_rate > 0 {
            (frames as u64 * 1000) / spec.sample_rate as u64
        } else {
            0
        };
        Some(WavSummary {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            duration_ms,
        })
    }
}

/// Basic properties of a WAV payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSummary {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_ms: u64,
}

/// Reference to a stored synthesized or uploaded audio file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioArtifact {
    /// Path relative to the artifact store root
    pub path: String,
    /// MIME type of the stored file
    pub mime: String,
}

impl AudioArtifact {
    pub fn new(path: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime: mime.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(sample_rate: u32, samples: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..samples {
                writer.write_sample((i % 128) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_wav_summary() {
        let payload = AudioPayload::wav(wav_bytes(16000, 16000));
        let summary = payload.wav_summary().unwrap();
        assert_eq!(summary.sample_rate, 16000);
        assert_eq!(summary.channels, 1);
        assert_eq!(summary.duration_ms, 1000);
    }

    #[test]
    fn test_wav_summary_rejects_garbage() {
        let payload = AudioPayload::wav(vec![0u8; 32]);
        assert!(payload.wav_summary().is_none());
    }

    #[test]
    fn test_format_from_mime() {
        assert_eq!(AudioFormat::from_mime("audio/wav"), AudioFormat::Wav);
        assert_eq!(
            AudioFormat::from_mime("audio/mpeg; charset=binary"),
            AudioFormat::Mp3
        );
        assert_eq!(AudioFormat::from_mime("video/mp4"), AudioFormat::Unknown);
    }
}
