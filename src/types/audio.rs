//! Generated audio and playback handle types.

use super::request::GenerationRequest;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Supported audio formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
    Ogg,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
        }
    }

    /// Lenient parse used for server-reported formats and MIME types; unknown values map to MP3.
    pub fn from_label(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "wav" | "audio/wav" | "audio/x-wav" | "audio/wave" => Self::Wav,
            "ogg" | "audio/ogg" => Self::Ogg,
            _ => Self::Mp3,
        }
    }
}

/// Revocable reference to a payload held by a [`BlobStore`](crate::blob::BlobStore).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(String);

impl PlaybackHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A successful generation: payload, its origin, and the handle used to play it.
#[derive(Debug, Clone)]
pub struct GeneratedAudio {
    pub seq: u64,
    pub request: GenerationRequest,
    pub payload: Bytes,
    pub handle: PlaybackHandle,
}

impl GeneratedAudio {
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// `audio-<target>-<persona>-<timestamp_ms>.mp3`
pub fn download_filename(request: &GenerationRequest, timestamp_ms: u128) -> String {
    format!(
        "audio-{}-{}-{}.{}",
        request.target,
        request.persona,
        timestamp_ms,
        AudioFormat::Mp3.extension()
    )
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
pub fn unix_timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
