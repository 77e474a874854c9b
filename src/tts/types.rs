//! TTS (Text-to-Speech) types.

use crate::types::AudioFormat;
use crate::{Error, ErrorContext, Result};
use base64::Engine as _;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DATA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^data:(?P<mime>[\w.+-]+/[\w.+-]+)?(?:;[\w.+-]+=[\w.+-]+)*;base64,(?P<data>.*)$")
        .expect("data URL pattern is valid")
});

/// Request body for the text-to-speech endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToSpeechRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<AudioFormat>,
}

/// Per-call overrides; set fields replace the stored defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TtsOverrides {
    pub voice: Option<String>,
    pub speed: Option<f32>,
    pub pitch: Option<f32>,
    pub volume: Option<f32>,
    pub language: Option<String>,
    pub format: Option<AudioFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToSpeechResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl TextToSpeechResponse {
    /// Decode inline `audioData`, either a `data:` URL or bare base64.
    ///
    /// Returns `Ok(None)` when the response carries no inline audio.
    pub fn inline_audio(&self) -> Result<Option<(Bytes, AudioFormat)>> {
        let Some(data) = self.audio_data.as_deref() else {
            return Ok(None);
        };
        let reported = self.format.as_deref().map(AudioFormat::from_label);
        let (encoded, format) = match DATA_URL.captures(data.trim()) {
            Some(caps) => {
                let mime = caps.name("mime").map(|m| AudioFormat::from_label(m.as_str()));
                let encoded = caps.name("data").map(|m| m.as_str()).unwrap_or_default();
                (encoded, mime.or(reported).unwrap_or_default())
            }
            None if data.starts_with("data:") => {
                return Err(Error::validation_with_context(
                    "audioData is a data URL without base64 payload",
                    ErrorContext::new()
                        .with_field_path("response.audioData")
                        .with_source("tts"),
                ));
            }
            None => (data.trim(), reported.unwrap_or_default()),
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| {
                Error::validation_with_context(
                    format!("audioData is not valid base64: {}", e),
                    ErrorContext::new()
                        .with_field_path("response.audioData")
                        .with_source("tts"),
                )
            })?;
        Ok(Some((Bytes::from(bytes), format)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Male,
    Female,
    Neutral,
}

/// A voice offered by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceOption {
    pub id: String,
    pub name: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<VoiceGender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Audio produced by [`TextToSpeechClient::speak`](super::TextToSpeechClient::speak).
#[derive(Debug, Clone)]
pub struct SpokenAudio {
    pub data: Bytes,
    pub format: AudioFormat,
    pub duration_secs: Option<f64>,
}
