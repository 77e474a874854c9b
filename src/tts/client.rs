//! TTS (Text-to-Speech) client.

use super::types::{SpokenAudio, TextToSpeechRequest, TextToSpeechResponse, TtsOverrides, VoiceOption};
use crate::config::ClientConfig;
use crate::settings::SettingsStore;
use crate::transport::HttpTransport;
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use tracing::info;

/// Client for the text-to-speech service and its voice catalogue.
pub struct TextToSpeechClient {
    transport: HttpTransport,
    tts_path: String,
    voices_path: String,
    settings: Arc<SettingsStore>,
}

impl TextToSpeechClient {
    pub fn builder() -> TextToSpeechClientBuilder {
        TextToSpeechClientBuilder::new()
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Request with stored defaults applied, then `overrides` on top.
    pub fn create_request(&self, text: impl Into<String>, overrides: &TtsOverrides) -> TextToSpeechRequest {
        let defaults = self.settings.get();
        TextToSpeechRequest {
            text: text.into(),
            voice: overrides.voice.clone().or_else(|| defaults.default_voice.clone()),
            speed: overrides.speed.or(defaults.default_speed),
            pitch: overrides.pitch.or(defaults.default_pitch),
            volume: overrides.volume.or(defaults.default_volume),
            language: overrides
                .language
                .clone()
                .or_else(|| defaults.default_language.clone()),
            format: overrides.format.or(defaults.default_format),
        }
    }

    /// Send one conversion request. `success: false` becomes [`Error::Server`].
    pub async fn convert(&self, request: &TextToSpeechRequest) -> Result<TextToSpeechResponse> {
        info!(
            voice = request.voice.as_deref().unwrap_or("default"),
            chars = request.text.chars().count(),
            "sending text-to-speech request"
        );
        let response: TextToSpeechResponse = self
            .transport
            .post_json(&self.tts_path, request, "tts")
            .await?;
        if !response.success {
            return Err(Error::server(
                200,
                response
                    .message
                    .unwrap_or_else(|| "text-to-speech conversion failed".to_string()),
            ));
        }
        Ok(response)
    }

    /// Convert `text` and return the audio bytes, fetching `audioUrl` when no inline data is sent.
    pub async fn speak(&self, text: &str, overrides: &TtsOverrides) -> Result<SpokenAudio> {
        let request = self.create_request(text, overrides);
        let response = self.convert(&request).await?;
        if let Some((data, format)) = response.inline_audio()? {
            return Ok(SpokenAudio {
                data,
                format,
                duration_secs: response.duration,
            });
        }
        let Some(url) = response.audio_url.as_deref() else {
            return Err(Error::validation_with_context(
                "response carries neither audioData nor audioUrl",
                ErrorContext::new().with_source("tts"),
            ));
        };
        let url = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            self.transport.url(url)
        };
        let data = self.transport.get_absolute(&url, "tts").await?;
        let format = response
            .format
            .as_deref()
            .or(request.format.map(|f| f.extension()))
            .map(crate::types::AudioFormat::from_label)
            .unwrap_or_default();
        Ok(SpokenAudio {
            data,
            format,
            duration_secs: response.duration,
        })
    }

    pub async fn voices(&self) -> Result<Vec<VoiceOption>> {
        self.transport.get_json(&self.voices_path, "tts").await
    }
}

pub struct TextToSpeechClientBuilder {
    config: ClientConfig,
    settings: Option<Arc<SettingsStore>>,
}

impl TextToSpeechClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            settings: None,
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn settings(mut self, settings: Arc<SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn build(self) -> Result<TextToSpeechClient> {
        let config = self.config.validate()?;
        Ok(TextToSpeechClient {
            transport: HttpTransport::new(&config)?,
            tts_path: config.tts_path,
            voices_path: config.voices_path,
            settings: self
                .settings
                .unwrap_or_else(|| Arc::new(SettingsStore::in_memory())),
        })
    }
}

impl Default for TextToSpeechClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
