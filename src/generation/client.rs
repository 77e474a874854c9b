//! Audio generation client.

use crate::config::ClientConfig;
use crate::transport::HttpTransport;
use crate::types::GenerationRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// The outbound call behind a generation session.
///
/// Fails with [`Error::Network`] or [`Error::Server`]; implementations do not retry.
#[async_trait]
pub trait AudioGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Bytes>;
}

/// Client for the audio generation endpoint.
#[derive(Debug, Clone)]
pub struct AudioClient {
    transport: HttpTransport,
    generate_path: String,
}

impl AudioClient {
    pub fn builder() -> AudioClientBuilder {
        AudioClientBuilder::new()
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let config = config.clone().validate()?;
        Ok(Self {
            transport: HttpTransport::new(&config)?,
            generate_path: config.generate_path,
        })
    }

    pub fn endpoint(&self) -> String {
        self.transport.url(&self.generate_path)
    }
}

#[async_trait]
impl AudioGenerator for AudioClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Bytes> {
        info!(
            endpoint = %self.endpoint(),
            target = %request.target,
            persona = %request.persona,
            segment = %request.segment,
            length_minutes = request.length_minutes.get(),
            "sending audio generation request"
        );
        debug!(payload = ?request, "audio generation payload");
        let started = Instant::now();
        let bytes = self
            .transport
            .post_json_for_bytes(&self.generate_path, request, "audio_client")
            .await?;
        info!(
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "audio generated"
        );
        Ok(bytes)
    }
}

pub struct AudioClientBuilder {
    config: ClientConfig,
}

impl AudioClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
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

    pub fn generate_path(mut self, path: impl Into<String>) -> Self {
        self.config.generate_path = path.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<AudioClient> {
        if self.config.generate_path.trim().is_empty() {
            return Err(Error::configuration("generate path must not be empty"));
        }
        AudioClient::from_config(&self.config)
    }
}

impl Default for AudioClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_normalizes_endpoint() {
        let client = AudioClient::builder()
            .base_url("https://audio.example.com/")
            .generate_path("v2/generate")
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "https://audio.example.com/v2/generate");
    }

    #[test]
    fn builder_rejects_empty_path() {
        let err = AudioClient::builder().generate_path("  ").build().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
