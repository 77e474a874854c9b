//! # audiogen
//!
//! 音频生成客户端：收集文本与选项，请求远端生成服务，并管理生成音频的播放句柄与下载。
//!
//! Client library for a remote audio-generation service.
//!
//! ## Overview
//!
//! A caller fills in a [`FormState`] (text plus audience, persona, segment,
//! and length), a [`GenerationSession`] turns it into a request, sends it
//! through an [`AudioGenerator`], and keeps the resulting payload behind a
//! revocable playback handle in a [`BlobStore`]. The session tags every
//! request with a sequence number, so only the most recent request can
//! change what is shown.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use audiogen::{AudioClient, FormState, GenerationSession, MemoryBlobStore, Outcome};
//!
//! #[tokio::main]
//! async fn main() -> audiogen::Result<()> {
//!     let client = AudioClient::builder()
//!         .base_url("http://localhost:3000")
//!         .build()?;
//!     let session = GenerationSession::new(client, MemoryBlobStore::new());
//!
//!     if let Outcome::Ready(audio) = session.generate(&FormState::new("Weekly digest")).await? {
//!         println!("playback handle: {}", audio.handle);
//!         session.download(audiogen::types::unix_timestamp_ms())?;
//!     }
//!     session.teardown();
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Form, request, and generated-audio types |
//! | [`generation`] | Audio generation client |
//! | [`blob`] | Playback handles and downloads |
//! | [`session`] | Per-view request lifecycle |
//! | [`tts`] | Text-to-speech service client |
//! | [`settings`] | Persisted text-to-speech defaults |
//! | [`config`] | Endpoint, timeout, and download configuration |

pub mod blob;
pub mod config;
pub mod generation;
pub mod session;
pub mod settings;
pub mod transport;
pub mod tts;
pub mod types;

pub use blob::{BlobStore, MemoryBlobStore};
pub use config::ClientConfig;
pub use generation::{AudioClient, AudioClientBuilder, AudioGenerator};
pub use session::{GenerationSession, Outcome, Phase, SessionSnapshot, Ticket};
pub use settings::{SettingsStore, TtsSettings};
pub use tts::TextToSpeechClient;
pub use types::{
    AudienceTarget, FormState, GeneratedAudio, GenerationRequest, PersonaLevel, PlaybackHandle,
    Segment,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
