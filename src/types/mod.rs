//! 类型模块：音频生成请求与结果的核心数据类型。
//!
//! # Types Module
//!
//! Strongly-typed representations of what the form collects and what the
//! generation service returns.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`FormState`] | Raw form input with preset selections |
//! | [`GenerationRequest`] | Immutable request built from a [`FormState`] |
//! | [`AudienceTarget`] | Who the generated audio is for |
//! | [`PersonaLevel`] | Narrative detail level |
//! | [`Segment`] | Target customer category |
//! | [`GeneratedAudio`] | Payload plus its playback handle |
//!
//! ## Example
//!
//! ```rust
//! use audiogen::types::{FormState, PersonaLevel};
//!
//! let form = FormState::new("Quarterly update for the retail team")
//!     .with_persona(PersonaLevel::Detailed);
//! let request = form.build().expect("text is not blank");
//! assert_eq!(request.length_minutes.get(), 3);
//!
//! assert!(FormState::new("   ").build().is_none());
//! ```

pub mod audio;
pub mod request;

pub use audio::{download_filename, unix_timestamp_ms, AudioFormat, GeneratedAudio, PlaybackHandle};
pub use request::{AudienceTarget, FormState, GenerationRequest, PersonaLevel, Segment};
