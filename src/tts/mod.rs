//! TTS（文字转语音）模块：调用文字转语音服务并查询可用音色。
//!
//! Text-to-speech service client. Requests pick up defaults from the
//! [`SettingsStore`](crate::settings::SettingsStore); responses carry the
//! audio inline (base64 or `data:` URL) or as a URL to fetch.

mod client;
mod types;

pub use client::{TextToSpeechClient, TextToSpeechClientBuilder};
pub use types::{
    SpokenAudio, TextToSpeechRequest, TextToSpeechResponse, TtsOverrides, VoiceGender, VoiceOption,
};
