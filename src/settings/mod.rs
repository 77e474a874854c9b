//! 设置模块：键值持久化与文字转语音默认参数。
//!
//! Settings persistence.
//!
//! [`KeyValueStore`] is a flat string-to-string store, the local analogue
//! of browser storage. [`SettingsStore`] keeps the text-to-speech defaults
//! as a single JSON blob in it and merges updates shallowly.

mod store;
mod tts_settings;

pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use tts_settings::{SettingsStore, TtsSettings, TTS_SETTINGS_KEY};
