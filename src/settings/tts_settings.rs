use super::store::{KeyValueStore, MemoryKeyValueStore};
use crate::types::AudioFormat;
use crate::Result;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Storage key of the settings blob.
pub const TTS_SETTINGS_KEY: &str = "tts-settings";

/// Optional defaults applied to text-to-speech requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TtsSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_pitch: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_volume: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<AudioFormat>,
}

impl TtsSettings {
    /// Shallow merge: fields set in `update` win, the rest keep their current value.
    pub fn merged(&self, update: &TtsSettings) -> TtsSettings {
        TtsSettings {
            default_voice: update.default_voice.clone().or_else(|| self.default_voice.clone()),
            default_speed: update.default_speed.or(self.default_speed),
            default_pitch: update.default_pitch.or(self.default_pitch),
            default_volume: update.default_volume.or(self.default_volume),
            default_language: update
                .default_language
                .clone()
                .or_else(|| self.default_language.clone()),
            default_format: update.default_format.or(self.default_format),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TtsSettings::default()
    }
}

/// Settings held in memory and written through to a [`KeyValueStore`] on change.
pub struct SettingsStore {
    backend: Box<dyn KeyValueStore>,
    current: ArcSwap<TtsSettings>,
    /// Serializes read-merge-write so concurrent saves do not drop each other's fields.
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Load settings from `backend`. An unreadable blob is logged and replaced by empty settings.
    pub fn open(backend: impl KeyValueStore + 'static) -> Result<Self> {
        let loaded = match backend.get(TTS_SETTINGS_KEY)? {
            Some(raw) => match serde_json::from_str::<TtsSettings>(&raw) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(error = %e, backend = backend.name(), "ignoring unreadable tts settings");
                    TtsSettings::default()
                }
            },
            None => TtsSettings::default(),
        };
        debug!(backend = backend.name(), settings = ?loaded, "loaded tts settings");
        Ok(Self {
            backend: Box::new(backend),
            current: ArcSwap::from_pointee(loaded),
            write_lock: Mutex::new(()),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryKeyValueStore::new()),
            current: ArcSwap::from_pointee(TtsSettings::default()),
            write_lock: Mutex::new(()),
        }
    }

    /// Snapshot of the current settings.
    pub fn get(&self) -> Arc<TtsSettings> {
        self.current.load_full()
    }

    /// Merge `update` into the current settings and persist the result.
    pub fn save(&self, update: &TtsSettings) -> Result<Arc<TtsSettings>> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let merged = Arc::new(self.current.load().merged(update));
        self.backend
            .set(TTS_SETTINGS_KEY, &serde_json::to_string(merged.as_ref())?)?;
        self.current.store(Arc::clone(&merged));
        Ok(merged)
    }

    /// Drop all stored defaults.
    pub fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.backend.remove(TTS_SETTINGS_KEY)?;
        self.current.store(Arc::new(TtsSettings::default()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FileKeyValueStore;
    use std::thread;
    use std::time::Duration;

    /// Memory backend whose writes stall long enough for saves to interleave.
    struct SlowStore(Arc<MemoryKeyValueStore>);

    impl KeyValueStore for SlowStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            thread::sleep(Duration::from_millis(50));
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<bool> {
            self.0.remove(key)
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let base = TtsSettings {
            default_voice: Some("alloy".into()),
            default_speed: Some(1.0),
            ..Default::default()
        };
        let update = TtsSettings {
            default_speed: Some(1.25),
            default_format: Some(AudioFormat::Wav),
            ..Default::default()
        };
        let merged = base.merged(&update);
        assert_eq!(merged.default_voice.as_deref(), Some("alloy"));
        assert_eq!(merged.default_speed, Some(1.25));
        assert_eq!(merged.default_format, Some(AudioFormat::Wav));
        assert_eq!(merged.default_pitch, None);
    }

    #[test]
    fn blob_uses_camel_case_keys() {
        let settings = TtsSettings {
            default_voice: Some("nova".into()),
            default_format: Some(AudioFormat::Ogg),
            ..Default::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"defaultVoice": "nova", "defaultFormat": "ogg"})
        );
    }

    #[test]
    fn saved_settings_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let store = SettingsStore::open(FileKeyValueStore::open(&path).unwrap()).unwrap();
        assert!(store.get().is_empty());
        store
            .save(&TtsSettings {
                default_language: Some("en-US".into()),
                ..Default::default()
            })
            .unwrap();
        store
            .save(&TtsSettings {
                default_volume: Some(0.8),
                ..Default::default()
            })
            .unwrap();

        let reopened = SettingsStore::open(FileKeyValueStore::open(&path).unwrap()).unwrap();
        let settings = reopened.get();
        assert_eq!(settings.default_language.as_deref(), Some("en-US"));
        assert_eq!(settings.default_volume, Some(0.8));

        reopened.reset().unwrap();
        assert!(reopened.get().is_empty());
    }

    #[test]
    fn unreadable_blob_falls_back_to_empty() {
        let backend = MemoryKeyValueStore::new();
        backend.set(TTS_SETTINGS_KEY, "[1,2,3]").unwrap();
        let store = SettingsStore::open(backend).unwrap();
        assert!(store.get().is_empty());
    }

    #[test]
    fn concurrent_saves_keep_both_fields() {
        let inner = Arc::new(MemoryKeyValueStore::new());
        let store = SettingsStore::open(SlowStore(Arc::clone(&inner))).unwrap();

        thread::scope(|s| {
            s.spawn(|| {
                store
                    .save(&TtsSettings {
                        default_voice: Some("nova".into()),
                        ..Default::default()
                    })
                    .unwrap();
            });
            s.spawn(|| {
                store
                    .save(&TtsSettings {
                        default_speed: Some(1.5),
                        ..Default::default()
                    })
                    .unwrap();
            });
        });

        let current = store.get();
        assert_eq!(current.default_voice.as_deref(), Some("nova"));
        assert_eq!(current.default_speed, Some(1.5));

        let raw = inner.get(TTS_SETTINGS_KEY).unwrap().unwrap();
        let persisted: TtsSettings = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, *current);
    }
}
