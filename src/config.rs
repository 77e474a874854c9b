//! 客户端配置：服务地址、端点路径、超时与下载目录。
//!
//! Client configuration.
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional YAML file, and `AUDIOGEN_*` environment variables. The binary
//! applies its command-line flags on top.

use crate::{Error, ErrorContext, Result};
use keyring::Entry;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_GENERATE_PATH: &str = "/api/audio/generate";
pub const DEFAULT_TTS_PATH: &str = "/api/text-to-speech";
pub const DEFAULT_VOICES_PATH: &str = "/api/voices";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const KEYRING_SERVICE: &str = "audiogen";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub generate_path: String,
    pub tts_path: String,
    pub voices_path: String,
    pub timeout: Duration,
    pub api_key: Option<String>,
    pub download_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            generate_path: DEFAULT_GENERATE_PATH.to_string(),
            tts_path: DEFAULT_TTS_PATH.to_string(),
            voices_path: DEFAULT_VOICES_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
            download_dir: PathBuf::from("."),
        }
    }
}

/// On-disk shape; every field optional so partial files work.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    generate_path: Option<String>,
    tts_path: Option<String>,
    voices_path: Option<String>,
    timeout_secs: Option<u64>,
    api_key: Option<String>,
    download_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Defaults overlaid with the environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Load a YAML config file on top of the defaults, then apply the environment.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let file: ConfigFile = serde_yaml::from_str(&raw).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid config file: {}", e),
                ErrorContext::new().with_details(path.display().to_string()),
            )
        })?;
        Self::default().merge_file(file).with_env_overrides()
    }

    fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(v) = file.base_url {
            self.base_url = v;
        }
        if let Some(v) = file.generate_path {
            self.generate_path = v;
        }
        if let Some(v) = file.tts_path {
            self.tts_path = v;
        }
        if let Some(v) = file.voices_path {
            self.voices_path = v;
        }
        if let Some(v) = file.timeout_secs {
            self.timeout = Duration::from_secs(v);
        }
        if file.api_key.is_some() {
            self.api_key = file.api_key;
        }
        if let Some(v) = file.download_dir {
            self.download_dir = v;
        }
        self
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(v) = env::var("AUDIOGEN_API_URL") {
            self.base_url = v;
        }
        if let Ok(v) = env::var("AUDIOGEN_GENERATE_PATH") {
            self.generate_path = v;
        }
        if let Ok(v) = env::var("AUDIOGEN_HTTP_TIMEOUT_SECS") {
            let secs = v.parse::<u64>().map_err(|_| {
                Error::configuration_with_context(
                    format!("invalid timeout '{}'", v),
                    ErrorContext::new().with_field_path("AUDIOGEN_HTTP_TIMEOUT_SECS"),
                )
            })?;
            self.timeout = Duration::from_secs(secs);
        }
        if let Ok(v) = env::var("AUDIOGEN_DOWNLOAD_DIR") {
            self.download_dir = PathBuf::from(v);
        }
        if self.api_key.is_none() {
            self.api_key = lookup_api_key(&self.base_url);
        }
        Ok(self)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Check the base URL and timeout, and normalize endpoint paths to start with `/`.
    pub fn validate(mut self) -> Result<Self> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL: {}", e),
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_details(self.base_url.clone()),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("unsupported URL scheme '{}'", parsed.scheme()),
                ErrorContext::new().with_field_path("config.base_url"),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::configuration_with_context(
                "timeout must be greater than zero",
                ErrorContext::new().with_field_path("config.timeout"),
            ));
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self.generate_path = normalize_path(&self.generate_path);
        self.tts_path = normalize_path(&self.tts_path);
        self.voices_path = normalize_path(&self.voices_path);
        Ok(self)
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn lookup_api_key(base_url: &str) -> Option<String> {
    // 1. Try Keyring, keyed by the service host
    let host = url::Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string));
    if let Some(host) = host {
        if let Ok(entry) = Entry::new(KEYRING_SERVICE, &host) {
            if let Ok(key) = entry.get_password() {
                return Some(key);
            }
        }
    }

    // 2. Try Environment Variable
    env::var("AUDIOGEN_API_KEY").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn validate_normalizes_paths() {
        let mut cfg = ClientConfig::default().with_base_url("https://audio.example.com/");
        cfg.generate_path = "generate".into();
        let cfg = cfg.validate().unwrap();
        assert_eq!(cfg.base_url, "https://audio.example.com");
        assert_eq!(cfg.generate_path, "/generate");
    }

    #[test]
    fn validate_rejects_bad_urls_and_zero_timeout() {
        assert!(ClientConfig::default()
            .with_base_url("not a url")
            .validate()
            .is_err());
        assert!(ClientConfig::default()
            .with_base_url("ftp://example.com")
            .validate()
            .is_err());
        assert!(ClientConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url: https://podcasts.internal\ntimeout_secs: 5\ndownload_dir: /tmp/out"
        )
        .unwrap();
        let parsed: ConfigFile =
            serde_yaml::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        let cfg = ClientConfig::default().merge_file(parsed);
        assert_eq!(cfg.base_url, "https://podcasts.internal");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.download_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.generate_path, DEFAULT_GENERATE_PATH);
    }

    #[test]
    fn yaml_file_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_ur1: https://typo.example").unwrap();
        let err = ClientConfig::from_yaml_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
