use crate::config::ClientConfig;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Proxy, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use std::time::Duration;
use tracing::debug;

/// Longest slice of an error body carried into `Error::Server`.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(Duration::from_secs(10)))
            .pool_max_idle_per_host(
                env::var("AUDIOGEN_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("AUDIOGEN_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                format!("failed to create HTTP client: {}", e),
                ErrorContext::new().with_source("transport"),
            )
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// POST a JSON body and return the raw response bytes.
    pub async fn post_json_for_bytes<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        source: &'static str,
    ) -> Result<Bytes> {
        let url = self.url(path);
        debug!(%url, "POST (binary response)");
        let mut req = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "audio/mpeg, audio/*;q=0.9, */*;q=0.8")
            .json(body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let response = req
            .send()
            .await
            .map_err(|e| network_error(e, &url, source))?;
        read_bytes(response, &url, source).await
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        source: &'static str,
    ) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "POST (json response)");
        let mut req = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let response = req
            .send()
            .await
            .map_err(|e| network_error(e, &url, source))?;
        let bytes = read_bytes(response, &url, source).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, source: &'static str) -> Result<T> {
        let url = self.url(path);
        let bytes = self.get_absolute(&url, source).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GET an absolute URL (e.g. an `audioUrl` returned by the server).
    ///
    /// The API key is only attached when `url` shares the base URL's origin.
    pub async fn get_absolute(&self, url: &str, source: &'static str) -> Result<Bytes> {
        debug!(%url, "GET");
        let mut req = self.client.get(url);
        if let Some(key) = &self.api_key {
            if self.is_same_origin(url) {
                req = req.bearer_auth(key);
            } else {
                debug!(%url, "withholding credentials from foreign origin");
            }
        }
        let response = req
            .send()
            .await
            .map_err(|e| network_error(e, url, source))?;
        read_bytes(response, url, source).await
    }

    /// Scheme, host, and port all match the base URL.
    pub fn is_same_origin(&self, url: &str) -> bool {
        match (url::Url::parse(&self.base_url), url::Url::parse(url)) {
            (Ok(base), Ok(other)) => base.origin() == other.origin(),
            _ => false,
        }
    }
}

async fn read_bytes(response: Response, url: &str, source: &'static str) -> Result<Bytes> {
    let status = response.status();
    if !status.is_success() {
        let (prefix, truncated) = read_error_prefix(response).await;
        return Err(Error::server(
            status.as_u16(),
            error_message(status, &prefix, truncated),
        ));
    }
    response
        .bytes()
        .await
        .map_err(|e| network_error(e, url, source))
}

/// Read at most `MAX_ERROR_BODY` bytes of an error body. Read failures end the prefix early.
async fn read_error_prefix(mut response: Response) -> (Vec<u8>, bool) {
    let mut prefix = Vec::new();
    while let Ok(Some(chunk)) = response.chunk().await {
        let room = MAX_ERROR_BODY - prefix.len();
        if chunk.len() > room {
            prefix.extend_from_slice(&chunk[..room]);
            return (prefix, true);
        }
        prefix.extend_from_slice(&chunk);
    }
    (prefix, false)
}

fn error_message(status: StatusCode, prefix: &[u8], truncated: bool) -> String {
    let body = String::from_utf8_lossy(prefix);
    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    if truncated {
        format!("{}…", body)
    } else {
        body.to_string()
    }
}

fn network_error(e: reqwest::Error, url: &str, source: &'static str) -> Error {
    let kind = if e.is_timeout() {
        "request timed out"
    } else if e.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    Error::network_with_context(
        format!("{}: {}", kind, e),
        ErrorContext::new().with_source(source).with_details(url),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_marks_truncation() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, b"  upstream down \n", false),
            "upstream down"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, b"", false), "Not Found");
        assert_eq!(error_message(StatusCode::INTERNAL_SERVER_ERROR, b"abc", true), "abc…");
    }

    #[test]
    fn same_origin_compares_scheme_host_and_port() {
        let cfg = ClientConfig::default().with_base_url("https://tts.example.com");
        let t = HttpTransport::new(&cfg).unwrap();
        assert!(t.is_same_origin("https://tts.example.com/media/a.mp3"));
        assert!(t.is_same_origin("https://tts.example.com:443/media/a.mp3"));
        assert!(!t.is_same_origin("http://tts.example.com/media/a.mp3"));
        assert!(!t.is_same_origin("https://cdn.example.com/media/a.mp3"));
        assert!(!t.is_same_origin("https://tts.example.com:8443/media/a.mp3"));
        assert!(!t.is_same_origin("not a url"));
    }

    #[test]
    fn url_joins_paths() {
        let cfg = ClientConfig::default().with_base_url("http://localhost:9000/");
        let t = HttpTransport::new(&cfg).unwrap();
        assert_eq!(t.url("/api/voices"), "http://localhost:9000/api/voices");
        assert_eq!(t.url("api/voices"), "http://localhost:9000/api/voices");
    }
}
