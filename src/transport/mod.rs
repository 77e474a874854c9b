//! HTTP transport shared by the audio and text-to-speech clients.

mod http;

pub use http::HttpTransport;
