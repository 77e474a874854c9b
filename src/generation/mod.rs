//! 音频生成模块：把表单请求发送到生成端点并取回二进制音频。
//!
//! Audio generation: send a [`GenerationRequest`](crate::types::GenerationRequest)
//! to the configured endpoint and return the binary payload.

mod client;

pub use client::{AudioClient, AudioClientBuilder, AudioGenerator};
