//! 生成会话：单个视图的请求/响应生命周期与播放句柄管理。
//!
//! Generation session.
//!
//! A session owns the state of one view: the loading flag, the current
//! result and its playback handle, and the last error. Every request is
//! tagged with a sequence number; only the latest request may change what
//! the session shows, so a slow response to a superseded request is
//! dropped instead of overwriting a newer result.
//!
//! Phases run `Idle → Requesting → {Ready | Failed}`. `begin` moves any
//! phase to `Requesting`; `teardown` moves any phase back to `Idle`.

mod state;

pub use state::{GenerationSession, Outcome, Phase, SessionSnapshot, Ticket};
