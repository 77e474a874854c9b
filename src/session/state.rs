use crate::blob::BlobStore;
use crate::generation::AudioGenerator;
use crate::types::{download_filename, FormState, GeneratedAudio, GenerationRequest, PlaybackHandle};
use crate::Result;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Requesting,
    Ready,
    /// Holds the message shown to the user.
    Failed(String),
}

/// Proof that a request was started; hand it back to [`GenerationSession::complete`].
///
/// A ticket is consumed by `complete` and cannot be duplicated:
///
/// ```compile_fail
/// fn needs_clone<T: Clone>() {}
/// needs_clone::<audiogen::Ticket>();
/// ```
#[derive(Debug)]
pub struct Ticket {
    seq: u64,
    request: GenerationRequest,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }
}

/// Result of driving one request through the session.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Blank text; nothing was sent.
    Skipped,
    Ready(GeneratedAudio),
    /// A newer request started (or the session was torn down) before this one finished.
    Superseded { seq: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub loading: bool,
    pub seq: u64,
    pub handle: Option<PlaybackHandle>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct SessionState {
    seq: u64,
    phase: Phase,
    loading: bool,
    current: Option<GeneratedAudio>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            seq: 0,
            phase: Phase::Idle,
            loading: false,
            current: None,
        }
    }
}

struct Inner<G, B: BlobStore> {
    generator: G,
    blobs: B,
    state: Mutex<SessionState>,
}

impl<G, B: BlobStore> Inner<G, B> {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<G, B: BlobStore> Drop for Inner<G, B> {
    fn drop(&mut self) {
        let current = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .take();
        if let Some(audio) = current {
            self.blobs.revoke(&audio.handle);
        }
    }
}

/// Resets `loading` if a `generate` future is dropped before its request finishes.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    seq: u64,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a Mutex<SessionState>, seq: u64) -> Self {
        Self {
            state,
            seq,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.seq == self.seq {
            state.loading = false;
            state.phase = Phase::Idle;
            warn!(seq = self.seq, "generation abandoned before completion");
        }
    }
}

/// Per-view generation state and the operations that move it.
///
/// Clones share the same state. The last clone to drop releases the
/// current playback handle.
pub struct GenerationSession<G, B: BlobStore> {
    inner: Arc<Inner<G, B>>,
}

impl<G, B: BlobStore> Clone for GenerationSession<G, B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: AudioGenerator, B: BlobStore> GenerationSession<G, B> {
    pub fn new(generator: G, blobs: B) -> Self {
        Self {
            inner: Arc::new(Inner {
                generator,
                blobs,
                state: Mutex::new(SessionState::new()),
            }),
        }
    }

    pub fn blobs(&self) -> &B {
        &self.inner.blobs
    }

    /// Start a request for `form`, or `None` when its text is blank.
    ///
    /// The previous result's handle is released and any in-flight request
    /// loses ownership of the result slot.
    pub fn begin(&self, form: &FormState) -> Option<Ticket> {
        let request = form.build()?;
        let mut state = self.inner.lock();
        state.seq += 1;
        state.phase = Phase::Requesting;
        state.loading = true;
        if let Some(previous) = state.current.take() {
            self.inner.blobs.revoke(&previous.handle);
        }
        info!(seq = state.seq, "generation started");
        Some(Ticket {
            seq: state.seq,
            request,
        })
    }

    /// Record the result of the request behind `ticket`.
    ///
    /// Results for anything but the latest ticket are discarded without
    /// touching state or creating a handle. A failure of the latest request
    /// is recorded and then returned unchanged.
    pub fn complete(&self, ticket: Ticket, result: Result<Bytes>) -> Result<Outcome> {
        let mut state = self.inner.lock();
        if ticket.seq != state.seq {
            warn!(
                seq = ticket.seq,
                latest = state.seq,
                "discarding result of superseded request"
            );
            return Ok(Outcome::Superseded { seq: ticket.seq });
        }
        state.loading = false;
        match result {
            Ok(payload) => {
                let handle = self.inner.blobs.create(payload.clone());
                let audio = GeneratedAudio {
                    seq: ticket.seq,
                    request: ticket.request,
                    payload,
                    handle,
                };
                info!(seq = audio.seq, bytes = audio.len(), handle = %audio.handle, "generation ready");
                state.phase = Phase::Ready;
                if let Some(previous) = state.current.replace(audio.clone()) {
                    self.inner.blobs.revoke(&previous.handle);
                }
                Ok(Outcome::Ready(audio))
            }
            Err(err) => {
                warn!(seq = ticket.seq, error = %err, "generation failed");
                state.phase = Phase::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Build, send, and record one request.
    ///
    /// Dropping the returned future mid-request (e.g. on timeout) returns the
    /// session to `Idle` unless a newer request has already taken over.
    pub async fn generate(&self, form: &FormState) -> Result<Outcome> {
        let Some(ticket) = self.begin(form) else {
            return Ok(Outcome::Skipped);
        };
        let in_flight = InFlight::new(&self.inner.state, ticket.seq);
        let result = self.inner.generator.generate(ticket.request()).await;
        in_flight.disarm();
        self.complete(ticket, result)
    }

    /// Save the current result under its generated filename.
    ///
    /// Returns `Ok(None)` when nothing is ready.
    pub fn download(&self, timestamp_ms: u128) -> Result<Option<PathBuf>> {
        let current = self.inner.lock().current.clone();
        match current {
            Some(audio) => {
                let filename = download_filename(&audio.request, timestamp_ms);
                self.inner.blobs.download(&audio.payload, &filename).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn current(&self) -> Option<GeneratedAudio> {
        self.inner.lock().current.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().loading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.lock();
        let error = match &state.phase {
            Phase::Failed(msg) => Some(msg.clone()),
            _ => None,
        };
        SessionSnapshot {
            phase: state.phase.clone(),
            loading: state.loading,
            seq: state.seq,
            handle: state.current.as_ref().map(|a| a.handle.clone()),
            error,
        }
    }

    /// Release the current handle, return to `Idle`, and orphan any in-flight request.
    pub fn teardown(&self) {
        let mut state = self.inner.lock();
        state.seq += 1;
        state.phase = Phase::Idle;
        state.loading = false;
        if let Some(audio) = state.current.take() {
            self.inner.blobs.revoke(&audio.handle);
        }
        info!(seq = state.seq, "session torn down");
    }
}
