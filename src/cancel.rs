//! Cooperative cancellation primitives shared by the pipeline stages.
//!
//! Each processor owns a disposal [`Signal`]; every run it performs gets a
//! child signal so a restart can abort the run without disposing the
//! processor. Cancellation is a sentinel, never an error: handlers that see
//! [`StageError::Cancelled`] drop the in-flight computation silently.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

/// Sentinel signalling that an in-flight computation was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Cancellation flag observed at every suspension point.
///
/// A signal may be derived from a parent with [`Signal::child`]; the child
/// reports aborted when either its own flag or any ancestor's flag fires.
/// Aborting a parent therefore cancels the whole subtree, while aborting a
/// child leaves its siblings running.
#[derive(Debug, Clone, Default)]
pub struct Signal {
    flag: Arc<AtomicBool>,
    parent: Option<Box<Signal>>,
}

impl Signal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a signal that also observes `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(Box::new(self.clone())),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        if self.flag.load(Ordering::Acquire) {
            return true;
        }
        self.parent
            .as_deref()
            .is_some_and(|parent| parent.is_aborted())
    }

    /// Return `Err(Cancelled)` once the signal has fired.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_aborted() { Err(Cancelled) } else { Ok(()) }
    }
}

/// Failure payload carried by `*-failed` events.
///
/// `Cancelled` is the sentinel the orchestrator ignores; `Failed` wraps the
/// stage-internal error for the developer log and the failure indicator.
#[derive(Debug, Clone)]
pub enum StageError {
    Cancelled,
    Failed(Arc<anyhow::Error>),
}

impl StageError {
    #[must_use]
    pub fn failed(error: anyhow::Error) -> Self {
        Self::Failed(Arc::new(error))
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<Cancelled> for StageError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl From<anyhow::Error> for StageError {
    fn from(error: anyhow::Error) -> Self {
        Self::failed(error)
    }
}
