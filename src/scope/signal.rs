//! Read side of cancellation and deadline capabilities
//!
//! The chain never starts timers or delivers signals. Cancel and deadline
//! scopes hold a shared flag owned by the caller's [`CancelHandle`]; queries on
//! a [`Context`](super::Context) only read those flags and compare deadlines
//! against the current instant.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub(crate) struct CancelSignal {
    cancelled: AtomicBool,
}

impl CancelSignal {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Caller-side handle that fires a cancel or deadline scope
///
/// Cancelling is idempotent. Every context built on top of the cancelled
/// scope observes it through [`Context::done_reason`](super::Context::done_reason).
#[derive(Debug, Clone)]
pub struct CancelHandle {
    signal: Arc<CancelSignal>,
}

impl CancelHandle {
    pub(crate) fn new() -> (Self, Arc<CancelSignal>) {
        let signal = Arc::new(CancelSignal::default());
        (
            Self {
                signal: signal.clone(),
            },
            signal,
        )
    }

    /// Mark the scope as cancelled
    pub fn cancel(&self) {
        if !self.signal.cancelled.swap(true, Ordering::AcqRel) {
            log::trace!("scope cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }
}

/// Why a context is done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoneReason {
    /// A cancel or deadline scope on the chain was cancelled explicitly
    Cancelled,
    /// A deadline on the chain has passed
    DeadlineExceeded,
}

impl fmt::Display for DoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoneReason::Cancelled => write!(f, "context canceled"),
            DoneReason::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}
