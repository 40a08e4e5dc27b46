//! Cancellation-aware execution context.
//!
//! A [`Context`] travels with every use-case call and is forwarded to each
//! repository and event-store operation the call issues. Backends wrap
//! their I/O in [`Context::run`], which drops the in-flight future as soon
//! as the context is cancelled or its deadline passes.

use std::future::{Future, pending};
use std::time::Duration;

use futures_util::future::select_all;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Reason a context stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The context was cancelled through a [`CancelHandle`].
    #[error("operation cancelled")]
    Cancelled,

    /// The context deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Execution context carrying an optional deadline and cancellation signals.
///
/// Derived contexts inherit every signal of their parent and the earlier of
/// the two deadlines, so cancelling a parent cancels all of its children.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    signals: Vec<watch::Receiver<bool>>,
}

/// Cancels the context it was created with, and every context derived from it.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signals cancellation. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a context that expires at `deadline` (or earlier if the parent does).
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self {
            deadline: Some(deadline),
            signals: self.signals.clone(),
        }
    }

    /// Derives a context that expires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derives a cancellable context.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let mut signals = self.signals.clone();
        signals.push(receiver);
        (
            Self {
                deadline: self.deadline,
                signals,
            },
            CancelHandle { sender },
        )
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if self.signals.iter().any(|signal| *signal.borrow()) {
            return Some(ContextError::Cancelled);
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Some(ContextError::DeadlineExceeded);
        }
        None
    }

    /// Fails fast if the context is already done.
    pub fn check(&self) -> Result<(), ContextError> {
        match self.err() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        let cancelled = async {
            if self.signals.is_empty() {
                return pending::<()>().await;
            }
            let waits = self.signals.iter().cloned().map(|mut signal| {
                Box::pin(async move {
                    // A dropped handle without a prior cancel never fires.
                    let closed = signal.wait_for(|cancelled| *cancelled).await.is_err();
                    if closed {
                        pending::<()>().await;
                    }
                })
            });
            select_all(waits).await;
        };

        tokio::select! {
            () = cancelled => ContextError::Cancelled,
            () = deadline => ContextError::DeadlineExceeded,
        }
    }

    /// Runs `future` to completion unless the context finishes first.
    ///
    /// On cancellation the future is dropped, which aborts whatever I/O it
    /// had in flight.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        self.check()?;
        tokio::select! {
            biased;
            output = future => Ok(output),
            reason = self.done() => Err(reason),
        }
    }
}
