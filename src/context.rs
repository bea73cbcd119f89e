//! Deadline and cancellation carried alongside every database call.
//!
//! A [`Context`] never times anything out on its own. Callers build one with a
//! deadline and/or a cancel handle and hand it down; each database call is
//! wrapped in [`Context::run`], which drops the in-flight future as soon as the
//! context expires.
use crate::errors::PluginError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Clone, Debug, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`Context`] derived from the one it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // no receivers left means nothing to cancel
        let _ = self.tx.send(true);
    }
}

impl Context {
    /// A context that never expires and cannot be cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    /// Derive a cancellable context. The deadline, if any, is kept.
    pub fn with_cancel(self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                deadline: self.deadline,
                cancel: Some(rx),
            },
            CancelHandle { tx },
        )
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The error this context would fail with right now, if any.
    pub fn err(&self) -> Option<PluginError> {
        if let Some(rx) = &self.cancel {
            if *rx.borrow() {
                return Some(PluginError::Cancelled);
            }
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(PluginError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Run `fut` unless the context is already done, aborting it if the context
    /// expires or is cancelled first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, PluginError>
    where
        F: Future<Output = Result<T, PluginError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => loop {
                    if *rx.borrow_and_update() {
                        break;
                    }
                    if rx.changed().await.is_err() {
                        // handle dropped without cancelling
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            res = fut => res,
            _ = cancelled => Err(PluginError::Cancelled),
            _ = expired => Err(PluginError::DeadlineExceeded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn background_runs_to_completion() {
        let ctx = Context::background();
        assert!(ctx.err().is_none());
        assert!(ctx.deadline().is_none());
        let res = ctx.run(async { Ok::<_, PluginError>(42) }).await;
        assert_eq!(res.unwrap(), 42);
    }

    #[tokio::test]
    async fn expired_context_never_polls_the_future() {
        let ctx = Context::with_timeout(Duration::ZERO);
        let polled = AtomicBool::new(false);
        let res = ctx
            .run(async {
                polled.store(true, Ordering::SeqCst);
                Ok::<_, PluginError>(())
            })
            .await;
        assert!(matches!(res, Err(PluginError::DeadlineExceeded)));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn deadline_aborts_a_slow_call() {
        let ctx = Context::with_timeout(Duration::from_millis(20));
        let res = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, PluginError>(())
            })
            .await;
        assert!(matches!(res, Err(PluginError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn cancel_aborts_a_call_in_flight() {
        let (ctx, handle) = Context::background().with_cancel();
        let runner = ctx.clone();
        let task = tokio::spawn(async move {
            runner
                .run(async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok::<_, PluginError>(())
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
        let res = task.await.unwrap();
        assert!(matches!(res, Err(PluginError::Cancelled)));
        assert!(matches!(ctx.err(), Some(PluginError::Cancelled)));
    }

    #[tokio::test]
    async fn dropped_handle_does_not_cancel() {
        let (ctx, handle) = Context::background().with_cancel();
        drop(handle);
        let res = ctx.run(async { Ok::<_, PluginError>("done") }).await;
        assert_eq!(res.unwrap(), "done");
    }

    #[tokio::test]
    async fn with_cancel_keeps_the_deadline() {
        let parent = Context::with_timeout(Duration::from_secs(60));
        let deadline = parent.deadline();
        let (child, _handle) = parent.with_cancel();
        assert_eq!(child.deadline(), deadline);
    }
}
