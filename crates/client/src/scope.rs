//! Lifecycle-scoped requests.
//!
//! A view creates a [`ViewScope`] when it is shown and drops it when it goes
//! away. Requests started through the scope's [`ScopeHandle`] resolve to
//! [`ApiError::Cancelled`] once that happens, so a late response is never
//! applied to a view that no longer exists.

use std::future::Future;

use tokio::sync::watch;
use tracing::debug;

use crate::error::ApiError;

/// Owner of a cancellation signal. Dropping it cancels.
#[derive(Debug)]
pub struct ViewScope {
    tx: watch::Sender<bool>,
}

/// Cloneable handle used to run requests inside a scope.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    rx: watch::Receiver<bool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    #[must_use]
    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            rx: self.tx.subscribe(),
        }
    }

    /// Cancel every request running under this scope.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl ScopeHandle {
    /// Whether the scope was cancelled or dropped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Run `fut` unless the scope goes away first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Cancelled`] (converted into the caller's error
    /// type) if the scope is cancelled or dropped before `fut` completes,
    /// otherwise whatever `fut` returns.
    pub async fn run<T, E, F>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<ApiError>,
    {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled.into());
        }
        let mut rx = self.rx.clone();
        tokio::select! {
            biased;
            _ = rx.wait_for(|cancelled| *cancelled) => {
                debug!("request cancelled by its scope");
                Err(ApiError::Cancelled.into())
            }
            result = fut => result,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_completes_when_not_cancelled() {
        let scope = ViewScope::new();
        let value = scope.handle().run(async { Ok::<_, ApiError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_request() {
        let scope = ViewScope::new();
        let handle = scope.handle();
        let task = tokio::spawn(async move {
            handle
                .run(async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok::<_, ApiError>(())
                })
                .await
        });
        tokio::task::yield_now().await;
        scope.cancel();
        assert!(task.await.unwrap().unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let scope = ViewScope::new();
        let handle = scope.handle();
        drop(scope);
        assert!(handle.is_cancelled());
        let result = handle.run(async { Ok::<_, ApiError>(1) }).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }
}
