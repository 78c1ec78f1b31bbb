//! Long-lived listeners on the auth event bus.
//!
//! [`Subscription::spawn`] runs a handler for every event on a background
//! task. The task stops when [`Subscription::unsubscribe`] is awaited,
//! when the handle is dropped, or when the bus itself is dropped.
//! Events are handled one at a time, in publication order.

use std::future::Future;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bus::AuthEvent;

pub struct Subscription {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Spawn the receive loop for `receiver`, calling `handler` per event.
    pub fn spawn<F, Fut>(mut receiver: broadcast::Receiver<AuthEvent>, mut handler: F) -> Self
    where
        F: FnMut(AuthEvent) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        tracing::debug!("Auth subscription cancelled");
                        break;
                    }
                    received = receiver.recv() => match received {
                        Ok(event) => handler(event).await,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(skipped = n, "Auth subscription lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::info!("Auth event bus closed, subscription shutting down");
                            break;
                        }
                    },
                }
            }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Whether the receive loop is still running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the receive loop and wait for it to exit.
    pub async fn unsubscribe(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Auth subscription task failed");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
