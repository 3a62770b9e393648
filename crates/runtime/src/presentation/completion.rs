use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;

/// Resolves when a running presentation event may hand over to the next one.
///
/// Fixed-duration events complete on a timer; explicit events complete when
/// their animation reports back. Both are the same type so the queue worker
/// waits on them uniformly.
pub struct Completion {
    inner: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl Completion {
    /// Completes on the next poll.
    pub fn ready() -> Self {
        Self::from_future(std::future::ready(()))
    }

    pub fn after(duration: Duration) -> Self {
        Self::from_future(tokio::time::sleep(duration))
    }

    /// Completes when `signal` fires or its sender is dropped.
    pub fn on_signal(signal: oneshot::Receiver<()>) -> Self {
        Self::from_future(async move {
            if signal.await.is_err() {
                tracing::warn!(
                    target: "runtime::queue",
                    "Completion signal dropped before firing, completing anyway"
                );
            }
        })
    }

    pub fn from_future(future: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(future),
        }
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.inner.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}
