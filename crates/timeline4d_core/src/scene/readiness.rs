//! One-shot scene load task.
//!
//! A model load resolves exactly once, either with a ready scene or with a
//! failure. The loader side holds a `SceneLoadSender`; the engine side awaits
//! the matching `SceneLoadTask`.

use crate::scene::SceneError;
use futures_channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Creates a connected sender/task pair for one model load.
pub fn scene_load_channel<S>() -> (SceneLoadSender<S>, SceneLoadTask<S>) {
    let (tx, rx) = oneshot::channel();
    (SceneLoadSender { tx }, SceneLoadTask { rx })
}

/// Loader-side handle. Consumed by the single outcome it reports.
#[derive(Debug)]
pub struct SceneLoadSender<S> {
    tx: oneshot::Sender<Result<S, SceneError>>,
}

impl<S> SceneLoadSender<S> {
    /// Signals "scene graph ready". Returns `false` when nobody awaits the task.
    pub fn ready(self, scene: S) -> bool {
        self.tx.send(Ok(scene)).is_ok()
    }

    /// Signals "model load failed". Returns `false` when nobody awaits the task.
    pub fn failed(self, reason: impl Into<String>) -> bool {
        self.tx
            .send(Err(SceneError::LoadFailed(reason.into())))
            .is_ok()
    }
}

/// Engine-side future resolving once with the load outcome.
///
/// Resolves to `LoadFailed` when the sender is dropped without reporting.
#[derive(Debug)]
pub struct SceneLoadTask<S> {
    rx: oneshot::Receiver<Result<S, SceneError>>,
}

impl<S> Future for SceneLoadTask<S> {
    type Output = Result<S, SceneError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(SceneError::LoadFailed(
                "scene loader dropped before reporting".to_string(),
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}
