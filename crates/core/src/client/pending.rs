//! Awaitable handle for one in-flight batch.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::error::PushError;

enum State<T> {
    Running(JoinHandle<Result<T, PushError>>),
    Failed(Option<PushError>),
}

/// One batch dispatched on the runtime.
///
/// Resolves to the batch's decoded result. Batches run independently: one
/// failing never affects another. Dropping the handle stops waiting but lets
/// the request finish in the background; [`PendingBatch::abort`] cancels it.
pub struct PendingBatch<T> {
    recipient_count: usize,
    state: State<T>,
}

impl<T> PendingBatch<T> {
    pub(crate) fn spawned(
        handle: JoinHandle<Result<T, PushError>>,
        recipient_count: usize,
    ) -> Self {
        Self {
            recipient_count,
            state: State::Running(handle),
        }
    }

    /// A batch that failed before it could be dispatched.
    pub(crate) fn failed(error: PushError, recipient_count: usize) -> Self {
        Self {
            recipient_count,
            state: State::Failed(Some(error)),
        }
    }

    /// Number of results this batch resolves to on success.
    pub fn recipient_count(&self) -> usize {
        self.recipient_count
    }

    /// Cancel the batch. Awaiting it afterwards yields [`PushError::Cancelled`].
    pub fn abort(&self) {
        if let State::Running(handle) = &self.state {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            State::Running(handle) => handle.is_finished(),
            State::Failed(_) => true,
        }
    }
}

impl<T> Future for PendingBatch<T> {
    type Output = Result<T, PushError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Running(handle) => Pin::new(handle).poll(cx).map(|joined| match joined {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(PushError::Cancelled),
                Err(e) => Err(PushError::Task(e.to_string())),
            }),
            State::Failed(error) => Poll::Ready(Err(error.take().unwrap_or_else(|| {
                PushError::Task("batch polled after completion".to_string())
            }))),
        }
    }
}

/// Await every batch, returning results in submission order.
pub async fn join_batches<T>(batches: Vec<PendingBatch<T>>) -> Vec<Result<T, PushError>> {
    futures::future::join_all(batches).await
}

/// Cancel every batch in the group.
pub fn abort_batches<T>(batches: &[PendingBatch<T>]) {
    for batch in batches {
        batch.abort();
    }
}
