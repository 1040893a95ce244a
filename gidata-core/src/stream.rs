use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use gidata_types::{GiDataError, VariableUpdate};

/// Abstraction over a handle that can be queried for completion and aborted.
pub trait Abortable {
    /// Abort the underlying task if it is still running.
    fn abort(&mut self);
    /// Return `true` if the underlying task has completed.
    fn is_finished(&self) -> bool;
}

impl Abortable for JoinHandle<()> {
    fn abort(&mut self) {
        Self::abort(self);
    }

    fn is_finished(&self) -> bool {
        Self::is_finished(self)
    }
}

/// Abstraction over a one-shot stop signal.
pub trait Stoppable {
    /// Send a best-effort stop signal.
    fn send(self);
}

impl Stoppable for oneshot::Sender<()> {
    fn send(self) {
        let _ = Self::send(self, ());
    }
}

/// Drop-time logic for stream handles:
/// - send a best-effort stop signal if present
/// - abort the task if it hasn't finished yet
pub fn drop_impl<H, S>(inner: &mut Option<H>, stop_tx: &mut Option<S>)
where
    H: Abortable,
    S: Stoppable,
{
    if let Some(tx) = stop_tx.take() {
        tx.send();
    }
    if let Some(mut h) = inner.take()
        && !h.is_finished()
    {
        h.abort();
    }
}

/// Owns the background task behind a live stream.
///
/// Dropping the handle signals stop and aborts the task if it is still running.
#[derive(Debug)]
pub struct StreamHandle {
    inner: Option<JoinHandle<()>>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl StreamHandle {
    /// Wrap a task that watches `stop_tx`'s receiver for graceful shutdown.
    #[must_use]
    pub const fn new(task: JoinHandle<()>, stop_tx: oneshot::Sender<()>) -> Self {
        Self {
            inner: Some(task),
            stop_tx: Some(stop_tx),
        }
    }

    /// Wrap a task that can only be aborted.
    #[must_use]
    pub const fn abort_only(task: JoinHandle<()>) -> Self {
        Self {
            inner: Some(task),
            stop_tx: None,
        }
    }

    /// Signal stop and wait for the task to finish.
    ///
    /// Abort-only handles are aborted instead.
    pub async fn stop(mut self) {
        let graceful = self.stop_tx.take().map(Stoppable::send).is_some();
        if let Some(task) = self.inner.take() {
            if !graceful {
                task.abort();
            }
            let _ = task.await;
        }
    }

    /// Abort the task without waiting.
    pub fn abort(mut self) {
        self.stop_tx.take();
        if let Some(task) = self.inner.take() {
            task.abort();
        }
    }

    /// True once the task has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        drop_impl(&mut self.inner, &mut self.stop_tx);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Open,
    Cancelled,
    Closed,
}

/// Uniform live update stream yielded by the WebSocket and Kafka drivers.
///
/// After [`cancel`](Self::cancel) every `recv` returns `Err(Cancelled)`. When
/// the remote side goes away, `recv` returns `Err(StreamClosed)` from then on.
/// As a `futures::Stream` the terminal error is yielded once, then the stream ends.
#[derive(Debug)]
pub struct UpdateStream {
    handle: Option<StreamHandle>,
    rx: mpsc::Receiver<Result<VariableUpdate, GiDataError>>,
    state: StreamState,
    closed_reason: Option<String>,
}

impl UpdateStream {
    /// Assemble a stream from a producer task and its output channel.
    ///
    /// Producers report a lost connection by sending `Err(StreamClosed)` and
    /// dropping the sender.
    #[must_use]
    pub const fn new(
        handle: StreamHandle,
        rx: mpsc::Receiver<Result<VariableUpdate, GiDataError>>,
    ) -> Self {
        Self {
            handle: Some(handle),
            rx,
            state: StreamState::Open,
            closed_reason: None,
        }
    }

    fn closed_error(&self) -> GiDataError {
        GiDataError::StreamClosed(
            self.closed_reason
                .clone()
                .unwrap_or_else(|| "update source ended".to_string()),
        )
    }

    fn observe(
        &mut self,
        item: Option<Result<VariableUpdate, GiDataError>>,
    ) -> Result<VariableUpdate, GiDataError> {
        match item {
            Some(Ok(update)) => Ok(update),
            Some(Err(GiDataError::StreamClosed(reason))) => {
                self.state = StreamState::Closed;
                self.closed_reason = Some(reason);
                Err(self.closed_error())
            }
            Some(Err(other)) => Err(other),
            None => {
                self.state = StreamState::Closed;
                Err(self.closed_error())
            }
        }
    }

    /// Wait for the next update.
    ///
    /// # Errors
    /// `Cancelled` after `cancel`, `StreamClosed` once the source is gone, or
    /// any non-terminal error reported by the producer.
    pub async fn recv(&mut self) -> Result<VariableUpdate, GiDataError> {
        match self.state {
            StreamState::Cancelled => return Err(GiDataError::Cancelled),
            StreamState::Closed => return Err(self.closed_error()),
            StreamState::Open => {}
        }
        let item = self.rx.recv().await;
        self.observe(item)
    }

    /// Stop the producer, release its connection and mark the stream cancelled.
    pub async fn cancel(&mut self) {
        if self.state == StreamState::Cancelled {
            return;
        }
        self.state = StreamState::Cancelled;
        self.rx.close();
        if let Some(handle) = self.handle.take() {
            handle.stop().await;
        }
    }

    /// True after [`cancel`](Self::cancel).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state == StreamState::Cancelled
    }

    /// True once the producer reported the end of the stream.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == StreamState::Closed
    }
}

impl futures::Stream for UpdateStream {
    type Item = Result<VariableUpdate, GiDataError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.state != StreamState::Open {
            return Poll::Ready(None);
        }
        match self.rx.poll_recv(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(item) => {
                let out = self.observe(item);
                Poll::Ready(Some(out))
            }
        }
    }
}
