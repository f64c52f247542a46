//! Bounded point-to-point queues between pipeline stages.
//!
//! A thin wrapper over [`tokio::sync::mpsc`] that also supports capacity 0.
//! With capacity 0 the queue is a rendezvous: [`QueueSender::send`] only
//! returns once the receiver has taken the item, so producer and consumer
//! advance in lock-step. Any larger capacity behaves like a plain bounded
//! channel.

use tokio::sync::{mpsc, oneshot};

/// The receiving side of a queue went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("queue receiver dropped")]
pub struct QueueClosed;

struct Envelope<T> {
    item: T,
    taken: Option<oneshot::Sender<()>>,
}

pub struct QueueSender<T> {
    inner: mpsc::Sender<Envelope<T>>,
    rendezvous: bool,
}

pub struct QueueReceiver<T> {
    inner: mpsc::Receiver<Envelope<T>>,
}

/// Create a queue holding at most `capacity` items in flight.
pub fn bounded<T>(capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let rendezvous = capacity == 0;
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        QueueSender {
            inner: tx,
            rendezvous,
        },
        QueueReceiver { inner: rx },
    )
}

impl<T> QueueSender<T> {
    /// Wait for room (or, at capacity 0, for the receiver) and hand `item`
    /// over. Fails once the receiver is dropped.
    pub async fn send(&self, item: T) -> Result<(), QueueClosed> {
        if !self.rendezvous {
            return self
                .inner
                .send(Envelope { item, taken: None })
                .await
                .map_err(|_| QueueClosed);
        }

        let (taken_tx, taken_rx) = oneshot::channel();
        self.inner
            .send(Envelope {
                item,
                taken: Some(taken_tx),
            })
            .await
            .map_err(|_| QueueClosed)?;
        taken_rx.await.map_err(|_| QueueClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl<T> QueueReceiver<T> {
    /// Next item, or `None` once every sender is dropped and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<T> {
        let envelope = self.inner.recv().await?;
        if let Some(taken) = envelope.taken {
            let _ = taken.send(());
        }
        Some(envelope.item)
    }
}
