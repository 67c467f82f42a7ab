//! # Message Queue
//!
//! The hand-off channel between connection handlers and the message
//! consumer.
//!
//! A bounded `tokio::sync::mpsc` channel carries completed messages:
//! every handler holds a cloned [`MessageProducer`], one consumer drains
//! the [`MessageQueue`]. Delivery is FIFO per producer and lossless; when
//! the channel is full, `enqueue` blocks the producing handler, which is
//! the protocol's only backpressure mechanism.

use tokio::sync::mpsc;

use crate::core::message::Message;
use crate::error::{ProtocolError, Result};

/// Default channel capacity when none is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Create a bounded producer/consumer pair.
pub fn message_queue(capacity: usize) -> (MessageProducer, MessageQueue) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (MessageProducer { tx }, MessageQueue { rx })
}

/// Producer handle held by connection handlers.
#[derive(Clone)]
pub struct MessageProducer {
    tx: mpsc::Sender<Message>,
}

impl MessageProducer {
    /// Enqueue a message, waiting while the queue is full.
    ///
    /// Fails only when the consumer side has been dropped.
    pub async fn enqueue(&self, message: Message) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| ProtocolError::QueueClosed)
    }
}

/// Consumer handle draining messages from all connections.
pub struct MessageQueue {
    rx: mpsc::Receiver<Message>,
}

impl MessageQueue {
    /// Wait for the next message.
    ///
    /// Returns `None` once every producer has been dropped and the queue
    /// is drained.
    pub async fn dequeue(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Take a message without waiting, if one is ready.
    pub fn try_dequeue(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }
}
