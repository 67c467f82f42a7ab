//! # Receiver Server
//!
//! TCP accept loop feeding per-connection handlers.
//!
//! [`Receiver::bind`] opens the listener and the shared message queue and
//! returns the consumer handle; [`Receiver::run_with_shutdown`] accepts
//! connections until the shutdown channel fires, spawning one
//! [`ConnectionHandler`] task per accepted stream. The receiver itself
//! never reads the wire — all protocol work happens in the handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::ReceiverConfig;
use crate::core::framer::FramingLimits;
use crate::error::Result;
use crate::protocol::handler::ConnectionHandler;
use crate::protocol::queue::{message_queue, MessageProducer, MessageQueue};
use crate::storage::{FileStore, SinkStore};

/// Listening message receiver.
pub struct Receiver {
    listener: TcpListener,
    local_addr: SocketAddr,
    producer: MessageProducer,
    store: Arc<dyn SinkStore>,
    limits: FramingLimits,
}

impl Receiver {
    /// Bind the listener and storage described by `config`.
    ///
    /// Returns the receiver and the queue consumer handle; the caller
    /// drains the queue while `run` accepts connections.
    pub async fn bind(config: &ReceiverConfig) -> Result<(Self, MessageQueue)> {
        config.validate_strict()?;

        let listener = TcpListener::bind(&config.server.address).await?;
        let local_addr = listener.local_addr()?;
        let store = Arc::new(FileStore::with_suffix(
            &config.storage.transfer_dir,
            &config.storage.received_suffix,
        )?);
        let (producer, queue) = message_queue(config.server.queue_capacity);
        let limits = FramingLimits {
            max_line_len: config.server.max_line_length,
            max_payload: config.server.max_payload_size,
            block_size: config.storage.block_size,
        };

        info!(address = %local_addr, "receiver listening");
        Ok((
            Self {
                listener,
                local_addr,
                producer,
                store,
                limits,
            },
            queue,
        ))
    }

    /// Address the listener actually bound to (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until CTRL+C.
    pub async fn run(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("Received CTRL+C signal, shutting down");
                let _ = shutdown_tx.send(()).await;
            }
        });

        self.run_with_shutdown(shutdown_rx).await
    }

    /// Accept connections until the shutdown channel fires.
    ///
    /// Handler tasks already running keep draining their connections;
    /// only the accept loop stops.
    pub async fn run_with_shutdown(self, mut shutdown_rx: mpsc::Receiver<()>) -> Result<()> {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down receiver accept loop");
                    return Ok(());
                }

                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            info!(peer = %addr, "New connection established");
                            let handler = ConnectionHandler::new(
                                self.producer.clone(),
                                Arc::clone(&self.store),
                            )
                            .with_limits(self.limits);

                            tokio::spawn(async move {
                                handler.run(stream).await;
                                info!(peer = %addr, "Connection closed");
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Error accepting connection");
                        }
                    }
                }
            }
        }
    }
}
