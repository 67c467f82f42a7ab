//! # postline
//!
//! Line-delimited message framing and file reception core.
//!
//! Postline implements a simple one-way, HTTP-style messaging protocol: a
//! peer sends messages as a block of `name: value` attribute lines ended
//! by a blank line, followed by either an inline body of exactly
//! `content-length` bytes or a streamed file payload. Completed messages
//! are handed to a downstream consumer through a bounded queue.
//!
//! ## Architecture
//! - [`core`] — message model, framing state machine, file reception
//! - [`transport`] — buffered byte-stream abstraction (testable in memory)
//! - [`protocol`] — per-connection handler and the message queue
//! - [`storage`] — named binary sinks for received files
//! - [`service`] — TCP receiver (accept loop) and sending client
//! - [`config`] / [`error`] / [`utils`] — ambient concerns
//!
//! ## Example
//! ```no_run
//! use postline::config::ReceiverConfig;
//! use postline::service::server::Receiver;
//!
//! #[tokio::main]
//! async fn main() -> postline::error::Result<()> {
//!     let config = ReceiverConfig::default();
//!     postline::utils::logging::init(&config.logging);
//!
//!     let (receiver, mut queue) = Receiver::bind(&config).await?;
//!     tokio::spawn(async move {
//!         while let Some(msg) = queue.dequeue().await {
//!             println!("got message: {}", msg.body_str());
//!         }
//!     });
//!     receiver.run().await
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod storage;
pub mod transport;
pub mod utils;

pub use crate::core::framer::{FramingLimits, MessageFramer};
pub use crate::core::message::{Attribute, Message};
pub use crate::core::receiver::{FileReceiver, ReceiveOutcome, BLOCK_SIZE};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::handler::ConnectionHandler;
pub use crate::protocol::queue::{message_queue, MessageProducer, MessageQueue};
pub use crate::transport::Transport;
