//! # Protocol Orchestration
//!
//! Per-connection handling and the producer/consumer queue.
//!
//! ## Components
//! - **ConnectionHandler**: drives one transport, applies termination
//!   rules, forwards completed messages
//! - **MessageQueue / MessageProducer**: bounded, internally synchronized
//!   hand-off between handlers and the downstream consumer

pub mod handler;
pub mod queue;
