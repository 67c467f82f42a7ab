//! # Error Types
//!
//! Error handling for the message framing and file reception core.
//!
//! This module defines all error variants that can occur while framing
//! messages off a connection, from low-level I/O failures to protocol
//! limit violations.
//!
//! ## Error Categories
//! - **I/O Errors**: Network and file system failures
//! - **Protocol Errors**: Oversized attribute lines or inline payloads
//! - **Configuration Errors**: Invalid or unreadable configuration
//! - **Queue Errors**: The downstream consumer has gone away
//!
//! All errors implement `std::error::Error` for interoperability.
//!
//! Two conditions from the wire protocol are deliberately *not* errors:
//! a peer closing the attribute channel is normal termination
//! (`MessageFramer::read_message` returns `Ok(None)`), and a file POST
//! without a `content-length` is returned as a plain message with the
//! stream flagged as desynchronized in the log.

use std::io;
use thiserror::Error;

/// Primary error type for all framing and reception operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("attribute line exceeds {limit} bytes")]
    OversizedLine { limit: usize },

    #[error("inline payload too large: {size} bytes (limit {limit})")]
    OversizedPayload { size: usize, limit: usize },

    #[error("message queue closed")]
    QueueClosed,

    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
