//! # Services
//!
//! Process-facing entry points: the listening receiver and the sending
//! client. Both are thin shells over the core protocol components.

pub mod client;
pub mod server;
