//! # Utility Modules
//!
//! Supporting utilities shared across the crate.
//!
//! ## Components
//! - **Logging**: tracing subscriber setup from configuration

pub mod logging;
