//! # Core Protocol Components
//!
//! Message model, framing, and file reception.
//!
//! This module holds the protocol's state-machine logic and byte
//! accounting: parsing the attribute block, deciding between inline and
//! streamed bodies, and consuming exactly the declared byte counts.
//!
//! ## Components
//! - **Message**: ordered attribute list plus optional body
//! - **MessageFramer**: attribute block parsing and body classification
//! - **FileReceiver**: block-wise streaming of declared file bytes
//!
//! ## Wire Format
//! ```text
//! name: value\n
//! name: value\n
//! \n
//! [body — exactly content-length raw bytes]
//! ```

pub mod framer;
pub mod message;
pub mod receiver;
