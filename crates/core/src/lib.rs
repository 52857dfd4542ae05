//! VeilNet Core Types
//!
//! This crate defines the fundamental data structures used throughout VeilNet:
//! the envelope byte layout, the next-hop routing header, node records, and
//! the network port scheme.

mod config;
mod envelope;
mod error;
mod header;
mod types;

pub use config::*;
pub use envelope::*;
pub use error::*;
pub use header::*;
pub use types::*;
