//! VeilNet Directory
//!
//! The node directory maps relay ids to public keys. Relays register at
//! startup; clients list the registry to pick circuits. The core consumes
//! exactly two operations: register and list.

mod client;
mod registry;
mod server;

pub use client::*;
pub use registry::*;
pub use server::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Directory request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
