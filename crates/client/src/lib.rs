//! VeilNet Client
//!
//! The user-facing side of the network: picks a random circuit from the
//! directory, wraps outgoing messages in nested envelopes, hands the result
//! to the entry relay, and accepts terminal deliveries addressed to it.

mod circuit;
mod server;
mod user;

pub use circuit::{select_circuit, CIRCUIT_LEN};
pub use server::{router, serve};
pub use user::{User, UserState};

use thiserror::Error;
use veilnet_core::VeilNetError;
use veilnet_crypto::CryptoError;
use veilnet_directory::DirectoryError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Invalid(#[from] VeilNetError),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Insufficient relays: need {needed}, got {available}")]
    InsufficientRelays { needed: usize, available: usize },

    #[error("Circuit names unknown node {0}")]
    UnknownNode(u32),

    #[error("Could not reach entry hop at port {destination}: {reason}")]
    EntryHopUnreachable { destination: u32, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
