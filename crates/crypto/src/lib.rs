//! VeilNet Cryptography
//!
//! This crate provides the cryptographic primitives for VeilNet: RSA-2048
//! keypairs for key envelopes, AES-256-CBC session keys for payloads, and
//! the layered onion build/peel operations on top of both.

mod error;
mod keys;
mod onion;
mod symmetric;

pub use error::*;
pub use keys::*;
pub use onion::*;
pub use symmetric::*;
