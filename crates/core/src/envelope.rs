//! Envelope byte layout
//!
//! An envelope is the full encrypted blob a relay receives:
//!
//! ```text
//! rsaCiphertext(256) ∥ iv(16) ∥ aesCbcCiphertext
//! ```
//!
//! The RSA block carries the layer's symmetric key and its length is fixed by
//! the 2048-bit modulus. Anything that does not split into exactly one
//! asymmetric block followed by one symmetric block is a decryption failure,
//! never a partial result.

use crate::{Result, VeilNetError};

/// RSA-2048 ciphertext length in bytes
pub const RSA_CIPHERTEXT_LEN: usize = 256;

/// AES-CBC initialization vector length in bytes
pub const IV_LEN: usize = 16;

/// AES block size; the symmetric ciphertext is a multiple of this
pub const AES_BLOCK_LEN: usize = 16;

/// Symmetric session key length in bytes (AES-256)
pub const SYM_KEY_LEN: usize = 32;

/// A raw envelope split into its two blocks
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeParts<'a> {
    /// RSA-encrypted symmetric key, always [`RSA_CIPHERTEXT_LEN`] bytes
    pub encrypted_key: &'a [u8],
    /// `iv(16) ∥ aesCbcCiphertext`
    pub encrypted_payload: &'a [u8],
}

/// Split raw envelope bytes into the asymmetric and symmetric blocks.
///
/// Fails if the buffer cannot hold one RSA block plus an IV and at least one
/// AES block of ciphertext.
pub fn split_envelope(bytes: &[u8]) -> Result<EnvelopeParts<'_>> {
    if bytes.len() < RSA_CIPHERTEXT_LEN + IV_LEN + AES_BLOCK_LEN {
        return Err(VeilNetError::Decryption(format!(
            "envelope too short: {} bytes",
            bytes.len()
        )));
    }
    let (encrypted_key, encrypted_payload) = bytes.split_at(RSA_CIPHERTEXT_LEN);
    Ok(EnvelopeParts {
        encrypted_key,
        encrypted_payload,
    })
}
