//! Layered envelope construction and peeling
//!
//! The client wraps a message in one envelope per relay, built from the exit
//! end inward. Each layer's plaintext is a 10-digit routing header followed
//! by either the next envelope (base64) or the terminal content:
//!
//! ```text
//! envelope      = rsaEncrypt(sessionKey) ∥ aesEncrypt(header ∥ payload)
//! header        = destination port, left-zero-padded to 10 ASCII digits
//! ```
//!
//! A relay peels exactly one layer with [`peel_layer`] and learns only the
//! next hop, never the full circuit or the final content.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::{RsaPrivateKey, RsaPublicKey};

use veilnet_core::{encode_routing_header, split_envelope};

use crate::error::{CryptoError, Result};
use crate::keys::{rsa_decrypt, rsa_encrypt};
use crate::symmetric::SymmetricKey;

/// One hop of a circuit as seen by the envelope builder
pub struct OnionHop {
    /// Port the relay's `/message` endpoint listens on
    pub port: u32,
    /// The relay's RSA public key
    pub public_key: RsaPublicKey,
}

/// A fully wrapped message ready for its first hop
pub struct OnionMessage {
    /// Base64 envelope for the entry relay, or the bare plaintext when the
    /// circuit is empty
    pub payload: String,
    /// Port of the entry relay, or of the final destination when the circuit
    /// is empty
    pub destination: u32,
}

/// Wrap one layer: prepend the routing header, encrypt under a fresh session
/// key, and seal that key for the recipient. Returns the base64 envelope.
pub fn wrap_layer(recipient: &RsaPublicKey, destination: u32, payload: &str) -> Result<String> {
    let mut plaintext = encode_routing_header(destination);
    plaintext.push_str(payload);

    let session_key = SymmetricKey::generate();
    let encrypted_payload = session_key.encrypt(plaintext.as_bytes());
    let encrypted_key = rsa_encrypt(recipient, session_key.as_bytes())?;

    let mut envelope = Vec::with_capacity(encrypted_key.len() + encrypted_payload.len());
    envelope.extend_from_slice(&encrypted_key);
    envelope.extend_from_slice(&encrypted_payload);
    Ok(BASE64.encode(envelope))
}

/// Build the nested envelopes for a whole circuit, exit end inward.
///
/// With an empty circuit the plaintext goes out as-is, straight to the final
/// destination. That degrades anonymity to nothing but is the documented
/// behavior when no relays are registered.
pub fn build_circuit_message(
    hops: &[OnionHop],
    final_destination: u32,
    plaintext: &str,
) -> Result<OnionMessage> {
    let mut payload = plaintext.to_string();
    let mut destination = final_destination;

    for hop in hops.iter().rev() {
        payload = wrap_layer(&hop.public_key, destination, &payload)?;
        destination = hop.port;
    }

    Ok(OnionMessage {
        payload,
        destination,
    })
}

/// Peel exactly one layer from a base64 envelope.
///
/// Returns the layer's plaintext: routing header plus remainder. Every
/// failure mode (short envelope, wrong key, corrupt ciphertext, non-UTF-8
/// plaintext) is a [`CryptoError::Decryption`], never a partial result.
pub fn peel_layer(private: &RsaPrivateKey, envelope: &str) -> Result<String> {
    let bytes = BASE64
        .decode(envelope)
        .map_err(|_| CryptoError::Decryption("envelope is not valid base64".to_string()))?;

    let parts = split_envelope(&bytes).map_err(|e| CryptoError::Decryption(e.to_string()))?;

    let key_bytes = rsa_decrypt(private, parts.encrypted_key)?;
    let session_key = SymmetricKey::from_bytes(&key_bytes)
        .map_err(|_| CryptoError::Decryption("recovered session key has wrong length".to_string()))?;

    let plaintext = session_key.decrypt(parts.encrypted_payload)?;
    String::from_utf8(plaintext)
        .map_err(|_| CryptoError::Decryption("plaintext is not valid UTF-8".to_string()))
}
