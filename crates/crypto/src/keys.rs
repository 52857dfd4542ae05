//! RSA keypairs for layer key envelopes
//!
//! Each relay owns one RSA-2048 keypair for the lifetime of its process.
//! Public keys are exported as base64 SPKI DER for transport inside JSON;
//! private keys as base64 PKCS#8 DER, held in memory only.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::{CryptoError, Result};

/// RSA modulus size; fixes the asymmetric ciphertext block at 256 bytes
pub const RSA_MODULUS_BITS: usize = 2048;

/// An RSA keypair owned by a single relay process
pub struct RsaKeypair {
    pub private: RsaPrivateKey,
    pub public: RsaPublicKey,
}

impl RsaKeypair {
    /// Generate a fresh RSA-2048 keypair
    pub fn generate() -> Result<Self> {
        let private =
            RsaPrivateKey::new(&mut OsRng, RSA_MODULUS_BITS).map_err(|_| CryptoError::KeyGeneration)?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }

    /// Export the public key as base64 SPKI DER
    pub fn export_public_key(&self) -> Result<String> {
        export_public_key(&self.public)
    }

    /// Export the private key as base64 PKCS#8 DER
    pub fn export_private_key(&self) -> Result<String> {
        let der = self
            .private
            .to_pkcs8_der()
            .map_err(|e| CryptoError::KeyFormat(e.to_string()))?;
        Ok(BASE64.encode(der.as_bytes()))
    }
}

/// Export any RSA public key as base64 SPKI DER
pub fn export_public_key(key: &RsaPublicKey) -> Result<String> {
    let der = key
        .to_public_key_der()
        .map_err(|e| CryptoError::KeyFormat(e.to_string()))?;
    Ok(BASE64.encode(der.as_bytes()))
}

/// Import a public key from base64 SPKI DER
pub fn import_public_key(encoded: &str) -> Result<RsaPublicKey> {
    let der = BASE64
        .decode(encoded)
        .map_err(|e| CryptoError::KeyFormat(e.to_string()))?;
    RsaPublicKey::from_public_key_der(&der).map_err(|e| CryptoError::KeyFormat(e.to_string()))
}

/// Import a private key from base64 PKCS#8 DER
pub fn import_private_key(encoded: &str) -> Result<RsaPrivateKey> {
    let der = BASE64
        .decode(encoded)
        .map_err(|e| CryptoError::KeyFormat(e.to_string()))?;
    RsaPrivateKey::from_pkcs8_der(&der).map_err(|e| CryptoError::KeyFormat(e.to_string()))
}

/// Encrypt a small secret (a session key) under a relay's public key.
///
/// RSA-OAEP/SHA-256 bounds the plaintext at 190 bytes for a 2048-bit
/// modulus; session keys are 32 bytes so the bound is never approached.
pub fn rsa_encrypt(key: &RsaPublicKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    key.encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))
}

/// Decrypt an RSA-OAEP block with the relay's private key.
///
/// Fails on wrong ciphertext length or a non-matching key.
pub fn rsa_decrypt(key: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    key.decrypt(Oaep::new::<Sha256>(), ciphertext)
        .map_err(|e| CryptoError::Decryption(e.to_string()))
}
