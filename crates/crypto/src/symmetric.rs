//! AES-256-CBC session keys
//!
//! A session key encrypts exactly one envelope layer of one message and is
//! never reused. Ciphertexts carry their random IV as a 16-byte prefix.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

use veilnet_core::{AES_BLOCK_LEN, IV_LEN, SYM_KEY_LEN};

use crate::error::{CryptoError, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// A single-use AES-256 session key
pub struct SymmetricKey([u8; SYM_KEY_LEN]);

impl SymmetricKey {
    /// Generate a fresh random session key
    pub fn generate() -> Self {
        let mut key = [0u8; SYM_KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Reconstruct a key from raw bytes (e.g. a decrypted key envelope)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; SYM_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| CryptoError::KeyFormat(format!("expected {SYM_KEY_LEN} bytes")))?;
        Ok(Self(key))
    }

    /// Raw key bytes, as they travel inside the RSA envelope
    pub fn as_bytes(&self) -> &[u8; SYM_KEY_LEN] {
        &self.0
    }

    /// Export to a transmittable base64 encoding
    pub fn export(&self) -> String {
        BASE64.encode(self.0)
    }

    /// Inverse of [`export`](Self::export)
    pub fn import(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::KeyFormat(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Encrypt with a fresh random IV; returns `iv(16) ∥ ciphertext`
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let cipher = Aes256CbcEnc::new(
            GenericArray::from_slice(&self.0),
            GenericArray::from_slice(&iv),
        );
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(&ciphertext);
        out
    }

    /// Decrypt `iv(16) ∥ ciphertext`; fails on short input or bad padding
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < IV_LEN + AES_BLOCK_LEN {
            return Err(CryptoError::Decryption(format!(
                "ciphertext too short: {} bytes",
                data.len()
            )));
        }
        let (iv, ciphertext) = data.split_at(IV_LEN);
        if ciphertext.len() % AES_BLOCK_LEN != 0 {
            return Err(CryptoError::Decryption(
                "ciphertext is not block-aligned".to_string(),
            ));
        }

        let cipher = Aes256CbcDec::new(
            GenericArray::from_slice(&self.0),
            GenericArray::from_slice(iv),
        );
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::Decryption("invalid padding".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = SymmetricKey::generate();
        let plaintext = b"Hello, VeilNet!";

        let ciphertext = key.encrypt(plaintext);
        let decrypted = key.decrypt(&ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_iv_is_prepended() {
        let key = SymmetricKey::generate();
        let ciphertext = key.encrypt(b"x");
        // 16-byte IV + one padded block
        assert_eq!(ciphertext.len(), IV_LEN + AES_BLOCK_LEN);
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let key = SymmetricKey::generate();
        let a = key.encrypt(b"same plaintext");
        let b = key.encrypt(b"same plaintext");
        assert_ne!(a, b);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let key = SymmetricKey::generate();
        let imported = SymmetricKey::import(&key.export()).unwrap();
        assert_eq!(imported.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_from_bytes_wrong_length() {
        assert!(matches!(
            SymmetricKey::from_bytes(&[0u8; 16]),
            Err(CryptoError::KeyFormat(_))
        ));
    }

    #[test]
    fn test_decrypt_too_short() {
        let key = SymmetricKey::generate();
        assert!(matches!(
            key.decrypt(&[0u8; IV_LEN]),
            Err(CryptoError::Decryption(_))
        ));
    }

    #[test]
    fn test_decrypt_unaligned_ciphertext() {
        let key = SymmetricKey::generate();
        let mut ciphertext = key.encrypt(b"payload");
        ciphertext.push(0);
        assert!(matches!(
            key.decrypt(&ciphertext),
            Err(CryptoError::Decryption(_))
        ));
    }

    #[test]
    fn test_wrong_key_does_not_recover_plaintext() {
        let key = SymmetricKey::generate();
        let wrong = SymmetricKey::generate();
        let plaintext = b"Secret data";

        let ciphertext = key.encrypt(plaintext);
        // CBC has no authentication: a wrong key usually trips the padding
        // check, occasionally it yields garbage. Either way the plaintext
        // must not come back.
        match wrong.decrypt(&ciphertext) {
            Ok(decrypted) => assert_ne!(decrypted, plaintext),
            Err(CryptoError::Decryption(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_plaintext() {
        let key = SymmetricKey::generate();
        let ciphertext = key.encrypt(b"");
        let decrypted = key.decrypt(&ciphertext).unwrap();
        assert!(decrypted.is_empty());
    }
}
