use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Key generation failed")]
    KeyGeneration,

    #[error("Malformed key material: {0}")]
    KeyFormat(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
