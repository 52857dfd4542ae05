use thiserror::Error;

/// Failures core itself can produce. Each service crate layers its own error
/// enum on top and wraps this one where core operations surface.
#[derive(Error, Debug)]
pub enum VeilNetError {
    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Invalid request: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, VeilNetError>;
