//! Error types for biometric key management
//!
//! Errors fall into two families. [`KeyStoreError`] covers the store, key and
//! IO failures that can occur while preparing the cipher; these are
//! recoverable and mean "cannot authenticate right now".
//! [`KeyGenerationError`] means the platform cannot produce the key at all and
//! is treated as fatal.

use thiserror::Error;

/// Result type alias for biometric operations
pub type Result<T> = std::result::Result<T, BiometricError>;

/// Recoverable key store failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyStoreError {
    #[error("Key store error: {0}")]
    KeyStore(String),

    #[error("Certificate error: {0}")]
    Certificate(String),

    #[error("Key unrecoverable: {0}")]
    UnrecoverableKey(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("No such algorithm: {0}")]
    NoSuchAlgorithm(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("No such padding: {0}")]
    NoSuchPadding(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),
}

/// Unrecoverable key generation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyGenerationError {
    #[error("Key provider unavailable: {0}")]
    NoSuchProvider(String),

    #[error("Key algorithm unavailable: {0}")]
    NoSuchAlgorithm(String),

    #[error("Invalid key parameters: {0}")]
    InvalidAlgorithmParameter(String),
}

/// Capability check failures (missing hardware or permission)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Biometric security error: {0}")]
    Security(String),
}

/// Crypto object failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("Crypto object not authorized by a biometric prompt")]
    NotAuthorized,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed - wrong key or corrupted data")]
    Decryption,

    #[error("Ciphertext too short")]
    TooShort,
}

/// Errors surfaced by the fingerprint helper
#[derive(Debug, Error)]
pub enum BiometricError {
    /// Key could not be generated; not recoverable
    #[error("Key generation failed: {0}")]
    KeyGeneration(#[from] KeyGenerationError),

    /// Capability check failed
    #[error("Biometric availability error: {0}")]
    Availability(#[from] AvailabilityError),

    /// Key store failure
    #[error("Key store failure: {0}")]
    KeyStore(#[from] KeyStoreError),

    /// Crypto object failure
    #[error("Cipher failure: {0}")]
    Cipher(#[from] CipherError),
}

impl BiometricError {
    /// Whether this error must abort rather than be reported as "cannot authenticate"
    pub fn is_fatal(&self) -> bool {
        matches!(self, BiometricError::KeyGeneration(_))
    }
}
