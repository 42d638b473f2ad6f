use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in ShareVault.
#[derive(Debug, Error)]
pub enum ShareVaultError {
    // --- Validation errors ---
    #[error("Invalid secret name '{0}': {1}")]
    InvalidName(String, String),

    #[error("Invalid user id '{0}': {1}")]
    InvalidUserId(String, String),

    #[error("Invalid recipient set: {0}")]
    InvalidRecipientSet(String),

    // --- Secret errors ---
    #[error("Secret '{0}' not found")]
    SecretNotFound(String),

    #[error("Secret '{0}' already exists (use `update` to change its value)")]
    SecretAlreadyExists(String),

    #[error("Access denied: '{user}' cannot unlock secret '{secret}'")]
    AccessDenied { secret: String, user: String },

    // --- Crypto errors ---
    /// Raised by the envelope layer. Key resolution turns this into
    /// `AccessDenied` before it reaches a caller.
    #[error("Cryptographic operation failed: {0}")]
    CryptoFailure(String),

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Registry errors ---
    #[error("User '{0}' is not registered in this vault")]
    UserNotFound(String),

    #[error("User '{0}' is already registered")]
    UserAlreadyExists(String),

    // --- Vault errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Invalid vault at {0}: {1}")]
    InvalidVault(PathBuf, String),

    // --- Identity errors ---
    #[error("Identity error: {0}")]
    IdentityError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for ShareVault results.
pub type Result<T> = std::result::Result<T, ShareVaultError>;
