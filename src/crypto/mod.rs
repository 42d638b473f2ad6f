//! Cryptographic building blocks for ShareVault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Per-secret symmetric keys and HKDF key-encryption keys (`keys`)
//! - X25519 key pairs and per-recipient key wrapping (`envelope`)
//! - Argon2id passphrase key derivation for identity files (`kdf`)

pub mod encryption;
pub mod envelope;
pub mod kdf;
pub mod keys;

pub use encryption::{decrypt, encrypt};
pub use envelope::{unwrap_key, wrap_key, PrivateKey, PublicKey};
pub use kdf::{derive_passphrase_key, generate_salt, Argon2Params};
pub use keys::SymmetricKey;
