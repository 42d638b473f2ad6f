//! Vault module: envelope-encrypted secret storage shared between users.
//!
//! This module provides:
//! - Name rules for secrets and user ids (`naming`)
//! - Directory-backed record storage (`store`)
//! - The user registry trait and its file-system backend (`registry`)
//! - The JSON payload codec for typed values (`payload`)
//! - `AccessController`, which implements the vault operations (`access`)

pub mod access;
pub mod naming;
pub mod payload;
pub mod registry;
pub mod store;

// Re-export the most commonly used items.
pub use access::AccessController;
pub use registry::{FsUserRegistry, UserRegistry};
pub use store::VaultStore;
