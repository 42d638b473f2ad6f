//! Per-secret symmetric keys and HKDF-SHA256 key-encryption keys.
//!
//! A `SymmetricKey` is generated fresh on every create and update and
//! never touches the disk in cleartext.  When it is wrapped for a
//! recipient, the key-encryption key is derived from an X25519 shared
//! secret with HKDF (RFC 5869).

use std::fmt;

use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::encryption;
use crate::errors::{Result, ShareVaultError};

/// Length of symmetric keys (256 bits).
pub const KEY_LEN: usize = 32;

/// HKDF `info` string binding derived keys to the wrap format version.
const WRAP_INFO: &[u8] = b"sharevault-wrap-v1";

/// The symmetric key protecting one secret's payload.
///
/// Memory is zeroed when the key is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_LEN],
}

impl SymmetricKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Rebuild a key from raw bytes (e.g. after unwrapping).
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Encrypt a payload under this key.
    pub fn encrypt(&self, payload: &[u8]) -> Result<Vec<u8>> {
        encryption::encrypt(&self.bytes, payload)
    }

    /// Decrypt a blob produced by [`SymmetricKey::encrypt`].
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>> {
        encryption::decrypt(&self.bytes, blob)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Derive the key-encryption key for one wrap entry.
///
/// `salt` binds the derived key to both public keys involved in the
/// exchange (ephemeral || recipient).
pub fn derive_wrapping_key(shared_secret: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), shared_secret);

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(WRAP_INFO, okm.as_mut())
        .map_err(|e| ShareVaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}
