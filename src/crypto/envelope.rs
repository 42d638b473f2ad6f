//! Per-recipient key wrapping over X25519.
//!
//! A wrap entry is an ECIES-style box: a fresh ephemeral X25519 secret
//! is combined with the recipient's public key, the shared secret is
//! stretched through HKDF-SHA256 into a key-encryption key, and the
//! secret's symmetric key is sealed with AES-256-GCM under it.
//!
//! Layout of a wrap blob:
//!
//! ```text
//! [version: 1][ephemeral public key: 32][nonce: 12][sealed key: 32][tag: 16]
//! ```

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use x25519_dalek::StaticSecret;
use zeroize::Zeroizing;

use crate::crypto::encryption::{self, NONCE_LEN, TAG_LEN};
use crate::crypto::keys::{derive_wrapping_key, SymmetricKey, KEY_LEN};
use crate::errors::{Result, ShareVaultError};

/// Length of an X25519 public or private key.
pub const X25519_KEY_LEN: usize = 32;

/// Current wrap format version.
const WRAP_VERSION: u8 = 1;

/// Total length of a wrap blob.
pub const WRAPPED_KEY_LEN: usize = 1 + X25519_KEY_LEN + NONCE_LEN + KEY_LEN + TAG_LEN;

/// A recipient's X25519 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey([u8; X25519_KEY_LEN]);

impl PublicKey {
    pub const fn from_bytes(bytes: [u8; X25519_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; X25519_KEY_LEN] {
        &self.0
    }

    /// Parse a base64-encoded public key (surrounding whitespace ignored).
    pub fn from_base64(text: &str) -> Result<Self> {
        let raw = BASE64
            .decode(text.trim())
            .map_err(|e| ShareVaultError::InvalidKeyMaterial(format!("public key: {e}")))?;
        let bytes: [u8; X25519_KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
            ShareVaultError::InvalidKeyMaterial(format!(
                "public key must be {X25519_KEY_LEN} bytes, got {}",
                raw.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    /// Reject low-order points, which no key exchange can use.
    pub fn ensure_usable(&self) -> Result<()> {
        let throwaway = PrivateKey::generate();
        if !throwaway.0.diffie_hellman(&self.to_dalek()).was_contributory() {
            return Err(ShareVaultError::InvalidKeyMaterial(
                "public key is a low-order point".into(),
            ));
        }
        Ok(())
    }

    fn to_dalek(self) -> x25519_dalek::PublicKey {
        x25519_dalek::PublicKey::from(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// An X25519 private key.  Zeroized on drop by `x25519-dalek`.
#[derive(Clone)]
pub struct PrivateKey(StaticSecret);

impl PrivateKey {
    /// Generate a new random private key.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0u8; X25519_KEY_LEN]);
        rand::rng().fill_bytes(bytes.as_mut());
        Self(StaticSecret::from(*bytes))
    }

    pub fn from_bytes(bytes: [u8; X25519_KEY_LEN]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Raw key bytes, wiped when the returned value is dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; X25519_KEY_LEN]> {
        Zeroizing::new(self.0.to_bytes())
    }

    pub fn from_base64(text: &str) -> Result<Self> {
        let raw = Zeroizing::new(
            BASE64
                .decode(text.trim())
                .map_err(|e| ShareVaultError::InvalidKeyMaterial(format!("private key: {e}")))?,
        );
        let bytes: [u8; X25519_KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
            ShareVaultError::InvalidKeyMaterial(format!(
                "private key must be {X25519_KEY_LEN} bytes, got {}",
                raw.len()
            ))
        })?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn to_base64(&self) -> Zeroizing<String> {
        let bytes = self.to_bytes();
        Zeroizing::new(BASE64.encode(&bytes[..]))
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(*x25519_dalek::PublicKey::from(&self.0).as_bytes())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(public={})", self.public_key())
    }
}

/// Wrap `key` so only the holder of `recipient`'s private key can recover it.
///
/// Every call uses a new ephemeral key, so wrapping the same key twice
/// produces different blobs.
pub fn wrap_key(key: &SymmetricKey, recipient: &PublicKey) -> Result<Vec<u8>> {
    let ephemeral = PrivateKey::generate();
    let ephemeral_public = ephemeral.public_key();

    let shared = ephemeral.0.diffie_hellman(&recipient.to_dalek());
    if !shared.was_contributory() {
        return Err(ShareVaultError::CryptoFailure(
            "recipient public key is a low-order point".into(),
        ));
    }

    let salt = wrap_salt(&ephemeral_public, recipient);
    let kek = derive_wrapping_key(shared.as_bytes(), &salt)?;
    let sealed = encryption::encrypt(kek.as_ref(), key.as_bytes())?;

    let mut output = Vec::with_capacity(WRAPPED_KEY_LEN);
    output.push(WRAP_VERSION);
    output.extend_from_slice(ephemeral_public.as_bytes());
    output.extend_from_slice(&sealed);
    Ok(output)
}

/// Recover the symmetric key from a wrap blob using the recipient's private key.
pub fn unwrap_key(blob: &[u8], recipient: &PrivateKey) -> Result<SymmetricKey> {
    if blob.len() != WRAPPED_KEY_LEN {
        return Err(ShareVaultError::CryptoFailure(format!(
            "wrapped key must be {WRAPPED_KEY_LEN} bytes, got {}",
            blob.len()
        )));
    }
    if blob[0] != WRAP_VERSION {
        return Err(ShareVaultError::CryptoFailure(format!(
            "unsupported wrap version {}",
            blob[0]
        )));
    }

    let (ephemeral_bytes, sealed) = blob[1..].split_at(X25519_KEY_LEN);
    let ephemeral_public = PublicKey(
        ephemeral_bytes
            .try_into()
            .map_err(|_| ShareVaultError::CryptoFailure("bad ephemeral key".into()))?,
    );

    let shared = recipient.0.diffie_hellman(&ephemeral_public.to_dalek());
    if !shared.was_contributory() {
        return Err(ShareVaultError::CryptoFailure(
            "ephemeral public key is a low-order point".into(),
        ));
    }

    let salt = wrap_salt(&ephemeral_public, &recipient.public_key());
    let kek = derive_wrapping_key(shared.as_bytes(), &salt)?;
    let key_bytes = Zeroizing::new(encryption::decrypt(kek.as_ref(), sealed)?);

    let bytes: [u8; KEY_LEN] = key_bytes
        .as_slice()
        .try_into()
        .map_err(|_| ShareVaultError::CryptoFailure("unwrapped key has wrong length".into()))?;
    Ok(SymmetricKey::from_bytes(bytes))
}

fn wrap_salt(ephemeral: &PublicKey, recipient: &PublicKey) -> [u8; 2 * X25519_KEY_LEN] {
    let mut salt = [0u8; 2 * X25519_KEY_LEN];
    salt[..X25519_KEY_LEN].copy_from_slice(ephemeral.as_bytes());
    salt[X25519_KEY_LEN..].copy_from_slice(recipient.as_bytes());
    salt
}
