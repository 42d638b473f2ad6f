//! Identity files: a user's private key at rest.
//!
//! An identity file is a small JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "user_id": "alice@example.com",
//!   "created_at": "2026-01-01T00:00:00Z",
//!   "public_key": "<base64>",
//!   "protection": { "kind": "none" },
//!   "private_key": "<base64>"
//! }
//! ```
//!
//! With `"kind": "argon2id"` the private key is sealed with AES-256-GCM
//! under a key derived from a passphrase; the salt and Argon2 params are
//! stored alongside so loading uses the same settings.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::Identity;
use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::envelope::X25519_KEY_LEN;
use crate::crypto::kdf::{derive_passphrase_key, generate_salt, Argon2Params};
use crate::crypto::{PrivateKey, PublicKey};
use crate::errors::{Result, ShareVaultError};

/// Current identity file version.
const CURRENT_VERSION: u8 = 1;

/// How the private key in an identity file is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Protection {
    /// Raw key bytes.
    None,
    /// Sealed under an Argon2id-derived key.
    Argon2id {
        #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
        salt: Vec<u8>,
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    },
}

/// On-disk form of an identity.
#[derive(Clone, Serialize, Deserialize)]
pub struct IdentityFile {
    pub version: u8,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub public_key: String,
    pub protection: Protection,
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub private_key: Vec<u8>,
}

impl IdentityFile {
    pub fn is_protected(&self) -> bool {
        matches!(self.protection, Protection::Argon2id { .. })
    }

    /// Read and parse an identity file without unlocking it.
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ShareVaultError::IdentityError(format!("cannot read {}: {e}", path.display()))
        })?;
        let file: IdentityFile = serde_json::from_str(&contents).map_err(|e| {
            ShareVaultError::IdentityError(format!("invalid identity file {}: {e}", path.display()))
        })?;

        if file.version != CURRENT_VERSION {
            return Err(ShareVaultError::IdentityError(format!(
                "unsupported identity file version {}, expected {CURRENT_VERSION}",
                file.version
            )));
        }
        Ok(file)
    }
}

/// Write `identity` to `path`.
///
/// Pass a passphrase to seal the private key; `None` stores it raw.
/// Refuses to overwrite an existing file.
pub fn save_identity(
    path: &Path,
    identity: &Identity,
    passphrase: Option<&[u8]>,
    argon2_params: &Argon2Params,
) -> Result<()> {
    if path.exists() {
        return Err(ShareVaultError::IdentityError(format!(
            "identity file already exists at {}",
            path.display()
        )));
    }

    let key_bytes = identity.private_key().to_bytes();
    let (protection, private_key) = match passphrase {
        Some(pw) => {
            let salt = generate_salt();
            let wrapping = derive_passphrase_key(pw, &salt, argon2_params)?;
            let sealed = encrypt(wrapping.as_ref(), &key_bytes[..])?;
            let protection = Protection::Argon2id {
                salt: salt.to_vec(),
                memory_kib: argon2_params.memory_kib,
                iterations: argon2_params.iterations,
                parallelism: argon2_params.parallelism,
            };
            (protection, sealed)
        }
        None => (Protection::None, key_bytes.to_vec()),
    };

    let file = IdentityFile {
        version: CURRENT_VERSION,
        user_id: identity.user_id().to_string(),
        created_at: Utc::now(),
        public_key: identity.public_key().to_base64(),
        protection,
        private_key,
    };
    let json = Zeroizing::new(
        serde_json::to_string_pretty(&file)
            .map_err(|e| ShareVaultError::SerializationError(format!("identity: {e}")))?,
    );

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, json.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    debug!(path = %path.display(), protected = passphrase.is_some(), "wrote identity file");
    Ok(())
}

/// Load and unlock the identity at `path`.
///
/// `passphrase` is only called when the file is protected.
pub fn load_identity<F>(path: &Path, passphrase: F) -> Result<Identity>
where
    F: FnOnce() -> Result<Zeroizing<String>>,
{
    let file = IdentityFile::read(path)?;

    let key_bytes: Zeroizing<Vec<u8>> = match &file.protection {
        Protection::None => Zeroizing::new(file.private_key.clone()),
        Protection::Argon2id {
            salt,
            memory_kib,
            iterations,
            parallelism,
        } => {
            let pw = passphrase()?;
            let params = Argon2Params {
                memory_kib: *memory_kib,
                iterations: *iterations,
                parallelism: *parallelism,
            };
            let wrapping = derive_passphrase_key(pw.as_bytes(), salt, &params)?;
            Zeroizing::new(decrypt(wrapping.as_ref(), &file.private_key).map_err(|_| {
                ShareVaultError::IdentityError(
                    "wrong passphrase or corrupted identity file".into(),
                )
            })?)
        }
    };

    let bytes: [u8; X25519_KEY_LEN] = key_bytes.as_slice().try_into().map_err(|_| {
        ShareVaultError::IdentityError(format!(
            "private key must be {X25519_KEY_LEN} bytes, got {}",
            key_bytes.len()
        ))
    })?;
    let private_key = PrivateKey::from_bytes(bytes);

    let stored_public = PublicKey::from_base64(&file.public_key)?;
    if private_key.public_key() != stored_public {
        return Err(ShareVaultError::IdentityError(format!(
            "private key in {} does not match its public key",
            path.display()
        )));
    }

    Identity::new(&file.user_id, private_key)
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
