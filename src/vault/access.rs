//! Access control over envelope-encrypted secrets.
//!
//! `AccessController` implements the public vault operations.  Each
//! secret's payload is encrypted once under its own symmetric key, and
//! that key is wrapped separately for every recipient:
//!
//! - `create` generates the key and writes the ciphertext plus one wrap
//!   per recipient.
//! - `update` always rotates: a new key, a new ciphertext, and fresh
//!   wraps for exactly the current recipient set.
//! - `share` recovers the current key through the caller's own wrap and
//!   wraps it for the new recipients.
//! - `unshare` deletes wraps without rotating, so a removed user who kept
//!   the old key can still read the current value until the next update.
//!
//! All preconditions are checked before anything is written.  Every
//! failure to recover a key, whatever the cause, is reported as the same
//! `AccessDenied` error.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto::{unwrap_key, wrap_key, PublicKey, SymmetricKey};
use crate::errors::{Result, ShareVaultError};
use crate::identity::Identity;
use crate::vault::naming::{validate_secret_name, validate_user_id};
use crate::vault::payload;
use crate::vault::registry::{FsUserRegistry, UserRegistry};
use crate::vault::store::VaultStore;

/// Entry point for all secret operations on one vault.
pub struct AccessController<R = FsUserRegistry> {
    store: VaultStore,
    registry: R,
}

impl AccessController<FsUserRegistry> {
    /// Open the vault at `root` with its file-system user registry.
    pub fn open(root: &Path) -> Result<Self> {
        let store = VaultStore::open(root)?;
        let registry = FsUserRegistry::new(store.clone());
        Ok(Self { store, registry })
    }
}

impl<R: UserRegistry> AccessController<R> {
    /// Use a custom registry backend.
    pub fn with_registry(store: VaultStore, registry: R) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    /// Create a new secret readable by `recipients`.
    pub fn create<S: AsRef<str>>(&self, name: &str, payload: &[u8], recipients: &[S]) -> Result<()> {
        validate_secret_name(name)?;
        if recipients.is_empty() {
            return Err(ShareVaultError::InvalidRecipientSet(format!(
                "secret '{name}' needs at least one recipient"
            )));
        }
        let targets = self.resolve_recipients(recipients)?;
        if self.store.secret_exists(name) {
            return Err(ShareVaultError::SecretAlreadyExists(name.to_string()));
        }

        let key = SymmetricKey::generate();
        let ciphertext = key.encrypt(payload)?;
        let wraps = wrap_for_all(&key, &targets)?;

        // Wraps left behind by an interrupted delete must not join the new
        // recipient set.
        if self.store.clear_stale_secret_dir(name)? {
            warn!(secret = name, "removed stale files from a previous secret");
        }
        self.store
            .write_bytes(&self.store.secret_ciphertext_path(name), &ciphertext)?;
        self.write_wraps(name, &wraps)?;

        info!(secret = name, recipients = wraps.len(), "created secret");
        Ok(())
    }

    /// Decrypt a secret with the caller's key.
    pub fn read(&self, name: &str, caller: &Identity) -> Result<Zeroizing<Vec<u8>>> {
        self.require_secret(name)?;
        let key = self.resolve_key(name, caller)?;

        let ciphertext = self
            .store
            .read_bytes(&self.store.secret_ciphertext_path(name))?;
        let plaintext = key.decrypt(&ciphertext).map_err(|_| {
            debug!(secret = name, "ciphertext did not decrypt with recovered key");
            access_denied(name, caller)
        })?;

        debug!(secret = name, user = caller.user_id(), "read secret");
        Ok(Zeroizing::new(plaintext))
    }

    /// Replace a secret's value under a freshly generated key.
    ///
    /// Does not check that `caller` could read the old value.  The wraps
    /// are rewritten for the users who currently hold one; a wrap whose
    /// owner is no longer registered is removed.
    pub fn update(&self, name: &str, payload: &[u8], caller: &Identity) -> Result<()> {
        self.require_secret(name)?;

        let mut targets = Vec::new();
        let mut dropped = Vec::new();
        for user in self.store.list_wrap_user_ids(name)? {
            match self.registry.public_key(&user) {
                Ok(pk) => targets.push((user, pk)),
                Err(ShareVaultError::UserNotFound(_) | ShareVaultError::InvalidUserId(..)) => {
                    warn!(secret = name, user = %user, "dropping wrap for unregistered user");
                    dropped.push(user);
                }
                Err(e) => return Err(e),
            }
        }

        let key = SymmetricKey::generate();
        let ciphertext = key.encrypt(payload)?;
        let wraps = wrap_for_all(&key, &targets)?;

        self.store
            .write_bytes(&self.store.secret_ciphertext_path(name), &ciphertext)?;
        self.write_wraps(name, &wraps)?;
        for user in &dropped {
            self.store
                .remove_file_if_exists(&self.store.secret_wrap_path(name, user))?;
        }

        if wraps.is_empty() {
            warn!(secret = name, "secret updated with no recipients; nobody can read it");
        }
        info!(
            secret = name,
            by = caller.user_id(),
            recipients = wraps.len(),
            "updated secret and rotated its key"
        );
        Ok(())
    }

    /// Remove a secret with its ciphertext and every wrap.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.require_secret(name)?;
        self.store.remove_secret_tree(name)?;
        info!(secret = name, "deleted secret");
        Ok(())
    }

    /// Every secret with the sorted ids of the users holding a wrap.
    ///
    /// Metadata only; no access check.
    pub fn list(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let mut listing = BTreeMap::new();
        for name in self.store.list_secret_names()? {
            let users = self.store.list_wrap_user_ids(&name)?;
            listing.insert(name, users);
        }
        Ok(listing)
    }

    /// Sorted ids of the users holding a wrap for `name`.
    pub fn recipients(&self, name: &str) -> Result<Vec<String>> {
        self.require_secret(name)?;
        self.store.list_wrap_user_ids(name)
    }

    /// Grant `recipients` access to the current value.
    ///
    /// The key is recovered through the caller's own wrap.  Ciphertext
    /// and other users' wraps are left alone.
    pub fn share<S: AsRef<str>>(&self, name: &str, recipients: &[S], caller: &Identity) -> Result<()> {
        self.require_secret(name)?;
        let targets = self.resolve_recipients(recipients)?;

        let key = self.resolve_key(name, caller)?;
        let wraps = wrap_for_all(&key, &targets)?;
        self.write_wraps(name, &wraps)?;

        info!(
            secret = name,
            by = caller.user_id(),
            added = wraps.len(),
            "shared secret"
        );
        Ok(())
    }

    /// Revoke `recipients`' wraps.  Missing wraps are ignored and the key
    /// is not rotated.
    pub fn unshare<S: AsRef<str>>(&self, name: &str, recipients: &[S]) -> Result<()> {
        self.require_secret(name)?;
        let users = dedup(recipients);
        self.registry.ensure_known(&users)?;

        let mut removed = 0;
        for user in &users {
            if self
                .store
                .remove_file_if_exists(&self.store.secret_wrap_path(name, user))?
            {
                removed += 1;
            }
        }

        info!(secret = name, removed, "unshared secret");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Typed helpers
    // ------------------------------------------------------------------

    /// `create` for any serializable value.
    pub fn create_value<T, S>(&self, name: &str, value: &T, recipients: &[S]) -> Result<()>
    where
        T: Serialize + ?Sized,
        S: AsRef<str>,
    {
        let bytes = payload::serialize(value)?;
        self.create(name, &bytes, recipients)
    }

    /// `read` into any deserializable type.
    pub fn read_value<T: DeserializeOwned>(&self, name: &str, caller: &Identity) -> Result<T> {
        let bytes = self.read(name, caller)?;
        payload::deserialize(&bytes)
    }

    /// `update` with any serializable value.
    pub fn update_value<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
        caller: &Identity,
    ) -> Result<()> {
        let bytes = payload::serialize(value)?;
        self.update(name, &bytes, caller)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require_secret(&self, name: &str) -> Result<()> {
        validate_secret_name(name)?;
        if !self.store.secret_exists(name) {
            return Err(ShareVaultError::SecretNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Deduplicate, check every id is registered, then look up keys.
    fn resolve_recipients<S: AsRef<str>>(&self, recipients: &[S]) -> Result<Vec<(String, PublicKey)>> {
        let users = dedup(recipients);
        self.registry.ensure_known(&users)?;

        users
            .into_iter()
            .map(|user| {
                let pk = self.registry.public_key(&user)?;
                Ok((user, pk))
            })
            .collect()
    }

    /// Recover the secret's key through the caller's wrap entry.
    ///
    /// A missing wrap, an unreadable wrap and a wrap that does not open
    /// with the caller's key all produce the same `AccessDenied`.
    fn resolve_key(&self, name: &str, caller: &Identity) -> Result<SymmetricKey> {
        if validate_user_id(caller.user_id()).is_err() {
            return Err(access_denied(name, caller));
        }

        let path = self.store.secret_wrap_path(name, caller.user_id());
        let key = self
            .store
            .read_bytes(&path)
            .and_then(|blob| unwrap_key(&blob, caller.private_key()));

        key.map_err(|_| {
            debug!(secret = name, user = caller.user_id(), "key resolution failed");
            access_denied(name, caller)
        })
    }

    fn write_wraps(&self, name: &str, wraps: &[(String, Vec<u8>)]) -> Result<()> {
        for (user, blob) in wraps {
            self.store
                .write_bytes(&self.store.secret_wrap_path(name, user), blob)?;
        }
        Ok(())
    }
}

/// Wrap `key` for every target before anything is written.
fn wrap_for_all(key: &SymmetricKey, targets: &[(String, PublicKey)]) -> Result<Vec<(String, Vec<u8>)>> {
    targets
        .iter()
        .map(|(user, pk)| Ok((user.clone(), wrap_key(key, pk)?)))
        .collect()
}

fn dedup<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    ids.iter()
        .map(|id| id.as_ref().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn access_denied(name: &str, caller: &Identity) -> ShareVaultError {
    ShareVaultError::AccessDenied {
        secret: name.to_string(),
        user: caller.user_id().to_string(),
    }
}
