//! User registry: user id -> public key.
//!
//! `AccessController` only needs lookups, so the registry sits behind
//! the `UserRegistry` trait.  `FsUserRegistry` is the default backend and
//! stores one base64 public key per file under `users/`.

use tracing::info;

use crate::crypto::PublicKey;
use crate::errors::{Result, ShareVaultError};
use crate::vault::naming::validate_user_id;
use crate::vault::store::VaultStore;

/// Lookup interface consumed by the access controller.
pub trait UserRegistry {
    /// Public key registered for `user_id`.
    fn public_key(&self, user_id: &str) -> Result<PublicKey>;

    /// Returns `true` if `user_id` is registered.  Malformed ids are
    /// never registered.
    fn contains(&self, user_id: &str) -> bool;

    /// Returns `true` if every id in `user_ids` is registered.
    fn users_exist(&self, user_ids: &[String]) -> bool {
        user_ids.iter().all(|id| self.contains(id))
    }

    /// Fail with `InvalidRecipientSet` naming every unknown id.
    fn ensure_known(&self, user_ids: &[String]) -> Result<()> {
        let unknown: Vec<&str> = user_ids
            .iter()
            .filter(|id| !self.contains(id))
            .map(String::as_str)
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ShareVaultError::InvalidRecipientSet(format!(
                "unknown user(s): {}",
                unknown.join(", ")
            )))
        }
    }
}

/// Registry backed by the vault's `users/` directory.
#[derive(Debug, Clone)]
pub struct FsUserRegistry {
    store: VaultStore,
}

impl FsUserRegistry {
    pub fn new(store: VaultStore) -> Self {
        Self { store }
    }

    /// Register a new user.  Users are immutable once added.
    pub fn add_user(&self, user_id: &str, public_key: &PublicKey) -> Result<()> {
        validate_user_id(user_id)?;
        public_key.ensure_usable()?;
        let path = self.store.user_path(user_id);
        if self.store.exists(&path) {
            return Err(ShareVaultError::UserAlreadyExists(user_id.to_string()));
        }

        self.store
            .write_bytes(&path, format!("{}\n", public_key.to_base64()).as_bytes())?;
        info!(user = user_id, "registered user");
        Ok(())
    }

    /// All registered user ids, sorted.
    pub fn list_users(&self) -> Result<Vec<String>> {
        self.store.list_user_ids()
    }
}

impl UserRegistry for FsUserRegistry {
    fn public_key(&self, user_id: &str) -> Result<PublicKey> {
        validate_user_id(user_id)?;
        let path = self.store.user_path(user_id);
        if !self.store.exists(&path) {
            return Err(ShareVaultError::UserNotFound(user_id.to_string()));
        }

        let raw = self.store.read_bytes(&path)?;
        let text = String::from_utf8(raw).map_err(|_| {
            ShareVaultError::InvalidKeyMaterial(format!("public key of '{user_id}' is not text"))
        })?;
        PublicKey::from_base64(&text).map_err(|e| {
            ShareVaultError::InvalidKeyMaterial(format!("public key of '{user_id}': {e}"))
        })
    }

    fn contains(&self, user_id: &str) -> bool {
        validate_user_id(user_id).is_ok() && self.store.exists(&self.store.user_path(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;
    use tempfile::TempDir;

    fn registry() -> (TempDir, FsUserRegistry) {
        let dir = TempDir::new().unwrap();
        let store = VaultStore::init(dir.path()).unwrap();
        (dir, FsUserRegistry::new(store))
    }

    #[test]
    fn add_and_lookup_user() {
        let (_dir, reg) = registry();
        let pk = PrivateKey::generate().public_key();
        reg.add_user("alice@example.com", &pk).unwrap();

        assert_eq!(reg.public_key("alice@example.com").unwrap(), pk);
        assert!(reg.contains("alice@example.com"));
        assert_eq!(reg.list_users().unwrap(), vec!["alice@example.com"]);
    }

    #[test]
    fn users_are_immutable() {
        let (_dir, reg) = registry();
        let pk = PrivateKey::generate().public_key();
        reg.add_user("alice", &pk).unwrap();

        let other = PrivateKey::generate().public_key();
        assert!(matches!(
            reg.add_user("alice", &other),
            Err(ShareVaultError::UserAlreadyExists(_))
        ));
        assert_eq!(reg.public_key("alice").unwrap(), pk);
    }

    #[test]
    fn low_order_key_not_registered() {
        let (_dir, reg) = registry();
        let zero = PublicKey::from_bytes([0u8; 32]);
        assert!(matches!(
            reg.add_user("eve", &zero),
            Err(ShareVaultError::InvalidKeyMaterial(_))
        ));
        assert!(!reg.contains("eve"));
    }

    #[test]
    fn unknown_user_lookup_fails() {
        let (_dir, reg) = registry();
        assert!(matches!(
            reg.public_key("ghost"),
            Err(ShareVaultError::UserNotFound(_))
        ));
    }

    #[test]
    fn ensure_known_lists_all_unknown_ids() {
        let (_dir, reg) = registry();
        reg.add_user("alice", &PrivateKey::generate().public_key())
            .unwrap();

        let ids = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];
        assert!(!reg.users_exist(&ids));
        let msg = reg.ensure_known(&ids).unwrap_err().to_string();
        assert!(msg.contains("bob") && msg.contains("carol"), "{msg}");
        assert!(!msg.contains("alice"), "{msg}");

        assert!(reg.ensure_known(&["alice".to_string()]).is_ok());
    }

    #[test]
    fn traversal_ids_are_never_known() {
        let (_dir, reg) = registry();
        assert!(!reg.contains("../secrets"));
        assert!(!reg.contains(".."));
    }

    #[test]
    fn corrupt_key_file_is_reported() {
        let (_dir, reg) = registry();
        std::fs::write(reg.store.user_path("mallory"), "not base64 at all!").unwrap();
        assert!(matches!(
            reg.public_key("mallory"),
            Err(ShareVaultError::InvalidKeyMaterial(_))
        ));
    }
}
