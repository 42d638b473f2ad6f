//! Integration tests for the ShareVault vault layout and user registry.

use std::fs;

use sharevault::crypto::PrivateKey;
use sharevault::errors::ShareVaultError;
use sharevault::vault::{FsUserRegistry, UserRegistry, VaultStore};
use tempfile::TempDir;

/// Helper: a fresh vault root inside a temp dir.
fn new_vault() -> (TempDir, VaultStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = VaultStore::init(&dir.path().join("vault")).expect("init vault");
    (dir, store)
}

// ---------------------------------------------------------------------------
// init / open
// ---------------------------------------------------------------------------

#[test]
fn init_then_open() {
    let (dir, store) = new_vault();

    assert!(store.users_dir().is_dir());
    assert!(store.secrets_dir().is_dir());
    assert!(VaultStore::is_vault(store.root()));

    let reopened = VaultStore::open(&dir.path().join("vault")).unwrap();
    assert_eq!(reopened.root(), store.root());
}

#[test]
fn init_twice_fails() {
    let (_dir, store) = new_vault();
    let err = VaultStore::init(store.root()).unwrap_err();
    assert!(matches!(err, ShareVaultError::VaultAlreadyExists(_)));
}

#[test]
fn open_missing_vault_fails() {
    let dir = TempDir::new().unwrap();
    let err = VaultStore::open(&dir.path().join("nowhere")).unwrap_err();
    assert!(matches!(err, ShareVaultError::VaultNotFound(_)));
}

#[test]
fn open_incomplete_vault_fails() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("users")).unwrap();

    let err = VaultStore::open(dir.path()).unwrap_err();
    assert!(matches!(err, ShareVaultError::InvalidVault(..)));
}

// ---------------------------------------------------------------------------
// Layout and byte I/O
// ---------------------------------------------------------------------------

#[test]
fn secret_paths_follow_layout() {
    let (_dir, store) = new_vault();

    assert_eq!(
        store.secret_ciphertext_path("db-pass"),
        store.root().join("secrets/db-pass/db-pass.raw")
    );
    assert_eq!(
        store.secret_wrap_path("db-pass", "alice"),
        store.root().join("secrets/db-pass/alice.enc")
    );
    assert_eq!(store.user_path("alice"), store.root().join("users/alice"));
}

#[test]
fn write_bytes_replaces_atomically() {
    let (_dir, store) = new_vault();
    let path = store.secret_ciphertext_path("s");

    store.write_bytes(&path, b"first").unwrap();
    store.write_bytes(&path, b"second").unwrap();

    assert_eq!(store.read_bytes(&path).unwrap(), b"second");
    // No temp files left next to the target.
    let leftovers: Vec<_> = fs::read_dir(store.secret_dir("s"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n.to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[cfg(unix)]
#[test]
fn written_files_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, store) = new_vault();
    let path = store.secret_wrap_path("s", "alice");
    store.write_bytes(&path, b"wrap").unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn remove_file_reports_whether_it_existed() {
    let (_dir, store) = new_vault();
    let path = store.secret_wrap_path("s", "alice");
    store.write_bytes(&path, b"wrap").unwrap();

    assert!(store.remove_file_if_exists(&path).unwrap());
    assert!(!store.remove_file_if_exists(&path).unwrap());
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[test]
fn listings_are_sorted_and_skip_strays() {
    let (_dir, store) = new_vault();
    for name in ["zeta", "alpha"] {
        store
            .write_bytes(&store.secret_ciphertext_path(name), b"ct")
            .unwrap();
    }
    // A directory without its ciphertext is not a secret.
    fs::create_dir_all(store.secret_dir("orphan")).unwrap();

    store
        .write_bytes(&store.secret_wrap_path("zeta", "carol"), b"w")
        .unwrap();
    store
        .write_bytes(&store.secret_wrap_path("zeta", "bob"), b"w")
        .unwrap();

    assert_eq!(store.list_secret_names().unwrap(), vec!["alpha", "zeta"]);
    assert_eq!(store.list_wrap_user_ids("zeta").unwrap(), vec!["bob", "carol"]);
    assert!(store.list_wrap_user_ids("alpha").unwrap().is_empty());
    assert!(store.list_wrap_user_ids("missing").unwrap().is_empty());
}

#[test]
fn remove_secret_tree_deletes_everything() {
    let (_dir, store) = new_vault();
    store
        .write_bytes(&store.secret_ciphertext_path("s"), b"ct")
        .unwrap();
    store
        .write_bytes(&store.secret_wrap_path("s", "alice"), b"w")
        .unwrap();

    store.remove_secret_tree("s").unwrap();
    assert!(!store.secret_dir("s").exists());
    assert!(!store.secret_exists("s"));
}

// ---------------------------------------------------------------------------
// User registry
// ---------------------------------------------------------------------------

#[test]
fn registry_add_and_lookup() {
    let (_dir, store) = new_vault();
    let registry = FsUserRegistry::new(store.clone());
    let pk = PrivateKey::generate().public_key();

    registry.add_user("alice@example.com", &pk).unwrap();

    assert!(registry.contains("alice@example.com"));
    assert_eq!(registry.public_key("alice@example.com").unwrap(), pk);

    // Stored as a single base64 line.
    let text = fs::read_to_string(store.user_path("alice@example.com")).unwrap();
    assert_eq!(text.trim_end(), pk.to_base64());
}

#[test]
fn registry_users_are_immutable() {
    let (_dir, store) = new_vault();
    let registry = FsUserRegistry::new(store);
    let pk = PrivateKey::generate().public_key();

    registry.add_user("bob", &pk).unwrap();
    let err = registry
        .add_user("bob", &PrivateKey::generate().public_key())
        .unwrap_err();
    assert!(matches!(err, ShareVaultError::UserAlreadyExists(_)));
    assert_eq!(registry.public_key("bob").unwrap(), pk);
}

#[test]
fn registry_unknown_and_malformed_users() {
    let (_dir, store) = new_vault();
    let registry = FsUserRegistry::new(store);

    assert!(matches!(
        registry.public_key("ghost").unwrap_err(),
        ShareVaultError::UserNotFound(_)
    ));
    assert!(registry
        .add_user("../escape", &PrivateKey::generate().public_key())
        .is_err());
    assert!(!registry.contains("../escape"));
}

#[test]
fn registry_rejects_corrupt_key_file() {
    let (_dir, store) = new_vault();
    fs::write(store.user_path("eve"), "not a key").unwrap();
    let registry = FsUserRegistry::new(store);

    assert!(matches!(
        registry.public_key("eve").unwrap_err(),
        ShareVaultError::InvalidKeyMaterial(_)
    ));
}

#[test]
fn registry_lists_users_sorted() {
    let (_dir, store) = new_vault();
    let registry = FsUserRegistry::new(store);
    for id in ["carol", "alice", "bob"] {
        registry
            .add_user(id, &PrivateKey::generate().public_key())
            .unwrap();
    }

    assert_eq!(registry.list_users().unwrap(), vec!["alice", "bob", "carol"]);
    assert!(registry.users_exist(&["alice".to_string(), "bob".to_string()]));
    assert!(!registry.users_exist(&["alice".to_string(), "dave".to_string()]));
}
