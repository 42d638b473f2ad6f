//! Directory-backed storage for a vault.
//!
//! `VaultStore` maps logical records onto files under the vault root:
//!
//! ```text
//! users/<userId>               public key of userId
//! secrets/<name>/<name>.raw    ciphertext of the secret
//! secrets/<name>/<userId>.enc  symmetric key wrapped for userId
//! ```
//!
//! The existence of a file *is* the state: a secret exists iff its
//! `.raw` file exists, and a user can read it iff their `.enc` file
//! exists.  Names passed in must already be validated (see `naming`).
//!
//! There is no locking.  Concurrent writers against the same secret
//! can interleave; only single files are replaced atomically.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, ShareVaultError};

const USERS_DIR: &str = "users";
const SECRETS_DIR: &str = "secrets";
const CIPHERTEXT_EXT: &str = "raw";
const WRAP_EXT: &str = "enc";

/// Handle to a vault root on disk.  Holds no cached state.
#[derive(Debug, Clone)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a new, empty vault at `root`.
    ///
    /// The root directory may already exist, but must not already hold
    /// a `users/` or `secrets/` subtree.
    pub fn init(root: &Path) -> Result<Self> {
        let store = Self {
            root: root.to_path_buf(),
        };
        if store.users_dir().exists() || store.secrets_dir().exists() {
            return Err(ShareVaultError::VaultAlreadyExists(root.to_path_buf()));
        }

        fs::create_dir_all(store.users_dir())?;
        fs::create_dir_all(store.secrets_dir())?;
        debug!(root = %root.display(), "initialized vault");
        Ok(store)
    }

    /// Open an existing vault, checking that both subtrees are present.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(ShareVaultError::VaultNotFound(root.to_path_buf()));
        }
        let store = Self {
            root: root.to_path_buf(),
        };
        for (dir, label) in [(store.users_dir(), USERS_DIR), (store.secrets_dir(), SECRETS_DIR)] {
            if !dir.is_dir() {
                return Err(ShareVaultError::InvalidVault(
                    root.to_path_buf(),
                    format!("missing `{label}/` directory"),
                ));
            }
        }
        Ok(store)
    }

    /// Returns `true` if `root` looks like a vault (both subtrees present).
    pub fn is_vault(root: &Path) -> bool {
        root.join(USERS_DIR).is_dir() && root.join(SECRETS_DIR).is_dir()
    }

    // ------------------------------------------------------------------
    // Path mapping
    // ------------------------------------------------------------------

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn users_dir(&self) -> PathBuf {
        self.root.join(USERS_DIR)
    }

    pub fn secrets_dir(&self) -> PathBuf {
        self.root.join(SECRETS_DIR)
    }

    pub fn user_path(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(user_id)
    }

    pub fn secret_dir(&self, name: &str) -> PathBuf {
        self.secrets_dir().join(name)
    }

    /// `secrets/<name>/<name>.raw`
    pub fn secret_ciphertext_path(&self, name: &str) -> PathBuf {
        self.secret_dir(name)
            .join(format!("{name}.{CIPHERTEXT_EXT}"))
    }

    /// `secrets/<name>/<userId>.enc`
    pub fn secret_wrap_path(&self, name: &str, user_id: &str) -> PathBuf {
        self.secret_dir(name).join(format!("{user_id}.{WRAP_EXT}"))
    }

    pub fn secret_exists(&self, name: &str) -> bool {
        self.exists(&self.secret_ciphertext_path(name))
    }

    // ------------------------------------------------------------------
    // Raw byte I/O
    // ------------------------------------------------------------------

    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    pub fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    /// Write `bytes` to `path`, creating parent directories as needed.
    ///
    /// Writes to a temp file in the same directory and renames it over
    /// the target so readers never see a half-written blob.
    pub fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let parent = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent)?;

        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));

        fs::write(&tmp_path, bytes)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Remove a single file.  Returns `false` if it was already gone.
    pub fn remove_file_if_exists(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove `secrets/<name>/` and everything in it.
    ///
    /// The directory is first renamed to a hidden sibling, so the secret
    /// disappears in one step even if the recursive removal is cut short.
    pub fn remove_secret_tree(&self, name: &str) -> Result<()> {
        let graveyard = self.secrets_dir().join(format!(".{name}.deleting"));
        if graveyard.exists() {
            fs::remove_dir_all(&graveyard)?;
        }
        fs::rename(self.secret_dir(name), &graveyard)?;
        fs::remove_dir_all(&graveyard)?;
        debug!(secret = name, "removed secret directory");
        Ok(())
    }

    /// Clear whatever is left in `secrets/<name>/` when it holds no
    /// ciphertext.  Returns `true` if stale files were removed.
    pub fn clear_stale_secret_dir(&self, name: &str) -> Result<bool> {
        if self.secret_exists(name) || !self.secret_dir(name).is_dir() {
            return Ok(false);
        }
        self.remove_secret_tree(name)?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Listings
    // ------------------------------------------------------------------

    /// Names of all secrets, sorted.
    ///
    /// A directory under `secrets/` without its ciphertext file is not a
    /// secret and is skipped.
    pub fn list_secret_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.secrets_dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if self.secret_exists(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// User ids holding a wrap entry for `name`, derived from `*.enc`
    /// filenames and sorted for stable display.
    pub fn list_wrap_user_ids(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.secret_dir(name);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut users = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(WRAP_EXT) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if !stem.starts_with('.') => users.push(stem.to_string()),
                _ => {}
            }
        }
        users.sort();
        Ok(users)
    }

    /// All registered user ids, sorted.
    pub fn list_user_ids(&self) -> Result<Vec<String>> {
        let mut users = Vec::new();
        for entry in fs::read_dir(self.users_dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(id) = entry.file_name().to_str() {
                if !id.starts_with('.') {
                    users.push(id.to_string());
                }
            }
        }
        users.sort();
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_store() -> (TempDir, VaultStore) {
        let dir = TempDir::new().unwrap();
        let store = VaultStore::init(&dir.path().join("vault")).unwrap();
        (dir, store)
    }

    #[test]
    fn paths_follow_layout() {
        let store = VaultStore {
            root: PathBuf::from("/v"),
        };
        assert_eq!(
            store.secret_ciphertext_path("db-pass"),
            PathBuf::from("/v/secrets/db-pass/db-pass.raw")
        );
        assert_eq!(
            store.secret_wrap_path("db-pass", "alice@example.com"),
            PathBuf::from("/v/secrets/db-pass/alice@example.com.enc")
        );
        assert_eq!(store.user_path("alice"), PathBuf::from("/v/users/alice"));
    }

    #[test]
    fn init_twice_fails() {
        let (dir, _store) = new_store();
        let result = VaultStore::init(&dir.path().join("vault"));
        assert!(matches!(result, Err(ShareVaultError::VaultAlreadyExists(_))));
    }

    #[test]
    fn open_requires_both_subtrees() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            VaultStore::open(&dir.path().join("missing")),
            Err(ShareVaultError::VaultNotFound(_))
        ));

        fs::create_dir_all(dir.path().join("users")).unwrap();
        assert!(matches!(
            VaultStore::open(dir.path()),
            Err(ShareVaultError::InvalidVault(..))
        ));

        fs::create_dir_all(dir.path().join("secrets")).unwrap();
        assert!(VaultStore::open(dir.path()).is_ok());
    }

    #[test]
    fn write_creates_parents_and_leaves_no_temp_file() {
        let (_dir, store) = new_store();
        let path = store.secret_wrap_path("s", "bob");
        store.write_bytes(&path, b"abc").unwrap();

        assert_eq!(store.read_bytes(&path).unwrap(), b"abc");
        let leftovers: Vec<_> = fs::read_dir(store.secret_dir("s"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn written_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = new_store();
        let path = store.secret_ciphertext_path("s");
        store.write_bytes(&path, b"x").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn secret_names_require_ciphertext() {
        let (_dir, store) = new_store();
        store
            .write_bytes(&store.secret_ciphertext_path("zeta"), b"z")
            .unwrap();
        store
            .write_bytes(&store.secret_ciphertext_path("alpha"), b"a")
            .unwrap();
        // Wrap without ciphertext: not a secret.
        store
            .write_bytes(&store.secret_wrap_path("orphan", "bob"), b"w")
            .unwrap();

        assert_eq!(store.list_secret_names().unwrap(), vec!["alpha", "zeta"]);
        assert!(!store.secret_exists("orphan"));
    }

    #[test]
    fn wrap_user_ids_come_from_enc_files() {
        let (_dir, store) = new_store();
        store
            .write_bytes(&store.secret_ciphertext_path("s"), b"c")
            .unwrap();
        store
            .write_bytes(&store.secret_wrap_path("s", "carol@x.io"), b"w")
            .unwrap();
        store
            .write_bytes(&store.secret_wrap_path("s", "bob"), b"w")
            .unwrap();

        assert_eq!(
            store.list_wrap_user_ids("s").unwrap(),
            vec!["bob", "carol@x.io"]
        );
        assert!(store.list_wrap_user_ids("nope").unwrap().is_empty());
    }

    #[test]
    fn remove_file_if_exists_is_idempotent() {
        let (_dir, store) = new_store();
        let path = store.secret_wrap_path("s", "bob");
        store.write_bytes(&path, b"w").unwrap();

        assert!(store.remove_file_if_exists(&path).unwrap());
        assert!(!store.remove_file_if_exists(&path).unwrap());
    }

    #[test]
    fn remove_secret_tree_removes_everything() {
        let (_dir, store) = new_store();
        store
            .write_bytes(&store.secret_ciphertext_path("s"), b"c")
            .unwrap();
        store
            .write_bytes(&store.secret_wrap_path("s", "bob"), b"w")
            .unwrap();

        store.remove_secret_tree("s").unwrap();
        assert!(!store.secret_dir("s").exists());
        assert_eq!(fs::read_dir(store.secrets_dir()).unwrap().count(), 0);
    }

    #[test]
    fn remove_secret_tree_replaces_interrupted_removal() {
        let (_dir, store) = new_store();
        let graveyard = store.secrets_dir().join(".s.deleting");
        fs::create_dir_all(&graveyard).unwrap();
        fs::write(graveyard.join("old.enc"), b"w").unwrap();
        store
            .write_bytes(&store.secret_ciphertext_path("s"), b"c")
            .unwrap();

        store.remove_secret_tree("s").unwrap();
        assert!(!graveyard.exists());
        assert!(store.list_secret_names().unwrap().is_empty());
    }

    #[test]
    fn clear_stale_secret_dir_only_touches_dirs_without_ciphertext() {
        let (_dir, store) = new_store();
        store
            .write_bytes(&store.secret_wrap_path("stale", "bob"), b"w")
            .unwrap();
        store
            .write_bytes(&store.secret_ciphertext_path("live"), b"c")
            .unwrap();

        assert!(store.clear_stale_secret_dir("stale").unwrap());
        assert!(!store.secret_dir("stale").exists());
        assert!(!store.clear_stale_secret_dir("live").unwrap());
        assert!(store.secret_exists("live"));
        assert!(!store.clear_stale_secret_dir("absent").unwrap());
    }
}
