//! Locating the vault for a working directory.
//!
//! Starting at a directory, each ancestor is checked in turn: its
//! `.sharevault.toml` (if any) names the vault directory, and the first
//! ancestor whose vault directory holds a valid vault wins.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::Settings;
use crate::errors::{Result, ShareVaultError};
use crate::vault::VaultStore;

/// A vault found by [`discover_vault`].
#[derive(Debug, Clone)]
pub struct DiscoveredVault {
    /// Directory holding the vault directory (and `.sharevault.toml`).
    pub project_dir: PathBuf,
    /// The vault root itself.
    pub vault_root: PathBuf,
    /// Settings loaded from `project_dir`.
    pub settings: Settings,
}

/// Walk up from `start` looking for a vault.
pub fn discover_vault(start: &Path) -> Result<DiscoveredVault> {
    for dir in start.ancestors() {
        let settings = Settings::load(dir)?;
        let vault_root = settings.vault_root(dir);
        if VaultStore::is_vault(&vault_root) {
            debug!(vault = %vault_root.display(), "discovered vault");
            return Ok(DiscoveredVault {
                project_dir: dir.to_path_buf(),
                vault_root,
                settings,
            });
        }
    }

    Err(ShareVaultError::VaultNotFound(
        Settings::default().vault_root(start),
    ))
}
