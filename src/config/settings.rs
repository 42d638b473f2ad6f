use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{Result, ShareVaultError};

/// Project-level configuration, loaded from `.sharevault.toml`.
///
/// Every field has a sensible default so ShareVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the vault.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// Identity file to use when none is given on the command line or in
    /// the environment.  Relative paths are resolved against the project.
    #[serde(default)]
    pub identity: Option<String>,

    /// Argon2 memory cost in KiB for newly protected identities (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    ".sharevault".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            identity: None,
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".sharevault.toml";

    /// Load settings from `<project_dir>/.sharevault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            ShareVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Build the vault root for a project.
    ///
    /// Example: `project_dir/.sharevault`
    pub fn vault_root(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir)
    }

    /// The configured identity file, resolved against `project_dir`.
    pub fn identity_path(&self, project_dir: &Path) -> Option<PathBuf> {
        self.identity.as_ref().map(|p| project_dir.join(p))
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault_dir, ".sharevault");
        assert!(s.identity.is_none());
        assert_eq!(s.argon2_params(), Argon2Params::default());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_dir, ".sharevault");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_dir = "secrets-vault"
identity = "keys/me.json"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
"#;
        fs::write(tmp.path().join(".sharevault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_dir, "secrets-vault");
        assert_eq!(
            settings.identity_path(tmp.path()),
            Some(tmp.path().join("keys/me.json"))
        );
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".sharevault.toml"), "vault_dir = \"v\"\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_dir, "v");
        assert!(settings.identity.is_none());
        assert_eq!(settings.argon2_iterations, 3);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".sharevault.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(ShareVaultError::ConfigError(_))));
    }

    #[test]
    fn vault_root_respects_custom_vault_dir() {
        let s = Settings {
            vault_dir: "team-secrets".to_string(),
            ..Settings::default()
        };
        let project = Path::new("/home/user/myproject");
        assert_eq!(
            s.vault_root(project),
            PathBuf::from("/home/user/myproject/team-secrets")
        );
    }
}
