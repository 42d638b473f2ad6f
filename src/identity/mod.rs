//! Caller identities and where to find them.
//!
//! An `Identity` is a user id plus the matching X25519 private key.  It
//! is loaded from an identity file (see `file`), located by an explicit
//! resolution order rather than ambient process state:
//!
//! 1. an explicit path (e.g. `--identity`)
//! 2. an environment override (`SHAREVAULT_IDENTITY`, read by the caller)
//! 3. the `identity` entry from `.sharevault.toml`
//! 4. `~/.sharevault/identity.json`

pub mod file;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::crypto::{PrivateKey, PublicKey};
use crate::errors::{Result, ShareVaultError};
use crate::vault::naming::validate_user_id;

pub use file::{load_identity, save_identity};

/// Environment variable naming an identity file.
pub const IDENTITY_ENV: &str = "SHAREVAULT_IDENTITY";

/// Environment variable holding the passphrase for a protected identity.
pub const PASSPHRASE_ENV: &str = "SHAREVAULT_PASSPHRASE";

/// A user id together with its private key.
#[derive(Clone)]
pub struct Identity {
    user_id: String,
    private_key: PrivateKey,
}

impl Identity {
    pub fn new(user_id: &str, private_key: PrivateKey) -> Result<Self> {
        validate_user_id(user_id)?;
        Ok(Self {
            user_id: user_id.to_string(),
            private_key,
        })
    }

    /// Create an identity with a freshly generated key pair.
    pub fn generate(user_id: &str) -> Result<Self> {
        Self::new(user_id, PrivateKey::generate())
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> PublicKey {
        self.private_key.public_key()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("public_key", &self.public_key())
            .finish()
    }
}

/// Where a resolved identity file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    Explicit(PathBuf),
    Environment(PathBuf),
    Config(PathBuf),
    Default(PathBuf),
}

impl IdentitySource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(p) | Self::Environment(p) | Self::Config(p) | Self::Default(p) => p,
        }
    }
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match self {
            Self::Explicit(_) => "command line",
            Self::Environment(_) => IDENTITY_ENV,
            Self::Config(_) => "config file",
            Self::Default(_) => "default location",
        };
        write!(f, "{} (from {origin})", self.path().display())
    }
}

/// Picks the identity file to use from the configured candidates.
///
/// The first candidate that was *specified* wins, even if the file is
/// missing, so a typo in `--identity` is reported instead of silently
/// falling through.  The default location is only used if it exists.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    explicit: Option<PathBuf>,
    environment: Option<PathBuf>,
    configured: Option<PathBuf>,
    default_path: Option<PathBuf>,
}

impl IdentityResolver {
    /// A resolver whose fallback is `~/.sharevault/identity.json`.
    pub fn new() -> Self {
        Self {
            default_path: default_identity_path(),
            ..Self::default()
        }
    }

    pub fn explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    pub fn environment(mut self, path: Option<PathBuf>) -> Self {
        self.environment = path.filter(|p| !p.as_os_str().is_empty());
        self
    }

    pub fn configured(mut self, path: Option<PathBuf>) -> Self {
        self.configured = path;
        self
    }

    pub fn default_path(mut self, path: Option<PathBuf>) -> Self {
        self.default_path = path;
        self
    }

    /// Resolve to a single identity source.
    pub fn resolve(&self) -> Result<IdentitySource> {
        let specified = self
            .explicit
            .clone()
            .map(IdentitySource::Explicit)
            .or_else(|| self.environment.clone().map(IdentitySource::Environment))
            .or_else(|| self.configured.clone().map(IdentitySource::Config));

        if let Some(source) = specified {
            if !source.path().is_file() {
                return Err(ShareVaultError::IdentityError(format!(
                    "identity file not found: {source}"
                )));
            }
            return Ok(source);
        }

        match &self.default_path {
            Some(path) if path.is_file() => Ok(IdentitySource::Default(path.clone())),
            _ => Err(ShareVaultError::IdentityError(
                "no identity found — run `sharevault keygen` or pass --identity".into(),
            )),
        }
    }
}

/// `~/.sharevault/identity.json`, if a home directory is known.
pub fn default_identity_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sharevault").join("identity.json"))
}
