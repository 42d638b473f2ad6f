//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::{discover_vault, Settings};
use crate::errors::{Result, ShareVaultError};
use crate::identity::{load_identity, Identity, IdentityResolver, IDENTITY_ENV, PASSPHRASE_ENV};
use crate::vault::AccessController;

/// Minimum passphrase length for protected identity files.
const MIN_PASSPHRASE_LEN: usize = 8;

/// ShareVault CLI: share encrypted secrets between identities.
#[derive(Parser)]
#[command(
    name = "sharevault",
    about = "Share encrypted secrets between identities",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: discovered from the current directory)
    #[arg(long, global = true, env = "SHAREVAULT_VAULT")]
    pub vault: Option<String>,

    /// Identity file holding your private key
    #[arg(long, global = true)]
    pub identity: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize a new vault in the current project
    Init,

    /// Generate a new identity (key pair) for a user
    Keygen {
        /// User id for the new identity (e.g. alice@example.com)
        user_id: String,
        /// Where to write the identity file (default: ~/.sharevault/identity.json)
        #[arg(short, long)]
        out: Option<String>,
        /// Protect the private key with a passphrase
        #[arg(long)]
        protect: bool,
        /// Also register the public key in the vault
        #[arg(long)]
        register: bool,
    },

    /// Manage registered users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Create a secret and share it with recipients
    Create {
        /// Secret name (letters, digits, `_`, `-`, `.`)
        name: String,
        /// Secret value (omit for interactive prompt)
        value: Option<String>,
        /// Users who may read the secret
        #[arg(long = "to", required = true, num_args = 1..)]
        recipients: Vec<String>,
    },

    /// Print a secret's value
    Read {
        /// Secret name
        name: String,
    },

    /// Replace a secret's value (rotates its key)
    Update {
        /// Secret name
        name: String,
        /// New value (omit for interactive prompt)
        value: Option<String>,
    },

    /// Delete a secret
    Delete {
        /// Secret name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List secrets and who can read them
    List,

    /// Give more users access to a secret
    Share {
        /// Secret name
        name: String,
        /// Users to add
        #[arg(required = true)]
        users: Vec<String>,
    },

    /// Remove users' access to a secret (does not rotate its key)
    Unshare {
        /// Secret name
        name: String,
        /// Users to remove
        #[arg(required = true)]
        users: Vec<String>,
    },
}

/// User subcommands for the vault's registry.
#[derive(clap::Subcommand)]
pub enum UserAction {
    /// Register a user's public key
    Add {
        /// User id (e.g. bob@example.com)
        user_id: String,
        /// Base64 public key, as printed by `sharevault keygen`
        public_key: String,
    },

    /// List registered users
    List,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// The vault a command operates on, plus its project settings.
pub struct VaultContext {
    pub project_dir: PathBuf,
    pub vault_root: PathBuf,
    pub settings: Settings,
}

/// Work out which vault to use.
///
/// `--vault` (or `SHAREVAULT_VAULT`) wins; otherwise the vault is
/// discovered by walking up from the current directory.
pub fn vault_context(cli: &Cli) -> Result<VaultContext> {
    let cwd = std::env::current_dir()?;
    match &cli.vault {
        Some(dir) => Ok(VaultContext {
            vault_root: cwd.join(dir),
            settings: Settings::load(&cwd)?,
            project_dir: cwd,
        }),
        None => {
            let found = discover_vault(&cwd)?;
            Ok(VaultContext {
                project_dir: found.project_dir,
                vault_root: found.vault_root,
                settings: found.settings,
            })
        }
    }
}

/// Open the vault for a command.
pub fn open_vault(cli: &Cli) -> Result<(VaultContext, AccessController)> {
    let ctx = vault_context(cli)?;
    let vault = AccessController::open(&ctx.vault_root)?;
    Ok((ctx, vault))
}

/// Load the caller's identity.
///
/// Resolution order: `--identity` > `SHAREVAULT_IDENTITY` > the
/// `identity` entry in `.sharevault.toml` > `~/.sharevault/identity.json`.
pub fn load_caller(cli: &Cli, ctx: &VaultContext) -> Result<Identity> {
    let source = IdentityResolver::new()
        .explicit(cli.identity.as_ref().map(PathBuf::from))
        .environment(std::env::var_os(IDENTITY_ENV).map(PathBuf::from))
        .configured(ctx.settings.identity_path(&ctx.project_dir))
        .resolve()?;
    debug!(%source, "using identity");

    load_identity(source.path(), prompt_passphrase)
}

/// Get the passphrase for a protected identity, trying in order:
/// 1. `SHAREVAULT_PASSPHRASE` env var (CI/CD)
/// 2. Interactive prompt
pub fn prompt_passphrase() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter identity passphrase")
        .interact()
        .map_err(|e| ShareVaultError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new passphrase with confirmation (used by `keygen --protect`).
///
/// Also respects `SHAREVAULT_PASSPHRASE` for scripted usage.
/// Enforces a minimum length.
pub fn prompt_new_passphrase() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSPHRASE_LEN {
                return Err(ShareVaultError::CommandFailed(format!(
                    "passphrase must be at least {MIN_PASSPHRASE_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let passphrase = dialoguer::Password::new()
            .with_prompt("Choose identity passphrase")
            .with_confirmation(
                "Confirm identity passphrase",
                "Passphrases do not match, try again",
            )
            .interact()
            .map_err(|e| ShareVaultError::CommandFailed(format!("passphrase prompt: {e}")))?;

        if passphrase.len() < MIN_PASSPHRASE_LEN {
            output::warning(&format!(
                "Passphrase must be at least {MIN_PASSPHRASE_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(passphrase));
    }
}

/// Get a secret value from one of three sources:
/// the command line, piped stdin, or a hidden interactive prompt.
pub fn read_secret_value(name: &str, value: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(v) = value {
        output::warning("Value provided on command line — it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed_len = buf.trim_end().len();
        buf.truncate(trimmed_len);
        return Ok(buf);
    }

    let v = dialoguer::Password::new()
        .with_prompt(format!("Enter value for {name}"))
        .interact()
        .map_err(|e| ShareVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(v))
}
