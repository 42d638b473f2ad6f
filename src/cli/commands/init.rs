//! `sharevault init`: create an empty vault.

use crate::cli::output;
use crate::cli::Cli;
use crate::config::Settings;
use crate::errors::Result;
use crate::vault::VaultStore;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;

    // 1. Work out where the vault goes: --vault, else the configured dir.
    let vault_root = match &cli.vault {
        Some(dir) => cwd.join(dir),
        None => Settings::load(&cwd)?.vault_root(&cwd),
    };

    // 2. Create users/ and secrets/ (fails if a vault is already there).
    let store = VaultStore::init(&vault_root)?;
    output::success(&format!("Vault created at {}", store.root().display()));

    // 3. Show helpful tips.
    output::tip("Run `sharevault keygen <USER> --register` to create your identity.");
    output::tip("Run `sharevault create <NAME> --to <USER>` to add a secret.");

    Ok(())
}
