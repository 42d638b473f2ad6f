//! `sharevault delete`: remove a secret from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{Result, ShareVaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    let (_, vault) = open_vault(cli)?;

    // Fails with SecretNotFound before anything is asked.
    let readers = vault.recipients(name)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete secret '{name}' ({} reader(s))?",
                readers.len()
            ))
            .default(false)
            .interact()
            .map_err(|e| ShareVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    vault.delete(name)?;
    output::success(&format!("Deleted secret '{name}'"));

    Ok(())
}
