//! `sharevault unshare`: revoke users' access to a secret.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `unshare` command.
pub fn execute(cli: &Cli, name: &str, users: &[String]) -> Result<()> {
    let (_, vault) = open_vault(cli)?;

    vault.unshare(name, users)?;
    output::success(&format!("Removed {} from '{name}'", users.join(", ")));
    // The key is not rotated, so anyone who read it before still knows it.
    output::tip(&format!(
        "Run `sharevault update {name}` to rotate the key if they saw the value."
    ));

    Ok(())
}
