//! `sharevault share`: grant more users access to a secret.

use crate::cli::output;
use crate::cli::{load_caller, open_vault, Cli};
use crate::errors::Result;

/// Execute the `share` command.
pub fn execute(cli: &Cli, name: &str, users: &[String]) -> Result<()> {
    let (ctx, vault) = open_vault(cli)?;
    let caller = load_caller(cli, &ctx)?;

    vault.share(name, users, &caller)?;
    output::success(&format!("Shared '{name}' with {}", users.join(", ")));

    Ok(())
}
