//! `sharevault update`: replace a secret's value under a fresh key.

use crate::cli::output;
use crate::cli::{load_caller, open_vault, read_secret_value, Cli};
use crate::errors::Result;

/// Execute the `update` command.
pub fn execute(cli: &Cli, name: &str, value: Option<&str>) -> Result<()> {
    let (ctx, vault) = open_vault(cli)?;
    let caller = load_caller(cli, &ctx)?;

    let secret_value = read_secret_value(name, value)?;
    vault.update_value(name, secret_value.as_str(), &caller)?;

    let readers = vault.recipients(name)?;
    if readers.is_empty() {
        output::warning(&format!("Secret '{name}' updated but nobody can read it."));
    } else {
        output::success(&format!(
            "Secret '{name}' updated and re-shared with {}",
            readers.join(", ")
        ));
    }

    Ok(())
}
