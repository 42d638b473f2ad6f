//! `sharevault create`: store a new secret for a set of recipients.

use crate::cli::output;
use crate::cli::{open_vault, read_secret_value, Cli};
use crate::errors::Result;
use crate::vault::naming::validate_secret_name;

/// Execute the `create` command.
pub fn execute(cli: &Cli, name: &str, value: Option<&str>, recipients: &[String]) -> Result<()> {
    // Reject a bad name before prompting for a value.
    validate_secret_name(name)?;
    let (_, vault) = open_vault(cli)?;

    let secret_value = read_secret_value(name, value)?;
    vault.create_value(name, secret_value.as_str(), recipients)?;

    output::success(&format!(
        "Secret '{name}' created for {}",
        recipients.join(", ")
    ));
    output::tip(&format!("Run `sharevault read {name}` to print it."));

    Ok(())
}
