//! `sharevault read`: decrypt and print a secret's value.

use serde_json::Value;

use crate::cli::{load_caller, open_vault, Cli};
use crate::errors::Result;

/// Execute the `read` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let (ctx, vault) = open_vault(cli)?;
    let caller = load_caller(cli, &ctx)?;

    // Strings print bare; anything else stored through the library prints as JSON.
    match vault.read_value::<Value>(name, &caller)? {
        Value::String(s) => println!("{s}"),
        other => println!("{other}"),
    }

    Ok(())
}
