//! `sharevault user`: manage the vault's user registry.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::crypto::PublicKey;
use crate::errors::Result;

/// Execute `user add`.
pub fn execute_add(cli: &Cli, user_id: &str, public_key: &str) -> Result<()> {
    let key = PublicKey::from_base64(public_key.trim())?;
    let (_, vault) = open_vault(cli)?;

    vault.registry().add_user(user_id, &key)?;
    output::success(&format!("Registered user '{user_id}'"));
    output::tip(&format!("Run `sharevault share <NAME> {user_id}` to give them access."));

    Ok(())
}

/// Execute `user list`.
pub fn execute_list(cli: &Cli) -> Result<()> {
    let (_, vault) = open_vault(cli)?;
    let users = vault.registry().list_users()?;

    output::info(&format!("{} registered user(s)", users.len()));
    output::print_users_table(&users);

    Ok(())
}
