//! `sharevault list`: show every secret and who can read it.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (ctx, vault) = open_vault(cli)?;
    let listing = vault.list()?;

    output::info(&format!(
        "{} — {} secret(s)",
        ctx.vault_root.display(),
        listing.len()
    ));
    output::print_access_table(&listing);

    Ok(())
}
