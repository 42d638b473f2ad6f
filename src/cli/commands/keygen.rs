//! `sharevault keygen`: generate an identity and optionally register it.

use std::path::PathBuf;

use crate::cli::output;
use crate::cli::{open_vault, prompt_new_passphrase, Cli};
use crate::config::Settings;
use crate::errors::{Result, ShareVaultError};
use crate::identity::{default_identity_path, save_identity, Identity};
use crate::vault::UserRegistry;

/// Execute the `keygen` command.
pub fn execute(
    cli: &Cli,
    user_id: &str,
    out: Option<&str>,
    protect: bool,
    register: bool,
) -> Result<()> {
    let path = match out {
        Some(p) => PathBuf::from(p),
        None => default_identity_path().ok_or_else(|| {
            ShareVaultError::IdentityError(
                "cannot determine home directory; pass --out <PATH>".into(),
            )
        })?,
    };

    // Registration is checked before the identity file is written.
    let (settings, vault) = if register {
        let (ctx, vault) = open_vault(cli)?;
        if vault.registry().contains(user_id) {
            return Err(ShareVaultError::UserAlreadyExists(user_id.to_string()));
        }
        (ctx.settings, Some(vault))
    } else {
        (Settings::load(&std::env::current_dir()?)?, None)
    };

    let identity = Identity::generate(user_id)?;
    let passphrase = if protect {
        Some(prompt_new_passphrase()?)
    } else {
        None
    };
    save_identity(
        &path,
        &identity,
        passphrase.as_ref().map(|p| p.as_bytes()),
        &settings.argon2_params(),
    )?;
    output::success(&format!(
        "Identity for '{user_id}' written to {}",
        path.display()
    ));
    if !protect {
        output::warning("Private key is stored unprotected. Use --protect to add a passphrase.");
    }

    let public_key = identity.public_key();
    if let Some(vault) = vault {
        vault.registry().add_user(user_id, &public_key)?;
        output::success(&format!("Registered '{user_id}' in the vault"));
    } else {
        output::info(&format!("Public key: {public_key}"));
        output::tip(&format!(
            "Run `sharevault user add {user_id} {public_key}` in the vault to register it."
        ));
    }

    Ok(())
}
