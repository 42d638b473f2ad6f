//! Name rules for secrets and user ids.
//!
//! Both kinds of name become path components under the vault root, so
//! they are checked before any path is built from them.

use crate::errors::{Result, ShareVaultError};

/// Longest accepted secret name or user id, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Validate that a secret name is safe.
///
/// Allowed: ASCII letters, digits, underscores, hyphens, periods.
/// Must be non-empty, at most 255 characters, and not `.` or `..`.
pub fn validate_secret_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Err(ShareVaultError::InvalidName(name.to_string(), reason.into()));

    if name.is_empty() {
        return invalid("name cannot be empty");
    }
    if name.len() > MAX_NAME_LEN {
        return invalid("name cannot exceed 255 characters");
    }
    if name == "." || name == ".." {
        return invalid("name cannot be a relative path component");
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return invalid(
            "only ASCII letters, digits, underscores, hyphens, and periods are allowed",
        );
    }
    Ok(())
}

/// Validate an email-like user id.
///
/// Any printable ASCII except whitespace and path separators; must not
/// start with a period.
pub fn validate_user_id(user_id: &str) -> Result<()> {
    let invalid =
        |reason: &str| Err(ShareVaultError::InvalidUserId(user_id.to_string(), reason.into()));

    if user_id.is_empty() {
        return invalid("user id cannot be empty");
    }
    if user_id.len() > MAX_NAME_LEN {
        return invalid("user id cannot exceed 255 characters");
    }
    if user_id.starts_with('.') {
        return invalid("user id cannot start with a period");
    }
    if !user_id
        .bytes()
        .all(|b| b.is_ascii_graphic() && b != b'/' && b != b'\\')
    {
        return invalid("only printable ASCII without spaces or path separators is allowed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_secret_names() {
        for name in ["db-pass", "API_KEY", "prod.token", "a", "v1.2_beta-3"] {
            assert!(validate_secret_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn invalid_secret_names() {
        for name in ["", "bad name!", "a/b", "..", ".", "caf\u{e9}", "x\0y"] {
            assert!(
                matches!(
                    validate_secret_name(name),
                    Err(ShareVaultError::InvalidName(..))
                ),
                "{name:?} should be invalid"
            );
        }
        assert!(validate_secret_name(&"a".repeat(256)).is_err());
        assert!(validate_secret_name(&"a".repeat(255)).is_ok());
    }

    #[test]
    fn valid_user_ids() {
        for id in ["alice", "bob@example.com", "ci+deploy@corp.io", "x_1"] {
            assert!(validate_user_id(id).is_ok(), "{id} should be valid");
        }
    }

    #[test]
    fn invalid_user_ids() {
        for id in ["", ".hidden", "..", "a/b", "a\\b", "has space", "tab\tid"] {
            assert!(
                matches!(validate_user_id(id), Err(ShareVaultError::InvalidUserId(..))),
                "{id:?} should be invalid"
            );
        }
    }

    #[test]
    fn error_message_names_the_secret() {
        let msg = validate_secret_name("bad name!").unwrap_err().to_string();
        assert!(msg.contains("bad name!"), "unexpected message: {msg}");
    }
}
