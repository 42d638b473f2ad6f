//! Payload codec: application values <-> bytes.
//!
//! The vault core only sees bytes.  Typed values cross this boundary as
//! JSON before they are encrypted.

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::errors::{Result, ShareVaultError};

/// Serialize `value` into a byte payload.
pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<Zeroizing<Vec<u8>>> {
    serde_json::to_vec(value)
        .map(Zeroizing::new)
        .map_err(|e| ShareVaultError::SerializationError(format!("payload: {e}")))
}

/// Deserialize a byte payload back into a value.
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| ShareVaultError::SerializationError(format!("payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct DbCredentials {
        host: String,
        port: u16,
        password: String,
    }

    #[test]
    fn structured_value_survives_codec() {
        let creds = DbCredentials {
            host: "db.internal".into(),
            port: 5432,
            password: "s3cr3t".into(),
        };
        let bytes = serialize(&creds).unwrap();
        let back: DbCredentials = deserialize(&bytes).unwrap();
        assert_eq!(back, creds);
    }

    #[test]
    fn type_mismatch_is_a_serialization_error() {
        let bytes = serialize("just a string").unwrap();
        let result: Result<DbCredentials> = deserialize(&bytes);
        assert!(matches!(result, Err(ShareVaultError::SerializationError(_))));
    }
}
