use crate::errors::{AppError, AppResult};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Password check against the single configured SHA-256 digest.
///
/// The digest is unsalted and compared as lowercase hex, byte for byte.
/// There is no rate limiting or lockout.
pub struct AuthLogic;

impl AuthLogic {
    pub fn hash_password(password: &str) -> String {
        hex::encode(Sha256::digest(password.as_bytes()))
    }

    /// Pull `password` out of a login request body.
    pub fn password_from_body(body: &[u8]) -> AppResult<String> {
        let required = || AppError::bad_request("Password is required.");

        let value: Value = serde_json::from_slice(body).map_err(|_| required())?;
        match value.get("password") {
            Some(Value::String(p)) if !p.is_empty() => Ok(p.clone()),
            _ => Err(required()),
        }
    }

    pub fn check(configured_hash: Option<&str>, password: &str) -> AppResult<()> {
        let Some(expected) = configured_hash else {
            return Err(AppError::ServerMisconfigured(
                "HASHED_PASSWORD is not configured".into(),
            ));
        };

        if Self::hash_password(password).as_bytes() == expected.as_bytes() {
            Ok(())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }
}
