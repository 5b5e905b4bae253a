use std::sync::OnceLock;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use thiserror::Error;
use tracing::error;

/// Errors never carry the plaintext or the stored hash.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("password hashing failed")]
    Hash,
    #[error("credentials do not match")]
    NoMatch,
}

// Argon2id work factor. Changing these only affects new hashes; existing
// PHC strings carry their own parameters.
const MEMORY_KIB: u32 = 19 * 1024;
const ITERATIONS: u32 = 2;
const LANES: u32 = 1;

const DUMMY_PASSWORD: &str = "chirpy-timing-equalizer";

fn argon2() -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, LANES, None).map_err(|e| {
        error!("Invalid argon2 parameters: {}", e);
        CredentialError::Hash
    })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()?
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            CredentialError::Hash
        })?
        .to_string();
    Ok(hash)
}

/// Check a plaintext password against a stored PHC hash string.
///
/// An unparsable stored hash is reported as a mismatch.
pub fn verify_password(plaintext: &str, hash: &str) -> Result<(), CredentialError> {
    let parsed = PasswordHash::new(hash).map_err(|_| CredentialError::NoMatch)?;
    argon2()?
        .verify_password(plaintext.as_bytes(), &parsed)
        .map_err(|_| CredentialError::NoMatch)
}

/// Login-side verification. When the account does not exist the password is
/// still checked against a fixed dummy hash, so an unknown email and a wrong
/// password take the same time and return the same error.
pub fn verify_password_or_dummy(
    plaintext: &str,
    hash: Option<&str>,
) -> Result<(), CredentialError> {
    match hash {
        Some(hash) => verify_password(plaintext, hash),
        None => {
            if let Some(dummy) = dummy_hash() {
                let _ = verify_password(plaintext, dummy);
            }
            Err(CredentialError::NoMatch)
        }
    }
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password(DUMMY_PASSWORD).ok())
        .as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("hunter22"));
        assert_eq!(verify_password("hunter22", &hash), Ok(()));
    }

    #[test]
    fn wrong_password_is_no_match() {
        let hash = hash_password("correct horse").unwrap();
        assert_eq!(
            verify_password("battery staple", &hash),
            Err(CredentialError::NoMatch)
        );
    }

    #[test]
    fn salts_differ() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_is_no_match() {
        assert_eq!(
            verify_password("anything", "not-a-phc-string"),
            Err(CredentialError::NoMatch)
        );
    }

    #[test]
    fn missing_user_looks_like_wrong_password() {
        let hash = hash_password("pw").unwrap();
        let wrong = verify_password_or_dummy("nope", Some(&hash)).unwrap_err();
        let missing = verify_password_or_dummy("nope", None).unwrap_err();
        assert_eq!(wrong, missing);
        assert_eq!(wrong.to_string(), missing.to_string());
    }
}
