//! Chirpy credentials.
//!
//! Password hashing lives in [`password`]; access and refresh tokens in
//! [`tokens`]. Nothing here touches storage: looking refresh tokens up and
//! revoking them is done by `chirpy-db`.

pub mod password;
pub mod tokens;

pub use password::{CredentialError, hash_password, verify_password, verify_password_or_dummy};
pub use tokens::{RefreshToken, TokenError, TokenIssuer, issue_refresh_token};
