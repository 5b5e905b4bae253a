use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use thiserror::Error;

use chirpy_types::api::Claims;
use chirpy_types::models::UserId;

pub const ISSUER: &str = "chirpy";

const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;
const REFRESH_TOKEN_TTL_DAYS: i64 = 60;
const REFRESH_TOKEN_BYTES: usize = 32;

/// 2000-01-01T00:00:00Z, written as the expiry of a revoked session.
const REVOKED_AT_SECS: i64 = 946_684_800;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

/// Signs and checks HS256 access tokens with the server secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue_access_token(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_access_token_at(user_id, Utc::now())
    }

    pub fn issue_access_token_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: ISSUER.to_string(),
            iat,
            exp: iat + ACCESS_TOKEN_TTL_SECS,
            sub: user_id.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Returns the subject user id of a valid token.
    pub fn validate_access_token(&self, token: &str) -> Result<UserId, TokenError> {
        self.validate_access_token_at(token, Utc::now())
    }

    /// A token is expired from the second `exp` is reached; there is no leeway.
    pub fn validate_access_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<UserId, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::Invalid)
    }
}

/// An opaque session credential and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn issue_refresh_token() -> RefreshToken {
    issue_refresh_token_at(Utc::now())
}

pub fn issue_refresh_token_at(now: DateTime<Utc>) -> RefreshToken {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    RefreshToken {
        token: hex::encode(bytes),
        expires_at: now + Duration::days(REFRESH_TOKEN_TTL_DAYS),
    }
}

pub fn revoked_expiry() -> DateTime<Utc> {
    DateTime::from_timestamp(REVOKED_AT_SECS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
