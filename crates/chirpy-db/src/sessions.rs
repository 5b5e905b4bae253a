use chirpy_auth::tokens::{RefreshToken, revoked_expiry};
use chirpy_types::models::UserId;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{Result, StoreError};
use crate::Database;

impl Database {
    /// Store `session` as the user's refresh session.
    ///
    /// `verified_hash` is the password hash the caller checked the login
    /// against. If the stored hash differs, the password was changed in the
    /// meantime and nothing is written. Email and password are left as they
    /// are.
    pub fn start_session(
        &self,
        user_id: UserId,
        verified_hash: &str,
        session: RefreshToken,
    ) -> Result<()> {
        self.transaction(|tx| {
            let user = tx
                .snapshot()
                .users
                .get(&user_id)
                .ok_or(StoreError::NotFound("user"))?;
            if user.password_hash != verified_hash {
                warn!("Credentials of user {} changed during login", user_id);
                return Err(StoreError::CredentialsChanged);
            }

            if let Some(user) = tx.snapshot_mut().users.get_mut(&user_id) {
                user.refresh_token = session.token;
                user.refresh_token_expires_at = Some(session.expires_at);
            }
            Ok(())
        })?;

        info!("Started session for user {}", user_id);
        Ok(())
    }

    /// Resolve a refresh token to its owner.
    ///
    /// Linear scan over every user; the token is not indexed.
    pub fn authenticate_refresh(&self, token: &str) -> Result<UserId> {
        self.authenticate_refresh_at(token, Utc::now())
    }

    pub fn authenticate_refresh_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId> {
        if token.is_empty() {
            return Err(StoreError::InvalidToken);
        }

        self.with_snapshot(|s| {
            let user = s
                .users
                .values()
                .find(|u| u.refresh_token == token)
                .ok_or(StoreError::InvalidToken)?;

            match user.refresh_token_expires_at {
                Some(expires_at) if now < expires_at => Ok(user.id),
                _ => {
                    warn!("Expired refresh token presented for user {}", user.id);
                    Err(StoreError::ExpiredToken)
                }
            }
        })
    }

    /// Clear the session that owns `token`. Returns the owner's id.
    pub fn revoke_refresh(&self, token: &str) -> Result<UserId> {
        if token.is_empty() {
            return Err(StoreError::NotFound("refresh token"));
        }

        let user_id = self.transaction(|tx| {
            let user = tx
                .snapshot_mut()
                .users
                .values_mut()
                .find(|u| u.refresh_token == token)
                .ok_or(StoreError::NotFound("refresh token"))?;
            user.refresh_token.clear();
            user.refresh_token_expires_at = Some(revoked_expiry());
            Ok(user.id)
        })?;

        info!("Revoked refresh token of user {}", user_id);
        Ok(user_id)
    }

    /// Clear every session whose expiry has passed. Returns how many were
    /// cleared; the file is only rewritten when that is non-zero.
    pub fn expire_sessions_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let cleared = self.transaction(|tx| {
            let expired: Vec<UserId> = tx
                .snapshot()
                .users
                .values()
                .filter(|u| u.has_session())
                .filter(|u| u.refresh_token_expires_at.is_none_or(|exp| now >= exp))
                .map(|u| u.id)
                .collect();

            if expired.is_empty() {
                return Ok(0);
            }

            let users = &mut tx.snapshot_mut().users;
            for id in &expired {
                if let Some(user) = users.get_mut(id) {
                    user.refresh_token.clear();
                    user.refresh_token_expires_at = Some(revoked_expiry());
                }
            }
            Ok(expired.len())
        })?;

        if cleared > 0 {
            info!("Expired {} refresh sessions", cleared);
        }
        Ok(cleared)
    }
}
