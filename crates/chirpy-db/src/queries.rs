use chirpy_auth::hash_password;
use chirpy_types::models::{Chirp, ChirpId, MAX_CHIRP_LEN, User, UserId};
use tracing::info;

use crate::error::{Result, StoreError};
use crate::models::UserUpdate;
use crate::Database;

impl Database {
    // -- Chirps --

    /// All chirps, ascending by id.
    pub fn list_chirps(&self) -> Result<Vec<Chirp>> {
        self.with_snapshot(|s| Ok(s.chirps.values().cloned().collect()))
    }

    pub fn list_chirps_by_author(&self, author_id: UserId) -> Result<Vec<Chirp>> {
        self.with_snapshot(|s| {
            Ok(s.chirps
                .values()
                .filter(|c| c.author_id == author_id)
                .cloned()
                .collect())
        })
    }

    pub fn get_chirp(&self, id: ChirpId) -> Result<Chirp> {
        self.with_snapshot(|s| s.chirps.get(&id).cloned().ok_or(StoreError::NotFound("chirp")))
    }

    /// Filter the body, allocate an id, and persist, as one write.
    pub fn create_chirp(&self, author_id: UserId, raw_body: &str) -> Result<Chirp> {
        let len = raw_body.chars().count();
        if len > MAX_CHIRP_LEN {
            return Err(StoreError::Validation(format!(
                "chirp is too long ({} > {} characters)",
                len, MAX_CHIRP_LEN
            )));
        }

        let body = self.filter().apply(raw_body);
        let chirp = self.transaction(|tx| {
            let id = tx.next_chirp_id()?;
            let chirp = Chirp {
                id,
                body,
                author_id,
            };
            tx.snapshot_mut().chirps.insert(id, chirp.clone());
            Ok(chirp)
        })?;

        info!("Created chirp {} by user {}", chirp.id, author_id);
        Ok(chirp)
    }

    pub fn delete_chirp(&self, id: ChirpId) -> Result<()> {
        self.transaction(|tx| {
            tx.snapshot_mut()
                .chirps
                .remove(&id)
                .map(|_| ())
                .ok_or(StoreError::NotFound("chirp"))
        })?;

        info!("Deleted chirp {}", id);
        Ok(())
    }

    /// Delete a chirp only if `author_id` wrote it. The ownership check and
    /// the delete happen under the same lock.
    pub fn delete_chirp_by_author(&self, id: ChirpId, author_id: UserId) -> Result<()> {
        self.transaction(|tx| {
            let chirp = tx
                .snapshot()
                .chirps
                .get(&id)
                .ok_or(StoreError::NotFound("chirp"))?;
            if chirp.author_id != author_id {
                return Err(StoreError::Forbidden);
            }
            tx.snapshot_mut().chirps.remove(&id);
            Ok(())
        })?;

        info!("User {} deleted chirp {}", author_id, id);
        Ok(())
    }

    // -- Users --

    /// All users, ascending by id.
    pub fn list_users(&self) -> Result<Vec<User>> {
        self.with_snapshot(|s| Ok(s.users.values().cloned().collect()))
    }

    pub fn get_user(&self, id: UserId) -> Result<User> {
        self.with_snapshot(|s| s.users.get(&id).cloned().ok_or(StoreError::NotFound("user")))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.with_snapshot(|s| {
            s.users
                .values()
                .find(|u| u.email == email)
                .cloned()
                .ok_or(StoreError::NotFound("user"))
        })
    }

    pub fn create_user(&self, email: &str, password: &str) -> Result<User> {
        // Hash outside the write lock.
        let password_hash = hash_password(password).map_err(|_| StoreError::Hash)?;

        let user = self.transaction(|tx| {
            if tx.snapshot().users.values().any(|u| u.email == email) {
                return Err(StoreError::Conflict("email already in use".into()));
            }

            let id = tx.next_user_id()?;
            let user = User {
                id,
                email: email.to_string(),
                password_hash,
                refresh_token: String::new(),
                refresh_token_expires_at: None,
            };
            tx.snapshot_mut().users.insert(id, user.clone());
            Ok(user)
        })?;

        info!("Created user {}", user.id);
        Ok(user)
    }

    /// Overwrite email, password, and session of an existing user.
    pub fn replace_user(&self, id: UserId, update: UserUpdate) -> Result<User> {
        let password_hash = hash_password(&update.password).map_err(|_| StoreError::Hash)?;
        let (refresh_token, refresh_token_expires_at) = match update.session {
            Some(session) => (session.token, Some(session.expires_at)),
            None => (String::new(), None),
        };

        let user = self.transaction(|tx| {
            if !tx.snapshot().users.contains_key(&id) {
                return Err(StoreError::NotFound("user"));
            }
            if tx
                .snapshot()
                .users
                .values()
                .any(|u| u.id != id && u.email == update.email)
            {
                return Err(StoreError::Conflict("email already in use".into()));
            }

            let user = User {
                id,
                email: update.email,
                password_hash,
                refresh_token,
                refresh_token_expires_at,
            };
            tx.snapshot_mut().users.insert(id, user.clone());
            Ok(user)
        })?;

        info!("Replaced user {}", id);
        Ok(user)
    }
}
