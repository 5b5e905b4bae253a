use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ChirpId = u64;
pub type UserId = u64;

/// Longest chirp body accepted, counted in characters.
pub const MAX_CHIRP_LEN: usize = 140;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Chirp {
    pub id: ChirpId,
    pub body: String,
    pub author_id: UserId,
}

/// A stored account. `refresh_token` and `refresh_token_expires_at` are one
/// credential: they are always written together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn has_session(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// Both collections at one instant. This is exactly what lives on disk.
///
/// JSON object keys are the decimal ids; serde_json handles the
/// integer-key conversion in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub chirps: BTreeMap<ChirpId, Chirp>,
    pub users: BTreeMap<UserId, User>,
}
