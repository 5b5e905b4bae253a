use chirpy_types::models::{ChirpId, Snapshot, UserId};

use crate::error::{Result, StoreError};

/// Process-local id counters, one per collection.
///
/// Counters start at 1 on every open. An allocation never goes below the
/// largest id already in the snapshot, so records that survived a restart
/// are not shadowed by reissued ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAllocator {
    next_chirp: ChirpId,
    next_user: UserId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_chirp: 1,
            next_user: 1,
        }
    }

    pub fn next_chirp_id(&mut self, snapshot: &Snapshot) -> Result<ChirpId> {
        allocate(&mut self.next_chirp, snapshot.chirps.keys().next_back().copied())
            .ok_or(StoreError::IdsExhausted("chirp"))
    }

    pub fn next_user_id(&mut self, snapshot: &Snapshot) -> Result<UserId> {
        allocate(&mut self.next_user, snapshot.users.keys().next_back().copied())
            .ok_or(StoreError::IdsExhausted("user"))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// `None` once the id space above the stored records is used up.
fn allocate(counter: &mut u64, max_existing: Option<u64>) -> Option<u64> {
    let floor = match max_existing {
        Some(max) => max.checked_add(1)?,
        None => 1,
    };
    let id = (*counter).max(floor);
    *counter = id.checked_add(1)?;
    Some(id)
}
