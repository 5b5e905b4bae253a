use chirpy_types::models::{ChirpId, Snapshot, UserId};

use crate::error::Result;
use crate::ids::IdAllocator;

/// One read-modify-write unit over the whole document.
///
/// Built by [`crate::Database::transaction`] while the exclusive lock is
/// held. Mutations and id allocations are staged here; they reach the file
/// and the live allocator only if the closure returns `Ok`.
pub struct Transaction {
    snapshot: Snapshot,
    ids: IdAllocator,
    dirty: bool,
}

impl Transaction {
    pub(crate) fn new(snapshot: Snapshot, ids: IdAllocator) -> Self {
        Self {
            snapshot,
            ids,
            dirty: false,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Marks the transaction as needing a write.
    pub fn snapshot_mut(&mut self) -> &mut Snapshot {
        self.dirty = true;
        &mut self.snapshot
    }

    pub fn next_chirp_id(&mut self) -> Result<ChirpId> {
        self.ids.next_chirp_id(&self.snapshot)
    }

    pub fn next_user_id(&mut self) -> Result<UserId> {
        self.ids.next_user_id(&self.snapshot)
    }

    pub(crate) fn into_parts(self) -> (Snapshot, IdAllocator, bool) {
        (self.snapshot, self.ids, self.dirty)
    }
}
