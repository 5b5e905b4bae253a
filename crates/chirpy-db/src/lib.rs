//! Single-file JSON document store for users and chirps.
//!
//! The whole [`Snapshot`] is read on every operation and rewritten on every
//! mutation. One reader/writer lock per [`Database`] serializes writers and
//! keeps readers from seeing a half-written file. There is no cross-process
//! coordination: one process per file.

pub mod error;
pub mod filter;
pub mod ids;
pub mod models;
pub mod queries;
pub mod sessions;
pub mod transaction;

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chirpy_types::models::Snapshot;
use tracing::{debug, info, warn};

pub use error::{Result, StoreError};
pub use filter::ContentFilter;
pub use ids::IdAllocator;
pub use models::UserUpdate;
pub use transaction::Transaction;

const FILE_MODE: u32 = 0o644;

pub struct Database {
    path: PathBuf,
    filter: ContentFilter,
    // Guards the backing file as well as the counters.
    ids: RwLock<IdAllocator>,
}

impl Database {
    /// Open the store at `path`, creating an empty file if there is none.
    /// Content is not loaded until the first operation.
    pub fn open(path: impl AsRef<Path>, filter: ContentFilter) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        ensure_file(&path)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path,
            filter,
            ids: RwLock::new(IdAllocator::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    /// Run `f` against a freshly loaded snapshot under the shared lock.
    pub fn with_snapshot<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Snapshot) -> Result<T>,
    {
        let _guard = self
            .ids
            .read()
            .map_err(|e| StoreError::read(format!("DB lock poisoned: {}", e)))?;
        let snapshot = load(&self.path)?;
        f(&snapshot)
    }

    /// Load, apply `f`, and persist, all under the exclusive lock.
    ///
    /// Nothing is written if `f` fails or never asks for a mutable snapshot.
    /// Id counters advance only once the new snapshot is on disk.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction) -> Result<T>,
    {
        let mut ids = self
            .ids
            .write()
            .map_err(|e| StoreError::write(format!("DB lock poisoned: {}", e)))?;
        let snapshot = load(&self.path)?;

        let mut tx = Transaction::new(snapshot, *ids);
        let value = f(&mut tx)?;

        let (snapshot, staged, dirty) = tx.into_parts();
        if dirty {
            persist(&self.path, &snapshot)?;
            *ids = staged;
        }
        Ok(value)
    }
}

fn ensure_file(path: &Path) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }

    match options.open(path) {
        Ok(_) => {
            info!("Created database file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            debug!("Database file {} exists", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Read and strictly decode the snapshot. Absent and zero-length files are
/// empty snapshots.
fn load(path: &Path) -> Result<Snapshot> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Database file {} missing, treating as empty", path.display());
            return Ok(Snapshot::default());
        }
        Err(e) => return Err(StoreError::read(e)),
    };

    if data.is_empty() {
        debug!("Database file is empty");
        return Ok(Snapshot::default());
    }

    let snapshot: Snapshot = serde_json::from_slice(&data).map_err(StoreError::read)?;
    check_snapshot(&snapshot)?;
    debug!(
        "Loaded {} chirps and {} users",
        snapshot.chirps.len(),
        snapshot.users.len()
    );
    Ok(snapshot)
}

/// Reject documents that parse but break the collection invariants.
fn check_snapshot(snapshot: &Snapshot) -> Result<()> {
    for (key, chirp) in &snapshot.chirps {
        if *key == 0 || *key != chirp.id {
            return Err(StoreError::read(format!(
                "chirp key {} does not match id {}",
                key, chirp.id
            )));
        }
    }

    let mut emails = HashSet::new();
    for (key, user) in &snapshot.users {
        if *key == 0 || *key != user.id {
            return Err(StoreError::read(format!(
                "user key {} does not match id {}",
                key, user.id
            )));
        }
        if !emails.insert(user.email.as_str()) {
            return Err(StoreError::read(format!("duplicate email for user {}", user.id)));
        }
    }
    Ok(())
}

/// Encode in memory, write a sibling temp file, then rename it over the
/// backing file. An encode failure leaves the file untouched.
fn persist(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let data = serde_json::to_vec(snapshot).map_err(StoreError::write)?;

    let tmp = temp_path(path);
    if let Err(e) = write_file(&tmp, &data).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::write(e));
    }

    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "database".into());
    name.push(".tmp");
    path.with_file_name(name)
}
