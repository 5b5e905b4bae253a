use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Input violates a stated constraint (e.g. an over-long chirp).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Uniqueness violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// The record exists but belongs to someone else.
    #[error("Not permitted")]
    Forbidden,

    #[error("Invalid refresh token")]
    InvalidToken,

    #[error("Refresh token expired")]
    ExpiredToken,

    /// The password changed between verification and the session write.
    #[error("Credentials changed")]
    CredentialsChanged,

    /// No id left above the largest stored one.
    #[error("{0} ids exhausted")]
    IdsExhausted(&'static str),

    /// I/O or decode failure while loading the snapshot.
    #[error("Store read failed: {0}")]
    Read(#[source] BoxError),

    /// I/O or encode failure while persisting the snapshot.
    #[error("Store write failed: {0}")]
    Write(#[source] BoxError),

    #[error("Password hashing failed")]
    Hash,

    /// Creating the backing file on open.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn read(e: impl Into<BoxError>) -> Self {
        Self::Read(e.into())
    }

    pub(crate) fn write(e: impl Into<BoxError>) -> Self {
        Self::Write(e.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
