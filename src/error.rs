//! Error types for the Libris circulation engine

use thiserror::Error;

/// Main application error type.
///
/// Only infrastructure problems surface here: I/O, configuration, and snapshot
/// format trouble that aborts a whole file. Circulation preconditions (limit
/// reached, item not found, no copies left) are not errors at the catalog
/// surface; those operations signal failure through `bool`/`Option` results
/// and the caller decides what to present.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Failed state transitions on a single item or borrower.
///
/// These carry the precise reason a circulation step was refused so the
/// catalog can log it; they never cross the catalog API boundary.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CirculationError {
    /// Every copy of the item is already out.
    #[error("no copies available")]
    NoCopiesAvailable,

    /// A return was attempted while every copy is already on the shelf.
    #[error("all copies already returned")]
    AllCopiesAlreadyReturned,

    /// The borrower does not hold the item.
    #[error("item not held by this borrower")]
    NotHeld,
}
