//! Libris - library circulation engine
//!
//! A catalog of items with finite copies, a directory of borrowers with
//! per-role lending limits, and a ledger of what is currently out. The crate
//! covers the circulation state machine and its crash-safe snapshot
//! persistence; presentation layers drive it through the [`Catalog`] API.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod snapshot;

pub use catalog::Catalog;
pub use config::AppConfig;
pub use error::{AppError, AppResult, CirculationError};
pub use models::{Borrower, Item, Role};
pub use snapshot::SnapshotStore;
