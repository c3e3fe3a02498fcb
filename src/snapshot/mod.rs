//! Snapshot persistence: record codec and atomic file store

pub mod codec;
pub mod store;

pub use store::SnapshotStore;
