//! ACDM Storage Layer - File-Based Marketplace Snapshots
//!
//! The whole marketplace is kept in memory and written back after every
//! committed operation:
//! - `marketplace.bin` / `marketplace.json` hold the latest state
//! - `journal.json` lists every committed call with its receipt

pub mod error;
pub mod journal;
pub mod snapshot;
pub mod store;

pub use error::{Result, StorageError};
pub use journal::{Journal, JournalEntry};
pub use snapshot::SnapshotStore;
pub use store::MarketplaceStore;
