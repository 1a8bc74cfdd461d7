//! ACDM marketplace node
//!
//! Wires the asset ledgers, the round engine, the staking ledger and the
//! DAO into one single-writer state. Every externally submitted operation
//! goes through [`Marketplace::apply`], which either commits entirely or
//! leaves the state exactly as it was.

pub mod config;
pub mod error;
pub mod handle;
pub mod marketplace;

pub use config::MarketplaceConfig;
pub use error::{MarketplaceError, Result};
pub use handle::MarketplaceHandle;
pub use marketplace::{AccountView, Asset, Call, Marketplace, Operation, Receipt};
