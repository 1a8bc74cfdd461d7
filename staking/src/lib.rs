//! ACDM Staking Module
//!
//! Locks the collateral asset, pays periodic rewards in the reward asset and
//! serves as the vote-weight source for governance.

pub mod error;
pub mod ledger;
pub mod stake;

pub use error::{Result, StakingError};
pub use ledger::{StakingConfig, StakingLedger};
pub use stake::Stake;

/// Staking configuration defaults
pub mod config {
    /// Freeze cycle length (7 days)
    pub const FREEZING_TIME: u64 = 7 * acdm_core::constants::DAY;

    /// Reward per freeze cycle, in percent of principal
    pub const PERCENTS: u128 = 3;
}
