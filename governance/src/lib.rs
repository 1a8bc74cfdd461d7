//! ACDM Governance Module
//!
//! Stake-weighted voting on proposals that carry an encoded parameter call
//! for the round engine or the staking ledger. A proposal executes only when
//! it both reaches quorum and has more weight in favour than against.

pub mod action;
pub mod dao;
pub mod error;
pub mod proposal;
pub mod voting;

pub use action::{ParameterCall, Target};
pub use dao::{Dao, DaoConfig, Targets};
pub use error::{GovernanceError, Result};
pub use proposal::{Proposal, ProposalOutcome};
pub use voting::{Ballot, Tally};

/// Governance configuration constants
pub mod config {
    /// Voting window (3 days)
    pub const VOTE_TIME: u64 = 3 * acdm_core::constants::DAY;

    /// Cast weight must exceed this share of the staked supply (percent)
    pub const QUORUM_PERCENT: u128 = 50;

    /// First proposal id handed out
    pub const FIRST_PROPOSAL_ID: u64 = 1;
}
