//! Staking error types

use acdm_core::{Address, ErrorKind, LedgerError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StakingError {
    #[error("You don't have a stake: {0}")]
    NoStake(Address),

    #[error("Freezing time has not yet passed: unlocks at {unlocks_at}")]
    StillFrozen { unlocks_at: u64 },

    #[error("You have no reward available for withdrawal")]
    NoReward,

    #[error("Tokens are still frozen in the DAO contract: {0} open votes")]
    LockedByVote(u32),

    #[error("You are not DAO: {0}")]
    NotGovernance(Address),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount overflow")]
    Overflow,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl StakingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StakingError::NoStake(_) => ErrorKind::NotFound,
            StakingError::StillFrozen { .. } | StakingError::LockedByVote(_) => ErrorKind::Temporal,
            StakingError::NoReward => ErrorKind::Insufficient,
            StakingError::NotGovernance(_) => ErrorKind::Authorization,
            StakingError::InvalidAmount(_) | StakingError::Overflow => ErrorKind::Invalid,
            StakingError::Ledger(e) => e.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StakingError>;
