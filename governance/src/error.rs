//! Governance error types

use acdm_core::{Address, ErrorKind};
use acdm_platform::PlatformError;
use acdm_staking::StakingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GovernanceError {
    #[error("You do not have permission to add proposal: {0}")]
    Unauthorized(Address),

    #[error("There is no vote with this id: {0}")]
    ProposalNotFound(u64),

    #[error("Voting time is over for proposal {0}")]
    VotingClosed(u64),

    #[error("Voting time is not over yet: proposal {id} ends at {ends_at}")]
    VotingNotOver { id: u64, ends_at: u64 },

    #[error("Voting is now over: proposal {0} already finished")]
    AlreadyFinished(u64),

    #[error("You did not make a deposit: {0}")]
    NoDeposit(Address),

    #[error("You already voted: {voter} on proposal {id}")]
    AlreadyVoted { voter: Address, id: u64 },

    #[error("Invalid proposal call: {0}")]
    InvalidCall(String),

    #[error(transparent)]
    Staking(#[from] StakingError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GovernanceError::Unauthorized(_) => ErrorKind::Authorization,
            GovernanceError::ProposalNotFound(_) | GovernanceError::NoDeposit(_) => {
                ErrorKind::NotFound
            }
            GovernanceError::VotingClosed(_) | GovernanceError::VotingNotOver { .. } => {
                ErrorKind::Temporal
            }
            GovernanceError::AlreadyFinished(_) | GovernanceError::AlreadyVoted { .. } => {
                ErrorKind::Duplicate
            }
            GovernanceError::InvalidCall(_) => ErrorKind::Invalid,
            GovernanceError::Staking(e) => e.kind(),
            GovernanceError::Platform(e) => e.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
