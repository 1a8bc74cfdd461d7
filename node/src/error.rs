//! Marketplace error types

use crate::marketplace::Asset;
use acdm_core::{Address, ErrorKind, LedgerError, Timestamp};
use acdm_platform::PlatformError;
use acdm_staking::StakingError;
use governance::GovernanceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketplaceError {
    #[error("Clock went backwards: last accepted {last}, got {now}")]
    ClockRegression { last: Timestamp, now: Timestamp },

    #[error("{0} is a component account and cannot originate calls")]
    ComponentCaller(Address),

    #[error("{0} can only be minted by its own component")]
    MintRestricted(Asset),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Staking(#[from] StakingError),

    #[error(transparent)]
    Governance(#[from] GovernanceError),
}

impl MarketplaceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketplaceError::ClockRegression { .. } => ErrorKind::Temporal,
            MarketplaceError::ComponentCaller(_) | MarketplaceError::MintRestricted(_) => {
                ErrorKind::Authorization
            }
            MarketplaceError::Config(_) | MarketplaceError::Io(_) => ErrorKind::Invalid,
            MarketplaceError::Ledger(e) => e.kind(),
            MarketplaceError::Platform(e) => e.kind(),
            MarketplaceError::Staking(e) => e.kind(),
            MarketplaceError::Governance(e) => e.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MarketplaceError>;
