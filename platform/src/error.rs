//! Round engine error types

use crate::round::Phase;
use acdm_core::{Address, Amount, ErrorKind, LedgerError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Account {0} is already registered")]
    AlreadyRegistered(Address),

    #[error("An account cannot refer itself: {0}")]
    SelfReferral(Address),

    #[error("The sale round has already begun")]
    SaleAlreadyStarted,

    #[error("The trade round has already begun")]
    TradeAlreadyStarted,

    #[error("The {expected:?} round has not yet begun (current phase {current:?})")]
    PhaseNotOpen { expected: Phase, current: Phase },

    #[error("The time of the trade round is not over: ends at {ends_at}")]
    TradeNotFinished { ends_at: u64 },

    #[error("Sales round time is not over yet or not all tokens are sold out: ends at {ends_at}, {unsold} unsold")]
    SaleNotFinished { ends_at: u64, unsold: Amount },

    #[error("The time for the {0:?} round is over")]
    WindowElapsed(Phase),

    #[error("Congratulations! You bought 0 tokens")]
    ZeroPurchase,

    #[error("Not enough tokens left in this sale round: requested {requested}, available {available}")]
    InsufficientSupply { requested: Amount, available: Amount },

    #[error("No order with this ID: {0}")]
    OrderNotFound(u64),

    #[error("Order {0} is already closed")]
    OrderClosed(u64),

    #[error("There are not enough tokens in this order for that amount: requested {requested}, remaining {remaining}")]
    InsufficientOrderAmount { requested: Amount, remaining: Amount },

    #[error("Only the seller can cancel order {0}")]
    NotSeller(u64),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("You have no referral rewards")]
    NoReferralReward,

    #[error("You have no trade profit")]
    NoTradeProfit,

    #[error("You are not DAO: {0}")]
    NotGovernance(Address),

    #[error("Invalid reward rate: {0}")]
    InvalidRate(String),

    #[error("Amount overflow")]
    Overflow,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl PlatformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlatformError::SaleAlreadyStarted
            | PlatformError::TradeAlreadyStarted
            | PlatformError::PhaseNotOpen { .. }
            | PlatformError::TradeNotFinished { .. }
            | PlatformError::SaleNotFinished { .. }
            | PlatformError::WindowElapsed(_) => ErrorKind::Temporal,
            PlatformError::NotSeller(_) | PlatformError::NotGovernance(_) => {
                ErrorKind::Authorization
            }
            PlatformError::OrderNotFound(_) => ErrorKind::NotFound,
            PlatformError::ZeroPurchase
            | PlatformError::InsufficientSupply { .. }
            | PlatformError::InsufficientOrderAmount { .. }
            | PlatformError::NoReferralReward
            | PlatformError::NoTradeProfit => ErrorKind::Insufficient,
            PlatformError::AlreadyRegistered(_) | PlatformError::OrderClosed(_) => {
                ErrorKind::Duplicate
            }
            PlatformError::SelfReferral(_)
            | PlatformError::InvalidOrder(_)
            | PlatformError::InvalidRate(_)
            | PlatformError::Overflow => ErrorKind::Invalid,
            PlatformError::Ledger(e) => e.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
