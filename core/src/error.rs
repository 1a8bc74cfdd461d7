//! Ledger error types and the shared rejection taxonomy

use crate::types::{Address, Amount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a rejected operation.
///
/// Every rejection is terminal for the call that caused it and leaves the
/// engine untouched; the kind only tells the caller what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Phase or window not open yet, not elapsed yet, or already over
    Temporal,
    /// Caller lacks the privilege the operation requires
    Authorization,
    /// Unknown order, proposal or stake
    NotFound,
    /// Zero amounts, short balances, nothing to withdraw
    Insufficient,
    /// Repeated one-shot action (double vote, double finish, ...)
    Duplicate,
    /// Malformed argument or arithmetic overflow
    Invalid,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance of {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Insufficient allowance from {owner} to {spender}: required {required}, available {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        required: Amount,
        available: Amount,
    },

    #[error("{0} is not allowed to mint {1}")]
    NotMinter(Address, String),

    #[error("Amount overflow")]
    Overflow,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InsufficientBalance { .. } | LedgerError::InsufficientAllowance { .. } => {
                ErrorKind::Insufficient
            }
            LedgerError::NotMinter(..) => ErrorKind::Authorization,
            LedgerError::Overflow => ErrorKind::Invalid,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
