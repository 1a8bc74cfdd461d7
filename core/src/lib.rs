//! ACDM Core Library
//!
//! Shared primitives for the marketplace engine: account addresses, amounts,
//! the asset ledger interface and the error taxonomy used by every component.

pub mod error;
pub mod state;
pub mod types;

// Re-export main types
pub use error::{ErrorKind, LedgerError};
pub use state::{AssetLedger, TokenLedger};
pub use types::{Address, Amount, Timestamp};

/// Engine-wide constants
pub mod constants {
    /// Decimals of the tradable asset
    pub const TRADABLE_DECIMALS: u32 = 6;

    /// One full unit of the tradable asset in base units (10^6)
    pub const TRADABLE_UNIT: u128 = 1_000_000;

    /// One full unit of the payment asset in base units (10^18)
    pub const PAYMENT_UNIT: u128 = 1_000_000_000_000_000_000;

    /// Denominator of every permille rate
    pub const PERMILLE: u128 = 1_000;

    /// Seconds in a day
    pub const DAY: u64 = 86_400;
}
