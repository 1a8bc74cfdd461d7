//! ACDM Platform Module
//!
//! The round engine: alternating sale and trade phases for the tradable
//! asset, a bonding-curve price that rises every sale phase, a peer-to-peer
//! order book and a two-tier referral program.

pub mod engine;
pub mod error;
pub mod order;
pub mod referral;
pub mod round;

pub use engine::{RoundConfig, RoundEngine};
pub use error::{PlatformError, Result};
pub use order::Order;
pub use referral::{EarningsAccount, ReferralLink};
pub use round::{Phase, Round, RoundSummary};

/// Round engine configuration defaults
pub mod config {
    /// Length of each sale and trade phase (3 days)
    pub const ROUND_TIME: u64 = 3 * acdm_core::constants::DAY;

    /// Price before the first sale phase, chosen so the first phase sells at 10^13
    pub const INITIAL_PRICE: u128 = 5_825_242_718_447;

    /// Trade volume assumed before the first sale phase (1 payment unit)
    pub const INITIAL_TRADE_VOLUME: u128 = acdm_core::constants::PAYMENT_UNIT;

    /// Fixed increment added to the price every sale phase
    pub const PRICE_INCREMENT: u128 = 4_000_000_000_000;

    /// Multiplicative price growth per sale phase, in percent
    pub const PRICE_GROWTH_PERCENT: u128 = 103;

    /// Tier-1 referral cut of a sale-phase purchase (permille)
    pub const SALE_REWARD_1: u128 = 50;

    /// Tier-2 referral cut of a sale-phase purchase (permille)
    pub const SALE_REWARD_2: u128 = 30;

    /// Per-tier referral cut of a trade-phase fill (permille)
    pub const TRADE_REWARD: u128 = 25;
}
