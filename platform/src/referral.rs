//! Referral lineage and per-account earnings

use acdm_core::{Address, Amount};
use serde::{Deserialize, Serialize};

/// Two-tier lineage captured once, at registration.
///
/// `referrer2` is the referrer's own tier-1 link at that moment and is never
/// re-derived afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralLink {
    pub referrer1: Address,
    pub referrer2: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsAccount {
    /// Referral cuts of referred accounts' purchases and sales
    pub referral_reward: Amount,
    /// Seller proceeds from filled orders, after referral cuts
    pub trade_profit: Amount,
}

impl EarningsAccount {
    pub fn is_empty(&self) -> bool {
        self.referral_reward == 0 && self.trade_profit == 0
    }
}
