//! Per-account stake record and reward arithmetic

use acdm_core::{Amount, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub principal: Amount,
    pub deposit_time: Timestamp,
    /// Entitlement already paid out since `deposit_time`
    pub reward_paid: Amount,
    /// Reward accrued before the last top-up and not yet claimed
    pub pending_reward: Amount,
    /// Number of unfinished proposals this account has voted on
    pub voting_lock: u32,
}

impl Stake {
    pub fn is_empty(&self) -> bool {
        self.principal == 0
    }

    /// Full freeze cycles elapsed since the deposit.
    pub fn elapsed_cycles(&self, now: Timestamp, freezing_time: u64) -> u64 {
        if freezing_time == 0 {
            return 0;
        }
        now.saturating_sub(self.deposit_time) / freezing_time
    }

    pub fn unlocks_at(&self, freezing_time: u64) -> Timestamp {
        self.deposit_time.saturating_add(freezing_time)
    }

    /// `floor(principal / 100) * percents * elapsed_cycles`
    pub fn entitlement(&self, now: Timestamp, freezing_time: u64, percents: Amount) -> Option<Amount> {
        let cycles = Amount::from(self.elapsed_cycles(now, freezing_time));
        (self.principal / 100)
            .checked_mul(percents)?
            .checked_mul(cycles)
    }

    /// Claimable amount at `now`, including any carried reward.
    pub fn payable(&self, now: Timestamp, freezing_time: u64, percents: Amount) -> Option<Amount> {
        let entitlement = self.entitlement(now, freezing_time, percents)?;
        entitlement
            .saturating_sub(self.reward_paid)
            .checked_add(self.pending_reward)
    }
}
