//! Staking ledger: deposits, periodic rewards and governance vote locks

use crate::error::{Result, StakingError};
use crate::stake::Stake;
use acdm_core::{Address, Amount, AssetLedger, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    /// Freeze cycle length in seconds
    pub freezing_time: u64,
    /// Reward per full cycle, in percent of principal
    pub percents: Amount,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            freezing_time: crate::config::FREEZING_TIME,
            percents: crate::config::PERCENTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingLedger {
    /// Account holding the locked collateral; also the reward minter
    address: Address,
    /// Only caller allowed through the privileged setters and vote hooks
    governance: Address,
    config: StakingConfig,
    stakes: BTreeMap<Address, Stake>,
    total_staked: Amount,
}

impl StakingLedger {
    pub fn new(address: Address, governance: Address, config: StakingConfig) -> Self {
        Self {
            address,
            governance,
            config,
            stakes: BTreeMap::new(),
            total_staked: 0,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn governance(&self) -> &Address {
        &self.governance
    }

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    pub fn freezing_time(&self) -> u64 {
        self.config.freezing_time
    }

    pub fn percents(&self) -> Amount {
        self.config.percents
    }

    /// Quorum base for governance: everything currently locked.
    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    pub fn stake_of(&self, account: &Address) -> Option<&Stake> {
        self.stakes.get(account).filter(|stake| !stake.is_empty())
    }

    /// Vote weight of `account`; zero when it has no stake.
    pub fn principal_of(&self, account: &Address) -> Amount {
        self.stake_of(account).map(|stake| stake.principal).unwrap_or(0)
    }

    pub fn stakes(&self) -> impl Iterator<Item = (&Address, &Stake)> {
        self.stakes.iter().filter(|(_, stake)| !stake.is_empty())
    }

    /// Reward claimable by `account` at `now`, without any freeze-cycle check.
    pub fn pending_reward(&self, account: &Address, now: Timestamp) -> Amount {
        self.stake_of(account)
            .and_then(|stake| stake.payable(now, self.config.freezing_time, self.config.percents))
            .unwrap_or(0)
    }

    /// Lock `amount` of collateral from `caller`; requires a prior allowance.
    ///
    /// Topping up settles the reward accrued so far into `pending_reward`
    /// and restarts the freeze cycle from `now`.
    pub fn stake<L: AssetLedger + ?Sized>(
        &mut self,
        caller: &Address,
        amount: Amount,
        now: Timestamp,
        collateral: &mut L,
    ) -> Result<()> {
        if amount == 0 {
            return Err(StakingError::InvalidAmount("cannot stake zero".to_string()));
        }

        let current = self.stakes.get(caller).cloned().unwrap_or_default();
        let carried = if current.is_empty() {
            0
        } else {
            current
                .payable(now, self.config.freezing_time, self.config.percents)
                .ok_or(StakingError::Overflow)?
        };
        let principal = current
            .principal
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;

        collateral.transfer_from(&self.address, caller, &self.address, amount)?;

        self.stakes.insert(
            caller.clone(),
            Stake {
                principal,
                deposit_time: now,
                reward_paid: 0,
                pending_reward: carried,
                voting_lock: current.voting_lock,
            },
        );
        self.total_staked = total_staked;

        log::info!(
            "{} staked {} {} (principal {}, carried reward {})",
            caller,
            amount,
            collateral.symbol(),
            principal,
            carried
        );
        Ok(())
    }

    /// Mint the reward earned since the last claim.
    pub fn claim<L: AssetLedger + ?Sized>(
        &mut self,
        caller: &Address,
        now: Timestamp,
        reward: &mut L,
    ) -> Result<Amount> {
        let freezing_time = self.config.freezing_time;
        let percents = self.config.percents;
        let stake = self
            .stakes
            .get(caller)
            .filter(|stake| !stake.is_empty())
            .ok_or_else(|| StakingError::NoStake(caller.clone()))?;

        if stake.elapsed_cycles(now, freezing_time) == 0 {
            return Err(StakingError::StillFrozen {
                unlocks_at: stake.unlocks_at(freezing_time),
            });
        }

        let entitlement = stake
            .entitlement(now, freezing_time, percents)
            .ok_or(StakingError::Overflow)?;
        let payable = stake
            .payable(now, freezing_time, percents)
            .ok_or(StakingError::Overflow)?;
        if payable == 0 {
            return Err(StakingError::NoReward);
        }

        reward.mint(&self.address, caller, payable)?;

        if let Some(stake) = self.stakes.get_mut(caller) {
            stake.reward_paid = entitlement;
            stake.pending_reward = 0;
        }

        log::info!("{} claimed {} {}", caller, payable, reward.symbol());
        Ok(payable)
    }

    /// Return the whole principal and drop the stake record.
    pub fn unstake<L: AssetLedger + ?Sized>(
        &mut self,
        caller: &Address,
        now: Timestamp,
        collateral: &mut L,
    ) -> Result<Amount> {
        let stake = self
            .stakes
            .get(caller)
            .filter(|stake| !stake.is_empty())
            .ok_or_else(|| StakingError::NoStake(caller.clone()))?;

        if stake.elapsed_cycles(now, self.config.freezing_time) == 0 {
            return Err(StakingError::StillFrozen {
                unlocks_at: stake.unlocks_at(self.config.freezing_time),
            });
        }
        if stake.voting_lock > 0 {
            return Err(StakingError::LockedByVote(stake.voting_lock));
        }

        let principal = stake.principal;
        collateral.transfer(&self.address, caller, principal)?;

        self.stakes.remove(caller);
        self.total_staked -= principal;

        log::info!("{} unstaked {} {}", caller, principal, collateral.symbol());
        Ok(principal)
    }

    /// Governance hook: `account` cast a vote on an unfinished proposal.
    pub fn lock_vote(&mut self, caller: &Address, account: &Address) -> Result<u32> {
        self.ensure_governance(caller)?;
        let stake = self
            .stakes
            .get_mut(account)
            .filter(|stake| !stake.is_empty())
            .ok_or_else(|| StakingError::NoStake(account.clone()))?;
        stake.voting_lock += 1;
        Ok(stake.voting_lock)
    }

    /// Governance hook: a proposal `account` voted on has finished.
    pub fn release_vote(&mut self, caller: &Address, account: &Address) -> Result<u32> {
        self.ensure_governance(caller)?;
        match self.stakes.get_mut(account) {
            Some(stake) => {
                stake.voting_lock = stake.voting_lock.saturating_sub(1);
                Ok(stake.voting_lock)
            }
            None => {
                log::warn!("release_vote for {} without a stake record", account);
                Ok(0)
            }
        }
    }

    pub fn set_freezing_time(&mut self, caller: &Address, freezing_time: u64) -> Result<()> {
        self.ensure_governance(caller)?;
        if freezing_time == 0 {
            return Err(StakingError::InvalidAmount(
                "freezing time must be positive".to_string(),
            ));
        }
        log::info!(
            "freezing time changed {} -> {}",
            self.config.freezing_time,
            freezing_time
        );
        self.config.freezing_time = freezing_time;
        Ok(())
    }

    fn ensure_governance(&self, caller: &Address) -> Result<()> {
        if caller != &self.governance {
            return Err(StakingError::NotGovernance(caller.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acdm_core::{ErrorKind, TokenLedger};

    const WEEK: u64 = 604_800;
    const T: u64 = 1_700_000_000;

    struct Fixture {
        staking: StakingLedger,
        collateral: TokenLedger,
        reward: TokenLedger,
        dao: Address,
    }

    fn fixture(holders: &[(&str, Amount)]) -> Fixture {
        let dao = Address::from("dao");
        let pool = Address::from("pool");
        let staking = StakingLedger::new(
            Address::from("staking"),
            dao.clone(),
            StakingConfig::default(),
        );

        let mut collateral = TokenLedger::new("Uniswap V2", "UNI-V2", 18);
        collateral.grant_minter(pool.clone());
        for (holder, amount) in holders {
            let holder = Address::from(*holder);
            collateral.mint(&pool, &holder, *amount).unwrap();
            collateral.approve(&holder, staking.address(), *amount).unwrap();
        }

        let mut reward = TokenLedger::new("XXXToken", "XXX", 18);
        reward.grant_minter(staking.address().clone());

        Fixture {
            staking,
            collateral,
            reward,
            dao,
        }
    }

    #[test]
    fn test_claim_after_three_and_a_half_cycles() {
        let mut f = fixture(&[("alice", 100)]);
        let alice = Address::from("alice");

        f.staking.stake(&alice, 100, T, &mut f.collateral).unwrap();
        assert_eq!(f.collateral.balance_of(&alice), 0);
        assert_eq!(f.staking.total_staked(), 100);

        let at = T + WEEK * 7 / 2;
        let paid = f.staking.claim(&alice, at, &mut f.reward).unwrap();
        assert_eq!(paid, 9);
        assert_eq!(f.reward.balance_of(&alice), 9);

        let err = f.staking.claim(&alice, at, &mut f.reward).unwrap_err();
        assert!(matches!(err, StakingError::NoReward));
        assert_eq!(f.staking.stake_of(&alice).unwrap().reward_paid, 9);
    }

    #[test]
    fn test_claim_before_first_cycle_fails() {
        let mut f = fixture(&[("alice", 1_000)]);
        let alice = Address::from("alice");
        f.staking.stake(&alice, 1_000, T, &mut f.collateral).unwrap();

        let err = f.staking.claim(&alice, T + WEEK - 1, &mut f.reward).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Temporal);

        let err = f
            .staking
            .claim(&Address::from("bob"), T + WEEK, &mut f.reward)
            .unwrap_err();
        assert!(matches!(err, StakingError::NoStake(_)));
    }

    #[test]
    fn test_top_up_keeps_accrued_reward() {
        let mut f = fixture(&[("alice", 2_000)]);
        let alice = Address::from("alice");

        f.staking.stake(&alice, 1_000, T, &mut f.collateral).unwrap();
        // two cycles accrue 10 * 3 * 2 = 60 before the top-up
        f.staking
            .stake(&alice, 1_000, T + 2 * WEEK, &mut f.collateral)
            .unwrap();

        let stake = f.staking.stake_of(&alice).unwrap().clone();
        assert_eq!(stake.principal, 2_000);
        assert_eq!(stake.pending_reward, 60);
        assert_eq!(stake.deposit_time, T + 2 * WEEK);

        // one more cycle on the larger principal: 20 * 3 = 60, plus the carry
        let paid = f
            .staking
            .claim(&alice, T + 3 * WEEK, &mut f.reward)
            .unwrap();
        assert_eq!(paid, 120);
    }

    #[test]
    fn test_unstake_blocked_by_vote_lock() {
        let mut f = fixture(&[("alice", 500)]);
        let alice = Address::from("alice");
        f.staking.stake(&alice, 500, T, &mut f.collateral).unwrap();

        let dao = f.dao.clone();
        assert_eq!(f.staking.lock_vote(&dao, &alice).unwrap(), 1);

        let err = f
            .staking
            .unstake(&alice, T + WEEK, &mut f.collateral)
            .unwrap_err();
        assert!(matches!(err, StakingError::LockedByVote(1)));

        f.staking.release_vote(&dao, &alice).unwrap();
        let returned = f
            .staking
            .unstake(&alice, T + WEEK, &mut f.collateral)
            .unwrap();
        assert_eq!(returned, 500);
        assert_eq!(f.collateral.balance_of(&alice), 500);
        assert_eq!(f.staking.total_staked(), 0);

        let err = f
            .staking
            .unstake(&alice, T + WEEK, &mut f.collateral)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_privileged_calls_require_governance() {
        let mut f = fixture(&[("alice", 500)]);
        let alice = Address::from("alice");
        f.staking.stake(&alice, 500, T, &mut f.collateral).unwrap();

        let err = f.staking.set_freezing_time(&alice, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(f.staking.lock_vote(&alice, &alice).is_err());

        let dao = f.dao.clone();
        f.staking.set_freezing_time(&dao, 259_200).unwrap();
        assert_eq!(f.staking.freezing_time(), 259_200);
    }
}
