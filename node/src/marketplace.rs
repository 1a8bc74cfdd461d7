//! Single-writer marketplace state
//!
//! [`Marketplace`] owns the four asset ledgers and the three components.
//! Operations are tagged values carried in a [`Call`] together with the
//! caller and the substrate timestamp; [`Marketplace::apply`] is the only
//! write path.

use crate::config::MarketplaceConfig;
use crate::error::{MarketplaceError, Result};
use acdm_core::{Address, Amount, AssetLedger, Timestamp, TokenLedger};
use acdm_platform::{EarningsAccount, Phase, ReferralLink, RoundEngine};
use acdm_staking::{Stake, StakingLedger};
use governance::{Dao, ProposalOutcome, Target, Targets};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Asset {
    /// ACDM, sold in sale phases and traded in trade phases
    Tradable,
    /// LP tokens locked by the staking ledger
    Collateral,
    /// XXX, paid out as staking reward
    Reward,
    /// ETH, used to pay for purchases and fills
    Payment,
}

impl Asset {
    pub const ALL: [Asset; 4] = [Asset::Tradable, Asset::Collateral, Asset::Reward, Asset::Payment];
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Tradable => f.write_str("ACDM"),
            Asset::Collateral => f.write_str("UNI-V2"),
            Asset::Reward => f.write_str("XXX"),
            Asset::Payment => f.write_str("ETH"),
        }
    }
}

impl FromStr for Asset {
    type Err = MarketplaceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "acdm" | "tradable" => Ok(Asset::Tradable),
            "lp" | "uni-v2" | "collateral" => Ok(Asset::Collateral),
            "xxx" | "reward" => Ok(Asset::Reward),
            "eth" | "payment" => Ok(Asset::Payment),
            other => Err(MarketplaceError::Config(format!("unknown asset: {}", other))),
        }
    }
}

/// Externally submitted operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Register { referrer: Address },
    StartSaleRound,
    StartTradeRound,
    Buy { payment: Amount },
    AddOrder { amount: Amount, unit_cost: Amount },
    RedeemOrder { order_id: u64, payment: Amount },
    RemoveOrder { order_id: u64 },
    WithdrawReferralReward,
    WithdrawTradeProfit,
    Approve { asset: Asset, spender: Address, amount: Amount },
    Transfer { asset: Asset, to: Address, amount: Amount },
    /// Issue collateral or payment; only their configured issuers may
    Mint { asset: Asset, to: Address, amount: Amount },
    Stake { amount: Amount },
    Claim,
    Unstake,
    AddProposal {
        description: String,
        action_metadata: String,
        payload: Vec<u8>,
        target: Target,
    },
    Vote { proposal_id: u64, in_favor: bool },
    FinishProposal { proposal_id: u64 },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Register { .. } => "register",
            Operation::StartSaleRound => "start-sale-round",
            Operation::StartTradeRound => "start-trade-round",
            Operation::Buy { .. } => "buy",
            Operation::AddOrder { .. } => "add-order",
            Operation::RedeemOrder { .. } => "redeem",
            Operation::RemoveOrder { .. } => "remove-order",
            Operation::WithdrawReferralReward => "withdraw-referral",
            Operation::WithdrawTradeProfit => "withdraw-profit",
            Operation::Approve { .. } => "approve",
            Operation::Transfer { .. } => "transfer",
            Operation::Mint { .. } => "mint",
            Operation::Stake { .. } => "stake",
            Operation::Claim => "claim",
            Operation::Unstake => "unstake",
            Operation::AddProposal { .. } => "add-proposal",
            Operation::Vote { .. } => "vote",
            Operation::FinishProposal { .. } => "finish",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub caller: Address,
    pub timestamp: Timestamp,
    pub op: Operation,
}

impl Call {
    pub fn new(caller: impl Into<Address>, timestamp: Timestamp, op: Operation) -> Self {
        Self {
            caller: caller.into(),
            timestamp,
            op,
        }
    }
}

/// What a committed operation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Receipt {
    Registered(ReferralLink),
    RoundStarted {
        number: u64,
        phase: Phase,
        token_price: Amount,
        token_minted: Amount,
    },
    Bought { amount: Amount },
    OrderAdded { order_id: u64 },
    Redeemed { amount: Amount },
    OrderRemoved { returned: Amount },
    Withdrawn { amount: Amount },
    Approved,
    Transferred,
    Minted,
    Staked { principal: Amount },
    Claimed { amount: Amount },
    Unstaked { amount: Amount },
    ProposalAdded { proposal_id: u64 },
    Voted { weight: Amount },
    ProposalFinished(ProposalOutcome),
}

/// Read-only snapshot of everything tied to one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub account: Address,
    pub balances: Vec<(Asset, Amount)>,
    pub referral: Option<ReferralLink>,
    pub earnings: EarningsAccount,
    pub stake: Option<Stake>,
    pub pending_reward: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marketplace {
    config: MarketplaceConfig,
    tradable: TokenLedger,
    collateral: TokenLedger,
    reward: TokenLedger,
    payment: TokenLedger,
    platform: RoundEngine,
    staking: StakingLedger,
    dao: Dao,
    last_timestamp: Option<Timestamp>,
    applied: u64,
}

impl Marketplace {
    pub fn new(config: MarketplaceConfig) -> Result<Self> {
        config.validate()?;
        let accounts = config.accounts.clone();

        let mut tradable =
            TokenLedger::new("ACDMToken", "ACDM", config.platform.tradable_decimals);
        tradable.grant_minter(accounts.platform.clone());
        let mut collateral = TokenLedger::new("Uniswap V2", "UNI-V2", 18);
        collateral.grant_minter(accounts.liquidity_pool.clone());
        let mut reward = TokenLedger::new("XXXToken", "XXX", 18);
        reward.grant_minter(accounts.staking.clone());
        let mut payment = TokenLedger::new("Ether", "ETH", 18);
        payment.grant_minter(accounts.faucet.clone());

        let platform = RoundEngine::new(
            accounts.platform.clone(),
            accounts.dao.clone(),
            config.round_config(),
        );
        let staking = StakingLedger::new(
            accounts.staking.clone(),
            accounts.dao.clone(),
            config.staking_config(),
        );
        let dao = Dao::new(accounts.dao, accounts.chairman, config.dao_config());

        log::info!(
            "marketplace initialised: platform {}, staking {}, dao {}",
            platform.address(),
            staking.address(),
            dao.address()
        );

        Ok(Self {
            config,
            tradable,
            collateral,
            reward,
            payment,
            platform,
            staking,
            dao,
            last_timestamp: None,
            applied: 0,
        })
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    pub fn platform(&self) -> &RoundEngine {
        &self.platform
    }

    pub fn staking(&self) -> &StakingLedger {
        &self.staking
    }

    pub fn dao(&self) -> &Dao {
        &self.dao
    }

    pub fn ledger(&self, asset: Asset) -> &TokenLedger {
        match asset {
            Asset::Tradable => &self.tradable,
            Asset::Collateral => &self.collateral,
            Asset::Reward => &self.reward,
            Asset::Payment => &self.payment,
        }
    }

    fn ledger_mut(&mut self, asset: Asset) -> &mut TokenLedger {
        match asset {
            Asset::Tradable => &mut self.tradable,
            Asset::Collateral => &mut self.collateral,
            Asset::Reward => &mut self.reward,
            Asset::Payment => &mut self.payment,
        }
    }

    pub fn balance_of(&self, asset: Asset, account: &Address) -> Amount {
        self.ledger(asset).balance_of(account)
    }

    /// Timestamp of the last committed operation.
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.last_timestamp
    }

    /// Number of committed operations.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn account(&self, account: &Address, now: Timestamp) -> AccountView {
        AccountView {
            account: account.clone(),
            balances: Asset::ALL
                .iter()
                .map(|asset| (*asset, self.balance_of(*asset, account)))
                .collect(),
            referral: self.platform.referrals_of(account).cloned(),
            earnings: self.platform.earnings_of(account),
            stake: self.staking.stake_of(account).cloned(),
            pending_reward: self.staking.pending_reward(account, now),
        }
    }

    /// Apply `call` atomically: on any error the state is left untouched.
    pub fn apply(&mut self, call: Call) -> Result<Receipt> {
        if let Some(last) = self.last_timestamp {
            if call.timestamp < last {
                return Err(MarketplaceError::ClockRegression {
                    last,
                    now: call.timestamp,
                });
            }
        }

        if self.config.accounts.is_component(&call.caller) {
            return Err(MarketplaceError::ComponentCaller(call.caller));
        }

        let snapshot = self.clone();
        match self.execute(&call) {
            Ok(receipt) => {
                self.last_timestamp = Some(call.timestamp);
                self.applied += 1;
                log::debug!("{} by {} at {} committed", call.op.name(), call.caller, call.timestamp);
                Ok(receipt)
            }
            Err(e) => {
                *self = snapshot;
                log::debug!(
                    "{} by {} at {} rejected ({:?}): {}",
                    call.op.name(),
                    call.caller,
                    call.timestamp,
                    e.kind(),
                    e
                );
                Err(e)
            }
        }
    }

    fn execute(&mut self, call: &Call) -> Result<Receipt> {
        let caller = &call.caller;
        let now = call.timestamp;

        let receipt = match &call.op {
            Operation::Register { referrer } => {
                Receipt::Registered(self.platform.register(caller, referrer)?.clone())
            }
            Operation::StartSaleRound => {
                self.platform.start_sale_round(now, &mut self.tradable)?;
                self.round_started()
            }
            Operation::StartTradeRound => {
                self.platform.start_trade_round(now, &mut self.tradable)?;
                self.round_started()
            }
            Operation::Buy { payment } => Receipt::Bought {
                amount: self.platform.buy(
                    caller,
                    *payment,
                    now,
                    &mut self.tradable,
                    &mut self.payment,
                )?,
            },
            Operation::AddOrder { amount, unit_cost } => Receipt::OrderAdded {
                order_id: self
                    .platform
                    .add_order(caller, *amount, *unit_cost, now, &mut self.tradable)?,
            },
            Operation::RedeemOrder { order_id, payment } => Receipt::Redeemed {
                amount: self.platform.redeem_token(
                    caller,
                    *order_id,
                    *payment,
                    now,
                    &mut self.tradable,
                    &mut self.payment,
                )?,
            },
            Operation::RemoveOrder { order_id } => Receipt::OrderRemoved {
                returned: self
                    .platform
                    .remove_order(caller, *order_id, &mut self.tradable)?,
            },
            Operation::WithdrawReferralReward => Receipt::Withdrawn {
                amount: self
                    .platform
                    .withdraw_referral_reward(caller, &mut self.payment)?,
            },
            Operation::WithdrawTradeProfit => Receipt::Withdrawn {
                amount: self
                    .platform
                    .withdraw_trade_profit(caller, &mut self.payment)?,
            },
            Operation::Approve {
                asset,
                spender,
                amount,
            } => {
                self.ledger_mut(*asset).approve(caller, spender, *amount)?;
                Receipt::Approved
            }
            Operation::Transfer { asset, to, amount } => {
                self.ledger_mut(*asset).transfer(caller, to, *amount)?;
                Receipt::Transferred
            }
            Operation::Mint { asset, to, amount } => {
                if matches!(asset, Asset::Tradable | Asset::Reward) {
                    return Err(MarketplaceError::MintRestricted(*asset));
                }
                self.ledger_mut(*asset).mint(caller, to, *amount)?;
                Receipt::Minted
            }
            Operation::Stake { amount } => {
                self.staking.stake(caller, *amount, now, &mut self.collateral)?;
                Receipt::Staked {
                    principal: self.staking.principal_of(caller),
                }
            }
            Operation::Claim => Receipt::Claimed {
                amount: self.staking.claim(caller, now, &mut self.reward)?,
            },
            Operation::Unstake => Receipt::Unstaked {
                amount: self.staking.unstake(caller, now, &mut self.collateral)?,
            },
            Operation::AddProposal {
                description,
                action_metadata,
                payload,
                target,
            } => Receipt::ProposalAdded {
                proposal_id: self.dao.add_proposal(
                    caller,
                    description.as_str(),
                    action_metadata.as_str(),
                    payload.clone(),
                    *target,
                    now,
                )?,
            },
            Operation::Vote {
                proposal_id,
                in_favor,
            } => Receipt::Voted {
                weight: self
                    .dao
                    .vote(caller, *proposal_id, *in_favor, now, &mut self.staking)?,
            },
            Operation::FinishProposal { proposal_id } => {
                let outcome = self.dao.finish_proposal(
                    *proposal_id,
                    now,
                    Targets {
                        platform: &mut self.platform,
                        staking: &mut self.staking,
                    },
                )?;
                Receipt::ProposalFinished(outcome)
            }
        };
        Ok(receipt)
    }

    fn round_started(&self) -> Receipt {
        let round = self.platform.round();
        Receipt::RoundStarted {
            number: round.number,
            phase: round.phase(),
            token_price: round.token_price,
            token_minted: round.token_minted,
        }
    }
}
