//! Round engine: phase transitions, sales, order book and referral payouts
//!
//! Every operation validates first and touches the asset ledgers last, so a
//! rejected call leaves both the engine and the ledgers untouched. The only
//! ledger call that can fail after a state-changing one is a payout from the
//! engine's own balance, which the engine's bookkeeping always covers.

use crate::error::{PlatformError, Result};
use crate::order::Order;
use crate::referral::{EarningsAccount, ReferralLink};
use crate::round::{self, Phase, Round, RoundSummary};
use acdm_core::{Address, Amount, AssetLedger, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Length of each phase in seconds
    pub round_time: u64,
    pub initial_price: Amount,
    pub initial_trade_volume: Amount,
    pub price_increment: Amount,
    pub price_growth_percent: Amount,
    /// Base units in one full tradable unit
    pub token_unit: Amount,
    pub sale_reward1: Amount,
    pub sale_reward2: Amount,
    pub trade_reward: Amount,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            round_time: crate::config::ROUND_TIME,
            initial_price: crate::config::INITIAL_PRICE,
            initial_trade_volume: crate::config::INITIAL_TRADE_VOLUME,
            price_increment: crate::config::PRICE_INCREMENT,
            price_growth_percent: crate::config::PRICE_GROWTH_PERCENT,
            token_unit: acdm_core::constants::TRADABLE_UNIT,
            sale_reward1: crate::config::SALE_REWARD_1,
            sale_reward2: crate::config::SALE_REWARD_2,
            trade_reward: crate::config::TRADE_REWARD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundEngine {
    /// Account holding minted supply, listed orders and collected payments
    address: Address,
    /// Only caller allowed through the reward setters
    governance: Address,
    config: RoundConfig,
    round: Round,
    referrals: BTreeMap<Address, ReferralLink>,
    orders: Vec<Order>,
    earnings: BTreeMap<Address, EarningsAccount>,
    /// Tradable units locked in open orders
    committed: Amount,
    /// Unwithdrawn referral rewards across all accounts
    referral_owed: Amount,
    /// Unwithdrawn trade profit across all accounts
    trade_owed: Amount,
    /// Payment kept by the platform: sale remainders and unassigned referral cuts
    revenue: Amount,
    history: Vec<RoundSummary>,
}

impl RoundEngine {
    pub fn new(address: Address, governance: Address, config: RoundConfig) -> Self {
        let round = Round::new(config.initial_price, config.initial_trade_volume);
        Self {
            address,
            governance,
            config,
            round,
            referrals: BTreeMap::new(),
            orders: Vec::new(),
            earnings: BTreeMap::new(),
            committed: 0,
            referral_owed: 0,
            trade_owed: 0,
            revenue: 0,
            history: Vec::new(),
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn governance(&self) -> &Address {
        &self.governance
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn phase(&self) -> Phase {
        self.round.phase()
    }

    pub fn sale_reward1(&self) -> Amount {
        self.config.sale_reward1
    }

    pub fn sale_reward2(&self) -> Amount {
        self.config.sale_reward2
    }

    pub fn trade_reward(&self) -> Amount {
        self.config.trade_reward
    }

    pub fn referrals_of(&self, account: &Address) -> Option<&ReferralLink> {
        self.referrals.get(account)
    }

    pub fn earnings_of(&self, account: &Address) -> EarningsAccount {
        self.earnings.get(account).cloned().unwrap_or_default()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order(&self, id: u64) -> Option<&Order> {
        usize::try_from(id).ok().and_then(|index| self.orders.get(index))
    }

    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|order| !order.is_closed())
    }

    pub fn committed(&self) -> Amount {
        self.committed
    }

    pub fn referral_owed(&self) -> Amount {
        self.referral_owed
    }

    pub fn trade_owed(&self) -> Amount {
        self.trade_owed
    }

    pub fn revenue(&self) -> Amount {
        self.revenue
    }

    pub fn history(&self) -> &[RoundSummary] {
        &self.history
    }

    // ---------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------

    /// Bind `caller` to `referrer`, capturing the referrer's own tier-1 link.
    pub fn register(&mut self, caller: &Address, referrer: &Address) -> Result<&ReferralLink> {
        if self.referrals.contains_key(caller) {
            return Err(PlatformError::AlreadyRegistered(caller.clone()));
        }
        if caller == referrer {
            return Err(PlatformError::SelfReferral(caller.clone()));
        }

        let link = ReferralLink {
            referrer1: referrer.clone(),
            referrer2: self
                .referrals
                .get(referrer)
                .map(|parent| parent.referrer1.clone()),
        };
        log::info!(
            "{} registered with referrer {} (second tier {:?})",
            caller,
            link.referrer1,
            link.referrer2.as_ref().map(Address::as_str)
        );
        Ok(self.referrals.entry(caller.clone()).or_insert(link))
    }

    // ---------------------------------------------------------------
    // Phase transitions
    // ---------------------------------------------------------------

    /// Raise the price, mint supply sized by the last trade phase and open a sale phase.
    pub fn start_sale_round<L: AssetLedger + ?Sized>(
        &mut self,
        now: Timestamp,
        tradable: &mut L,
    ) -> Result<&Round> {
        match self.round.phase() {
            Phase::Sale => return Err(PlatformError::SaleAlreadyStarted),
            Phase::Trade if self.round.window_open(now, self.config.round_time) => {
                return Err(PlatformError::TradeNotFinished {
                    ends_at: self.round.ends_at(self.config.round_time),
                });
            }
            Phase::Trade | Phase::Uninitialized => {}
        }

        let price = round::next_price(
            self.round.token_price,
            self.config.price_growth_percent,
            self.config.price_increment,
        )
        .ok_or(PlatformError::Overflow)?;
        let minted = round::tokens_for(self.round.trade_proceeds, self.config.token_unit, price)
            .ok_or(PlatformError::Overflow)?;

        if minted > 0 {
            tradable.mint(&self.address, &self.address, minted)?;
        }

        self.round.number += 1;
        self.round.phase_start = now;
        self.round.token_price = price;
        self.round.token_minted = minted;
        self.round.tokens_remaining = minted;
        self.record(0);

        log::info!(
            "sale round {} started: price {}, minted {} {}",
            self.round.number,
            price,
            minted,
            tradable.symbol()
        );
        Ok(&self.round)
    }

    /// Close the sale phase, burn unsold supply and open a trade phase.
    pub fn start_trade_round<L: AssetLedger + ?Sized>(
        &mut self,
        now: Timestamp,
        tradable: &mut L,
    ) -> Result<&Round> {
        match self.round.phase() {
            Phase::Trade => return Err(PlatformError::TradeAlreadyStarted),
            Phase::Uninitialized => {
                return Err(PlatformError::PhaseNotOpen {
                    expected: Phase::Sale,
                    current: Phase::Uninitialized,
                });
            }
            Phase::Sale => {}
        }
        if self.round.window_open(now, self.config.round_time) && !self.round.sold_out() {
            return Err(PlatformError::SaleNotFinished {
                ends_at: self.round.ends_at(self.config.round_time),
                unsold: self.round.tokens_remaining,
            });
        }

        let burned = tradable
            .balance_of(&self.address)
            .saturating_sub(self.committed);
        if burned > 0 {
            tradable.burn(&self.address, burned)?;
        }

        self.round.number += 1;
        self.round.phase_start = now;
        self.round.tokens_remaining = 0;
        self.round.trade_proceeds = 0;
        self.record(burned);

        log::info!(
            "trade round {} started: burned {} unsold {}",
            self.round.number,
            burned,
            tradable.symbol()
        );
        Ok(&self.round)
    }

    // ---------------------------------------------------------------
    // Sale phase
    // ---------------------------------------------------------------

    /// Buy minted supply at the current price; returns the tradable units bought.
    pub fn buy<L: AssetLedger + ?Sized>(
        &mut self,
        caller: &Address,
        payment: Amount,
        now: Timestamp,
        tradable: &mut L,
        currency: &mut L,
    ) -> Result<Amount> {
        self.ensure_window(Phase::Sale, now)?;

        let tokens = round::tokens_for(payment, self.config.token_unit, self.round.token_price)
            .ok_or(PlatformError::Overflow)?;
        if tokens == 0 {
            return Err(PlatformError::ZeroPurchase);
        }
        if tokens > self.round.tokens_remaining {
            return Err(PlatformError::InsufficientSupply {
                requested: tokens,
                available: self.round.tokens_remaining,
            });
        }

        let link = self.referrals.get(caller).cloned();
        let cut1 = match &link {
            Some(_) => round::permille(payment, self.config.sale_reward1).ok_or(PlatformError::Overflow)?,
            None => 0,
        };
        let cut2 = match link.as_ref().and_then(|l| l.referrer2.as_ref()) {
            Some(_) => round::permille(payment, self.config.sale_reward2).ok_or(PlatformError::Overflow)?,
            None => 0,
        };
        let retained = payment
            .checked_sub(cut1)
            .and_then(|rest| rest.checked_sub(cut2))
            .ok_or(PlatformError::Overflow)?;

        currency.transfer(caller, &self.address, payment)?;
        tradable.transfer(&self.address, caller, tokens)?;

        self.round.tokens_remaining -= tokens;
        if let Some(link) = link {
            self.credit_referral(&link.referrer1, cut1);
            if let Some(referrer2) = &link.referrer2 {
                self.credit_referral(referrer2, cut2);
            }
        }
        self.revenue += retained;

        log::info!(
            "{} bought {} {} for {} (referral cuts {} / {})",
            caller,
            tokens,
            tradable.symbol(),
            payment,
            cut1,
            cut2
        );
        if self.round.sold_out() {
            log::info!("sale round {} sold out", self.round.number);
        }
        Ok(tokens)
    }

    // ---------------------------------------------------------------
    // Trade phase
    // ---------------------------------------------------------------

    /// List `amount` tradable units at `unit_cost` per full unit; requires an allowance.
    pub fn add_order<L: AssetLedger + ?Sized>(
        &mut self,
        caller: &Address,
        amount: Amount,
        unit_cost: Amount,
        now: Timestamp,
        tradable: &mut L,
    ) -> Result<u64> {
        self.ensure_window(Phase::Trade, now)?;
        if amount == 0 {
            return Err(PlatformError::InvalidOrder("amount must be positive".to_string()));
        }
        if unit_cost == 0 {
            return Err(PlatformError::InvalidOrder("unit cost must be positive".to_string()));
        }
        let committed = self
            .committed
            .checked_add(amount)
            .ok_or(PlatformError::Overflow)?;

        tradable.transfer_from(&self.address, caller, &self.address, amount)?;

        let id = self.orders.len() as u64;
        self.orders.push(Order {
            id,
            seller: caller.clone(),
            amount,
            remaining_amount: amount,
            unit_cost,
            created_at: now,
            round: self.round.number,
        });
        self.committed = committed;

        log::info!(
            "order {} placed by {}: {} {} at {}",
            id,
            caller,
            amount,
            tradable.symbol(),
            unit_cost
        );
        Ok(id)
    }

    /// Fill part of an order; returns the tradable units delivered.
    pub fn redeem_token<L: AssetLedger + ?Sized>(
        &mut self,
        caller: &Address,
        order_id: u64,
        payment: Amount,
        now: Timestamp,
        tradable: &mut L,
        currency: &mut L,
    ) -> Result<Amount> {
        self.ensure_window(Phase::Trade, now)?;

        let order = self
            .order(order_id)
            .ok_or(PlatformError::OrderNotFound(order_id))?;
        if order.is_closed() {
            return Err(PlatformError::OrderClosed(order_id));
        }
        let tokens = round::tokens_for(payment, self.config.token_unit, order.unit_cost)
            .ok_or(PlatformError::Overflow)?;
        if tokens == 0 {
            return Err(PlatformError::ZeroPurchase);
        }
        if tokens > order.remaining_amount {
            return Err(PlatformError::InsufficientOrderAmount {
                requested: tokens,
                remaining: order.remaining_amount,
            });
        }
        let seller = order.seller.clone();

        // Both tiers are always deducted from the seller; an absent tier's cut stays with the platform
        let cut = round::permille(payment, self.config.trade_reward).ok_or(PlatformError::Overflow)?;
        let profit = payment
            .checked_sub(cut)
            .and_then(|rest| rest.checked_sub(cut))
            .ok_or(PlatformError::Overflow)?;
        let proceeds = self
            .round
            .trade_proceeds
            .checked_add(payment)
            .ok_or(PlatformError::Overflow)?;

        currency.transfer(caller, &self.address, payment)?;
        tradable.transfer(&self.address, caller, tokens)?;

        if let Some(order) = self.orders.get_mut(order_id as usize) {
            order.remaining_amount -= tokens;
        }
        self.committed -= tokens;
        self.round.trade_proceeds = proceeds;

        let link = self.referrals.get(&seller).cloned();
        match link.as_ref().map(|l| &l.referrer1) {
            Some(referrer1) => self.credit_referral(referrer1, cut),
            None => self.revenue += cut,
        }
        match link.as_ref().and_then(|l| l.referrer2.as_ref()) {
            Some(referrer2) => self.credit_referral(referrer2, cut),
            None => self.revenue += cut,
        }
        self.earnings.entry(seller.clone()).or_default().trade_profit += profit;
        self.trade_owed += profit;

        log::info!(
            "{} redeemed {} {} from order {} for {} (seller {} earns {})",
            caller,
            tokens,
            tradable.symbol(),
            order_id,
            payment,
            seller,
            profit
        );
        Ok(tokens)
    }

    /// Cancel an order and return whatever is left of it to the seller.
    pub fn remove_order<L: AssetLedger + ?Sized>(
        &mut self,
        caller: &Address,
        order_id: u64,
        tradable: &mut L,
    ) -> Result<Amount> {
        let order = self
            .order(order_id)
            .ok_or(PlatformError::OrderNotFound(order_id))?;
        if &order.seller != caller {
            return Err(PlatformError::NotSeller(order_id));
        }
        if order.is_closed() {
            return Err(PlatformError::OrderClosed(order_id));
        }
        let remaining = order.remaining_amount;

        tradable.transfer(&self.address, caller, remaining)?;

        if let Some(order) = self.orders.get_mut(order_id as usize) {
            order.remaining_amount = 0;
        }
        self.committed -= remaining;

        log::info!("order {} cancelled, {} returned to {}", order_id, remaining, caller);
        Ok(remaining)
    }

    // ---------------------------------------------------------------
    // Earnings
    // ---------------------------------------------------------------

    pub fn withdraw_referral_reward<L: AssetLedger + ?Sized>(
        &mut self,
        caller: &Address,
        currency: &mut L,
    ) -> Result<Amount> {
        let amount = self.earnings_of(caller).referral_reward;
        if amount == 0 {
            return Err(PlatformError::NoReferralReward);
        }

        currency.transfer(&self.address, caller, amount)?;

        if let Some(account) = self.earnings.get_mut(caller) {
            account.referral_reward = 0;
        }
        self.referral_owed -= amount;
        log::info!("{} withdrew referral reward {}", caller, amount);
        Ok(amount)
    }

    pub fn withdraw_trade_profit<L: AssetLedger + ?Sized>(
        &mut self,
        caller: &Address,
        currency: &mut L,
    ) -> Result<Amount> {
        let amount = self.earnings_of(caller).trade_profit;
        if amount == 0 {
            return Err(PlatformError::NoTradeProfit);
        }

        currency.transfer(&self.address, caller, amount)?;

        if let Some(account) = self.earnings.get_mut(caller) {
            account.trade_profit = 0;
        }
        self.trade_owed -= amount;
        log::info!("{} withdrew trade profit {}", caller, amount);
        Ok(amount)
    }

    // ---------------------------------------------------------------
    // Governance setters
    // ---------------------------------------------------------------

    pub fn set_sale_reward1(&mut self, caller: &Address, rate: Amount) -> Result<()> {
        self.ensure_governance(caller)?;
        Self::check_rates(rate, self.config.sale_reward2, self.config.trade_reward)?;
        log::info!("sale reward 1 changed {} -> {}", self.config.sale_reward1, rate);
        self.config.sale_reward1 = rate;
        Ok(())
    }

    pub fn set_sale_reward2(&mut self, caller: &Address, rate: Amount) -> Result<()> {
        self.ensure_governance(caller)?;
        Self::check_rates(self.config.sale_reward1, rate, self.config.trade_reward)?;
        log::info!("sale reward 2 changed {} -> {}", self.config.sale_reward2, rate);
        self.config.sale_reward2 = rate;
        Ok(())
    }

    pub fn set_trade_reward(&mut self, caller: &Address, rate: Amount) -> Result<()> {
        self.ensure_governance(caller)?;
        Self::check_rates(self.config.sale_reward1, self.config.sale_reward2, rate)?;
        log::info!("trade reward changed {} -> {}", self.config.trade_reward, rate);
        self.config.trade_reward = rate;
        Ok(())
    }

    /// Referral cuts must never exceed the payment they are taken from.
    pub fn check_rates(sale_reward1: Amount, sale_reward2: Amount, trade_reward: Amount) -> Result<()> {
        let permille = acdm_core::constants::PERMILLE;
        if sale_reward1.saturating_add(sale_reward2) > permille {
            return Err(PlatformError::InvalidRate(format!(
                "sale rewards {} + {} exceed {}",
                sale_reward1, sale_reward2, permille
            )));
        }
        if trade_reward.saturating_mul(2) > permille {
            return Err(PlatformError::InvalidRate(format!(
                "trade reward 2 x {} exceeds {}",
                trade_reward, permille
            )));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    fn ensure_governance(&self, caller: &Address) -> Result<()> {
        if caller != &self.governance {
            return Err(PlatformError::NotGovernance(caller.clone()));
        }
        Ok(())
    }

    fn ensure_window(&self, expected: Phase, now: Timestamp) -> Result<()> {
        let current = self.round.phase();
        if current != expected {
            return Err(PlatformError::PhaseNotOpen { expected, current });
        }
        if !self.round.window_open(now, self.config.round_time) {
            return Err(PlatformError::WindowElapsed(expected));
        }
        Ok(())
    }

    fn credit_referral(&mut self, referrer: &Address, amount: Amount) {
        if amount == 0 {
            return;
        }
        self.earnings.entry(referrer.clone()).or_default().referral_reward += amount;
        self.referral_owed += amount;
    }

    fn record(&mut self, burned: Amount) {
        self.history.push(RoundSummary {
            number: self.round.number,
            phase: self.round.phase(),
            started_at: self.round.phase_start,
            token_price: self.round.token_price,
            token_minted: self.round.token_minted,
            burned,
        });
    }
}
