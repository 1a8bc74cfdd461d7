//! Round state, phase parity and bonding-curve arithmetic

use acdm_core::{Amount, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No sale phase has ever started
    Uninitialized,
    /// Odd round number: the engine sells newly minted supply
    Sale,
    /// Even round number: holders fill each other's orders
    Trade,
}

impl Phase {
    pub fn of(round_number: u64) -> Self {
        match round_number {
            0 => Phase::Uninitialized,
            n if n % 2 == 1 => Phase::Sale,
            _ => Phase::Trade,
        }
    }
}

/// Singleton round state owned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub number: u64,
    pub phase_start: Timestamp,
    /// Price of one full tradable unit in payment base units
    pub token_price: Amount,
    /// Minted for the current (or last) sale phase
    pub token_minted: Amount,
    /// Minted supply not yet sold in the current sale phase
    pub tokens_remaining: Amount,
    /// Payment collected by order fills since the last trade phase began
    pub trade_proceeds: Amount,
}

impl Round {
    pub fn new(initial_price: Amount, initial_trade_volume: Amount) -> Self {
        Self {
            number: 0,
            phase_start: 0,
            token_price: initial_price,
            token_minted: 0,
            tokens_remaining: 0,
            trade_proceeds: initial_trade_volume,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::of(self.number)
    }

    pub fn ends_at(&self, round_time: u64) -> Timestamp {
        self.phase_start.saturating_add(round_time)
    }

    pub fn window_open(&self, now: Timestamp, round_time: u64) -> bool {
        now < self.ends_at(round_time)
    }

    pub fn sold_out(&self) -> bool {
        self.tokens_remaining == 0
    }
}

/// Observable record written every time a phase starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub number: u64,
    pub phase: Phase,
    pub started_at: Timestamp,
    pub token_price: Amount,
    pub token_minted: Amount,
    /// Unsold supply destroyed when this phase began (trade phases only)
    pub burned: Amount,
}

/// `price * growth / 100 + increment`
pub fn next_price(price: Amount, growth_percent: Amount, increment: Amount) -> Option<Amount> {
    price
        .checked_mul(growth_percent)?
        .checked_div(100)?
        .checked_add(increment)
}

/// Tradable base units bought by `payment` at `price` per full unit.
pub fn tokens_for(payment: Amount, unit: Amount, price: Amount) -> Option<Amount> {
    payment.checked_mul(unit)?.checked_div(price)
}

/// `amount * rate / 1000`
pub fn permille(amount: Amount, rate: Amount) -> Option<Amount> {
    amount
        .checked_mul(rate)?
        .checked_div(acdm_core::constants::PERMILLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_parity() {
        assert_eq!(Phase::of(0), Phase::Uninitialized);
        assert_eq!(Phase::of(1), Phase::Sale);
        assert_eq!(Phase::of(2), Phase::Trade);
        assert_eq!(Phase::of(7), Phase::Sale);
    }

    #[test]
    fn test_price_grows_every_phase() {
        let mut price = crate::config::INITIAL_PRICE;
        for _ in 0..5 {
            let next = next_price(price, 103, crate::config::PRICE_INCREMENT).unwrap();
            assert!(next > price);
            price = next;
        }
        // 10^13 -> 1.43 * 10^13
        assert_eq!(next_price(10_000_000_000_000, 103, 4_000_000_000_000), Some(14_300_000_000_000));
    }

    #[test]
    fn test_first_mint_is_hundred_thousand_tokens() {
        let minted = tokens_for(crate::config::INITIAL_TRADE_VOLUME, 1_000_000, 10_000_000_000_000);
        assert_eq!(minted, Some(100_000 * 1_000_000));
    }

    #[test]
    fn test_window() {
        let round = Round {
            number: 1,
            phase_start: 100,
            ..Round::new(1, 1)
        };
        assert!(round.window_open(399, 300));
        assert!(!round.window_open(400, 300));
    }
}
