//! Asset ledger state management
//!
//! The engine treats fungible-asset bookkeeping as an external collaborator.
//! `AssetLedger` is the narrow interface it consumes; `TokenLedger` is the
//! in-memory implementation used by the node, the CLI and the tests.

use crate::error::{LedgerError, Result};
use crate::types::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Balance store with mint, burn, transfer and allowance-based transfer.
pub trait AssetLedger {
    fn symbol(&self) -> &str;

    fn balance_of(&self, account: &Address) -> Amount;

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    fn total_supply(&self) -> Amount;

    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> Result<()>;

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()>;

    /// Move `amount` from `owner` to `to` on behalf of `spender`, consuming allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()>;

    /// Privileged: only registered minters may create supply.
    fn mint(&mut self, minter: &Address, to: &Address, amount: Amount) -> Result<()>;

    fn burn(&mut self, from: &Address, amount: Amount) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    name: String,
    symbol: String,
    decimals: u32,
    balances: BTreeMap<Address, Amount>,
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    minters: BTreeSet<Address>,
    total_supply: Amount,
}

impl TokenLedger {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u32) -> Self {
        TokenLedger {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            minters: BTreeSet::new(),
            total_supply: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn grant_minter(&mut self, account: Address) {
        self.minters.insert(account);
    }

    pub fn is_minter(&self, account: &Address) -> bool {
        self.minters.contains(account)
    }

    /// Non-zero balances, ordered by account.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, Amount)> {
        self.balances
            .iter()
            .filter(|(_, balance)| **balance > 0)
            .map(|(account, balance)| (account, *balance))
    }

    fn debit(&mut self, account: &Address, amount: Amount) -> Result<()> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: account.clone(),
                required: amount,
                available,
            });
        }
        self.balances.insert(account.clone(), available - amount);
        Ok(())
    }

    fn credit(&mut self, account: &Address, amount: Amount) -> Result<()> {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }
}

impl AssetLedger for TokenLedger {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> Result<()> {
        self.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        // Check the recipient side first so a failed credit never leaves a debit behind
        self.balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let available = self.allowance(owner, spender);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: owner.clone(),
                spender: spender.clone(),
                required: amount,
                available,
            });
        }
        self.transfer(owner, to, amount)?;
        self.approve(owner, spender, available - amount)
    }

    fn mint(&mut self, minter: &Address, to: &Address, amount: Amount) -> Result<()> {
        if !self.minters.contains(minter) {
            return Err(LedgerError::NotMinter(minter.clone(), self.symbol.clone()));
        }
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.credit(to, amount)?;
        self.total_supply = new_supply;
        log::debug!("{} minted {} {} to {}", minter, amount, self.symbol, to);
        Ok(())
    }

    fn burn(&mut self, from: &Address, amount: Amount) -> Result<()> {
        self.debit(from, amount)?;
        self.total_supply -= amount;
        Ok(())
    }
}
