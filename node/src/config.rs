//! Marketplace configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no
//! file at all) yields the stock deployment. TOML integers are 64-bit, so
//! amounts are kept as `u64` here and widened when the components are built.

use crate::error::{MarketplaceError, Result};
use acdm_core::Address;
use acdm_platform::{RoundConfig, RoundEngine};
use acdm_staking::StakingConfig;
use governance::DaoConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    #[serde(default)]
    pub platform: PlatformSection,
    #[serde(default)]
    pub staking: StakingSection,
    #[serde(default)]
    pub governance: GovernanceSection,
    #[serde(default)]
    pub accounts: AccountsSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSection {
    pub round_time: u64,
    pub initial_price: u64,
    pub initial_trade_volume: u64,
    pub price_increment: u64,
    pub price_growth_percent: u64,
    pub tradable_decimals: u32,
    pub sale_reward1: u64,
    pub sale_reward2: u64,
    pub trade_reward: u64,
}

impl Default for PlatformSection {
    fn default() -> Self {
        Self {
            round_time: acdm_platform::config::ROUND_TIME,
            initial_price: acdm_platform::config::INITIAL_PRICE as u64,
            initial_trade_volume: acdm_platform::config::INITIAL_TRADE_VOLUME as u64,
            price_increment: acdm_platform::config::PRICE_INCREMENT as u64,
            price_growth_percent: acdm_platform::config::PRICE_GROWTH_PERCENT as u64,
            tradable_decimals: acdm_core::constants::TRADABLE_DECIMALS,
            sale_reward1: acdm_platform::config::SALE_REWARD_1 as u64,
            sale_reward2: acdm_platform::config::SALE_REWARD_2 as u64,
            trade_reward: acdm_platform::config::TRADE_REWARD as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingSection {
    pub freezing_time: u64,
    pub percents: u64,
}

impl Default for StakingSection {
    fn default() -> Self {
        Self {
            freezing_time: acdm_staking::config::FREEZING_TIME,
            percents: acdm_staking::config::PERCENTS as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceSection {
    pub vote_time: u64,
}

impl Default for GovernanceSection {
    fn default() -> Self {
        Self {
            vote_time: governance::config::VOTE_TIME,
        }
    }
}

/// Well-known accounts of the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsSection {
    pub platform: Address,
    pub staking: Address,
    pub dao: Address,
    /// Sole account allowed to open proposals
    pub chairman: Address,
    /// Issuer of the collateral asset (stands in for the liquidity pool)
    pub liquidity_pool: Address,
    /// Issuer of the payment asset
    pub faucet: Address,
}

impl Default for AccountsSection {
    fn default() -> Self {
        Self {
            platform: Address::from("acdm-platform"),
            staking: Address::from("staking"),
            dao: Address::from("dao"),
            chairman: Address::from("chairman"),
            liquidity_pool: Address::from("liquidity-pool"),
            faucet: Address::from("faucet"),
        }
    }
}

impl AccountsSection {
    /// Accounts owned by the platform, staking and governance components.
    pub fn is_component(&self, account: &Address) -> bool {
        [&self.platform, &self.staking, &self.dao].contains(&account)
    }
}

impl MarketplaceConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: MarketplaceConfig =
            toml::from_str(&contents).map_err(|e| MarketplaceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| MarketplaceError::Config(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("platform.round_time", self.platform.round_time),
            ("staking.freezing_time", self.staking.freezing_time),
            ("governance.vote_time", self.governance.vote_time),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(MarketplaceError::Config(format!("{} must be positive", name)));
            }
        }
        if self.platform.initial_price == 0 {
            return Err(MarketplaceError::Config(
                "platform.initial_price must be positive".to_string(),
            ));
        }
        // sale prices must rise every cycle
        let p = &self.platform;
        if p.price_growth_percent < 100 || (p.price_growth_percent == 100 && p.price_increment == 0) {
            return Err(MarketplaceError::Config(
                "platform.price_growth_percent must be at least 100, and above 100 without a price_increment"
                    .to_string(),
            ));
        }
        if self.platform.tradable_decimals > 18 {
            return Err(MarketplaceError::Config(
                "platform.tradable_decimals must not exceed 18".to_string(),
            ));
        }

        RoundEngine::check_rates(
            self.platform.sale_reward1.into(),
            self.platform.sale_reward2.into(),
            self.platform.trade_reward.into(),
        )
        .map_err(|e| MarketplaceError::Config(e.to_string()))?;

        let accounts = &self.accounts;
        let component_accounts = [&accounts.platform, &accounts.staking, &accounts.dao];
        for (i, a) in component_accounts.iter().enumerate() {
            if component_accounts[i + 1..].contains(a) {
                return Err(MarketplaceError::Config(format!(
                    "account {} is assigned to more than one component",
                    a
                )));
            }
        }
        Ok(())
    }

    pub fn round_config(&self) -> RoundConfig {
        let p = &self.platform;
        RoundConfig {
            round_time: p.round_time,
            initial_price: p.initial_price.into(),
            initial_trade_volume: p.initial_trade_volume.into(),
            price_increment: p.price_increment.into(),
            price_growth_percent: p.price_growth_percent.into(),
            token_unit: 10u128.pow(p.tradable_decimals),
            sale_reward1: p.sale_reward1.into(),
            sale_reward2: p.sale_reward2.into(),
            trade_reward: p.trade_reward.into(),
        }
    }

    pub fn staking_config(&self) -> StakingConfig {
        StakingConfig {
            freezing_time: self.staking.freezing_time,
            percents: self.staking.percents.into(),
        }
    }

    pub fn dao_config(&self) -> DaoConfig {
        DaoConfig {
            vote_time: self.governance.vote_time,
        }
    }
}
