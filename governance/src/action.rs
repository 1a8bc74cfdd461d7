//! Proposal payloads: a target component plus an encoded parameter call
//!
//! Payloads stay opaque bytes on the proposal. Only at execution time are
//! they decoded into one of the known setter calls and routed to the
//! component named by the proposal's target.

use crate::error::{GovernanceError, Result};
use acdm_core::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// The round engine
    Platform,
    /// The staking ledger
    Staking,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Platform => f.write_str("platform"),
            Target::Staking => f.write_str("staking"),
        }
    }
}

impl FromStr for Target {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "platform" => Ok(Target::Platform),
            "staking" => Ok(Target::Staking),
            other => Err(GovernanceError::InvalidCall(format!("unknown target: {}", other))),
        }
    }
}

/// Privileged setter calls a proposal may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterCall {
    SetSaleReward1(Amount),
    SetSaleReward2(Amount),
    SetTradeReward(Amount),
    SetFreezingTime(u64),
}

impl ParameterCall {
    /// Component that exposes this setter.
    pub fn target(&self) -> Target {
        match self {
            ParameterCall::SetSaleReward1(_)
            | ParameterCall::SetSaleReward2(_)
            | ParameterCall::SetTradeReward(_) => Target::Platform,
            ParameterCall::SetFreezingTime(_) => Target::Staking,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GovernanceError::InvalidCall(e.to_string()))
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        bincode::deserialize(payload).map_err(|e| GovernanceError::InvalidCall(e.to_string()))
    }

    /// Parse the `name=value` form, e.g. `set-trade-reward=30`.
    pub fn parse(s: &str) -> Result<Self> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| GovernanceError::InvalidCall(format!("expected name=value, got {}", s)))?;
        let value = value.trim();
        let invalid = |_| GovernanceError::InvalidCall(format!("invalid value: {}", value));

        match name.trim() {
            "set-sale-reward1" => Ok(ParameterCall::SetSaleReward1(value.parse().map_err(invalid)?)),
            "set-sale-reward2" => Ok(ParameterCall::SetSaleReward2(value.parse().map_err(invalid)?)),
            "set-trade-reward" => Ok(ParameterCall::SetTradeReward(value.parse().map_err(invalid)?)),
            "set-freezing-time" => Ok(ParameterCall::SetFreezingTime(
                value
                    .parse()
                    .map_err(|_| GovernanceError::InvalidCall(format!("invalid value: {}", value)))?,
            )),
            other => Err(GovernanceError::InvalidCall(format!("unknown call: {}", other))),
        }
    }
}

impl fmt::Display for ParameterCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterCall::SetSaleReward1(v) => write!(f, "set-sale-reward1={}", v),
            ParameterCall::SetSaleReward2(v) => write!(f, "set-sale-reward2={}", v),
            ParameterCall::SetTradeReward(v) => write!(f, "set-trade-reward={}", v),
            ParameterCall::SetFreezingTime(v) => write!(f, "set-freezing-time={}", v),
        }
    }
}

impl FromStr for ParameterCall {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self> {
        ParameterCall::parse(s)
    }
}
