//! Proposal lifecycle: creation, stake-weighted voting and finishing
//!
//! A proposal moves from open to closed exactly once. Finishing releases
//! the vote locks taken on every voter's stake and, when the proposal
//! reached quorum and passed, dispatches its call to the target component.

use crate::action::{ParameterCall, Target};
use crate::error::{GovernanceError, Result};
use crate::proposal::{Proposal, ProposalOutcome};
use crate::voting::Ballot;
use acdm_core::{Address, Amount, Timestamp};
use acdm_platform::RoundEngine;
use acdm_staking::StakingLedger;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoConfig {
    /// Voting window in seconds
    pub vote_time: u64,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            vote_time: crate::config::VOTE_TIME,
        }
    }
}

/// Components a finished proposal may call into.
pub struct Targets<'a> {
    pub platform: &'a mut RoundEngine,
    pub staking: &'a mut StakingLedger,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dao {
    address: Address,
    chairman: Address,
    config: DaoConfig,
    proposals: Vec<Proposal>,
    outcomes: Vec<ProposalOutcome>,
}

impl Dao {
    pub fn new(address: Address, chairman: Address, config: DaoConfig) -> Self {
        Self {
            address,
            chairman,
            config,
            proposals: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn chairman(&self) -> &Address {
        &self.chairman
    }

    pub fn config(&self) -> &DaoConfig {
        &self.config
    }

    pub fn proposal(&self, id: u64) -> Result<&Proposal> {
        self.index_of(id).map(|index| &self.proposals[index])
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn outcomes(&self) -> &[ProposalOutcome] {
        &self.outcomes
    }

    /// Open a new proposal; only the chairman may propose.
    pub fn add_proposal(
        &mut self,
        caller: &Address,
        description: impl Into<String>,
        action_metadata: impl Into<String>,
        payload: Vec<u8>,
        target: Target,
        now: Timestamp,
    ) -> Result<u64> {
        if caller != &self.chairman {
            return Err(GovernanceError::Unauthorized(caller.clone()));
        }

        let id = crate::config::FIRST_PROPOSAL_ID + self.proposals.len() as u64;
        let proposal = Proposal::new(
            id,
            description.into(),
            action_metadata.into(),
            payload,
            target,
            now,
            self.config.vote_time,
        );
        log::info!(
            "proposal {} opened for {} until {}: {}",
            id,
            target,
            proposal.end_time,
            proposal.description
        );
        self.proposals.push(proposal);
        Ok(id)
    }

    /// Cast `caller`'s staked principal for or against proposal `id`.
    pub fn vote(
        &mut self,
        caller: &Address,
        id: u64,
        in_favor: bool,
        now: Timestamp,
        staking: &mut StakingLedger,
    ) -> Result<Amount> {
        let index = self.index_of(id)?;
        let proposal = &self.proposals[index];

        if now >= proposal.end_time {
            return Err(GovernanceError::VotingClosed(id));
        }
        if proposal.closed {
            return Err(GovernanceError::AlreadyFinished(id));
        }
        let weight = staking.principal_of(caller);
        if weight == 0 {
            return Err(GovernanceError::NoDeposit(caller.clone()));
        }
        if proposal.has_voted(caller) {
            return Err(GovernanceError::AlreadyVoted {
                voter: caller.clone(),
                id,
            });
        }

        staking.lock_vote(&self.address, caller)?;

        let ballot = Ballot {
            voter: caller.clone(),
            in_favor,
            weight,
            timestamp: now,
        };
        let proposal = &mut self.proposals[index];
        proposal.tally.add(&ballot);
        proposal.ballots.insert(caller.clone(), ballot);

        log::debug!(
            "{} voted {} on proposal {} with weight {}",
            caller,
            if in_favor { "for" } else { "against" },
            id,
            weight
        );
        Ok(weight)
    }

    /// Close proposal `id` and execute it if it reached quorum and passed.
    ///
    /// A failed execution is recorded in the outcome; it does not make the
    /// finish itself fail.
    pub fn finish_proposal(
        &mut self,
        id: u64,
        now: Timestamp,
        targets: Targets<'_>,
    ) -> Result<ProposalOutcome> {
        let index = self.index_of(id)?;
        let proposal = &self.proposals[index];

        if proposal.closed {
            return Err(GovernanceError::AlreadyFinished(id));
        }
        if now < proposal.end_time {
            return Err(GovernanceError::VotingNotOver {
                id,
                ends_at: proposal.end_time,
            });
        }

        let voters: Vec<Address> = proposal.voters().cloned().collect();
        for voter in &voters {
            targets.staking.release_vote(&self.address, voter)?;
        }

        let quorum_base = targets.staking.total_staked();
        let quorum_reached = proposal.tally.quorum_reached(quorum_base);
        let passed = proposal.tally.passed();

        let execution = if quorum_reached && passed {
            Some(self.execute(&proposal.payload, proposal.target, targets))
        } else {
            None
        };
        let execution_error = match &execution {
            Some(Err(e)) => Some(e.to_string()),
            _ => None,
        };

        let proposal = &mut self.proposals[index];
        let outcome = ProposalOutcome {
            proposal_id: id,
            description: proposal.description.clone(),
            quorum_reached,
            passed,
            execution_succeeded: matches!(execution, Some(Ok(_))),
            finished_at: now,
            execution_error,
        };
        proposal.closed = true;
        proposal.quorum_base = Some(quorum_base);
        proposal.outcome = Some(outcome.clone());
        self.outcomes.push(outcome.clone());

        log::info!(
            "proposal {} finished: quorum={} passed={} executed={}",
            id,
            outcome.quorum_reached,
            outcome.passed,
            outcome.execution_succeeded
        );
        if let Some(error) = &outcome.execution_error {
            log::warn!("proposal {} execution failed: {}", id, error);
        }
        Ok(outcome)
    }

    fn execute(&self, payload: &[u8], target: Target, targets: Targets<'_>) -> Result<ParameterCall> {
        let call = ParameterCall::decode(payload)?;
        if call.target() != target {
            return Err(GovernanceError::InvalidCall(format!(
                "{} is not exposed by {}",
                call, target
            )));
        }

        let caller = &self.address;
        match call {
            ParameterCall::SetSaleReward1(rate) => targets.platform.set_sale_reward1(caller, rate)?,
            ParameterCall::SetSaleReward2(rate) => targets.platform.set_sale_reward2(caller, rate)?,
            ParameterCall::SetTradeReward(rate) => targets.platform.set_trade_reward(caller, rate)?,
            ParameterCall::SetFreezingTime(seconds) => targets.staking.set_freezing_time(caller, seconds)?,
        }
        Ok(call)
    }

    fn index_of(&self, id: u64) -> Result<usize> {
        id.checked_sub(crate::config::FIRST_PROPOSAL_ID)
            .map(|index| index as usize)
            .filter(|index| *index < self.proposals.len())
            .ok_or(GovernanceError::ProposalNotFound(id))
    }
}
