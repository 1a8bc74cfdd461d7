//! Proposal records and their outcomes

use crate::action::Target;
use crate::voting::{Ballot, Tally};
use acdm_core::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub description: String,
    /// Informational only, never interpreted
    pub action_metadata: String,
    /// Encoded call, decoded only when the proposal executes
    pub payload: Vec<u8>,
    pub target: Target,
    pub created_at: Timestamp,
    pub end_time: Timestamp,
    pub closed: bool,
    pub tally: Tally,
    /// Total staked supply captured at finish
    pub quorum_base: Option<Amount>,
    pub ballots: BTreeMap<Address, Ballot>,
    pub outcome: Option<ProposalOutcome>,
}

impl Proposal {
    pub fn new(
        id: u64,
        description: String,
        action_metadata: String,
        payload: Vec<u8>,
        target: Target,
        created_at: Timestamp,
        vote_time: u64,
    ) -> Self {
        Self {
            id,
            description,
            action_metadata,
            payload,
            target,
            created_at,
            end_time: created_at.saturating_add(vote_time),
            closed: false,
            tally: Tally::default(),
            quorum_base: None,
            ballots: BTreeMap::new(),
            outcome: None,
        }
    }

    pub fn votes_for(&self) -> Amount {
        self.tally.votes_for
    }

    pub fn votes_against(&self) -> Amount {
        self.tally.votes_against
    }

    /// Votes are accepted strictly before `end_time`.
    pub fn is_voting_open(&self, now: Timestamp) -> bool {
        !self.closed && now < self.end_time
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.ballots.contains_key(voter)
    }

    pub fn voters(&self) -> impl Iterator<Item = &Address> {
        self.ballots.keys()
    }
}

/// Record kept for observers once a proposal finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalOutcome {
    pub proposal_id: u64,
    pub description: String,
    pub quorum_reached: bool,
    pub passed: bool,
    pub execution_succeeded: bool,
    pub finished_at: Timestamp,
    pub execution_error: Option<String>,
}
