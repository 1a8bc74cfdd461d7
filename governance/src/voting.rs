//! Ballots and tallies

use acdm_core::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: Address,
    pub in_favor: bool,
    /// Staked principal at the time the vote was cast
    pub weight: Amount,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub votes_for: Amount,
    pub votes_against: Amount,
}

impl Tally {
    pub fn add(&mut self, ballot: &Ballot) {
        if ballot.in_favor {
            self.votes_for += ballot.weight;
        } else {
            self.votes_against += ballot.weight;
        }
    }

    pub fn total(&self) -> Amount {
        self.votes_for + self.votes_against
    }

    /// Cast weight strictly exceeds half of `quorum_base`.
    pub fn quorum_reached(&self, quorum_base: Amount) -> bool {
        self.total().saturating_mul(100) > quorum_base.saturating_mul(crate::config::QUORUM_PERCENT)
    }

    pub fn passed(&self) -> bool {
        self.votes_for > self.votes_against
    }

    /// Share of cast weight in favour, in whole percent.
    pub fn approval_percentage(&self) -> Option<Amount> {
        let total = self.total();
        if total == 0 {
            return Some(0);
        }
        self.votes_for.checked_mul(100).map(|v| v / total)
    }

    /// Cast weight against `quorum_base`, in whole percent.
    pub fn participation_rate(&self, quorum_base: Amount) -> Option<Amount> {
        if quorum_base == 0 {
            return Some(0);
        }
        self.total().checked_mul(100).map(|v| v / quorum_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ballot(voter: &str, in_favor: bool, weight: Amount) -> Ballot {
        Ballot {
            voter: Address::from(voter),
            in_favor,
            weight,
            timestamp: 1000,
        }
    }

    #[test]
    fn test_tally() {
        let mut tally = Tally::default();
        tally.add(&ballot("voter1", true, 100));
        tally.add(&ballot("voter2", false, 50));

        assert_eq!(tally.total(), 150);
        assert_eq!(tally.votes_for, 100);
        assert_eq!(tally.votes_against, 50);
        assert_eq!(tally.approval_percentage(), Some(66));
        assert!(tally.passed());
    }

    #[test]
    fn test_quorum_is_strictly_more_than_half() {
        let mut tally = Tally::default();
        tally.add(&ballot("voter1", true, 50));
        assert!(!tally.quorum_reached(100));

        tally.add(&ballot("voter2", false, 1));
        assert!(tally.quorum_reached(100));
        assert_eq!(tally.participation_rate(100), Some(51));
    }

    #[test]
    fn test_tie_does_not_pass() {
        let mut tally = Tally::default();
        tally.add(&ballot("voter1", true, 40));
        tally.add(&ballot("voter2", false, 40));
        assert!(tally.quorum_reached(100));
        assert!(!tally.passed());
    }

    #[test]
    fn test_percentages_do_not_overflow() {
        let mut tally = Tally::default();
        tally.add(&ballot("whale", true, Amount::MAX / 2));
        assert_eq!(tally.approval_percentage(), None);
        assert_eq!(tally.participation_rate(Amount::MAX), None);
        assert_eq!(Tally::default().participation_rate(0), Some(0));
    }
}
