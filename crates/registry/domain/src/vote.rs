//! Vote state read back from the registry and DAO contracts.

use bon::Builder;
use dissolve_derive::Dissolve;
use ethers::types::Address;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// First-stage vote state for one trade, as held by the registry contract.
///
/// Mutates only through party A/B vote submissions made directly against the
/// chain; `finalized` flips to `true` once both parties have voted and never
/// flips back.
#[derive(Debug, Clone, Copy, Builder, Dissolve)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoteStatus {
    /// Whether party A has voted.
    voted_a: bool,

    /// Whether party B has voted.
    voted_b: bool,

    /// Party A's approval, meaningful once `voted_a`.
    approved_a: bool,

    /// Party B's approval, meaningful once `voted_b`.
    approved_b: bool,

    /// Whether both parties have voted and the first stage is closed.
    finalized: bool,
}

impl VoteStatus {
    /// Whether party A has voted.
    pub fn voted_a(&self) -> bool {
        self.voted_a
    }

    /// Whether party B has voted.
    pub fn voted_b(&self) -> bool {
        self.voted_b
    }

    /// Party A's approval flag.
    pub fn approved_a(&self) -> bool {
        self.approved_a
    }

    /// Party B's approval flag.
    pub fn approved_b(&self) -> bool {
        self.approved_b
    }

    /// Whether the first voting stage is closed.
    pub fn finalized(&self) -> bool {
        self.finalized
    }
}

impl From<(bool, bool, bool, bool, bool)> for VoteStatus {
    /// Builds a `VoteStatus` from the registry contract's return tuple.
    fn from(
        (voted_a, voted_b, approved_a, approved_b, finalized): (bool, bool, bool, bool, bool),
    ) -> Self {
        Self { voted_a, voted_b, approved_a, approved_b, finalized }
    }
}

/// A single DAO voter's state for one trade.
#[derive(Debug, Clone, Copy, Builder, Dissolve)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DaoVote {
    /// Whether this voter has cast a vote.
    voted: bool,

    /// The voter's approval, meaningful once `voted`.
    approved: bool,
}

impl DaoVote {
    /// Whether the vote has been cast.
    pub fn voted(&self) -> bool {
        self.voted
    }

    /// The approval flag.
    pub fn approved(&self) -> bool {
        self.approved
    }
}

impl From<(bool, bool)> for DaoVote {
    /// Builds a `DaoVote` from the DAO contract's return tuple.
    fn from((voted, approved): (bool, bool)) -> Self {
        Self { voted, approved }
    }
}

/// Aggregated second-stage outcome for one trade.
///
/// `processed` transitions false to true exactly once, through the
/// admin-triggered finalize call.
#[derive(Debug, Clone, Copy, Builder, Dissolve)]
pub struct DaoTally {
    /// Number of approving votes.
    yes_count: u64,

    /// Number of rejecting votes.
    no_count: u64,

    /// Whether the DAO stage has been finalized.
    processed: bool,

    /// The raw pass flag stored by the contract.
    passed: bool,
}

impl DaoTally {
    /// Number of approving votes.
    pub fn yes_count(&self) -> u64 {
        self.yes_count
    }

    /// Number of rejecting votes.
    pub fn no_count(&self) -> u64 {
        self.no_count
    }

    /// Whether the DAO stage has been finalized.
    pub fn processed(&self) -> bool {
        self.processed
    }

    /// The pass/fail outcome, or `None` while the vote is still open.
    pub fn passed(&self) -> Option<bool> {
        self.processed.then_some(self.passed)
    }
}

/// Partition of the DAO voter roster for one trade.
#[derive(Debug, Clone, Default, Builder, Dissolve)]
pub struct VoterBreakdown {
    /// Voters who approved.
    yes_voters: Vec<Address>,

    /// Voters who rejected.
    no_voters: Vec<Address>,

    /// Roster members who have not voted yet.
    not_voted: Vec<Address>,
}

impl VoterBreakdown {
    /// Splits `(voter, vote)` pairs into yes / no / not-voted buckets.
    pub fn partition<I>(votes: I) -> Self
    where
        I: IntoIterator<Item = (Address, DaoVote)>,
    {
        let mut breakdown = Self::default();

        for (voter, vote) in votes {
            if !vote.voted() {
                breakdown.not_voted.push(voter);
            } else if vote.approved() {
                breakdown.yes_voters.push(voter);
            } else {
                breakdown.no_voters.push(voter);
            }
        }

        breakdown
    }

    /// Number of votes actually cast, either way.
    pub fn cast_count(&self) -> usize {
        self.yes_voters.len() + self.no_voters.len()
    }

    /// Voters who approved.
    pub fn yes_voters(&self) -> &[Address] {
        &self.yes_voters
    }

    /// Voters who rejected.
    pub fn no_voters(&self) -> &[Address] {
        &self.no_voters
    }

    /// Roster members who have not voted yet.
    pub fn not_voted(&self) -> &[Address] {
        &self.not_voted
    }
}
