use std::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::Address;

pub type ProposalId = u64;

/// `numerator / denominator` in basis points without overflowing on large tallies
pub(crate) fn basis_points(numerator: u128, denominator: u128) -> u128 {
    if denominator == 0 {
        return 0;
    }
    let whole = numerator / denominator;
    let rest = numerator % denominator;
    let fraction = match rest.checked_mul(10_000) {
        Some(scaled) => scaled / denominator,
        // denominator exceeds u128::MAX / 10_000 here, so the divisor is non-zero
        None => rest / (denominator / 10_000),
    };
    whole.saturating_mul(10_000).saturating_add(fraction)
}

/// Lifecycle state of a governance proposal
///
/// Discriminants match the contract's `getProposalState` return codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    Pending = 0,
    Active = 1,
    Canceled = 2,
    Defeated = 3,
    Succeeded = 4,
    Queued = 5,
    Expired = 6,
    Executed = 7,
}

impl ProposalState {
    pub const ALL: [ProposalState; 8] = [
        ProposalState::Pending,
        ProposalState::Active,
        ProposalState::Canceled,
        ProposalState::Defeated,
        ProposalState::Succeeded,
        ProposalState::Queued,
        ProposalState::Expired,
        ProposalState::Executed,
    ];

    /// Map a contract status code; unknown codes yield `None`
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// No further transitions are possible from this state
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProposalState::Canceled | ProposalState::Defeated | ProposalState::Expired | ProposalState::Executed
        )
    }

    /// Voting ended with the proposal passing
    pub fn is_passed(self) -> bool {
        matches!(
            self,
            ProposalState::Succeeded | ProposalState::Queued | ProposalState::Executed
        )
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProposalState::Pending => "Pending",
            ProposalState::Active => "Active",
            ProposalState::Canceled => "Canceled",
            ProposalState::Defeated => "Defeated",
            ProposalState::Succeeded => "Succeeded",
            ProposalState::Queued => "Queued",
            ProposalState::Expired => "Expired",
            ProposalState::Executed => "Executed",
        };
        write!(f, "{}", label)
    }
}

/// Direction of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteSupport {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl VoteSupport {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(VoteSupport::Against),
            1 => Some(VoteSupport::For),
            2 => Some(VoteSupport::Abstain),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for VoteSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteSupport::Against => write!(f, "Against"),
            VoteSupport::For => write!(f, "For"),
            VoteSupport::Abstain => write!(f, "Abstain"),
        }
    }
}

/// Proposal view model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub title: String,
    pub ipfs_hash: String,
    pub start_time: u64,
    pub end_time: u64,
    pub for_votes: u128,
    pub against_votes: u128,
    pub abstain_votes: u128,
    pub total_votes: u128,
    pub executed: bool,
    pub cancelled: bool,
}

impl Proposal {
    /// Share of `for` votes among decisive votes, in basis points
    pub fn approval_bps(&self) -> u32 {
        let decisive = self.for_votes.saturating_add(self.against_votes);
        basis_points(self.for_votes, decisive).min(10_000) as u32
    }
}

/// Proposal tuple as returned by `getProposal`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawProposal {
    pub id: u128,
    pub proposer: Address,
    pub title: String,
    pub ipfs_hash: String,
    pub start_time: u128,
    pub end_time: u128,
    pub for_votes: u128,
    pub against_votes: u128,
    pub abstain_votes: u128,
    pub executed: bool,
    pub cancelled: bool,
}

impl From<RawProposal> for Proposal {
    fn from(raw: RawProposal) -> Self {
        let total_votes = raw
            .for_votes
            .saturating_add(raw.against_votes)
            .saturating_add(raw.abstain_votes);
        Proposal {
            id: u64::try_from(raw.id).unwrap_or(u64::MAX),
            proposer: raw.proposer,
            title: raw.title,
            ipfs_hash: raw.ipfs_hash,
            start_time: u64::try_from(raw.start_time).unwrap_or(u64::MAX),
            end_time: u64::try_from(raw.end_time).unwrap_or(u64::MAX),
            for_votes: raw.for_votes,
            against_votes: raw.against_votes,
            abstain_votes: raw.abstain_votes,
            total_votes,
            executed: raw.executed,
            cancelled: raw.cancelled,
        }
    }
}

/// Whether and how an address voted on a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub has_voted: bool,
    pub support: Option<VoteSupport>,
    pub votes: u128,
}

/// Governance parameters read from `getVotingConfig`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VotingConfig {
    pub voting_delay: u64,
    pub voting_period: u64,
    pub quorum_threshold: u128,
    pub proposal_threshold: u128,
    pub quadratic_enabled: bool,
}

/// `getVotingConfig` tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawVotingConfig {
    pub voting_delay: u128,
    pub voting_period: u128,
    pub quorum_threshold: u128,
    pub proposal_threshold: u128,
    pub quadratic_enabled: bool,
}

impl From<RawVotingConfig> for VotingConfig {
    fn from(raw: RawVotingConfig) -> Self {
        VotingConfig {
            voting_delay: u64::try_from(raw.voting_delay).unwrap_or(u64::MAX),
            voting_period: u64::try_from(raw.voting_period).unwrap_or(u64::MAX),
            quorum_threshold: raw.quorum_threshold,
            proposal_threshold: raw.proposal_threshold,
            quadratic_enabled: raw.quadratic_enabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryBalance {
    pub token: Address,
    pub balance: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationInfo {
    pub delegator: Address,
    /// `None` when the account has not delegated
    pub delegate: Option<Address>,
    pub voting_power: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u128,
}

/// Receipt of a submitted write call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: u64,
}
