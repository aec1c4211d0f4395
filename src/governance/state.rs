//! Client-side proposal state inference
//!
//! The contract's `getProposalState` is authoritative. This is the degraded
//! path used when that call is missing or reverts; it may disagree with the
//! canonical state (it never produces `Queued` or `Expired`).

use std::future::Future;

use crate::governance::contract::ContractError;
use crate::governance::fallback::with_fallback;
use crate::governance::types::{Proposal, ProposalState};

/// Result of the time/flag rules, before any vote counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Decided(ProposalState),
    VotingClosed,
}

fn phase(proposal: &Proposal, now: u64) -> Phase {
    if proposal.executed {
        Phase::Decided(ProposalState::Executed)
    } else if proposal.cancelled {
        Phase::Decided(ProposalState::Canceled)
    } else if now < proposal.start_time {
        Phase::Decided(ProposalState::Pending)
    } else if now < proposal.end_time {
        Phase::Decided(ProposalState::Active)
    } else {
        Phase::VotingClosed
    }
}

fn outcome(quorum_reached: bool) -> ProposalState {
    if quorum_reached {
        ProposalState::Succeeded
    } else {
        ProposalState::Defeated
    }
}

/// Infer the state using only local arithmetic for the quorum check
pub fn infer_state_local(proposal: &Proposal, quorum_threshold: u128, now: u64) -> ProposalState {
    match phase(proposal, now) {
        Phase::Decided(state) => state,
        Phase::VotingClosed if proposal.total_votes == 0 => ProposalState::Defeated,
        Phase::VotingClosed => outcome(proposal.total_votes >= quorum_threshold),
    }
}

/// Infer the state, asking the contract's `checkQuorum` once voting has closed
///
/// `quorum_check` receives `(total_votes, quorum_threshold)`; if it fails the
/// local `total_votes >= quorum_threshold` comparison is used instead. A
/// closed proposal with no votes is always `Defeated` and never consults it.
pub async fn infer_proposal_state<F, Fut>(
    proposal: &Proposal,
    quorum_threshold: u128,
    now: u64,
    quorum_check: F,
) -> ProposalState
where
    F: FnOnce(u128, u128) -> Fut,
    Fut: Future<Output = Result<bool, ContractError>>,
{
    match phase(proposal, now) {
        Phase::Decided(state) => state,
        Phase::VotingClosed if proposal.total_votes == 0 => ProposalState::Defeated,
        Phase::VotingClosed => {
            let total = proposal.total_votes;
            let reached = with_fallback(
                "checkQuorum",
                quorum_check(total, quorum_threshold),
                || total >= quorum_threshold,
            )
            .await;
            outcome(reached.value)
        }
    }
}
