use std::collections::BTreeMap;

use serde::Serialize;

use crate::governance::types::{basis_points, Proposal, ProposalState};

/// Aggregate figures for the analytics dashboard
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GovernanceStats {
    pub total_proposals: usize,
    pub by_state: BTreeMap<String, usize>,
    pub active: usize,
    pub passed: usize,
    pub failed: usize,
    /// Passed over decided proposals, in basis points
    pub pass_rate_bps: u32,
    pub total_votes: u128,
    pub average_votes: u128,
    /// Average turnout against the supplied token supply, in basis points
    pub participation_bps: Option<u32>,
}

fn ratio_bps(numerator: u128, denominator: u128) -> u32 {
    basis_points(numerator, denominator).min(10_000) as u32
}

/// Summarize proposals and their (contract or inferred) states
pub fn summarize(entries: &[(Proposal, ProposalState)], token_supply: Option<u128>) -> GovernanceStats {
    let mut stats = GovernanceStats {
        total_proposals: entries.len(),
        ..Default::default()
    };

    for (proposal, state) in entries {
        *stats.by_state.entry(state.to_string()).or_insert(0) += 1;
        stats.total_votes = stats.total_votes.saturating_add(proposal.total_votes);

        match state {
            ProposalState::Active => stats.active += 1,
            s if s.is_passed() => stats.passed += 1,
            ProposalState::Defeated | ProposalState::Expired => stats.failed += 1,
            _ => {}
        }
    }

    let decided = (stats.passed + stats.failed) as u128;
    stats.pass_rate_bps = ratio_bps(stats.passed as u128, decided);

    if !entries.is_empty() {
        stats.average_votes = stats.total_votes / entries.len() as u128;
    }
    stats.participation_bps = token_supply
        .filter(|supply| *supply > 0)
        .map(|supply| ratio_bps(stats.average_votes, supply));

    stats
}

/// Turnout of a single proposal against the token supply, in basis points
pub fn turnout_bps(proposal: &Proposal, token_supply: u128) -> u32 {
    ratio_bps(proposal.total_votes, token_supply)
}

/// The `limit` proposals with the most votes, highest first
pub fn top_by_votes(proposals: &[Proposal], limit: usize) -> Vec<&Proposal> {
    let mut sorted: Vec<&Proposal> = proposals.iter().collect();
    sorted.sort_by(|a, b| b.total_votes.cmp(&a.total_votes).then(a.id.cmp(&b.id)));
    sorted.truncate(limit);
    sorted
}
