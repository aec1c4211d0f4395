use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{DaoError, Result};
use crate::governance::contract::GovernanceContract;
use crate::governance::fallback::{or_default, try_with_fallback, with_fallback};
use crate::governance::quadratic::{self, QuadraticQuote};
use crate::governance::state::infer_proposal_state;
use crate::governance::types::{
    DelegationInfo, Proposal, ProposalId, ProposalState, TokenInfo, TreasuryBalance, TxReceipt, VoteReceipt,
    VoteSupport, VotingConfig,
};
use crate::ipfs::is_valid_ipfs_hash;
use crate::registry::Address;

/// Longest proposal title accepted before submission
pub const MAX_TITLE_LENGTH: usize = 200;

/// Upper bound on proposals listed from a single `getProposalCount`
pub const MAX_LISTED_PROPOSALS: u64 = 10_000;

/// Proposal reads kept in flight at once
const CONCURRENT_READS: usize = 16;

/// How `castVote` expects the support argument
///
/// The two deployed facet generations disagree: one takes the
/// Governor-style `0/1/2` code, the other a plain boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportEncoding {
    Ternary,
    Boolean,
}

impl SupportEncoding {
    /// `castVote` overload a transport should call under this encoding
    pub fn cast_vote_signature(self) -> &'static str {
        match self {
            SupportEncoding::Ternary => "castVote(uint256,uint8)",
            SupportEncoding::Boolean => "castVote(uint256,bool)",
        }
    }

    pub fn cast_vote_with_reason_signature(self) -> &'static str {
        match self {
            SupportEncoding::Ternary => "castVoteWithReason(uint256,uint8,string)",
            SupportEncoding::Boolean => "castVoteWithReason(uint256,bool,string)",
        }
    }

    /// Support argument as the contract expects it; `1`/`0` under `Boolean`
    pub fn encode(self, support: VoteSupport) -> Result<u8> {
        match (self, support) {
            (SupportEncoding::Ternary, s) => Ok(s.code()),
            (SupportEncoding::Boolean, VoteSupport::For) => Ok(1),
            (SupportEncoding::Boolean, VoteSupport::Against) => Ok(0),
            (SupportEncoding::Boolean, VoteSupport::Abstain) => Err(DaoError::Validation(
                "Abstain is not supported by this contract's castVote".to_string(),
            )),
        }
    }
}

/// Business rules on which the deployed contract versions differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePolicy {
    pub allow_self_delegation: bool,
    pub support_encoding: SupportEncoding,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        ServicePolicy {
            allow_self_delegation: true,
            support_encoding: SupportEncoding::Ternary,
        }
    }
}

/// Typed wrapper over the governance Diamond
///
/// Aggregate reads degrade to zero values when the contract call fails so a
/// dashboard can still render; lookups of a specific proposal and all writes
/// propagate their errors.
pub struct GovernanceService<C: GovernanceContract> {
    contract: Arc<C>,
    policy: ServicePolicy,
}

impl<C: GovernanceContract> Clone for GovernanceService<C> {
    fn clone(&self) -> Self {
        Self {
            contract: Arc::clone(&self.contract),
            policy: self.policy,
        }
    }
}

impl<C: GovernanceContract> GovernanceService<C> {
    pub fn new(contract: Arc<C>) -> Self {
        Self::with_policy(contract, ServicePolicy::default())
    }

    pub fn with_policy(contract: Arc<C>, policy: ServicePolicy) -> Self {
        Self { contract, policy }
    }

    pub fn policy(&self) -> &ServicePolicy {
        &self.policy
    }

    pub fn contract(&self) -> &Arc<C> {
        &self.contract
    }

    // ---------------------------------------------------------------------
    // Proposals
    // ---------------------------------------------------------------------

    pub async fn proposal_count(&self) -> u64 {
        let count = or_default("getProposalCount", self.contract.proposal_count()).await;
        u64::try_from(count).unwrap_or(u64::MAX)
    }

    pub async fn proposal(&self, id: ProposalId) -> Result<Proposal> {
        let raw = self.contract.get_proposal(id as u128).await?;
        Ok(Proposal::from(raw))
    }

    /// Fetch several proposals concurrently, in order; failed ids are skipped
    pub async fn proposals(&self, ids: &[ProposalId]) -> Vec<Proposal> {
        self.fetch_proposals(ids.iter().copied()).await
    }

    /// Every proposal the contract knows about; ids are assigned from 1
    ///
    /// Counts above `MAX_LISTED_PROPOSALS` are clamped.
    pub async fn all_proposals(&self) -> Vec<Proposal> {
        let count = self.proposal_count().await;
        if count > MAX_LISTED_PROPOSALS {
            warn!(
                "Contract reports {} proposals, listing the first {}",
                count, MAX_LISTED_PROPOSALS
            );
        }
        self.fetch_proposals(1..=count.min(MAX_LISTED_PROPOSALS)).await
    }

    async fn fetch_proposals(&self, ids: impl Iterator<Item = ProposalId>) -> Vec<Proposal> {
        stream::iter(ids)
            .map(|id| async move { (id, self.proposal(id).await) })
            .buffered(CONCURRENT_READS)
            .filter_map(|(id, result)| async move {
                match result {
                    Ok(p) => Some(p),
                    Err(e) => {
                        warn!("Skipping proposal {}: {}", id, e);
                        None
                    }
                }
            })
            .collect()
            .await
    }

    /// Contract-reported state, or the inferred state if that call fails
    pub async fn proposal_state(&self, id: ProposalId, now: u64) -> Result<ProposalState> {
        match self.contract.get_proposal_state(id as u128).await {
            Ok(code) => match ProposalState::from_code(code) {
                Some(state) => return Ok(state),
                None => warn!("Unknown state code {} for proposal {}, inferring", code, id),
            },
            Err(e) => warn!("getProposalState({}) failed, inferring: {}", id, e),
        }

        let proposal = self.proposal(id).await?;
        Ok(self.infer_state(&proposal, now).await)
    }

    /// Client-side inference against the current quorum threshold
    pub async fn infer_state(&self, proposal: &Proposal, now: u64) -> ProposalState {
        let config = self.voting_config().await;
        let contract = &self.contract;
        infer_proposal_state(proposal, config.quorum_threshold, now, |total, threshold| {
            contract.check_quorum(total, threshold)
        })
        .await
    }

    /// Proposals paired with their states, for list views and analytics
    pub async fn proposals_with_state(&self, now: u64) -> Vec<(Proposal, ProposalState)> {
        let proposals = self.all_proposals().await;
        let states = join_all(proposals.iter().map(|p| self.proposal_state(p.id, now))).await;
        proposals
            .into_iter()
            .zip(states)
            .filter_map(|(p, state)| match state {
                Ok(s) => Some((p, s)),
                Err(e) => {
                    warn!("Dropping proposal {} without state: {}", p.id, e);
                    None
                }
            })
            .collect()
    }

    pub async fn create_proposal(&self, title: &str, ipfs_hash: &str, voting_period: u64) -> Result<TxReceipt> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DaoError::Validation("Proposal title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(DaoError::Validation(format!(
                "Proposal title exceeds {} characters",
                MAX_TITLE_LENGTH
            )));
        }
        if !is_valid_ipfs_hash(ipfs_hash) {
            return Err(DaoError::Validation(format!("Invalid IPFS hash: {}", ipfs_hash)));
        }
        if voting_period == 0 {
            return Err(DaoError::Validation("Voting period must be positive".to_string()));
        }

        if let Some(proposer) = self.contract.signer() {
            // Only enforced when both reads succeed; the contract re-checks anyway.
            let config = self.contract.get_voting_config().await;
            let power = self.contract.voting_power(proposer).await;
            if let (Ok(config), Ok(power)) = (config, power) {
                if power < config.proposal_threshold {
                    return Err(DaoError::Validation(format!(
                        "Voting power {} is below the proposal threshold {}",
                        power, config.proposal_threshold
                    )));
                }
            }
        }

        info!("Submitting proposal \"{}\" ({})", title, ipfs_hash);
        let receipt = self
            .contract
            .propose(title.to_string(), ipfs_hash.to_string(), voting_period as u128)
            .await?;
        Ok(receipt)
    }

    pub async fn cancel_proposal(&self, id: ProposalId) -> Result<TxReceipt> {
        info!("Cancelling proposal {}", id);
        Ok(self.contract.cancel_proposal(id as u128).await?)
    }

    pub async fn queue_proposal(&self, id: ProposalId) -> Result<TxReceipt> {
        info!("Queueing proposal {}", id);
        Ok(self.contract.queue_proposal(id as u128).await?)
    }

    pub async fn execute_proposal(&self, id: ProposalId) -> Result<TxReceipt> {
        info!("Executing proposal {}", id);
        Ok(self.contract.execute_proposal(id as u128).await?)
    }

    // ---------------------------------------------------------------------
    // Voting
    // ---------------------------------------------------------------------

    pub async fn voting_config(&self) -> VotingConfig {
        let raw = or_default("getVotingConfig", self.contract.get_voting_config()).await;
        VotingConfig::from(raw)
    }

    pub async fn cast_vote(&self, id: ProposalId, support: VoteSupport, reason: Option<&str>) -> Result<TxReceipt> {
        let code = self.policy.support_encoding.encode(support)?;
        info!("Casting {} vote on proposal {}", support, id);

        let receipt = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => {
                self.contract
                    .cast_vote_with_reason(id as u128, code, reason.to_string())
                    .await?
            }
            None => self.contract.cast_vote(id as u128, code).await?,
        };
        Ok(receipt)
    }

    /// How `voter` voted on `id`; falls back to `hasVoted` and then to "not voted"
    pub async fn receipt(&self, id: ProposalId, voter: Address) -> VoteReceipt {
        match self.contract.get_receipt(id as u128, voter).await {
            Ok(raw) => VoteReceipt {
                has_voted: raw.has_voted,
                support: if raw.has_voted {
                    VoteSupport::from_code(raw.support)
                } else {
                    None
                },
                votes: raw.votes,
            },
            Err(e) => {
                debug!("getReceipt unavailable ({}), trying hasVoted", e);
                let has_voted = or_default("hasVoted", self.contract.has_voted(id as u128, voter)).await;
                VoteReceipt {
                    has_voted,
                    support: None,
                    votes: 0,
                }
            }
        }
    }

    pub async fn voting_power(&self, account: Address) -> u128 {
        or_default("getVotingPower", self.contract.voting_power(account)).await
    }

    pub async fn vote_credits(&self, account: Address) -> u128 {
        or_default("getVoteCredits", self.contract.vote_credits(account)).await
    }

    // ---------------------------------------------------------------------
    // Quadratic voting
    // ---------------------------------------------------------------------

    pub async fn quadratic_cost(&self, votes: u128) -> Result<u128> {
        let outcome = try_with_fallback("calculateQuadraticCost", self.contract.calculate_quadratic_cost(votes), || {
            quadratic::quadratic_cost(votes).ok_or(DaoError::Overflow("quadratic cost"))
        })
        .await?;
        Ok(outcome.value)
    }

    pub async fn quadratic_weight(&self, cost: u128) -> u128 {
        with_fallback("getQuadraticVoteWeight", self.contract.quadratic_vote_weight(cost), || {
            quadratic::quadratic_weight(cost)
        })
        .await
        .value
    }

    pub async fn max_votes(&self, credits: u128) -> u128 {
        with_fallback("calculateMaxVotes", self.contract.calculate_max_votes(credits), || {
            quadratic::max_votes(credits)
        })
        .await
        .value
    }

    pub async fn optimal_votes(&self, credits: u128, proposal_count: u128) -> u128 {
        with_fallback(
            "calculateOptimalVotes",
            self.contract.calculate_optimal_votes(credits, proposal_count),
            || quadratic::optimal_votes(credits, proposal_count),
        )
        .await
        .value
    }

    /// Cost, weight and remaining credits for casting `votes` as `voter`
    pub async fn quote_quadratic_vote(&self, voter: Address, votes: u128) -> Result<QuadraticQuote> {
        let cost = self.quadratic_cost(votes).await?;
        let weight = self.quadratic_weight(cost).await;
        let credits = self.vote_credits(voter).await;
        Ok(QuadraticQuote::new(votes, cost, weight, credits))
    }

    pub async fn cast_quadratic_vote(&self, id: ProposalId, votes: u128, support: VoteSupport) -> Result<TxReceipt> {
        if votes == 0 {
            return Err(DaoError::Validation("Vote count must be positive".to_string()));
        }
        let support = match support {
            VoteSupport::For => true,
            VoteSupport::Against => false,
            VoteSupport::Abstain => {
                return Err(DaoError::Validation(
                    "Quadratic votes must be for or against".to_string(),
                ))
            }
        };

        let cost = self.quadratic_cost(votes).await?;
        if let Some(voter) = self.contract.signer() {
            match self.contract.vote_credits(voter).await {
                Ok(credits) if cost > credits => {
                    return Err(DaoError::Validation(format!(
                        "Casting {} votes costs {} credits but only {} are available",
                        votes, cost, credits
                    )));
                }
                Ok(_) => {}
                Err(e) => warn!("Could not read vote credits, leaving the check to the contract: {}", e),
            }
        }

        info!("Casting {} quadratic votes on proposal {} (cost {})", votes, id, cost);
        Ok(self.contract.cast_quadratic_vote(id as u128, votes, support).await?)
    }

    // ---------------------------------------------------------------------
    // Treasury
    // ---------------------------------------------------------------------

    pub async fn treasury_balance(&self, token: Address) -> TreasuryBalance {
        let balance = or_default("getTreasuryBalance", self.contract.treasury_balance(token)).await;
        TreasuryBalance { token, balance }
    }

    pub async fn treasury_balances(&self, tokens: &[Address]) -> Vec<TreasuryBalance> {
        join_all(tokens.iter().map(|t| self.treasury_balance(*t))).await
    }

    pub async fn deposit(&self, token: Address, amount: u128) -> Result<TxReceipt> {
        if amount == 0 {
            return Err(DaoError::Validation("Deposit amount must be positive".to_string()));
        }
        info!("Depositing {} of {} into the treasury", amount, token);
        Ok(self.contract.deposit_to_treasury(token, amount).await?)
    }

    pub async fn propose_withdrawal(
        &self,
        token: Address,
        recipient: Address,
        amount: u128,
        reason: &str,
    ) -> Result<TxReceipt> {
        if amount == 0 {
            return Err(DaoError::Validation("Withdrawal amount must be positive".to_string()));
        }
        if recipient.is_zero() {
            return Err(DaoError::Validation("Recipient must not be the zero address".to_string()));
        }
        if reason.trim().is_empty() {
            return Err(DaoError::Validation("A withdrawal reason is required".to_string()));
        }
        info!("Proposing withdrawal of {} of {} to {}", amount, token, recipient);
        Ok(self
            .contract
            .propose_withdrawal(token, recipient, amount, reason.trim().to_string())
            .await?)
    }

    // ---------------------------------------------------------------------
    // Delegation
    // ---------------------------------------------------------------------

    pub async fn delegate(&self, to: Address) -> Result<TxReceipt> {
        if to.is_zero() {
            return Err(DaoError::Validation("Cannot delegate to the zero address".to_string()));
        }
        if !self.policy.allow_self_delegation && self.contract.signer() == Some(to) {
            return Err(DaoError::Validation("Self-delegation is not permitted".to_string()));
        }
        info!("Delegating voting power to {}", to);
        Ok(self.contract.delegate(to).await?)
    }

    pub async fn undelegate(&self) -> Result<TxReceipt> {
        info!("Removing delegation");
        Ok(self.contract.undelegate().await?)
    }

    pub async fn delegation(&self, account: Address) -> DelegationInfo {
        let (delegate, voting_power) = futures::join!(
            or_default("getDelegate", self.contract.get_delegate(account)),
            self.voting_power(account)
        );
        DelegationInfo {
            delegator: account,
            delegate: if delegate.is_zero() { None } else { Some(delegate) },
            voting_power,
        }
    }

    // ---------------------------------------------------------------------
    // Token
    // ---------------------------------------------------------------------

    pub async fn token_info(&self) -> TokenInfo {
        let (name, symbol, decimals, total_supply) = futures::join!(
            or_default("name", self.contract.token_name()),
            or_default("symbol", self.contract.token_symbol()),
            with_fallback("decimals", self.contract.token_decimals(), || 18u8),
            or_default("totalSupply", self.contract.total_supply())
        );
        TokenInfo {
            name,
            symbol,
            decimals: decimals.value,
            total_supply,
        }
    }

    pub async fn token_balance(&self, account: Address) -> u128 {
        or_default("balanceOf", self.contract.balance_of(account)).await
    }
}
