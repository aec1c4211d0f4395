//! Boundary to the governance Diamond
//!
//! Every method maps one-to-one onto a function in
//! [`GOVERNANCE_ABI`](crate::registry::GOVERNANCE_ABI). Implementations own
//! the transport (JSON-RPC provider, signer, test double); the service layer
//! only sees typed tuples.

use async_trait::async_trait;
use thiserror::Error;

use crate::governance::types::{RawProposal, RawVotingConfig, TxReceipt};
use crate::registry::Address;

/// Failure of a single contract call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The facet implementing this function is not deployed
    #[error("Contract function unavailable: {0}")]
    Unavailable(String),

    #[error("Execution reverted: {0}")]
    Reverted(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    /// The signer declined the transaction
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("No signer connected")]
    NoSigner,
}

/// `getReceipt` tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawReceipt {
    pub has_voted: bool,
    pub support: u8,
    pub votes: u128,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GovernanceContract: Send + Sync {
    /// Account that signs write calls, if a wallet is connected
    fn signer(&self) -> Option<Address>;

    // Proposals
    async fn proposal_count(&self) -> Result<u128, ContractError>;
    async fn get_proposal(&self, id: u128) -> Result<RawProposal, ContractError>;
    async fn get_proposal_state(&self, id: u128) -> Result<u8, ContractError>;
    async fn propose(&self, title: String, ipfs_hash: String, voting_period: u128) -> Result<TxReceipt, ContractError>;
    async fn cancel_proposal(&self, id: u128) -> Result<TxReceipt, ContractError>;
    async fn queue_proposal(&self, id: u128) -> Result<TxReceipt, ContractError>;
    async fn execute_proposal(&self, id: u128) -> Result<TxReceipt, ContractError>;

    // Voting
    /// `support` is already encoded; the overload to call is given by
    /// `SupportEncoding::cast_vote_signature`
    async fn cast_vote(&self, id: u128, support: u8) -> Result<TxReceipt, ContractError>;
    async fn cast_vote_with_reason(&self, id: u128, support: u8, reason: String) -> Result<TxReceipt, ContractError>;
    async fn cast_quadratic_vote(&self, id: u128, votes: u128, support: bool) -> Result<TxReceipt, ContractError>;
    async fn has_voted(&self, id: u128, voter: Address) -> Result<bool, ContractError>;
    async fn get_receipt(&self, id: u128, voter: Address) -> Result<RawReceipt, ContractError>;
    async fn get_voting_config(&self) -> Result<RawVotingConfig, ContractError>;
    async fn check_quorum(&self, total_votes: u128, quorum_threshold: u128) -> Result<bool, ContractError>;
    async fn voting_power(&self, account: Address) -> Result<u128, ContractError>;
    async fn vote_credits(&self, account: Address) -> Result<u128, ContractError>;

    // Quadratic helpers
    async fn calculate_quadratic_cost(&self, votes: u128) -> Result<u128, ContractError>;
    async fn quadratic_vote_weight(&self, cost: u128) -> Result<u128, ContractError>;
    async fn calculate_max_votes(&self, credits: u128) -> Result<u128, ContractError>;
    async fn calculate_optimal_votes(&self, credits: u128, proposal_count: u128) -> Result<u128, ContractError>;

    // Treasury
    async fn treasury_balance(&self, token: Address) -> Result<u128, ContractError>;
    async fn deposit_to_treasury(&self, token: Address, amount: u128) -> Result<TxReceipt, ContractError>;
    async fn propose_withdrawal(
        &self,
        token: Address,
        recipient: Address,
        amount: u128,
        reason: String,
    ) -> Result<TxReceipt, ContractError>;

    // Delegation
    async fn delegate(&self, to: Address) -> Result<TxReceipt, ContractError>;
    async fn undelegate(&self) -> Result<TxReceipt, ContractError>;
    async fn get_delegate(&self, account: Address) -> Result<Address, ContractError>;

    // Token
    async fn token_name(&self) -> Result<String, ContractError>;
    async fn token_symbol(&self) -> Result<String, ContractError>;
    async fn token_decimals(&self) -> Result<u8, ContractError>;
    async fn total_supply(&self) -> Result<u128, ContractError>;
    async fn balance_of(&self, account: Address) -> Result<u128, ContractError>;
}
