//! Governance client: typed contract access plus the client-side fallbacks
//! used when helper facets are missing from the Diamond.

pub mod analytics;
pub mod contract;
pub mod fallback;
pub mod quadratic;
pub mod service;
pub mod state;
pub mod types;

pub use analytics::{summarize, top_by_votes, turnout_bps, GovernanceStats};
pub use contract::{ContractError, GovernanceContract, RawReceipt};
pub use fallback::{or_default, try_with_fallback, with_fallback, FallbackOutcome, Source};
pub use quadratic::QuadraticQuote;
pub use service::{GovernanceService, ServicePolicy, SupportEncoding};
pub use state::{infer_proposal_state, infer_state_local};
pub use types::{
    DelegationInfo, Proposal, ProposalId, ProposalState, RawProposal, RawVotingConfig, TokenInfo, TreasuryBalance,
    TxReceipt, VoteReceipt, VoteSupport, VotingConfig,
};
