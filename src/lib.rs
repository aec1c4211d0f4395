//! Client library for the GNUS DAO governance Diamond
//!
//! Typed contract access with local fallbacks, proposal state inference,
//! quadratic voting math, IPFS storage for proposal documents and the
//! session state a dashboard keeps between runs.

pub mod config;
pub mod errors;
pub mod governance;
pub mod ipfs;
pub mod registry;
pub mod state;
pub mod utils;

// Re-export commonly used items
pub use config::AppConfig;
pub use errors::{DaoError, Result};
pub use governance::{GovernanceContract, GovernanceService, Proposal, ProposalState, ServicePolicy};
pub use ipfs::{IpfsClient, IpfsConfig};
pub use registry::{Address, ContractRegistry};
pub use state::{AppState, SettingsStore, Web3State};
