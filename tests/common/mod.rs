// Shared fixtures for integration tests
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use gnusdao_core::governance::{ContractError, GovernanceContract, RawProposal, RawReceipt, RawVotingConfig, TxReceipt};
use gnusdao_core::registry::Address;

pub const CID: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
pub const START_TIME: u64 = 1_700_000_000;

pub fn address(byte: u8) -> Address {
    Address([byte; 20])
}

#[derive(Default)]
struct Ledger {
    proposals: Vec<RawProposal>,
    queued: HashSet<u128>,
    receipts: HashMap<(u128, Address), RawReceipt>,
    power: HashMap<Address, u128>,
    credits: HashMap<Address, u128>,
    delegates: HashMap<Address, Address>,
    treasury: HashMap<Address, u128>,
    block: u64,
}

/// In-memory governance Diamond with a controllable clock
///
/// Quadratic helper and `getReceipt` facets are absent so the client's local
/// fallbacks run. `getProposalState` is only served when `state_facet` is set.
pub struct MemoryDiamond {
    signer: Option<Address>,
    state_facet: bool,
    config: RawVotingConfig,
    clock: AtomicU64,
    ledger: Mutex<Ledger>,
}

impl MemoryDiamond {
    pub fn new(signer: Option<Address>, state_facet: bool) -> Self {
        Self {
            signer,
            state_facet,
            config: RawVotingConfig {
                voting_delay: 0,
                voting_period: 3_600,
                quorum_threshold: 500,
                proposal_threshold: 100,
                quadratic_enabled: true,
            },
            clock: AtomicU64::new(START_TIME),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.load(Ordering::SeqCst)
    }

    pub fn advance(&self, seconds: u64) {
        self.clock.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn set_power(&self, account: Address, power: u128) {
        self.ledger.lock().unwrap().power.insert(account, power);
    }

    pub fn set_credits(&self, account: Address, credits: u128) {
        self.ledger.lock().unwrap().credits.insert(account, credits);
    }

    fn require_signer(&self) -> Result<Address, ContractError> {
        self.signer.ok_or(ContractError::NoSigner)
    }

    fn receipt(ledger: &mut Ledger) -> TxReceipt {
        ledger.block += 1;
        TxReceipt {
            tx_hash: format!("0x{:064x}", ledger.block),
            block_number: ledger.block,
        }
    }

    fn proposal_mut(ledger: &mut Ledger, id: u128) -> Result<&mut RawProposal, ContractError> {
        ledger
            .proposals
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ContractError::Reverted(format!("unknown proposal {}", id)))
    }

    fn state_of(&self, ledger: &Ledger, p: &RawProposal) -> u8 {
        let now = self.now() as u128;
        let total = p.for_votes + p.against_votes + p.abstain_votes;
        if p.cancelled {
            2
        } else if p.executed {
            7
        } else if ledger.queued.contains(&p.id) {
            5
        } else if now < p.start_time {
            0
        } else if now < p.end_time {
            1
        } else if total >= self.config.quorum_threshold && p.for_votes > p.against_votes {
            4
        } else {
            3
        }
    }

    fn record_vote(&self, id: u128, support: u8, weight: u128) -> Result<TxReceipt, ContractError> {
        let voter = self.require_signer()?;
        let now = self.now() as u128;
        let mut ledger = self.ledger.lock().unwrap();
        if ledger.receipts.contains_key(&(id, voter)) {
            return Err(ContractError::Reverted("already voted".to_string()));
        }
        let proposal = Self::proposal_mut(&mut ledger, id)?;
        if now < proposal.start_time || now >= proposal.end_time {
            return Err(ContractError::Reverted("voting is closed".to_string()));
        }
        match support {
            0 => proposal.against_votes += weight,
            1 => proposal.for_votes += weight,
            2 => proposal.abstain_votes += weight,
            _ => return Err(ContractError::Reverted("invalid support".to_string())),
        }
        ledger.receipts.insert(
            (id, voter),
            RawReceipt {
                has_voted: true,
                support,
                votes: weight,
            },
        );
        Ok(Self::receipt(&mut ledger))
    }
}

#[async_trait]
impl GovernanceContract for MemoryDiamond {
    fn signer(&self) -> Option<Address> {
        self.signer
    }

    async fn proposal_count(&self) -> Result<u128, ContractError> {
        Ok(self.ledger.lock().unwrap().proposals.len() as u128)
    }

    async fn get_proposal(&self, id: u128) -> Result<RawProposal, ContractError> {
        let mut ledger = self.ledger.lock().unwrap();
        Self::proposal_mut(&mut ledger, id).map(|p| p.clone())
    }

    async fn get_proposal_state(&self, id: u128) -> Result<u8, ContractError> {
        if !self.state_facet {
            return Err(ContractError::Unavailable("getProposalState".to_string()));
        }
        let ledger = self.ledger.lock().unwrap();
        let proposal = ledger
            .proposals
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ContractError::Reverted(format!("unknown proposal {}", id)))?;
        Ok(self.state_of(&ledger, proposal))
    }

    async fn propose(&self, title: String, ipfs_hash: String, voting_period: u128) -> Result<TxReceipt, ContractError> {
        let proposer = self.require_signer()?;
        let start_time = self.now() as u128 + self.config.voting_delay;
        let mut ledger = self.ledger.lock().unwrap();
        let id = ledger.proposals.len() as u128 + 1;
        ledger.proposals.push(RawProposal {
            id,
            proposer,
            title,
            ipfs_hash,
            start_time,
            end_time: start_time + voting_period,
            ..Default::default()
        });
        Ok(Self::receipt(&mut ledger))
    }

    async fn cancel_proposal(&self, id: u128) -> Result<TxReceipt, ContractError> {
        let caller = self.require_signer()?;
        let mut ledger = self.ledger.lock().unwrap();
        let proposal = Self::proposal_mut(&mut ledger, id)?;
        if proposal.proposer != caller || proposal.executed {
            return Err(ContractError::Reverted("cannot cancel".to_string()));
        }
        proposal.cancelled = true;
        Ok(Self::receipt(&mut ledger))
    }

    async fn queue_proposal(&self, id: u128) -> Result<TxReceipt, ContractError> {
        let mut ledger = self.ledger.lock().unwrap();
        let proposal = Self::proposal_mut(&mut ledger, id)?.clone();
        if self.state_of(&ledger, &proposal) != 4 {
            return Err(ContractError::Reverted("proposal has not succeeded".to_string()));
        }
        ledger.queued.insert(id);
        Ok(Self::receipt(&mut ledger))
    }

    async fn execute_proposal(&self, id: u128) -> Result<TxReceipt, ContractError> {
        let mut ledger = self.ledger.lock().unwrap();
        if !ledger.queued.remove(&id) {
            return Err(ContractError::Reverted("proposal is not queued".to_string()));
        }
        Self::proposal_mut(&mut ledger, id)?.executed = true;
        Ok(Self::receipt(&mut ledger))
    }

    async fn cast_vote(&self, id: u128, support: u8) -> Result<TxReceipt, ContractError> {
        let weight = self.voting_power(self.require_signer()?).await?;
        self.record_vote(id, support, weight)
    }

    async fn cast_vote_with_reason(&self, id: u128, support: u8, _reason: String) -> Result<TxReceipt, ContractError> {
        self.cast_vote(id, support).await
    }

    async fn cast_quadratic_vote(&self, id: u128, votes: u128, support: bool) -> Result<TxReceipt, ContractError> {
        let voter = self.require_signer()?;
        let cost = votes * votes;
        {
            let mut ledger = self.ledger.lock().unwrap();
            let credits = ledger.credits.entry(voter).or_insert(0);
            if *credits < cost {
                return Err(ContractError::Reverted("insufficient credits".to_string()));
            }
            *credits -= cost;
        }
        self.record_vote(id, support as u8, votes)
    }

    async fn has_voted(&self, id: u128, voter: Address) -> Result<bool, ContractError> {
        Ok(self.ledger.lock().unwrap().receipts.contains_key(&(id, voter)))
    }

    async fn get_receipt(&self, _id: u128, _voter: Address) -> Result<RawReceipt, ContractError> {
        Err(ContractError::Unavailable("getReceipt".to_string()))
    }

    async fn get_voting_config(&self) -> Result<RawVotingConfig, ContractError> {
        Ok(self.config)
    }

    async fn check_quorum(&self, total_votes: u128, quorum_threshold: u128) -> Result<bool, ContractError> {
        Ok(total_votes >= quorum_threshold)
    }

    async fn voting_power(&self, account: Address) -> Result<u128, ContractError> {
        Ok(self.ledger.lock().unwrap().power.get(&account).copied().unwrap_or(0))
    }

    async fn vote_credits(&self, account: Address) -> Result<u128, ContractError> {
        Ok(self.ledger.lock().unwrap().credits.get(&account).copied().unwrap_or(0))
    }

    async fn calculate_quadratic_cost(&self, _votes: u128) -> Result<u128, ContractError> {
        Err(ContractError::Unavailable("calculateQuadraticCost".to_string()))
    }

    async fn quadratic_vote_weight(&self, _cost: u128) -> Result<u128, ContractError> {
        Err(ContractError::Unavailable("getQuadraticVoteWeight".to_string()))
    }

    async fn calculate_max_votes(&self, _credits: u128) -> Result<u128, ContractError> {
        Err(ContractError::Unavailable("calculateMaxVotes".to_string()))
    }

    async fn calculate_optimal_votes(&self, _credits: u128, _proposal_count: u128) -> Result<u128, ContractError> {
        Err(ContractError::Unavailable("calculateOptimalVotes".to_string()))
    }

    async fn treasury_balance(&self, token: Address) -> Result<u128, ContractError> {
        Ok(self.ledger.lock().unwrap().treasury.get(&token).copied().unwrap_or(0))
    }

    async fn deposit_to_treasury(&self, token: Address, amount: u128) -> Result<TxReceipt, ContractError> {
        self.require_signer()?;
        let mut ledger = self.ledger.lock().unwrap();
        *ledger.treasury.entry(token).or_insert(0) += amount;
        Ok(Self::receipt(&mut ledger))
    }

    async fn propose_withdrawal(
        &self,
        token: Address,
        _recipient: Address,
        amount: u128,
        reason: String,
    ) -> Result<TxReceipt, ContractError> {
        let balance = self.treasury_balance(token).await?;
        if amount > balance {
            return Err(ContractError::Reverted("insufficient treasury balance".to_string()));
        }
        self.propose(reason, CID.to_string(), self.config.voting_period).await
    }

    async fn delegate(&self, to: Address) -> Result<TxReceipt, ContractError> {
        let from = self.require_signer()?;
        let mut ledger = self.ledger.lock().unwrap();
        ledger.delegates.insert(from, to);
        let power = ledger.power.remove(&from).unwrap_or(0);
        *ledger.power.entry(to).or_insert(0) += power;
        Ok(Self::receipt(&mut ledger))
    }

    async fn undelegate(&self) -> Result<TxReceipt, ContractError> {
        let from = self.require_signer()?;
        let mut ledger = self.ledger.lock().unwrap();
        if ledger.delegates.remove(&from).is_none() {
            return Err(ContractError::Reverted("not delegated".to_string()));
        }
        Ok(Self::receipt(&mut ledger))
    }

    async fn get_delegate(&self, account: Address) -> Result<Address, ContractError> {
        Ok(self
            .ledger
            .lock()
            .unwrap()
            .delegates
            .get(&account)
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn token_name(&self) -> Result<String, ContractError> {
        Ok("GNUS".to_string())
    }

    async fn token_symbol(&self) -> Result<String, ContractError> {
        Ok("GNUS".to_string())
    }

    async fn token_decimals(&self) -> Result<u8, ContractError> {
        Err(ContractError::Unavailable("decimals".to_string()))
    }

    async fn total_supply(&self) -> Result<u128, ContractError> {
        Ok(10_000)
    }

    async fn balance_of(&self, account: Address) -> Result<u128, ContractError> {
        self.voting_power(account).await
    }
}
