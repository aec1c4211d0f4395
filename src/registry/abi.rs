use sha3::{Digest, Keccak256};
use thiserror::Error;

use super::address::Address;

/// Errors raised while building contract calldata
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Malformed function signature: {0}")]
    MalformedSignature(String),

    #[error("Unknown governance function: {0}")]
    UnknownFunction(String),

    #[error("Unsupported parameter type: {0}")]
    UnsupportedType(String),

    #[error("{signature} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        signature: String,
        expected: usize,
        actual: usize,
    },

    #[error("Argument {index} of {signature} must be {expected}")]
    TypeMismatch {
        signature: String,
        index: usize,
        expected: String,
    },
}

/// Whether a function mutates chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    View,
    Write,
}

/// One entry of the governance Diamond's ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiFunction {
    pub name: &'static str,
    pub signature: &'static str,
    pub kind: CallKind,
}

impl AbiFunction {
    pub fn selector(&self) -> [u8; 4] {
        selector(self.signature)
    }

    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector()))
    }
}

macro_rules! abi_fn {
    ($name:literal, $sig:literal, $kind:ident) => {
        AbiFunction {
            name: $name,
            signature: $sig,
            kind: CallKind::$kind,
        }
    };
}

/// Function fragments the client calls on the governance Diamond
pub static GOVERNANCE_ABI: &[AbiFunction] = &[
    // Proposals
    abi_fn!("getProposalCount", "getProposalCount()", View),
    abi_fn!("getProposal", "getProposal(uint256)", View),
    abi_fn!("getProposalState", "getProposalState(uint256)", View),
    abi_fn!("propose", "propose(string,string,uint256)", Write),
    abi_fn!("cancelProposal", "cancelProposal(uint256)", Write),
    abi_fn!("queueProposal", "queueProposal(uint256)", Write),
    abi_fn!("executeProposal", "executeProposal(uint256)", Write),
    // Voting
    abi_fn!("castVote", "castVote(uint256,uint8)", Write),
    abi_fn!("castVoteWithReason", "castVoteWithReason(uint256,uint8,string)", Write),
    // Facets that take support as a boolean
    abi_fn!("castVote", "castVote(uint256,bool)", Write),
    abi_fn!("castVoteWithReason", "castVoteWithReason(uint256,bool,string)", Write),
    abi_fn!("castQuadraticVote", "castQuadraticVote(uint256,uint256,bool)", Write),
    abi_fn!("hasVoted", "hasVoted(uint256,address)", View),
    abi_fn!("getReceipt", "getReceipt(uint256,address)", View),
    abi_fn!("getVotingConfig", "getVotingConfig()", View),
    abi_fn!("checkQuorum", "checkQuorum(uint256,uint256)", View),
    abi_fn!("getVotingPower", "getVotingPower(address)", View),
    abi_fn!("getVoteCredits", "getVoteCredits(address)", View),
    // Quadratic helpers
    abi_fn!("calculateQuadraticCost", "calculateQuadraticCost(uint256)", View),
    abi_fn!("getQuadraticVoteWeight", "getQuadraticVoteWeight(uint256)", View),
    abi_fn!("calculateMaxVotes", "calculateMaxVotes(uint256)", View),
    abi_fn!("calculateOptimalVotes", "calculateOptimalVotes(uint256,uint256)", View),
    // Treasury
    abi_fn!("getTreasuryBalance", "getTreasuryBalance(address)", View),
    abi_fn!("depositToTreasury", "depositToTreasury(address,uint256)", Write),
    abi_fn!("proposeWithdrawal", "proposeWithdrawal(address,address,uint256,string)", Write),
    // Delegation
    abi_fn!("delegate", "delegate(address)", Write),
    abi_fn!("undelegate", "undelegate()", Write),
    abi_fn!("getDelegate", "getDelegate(address)", View),
    // Token
    abi_fn!("name", "name()", View),
    abi_fn!("symbol", "symbol()", View),
    abi_fn!("decimals", "decimals()", View),
    abi_fn!("totalSupply", "totalSupply()", View),
    abi_fn!("balanceOf", "balanceOf(address)", View),
];

/// Look up an ABI entry by function name
pub fn function(name: &str) -> Option<&'static AbiFunction> {
    GOVERNANCE_ABI.iter().find(|f| f.name == name)
}

/// Look up an ABI entry by its canonical signature
pub fn function_by_signature(signature: &str) -> Option<&'static AbiFunction> {
    GOVERNANCE_ABI.iter().find(|f| f.signature == signature)
}

/// First four bytes of keccak256 of the canonical signature
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Argument value for calldata encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Uint(u128),
    Uint8(u8),
    Address(Address),
    Bool(bool),
    String(String),
}

fn param_types(signature: &str) -> Result<Vec<&str>, AbiError> {
    let open = signature
        .find('(')
        .ok_or_else(|| AbiError::MalformedSignature(signature.to_string()))?;
    if open == 0 || !signature.ends_with(')') {
        return Err(AbiError::MalformedSignature(signature.to_string()));
    }
    let inner = &signature[open + 1..signature.len() - 1];
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    Ok(inner.split(',').map(str::trim).collect())
}

fn uint_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Build calldata: selector followed by head/tail encoded arguments
pub fn encode_call(signature: &str, args: &[Token]) -> Result<Vec<u8>, AbiError> {
    let types = param_types(signature)?;
    if types.len() != args.len() {
        return Err(AbiError::ArgumentCount {
            signature: signature.to_string(),
            expected: types.len(),
            actual: args.len(),
        });
    }

    let head_size = 32 * types.len();
    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (index, (ty, arg)) in types.iter().zip(args).enumerate() {
        match (*ty, arg) {
            ("uint256", Token::Uint(v)) => head.extend_from_slice(&uint_word(*v)),
            ("uint8", Token::Uint8(v)) => head.extend_from_slice(&uint_word(*v as u128)),
            ("address", Token::Address(a)) => head.extend_from_slice(&a.to_word()),
            ("bool", Token::Bool(b)) => head.extend_from_slice(&uint_word(*b as u128)),
            ("string", Token::String(s)) => {
                head.extend_from_slice(&uint_word((head_size + tail.len()) as u128));
                tail.extend_from_slice(&uint_word(s.len() as u128));
                tail.extend_from_slice(s.as_bytes());
                let padding = (32 - s.len() % 32) % 32;
                tail.extend(std::iter::repeat(0u8).take(padding));
            }
            ("uint256" | "uint8" | "address" | "bool" | "string", _) => {
                return Err(AbiError::TypeMismatch {
                    signature: signature.to_string(),
                    index,
                    expected: ty.to_string(),
                });
            }
            (other, _) => return Err(AbiError::UnsupportedType(other.to_string())),
        }
    }

    let mut calldata = Vec::with_capacity(4 + head.len() + tail.len());
    calldata.extend_from_slice(&selector(signature));
    calldata.extend_from_slice(&head);
    calldata.extend_from_slice(&tail);
    Ok(calldata)
}

/// Parse textual arguments into tokens for the parameter types of `signature`
pub fn parse_args(signature: &str, args: &[String]) -> Result<Vec<Token>, AbiError> {
    let types = param_types(signature)?;
    if types.len() != args.len() {
        return Err(AbiError::ArgumentCount {
            signature: signature.to_string(),
            expected: types.len(),
            actual: args.len(),
        });
    }

    types
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (ty, raw))| {
            let mismatch = || AbiError::TypeMismatch {
                signature: signature.to_string(),
                index,
                expected: ty.to_string(),
            };
            match *ty {
                "uint256" => raw.parse().map(Token::Uint).map_err(|_| mismatch()),
                "uint8" => raw.parse().map(Token::Uint8).map_err(|_| mismatch()),
                "address" => raw.parse().map(Token::Address).map_err(|_| mismatch()),
                "bool" => raw.parse().map(Token::Bool).map_err(|_| mismatch()),
                "string" => Ok(Token::String(raw.clone())),
                other => Err(AbiError::UnsupportedType(other.to_string())),
            }
        })
        .collect()
}
