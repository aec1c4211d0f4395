//! Remote-first evaluation with a local fallback
//!
//! Several contract helpers (quorum check, quadratic math) may be missing
//! from a partially deployed Diamond. Callers hand in the remote call and a
//! local computation; the remote answer wins whenever it is available.

use std::future::Future;

use log::{debug, warn};

use crate::governance::contract::ContractError;

/// Where a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackOutcome<T> {
    pub value: T,
    pub source: Source,
}

impl<T> FallbackOutcome<T> {
    pub fn is_local(&self) -> bool {
        self.source == Source::Local
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Await `remote`; on any contract error log it and evaluate `local`
pub async fn with_fallback<T, Fut, L>(label: &str, remote: Fut, local: L) -> FallbackOutcome<T>
where
    Fut: Future<Output = Result<T, ContractError>>,
    L: FnOnce() -> T,
{
    match remote.await {
        Ok(value) => {
            debug!("{}: using contract result", label);
            FallbackOutcome {
                value,
                source: Source::Remote,
            }
        }
        Err(e) => {
            warn!("{} failed on contract, using local fallback: {}", label, e);
            FallbackOutcome {
                value: local(),
                source: Source::Local,
            }
        }
    }
}

/// Like [`with_fallback`] for local computations that can themselves fail
pub async fn try_with_fallback<T, E, Fut, L>(label: &str, remote: Fut, local: L) -> Result<FallbackOutcome<T>, E>
where
    Fut: Future<Output = Result<T, ContractError>>,
    L: FnOnce() -> Result<T, E>,
{
    match remote.await {
        Ok(value) => Ok(FallbackOutcome {
            value,
            source: Source::Remote,
        }),
        Err(e) => {
            warn!("{} failed on contract, using local fallback: {}", label, e);
            local().map(|value| FallbackOutcome {
                value,
                source: Source::Local,
            })
        }
    }
}

/// Degrade a failed read to the type's zero value
pub async fn or_default<T, Fut>(label: &str, remote: Fut) -> T
where
    T: Default,
    Fut: Future<Output = Result<T, ContractError>>,
{
    with_fallback(label, remote, T::default).await.value
}
