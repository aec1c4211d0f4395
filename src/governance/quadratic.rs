//! Quadratic voting arithmetic
//!
//! `cost(v) = v²` credits buy `v` votes and `weight(cost) = ⌊√cost⌋`. The
//! contract evaluates these canonically; the functions here mirror them for
//! when the helper facets are missing.

use serde::Serialize;

/// Integer floor square root
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }

    let bits = 128 - n.leading_zeros();
    let mut x = 1u128 << ((bits + 1) / 2);
    loop {
        let next = (x + n / x) >> 1;
        if next >= x {
            return x;
        }
        x = next;
    }
}

/// Credits needed to cast `votes` votes; `None` on overflow
pub fn quadratic_cost(votes: u128) -> Option<u128> {
    votes.checked_mul(votes)
}

/// Vote weight bought by spending `cost` credits
pub fn quadratic_weight(cost: u128) -> u128 {
    isqrt(cost)
}

/// Largest vote count affordable with `credits`
pub fn max_votes(credits: u128) -> u128 {
    isqrt(credits)
}

/// Votes per proposal when splitting `credits` evenly across `proposal_count`
pub fn optimal_votes(credits: u128, proposal_count: u128) -> u128 {
    if proposal_count == 0 {
        return 0;
    }
    isqrt(credits / proposal_count)
}

/// Cost breakdown shown before a quadratic vote is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuadraticQuote {
    pub votes: u128,
    pub cost: u128,
    pub weight: u128,
    pub available_credits: u128,
    pub remaining_credits: u128,
    pub affordable: bool,
}

impl QuadraticQuote {
    pub fn new(votes: u128, cost: u128, weight: u128, available_credits: u128) -> Self {
        QuadraticQuote {
            votes,
            cost,
            weight,
            available_credits,
            remaining_credits: available_credits.saturating_sub(cost),
            affordable: cost <= available_credits,
        }
    }
}
