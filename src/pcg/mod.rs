//! A pseudorandom correlation generator for BBS+-style signing tuples.
//!
//! A trusted dealer ([`dealer::gen`]) embeds VOLE and OLE correlations between every ordered
//! pair of parties into DSPF keys and hands each party one short seed. Evaluating a seed
//! ([`eval`]) expands it into six share polynomials over an evaluation ring; reading those
//! polynomials at each of the ring's 2^N roots yields 2^N correlated signing tuples per party.

use crate::constants::{ALLOWED_LAMBDAS, MAX_LOG_DOMAIN, MIN_LOG_DOMAIN};
use crate::error::{Error, Result};

pub mod dealer;
pub mod eval;
pub mod ring;
pub mod seed;

pub use eval::{eval_combined, eval_separate, BbsPlusTuple, SeparateEvaluation, TupleGenerator};
pub use ring::Ring;
pub use seed::PcgSeed;

/// The generator's parameters: the PRG security parameter λ, the point-function domain 2^N, the
/// number of parties n, the signing threshold τ, and the Module-LPN compression/noise weights
/// (c, t).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcgConfig {
    lambda: usize,
    log_domain: usize,
    parties: usize,
    threshold: usize,
    c: usize,
    t: usize,
}

impl PcgConfig {
    pub fn new(
        lambda: usize,
        log_domain: usize,
        parties: usize,
        threshold: usize,
        c: usize,
        t: usize,
    ) -> Result<Self> {
        if !ALLOWED_LAMBDAS.contains(&lambda) {
            return Err(Error::UnsupportedLambda(lambda));
        }
        if log_domain < MIN_LOG_DOMAIN || log_domain > MAX_LOG_DOMAIN {
            return Err(Error::OutOfRange {
                name: "log_domain",
                value: log_domain as u64,
                lo: MIN_LOG_DOMAIN as u64,
                hi: MAX_LOG_DOMAIN as u64,
            });
        }
        if parties < 2 {
            return Err(Error::OutOfRange {
                name: "parties",
                value: parties as u64,
                lo: 2,
                hi: u64::MAX,
            });
        }
        if threshold == 0 || threshold > parties {
            return Err(Error::OutOfRange {
                name: "threshold",
                value: threshold as u64,
                lo: 1,
                hi: parties as u64,
            });
        }
        if c < 2 {
            return Err(Error::OutOfRange {
                name: "c",
                value: c as u64,
                lo: 2,
                hi: u64::MAX,
            });
        }
        if t < 2 {
            return Err(Error::OutOfRange {
                name: "t",
                value: t as u64,
                lo: 2,
                hi: u64::MAX,
            });
        }
        // The t-sparse vectors must fit their domain, and the t²-sparse outer sums must have a
        // fighting chance of being collision-free in the doubled domain.
        if (t * t) as u64 > 1u64 << log_domain {
            return Err(Error::OutOfRange {
                name: "t^2",
                value: (t * t) as u64,
                lo: 0,
                hi: 1u64 << log_domain,
            });
        }
        Ok(PcgConfig {
            lambda,
            log_domain,
            parties,
            threshold,
            c,
            t,
        })
    }

    pub fn lambda(&self) -> usize {
        self.lambda
    }

    /// N: the primary point-function domain is `[0, 2^N)`; the OLE embeddings live in the
    /// doubled domain `[0, 2^{N+1})`.
    pub fn log_domain(&self) -> usize {
        self.log_domain
    }

    pub fn domain_size(&self) -> usize {
        1usize << self.log_domain
    }

    pub fn parties(&self) -> usize {
        self.parties
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn compression(&self) -> usize {
        self.c
    }

    pub fn noise_weight(&self) -> usize {
        self.t
    }
}
