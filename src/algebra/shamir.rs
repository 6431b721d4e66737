use crate::algebra::evaluation_domain::EvaluationDomain;
use crate::algebra::fft::fft;
use crate::algebra::lagrange::lagrange_coefficients_at_zero;
use crate::error::{Error, Result};
use crate::utils::random::random_scalars;
use blstrs::Scalar;
use rand_core::{CryptoRng, RngCore};
use std::fmt::{Display, Formatter};
use std::ops::Mul;

/// A τ-out-of-n secret sharing configuration: any τ or more of the n parties can reconstruct a
/// shared scalar. Shares are evaluations of a random degree-(τ-1) polynomial at the roots of
/// unity ω^0, …, ω^{n-1} of the embedded evaluation domain.
#[derive(Clone, Debug)]
pub struct ShamirConfig {
    threshold: usize,
    parties: usize,
    dom: EvaluationDomain,
}

impl ShamirConfig {
    pub fn new(threshold: usize, parties: usize) -> Result<Self> {
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
        let dom = EvaluationDomain::new(parties)?;
        Ok(ShamirConfig {
            threshold,
            parties,
            dom,
        })
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Splits `secret` into n shares. The sharing polynomial has `secret` as its constant term
    /// and τ-1 random higher coefficients, drawn from `rng` in a fixed order.
    pub fn share<R>(&self, secret: &Scalar, rng: &mut R) -> Vec<Scalar>
    where
        R: RngCore + CryptoRng,
    {
        let mut coeffs = random_scalars(self.threshold, rng);
        coeffs[0] = *secret;

        let mut evals = fft(&coeffs, &self.dom);
        evals.truncate(self.parties);
        evals
    }

    /// The 0-Lagrange coefficients for the subset of parties `ids`, ordered like `ids`. At least
    /// τ pairwise-distinct ids are required.
    pub fn lagrange_at_zero(&self, ids: &[usize]) -> Result<Vec<Scalar>> {
        if ids.len() < self.threshold {
            return Err(Error::OutOfRange {
                name: "subset size",
                value: ids.len() as u64,
                lo: self.threshold as u64,
                hi: self.parties as u64,
            });
        }
        for &id in ids {
            if id >= self.parties {
                return Err(Error::OutOfRange {
                    name: "party id",
                    value: id as u64,
                    lo: 0,
                    hi: self.parties as u64 - 1,
                });
            }
        }
        lagrange_coefficients_at_zero(&self.dom, ids)
    }

    /// Reconstructs the secret from at least τ (party id, share) pairs.
    pub fn reconstruct_at_zero(&self, shares: &[(usize, Scalar)]) -> Result<Scalar> {
        let ids: Vec<usize> = shares.iter().map(|(id, _)| *id).collect();
        let lagr = self.lagrange_at_zero(&ids)?;

        Ok(shares
            .iter()
            .zip(lagr.iter())
            .map(|((_, share), coeff)| share.mul(coeff))
            .sum())
    }
}

impl Display for ShamirConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-out-of-{}/shamir", self.threshold, self.parties)
    }
}
