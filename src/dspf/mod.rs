//! Distributed sums of point functions.
//!
//! A DSPF key stacks t independent DPF keys under one evaluation interface, secret-sharing the
//! t-sparse function Σ_i f_{αᵢ,βᵢ}. The correlation generator uses full-domain expansions of
//! these keys to hand each party an additive share of a sparse polynomial.

use crate::dpf::{tree, Dpf, TreeDpf};
use crate::error::{Error, Result};
use blstrs::Scalar;
use ff::Field;
use rand_core::{CryptoRng, RngCore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A DSPF over t point functions sharing one domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dspf {
    dpf: TreeDpf,
}

/// One party's DSPF key: an ordered sequence of inner DPF keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DspfKey {
    keys: Vec<tree::Key>,
}

impl DspfKey {
    /// The number t of stacked point functions.
    pub fn num_points(&self) -> usize {
        self.keys.len()
    }

    /// Concatenated tagged encoding of the inner keys.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let tagged: Vec<Vec<u8>> = self
            .keys
            .iter()
            .map(crate::dpf::serialize_key)
            .collect::<Result<_>>()?;
        Ok(bcs::to_bytes(&tagged)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let tagged: Vec<Vec<u8>> = bcs::from_bytes(bytes)?;
        let keys = tagged
            .iter()
            .map(|b| crate::dpf::deserialize_key(b))
            .collect::<Result<_>>()?;
        Ok(DspfKey { keys })
    }
}

impl Dspf {
    pub fn new(lambda: usize, log_domain: usize) -> Result<Self> {
        Ok(Dspf {
            dpf: TreeDpf::new(lambda, log_domain)?,
        })
    }

    pub fn log_domain(&self) -> usize {
        self.dpf.log_domain()
    }

    /// Splits Σ_i f_{αᵢ,βᵢ} into two keys by generating one DPF pair per point. The special
    /// points must be pairwise distinct; a repeated point would let the two evaluations overlap
    /// and weakens the pseudorandomness of the keys.
    pub fn gen<R: RngCore + CryptoRng>(
        &self,
        alphas: &[u64],
        betas: &[Scalar],
        rng: &mut R,
    ) -> Result<(DspfKey, DspfKey)> {
        if alphas.len() != betas.len() {
            return Err(Error::LengthMismatch(alphas.len(), betas.len()));
        }
        let distinct: BTreeSet<u64> = alphas.iter().copied().collect();
        if distinct.len() != alphas.len() {
            return Err(Error::DuplicateSpecialPoints);
        }

        let mut keys0 = Vec::with_capacity(alphas.len());
        let mut keys1 = Vec::with_capacity(alphas.len());
        for (alpha, beta) in alphas.iter().zip(betas.iter()) {
            let (k0, k1) = self.dpf.gen(*alpha, beta, rng)?;
            keys0.push(k0);
            keys1.push(k1);
        }

        Ok((DspfKey { keys: keys0 }, DspfKey { keys: keys1 }))
    }

    /// Evaluates every inner DPF at `x`, returning t scalars in key order.
    pub fn eval(&self, key: &DspfKey, x: u64) -> Result<Vec<Scalar>> {
        key.keys.iter().map(|k| self.dpf.eval(k, x)).collect()
    }

    /// Combines the two parties' [`Dspf::eval`] outputs at one point: the element-wise sums
    /// reconstruct at most one βᵢ. Returns that value, zero if no point matched, or an error if
    /// several positions reconstruct non-zero (colliding special points).
    pub fn combine_single(y0: &[Scalar], y1: &[Scalar]) -> Result<Scalar> {
        if y0.len() != y1.len() {
            return Err(Error::LengthMismatch(y0.len(), y1.len()));
        }

        let mut value = Scalar::zero();
        let mut seen_non_zero = false;
        for (a, b) in y0.iter().zip(y1.iter()) {
            let sum = a + b;
            if sum != Scalar::zero() {
                if seen_non_zero {
                    return Err(Error::MultipleNonZero);
                }
                value = sum;
                seen_non_zero = true;
            }
        }
        Ok(value)
    }

    /// Expands every inner DPF over the whole domain: a t × 2^n matrix in key order.
    pub fn full_eval(&self, key: &DspfKey) -> Result<Vec<Vec<Scalar>>> {
        key.keys.iter().map(|k| self.dpf.full_eval(k)).collect()
    }

    /// Same output as [`Dspf::full_eval`], with one worker per inner DPF. The first worker
    /// error wins and the sibling results are discarded.
    pub fn full_eval_fast(&self, key: &DspfKey) -> Result<Vec<Vec<Scalar>>> {
        key.keys
            .par_iter()
            .map(|k| self.dpf.full_eval_fast(k))
            .collect()
    }

    /// The column-wise sum over the t rows of [`Dspf::full_eval_fast`]: this party's additive
    /// share of the stacked sparse function, as one dense length-2^n vector. Field addition
    /// commutes, so the summation order is immaterial.
    pub fn full_eval_aggregated(&self, key: &DspfKey) -> Result<Vec<Scalar>> {
        let rows = self.full_eval_fast(key)?;
        let mut acc = vec![Scalar::zero(); 1usize << self.log_domain()];
        for row in rows {
            for (a, v) in acc.iter_mut().zip(row.into_iter()) {
                *a += v;
            }
        }
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::random::random_scalar;
    use rand::thread_rng;

    fn setup() -> (Dspf, DspfKey, DspfKey, Vec<u64>, Vec<Scalar>) {
        let mut rng = thread_rng();
        let dspf = Dspf::new(128, 7).unwrap();
        let alphas = vec![1u64, 5, 27];
        let betas = vec![Scalar::from(3), Scalar::from(61), Scalar::from(82)];
        let (k0, k1) = dspf.gen(&alphas, &betas, &mut rng).unwrap();
        (dspf, k0, k1, alphas, betas)
    }

    #[test]
    fn test_combine_single_at_points() {
        let (dspf, k0, k1, _, _) = setup();

        let at = |x: u64| {
            Dspf::combine_single(
                &dspf.eval(&k0, x).unwrap(),
                &dspf.eval(&k1, x).unwrap(),
            )
            .unwrap()
        };

        assert_eq!(at(2), Scalar::zero());
        assert_eq!(at(5), Scalar::from(61));
        assert_eq!(at(27), Scalar::from(82));
    }

    #[test]
    fn test_gen_rejects_duplicates() {
        let mut rng = thread_rng();
        let dspf = Dspf::new(128, 7).unwrap();
        let betas = vec![random_scalar(&mut rng), random_scalar(&mut rng)];
        assert!(matches!(
            dspf.gen(&[5, 5], &betas, &mut rng),
            Err(Error::DuplicateSpecialPoints)
        ));
        assert!(dspf.gen(&[5], &betas, &mut rng).is_err());
    }

    #[test]
    fn test_combine_single_detects_collision() {
        // Hand-build colliding evaluations: two positions reconstruct non-zero.
        let y0 = vec![Scalar::from(1), Scalar::from(2)];
        let y1 = vec![Scalar::from(2), Scalar::from(5)];
        assert!(matches!(
            Dspf::combine_single(&y0, &y1),
            Err(Error::MultipleNonZero)
        ));
    }

    #[test]
    fn test_full_eval_matrix() {
        let (dspf, k0, k1, alphas, betas) = setup();

        let m0 = dspf.full_eval(&k0).unwrap();
        let m1 = dspf.full_eval(&k1).unwrap();
        assert_eq!(m0.len(), 3);
        assert_eq!(m0[0].len(), 128);
        assert_eq!(dspf.full_eval_fast(&k0).unwrap(), m0);

        for (i, (alpha, beta)) in alphas.iter().zip(betas.iter()).enumerate() {
            for x in 0..128usize {
                let sum = m0[i][x] + m1[i][x];
                let expected = if x as u64 == *alpha { *beta } else { Scalar::zero() };
                assert_eq!(sum, expected, "row {} at {}", i, x);
            }
        }
    }

    #[test]
    fn test_aggregated_is_column_sum() {
        let (dspf, k0, k1, alphas, betas) = setup();

        let agg0 = dspf.full_eval_aggregated(&k0).unwrap();
        let agg1 = dspf.full_eval_aggregated(&k1).unwrap();

        for x in 0..128usize {
            let sum = agg0[x] + agg1[x];
            let expected = alphas
                .iter()
                .zip(betas.iter())
                .find(|(a, _)| **a == x as u64)
                .map(|(_, b)| *b)
                .unwrap_or_else(Scalar::zero);
            assert_eq!(sum, expected, "at {}", x);
        }
    }

    #[test]
    fn test_key_serialization_round_trip() {
        let (dspf, k0, _, _, _) = setup();
        let bytes = k0.to_bytes().unwrap();
        let back = DspfKey::from_bytes(&bytes).unwrap();
        assert_eq!(back, k0);
        // A deserialized key evaluates identically.
        assert_eq!(
            dspf.eval(&back, 5).unwrap(),
            dspf.eval(&k0, 5).unwrap()
        );
    }
}
