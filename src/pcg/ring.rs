use crate::algebra::Polynomial;
use crate::error::{Error, Result};
use crate::utils::random::random_scalar;
use blstrs::Scalar;
use ff::{Field, PrimeField};
use rand_core::{CryptoRng, RngCore};
use std::collections::BTreeSet;

/// The evaluation ring F_q[X]/(div): a monic divisor polynomial of degree 2^N together with its
/// 2^N pairwise-distinct roots. Each root yields one signing tuple per seed evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    div: Polynomial,
    roots: Vec<Scalar>,
}

impl Ring {
    /// The negacyclic ring X^{2^N} + 1. Its roots are exactly the primitive 2^{N+1}-th roots of
    /// unity, i.e. the odd powers of a generator of the 2^{N+1}-torsion of F_q*; the field's
    /// 2-adicity must cover 2^{N+1}.
    pub fn cyclotomic(log_degree: usize) -> Result<Self> {
        if log_degree == 0 || log_degree + 1 > Scalar::S as usize {
            return Err(Error::DomainTooLarge(log_degree + 1));
        }

        let omega =
            Scalar::root_of_unity().pow_vartime([1u64 << (Scalar::S as usize - (log_degree + 1))]);
        debug_assert_eq!(
            omega.pow_vartime([1u64 << log_degree]),
            -Scalar::one(),
            "the generator must square down to -1"
        );

        let omega_sq = omega.square();
        let mut roots = Vec::with_capacity(1usize << log_degree);
        let mut cur = omega;
        for _ in 0..1usize << log_degree {
            roots.push(cur);
            cur *= omega_sq;
        }

        let ring = Ring {
            div: Polynomial::cyclotomic(1usize << log_degree),
            roots,
        };
        ring.check()?;
        Ok(ring)
    }

    /// A ring of 2^N uniformly random (distinct) roots, with div = Π (X − rᵢ) built by a
    /// product tree.
    pub fn random<R>(log_degree: usize, rng: &mut R) -> Result<Self>
    where
        R: RngCore + CryptoRng,
    {
        if log_degree == 0 {
            return Err(Error::DomainTooLarge(0));
        }
        let n = 1usize << log_degree;

        let mut seen = BTreeSet::new();
        let mut roots = Vec::with_capacity(n);
        while roots.len() < n {
            let r = random_scalar(rng);
            if seen.insert(r.to_bytes_be()) {
                roots.push(r);
            }
        }

        let factors: Vec<Polynomial> = roots
            .iter()
            .map(|r| Polynomial::from_coeffs(&[-*r, Scalar::one()]))
            .collect();
        let div = product_tree(&factors)?;

        let ring = Ring { div, roots };
        ring.check()?;
        Ok(ring)
    }

    fn check(&self) -> Result<()> {
        let degree = self.div.degree().ok_or(Error::EmptyPolynomial)?;
        if degree != self.roots.len() || self.div.coeff(degree) != Scalar::one() {
            return Err(Error::RingInvariant(
                "divisor must be monic of degree equal to the root count",
            ));
        }

        let distinct: BTreeSet<[u8; 32]> = self.roots.iter().map(|r| r.to_bytes_be()).collect();
        if distinct.len() != self.roots.len() {
            return Err(Error::RingInvariant("roots must be pairwise distinct"));
        }

        for root in &self.roots {
            if self.div.evaluate(root) != Scalar::zero() {
                return Err(Error::RingInvariant("every root must vanish on the divisor"));
            }
        }
        Ok(())
    }

    pub fn divisor(&self) -> &Polynomial {
        &self.div
    }

    pub fn roots(&self) -> &[Scalar] {
        &self.roots
    }

    pub fn degree(&self) -> usize {
        self.roots.len()
    }
}

/// Multiplies the factors pairwise up a binary tree, so the expensive products near the root run
/// through the transform-based path.
fn product_tree(factors: &[Polynomial]) -> Result<Polynomial> {
    match factors.len() {
        0 => Ok(Polynomial::one()),
        1 => Ok(factors[0].clone()),
        n => {
            let (lo, hi) = factors.split_at(n / 2);
            product_tree(lo)?.mul(&product_tree(hi)?)
        }
    }
}
