//! Sparse polynomials over the scalar field, represented as exponent → coefficient maps.
//!
//! Zero coefficients are never stored: every operation that can cancel a term erases the slot, so
//! `num_terms` always counts non-zero terms and `degree` is the largest stored exponent. Dense
//! polynomials (e.g. full-domain DPF expansions) round-trip through [`Polynomial::from_coeffs`].

use crate::algebra::evaluation_domain::EvaluationDomain;
use crate::algebra::fft::{fft_assign, ifft_assign};
use crate::error::{Error, Result};
use blstrs::Scalar;
use ff::Field;
use rand_core::{CryptoRng, RngCore};
use rayon::prelude::*;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Below this bound on the product of term counts, multiplication scans term pairs directly
/// instead of paying for two transforms.
const NAIVE_MUL_CUTOFF: usize = 1024;

/// Term count above which evaluation splits the term list across the worker pool.
const PARALLEL_EVAL_MIN_TERMS: usize = 1024;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polynomial {
    terms: BTreeMap<usize, Scalar>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Polynomial::default()
    }

    pub fn one() -> Self {
        Polynomial::constant(Scalar::one())
    }

    pub fn constant(c: Scalar) -> Self {
        let mut p = Polynomial::zero();
        p.add_term(0, c);
        p
    }

    /// Builds a polynomial from dense coefficients (`coeffs[i]` is the coefficient of X^i).
    pub fn from_coeffs(coeffs: &[Scalar]) -> Self {
        let mut p = Polynomial::zero();
        for (e, c) in coeffs.iter().enumerate() {
            p.add_term(e, *c);
        }
        p
    }

    /// Builds a t-sparse polynomial from parallel exponent/coefficient slices. The slices must
    /// have equal length and the exponents must be unique.
    pub fn sparse(exponents: &[usize], coefficients: &[Scalar]) -> Result<Self> {
        if exponents.len() != coefficients.len() {
            return Err(Error::LengthMismatch(exponents.len(), coefficients.len()));
        }
        let mut p = Polynomial::zero();
        for (&e, &c) in exponents.iter().zip(coefficients.iter()) {
            if p.terms.contains_key(&e) {
                return Err(Error::DuplicateExponent(e));
            }
            p.add_term(e, c);
        }
        Ok(p)
    }

    /// Returns X^degree + 1. With `degree` a power of two this is the 2·degree-th cyclotomic
    /// polynomial over the rationals.
    pub fn cyclotomic(degree: usize) -> Self {
        let mut p = Polynomial::zero();
        p.add_term(0, Scalar::one());
        p.add_term(degree, Scalar::one());
        p
    }

    /// Returns a dense polynomial of the given degree with uniformly random coefficients.
    pub fn random<R>(degree: usize, rng: &mut R) -> Self
    where
        R: RngCore + CryptoRng,
    {
        let coeffs = crate::utils::random::random_scalars(degree + 1, rng);
        Polynomial::from_coeffs(&coeffs)
    }

    /// The largest exponent with a non-zero coefficient, or `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.terms.keys().next_back().copied()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn coeff(&self, exponent: usize) -> Scalar {
        self.terms.get(&exponent).copied().unwrap_or_else(Scalar::zero)
    }

    fn add_term(&mut self, exponent: usize, c: Scalar) {
        if c == Scalar::zero() {
            return;
        }
        match self.terms.entry(exponent) {
            Entry::Vacant(v) => {
                v.insert(c);
            }
            Entry::Occupied(mut o) => {
                let sum = *o.get() + c;
                if sum == Scalar::zero() {
                    o.remove();
                } else {
                    *o.get_mut() = sum;
                }
            }
        }
    }

    pub fn add_assign(&mut self, rhs: &Self) {
        for (&e, &c) in rhs.terms.iter() {
            self.add_term(e, c);
        }
    }

    pub fn sub_assign(&mut self, rhs: &Self) {
        for (&e, &c) in rhs.terms.iter() {
            self.add_term(e, -c);
        }
    }

    /// Multiplies every coefficient by `k`.
    pub fn scale(&mut self, k: &Scalar) {
        if *k == Scalar::zero() {
            self.terms.clear();
            return;
        }
        // A field has no zero divisors, so no term can cancel here.
        for c in self.terms.values_mut() {
            *c *= k;
        }
    }

    pub fn mul(&self, rhs: &Self) -> Result<Self> {
        if self.is_zero() || rhs.is_zero() {
            return Ok(Polynomial::zero());
        }
        if self.num_terms() * rhs.num_terms() < NAIVE_MUL_CUTOFF {
            Ok(self.mul_naive(rhs))
        } else {
            self.mul_fft(rhs)
        }
    }

    fn mul_naive(&self, rhs: &Self) -> Self {
        let mut out = Polynomial::zero();
        for (&e1, &c1) in self.terms.iter() {
            for (&e2, &c2) in rhs.terms.iter() {
                out.add_term(e1 + e2, c1 * c2);
            }
        }
        out
    }

    fn mul_fft(&self, rhs: &Self) -> Result<Self> {
        let d1 = self.degree().expect("checked non-zero");
        let d2 = rhs.degree().expect("checked non-zero");
        let dom = EvaluationDomain::new(d1 + d2 + 1)?;

        let mut lhs_evals = self.to_dense();
        let mut rhs_evals = rhs.to_dense();
        fft_assign(&mut lhs_evals, &dom);
        fft_assign(&mut rhs_evals, &dom);

        for (l, r) in lhs_evals.iter_mut().zip(rhs_evals.iter()) {
            *l *= r;
        }
        ifft_assign(&mut lhs_evals, &dom);

        Ok(Polynomial::from_coeffs(&lhs_evals))
    }

    /// Returns the remainder of long division by `divisor`, which must be monic.
    pub fn rem(&self, divisor: &Self) -> Result<Self> {
        let d = divisor.degree().ok_or(Error::EmptyPolynomial)?;
        if divisor.coeff(d) != Scalar::one() {
            return Err(Error::NonMonicDivisor);
        }

        let mut rem = self.clone();
        while let Some(deg) = rem.degree() {
            if deg < d {
                break;
            }
            let lead = rem.coeff(deg);
            // Subtract lead·X^{deg-d}·divisor; the monic head cancels the leading term.
            for (&e, &c) in divisor.terms.iter() {
                rem.add_term(deg - d + e, -(lead * c));
            }
            debug_assert_eq!(rem.coeff(deg), Scalar::zero());
        }
        Ok(rem)
    }

    /// Evaluates at `x` via Horner's rule on the sorted term list, skipping the gaps between
    /// exponents with square-and-multiply. Large polynomials are split into contiguous chunks
    /// evaluated on the worker pool.
    pub fn evaluate(&self, x: &Scalar) -> Scalar {
        let terms: Vec<(usize, Scalar)> = self.terms.iter().map(|(&e, &c)| (e, c)).collect();
        if terms.len() <= PARALLEL_EVAL_MIN_TERMS {
            return horner(&terms, x);
        }

        let workers = rayon::current_num_threads().max(1);
        let chunk = (terms.len() + workers - 1) / workers;
        terms
            .par_chunks(chunk)
            .map(|slice| horner(slice, x))
            .reduce(Scalar::zero, |a, b| a + b)
    }

    /// Dense coefficient vector of length `degree + 1`.
    fn to_dense(&self) -> Vec<Scalar> {
        let len = self.degree().map_or(0, |d| d + 1);
        let mut out = vec![Scalar::zero(); len];
        for (&e, &c) in self.terms.iter() {
            out[e] = c;
        }
        out
    }
}

/// Evaluates a slice of (exponent, coefficient) pairs, sorted ascending by exponent.
fn horner(terms: &[(usize, Scalar)], x: &Scalar) -> Scalar {
    let mut acc = Scalar::zero();
    let mut prev: Option<usize> = None;
    for &(e, c) in terms.iter().rev() {
        match prev {
            None => acc = c,
            Some(p) => {
                acc *= x.pow_vartime([(p - e) as u64]);
                acc += c;
            }
        }
        prev = Some(e);
    }
    match prev {
        None => Scalar::zero(),
        Some(e) => acc * x.pow_vartime([e as u64]),
    }
}

/// All pairwise products `a[i]·b[j]`, flattened row-major. Used for the quadratic projection
/// weights of the correlation generator.
pub fn outer_product(a: &[Polynomial], b: &[Polynomial]) -> Result<Vec<Polynomial>> {
    (0..a.len() * b.len())
        .into_par_iter()
        .map(|idx| a[idx / b.len()].mul(&b[idx % b.len()]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::random::{random_scalar, random_scalars};
    use rand::thread_rng;

    #[test]
    fn test_degree_and_sparsity() {
        let mut rng = thread_rng();
        assert_eq!(Polynomial::zero().degree(), None);

        let mut p = Polynomial::sparse(&[0, 7, 3], &random_scalars(3, &mut rng)).unwrap();
        assert_eq!(p.degree(), Some(7));
        assert_eq!(p.num_terms(), 3);

        // Cancelling the leading term must erase its slot and drop the degree.
        let mut q = Polynomial::zero();
        q.add_term(7, -p.coeff(7));
        p.add_assign(&q);
        assert_eq!(p.degree(), Some(3));
        assert_eq!(p.num_terms(), 2);
    }

    #[test]
    fn test_sparse_rejects_bad_input() {
        let mut rng = thread_rng();
        assert!(Polynomial::sparse(&[1, 2], &random_scalars(3, &mut rng)).is_err());
        assert!(Polynomial::sparse(&[1, 1], &random_scalars(2, &mut rng)).is_err());
    }

    #[test]
    fn test_add_sub_round_trip() {
        let mut rng = thread_rng();
        let p = Polynomial::random(40, &mut rng);
        let q = Polynomial::random(25, &mut rng);

        let mut r = p.clone();
        r.add_assign(&q);
        r.sub_assign(&q);
        assert_eq!(r, p);
    }

    #[test]
    fn test_mul_naive_fft_agree() {
        let mut rng = thread_rng();
        // Dense enough that num_terms² crosses the transform cutoff.
        let p = Polynomial::random(80, &mut rng);
        let q = Polynomial::random(60, &mut rng);

        let via_fft = p.mul(&q).unwrap();
        let via_naive = p.mul_naive(&q);
        assert_eq!(via_fft, via_naive);

        // Schwartz–Zippel style spot check at a random point.
        let r = random_scalar(&mut rng);
        assert_eq!(via_fft.evaluate(&r), p.evaluate(&r) * q.evaluate(&r));
    }

    #[test]
    fn test_rem_by_monic_divisor() {
        let mut rng = thread_rng();
        let p = Polynomial::random(100, &mut rng);
        let div = Polynomial::cyclotomic(32);

        let rem = p.rem(&div).unwrap();
        assert!(rem.degree().unwrap() < 32);

        // p - rem must be a multiple of the divisor.
        let mut diff = p.clone();
        diff.sub_assign(&rem);
        assert!(diff.rem(&div).unwrap().is_zero());
    }

    #[test]
    fn test_rem_rejects_non_monic() {
        let mut rng = thread_rng();
        let p = Polynomial::random(10, &mut rng);
        let mut div = Polynomial::cyclotomic(4);
        div.scale(&Scalar::from(3));
        assert!(p.rem(&div).is_err());
        assert!(p.rem(&Polynomial::zero()).is_err());
    }

    #[test]
    fn test_evaluate_parallel_matches_sequential() {
        let mut rng = thread_rng();
        let p = Polynomial::random(3000, &mut rng);
        let x = random_scalar(&mut rng);

        let naive: Scalar = (0..=3000)
            .map(|e| p.coeff(e) * x.pow_vartime([e as u64]))
            .sum();
        assert_eq!(p.evaluate(&x), naive);
    }

    #[test]
    fn test_evaluate_sparse_gaps() {
        let mut rng = thread_rng();
        let c = random_scalars(2, &mut rng);
        let p = Polynomial::sparse(&[5, 1000], &c).unwrap();
        let x = random_scalar(&mut rng);
        let expected = c[0] * x.pow_vartime([5u64]) + c[1] * x.pow_vartime([1000u64]);
        assert_eq!(p.evaluate(&x), expected);
    }

    #[test]
    fn test_scale_and_constant() {
        let mut rng = thread_rng();
        let mut p = Polynomial::random(10, &mut rng);
        let q = p.clone();
        let k = random_scalar(&mut rng);
        p.scale(&k);
        let x = random_scalar(&mut rng);
        assert_eq!(p.evaluate(&x), k * q.evaluate(&x));

        p.scale(&Scalar::zero());
        assert!(p.is_zero());
    }

    #[test]
    fn test_outer_product_layout() {
        let mut rng = thread_rng();
        let a = vec![Polynomial::random(3, &mut rng), Polynomial::random(2, &mut rng)];
        let prods = outer_product(&a, &a).unwrap();
        assert_eq!(prods.len(), 4);
        assert_eq!(prods[1], a[0].mul(&a[1]).unwrap());
        assert_eq!(prods[2], a[1].mul(&a[0]).unwrap());
    }
}
