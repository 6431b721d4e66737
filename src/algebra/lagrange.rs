use crate::algebra::evaluation_domain::EvaluationDomain;
use crate::error::{Error, Result};
use blstrs::Scalar;
use ff::Field;

/// Inverts every element of `elems` in place with a single field inversion (Montgomery's trick).
/// Fails if any element is zero.
pub fn batch_inversion(elems: &mut [Scalar]) -> Result<()> {
    let mut prefix = Vec::with_capacity(elems.len());
    let mut acc = Scalar::one();
    for e in elems.iter() {
        if *e == Scalar::zero() {
            return Err(Error::NotInvertible);
        }
        prefix.push(acc);
        acc *= e;
    }

    let mut inv = Option::<Scalar>::from(acc.invert()).ok_or(Error::NotInvertible)?;

    for (e, p) in elems.iter_mut().zip(prefix.into_iter()).rev() {
        let orig = *e;
        *e = inv * p;
        inv *= orig;
    }

    Ok(())
}

/// Computes the Lagrange coefficients at zero for the interpolation points `{ω^id}` indexed by
/// `ids` over `dom`:
///
/// ```text
/// L_j(0) = Π_{k ≠ j} (0 - x_k) / (x_j - x_k)
/// ```
///
/// The `ids` must be pairwise distinct. The coefficient vector is ordered like `ids`.
pub fn lagrange_coefficients_at_zero(
    dom: &EvaluationDomain,
    ids: &[usize],
) -> Result<Vec<Scalar>> {
    if ids.is_empty() {
        return Err(Error::EmptyPolynomial);
    }
    for (j, id) in ids.iter().enumerate() {
        if ids[j + 1..].contains(id) {
            return Err(Error::DuplicateSpecialPoints);
        }
    }

    let xs: Vec<Scalar> = ids.iter().map(|&i| dom.element(i)).collect();
    let m = xs.len();

    // Numerators Π_{k ≠ j} (-x_k) and denominators Π_{k ≠ j} (x_j - x_k); the denominators are
    // inverted in one batch.
    let mut denominators = Vec::with_capacity(m);
    for j in 0..m {
        let mut denom = Scalar::one();
        for k in 0..m {
            if k != j {
                denom *= xs[j] - xs[k];
            }
        }
        denominators.push(denom);
    }
    batch_inversion(&mut denominators)?;

    let mut coeffs = Vec::with_capacity(m);
    for j in 0..m {
        let mut num = Scalar::one();
        for (k, x) in xs.iter().enumerate() {
            if k != j {
                num *= -x;
            }
        }
        coeffs.push(num * denominators[j]);
    }

    Ok(coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::random::random_scalars;
    use rand::thread_rng;

    #[test]
    fn test_batch_inversion() {
        let mut rng = thread_rng();
        let v = random_scalars(10, &mut rng);
        let mut inv = v.clone();
        batch_inversion(&mut inv).unwrap();
        for (a, b) in v.iter().zip(inv.iter()) {
            assert_eq!(a * b, Scalar::one());
        }
    }

    #[test]
    fn test_batch_inversion_rejects_zero() {
        let mut v = vec![Scalar::one(), Scalar::zero()];
        assert!(batch_inversion(&mut v).is_err());
    }

    #[test]
    fn test_coefficients_sum_interpolates_constant() {
        // For the constant polynomial f(X) = c, every share equals c, so the weighted sum of any
        // subset's shares must reconstruct c; hence the coefficients sum to one.
        let dom = EvaluationDomain::new(8).unwrap();
        let coeffs = lagrange_coefficients_at_zero(&dom, &[1, 3, 6]).unwrap();
        let sum: Scalar = coeffs.iter().copied().sum();
        assert_eq!(sum, Scalar::one());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let dom = EvaluationDomain::new(8).unwrap();
        assert!(lagrange_coefficients_at_zero(&dom, &[1, 3, 1]).is_err());
    }
}
