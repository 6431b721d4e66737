use crate::error::{Error, Result};
use blstrs::Scalar;
use ff::{Field, PrimeField};

/// A radix-2 evaluation domain over the scalar field: the (2^k)-th roots of unity for the
/// smallest power of two 2^k that covers the requested size, together with the auxiliary values
/// an FFT of that size needs.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationDomain {
    pub(crate) log_size: usize,
    pub(crate) size: usize,
    pub(crate) omega: Scalar,
    pub(crate) omega_inv: Scalar,
    pub(crate) size_inv: Scalar,
}

impl EvaluationDomain {
    /// Creates the smallest power-of-two domain with at least `min_size` elements.
    pub fn new(min_size: usize) -> Result<Self> {
        if min_size == 0 {
            return Err(Error::OutOfRange {
                name: "domain size",
                value: 0,
                lo: 1,
                hi: 1 << Scalar::S,
            });
        }

        let size = min_size.next_power_of_two();
        let log_size = size.trailing_zeros() as usize;
        if log_size > Scalar::S as usize {
            return Err(Error::DomainTooLarge(log_size));
        }

        // `root_of_unity()` generates the full 2^S-torsion; square down to order 2^log_size.
        let omega = Scalar::root_of_unity().pow_vartime([1u64 << (Scalar::S as usize - log_size)]);
        let omega_inv = Option::<Scalar>::from(omega.invert())
            .expect("a root of unity is invertible");
        let size_inv = Option::<Scalar>::from(Scalar::from(size as u64).invert())
            .expect("a power of two is invertible in a field of odd order");

        debug_assert_eq!(omega.pow_vartime([size as u64]), Scalar::one());

        Ok(EvaluationDomain {
            log_size,
            size,
            omega,
            omega_inv,
            size_inv,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns ω^i.
    pub fn element(&self, i: usize) -> Scalar {
        self.omega.pow_vartime([(i % self.size) as u64])
    }

    /// Returns all domain elements ω^0, ω^1, …, ω^{size-1} in order.
    pub fn elements(&self) -> Vec<Scalar> {
        let mut out = Vec::with_capacity(self.size);
        let mut cur = Scalar::one();
        for _ in 0..self.size {
            out.push(cur);
            cur *= self.omega;
        }
        out
    }
}
