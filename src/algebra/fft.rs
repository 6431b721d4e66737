//! Iterative radix-2 number-theoretic transforms over the scalar field.

use crate::algebra::evaluation_domain::EvaluationDomain;
use blstrs::Scalar;
use ff::Field;

/// In-place NTT of `coeffs` over `dom`, padding with zeros up to the domain size. On return,
/// `coeffs[i]` holds the evaluation at ω^i.
pub fn fft_assign(coeffs: &mut Vec<Scalar>, dom: &EvaluationDomain) {
    debug_assert!(coeffs.len() <= dom.size);
    coeffs.resize(dom.size, Scalar::zero());
    ntt_in_place(coeffs, &dom.omega, dom.log_size);
}

/// Returns the evaluations of the polynomial with coefficients `coeffs` at every domain element.
pub fn fft(coeffs: &[Scalar], dom: &EvaluationDomain) -> Vec<Scalar> {
    let mut out = coeffs.to_vec();
    fft_assign(&mut out, dom);
    out
}

/// In-place inverse NTT: recovers coefficients from evaluations over the domain.
pub fn ifft_assign(evals: &mut Vec<Scalar>, dom: &EvaluationDomain) {
    debug_assert!(evals.len() <= dom.size);
    evals.resize(dom.size, Scalar::zero());
    ntt_in_place(evals, &dom.omega_inv, dom.log_size);
    for e in evals.iter_mut() {
        *e *= dom.size_inv;
    }
}

fn ntt_in_place(a: &mut [Scalar], omega: &Scalar, log_n: usize) {
    let n = a.len();
    debug_assert_eq!(n, 1 << log_n);
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation.
    for i in 0..n as u64 {
        let j = i.reverse_bits() >> (64 - log_n);
        if i < j {
            a.swap(i as usize, j as usize);
        }
    }

    let mut len = 2;
    while len <= n {
        let stride_root = omega.pow_vartime([(n / len) as u64]);
        for start in (0..n).step_by(len) {
            let mut w = Scalar::one();
            for k in 0..len / 2 {
                let t = a[start + k + len / 2] * w;
                let u = a[start + k];
                a[start + k] = u + t;
                a[start + k + len / 2] = u - t;
                w *= stride_root;
            }
        }
        len <<= 1;
    }
}
