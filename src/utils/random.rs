use crate::constants::{SCALAR_FIELD_ORDER, SCALAR_NUM_BYTES};
use crate::utils::biguint::biguint_to_scalar;
use blstrs::Scalar;
use num_bigint::BigUint;
use num_integer::Integer;
use rand::Rng;
use rand_core::{CryptoRng, RngCore};

/// Returns a uniformly random `Scalar`, by reducing twice as many random bytes as a scalar
/// occupies modulo the field order.
pub fn random_scalar<R>(rng: &mut R) -> Scalar
where
    R: RngCore + CryptoRng,
{
    let mut bytes = [0u8; 2 * SCALAR_NUM_BYTES];
    rng.try_fill_bytes(&mut bytes)
        .expect("entropy source exhausted");

    let bignum = BigUint::from_bytes_le(&bytes);
    let remainder = bignum.mod_floor(&SCALAR_FIELD_ORDER);

    biguint_to_scalar(&remainder)
}

/// Returns a vector of `n` uniformly random `Scalar`s.
pub fn random_scalars<R>(n: usize, rng: &mut R) -> Vec<Scalar>
where
    R: RngCore + CryptoRng,
{
    let mut v = Vec::with_capacity(n);

    for _ in 0..n {
        v.push(random_scalar(rng));
    }

    debug_assert_eq!(v.len(), n);

    v
}

/// Returns `len` random bytes. Entropy exhaustion is fatal.
pub fn random_bytes<R>(len: usize, rng: &mut R) -> Vec<u8>
where
    R: RngCore + CryptoRng,
{
    let mut bytes = vec![0u8; len];
    rng.try_fill_bytes(&mut bytes)
        .expect("entropy source exhausted");
    bytes
}

/// Returns a single random bit. Entropy exhaustion is fatal.
pub fn random_bit<R>(rng: &mut R) -> bool
where
    R: RngCore + CryptoRng,
{
    random_bytes(1, rng)[0] & 1 == 1
}

/// Samples `count` distinct values from `[0, 2^log_domain)` and returns them sorted ascending.
///
/// `count` must be small relative to the domain; the dealer's parameter validation guarantees
/// this, so the collision loop terminates quickly.
pub fn random_distinct_sorted<R>(count: usize, log_domain: usize, rng: &mut R) -> Vec<u64>
where
    R: RngCore + CryptoRng,
{
    debug_assert!(log_domain < 64);
    debug_assert!((count as u64) <= 1u64 << log_domain);

    let bound = 1u64 << log_domain;
    let mut picked = std::collections::BTreeSet::new();
    while picked.len() < count {
        picked.insert(rng.gen_range(0..bound));
    }
    picked.into_iter().collect()
}
