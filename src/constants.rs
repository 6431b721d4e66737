use blstrs::Scalar;
use ff::PrimeField;
use num_bigint::BigUint;
use once_cell::sync::Lazy;

//
// Sizes
//

/// The size in bytes of a scalar of the BLS12-381 scalar field.
pub const SCALAR_NUM_BYTES: usize = 32;

/// The security parameters (in bits) accepted by the PRG-based constructions. Each maps to an AES
/// key size used by the counter-mode PRG.
pub const ALLOWED_LAMBDAS: [usize; 3] = [128, 192, 256];

//
// Domain bounds
//

/// Smallest point-function domain (in bits) the correlation generator supports.
pub const MIN_LOG_DOMAIN: usize = 10;

/// Largest point-function domain (in bits) the correlation generator supports. The secondary
/// domain used by the degree-doubling correlations is one bit wider.
pub const MAX_LOG_DOMAIN: usize = 22;

/// Deepest tree the distributed point function will descend.
pub const MAX_TREE_DEPTH: usize = 32;

// The secondary domain `MAX_LOG_DOMAIN + 1` must still fit under the 2-adicity of the scalar
// field, so that every supported domain admits a cyclotomic evaluation ring.
static_assertions::const_assert!(MAX_LOG_DOMAIN + 1 <= Scalar::S as usize);
static_assertions::const_assert!(MAX_TREE_DEPTH <= Scalar::S as usize);

/// The order of the BLS12-381 scalar field, as a `BigUint` for wide-integer reductions.
pub(crate) static SCALAR_FIELD_ORDER: Lazy<BigUint> =
    Lazy::new(crate::utils::biguint::get_scalar_field_order_as_biguint);
