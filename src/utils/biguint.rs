use crate::constants::{SCALAR_FIELD_ORDER, SCALAR_NUM_BYTES};
use blstrs::Scalar;
use num_bigint::BigUint;

/// Returns the order of the BLS12-381 scalar field as a `BigUint`.
pub(crate) fn get_scalar_field_order_as_biguint() -> BigUint {
    let r = BigUint::parse_bytes(
        b"73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001",
        16,
    )
    .expect("the scalar field order is a valid hex literal");

    debug_assert_eq!(r.to_bytes_le().len(), SCALAR_NUM_BYTES);

    r
}

/// Converts a `BigUint` strictly smaller than the field order into a `Scalar`.
pub(crate) fn biguint_to_scalar(n: &BigUint) -> Scalar {
    debug_assert!(n < &*SCALAR_FIELD_ORDER);

    let mut bytes = n.to_bytes_le();
    bytes.resize(SCALAR_NUM_BYTES, 0u8);
    let bytes: [u8; SCALAR_NUM_BYTES] = bytes
        .try_into()
        .expect("reduced big integers fit in a scalar encoding");

    Option::<Scalar>::from(Scalar::from_bytes_le(&bytes))
        .expect("values below the field order decode as scalars")
}
