use thiserror::Error;

/// Errors surfaced by the DPF/DSPF constructions, the polynomial layer and the correlation
/// generator. Fatal conditions (entropy exhaustion, internal length-invariant violations) abort
/// the process instead of appearing here.
#[derive(Debug, Error)]
pub enum Error {
    //
    // Parameter-range errors
    //
    #[error("security parameter must be one of 128, 192 or 256 bits, got {0}")]
    UnsupportedLambda(usize),

    #[error("{name} = {value} is out of range [{lo}, {hi}]")]
    OutOfRange {
        name: &'static str,
        value: u64,
        lo: u64,
        hi: u64,
    },

    #[error("value {value} does not fit in {bits} bits")]
    BitLength { value: u64, bits: usize },

    #[error("a domain of size 2^{0} exceeds the 2-adicity of the scalar field")]
    DomainTooLarge(usize),

    //
    // Structural-invariant errors
    //
    #[error("byte strings differ in length ({0} vs {1})")]
    LengthMismatch(usize, usize),

    #[error("PRG produced {got} bytes, expected {expected}")]
    PrgOutputLength { expected: usize, got: usize },

    #[error("key party id must be 0 or 1, got {0}")]
    InvalidPartyId(u8),

    #[error("key holds {got} correction words, expected {expected}")]
    CorrectionWordCount { expected: usize, got: usize },

    #[error("special points contain duplicates")]
    DuplicateSpecialPoints,

    #[error("combined evaluation has multiple non-zero elements")]
    MultipleNonZero,

    #[error("failed to sample collision-free special points after {0} attempts")]
    SpecialPointSampling(usize),

    #[error("seed does not match the configuration: {0}")]
    MalformedSeed(&'static str),

    #[error("evaluation ring invariant violated: {0}")]
    RingInvariant(&'static str),

    #[error("the last randomness polynomial must be the constant one")]
    LastRandomnessNotOne,

    #[error("invalid signer set: {0}")]
    SignerSet(&'static str),

    //
    // Arithmetic-precondition errors
    //
    #[error("element is not invertible")]
    NotInvertible,

    #[error("divisor polynomial must be monic")]
    NonMonicDivisor,

    #[error("polynomial has no terms")]
    EmptyPolynomial,

    #[error("duplicate exponent {0} in sparse polynomial")]
    DuplicateExponent(usize),

    //
    // Codec and variant errors
    //
    #[error("operation is not available for this variant: {0}")]
    NotImplemented(&'static str),

    #[error("key deserialization failed: {0}")]
    KeyCodec(#[from] bcs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
