//! Two-party distributed point functions.
//!
//! A point function f_{α,β} returns β at the single special input α and zero everywhere else. A
//! DPF splits it into two keys such that each key alone is pseudorandom while the two
//! evaluations at any x sum to f_{α,β}(x) in the scalar field.

use crate::error::{Error, Result};
use blstrs::Scalar;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

pub mod tree;

pub use tree::TreeDpf;

/// The interface shared by the DPF constructions: key generation by a dealer, point evaluation,
/// and expansion over the full input domain.
pub trait Dpf {
    type Key;

    /// The input domain is `[0, 2^log_domain)`.
    fn log_domain(&self) -> usize;

    /// Splits f_{α,β} into two keys. The dealer must keep the keys secret from the opposite
    /// party; each key alone reveals nothing about (α, β).
    fn gen<R: RngCore + CryptoRng>(
        &self,
        alpha: u64,
        beta: &Scalar,
        rng: &mut R,
    ) -> Result<(Self::Key, Self::Key)>;

    /// Evaluates one party's share at `x`.
    fn eval(&self, key: &Self::Key, x: u64) -> Result<Scalar>;

    /// Evaluates one party's share at every point of the domain, in index order.
    fn full_eval(&self, key: &Self::Key) -> Result<Vec<Scalar>>;

    /// Same output as [`Dpf::full_eval`], computed on the worker pool.
    fn full_eval_fast(&self, key: &Self::Key) -> Result<Vec<Scalar>>;
}

/// Discriminates key encodings on the wire. The enumeration is closed: decoding an unknown or
/// retired variant fails rather than guessing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyTag {
    /// Keys of the PRG-tree construction in [`tree`].
    TreeDpf,
    /// Keys of the retired characteristic-two construction; kept so old encodings are
    /// recognized and rejected explicitly.
    GfDpf,
}

#[derive(Serialize, Deserialize)]
struct TaggedKey {
    tag: KeyTag,
    #[serde(with = "serde_bytes")]
    body: Vec<u8>,
}

/// Encodes a tree-DPF key as a tagged, length-prefixed binary string.
pub fn serialize_key(key: &tree::Key) -> Result<Vec<u8>> {
    let tagged = TaggedKey {
        tag: KeyTag::TreeDpf,
        body: bcs::to_bytes(key)?,
    };
    Ok(bcs::to_bytes(&tagged)?)
}

/// Decodes a tagged key encoding produced by [`serialize_key`].
pub fn deserialize_key(bytes: &[u8]) -> Result<tree::Key> {
    let tagged: TaggedKey = bcs::from_bytes(bytes)?;
    match tagged.tag {
        KeyTag::TreeDpf => Ok(bcs::from_bytes(&tagged.body)?),
        KeyTag::GfDpf => Err(Error::NotImplemented(
            "characteristic-two DPF keys are not supported",
        )),
    }
}
