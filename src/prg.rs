//! A length-doubling pseudorandom generator built from AES in counter mode.
//!
//! The seed is used directly as the AES key and the keystream over an all-zero input (with an
//! all-zero IV) is the PRG output, so evaluation is deterministic per seed. The tree-based point
//! function expands every node seed into two child seeds plus two control bits; [`Prg::split`]
//! carves that layout out of a raw expansion.

use crate::constants::ALLOWED_LAMBDAS;
use crate::error::{Error, Result};
use openssl::symm::{encrypt, Cipher};

/// A PRG keyed by `lambda`-bit seeds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Prg {
    lambda: usize,
}

/// One node expansion split into its two child seeds and control bits.
#[derive(Clone, Debug)]
pub struct Expansion {
    pub left_seed: Vec<u8>,
    pub t_left: bool,
    pub right_seed: Vec<u8>,
    pub t_right: bool,
}

impl Prg {
    pub fn new(lambda: usize) -> Result<Self> {
        if !ALLOWED_LAMBDAS.contains(&lambda) {
            return Err(Error::UnsupportedLambda(lambda));
        }
        Ok(Prg { lambda })
    }

    /// The seed (and AES key) length in bytes.
    pub fn seed_len(&self) -> usize {
        self.lambda / 8
    }

    /// The length of one node expansion: two child seeds plus one separator byte per child
    /// carrying a control bit in its low bit.
    pub fn expansion_len(&self) -> usize {
        2 * (self.seed_len() + 1)
    }

    /// Evaluates the PRG on `seed`, producing `out_len` pseudorandom bytes.
    pub fn eval(&self, seed: &[u8], out_len: usize) -> Result<Vec<u8>> {
        if seed.len() != self.seed_len() {
            return Err(Error::LengthMismatch(seed.len(), self.seed_len()));
        }

        // Zero nonce: evaluation must be deterministic per seed.
        let iv = [0u8; 16];
        let data = vec![0u8; out_len];

        let cipher = match self.lambda {
            128 => Cipher::aes_128_ctr(),
            192 => Cipher::aes_192_ctr(),
            256 => Cipher::aes_256_ctr(),
            _ => unreachable!("lambda validated in Prg::new"),
        };

        let mut out = encrypt(cipher, seed, Some(&iv), &data)
            .expect("AES-CTR evaluation failed on well-formed inputs");

        if out.len() < out_len {
            return Err(Error::PrgOutputLength {
                expected: out_len,
                got: out.len(),
            });
        }
        out.truncate(out_len);

        Ok(out)
    }

    /// Splits a raw node expansion into `(s_l, t_l, s_r, t_r)`. The layout is
    /// `s_l (λ/8 bytes) ‖ sep ‖ s_r (λ/8 bytes) ‖ sep`, with each control bit in the low bit of
    /// its separator byte.
    pub fn split(&self, buf: &[u8]) -> Result<Expansion> {
        if buf.len() != self.expansion_len() {
            return Err(Error::PrgOutputLength {
                expected: self.expansion_len(),
                got: buf.len(),
            });
        }

        let sl = self.seed_len();
        Ok(Expansion {
            left_seed: buf[..sl].to_vec(),
            t_left: buf[sl] & 1 == 1,
            right_seed: buf[sl + 1..2 * sl + 1].to_vec(),
            t_right: buf[2 * sl + 1] & 1 == 1,
        })
    }

    /// Evaluates and splits one node expansion.
    pub fn expand(&self, seed: &[u8]) -> Result<Expansion> {
        let out = self.eval(seed, self.expansion_len())?;
        self.split(&out)
    }
}
