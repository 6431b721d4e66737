//! The PRG-tree DPF construction.
//!
//! Gen walks a virtual binary tree of depth n along the path selected by α, keeping one
//! seed/control-bit register per party. At every level both registers are expanded by the PRG
//! and a shared correction word is emitted; applying the correction whenever the control bit is
//! set forces the two parties' seeds to collide on every node off the special path, so all
//! off-path leaves cancel. The leaf seeds are mapped into the scalar field and a terminal
//! correction pins the on-path sum to β.

use crate::constants::{MAX_TREE_DEPTH, SCALAR_FIELD_ORDER};
use crate::dpf::Dpf;
use crate::error::{Error, Result};
use crate::prg::{Expansion, Prg};
use crate::utils::random::random_bytes;
use crate::utils::{extend_to_bits, xor_bytes};
use blstrs::Scalar;
use ff::Field;
use num_bigint::BigUint;
use num_integer::Integer;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// Full-domain traversals stop forking once the remaining subtree is this shallow; a 2^12-leaf
/// subtree is cheap enough that stealing it is not worth the bookkeeping.
const FORK_SEQ_DEPTH: usize = 12;

/// The tree construction, parameterized by the security parameter λ (PRG seed width) and the
/// tree depth n (domain `[0, 2^n)`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeDpf {
    prg: Prg,
    log_domain: usize,
}

/// The per-level correction: a seed mask plus one control-bit correction per child.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionWord {
    #[serde(with = "serde_bytes")]
    seed: Vec<u8>,
    t_left: bool,
    t_right: bool,
}

/// One party's DPF key. Self-contained and opaque: the two keys of a pair share the correction
/// words and differ only in the root seed and the fixed starting control bit (the party id).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Key {
    party: u8,
    #[serde(with = "serde_bytes")]
    root_seed: Vec<u8>,
    cws: Vec<CorrectionWord>,
    final_cw: Scalar,
}

impl Key {
    pub fn party(&self) -> u8 {
        self.party
    }
}

impl TreeDpf {
    pub fn new(lambda: usize, log_domain: usize) -> Result<Self> {
        let prg = Prg::new(lambda)?;
        if log_domain == 0 || log_domain > MAX_TREE_DEPTH {
            return Err(Error::OutOfRange {
                name: "log_domain",
                value: log_domain as u64,
                lo: 1,
                hi: MAX_TREE_DEPTH as u64,
            });
        }
        Ok(TreeDpf { prg, log_domain })
    }

    pub fn domain_size(&self) -> u64 {
        1u64 << self.log_domain
    }

    /// Maps a leaf seed into the scalar field: the seed is re-expanded by the PRG and the output
    /// is read as a big-endian integer reduced mod the field order. Both parties must agree on
    /// this map bit-exactly, which the fixed PRG guarantees.
    fn convert(&self, seed: &[u8]) -> Result<Scalar> {
        let mut padded = seed.to_vec();
        padded.resize(self.prg.seed_len(), 0u8);

        let out = self.prg.eval(&padded, self.prg.expansion_len())?;
        let n = BigUint::from_bytes_be(&out).mod_floor(&SCALAR_FIELD_ORDER);
        Ok(crate::utils::biguint::biguint_to_scalar(&n))
    }

    /// Expands a node seed and, if the control bit is set, XORs in the correction word before
    /// splitting into the two children.
    fn expand_corrected(&self, seed: &[u8], t: bool, cw: &CorrectionWord) -> Result<Expansion> {
        let mut tau = self.prg.eval(seed, self.prg.expansion_len())?;
        if t {
            let sl = self.prg.seed_len();
            xor_bytes(&mut tau[..sl], &cw.seed)?;
            tau[sl] ^= cw.t_left as u8;
            xor_bytes(&mut tau[sl + 1..2 * sl + 1], &cw.seed)?;
            tau[2 * sl + 1] ^= cw.t_right as u8;
        }
        self.prg.split(&tau)
    }

    fn leaf_value(&self, key: &Key, seed: &[u8], t: bool) -> Result<Scalar> {
        let mut y = self.convert(seed)?;
        if t {
            y += key.final_cw;
        }
        if key.party == 1 {
            y = -y;
        }
        Ok(y)
    }

    fn validate_key(&self, key: &Key) -> Result<()> {
        if key.party > 1 {
            return Err(Error::InvalidPartyId(key.party));
        }
        if key.root_seed.len() != self.prg.seed_len() {
            return Err(Error::LengthMismatch(
                key.root_seed.len(),
                self.prg.seed_len(),
            ));
        }
        if key.cws.len() != self.log_domain {
            return Err(Error::CorrectionWordCount {
                expected: self.log_domain,
                got: key.cws.len(),
            });
        }
        for cw in &key.cws {
            if cw.seed.len() != self.prg.seed_len() {
                return Err(Error::LengthMismatch(cw.seed.len(), self.prg.seed_len()));
            }
        }
        Ok(())
    }

    fn check_point(&self, name: &'static str, x: u64) -> Result<()> {
        if x >= self.domain_size() {
            return Err(Error::OutOfRange {
                name,
                value: x,
                lo: 0,
                hi: self.domain_size() - 1,
            });
        }
        Ok(())
    }

    fn walk(
        &self,
        key: &Key,
        seed: Vec<u8>,
        t: bool,
        depth: usize,
        out: &mut [Scalar],
        parallel: bool,
    ) -> Result<()> {
        if depth == self.log_domain {
            out[0] = self.leaf_value(key, &seed, t)?;
            return Ok(());
        }

        let exp = self.expand_corrected(&seed, t, &key.cws[depth])?;
        let (left, right) = out.split_at_mut(out.len() / 2);

        if parallel && self.log_domain - depth > FORK_SEQ_DEPTH {
            let (a, b) = rayon::join(
                || self.walk(key, exp.left_seed, exp.t_left, depth + 1, left, true),
                || self.walk(key, exp.right_seed, exp.t_right, depth + 1, right, true),
            );
            a?;
            b
        } else {
            self.walk(key, exp.left_seed, exp.t_left, depth + 1, left, false)?;
            self.walk(key, exp.right_seed, exp.t_right, depth + 1, right, false)
        }
    }

    fn full_eval_impl(&self, key: &Key, parallel: bool) -> Result<Vec<Scalar>> {
        self.validate_key(key)?;
        let mut out = vec![Scalar::zero(); 1usize << self.log_domain];
        self.walk(
            key,
            key.root_seed.clone(),
            key.party == 1,
            0,
            &mut out,
            parallel,
        )?;
        Ok(out)
    }
}

impl Dpf for TreeDpf {
    type Key = Key;

    fn log_domain(&self) -> usize {
        self.log_domain
    }

    fn gen<R: RngCore + CryptoRng>(
        &self,
        alpha: u64,
        beta: &Scalar,
        rng: &mut R,
    ) -> Result<(Key, Key)> {
        self.check_point("alpha", alpha)?;
        let alpha_bits = extend_to_bits(alpha, self.log_domain)?;

        let roots = [
            random_bytes(self.prg.seed_len(), rng),
            random_bytes(self.prg.seed_len(), rng),
        ];
        let mut seeds = roots.clone();
        let mut bits = [false, true];
        let mut cws = Vec::with_capacity(self.log_domain);

        for &a in alpha_bits.iter() {
            let exps = [self.prg.expand(&seeds[0])?, self.prg.expand(&seeds[1])?];

            // The loose child sits off the special path; correcting with the XOR of the two
            // parties' loose seeds makes their subtrees below it identical.
            let mut cw_seed = if a {
                exps[0].left_seed.clone()
            } else {
                exps[0].right_seed.clone()
            };
            xor_bytes(
                &mut cw_seed,
                if a {
                    &exps[1].left_seed
                } else {
                    &exps[1].right_seed
                },
            )?;

            let t_cw_left = exps[0].t_left ^ exps[1].t_left ^ a ^ true;
            let t_cw_right = exps[0].t_right ^ exps[1].t_right ^ a;
            let t_cw_keep = if a { t_cw_right } else { t_cw_left };

            for b in 0..2 {
                let (keep_seed, keep_bit) = if a {
                    (&exps[b].right_seed, exps[b].t_right)
                } else {
                    (&exps[b].left_seed, exps[b].t_left)
                };
                if bits[b] {
                    let mut s = keep_seed.clone();
                    xor_bytes(&mut s, &cw_seed)?;
                    seeds[b] = s;
                    bits[b] = keep_bit ^ t_cw_keep;
                } else {
                    seeds[b] = keep_seed.clone();
                    bits[b] = keep_bit;
                }
            }

            cws.push(CorrectionWord {
                seed: cw_seed,
                t_left: t_cw_left,
                t_right: t_cw_right,
            });
        }

        // Terminal correction: pins convert(s₀) - convert(s₁) + correction to β on the special
        // path, with the sign fixed by party 1's final control bit.
        let x0 = self.convert(&seeds[0])?;
        let x1 = self.convert(&seeds[1])?;
        let mut final_cw = *beta - x0 + x1;
        if bits[1] {
            final_cw = -final_cw;
        }

        let [root0, root1] = roots;
        Ok((
            Key {
                party: 0,
                root_seed: root0,
                cws: cws.clone(),
                final_cw,
            },
            Key {
                party: 1,
                root_seed: root1,
                cws,
                final_cw,
            },
        ))
    }

    fn eval(&self, key: &Key, x: u64) -> Result<Scalar> {
        self.validate_key(key)?;
        self.check_point("x", x)?;
        let x_bits = extend_to_bits(x, self.log_domain)?;

        let mut seed = key.root_seed.clone();
        let mut t = key.party == 1;
        for (level, &b) in x_bits.iter().enumerate() {
            let exp = self.expand_corrected(&seed, t, &key.cws[level])?;
            if b {
                seed = exp.right_seed;
                t = exp.t_right;
            } else {
                seed = exp.left_seed;
                t = exp.t_left;
            }
        }

        self.leaf_value(key, &seed, t)
    }

    fn full_eval(&self, key: &Key) -> Result<Vec<Scalar>> {
        self.full_eval_impl(key, false)
    }

    fn full_eval_fast(&self, key: &Key) -> Result<Vec<Scalar>> {
        self.full_eval_impl(key, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::random::random_scalar;
    use rand::thread_rng;

    #[test]
    fn test_point_function_shares() {
        let mut rng = thread_rng();
        let dpf = TreeDpf::new(128, 7).unwrap();
        let beta = Scalar::from(10);
        let (k0, k1) = dpf.gen(5, &beta, &mut rng).unwrap();

        assert_ne!(k0, k1);
        assert_eq!(
            dpf.eval(&k0, 5).unwrap() + dpf.eval(&k1, 5).unwrap(),
            beta
        );
        for x in [0u64, 1, 2, 6] {
            assert_eq!(
                dpf.eval(&k0, x).unwrap() + dpf.eval(&k1, x).unwrap(),
                Scalar::zero(),
                "expected cancellation at {}",
                x
            );
        }
    }

    #[test]
    fn test_eval_deterministic() {
        let mut rng = thread_rng();
        let dpf = TreeDpf::new(128, 6).unwrap();
        let (k0, _) = dpf.gen(9, &random_scalar(&mut rng), &mut rng).unwrap();
        assert_eq!(dpf.eval(&k0, 9).unwrap(), dpf.eval(&k0, 9).unwrap());
    }

    #[test]
    fn test_full_eval_matches_pointwise() {
        let mut rng = thread_rng();
        let dpf = TreeDpf::new(128, 6).unwrap();
        let beta = random_scalar(&mut rng);
        let (k0, k1) = dpf.gen(17, &beta, &mut rng).unwrap();

        for key in [&k0, &k1] {
            let full = dpf.full_eval(key).unwrap();
            assert_eq!(full.len(), 64);
            for x in 0..64u64 {
                assert_eq!(full[x as usize], dpf.eval(key, x).unwrap(), "at {}", x);
            }
            assert_eq!(dpf.full_eval_fast(key).unwrap(), full);
        }

        let full0 = dpf.full_eval(&k0).unwrap();
        let full1 = dpf.full_eval(&k1).unwrap();
        for x in 0..64usize {
            let expected = if x == 17 { beta } else { Scalar::zero() };
            assert_eq!(full0[x] + full1[x], expected, "at {}", x);
        }
    }

    #[test]
    fn test_all_lambdas() {
        let mut rng = thread_rng();
        for lambda in [128, 192, 256] {
            let dpf = TreeDpf::new(lambda, 5).unwrap();
            let beta = random_scalar(&mut rng);
            let (k0, k1) = dpf.gen(3, &beta, &mut rng).unwrap();
            assert_eq!(dpf.eval(&k0, 3).unwrap() + dpf.eval(&k1, 3).unwrap(), beta);
            assert_eq!(
                dpf.eval(&k0, 4).unwrap() + dpf.eval(&k1, 4).unwrap(),
                Scalar::zero()
            );
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut rng = thread_rng();
        let dpf = TreeDpf::new(128, 4).unwrap();
        let beta = random_scalar(&mut rng);
        assert!(dpf.gen(16, &beta, &mut rng).is_err());

        let (k0, _) = dpf.gen(0, &beta, &mut rng).unwrap();
        assert!(dpf.eval(&k0, 16).is_err());
    }

    #[test]
    fn test_rejects_malformed_key() {
        let mut rng = thread_rng();
        let dpf = TreeDpf::new(128, 4).unwrap();
        let (mut k0, _) = dpf.gen(1, &random_scalar(&mut rng), &mut rng).unwrap();

        k0.party = 2;
        assert!(matches!(dpf.eval(&k0, 0), Err(Error::InvalidPartyId(2))));

        k0.party = 0;
        k0.cws.pop();
        assert!(matches!(
            dpf.eval(&k0, 0),
            Err(Error::CorrectionWordCount { .. })
        ));
    }
}
