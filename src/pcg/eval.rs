//! Seed evaluation: expanding one party's seed into share polynomials and signing tuples.
//!
//! Each party reconstructs its sparse witness polynomials, consumes its DSPF slices by
//! full-domain expansion, and projects everything against the caller-supplied randomness
//! polynomials modulo the ring divisor. The combined path folds all counterparties together
//! (n-out-of-n); the separate path keeps per-counterparty shares apart so a τ-out-of-n signer
//! set can weight them with 0-Lagrange coefficients later.

use crate::algebra::polynomial::{outer_product, Polynomial};
use crate::algebra::ShamirConfig;
use crate::dspf::{Dspf, DspfKey};
use crate::error::{Error, Result};
use crate::pcg::ring::Ring;
use crate::pcg::seed::PcgSeed;
use crate::pcg::PcgConfig;
use blstrs::Scalar;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// One pre-computed signing tuple. Across the parties of a signing session the shares satisfy
/// the BBS+ multiplicative relations: Σa · Σs = Σα and Σa · (sk + Σe) = Σδ.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BbsPlusTuple {
    pub sk_share: Scalar,
    pub a_share: Scalar,
    pub e_share: Scalar,
    pub s_share: Scalar,
    pub alpha_share: Scalar,
    pub delta_share: Scalar,
}

/// The six share polynomials a party derives from its seed. Evaluating them at a ring root
/// yields one tuple; iterating over all 2^N roots yields the whole batch.
#[derive(Clone, Debug)]
pub struct TupleGenerator {
    ski: Scalar,
    a: Polynomial,
    e: Polynomial,
    s: Polynomial,
    alpha: Polynomial,
    delta0: Polynomial,
    delta1: Polynomial,
}

impl TupleGenerator {
    pub fn key_share(&self) -> &Scalar {
        &self.ski
    }

    pub fn tuple_at(&self, root: &Scalar) -> BbsPlusTuple {
        BbsPlusTuple {
            sk_share: self.ski,
            a_share: self.a.evaluate(root),
            e_share: self.e.evaluate(root),
            s_share: self.s.evaluate(root),
            alpha_share: self.alpha.evaluate(root),
            delta_share: self.delta0.evaluate(root) + self.delta1.evaluate(root),
        }
    }

    /// All tuples of the batch, one per ring root, in root order.
    pub fn tuples<'a>(&'a self, ring: &'a Ring) -> impl Iterator<Item = BbsPlusTuple> + 'a {
        ring.roots().iter().map(move |r| self.tuple_at(r))
    }
}

/// The cross-party share polynomials retained per counterparty by the separate path. `forward`
/// pieces come from key-0 slices (this party supplied the vector, the counterparty the scalar),
/// `backward` pieces from the mirrored key-1 slices.
#[derive(Clone, Debug)]
pub struct CounterpartyShares {
    delta0_forward: Polynomial,
    delta0_backward: Polynomial,
    alpha_forward: Polynomial,
    alpha_backward: Polynomial,
    delta1_forward: Polynomial,
    delta1_backward: Polynomial,
}

/// The τ-out-of-n evaluation result: own share polynomials plus per-counterparty pieces that
/// still await signer-set selection and Lagrange weighting.
#[derive(Clone, Debug)]
pub struct SeparateEvaluation {
    index: usize,
    threshold: usize,
    parties: usize,
    ski: Scalar,
    a: Polynomial,
    e: Polynomial,
    s: Polynomial,
    own_alpha: Polynomial,
    own_delta0: Polynomial,
    own_delta1: Polynomial,
    per_party: BTreeMap<usize, CounterpartyShares>,
}

impl SeparateEvaluation {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Collapses the per-counterparty pieces for a concrete signer set.
    ///
    /// The signing-key shares are Shamir shares, so every piece that carries the key is scaled
    /// by a 0-Lagrange coefficient: this party's own coefficient for its own term and for
    /// `backward` pieces (whose key-share factor is ours), and the counterparty's coefficient
    /// for `forward` pieces (whose key-share factor is theirs). The purely multiplicative OLE
    /// pieces are selected, not weighted.
    pub fn combine_for_signers(&self, signers: &[usize]) -> Result<TupleGenerator> {
        let pos = signers
            .iter()
            .position(|&s| s == self.index)
            .ok_or(Error::SignerSet("signer set must include this party"))?;

        let shamir = ShamirConfig::new(self.threshold, self.parties)?;
        let lagr = shamir.lagrange_at_zero(signers)?;
        let own_coeff = lagr[pos];

        let mut alpha = self.own_alpha.clone();
        let mut delta1 = self.own_delta1.clone();
        let mut delta0 = self.own_delta0.clone();
        delta0.scale(&own_coeff);

        for (signer_pos, &j) in signers.iter().enumerate() {
            if j == self.index {
                continue;
            }
            let shares = self
                .per_party
                .get(&j)
                .ok_or(Error::SignerSet("no shares for this counterparty"))?;

            alpha.add_assign(&shares.alpha_forward);
            alpha.add_assign(&shares.alpha_backward);
            delta1.add_assign(&shares.delta1_forward);
            delta1.add_assign(&shares.delta1_backward);

            let mut fwd = shares.delta0_forward.clone();
            fwd.scale(&lagr[signer_pos]);
            delta0.add_assign(&fwd);

            let mut bwd = shares.delta0_backward.clone();
            bwd.scale(&own_coeff);
            delta0.add_assign(&bwd);
        }

        Ok(TupleGenerator {
            ski: self.ski * own_coeff,
            a: self.a.clone(),
            e: self.e.clone(),
            s: self.s.clone(),
            alpha,
            delta0,
            delta1,
        })
    }
}

/// The n-out-of-n fast path: folds every counterparty into one set of share polynomials.
pub fn eval_combined(
    config: &PcgConfig,
    seed: &PcgSeed,
    rand: &[Polynomial],
    ring: &Ring,
) -> Result<TupleGenerator> {
    validate(config, seed, rand, ring)?;
    tracing::debug!(party = seed.index, "evaluating seed (combined path)");
    let pieces = evaluate_pieces(config, seed, ring)?;
    let div = ring.divisor();

    let mut utilde = pieces.utilde_own;
    for polys in pieces.vole_fwd.values().chain(pieces.vole_bwd.values()) {
        for (r, p) in polys.iter().enumerate() {
            utilde[r].add_assign(p);
        }
    }
    let mut w = pieces.w_own;
    for polys in pieces.as_fwd.values().chain(pieces.as_bwd.values()) {
        for (rs, p) in polys.iter().enumerate() {
            w[rs].add_assign(p);
        }
    }
    let mut m = pieces.m_own;
    for polys in pieces.ae_fwd.values().chain(pieces.ae_bwd.values()) {
        for (rs, p) in polys.iter().enumerate() {
            m[rs].add_assign(p);
        }
    }

    let oprand = outer_product(rand, rand)?;

    Ok(TupleGenerator {
        ski: seed.ski,
        a: project(&pieces.u, rand, div)?,
        e: project(&pieces.v, rand, div)?,
        s: project(&pieces.k, rand, div)?,
        delta0: project(&utilde, rand, div)?,
        alpha: project(&w, &oprand, div)?,
        delta1: project(&m, &oprand, div)?,
    })
}

/// The τ-out-of-n separate path: projects every piece but keeps counterparty attribution.
pub fn eval_separate(
    config: &PcgConfig,
    seed: &PcgSeed,
    rand: &[Polynomial],
    ring: &Ring,
) -> Result<SeparateEvaluation> {
    validate(config, seed, rand, ring)?;
    tracing::debug!(party = seed.index, "evaluating seed (separate path)");
    let pieces = evaluate_pieces(config, seed, ring)?;
    let div = ring.divisor();

    let oprand = outer_product(rand, rand)?;

    let mut per_party = BTreeMap::new();
    for j in pieces.vole_fwd.keys() {
        per_party.insert(
            *j,
            CounterpartyShares {
                delta0_forward: project(&pieces.vole_fwd[j], rand, div)?,
                delta0_backward: project(&pieces.vole_bwd[j], rand, div)?,
                alpha_forward: project(&pieces.as_fwd[j], &oprand, div)?,
                alpha_backward: project(&pieces.as_bwd[j], &oprand, div)?,
                delta1_forward: project(&pieces.ae_fwd[j], &oprand, div)?,
                delta1_backward: project(&pieces.ae_bwd[j], &oprand, div)?,
            },
        );
    }

    Ok(SeparateEvaluation {
        index: seed.index,
        threshold: config.threshold(),
        parties: config.parties(),
        ski: seed.ski,
        a: project(&pieces.u, rand, div)?,
        e: project(&pieces.v, rand, div)?,
        s: project(&pieces.k, rand, div)?,
        own_alpha: project(&pieces.w_own, &oprand, div)?,
        own_delta0: project(&pieces.utilde_own, rand, div)?,
        own_delta1: project(&pieces.m_own, &oprand, div)?,
        per_party,
    })
}

/// Everything the two projection paths share: the party's own polynomials and the expanded,
/// ring-reduced DSPF slices.
struct Pieces {
    u: Vec<Polynomial>,
    v: Vec<Polynomial>,
    k: Vec<Polynomial>,
    utilde_own: Vec<Polynomial>,
    w_own: Vec<Polynomial>,
    m_own: Vec<Polynomial>,
    vole_fwd: BTreeMap<usize, Vec<Polynomial>>,
    vole_bwd: BTreeMap<usize, Vec<Polynomial>>,
    as_fwd: BTreeMap<usize, Vec<Polynomial>>,
    as_bwd: BTreeMap<usize, Vec<Polynomial>>,
    ae_fwd: BTreeMap<usize, Vec<Polynomial>>,
    ae_bwd: BTreeMap<usize, Vec<Polynomial>>,
}

fn evaluate_pieces(config: &PcgConfig, seed: &PcgSeed, ring: &Ring) -> Result<Pieces> {
    let div = ring.divisor();

    let u = build_family(&seed.exponents.a, &seed.coefficients.a)?;
    let v = build_family(&seed.exponents.e, &seed.coefficients.e)?;
    let k = build_family(&seed.exponents.s, &seed.coefficients.s)?;

    let utilde_own: Vec<Polynomial> = u
        .iter()
        .map(|p| {
            let mut q = p.clone();
            q.scale(&seed.ski);
            q
        })
        .collect();

    let w_own = pairwise_products(&u, &k, div)?;
    let m_own = pairwise_products(&u, &v, div)?;

    let dspf = Dspf::new(config.lambda(), config.log_domain())?;
    let dspf_wide = Dspf::new(config.lambda(), config.log_domain() + 1)?;

    let mut vole_fwd = BTreeMap::new();
    let mut vole_bwd = BTreeMap::new();
    for (j, keys) in &seed.vole {
        vole_fwd.insert(*j, expand_slices(&dspf, &keys.forward, div)?);
        vole_bwd.insert(*j, expand_slices(&dspf, &keys.backward, div)?);
    }

    let mut as_fwd = BTreeMap::new();
    let mut as_bwd = BTreeMap::new();
    for (j, keys) in &seed.ole_as {
        as_fwd.insert(*j, expand_slices(&dspf_wide, &keys.forward, div)?);
        as_bwd.insert(*j, expand_slices(&dspf_wide, &keys.backward, div)?);
    }

    let mut ae_fwd = BTreeMap::new();
    let mut ae_bwd = BTreeMap::new();
    for (j, keys) in &seed.ole_ae {
        ae_fwd.insert(*j, expand_slices(&dspf_wide, &keys.forward, div)?);
        ae_bwd.insert(*j, expand_slices(&dspf_wide, &keys.backward, div)?);
    }

    Ok(Pieces {
        u,
        v,
        k,
        utilde_own,
        w_own,
        m_own,
        vole_fwd,
        vole_bwd,
        as_fwd,
        as_bwd,
        ae_fwd,
        ae_bwd,
    })
}

/// Expands each DSPF key over its full domain, aggregates the t rows column-wise, and reduces
/// the resulting dense polynomial into the ring.
fn expand_slices(dspf: &Dspf, keys: &[DspfKey], div: &Polynomial) -> Result<Vec<Polynomial>> {
    keys.iter()
        .map(|key| {
            let acc = dspf.full_eval_aggregated(key)?;
            Polynomial::from_coeffs(&acc).rem(div)
        })
        .collect()
}

fn build_family(exponents: &[Vec<u64>], coefficients: &[Vec<Scalar>]) -> Result<Vec<Polynomial>> {
    exponents
        .iter()
        .zip(coefficients.iter())
        .map(|(e_row, c_row)| {
            let exps: Vec<usize> = e_row.iter().map(|&e| e as usize).collect();
            Polynomial::sparse(&exps, c_row)
        })
        .collect()
}

/// All c² ring-reduced products a[r]·b[s], flattened row-major.
fn pairwise_products(
    a: &[Polynomial],
    b: &[Polynomial],
    div: &Polynomial,
) -> Result<Vec<Polynomial>> {
    let c = a.len();
    (0..c * c)
        .into_par_iter()
        .map(|idx| a[idx / c].mul(&b[idx % c])?.rem(div))
        .collect()
}

/// Σ_r weights[r]·pieces[r] mod div, fanned out over the worker pool and merged at the join.
/// The final weight is the constant one by contract, so its term is added unmultiplied.
fn project(pieces: &[Polynomial], weights: &[Polynomial], div: &Polynomial) -> Result<Polynomial> {
    debug_assert_eq!(pieces.len(), weights.len());
    (0..pieces.len())
        .into_par_iter()
        .map(|r| -> Result<Polynomial> {
            let term = if r + 1 == weights.len() {
                pieces[r].clone()
            } else {
                weights[r].mul(&pieces[r])?
            };
            term.rem(div)
        })
        .try_reduce(Polynomial::zero, |mut acc, p| {
            acc.add_assign(&p);
            Ok(acc)
        })
}

fn validate(config: &PcgConfig, seed: &PcgSeed, rand: &[Polynomial], ring: &Ring) -> Result<()> {
    let c = config.compression();
    let t = config.noise_weight();

    if rand.len() != c {
        return Err(Error::LengthMismatch(rand.len(), c));
    }
    if rand[c - 1] != Polynomial::one() {
        return Err(Error::LastRandomnessNotOne);
    }
    if ring.degree() != config.domain_size() {
        return Err(Error::RingInvariant(
            "ring degree must equal the configured domain size",
        ));
    }

    if seed.index >= config.parties() {
        return Err(Error::MalformedSeed("party index out of range"));
    }
    for rows in [&seed.exponents.a, &seed.exponents.e, &seed.exponents.s] {
        if rows.len() != c || rows.iter().any(|row| row.len() != t) {
            return Err(Error::MalformedSeed("exponent rows must be c × t"));
        }
    }
    for rows in [
        &seed.coefficients.a,
        &seed.coefficients.e,
        &seed.coefficients.s,
    ] {
        if rows.len() != c || rows.iter().any(|row| row.len() != t) {
            return Err(Error::MalformedSeed("coefficient rows must be c × t"));
        }
    }

    let others = config.parties() - 1;
    if seed.vole.len() != others || seed.ole_as.len() != others || seed.ole_ae.len() != others {
        return Err(Error::MalformedSeed("missing counterparty slices"));
    }
    for keys in seed.vole.values() {
        if keys.forward.len() != c || keys.backward.len() != c {
            return Err(Error::MalformedSeed("vole slices must hold c keys"));
        }
    }
    for keys in seed.ole_as.values().chain(seed.ole_ae.values()) {
        if keys.forward.len() != c * c || keys.backward.len() != c * c {
            return Err(Error::MalformedSeed("ole slices must hold c² keys"));
        }
    }

    Ok(())
}
