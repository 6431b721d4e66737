//! Trusted-dealer seed generation.
//!
//! The dealer samples the signing key and the Module-LPN witness, then embeds the pairwise
//! correlations into DSPF key material: for every ordered party pair (i, j) a VOLE tying party
//! j's key share to party i's signing randomness, and two OLE tensors tying the randomness to
//! the blinding vectors. Party i receives only the tensor slices it will consume.
//!
//! Generation is strictly sequential: entropy is drawn in a fixed order, so a seeded RNG
//! reproduces the same seeds bit for bit.

use crate::algebra::ShamirConfig;
use crate::dspf::Dspf;
use crate::error::{Error, Result};
use crate::pcg::seed::{CoefficientRows, CorrelationKeys, ExponentRows, PcgSeed};
use crate::pcg::PcgConfig;
use crate::utils::random::{random_distinct_sorted, random_scalar, random_scalars};
use blstrs::Scalar;
use rand_core::{CryptoRng, RngCore};
use std::collections::{BTreeMap, BTreeSet};

/// How often the dealer redraws the exponent witness before giving up on finding collision-free
/// outer sums. With t² well below the doubled domain a handful of attempts suffices.
const MAX_SAMPLING_ATTEMPTS: usize = 64;

type ExponentMatrix = Vec<Vec<Vec<u64>>>;

/// Deals one seed per party.
pub fn gen<R>(config: &PcgConfig, rng: &mut R) -> Result<Vec<PcgSeed>>
where
    R: RngCore + CryptoRng,
{
    let n = config.parties();
    let c = config.compression();
    let t = config.noise_weight();

    tracing::debug!(
        parties = n,
        threshold = config.threshold(),
        log_domain = config.log_domain(),
        c,
        t,
        "dealing correlation seeds"
    );

    // 1. The signing key, shared τ-out-of-n.
    let shamir = ShamirConfig::new(config.threshold(), n)?;
    let sk = random_scalar(rng);
    let sk_shares = shamir.share(&sk, rng);

    // 2. The exponent witness, redrawn until every OLE outer sum is collision-free.
    let (a_exp, e_exp, s_exp) = sample_exponents(config, rng)?;

    // 3. The coefficient witness.
    let a_coeff = sample_coefficient_matrix(n, c, t, rng);
    let e_coeff = sample_coefficient_matrix(n, c, t, rng);
    let s_coeff = sample_coefficient_matrix(n, c, t, rng);

    let dspf = Dspf::new(config.lambda(), config.log_domain())?;
    let dspf_wide = Dspf::new(config.lambda(), config.log_domain() + 1)?;

    let mut seeds: Vec<PcgSeed> = (0..n)
        .map(|i| PcgSeed {
            index: i,
            ski: sk_shares[i],
            exponents: ExponentRows {
                a: a_exp[i].clone(),
                e: e_exp[i].clone(),
                s: s_exp[i].clone(),
            },
            coefficients: CoefficientRows {
                a: a_coeff[i].clone(),
                e: e_coeff[i].clone(),
                s: s_coeff[i].clone(),
            },
            vole: empty_slices(i, n, c),
            ole_as: empty_slices(i, n, c * c),
            ole_ae: empty_slices(i, n, c * c),
        })
        .collect();

    // 4. VOLE embedding for sk·a: points aω[i][r], values skⱼ · aβ[i][r].
    for i in 0..n {
        for j in (0..n).filter(|&j| j != i) {
            for r in 0..c {
                let values: Vec<Scalar> =
                    a_coeff[i][r].iter().map(|b| sk_shares[j] * b).collect();
                let (k0, k1) = dspf.gen(&a_exp[i][r], &values, rng)?;
                push_forward(&mut seeds[i], SliceKind::Vole, j, k0);
                push_backward(&mut seeds[j], SliceKind::Vole, i, k1);
            }
        }
    }

    // 5. OLE embedding for a·s: points aω[i][r] ⊞ sφ[j][s] in the doubled domain, values
    //    aβ[i][r] ⊗ sε[j][s].
    for i in 0..n {
        for j in (0..n).filter(|&j| j != i) {
            for r in 0..c {
                for s in 0..c {
                    let points = outer_sum(&a_exp[i][r], &s_exp[j][s]);
                    let values = outer_values(&a_coeff[i][r], &s_coeff[j][s]);
                    let (k0, k1) = dspf_wide.gen(&points, &values, rng)?;
                    push_forward(&mut seeds[i], SliceKind::OleAs, j, k0);
                    push_backward(&mut seeds[j], SliceKind::OleAs, i, k1);
                }
            }
        }
    }

    // 6. OLE embedding for a·e.
    for i in 0..n {
        for j in (0..n).filter(|&j| j != i) {
            for r in 0..c {
                for s in 0..c {
                    let points = outer_sum(&a_exp[i][r], &e_exp[j][s]);
                    let values = outer_values(&a_coeff[i][r], &e_coeff[j][s]);
                    let (k0, k1) = dspf_wide.gen(&points, &values, rng)?;
                    push_forward(&mut seeds[i], SliceKind::OleAe, j, k0);
                    push_backward(&mut seeds[j], SliceKind::OleAe, i, k1);
                }
            }
        }
    }

    tracing::debug!(seeds = seeds.len(), "dealt correlation seeds");
    Ok(seeds)
}

#[derive(Clone, Copy)]
enum SliceKind {
    Vole,
    OleAs,
    OleAe,
}

fn slice_map<'a>(
    seed: &'a mut PcgSeed,
    kind: SliceKind,
) -> &'a mut BTreeMap<usize, CorrelationKeys> {
    match kind {
        SliceKind::Vole => &mut seed.vole,
        SliceKind::OleAs => &mut seed.ole_as,
        SliceKind::OleAe => &mut seed.ole_ae,
    }
}

fn push_forward(seed: &mut PcgSeed, kind: SliceKind, counterparty: usize, key: crate::dspf::DspfKey) {
    slice_map(seed, kind)
        .get_mut(&counterparty)
        .expect("slice maps are pre-populated for every counterparty")
        .forward
        .push(key);
}

fn push_backward(
    seed: &mut PcgSeed,
    kind: SliceKind,
    counterparty: usize,
    key: crate::dspf::DspfKey,
) {
    slice_map(seed, kind)
        .get_mut(&counterparty)
        .expect("slice maps are pre-populated for every counterparty")
        .backward
        .push(key);
}

fn empty_slices(index: usize, n: usize, capacity: usize) -> BTreeMap<usize, CorrelationKeys> {
    (0..n)
        .filter(|&j| j != index)
        .map(|j| {
            (
                j,
                CorrelationKeys {
                    forward: Vec::with_capacity(capacity),
                    backward: Vec::with_capacity(capacity),
                },
            )
        })
        .collect()
}

/// Draws the three n × c × t exponent matrices, redrawing the whole witness until every OLE
/// outer sum is internally collision-free. Redrawing (rather than partitioning the domain)
/// keeps the exponent marginals uniform.
fn sample_exponents<R>(
    config: &PcgConfig,
    rng: &mut R,
) -> Result<(ExponentMatrix, ExponentMatrix, ExponentMatrix)>
where
    R: RngCore + CryptoRng,
{
    let n = config.parties();
    let c = config.compression();
    let t = config.noise_weight();
    let log_domain = config.log_domain();

    for attempt in 0..MAX_SAMPLING_ATTEMPTS {
        let a = sample_exponent_matrix(n, c, t, log_domain, rng);
        let e = sample_exponent_matrix(n, c, t, log_domain, rng);
        let s = sample_exponent_matrix(n, c, t, log_domain, rng);

        if outer_sums_collision_free(&a, &s) && outer_sums_collision_free(&a, &e) {
            if attempt > 0 {
                tracing::debug!(attempt, "exponent witness accepted after redraws");
            }
            return Ok((a, e, s));
        }
    }

    Err(Error::SpecialPointSampling(MAX_SAMPLING_ATTEMPTS))
}

fn sample_exponent_matrix<R>(
    n: usize,
    c: usize,
    t: usize,
    log_domain: usize,
    rng: &mut R,
) -> ExponentMatrix
where
    R: RngCore + CryptoRng,
{
    (0..n)
        .map(|_| {
            (0..c)
                .map(|_| random_distinct_sorted(t, log_domain, rng))
                .collect()
        })
        .collect()
}

fn sample_coefficient_matrix<R>(n: usize, c: usize, t: usize, rng: &mut R) -> Vec<Vec<Vec<Scalar>>>
where
    R: RngCore + CryptoRng,
{
    (0..n)
        .map(|_| (0..c).map(|_| random_scalars(t, rng)).collect())
        .collect()
}

fn outer_sums_collision_free(a: &ExponentMatrix, other: &ExponentMatrix) -> bool {
    let n = a.len();
    for i in 0..n {
        for j in (0..n).filter(|&j| j != i) {
            for row_a in &a[i] {
                for row_b in &other[j] {
                    let mut seen = BTreeSet::new();
                    for x in row_a {
                        for y in row_b {
                            if !seen.insert(x + y) {
                                return false;
                            }
                        }
                    }
                }
            }
        }
    }
    true
}

fn outer_sum(xs: &[u64], ys: &[u64]) -> Vec<u64> {
    xs.iter()
        .flat_map(|x| ys.iter().map(move |y| x + y))
        .collect()
}

fn outer_values(xs: &[Scalar], ys: &[Scalar]) -> Vec<Scalar> {
    xs.iter()
        .flat_map(|x| ys.iter().map(move |y| x * y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dspf::Dspf;
    use rand::thread_rng;
    use rand_core::SeedableRng;

    fn small_config() -> PcgConfig {
        PcgConfig::new(128, 10, 2, 2, 2, 3).unwrap()
    }

    #[test]
    fn test_seed_shapes() {
        let config = small_config();
        let seeds = gen(&config, &mut thread_rng()).unwrap();
        assert_eq!(seeds.len(), 2);

        for (i, seed) in seeds.iter().enumerate() {
            assert_eq!(seed.index(), i);
            assert_eq!(seed.exponents.a.len(), 2);
            assert_eq!(seed.exponents.a[0].len(), 3);
            assert_eq!(seed.coefficients.s[1].len(), 3);
            assert_eq!(seed.vole.len(), 1);
            let peer = &seed.vole[&(1 - i)];
            assert_eq!(peer.forward.len(), 2);
            assert_eq!(peer.backward.len(), 2);
            let peer = &seed.ole_as[&(1 - i)];
            assert_eq!(peer.forward.len(), 4);
            assert_eq!(peer.backward.len(), 4);
            // Every exponent row is sorted and distinct.
            for row in seed.exponents.a.iter().chain(&seed.exponents.e) {
                for w in row.windows(2) {
                    assert!(w[0] < w[1]);
                }
            }
        }
    }

    #[test]
    fn test_vole_embedding() {
        let config = small_config();
        let mut rng = thread_rng();
        let seeds = gen(&config, &mut rng).unwrap();
        let dspf = Dspf::new(128, 10).unwrap();

        // U[0][1][r] shares the point function with points aω[0][r] and values sk₁·aβ[0][r].
        for r in 0..2 {
            let k0 = &seeds[0].vole[&1].forward[r];
            let k1 = &seeds[1].vole[&0].backward[r];
            for (pos, &alpha) in seeds[0].exponents.a[r].iter().enumerate() {
                let combined = Dspf::combine_single(
                    &dspf.eval(k0, alpha).unwrap(),
                    &dspf.eval(k1, alpha).unwrap(),
                )
                .unwrap();
                let expected = seeds[1].ski * seeds[0].coefficients.a[r][pos];
                assert_eq!(combined, expected, "row {} point {}", r, pos);
            }
        }
    }

    #[test]
    fn test_ole_embedding() {
        let config = small_config();
        let mut rng = thread_rng();
        let seeds = gen(&config, &mut rng).unwrap();
        let dspf = Dspf::new(128, 11).unwrap();

        // C[1][0][r·c+s] shares points aω[1][r] ⊞ sφ[0][s] with values aβ[1][r] ⊗ sε[0][s].
        let (r, s) = (1, 0);
        let k0 = &seeds[1].ole_as[&0].forward[r * 2 + s];
        let k1 = &seeds[0].ole_as[&1].backward[r * 2 + s];
        let points = outer_sum(&seeds[1].exponents.a[r], &seeds[0].exponents.s[s]);
        let values = outer_values(&seeds[1].coefficients.a[r], &seeds[0].coefficients.s[s]);
        for (point, value) in points.iter().zip(values.iter()) {
            let combined = Dspf::combine_single(
                &dspf.eval(k0, *point).unwrap(),
                &dspf.eval(k1, *point).unwrap(),
            )
            .unwrap();
            assert_eq!(combined, *value);
        }
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        let config = small_config();
        let seeds_a = gen(&config, &mut rand_chacha::ChaCha20Rng::seed_from_u64(7)).unwrap();
        let seeds_b = gen(&config, &mut rand_chacha::ChaCha20Rng::seed_from_u64(7)).unwrap();
        assert_eq!(seeds_a, seeds_b);
    }

    #[test]
    fn test_seed_serialization_round_trip() {
        let config = small_config();
        let seeds = gen(&config, &mut thread_rng()).unwrap();
        let bytes = seeds[0].to_bytes().unwrap();
        assert_eq!(PcgSeed::from_bytes(&bytes).unwrap(), seeds[0]);
    }
}
