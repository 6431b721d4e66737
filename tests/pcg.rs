use bbs_plus_pcg::algebra::Polynomial;
use bbs_plus_pcg::pcg::{dealer, eval_combined, eval_separate, PcgConfig, Ring};
use blstrs::Scalar;
use ff::Field;
use rand::thread_rng;

/// Randomness polynomials for a compression factor of two: one random polynomial of degree
/// below the ring, then the mandatory constant one.
fn sample_randomness<R: rand_core::RngCore + rand_core::CryptoRng>(
    degree: usize,
    rng: &mut R,
) -> Vec<Polynomial> {
    vec![Polynomial::random(degree - 1, rng), Polynomial::one()]
}

#[test]
fn test_two_party_tuples_satisfy_bbs_plus_relations() {
    let mut rng = thread_rng();
    let config = PcgConfig::new(128, 10, 2, 2, 2, 4).unwrap();
    let seeds = dealer::gen(&config, &mut rng).unwrap();
    let ring = Ring::random(10, &mut rng).unwrap();
    let rand = sample_randomness(1024, &mut rng);

    let gen0 = eval_combined(&config, &seeds[0], &rand, &ring).unwrap();
    let gen1 = eval_combined(&config, &seeds[1], &rand, &ring).unwrap();

    assert_eq!(
        gen0.key_share() + gen1.key_share(),
        seeds[0].key_share() + seeds[1].key_share()
    );

    // Spot-check the tuple at the 10th root and a couple of others.
    for root_index in [10usize, 0, 777] {
        let root = &ring.roots()[root_index];
        let t0 = gen0.tuple_at(root);
        let t1 = gen1.tuple_at(root);

        assert_eq!(t0.sk_share + t1.sk_share, seeds[0].key_share() + seeds[1].key_share());

        let a = t0.a_share + t1.a_share;
        let s = t0.s_share + t1.s_share;
        let e = t0.e_share + t1.e_share;
        let alpha = t0.alpha_share + t1.alpha_share;
        let delta = t0.delta_share + t1.delta_share;
        let sk = t0.sk_share + t1.sk_share;

        assert_eq!(a * s, alpha, "a·s must equal α at root {}", root_index);
        assert_eq!(a * (sk + e), delta, "a·(sk+e) must equal δ at root {}", root_index);
    }
}

#[test]
fn test_threshold_tuples_after_lagrange_combination() {
    let mut rng = thread_rng();
    let config = PcgConfig::new(128, 10, 3, 2, 2, 3).unwrap();
    let seeds = dealer::gen(&config, &mut rng).unwrap();
    let ring = Ring::cyclotomic(10).unwrap();
    let rand = sample_randomness(1024, &mut rng);

    let signers = [0usize, 2];
    let sep0 = eval_separate(&config, &seeds[0], &rand, &ring).unwrap();
    let sep2 = eval_separate(&config, &seeds[2], &rand, &ring).unwrap();
    let gen0 = sep0.combine_for_signers(&signers).unwrap();
    let gen2 = sep2.combine_for_signers(&signers).unwrap();

    // The weighted key shares reconstruct the dealt signing key at zero.
    let sk = gen0.key_share() + gen2.key_share();

    for root_index in [3usize, 512] {
        let root = &ring.roots()[root_index];
        let t0 = gen0.tuple_at(root);
        let t2 = gen2.tuple_at(root);

        let a = t0.a_share + t2.a_share;
        let s = t0.s_share + t2.s_share;
        let e = t0.e_share + t2.e_share;
        let alpha = t0.alpha_share + t2.alpha_share;
        let delta = t0.delta_share + t2.delta_share;

        assert_eq!(a * s, alpha, "a·s must equal α at root {}", root_index);
        assert_eq!(
            a * (sk + e),
            delta,
            "a·(sk+e) must equal δ at root {}",
            root_index
        );
    }
}

#[test]
fn test_batch_yields_a_tuple_per_root() {
    let mut rng = thread_rng();
    let config = PcgConfig::new(128, 10, 2, 2, 2, 3).unwrap();
    let seeds = dealer::gen(&config, &mut rng).unwrap();
    let ring = Ring::cyclotomic(10).unwrap();
    let rand = sample_randomness(1024, &mut rng);

    let gen0 = eval_combined(&config, &seeds[0], &rand, &ring).unwrap();
    let tuples: Vec<_> = gen0.tuples(&ring).collect();
    assert_eq!(tuples.len(), 1024);
    assert_eq!(tuples[5], gen0.tuple_at(&ring.roots()[5]));
}

#[test]
fn test_ring_invariants() {
    let mut rng = thread_rng();

    for ring in [
        Ring::cyclotomic(10).unwrap(),
        Ring::random(10, &mut rng).unwrap(),
    ] {
        let roots = ring.roots();
        assert_eq!(roots.len(), 1024);
        assert_eq!(ring.divisor().degree(), Some(1024));

        for i in 0..roots.len() {
            assert_eq!(
                ring.divisor().evaluate(&roots[i]),
                Scalar::zero(),
                "root {} must vanish",
                i
            );
            for j in i + 1..roots.len() {
                assert_ne!(roots[i], roots[j], "roots {} and {} collide", i, j);
            }
        }
    }
}
