//! Tests for randomness and prime generation.

use num_bigint_dig::{prime::probably_prime, BigUint};
use num_traits::One;
use rand::thread_rng;

use crate::primitives::prime::{
    bit_length, generate_prime, generate_prime_congruent_mod_2n, next_prime, random_bits,
    size_in_base, PRIME_REPS,
};

#[test]
fn random_bits_is_bounded() {
    let mut rng = thread_rng();

    for bits in [1, 31, 32, 33, 100, 500] {
        for _ in 0..20 {
            let r = random_bits(&mut rng, bits);
            assert!(
                bit_length(&r) <= bits,
                "{r} has more than {bits} bits"
            );
        }
    }
}

#[test]
fn random_bits_reaches_the_top_bit() {
    let mut rng = thread_rng();

    // The top bit is set with probability 1/2 per draw.
    let hit = (0..200).any(|_| bit_length(&random_bits(&mut rng, 40)) == 40);
    assert!(hit, "no 40-bit draw out of 200 had its top bit set");
}

#[test]
fn next_prime_small_values() {
    for (n, expected) in [(0u32, 2u32), (1, 2), (2, 3), (3, 5), (6, 7), (7, 11), (13, 17)] {
        assert_eq!(
            next_prime(&BigUint::from(n)),
            BigUint::from(expected),
            "next prime after {n}"
        );
    }
}

#[test]
fn generated_primes_have_exact_bit_length() {
    let mut rng = thread_rng();

    for bits in [16, 64, 110] {
        let p = generate_prime(&mut rng, bits);
        assert_eq!(bit_length(&p), bits);
        assert!(probably_prime(&p, PRIME_REPS));
    }
}

#[test]
fn congruent_primes_match_the_residue() {
    let mut rng = thread_rng();
    let n = 16;

    let p = generate_prime_congruent_mod_2n(&mut rng, 40, n);
    assert!(probably_prime(&p, PRIME_REPS));
    assert_eq!(&p % BigUint::from(2 * n as u64), BigUint::one());
}

#[test]
fn size_in_base_counts_digits() {
    assert_eq!(size_in_base(&BigUint::from(0u32), 2), 1);
    assert_eq!(size_in_base(&BigUint::from(255u32), 2), 8);
    assert_eq!(size_in_base(&BigUint::from(256u32), 2), 9);
    assert_eq!(size_in_base(&BigUint::from(61u32), 62), 1);
    assert_eq!(size_in_base(&BigUint::from(62u32), 62), 2);
    assert_eq!(size_in_base(&BigUint::from(9999u32), 10), 4);
}
