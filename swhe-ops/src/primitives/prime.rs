//! Uniform big-integer randomness and prime generation.

use num_bigint_dig::{prime::probably_prime, BigUint};
use num_traits::One;
use rand::Rng;

#[cfg(test)]
mod test;

/// Bits drawn per randomness block.
const BLOCK_BITS: u64 = 32;

/// Miller-Rabin rounds for probable-prime checks.
///
/// `probably_prime` also runs a Lucas stage, so the error rate is far below
/// `4^-PRIME_REPS`.
pub const PRIME_REPS: usize = 20;

/// Returns a uniformly random integer in `[0, 2^bits)`.
///
/// Draws `ceil(bits / 32)` whole 32-bit words from `rng` and masks off the
/// bits above `bits`.
pub fn random_bits<R: Rng>(rng: &mut R, bits: u64) -> BigUint {
    assert!(bits > 0, "bit count must be positive");

    let blocks = ((bits + BLOCK_BITS - 1) / BLOCK_BITS) as usize;
    let mut words = vec![0u32; blocks];
    rng.fill(&mut words[..]);

    // Mask the top word down to the requested bit count.
    let top_bits = ((bits - 1) % BLOCK_BITS) + 1;
    if top_bits < BLOCK_BITS {
        words[blocks - 1] &= (1u32 << top_bits) - 1;
    }

    BigUint::from_slice(&words)
}

/// Returns the smallest probable prime strictly greater than `n`.
pub fn next_prime(n: &BigUint) -> BigUint {
    let two = BigUint::from(2u32);
    if *n < two {
        return two;
    }

    // Advance to the next odd number, then step by two.
    let mut candidate = n + 1u32;
    if &candidate % 2u32 == BigUint::from(0u32) {
        candidate += 1u32;
    }
    while !probably_prime(&candidate, PRIME_REPS) {
        candidate += 2u32;
    }
    candidate
}

/// Generates a random probable prime with exactly `bits` bits.
///
/// Samples `bits` random bits, advances to the next prime, and retries until
/// the prime's bit length matches exactly.
pub fn generate_prime<R: Rng>(rng: &mut R, bits: u64) -> BigUint {
    loop {
        let candidate = random_bits(rng, bits);
        let p = next_prime(&candidate);
        if bit_length(&p) == bits {
            return p;
        }
    }
}

/// Generates a random probable prime of at least `bits` bits satisfying
/// `p = 1 (mod 2n)`.
pub fn generate_prime_congruent_mod_2n<R: Rng>(rng: &mut R, bits: u64, n: usize) -> BigUint {
    let two_n = BigUint::from(2 * n as u64);
    let mut p = generate_prime(rng, bits);
    while &p % &two_n != BigUint::one() {
        p = next_prime(&p);
    }
    p
}

/// Returns the bit length of `x`.
pub fn bit_length(x: &BigUint) -> u64 {
    x.bits() as u64
}

/// Returns the number of digits of `x` in `base` (at least one).
pub fn size_in_base(x: &BigUint, base: u32) -> usize {
    x.to_radix_le(base).len()
}
