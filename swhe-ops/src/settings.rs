//! Runtime scheme parameters.
//!
//! A parameter set is derived once (by hand, or by [`params`](crate::params))
//! and immutable afterwards; keys and ciphertexts built from different
//! parameter sets are incompatible.

use std::sync::Arc;

use log::debug;
use num_bigint_dig::{prime::probably_prime, BigUint};
use rand::Rng;

use crate::{
    encoding::MIN_BASE,
    error::{Error, SettingsIssue},
    primitives::{
        poly::RingCtx,
        prime::{bit_length, generate_prime, generate_prime_congruent_mod_2n, PRIME_REPS},
    },
};


/// Standard deviation of the small error distribution.
pub const STD_DEV: f64 = 8.0;

/// Scheme parameters, all derived together.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// The polynomial ring `Z_q[x] / (x^n + 1)`.
    pub ring: Arc<RingCtx>,
    /// Plaintext modulus.
    pub t: u64,
    /// Encoding base.
    pub b: u32,
    /// Maximum ciphertext length `D`.
    pub max_len: usize,
    /// Standard deviation of the small error distribution.
    pub std_dev: f64,
    /// Standard deviation of the large error distribution, `n * std_dev`.
    pub greater_std_dev: f64,
}

impl Settings {
    /// Builds settings for `n = 2^n_power` and the given modulus.
    pub fn new(n_power: u32, q: BigUint, t: u64, b: u32, max_len: usize) -> Arc<Self> {
        let n = 1usize << n_power;
        let ring = RingCtx::new(q, n);
        let std_dev = STD_DEV;
        let greater_std_dev = std_dev * n as f64;

        debug!(
            "settings: n = {n}, q_bits = {}, t = {t}, b = {b}, max_len = {max_len}",
            ring.q_bits
        );

        Arc::new(Self {
            ring,
            t,
            b,
            max_len,
            std_dev,
            greater_std_dev,
        })
    }

    /// Builds settings around a freshly generated prime with `q_bits` bits.
    pub fn with_generated_prime<R: Rng>(
        rng: &mut R,
        n_power: u32,
        q_bits: u64,
        t: u64,
        b: u32,
        max_len: usize,
    ) -> Arc<Self> {
        let q = generate_prime(rng, q_bits);
        Self::new(n_power, q, t, b, max_len)
    }

    /// Like [`with_generated_prime`](Self::with_generated_prime), but the
    /// prime additionally satisfies `q = 1 (mod 2n)`.
    pub fn with_generated_prime_congruent_mod_2n<R: Rng>(
        rng: &mut R,
        n_power: u32,
        q_bits: u64,
        t: u64,
        b: u32,
        max_len: usize,
    ) -> Arc<Self> {
        let q = generate_prime_congruent_mod_2n(rng, q_bits, 1usize << n_power);
        Self::new(n_power, q, t, b, max_len)
    }

    /// The polynomial degree `n`.
    pub fn n(&self) -> usize {
        self.ring.n
    }

    /// The bit length of the coefficient modulus.
    pub fn q_bits(&self) -> u64 {
        self.ring.q_bits
    }

    /// Validates the parameter set.
    ///
    /// The `Err` carries the issue with its diagnostic code; checks run in
    /// code order and the first failure wins.
    pub fn validate(&self) -> Result<(), Error> {
        let n = self.ring.n;
        if n == 0 || (n != 1 && n & (n - 1) != 0) {
            return Err(Error::SettingsInvalid(SettingsIssue::DegreeNotPowerOfTwo));
        }

        let q = self
            .ring
            .q
            .to_biguint()
            .ok_or(Error::SettingsInvalid(SettingsIssue::QNotPrime))?;
        if bit_length(&q) != self.ring.q_bits {
            return Err(Error::SettingsInvalid(SettingsIssue::QBitsMismatch));
        }
        if !probably_prime(&q, PRIME_REPS) {
            return Err(Error::SettingsInvalid(SettingsIssue::QNotPrime));
        }
        if BigUint::from(self.t) >= q {
            return Err(Error::SettingsInvalid(SettingsIssue::PlainModulusTooLarge));
        }
        if self.b < MIN_BASE {
            return Err(Error::SettingsInvalid(SettingsIssue::BaseTooSmall));
        }
        Ok(())
    }
}
