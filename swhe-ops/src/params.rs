//! Scheme parameter generation from an arithmetic circuit.
//!
//! The circuit is an owning expression tree. Two bottom-up passes bound the
//! degree and infinity norm of the polynomial the circuit would produce and
//! count its multiplicative depth; an outer search then doubles `n` until the
//! estimated security level reaches the target.

use std::sync::Arc;

use log::debug;
use num_bigint_dig::BigUint;
use num_traits::One;

use crate::{
    primitives::prime::{bit_length, next_prime},
    settings::{Settings, STD_DEV},
};

#[cfg(test)]
mod test;

/// A node of the arithmetic circuit: an input value of bounded magnitude, an
/// addition, or a multiplication.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    /// An input bounded by the given magnitude.
    Value(u64),
    /// Addition of the two subtrees.
    Plus(Box<Expr>, Box<Expr>),
    /// Multiplication of the two subtrees.
    Multiply(Box<Expr>, Box<Expr>),
}

/// Bounds on the polynomial an [`Expr`] evaluates to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PolyBound {
    /// Bound on the degree of the result polynomial.
    pub degree: u64,
    /// Bound on the largest absolute coefficient of the result polynomial.
    pub inf_norm: u128,
}

impl Expr {
    /// An input leaf.
    pub fn value(m: u64) -> Self {
        Expr::Value(m)
    }

    /// An addition node.
    pub fn plus(left: Expr, right: Expr) -> Self {
        Expr::Plus(Box::new(left), Box::new(right))
    }

    /// A multiplication node.
    pub fn multiply(left: Expr, right: Expr) -> Self {
        Expr::Multiply(Box::new(left), Box::new(right))
    }

    /// The largest input magnitude in the tree.
    pub fn max_value(&self) -> u64 {
        match self {
            Expr::Value(m) => *m,
            Expr::Plus(l, r) | Expr::Multiply(l, r) => l.max_value().max(r.max_value()),
        }
    }

    /// Bounds the result polynomial for encoding base `b`.
    ///
    /// Leaves encode to at most `log_b(M)` degree with digits below `b`;
    /// additions add norms; multiplications add degrees and scale the norm by
    /// the overlap width.
    pub fn estimate(&self, b: u32) -> PolyBound {
        match self {
            Expr::Value(m) => PolyBound {
                degree: int_log(b as u64, *m),
                inf_norm: (*m).min(b as u64 - 1) as u128,
            },
            Expr::Plus(l, r) => {
                let (l, r) = (l.estimate(b), r.estimate(b));
                PolyBound {
                    degree: l.degree.max(r.degree),
                    inf_norm: l.inf_norm.saturating_add(r.inf_norm),
                }
            }
            Expr::Multiply(l, r) => {
                let (l, r) = (l.estimate(b), r.estimate(b));
                PolyBound {
                    degree: l.degree + r.degree,
                    inf_norm: (2 * (l.degree.min(r.degree) as u128 + 1))
                        .saturating_mul(l.inf_norm)
                        .saturating_mul(r.inf_norm),
                }
            }
        }
    }

    /// Number of sequential multiplications in the tree; additions are free.
    pub fn mult_depth(&self) -> u64 {
        match self {
            Expr::Value(_) => 0,
            Expr::Plus(l, r) => l.mult_depth().max(r.mult_depth()),
            Expr::Multiply(l, r) => 1 + l.mult_depth() + r.mult_depth(),
        }
    }
}

/// `floor(log_base(value))`; how many extra digits `value` needs in `base`.
fn int_log(base: u64, value: u64) -> u64 {
    let mut digits = 0;
    let mut acc = value;
    while acc >= base {
        acc /= base;
        digits += 1;
    }
    digits
}

/// Derives a parameter set for evaluating `root`, targeting
/// `security_level` bits.
///
/// `improvements_factor` bounds the extra `next_prime` steps spent looking
/// for `q = 1 (mod 2n)`; `-1` removes the bound. Whatever prime the search
/// lands on is accepted, even when it outgrows the nominal bound.
pub fn generate(root: &Expr, security_level: i64, improvements_factor: i64) -> Arc<Settings> {
    let max_m = root.max_value();

    let mut n: usize = 1;
    loop {
        n <<= 1;

        // Smallest base that fits the result polynomial into the ring.
        let mut b = ((max_m as f64).powf(1.0 / n as f64).ceil() as u32).max(2) - 1;
        let mut bound;
        loop {
            b += 1;
            bound = root.estimate(b);
            if bound.degree < n as u64 {
                break;
            }
        }

        // Smallest power of two above the norm bound.
        let t_shift = (1 + (bound.inf_norm.saturating_add(1) as f64).log2() as u32).min(63);
        let t = 1u64 << t_shift;

        let depth = 2 + root.mult_depth();

        // q > 2 * inf_norm * (t * std_dev * n^1.5)^(depth + 2)
        let base = t as f64 * STD_DEV * (n as f64).powf(1.5);
        let q_bound = BigUint::from(2u32)
            * BigUint::from(bound.inf_norm)
            * float_pow_floor(base, (depth + 2) as u32);
        let mut q = next_prime(&q_bound);

        // Spend a bounded number of extra primes looking for q = 1 (mod 2n).
        let two_n = BigUint::from(2 * n as u64);
        let mut candidate = q.clone();
        let mut counter = 0i64;
        while (counter < improvements_factor || improvements_factor == -1)
            && &candidate % &two_n != BigUint::one()
        {
            candidate = next_prime(&candidate);
            counter += 1;
        }
        if &candidate % &two_n == BigUint::one() {
            q = candidate;
        }

        let security = estimated_security(n, bit_length(&q), bound.inf_norm);
        debug!(
            "parameter search: n = {n}, b = {b}, t = {t}, depth = {depth}, q_bits = {}, security = {security}",
            bit_length(&q)
        );

        if security >= security_level {
            return Settings::new(n.trailing_zeros(), q, t, b, depth as usize);
        }
    }
}

/// Estimated security level `floor(1.8 * (2n + l)^2 / (n * q_bits) - 140)`,
/// where `l` is the bit length of the norm bound.
pub fn estimated_security(n: usize, q_bits: u64, inf_norm: u128) -> i64 {
    let l = (u128::BITS - inf_norm.leading_zeros()).max(1) as f64;
    let two_n = 2.0 * n as f64;

    ((1.8 * (two_n + l) * (two_n + l)) / (n as f64 * q_bits as f64) - 140.0).floor() as i64
}

/// `floor(base^exp)` as a big integer, for `base >= 1`.
///
/// Square-and-multiply on a `(mantissa, exponent)` pair, so the intermediate
/// values never leave `f64` range.
fn float_pow_floor(base: f64, exp: u32) -> BigUint {
    debug_assert!(base >= 1.0);

    let mut result = (1.0f64, 0i64);
    let mut acc = renorm(base, 0);
    let mut exp = exp;
    while exp > 0 {
        if exp & 1 == 1 {
            result = renorm(result.0 * acc.0, result.1 + acc.1);
        }
        acc = renorm(acc.0 * acc.0, acc.1 + acc.1);
        exp >>= 1;
    }

    // The mantissa lands in [1, 2): shift its 52-bit image into place.
    let (m, e) = result;
    let mant = BigUint::from((m * (1u64 << 52) as f64) as u64);
    if e >= 52 {
        mant << (e - 52) as usize
    } else {
        mant >> (52 - e) as usize
    }
}

/// Renormalizes `m * 2^e` so that `m < 2`.
fn renorm(mut m: f64, mut e: i64) -> (f64, i64) {
    while m >= 2.0 {
        m /= 2.0;
        e += 1;
    }
    (m, e)
}
