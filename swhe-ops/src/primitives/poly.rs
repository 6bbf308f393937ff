//! Arithmetic in the polynomial ring `Z_q[x] / (x^n + 1)`.

use std::{
    ops::{Add, Mul, Neg},
    sync::Arc,
};

use derive_more::{Deref, DerefMut};
use itertools::{EitherOrBoth, Itertools};
use num_bigint_dig::{BigInt, BigUint};
use num_traits::{Signed, Zero};
use rand::Rng;

use crate::primitives::{
    gauss::GaussSource,
    prime::{bit_length, random_bits},
};

#[cfg(any(test, feature = "benchmark"))]
pub mod test;

/// The ring `Z_q[x] / (x^n + 1)`, shared read-only by every polynomial of one
/// parameter set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RingCtx {
    /// Polynomial degree; the polynomial modulus is `x^n + 1`.
    pub n: usize,
    /// Coefficient modulus, a large prime.
    pub q: BigInt,
    /// Bit length of `q`.
    pub q_bits: u64,
}

impl RingCtx {
    /// Creates the ring for modulus `q` and degree `n`.
    pub fn new(q: BigUint, n: usize) -> Arc<Self> {
        let q_bits = bit_length(&q);
        Arc::new(Self {
            n,
            q: BigInt::from(q),
            q_bits,
        })
    }
}

/// An element of the ring, as a coefficient vector (least significant
/// first).
///
/// Canonical form, established by [`normalize`](Self::normalize): exactly `n`
/// coefficients, each in `[0, q)`. Arithmetic may leave results unnormalized
/// (longer vectors, out-of-range or negative coefficients); callers normalize
/// before persisting or comparing.
#[derive(Clone, Debug, Eq, PartialEq, Deref, DerefMut)]
pub struct RingPoly {
    ctx: Arc<RingCtx>,
    #[deref]
    #[deref_mut]
    coeffs: Vec<BigInt>,
}

impl RingPoly {
    /// The zero polynomial, in canonical form.
    pub fn zero(ctx: Arc<RingCtx>) -> Self {
        let coeffs = vec![BigInt::zero(); ctx.n];
        Self { ctx, coeffs }
    }

    /// Wraps raw coefficients; the result is not normalized.
    pub fn from_coefficients(ctx: Arc<RingCtx>, coeffs: Vec<BigInt>) -> Self {
        Self { ctx, coeffs }
    }

    /// The ring this polynomial belongs to.
    pub fn ctx(&self) -> &Arc<RingCtx> {
        &self.ctx
    }

    /// Multiplies every coefficient by a scalar; the result is not
    /// normalized.
    pub fn scalar_mul(&self, scalar: &BigInt) -> Self {
        let coeffs = self.coeffs.iter().map(|c| c * scalar).collect();
        Self {
            ctx: Arc::clone(&self.ctx),
            coeffs,
        }
    }

    /// Multiplies every coefficient by an unsigned scalar.
    pub fn scalar_mul_u64(&self, scalar: u64) -> Self {
        self.scalar_mul(&BigInt::from(scalar))
    }

    /// Multiplies every coefficient by a signed scalar.
    pub fn scalar_mul_i64(&self, scalar: i64) -> Self {
        self.scalar_mul(&BigInt::from(scalar))
    }

    /// Reduces modulo `x^n + 1`, then every coefficient into `[0, q)`, and
    /// pins the representation to exactly `n` coefficients.
    ///
    /// Idempotent.
    pub fn normalize(&mut self) {
        let n = self.ctx.n;

        // x^n = -1, so each high coefficient folds down with a sign that
        // alternates per wrap-around.
        for i in n..self.coeffs.len() {
            let folded = std::mem::replace(&mut self.coeffs[i], BigInt::zero());
            let target = i % n;
            if (i / n) % 2 == 1 {
                self.coeffs[target] -= folded;
            } else {
                self.coeffs[target] += folded;
            }
        }
        self.coeffs.truncate(n);
        self.coeffs.resize_with(n, BigInt::zero);

        let q = self.ctx.q.clone();
        for c in &mut self.coeffs {
            let mut r = &*c % &q;
            if r.is_negative() {
                r += &q;
            }
            *c = r;
        }
    }

    /// Centered reduction modulo `t`, used after decryption.
    ///
    /// Coefficients above `q/2` are first centered around zero, then reduced
    /// mod `t`, then results above `t/2` are shifted down so that every
    /// coefficient ends up in `(-t/2, t/2]`.
    pub fn mod_t(&mut self, t: u64) {
        let q = self.ctx.q.clone();
        let q_half: BigInt = &q >> 1usize;
        let t_big = BigInt::from(t);
        let t_half = BigInt::from(t / 2);

        for c in &mut self.coeffs {
            if *c > q_half {
                *c -= &q;
            }
            let mut r = &*c % &t_big;
            if r.is_negative() {
                r += &t_big;
            }
            if r > t_half {
                r -= &t_big;
            }
            *c = r;
        }
    }

    /// Samples every coefficient uniformly on `[0, 2^q_bits)`, then
    /// normalizes.
    pub fn uniform<R: Rng>(ctx: Arc<RingCtx>, rng: &mut R) -> Self {
        let q_bits = ctx.q_bits;
        let mut res = Self::zero(ctx);
        for c in res.coeffs.iter_mut() {
            *c = BigInt::from(random_bits(rng, q_bits));
        }
        res.normalize();
        res
    }

    /// Samples every coefficient by truncating `N(0, std_dev^2)` draws to
    /// integers, then normalizes.
    pub fn gauss(ctx: Arc<RingCtx>, source: &mut dyn GaussSource, std_dev: f64) -> Self {
        let mut res = Self::zero(ctx);
        for c in res.coeffs.iter_mut() {
            *c = BigInt::from(source.gauss(std_dev) as i64);
        }
        res.normalize();
        res
    }
}

impl Add for &RingPoly {
    type Output = RingPoly;

    /// Coefficient-wise sum; the result is not normalized.
    fn add(self, rhs: &RingPoly) -> RingPoly {
        debug_assert_eq!(self.ctx, rhs.ctx);

        let coeffs = self
            .coeffs
            .iter()
            .zip_longest(rhs.coeffs.iter())
            .map(|pair| match pair {
                EitherOrBoth::Both(a, b) => a + b,
                EitherOrBoth::Left(a) | EitherOrBoth::Right(a) => a.clone(),
            })
            .collect();

        RingPoly {
            ctx: Arc::clone(&self.ctx),
            coeffs,
        }
    }
}

impl Mul for &RingPoly {
    type Output = RingPoly;

    /// Schoolbook convolution up to degree `2n - 2`; the result is not
    /// normalized.
    fn mul(self, rhs: &RingPoly) -> RingPoly {
        debug_assert_eq!(self.ctx, rhs.ctx);

        // Both operands are read in full before the output is touched, so
        // callers may alias them freely.
        if self.coeffs.is_empty() || rhs.coeffs.is_empty() {
            return RingPoly {
                ctx: Arc::clone(&self.ctx),
                coeffs: Vec::new(),
            };
        }

        let mut coeffs = vec![BigInt::zero(); self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                if b.is_zero() {
                    continue;
                }
                coeffs[i + j] += a * b;
            }
        }

        RingPoly {
            ctx: Arc::clone(&self.ctx),
            coeffs,
        }
    }
}

impl Neg for &RingPoly {
    type Output = RingPoly;

    fn neg(self) -> RingPoly {
        self.scalar_mul_i64(-1)
    }
}
