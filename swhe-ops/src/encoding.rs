//! Integer encoding as base-`b` digit polynomials.
//!
//! Coefficient `i` of the encoding is the `i`-th base-`b` digit of the
//! integer. Decoding evaluates the polynomial at `b` over the signed
//! (centered) coefficients, so the composition of decryption and decoding
//! yields negative results naturally.

use std::sync::Arc;

use num_bigint_dig::{BigInt, Sign};
use num_traits::{One, Zero};

use crate::{
    error::Error,
    primitives::poly::{RingCtx, RingPoly},
};


/// Smallest supported digit base.
pub const MIN_BASE: u32 = 2;

/// Largest supported digit base.
pub const MAX_BASE: u32 = 62;

// Digit extraction returns one byte per digit.
const_assert!(MAX_BASE <= u8::MAX as u32);

/// Checks an encoding or digit-decomposition base.
pub(crate) fn check_base(b: u32) -> Result<(), Error> {
    if (MIN_BASE..=MAX_BASE).contains(&b) {
        Ok(())
    } else {
        Err(Error::InvalidBase(b))
    }
}

/// Encodes `x` as the polynomial whose coefficient `i` is the `i`-th base-`b`
/// digit of `x`. Negative inputs produce negated digits.
///
/// The digit count of `x` must not exceed `n`, or decoding stops being the
/// inverse of encoding.
pub fn encode(ctx: Arc<RingCtx>, x: &BigInt, b: u32) -> Result<RingPoly, Error> {
    check_base(b)?;

    let (sign, digits) = x.to_radix_le(b);
    debug_assert!(digits.len() <= ctx.n || x.is_zero());

    let mut res = RingPoly::zero(ctx);
    for (c, digit) in res.iter_mut().zip(digits) {
        *c = match sign {
            Sign::Minus => -BigInt::from(digit),
            _ => BigInt::from(digit),
        };
    }
    Ok(res)
}

/// Decodes `sum(coeff_i * b^i)` over the first `n` coefficients, reading them
/// as signed values.
pub fn decode(poly: &RingPoly, b: u32) -> Result<BigInt, Error> {
    check_base(b)?;

    let mut acc = BigInt::zero();
    let mut base = BigInt::one();
    let b_big = BigInt::from(b);

    for c in poly.iter().take(poly.ctx().n) {
        acc += c * &base;
        base *= &b_big;
    }
    Ok(acc)
}
