//! The encryption scheme: keys, ciphertexts, and the homomorphic operations.
//!
//! A ciphertext is an ordered sequence of ring polynomials `c_0 .. c_{L-1}`;
//! decryption computes `sum(c_i * sk^i)` over the ring followed by the
//! centered reduction mod `t`. Multiplication grows `L`; relinearization
//! shrinks a length-3 ciphertext back to length 2 with an evaluation key.

use std::{fmt::Write as _, fs, io, path::Path, str::FromStr, sync::Arc};

use derive_more::Deref;
use log::debug;
use num_bigint_dig::BigInt;
use num_traits::One;
use rand::Rng;

use crate::{
    encoding::{check_base, decode, encode},
    error::Error,
    primitives::{
        gauss::GaussSource,
        poly::{RingCtx, RingPoly},
        prime::size_in_base,
    },
    settings::Settings,
};


/// The scheme context; every operation is a method on this handle.
#[derive(Clone, Debug)]
pub struct Swhe {
    settings: Arc<Settings>,
}

/// Secret key and public key pair for one parameter set.
#[derive(Clone, Debug, PartialEq)]
pub struct Key {
    settings: Arc<Settings>,
    /// Secret key, sampled from the small Gaussian.
    pub sk: RingPoly,
    /// Uniform public key element.
    pub pk_a: RingPoly,
    /// `pk_a * sk + t * e0`.
    pub pk_b: RingPoly,
}

/// Relinearization ladder: symmetric encryptions of `T^i * sk^2` for
/// `i = 0..=ell`.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalKey {
    /// Digit decomposition base `T`.
    base: u32,
    /// Ladder height `floor(log_T q)`; the arrays hold `ell + 1` rungs.
    ell: usize,
    ek0: Vec<RingPoly>,
    ek1: Vec<RingPoly>,
}

impl EvalKey {
    /// The digit decomposition base `T`.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// The ladder height; the rung arrays hold `ell + 1` entries.
    pub fn ell(&self) -> usize {
        self.ell
    }

    /// First rung array.
    pub fn ek0(&self) -> &[RingPoly] {
        &self.ek0
    }

    /// Second rung array.
    pub fn ek1(&self) -> &[RingPoly] {
        &self.ek1
    }
}

/// A ciphertext: an ordered sequence of ring polynomials in the secret key.
///
/// Length `L` starts at 2 and only grows under evaluation, except for
/// relinearization which reduces 3 back to 2. Every operation returns a new
/// ciphertext; operands are never mutated.
#[derive(Clone, Debug, PartialEq, Deref)]
pub struct Ciphertext {
    #[deref]
    parts: Vec<RingPoly>,
    /// Capacity bound `D`.
    max_len: usize,
}

impl Ciphertext {
    /// The capacity bound `D`.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Swhe {
    /// Creates the scheme context for a parameter set.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// The parameter set this context operates on.
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    fn ring(&self) -> Arc<RingCtx> {
        Arc::clone(&self.settings.ring)
    }

    /// Samples the key material and assembles the key pair:
    /// `sk` and `e0` from the small Gaussian, `pk_a` uniform,
    /// `pk_b = pk_a * sk + t * e0`.
    pub fn keygen<R: Rng>(&self, rng: &mut R, gauss: &mut dyn GaussSource) -> Key {
        let s = &self.settings;

        let sk = RingPoly::gauss(self.ring(), gauss, s.std_dev);
        let pk_a = RingPoly::uniform(self.ring(), rng);
        let e0 = RingPoly::gauss(self.ring(), gauss, s.std_dev);

        let mut pk_b = &(&pk_a * &sk) + &e0.scalar_mul_u64(s.t);
        pk_b.normalize();

        debug!("generated key pair: n = {}, q_bits = {}", s.n(), s.q_bits());

        Key {
            settings: Arc::clone(&self.settings),
            sk,
            pk_a,
            pk_b,
        }
    }

    /// Builds the relinearization ladder for digit base `base`.
    pub fn eval_keygen<R: Rng>(
        &self,
        key: &Key,
        base: u32,
        rng: &mut R,
        gauss: &mut dyn GaussSource,
    ) -> Result<EvalKey, Error> {
        check_base(base)?;

        let q = self
            .settings
            .ring
            .q
            .to_biguint()
            .expect("the modulus is positive");
        let ell = size_in_base(&q, base) - 1;

        // sk^2 is shared by every rung.
        let mut sk2 = &key.sk * &key.sk;
        sk2.normalize();

        let mut ek0 = Vec::with_capacity(ell + 1);
        let mut ek1 = Vec::with_capacity(ell + 1);
        let mut base_power = BigInt::one();

        for _ in 0..=ell {
            // Rung i encrypts sk^2 * base^i under sk itself.
            let mut m = sk2.scalar_mul(&base_power);
            m.normalize();

            let c = self.encrypt_sym(&m, key, rng, gauss)?;
            ek0.push(c[0].clone());
            ek1.push(c[1].clone());

            base_power *= base as u64;
        }

        debug!("evaluation key ladder: {} rungs, base {base}", ell + 1);

        Ok(EvalKey {
            base,
            ell,
            ek0,
            ek1,
        })
    }

    /// Asymmetric encryption of a plaintext polynomial.
    ///
    /// Samples `v, e'` from the small Gaussian and `e''` from the large one,
    /// then returns `(pk_b * v + t * e'' + m, -(pk_a * v + t * e'))`.
    pub fn encrypt(
        &self,
        m: &RingPoly,
        key: &Key,
        gauss: &mut dyn GaussSource,
    ) -> Result<Ciphertext, Error> {
        let s = &self.settings;
        if s.max_len < 2 {
            return Err(Error::CiphertextFull {
                len: 2,
                max_len: s.max_len,
            });
        }

        let v = RingPoly::gauss(self.ring(), gauss, s.std_dev);
        let e_prime = RingPoly::gauss(self.ring(), gauss, s.std_dev);
        let e_second = RingPoly::gauss(self.ring(), gauss, s.greater_std_dev);

        let apub = &(&key.pk_a * &v) + &e_prime.scalar_mul_u64(s.t);
        let bpub = &(&key.pk_b * &v) + &e_second.scalar_mul_u64(s.t);

        let mut c0 = &bpub + m;
        c0.normalize();
        let mut c1 = -&apub;
        c1.normalize();

        Ok(Ciphertext {
            parts: vec![c0, c1],
            max_len: s.max_len,
        })
    }

    /// Symmetric encryption of a plaintext polynomial:
    /// `(a * sk + t * e + m, -a)` for uniform `a`.
    pub fn encrypt_sym<R: Rng>(
        &self,
        m: &RingPoly,
        key: &Key,
        rng: &mut R,
        gauss: &mut dyn GaussSource,
    ) -> Result<Ciphertext, Error> {
        let s = &self.settings;
        if s.max_len < 2 {
            return Err(Error::CiphertextFull {
                len: 2,
                max_len: s.max_len,
            });
        }

        let e = RingPoly::gauss(self.ring(), gauss, s.std_dev);
        let a = RingPoly::uniform(self.ring(), rng);

        let mut c0 = &(&(&a * &key.sk) + &e.scalar_mul_u64(s.t)) + m;
        c0.normalize();
        let mut c1 = -&a;
        c1.normalize();

        Ok(Ciphertext {
            parts: vec![c0, c1],
            max_len: s.max_len,
        })
    }

    /// Homomorphic addition.
    ///
    /// The shorter operand is padded with zero polynomials; the result length
    /// is the longer of the two.
    pub fn eval_add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Ciphertext {
        let len = c1.len().max(c2.len());
        let zero = RingPoly::zero(self.ring());

        let mut parts = Vec::with_capacity(len);
        for i in 0..len {
            let a = c1.get(i).unwrap_or(&zero);
            let b = c2.get(i).unwrap_or(&zero);
            let mut sum = a + b;
            sum.normalize();
            parts.push(sum);
        }

        Ciphertext {
            parts,
            max_len: c1.max_len,
        }
    }

    /// Homomorphic multiplication: the convolution of the operands read as
    /// polynomials in the secret key, `r_k = sum(c_i * c'_j, i + j = k)`.
    ///
    /// The result length is `L1 + L2 - 1`; operands shorter than 2 or results
    /// beyond the capacity bound are rejected.
    pub fn eval_mul(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, Error> {
        let max_len = self.settings.max_len;
        if c1.len() < 2 || c2.len() < 2 {
            return Err(Error::LengthUnsupported {
                len: c1.len().min(c2.len()),
                max_len,
            });
        }

        let len = c1.len() + c2.len() - 1;
        if len > max_len {
            return Err(Error::LengthUnsupported { len, max_len });
        }

        let mut parts = vec![RingPoly::zero(self.ring()); len];
        for (i, a) in c1.iter().enumerate() {
            for (j, b) in c2.iter().enumerate() {
                let prod = a * b;
                let sum = &parts[i + j] + &prod;
                parts[i + j] = sum;
            }
        }
        for part in &mut parts {
            part.normalize();
        }

        Ok(Ciphertext { parts, max_len })
    }

    /// Adds a plaintext polynomial to the ciphertext.
    pub fn eval_add_plain(&self, c: &Ciphertext, plain: &RingPoly) -> Ciphertext {
        debug_assert!(!c.is_empty());

        let mut parts = c.parts.clone();
        let mut c0 = &parts[0] + plain;
        c0.normalize();
        parts[0] = c0;

        Ciphertext {
            parts,
            max_len: c.max_len,
        }
    }

    /// Multiplies every ciphertext element by a plaintext polynomial.
    pub fn eval_mul_plain(&self, c: &Ciphertext, plain: &RingPoly) -> Ciphertext {
        let parts = c
            .iter()
            .map(|part| {
                let mut prod = part * plain;
                prod.normalize();
                prod
            })
            .collect();

        Ciphertext {
            parts,
            max_len: c.max_len,
        }
    }

    /// Decrypts a ciphertext of any length into a plaintext polynomial with
    /// centered coefficients.
    pub fn decrypt(&self, c: &Ciphertext, key: &Key) -> RingPoly {
        // m = c0 + c1 sk + c2 sk^2 + ... + c_{L-1} sk^{L-1}
        let mut m = c[0].clone();
        let mut powered_key = key.sk.clone();

        if let Some(c1) = c.get(1) {
            m = &m + &(c1 * &key.sk);
        }
        for ci in c.iter().skip(2) {
            powered_key = &powered_key * &key.sk;
            powered_key.normalize();
            m = &m + &(ci * &powered_key);
        }

        m.normalize();
        m.mod_t(self.settings.t);
        m
    }

    /// Shrinks a length-3 ciphertext back to length 2 using the evaluation
    /// key ladder.
    ///
    /// Each coefficient of `c_2` is split into base-`T` digits, giving digit
    /// polynomials `d_i` with `c_2 = sum(d_i * T^i)`; then
    /// `c_0' = c_0 + sum(ek0_i * d_i)` and `c_1' = c_1 + sum(ek1_i * d_i)`.
    pub fn relinearize(&self, c: &Ciphertext, eval_key: &EvalKey) -> Result<Ciphertext, Error> {
        if c.len() != 3 {
            return Err(Error::LengthUnsupported {
                len: c.len(),
                max_len: self.settings.max_len,
            });
        }

        let n = self.settings.n();
        let ell = eval_key.ell;

        let mut digit_polys = vec![RingPoly::zero(self.ring()); ell + 1];
        for d in 0..n {
            let coeff = c[2][d]
                .to_biguint()
                .expect("normalized coefficients are non-negative");
            let digits = coeff.to_radix_le(eval_key.base);
            debug_assert!(digits.len() <= ell + 1);

            for (i, digit) in digits.iter().enumerate() {
                digit_polys[i][d] = BigInt::from(*digit);
            }
        }

        let mut c0 = c[0].clone();
        let mut c1 = c[1].clone();
        for i in 0..=ell {
            c0 = &c0 + &(&eval_key.ek0[i] * &digit_polys[i]);
            c1 = &c1 + &(&eval_key.ek1[i] * &digit_polys[i]);
        }
        c0.normalize();
        c1.normalize();

        debug!("relinearized a ciphertext via {} digit polynomials", ell + 1);

        Ok(Ciphertext {
            parts: vec![c0, c1],
            max_len: c.max_len,
        })
    }

    /// Encodes a signed integer and encrypts it.
    pub fn encrypt_int(
        &self,
        x: i64,
        key: &Key,
        gauss: &mut dyn GaussSource,
    ) -> Result<Ciphertext, Error> {
        let m = encode(self.ring(), &BigInt::from(x), self.settings.b)?;
        self.encrypt(&m, key, gauss)
    }

    /// Decrypts a ciphertext and decodes the plaintext back to an integer.
    pub fn decrypt_int(&self, c: &Ciphertext, key: &Key) -> Result<BigInt, Error> {
        let m = self.decrypt(c, key);
        decode(&m, self.settings.b)
    }

    /// Encodes `plain` and adds it to the ciphertext.
    pub fn eval_add_plain_int(&self, c: &Ciphertext, plain: i64) -> Result<Ciphertext, Error> {
        let m = encode(self.ring(), &BigInt::from(plain), self.settings.b)?;
        Ok(self.eval_add_plain(c, &m))
    }

    /// Encodes `plain` and multiplies the ciphertext by it.
    pub fn eval_mul_plain_int(&self, c: &Ciphertext, plain: i64) -> Result<Ciphertext, Error> {
        let m = encode(self.ring(), &BigInt::from(plain), self.settings.b)?;
        Ok(self.eval_mul_plain(c, &m))
    }
}

impl Key {
    /// The parameter set this key was generated for.
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Writes `sk, pk_a, pk_b` to a whitespace-delimited decimal text file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut out = String::new();
        for poly in [&self.sk, &self.pk_a, &self.pk_b] {
            write_poly(&mut out, poly);
        }
        fs::write(path, out)?;
        Ok(())
    }

    /// Reads a key written by [`save`](Self::save).
    ///
    /// The file must carry the same ring parameters as `settings`.
    pub fn load<P: AsRef<Path>>(settings: Arc<Settings>, path: P) -> Result<Key, Error> {
        let text = fs::read_to_string(path)?;
        let mut tokens = text.split_whitespace();

        let sk = read_poly(&settings.ring, &mut tokens)?;
        let pk_a = read_poly(&settings.ring, &mut tokens)?;
        let pk_b = read_poly(&settings.ring, &mut tokens)?;

        Ok(Key {
            settings,
            sk,
            pk_a,
            pk_b,
        })
    }
}

/// Appends one polynomial as `n q len c_0 .. c_{len-1}`.
fn write_poly(out: &mut String, poly: &RingPoly) {
    let ctx = poly.ctx();
    let _ = write!(out, "{} {} {}", ctx.n, ctx.q, poly.len());
    for c in poly.iter() {
        let _ = write!(out, " {c}");
    }
    out.push('\n');
}

/// Parses one polynomial in the format written by [`write_poly`].
fn read_poly<'a, I>(ring: &Arc<RingCtx>, tokens: &mut I) -> Result<RingPoly, Error>
where
    I: Iterator<Item = &'a str>,
{
    let n: usize = parse_token(tokens, "polynomial degree")?;
    let q: BigInt = parse_token(tokens, "coefficient modulus")?;
    let len: usize = parse_token(tokens, "coefficient count")?;

    if n != ring.n || q != ring.q {
        return Err(parse_err("key file parameters do not match the settings"));
    }
    if len > n {
        return Err(parse_err("coefficient count exceeds the ring degree"));
    }

    let mut coeffs = Vec::with_capacity(len);
    for _ in 0..len {
        coeffs.push(parse_token(tokens, "coefficient")?);
    }

    Ok(RingPoly::from_coefficients(Arc::clone(ring), coeffs))
}

fn parse_token<'a, I, T>(tokens: &mut I, what: &str) -> Result<T, Error>
where
    I: Iterator<Item = &'a str>,
    T: FromStr,
{
    tokens
        .next()
        .ok_or_else(|| parse_err(&format!("missing {what}")))?
        .parse()
        .map_err(|_| parse_err(&format!("malformed {what}")))
}

fn parse_err(msg: &str) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::InvalidData, msg.to_string()))
}
