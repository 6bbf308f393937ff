//! Gaussian samplers over the reals.
//!
//! Every sampler owns its whole state (tables, xorshift seed, cached
//! variate), so none of them can be shared between threads: concurrent
//! callers hold one sampler per thread.

use rand::Rng;
use rand_distr::{Distribution, Normal};


/// A source of IID samples from `N(0, std_dev^2)`.
pub trait GaussSource {
    /// Draws the next sample.
    fn gauss(&mut self, std_dev: f64) -> f64;
}

/// Number of rectangles in the Ziggurat partition.
const ZIG_REGIONS: usize = 128;

/// Right-most rectangle edge of the standard-normal Ziggurat.
const ZIG_R: f64 = 3.442619855899;

/// Area of each Ziggurat rectangle.
const ZIG_V: f64 = 9.91256303526217e-3;

// The table index is masked with `ZIG_REGIONS - 1`.
const_assert_eq!(ZIG_REGIONS & (ZIG_REGIONS - 1), 0);

/// Marsaglia-Tsang Ziggurat sampler for the standard normal distribution,
/// scaled by the requested standard deviation.
///
/// Rectangle tables and the internal 32-bit xorshift generator are built once
/// per instance.
#[derive(Clone, Debug)]
pub struct Ziggurat {
    /// xorshift state.
    jsr: u32,
    /// Rectangle acceptance thresholds.
    k: [u32; ZIG_REGIONS],
    /// Rectangle widths, scaled to the 31-bit sample range.
    w: [f64; ZIG_REGIONS],
    /// Density at each rectangle edge.
    f: [f64; ZIG_REGIONS],
}

impl Ziggurat {
    /// Builds the rectangle tables and seeds the internal xorshift generator
    /// from `rng`.
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let mut jsr = rng.next_u32();
        while jsr == 0 {
            // Zero is a fixed point of the xorshift step.
            jsr = rng.next_u32();
        }

        let m = 2_147_483_648.0; // 2^31
        let mut d = ZIG_R;
        let mut t = d;
        let q = ZIG_V / (-0.5 * d * d).exp();

        let mut k = [0u32; ZIG_REGIONS];
        let mut w = [0f64; ZIG_REGIONS];
        let mut f = [0f64; ZIG_REGIONS];

        k[0] = ((d / q) * m) as u32;
        k[1] = 0;
        w[0] = q / m;
        w[ZIG_REGIONS - 1] = d / m;
        f[0] = 1.0;
        f[ZIG_REGIONS - 1] = (-0.5 * d * d).exp();

        for i in (1..=ZIG_REGIONS - 2).rev() {
            d = (-2.0 * (ZIG_V / d + (-0.5 * d * d).exp()).ln()).sqrt();
            k[i + 1] = ((d / t) * m) as u32;
            t = d;
            f[i] = (-0.5 * d * d).exp();
            w[i] = d / m;
        }

        Self { jsr, k, w, f }
    }

    /// One step of the SHR3 xorshift generator.
    fn shr3(&mut self) -> u32 {
        let j = self.jsr;
        self.jsr ^= self.jsr << 13;
        self.jsr ^= self.jsr >> 17;
        self.jsr ^= self.jsr << 5;
        j.wrapping_add(self.jsr)
    }

    /// Uniform draw on `(0, 1)`.
    fn uni(&mut self) -> f64 {
        0.5 + self.shr3() as i32 as f64 * 0.2328306e-9
    }

    /// One standard-normal sample.
    fn rnor(&mut self) -> f64 {
        let h = self.shr3() as i32;
        let i = (h & (ZIG_REGIONS as i32 - 1)) as usize;
        if h.unsigned_abs() < self.k[i] {
            h as f64 * self.w[i]
        } else {
            self.fallback(h, i)
        }
    }

    /// Rejection fallback for samples outside the rectangle table.
    fn fallback(&mut self, mut h: i32, mut i: usize) -> f64 {
        loop {
            let x = h as f64 * self.w[i];

            if i == 0 {
                // Tail region, sampled by the exponential method.
                let mut tail_x;
                loop {
                    tail_x = -self.uni().ln() * (1.0 / ZIG_R);
                    let y = -self.uni().ln();
                    if y + y >= tail_x * tail_x {
                        break;
                    }
                }
                return if h > 0 { ZIG_R + tail_x } else { -ZIG_R - tail_x };
            }

            if self.f[i] + self.uni() * (self.f[i - 1] - self.f[i]) < (-0.5 * x * x).exp() {
                return x;
            }

            h = self.shr3() as i32;
            i = (h & (ZIG_REGIONS as i32 - 1)) as usize;
            if h.unsigned_abs() < self.k[i] {
                return h as f64 * self.w[i];
            }
        }
    }
}

impl GaussSource for Ziggurat {
    fn gauss(&mut self, std_dev: f64) -> f64 {
        self.rnor() * std_dev
    }
}

/// Box-Muller sampler.
///
/// Each round of uniforms yields two variates; the second is cached for the
/// next call.
#[derive(Clone, Debug)]
pub struct BoxMuller<R: Rng> {
    rng: R,
    cached: Option<f64>,
}

impl<R: Rng> BoxMuller<R> {
    /// Creates a sampler drawing its uniforms from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng, cached: None }
    }

    /// Uniform draw on `(0, 1]`, safe to feed to `ln`.
    fn unit(&mut self) -> f64 {
        1.0 - self.rng.gen::<f64>()
    }
}

impl<R: Rng> GaussSource for BoxMuller<R> {
    fn gauss(&mut self, std_dev: f64) -> f64 {
        if let Some(z1) = self.cached.take() {
            return z1 * std_dev;
        }

        let r = (-2.0 * self.unit().ln()).sqrt();
        let phi = 2.0 * std::f64::consts::PI * self.unit();

        self.cached = Some(r * phi.sin());
        std_dev * r * phi.cos()
    }
}

/// Marsaglia polar sampler.
///
/// Like [`BoxMuller`], produces variates in pairs and caches the second one.
#[derive(Clone, Debug)]
pub struct Polar<R: Rng> {
    rng: R,
    cached: Option<f64>,
}

impl<R: Rng> Polar<R> {
    /// Creates a sampler drawing its uniforms from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng, cached: None }
    }
}

impl<R: Rng> GaussSource for Polar<R> {
    fn gauss(&mut self, std_dev: f64) -> f64 {
        if let Some(x2) = self.cached.take() {
            return x2 * std_dev;
        }

        let (y1, y2, r2) = loop {
            let y1 = self.rng.gen::<f64>() * 2.0 - 1.0;
            let y2 = self.rng.gen::<f64>() * 2.0 - 1.0;
            let r2 = y1 * y1 + y2 * y2;
            if r2 < 1.0 && r2 != 0.0 {
                break (y1, y2, r2);
            }
        };

        let t = (-2.0 * r2.ln() / r2).sqrt();

        self.cached = Some(y2 * t);
        y1 * t * std_dev
    }
}

/// Gaussian source backed by [`rand_distr::Normal`].
#[derive(Clone, Debug)]
pub struct NormalSource<R: Rng> {
    rng: R,
}

impl<R: Rng> NormalSource<R> {
    /// Creates a sampler drawing from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> GaussSource for NormalSource<R> {
    fn gauss(&mut self, std_dev: f64) -> f64 {
        let normal = Normal::new(0.0, std_dev).expect("a positive standard deviation is valid");
        normal.sample(&mut self.rng)
    }
}
