//! Somewhat-homomorphic encryption over a polynomial-LWE ring.
//!
//! Integers are encoded as base-`b` digit polynomials, encrypted under a
//! ring-LWE style public key, and the resulting ciphertexts support a bounded
//! number of homomorphic additions and multiplications before their noise
//! reaches the decryption threshold. A relinearization ladder shrinks a
//! degree-2 ciphertext back to degree 1 so that evaluation can continue.
//!
//! This library has 4 core layers:
//! [`primitives`]: big-integer randomness, Gaussian samplers, and arithmetic
//!                 in the ring `Z_q[x]/(x^n + 1)`,
//! [`swhe`]: keys, ciphertexts, and the homomorphic operations,
//! [`encoding`]: the integer to digit-polynomial codec,
//! [`params`]: derivation of a consistent `(n, q, t, b, D)` parameter set
//!             from an arithmetic circuit and a security target.

#[macro_use]
extern crate static_assertions;

pub mod encoding;
pub mod error;
pub mod params;
pub mod primitives;
pub mod settings;
pub mod swhe;

pub use error::{Error, SettingsIssue};
pub use settings::Settings;
pub use swhe::{Ciphertext, EvalKey, Key, Swhe};
