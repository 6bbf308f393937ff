//! Low-level building blocks: big-integer randomness and primes, Gaussian
//! samplers, and ring polynomial arithmetic.

pub mod gauss;
pub mod poly;
pub mod prime;
