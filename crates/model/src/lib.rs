//! Stochastic price model: seedable random source and geometric Brownian
//! motion.
//!
//! The random pipeline is deliberately simple and fully deterministic for a
//! given seed: a 32-bit linear congruential generator feeds a polar
//! Box–Muller transform (with the spare-sample cache), so an identical seed
//! reproduces an identical trajectory sample for sample. RNG state lives in
//! an explicit [`Lcg`] value owned by its consumer; there is no process
//! global.

mod gbm;
mod rng;
pub mod stats;

pub use gbm::Gbm;
pub use rng::Lcg;
