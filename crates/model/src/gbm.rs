//! Discretized geometric Brownian motion.

use crate::rng::Lcg;

/// Minimum price the process can report; keeps trajectories positive.
const PRICE_FLOOR: f64 = 0.01;

/// Geometric Brownian motion price process.
///
/// Each step applies
/// `S ← S · exp((μ − σ²/2)·Δt + σ·√Δt·Z)` with `Z ~ N(0, 1)` drawn from the
/// process's own generator. Parameters are annualized; `dt` is the step in
/// years.
#[derive(Debug, Clone)]
pub struct Gbm {
    s0: f64,
    mu: f64,
    sigma: f64,
    dt: f64,
    current: f64,
    rng: Lcg,
}

impl Gbm {
    /// Create a process starting at `s0` with drift `mu`, volatility
    /// `sigma`, and step `dt`, owning its random source.
    pub fn new(s0: f64, mu: f64, sigma: f64, dt: f64, rng: Lcg) -> Self {
        Self {
            s0,
            mu,
            sigma,
            dt,
            current: s0,
            rng,
        }
    }

    /// Current price without advancing.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Advance one step and return the new price.
    pub fn next(&mut self) -> f64 {
        let z = self.rng.normal();
        let drift = (self.mu - 0.5 * self.sigma * self.sigma) * self.dt;
        let diffusion = self.sigma * self.dt.sqrt() * z;

        self.current *= (drift + diffusion).exp();
        if self.current < PRICE_FLOOR {
            self.current = PRICE_FLOOR;
        }
        self.current
    }

    /// Return the price to its starting value. The random source keeps its
    /// state; reseed it separately for a reproducible rerun.
    pub fn reset(&mut self) {
        self.current = self.s0;
    }

    /// Reseed the owned random source.
    pub fn reseed(&mut self, seed: u32) {
        self.rng.reseed(seed);
    }
}
