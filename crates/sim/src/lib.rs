//! Liquidity simulation: GBM-driven market makers and the tick loop that
//! drives them.
//!
//! Each [`MarketMaker`] owns a geometric Brownian motion process and quotes
//! a symmetric ladder of limit orders around its fair price, cancelling and
//! re-quoting on every tick. The [`SimulationDriver`] runs the agent pool
//! on its own thread and pushes per-book market-data snapshots into a
//! channel for the network layer to broadcast.

mod driver;
mod maker;

pub use driver::SimulationDriver;
pub use maker::{dt_for_interval_ms, MakerConfig, MakerPool, MarketMaker};
