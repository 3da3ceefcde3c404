//! The simulation tick loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use engine::Exchange;
use tracing::{debug, info};
use types::MarketDataUpdate;

use crate::maker::MakerPool;

/// Drives the agent pool and the market-data feed on a dedicated thread.
///
/// Each iteration ticks every agent, then captures a top-of-book snapshot
/// per symbol (each under its book's gate) and pushes it into the update
/// channel. The loop observes the shared run flag between iterations and
/// drains when it clears, or when the update channel's receiver goes away.
pub struct SimulationDriver {
    exchange: Arc<Exchange>,
    pool: MakerPool,
    updates: Sender<MarketDataUpdate>,
    running: Arc<AtomicBool>,
    interval: Duration,
}

impl SimulationDriver {
    /// Create a driver. `interval` is the wall-clock tick period.
    pub fn new(
        exchange: Arc<Exchange>,
        pool: MakerPool,
        updates: Sender<MarketDataUpdate>,
        running: Arc<AtomicBool>,
        interval: Duration,
    ) -> Self {
        Self {
            exchange,
            pool,
            updates,
            running,
            interval,
        }
    }

    /// One tick: advance every agent, then publish a snapshot per book.
    ///
    /// Returns false when the update channel is closed.
    pub fn step(&mut self) -> bool {
        self.pool.tick_all();

        for update in self.exchange.market_data_all() {
            debug!(
                ticker = %update.ticker,
                bid = update.bid,
                ask = update.ask,
                last = update.last,
                "market data"
            );
            if self.updates.send(update).is_err() {
                return false;
            }
        }
        true
    }

    /// Run the loop until the run flag clears or the channel closes.
    pub fn run(mut self) {
        info!(agents = self.pool.len(), "simulation thread started");
        while self.running.load(Ordering::Relaxed) {
            if !self.step() {
                break;
            }
            thread::sleep(self.interval);
        }
        info!("simulation thread stopped");
    }

    /// Spawn the loop on its own named thread.
    pub fn spawn(self) -> thread::JoinHandle<()> {
        thread::Builder::new()
            .name("simulation".to_string())
            .spawn(move || self.run())
            .expect("failed to spawn simulation thread")
    }
}
