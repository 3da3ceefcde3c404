//! Exchange simulator - main binary.
//!
//! Wires the pieces together and runs them on two executors:
//!
//! ```text
//! ┌──────────────────┐  MarketDataUpdate   ┌────────────┐  frames   ┌──────────┐
//! │ SimulationDriver │ ──────────────────► │ md bridge  │ ────────► │ sessions │
//! │   (thread)       │     (channel)       │ (thread)   │ (broadcast│ (tokio)  │
//! └──────────────────┘                     └────────────┘   hub)    └──────────┘
//!          │                                                             │
//!          └────────────────────► Exchange ◄─────────────────────────────┘
//!                            (per-book gates)
//! ```
//!
//! Ctrl-C flips the run flag; the simulation thread drains, the accept
//! loop stops, and the process exits cleanly.

mod config;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::bounded;
use engine::Exchange;
use server::BroadcastHub;
use sim::{MakerConfig, MakerPool, MarketMaker, SimulationDriver};
use tracing::{error, info};

use config::ServerConfig;

#[derive(Parser)]
#[command(name = "exchange-sim")]
#[command(about = "Multi-symbol matching engine with simulated liquidity")]
struct Cli {
    /// Server port.
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
}

/// Build the exchange and its market makers from config.
fn build_simulation(
    config: &ServerConfig,
) -> Result<(Arc<Exchange>, MakerPool), engine::EngineError> {
    let mut exchange = Exchange::new();
    for listing in &config.symbols {
        exchange.add_symbol(listing.ticker, listing.price)?;
        info!(ticker = listing.ticker, price = listing.price, "listed symbol");
    }
    let exchange = Arc::new(exchange);

    let mut pool = MakerPool::new(exchange.clone());
    for (i, listing) in config.symbols.iter().enumerate() {
        pool.add(MarketMaker::new(MakerConfig {
            symbol: listing.ticker.to_string(),
            initial_price: listing.price,
            mu: config.mm_mu,
            sigma: config.mm_sigma,
            spread_bps: config.mm_spread_bps,
            level_spacing_bps: config.mm_level_spacing_bps,
            order_size: config.mm_order_size,
            num_levels: config.mm_num_levels,
            dt: config.dt(),
            seed: config.base_seed.wrapping_add(i as u32),
        }));
        info!(ticker = listing.ticker, "created market maker");
    }

    Ok((exchange, pool))
}

/// Resolve on SIGINT or, on unix, SIGTERM.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

/// Resolve on ctrl-c.
#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = ServerConfig::with_port(cli.port);

    info!("initializing exchange");
    let (exchange, pool) = match build_simulation(&config) {
        Ok(built) => built,
        Err(error) => {
            error!(%error, "failed to initialize exchange");
            return ExitCode::FAILURE;
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let hub = BroadcastHub::new(config.broadcast_capacity);

    // Simulation thread → bridge thread → broadcast hub → sessions.
    let (update_tx, update_rx) = bounded(config.symbols.len() * 4);
    let bridge = server::spawn_bridge(update_rx, hub.clone());
    let driver = SimulationDriver::new(
        exchange.clone(),
        pool,
        update_tx,
        running.clone(),
        Duration::from_millis(config.tick_interval_ms),
    );
    let sim_thread = driver.spawn();

    let exit = tokio::select! {
        result = server::serve(
            exchange.clone(),
            hub.clone(),
            config.port,
            config.max_clients,
            running.clone(),
        ) => {
            match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(error) => {
                    error!(%error, "server failed to start");
                    ExitCode::FAILURE
                }
            }
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received");
            ExitCode::SUCCESS
        }
    };

    // Drain: stop the simulation loop, which closes the update channel and
    // lets the bridge exit.
    running.store(false, Ordering::Relaxed);
    if sim_thread.join().is_err() {
        error!("simulation thread panicked");
    }
    if bridge.join().is_err() {
        error!("market-data bridge panicked");
    }
    info!("shutdown complete");
    exit
}
