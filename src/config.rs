//! Central configuration for the exchange simulator.

use sim::dt_for_interval_ms;

/// One listed symbol and its starting price.
#[derive(Debug, Clone)]
pub struct SymbolListing {
    pub ticker: &'static str,
    pub price: f64,
}

/// Master configuration for the server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // ─────────────────────────────────────────────────────────────────────
    // Network
    // ─────────────────────────────────────────────────────────────────────
    /// TCP port to listen on.
    pub port: u16,
    /// Maximum concurrently connected clients.
    pub max_clients: usize,
    /// Broadcast buffer, in frames, per subscriber.
    pub broadcast_capacity: usize,

    // ─────────────────────────────────────────────────────────────────────
    // Simulation
    // ─────────────────────────────────────────────────────────────────────
    /// Wall-clock interval between simulation ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Seed for the first agent; subsequent agents offset from it.
    pub base_seed: u32,

    // ─────────────────────────────────────────────────────────────────────
    // Market makers (one per symbol)
    // ─────────────────────────────────────────────────────────────────────
    /// Annualized drift of each agent's price model.
    pub mm_mu: f64,
    /// Annualized volatility of each agent's price model.
    pub mm_sigma: f64,
    /// Quoted spread in basis points.
    pub mm_spread_bps: f64,
    /// Ladder spacing in basis points.
    pub mm_level_spacing_bps: f64,
    /// Order size per ladder level.
    pub mm_order_size: u32,
    /// Ladder levels per side.
    pub mm_num_levels: usize,

    /// Startup symbol universe.
    pub symbols: Vec<SymbolListing>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            max_clients: server::MAX_CLIENTS,
            broadcast_capacity: 256,

            tick_interval_ms: 100,
            base_seed: 1,

            mm_mu: 0.05,
            mm_sigma: 0.20,
            mm_spread_bps: 20.0,
            mm_level_spacing_bps: 5.0,
            mm_order_size: 100,
            mm_num_levels: 5,

            symbols: vec![
                SymbolListing { ticker: "AAPL", price: 150.0 },
                SymbolListing { ticker: "MSFT", price: 380.0 },
                SymbolListing { ticker: "GOOGL", price: 140.0 },
                SymbolListing { ticker: "AMZN", price: 180.0 },
                SymbolListing { ticker: "TSLA", price: 250.0 },
            ],
        }
    }
}

impl ServerConfig {
    /// Config with a specific port.
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// GBM step in years per simulation tick.
    pub fn dt(&self) -> f64 {
        dt_for_interval_ms(self.tick_interval_ms)
    }
}
