//! Market-maker agents.

use std::sync::Arc;

use engine::Exchange;
use model::{Gbm, Lcg};
use tracing::debug;
use types::{OrderId, OrderKind, Side, Symbol};

/// Trading seconds in a year: 252 sessions of 6.5 hours.
const TRADING_SECONDS_PER_YEAR: f64 = 252.0 * 6.5 * 3600.0;

/// GBM step, in years, for a wall-clock tick interval in milliseconds.
///
/// A 100 ms tick is roughly 1.7e-8 years of trading time.
pub fn dt_for_interval_ms(interval_ms: u64) -> f64 {
    interval_ms as f64 / 1_000.0 / TRADING_SECONDS_PER_YEAR
}

/// Configuration for one market maker.
#[derive(Debug, Clone)]
pub struct MakerConfig {
    /// Symbol to quote.
    pub symbol: Symbol,
    /// Starting fair price for the GBM process.
    pub initial_price: f64,
    /// Annualized drift.
    pub mu: f64,
    /// Annualized volatility.
    pub sigma: f64,
    /// Quoted spread in basis points (total, bid to ask at level 0).
    pub spread_bps: f64,
    /// Spacing between ladder levels in basis points.
    pub level_spacing_bps: f64,
    /// Order size quoted at each level.
    pub order_size: u32,
    /// Number of ladder levels per side.
    pub num_levels: usize,
    /// GBM step in years per tick.
    pub dt: f64,
    /// Seed for the agent's random source.
    pub seed: u32,
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            symbol: "SIM".to_string(),
            initial_price: 100.0,
            mu: 0.05,
            sigma: 0.20,
            spread_bps: 20.0,
            level_spacing_bps: 5.0,
            order_size: 100,
            num_levels: 5,
            dt: dt_for_interval_ms(100),
            seed: 1,
        }
    }
}

/// A simulated liquidity provider for one symbol.
///
/// Every tick the agent advances its price model, pulls all of its
/// outstanding quotes, and lays a fresh symmetric ladder of `num_levels`
/// bids and asks around the new fair price. Order ids are recorded only
/// when the quote rested, so the next tick cancels exactly what is still
/// in the book.
pub struct MarketMaker {
    config: MakerConfig,
    model: Gbm,
    bid_orders: Vec<Option<OrderId>>,
    ask_orders: Vec<Option<OrderId>>,
}

impl MarketMaker {
    /// Create an agent from its configuration.
    pub fn new(config: MakerConfig) -> Self {
        let model = Gbm::new(
            config.initial_price,
            config.mu,
            config.sigma,
            config.dt,
            Lcg::new(config.seed),
        );
        let levels = config.num_levels;
        Self {
            config,
            model,
            bid_orders: vec![None; levels],
            ask_orders: vec![None; levels],
        }
    }

    /// Symbol this agent quotes.
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Number of order ids currently tracked as outstanding.
    pub fn outstanding_quotes(&self) -> usize {
        self.bid_orders
            .iter()
            .chain(self.ask_orders.iter())
            .filter(|slot| slot.is_some())
            .count()
    }

    /// Cancel every outstanding quote and clear the id slots.
    pub fn cancel_all(&mut self, exchange: &Exchange) {
        for slot in self.bid_orders.iter_mut().chain(self.ask_orders.iter_mut()) {
            if let Some(id) = slot.take() {
                // A quote may already be gone (filled); that is fine.
                let _ = exchange.cancel(&self.config.symbol, id);
            }
        }
    }

    /// Advance the price model and re-quote the ladder.
    pub fn tick(&mut self, exchange: &Exchange) {
        let fair = self.model.next();
        self.cancel_all(exchange);

        let half_spread = fair * (self.config.spread_bps / 10_000.0) / 2.0;
        let spacing = fair * (self.config.level_spacing_bps / 10_000.0);

        for k in 0..self.config.num_levels {
            let offset = k as f64 * spacing;

            let bid_price = fair - half_spread - offset;
            if bid_price > 0.0 {
                match exchange.submit(
                    &self.config.symbol,
                    Side::Buy,
                    OrderKind::Limit,
                    bid_price,
                    self.config.order_size,
                ) {
                    Ok(result) if result.rested() => self.bid_orders[k] = Some(result.order_id),
                    Ok(_) => {}
                    Err(error) => {
                        debug!(symbol = %self.config.symbol, %error, "bid quote rejected")
                    }
                }
            }

            let ask_price = fair + half_spread + offset;
            match exchange.submit(
                &self.config.symbol,
                Side::Sell,
                OrderKind::Limit,
                ask_price,
                self.config.order_size,
            ) {
                Ok(result) if result.rested() => self.ask_orders[k] = Some(result.order_id),
                Ok(_) => {}
                Err(error) => {
                    debug!(symbol = %self.config.symbol, %error, "ask quote rejected")
                }
            }
        }
    }
}

/// A pool of market makers sharing one exchange.
///
/// Agents tick sequentially; the pool has no parallelism of its own.
pub struct MakerPool {
    exchange: Arc<Exchange>,
    makers: Vec<MarketMaker>,
}

impl MakerPool {
    /// Create an empty pool bound to an exchange.
    pub fn new(exchange: Arc<Exchange>) -> Self {
        Self {
            exchange,
            makers: Vec::new(),
        }
    }

    /// Add an agent to the pool.
    pub fn add(&mut self, maker: MarketMaker) {
        self.makers.push(maker);
    }

    /// Number of agents in the pool.
    pub fn len(&self) -> usize {
        self.makers.len()
    }

    /// True when the pool has no agents.
    pub fn is_empty(&self) -> bool {
        self.makers.is_empty()
    }

    /// Tick every agent once, in insertion order.
    pub fn tick_all(&mut self) {
        for maker in &mut self.makers {
            maker.tick(&self.exchange);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Side;

    fn setup() -> (Arc<Exchange>, MarketMaker) {
        let mut exchange = Exchange::new();
        exchange.add_symbol("AAPL", 150.0).unwrap();
        let exchange = Arc::new(exchange);
        let maker = MarketMaker::new(MakerConfig {
            symbol: "AAPL".to_string(),
            initial_price: 150.0,
            seed: 42,
            ..MakerConfig::default()
        });
        (exchange, maker)
    }

    #[test]
    fn test_tick_quotes_full_ladder() {
        let (exchange, mut maker) = setup();
        maker.tick(&exchange);

        let book = exchange.book("AAPL").unwrap().lock();
        let (bid_levels, ask_levels) = book.depth();
        assert_eq!(bid_levels, 5);
        assert_eq!(ask_levels, 5);
        assert_eq!(book.order_count(), 10);
        assert_eq!(maker.outstanding_quotes(), 10);

        // Ladder brackets the fair price without crossing itself.
        assert!(book.best_bid() > 0.0);
        assert!(book.best_bid() < book.best_ask());
        // 20 bps on ~150 is ~0.30; the touch spread stays in that ballpark.
        let spread = book.spread();
        assert!(spread > 0.1 && spread < 1.0, "spread {}", spread);
    }

    #[test]
    fn test_ladder_levels_are_spaced() {
        let (exchange, mut maker) = setup();
        maker.tick(&exchange);

        let book = exchange.book("AAPL").unwrap().lock();
        let bids = book.snapshot_levels(Side::Buy, 10);
        assert_eq!(bids.len(), 5);
        for pair in bids.windows(2) {
            let gap = pair[0].price - pair[1].price;
            // 5 bps of ~150, allowing for the GBM drift of the fair price.
            assert!(gap > 0.05 && gap < 0.11, "gap {}", gap);
        }
        for level in &bids {
            assert_eq!(level.quantity, 100);
        }
    }

    #[test]
    fn test_requote_replaces_previous_ladder() {
        let (exchange, mut maker) = setup();
        maker.tick(&exchange);
        maker.tick(&exchange);
        maker.tick(&exchange);

        // Old quotes are cancelled each tick, so the book never accumulates.
        let book = exchange.book("AAPL").unwrap().lock();
        assert_eq!(book.order_count(), 10);
        assert_eq!(maker.outstanding_quotes(), 10);
    }

    #[test]
    fn test_cancel_all_empties_book() {
        let (exchange, mut maker) = setup();
        maker.tick(&exchange);
        maker.cancel_all(&exchange);

        let book = exchange.book("AAPL").unwrap().lock();
        assert_eq!(book.order_count(), 0);
        assert_eq!(maker.outstanding_quotes(), 0);
        assert_eq!(book.best_bid(), 0.0);
        assert_eq!(book.best_ask(), 0.0);
    }

    #[test]
    fn test_two_makers_share_one_book() {
        let (exchange, mut first) = setup();
        let mut second = MarketMaker::new(MakerConfig {
            symbol: "AAPL".to_string(),
            initial_price: 150.0,
            seed: 43,
            ..MakerConfig::default()
        });

        first.tick(&exchange);
        second.tick(&exchange);

        // At a 20 bps spread the two fair prices sit well inside each
        // other's ladders, so nothing crosses and every quote rests.
        let book = exchange.book("AAPL").unwrap().lock();
        assert_eq!(
            book.order_count(),
            first.outstanding_quotes() + second.outstanding_quotes()
        );
    }

    #[test]
    fn test_pool_ticks_every_maker() {
        let mut exchange = Exchange::new();
        exchange.add_symbol("AAPL", 150.0).unwrap();
        exchange.add_symbol("MSFT", 380.0).unwrap();
        let exchange = Arc::new(exchange);

        let mut pool = MakerPool::new(exchange.clone());
        for (i, symbol) in ["AAPL", "MSFT"].iter().enumerate() {
            pool.add(MarketMaker::new(MakerConfig {
                symbol: symbol.to_string(),
                initial_price: if i == 0 { 150.0 } else { 380.0 },
                seed: i as u32 + 1,
                ..MakerConfig::default()
            }));
        }
        assert_eq!(pool.len(), 2);
        pool.tick_all();

        for symbol in ["AAPL", "MSFT"] {
            let book = exchange.book(symbol).unwrap().lock();
            assert_eq!(book.order_count(), 10, "{} not quoted", symbol);
        }
    }

    #[test]
    fn test_dt_for_interval() {
        let dt = dt_for_interval_ms(100);
        assert!((dt - 1.7e-8).abs() < 1e-9);
    }
}
