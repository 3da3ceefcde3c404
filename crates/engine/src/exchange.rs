//! Multi-symbol router.
//!
//! The exchange owns one gated [`OrderBook`] per listed symbol and drives
//! submissions and cancellations through the crossing loop. The symbol set
//! is fixed at startup; lookups are a linear scan, which is plenty for the
//! small universe the exchange carries.

use parking_lot::Mutex;

use types::{now_micros, ExecutionReport, MarketDataUpdate, Order, OrderId, OrderKind, OrderStatus, Side, Symbol};

use crate::book::OrderBook;
use crate::error::{EngineError, Result};
use crate::matching::match_incoming;

/// Maximum number of listed symbols.
pub const MAX_SYMBOLS: usize = 16;

/// Outcome of one submission: the originating order's id and final state,
/// plus the execution reports accumulated in fill order (two per fill,
/// aggressor first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    /// Id assigned to the submitted order.
    pub order_id: OrderId,
    /// Final status of the submitted order.
    pub status: OrderStatus,
    /// Unfilled quantity when the submission finished.
    pub remaining: u32,
    /// Execution reports in fill order.
    pub reports: Vec<ExecutionReport>,
}

impl MatchResult {
    /// Whether the submitted order is now resting in the book.
    ///
    /// True for a limit order with open quantity; market leftovers are
    /// cancelled and never rest.
    pub fn rested(&self) -> bool {
        self.remaining > 0 && self.status != OrderStatus::Cancelled
    }

    /// Total quantity filled for the submitted order.
    pub fn filled_quantity(&self) -> u32 {
        self.reports
            .iter()
            .filter(|r| r.order_id == self.order_id)
            .map(|r| r.quantity)
            .sum()
    }
}

/// The exchange: one order book per symbol, each behind its own gate.
pub struct Exchange {
    books: Vec<(Symbol, Mutex<OrderBook>)>,
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange {
    /// Create an exchange with no listed symbols.
    pub fn new() -> Self {
        Self { books: Vec::new() }
    }

    /// List a symbol with a reference price for mid-price fallback.
    ///
    /// Symbols are listed once, at startup, before the exchange is shared
    /// across threads.
    pub fn add_symbol(&mut self, symbol: impl Into<Symbol>, reference_price: f64) -> Result<()> {
        let symbol = symbol.into();
        if !types::valid_symbol(&symbol) {
            return Err(EngineError::InvalidSymbol(symbol));
        }
        if self.books.len() >= MAX_SYMBOLS {
            return Err(EngineError::TooManySymbols);
        }
        if self.books.iter().any(|(s, _)| *s == symbol) {
            return Err(EngineError::DuplicateSymbol(symbol));
        }
        let mut book = OrderBook::new(symbol.clone());
        book.set_reference_price(reference_price);
        self.books.push((symbol, Mutex::new(book)));
        Ok(())
    }

    /// The listed symbols, in listing order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.books.iter().map(|(s, _)| s.clone()).collect()
    }

    /// Gated book for `symbol`, if listed.
    pub fn book(&self, symbol: &str) -> Option<&Mutex<OrderBook>> {
        self.books
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, book)| book)
    }

    /// Submit an order and drive it through the crossing loop.
    ///
    /// Takes the book's gate for the whole operation. The order matches
    /// first; a limit remainder is then installed at its limit price, while
    /// a market remainder is cancelled and discarded. Reports come back in
    /// fill order.
    pub fn submit(
        &self,
        symbol: &str,
        side: Side,
        kind: OrderKind,
        price: f64,
        quantity: u32,
    ) -> Result<MatchResult> {
        let book = self
            .book(symbol)
            .ok_or_else(|| EngineError::UnknownSymbol(symbol.to_string()))?;
        if quantity == 0 {
            return Err(EngineError::ZeroQuantity);
        }
        if kind == OrderKind::Limit && !(price > 0.0 && price.is_finite()) {
            return Err(EngineError::InvalidPrice);
        }

        let mut book = book.lock();
        let id = book.allocate_order_id();
        let limit_price = if kind == OrderKind::Limit { price } else { 0.0 };
        let mut order = Order::new(
            id,
            symbol.to_string(),
            side,
            kind,
            limit_price,
            quantity,
            now_micros(),
        );

        let mut reports = Vec::new();
        match_incoming(&mut book, &mut order, &mut reports);

        if order.remaining() > 0 {
            match kind {
                // Market leftovers never rest.
                OrderKind::Market => order.status = OrderStatus::Cancelled,
                OrderKind::Limit => {
                    let status = order.status;
                    let remaining = order.remaining();
                    book.install(order);
                    book.refresh_best(side.opposite());
                    return Ok(MatchResult {
                        order_id: id,
                        status,
                        remaining,
                        reports,
                    });
                }
            }
        }

        book.refresh_best(Side::Buy);
        book.refresh_best(Side::Sell);
        Ok(MatchResult {
            order_id: id,
            status: order.status,
            remaining: order.remaining(),
            reports,
        })
    }

    /// Cancel a resting order. Returns false when the id is unknown;
    /// idempotent after a successful cancel.
    pub fn cancel(&self, symbol: &str, order_id: OrderId) -> Result<bool> {
        let book = self
            .book(symbol)
            .ok_or_else(|| EngineError::UnknownSymbol(symbol.to_string()))?;
        Ok(book.lock().cancel(order_id))
    }

    /// Capture a market-data update per book, each under its own gate.
    pub fn market_data_all(&self) -> Vec<MarketDataUpdate> {
        self.books
            .iter()
            .map(|(_, book)| book.lock().market_data(now_micros()))
            .collect()
    }
}
