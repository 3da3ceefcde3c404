//! Core types shared across the exchange simulator.
//!
//! This crate provides the data model used by the matching engine, the
//! liquidity simulator, and the network layer: order identifiers, sides,
//! order kinds and statuses, resting orders, execution reports, and the
//! market-data snapshot broadcast to clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

// =============================================================================
// Identifiers and time
// =============================================================================

/// Unique identifier for orders, scoped to one order book.
///
/// Each book issues ids from its own monotonically increasing counter, so
/// ids from different books may collide; (symbol, id) is globally unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order({})", self.0)
    }
}

/// Ticker symbol (e.g. "AAPL"). At most [`MAX_SYMBOL_LEN`] printable chars.
pub type Symbol = String;

/// Maximum length of a ticker symbol.
pub const MAX_SYMBOL_LEN: usize = 15;

/// Wall-clock timestamp in microseconds since the Unix epoch.
pub type Timestamp = u64;

/// Current wall-clock time in microseconds since the Unix epoch.
///
/// Not monotonic; callers must not assume ordering across threads.
pub fn now_micros() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Check that a symbol is non-empty, within the length cap, and printable.
pub fn valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol.chars().all(|c| c.is_ascii_graphic())
}

// =============================================================================
// Order attributes
// =============================================================================

/// Which side of the market an order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl Side {
    /// Returns the opposite side.
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Execution rule for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    /// Execute immediately at the best available prices; never rests.
    #[serde(rename = "MARKET")]
    Market,
    /// Execute at the limit price or better; the remainder rests.
    #[serde(rename = "LIMIT")]
    Limit,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Market => write!(f, "MARKET"),
            OrderKind::Limit => write!(f, "LIMIT"),
        }
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Accepted, no fills yet.
    #[default]
    #[serde(rename = "NEW")]
    New,
    /// Some quantity filled, some still open.
    #[serde(rename = "PARTIAL")]
    PartiallyFilled,
    /// Fully filled.
    #[serde(rename = "FILLED")]
    Filled,
    /// Cancelled; any open quantity is gone.
    #[serde(rename = "CANCELLED")]
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::New => write!(f, "NEW"),
            OrderStatus::PartiallyFilled => write!(f, "PARTIAL"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A single order.
///
/// Invariants: `filled <= quantity` at all times, and
/// `status == Filled` exactly when `filled == quantity`. Market orders are
/// consumed by matching and never rest in a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Book-scoped identifier.
    pub id: OrderId,
    /// Symbol being traded.
    pub symbol: Symbol,
    /// Buy or sell.
    pub side: Side,
    /// Market or limit.
    pub kind: OrderKind,
    /// Limit price; 0.0 and irrelevant for market orders.
    pub price: f64,
    /// Original quantity.
    pub quantity: u32,
    /// Quantity filled so far.
    pub filled: u32,
    /// Current status.
    pub status: OrderStatus,
    /// Creation time, microseconds since epoch.
    pub timestamp: Timestamp,
}

impl Order {
    /// Create a fresh order with no fills.
    pub fn new(
        id: OrderId,
        symbol: impl Into<Symbol>,
        side: Side,
        kind: OrderKind,
        price: f64,
        quantity: u32,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            side,
            kind,
            price,
            quantity,
            filled: 0,
            status: OrderStatus::New,
            timestamp,
        }
    }

    /// Unfilled quantity.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.quantity - self.filled
    }

    /// Whether the order is completely filled.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.filled >= self.quantity
    }

    /// Record a fill and keep status consistent with the fill level.
    pub fn apply_fill(&mut self, qty: u32) {
        debug_assert!(qty <= self.remaining());
        self.filled += qty;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }
}

// =============================================================================
// Execution reports
// =============================================================================

/// Per-fill confirmation, one copy for each side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// The order this report is addressed to.
    pub order_id: OrderId,
    /// The counterparty order it matched against.
    pub match_id: OrderId,
    /// Trade price.
    pub price: f64,
    /// Trade quantity.
    pub quantity: u32,
    /// Status of `order_id` after this fill.
    pub status: OrderStatus,
    /// Fill time, microseconds since epoch.
    pub timestamp: Timestamp,
}

// =============================================================================
// Market data
// =============================================================================

/// One price level as exposed in depth snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    /// Price of the level.
    pub price: f64,
    /// Total unfilled quantity queued at this price.
    pub quantity: u32,
    /// Number of resting orders at this price.
    pub order_count: usize,
}

/// Top-of-book snapshot broadcast to market-data subscribers.
///
/// `open`/`high`/`low`/`volume` are carried for wire compatibility but are
/// not populated by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarketDataUpdate {
    pub ticker: Symbol,
    pub bid: f64,
    pub ask: f64,
    pub last: f64,
    pub bid_size: u32,
    pub ask_size: u32,
    pub last_size: u32,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub timestamp: Timestamp,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&OrderKind::Market).unwrap(), "\"MARKET\"");
        assert_eq!(
            serde_json::to_string(&OrderStatus::PartiallyFilled).unwrap(),
            "\"PARTIAL\""
        );
        let side: Side = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(side, Side::Sell);
    }

    #[test]
    fn test_order_fill_status() {
        let mut order = Order::new(
            OrderId(1),
            "AAPL",
            Side::Buy,
            OrderKind::Limit,
            150.0,
            100,
            0,
        );
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.remaining(), 100);

        order.apply_fill(40);
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining(), 60);
        assert!(!order.is_filled());

        order.apply_fill(60);
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.remaining(), 0);
        assert!(order.is_filled());
    }

    #[test]
    fn test_symbol_validation() {
        assert!(valid_symbol("AAPL"));
        assert!(valid_symbol("BRK.B"));
        assert!(!valid_symbol(""));
        assert!(!valid_symbol("THISNAMEISTOOLONG"));
        assert!(!valid_symbol("BAD SYMBOL"));
    }

    #[test]
    fn test_execution_report_serializes_wire_fields() {
        let report = ExecutionReport {
            order_id: OrderId(7),
            match_id: OrderId(3),
            price: 101.5,
            quantity: 25,
            status: OrderStatus::Filled,
            timestamp: 1_700_000_000_000_000,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["order_id"], 7);
        assert_eq!(json["match_id"], 3);
        assert_eq!(json["status"], "FILLED");
    }

    #[test]
    fn test_now_micros_is_plausible() {
        // After 2020-01-01 in microseconds.
        assert!(now_micros() > 1_577_836_800_000_000);
    }
}
