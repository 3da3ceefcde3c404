//! Order books and the matching engine.
//!
//! This crate implements the heart of the exchange:
//!
//! - [`SideIndex`]: an ordered collection of price levels for one side of
//!   one symbol, with O(log P) insert/find/remove and O(1) best-level access.
//! - [`OrderBook`]: one symbol's bid and ask indices, FIFO queues, cached
//!   best prices, and the last-trade cache.
//! - [`Exchange`]: the multi-symbol router, which resolves a book, takes
//!   its gate, drives the crossing loop, and returns execution reports.
//!
//! # Concurrency
//!
//! Each book is protected by its own `parking_lot::Mutex`, owned by the
//! [`Exchange`]. Submissions within one book are totally ordered by gate
//! acquisition, which is what defines FIFO resting order. Nothing inside a
//! held gate performs I/O.

mod book;
mod error;
mod exchange;
mod level;
mod matching;

pub use book::OrderBook;
pub use error::{EngineError, Result};
pub use exchange::{Exchange, MatchResult, MAX_SYMBOLS};
pub use level::{PriceKey, PriceLevel, SideIndex};
