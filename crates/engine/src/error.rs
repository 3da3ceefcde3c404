//! Error types for engine operations.

use types::Symbol;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while routing or mutating order books.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The requested symbol is not listed on the exchange.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(Symbol),

    /// The symbol name is empty, too long, or not printable.
    #[error("invalid symbol name: {0:?}")]
    InvalidSymbol(Symbol),

    /// The symbol is already listed.
    #[error("symbol already listed: {0}")]
    DuplicateSymbol(Symbol),

    /// The exchange is at its symbol capacity.
    #[error("symbol capacity reached")]
    TooManySymbols,

    /// Orders must have a positive quantity.
    #[error("order quantity cannot be zero")]
    ZeroQuantity,

    /// Limit orders must carry a positive finite price.
    #[error("limit order price must be positive and finite")]
    InvalidPrice,
}
