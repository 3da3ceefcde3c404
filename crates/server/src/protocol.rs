//! Wire protocol: one JSON object per newline-terminated line.
//!
//! # The duplicate `type` key
//!
//! An `ORDER_NEW` message carries the key `type` twice: once as the message
//! type and once as the order type (`"MARKET"`/`"LIMIT"`). Decoding goes
//! through `serde_json::Value`, whose object map keeps the **later**
//! occurrence in document order, so a well-formed order message presents
//! its order type under `type`; the decoder classifies those values as
//! `ORDER_NEW`. A message carrying only `"type":"ORDER_NEW"` is tolerated
//! and defaults the order kind to LIMIT. Producers should not rely on the
//! ambiguity.

use serde_json::{json, Value};
use types::{ExecutionReport, MarketDataUpdate, OrderId, OrderKind, Side, Symbol};

/// A decoded inbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Submit an order.
    OrderNew {
        ticker: Symbol,
        side: Side,
        kind: OrderKind,
        price: f64,
        quantity: u32,
    },
    /// Cancel a resting order.
    OrderCancel { ticker: Symbol, order_id: OrderId },
    /// A recognized message type this layer does not act on.
    Ignored,
}

/// Decode failures, each mapping to an ERROR reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Not a JSON object, or missing a usable `type`.
    #[error("Invalid message")]
    Malformed,
    /// `type` named something the protocol does not know.
    #[error("Unknown message type")]
    UnknownType,
}

fn str_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Decode one line into a [`Request`].
pub fn decode_request(line: &str) -> Result<Request, ProtocolError> {
    let value: Value = serde_json::from_str(line).map_err(|_| ProtocolError::Malformed)?;
    let obj = value.as_object().ok_or(ProtocolError::Malformed)?;
    let msg_type = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::Malformed)?;

    match msg_type {
        // Order type seen through the duplicate-key collapse, or a bare
        // ORDER_NEW with the kind defaulted.
        "MARKET" | "LIMIT" | "ORDER_NEW" => {
            let kind = if msg_type == "MARKET" {
                OrderKind::Market
            } else {
                OrderKind::Limit
            };
            let side = match str_field(obj, "side").as_deref() {
                Some("BUY") => Side::Buy,
                // Anything other than BUY reads as a sell.
                _ => Side::Sell,
            };
            Ok(Request::OrderNew {
                ticker: str_field(obj, "ticker").unwrap_or_default(),
                side,
                kind,
                price: obj.get("price").and_then(Value::as_f64).unwrap_or(0.0),
                quantity: obj.get("quantity").and_then(Value::as_u64).unwrap_or(0) as u32,
            })
        }
        "ORDER_CANCEL" => Ok(Request::OrderCancel {
            ticker: str_field(obj, "ticker").unwrap_or_default(),
            order_id: OrderId(obj.get("order_id").and_then(Value::as_u64).unwrap_or(0)),
        }),
        "MARKET_DATA" | "EXECUTION_REPORT" | "ERROR" | "HEARTBEAT" | "PORTFOLIO_SYNC" => {
            Ok(Request::Ignored)
        }
        _ => Err(ProtocolError::UnknownType),
    }
}

/// Serialize a market-data update (without the trailing newline).
pub fn encode_market_data(update: &MarketDataUpdate) -> String {
    json!({
        "type": "MARKET_DATA",
        "ticker": update.ticker,
        "bid": update.bid,
        "ask": update.ask,
        "last": update.last,
        "bid_size": update.bid_size,
        "ask_size": update.ask_size,
        "last_size": update.last_size,
        "open": update.open,
        "high": update.high,
        "low": update.low,
        "volume": update.volume,
        "timestamp": update.timestamp,
    })
    .to_string()
}

/// Serialize an execution report (without the trailing newline).
pub fn encode_execution(report: &ExecutionReport) -> String {
    json!({
        "type": "EXECUTION_REPORT",
        "order_id": report.order_id.0,
        "match_id": report.match_id.0,
        "price": report.price,
        "quantity": report.quantity,
        "status": report.status.to_string(),
        "timestamp": report.timestamp,
    })
    .to_string()
}

/// Serialize an error reply (without the trailing newline).
pub fn encode_error(message: &str) -> String {
    json!({
        "type": "ERROR",
        "message": message,
    })
    .to_string()
}
