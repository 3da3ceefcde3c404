//! Per-connection session: request dispatch and response writing.

use std::net::SocketAddr;
use std::sync::Arc;

use engine::{EngineError, Exchange};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::hub::BroadcastHub;
use crate::protocol::{self, Request};

/// Write one frame plus the line terminator.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, frame: &str) -> std::io::Result<()> {
    writer.write_all(frame.as_bytes()).await?;
    writer.write_all(b"\n").await
}

/// Dispatch one decoded line and write any replies.
///
/// An `Err` means the transport failed and the session should close; all
/// protocol and engine level problems are answered in-band with ERROR
/// frames and keep the connection open.
async fn handle_line<W: AsyncWrite + Unpin>(
    line: &str,
    engine: &Exchange,
    writer: &mut W,
) -> std::io::Result<()> {
    let request = match protocol::decode_request(line) {
        Ok(request) => request,
        Err(error) => {
            debug!(%error, "rejected inbound line");
            return write_line(writer, &protocol::encode_error(&error.to_string())).await;
        }
    };

    match request {
        Request::OrderNew {
            ticker,
            side,
            kind,
            price,
            quantity,
        } => match engine.submit(&ticker, side, kind, price, quantity) {
            Ok(result) => {
                for report in &result.reports {
                    write_line(writer, &protocol::encode_execution(report)).await?;
                }
                Ok(())
            }
            Err(EngineError::UnknownSymbol(_)) => {
                write_line(writer, &protocol::encode_error("Symbol not found")).await
            }
            Err(error) => write_line(writer, &protocol::encode_error(&error.to_string())).await,
        },
        Request::OrderCancel { ticker, order_id } => {
            match engine.cancel(&ticker, order_id) {
                Ok(true) => Ok(()),
                // Unknown id and unknown symbol answer alike.
                Ok(false) | Err(_) => {
                    write_line(writer, &protocol::encode_error("Order not found")).await
                }
            }
        }
        Request::Ignored => Ok(()),
    }
}

/// Serve one client until EOF, transport error, or hub shutdown.
pub(crate) async fn run_session(
    stream: TcpStream,
    peer: SocketAddr,
    engine: Arc<Exchange>,
    hub: BroadcastHub,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let mut feed = hub.subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if let Err(error) = handle_line(&line, &engine, &mut write_half).await {
                        warn!(%peer, %error, "session write failed");
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(error) => {
                    warn!(%peer, %error, "session read failed");
                    break;
                }
            },
            frame = feed.recv() => match frame {
                Ok(frame) => {
                    if write_line(&mut write_half, &frame).await.is_err() {
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    // Market data is most-recent-wins; dropped frames are
                    // expected for slow readers.
                    debug!(%peer, skipped, "session lagged market data");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}
