//! Network layer: newline-delimited JSON over TCP.
//!
//! Each connected client gets its own session task that reads framed
//! requests, dispatches them into the exchange, and writes back execution
//! reports and errors. Market data flows the other way: the simulation
//! thread pushes snapshots through [`BroadcastHub`], which serializes each
//! one once and fans the frame out to every session. A slow or dead client
//! lags its broadcast subscription and drops frames; it can never stall
//! matching or the other sessions.

mod error;
mod hub;
pub mod protocol;
mod session;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use engine::Exchange;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use error::ServerError;
pub use hub::{spawn_bridge, BroadcastHub};

/// Default cap on concurrently connected clients.
pub const MAX_CLIENTS: usize = 32;

/// Accept clients until the run flag clears.
///
/// Binds immediately (startup failure surfaces as [`ServerError::Bind`]),
/// then spawns one session task per accepted connection. Connections over
/// `max_clients` are closed right after accept; existing sessions are
/// unaffected.
pub async fn serve(
    engine: Arc<Exchange>,
    hub: BroadcastHub,
    port: u16,
    max_clients: usize,
    running: Arc<AtomicBool>,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|source| ServerError::Bind { port, source })?;
    info!(port, "server listening");

    let sessions = Arc::new(AtomicUsize::new(0));

    while running.load(Ordering::Relaxed) {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(error) => {
                warn!(%error, "accept failed");
                continue;
            }
        };

        if sessions.load(Ordering::Relaxed) >= max_clients {
            warn!(%peer, "client cap reached, rejecting connection");
            drop(stream);
            continue;
        }

        sessions.fetch_add(1, Ordering::Relaxed);
        info!(%peer, clients = sessions.load(Ordering::Relaxed), "client connected");

        let engine = engine.clone();
        let hub = hub.clone();
        let sessions = sessions.clone();
        tokio::spawn(async move {
            session::run_session(stream, peer, engine, hub).await;
            sessions.fetch_sub(1, Ordering::Relaxed);
            info!(%peer, "client disconnected");
        });
    }

    Ok(())
}
