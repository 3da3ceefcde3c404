//! Market-data fan-out.

use crossbeam_channel::Receiver;
use std::thread;
use tokio::sync::broadcast;
use tracing::{debug, info};
use types::MarketDataUpdate;

use crate::protocol;

/// Fan-out point for market data.
///
/// Each update is serialized once and the frame is cloned to every
/// subscribed session. Sessions that fall behind lag the channel and lose
/// frames; market data is most-recent-wins, so that is the intended
/// behavior rather than a fault.
#[derive(Clone)]
pub struct BroadcastHub {
    frames: broadcast::Sender<String>,
}

impl BroadcastHub {
    /// Create a hub buffering up to `capacity` frames per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (frames, _) = broadcast::channel(capacity);
        Self { frames }
    }

    /// Subscribe; the receiver sees frames published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.frames.subscribe()
    }

    /// Serialize an update and hand it to every subscriber.
    pub fn publish_market_data(&self, update: &MarketDataUpdate) {
        let frame = protocol::encode_market_data(update);
        // No subscribers is not an error; the frame just evaporates.
        let _ = self.frames.send(frame);
    }

    /// Number of sessions currently subscribed.
    pub fn subscriber_count(&self) -> usize {
        self.frames.receiver_count()
    }
}

/// Forward updates from the simulation thread into the hub.
///
/// Runs on its own thread and exits when the sending side disconnects.
pub fn spawn_bridge(updates: Receiver<MarketDataUpdate>, hub: BroadcastHub) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("md-bridge".to_string())
        .spawn(move || {
            for update in updates {
                debug!(ticker = %update.ticker, "forwarding market data");
                hub.publish_market_data(&update);
            }
            info!("market-data bridge stopped");
        })
        .expect("failed to spawn market-data bridge")
}
