//! Subscriber registries and broadcast fan-out
//!
//! Two independent registries of open transport handles, one per subscriber
//! class. Delivery is enqueue-only: mutating callers never wait on a socket.
//! An entry whose transport has closed is skipped during fan-out and removed
//! only by the explicit close path, never from a failed send.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ws::protocol::Projections;

/// Subscriber channel class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Passive overlay viewers, fed the telemetry projection
    Telemetry,
    /// Interactive control panels, fed the full-store projection
    Control,
}

impl Channel {
    fn label(self) -> &'static str {
        match self {
            Self::Telemetry => "telemetry",
            Self::Control => "control",
        }
    }
}

type Registry = DashMap<Uuid, mpsc::UnboundedSender<String>>;

/// Fan-out hub holding both subscriber registries
pub struct BroadcastHub {
    telemetry: Registry,
    control: Registry,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self {
            telemetry: DashMap::new(),
            control: DashMap::new(),
        }
    }

    fn registry(&self, channel: Channel) -> &Registry {
        match channel {
            Channel::Telemetry => &self.telemetry,
            Channel::Control => &self.control,
        }
    }

    /// Register a new subscriber. The snapshot is enqueued before the entry
    /// becomes visible to broadcasts, so it is always the first message the
    /// subscriber receives.
    pub fn subscribe(
        &self,
        channel: Channel,
        snapshot: String,
    ) -> (Uuid, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(snapshot);

        let id = Uuid::new_v4();
        self.registry(channel).insert(id, tx);
        debug!(
            subscriber_id = %id,
            channel = channel.label(),
            total = self.count(channel),
            "Subscriber registered"
        );

        (id, rx)
    }

    /// Remove a subscriber. Called only from the connection's close path.
    pub fn unsubscribe(&self, channel: Channel, id: Uuid) {
        self.registry(channel).remove(&id);
        debug!(
            subscriber_id = %id,
            channel = channel.label(),
            total = self.count(channel),
            "Subscriber removed"
        );
    }

    /// Number of registered subscribers on a channel.
    pub fn count(&self, channel: Channel) -> usize {
        self.registry(channel).len()
    }

    /// Publish both projections, each to its own registry.
    pub fn broadcast(&self, projections: &Projections) {
        match serde_json::to_string(&projections.telemetry) {
            Ok(json) => self.send_all(Channel::Telemetry, &json),
            Err(e) => warn!(error = %e, "Failed to serialize telemetry projection"),
        }

        match serde_json::to_string(&projections.control) {
            Ok(json) => self.send_all(Channel::Control, &json),
            Err(e) => warn!(error = %e, "Failed to serialize control projection"),
        }
    }

    fn send_all(&self, channel: Channel, json: &str) {
        for entry in self.registry(channel).iter() {
            let tx = entry.value();
            if tx.is_closed() {
                continue;
            }
            let _ = tx.send(json.to_string());
        }
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
