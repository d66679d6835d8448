//! Simulated clock driver
//!
//! A fixed-cadence background task spawned at startup and running for the
//! process lifetime. Ticks are no-ops in live mode; in simulated mode every
//! tick advances the store clock and broadcasts, change or not.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::info;

use crate::game::store::GameStore;
use crate::game::CLOCK_TICK_SECS;
use crate::ws::hub::BroadcastHub;

/// Drives the game clock while the server is in simulated mode
pub struct ClockDriver {
    store: Arc<GameStore>,
    hub: Arc<BroadcastHub>,
}

impl ClockDriver {
    pub fn new(store: Arc<GameStore>, hub: Arc<BroadcastHub>) -> Self {
        Self { store, hub }
    }

    /// Run the tick loop until the process shuts down.
    pub async fn run(self) {
        info!("Simulated clock driver started");

        let mut tick_interval = interval(Duration::from_secs(CLOCK_TICK_SECS));
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            if let Some(projections) = self.store.tick() {
                self.hub.broadcast(&projections);
            }
        }
    }
}
