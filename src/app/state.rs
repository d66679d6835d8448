//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::GameStore;
use crate::ws::hub::BroadcastHub;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<GameStore>,
    pub hub: Arc<BroadcastHub>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(GameStore::new()),
            hub: Arc::new(BroadcastHub::new()),
        }
    }
}
