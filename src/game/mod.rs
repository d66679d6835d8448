//! Game state tracking and derived timers

pub mod clock;
pub mod store;
pub mod telemetry;
pub mod timers;

pub use store::GameStore;

use serde::{Deserialize, Serialize};

/// Minimum Roshan respawn delay after a recorded kill, in seconds
pub const ROSHAN_RESPAWN_MIN: i64 = 480;

/// Maximum (guaranteed) Roshan respawn delay after a recorded kill, in seconds
pub const ROSHAN_RESPAWN_MAX: i64 = 660;

/// Cadence of the simulated clock driver, in seconds
pub const CLOCK_TICK_SECS: u64 = 1;

/// Server operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatingMode {
    /// Game clock advanced only by ingested telemetry
    Live,
    /// Game clock advanced once per real second by the clock driver
    Simulated,
}

impl OperatingMode {
    /// Resolve a requested mode token. Only the literal simulated token
    /// selects simulated mode; anything else falls back to live.
    pub fn from_request(token: Option<&str>) -> Self {
        match token {
            Some("SIMULATED") => Self::Simulated,
            _ => Self::Live,
        }
    }
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self::Live
    }
}
