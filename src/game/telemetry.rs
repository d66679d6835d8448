//! Telemetry payload types pushed by the game client
//! The GSI config points the game at POST /game_state with these sections

use serde::{Deserialize, Serialize};

/// Game clock section of a telemetry push (the GSI `map` block)
///
/// Only `game_time` is interpreted by the server; every other field is
/// carried through to subscribers untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSection {
    /// Game time in seconds; negative during the pre-game countdown
    pub game_time: i64,
    /// Day/night clock as shown in the HUD
    #[serde(default)]
    pub clock_time: i64,
    /// "day" or "night"
    #[serde(default = "default_daystate")]
    pub daystate: String,
    /// Unrecognized fields, passed through opaquely
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_daystate() -> String {
    "day".to_string()
}

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            game_time: 0,
            clock_time: 0,
            daystate: default_daystate(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Roshan section of a telemetry push
///
/// The payload only ever supplies the raw alive flag; kill time and the
/// respawn window are computed by the store, never trusted from the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RoshanSection {
    pub alive: bool,
}

/// Stored Roshan life-cycle record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoshanState {
    /// Last alive flag reported by telemetry (or forced by a command)
    pub alive: bool,
    /// Game time of the most recently recorded kill; only ever increases
    pub kill_time: i64,
    /// Earliest possible respawn time, 0 when no window is known
    pub respawn_min: i64,
    /// Guaranteed respawn time, 0 when no window is known
    pub respawn_max: i64,
}

impl Default for RoshanState {
    fn default() -> Self {
        Self {
            alive: true,
            kill_time: 0,
            respawn_min: 0,
            respawn_max: 0,
        }
    }
}

/// A full telemetry push. Sections the server does not track are dropped at
/// parse time; pushes missing `map` or `roshan` are accepted but not merged.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryPayload {
    pub map: Option<ClockSection>,
    pub roshan: Option<RoshanSection>,
}
