//! WebSocket protocol message definitions
//! These are the wire types for the overlay and control-panel channels

use serde::{Deserialize, Serialize};

use crate::game::telemetry::{ClockSection, RoshanState};
use crate::game::OperatingMode;

/// Projection pushed to overlay viewers: clock and Roshan life cycle only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryProjection {
    pub map: ClockSection,
    pub roshan: RoshanState,
}

/// Projection pushed to control-panel viewers: the entire store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlProjection {
    pub map: ClockSection,
    pub roshan: RoshanState,
    pub mode: OperatingMode,
    pub sim_clock_offset: i64,
}

/// Both projections computed from a single store mutation
#[derive(Debug, Clone)]
pub struct Projections {
    pub telemetry: TelemetryProjection,
    pub control: ControlProjection,
}

/// Commands accepted on the control channel, shaped as `{"type", "payload"?}`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlCommand {
    /// Force a Roshan death at the current game clock
    KillRoshan,

    /// Switch operating mode; any payload other than "SIMULATED" selects live
    SetMode { payload: Option<String> },

    /// Anything else: logged and ignored
    #[serde(other)]
    Unknown,
}
