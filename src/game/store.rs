//! Canonical store for the current game state
//!
//! All three writers (telemetry merges, control commands, clock ticks) pass
//! through one mutex, so no two mutations interleave mid-update and the
//! respawn-window invariant (`respawn_max - respawn_min == 180` whenever a
//! window is set) holds at every observable point. Each mutation returns the
//! projections computed under the lock; callers hand them to the broadcast
//! hub after the lock is released.

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::game::telemetry::{ClockSection, RoshanState};
use crate::game::{OperatingMode, ROSHAN_RESPAWN_MAX, ROSHAN_RESPAWN_MIN};
use crate::ws::protocol::{ControlCommand, ControlProjection, Projections, TelemetryProjection};

#[derive(Debug, Clone, Default)]
struct StoreInner {
    map: ClockSection,
    roshan: RoshanState,
    mode: OperatingMode,
    /// Reserved; reset to 0 when switching to live mode, never read
    sim_clock_offset: i64,
}

impl StoreInner {
    fn record_kill(&mut self, kill_time: i64) {
        self.roshan.alive = false;
        self.roshan.kill_time = kill_time;
        self.roshan.respawn_min = kill_time + ROSHAN_RESPAWN_MIN;
        self.roshan.respawn_max = kill_time + ROSHAN_RESPAWN_MAX;
    }

    fn telemetry_projection(&self) -> TelemetryProjection {
        TelemetryProjection {
            map: self.map.clone(),
            roshan: self.roshan.clone(),
        }
    }

    fn control_projection(&self) -> ControlProjection {
        ControlProjection {
            map: self.map.clone(),
            roshan: self.roshan.clone(),
            mode: self.mode,
            sim_clock_offset: self.sim_clock_offset,
        }
    }

    fn projections(&self) -> Projections {
        Projections {
            telemetry: self.telemetry_projection(),
            control: self.control_projection(),
        }
    }
}

/// The process-wide game state record
pub struct GameStore {
    inner: Mutex<StoreInner>,
}

impl GameStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
        }
    }

    /// Merge one validated telemetry push.
    ///
    /// The telemetry source is the clock authority in live mode: the clock
    /// section and the alive flag overwrite unconditionally. A true -> false
    /// edge records a kill, but only when the reported game time is past the
    /// stored kill time, so out-of-order and duplicate pushes leave the
    /// computed window untouched.
    pub fn merge_telemetry(&self, map: ClockSection, alive: bool) -> Projections {
        let mut inner = self.inner.lock();

        let was_alive = inner.roshan.alive;
        if was_alive && !alive && map.game_time > inner.roshan.kill_time {
            inner.record_kill(map.game_time);
            info!(
                kill_time = inner.roshan.kill_time,
                respawn_min = inner.roshan.respawn_min,
                respawn_max = inner.roshan.respawn_max,
                "Roshan death detected from telemetry"
            );
        }

        inner.map = map;
        inner.roshan.alive = alive;

        inner.projections()
    }

    /// Apply one control-panel command.
    pub fn apply_command(&self, command: ControlCommand) -> Projections {
        let mut inner = self.inner.lock();

        match command {
            ControlCommand::KillRoshan => {
                // Never clobber a computed window that is still pending.
                if inner.roshan.alive || inner.roshan.respawn_max == 0 {
                    let kill_time = inner.map.game_time;
                    inner.record_kill(kill_time);
                    info!(
                        kill_time,
                        respawn_min = inner.roshan.respawn_min,
                        respawn_max = inner.roshan.respawn_max,
                        "Roshan death forced from control panel"
                    );
                }
            }
            ControlCommand::SetMode { payload } => {
                let mode = OperatingMode::from_request(payload.as_deref());
                inner.mode = mode;
                if mode == OperatingMode::Live {
                    inner.sim_clock_offset = 0;
                }
                info!(?mode, "Operating mode changed");
            }
            ControlCommand::Unknown => {
                warn!("Ignoring unrecognized control command");
            }
        }

        inner.projections()
    }

    /// Advance the simulated clock by one tick.
    ///
    /// Returns `None` in live mode. In simulated mode the clock advances one
    /// second and the guaranteed-respawn rule runs: once the clock reaches
    /// `respawn_max`, Roshan is alive and the window fields reset to zero.
    pub fn tick(&self) -> Option<Projections> {
        let mut inner = self.inner.lock();
        if inner.mode != OperatingMode::Simulated {
            return None;
        }

        inner.map.game_time += 1;

        if inner.roshan.respawn_max > 0 && inner.map.game_time >= inner.roshan.respawn_max {
            inner.roshan.alive = true;
            inner.roshan.kill_time = 0;
            inner.roshan.respawn_min = 0;
            inner.roshan.respawn_max = 0;
            info!(game_time = inner.map.game_time, "Guaranteed Roshan respawn");
        }

        Some(inner.projections())
    }

    /// Current overlay-facing projection.
    pub fn telemetry_projection(&self) -> TelemetryProjection {
        self.inner.lock().telemetry_projection()
    }

    /// Current control-panel projection.
    pub fn control_projection(&self) -> ControlProjection {
        self.inner.lock().control_projection()
    }

    /// Clock and Roshan record, for derived timer calculation.
    pub fn clock_and_roshan(&self) -> (i64, RoshanState) {
        let inner = self.inner.lock();
        (inner.map.game_time, inner.roshan.clone())
    }

    /// Current operating mode.
    pub fn mode(&self) -> OperatingMode {
        self.inner.lock().mode
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(game_time: i64) -> ClockSection {
        ClockSection {
            game_time,
            ..ClockSection::default()
        }
    }

    fn set_mode(store: &GameStore, token: &str) {
        store.apply_command(ControlCommand::SetMode {
            payload: Some(token.to_string()),
        });
    }

    #[test]
    fn death_transition_computes_window() {
        let store = GameStore::new();
        store.merge_telemetry(clock(500), false);

        let (game_time, roshan) = store.clock_and_roshan();
        assert_eq!(game_time, 500);
        assert!(!roshan.alive);
        assert_eq!(roshan.kill_time, 500);
        assert_eq!(roshan.respawn_min, 980);
        assert_eq!(roshan.respawn_max, 1160);
        assert_eq!(roshan.respawn_max - roshan.respawn_min, 180);
    }

    #[test]
    fn replaying_a_push_keeps_the_window() {
        let store = GameStore::new();
        store.merge_telemetry(clock(500), false);
        store.merge_telemetry(clock(500), false);

        let (_, roshan) = store.clock_and_roshan();
        assert_eq!(roshan.kill_time, 500);
        assert_eq!(roshan.respawn_min, 980);
        assert_eq!(roshan.respawn_max, 1160);
    }

    #[test]
    fn stale_death_report_does_not_regress_the_window() {
        let store = GameStore::new();
        store.merge_telemetry(clock(1000), false);
        // The source briefly reports Roshan alive, then a stale death at an
        // earlier clock arrives out of order.
        store.merge_telemetry(clock(1005), true);
        store.merge_telemetry(clock(900), false);

        let (game_time, roshan) = store.clock_and_roshan();
        assert_eq!(game_time, 900);
        assert!(!roshan.alive);
        assert_eq!(roshan.kill_time, 1000);
        assert_eq!(roshan.respawn_min, 1480);
        assert_eq!(roshan.respawn_max, 1660);
    }

    #[test]
    fn alive_report_preserves_an_active_window() {
        let store = GameStore::new();
        store.merge_telemetry(clock(500), false);
        store.merge_telemetry(clock(1200), true);

        let (_, roshan) = store.clock_and_roshan();
        assert!(roshan.alive);
        assert_eq!(roshan.kill_time, 500);
        assert_eq!(roshan.respawn_min, 980);
        assert_eq!(roshan.respawn_max, 1160);
    }

    #[test]
    fn clock_overwrites_even_without_a_transition() {
        let store = GameStore::new();
        store.merge_telemetry(clock(100), true);
        store.merge_telemetry(clock(37), true);

        let (game_time, roshan) = store.clock_and_roshan();
        assert_eq!(game_time, 37);
        assert!(roshan.alive);
        assert_eq!(roshan.respawn_max, 0);
    }

    #[test]
    fn forced_kill_uses_the_current_clock() {
        let store = GameStore::new();
        store.merge_telemetry(clock(300), true);
        store.apply_command(ControlCommand::KillRoshan);

        let (_, roshan) = store.clock_and_roshan();
        assert!(!roshan.alive);
        assert_eq!(roshan.kill_time, 300);
        assert_eq!(roshan.respawn_min, 780);
        assert_eq!(roshan.respawn_max, 960);
    }

    #[test]
    fn forced_kill_never_clobbers_a_pending_window() {
        let store = GameStore::new();
        store.merge_telemetry(clock(500), false);
        store.merge_telemetry(clock(600), false);
        store.apply_command(ControlCommand::KillRoshan);

        let (_, roshan) = store.clock_and_roshan();
        assert_eq!(roshan.kill_time, 500);
        assert_eq!(roshan.respawn_min, 980);
        assert_eq!(roshan.respawn_max, 1160);
    }

    #[test]
    fn mode_token_must_match_literally() {
        let store = GameStore::new();

        set_mode(&store, "SIMULATED");
        assert_eq!(store.mode(), OperatingMode::Simulated);

        set_mode(&store, "simulated");
        assert_eq!(store.mode(), OperatingMode::Live);

        set_mode(&store, "SIMULATED");
        store.apply_command(ControlCommand::SetMode { payload: None });
        assert_eq!(store.mode(), OperatingMode::Live);
    }

    #[test]
    fn switching_to_live_resets_the_reserved_offset() {
        let store = GameStore::new();
        store.inner.lock().sim_clock_offset = 7;

        set_mode(&store, "LIVE");
        assert_eq!(store.control_projection().sim_clock_offset, 0);
    }

    #[test]
    fn unknown_command_mutates_nothing() {
        let store = GameStore::new();
        store.merge_telemetry(clock(500), false);
        let before = store.control_projection();

        store.apply_command(ControlCommand::Unknown);

        let after = store.control_projection();
        assert_eq!(after.map, before.map);
        assert_eq!(after.roshan, before.roshan);
        assert_eq!(after.mode, before.mode);
    }

    #[test]
    fn ticks_are_noops_in_live_mode() {
        let store = GameStore::new();
        assert!(store.tick().is_none());

        let (game_time, _) = store.clock_and_roshan();
        assert_eq!(game_time, 0);
    }

    #[test]
    fn simulated_ticks_advance_the_clock() {
        let store = GameStore::new();
        set_mode(&store, "SIMULATED");

        for _ in 0..5 {
            assert!(store.tick().is_some());
        }

        let (game_time, roshan) = store.clock_and_roshan();
        assert_eq!(game_time, 5);
        assert!(roshan.alive);
        assert_eq!(roshan.respawn_max, 0);
    }

    #[test]
    fn guaranteed_respawn_fires_exactly_at_respawn_max() {
        let store = GameStore::new();
        store.inner.lock().map = clock(50);
        store.inner.lock().roshan = RoshanState {
            alive: false,
            kill_time: 10,
            respawn_min: 80,
            respawn_max: 100,
        };
        set_mode(&store, "SIMULATED");

        for _ in 0..49 {
            store.tick();
        }
        let (game_time, roshan) = store.clock_and_roshan();
        assert_eq!(game_time, 99);
        assert!(!roshan.alive);

        store.tick();
        let (game_time, roshan) = store.clock_and_roshan();
        assert_eq!(game_time, 100);
        assert!(roshan.alive);
        assert_eq!(roshan.kill_time, 0);
        assert_eq!(roshan.respawn_min, 0);
        assert_eq!(roshan.respawn_max, 0);
    }

    #[test]
    fn kill_then_simulate_until_guaranteed_respawn() {
        let store = GameStore::new();
        store.merge_telemetry(clock(500), false);
        set_mode(&store, "SIMULATED");

        for _ in 0..660 {
            store.tick();
        }

        let (game_time, roshan) = store.clock_and_roshan();
        assert_eq!(game_time, 1160);
        assert!(roshan.alive);
        assert_eq!(roshan.respawn_max, 0);
    }
}
