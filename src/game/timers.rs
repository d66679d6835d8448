//! Derived objective timers
//!
//! Pure mapping from (game clock, Roshan record) to cyclic spawn timers, the
//! Roshan window state, the game phase, and the active tactical hint. The
//! overlay recomputes this same mapping client-side from the projections it
//! receives, so nothing here keeps state: identical inputs must yield
//! identical results wherever the calculation runs.

use serde::Serialize;

use crate::game::telemetry::RoshanState;

/// A cyclic map objective: first spawn at `first_spawn`, then every `period`
#[derive(Debug, Clone, Copy)]
pub struct CyclicObjective {
    pub name: &'static str,
    pub period: i64,
    pub first_spawn: i64,
    /// Seconds before a spawn at which the timer turns imminent
    pub urgency_threshold: i64,
}

/// The cyclic objectives tracked by the overlay
pub const CYCLIC_OBJECTIVES: [CyclicObjective; 5] = [
    CyclicObjective {
        name: "Power Rune",
        period: 120,
        first_spawn: 0,
        urgency_threshold: 30,
    },
    CyclicObjective {
        name: "Bounty Rune",
        period: 180,
        first_spawn: 180,
        urgency_threshold: 30,
    },
    CyclicObjective {
        name: "Lotus Rune",
        period: 180,
        first_spawn: 180,
        urgency_threshold: 30,
    },
    CyclicObjective {
        name: "Wisdom Rune",
        period: 420,
        first_spawn: 420,
        urgency_threshold: 60,
    },
    CyclicObjective {
        name: "Outpost",
        period: 300,
        first_spawn: 600,
        urgency_threshold: 45,
    },
];

/// Seconds before `respawn_min` at which the Roshan timer turns imminent
const ROSHAN_IMMINENT_LEAD: i64 = 120;

/// State of one cyclic timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CyclicTimerState {
    Waiting,
    Imminent,
}

/// Classification of the Roshan respawn window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoshanWindowState {
    /// Telemetry reports Roshan alive; no window is known
    AliveUnknown,
    /// Dead but no computed window (uninitialized or contradictory data)
    OutOfData,
    /// Dead, earliest respawn more than two minutes out
    DeadWaiting,
    /// Dead, earliest respawn within two minutes
    DeadImminent,
    /// Past `respawn_min`; Roshan may be up at any moment
    WindowActive,
}

/// Coarse game phase used for generic guidance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    EarlyGame,
    MidGame,
    LateGame,
}

impl GamePhase {
    pub fn classify(game_time: i64) -> Self {
        if game_time < 600 {
            Self::EarlyGame
        } else if game_time < 1500 {
            Self::MidGame
        } else {
            Self::LateGame
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::EarlyGame => "Early Game (Laning)",
            Self::MidGame => "Mid Game (Initiation)",
            Self::LateGame => "Late Game (Endgame)",
        }
    }

    pub fn guidance(self) -> &'static str {
        match self {
            Self::EarlyGame => {
                "Focus on last hits, denies and lane control. Contest bounty and lotus runes."
            }
            Self::MidGame => "Ganks, pushes and objective fights. Prioritize teamfights.",
            Self::LateGame => {
                "Buybacks, high-damage combos and the final push. One fight can decide the game."
            }
        }
    }
}

/// One computed cyclic timer
#[derive(Debug, Clone, Serialize)]
pub struct CyclicTimer {
    pub name: &'static str,
    pub next_spawn: i64,
    pub time_left: i64,
    pub state: CyclicTimerState,
}

/// The computed Roshan window view
#[derive(Debug, Clone, Serialize)]
pub struct RoshanWindow {
    pub state: RoshanWindowState,
    /// Seconds until `respawn_min`; 0 when no window is known
    pub min_time_left: i64,
    /// Seconds until `respawn_max`; 0 when no window is known
    pub max_time_left: i64,
}

/// The active hint shown by the overlay
#[derive(Debug, Clone, Serialize)]
pub struct TacticalHint {
    pub title: String,
    pub message: String,
}

/// Full derived timer view for one clock instant
#[derive(Debug, Clone, Serialize)]
pub struct DerivedTimers {
    pub game_time: i64,
    pub phase: GamePhase,
    pub timers: Vec<CyclicTimer>,
    pub roshan: RoshanWindow,
    pub hint: TacticalHint,
}

/// Compute the timer for one cyclic objective at the given clock.
///
/// A clock exactly on a spawn instant rolls over to the next period, so
/// `time_left` is always positive once the clock is non-negative.
pub fn cyclic_timer(objective: &CyclicObjective, game_time: i64) -> CyclicTimer {
    let next_spawn = if game_time < objective.first_spawn {
        objective.first_spawn
    } else {
        let completed = (game_time - objective.first_spawn) / objective.period;
        objective.first_spawn + (completed + 1) * objective.period
    };
    let time_left = next_spawn - game_time;

    let state = if time_left > 0 && time_left <= objective.urgency_threshold {
        CyclicTimerState::Imminent
    } else {
        CyclicTimerState::Waiting
    };

    CyclicTimer {
        name: objective.name,
        next_spawn,
        time_left,
        state,
    }
}

/// Classify the Roshan respawn window at the given clock.
pub fn roshan_window(roshan: &RoshanState, game_time: i64) -> RoshanWindow {
    if roshan.alive {
        return RoshanWindow {
            state: RoshanWindowState::AliveUnknown,
            min_time_left: 0,
            max_time_left: 0,
        };
    }

    if roshan.respawn_max == 0 {
        return RoshanWindow {
            state: RoshanWindowState::OutOfData,
            min_time_left: 0,
            max_time_left: 0,
        };
    }

    let min_time_left = roshan.respawn_min - game_time;
    let max_time_left = roshan.respawn_max - game_time;

    let state = if min_time_left <= 0 {
        RoshanWindowState::WindowActive
    } else if min_time_left <= ROSHAN_IMMINENT_LEAD {
        RoshanWindowState::DeadImminent
    } else {
        RoshanWindowState::DeadWaiting
    };

    RoshanWindow {
        state,
        min_time_left,
        max_time_left,
    }
}

/// Derive the full timer view. Recomputed from scratch on every call; the
/// result depends on nothing but the two inputs.
pub fn derive(game_time: i64, roshan: &RoshanState) -> DerivedTimers {
    let timers: Vec<CyclicTimer> = CYCLIC_OBJECTIVES
        .iter()
        .map(|objective| cyclic_timer(objective, game_time))
        .collect();
    let window = roshan_window(roshan, game_time);
    let phase = GamePhase::classify(game_time);
    let hint = pick_hint(&timers, &window, phase);

    DerivedTimers {
        game_time,
        phase,
        timers,
        roshan: window,
        hint,
    }
}

/// Hint priority, first match wins: an imminent cyclic objective (unless the
/// Roshan window is already active), the Roshan minimum alert, the active
/// window, then the phase guidance.
fn pick_hint(timers: &[CyclicTimer], window: &RoshanWindow, phase: GamePhase) -> TacticalHint {
    if window.state != RoshanWindowState::WindowActive {
        if let Some(timer) = timers
            .iter()
            .find(|t| t.state == CyclicTimerState::Imminent)
        {
            return TacticalHint {
                title: "TACTICAL OBJECTIVE PRIORITY".to_string(),
                message: format!(
                    "{} spawns in {}. Move out to contest or secure it.",
                    timer.name,
                    format_clock(timer.time_left)
                ),
            };
        }
    }

    match window.state {
        RoshanWindowState::DeadImminent => TacticalHint {
            title: "ROSHAN MINIMUM ALERT".to_string(),
            message: format!(
                "Roshan spawns at the earliest in {}. Prepare wards and check buybacks.",
                format_clock(window.min_time_left)
            ),
        },
        RoshanWindowState::WindowActive => TacticalHint {
            title: "ROSHAN WINDOW ACTIVE".to_string(),
            message: "Roshan may be up. Secure vision and control before committing.".to_string(),
        },
        _ => TacticalHint {
            title: format!("PHASE: {}", phase.name()),
            message: phase.guidance().to_string(),
        },
    }
}

/// Format a second count as MM:SS, keeping the sign for pre-game clocks.
pub fn format_clock(total_seconds: i64) -> String {
    let sign = if total_seconds < 0 { "-" } else { "" };
    let abs = total_seconds.abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dead(kill_time: i64) -> RoshanState {
        RoshanState {
            alive: false,
            kill_time,
            respawn_min: kill_time + crate::game::ROSHAN_RESPAWN_MIN,
            respawn_max: kill_time + crate::game::ROSHAN_RESPAWN_MAX,
        }
    }

    #[test]
    fn cyclic_timer_mid_period() {
        let power_rune = &CYCLIC_OBJECTIVES[0];
        let timer = cyclic_timer(power_rune, 125);
        assert_eq!(timer.next_spawn, 240);
        assert_eq!(timer.time_left, 115);
        assert_eq!(timer.state, CyclicTimerState::Waiting);
    }

    #[test]
    fn cyclic_timer_turns_imminent_inside_threshold() {
        let bounty_rune = &CYCLIC_OBJECTIVES[1];
        let timer = cyclic_timer(bounty_rune, 170);
        assert_eq!(timer.next_spawn, 180);
        assert_eq!(timer.time_left, 10);
        assert_eq!(timer.state, CyclicTimerState::Imminent);
    }

    #[test]
    fn cyclic_timer_before_first_spawn() {
        let outpost = &CYCLIC_OBJECTIVES[4];
        let timer = cyclic_timer(outpost, 90);
        assert_eq!(timer.next_spawn, 600);
        assert_eq!(timer.time_left, 510);
    }

    #[test]
    fn cyclic_timer_handles_negative_pregame_clock() {
        let bounty_rune = &CYCLIC_OBJECTIVES[1];
        let timer = cyclic_timer(bounty_rune, -60);
        assert_eq!(timer.next_spawn, 180);
        assert_eq!(timer.time_left, 240);
        assert_eq!(timer.state, CyclicTimerState::Waiting);
    }

    #[test]
    fn cyclic_timer_rolls_over_exactly_on_spawn() {
        let power_rune = &CYCLIC_OBJECTIVES[0];
        let timer = cyclic_timer(power_rune, 240);
        assert_eq!(timer.next_spawn, 360);
        assert_eq!(timer.time_left, 120);
    }

    #[test]
    fn roshan_alive_has_no_window() {
        let window = roshan_window(&RoshanState::default(), 700);
        assert_eq!(window.state, RoshanWindowState::AliveUnknown);
        assert_eq!(window.min_time_left, 0);
        assert_eq!(window.max_time_left, 0);
    }

    #[test]
    fn roshan_dead_without_window_is_out_of_data() {
        let roshan = RoshanState {
            alive: false,
            ..RoshanState::default()
        };
        let window = roshan_window(&roshan, 700);
        assert_eq!(window.state, RoshanWindowState::OutOfData);
    }

    #[test]
    fn roshan_window_states_progress_with_the_clock() {
        let roshan = dead(500);

        // respawn_min = 980, respawn_max = 1160
        let waiting = roshan_window(&roshan, 600);
        assert_eq!(waiting.state, RoshanWindowState::DeadWaiting);
        assert_eq!(waiting.min_time_left, 380);

        let boundary = roshan_window(&roshan, 859);
        assert_eq!(boundary.state, RoshanWindowState::DeadWaiting);

        let imminent = roshan_window(&roshan, 860);
        assert_eq!(imminent.state, RoshanWindowState::DeadImminent);
        assert_eq!(imminent.min_time_left, 120);

        let active = roshan_window(&roshan, 980);
        assert_eq!(active.state, RoshanWindowState::WindowActive);
        assert_eq!(active.min_time_left, 0);
        assert_eq!(active.max_time_left, 180);
    }

    #[test]
    fn phase_boundaries() {
        assert_eq!(GamePhase::classify(-90), GamePhase::EarlyGame);
        assert_eq!(GamePhase::classify(599), GamePhase::EarlyGame);
        assert_eq!(GamePhase::classify(600), GamePhase::MidGame);
        assert_eq!(GamePhase::classify(1499), GamePhase::MidGame);
        assert_eq!(GamePhase::classify(1500), GamePhase::LateGame);
    }

    #[test]
    fn hint_prefers_imminent_cyclic_objective() {
        // Bounty/lotus spawn at 180; at 170 both are imminent while Roshan
        // is dead with a distant window.
        let derived = derive(170, &dead(100));
        assert_eq!(derived.hint.title, "TACTICAL OBJECTIVE PRIORITY");
        assert!(derived.hint.message.contains("Bounty Rune"));
    }

    #[test]
    fn hint_ignores_cyclic_objectives_while_window_is_active() {
        // Window from a kill at 100 is active from 580 on; 590 also has the
        // power rune imminent (next spawn 600).
        let derived = derive(590, &dead(100));
        assert_eq!(derived.roshan.state, RoshanWindowState::WindowActive);
        assert_eq!(derived.hint.title, "ROSHAN WINDOW ACTIVE");
    }

    #[test]
    fn hint_announces_the_minimum_alert() {
        // Kill at 500: min at 980. At 900 nothing cyclic is imminent.
        let derived = derive(900, &dead(500));
        assert_eq!(derived.roshan.state, RoshanWindowState::DeadImminent);
        assert_eq!(derived.hint.title, "ROSHAN MINIMUM ALERT");
        assert!(derived.hint.message.contains("01:20"));
    }

    #[test]
    fn hint_falls_back_to_phase_guidance() {
        // At 660 every cyclic timer is outside its urgency threshold.
        let derived = derive(660, &RoshanState::default());
        assert_eq!(derived.phase, GamePhase::MidGame);
        assert_eq!(derived.hint.title, "PHASE: Mid Game (Initiation)");
        assert_eq!(derived.hint.message, GamePhase::MidGame.guidance());
    }

    #[test]
    fn derivation_is_stateless() {
        let roshan = dead(500);
        let first = derive(860, &roshan);
        let second = derive(860, &roshan);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(660), "11:00");
        assert_eq!(format_clock(-5), "-00:05");
    }
}
