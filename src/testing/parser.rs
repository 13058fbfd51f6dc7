//! Scenario files: setup, a frame-indexed input script and expectations

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct TestDefinition {
    pub name: String,
    pub description: Option<String>,
    pub setup: TestSetup,
    #[serde(default)]
    pub input: Vec<FrameInput>,
    pub expect: TestExpectations,
}

/// Starting conditions applied before frame 0 ends
#[derive(Debug, Clone, Deserialize)]
pub struct TestSetup {
    /// Level name from the test level file
    pub level: String,
    /// Player start in world coordinates (defaults to the level spawn)
    pub player: Option<PlayerStart>,
    /// Power-up active from the first frame
    pub power: Option<String>,
    #[serde(default)]
    pub rumble: u32,
    pub lives: Option<u32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlayerStart {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameInput {
    pub frame: u64,
    #[serde(flatten)]
    pub input: InputSnapshot,
}

/// Input changes at one frame. Unset fields keep their previous state;
/// `jump`, `blast` and `rumble` are presses and last a single frame.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub move_x: Option<f32>,
    pub move_left: Option<bool>,
    pub move_right: Option<bool>,
    pub jump: Option<bool>,
    pub jump_held: Option<bool>,
    pub blast: Option<bool>,
    pub rumble: Option<bool>,
}

impl InputSnapshot {
    /// Horizontal axis this snapshot sets, if any. An explicit `move_x`
    /// wins over the two direction flags.
    pub fn effective_move_x(&self) -> Option<f32> {
        let axis = |held: Option<bool>, sign: f32| if held == Some(true) { sign } else { 0.0 };
        match (self.move_x, self.move_left, self.move_right) {
            (Some(x), _, _) => Some(x.clamp(-1.0, 1.0)),
            (None, None, None) => None,
            (None, left, right) => Some(axis(left, -1.0) + axis(right, 1.0)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TestExpectations {
    /// Events that must appear in this order; others may come in between
    #[serde(default)]
    pub sequence: Vec<ExpectedEvent>,
    /// `[[expect.state]]` snapshots, each checked once its frame has run
    #[serde(default)]
    pub state: Vec<StateAssertion>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectedEvent {
    /// Event name, e.g. "EnemyDefeated"
    pub event: String,
    /// Food, enemy or power-up kind, e.g. "walker"
    pub kind: Option<String>,
    /// Defeat or death cause, e.g. "stomp"
    pub cause: Option<String>,
    pub frame_min: Option<u64>,
    pub frame_max: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateAssertion {
    pub after_frame: u64,
    #[serde(default)]
    pub checks: Vec<String>,
}

pub fn parse_test_file(path: &Path) -> Result<TestDefinition, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let def: TestDefinition = toml::from_str(&content).map_err(|e| format!("{}: {}", path.display(), e))?;
    if def.expect.sequence.is_empty() && def.expect.state.is_empty() {
        return Err(format!("{}: expects nothing", path.display()));
    }
    Ok(def)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let toml = r#"
name = "Stomp"
[setup]
level = "flat_walker"
power = "cap"

[setup.player]
x = 100.0
y = 60.0

[[input]]
frame = 0
move_right = true

[[input]]
frame = 10
jump = true

[expect]
sequence = [
    { event = "Jump" },
    { event = "EnemyDefeated", kind = "walker", cause = "stomp", frame_max = 90 },
]

[[expect.state]]
after_frame = 120
checks = ["score >= 100", "lives = 3"]
"#;
        let def: TestDefinition = toml::from_str(toml).unwrap();
        assert_eq!(def.name, "Stomp");
        assert_eq!(def.setup.level, "flat_walker");
        assert_eq!(def.setup.power.as_deref(), Some("cap"));
        assert_eq!(def.setup.rumble, 0);
        assert_eq!(def.setup.player.map(|p| p.x), Some(100.0));
        assert_eq!(def.input.len(), 2);
        assert_eq!(def.input[0].input.effective_move_x(), Some(1.0));
        assert_eq!(def.input[1].input.effective_move_x(), None);
        assert_eq!(def.input[1].input.jump, Some(true));
        assert_eq!(def.expect.sequence[1].cause.as_deref(), Some("stomp"));
        assert_eq!(def.expect.state[0].checks.len(), 2);
    }

    #[test]
    fn test_move_left_and_right_cancel() {
        let snapshot = InputSnapshot { move_left: Some(true), move_right: Some(true), ..InputSnapshot::default() };
        assert_eq!(snapshot.effective_move_x(), Some(0.0));
        let snapshot = InputSnapshot { move_left: Some(false), ..InputSnapshot::default() };
        assert_eq!(snapshot.effective_move_x(), Some(0.0));
        let snapshot = InputSnapshot { move_x: Some(-0.5), move_right: Some(true), ..InputSnapshot::default() };
        assert_eq!(snapshot.effective_move_x(), Some(-0.5));
    }
}
