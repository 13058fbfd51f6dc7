//! Assertion checking for test expectations

use super::parser::{ExpectedEvent, StateAssertion};
use crate::events::GameEvent;

/// Error when an assertion fails
#[derive(Debug, Clone)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

/// Captured event with timing info
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub frame: u64,
    pub event_type: String,
    pub kind: Option<String>,
    pub cause: Option<String>,
}

impl CapturedEvent {
    pub fn from_game_event(frame: u64, event: &GameEvent) -> Self {
        let (kind, cause) = match event {
            GameEvent::FoodCollected { kind, .. } => (Some(kind.name()), None),
            GameEvent::PowerUpCollected { kind } | GameEvent::PowerUpExpired { kind } => (Some(kind.name()), None),
            GameEvent::EnemyDefeated { kind, cause, .. } => (Some(kind.name()), Some(cause.name())),
            GameEvent::PlayerDied { cause, .. } => (None, Some(cause.name())),
            _ => (None, None),
        };
        Self {
            frame,
            event_type: event.name().to_string(),
            kind: kind.map(str::to_string),
            cause: cause.map(str::to_string),
        }
    }

    fn matches(&self, expected: &ExpectedEvent) -> bool {
        self.event_type == expected.event
            && expected.kind.as_ref().is_none_or(|k| self.kind.as_ref() == Some(k))
            && expected.cause.as_ref().is_none_or(|c| self.cause.as_ref() == Some(c))
    }
}

/// Check if captured events match expected sequence
pub fn check_sequence(expected: &[ExpectedEvent], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    let mut captured_idx = 0;

    for (i, exp) in expected.iter().enumerate() {
        // Find matching event starting from current position
        let found = captured[captured_idx..].iter().enumerate().find(|(_, cap)| cap.matches(exp));

        match found {
            Some((offset, cap)) => {
                // Check frame bounds if specified
                if let Some(min) = exp.frame_min
                    && cap.frame < min
                {
                    return Err(AssertionError {
                        message: format!("Event #{} '{}' occurred too early", i + 1, exp.event),
                        expected: format!("frame >= {}", min),
                        actual: format!("frame {}", cap.frame),
                    });
                }
                if let Some(max) = exp.frame_max
                    && cap.frame > max
                {
                    return Err(AssertionError {
                        message: format!("Event #{} '{}' occurred too late", i + 1, exp.event),
                        expected: format!("frame <= {}", max),
                        actual: format!("frame {}", cap.frame),
                    });
                }
                captured_idx += offset + 1;
            }
            None => {
                let detail: String = [("kind", &exp.kind), ("cause", &exp.cause)]
                    .iter()
                    .filter_map(|(label, value)| value.as_ref().map(|v| format!(" ({}: {})", label, v)))
                    .collect();
                return Err(AssertionError {
                    message: format!("Event #{} '{}'{} not found", i + 1, exp.event, detail),
                    expected: format!("'{}' event in sequence", exp.event),
                    actual: format!(
                        "events after position {}: {:?}",
                        captured_idx,
                        captured[captured_idx..].iter().map(|e| &e.event_type).collect::<Vec<_>>()
                    ),
                });
            }
        }
    }

    Ok(())
}

/// World state for assertions
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    pub player: Option<PlayerState>,
    pub score: u32,
    pub lives: u32,
    pub rumble: u32,
    pub power: Option<String>,
    pub phase: String,
    pub enemies: usize,
    pub food: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub grounded: bool,
}

/// Parse a check string into (path, operator, value)
fn parse_check(check: &str) -> Option<(&str, &str, &str)> {
    // Try operators in order of specificity (>= before >, etc.)
    for op in &[">=", "<=", "!=", "=", ">", "<"] {
        if let Some(idx) = check.find(op) {
            let path = check[..idx].trim();
            let value = check[idx + op.len()..].trim();
            return Some((path, op, value));
        }
    }
    None
}

/// Check state assertions against world state
pub fn check_state(assertion: &StateAssertion, state: &WorldState) -> Result<(), AssertionError> {
    for check in &assertion.checks {
        let (path, operator, expected_value) = parse_check(check).ok_or_else(|| AssertionError {
            message: format!("Invalid check syntax: {}", check),
            expected: "format: 'path = value' or 'path > value'".to_string(),
            actual: check.clone(),
        })?;

        let path_parts: Vec<&str> = path.split('.').collect();

        match path_parts.as_slice() {
            ["score"] => check_float_comparison(path, state.score as f32, operator, expected_value)?,
            ["lives"] => check_float_comparison(path, state.lives as f32, operator, expected_value)?,
            ["rumble"] => check_float_comparison(path, state.rumble as f32, operator, expected_value)?,
            ["enemies"] => check_float_comparison(path, state.enemies as f32, operator, expected_value)?,
            ["food"] => check_float_comparison(path, state.food as f32, operator, expected_value)?,
            ["power"] => check_text(check, state.power.as_deref().unwrap_or("none"), operator, expected_value)?,
            ["phase"] => check_text(check, &state.phase, operator, expected_value)?,
            ["player", field] => {
                let player = state.player.as_ref().ok_or_else(|| AssertionError {
                    message: format!("Check failed: {}", check),
                    expected: "player exists".to_string(),
                    actual: "no player".to_string(),
                })?;
                match *field {
                    "x" => check_float_comparison(path, player.x, operator, expected_value)?,
                    "y" => check_float_comparison(path, player.y, operator, expected_value)?,
                    "velocity_x" => check_float_comparison(path, player.velocity_x, operator, expected_value)?,
                    "velocity_y" => check_float_comparison(path, player.velocity_y, operator, expected_value)?,
                    "grounded" => check_text(check, &player.grounded.to_string(), operator, expected_value)?,
                    _ => return Err(unknown_path(path)),
                }
            }
            _ => return Err(unknown_path(path)),
        }
    }

    Ok(())
}

fn unknown_path(path: &str) -> AssertionError {
    AssertionError {
        message: format!("Unknown check path: {}", path),
        expected: "score, lives, rumble, enemies, food, power, phase or player.<x|y|velocity_x|velocity_y|grounded>"
            .to_string(),
        actual: path.to_string(),
    }
}

/// Equality check for names and flags
fn check_text(check: &str, actual: &str, operator: &str, expected_str: &str) -> Result<(), AssertionError> {
    let expected = expected_str.trim_matches('"');
    let pass = match operator {
        "=" => actual == expected,
        "!=" => actual != expected,
        _ => {
            return Err(AssertionError {
                message: format!("Operator '{}' not supported: {}", operator, check),
                expected: "= or !=".to_string(),
                actual: operator.to_string(),
            });
        }
    };
    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {}", check),
            expected: format!("{} {}", operator, expected),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Check float comparison with operator
fn check_float_comparison(path: &str, actual: f32, operator: &str, expected_str: &str) -> Result<(), AssertionError> {
    let value: f32 = expected_str.trim().parse().map_err(|_| AssertionError {
        message: format!("Invalid value for {}", path),
        expected: "number".to_string(),
        actual: expected_str.to_string(),
    })?;

    let pass = match operator {
        ">=" => actual >= value,
        "<=" => actual <= value,
        ">" => actual > value,
        "<" => actual < value,
        "=" => (actual - value).abs() < 0.1,
        "!=" => (actual - value).abs() >= 0.1,
        _ => false,
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {} {} {} (actual: {:.1})", path, operator, expected_str, actual),
            expected: format!("{} {} {}", path, operator, value),
            actual: format!("{:.1}", actual),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::EnemyKind;
    use crate::events::{DeathCause, DefeatCause};

    fn expect(event: &str) -> ExpectedEvent {
        ExpectedEvent { event: event.to_string(), kind: None, cause: None, frame_min: None, frame_max: None }
    }

    fn captured() -> Vec<CapturedEvent> {
        vec![
            CapturedEvent::from_game_event(3, &GameEvent::Jump { double: false }),
            CapturedEvent::from_game_event(
                40,
                &GameEvent::EnemyDefeated { kind: EnemyKind::Walker, points: 100, cause: DefeatCause::Stomp },
            ),
            CapturedEvent::from_game_event(90, &GameEvent::PlayerDied { lives_left: 2, cause: DeathCause::Fall }),
        ]
    }

    #[test]
    fn test_sequence_in_order_with_details() {
        let mut defeated = expect("EnemyDefeated");
        defeated.kind = Some("walker".to_string());
        defeated.cause = Some("stomp".to_string());
        defeated.frame_max = Some(45);
        assert!(check_sequence(&[expect("Jump"), defeated, expect("PlayerDied")], &captured()).is_ok());
    }

    #[test]
    fn test_sequence_rejects_wrong_order_cause_and_timing() {
        assert!(check_sequence(&[expect("PlayerDied"), expect("Jump")], &captured()).is_err());

        let mut wrong_cause = expect("EnemyDefeated");
        wrong_cause.cause = Some("shield".to_string());
        assert!(check_sequence(&[wrong_cause], &captured()).is_err());

        let mut late = expect("PlayerDied");
        late.frame_min = Some(100);
        let err = check_sequence(&[late], &captured()).unwrap_err();
        assert!(err.message.contains("too early"));
    }

    #[test]
    fn test_state_checks() {
        let state = WorldState {
            player: Some(PlayerState { x: 320.0, y: 52.0, velocity_x: 0.0, velocity_y: 0.0, grounded: true }),
            score: 250,
            lives: 2,
            rumble: 5,
            power: Some("shield".to_string()),
            phase: "playing".to_string(),
            enemies: 0,
            food: 1,
        };
        let ok = StateAssertion {
            after_frame: 10,
            checks: vec![
                "player.x > 300".to_string(),
                "player.grounded = true".to_string(),
                "lives = 2".to_string(),
                "score >= 200".to_string(),
                "power = shield".to_string(),
                "phase != dying".to_string(),
                "enemies = 0".to_string(),
            ],
        };
        assert!(check_state(&ok, &state).is_ok());

        for bad in ["lives = 3", "player.y > 100", "power = cap", "player.z = 1", "score ~ 3"] {
            let assertion = StateAssertion { after_frame: 10, checks: vec![bad.to_string()] };
            assert!(check_state(&assertion, &state).is_err(), "{} should fail", bad);
        }
    }
}
