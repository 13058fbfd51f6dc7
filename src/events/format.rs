//! Compact text format for game event serialization
//!
//! Format: `T:NNNNN|CODE|data...`
//! - T:NNNNN = timestamp in milliseconds (5 digits, wraps at 99999)
//! - CODE = event type code
//! - data = pipe-separated values specific to event type
//!
//! Examples:
//! ```text
//! T:00000|RS|1|Main Street
//! T:00150|J|0
//! T:00320|FC|burger|2|14
//! T:00850|ED|walker|200|stomp
//! T:01200|PD|2|fall
//! T:09500|LC|5300|1700
//! ```

use super::types::{DeathCause, DefeatCause, GameEvent};
use crate::collectibles::FoodKind;
use crate::enemies::EnemyKind;
use crate::powerups::PowerKind;

fn flag(v: bool) -> &'static str {
    if v { "1" } else { "0" }
}

/// Serialize a GameEvent to compact text format
pub fn serialize_event(time_ms: u32, event: &GameEvent) -> String {
    let ts = format!("T:{:05}", time_ms % 100000);
    let code = event.type_code();

    let data = match event {
        GameEvent::SessionStart { session_id, timestamp } => format!("{}|{}", session_id, timestamp),
        GameEvent::RunStart { level, level_name } => format!("{}|{}", level, level_name),
        GameEvent::Jump { double } => flag(*double).to_string(),
        GameEvent::FoodCollected { kind, points, rumble } => {
            format!("{}|{}|{}", kind.name(), points, rumble)
        }
        GameEvent::PowerUpCollected { kind } | GameEvent::PowerUpExpired { kind } => kind.name().to_string(),
        GameEvent::BlastFired { x, dir } => format!("{:.1}|{:.0}", x, dir),
        GameEvent::EnemyDefeated { kind, points, cause } => {
            format!("{}|{}|{}", kind.name(), points, cause.name())
        }
        GameEvent::Rumble { defeated } => defeated.to_string(),
        GameEvent::PlayerDied { lives_left, cause } => format!("{}|{}", lives_left, cause.name()),
        GameEvent::LevelComplete { score, bonus } => format!("{}|{}", score, bonus),
        GameEvent::GameOver { score } => score.to_string(),
    };

    format!("{}|{}|{}", ts, code, data)
}

/// Parse a line back into timestamp and event
pub fn parse_event(line: &str) -> Option<(u32, GameEvent)> {
    let parts: Vec<&str> = line.trim_end().split('|').collect();
    if parts.len() < 3 {
        return None;
    }

    let time_ms: u32 = parts[0].strip_prefix("T:")?.parse().ok()?;
    let code = parts[1];
    let data = &parts[2..];

    let event = match code {
        "SE" if data.len() >= 2 => GameEvent::SessionStart {
            session_id: data[0].to_string(),
            timestamp: data[1].to_string(),
        },
        // Level names may not contain '|', but rejoin anyway so a stray one survives
        "RS" if data.len() >= 2 => GameEvent::RunStart {
            level: data[0].parse().ok()?,
            level_name: data[1..].join("|"),
        },
        "J" => GameEvent::Jump { double: data[0] == "1" },
        "FC" if data.len() >= 3 => GameEvent::FoodCollected {
            kind: FoodKind::from_name(data[0])?,
            points: data[1].parse().ok()?,
            rumble: data[2].parse().ok()?,
        },
        "PU" => GameEvent::PowerUpCollected { kind: PowerKind::from_name(data[0])? },
        "PX" => GameEvent::PowerUpExpired { kind: PowerKind::from_name(data[0])? },
        "BF" if data.len() >= 2 => GameEvent::BlastFired {
            x: data[0].parse().ok()?,
            dir: data[1].parse().ok()?,
        },
        "ED" if data.len() >= 3 => GameEvent::EnemyDefeated {
            kind: EnemyKind::from_name(data[0])?,
            points: data[1].parse().ok()?,
            cause: DefeatCause::from_name(data[2])?,
        },
        "RU" => GameEvent::Rumble { defeated: data[0].parse().ok()? },
        "PD" if data.len() >= 2 => GameEvent::PlayerDied {
            lives_left: data[0].parse().ok()?,
            cause: DeathCause::from_name(data[1])?,
        },
        "LC" if data.len() >= 2 => GameEvent::LevelComplete {
            score: data[0].parse().ok()?,
            bonus: data[1].parse().ok()?,
        },
        "GO" => GameEvent::GameOver { score: data[0].parse().ok()? },
        _ => return None,
    };

    Some((time_ms, event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_defeated_line() {
        let event = GameEvent::EnemyDefeated {
            kind: EnemyKind::Lurker,
            points: 300,
            cause: DefeatCause::Rumble,
        };
        let line = serialize_event(1500, &event);
        assert_eq!(line, "T:01500|ED|lurker|300|rumble");
        let (ts, parsed) = parse_event(&line).unwrap();
        assert_eq!(ts, 1500);
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_level_name_with_spaces() {
        let event = GameEvent::RunStart { level: 2, level_name: "Main Street".to_string() };
        let (_, parsed) = parse_event(&serialize_event(0, &event)).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_timestamp_wraps() {
        let line = serialize_event(123_456, &GameEvent::Jump { double: true });
        assert_eq!(line, "T:23456|J|1");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_event("hello").is_none());
        assert!(parse_event("T:00010|ZZ|1").is_none());
        assert!(parse_event("T:00010|FC|pizza|1|1").is_none());
        assert!(parse_event("X:00010|GO|5").is_none());
    }
}
