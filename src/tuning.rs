//! Global gameplay tuning settings (decoupled from UI)

use bevy::log::warn;
use bevy::prelude::{Deref, DerefMut, ResMut, Resource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::*;

/// Path to global gameplay tuning config
pub const GAMEPLAY_TUNING_FILE: &str = "config/gameplay_tuning.json";

/// Serializable movement/combat feel values stored in config.
/// Missing fields fall back to the compiled-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayTuning {
    pub gravity: f32,
    pub move_speed: f32,
    pub jump_velocity: f32,
    pub double_jump_velocity: f32,
    pub ground_friction: f32,
    pub stop_threshold: f32,
    pub jump_cut_threshold: f32,
    pub jump_cut_multiplier: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    pub stomp_bounce: f32,
}

impl Default for GameplayTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            move_speed: MOVE_SPEED,
            jump_velocity: JUMP_VELOCITY,
            double_jump_velocity: DOUBLE_JUMP_VELOCITY,
            ground_friction: GROUND_FRICTION,
            stop_threshold: STOP_THRESHOLD,
            jump_cut_threshold: JUMP_CUT_THRESHOLD,
            jump_cut_multiplier: JUMP_CUT_MULTIPLIER,
            coyote_time: COYOTE_TIME,
            jump_buffer_time: JUMP_BUFFER_TIME,
            stomp_bounce: STOMP_BOUNCE,
        }
    }
}

impl GameplayTuning {
    pub const LABELS: [&'static str; 11] = [
        "Gravity",
        "Move Speed",
        "Jump Velocity",
        "Double Jump Velocity",
        "Ground Friction",
        "Stop Threshold",
        "Jump Cut Threshold",
        "Jump Cut Multiplier",
        "Coyote Time",
        "Jump Buffer Time",
        "Stomp Bounce",
    ];

    pub fn get_value(&self, index: usize) -> f32 {
        match index {
            0 => self.gravity,
            1 => self.move_speed,
            2 => self.jump_velocity,
            3 => self.double_jump_velocity,
            4 => self.ground_friction,
            5 => self.stop_threshold,
            6 => self.jump_cut_threshold,
            7 => self.jump_cut_multiplier,
            8 => self.coyote_time,
            9 => self.jump_buffer_time,
            10 => self.stomp_bounce,
            _ => 0.0,
        }
    }

    pub fn set_value(&mut self, index: usize, value: f32) {
        match index {
            0 => self.gravity = value,
            1 => self.move_speed = value,
            2 => self.jump_velocity = value,
            3 => self.double_jump_velocity = value,
            4 => self.ground_friction = value,
            5 => self.stop_threshold = value,
            6 => self.jump_cut_threshold = value,
            7 => self.jump_cut_multiplier = value,
            8 => self.coyote_time = value,
            9 => self.jump_buffer_time = value,
            10 => self.stomp_bounce = value,
            _ => {}
        }
    }

    pub fn default_value(index: usize) -> f32 {
        Self::default().get_value(index)
    }

    pub fn is_modified(&self, index: usize) -> bool {
        (self.get_value(index) - Self::default_value(index)).abs() > 0.0001
    }

    pub fn reset_value(&mut self, index: usize) {
        self.set_value(index, Self::default_value(index));
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Step size is ~10% of the default value
    pub fn step(index: usize) -> f32 {
        (Self::default_value(index) * 0.1).max(0.001)
    }

    /// Multipliers and timers read better with more decimals
    pub fn format_value(&self, index: usize) -> String {
        let value = self.get_value(index);
        match index {
            4 | 7 => format!("{:.2}", value),
            8 | 9 => format!("{:.3}s", value),
            _ => format!("{:.0}", value),
        }
    }
}

/// Runtime tuning read by the gameplay systems
#[derive(Resource, Debug, Clone, Default, Deref, DerefMut)]
pub struct PhysicsTweaks(pub GameplayTuning);

pub fn load_gameplay_tuning_from_file(path: &str) -> Result<GameplayTuning, String> {
    let contents = fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
}

pub fn save_gameplay_tuning_to_file(path: &str, tuning: &GameplayTuning) -> Result<(), String> {
    let json = serde_json::to_string_pretty(tuning)
        .map_err(|e| format!("Failed to serialize tuning: {}", e))?;
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path, e))
}

/// Load the tuning file into `tweaks`, falling back to defaults on error
pub fn apply_global_tuning(tweaks: &mut PhysicsTweaks) -> Result<(), String> {
    match load_gameplay_tuning_from_file(GAMEPLAY_TUNING_FILE) {
        Ok(tuning) => {
            tweaks.0 = tuning;
            Ok(())
        }
        Err(err) => {
            tweaks.0 = GameplayTuning::default();
            Err(err)
        }
    }
}

pub fn load_global_tuning_system(mut tweaks: ResMut<PhysicsTweaks>) {
    if let Err(err) = apply_global_tuning(&mut tweaks) {
        warn!("{}, using default tuning", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let tuning: GameplayTuning = serde_json::from_str(r#"{ "gravity": 1200.0 }"#).unwrap();
        assert_eq!(tuning.gravity, 1200.0);
        assert_eq!(tuning.move_speed, MOVE_SPEED);
        assert_eq!(tuning.coyote_time, COYOTE_TIME);
    }

    #[test]
    fn test_index_accessors_cover_labels() {
        let mut tuning = GameplayTuning::default();
        for i in 0..GameplayTuning::LABELS.len() {
            let v = tuning.get_value(i);
            assert!(v > 0.0, "{} has no default", GameplayTuning::LABELS[i]);
            tuning.set_value(i, v * 2.0);
            assert!(tuning.is_modified(i));
            tuning.reset_value(i);
            assert!(!tuning.is_modified(i));
        }
    }
}
