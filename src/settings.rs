//! Startup preferences kept in `config/init_settings.json`
//!
//! The file is optional. Toggling the debug overlay or the event log in game
//! writes it back.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::STARTING_LIVES;

/// Path to the settings file
pub const SETTINGS_FILE: &str = "config/init_settings.json";

/// Persistent settings that survive between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitSettings {
    /// Starting level (1-indexed)
    pub level: u32,
    /// Lives at the start of a fresh run
    pub starting_lives: u32,
    /// Show the F3 debug overlay at startup
    pub show_debug: bool,
    /// Write .evlog files for each session
    pub event_log: bool,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            level: 1,
            starting_lives: STARTING_LIVES,
            show_debug: false,
            event_log: false,
        }
    }
}

impl InitSettings {
    pub fn load() -> Self {
        Self::load_from(Path::new(SETTINGS_FILE))
    }

    /// Read settings from `path`. A missing or unreadable file falls back to
    /// defaults; only the reason is logged.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("{} not present, starting with default settings", path.display());
            return Self::default();
        }
        let loaded = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| Self::parse(&content).map_err(|e| e.to_string()));
        match loaded {
            Ok(settings) => {
                info!("Settings read from {}: level {}, {} lives", path.display(), settings.level, settings.starting_lives);
                settings
            }
            Err(e) => {
                warn!("Ignoring {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse JSON settings; a zero level or zero lives is raised to one
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let parsed: Self = serde_json::from_str(content)?;
        Ok(Self {
            level: parsed.level.max(1),
            starting_lives: parsed.starting_lives.max(1),
            ..parsed
        })
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(Path::new(SETTINGS_FILE))
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, json)?;
        info!("Settings written to {}", path.display());
        Ok(())
    }
}

/// Live settings; toggles flip `dirty` and the next frame writes them out
#[derive(Resource)]
pub struct CurrentSettings {
    pub settings: InitSettings,
    pub dirty: bool,
}

impl Default for CurrentSettings {
    fn default() -> Self {
        Self {
            settings: InitSettings::load(),
            dirty: false,
        }
    }
}

impl CurrentSettings {
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Write settings if anything changed. A failed write is logged and not
    /// retried until the next change.
    pub fn save_if_dirty(&mut self) {
        if !std::mem::take(&mut self.dirty) {
            return;
        }
        if let Err(e) = self.settings.save() {
            warn!("Could not write {}: {}", SETTINGS_FILE, e);
        }
    }
}

pub fn save_settings_system(mut settings: ResMut<CurrentSettings>) {
    settings.save_if_dirty();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = InitSettings::parse(r#"{ "level": 2 }"#).unwrap();
        assert_eq!(settings.level, 2);
        assert_eq!(settings.starting_lives, STARTING_LIVES);
        assert!(!settings.event_log);
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let settings = InitSettings::parse(r#"{ "level": 0, "starting_lives": 0 }"#).unwrap();
        assert_eq!(settings.level, 1);
        assert_eq!(settings.starting_lives, 1);
    }

    #[test]
    fn test_saved_file_loads_back() {
        let path = std::env::temp_dir().join(format!("brickrun_settings_{}.json", std::process::id()));
        let settings = InitSettings { level: 2, starting_lives: 5, show_debug: true, event_log: true };
        settings.save_to(&path).unwrap();
        assert_eq!(InitSettings::load_from(&path), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unreadable_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("brickrun_bad_settings_{}.json", std::process::id()));
        fs::write(&path, "not json").unwrap();
        assert_eq!(InitSettings::load_from(&path), InitSettings::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(InitSettings::parse("{ level: ").is_err());
    }
}
