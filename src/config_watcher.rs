//! Hot reload for the level file and gameplay tuning
//!
//! Both files are polled on a slow timer. A changed level file takes effect
//! the next time a level is built; changed tuning applies immediately.

use bevy::prelude::*;
use std::fs;
use std::time::SystemTime;

use crate::constants::LEVELS_FILE;
use crate::levels::LevelDatabase;
use crate::tuning::{GAMEPLAY_TUNING_FILE, PhysicsTweaks, apply_global_tuning};

/// Seconds between polls
const POLL_SECS: f32 = 10.0;

/// A file on disk and the modification time last seen for it
#[derive(Debug, Clone)]
pub struct WatchedFile {
    pub path: &'static str,
    pub seen: Option<SystemTime>,
}

impl WatchedFile {
    pub fn new(path: &'static str) -> Self {
        Self { path, seen: modified_at(path) }
    }

    /// Record the current mtime; true when it differs from the last one seen.
    /// A file that disappears counts as a change.
    pub fn refresh(&mut self) -> bool {
        let now = modified_at(self.path);
        let changed = now != self.seen;
        self.seen = now;
        changed
    }
}

fn modified_at(path: &str) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

#[derive(Resource)]
pub struct ConfigWatcher {
    pub timer: f32,
    pub levels: WatchedFile,
    pub tuning: WatchedFile,
}

impl Default for ConfigWatcher {
    fn default() -> Self {
        Self {
            timer: 0.0,
            levels: WatchedFile::new(LEVELS_FILE),
            tuning: WatchedFile::new(GAMEPLAY_TUNING_FILE),
        }
    }
}

impl ConfigWatcher {
    /// Advance the poll timer; true once per interval
    pub fn tick(&mut self, dt: f32) -> bool {
        self.timer += dt;
        if self.timer >= POLL_SECS {
            self.timer = 0.0;
            true
        } else {
            false
        }
    }
}

pub fn check_config_changes(
    time: Res<Time>,
    mut watcher: ResMut<ConfigWatcher>,
    mut level_db: ResMut<LevelDatabase>,
    mut tweaks: ResMut<PhysicsTweaks>,
) {
    if !watcher.tick(time.delta_secs()) {
        return;
    }

    if watcher.levels.refresh() {
        *level_db = LevelDatabase::load_from_file(LEVELS_FILE);
        info!("{} changed, {} levels reloaded", LEVELS_FILE, level_db.len());
    }

    if watcher.tuning.refresh() {
        if let Err(e) = apply_global_tuning(&mut tweaks) {
            warn!("{} changed but could not be applied: {}", GAMEPLAY_TUNING_FILE, e);
        } else {
            info!("{} changed, tuning reapplied", GAMEPLAY_TUNING_FILE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(path: &'static str) -> WatchedFile {
        WatchedFile { path, seen: None }
    }

    #[test]
    fn test_polls_once_per_interval() {
        let mut watcher = ConfigWatcher {
            timer: 0.0,
            levels: missing("no/such/levels.txt"),
            tuning: missing("no/such/tuning.json"),
        };
        assert!(!watcher.tick(4.0));
        assert!(!watcher.tick(5.9));
        assert!(watcher.tick(0.2));
        assert_eq!(watcher.timer, 0.0);
        assert!(!watcher.tick(1.0));
    }

    #[test]
    fn test_missing_file_stays_unchanged() {
        let mut file = missing("no/such/levels.txt");
        assert!(!file.refresh());
        assert!(!file.refresh());
    }

    #[test]
    fn test_vanished_file_is_a_change() {
        let mut file = WatchedFile { path: "no/such/levels.txt", seen: Some(SystemTime::UNIX_EPOCH) };
        assert!(file.refresh());
        assert!(file.seen.is_none());
    }
}
