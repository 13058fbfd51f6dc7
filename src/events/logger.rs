//! Event logger - writes bus events to `logs/*.evlog`

use bevy::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use uuid::Uuid;

use super::bus::EventBus;
use super::format::serialize_event;
use super::types::GameEvent;

/// Active event logger with file handle
#[derive(Resource)]
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    session_id: String,
    log_dir: PathBuf,
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new("logs")
    }
}

impl EventLogger {
    /// Create a logger without opening a file yet
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: None,
            session_id: String::new(),
            log_dir: log_dir.into(),
        }
    }

    /// Open a fresh log file named `<timestamp>_<session8>.evlog` and return the
    /// SessionStart event to put on the bus.
    pub fn start_session(&mut self) -> Option<GameEvent> {
        self.session_id = Uuid::new_v4().to_string();
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();

        if let Err(e) = std::fs::create_dir_all(&self.log_dir) {
            warn!("Failed to create log directory {}: {}", self.log_dir.display(), e);
            return None;
        }

        let filename = format!("{}_{}.evlog", timestamp, &self.session_id[..8]);
        let path = self.log_dir.join(filename);

        match OpenOptions::new().create(true).write(true).truncate(true).open(&path) {
            Ok(file) => {
                self.writer = Some(BufWriter::new(file));
                info!("Event logging started: {} (session: {})", path.display(), &self.session_id[..8]);
                Some(GameEvent::SessionStart {
                    session_id: self.session_id.clone(),
                    timestamp,
                })
            }
            Err(e) => {
                warn!("Failed to open event log {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Write one event line (no-op when no session is open)
    pub fn log(&mut self, time_ms: u32, event: &GameEvent) {
        let Some(writer) = &mut self.writer else {
            return;
        };
        if let Err(e) = writeln!(writer, "{}", serialize_event(time_ms, event)) {
            warn!("Failed to write event: {}", e);
        }
    }

    pub fn flush(&mut self) {
        if let Some(writer) = &mut self.writer
            && let Err(e) = writer.flush()
        {
            warn!("Failed to flush event log: {}", e);
        }
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Drain the bus each frame: trace every event and append it to the log file
pub fn process_bus_events(mut bus: ResMut<EventBus>, mut logger: ResMut<EventLogger>) {
    if !bus.has_pending() {
        return;
    }
    for bus_event in bus.drain() {
        if bus_event.event.is_milestone() {
            info!("{:?}", bus_event.event);
        } else {
            debug!("{:?}", bus_event.event);
        }
        logger.log(bus_event.time_ms, &bus_event.event);
    }
    bus.clear_processed();
    logger.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::parse_event;

    #[test]
    fn test_session_writes_parseable_lines() {
        let dir = std::env::temp_dir().join(format!("brickrun_evlog_{}", Uuid::new_v4()));
        let mut logger = EventLogger::new(&dir);
        let start = logger.start_session().unwrap();
        assert!(logger.is_active());
        logger.log(0, &start);
        logger.log(250, &GameEvent::GameOver { score: 1200 });
        logger.flush();

        let entry = std::fs::read_dir(&dir).unwrap().next().unwrap().unwrap();
        let content = std::fs::read_to_string(entry.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(parse_event(lines[1]), Some((250, GameEvent::GameOver { score: 1200 })));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_inactive_logger_ignores_events() {
        let mut logger = EventLogger::default();
        logger.log(10, &GameEvent::Jump { double: false });
        assert!(!logger.is_active());
    }
}
