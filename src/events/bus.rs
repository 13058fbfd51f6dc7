//! Frame event queue
//!
//! Physics, combat and the run rules push `GameEvent`s here. The event log,
//! the HUD popups and the scenario runner read them back out, so no gameplay
//! system needs to know who is listening.

use bevy::prelude::*;

use super::types::GameEvent;

/// A `GameEvent` stamped with the app clock at emission
#[derive(Debug, Clone)]
pub struct BusEvent {
    pub time_ms: u32,
    pub event: GameEvent,
}

#[derive(Resource, Default)]
pub struct EventBus {
    queued: Vec<BusEvent>,
    /// Copies of everything handed out by `drain`, until `clear_processed`
    handed_out: Vec<BusEvent>,
    clock_ms: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_time(&mut self, elapsed_secs: f32) {
        self.clock_ms = (elapsed_secs * 1000.0) as u32;
    }

    pub fn emit(&mut self, event: GameEvent) {
        let time_ms = self.clock_ms;
        self.queued.push(BusEvent { time_ms, event });
    }

    /// Queued events, left in place
    pub fn peek(&self) -> &[BusEvent] {
        &self.queued
    }

    /// Take every queued event. A copy stays readable through `processed`.
    pub fn drain(&mut self) -> Vec<BusEvent> {
        let taken = std::mem::take(&mut self.queued);
        self.handed_out.extend_from_slice(&taken);
        taken
    }

    pub fn processed(&self) -> &[BusEvent] {
        &self.handed_out
    }

    pub fn clear_processed(&mut self) {
        self.handed_out.clear();
    }

    pub fn has_pending(&self) -> bool {
        !self.queued.is_empty()
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.clock_ms
    }
}

pub fn update_event_bus_time(time: Res<Time>, mut bus: ResMut<EventBus>) {
    bus.update_time(time.elapsed_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_carry_clock_and_survive_drain_until_cleared() {
        let mut bus = EventBus::new();
        bus.update_time(1.5);
        bus.emit(GameEvent::Jump { double: false });
        bus.update_time(2.0);
        bus.emit(GameEvent::Jump { double: true });

        assert!(bus.has_pending());
        assert_eq!(bus.peek().len(), 2);
        assert_eq!(bus.elapsed_ms(), 2000);

        let taken = bus.drain();
        assert_eq!(taken.iter().map(|e| e.time_ms).collect::<Vec<_>>(), vec![1500, 2000]);
        assert!(!bus.has_pending());
        assert_eq!(bus.processed().len(), 2);

        bus.clear_processed();
        assert!(bus.processed().is_empty());
    }
}
