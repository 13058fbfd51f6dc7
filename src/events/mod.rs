//! Game events: bus, compact text format and the event log
//!
//! Gameplay emits onto the `EventBus`; the game drains it every frame into
//! tracing output and (optionally) an `.evlog` file. The scenario runner drains
//! the same bus to check expected event sequences.

mod bus;
mod format;
mod logger;
mod types;

pub use bus::{BusEvent, EventBus, update_event_bus_time};
pub use format::{parse_event, serialize_event};
pub use logger::{EventLogger, process_bus_events};
pub use types::{DeathCause, DefeatCause, GameEvent};
