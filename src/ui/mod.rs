//! UI module - HUD, debug overlay and the tuning panel

mod debug;
mod hud;
mod tweak_panel;

pub use debug::*;
pub use hud::*;
pub use tweak_panel::*;
