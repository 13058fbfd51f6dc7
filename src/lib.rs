//! Brickrun - a side-scrolling platformer built with Bevy
//!
//! This crate provides all game components, resources, and systems organized into modules.

// Core modules
pub mod config_watcher;
pub mod constants;
pub mod events;
pub mod gameplay;
pub mod helpers;
pub mod settings;
pub mod testing;
pub mod tuning;

// Game logic modules
pub mod camera;
pub mod collectibles;
pub mod combat;
pub mod effects;
pub mod enemies;
pub mod input;
pub mod levels;
pub mod player;
pub mod powerups;
pub mod run;
pub mod scenes;
pub mod textures;
pub mod ui;
pub mod world;

// Re-export commonly used types for convenience
pub use camera::{CameraShake, MainCamera};
pub use collectibles::{Food, FoodKind};
pub use config_watcher::ConfigWatcher;
pub use constants::*;
pub use effects::{Effect, EffectQueue};
pub use enemies::{Enemy, EnemyKind};
pub use events::{BusEvent, DeathCause, DefeatCause, EventBus, EventLogger, GameEvent};
pub use gameplay::{GameplayPlugin, GameplaySet};
pub use helpers::*;
pub use input::PlayerInput;
pub use levels::{CurrentLevel, LevelData, LevelDatabase, PlatformDef};
pub use player::{Body, CoyoteTimer, Facing, Grounded, JumpBuffer, JumpState, Player, Velocity};
pub use powerups::{PowerKind, PowerState};
pub use run::{RunPhase, RunState};
pub use scenes::AppState;
pub use settings::{CurrentSettings, InitSettings, save_settings_system};
pub use textures::GameTextures;
pub use tuning::{GameplayTuning, PhysicsTweaks};
pub use world::{Collider, Flag, LevelEntity, Platform};
