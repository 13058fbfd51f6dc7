//! Event type definitions for the bus and the event log

use serde::{Deserialize, Serialize};

use crate::collectibles::FoodKind;
use crate::enemies::EnemyKind;
use crate::powerups::PowerKind;

/// What took an enemy out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefeatCause {
    Stomp,
    Shield,
    Shout,
    Rumble,
}

impl DefeatCause {
    pub fn name(&self) -> &'static str {
        match self {
            DefeatCause::Stomp => "stomp",
            DefeatCause::Shield => "shield",
            DefeatCause::Shout => "shout",
            DefeatCause::Rumble => "rumble",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [DefeatCause::Stomp, DefeatCause::Shield, DefeatCause::Shout, DefeatCause::Rumble]
            .into_iter()
            .find(|c| c.name() == name)
    }
}

/// What killed the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Fall,
    Enemy,
}

impl DeathCause {
    pub fn name(&self) -> &'static str {
        match self {
            DeathCause::Fall => "fall",
            DeathCause::Enemy => "enemy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fall" => Some(DeathCause::Fall),
            "enemy" => Some(DeathCause::Enemy),
            _ => None,
        }
    }
}

/// All game events that go through the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    // === Session ===
    SessionStart {
        session_id: String, // UUID v4
        timestamp: String,
    },
    /// A level build started (first entry or respawn)
    RunStart { level: u32, level_name: String },

    // === Player ===
    Jump { double: bool },
    FoodCollected { kind: FoodKind, points: u32, rumble: u32 },
    PowerUpCollected { kind: PowerKind },
    PowerUpExpired { kind: PowerKind },
    BlastFired { x: f32, dir: f32 },

    // === Combat ===
    EnemyDefeated { kind: EnemyKind, points: u32, cause: DefeatCause },
    Rumble { defeated: u32 },

    // === Run flow ===
    PlayerDied { lives_left: u32, cause: DeathCause },
    LevelComplete { score: u32, bonus: u32 },
    GameOver { score: u32 },
}

impl GameEvent {
    /// Get the event type code for compact serialization
    pub fn type_code(&self) -> &'static str {
        match self {
            GameEvent::SessionStart { .. } => "SE",
            GameEvent::RunStart { .. } => "RS",
            GameEvent::Jump { .. } => "J",
            GameEvent::FoodCollected { .. } => "FC",
            GameEvent::PowerUpCollected { .. } => "PU",
            GameEvent::PowerUpExpired { .. } => "PX",
            GameEvent::BlastFired { .. } => "BF",
            GameEvent::EnemyDefeated { .. } => "ED",
            GameEvent::Rumble { .. } => "RU",
            GameEvent::PlayerDied { .. } => "PD",
            GameEvent::LevelComplete { .. } => "LC",
            GameEvent::GameOver { .. } => "GO",
        }
    }

    /// Variant name, used by scenario expectations
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::SessionStart { .. } => "SessionStart",
            GameEvent::RunStart { .. } => "RunStart",
            GameEvent::Jump { .. } => "Jump",
            GameEvent::FoodCollected { .. } => "FoodCollected",
            GameEvent::PowerUpCollected { .. } => "PowerUpCollected",
            GameEvent::PowerUpExpired { .. } => "PowerUpExpired",
            GameEvent::BlastFired { .. } => "BlastFired",
            GameEvent::EnemyDefeated { .. } => "EnemyDefeated",
            GameEvent::Rumble { .. } => "Rumble",
            GameEvent::PlayerDied { .. } => "PlayerDied",
            GameEvent::LevelComplete { .. } => "LevelComplete",
            GameEvent::GameOver { .. } => "GameOver",
        }
    }

    /// True for events that are interesting enough to log at info level
    pub fn is_milestone(&self) -> bool {
        !matches!(self, GameEvent::Jump { .. } | GameEvent::FoodCollected { .. } | GameEvent::BlastFired { .. })
    }
}
