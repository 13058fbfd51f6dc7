//! Player and shared physics-body components

use bevy::prelude::*;

/// Marker for the player entity
#[derive(Component)]
pub struct Player;

/// 2D velocity vector - shared by player, enemies and projectiles
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct Velocity(pub Vec2);

/// Whether the body rested on a solid surface after the last collision pass
#[derive(Component, Default)]
pub struct Grounded(pub bool);

/// Position at the start of the current tick (used for stomp detection)
#[derive(Component, Default)]
pub struct PreviousPosition(pub Vec2);

/// Arcade physics body: box size plus gravity/enable switches
#[derive(Component, Debug, Clone, Copy)]
#[require(Velocity, Grounded, PreviousPosition)]
pub struct Body {
    /// Full hitbox size, centered on the transform
    pub size: Vec2,
    pub gravity: bool,
    /// Disabled bodies neither move nor collide
    pub enabled: bool,
}

impl Body {
    pub fn new(size: Vec2) -> Self {
        Self { size, gravity: true, enabled: true }
    }

    pub fn half(&self) -> Vec2 {
        self.size / 2.0
    }
}

/// Time remaining for coyote jump (seconds after leaving ground you can still jump)
#[derive(Component, Default)]
pub struct CoyoteTimer(pub f32);

/// Time remaining in the jump buffer (an early press waiting for ground)
#[derive(Component, Default)]
pub struct JumpBuffer(pub f32);

/// Air-jump bookkeeping
#[derive(Component, Default)]
pub struct JumpState {
    pub used_double_jump: bool,
}

/// Direction player faces (-1.0 = left, 1.0 = right)
#[derive(Component)]
pub struct Facing(pub f32);

impl Default for Facing {
    fn default() -> Self {
        Self(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pose {
    #[default]
    Idle,
    Run,
    Jump,
    Blast,
    Dead,
}

/// Current animation pose plus the run-cycle frame
#[derive(Component, Default)]
pub struct PlayerPose {
    pub pose: Pose,
    pub run_frame: u8,
    pub frame_timer: f32,
    /// Seconds left holding the Blast pose after firing
    pub blast_timer: f32,
}
