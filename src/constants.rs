//! Tunable constants for brickrun
//!
//! Level data is authored in screen coordinates (y grows downward, 0 at the
//! top of a 500px screen). The game world is Bevy's y-up space, so every
//! authored y goes through `level_to_world_y` before it becomes a translation.

use bevy::prelude::*;

// =============================================================================
// SCREEN / WORLD
// =============================================================================

pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 500.0;
pub const TILE: f32 = 32.0;
pub const WORLD_WIDTH: f32 = 12800.0;
pub const GROUND_Y: f32 = 468.0; // Top of the ground row in level coordinates
pub const GROUND_TOP: f32 = SCREEN_HEIGHT - GROUND_Y; // Same edge in world coordinates

/// Convert a level-space y (down from screen top) to world-space y (up from screen bottom)
pub const fn level_to_world_y(level_y: f32) -> f32 {
    SCREEN_HEIGHT - level_y
}

// =============================================================================
// COLORS
// =============================================================================

pub const SKY_COLOR: Color = Color::srgb(0.36, 0.58, 0.99);
pub const FAR_HILL_COLOR: Color = Color::srgb(0.33, 0.62, 0.36);
pub const NEAR_HILL_COLOR: Color = Color::srgb(0.22, 0.5, 0.26);
pub const GROUND_COLOR: Color = Color::srgb(0.55, 0.33, 0.16);
pub const GRASS_COLOR: Color = Color::srgb(0.3, 0.72, 0.25);
pub const BRICK_COLOR: Color = Color::srgb(0.72, 0.36, 0.2);
pub const PLAYER_COLOR: Color = Color::srgb(0.95, 0.62, 0.3);
pub const FLAG_POLE_COLOR: Color = Color::srgb(0.85, 0.85, 0.85);
pub const FLAG_CLOTH_COLOR: Color = Color::srgb(0.2, 0.75, 0.3);
pub const SHOUT_COLOR: Color = Color::srgb(0.4, 0.75, 1.0);
pub const RING_COLOR: Color = Color::srgb(0.55, 0.35, 0.12);
pub const SPARKLE_COLOR: Color = Color::srgb(1.0, 0.95, 0.55);

pub const TEXT_PRIMARY: Color = Color::WHITE;
pub const TEXT_SHADOW: Color = Color::srgba(0.0, 0.0, 0.0, 0.6);
pub const TEXT_ACCENT: Color = Color::srgb(1.0, 0.84, 0.25);
pub const FOOD_POPUP_COLOR: Color = Color::srgb(1.0, 0.4, 0.27);
pub const ENEMY_POPUP_COLOR: Color = Color::srgb(1.0, 0.4, 0.4);
pub const POWER_POPUP_COLOR: Color = Color::srgb(0.53, 1.0, 0.53);

pub const CAP_TINT: Color = Color::srgb(1.0, 0.87, 0.27);
pub const MEGAPHONE_TINT: Color = Color::srgb(1.0, 0.53, 0.27);

// =============================================================================
// BODY SIZES
// =============================================================================

pub const PLAYER_HITBOX: Vec2 = Vec2::new(20.0, 40.0);
pub const PLAYER_SIZE: Vec2 = Vec2::new(26.0, 44.0);
pub const ENEMY_HITBOX: Vec2 = Vec2::new(28.0, 36.0);
pub const ENEMY_SIZE: Vec2 = Vec2::new(32.0, 40.0);
pub const FOOD_HITBOX: Vec2 = Vec2::new(20.0, 20.0);
pub const FOOD_SIZE: Vec2 = Vec2::new(24.0, 24.0);
pub const POWERUP_HITBOX: Vec2 = Vec2::new(28.0, 28.0);
pub const FLAG_HITBOX: Vec2 = Vec2::new(48.0, 140.0);
pub const SHOUT_SIZE: Vec2 = Vec2::new(24.0, 12.0);
pub const SHIELD_BUBBLE_SIZE: f32 = 52.0;
pub const GRASS_HEIGHT: f32 = 6.0;

// =============================================================================
// SPAWN / BOUNDS
// =============================================================================

pub const PLAYER_SPAWN: Vec2 = Vec2::new(80.0, level_to_world_y(GROUND_Y - 48.0));
pub const PLAYER_DEATH_Y: f32 = -80.0; // 80px below the bottom edge
pub const ENEMY_CULL_Y: f32 = -100.0;
pub const FLAG_CENTER_Y: f32 = level_to_world_y(GROUND_Y - 80.0);
pub const FLAG_SLIDE_END_Y: f32 = level_to_world_y(GROUND_Y - 24.0);
pub const FLAG_SLIDE_OFFSET_X: f32 = -8.0;

// =============================================================================
// PHYSICS DEFAULTS (copied into PhysicsTweaks)
// =============================================================================

pub const GRAVITY: f32 = 900.0;
pub const MOVE_SPEED: f32 = 220.0;
pub const JUMP_VELOCITY: f32 = 430.0;
pub const DOUBLE_JUMP_VELOCITY: f32 = 400.0;
pub const GROUND_FRICTION: f32 = 0.8; // Horizontal velocity kept per tick with no input
pub const STOP_THRESHOLD: f32 = 10.0;
pub const JUMP_CUT_THRESHOLD: f32 = 150.0; // Only cut jumps still rising faster than this
pub const JUMP_CUT_MULTIPLIER: f32 = 0.6;
pub const COYOTE_TIME: f32 = 0.08;
pub const JUMP_BUFFER_TIME: f32 = 0.1;
pub const STOMP_BOUNCE: f32 = 280.0;
pub const COLLISION_EPSILON: f32 = 0.5; // Skin width for collision detection
pub const RUN_POSE_SPEED: f32 = 20.0;
pub const STICK_DEADZONE: f32 = 0.25;

// =============================================================================
// SNACKS / RUMBLE
// =============================================================================

pub const SNACK_SCORE_MULTIPLIER: u32 = 50;
pub const RUMBLE_COST: u32 = 50;
pub const RUMBLE_RADIUS: f32 = 350.0;
pub const RUMBLE_FREEZE: f32 = 2.0;
pub const RUMBLE_COOLDOWN: f32 = 2.5;
pub const RUMBLE_SHAKE_DURATION: f32 = 0.6;
pub const RUMBLE_SHAKE_INTENSITY: f32 = 0.025;
pub const RUMBLE_RING_START: f32 = 20.0;
pub const RUMBLE_RING_DURATION: f32 = 0.5;

// =============================================================================
// POWER-UPS
// =============================================================================

pub const SHIELD_DURATION: f32 = 10.0;
pub const MEGAPHONE_DURATION: f32 = 15.0;
pub const SHOUT_SPEED: f32 = 400.0;
pub const SHOUT_COOLDOWN: f32 = 0.7;
pub const SHOUT_LIFETIME: f32 = 2.0;
pub const SHOUT_OFFSCREEN_MARGIN: f32 = 100.0;
pub const SHOUT_SPAWN_OFFSET: f32 = 20.0;
pub const BLAST_POSE_TIME: f32 = 0.6;

// =============================================================================
// RUN FLOW
// =============================================================================

pub const STARTING_LIVES: u32 = 3;
pub const DEATH_FLOAT_SPEED: f32 = 300.0;
pub const DEATH_FLOAT_TIME: f32 = 2.0;
pub const DEATH_RESTART_TIME: f32 = 3.5;
pub const FLAG_BONUS: u32 = 1000;
pub const FLAG_SLIDE_TIME: f32 = 0.8;

// =============================================================================
// CAMERA / PRESENTATION
// =============================================================================

pub const CAMERA_LERP: f32 = 0.08;
pub const CAMERA_DEADZONE: Vec2 = Vec2::new(100.0, 50.0);
pub const FAR_HILL_SCROLL: f32 = 0.15;
pub const NEAR_HILL_SCROLL: f32 = 0.35;
pub const FADE_TIME: f32 = 0.3;
pub const POPUP_RISE: f32 = 30.0;
pub const POPUP_TIME: f32 = 0.6;
pub const POWER_POPUP_TIME: f32 = 0.8;
pub const SPARKLE_LIFETIME: f32 = 0.4;
pub const SPARKLE_GRAVITY: f32 = 200.0;
pub const SPARKLE_SPEED_MIN: f32 = 50.0;
pub const SPARKLE_SPEED_MAX: f32 = 150.0;
pub const FLASH_ALPHA: f32 = 0.3;
pub const FLASH_TIME: f32 = 0.15;
pub const METER_BAR_WIDTH: f32 = 120.0;
pub const METER_BAR_HEIGHT: f32 = 8.0;
pub const METER_PULSE_TIME: f32 = 0.3;

// =============================================================================
// FILES
// =============================================================================

pub const LEVELS_FILE: &str = "assets/levels.txt";
