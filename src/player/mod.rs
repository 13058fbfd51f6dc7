//! Player module - components, movement controller and body physics

mod components;
mod physics;

pub use components::*;
pub use physics::*;

use bevy::prelude::*;

use crate::constants::*;
use crate::world::LevelEntity;

/// Spawn the player at `position` with a fresh movement state
pub fn spawn_player(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            Sprite::from_color(PLAYER_COLOR, PLAYER_SIZE),
            Transform::from_xyz(position.x, position.y, 5.0),
            (Player, Body::new(PLAYER_HITBOX), LevelEntity),
            (
                CoyoteTimer::default(),
                JumpBuffer::default(),
                JumpState::default(),
                Facing::default(),
                PlayerPose::default(),
            ),
        ))
        .id()
}

/// Presentation: squash the placeholder sprite per pose
pub fn animate_player_pose(mut players: Query<(&PlayerPose, &mut Sprite), With<Player>>) {
    for (pose, mut sprite) in &mut players {
        let size = match pose.pose {
            Pose::Idle => PLAYER_SIZE,
            Pose::Run if pose.run_frame == 0 => Vec2::new(PLAYER_SIZE.x + 2.0, PLAYER_SIZE.y - 2.0),
            Pose::Run => Vec2::new(PLAYER_SIZE.x - 2.0, PLAYER_SIZE.y),
            Pose::Jump => Vec2::new(PLAYER_SIZE.x - 4.0, PLAYER_SIZE.y + 3.0),
            Pose::Blast => Vec2::new(PLAYER_SIZE.x + 4.0, PLAYER_SIZE.y),
            Pose::Dead => Vec2::new(PLAYER_SIZE.y, PLAYER_SIZE.x),
        };
        sprite.custom_size = Some(size);
    }
}
