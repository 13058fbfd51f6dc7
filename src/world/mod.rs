//! World components for ground, brick platforms and the goal flag

use bevy::prelude::*;

use crate::constants::*;

/// Marker for collidable entities
#[derive(Component, Default)]
pub struct Collider;

/// Solid box the bodies collide against
#[derive(Component)]
#[require(Collider)]
pub struct Platform {
    pub size: Vec2,
}

/// Marks everything that belongs to the current level build (despawned on rebuild)
#[derive(Component, Default)]
pub struct LevelEntity;

/// Goal flag; touching it completes the level
#[derive(Component)]
pub struct Flag;

/// World-space center and size of a solid ground span (inclusive tile range)
pub fn ground_rect(start_tile: u32, end_tile: u32) -> (Vec2, Vec2) {
    let left = start_tile as f32 * TILE;
    let right = (end_tile as f32 + 1.0) * TILE;
    let size = Vec2::new(right - left, TILE);
    let center = Vec2::new((left + right) / 2.0, GROUND_TOP - TILE / 2.0);
    (center, size)
}

/// World-space center and size of a brick row whose top edge sits at level-space `y`
pub fn platform_rect(tile_x: u32, y: f32, width_tiles: u32) -> (Vec2, Vec2) {
    let left = tile_x as f32 * TILE;
    let size = Vec2::new(width_tiles as f32 * TILE, TILE);
    let center = Vec2::new(left + size.x / 2.0, level_to_world_y(y) - TILE / 2.0);
    (center, size)
}

// ============================================================================
// Level geometry spawning (shared between main game and test runner)
// ============================================================================

/// Spawn one ground span plus its grass strip
pub fn spawn_ground(commands: &mut Commands, start_tile: u32, end_tile: u32) {
    let (center, size) = ground_rect(start_tile, end_tile);
    commands.spawn((
        Sprite::from_color(GROUND_COLOR, size),
        Transform::from_xyz(center.x, center.y, 0.0),
        Platform { size },
        LevelEntity,
    ));
    commands.spawn((
        Sprite::from_color(GRASS_COLOR, Vec2::new(size.x, GRASS_HEIGHT)),
        Transform::from_xyz(center.x, GROUND_TOP - GRASS_HEIGHT / 2.0, 0.1),
        LevelEntity,
    ));
}

/// Spawn a solid brick platform
pub fn spawn_platform(commands: &mut Commands, tile_x: u32, y: f32, width_tiles: u32) {
    let (center, size) = platform_rect(tile_x, y, width_tiles);
    commands.spawn((
        Sprite::from_color(BRICK_COLOR, size),
        Transform::from_xyz(center.x, center.y, 0.0),
        Platform { size },
        LevelEntity,
    ));
}

/// Spawn the goal flag: a pole with cloth, standing on the ground at `x`
pub fn spawn_flag(commands: &mut Commands, x: f32) {
    commands
        .spawn((
            Sprite::from_color(FLAG_POLE_COLOR, Vec2::new(6.0, FLAG_HITBOX.y)),
            Transform::from_xyz(x, FLAG_CENTER_Y, 0.5),
            Flag,
            LevelEntity,
        ))
        .with_children(|parent| {
            parent.spawn((
                Sprite::from_color(FLAG_CLOTH_COLOR, Vec2::new(36.0, 24.0)),
                Transform::from_xyz(21.0, FLAG_HITBOX.y / 2.0 - 16.0, 0.1),
            ));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_rect_covers_inclusive_tiles() {
        let (center, size) = ground_rect(0, 27);
        assert_eq!(size, Vec2::new(28.0 * TILE, TILE));
        assert_eq!(center.x, 14.0 * TILE);
        assert_eq!(center.y + size.y / 2.0, GROUND_TOP);
    }

    #[test]
    fn test_platform_top_edge_matches_level_y() {
        let (center, size) = platform_rect(14, 368.0, 4);
        assert_eq!(center.x - size.x / 2.0, 14.0 * TILE);
        assert_eq!(center.y + size.y / 2.0, level_to_world_y(368.0));
    }

    #[test]
    fn test_flag_floats_just_above_ground() {
        assert_eq!(FLAG_CENTER_Y, 112.0);
        let bottom = FLAG_CENTER_Y - FLAG_HITBOX.y / 2.0;
        assert_eq!(bottom - GROUND_TOP, 10.0);
    }
}
