//! Level spawning - turns a LevelData into entities

use bevy::prelude::*;

use crate::collectibles::spawn_food;
use crate::constants::*;
use crate::enemies::{Enemy, spawn_enemy};
use crate::levels::database::LevelData;
use crate::player::spawn_player;
use crate::powerups::{spawn_powerup, spawn_shield_bubble};
use crate::textures::GameTextures;
use crate::world::{spawn_flag, spawn_ground, spawn_platform};

/// Spawn platforms, pickups, enemies, the flag and the player for one level.
/// Everything is tagged `LevelEntity` so a rebuild can despawn it wholesale.
pub fn spawn_level(commands: &mut Commands, level: &LevelData, textures: Option<&GameTextures>) {
    for &(start, end) in &level.ground {
        spawn_ground(commands, start, end);
    }
    for platform in &level.platforms {
        spawn_platform(commands, platform.tile_x, platform.y, platform.width_tiles);
    }
    for (index, food) in level.food.iter().enumerate() {
        spawn_food(commands, food.kind, food.x, food.y, index);
    }
    for powerup in &level.powerups {
        spawn_powerup(commands, powerup.kind, powerup.x, powerup.y);
    }
    for enemy in &level.enemies {
        spawn_enemy(
            commands,
            Enemy {
                kind: enemy.kind,
                patrol_left: enemy.patrol_left,
                patrol_right: enemy.patrol_right,
            },
            enemy.x,
        );
    }
    spawn_flag(commands, level.flag_x);
    spawn_player(commands, PLAYER_SPAWN);
    spawn_shield_bubble(commands, textures);

    debug!(
        "Spawned level '{}': {} ground spans, {} platforms, {} food, {} enemies, {} power-ups",
        level.name,
        level.ground.len(),
        level.platforms.len(),
        level.food.len(),
        level.enemies.len(),
        level.powerups.len()
    );
}
