//! Enemies - kind table, patrol and culling

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::player::{Body, Velocity};

/// Enemy variety. Each kind patrols at its own speed and is worth its own score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Walker,
    Lurker,
    Dasher,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Walker, EnemyKind::Lurker, EnemyKind::Dasher];

    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Walker => "walker",
            EnemyKind::Lurker => "lurker",
            EnemyKind::Dasher => "dasher",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// Patrol speed in px/s
    pub fn speed(&self) -> f32 {
        match self {
            EnemyKind::Walker => 60.0,
            EnemyKind::Lurker => 80.0,
            EnemyKind::Dasher => 100.0,
        }
    }

    /// Points awarded when defeated
    pub fn score(&self) -> u32 {
        match self {
            EnemyKind::Walker => 200,
            EnemyKind::Lurker => 300,
            EnemyKind::Dasher => 150,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            EnemyKind::Walker => Color::srgb(0.55, 0.55, 0.6),
            EnemyKind::Lurker => Color::srgb(0.53, 0.8, 1.0),
            EnemyKind::Dasher => Color::srgb(1.0, 0.53, 0.8),
        }
    }
}

/// Patrolling enemy. Turns around at the patrol bounds.
#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub patrol_left: f32,
    pub patrol_right: f32,
}

/// Velocity after applying the patrol bounds at position `x`
pub fn patrol_velocity(x: f32, vx: f32, enemy: &Enemy) -> f32 {
    let speed = enemy.kind.speed();
    if x <= enemy.patrol_left {
        speed
    } else if x >= enemy.patrol_right {
        -speed
    } else {
        vx
    }
}

/// Spawn one enemy standing on the ground at `x`, walking left
pub fn spawn_enemy(commands: &mut Commands, enemy: Enemy, x: f32) -> Entity {
    let speed = enemy.kind.speed();
    let color = enemy.kind.color();
    commands
        .spawn((
            Sprite::from_color(color, ENEMY_SIZE),
            Transform::from_xyz(x, GROUND_TOP + ENEMY_HITBOX.y / 2.0, 1.0),
            enemy,
            Body::new(ENEMY_HITBOX),
            Velocity(Vec2::new(-speed, 0.0)),
            crate::world::LevelEntity,
        ))
        .id()
}

/// Reverse enemies at their patrol bounds and face them toward travel
pub fn patrol_enemies(mut enemies: Query<(&Enemy, &Transform, &mut Velocity, &mut Sprite, &Body)>) {
    for (enemy, transform, mut velocity, mut sprite, body) in &mut enemies {
        if !body.enabled {
            continue;
        }
        velocity.0.x = patrol_velocity(transform.translation.x, velocity.0.x, enemy);
        sprite.flip_x = velocity.0.x > 0.0;
    }
}

/// Remove enemies that fell out of the world
pub fn cull_fallen_enemies(mut commands: Commands, enemies: Query<(Entity, &Transform), With<Enemy>>) {
    for (entity, transform) in &enemies {
        if transform.translation.y < ENEMY_CULL_Y {
            debug!("Enemy fell out of the world at x={:.0}", transform.translation.x);
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker() -> Enemy {
        Enemy { kind: EnemyKind::Walker, patrol_left: 100.0, patrol_right: 300.0 }
    }

    #[test]
    fn test_kind_table() {
        assert_eq!(EnemyKind::Walker.speed(), 60.0);
        assert_eq!(EnemyKind::Lurker.score(), 300);
        assert_eq!(EnemyKind::Dasher.speed(), 100.0);
        assert_eq!(EnemyKind::from_name("DASHER"), Some(EnemyKind::Dasher));
        assert_eq!(EnemyKind::from_name("ghost"), None);
    }

    #[test]
    fn test_patrol_turns_at_bounds() {
        let enemy = walker();
        assert_eq!(patrol_velocity(99.0, -60.0, &enemy), 60.0);
        assert_eq!(patrol_velocity(301.0, 60.0, &enemy), -60.0);
        assert_eq!(patrol_velocity(200.0, -60.0, &enemy), -60.0);
        assert_eq!(patrol_velocity(200.0, 60.0, &enemy), 60.0);
    }
}
