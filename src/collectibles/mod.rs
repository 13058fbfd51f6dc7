//! Food pickups that fill the rumble meter

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::effects::{Effect, EffectQueue};
use crate::events::{EventBus, GameEvent};
use crate::helpers::{aabb_overlap, bob_offset};
use crate::player::{Body, Player};
use crate::run::RunState;
use crate::world::LevelEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodKind {
    Burger,
    Soda,
}

impl FoodKind {
    pub fn name(&self) -> &'static str {
        match self {
            FoodKind::Burger => "burger",
            FoodKind::Soda => "soda",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [FoodKind::Burger, FoodKind::Soda]
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// Rumble points; score is this times `SNACK_SCORE_MULTIPLIER`
    pub fn points(&self) -> u32 {
        match self {
            FoodKind::Burger => 2,
            FoodKind::Soda => 1,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            FoodKind::Burger => Color::srgb(0.8, 0.5, 0.2),
            FoodKind::Soda => Color::srgb(0.85, 0.15, 0.2),
        }
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Food {
    pub kind: FoodKind,
}

/// Yoyo bob around a resting height
#[derive(Component, Debug, Clone)]
pub struct Bob {
    pub base_y: f32,
    pub amplitude: f32,
    pub half_period: f32,
    pub elapsed: f32,
}

impl Bob {
    pub fn new(base_y: f32, amplitude: f32, half_period: f32) -> Self {
        Self { base_y, amplitude, half_period, elapsed: 0.0 }
    }
}

/// Half-period of the food bob, staggered so neighbours don't move in lockstep
pub fn food_bob_half_period(index: usize) -> f32 {
    0.8 + (index % 5) as f32 * 0.1
}

/// Spawn one food item at level-space (x, y)
pub fn spawn_food(commands: &mut Commands, kind: FoodKind, x: f32, y: f32, index: usize) {
    let world_y = level_to_world_y(y);
    commands.spawn((
        Sprite::from_color(kind.color(), FOOD_SIZE),
        Transform::from_xyz(x, world_y, 2.0),
        Food { kind },
        Bob::new(world_y, 6.0, food_bob_half_period(index)),
        LevelEntity,
    ));
}

pub fn animate_bob(time: Res<Time>, mut query: Query<(&mut Bob, &mut Transform)>) {
    for (mut bob, mut transform) in &mut query {
        bob.elapsed += time.delta_secs();
        transform.translation.y = bob.base_y + bob_offset(bob.elapsed, bob.amplitude, bob.half_period);
    }
}

/// Apply a food pickup to the run: rumble meter, score and readiness
pub fn eat(run: &mut RunState, kind: FoodKind) {
    run.rumble += kind.points();
    run.score += kind.points() * SNACK_SCORE_MULTIPLIER;
    run.rumble_ready = run.rumble >= RUMBLE_COST;
}

pub fn collect_food(
    mut commands: Commands,
    mut run: ResMut<RunState>,
    mut bus: ResMut<EventBus>,
    mut effects: ResMut<EffectQueue>,
    players: Query<(&Transform, &Body), With<Player>>,
    food: Query<(Entity, &Transform, &Food)>,
) {
    let Ok((player_transform, body)) = players.single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    for (entity, transform, item) in &food {
        let pos = transform.translation.truncate();
        if aabb_overlap(player_pos, body.half(), pos, FOOD_HITBOX / 2.0).is_none() {
            continue;
        }
        commands.entity(entity).despawn();
        eat(&mut run, item.kind);

        let points = item.kind.points();
        effects.push(Effect::Sparkles { at: pos, count: 8 });
        effects.push(Effect::Popup {
            at: pos,
            text: format!("+{}", points),
            color: FOOD_POPUP_COLOR,
            duration: POPUP_TIME,
        });
        bus.emit(GameEvent::FoodCollected { kind: item.kind, points, rumble: run.rumble });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_table() {
        assert_eq!(FoodKind::Burger.points(), 2);
        assert_eq!(FoodKind::Soda.points(), 1);
        assert_eq!(FoodKind::from_name("Soda"), Some(FoodKind::Soda));
        assert_eq!(FoodKind::from_name("pizza"), None);
    }

    #[test]
    fn test_eating_fills_meter() {
        let mut run = RunState::default();
        run.rumble = 48;
        eat(&mut run, FoodKind::Soda);
        assert_eq!(run.rumble, 49);
        assert!(!run.rumble_ready);
        eat(&mut run, FoodKind::Burger);
        assert_eq!(run.rumble, 51);
        assert_eq!(run.score, 150);
        assert!(run.rumble_ready);
    }

    #[test]
    fn test_bob_stagger() {
        assert_eq!(food_bob_half_period(0), 0.8);
        assert!((food_bob_half_period(7) - 1.0).abs() < 1e-6);
    }
}
