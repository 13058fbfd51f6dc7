//! Player vs enemy resolution and the rumble shockwave

use bevy::prelude::*;

use crate::constants::*;
use crate::effects::{Effect, EffectQueue};
use crate::enemies::{Enemy, EnemyKind};
use crate::events::{DeathCause, DefeatCause, EventBus, GameEvent};
use crate::helpers::aabb_overlap;
use crate::input::PlayerInput;
use crate::player::{Body, Player, PreviousPosition, Velocity};
use crate::powerups::PowerState;
use crate::run::{RunState, kill_player};
use crate::tuning::PhysicsTweaks;

/// Outcome of the player touching an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Shield up: the enemy just pops
    Invincible,
    Stomp,
    Hurt,
}

/// Decide what a player/enemy overlap means.
///
/// A stomp needs the player falling and their feet, as of the start of the
/// tick, at or above the enemy's center.
pub fn classify_contact(invincible: bool, player_vy: f32, prev_feet_y: f32, enemy_center_y: f32) -> Contact {
    if invincible {
        Contact::Invincible
    } else if player_vy < 0.0 && prev_feet_y >= enemy_center_y {
        Contact::Stomp
    } else {
        Contact::Hurt
    }
}

/// Indices of the enemies within `radius` of `center` (Euclidean)
pub fn enemies_in_radius(center: Vec2, enemies: &[Vec2], radius: f32) -> Vec<usize> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, pos)| pos.distance(center) <= radius)
        .map(|(i, _)| i)
        .collect()
}

/// Score an enemy, show its popup, despawn it and report it
#[allow(clippy::too_many_arguments)]
pub fn defeat_enemy(
    commands: &mut Commands,
    run: &mut RunState,
    bus: &mut EventBus,
    effects: &mut EffectQueue,
    entity: Entity,
    kind: EnemyKind,
    at: Vec2,
    cause: DefeatCause,
) {
    let points = kind.score();
    run.score += points;
    effects.push(Effect::Popup {
        at,
        text: format!("+{}", points),
        color: ENEMY_POPUP_COLOR,
        duration: POPUP_TIME,
    });
    commands.entity(entity).despawn();
    bus.emit(GameEvent::EnemyDefeated { kind, points, cause });
}

#[allow(clippy::too_many_arguments)]
pub fn resolve_enemy_contacts(
    mut commands: Commands,
    tweaks: Res<PhysicsTweaks>,
    power: Res<PowerState>,
    mut run: ResMut<RunState>,
    mut bus: ResMut<EventBus>,
    mut effects: ResMut<EffectQueue>,
    mut players: Query<(&Transform, &PreviousPosition, &mut Velocity, &mut Body), With<Player>>,
    mut enemies: Query<(Entity, &Transform, &Enemy, &mut Body), Without<Player>>,
) {
    let Ok((player_transform, previous, mut velocity, mut player_body)) = players.single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let player_half = player_body.half();
    let prev_feet = previous.0.y - player_half.y;
    // A bounce off the first stomp must not turn a second overlap into a hit
    let approach_vy = velocity.0.y;

    for (entity, transform, enemy, mut enemy_body) in &mut enemies {
        if !run.is_playing() {
            return;
        }
        if !enemy_body.enabled {
            continue;
        }
        let enemy_pos = transform.translation.truncate();
        if aabb_overlap(player_pos, player_half, enemy_pos, enemy_body.half()).is_none() {
            continue;
        }

        match classify_contact(power.invincible, approach_vy, prev_feet, enemy_pos.y) {
            Contact::Invincible => {
                defeat_enemy(&mut commands, &mut run, &mut bus, &mut effects, entity, enemy.kind, enemy_pos, DefeatCause::Shield);
            }
            Contact::Stomp => {
                // Disable at once so the same enemy can't be hit twice
                enemy_body.enabled = false;
                velocity.0.y = tweaks.stomp_bounce;
                defeat_enemy(&mut commands, &mut run, &mut bus, &mut effects, entity, enemy.kind, enemy_pos, DefeatCause::Stomp);
            }
            Contact::Hurt => {
                kill_player(&mut run, &mut bus, &mut player_body, &mut velocity, DeathCause::Enemy);
            }
        }
    }
}

/// X: spend a full meter to freeze in place and blow away nearby enemies
#[allow(clippy::too_many_arguments)]
pub fn trigger_rumble(
    mut commands: Commands,
    input: Res<PlayerInput>,
    mut run: ResMut<RunState>,
    mut bus: ResMut<EventBus>,
    mut effects: ResMut<EffectQueue>,
    mut players: Query<(&Transform, &mut Velocity), With<Player>>,
    enemies: Query<(Entity, &Transform, &Enemy, &Body), Without<Player>>,
) {
    if !input.rumble_pressed || !run.try_rumble() {
        return;
    }
    let Ok((player_transform, mut velocity)) = players.single_mut() else {
        return;
    };
    velocity.0 = Vec2::ZERO;
    let center = player_transform.translation.truncate();

    effects.push(Effect::Shake { duration: RUMBLE_SHAKE_DURATION, intensity: RUMBLE_SHAKE_INTENSITY });
    effects.push(Effect::Ring { at: center });

    let live: Vec<_> = enemies
        .iter()
        .filter(|(_, _, _, body)| body.enabled)
        .map(|(entity, transform, enemy, _)| (entity, transform.translation.truncate(), enemy.kind))
        .collect();
    let positions: Vec<Vec2> = live.iter().map(|(_, pos, _)| *pos).collect();
    let hits = enemies_in_radius(center, &positions, RUMBLE_RADIUS);

    for &i in &hits {
        let (entity, pos, kind) = live[i];
        defeat_enemy(&mut commands, &mut run, &mut bus, &mut effects, entity, kind, pos, DefeatCause::Rumble);
    }
    info!("Rumble! {} enemies defeated", hits.len());
    bus.emit(GameEvent::Rumble { defeated: hits.len() as u32 });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stomp_needs_falling_and_feet_above_center() {
        assert_eq!(classify_contact(false, -120.0, 50.0, 40.0), Contact::Stomp);
        assert_eq!(classify_contact(false, -120.0, 40.0, 40.0), Contact::Stomp);
        assert_eq!(classify_contact(false, -120.0, 30.0, 40.0), Contact::Hurt);
        // Rising into an enemy from above still hurts
        assert_eq!(classify_contact(false, 50.0, 60.0, 40.0), Contact::Hurt);
    }

    #[test]
    fn test_shield_wins_over_everything() {
        assert_eq!(classify_contact(true, 50.0, 0.0, 40.0), Contact::Invincible);
        assert_eq!(classify_contact(true, -50.0, 60.0, 40.0), Contact::Invincible);
    }

    #[test]
    fn test_rumble_radius_is_euclidean() {
        let enemies = [
            Vec2::new(349.0, 0.0),
            Vec2::new(250.0, 250.0), // ~353.6 away
            Vec2::new(-200.0, 100.0),
            Vec2::new(0.0, -351.0),
        ];
        assert_eq!(enemies_in_radius(Vec2::ZERO, &enemies, RUMBLE_RADIUS), vec![0, 2]);
    }
}
