//! Visual effects: score popups, sparkles, screen flash, rumble ring and shake
//!
//! Gameplay pushes `Effect`s onto the queue; the game drains it each frame.
//! Headless runs simply clear it, so gameplay never depends on presentation.

use bevy::prelude::*;
use rand::Rng;

use crate::camera::CameraShake;
use crate::constants::*;
use crate::textures::GameTextures;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Floating text that rises and fades
    Popup { at: Vec2, text: String, color: Color, duration: f32 },
    /// Burst of sparkles in random directions
    Sparkles { at: Vec2, count: u32 },
    Shake { duration: f32, intensity: f32 },
    /// White full-screen flash
    Flash,
    /// Expanding rumble shockwave
    Ring { at: Vec2 },
}

#[derive(Resource, Default, Debug)]
pub struct EffectQueue(Vec<Effect>);

impl EffectQueue {
    pub fn push(&mut self, effect: Effect) {
        self.0.push(effect);
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Effect> {
        self.0.drain(..)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[derive(Component)]
pub struct Popup {
    pub start_y: f32,
    pub elapsed: f32,
    pub duration: f32,
}

#[derive(Component)]
pub struct Sparkle {
    pub velocity: Vec2,
    pub age: f32,
}

#[derive(Component)]
pub struct ScreenFlash {
    pub elapsed: f32,
}

#[derive(Component)]
pub struct RumbleRing {
    pub elapsed: f32,
}

/// Fraction of an effect's life remaining, clamped to [0, 1]
pub fn life_left(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    (1.0 - elapsed / duration).clamp(0.0, 1.0)
}

/// Ring radius at `elapsed`, growing linearly from the start radius to the rumble radius
pub fn ring_radius(elapsed: f32) -> f32 {
    let t = (elapsed / RUMBLE_RING_DURATION).clamp(0.0, 1.0);
    RUMBLE_RING_START + (RUMBLE_RADIUS - RUMBLE_RING_START) * t
}

fn textured(image: Option<Handle<Image>>, color: Color, size: Vec2) -> Sprite {
    match image {
        Some(image) => Sprite { image, color, custom_size: Some(size), ..default() },
        None => Sprite::from_color(color, size),
    }
}

/// Turn queued effects into entities
pub fn spawn_effects(
    mut commands: Commands,
    mut queue: ResMut<EffectQueue>,
    mut shake: ResMut<CameraShake>,
    textures: Option<Res<GameTextures>>,
) {
    if queue.is_empty() {
        return;
    }
    let mut rng = rand::thread_rng();

    for effect in queue.drain() {
        match effect {
            Effect::Popup { at, text, color, duration } => {
                commands.spawn((
                    Text2d::new(text),
                    TextFont { font_size: 16.0, ..default() },
                    TextColor(color),
                    Transform::from_xyz(at.x, at.y, 30.0),
                    Popup { start_y: at.y, elapsed: 0.0, duration },
                ));
            }
            Effect::Sparkles { at, count } => {
                for _ in 0..count {
                    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                    let speed = rng.gen_range(SPARKLE_SPEED_MIN..=SPARKLE_SPEED_MAX);
                    commands.spawn((
                        textured(textures.as_ref().map(|t| t.star.clone()), SPARKLE_COLOR, Vec2::splat(8.0)),
                        Transform::from_xyz(at.x, at.y, 25.0),
                        Sparkle { velocity: Vec2::from_angle(angle) * speed, age: 0.0 },
                    ));
                }
            }
            Effect::Shake { duration, intensity } => shake.start(duration, intensity),
            Effect::Flash => {
                commands.spawn((
                    Node {
                        position_type: PositionType::Absolute,
                        width: Val::Percent(100.0),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(1.0, 1.0, 1.0, FLASH_ALPHA)),
                    GlobalZIndex(50),
                    ScreenFlash { elapsed: 0.0 },
                ));
            }
            Effect::Ring { at } => {
                let size = Vec2::splat(RUMBLE_RING_START * 2.0);
                commands.spawn((
                    textured(textures.as_ref().map(|t| t.ring.clone()), RING_COLOR, size),
                    Transform::from_xyz(at.x, at.y, 20.0),
                    RumbleRing { elapsed: 0.0 },
                ));
            }
        }
    }
}

pub fn animate_popups(
    mut commands: Commands,
    time: Res<Time>,
    mut popups: Query<(Entity, &mut Popup, &mut Transform, &mut TextColor)>,
) {
    for (entity, mut popup, mut transform, mut color) in &mut popups {
        popup.elapsed += time.delta_secs();
        let left = life_left(popup.elapsed, popup.duration);
        if left <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }
        transform.translation.y = popup.start_y + POPUP_RISE * (1.0 - left);
        color.0.set_alpha(left);
    }
}

pub fn animate_sparkles(
    mut commands: Commands,
    time: Res<Time>,
    mut sparkles: Query<(Entity, &mut Sparkle, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (entity, mut sparkle, mut transform) in &mut sparkles {
        sparkle.age += dt;
        let left = life_left(sparkle.age, SPARKLE_LIFETIME);
        if left <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }
        sparkle.velocity.y -= SPARKLE_GRAVITY * dt;
        transform.translation.x += sparkle.velocity.x * dt;
        transform.translation.y += sparkle.velocity.y * dt;
        transform.scale = Vec3::splat(left);
    }
}

pub fn animate_flash(
    mut commands: Commands,
    time: Res<Time>,
    mut flashes: Query<(Entity, &mut ScreenFlash, &mut BackgroundColor)>,
) {
    for (entity, mut flash, mut background) in &mut flashes {
        flash.elapsed += time.delta_secs();
        let left = life_left(flash.elapsed, FLASH_TIME);
        if left <= 0.0 {
            commands.entity(entity).despawn();
        } else {
            background.0.set_alpha(FLASH_ALPHA * left);
        }
    }
}

pub fn animate_rings(
    mut commands: Commands,
    time: Res<Time>,
    mut rings: Query<(Entity, &mut RumbleRing, &mut Sprite)>,
) {
    for (entity, mut ring, mut sprite) in &mut rings {
        ring.elapsed += time.delta_secs();
        let left = life_left(ring.elapsed, RUMBLE_RING_DURATION);
        if left <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }
        sprite.custom_size = Some(Vec2::splat(ring_radius(ring.elapsed) * 2.0));
        sprite.color.set_alpha(left);
    }
}

/// Headless apps have nothing to draw effects with
pub fn discard_effects(mut queue: ResMut<EffectQueue>) {
    queue.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_life_left() {
        assert_eq!(life_left(0.0, 0.6), 1.0);
        assert!((life_left(0.3, 0.6) - 0.5).abs() < 1e-6);
        assert_eq!(life_left(1.0, 0.6), 0.0);
        assert_eq!(life_left(0.1, 0.0), 0.0);
    }

    #[test]
    fn test_ring_grows_to_rumble_radius() {
        assert_eq!(ring_radius(0.0), RUMBLE_RING_START);
        assert_eq!(ring_radius(RUMBLE_RING_DURATION), RUMBLE_RADIUS);
        assert_eq!(ring_radius(10.0), RUMBLE_RADIUS);
    }

    #[test]
    fn test_queue_drain() {
        let mut queue = EffectQueue::default();
        queue.push(Effect::Flash);
        queue.push(Effect::Ring { at: Vec2::ZERO });
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain().count(), 2);
        assert!(queue.is_empty());
    }
}
