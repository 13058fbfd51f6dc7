//! Camera follow, screen shake, parallax backdrop and screen fades

use bevy::camera::ScalingMode;
use bevy::prelude::*;
use rand::Rng;

use crate::constants::*;
use crate::helpers::move_toward;
use crate::player::Player;
use crate::textures::GameTextures;

/// Marker for the main gameplay camera
#[derive(Component)]
pub struct MainCamera;

/// Camera-relative background layer. `factor` 0 is glued to the camera.
#[derive(Component)]
pub struct ParallaxLayer {
    pub factor: f32,
    /// Horizontal slot in the repeating strip (0 or 1)
    pub slot: f32,
}

/// Remaining shake time and strength (fraction of the view size)
#[derive(Resource, Default, Debug)]
pub struct CameraShake {
    pub remaining: f32,
    pub intensity: f32,
    /// Offset applied on the last frame
    pub offset: Vec2,
}

impl CameraShake {
    pub fn start(&mut self, duration: f32, intensity: f32) {
        self.remaining = duration;
        self.intensity = intensity;
    }
}

/// Full-screen black overlay fading between two alphas
#[derive(Component, Debug)]
pub struct ScreenFade {
    pub alpha: f32,
    pub target: f32,
}

impl ScreenFade {
    pub fn done(&self) -> bool {
        self.alpha == self.target
    }
}

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::from_xyz(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0, 0.0),
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: SCREEN_HEIGHT,
            },
            ..OrthographicProjection::default_2d()
        }),
        MainCamera,
    ));
}

/// Keep the camera x inside the world
pub fn clamp_camera_x(x: f32) -> f32 {
    x.clamp(SCREEN_WIDTH / 2.0, WORLD_WIDTH - SCREEN_WIDTH / 2.0)
}

/// Next camera x: hold while the player is inside the dead-zone, otherwise
/// ease toward the dead-zone edge. A player more than a screen away (respawn)
/// snaps the camera instead.
pub fn follow_target(cam_x: f32, player_x: f32, dt: f32) -> f32 {
    if (player_x - cam_x).abs() > SCREEN_WIDTH {
        return clamp_camera_x(player_x);
    }
    let half = CAMERA_DEADZONE.x / 2.0;
    let target = if player_x > cam_x + half {
        player_x - half
    } else if player_x < cam_x - half {
        player_x + half
    } else {
        cam_x
    };
    // Per-tick lerp factor at 60 Hz, scaled to the real frame time
    let t = 1.0 - (1.0 - CAMERA_LERP).powf(dt * 60.0);
    clamp_camera_x(cam_x + (target - cam_x) * t)
}

/// Left edge of the repeating strip for a layer scrolling at `factor`
pub fn parallax_offset(cam_x: f32, factor: f32) -> f32 {
    let left = cam_x - SCREEN_WIDTH / 2.0;
    left - (left * factor).rem_euclid(SCREEN_WIDTH)
}

pub fn follow_player(
    time: Res<Time>,
    mut shake: ResMut<CameraShake>,
    players: Query<&Transform, (With<Player>, Without<MainCamera>)>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut camera) = cameras.single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    // Last frame's shake offset is not part of the follow state
    let base_x = clamp_camera_x(camera.translation.x - shake.offset.x);
    let base_x = match players.single() {
        Ok(player) => follow_target(base_x, player.translation.x, dt),
        Err(_) => base_x,
    };

    let mut offset = Vec2::ZERO;
    if shake.remaining > 0.0 {
        shake.remaining = (shake.remaining - dt).max(0.0);
        let mut rng = rand::thread_rng();
        let amount = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT) * shake.intensity;
        offset = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)) * amount;
    }
    shake.offset = offset;

    camera.translation.x = base_x + offset.x;
    camera.translation.y = SCREEN_HEIGHT / 2.0 + offset.y;
}

/// Put the camera back at the level start (menu, new run)
pub fn reset_camera(mut shake: ResMut<CameraShake>, mut cameras: Query<&mut Transform, With<MainCamera>>) {
    *shake = CameraShake::default();
    if let Ok(mut camera) = cameras.single_mut() {
        camera.translation.x = SCREEN_WIDTH / 2.0;
        camera.translation.y = SCREEN_HEIGHT / 2.0;
    }
}

/// Sky plus two hill layers, two screen-wide slots each so the strip can wrap
pub fn spawn_backdrop(mut commands: Commands, textures: Option<Res<GameTextures>>) {
    commands.spawn((
        Sprite::from_color(SKY_COLOR, Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT)),
        Transform::from_xyz(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0, -30.0),
        ParallaxLayer { factor: 0.0, slot: 0.0 },
    ));

    let layers = [
        (FAR_HILL_SCROLL, FAR_HILL_COLOR, 260.0, -20.0),
        (NEAR_HILL_SCROLL, NEAR_HILL_COLOR, 170.0, -10.0),
    ];
    for (factor, color, radius, z) in layers {
        for slot in [0.0, 1.0] {
            commands
                .spawn((
                    Transform::from_xyz(0.0, 0.0, z),
                    Visibility::default(),
                    ParallaxLayer { factor, slot },
                ))
                .with_children(|parent| {
                    // Three overlapping humps per screen, tiling at the slot edges
                    for (i, scale) in [1.0, 0.75, 0.9].into_iter().enumerate() {
                        let size = Vec2::splat(radius * 2.0 * scale);
                        let x = SCREEN_WIDTH * (i as f32) / 3.0 + SCREEN_WIDTH / 6.0;
                        let sprite = match &textures {
                            Some(t) => Sprite { image: t.disc.clone(), color, custom_size: Some(size), ..default() },
                            None => Sprite::from_color(color, Vec2::new(size.x, size.y / 2.0)),
                        };
                        parent.spawn((sprite, Transform::from_xyz(x, GROUND_TOP - radius * 0.2, 0.0)));
                    }
                });
        }
    }
}

pub fn update_parallax(
    cameras: Query<&Transform, (With<MainCamera>, Without<ParallaxLayer>)>,
    mut layers: Query<(&ParallaxLayer, &mut Transform)>,
) {
    let Ok(camera) = cameras.single() else {
        return;
    };
    let cam_x = camera.translation.x;
    for (layer, mut transform) in &mut layers {
        if layer.factor == 0.0 {
            transform.translation.x = cam_x;
        } else {
            transform.translation.x = parallax_offset(cam_x, layer.factor) + layer.slot * SCREEN_WIDTH;
        }
    }
}

/// Spawn a black overlay fading from `from` to `to`
pub fn spawn_fade(commands: &mut Commands, from: f32, to: f32) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, from)),
        GlobalZIndex(100),
        ScreenFade { alpha: from, target: to },
    ));
}

pub fn animate_fades(
    mut commands: Commands,
    time: Res<Time>,
    mut fades: Query<(Entity, &mut ScreenFade, &mut BackgroundColor)>,
) {
    let step = time.delta_secs() / FADE_TIME;
    for (entity, mut fade, mut background) in &mut fades {
        fade.alpha = move_toward(fade.alpha, fade.target, step);
        background.0.set_alpha(fade.alpha);
        // Finished fade-ins go away; finished fade-outs stay up until the scene changes
        if fade.done() && fade.target == 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_deadzone_holds_camera() {
        assert_eq!(follow_target(1000.0, 1040.0, DT), 1000.0);
        assert_eq!(follow_target(1000.0, 960.0, DT), 1000.0);
    }

    #[test]
    fn test_follow_lerps_toward_deadzone_edge() {
        // Player 100px right of center: edge target is 1050, 8% of the way per tick
        let x = follow_target(1000.0, 1100.0, DT);
        assert!((x - 1004.0).abs() < 1e-3);
    }

    #[test]
    fn test_follow_clamps_to_world() {
        assert_eq!(follow_target(400.0, 100.0, DT), 400.0);
        assert_eq!(follow_target(12400.0, 12790.0, DT), 12400.0);
    }

    #[test]
    fn test_follow_snaps_after_respawn() {
        assert_eq!(follow_target(9000.0, 80.0, DT), 400.0);
    }

    #[test]
    fn test_parallax_wraps() {
        // At the world start every layer begins at the left edge
        assert_eq!(parallax_offset(400.0, 0.15), 0.0);
        let offset = parallax_offset(4400.0, 0.5);
        let left = 4000.0;
        assert!(offset <= left && offset > left - SCREEN_WIDTH);
        assert_eq!(left - offset, (left * 0.5_f32).rem_euclid(SCREEN_WIDTH));
    }
}
