//! HUD: score, lives, rumble meter and the active power

use bevy::prelude::*;
use std::f32::consts::PI;

use crate::constants::*;
use crate::powerups::PowerState;
use crate::run::RunState;

/// Root of the HUD tree, despawned with the level
#[derive(Component)]
pub struct Hud;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudText {
    Score,
    Lives,
    Rumble,
    Power,
}

/// Inner node of the rumble bar
#[derive(Component)]
pub struct RumbleFill;

/// Meter fullness in 0..=1
pub fn meter_pct(rumble: u32) -> f32 {
    (rumble as f32 / RUMBLE_COST as f32).min(1.0)
}

/// Fill width in pixels, leaving a 1px border inside the 120px bar
pub fn meter_fill_width(pct: f32) -> f32 {
    ((METER_BAR_WIDTH - 2.0) * pct).floor()
}

/// Green to yellow over the first half, yellow to red over the second
pub fn meter_rgb(pct: f32) -> [u8; 3] {
    if pct < 0.5 {
        let t = pct * 2.0;
        [
            (0x44 as f32 + (0xFF - 0x44) as f32 * t).floor() as u8,
            0xCC,
            (0x44 as f32 * (1.0 - t)).floor() as u8,
        ]
    } else {
        let t = (pct - 0.5) * 2.0;
        [0xFF, (0xCC as f32 * (1.0 - t)).floor() as u8, 0]
    }
}

/// Alpha of a full meter: 1 -> 0.4 -> 1, one leg per pulse time
pub fn pulse_alpha(elapsed: f32) -> f32 {
    0.7 + 0.3 * (elapsed * PI / METER_PULSE_TIME).cos()
}

fn hud_text(parent: &mut ChildSpawnerCommands, kind: HudText, node: Node, color: Color) {
    parent.spawn((
        node,
        Text::new(""),
        TextFont { font_size: 18.0, ..default() },
        TextColor(color),
        TextShadow { offset: Vec2::splat(2.0), color: TEXT_SHADOW },
        kind,
    ));
}

pub fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            GlobalZIndex(10),
            Hud,
        ))
        .with_children(|parent| {
            let corner = |left: Option<f32>, right: Option<f32>, top: f32| Node {
                position_type: PositionType::Absolute,
                left: left.map_or(Val::Auto, Val::Px),
                right: right.map_or(Val::Auto, Val::Px),
                top: Val::Px(top),
                ..default()
            };
            hud_text(parent, HudText::Score, corner(Some(12.0), None, 10.0), TEXT_PRIMARY);
            hud_text(parent, HudText::Power, corner(Some(12.0), None, 36.0), TEXT_ACCENT);
            hud_text(parent, HudText::Lives, corner(None, Some(12.0), 10.0), TEXT_PRIMARY);

            // Rumble label over its bar, centered
            parent
                .spawn(Node {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    top: Val::Px(10.0),
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    row_gap: Val::Px(4.0),
                    ..default()
                })
                .with_children(|column| {
                    hud_text(column, HudText::Rumble, Node::default(), TEXT_PRIMARY);
                    column
                        .spawn((
                            Node {
                                width: Val::Px(METER_BAR_WIDTH),
                                height: Val::Px(METER_BAR_HEIGHT),
                                padding: UiRect::all(Val::Px(1.0)),
                                ..default()
                            },
                            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
                        ))
                        .with_child((
                            Node {
                                width: Val::Px(0.0),
                                height: Val::Percent(100.0),
                                ..default()
                            },
                            BackgroundColor(Color::NONE),
                            RumbleFill,
                        ));
                });
        });
}

pub fn update_hud_texts(run: Res<RunState>, power: Res<PowerState>, mut texts: Query<(&HudText, &mut Text)>) {
    if !run.is_changed() && !power.is_changed() {
        return;
    }
    for (kind, mut text) in &mut texts {
        text.0 = match kind {
            HudText::Score => format!("SCORE: {}", run.score),
            HudText::Lives => format!("LIVES: {}", run.lives),
            HudText::Rumble => format!("RUMBLE: {}", run.rumble),
            HudText::Power => power.hud_text(),
        };
    }
}

pub fn update_rumble_meter(
    time: Res<Time>,
    run: Res<RunState>,
    mut pulse: Local<f32>,
    mut fills: Query<(&mut Node, &mut BackgroundColor), With<RumbleFill>>,
) {
    let Ok((mut node, mut background)) = fills.single_mut() else {
        return;
    };
    let pct = meter_pct(run.rumble);
    let [r, g, b] = meter_rgb(pct);
    let mut color = Color::srgb_u8(r, g, b);

    if pct >= 1.0 {
        *pulse += time.delta_secs();
        color.set_alpha(pulse_alpha(*pulse));
    } else {
        *pulse = 0.0;
    }

    node.width = Val::Px(meter_fill_width(pct));
    background.0 = color;
}

pub fn despawn_hud(mut commands: Commands, huds: Query<Entity, With<Hud>>) {
    for entity in &huds {
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_fill_width() {
        assert_eq!(meter_fill_width(meter_pct(0)), 0.0);
        assert_eq!(meter_fill_width(meter_pct(25)), 59.0);
        assert_eq!(meter_fill_width(meter_pct(33)), 77.0);
        assert_eq!(meter_fill_width(meter_pct(50)), 118.0);
        assert_eq!(meter_fill_width(meter_pct(140)), 118.0);
    }

    #[test]
    fn test_meter_gradient_stops() {
        assert_eq!(meter_rgb(0.0), [0x44, 0xCC, 0x44]);
        assert_eq!(meter_rgb(0.5), [0xFF, 0xCC, 0x00]);
        assert_eq!(meter_rgb(1.0), [0xFF, 0x00, 0x00]);
        // Red only climbs in the first half, green only falls in the second
        let [r, g, _] = meter_rgb(0.3);
        assert!(r > 0x44 && r < 0xFF);
        assert_eq!(g, 0xCC);
        let [r, g, b] = meter_rgb(0.75);
        assert_eq!((r, b), (0xFF, 0));
        assert_eq!(g, 0x66);
    }

    #[test]
    fn test_meter_channels_truncate() {
        // 0x44 * 0.7 = 47.6 and 0xCC * 0.2 = 40.8
        assert_eq!(meter_rgb(0.15)[2], 47);
        assert_eq!(meter_rgb(0.9)[1], 40);
    }

    #[test]
    fn test_pulse_swings_between_full_and_dim() {
        assert!((pulse_alpha(0.0) - 1.0).abs() < 1e-5);
        assert!((pulse_alpha(METER_PULSE_TIME) - 0.4).abs() < 1e-5);
        assert!((pulse_alpha(METER_PULSE_TIME * 2.0) - 1.0).abs() < 1e-5);
    }
}
