//! Physics tweak panel UI components and systems (F1)

use bevy::prelude::*;

use crate::tuning::{GAMEPLAY_TUNING_FILE, GameplayTuning, PhysicsTweaks, save_gameplay_tuning_to_file};

/// Panel visibility and the selected row
#[derive(Resource, Default)]
pub struct TweakPanelState {
    pub visible: bool,
    pub selected: usize,
}

/// Tweak panel container component
#[derive(Component)]
pub struct TweakPanel;

/// Tweak row component with index
#[derive(Component)]
pub struct TweakRow(pub usize);

/// Spawn the hidden panel, one text row per tunable value
pub fn spawn_tweak_panel(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(10.0),
                top: Val::Px(40.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(8.0)),
                row_gap: Val::Px(2.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.75)),
            Visibility::Hidden,
            GlobalZIndex(20),
            TweakPanel,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("TUNING  (arrows, R/Shift+R reset, S save)"),
                TextFont { font_size: 12.0, ..default() },
                TextColor(Color::srgb(0.7, 0.7, 0.7)),
            ));
            for i in 0..GameplayTuning::LABELS.len() {
                parent.spawn((
                    Text::new(""),
                    TextFont { font_size: 14.0, ..default() },
                    TextColor(Color::WHITE),
                    TweakRow(i),
                ));
            }
        });
}

/// Move the selection by `delta` rows, wrapping at both ends
fn cycle(selected: usize, delta: isize, rows: usize) -> usize {
    (selected as isize + delta).rem_euclid(rows as isize) as usize
}

/// Nudge a value by one step of its default, never below 0.01
fn nudge(tweaks: &mut PhysicsTweaks, idx: usize, direction: f32) {
    let value = tweaks.get_value(idx) + direction * GameplayTuning::step(idx);
    tweaks.set_value(idx, value.max(0.01));
}

/// F1 shows the panel; while shown, arrows select and adjust, R resets, S saves
pub fn toggle_tweak_panel(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<TweakPanelState>,
    mut tweaks: ResMut<PhysicsTweaks>,
    mut panel_query: Query<&mut Visibility, With<TweakPanel>>,
) {
    if keyboard.just_pressed(KeyCode::F1) {
        state.visible = !state.visible;
        if let Ok(mut visibility) = panel_query.single_mut() {
            visibility.set_if_neq(if state.visible { Visibility::Inherited } else { Visibility::Hidden });
        }
    }
    if !state.visible {
        return;
    }

    let rows = GameplayTuning::LABELS.len();
    if keyboard.just_pressed(KeyCode::ArrowUp) {
        state.selected = cycle(state.selected, -1, rows);
    }
    if keyboard.just_pressed(KeyCode::ArrowDown) {
        state.selected = cycle(state.selected, 1, rows);
    }

    let idx = state.selected;
    if keyboard.just_pressed(KeyCode::ArrowLeft) {
        nudge(&mut tweaks, idx, -1.0);
    }
    if keyboard.just_pressed(KeyCode::ArrowRight) {
        nudge(&mut tweaks, idx, 1.0);
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
            tweaks.reset_all();
        } else {
            tweaks.reset_value(idx);
        }
    }

    if keyboard.just_pressed(KeyCode::KeyS) {
        if let Err(e) = save_gameplay_tuning_to_file(GAMEPLAY_TUNING_FILE, &tweaks) {
            warn!("Tuning not saved: {}", e);
        } else {
            info!("Tuning written to {}", GAMEPLAY_TUNING_FILE);
        }
    }
}

/// Refresh row text and highlight
pub fn update_tweak_panel(
    state: Res<TweakPanelState>,
    tweaks: Res<PhysicsTweaks>,
    mut row_query: Query<(&mut Text, &mut TextColor, &TweakRow)>,
) {
    if !state.visible {
        return;
    }

    for (mut text, mut color, row) in &mut row_query {
        text.0 = format!("{}: {}", GameplayTuning::LABELS[row.0], tweaks.format_value(row.0));

        color.0 = if row.0 == state.selected {
            Color::srgb(1.0, 1.0, 0.0)
        } else if tweaks.is_modified(row.0) {
            Color::srgb(1.0, 0.4, 0.4)
        } else {
            Color::WHITE
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_wraps() {
        assert_eq!(cycle(0, -1, 5), 4);
        assert_eq!(cycle(4, 1, 5), 0);
        assert_eq!(cycle(2, 1, 5), 3);
    }

    #[test]
    fn test_nudge_moves_by_step_and_floors() {
        let mut tweaks = PhysicsTweaks::default();
        let before = tweaks.get_value(0);
        nudge(&mut tweaks, 0, 1.0);
        assert!((tweaks.get_value(0) - (before + GameplayTuning::step(0))).abs() < 1e-3);
        assert!(tweaks.is_modified(0));

        for _ in 0..100 {
            nudge(&mut tweaks, 0, -1.0);
        }
        assert!(tweaks.get_value(0) >= 0.01);
    }
}
