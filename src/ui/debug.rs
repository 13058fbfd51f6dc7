//! Debug overlay (F3): player physics state and the active power

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::player::{CoyoteTimer, Grounded, JumpBuffer, Player, Velocity};
use crate::powerups::PowerState;
use crate::run::RunState;
use crate::settings::CurrentSettings;

/// Debug text component
#[derive(Component)]
pub struct DebugText;

fn visibility_for(show: bool) -> Visibility {
    if show { Visibility::Inherited } else { Visibility::Hidden }
}

pub fn spawn_debug_text(mut commands: Commands, settings: Res<CurrentSettings>) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            bottom: Val::Px(10.0),
            ..default()
        },
        Text::new(""),
        TextFont { font_size: 12.0, ..default() },
        TextColor(Color::srgb(0.95, 0.95, 0.6)),
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
        GlobalZIndex(30),
        visibility_for(settings.settings.show_debug),
        DebugText,
    ));
}

/// F3 flips the overlay and remembers the choice in settings
pub fn toggle_debug(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut settings: ResMut<CurrentSettings>,
    mut texts: Query<&mut Visibility, With<DebugText>>,
) {
    if !keyboard.just_pressed(KeyCode::F3) {
        return;
    }
    settings.settings.show_debug = !settings.settings.show_debug;
    settings.mark_dirty();
    if let Ok(mut visibility) = texts.single_mut() {
        *visibility = visibility_for(settings.settings.show_debug);
    }
}

pub fn update_debug_text(
    settings: Res<CurrentSettings>,
    diagnostics: Res<DiagnosticsStore>,
    run: Res<RunState>,
    power: Res<PowerState>,
    players: Query<(&Transform, &Velocity, &Grounded, &CoyoteTimer, &JumpBuffer), With<Player>>,
    mut texts: Query<&mut Text, With<DebugText>>,
) {
    if !settings.settings.show_debug {
        return;
    }
    let Ok(mut text) = texts.single_mut() else {
        return;
    };

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or(0.0);

    text.0 = match players.single() {
        Ok((transform, velocity, grounded, coyote, buffer)) => format!(
            "pos {:.0},{:.0}  vel {:.0},{:.0}  grounded {}\ncoyote {:.3}  buffer {:.3}  power {}  phase {}  fps {:.0}",
            transform.translation.x,
            transform.translation.y,
            velocity.0.x,
            velocity.0.y,
            grounded.0,
            coyote.0,
            buffer.0,
            power.active.map_or("none", |kind| kind.name()),
            run.phase.name(),
            fps,
        ),
        Err(_) => format!("no player  fps {:.0}", fps),
    };
}
