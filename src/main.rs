//! Brickrun - a side-scrolling platformer built with Bevy
//!
//! Main entry point: app setup and system registration.

use brickrun::{
    AppState, CameraShake, ConfigWatcher, CurrentLevel, CurrentSettings, EventLogger, GameplayPlugin, camera,
    collectibles, config_watcher, constants::*, effects, events, input, player, powerups, run, save_settings_system,
    scenes, textures, tuning, ui,
};
use bevy::{diagnostic::FrameTimeDiagnosticsPlugin, prelude::*};

fn main() {
    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();

    // Check for --level <num> override (1-indexed)
    let level_override = args
        .iter()
        .position(|a| a == "--level")
        .and_then(|i| args.get(i + 1).and_then(|s| s.parse::<u32>().ok()));

    // Load persistent settings (uses defaults if file doesn't exist)
    let current_settings = CurrentSettings::default();

    // Save settings on first run to ensure file exists
    if let Err(e) = current_settings.settings.save() {
        warn!("Failed to save initial settings: {}", e);
    }

    // Use command-line level override if provided, otherwise use saved settings
    let loaded_level = level_override.unwrap_or(current_settings.settings.level);

    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    // Set scale_factor_override to 1.0 for consistent behavior on HiDPI displays
                    resolution: bevy::window::WindowResolution::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32)
                        .with_scale_factor_override(1.0),
                    title: "Brickrun".into(),
                    resizable: false,
                    ..default()
                }),
                ..default()
            }),
            FrameTimeDiagnosticsPlugin::default(),
            GameplayPlugin::new(FixedUpdate),
        ))
        .init_state::<AppState>()
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .insert_resource(ClearColor(SKY_COLOR))
        .insert_resource(current_settings)
        .insert_resource(CurrentLevel(loaded_level))
        .init_resource::<CameraShake>()
        .init_resource::<ConfigWatcher>()
        .init_resource::<EventLogger>()
        .init_resource::<scenes::MenuExit>()
        .add_systems(
            Startup,
            (camera::spawn_camera, tuning::load_global_tuning_system, ui::spawn_tweak_panel, ui::spawn_debug_text),
        )
        // Boot: textures, level data and the event session, then straight to the menu
        .add_systems(
            OnEnter(AppState::Boot),
            (
                textures::generate_textures,
                scenes::load_levels,
                scenes::start_event_session,
                camera::spawn_backdrop,
                scenes::finish_boot,
            )
                .chain(),
        )
        .add_systems(OnEnter(AppState::Menu), (camera::reset_camera, scenes::spawn_menu).chain())
        .add_systems(OnExit(AppState::Menu), scenes::despawn_menu)
        .add_systems(
            OnEnter(AppState::Playing),
            (camera::reset_camera, scenes::enter_game, ui::spawn_hud).chain(),
        )
        .add_systems(OnExit(AppState::Playing), (scenes::exit_game, ui::despawn_hud))
        // Input first so every consumer this frame sees fresh edges
        .add_systems(Update, input::capture_input)
        .add_systems(
            Update,
            (scenes::animate_menu, scenes::menu_input)
                .after(input::capture_input)
                .run_if(in_state(AppState::Menu)),
        )
        .add_systems(
            Update,
            (
                (scenes::show_end_overlay, scenes::fade_in_end_overlay, scenes::leave_end_overlay).chain(),
                camera::follow_player,
                player::animate_player_pose,
                powerups::update_power_visuals,
                ui::update_hud_texts,
                ui::update_rumble_meter,
            )
                .after(input::capture_input)
                .run_if(in_state(AppState::Playing)),
        )
        // Presentation that runs in every scene
        .add_systems(
            Update,
            (
                collectibles::animate_bob,
                scenes::animate_blinks,
                (camera::update_parallax, camera::animate_fades).after(camera::follow_player),
                (
                    effects::spawn_effects,
                    effects::animate_popups,
                    effects::animate_sparkles,
                    effects::animate_flash,
                    effects::animate_rings,
                )
                    .chain(),
            ),
        )
        // Debug, tuning and config upkeep
        .add_systems(
            Update,
            (
                ui::toggle_debug,
                ui::update_debug_text,
                ui::toggle_tweak_panel,
                ui::update_tweak_panel,
                config_watcher::check_config_changes,
                save_settings_system,
            ),
        )
        // Event bus drains after gameplay and scenes have emitted
        .add_systems(Last, events::process_bus_events)
        .run();
}
