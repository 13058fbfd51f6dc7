//! Scene flow: Boot -> Menu -> Playing, plus the end-of-run overlays

use bevy::prelude::*;

use crate::camera::{ScreenFade, spawn_fade};
use crate::collectibles::Bob;
use crate::constants::*;
use crate::effects::EffectQueue;
use crate::events::{EventBus, EventLogger, GameEvent};
use crate::helpers::bob_offset;
use crate::input::PlayerInput;
use crate::levels::{CurrentLevel, LevelDatabase, spawn_level};
use crate::powerups::PowerState;
use crate::run::{RunPhase, RunState};
use crate::settings::CurrentSettings;
use crate::textures::GameTextures;
use crate::world::LevelEntity;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Boot,
    Menu,
    Playing,
}

/// Everything owned by the menu scene
#[derive(Component)]
pub struct MenuEntity;

/// Text alpha pulse: 1 down to `1 - depth` and back, every `2 * half_period`
#[derive(Component)]
pub struct Blink {
    pub elapsed: f32,
    pub depth: f32,
    pub half_period: f32,
}

impl Blink {
    pub fn new(depth: f32, half_period: f32) -> Self {
        Self { elapsed: 0.0, depth, half_period }
    }

    pub fn alpha(&self) -> f32 {
        1.0 - bob_offset(self.elapsed, self.depth, self.half_period)
    }
}

/// Spins once per `period` seconds
#[derive(Component)]
pub struct Spin {
    pub period: f32,
}

/// Game over / victory panel; the backdrop fades in to `alpha`
#[derive(Component)]
pub struct EndOverlay {
    pub elapsed: f32,
    pub alpha: f32,
}

/// The menu has started its fade-out and ignores further presses
#[derive(Resource, Default)]
pub struct MenuExit(pub bool);

const BLINK_HALF_PERIOD: f32 = 0.6;
const PROMPT_BLINK_DEPTH: f32 = 0.7;
const PROMPT_BLINK_HALF_PERIOD: f32 = 0.5;
const OVERLAY_FADE_TIME: f32 = 0.5;
const VICTORY_BACKDROP: Color = Color::srgb(0.0, 0.0, 0.2);
const STAR_SPIN_PERIOD: f32 = 3.0;

// =============================================================================
// BOOT
// =============================================================================

pub fn load_levels(mut commands: Commands) {
    commands.insert_resource(LevelDatabase::load_from_file(LEVELS_FILE));
}

/// Open the event log when enabled and announce the session
pub fn start_event_session(settings: Res<CurrentSettings>, mut logger: ResMut<EventLogger>, mut bus: ResMut<EventBus>) {
    if !settings.settings.event_log {
        return;
    }
    if let Some(event) = logger.start_session() {
        bus.emit(event);
    }
}

pub fn finish_boot(mut next_state: ResMut<NextState<AppState>>) {
    next_state.set(AppState::Menu);
}

// =============================================================================
// MENU
// =============================================================================

fn title_text(text: &str, size: f32, color: Color, at: Vec3) -> impl Bundle {
    (
        Text2d::new(text),
        TextFont { font_size: size, ..default() },
        TextColor(color),
        Transform::from_translation(at),
        MenuEntity,
    )
}

pub fn spawn_menu(
    mut commands: Commands,
    textures: Option<Res<GameTextures>>,
    mut exit: ResMut<MenuExit>,
    mut input: ResMut<PlayerInput>,
) {
    exit.0 = false;
    *input = PlayerInput::default();
    let cx = SCREEN_WIDTH / 2.0;

    commands.spawn((
        Sprite::from_color(GROUND_COLOR, Vec2::new(SCREEN_WIDTH, GROUND_TOP)),
        Transform::from_xyz(cx, GROUND_TOP / 2.0, 0.0),
        MenuEntity,
    ));
    commands.spawn((
        Sprite::from_color(GRASS_COLOR, Vec2::new(SCREEN_WIDTH, GRASS_HEIGHT)),
        Transform::from_xyz(cx, GROUND_TOP - GRASS_HEIGHT / 2.0, 0.1),
        MenuEntity,
    ));

    let title_y = level_to_world_y(150.0);
    commands.spawn(title_text("BRICKRUN", 64.0, TEXT_SHADOW, Vec3::new(cx + 4.0, title_y - 4.0, 1.0)));
    commands.spawn(title_text("BRICKRUN", 64.0, TEXT_ACCENT, Vec3::new(cx, title_y, 1.1)));
    commands.spawn(title_text("RUN. JUMP. STOMP.", 20.0, TEXT_PRIMARY, Vec3::new(cx, title_y - 56.0, 1.0)));
    commands.spawn((
        title_text("PRESS ANY BUTTON TO PLAY", 18.0, TEXT_PRIMARY, Vec3::new(cx, level_to_world_y(380.0), 1.0)),
        Blink::new(0.8, BLINK_HALF_PERIOD),
    ));

    let player_y = GROUND_TOP + PLAYER_SIZE.y / 2.0 + 8.0;
    commands.spawn((
        Sprite::from_color(PLAYER_COLOR, PLAYER_SIZE),
        Transform::from_xyz(cx, player_y, 2.0),
        Bob::new(player_y, 8.0, 0.8),
        MenuEntity,
    ));

    for x in [cx - 220.0, cx + 220.0] {
        let sprite = match &textures {
            Some(t) => Sprite { image: t.star.clone(), color: SPARKLE_COLOR, custom_size: Some(Vec2::splat(32.0)), ..default() },
            None => Sprite::from_color(SPARKLE_COLOR, Vec2::splat(20.0)),
        };
        commands.spawn((
            sprite,
            Transform::from_xyz(x, title_y, 1.0),
            Spin { period: STAR_SPIN_PERIOD },
            MenuEntity,
        ));
    }

    spawn_fade(&mut commands, 1.0, 0.0);
}

pub fn animate_menu(time: Res<Time>, mut spinners: Query<(&Spin, &mut Transform)>) {
    for (spin, mut transform) in &mut spinners {
        transform.rotate_z(std::f32::consts::TAU * time.delta_secs() / spin.period);
    }
}

/// Blinking prompts, in the menu and on the end overlays
pub fn animate_blinks(time: Res<Time>, mut blinkers: Query<(&mut Blink, &mut TextColor)>) {
    for (mut blink, mut color) in &mut blinkers {
        blink.elapsed += time.delta_secs();
        color.0.set_alpha(blink.alpha());
    }
}

/// Any key, click or button fades out, then the game starts
pub fn menu_input(
    mut commands: Commands,
    mut input: ResMut<PlayerInput>,
    mut exit: ResMut<MenuExit>,
    fades: Query<&ScreenFade>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if !exit.0 {
        if input.take_any() {
            exit.0 = true;
            spawn_fade(&mut commands, 0.0, 1.0);
        }
        return;
    }
    if fades.iter().any(|fade| fade.target == 1.0 && fade.done()) {
        next_state.set(AppState::Playing);
    }
}

pub fn despawn_menu(
    mut commands: Commands,
    menu: Query<Entity, With<MenuEntity>>,
    fades: Query<Entity, With<ScreenFade>>,
) {
    for entity in menu.iter().chain(fades.iter()) {
        commands.entity(entity).despawn();
    }
}

// =============================================================================
// GAME
// =============================================================================

/// Fresh run on the selected level
#[allow(clippy::too_many_arguments)]
pub fn enter_game(
    mut commands: Commands,
    settings: Res<CurrentSettings>,
    level_db: Res<LevelDatabase>,
    current_level: Res<CurrentLevel>,
    textures: Option<Res<GameTextures>>,
    mut run: ResMut<RunState>,
    mut power: ResMut<PowerState>,
    mut input: ResMut<PlayerInput>,
    mut effects: ResMut<EffectQueue>,
    mut bus: ResMut<EventBus>,
) {
    *run = RunState::new(settings.settings.starting_lives.max(1));
    *power = PowerState::default();
    *input = PlayerInput::default();
    effects.clear();

    let index = current_level.index(level_db.len());
    let Some(level) = level_db.get(index) else {
        error!("No level to play");
        return;
    };
    spawn_level(&mut commands, level, textures.as_deref());
    run.level_active = true;
    info!("Starting level {} '{}'", index + 1, level.name);
    bus.emit(GameEvent::RunStart { level: index as u32 + 1, level_name: level.name.clone() });

    spawn_fade(&mut commands, 1.0, 0.0);
}

pub fn exit_game(
    mut commands: Commands,
    mut run: ResMut<RunState>,
    leftovers: Query<Entity, Or<(With<LevelEntity>, With<EndOverlay>, With<ScreenFade>)>>,
) {
    run.level_active = false;
    for entity in &leftovers {
        commands.entity(entity).despawn();
    }
}

/// Backdrop and text of an end-of-run panel. The last line is the blinking prompt.
struct OverlayLayout {
    backdrop: Color,
    alpha: f32,
    lines: Vec<(String, f32, Color)>,
}

fn overlay_layout(phase: RunPhase, score: u32, rumble: u32) -> Option<OverlayLayout> {
    match phase {
        RunPhase::GameOver => Some(OverlayLayout {
            backdrop: Color::BLACK,
            alpha: 0.7,
            lines: vec![
                ("GAME OVER".to_string(), 48.0, ENEMY_POPUP_COLOR),
                (format!("FINAL SCORE: {}", score), 22.0, TEXT_ACCENT),
                ("PRESS SPACE TO TRY AGAIN".to_string(), 18.0, TEXT_PRIMARY),
            ],
        }),
        RunPhase::Victory => Some(OverlayLayout {
            backdrop: VICTORY_BACKDROP,
            alpha: 0.6,
            lines: vec![
                ("LEVEL COMPLETE!".to_string(), 42.0, TEXT_ACCENT),
                (format!("SCORE: {}", score), 26.0, TEXT_PRIMARY),
                (format!("RUMBLE: {}", rumble), 20.0, TEXT_ACCENT),
                ("PRESS SPACE FOR MENU".to_string(), 18.0, TEXT_PRIMARY),
            ],
        }),
        _ => None,
    }
}

/// Put up the game over / victory panel once the run has ended
pub fn show_end_overlay(
    mut commands: Commands,
    run: Res<RunState>,
    mut input: ResMut<PlayerInput>,
    overlays: Query<(), With<EndOverlay>>,
) {
    if !overlays.is_empty() {
        return;
    }
    let Some(layout) = overlay_layout(run.phase, run.score, run.rumble) else {
        return;
    };
    // Presses made before the panel appeared must not dismiss it
    input.any_pressed = false;

    let prompt = layout.lines.len() - 1;
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(14.0),
                ..default()
            },
            BackgroundColor(layout.backdrop.with_alpha(0.0)),
            GlobalZIndex(50),
            EndOverlay { elapsed: 0.0, alpha: layout.alpha },
        ))
        .with_children(|parent| {
            for (i, (line, size, color)) in layout.lines.into_iter().enumerate() {
                let mut text = parent.spawn((
                    Text::new(line),
                    TextFont { font_size: size, ..default() },
                    TextColor(color),
                    TextShadow { offset: Vec2::splat(2.0), color: TEXT_SHADOW },
                ));
                if i == prompt {
                    text.insert(Blink::new(PROMPT_BLINK_DEPTH, PROMPT_BLINK_HALF_PERIOD));
                }
            }
        });
}

pub fn fade_in_end_overlay(time: Res<Time>, mut overlays: Query<(&mut EndOverlay, &mut BackgroundColor)>) {
    for (mut overlay, mut background) in &mut overlays {
        overlay.elapsed += time.delta_secs();
        let t = (overlay.elapsed / OVERLAY_FADE_TIME).min(1.0);
        background.0.set_alpha(overlay.alpha * t);
    }
}

pub fn leave_end_overlay(
    mut input: ResMut<PlayerInput>,
    overlays: Query<(), With<EndOverlay>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if !overlays.is_empty() && input.take_any() {
        next_state.set(AppState::Menu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(layout: &OverlayLayout) -> Vec<&str> {
        layout.lines.iter().map(|(text, _, _)| text.as_str()).collect()
    }

    #[test]
    fn test_overlay_only_for_finished_runs() {
        assert!(overlay_layout(RunPhase::Playing, 10, 0).is_none());
        assert!(overlay_layout(RunPhase::Dying { elapsed: 1.0 }, 10, 0).is_none());

        let game_over = overlay_layout(RunPhase::GameOver, 1250, 7).unwrap();
        assert_eq!(texts(&game_over), vec!["GAME OVER", "FINAL SCORE: 1250", "PRESS SPACE TO TRY AGAIN"]);
        assert_eq!(game_over.alpha, 0.7);
        assert_eq!(game_over.backdrop, Color::BLACK);

        let victory = overlay_layout(RunPhase::Victory, 3000, 12).unwrap();
        assert_eq!(
            texts(&victory),
            vec!["LEVEL COMPLETE!", "SCORE: 3000", "RUMBLE: 12", "PRESS SPACE FOR MENU"]
        );
        assert_eq!(victory.alpha, 0.6);
        assert_eq!(victory.backdrop, VICTORY_BACKDROP);
    }

    #[test]
    fn test_prompt_blink_dips_and_recovers() {
        let mut blink = Blink::new(PROMPT_BLINK_DEPTH, PROMPT_BLINK_HALF_PERIOD);
        assert_eq!(blink.alpha(), 1.0);
        blink.elapsed = PROMPT_BLINK_HALF_PERIOD;
        assert!((blink.alpha() - 0.3).abs() < 1e-4);
        blink.elapsed = 2.0 * PROMPT_BLINK_HALF_PERIOD;
        assert!((blink.alpha() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_end_overlay_fades_in() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(std::time::Duration::from_millis(100)))
            .add_systems(Update, fade_in_end_overlay);
        let panel = app
            .world_mut()
            .spawn((EndOverlay { elapsed: 0.0, alpha: 0.7 }, BackgroundColor(Color::BLACK.with_alpha(0.0))))
            .id();
        for _ in 0..3 {
            app.update();
        }
        let alpha = app.world().get::<BackgroundColor>(panel).map(|b| b.0.alpha()).unwrap_or(0.0);
        assert!(alpha > 0.0 && alpha < 0.7, "partial fade, got {}", alpha);
        for _ in 0..10 {
            app.update();
        }
        let alpha = app.world().get::<BackgroundColor>(panel).map(|b| b.0.alpha()).unwrap_or(0.0);
        assert!((alpha - 0.7).abs() < 1e-4);
    }
}
