//! Test execution engine
//!
//! Builds a headless app around `GameplayPlugin`, steps it one 1/60 s tick per
//! update, feeds scripted input and records every bus event with its frame.

use bevy::app::{TaskPoolOptions, TaskPoolPlugin};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use crate::collectibles::Food;
use crate::effects::discard_effects;
use crate::enemies::Enemy;
use crate::events::EventBus;
use crate::gameplay::{GameplayPlugin, GameplaySet};
use crate::input::PlayerInput;
use crate::levels::{CurrentLevel, LevelDatabase, spawn_level};
use crate::player::{Grounded, Player, Velocity};
use crate::powerups::{PowerKind, PowerState};
use crate::run::RunState;
use crate::tuning::{self, PhysicsTweaks};

use super::TEST_LEVELS_FILE;
use super::assertions::{AssertionError, CapturedEvent, PlayerState, WorldState, check_sequence, check_state};
use super::input::ScriptedInputs;
use super::parser::{TestDefinition, TestSetup};

/// One simulation tick
const TICK: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Frames simulated when a test sets neither input nor state checks
const DEFAULT_FRAMES: u64 = 60;

/// Result of running a test
#[derive(Debug)]
pub enum TestResult {
    Pass { frames: u64 },
    Fail { error: AssertionError },
    Error { message: String },
}

/// Frame of the tick currently being simulated
#[derive(Resource, Default)]
struct TestClock {
    frame: u64,
}

/// Events seen so far
#[derive(Resource, Default)]
struct EventCapture {
    events: Vec<CapturedEvent>,
}

/// Run-level overrides applied once the level exists
#[derive(Resource)]
struct SetupOverrides {
    setup: TestSetup,
    power: Option<PowerKind>,
}

/// Find a level by exact name, or case-insensitively with underscores for spaces
pub fn find_level(level_db: &LevelDatabase, name: &str) -> Option<usize> {
    level_db.index_of(name).or_else(|| {
        level_db
            .levels
            .iter()
            .position(|l| l.name.to_lowercase().replace(' ', "_") == name.to_lowercase())
    })
}

/// Run a single test and return the result
pub fn run_test(test: &TestDefinition) -> TestResult {
    let level_db = LevelDatabase::load_from_file(TEST_LEVELS_FILE);

    let Some(level_idx) = find_level(&level_db, &test.setup.level) else {
        return TestResult::Error {
            message: format!(
                "Level '{}' not found. Available: {:?}",
                test.setup.level,
                level_db.levels.iter().map(|l| &l.name).collect::<Vec<_>>()
            ),
        };
    };

    let power = match test.setup.power.as_deref() {
        None | Some("none") => None,
        Some(name) => match PowerKind::from_name(name) {
            Some(kind) => Some(kind),
            None => {
                return TestResult::Error { message: format!("Unknown power '{}'", name) };
            }
        },
    };

    // Create scripted inputs
    let mut scripted = ScriptedInputs::from_inputs(&test.input);
    for state in &test.expect.state {
        scripted.set_max_frame(state.after_frame);
    }
    if scripted.max_frame == 0 {
        scripted.max_frame = DEFAULT_FRAMES;
    }

    // Headless app: the gameplay chain runs once per update at a fixed 1/60 s.
    // One task thread per app keeps parallel runs under OS thread limits.
    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(TaskPoolPlugin {
        task_pool_options: TaskPoolOptions::with_num_threads(1),
    }))
        .add_plugins(bevy::transform::TransformPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(TICK))
        .add_plugins(GameplayPlugin::new(Update));

    let _ = tuning::apply_global_tuning(&mut app.world_mut().resource_mut::<PhysicsTweaks>());

    app.insert_resource(level_db)
        .insert_resource(CurrentLevel(level_idx as u32 + 1))
        .insert_resource(scripted)
        .insert_resource(SetupOverrides { setup: test.setup.clone(), power })
        .init_resource::<TestClock>()
        .init_resource::<EventCapture>()
        .add_systems(Startup, test_setup)
        .add_systems(PostStartup, apply_overrides)
        .add_systems(Update, input_injection.before(GameplaySet))
        .add_systems(Update, (event_capture, discard_effects).after(GameplaySet));

    // Frame 0 also runs Startup, so it may be a zero-length tick
    let mut state_checks: Vec<_> = test.expect.state.iter().collect();
    state_checks.sort_by_key(|s| s.after_frame);
    let mut next_check = 0;

    while app.world().resource::<ScriptedInputs>().should_continue() {
        app.update();
        let frame = app.world().resource::<TestClock>().frame;

        while next_check < state_checks.len() && state_checks[next_check].after_frame <= frame {
            let world_state = extract_world_state(app.world_mut());
            if let Err(error) = check_state(state_checks[next_check], &world_state) {
                return TestResult::Fail { error };
            }
            next_check += 1;
        }
    }

    let world = app.world();
    let final_frame = world.resource::<TestClock>().frame;
    let captured = &world.resource::<EventCapture>().events;

    if let Err(error) = check_sequence(&test.expect.sequence, captured) {
        return TestResult::Fail { error };
    }

    TestResult::Pass { frames: final_frame }
}

/// Build the selected level and start a run on it
fn test_setup(
    mut commands: Commands,
    level_db: Res<LevelDatabase>,
    current_level: Res<CurrentLevel>,
    mut run: ResMut<RunState>,
) {
    if let Some(level) = level_db.get(current_level.index(level_db.len())) {
        spawn_level(&mut commands, level, None);
        run.level_active = true;
    }
}

fn apply_overrides(
    overrides: Res<SetupOverrides>,
    mut run: ResMut<RunState>,
    mut power: ResMut<PowerState>,
    mut players: Query<&mut Transform, With<Player>>,
) {
    let setup = &overrides.setup;
    if let Some(lives) = setup.lives {
        run.lives = lives;
    }
    run.rumble = setup.rumble;
    run.rumble_ready = run.rumble >= crate::constants::RUMBLE_COST;
    if let Some(kind) = overrides.power {
        power.collect(kind);
    }
    if let Some(start) = setup.player
        && let Ok(mut transform) = players.single_mut()
    {
        transform.translation.x = start.x;
        transform.translation.y = start.y;
    }
}

/// System to inject scripted inputs
fn input_injection(mut scripted: ResMut<ScriptedInputs>, mut clock: ResMut<TestClock>, mut input: ResMut<PlayerInput>) {
    clock.frame = scripted.current_frame;
    scripted.advance_frame().apply_to(&mut input);
}

/// Move this tick's bus events into the capture, stamped with the frame
fn event_capture(clock: Res<TestClock>, mut bus: ResMut<EventBus>, mut capture: ResMut<EventCapture>) {
    for bus_event in bus.drain() {
        capture.events.push(CapturedEvent::from_game_event(clock.frame, &bus_event.event));
    }
    bus.clear_processed();
}

/// Extract world state for assertions
fn extract_world_state(world: &mut World) -> WorldState {
    let mut player_query = world.query_filtered::<(&Transform, &Velocity, &Grounded), With<Player>>();
    let player = player_query.iter(world).next().map(|(transform, velocity, grounded)| PlayerState {
        x: transform.translation.x,
        y: transform.translation.y,
        velocity_x: velocity.0.x,
        velocity_y: velocity.0.y,
        grounded: grounded.0,
    });

    let enemies = world.query_filtered::<(), With<Enemy>>().iter(world).count();
    let food = world.query_filtered::<(), With<Food>>().iter(world).count();

    let run = world.resource::<RunState>();
    let power = world.resource::<PowerState>();

    WorldState {
        player,
        score: run.score,
        lives: run.lives,
        rumble: run.rumble,
        power: power.active.map(|kind| kind.name().to_string()),
        phase: run.phase.name().to_string(),
        enemies,
        food,
    }
}
