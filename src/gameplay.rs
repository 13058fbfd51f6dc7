//! Gameplay plugin - the fixed-order simulation chain
//!
//! Shared by the windowed game (FixedUpdate) and the headless scenario
//! runner, so both step exactly the same systems in the same order.

use bevy::ecs::schedule::{InternedScheduleLabel, ScheduleLabel};
use bevy::prelude::*;

use crate::combat;
use crate::effects::EffectQueue;
use crate::enemies;
use crate::events::{EventBus, update_event_bus_time};
use crate::input::{PlayerInput, clear_input_edges};
use crate::levels::{CurrentLevel, LevelDatabase};
use crate::player;
use crate::powerups::{self, PowerState};
use crate::run::{self, RunState, level_active, run_playing};
use crate::collectibles;
use crate::tuning::PhysicsTweaks;
use crate::ui::TweakPanelState;

/// Every gameplay system lives in this set
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameplaySet;

pub struct GameplayPlugin {
    pub schedule: InternedScheduleLabel,
}

impl GameplayPlugin {
    pub fn new(schedule: impl ScheduleLabel) -> Self {
        Self { schedule: schedule.intern() }
    }
}

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .init_resource::<RunState>()
            .init_resource::<PowerState>()
            .init_resource::<EventBus>()
            .init_resource::<EffectQueue>()
            .init_resource::<PhysicsTweaks>()
            .init_resource::<LevelDatabase>()
            .init_resource::<CurrentLevel>()
            .init_resource::<TweakPanelState>()
            .add_systems(self.schedule, update_event_bus_time.before(GameplaySet))
            .add_systems(
                self.schedule,
                (
                    // Timers and player intent
                    (
                        player::record_previous_positions,
                        run::tick_run_timers,
                        powerups::tick_power_timers.run_if(run_playing),
                        player::apply_input.run_if(run_playing),
                        combat::trigger_rumble.run_if(run_playing),
                        powerups::fire_shouts.run_if(run_playing),
                        enemies::patrol_enemies,
                    )
                        .chain(),
                    // Physics
                    (
                        player::apply_gravity,
                        player::apply_velocity,
                        player::check_collisions,
                        powerups::move_shouts,
                    )
                        .chain(),
                    // Interactions
                    (
                        powerups::shouts_hit_enemies,
                        combat::resolve_enemy_contacts.run_if(run_playing),
                        collectibles::collect_food.run_if(run_playing),
                        powerups::collect_powerups.run_if(run_playing),
                        run::check_fall_death.run_if(run_playing),
                        run::check_flag_reached.run_if(run_playing),
                    )
                        .chain(),
                    // Scripted flows and cleanup
                    (
                        run::advance_death_sequence,
                        run::advance_win_sequence,
                        enemies::cull_fallen_enemies,
                        clear_input_edges,
                    )
                        .chain(),
                )
                    .chain()
                    .in_set(GameplaySet)
                    .run_if(level_active),
            );
    }
}
