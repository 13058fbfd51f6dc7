//! Run state: score, lives, rumble meter and the scripted death/win flows

use bevy::prelude::*;

use crate::constants::*;
use crate::events::{DeathCause, EventBus, GameEvent};
use crate::helpers::{aabb_overlap, ease_sine_in};
use crate::levels::{CurrentLevel, LevelDatabase, spawn_level};
use crate::player::{Body, Player, PlayerPose, Pose, Velocity};
use crate::powerups::PowerState;
use crate::textures::GameTextures;
use crate::tuning::PhysicsTweaks;
use crate::world::{Flag, LevelEntity};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunPhase {
    Playing,
    /// Death animation; the level restarts or the run ends at `DEATH_RESTART_TIME`
    Dying { elapsed: f32 },
    /// Sliding down the flag pole
    Won { elapsed: f32, start_y: f32 },
    GameOver,
    Victory,
}

impl RunPhase {
    pub fn name(&self) -> &'static str {
        match self {
            RunPhase::Playing => "playing",
            RunPhase::Dying { .. } => "dying",
            RunPhase::Won { .. } => "won",
            RunPhase::GameOver => "gameover",
            RunPhase::Victory => "victory",
        }
    }
}

/// Everything that survives a respawn within one run
#[derive(Resource, Debug, Clone)]
pub struct RunState {
    pub score: u32,
    pub lives: u32,
    pub rumble: u32,
    pub rumble_ready: bool,
    pub phase: RunPhase,
    pub rumble_cooldown: f32,
    /// Seconds the player stays frozen after a rumble
    pub frozen_for: f32,
    /// A level is built and gameplay systems should run
    pub level_active: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(STARTING_LIVES)
    }
}

impl RunState {
    pub fn new(lives: u32) -> Self {
        Self {
            score: 0,
            lives,
            rumble: 0,
            rumble_ready: false,
            phase: RunPhase::Playing,
            rumble_cooldown: 0.0,
            frozen_for: 0.0,
            level_active: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == RunPhase::Playing
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_for > 0.0
    }

    /// Spend a full meter. Returns false when not ready or cooling down.
    pub fn try_rumble(&mut self) -> bool {
        if !self.is_playing() || !self.rumble_ready || self.rumble_cooldown > 0.0 {
            return false;
        }
        self.rumble = self.rumble.saturating_sub(RUMBLE_COST);
        self.rumble_ready = self.rumble >= RUMBLE_COST;
        self.frozen_for = RUMBLE_FREEZE;
        self.rumble_cooldown = RUMBLE_COOLDOWN;
        true
    }

    pub fn tick_timers(&mut self, dt: f32) {
        self.frozen_for = (self.frozen_for - dt).max(0.0);
        self.rumble_cooldown = (self.rumble_cooldown - dt).max(0.0);
    }

    /// Flag bonus: flat amount plus the leftover meter
    pub fn win_bonus(&self) -> u32 {
        FLAG_BONUS + self.rumble * SNACK_SCORE_MULTIPLIER
    }

    /// Reset per-attempt timers after a respawn; score, lives and rumble carry over
    pub fn restart_attempt(&mut self) {
        self.phase = RunPhase::Playing;
        self.frozen_for = 0.0;
        self.rumble_cooldown = 0.0;
        self.rumble_ready = self.rumble >= RUMBLE_COST;
    }
}

/// Run condition: a level is built
pub fn level_active(run: Res<RunState>) -> bool {
    run.level_active
}

/// Run condition: the player is in control
pub fn run_playing(run: Res<RunState>) -> bool {
    run.level_active && run.is_playing()
}

/// Start the death sequence. Ignored unless the run is in the Playing phase.
pub fn kill_player(
    run: &mut RunState,
    bus: &mut EventBus,
    body: &mut Body,
    velocity: &mut Velocity,
    cause: DeathCause,
) {
    if !run.is_playing() {
        return;
    }
    run.lives = run.lives.saturating_sub(1);
    run.phase = RunPhase::Dying { elapsed: 0.0 };
    run.frozen_for = 0.0;
    // The death float ignores platforms; advance_death_sequence moves the player
    body.enabled = false;
    velocity.0 = Vec2::new(0.0, DEATH_FLOAT_SPEED);
    info!("Player died ({}), {} lives left", cause.name(), run.lives);
    bus.emit(GameEvent::PlayerDied { lives_left: run.lives, cause });
}

pub fn tick_run_timers(time: Res<Time>, mut run: ResMut<RunState>) {
    run.tick_timers(time.delta_secs());
}

pub fn check_fall_death(
    mut run: ResMut<RunState>,
    mut bus: ResMut<EventBus>,
    mut players: Query<(&Transform, &mut Body, &mut Velocity), With<Player>>,
) {
    let Ok((transform, mut body, mut velocity)) = players.single_mut() else {
        return;
    };
    if transform.translation.y < PLAYER_DEATH_Y {
        kill_player(&mut run, &mut bus, &mut body, &mut velocity, DeathCause::Fall);
    }
}

pub fn check_flag_reached(
    mut run: ResMut<RunState>,
    mut bus: ResMut<EventBus>,
    mut players: Query<(&mut Transform, &mut Body, &mut Velocity), With<Player>>,
    flags: Query<&Transform, (With<Flag>, Without<Player>)>,
) {
    if !run.is_playing() {
        return;
    }
    let Ok((mut transform, mut body, mut velocity)) = players.single_mut() else {
        return;
    };
    let player_pos = transform.translation.truncate();
    let Some(flag) = flags
        .iter()
        .find(|flag| aabb_overlap(player_pos, body.half(), flag.translation.truncate(), FLAG_HITBOX / 2.0).is_some())
    else {
        return;
    };

    let bonus = run.win_bonus();
    run.score += bonus;
    run.frozen_for = 0.0;
    body.enabled = false;
    velocity.0 = Vec2::ZERO;
    transform.translation.x = flag.translation.x + FLAG_SLIDE_OFFSET_X;
    run.phase = RunPhase::Won { elapsed: 0.0, start_y: transform.translation.y };
    info!("Level complete! score {}", run.score);
    bus.emit(GameEvent::LevelComplete { score: run.score, bonus });
}

pub fn advance_win_sequence(
    time: Res<Time>,
    mut run: ResMut<RunState>,
    mut players: Query<&mut Transform, With<Player>>,
) {
    let RunPhase::Won { elapsed, start_y } = run.phase else {
        return;
    };
    let elapsed = elapsed + time.delta_secs();
    if let Ok(mut transform) = players.single_mut() {
        let t = ease_sine_in(elapsed / FLAG_SLIDE_TIME);
        transform.translation.y = start_y + (FLAG_SLIDE_END_Y - start_y) * t;
    }
    run.phase = if elapsed >= FLAG_SLIDE_TIME {
        RunPhase::Victory
    } else {
        RunPhase::Won { elapsed, start_y }
    };
}

/// Float up, fall, then either rebuild the level or end the run
#[allow(clippy::too_many_arguments)]
pub fn advance_death_sequence(
    mut commands: Commands,
    time: Res<Time>,
    tweaks: Res<PhysicsTweaks>,
    level_db: Res<LevelDatabase>,
    current_level: Res<CurrentLevel>,
    textures: Option<Res<GameTextures>>,
    mut run: ResMut<RunState>,
    mut power: ResMut<PowerState>,
    mut bus: ResMut<EventBus>,
    mut players: Query<(&mut Transform, &mut Velocity, &mut PlayerPose), With<Player>>,
    level_entities: Query<Entity, With<LevelEntity>>,
) {
    let RunPhase::Dying { elapsed } = run.phase else {
        return;
    };
    let dt = time.delta_secs();
    let now = elapsed + dt;

    if let Ok((mut transform, mut velocity, mut pose)) = players.single_mut() {
        pose.pose = Pose::Dead;
        if now < DEATH_FLOAT_TIME {
            velocity.0 = Vec2::new(0.0, DEATH_FLOAT_SPEED);
        } else {
            if elapsed < DEATH_FLOAT_TIME {
                velocity.0 = Vec2::ZERO;
            }
            velocity.0.y -= tweaks.gravity * dt;
        }
        transform.translation.y += velocity.0.y * dt;
    }

    if now < DEATH_RESTART_TIME {
        run.phase = RunPhase::Dying { elapsed: now };
        return;
    }

    if run.lives == 0 {
        run.phase = RunPhase::GameOver;
        info!("Game over, final score {}", run.score);
        bus.emit(GameEvent::GameOver { score: run.score });
        return;
    }

    for entity in &level_entities {
        commands.entity(entity).despawn();
    }
    *power = PowerState::default();
    run.restart_attempt();
    let index = current_level.index(level_db.len());
    if let Some(level) = level_db.get(index) {
        spawn_level(&mut commands, level, textures.as_deref());
        bus.emit(GameEvent::RunStart { level: index as u32 + 1, level_name: level.name.clone() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rumble_needs_full_meter_and_cooldown() {
        let mut run = RunState::new(3);
        run.rumble = 49;
        run.rumble_ready = false;
        assert!(!run.try_rumble());

        run.rumble = 103;
        run.rumble_ready = true;
        assert!(run.try_rumble());
        assert_eq!(run.rumble, 53);
        assert!(run.rumble_ready);
        assert!(run.is_frozen());
        assert!(!run.try_rumble());

        run.tick_timers(2.0);
        assert!(!run.is_frozen());
        assert!(!run.try_rumble());
        run.tick_timers(0.5);
        assert!(run.try_rumble());
        assert_eq!(run.rumble, 3);
        assert!(!run.rumble_ready);
    }

    #[test]
    fn test_kill_only_once() {
        let mut run = RunState::new(2);
        let mut bus = EventBus::new();
        let mut body = Body::new(PLAYER_HITBOX);
        let mut velocity = Velocity::default();

        kill_player(&mut run, &mut bus, &mut body, &mut velocity, DeathCause::Enemy);
        kill_player(&mut run, &mut bus, &mut body, &mut velocity, DeathCause::Fall);

        assert_eq!(run.lives, 1);
        assert!(!body.enabled);
        assert_eq!(velocity.0.y, DEATH_FLOAT_SPEED);
        assert_eq!(bus.peek().len(), 1);
        assert!(matches!(run.phase, RunPhase::Dying { .. }));
    }

    #[test]
    fn test_win_bonus_and_restart() {
        let mut run = RunState::new(3);
        run.rumble = 34;
        assert_eq!(run.win_bonus(), 1000 + 34 * 50);

        run.phase = RunPhase::Dying { elapsed: 3.0 };
        run.rumble = 60;
        run.score = 900;
        run.restart_attempt();
        assert!(run.is_playing());
        assert!(run.rumble_ready);
        assert_eq!(run.score, 900);
    }
}
