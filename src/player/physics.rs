//! Player movement state machine and shared body physics

use bevy::prelude::*;

use crate::constants::*;
use crate::events::{EventBus, GameEvent};
use crate::input::PlayerInput;
use crate::player::components::*;
use crate::powerups::PowerState;
use crate::run::RunState;
use crate::tuning::{GameplayTuning, PhysicsTweaks};
use crate::world::Platform;

/// Inputs the movement controller reads for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveInput {
    pub move_x: f32,
    pub jump_pressed: bool,
    pub jump_held: bool,
}

/// Mutable movement state for one tick, copied in and out of components
#[derive(Debug, Clone, Copy)]
pub struct MoveState {
    pub velocity: Vec2,
    pub grounded: bool,
    pub coyote: f32,
    pub buffer: f32,
    pub used_double_jump: bool,
    pub can_double_jump: bool,
    pub facing: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Ground,
    Double,
}

/// Advance the jump/run controller by one tick.
///
/// Order matters: timers refresh first, then horizontal movement, the
/// buffered ground jump, the air jump and finally the jump cut. A ground jump
/// fired this tick blocks the air jump, so a coyote jump can't burn the
/// double jump on the same press.
pub fn step_movement(
    state: &mut MoveState,
    input: MoveInput,
    tuning: &GameplayTuning,
    dt: f32,
    frozen: bool,
) -> Option<JumpKind> {
    if state.grounded {
        state.coyote = tuning.coyote_time;
        state.used_double_jump = false;
    } else {
        state.coyote -= dt;
    }

    if input.jump_pressed {
        state.buffer = tuning.jump_buffer_time;
    } else {
        state.buffer -= dt;
    }

    if frozen {
        state.velocity.x = 0.0;
        return None;
    }

    if input.move_x < -STICK_DEADZONE {
        state.velocity.x = -tuning.move_speed;
        state.facing = -1.0;
    } else if input.move_x > STICK_DEADZONE {
        state.velocity.x = tuning.move_speed;
        state.facing = 1.0;
    } else {
        state.velocity.x *= tuning.ground_friction;
        if state.velocity.x.abs() < tuning.stop_threshold {
            state.velocity.x = 0.0;
        }
    }

    let mut jumped = None;

    if state.buffer > 0.0 && state.coyote > 0.0 {
        state.velocity.y = tuning.jump_velocity;
        state.coyote = 0.0;
        state.buffer = 0.0;
        jumped = Some(JumpKind::Ground);
    }

    if jumped.is_none()
        && input.jump_pressed
        && !state.grounded
        && state.can_double_jump
        && !state.used_double_jump
        && state.coyote <= 0.0
    {
        state.velocity.y = tuning.double_jump_velocity;
        state.used_double_jump = true;
        state.buffer = 0.0;
        jumped = Some(JumpKind::Double);
    }

    // Variable height: keep cutting while rising fast with the button up
    if !input.jump_held && state.velocity.y > tuning.jump_cut_threshold {
        state.velocity.y *= tuning.jump_cut_multiplier;
    }

    jumped
}

/// Pick the animation pose for the current body state
pub fn pose_for(grounded: bool, velocity: Vec2) -> Pose {
    if !grounded {
        Pose::Jump
    } else if velocity.x.abs() > RUN_POSE_SPEED {
        Pose::Run
    } else {
        Pose::Idle
    }
}

/// Snapshot every body's position before it moves this tick
pub fn record_previous_positions(mut bodies: Query<(&Transform, &mut PreviousPosition), With<Body>>) {
    for (transform, mut previous) in &mut bodies {
        previous.0 = transform.translation.truncate();
    }
}

/// Runs in the gameplay schedule to apply captured input to the player body
#[allow(clippy::type_complexity)]
pub fn apply_input(
    tweaks: Res<PhysicsTweaks>,
    input: Res<PlayerInput>,
    power: Res<PowerState>,
    run: Res<RunState>,
    time: Res<Time>,
    mut bus: ResMut<EventBus>,
    mut players: Query<
        (
            &mut Velocity,
            &mut CoyoteTimer,
            &mut JumpBuffer,
            &mut JumpState,
            &mut Facing,
            &mut PlayerPose,
            &mut Sprite,
            &Grounded,
        ),
        With<Player>,
    >,
) {
    let dt = time.delta_secs();
    for (mut velocity, mut coyote, mut buffer, mut jump_state, mut facing, mut pose, mut sprite, grounded) in
        &mut players
    {
        let mut state = MoveState {
            velocity: velocity.0,
            grounded: grounded.0,
            coyote: coyote.0,
            buffer: buffer.0,
            used_double_jump: jump_state.used_double_jump,
            can_double_jump: power.can_double_jump,
            facing: facing.0,
        };
        let move_input = MoveInput {
            move_x: input.move_x,
            jump_pressed: input.jump_pressed,
            jump_held: input.jump_held,
        };

        let frozen = run.is_frozen();
        let jumped = step_movement(&mut state, move_input, &tweaks, dt, frozen);

        velocity.0 = state.velocity;
        coyote.0 = state.coyote;
        buffer.0 = state.buffer;
        jump_state.used_double_jump = state.used_double_jump;
        facing.0 = state.facing;
        sprite.flip_x = facing.0 < 0.0;

        if let Some(kind) = jumped {
            bus.emit(GameEvent::Jump { double: kind == JumpKind::Double });
        }

        pose.blast_timer = (pose.blast_timer - dt).max(0.0);
        if frozen {
            continue;
        }
        pose.pose = if pose.blast_timer > 0.0 {
            Pose::Blast
        } else {
            pose_for(state.grounded, state.velocity)
        };
        if pose.pose == Pose::Run {
            // Two-frame run cycle at 8 fps
            pose.frame_timer += dt;
            if pose.frame_timer >= 0.125 {
                pose.frame_timer -= 0.125;
                pose.run_frame = (pose.run_frame + 1) % 2;
            }
        } else {
            pose.frame_timer = 0.0;
            pose.run_frame = 0;
        }
    }
}

/// Apply gravity to every enabled body that uses it
pub fn apply_gravity(tweaks: Res<PhysicsTweaks>, time: Res<Time>, mut bodies: Query<(&Body, &mut Velocity)>) {
    let dt = time.delta_secs();
    for (body, mut velocity) in &mut bodies {
        if body.enabled && body.gravity {
            velocity.0.y -= tweaks.gravity * dt;
        }
    }
}

/// Integrate velocity into position for every enabled body
pub fn apply_velocity(time: Res<Time>, mut bodies: Query<(&Body, &Velocity, &mut Transform)>) {
    let dt = time.delta_secs();
    for (body, velocity, mut transform) in &mut bodies {
        if body.enabled {
            transform.translation.x += velocity.0.x * dt;
            transform.translation.y += velocity.0.y * dt;
        }
    }
}

/// Push one body out of one solid box along the smallest overlap axis.
/// Returns true when the body ended up resting on top of the solid.
pub fn resolve_solid(position: &mut Vec2, velocity: &mut Vec2, half: Vec2, solid_pos: Vec2, solid_half: Vec2) -> bool {
    let diff = *position - solid_pos;
    let overlap_x = half.x + solid_half.x - diff.x.abs();
    let overlap_y = half.y + solid_half.y - diff.y.abs();

    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return false;
    }

    if overlap_y < overlap_x {
        if diff.y > 0.0 {
            // Land on top, slightly inside so next tick still detects contact
            position.y = solid_pos.y + solid_half.y + half.y - COLLISION_EPSILON;
            if velocity.y <= 0.0 {
                velocity.y = 0.0;
                return true;
            }
        } else {
            position.y = solid_pos.y - solid_half.y - half.y + COLLISION_EPSILON;
            if velocity.y > 0.0 {
                velocity.y = 0.0;
            }
        }
    } else {
        if diff.x > 0.0 {
            position.x = solid_pos.x + solid_half.x + half.x;
        } else {
            position.x = solid_pos.x - solid_half.x - half.x;
        }
        // Walls stop horizontal motion into them
        if velocity.x * diff.x < 0.0 {
            velocity.x = 0.0;
        }
    }
    false
}

/// Resolve every enabled body against the level's solid platforms
pub fn check_collisions(
    mut bodies: Query<(&Body, &mut Transform, &mut Velocity, &mut Grounded), Without<Platform>>,
    platforms: Query<(&Transform, &Platform)>,
) {
    for (body, mut transform, mut velocity, mut grounded) in &mut bodies {
        if !body.enabled {
            continue;
        }
        grounded.0 = false;
        let half = body.half();
        let mut position = transform.translation.truncate();

        for (platform_transform, platform) in &platforms {
            let solid_pos = platform_transform.translation.truncate();
            if resolve_solid(&mut position, &mut velocity.0, half, solid_pos, platform.size / 2.0) {
                grounded.0 = true;
            }
        }

        transform.translation.x = position.x;
        transform.translation.y = position.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn grounded_state() -> MoveState {
        MoveState {
            velocity: Vec2::ZERO,
            grounded: true,
            coyote: 0.0,
            buffer: 0.0,
            used_double_jump: false,
            can_double_jump: false,
            facing: 1.0,
        }
    }

    fn press() -> MoveInput {
        MoveInput { move_x: 0.0, jump_pressed: true, jump_held: true }
    }

    fn hold() -> MoveInput {
        MoveInput { move_x: 0.0, jump_pressed: false, jump_held: true }
    }

    #[test]
    fn test_ground_jump() {
        let tuning = GameplayTuning::default();
        let mut state = grounded_state();
        let jumped = step_movement(&mut state, press(), &tuning, DT, false);
        assert_eq!(jumped, Some(JumpKind::Ground));
        assert_eq!(state.velocity.y, tuning.jump_velocity);
        assert_eq!(state.coyote, 0.0);
        assert_eq!(state.buffer, 0.0);
    }

    #[test]
    fn test_coyote_jump_after_leaving_ledge() {
        let tuning = GameplayTuning::default();
        let mut state = grounded_state();
        step_movement(&mut state, MoveInput::default(), &tuning, DT, false);
        // Walk off: three airborne ticks (0.05s) is still inside the 0.08s window
        state.grounded = false;
        for _ in 0..3 {
            step_movement(&mut state, MoveInput::default(), &tuning, DT, false);
        }
        let jumped = step_movement(&mut state, press(), &tuning, DT, false);
        assert_eq!(jumped, Some(JumpKind::Ground));
    }

    #[test]
    fn test_coyote_expires() {
        let tuning = GameplayTuning::default();
        let mut state = grounded_state();
        step_movement(&mut state, MoveInput::default(), &tuning, DT, false);
        state.grounded = false;
        for _ in 0..6 {
            step_movement(&mut state, MoveInput::default(), &tuning, DT, false);
        }
        let jumped = step_movement(&mut state, press(), &tuning, DT, false);
        assert_eq!(jumped, None);
    }

    #[test]
    fn test_buffered_press_fires_on_landing() {
        let tuning = GameplayTuning::default();
        let mut state = grounded_state();
        state.grounded = false;
        state.coyote = -1.0;
        state.velocity.y = -200.0;
        assert_eq!(step_movement(&mut state, press(), &tuning, DT, false), None);
        // Land three ticks later, still inside the 0.1s buffer
        step_movement(&mut state, hold(), &tuning, DT, false);
        step_movement(&mut state, hold(), &tuning, DT, false);
        state.grounded = true;
        state.velocity.y = 0.0;
        assert_eq!(step_movement(&mut state, hold(), &tuning, DT, false), Some(JumpKind::Ground));
    }

    #[test]
    fn test_buffer_expires_before_landing() {
        let tuning = GameplayTuning::default();
        let mut state = grounded_state();
        state.grounded = false;
        state.coyote = -1.0;
        step_movement(&mut state, press(), &tuning, DT, false);
        for _ in 0..7 {
            step_movement(&mut state, hold(), &tuning, DT, false);
        }
        state.grounded = true;
        assert_eq!(step_movement(&mut state, hold(), &tuning, DT, false), None);
    }

    #[test]
    fn test_double_jump_needs_cap_and_is_single_use() {
        let tuning = GameplayTuning::default();
        let mut state = grounded_state();
        state.grounded = false;
        state.coyote = -1.0;
        assert_eq!(step_movement(&mut state, press(), &tuning, DT, false), None);

        state.can_double_jump = true;
        state.buffer = 0.0;
        assert_eq!(step_movement(&mut state, press(), &tuning, DT, false), Some(JumpKind::Double));
        assert_eq!(state.velocity.y, tuning.double_jump_velocity);
        assert!(state.used_double_jump);
        assert_eq!(step_movement(&mut state, press(), &tuning, DT, false), None);

        // Landing restores it
        state.grounded = true;
        step_movement(&mut state, MoveInput::default(), &tuning, DT, false);
        assert!(!state.used_double_jump);
    }

    #[test]
    fn test_coyote_jump_does_not_spend_double_jump() {
        let tuning = GameplayTuning::default();
        let mut state = grounded_state();
        state.can_double_jump = true;
        step_movement(&mut state, MoveInput::default(), &tuning, DT, false);
        state.grounded = false;
        let jumped = step_movement(&mut state, press(), &tuning, DT, false);
        assert_eq!(jumped, Some(JumpKind::Ground));
        assert!(!state.used_double_jump);
        assert_eq!(state.velocity.y, tuning.jump_velocity);
    }

    #[test]
    fn test_jump_cut_when_released() {
        let tuning = GameplayTuning::default();
        let mut state = grounded_state();
        step_movement(&mut state, press(), &tuning, DT, false);
        state.grounded = false;
        step_movement(&mut state, MoveInput::default(), &tuning, DT, false);
        assert!((state.velocity.y - tuning.jump_velocity * 0.6).abs() < 1e-3);
        // Below the threshold the cut stops applying
        state.velocity.y = 140.0;
        step_movement(&mut state, MoveInput::default(), &tuning, DT, false);
        assert_eq!(state.velocity.y, 140.0);
    }

    #[test]
    fn test_friction_and_stop() {
        let tuning = GameplayTuning::default();
        let mut state = grounded_state();
        state.velocity.x = 220.0;
        step_movement(&mut state, MoveInput::default(), &tuning, DT, false);
        assert!((state.velocity.x - 176.0).abs() < 1e-3);
        state.velocity.x = 12.0;
        step_movement(&mut state, MoveInput::default(), &tuning, DT, false);
        assert_eq!(state.velocity.x, 0.0);
    }

    #[test]
    fn test_frozen_ignores_movement_and_jump() {
        let tuning = GameplayTuning::default();
        let mut state = grounded_state();
        state.velocity.x = 220.0;
        let input = MoveInput { move_x: 1.0, jump_pressed: true, jump_held: true };
        assert_eq!(step_movement(&mut state, input, &tuning, DT, true), None);
        assert_eq!(state.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_facing_follows_input() {
        let tuning = GameplayTuning::default();
        let mut state = grounded_state();
        let left = MoveInput { move_x: -1.0, ..default() };
        step_movement(&mut state, left, &tuning, DT, false);
        assert_eq!(state.facing, -1.0);
        assert_eq!(state.velocity.x, -tuning.move_speed);
    }

    #[test]
    fn test_pose_selection() {
        assert_eq!(pose_for(false, Vec2::ZERO), Pose::Jump);
        assert_eq!(pose_for(true, Vec2::new(30.0, 0.0)), Pose::Run);
        assert_eq!(pose_for(true, Vec2::new(10.0, 0.0)), Pose::Idle);
    }

    #[test]
    fn test_resolve_landing_and_wall() {
        let half = Vec2::new(10.0, 20.0);
        let solid_pos = Vec2::new(0.0, 0.0);
        let solid_half = Vec2::new(100.0, 16.0);

        let mut pos = Vec2::new(0.0, 35.0);
        let mut vel = Vec2::new(0.0, -100.0);
        assert!(resolve_solid(&mut pos, &mut vel, half, solid_pos, solid_half));
        assert_eq!(vel.y, 0.0);
        assert!((pos.y - (36.0 - COLLISION_EPSILON)).abs() < 1e-4);

        let mut pos = Vec2::new(-108.0, 0.0);
        let mut vel = Vec2::new(50.0, 0.0);
        assert!(!resolve_solid(&mut pos, &mut vel, half, solid_pos, solid_half));
        assert_eq!(pos.x, -110.0);
        assert_eq!(vel.x, 0.0);
    }
}
