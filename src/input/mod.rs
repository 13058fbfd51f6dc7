//! Input module - PlayerInput resource and capture_input system

use bevy::prelude::*;

use crate::constants::*;
use crate::ui::TweakPanelState;

/// Buffered input state for the player.
///
/// Capture runs every rendered frame while gameplay runs on the fixed step,
/// so edge flags stay latched until `clear_input_edges` consumes them.
#[derive(Resource, Default, Debug, Clone)]
pub struct PlayerInput {
    pub move_x: f32,
    pub jump_pressed: bool, // Latched: Space/W/Up or South went down
    pub jump_held: bool,
    pub blast_pressed: bool,  // Latched: Z / West
    pub rumble_pressed: bool, // Latched: X / North
    pub any_pressed: bool,    // Latched: any key or button (menus, overlays)
}

const JUMP_KEYS: [KeyCode; 3] = [KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp];

/// Runs in Update to capture keyboard and gamepad state
pub fn capture_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    gamepads: Query<&Gamepad>,
    panel: Res<TweakPanelState>,
    mut input: ResMut<PlayerInput>,
) {
    // Arrow keys drive the tweak panel while it is open
    if panel.visible {
        input.move_x = 0.0;
        input.jump_held = false;
        return;
    }

    let mut move_x = 0.0;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        move_x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        move_x += 1.0;
    }

    for gamepad in &gamepads {
        if let Some(stick_x) = gamepad.get(GamepadAxis::LeftStickX)
            && stick_x.abs() > STICK_DEADZONE
        {
            move_x += stick_x;
        }
        if gamepad.pressed(GamepadButton::DPadLeft) {
            move_x -= 1.0;
        }
        if gamepad.pressed(GamepadButton::DPadRight) {
            move_x += 1.0;
        }
    }
    input.move_x = move_x.clamp(-1.0, 1.0);

    if keyboard.any_just_pressed(JUMP_KEYS) || gamepads.iter().any(|gp| gp.just_pressed(GamepadButton::South)) {
        input.jump_pressed = true;
    }
    input.jump_held =
        keyboard.any_pressed(JUMP_KEYS) || gamepads.iter().any(|gp| gp.pressed(GamepadButton::South));

    if keyboard.just_pressed(KeyCode::KeyZ) || gamepads.iter().any(|gp| gp.just_pressed(GamepadButton::West)) {
        input.blast_pressed = true;
    }
    if keyboard.just_pressed(KeyCode::KeyX) || gamepads.iter().any(|gp| gp.just_pressed(GamepadButton::North)) {
        input.rumble_pressed = true;
    }

    let gamepad_any = gamepads
        .iter()
        .any(|gp| gp.get_just_pressed().next().is_some());
    // Debug keys never count as "any key"
    let key_any = keyboard
        .get_just_pressed()
        .any(|key| !matches!(key, KeyCode::F1 | KeyCode::F3));
    if key_any || mouse.just_pressed(MouseButton::Left) || gamepad_any {
        input.any_pressed = true;
    }
}

/// Consume latched edges once the fixed-step gameplay has seen them
pub fn clear_input_edges(mut input: ResMut<PlayerInput>) {
    input.jump_pressed = false;
    input.blast_pressed = false;
    input.rumble_pressed = false;
}

impl PlayerInput {
    /// Take the any-key latch (menus and overlays)
    pub fn take_any(&mut self) -> bool {
        std::mem::take(&mut self.any_pressed)
    }
}
