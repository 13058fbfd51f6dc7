//! Scripted input injection for tests

use bevy::prelude::*;
use std::collections::HashMap;

use super::parser::{FrameInput, InputSnapshot};
use crate::input::PlayerInput;

/// Resource holding scripted inputs for a test
#[derive(Resource, Default)]
pub struct ScriptedInputs {
    /// Map of frame -> input changes
    pub frames: HashMap<u64, InputSnapshot>,
    /// Current input state (persists between frames)
    pub current: CurrentInputState,
    /// Current frame number
    pub current_frame: u64,
    /// Maximum frame to run
    pub max_frame: u64,
}

/// Current input state with persistence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentInputState {
    pub move_x: f32,
    pub jump_pressed: bool,
    pub jump_held: bool,
    pub blast_pressed: bool,
    pub rumble_pressed: bool,
}

impl CurrentInputState {
    /// Write this state into the resource the gameplay systems read
    pub fn apply_to(&self, input: &mut PlayerInput) {
        input.move_x = self.move_x;
        input.jump_pressed = self.jump_pressed;
        input.jump_held = self.jump_held;
        input.blast_pressed = self.blast_pressed;
        input.rumble_pressed = self.rumble_pressed;
    }
}

impl ScriptedInputs {
    /// Create from parsed frame inputs
    pub fn from_inputs(inputs: &[FrameInput]) -> Self {
        let mut frames = HashMap::new();
        let mut max_frame = 0u64;

        for fi in inputs {
            max_frame = max_frame.max(fi.frame);
            frames.insert(fi.frame, fi.input.clone());
        }

        Self {
            frames,
            current: CurrentInputState::default(),
            current_frame: 0,
            max_frame,
        }
    }

    /// Set max frame (for state assertions)
    pub fn set_max_frame(&mut self, frame: u64) {
        self.max_frame = self.max_frame.max(frame);
    }

    /// Advance to next frame and return the input for the frame just entered
    pub fn advance_frame(&mut self) -> CurrentInputState {
        let state = &mut self.current;
        // Presses last a single frame
        state.jump_pressed = false;
        state.blast_pressed = false;
        state.rumble_pressed = false;

        if let Some(snapshot) = self.frames.get(&self.current_frame) {
            if let Some(x) = snapshot.effective_move_x() {
                state.move_x = x;
            }
            if let Some(jump) = snapshot.jump {
                state.jump_pressed = jump;
                state.jump_held = jump;
            }
            if let Some(held) = snapshot.jump_held {
                state.jump_held = held;
            }
            state.blast_pressed = snapshot.blast.unwrap_or(false);
            state.rumble_pressed = snapshot.rumble.unwrap_or(false);
        }

        self.current_frame += 1;
        self.current.clone()
    }

    /// Check if simulation should continue
    pub fn should_continue(&self) -> bool {
        self.current_frame <= self.max_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(frame: u64, input: InputSnapshot) -> FrameInput {
        FrameInput { frame, input }
    }

    #[test]
    fn test_presses_last_one_frame_and_moves_persist() {
        let mut scripted = ScriptedInputs::from_inputs(&[
            frame(0, InputSnapshot { move_x: Some(1.0), ..default() }),
            frame(2, InputSnapshot { jump: Some(true), ..default() }),
            frame(5, InputSnapshot { jump_held: Some(false), move_x: Some(0.0), ..default() }),
        ]);
        assert_eq!(scripted.max_frame, 5);

        let f0 = scripted.advance_frame();
        assert_eq!(f0.move_x, 1.0);
        assert!(!f0.jump_pressed);
        scripted.advance_frame();
        let f2 = scripted.advance_frame();
        assert!(f2.jump_pressed && f2.jump_held);
        assert_eq!(f2.move_x, 1.0);
        let f3 = scripted.advance_frame();
        assert!(!f3.jump_pressed && f3.jump_held);
        scripted.advance_frame();
        let f5 = scripted.advance_frame();
        assert!(!f5.jump_held);
        assert_eq!(f5.move_x, 0.0);
        assert!(!scripted.should_continue());
    }
}
