//! Input state types
//!
//! The module-side snapshot of pointer and keyboard activity. The host relays
//! events between frames; the module reads this state through the input
//! imports while its per-frame entry point runs.

use easel_shared::{InputEvent, KeyCode};
use glam::DVec2;
use hashbrown::HashSet;

/// Latest pointer and keyboard state, in module space
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last pointer position
    pub position: DVec2,
    /// Pointer motion since the last frame; zero when the pointer is still
    pub movement: DVec2,
    /// Primary button currently held
    pub down: bool,
    /// Primary button went down since the last frame
    pub pressed: bool,
    held: HashSet<KeyCode>,
    pressed_keys: HashSet<KeyCode>,
}

impl InputState {
    /// Fold one relayed event into the snapshot
    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerMove { position, movement } => {
                self.position = *position;
                self.movement += *movement;
            }
            InputEvent::PointerDown => {
                self.down = true;
                self.pressed = true;
            }
            InputEvent::PointerUp => {
                self.down = false;
            }
            InputEvent::KeyDown { key } => {
                self.held.insert(*key);
                self.pressed_keys.insert(*key);
            }
            InputEvent::KeyUp { key } => {
                self.held.remove(key);
            }
        }
    }

    /// Key went down since the last frame (a press followed by a release
    /// before the frame still counts)
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Key is currently held
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Clear the per-frame flags. Called after each frame's entry point returns.
    pub fn end_frame(&mut self) {
        self.movement = DVec2::ZERO;
        self.pressed = false;
        self.pressed_keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: KeyCode = KeyCode::new(b'c', b'a');
    const ARROW_UP: KeyCode = KeyCode::new(b'a', b'u');

    #[test]
    fn test_input_state_default() {
        let input = InputState::default();
        assert_eq!(input.position, DVec2::ZERO);
        assert!(!input.down);
        assert!(!input.pressed);
        assert!(!input.key_down(KEY_A));
    }

    #[test]
    fn test_pointer_move_updates_position_and_movement() {
        let mut input = InputState::default();
        input.apply(&InputEvent::PointerMove {
            position: DVec2::new(0.25, -0.5),
            movement: DVec2::new(0.01, 0.02),
        });
        assert_eq!(input.position, DVec2::new(0.25, -0.5));
        assert_eq!(input.movement, DVec2::new(0.01, 0.02));
    }

    #[test]
    fn test_movement_sums_within_a_frame_and_resets() {
        let mut input = InputState::default();
        for _ in 0..2 {
            input.apply(&InputEvent::PointerMove {
                position: DVec2::new(0.1, 0.1),
                movement: DVec2::new(0.05, -0.025),
            });
        }
        assert_eq!(input.movement, DVec2::new(0.1, -0.05));

        input.end_frame();
        assert_eq!(input.movement, DVec2::ZERO);
        assert_eq!(input.position, DVec2::new(0.1, 0.1));
    }

    #[test]
    fn test_pointer_pressed_is_per_frame() {
        let mut input = InputState::default();
        input.apply(&InputEvent::PointerDown);
        assert!(input.down && input.pressed);

        input.end_frame();
        assert!(input.down);
        assert!(!input.pressed);

        input.apply(&InputEvent::PointerUp);
        assert!(!input.down);
    }

    #[test]
    fn test_key_pressed_lasts_one_frame() {
        let mut input = InputState::default();
        input.apply(&InputEvent::KeyDown { key: KEY_A });
        assert!(input.key_pressed(KEY_A));
        assert!(input.key_down(KEY_A));
        assert!(!input.key_pressed(ARROW_UP));

        input.end_frame();
        assert!(!input.key_pressed(KEY_A));
        assert!(input.key_down(KEY_A));
    }

    #[test]
    fn test_tap_between_frames_still_counts_as_pressed() {
        let mut input = InputState::default();
        input.apply(&InputEvent::KeyDown { key: ARROW_UP });
        input.apply(&InputEvent::KeyUp { key: ARROW_UP });
        assert!(input.key_pressed(ARROW_UP));
        assert!(!input.key_down(ARROW_UP));
    }
}
