//! Input handling for keyboard and mouse.
//!
//! Window events feed [`InputState`]; once per tick the game takes a
//! [`FrameInput`] snapshot through the active [`Bindings`] and never touches
//! the raw listener state again.

use glam::Vec2;
use std::collections::{HashMap, HashSet};

/// Edge-triggered gameplay actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Reload,
    /// Weapon slot 1..=7.
    SelectWeapon(u8),
    /// Enter or leave the truck.
    Interact,
    ToggleNightVision,
    ToggleFlashlight,
    CycleTheme,
    TogglePause,
}

/// Key to action mapping.
#[derive(Debug, Clone)]
pub struct Bindings {
    keys: HashMap<KeyCode, Action>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut keys = HashMap::new();
        keys.insert(KeyCode::KeyR, Action::Reload);
        keys.insert(KeyCode::KeyE, Action::Interact);
        keys.insert(KeyCode::KeyN, Action::ToggleNightVision);
        keys.insert(KeyCode::KeyF, Action::ToggleFlashlight);
        keys.insert(KeyCode::Tab, Action::CycleTheme);
        keys.insert(KeyCode::Escape, Action::TogglePause);
        let digits = [
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
            KeyCode::Digit5,
            KeyCode::Digit6,
            KeyCode::Digit7,
        ];
        for (slot, key) in digits.into_iter().enumerate() {
            keys.insert(key, Action::SelectWeapon(slot as u8 + 1));
        }
        Self { keys }
    }
}

impl Bindings {
    /// Rebind a key, replacing whatever it did before.
    pub fn bind(&mut self, key: KeyCode, action: Action) {
        self.keys.insert(key, action);
    }

    pub fn action_for(&self, key: KeyCode) -> Option<Action> {
        self.keys.get(&key).copied()
    }
}

/// Everything the game reads from input in one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// WASD as (strafe, forward), normalized.
    pub movement: Vec2,
    /// Mouse motion since the last tick, in raw device units.
    pub look_delta: Vec2,
    pub fire_pressed: bool,
    pub fire_held: bool,
    pub aim_held: bool,
    /// Actions whose key went down this tick.
    pub actions: Vec<Action>,
}

impl FrameInput {
    pub fn triggered(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame, in arrival order.
    keys_pressed: Vec<KeyCode>,

    /// Mouse buttons currently held.
    mouse_held: HashSet<MouseButton>,
    /// Mouse buttons pressed this frame.
    mouse_pressed: HashSet<MouseButton>,

    /// Mouse movement delta this frame.
    mouse_delta: Vec2,
    /// Accumulated mouse delta (for when cursor is locked).
    accumulated_delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_pressed.clear();
        self.mouse_delta = self.accumulated_delta;
        self.accumulated_delta = Vec2::ZERO;
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_held.insert(key) {
                    self.keys_pressed.push(key);
                }
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.mouse_held.insert(button) {
                    self.mouse_pressed.insert(button);
                }
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    /// Process mouse movement.
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        self.accumulated_delta.x += delta.0 as f32;
        self.accumulated_delta.y += delta.1 as f32;
    }

    /// Drop held state, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys_held.clear();
        self.mouse_held.clear();
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a mouse button is held.
    pub fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Check if a mouse button was pressed this frame.
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_pressed.contains(&button)
    }

    /// Get the mouse movement delta for this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Get movement input as a normalized vector (WASD).
    pub fn get_movement_input(&self) -> Vec2 {
        let mut movement = Vec2::ZERO;

        if self.is_key_held(KeyCode::KeyW) {
            movement.y += 1.0;
        }
        if self.is_key_held(KeyCode::KeyS) {
            movement.y -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyA) {
            movement.x -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyD) {
            movement.x += 1.0;
        }

        movement.normalize_or_zero()
    }

    /// Build the tick snapshot.
    pub fn snapshot(&self, bindings: &Bindings) -> FrameInput {
        FrameInput {
            movement: self.get_movement_input(),
            look_delta: self.mouse_delta,
            fire_pressed: self.is_mouse_pressed(MouseButton::Left),
            fire_held: self.is_mouse_held(MouseButton::Left),
            aim_held: self.is_mouse_held(MouseButton::Right),
            actions: self
                .keys_pressed
                .iter()
                .filter_map(|key| bindings.action_for(*key))
                .collect(),
        }
    }

    /// Snapshot everything gathered since the previous call and start a
    /// new frame. Presses and mouse motion are reported exactly once.
    pub fn take_frame(&mut self, bindings: &Bindings) -> FrameInput {
        self.mouse_delta = self.accumulated_delta;
        self.accumulated_delta = Vec2::ZERO;
        let frame = self.snapshot(bindings);
        self.keys_pressed.clear();
        self.mouse_pressed.clear();
        frame
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_key_reports_pressed_only_once() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyR, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyR, ElementState::Pressed);
        let frame = input.snapshot(&Bindings::default());
        assert_eq!(frame.actions, vec![Action::Reload], "key repeat must not re-trigger");

        input.begin_frame();
        let frame = input.snapshot(&Bindings::default());
        assert!(frame.actions.is_empty());
    }

    #[test]
    fn digits_map_to_weapon_slots() {
        let bindings = Bindings::default();
        assert_eq!(bindings.action_for(KeyCode::Digit1), Some(Action::SelectWeapon(1)));
        assert_eq!(bindings.action_for(KeyCode::Digit7), Some(Action::SelectWeapon(7)));
        assert_eq!(bindings.action_for(KeyCode::Digit8), None);
    }

    #[test]
    fn rebinding_replaces_the_old_action() {
        let mut bindings = Bindings::default();
        bindings.bind(KeyCode::KeyF, Action::Reload);
        assert_eq!(bindings.action_for(KeyCode::KeyF), Some(Action::Reload));
    }

    #[test]
    fn movement_is_normalized() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyD, ElementState::Pressed);
        let m = input.get_movement_input();
        assert!((m.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn mouse_delta_accumulates_until_frame_start() {
        let mut input = InputState::new();
        input.process_mouse_motion((3.0, -1.0));
        input.process_mouse_motion((2.0, 4.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::new(5.0, 3.0));
    }

    #[test]
    fn fire_edge_and_hold_are_separate() {
        let mut input = InputState::new();
        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        let frame = input.snapshot(&Bindings::default());
        assert!(frame.fire_pressed && frame.fire_held);
        input.begin_frame();
        let frame = input.snapshot(&Bindings::default());
        assert!(!frame.fire_pressed && frame.fire_held);
    }

    #[test]
    fn take_frame_reports_presses_and_motion_once() {
        let mut input = InputState::new();
        let bindings = Bindings::default();
        input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
        input.process_mouse_motion((2.0, -1.0));
        let frame = input.take_frame(&bindings);
        assert_eq!(frame.actions, vec![Action::TogglePause]);
        assert_eq!(frame.look_delta, Vec2::new(2.0, -1.0));

        let frame = input.take_frame(&bindings);
        assert!(frame.actions.is_empty());
        assert_eq!(frame.look_delta, Vec2::ZERO);
    }
}
