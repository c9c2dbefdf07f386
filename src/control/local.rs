//! Local keyboard control
//!
//! Movement keys are level-triggered: the paddle steers while a key is held
//! and stops on release. Jump and launch are edge-triggered and fire once per
//! press, no matter how many ticks run before the key is released.

use crate::sim::{Action, Steer};

/// Physical keys the local mapping understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    A,
    D,
    Space,
    Enter,
}

impl Key {
    /// Parse a DOM-style key name (`"ArrowLeft"`, `"a"`, `" "`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "a" | "A" => Some(Key::A),
            "d" | "D" => Some(Key::D),
            " " | "Space" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            _ => None,
        }
    }
}

/// What a key does once pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    MoveLeft,
    MoveRight,
    /// Jump, and launch the ball if it still rides the paddle
    JumpOrLaunch,
    Launch,
}

/// Key to binding table. Replace it to remap the keyboard.
#[derive(Debug, Clone)]
pub struct KeyMap {
    entries: Vec<(Key, Binding)>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            entries: vec![
                (Key::ArrowLeft, Binding::MoveLeft),
                (Key::A, Binding::MoveLeft),
                (Key::ArrowRight, Binding::MoveRight),
                (Key::D, Binding::MoveRight),
                (Key::Space, Binding::JumpOrLaunch),
                (Key::Enter, Binding::Launch),
            ],
        }
    }
}

impl KeyMap {
    pub fn new(entries: Vec<(Key, Binding)>) -> Self {
        Self { entries }
    }

    pub fn binding(&self, key: Key) -> Option<Binding> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, b)| *b)
    }
}

/// Held keys plus one-shot triggers waiting for the next tick
#[derive(Debug, Clone, Default)]
pub struct LocalInput {
    keymap: KeyMap,
    left_held: u8,
    right_held: u8,
    /// Keys currently down, so OS auto-repeat does not re-fire triggers
    down: Vec<Key>,
    jump_pending: bool,
    launch_pending: bool,
}

impl LocalInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keymap(keymap: KeyMap) -> Self {
        Self {
            keymap,
            ..Self::default()
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.down.contains(&key) {
            return;
        }
        self.down.push(key);

        match self.keymap.binding(key) {
            Some(Binding::MoveLeft) => self.left_held += 1,
            Some(Binding::MoveRight) => self.right_held += 1,
            Some(Binding::JumpOrLaunch) => {
                self.jump_pending = true;
                self.launch_pending = true;
            }
            Some(Binding::Launch) => self.launch_pending = true,
            None => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        let Some(idx) = self.down.iter().position(|k| *k == key) else {
            return;
        };
        self.down.swap_remove(idx);

        match self.keymap.binding(key) {
            Some(Binding::MoveLeft) => self.left_held = self.left_held.saturating_sub(1),
            Some(Binding::MoveRight) => self.right_held = self.right_held.saturating_sub(1),
            _ => {}
        }
    }

    /// Forget held keys and queued triggers (focus loss, mode switch)
    pub fn release_all(&mut self) {
        self.down.clear();
        self.left_held = 0;
        self.right_held = 0;
        self.jump_pending = false;
        self.launch_pending = false;
    }

    /// Current steering from held keys; opposing keys cancel out
    pub fn steer(&self) -> Steer {
        match (self.left_held > 0, self.right_held > 0) {
            (true, false) => Steer::Left,
            (false, true) => Steer::Right,
            _ => Steer::Stop,
        }
    }

    /// Build this tick's action and consume the one-shot triggers
    pub fn take_action(&mut self) -> Action {
        Action {
            steer: Some(self.steer()),
            jump: std::mem::take(&mut self.jump_pending),
            launch: std::mem::take(&mut self.launch_pending),
        }
    }
}
