use std::collections::{HashMap, HashSet};
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::camera::MoveDirection;

/// Identifier for a physical keyboard key, independent of the windowing host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Function(u8),
}

impl KeyCode {
    /// Parses the key names accepted in configuration files.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_alphabetic() {
                return Some(Self::Character(ch.to_ascii_uppercase()));
            }
            if ch.is_ascii_digit() {
                return Some(Self::Digit(ch as u8 - b'0'));
            }
        }
        if let Some(function) = name.strip_prefix('F').or_else(|| name.strip_prefix('f')) {
            if let Ok(index) = function.parse::<u8>() {
                if (1..=25).contains(&index) {
                    return Some(Self::Function(index));
                }
            }
        }
        None
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        "Space" => Space,
        "Enter" | "Return" => Enter,
        "Tab" => Tab,
        "Left" => Left,
        "Right" => Right,
        "Up" => Up,
        "Down" => Down,
        "Escape" | "Esc" => Escape,
        "Backspace" => Backspace,
        "Home" => Home,
        "End" => End,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        "LeftShift" | "LShift" => LeftShift,
        "RightShift" | "RShift" => RightShift,
        "LeftCtrl" | "LControl" => LeftCtrl,
        "RightCtrl" | "RControl" => RightCtrl,
        "LeftAlt" | "LAlt" => LeftAlt,
        "RightAlt" | "RAlt" => RightAlt,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

/// Friendly names for the non-printable keys we can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    Home,
    End,
    PageUp,
    PageDown,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);

    pub fn new(index: u8) -> Self {
        Self(index)
    }
}

/// Logical actions the frame loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    MoveForward,
    MoveBack,
    StrafeLeft,
    StrafeRight,
    MoveUp,
    MoveDown,
    LookLeft,
    LookRight,
    LookUp,
    LookDown,
    Quit,
}

impl InputAction {
    pub fn from_name(name: &str) -> Option<Self> {
        use InputAction::*;
        Some(match name {
            "move_forward" => MoveForward,
            "move_back" => MoveBack,
            "strafe_left" => StrafeLeft,
            "strafe_right" => StrafeRight,
            "move_up" => MoveUp,
            "move_down" => MoveDown,
            "look_left" => LookLeft,
            "look_right" => LookRight,
            "look_up" => LookUp,
            "look_down" => LookDown,
            "quit" => Quit,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        use InputAction::*;
        match self {
            MoveForward => "move_forward",
            MoveBack => "move_back",
            StrafeLeft => "strafe_left",
            StrafeRight => "strafe_right",
            MoveUp => "move_up",
            MoveDown => "move_down",
            LookLeft => "look_left",
            LookRight => "look_right",
            LookUp => "look_up",
            LookDown => "look_down",
            Quit => "quit",
        }
    }

    /// Camera movement driven by this action, if any.
    pub fn move_direction(self) -> Option<MoveDirection> {
        use InputAction::*;
        match self {
            MoveForward => Some(MoveDirection::Forward),
            MoveBack => Some(MoveDirection::Back),
            StrafeLeft => Some(MoveDirection::Left),
            StrafeRight => Some(MoveDirection::Right),
            MoveUp => Some(MoveDirection::Up),
            MoveDown => Some(MoveDirection::Down),
            _ => None,
        }
    }
}

impl fmt::Display for InputAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mapping table from physical keys to logical actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    map: HashMap<KeyCode, InputAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use InputAction::*;
        let defaults = [
            (KeyCode::Character('W'), MoveForward),
            (KeyCode::Character('S'), MoveBack),
            (KeyCode::Character('A'), StrafeLeft),
            (KeyCode::Character('D'), StrafeRight),
            (KeyCode::Named(NamedKey::Space), MoveUp),
            (KeyCode::Named(NamedKey::LeftShift), MoveDown),
            (KeyCode::Named(NamedKey::Left), LookLeft),
            (KeyCode::Named(NamedKey::Right), LookRight),
            (KeyCode::Named(NamedKey::Up), LookUp),
            (KeyCode::Named(NamedKey::Down), LookDown),
            (KeyCode::Named(NamedKey::Escape), Quit),
        ];
        Self {
            map: defaults.into_iter().collect(),
        }
    }
}

impl KeyBindings {
    /// Bindings with no keys mapped.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Binds `key` to `action`, replacing whatever the key did before.
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        self.map.insert(key, action);
    }

    pub fn unbind(&mut self, key: KeyCode) {
        self.map.remove(&key);
    }

    pub fn action_for(&self, key: KeyCode) -> Option<InputAction> {
        self.map.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Input snapshot read by the frame update. Event handlers write it between
/// frames.
///
/// Physical keys are tracked rather than actions, so an action stays held
/// while any key bound to it is still down.
#[derive(Debug, Default)]
pub struct InputState {
    bindings: KeyBindings,
    held_keys: HashSet<KeyCode>,
    mouse_buttons: HashSet<MouseButton>,
    mouse_delta: Vec2,
    quit: bool,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    pub fn key_down(&mut self, key: KeyCode) {
        let Some(action) = self.bindings.action_for(key) else {
            return;
        };
        if action == InputAction::Quit {
            self.quit = true;
        }
        self.held_keys.insert(key);
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.held_keys.remove(&key);
    }

    pub fn mouse_button_down(&mut self, button: MouseButton) {
        self.mouse_buttons.insert(button);
    }

    pub fn mouse_button_up(&mut self, button: MouseButton) {
        self.mouse_buttons.remove(&button);
    }

    /// Forgets every held key and button along with pending motion. Used when
    /// the window loses focus and the matching release events never arrive.
    pub fn release_all(&mut self) {
        self.held_keys.clear();
        self.mouse_buttons.clear();
        self.mouse_delta = Vec2::ZERO;
    }

    /// Mouse-look is active while the left button is held.
    pub fn mouse_look_active(&self) -> bool {
        self.mouse_buttons.contains(&MouseButton::LEFT)
    }

    /// Accumulates pointer motion. Motion outside mouse-look is dropped.
    pub fn mouse_moved(&mut self, delta: Vec2) {
        if self.mouse_look_active() {
            self.mouse_delta += delta;
        }
    }

    /// Returns the motion accumulated since the last call and resets it.
    pub fn take_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn is_held(&self, action: InputAction) -> bool {
        self.held_keys
            .iter()
            .any(|key| self.bindings.action_for(*key) == Some(action))
    }

    /// Distinct actions with at least one bound key down.
    pub fn held_actions(&self) -> HashSet<InputAction> {
        self.held_keys
            .iter()
            .filter_map(|key| self.bindings.action_for(*key))
            .collect()
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}
