//! Key bindings
//!
//! Bindings are stored as key names in `terrain.toml` and resolved to winit
//! key codes once at startup.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

use crate::camera::MovementKeys;
use crate::error::ConfigError;
use crate::scene::SceneAction;

/// Single-shot actions triggered on key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReloadShader,
    Quit,
    Scene(SceneAction),
}

/// Key names for every action, as written in the `[keys]` config section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub reload_shader: String,
    pub toggle_wireframe: String,
    pub height_up: String,
    pub height_down: String,
    pub light_yaw_positive: String,
    pub light_yaw_negative: String,
    pub light_pitch_positive: String,
    pub light_pitch_negative: String,
    pub toggle_normal_mode: String,
    pub quit: String,
    pub move_forward: String,
    pub move_back: String,
    pub strafe_left: String,
    pub strafe_right: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            reload_shader: "R".into(),
            toggle_wireframe: "Space".into(),
            height_up: "T".into(),
            height_down: "G".into(),
            light_yaw_positive: "D".into(),
            light_yaw_negative: "A".into(),
            light_pitch_positive: "W".into(),
            light_pitch_negative: "S".into(),
            toggle_normal_mode: "N".into(),
            quit: "Escape".into(),
            move_forward: "ArrowUp".into(),
            move_back: "ArrowDown".into(),
            strafe_left: "ArrowLeft".into(),
            strafe_right: "ArrowRight".into(),
        }
    }
}

impl KeyBindings {
    /// Resolve key names to key codes.
    ///
    /// When two actions share a key, the one listed later in the config
    /// section wins.
    pub fn resolve(&self) -> Result<KeyMap, ConfigError> {
        let actions = [
            ("reload_shader", &self.reload_shader, Action::ReloadShader),
            (
                "toggle_wireframe",
                &self.toggle_wireframe,
                Action::Scene(SceneAction::ToggleWireframe),
            ),
            ("height_up", &self.height_up, Action::Scene(SceneAction::RaiseHeight)),
            ("height_down", &self.height_down, Action::Scene(SceneAction::LowerHeight)),
            (
                "light_yaw_positive",
                &self.light_yaw_positive,
                Action::Scene(SceneAction::YawLightPositive),
            ),
            (
                "light_yaw_negative",
                &self.light_yaw_negative,
                Action::Scene(SceneAction::YawLightNegative),
            ),
            (
                "light_pitch_positive",
                &self.light_pitch_positive,
                Action::Scene(SceneAction::PitchLightPositive),
            ),
            (
                "light_pitch_negative",
                &self.light_pitch_negative,
                Action::Scene(SceneAction::PitchLightNegative),
            ),
            (
                "toggle_normal_mode",
                &self.toggle_normal_mode,
                Action::Scene(SceneAction::ToggleNormalMode),
            ),
            ("quit", &self.quit, Action::Quit),
        ];

        let mut pressed = HashMap::with_capacity(actions.len());
        for (binding, name, action) in actions {
            pressed.insert(parse(binding, name)?, action);
        }

        Ok(KeyMap {
            pressed,
            forward: parse("move_forward", &self.move_forward)?,
            back: parse("move_back", &self.move_back)?,
            strafe_left: parse("strafe_left", &self.strafe_left)?,
            strafe_right: parse("strafe_right", &self.strafe_right)?,
        })
    }
}

fn parse(binding: &'static str, name: &str) -> Result<KeyCode, ConfigError> {
    key_from_name(name).ok_or_else(|| ConfigError::UnknownKey {
        binding,
        name: name.to_string(),
    })
}

/// Resolved bindings
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMap {
    pressed: HashMap<KeyCode, Action>,
    forward: KeyCode,
    back: KeyCode,
    strafe_left: KeyCode,
    strafe_right: KeyCode,
}

impl KeyMap {
    /// Action bound to a key press, if any
    pub fn action_for(&self, key: KeyCode) -> Option<Action> {
        self.pressed.get(&key).copied()
    }

    /// Movement state given the set of currently held keys
    pub fn movement(&self, held: &HashSet<KeyCode>) -> MovementKeys {
        MovementKeys {
            forward: held.contains(&self.forward),
            back: held.contains(&self.back),
            strafe_left: held.contains(&self.strafe_left),
            strafe_right: held.contains(&self.strafe_right),
        }
    }
}

/// Parse a key name.
///
/// Accepts single letters and digits (letters case-insensitive), `F1`-`F12`,
/// arrow keys and the common named keys, using winit's naming.
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    let name = name.trim();
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return match c.to_ascii_uppercase() {
            'A' => Some(KeyCode::KeyA),
            'B' => Some(KeyCode::KeyB),
            'C' => Some(KeyCode::KeyC),
            'D' => Some(KeyCode::KeyD),
            'E' => Some(KeyCode::KeyE),
            'F' => Some(KeyCode::KeyF),
            'G' => Some(KeyCode::KeyG),
            'H' => Some(KeyCode::KeyH),
            'I' => Some(KeyCode::KeyI),
            'J' => Some(KeyCode::KeyJ),
            'K' => Some(KeyCode::KeyK),
            'L' => Some(KeyCode::KeyL),
            'M' => Some(KeyCode::KeyM),
            'N' => Some(KeyCode::KeyN),
            'O' => Some(KeyCode::KeyO),
            'P' => Some(KeyCode::KeyP),
            'Q' => Some(KeyCode::KeyQ),
            'R' => Some(KeyCode::KeyR),
            'S' => Some(KeyCode::KeyS),
            'T' => Some(KeyCode::KeyT),
            'U' => Some(KeyCode::KeyU),
            'V' => Some(KeyCode::KeyV),
            'W' => Some(KeyCode::KeyW),
            'X' => Some(KeyCode::KeyX),
            'Y' => Some(KeyCode::KeyY),
            'Z' => Some(KeyCode::KeyZ),
            '0' => Some(KeyCode::Digit0),
            '1' => Some(KeyCode::Digit1),
            '2' => Some(KeyCode::Digit2),
            '3' => Some(KeyCode::Digit3),
            '4' => Some(KeyCode::Digit4),
            '5' => Some(KeyCode::Digit5),
            '6' => Some(KeyCode::Digit6),
            '7' => Some(KeyCode::Digit7),
            '8' => Some(KeyCode::Digit8),
            '9' => Some(KeyCode::Digit9),
            _ => None,
        };
    }

    match name {
        "ArrowUp" => Some(KeyCode::ArrowUp),
        "ArrowDown" => Some(KeyCode::ArrowDown),
        "ArrowLeft" => Some(KeyCode::ArrowLeft),
        "ArrowRight" => Some(KeyCode::ArrowRight),

        "F1" => Some(KeyCode::F1),
        "F2" => Some(KeyCode::F2),
        "F3" => Some(KeyCode::F3),
        "F4" => Some(KeyCode::F4),
        "F5" => Some(KeyCode::F5),
        "F6" => Some(KeyCode::F6),
        "F7" => Some(KeyCode::F7),
        "F8" => Some(KeyCode::F8),
        "F9" => Some(KeyCode::F9),
        "F10" => Some(KeyCode::F10),
        "F11" => Some(KeyCode::F11),
        "F12" => Some(KeyCode::F12),

        "ShiftLeft" => Some(KeyCode::ShiftLeft),
        "ShiftRight" => Some(KeyCode::ShiftRight),
        "ControlLeft" => Some(KeyCode::ControlLeft),
        "ControlRight" => Some(KeyCode::ControlRight),
        "AltLeft" => Some(KeyCode::AltLeft),
        "AltRight" => Some(KeyCode::AltRight),

        "Space" => Some(KeyCode::Space),
        "Enter" => Some(KeyCode::Enter),
        "Escape" => Some(KeyCode::Escape),
        "Backspace" => Some(KeyCode::Backspace),
        "Tab" => Some(KeyCode::Tab),
        "Home" => Some(KeyCode::Home),
        "End" => Some(KeyCode::End),
        "PageUp" => Some(KeyCode::PageUp),
        "PageDown" => Some(KeyCode::PageDown),

        "Minus" => Some(KeyCode::Minus),
        "Equal" => Some(KeyCode::Equal),
        "Comma" => Some(KeyCode::Comma),
        "Period" => Some(KeyCode::Period),
        "NumpadAdd" => Some(KeyCode::NumpadAdd),
        "NumpadSubtract" => Some(KeyCode::NumpadSubtract),
        _ => None,
    }
}
