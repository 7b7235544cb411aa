use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use glam::Vec2;
use winit::keyboard::KeyCode;

use crate::render::camera::{Gesture, GestureKind};

/// Cursor travel (px) after which a pressed button becomes a pan.
pub const DRAG_THRESHOLD: f32 = 3.0;
/// Zoom exponent per wheel line (browsers report three lines per notch at 0.05).
pub const LINE_ZOOM: f32 = 0.15;
pub const PIXEL_ZOOM: f32 = 0.002;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HiveAction {
    Regenerate,
    ToggleLayoutMode,
    ResetView,
    ToggleLabels,
    OpenSettings,
    Quit,
}

impl HiveAction {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Regenerate => "Regenerate",
            Self::ToggleLayoutMode => "Toggle Layout Mode",
            Self::ResetView => "Reset View",
            Self::ToggleLabels => "Toggle Labels",
            Self::OpenSettings => "Settings",
            Self::Quit => "Quit",
        }
    }

    pub fn all() -> &'static [HiveAction] {
        use HiveAction::*;
        &[Regenerate, ToggleLayoutMode, ResetView, ToggleLabels, OpenSettings, Quit]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub shift: bool,
}

impl KeyBind {
    pub fn new(code: KeyCode) -> Self {
        Self { code, shift: false }
    }

    pub fn with_shift(code: KeyCode) -> Self {
        Self { code, shift: true }
    }

    pub fn display_name(&self) -> String {
        let name = key_name(self.code).unwrap_or("?");
        if self.shift {
            format!("Shift+{name}")
        } else {
            name.to_string()
        }
    }
}

impl Serialize for KeyBind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let name = key_name(self.code).ok_or_else(|| {
            serde::ser::Error::custom(format!("Unsupported key code: {:?}", self.code))
        })?;
        if self.shift {
            serializer.serialize_str(&format!("Shift+{name}"))
        } else {
            serializer.serialize_str(name)
        }
    }
}

impl<'de> Deserialize<'de> for KeyBind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let (shift, key_str) = match s.strip_prefix("Shift+") {
            Some(rest) => (true, rest),
            None => (false, s.as_str()),
        };
        let code = key_from_name(key_str).ok_or_else(|| {
            serde::de::Error::custom(format!("Unknown key code: {key_str}"))
        })?;
        Ok(KeyBind { code, shift })
    }
}

/// Bindable keys, named after their `KeyCode` variants.
const KEY_NAMES: &[(&str, KeyCode)] = &[
    ("KeyA", KeyCode::KeyA), ("KeyB", KeyCode::KeyB), ("KeyC", KeyCode::KeyC),
    ("KeyD", KeyCode::KeyD), ("KeyE", KeyCode::KeyE), ("KeyF", KeyCode::KeyF),
    ("KeyG", KeyCode::KeyG), ("KeyH", KeyCode::KeyH), ("KeyI", KeyCode::KeyI),
    ("KeyJ", KeyCode::KeyJ), ("KeyK", KeyCode::KeyK), ("KeyL", KeyCode::KeyL),
    ("KeyM", KeyCode::KeyM), ("KeyN", KeyCode::KeyN), ("KeyO", KeyCode::KeyO),
    ("KeyP", KeyCode::KeyP), ("KeyQ", KeyCode::KeyQ), ("KeyR", KeyCode::KeyR),
    ("KeyS", KeyCode::KeyS), ("KeyT", KeyCode::KeyT), ("KeyU", KeyCode::KeyU),
    ("KeyV", KeyCode::KeyV), ("KeyW", KeyCode::KeyW), ("KeyX", KeyCode::KeyX),
    ("KeyY", KeyCode::KeyY), ("KeyZ", KeyCode::KeyZ),
    ("Digit0", KeyCode::Digit0), ("Digit1", KeyCode::Digit1), ("Digit2", KeyCode::Digit2),
    ("Digit3", KeyCode::Digit3), ("Digit4", KeyCode::Digit4), ("Digit5", KeyCode::Digit5),
    ("Digit6", KeyCode::Digit6), ("Digit7", KeyCode::Digit7), ("Digit8", KeyCode::Digit8),
    ("Digit9", KeyCode::Digit9),
    ("Escape", KeyCode::Escape), ("Tab", KeyCode::Tab), ("Space", KeyCode::Space),
    ("Enter", KeyCode::Enter), ("Backspace", KeyCode::Backspace),
    ("Home", KeyCode::Home), ("End", KeyCode::End),
    ("PageUp", KeyCode::PageUp), ("PageDown", KeyCode::PageDown),
    ("ArrowUp", KeyCode::ArrowUp), ("ArrowDown", KeyCode::ArrowDown),
    ("ArrowLeft", KeyCode::ArrowLeft), ("ArrowRight", KeyCode::ArrowRight),
    ("Backquote", KeyCode::Backquote), ("Minus", KeyCode::Minus), ("Equal", KeyCode::Equal),
    ("F1", KeyCode::F1), ("F2", KeyCode::F2), ("F3", KeyCode::F3), ("F4", KeyCode::F4),
    ("F5", KeyCode::F5), ("F6", KeyCode::F6), ("F7", KeyCode::F7), ("F8", KeyCode::F8),
    ("F9", KeyCode::F9), ("F10", KeyCode::F10), ("F11", KeyCode::F11), ("F12", KeyCode::F12),
];

fn key_from_name(s: &str) -> Option<KeyCode> {
    KEY_NAMES.iter().find(|(name, _)| *name == s).map(|&(_, code)| code)
}

fn key_name(code: KeyCode) -> Option<&'static str> {
    KEY_NAMES.iter().find(|(_, c)| *c == code).map(|&(name, _)| name)
}

pub fn default_bindings() -> HashMap<HiveAction, KeyBind> {
    use HiveAction::*;
    HashMap::from([
        (Regenerate, KeyBind::new(KeyCode::KeyR)),
        (ToggleLayoutMode, KeyBind::new(KeyCode::KeyM)),
        (ResetView, KeyBind::new(KeyCode::Home)),
        (ToggleLabels, KeyBind::new(KeyCode::KeyL)),
        (OpenSettings, KeyBind::new(KeyCode::F1)),
        (Quit, KeyBind::new(KeyCode::Escape)),
    ])
}

/// Keyboard side: resolves key events to actions through the bindings.
pub struct InputState {
    pub bindings: HashMap<HiveAction, KeyBind>,
    reverse_map: HashMap<KeyCode, Vec<HiveAction>>,
    just_pressed_actions: HashSet<HiveAction>,
    pub shift_held: bool,
}

impl InputState {
    pub fn new(bindings: HashMap<HiveAction, KeyBind>) -> Self {
        let reverse_map = build_reverse_map(&bindings);
        Self {
            bindings,
            reverse_map,
            just_pressed_actions: HashSet::new(),
            shift_held: false,
        }
    }

    pub fn on_key_event(&mut self, code: KeyCode, pressed: bool) {
        if code == KeyCode::ShiftLeft || code == KeyCode::ShiftRight {
            self.shift_held = pressed;
        }
        if !pressed {
            return;
        }
        if let Some(actions) = self.reverse_map.get(&code) {
            for &action in actions {
                let wants_shift = self.bindings.get(&action).map(|b| b.shift).unwrap_or(false);
                if wants_shift == self.shift_held {
                    self.just_pressed_actions.insert(action);
                }
            }
        }
    }

    pub fn just_pressed(&self, action: HiveAction) -> bool {
        self.just_pressed_actions.contains(&action)
    }

    /// Actions pressed since the last call, in `HiveAction::all` order.
    pub fn drain_pressed(&mut self) -> Vec<HiveAction> {
        let pressed = HiveAction::all()
            .iter()
            .copied()
            .filter(|a| self.just_pressed_actions.contains(a))
            .collect();
        self.just_pressed_actions.clear();
        pressed
    }

    pub fn rebind(&mut self, action: HiveAction, bind: KeyBind) {
        self.bindings.insert(action, bind);
        self.reverse_map = build_reverse_map(&self.bindings);
    }
}

fn build_reverse_map(bindings: &HashMap<HiveAction, KeyBind>) -> HashMap<KeyCode, Vec<HiveAction>> {
    let mut map: HashMap<KeyCode, Vec<HiveAction>> = HashMap::new();
    for (&action, bind) in bindings {
        map.entry(bind.code).or_default().push(action);
    }
    map
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollDelta {
    Lines(f32),
    Pixels(f32),
}

impl ScrollDelta {
    /// Multiplicative zoom factor; positive deltas (scroll up) zoom in.
    pub fn zoom_factor(self) -> f32 {
        let exponent = match self {
            Self::Lines(y) => y * LINE_ZOOM,
            Self::Pixels(y) => y * PIXEL_ZOOM,
        };
        2f32.powf(exponent)
    }
}

/// What a cursor move means for the hive.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerMotion {
    /// Plain hover at the given screen position.
    Hover(Vec2),
    /// A held button moved past the drag threshold.
    Drag(Gesture),
    /// Held button, still under the threshold.
    Pending,
}

struct Press {
    button: PointerButton,
    origin: Vec2,
    last: Vec2,
    dragging: bool,
}

/// Pointer side: cursor position, modifiers and press/drag tracking.
#[derive(Default)]
pub struct PointerState {
    pub position: Option<Vec2>,
    pub ctrl_held: bool,
    press: Option<Press>,
}

impl PointerState {
    pub fn set_ctrl(&mut self, held: bool) {
        self.ctrl_held = held;
    }

    pub fn is_dragging(&self) -> bool {
        self.press.as_ref().is_some_and(|p| p.dragging)
    }

    pub fn on_moved(&mut self, pos: Vec2) -> PointerMotion {
        self.position = Some(pos);
        let ctrl = self.ctrl_held;
        let Some(press) = self.press.as_mut() else {
            return PointerMotion::Hover(pos);
        };
        if !press.dragging && press.origin.distance(pos) < DRAG_THRESHOLD {
            return PointerMotion::Pending;
        }
        press.dragging = true;
        let delta = pos - press.last;
        press.last = pos;
        PointerMotion::Drag(Gesture {
            kind: GestureKind::Pan(delta),
            ctrl,
            button: Some(press.button),
        })
    }

    /// Returns the click position when a release ends a press that never
    /// turned into a drag.
    pub fn on_button(&mut self, button: PointerButton, pressed: bool) -> Option<(PointerButton, Vec2)> {
        let pos = self.position?;
        if pressed {
            if self.press.is_none() {
                self.press = Some(Press {
                    button,
                    origin: pos,
                    last: pos,
                    dragging: false,
                });
            }
            return None;
        }
        match self.press.take() {
            Some(press) if press.button == button => {
                (!press.dragging).then_some((button, pos))
            }
            other => {
                self.press = other;
                None
            }
        }
    }

    pub fn on_wheel(&self, delta: ScrollDelta) -> Option<Gesture> {
        let anchor = self.position?;
        Some(Gesture {
            kind: GestureKind::Zoom {
                anchor,
                factor: delta.zoom_factor(),
            },
            ctrl: self.ctrl_held,
            button: None,
        })
    }

    pub fn on_left(&mut self) {
        self.position = None;
        self.press = None;
    }
}
