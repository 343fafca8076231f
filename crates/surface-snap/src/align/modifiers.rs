use serde::{Deserialize, Serialize};

/// Keyboard modifier state read once per input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifierState {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
}

impl ModifierState {
    pub const NONE: Self = Self { ctrl: false, shift: false };
    pub const CTRL: Self = Self { ctrl: true, shift: false };
    pub const SHIFT: Self = Self { ctrl: false, shift: true };
    pub const CTRL_SHIFT: Self = Self { ctrl: true, shift: true };
}

impl From<egui::Modifiers> for ModifierState {
    fn from(m: egui::Modifiers) -> Self {
        Self {
            ctrl: m.ctrl,
            shift: m.shift,
        }
    }
}

/// How a drag step is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    /// Follow the pointer over the surface
    #[default]
    Free,
    /// Hold position, spin around the surface normal (Ctrl)
    RotateOnly,
    /// Hold position, scale uniformly (Shift)
    ScaleOnly,
    /// Follow the pointer, snapping to the nearest face vertex (Ctrl+Shift)
    VertexSnap,
}

impl DragMode {
    /// Modes that measure the pointer against a fixed reference point
    /// instead of following it.
    pub fn holds_position(self) -> bool {
        matches!(self, DragMode::RotateOnly | DragMode::ScaleOnly)
    }
}

/// Map the modifier state to a drag mode.
pub fn classify(state: ModifierState) -> DragMode {
    match (state.ctrl, state.shift) {
        (true, true) => DragMode::VertexSnap,
        (true, false) => DragMode::RotateOnly,
        (false, true) => DragMode::ScaleOnly,
        (false, false) => DragMode::Free,
    }
}
