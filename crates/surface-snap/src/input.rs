//! Pointer events delivered to the tool.

use egui::{Pos2, PointerButton};
use serde::{Deserialize, Serialize};

use crate::align::ModifierState;

/// One input event, with the modifier state sampled once for it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Press {
        pos: Pos2,
        button: PointerButton,
        modifiers: ModifierState,
    },
    Drag {
        pos: Pos2,
        modifiers: ModifierState,
    },
    Release,
}

impl InputEvent {
    pub fn press(pos: Pos2, modifiers: ModifierState) -> Self {
        Self::Press {
            pos,
            button: PointerButton::Primary,
            modifiers,
        }
    }

    pub fn drag(pos: Pos2, modifiers: ModifierState) -> Self {
        Self::Drag { pos, modifiers }
    }

    /// Middle-button press, which exits the tool
    pub fn cancel(pos: Pos2) -> Self {
        Self::Press {
            pos,
            button: PointerButton::Middle,
            modifiers: ModifierState::NONE,
        }
    }
}

/// Pointer button as written in command scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    #[default]
    Left,
    Middle,
    Right,
}

impl From<Button> for PointerButton {
    fn from(b: Button) -> Self {
        match b {
            Button::Left => PointerButton::Primary,
            Button::Middle => PointerButton::Middle,
            Button::Right => PointerButton::Secondary,
        }
    }
}
