//! Gesture classification.
//!
//! The UI layer resolves raw input-device state into these closed
//! enumerations once, at its boundary. The pipeline only ever switches on
//! [`Modifier`] and [`CombineOp`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Boolean operator used to merge a filled region into the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineOp {
    /// `accumulated OR region`.
    Add,
    /// `accumulated AND NOT region`.
    Subtract,
    /// `accumulated AND region`.
    Intersect,
    /// `region`.
    Replace,
}

/// Modifier attached to a selection click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Modifier {
    /// Plain click: start a fresh selection inside the rectangle, or
    /// start over when clicking outside it.
    #[default]
    None,
    /// Grow the selection.
    Add,
    /// Cut the filled region out of the selection.
    Subtract,
    /// Keep only the overlap with the filled region.
    Intersect,
}

impl Modifier {
    /// The mask operator this modifier applies.
    #[must_use]
    pub const fn combine_op(self) -> CombineOp {
        match self {
            Self::None => CombineOp::Replace,
            Self::Add => CombineOp::Add,
            Self::Subtract => CombineOp::Subtract,
            Self::Intersect => CombineOp::Intersect,
        }
    }
}

impl FromStr for Modifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "replace" => Ok(Self::None),
            "add" | "shift" => Ok(Self::Add),
            "subtract" | "sub" | "alt" => Ok(Self::Subtract),
            "intersect" | "shift+alt" | "alt+shift" => Ok(Self::Intersect),
            other => Err(format!(
                "unknown modifier {other:?} (expected none, add, subtract, or intersect)"
            )),
        }
    }
}

/// Held keyboard modifiers at the time of a mouse press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifierKeys {
    /// Shift is held.
    pub shift: bool,
    /// Alt is held.
    pub alt: bool,
    /// Ctrl is held.
    pub ctrl: bool,
}

/// What a mouse press should do, given the held keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    /// Ctrl-drag: the press and release corners define a new rectangle.
    DefineRectangle,
    /// Run a selection gesture with the given modifier.
    Select(Modifier),
    /// Unmapped key combination.
    Ignore,
}

impl ModifierKeys {
    /// Map held keys onto a gesture.
    ///
    /// Ctrl alone defines the rectangle, Shift adds, Alt subtracts,
    /// Shift+Alt intersects, and no keys is a plain click.
    #[must_use]
    pub const fn classify(self) -> KeyAction {
        match (self.shift, self.alt, self.ctrl) {
            (false, false, false) => KeyAction::Select(Modifier::None),
            (true, false, false) => KeyAction::Select(Modifier::Add),
            (false, true, false) => KeyAction::Select(Modifier::Subtract),
            (true, true, false) => KeyAction::Select(Modifier::Intersect),
            (false, false, true) => KeyAction::DefineRectangle,
            _ => KeyAction::Ignore,
        }
    }
}
