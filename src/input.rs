//! Pointer input types consumed by the canvas.
//!
//! Positions are always in model coordinates; converting from device
//! coordinates is the viewport's job.

/// A pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Set of buttons held during a pointer motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeldButtons {
    pub primary: bool,
    pub secondary: bool,
    pub middle: bool,
}

impl HeldButtons {
    pub const NONE: HeldButtons = HeldButtons {
        primary: false,
        secondary: false,
        middle: false,
    };

    /// Only `button` held.
    pub fn only(button: PointerButton) -> Self {
        let mut held = Self::NONE;
        match button {
            PointerButton::Primary => held.primary = true,
            PointerButton::Secondary => held.secondary = true,
            PointerButton::Middle => held.middle = true,
        }
        held
    }

    pub fn is_empty(&self) -> bool {
        !(self.primary || self.secondary || self.middle)
    }
}

/// Keyboard modifiers active during a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false };
    pub const CTRL: Modifiers = Modifiers { ctrl: true };
}
