//! Button definitions for the QwSTPad gamepad
//!
//! All ten buttons sit on the expander's 16-bit input port. Each
//! maps to one fixed bit of the (already inverted) button mask.

/// All physical buttons on the gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    // face cluster
    A,
    B,
    X,
    Y,
    // d-pad
    Up,
    Down,
    Left,
    Right,
    // centre pair
    Plus,
    Minus,
}

// (button, mask bit); also the order edges are reported in
pub const BUTTON_TABLE: [(Button, u8); 10] = [
    (Button::A, 0xE),
    (Button::B, 0xC),
    (Button::X, 0xF),
    (Button::Y, 0xD),
    (Button::Up, 0x1),
    (Button::Down, 0x4),
    (Button::Left, 0x2),
    (Button::Right, 0x3),
    (Button::Plus, 0xB),
    (Button::Minus, 0x5),
];

impl Button {
    pub const fn bit(self) -> u8 {
        match self {
            Button::A => 0xE,
            Button::B => 0xC,
            Button::X => 0xF,
            Button::Y => 0xD,
            Button::Up => 0x1,
            Button::Down => 0x4,
            Button::Left => 0x2,
            Button::Right => 0x3,
            Button::Plus => 0xB,
            Button::Minus => 0x5,
        }
    }

    #[inline]
    pub const fn mask(self) -> u16 {
        1 << self.bit()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
            Button::Up => "U",
            Button::Down => "D",
            Button::Left => "L",
            Button::Right => "R",
            Button::Plus => "+",
            Button::Minus => "-",
        }
    }

    // settings-file spelling
    pub fn key(self) -> &'static str {
        match KEYS.iter().find(|&&(_, b)| b == self) {
            Some(&(k, _)) => k,
            None => "?",
        }
    }

    // settings-file spelling, case-insensitive
    pub fn from_name(s: &[u8]) -> Option<Self> {
        KEYS.iter()
            .find(|(k, _)| k.as_bytes().eq_ignore_ascii_case(s))
            .map(|&(_, b)| b)
    }
}

const KEYS: [(&str, Button); 10] = [
    ("a", Button::A),
    ("b", Button::B),
    ("x", Button::X),
    ("y", Button::Y),
    ("up", Button::Up),
    ("down", Button::Down),
    ("left", Button::Left),
    ("right", Button::Right),
    ("plus", Button::Plus),
    ("minus", Button::Minus),
];

impl core::fmt::Display for Button {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of all buttons, bit set = held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonMask(pub u16);

impl ButtonMask {
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn is_held(self, button: Button) -> bool {
        self.0 & button.mask() != 0
    }

    // held now, not held in `prev`
    #[inline]
    pub const fn just_pressed(self, prev: ButtonMask, button: Button) -> bool {
        self.is_held(button) && !prev.is_held(button)
    }

    #[inline]
    pub const fn just_released(self, prev: ButtonMask, button: Button) -> bool {
        !self.is_held(button) && prev.is_held(button)
    }

    pub fn held(self) -> impl Iterator<Item = Button> {
        BUTTON_TABLE
            .into_iter()
            .filter(move |&(b, _)| self.is_held(b))
            .map(|(b, _)| b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_bit() {
        for (b, bit) in BUTTON_TABLE {
            assert_eq!(b.bit(), bit);
        }
    }

    #[test]
    fn bits_are_distinct() {
        let all = BUTTON_TABLE.iter().fold(0u16, |acc, &(b, _)| {
            assert_eq!(acc & b.mask(), 0);
            acc | b.mask()
        });
        assert_eq!(all.count_ones(), 10);
    }

    #[test]
    fn rising_edge_needs_previous_clear() {
        let prev = ButtonMask(Button::A.mask());
        let curr = ButtonMask(Button::A.mask() | Button::B.mask());

        assert!(!curr.just_pressed(prev, Button::A));
        assert!(curr.just_pressed(prev, Button::B));
        assert!(!curr.just_pressed(prev, Button::X));
        assert!(prev.just_released(curr, Button::B));
    }

    #[test]
    fn rising_edge_on_every_button() {
        for (b, _) in BUTTON_TABLE {
            let held = ButtonMask(b.mask());
            assert!(held.just_pressed(ButtonMask::NONE, b));
            assert!(!held.just_pressed(held, b));
            assert!(!ButtonMask::NONE.just_pressed(held, b));
            assert!(held.just_pressed(ButtonMask(!b.mask()), b));
        }
    }

    #[test]
    fn names_parse_case_insensitive() {
        assert_eq!(Button::from_name(b"Minus"), Some(Button::Minus));
        assert_eq!(Button::from_name(b"LEFT"), Some(Button::Left));
        assert_eq!(Button::from_name(b"start"), None);
        for (b, _) in BUTTON_TABLE {
            assert_eq!(Button::from_name(b.key().as_bytes()), Some(b));
        }
    }

    #[test]
    fn held_lists_in_table_order() {
        let m = ButtonMask(Button::Minus.mask() | Button::A.mask());
        let mut it = m.held();
        assert_eq!(it.next(), Some(Button::A));
        assert_eq!(it.next(), Some(Button::Minus));
        assert_eq!(it.next(), None);
    }
}
