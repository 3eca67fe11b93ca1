// Semantic actions decoupled from physical buttons.
//
// Apps match on Action, never on Button. The ButtonMapper translates
// gamepad events into actions; LedProfile is the separate table the
// gamepad test screen uses to pair buttons with LEDs.

use crate::board::button::Button;
use crate::drivers::input::Event;

/// Semantic input actions consumed by apps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// List up / scale up
    Up,
    /// List down / scale down
    Down,
    /// Step the value up (Right, Plus)
    Increase,
    /// Step the value down (Left, Minus)
    Decrease,
    /// Confirm / select / answer
    Confirm,
    /// Cancel / skip / go back
    Back,
    Menu,
}

/// Semantic input event, mirrors `drivers::input::Event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEvent {
    Press(Action),
    Release(Action),
}

/// Translates physical `Event` into semantic `ActionEvent`.
pub struct ButtonMapper;

impl Default for ButtonMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonMapper {
    pub const fn new() -> Self {
        Self
    }

    pub const fn map_button(&self, button: Button) -> Action {
        match button {
            Button::Up => Action::Up,
            Button::Down => Action::Down,
            Button::Right | Button::Plus => Action::Increase,
            Button::Left | Button::Minus => Action::Decrease,
            Button::A => Action::Confirm,
            Button::B => Action::Back,
            Button::X | Button::Y => Action::Menu,
        }
    }

    pub fn map_event(&self, event: Event) -> ActionEvent {
        match event {
            Event::Press(b) => ActionEvent::Press(self.map_button(b)),
            Event::Release(b) => ActionEvent::Release(self.map_button(b)),
        }
    }
}

/// Which buttons toggle which LED on the gamepad test screen.
/// Presentation only; the LED wire mapping lives in the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedProfile {
    /// A, B, X, Y -> LED 1..4
    #[default]
    Abxy,
    /// Left, Right, Y, A -> LED 1..4
    Lrya,
}

impl LedProfile {
    pub fn from_name(s: &[u8]) -> Option<Self> {
        if s.eq_ignore_ascii_case(b"abxy") {
            Some(Self::Abxy)
        } else if s.eq_ignore_ascii_case(b"lrya") {
            Some(Self::Lrya)
        } else {
            None
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Abxy => "abxy",
            Self::Lrya => "lrya",
        }
    }

    const fn order(self) -> [Button; 4] {
        match self {
            Self::Abxy => [Button::A, Button::B, Button::X, Button::Y],
            Self::Lrya => [Button::Left, Button::Right, Button::Y, Button::A],
        }
    }

    /// 1-based LED index for `button`, if it has one.
    pub fn led_for(self, button: Button) -> Option<u8> {
        self.order()
            .iter()
            .position(|&b| b == button)
            .map(|i| i as u8 + 1)
    }
}
