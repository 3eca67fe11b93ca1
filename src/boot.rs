// Boot mode selection.
//
// Holding the review button while the device powers up starts it in
// review mode: answers can be browsed but nothing is written. Any
// other start logs. The gamepad LEDs blink once for review and twice
// for logging so the mode is visible before the screen comes up.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::board::button::{Button, ButtonMask};
use crate::drivers::qwstpad::{self, Qwstpad};

pub const BLINK_ON_MS: u32 = 150;
pub const BLINK_OFF_MS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootMode {
    /// Answers are appended to the card.
    Logging,
    /// Card is read-only; survey is unavailable.
    Review,
}

impl BootMode {
    /// `held` is the first gamepad sample; None if the pad didn't answer,
    /// in which case the device logs.
    pub fn select(held: Option<ButtonMask>, review_button: Button) -> Self {
        match held {
            Some(m) if m.is_held(review_button) => BootMode::Review,
            _ => BootMode::Logging,
        }
    }

    pub const fn blinks(self) -> u8 {
        match self {
            BootMode::Review => 1,
            BootMode::Logging => 2,
        }
    }

    pub const fn is_logging(self) -> bool {
        matches!(self, BootMode::Logging)
    }

    pub const fn name(self) -> &'static str {
        match self {
            BootMode::Logging => "logging",
            BootMode::Review => "review",
        }
    }
}

/// First button sample for `BootMode::select`. None (with a warning)
/// if the pad doesn't answer.
pub fn sample_held<I2C, E>(pad: &mut Qwstpad<I2C>) -> Option<ButtonMask>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    match pad.read_buttons() {
        Ok(raw) => Some(ButtonMask(raw)),
        Err(e) => {
            warn!("boot: no button sample ({}), logging mode", e);
            None
        }
    }
}

/// Flash all four LEDs `times` times, leaving them off.
pub fn blink<I2C, E, D>(
    pad: &mut Qwstpad<I2C>,
    delay: &mut D,
    times: u8,
) -> Result<(), qwstpad::Error<E>>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
    D: DelayNs,
{
    for _ in 0..times {
        pad.show_level(qwstpad::NUM_LEDS)?;
        delay.delay_ms(BLINK_ON_MS);
        pad.clear_leds()?;
        delay.delay_ms(BLINK_OFF_MS);
    }
    Ok(())
}
