// QwSTPad I2C gamepad (TCA9555-style 16-bit port expander)
//
// Ten active-low buttons on the input port, four LEDs on the output
// port. Every transaction is one register byte followed by a 16-bit
// little-endian payload at the fixed address 0x21.
//
// LedState is a 4-bit logical mask; it only reaches the wire through
// LED_MAPPING, so callers never see port bit numbers.

use core::fmt;

use embedded_hal::i2c::I2c;
use log::{info, warn};

pub const DEFAULT_ADDRESS: u8 = 0x21;

pub const NUM_LEDS: u8 = 4;

// logical LED i -> output port bit
pub const LED_MAPPING: [u8; NUM_LEDS as usize] = [6, 7, 9, 10];

// power-on configuration, written in this order
const CONFIG_WORD: u16 = 0b1111_1001_0011_1111;
const POLARITY_WORD: u16 = 0b1111_1000_0011_1111;
const OUTPUT_WORD: u16 = 0b0000_0110_1100_0000;

/// Registers the driver touches. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RegisterAddress {
    InputPort0 = 0x00,
    OutputPort0 = 0x02,
    Polarity = 0x05,
    Configuration = 0x06,
}

impl RegisterAddress {
    #[inline]
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Underlying I2C transaction failed.
    Bus(E),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "gamepad bus error: {:?}", e),
        }
    }
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}

// bit set = pressed; pure so edge logic is testable without a bus
#[inline]
pub const fn decode_buttons(raw: u16) -> u16 {
    !raw
}

// 4-bit logical state -> output port word; unmapped bits stay 0
pub fn led_word(state: u8) -> u16 {
    let mut out = 0u16;
    for (i, &bit) in LED_MAPPING.iter().enumerate() {
        if state & (1 << i) != 0 {
            out |= 1 << bit;
        }
    }
    out
}

pub struct Qwstpad<I2C> {
    i2c: I2C,
    address: u8,
    led_state: u8,
}

impl<I2C, E> Qwstpad<I2C>
where
    I2C: I2c<Error = E>,
    E: fmt::Debug,
{
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            led_state: 0,
        }
    }

    /// Write the three power-on configuration words (configuration,
    /// polarity, output) in order. On failure the error is logged and
    /// returned; the caller keeps running with an unconfigured pad.
    pub fn initialize(&mut self) -> Result<(), Error<E>> {
        let result = self
            .write_register16(RegisterAddress::Configuration, CONFIG_WORD)
            .and_then(|_| self.write_register16(RegisterAddress::Polarity, POLARITY_WORD))
            .and_then(|_| self.write_register16(RegisterAddress::OutputPort0, OUTPUT_WORD));

        match &result {
            Ok(()) => info!("qwstpad: initialized at {:#04x}", self.address),
            Err(e) => warn!("qwstpad: init failed: {}", e),
        }
        result
    }

    pub fn read_register16(&mut self, reg: RegisterAddress) -> Result<u16, Error<E>> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(self.address, &[reg.addr()], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn write_register16(&mut self, reg: RegisterAddress, value: u16) -> Result<(), Error<E>> {
        let [lo, hi] = value.to_le_bytes();
        self.i2c.write(self.address, &[reg.addr(), lo, hi])?;
        Ok(())
    }

    /// Current button mask, bit set = pressed (see `Button::bit`).
    pub fn read_buttons(&mut self) -> Result<u16, Error<E>> {
        let raw = self.read_register16(RegisterAddress::InputPort0)?;
        Ok(decode_buttons(raw))
    }

    pub fn led_state(&self) -> u8 {
        self.led_state
    }

    // index is 1-based; anything outside 1..=4 is ignored
    pub fn set_led(&mut self, index: u8, on: bool) -> Result<(), Error<E>> {
        if !(1..=NUM_LEDS).contains(&index) {
            return Ok(());
        }
        let bit = 1 << (index - 1);
        if on {
            self.led_state |= bit;
        } else {
            self.led_state &= !bit;
        }
        self.update_leds()
    }

    pub fn toggle_led(&mut self, index: u8) -> Result<(), Error<E>> {
        if !(1..=NUM_LEDS).contains(&index) {
            return Ok(());
        }
        self.led_state ^= 1 << (index - 1);
        self.update_leds()
    }

    pub fn clear_leds(&mut self) -> Result<(), Error<E>> {
        self.led_state = 0;
        self.update_leds()
    }

    pub fn toggle_all(&mut self) -> Result<(), Error<E>> {
        self.led_state ^= 0b1111;
        self.update_leds()
    }

    // light the first `count` LEDs, clear the rest
    pub fn show_level(&mut self, count: u8) -> Result<(), Error<E>> {
        let count = count.min(NUM_LEDS);
        self.led_state = ((1u16 << count) - 1) as u8;
        self.update_leds()
    }

    /// Push the whole LedState to the output port.
    pub fn update_leds(&mut self) -> Result<(), Error<E>> {
        self.write_register16(RegisterAddress::OutputPort0, led_word(self.led_state))
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = DEFAULT_ADDRESS;

    macro_rules! write16 {
        ($reg:expr, $val:expr) => {{
            let v: u16 = $val;
            I2cTransaction::write(ADDR, [$reg, v as u8, (v >> 8) as u8].to_vec())
        }};
    }

    #[test]
    fn initialize_writes_three_words_in_order() {
        let expectations = [
            write16!(0x06, 0b11111001_00111111),
            write16!(0x05, 0b11111000_00111111),
            write16!(0x02, 0b00000110_11000000),
        ];
        let mut pad = Qwstpad::new(I2cMock::new(&expectations));

        pad.initialize().unwrap();

        pad.release().done();
    }

    #[test]
    fn initialize_stops_at_first_failure() {
        let expectations =
            [write16!(0x06, 0b11111001_00111111).with_error(ErrorKind::Other)];
        let mut pad = Qwstpad::new(I2cMock::new(&expectations));

        assert_eq!(pad.initialize(), Err(Error::Bus(ErrorKind::Other)));

        pad.release().done();
    }

    #[test]
    fn read_register_is_little_endian() {
        let expectations = [I2cTransaction::write_read(
            ADDR,
            [0x00].to_vec(),
            [0x34, 0x12].to_vec(),
        )];
        let mut pad = Qwstpad::new(I2cMock::new(&expectations));

        assert_eq!(pad.read_register16(RegisterAddress::InputPort0).unwrap(), 0x1234);

        pad.release().done();
    }

    #[test]
    fn read_buttons_inverts_active_low_input() {
        // A (bit 14) and Up (bit 1) held low
        let raw: u16 = !((1 << 14) | (1 << 1));
        let expectations = [I2cTransaction::write_read(
            ADDR,
            [0x00].to_vec(),
            raw.to_le_bytes().to_vec(),
        )];
        let mut pad = Qwstpad::new(I2cMock::new(&expectations));

        assert_eq!(pad.read_buttons().unwrap(), (1 << 14) | (1 << 1));

        pad.release().done();
    }

    #[test]
    fn decode_is_inverted_raw() {
        for raw in [0x0000u16, 0xFFFF, 0xA5A5, 0x0001, 0x8000, 0xBFFD] {
            assert_eq!(decode_buttons(raw), !raw & 0xFFFF);
        }
    }

    #[test]
    fn toggle_led_two_drives_bit_seven() {
        let expectations = [write16!(0x02, 1 << 7)];
        let mut pad = Qwstpad::new(I2cMock::new(&expectations));

        pad.toggle_led(2).unwrap();
        assert_eq!(pad.led_state(), 0b0010);

        pad.release().done();
    }

    #[test]
    fn out_of_range_led_index_is_silent() {
        let expectations: [I2cTransaction; 0] = [];
        let mut pad = Qwstpad::new(I2cMock::new(&expectations));

        pad.toggle_led(0).unwrap();
        pad.toggle_led(5).unwrap();
        pad.set_led(9, true).unwrap();
        assert_eq!(pad.led_state(), 0);

        pad.release().done();
    }

    #[test]
    fn update_leds_is_idempotent() {
        let word = (1 << 6) | (1 << 10);
        let expectations = [
            write16!(0x02, (1 << 6)),
            write16!(0x02, word),
            write16!(0x02, word),
        ];
        let mut pad = Qwstpad::new(I2cMock::new(&expectations));

        pad.set_led(1, true).unwrap();
        pad.set_led(4, true).unwrap();
        pad.update_leds().unwrap();
        assert_eq!(pad.led_state(), 0b1001);

        pad.release().done();
    }

    #[test]
    fn toggle_all_then_clear() {
        let all = (1 << 6) | (1 << 7) | (1 << 9) | (1 << 10);
        let expectations = [write16!(0x02, all), write16!(0x02, 0)];
        let mut pad = Qwstpad::new(I2cMock::new(&expectations));

        pad.toggle_all().unwrap();
        assert_eq!(pad.led_state(), 0b1111);
        pad.clear_leds().unwrap();
        assert_eq!(pad.led_state(), 0);

        pad.release().done();
    }

    #[test]
    fn show_level_lights_prefix() {
        let expectations = [write16!(0x02, (1 << 6) | (1 << 7) | (1 << 9)), write16!(0x02, 0)];
        let mut pad = Qwstpad::new(I2cMock::new(&expectations));

        pad.show_level(3).unwrap();
        assert_eq!(pad.led_state(), 0b0111);
        pad.show_level(0).unwrap();

        pad.release().done();
    }

    #[test]
    fn led_word_never_sets_unmapped_bits() {
        let mapped: u16 = LED_MAPPING.iter().fold(0, |acc, &b| acc | (1 << b));
        for state in 0..16u8 {
            assert_eq!(led_word(state) & !mapped, 0);
        }
    }
}
