//! Survey Pad board support
//!
//! ESP32-C3 with a 1.14" ST7789 TFT and a microSD slot sharing SPI2,
//! and a QwSTPad gamepad on I2C0. Everything above `hw` is plain data
//! and compiles on the host; `hw` owns the esp-hal peripherals.

pub mod action;
pub mod button;
pub mod pins;

#[cfg(target_os = "none")]
mod hw;

#[cfg(target_os = "none")]
pub use hw::{
    Board, BoardError, I2cBus, Pad, SPI_FREQ_MHZ, Sd, SpiBus, SpiDev, Tft, TftPins, full_speed,
    sd_storage, tft,
};

pub use action::{Action, ActionEvent, ButtonMapper, LedProfile};
pub use button::{Button, ButtonMask};
