// Survey Pad: questionnaire logger for the ESP32-C3, QwSTPad gamepad
// on I2C, ST7789 TFT and microSD on a shared SPI bus.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod apps;
pub mod board;
pub mod boot;
pub mod drivers;
pub mod kernel;
pub mod settings;
pub mod survey;
pub mod ui;
