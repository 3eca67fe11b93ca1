//! GPIO |     Function    |      Notes
//! -----+-----------------+----------------------------------
//!  0   | TFT backlight   | Active HIGH
//!  1   | SD CS           | SD card chip select
//!  3   | TFT RST         | Reset (active low)
//!  4   | TFT DC          | Data/Command select
//!  5   | I2C0 SDA        | QwSTPad (Qw/ST connector, 0x21)
//!  6   | I2C0 SCL        | QwSTPad
//!  7   | SPI2 MISO       | SD card data out (display is write-only)
//!  8   | SPI2 SCK        | Shared SPI clock
//! 10   | SPI2 MOSI       | Shared SPI data out
//! 21   | TFT CS          | Display chip select

// ----- TFT (ST7789) -----
pub const TFT_CS: u8 = 21;
pub const TFT_DC: u8 = 4;
pub const TFT_RST: u8 = 3;
pub const TFT_BL: u8 = 0;

// ----- SD Card -----
pub const SD_CS: u8 = 1;

// ----- SPI Bus (shared: TFT + SD) -----
pub const SPI_SCK: u8 = 8;
pub const SPI_MOSI: u8 = 10;
pub const SPI_MISO: u8 = 7;

// ----- Gamepad (I2C) -----
pub const I2C_SDA: u8 = 5;
pub const I2C_SCL: u8 = 6;
pub const I2C_FREQ_KHZ: u32 = 400;
