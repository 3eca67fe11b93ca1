// esp-hal side of the board: owns peripherals, builds the buses.
//
// SPI2 is shared. The bus sits in a RefCell owned by the caller and
// each chip select gets its own RefCellDevice borrowing it, so the bus
// has to outlive the TFT and SD drivers. main() never returns, so a
// local in main is enough.

use core::cell::RefCell;
use core::fmt;

use embedded_hal_bus::spi::RefCellDevice;
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{Level, Output, OutputConfig},
    i2c,
    peripherals::Peripherals,
    spi,
    time::Rate,
};
use log::{info, warn};

use super::pins;
use crate::drivers::qwstpad::Qwstpad;
use crate::drivers::sdcard::{SD_INIT_FREQ_HZ, SdStorage};
use crate::drivers::st7789::St7789;

// SD cards top out at 25 MHz in SPI mode; the panel runs at the same rate
pub const SPI_FREQ_MHZ: u32 = 20;

pub type SpiBus = spi::master::Spi<'static, Blocking>;
pub type I2cBus = i2c::master::I2c<'static, Blocking>;
pub type SpiDev<'a> = RefCellDevice<'a, SpiBus, Output<'static>, Delay>;
pub type Tft<'a> = St7789<SpiDev<'a>, Output<'static>, Output<'static>>;
pub type Sd<'a> = SdStorage<SpiDev<'a>, Delay>;
pub type Pad = Qwstpad<I2cBus>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    Spi,
    I2c,
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Spi => write!(f, "SPI2 config rejected"),
            BoardError::I2c => write!(f, "I2C0 config rejected"),
        }
    }
}

pub struct TftPins {
    pub cs: Output<'static>,
    pub dc: Output<'static>,
    pub rst: Output<'static>,
    pub backlight: Output<'static>,
}

pub struct Board {
    pub spi: SpiBus,
    pub i2c: I2cBus,
    pub tft: TftPins,
    pub sd_cs: Output<'static>,
}

impl Board {
    /// SPI comes up at the SD init rate; call `full_speed` once the
    /// card has been probed.
    pub fn init(p: Peripherals) -> Result<Self, BoardError> {
        let out = OutputConfig::default();

        // both chip selects idle high before the bus sees a clock
        let tft = TftPins {
            cs: Output::new(p.GPIO21, Level::High, out),
            dc: Output::new(p.GPIO4, Level::High, out),
            rst: Output::new(p.GPIO3, Level::High, out),
            backlight: Output::new(p.GPIO0, Level::High, out),
        };
        let sd_cs = Output::new(p.GPIO1, Level::High, out);

        let spi_cfg =
            spi::master::Config::default().with_frequency(Rate::from_hz(SD_INIT_FREQ_HZ));
        let spi = spi::master::Spi::new(p.SPI2, spi_cfg)
            .map_err(|_| BoardError::Spi)?
            .with_sck(p.GPIO8)
            .with_mosi(p.GPIO10)
            .with_miso(p.GPIO7);

        let i2c_cfg =
            i2c::master::Config::default().with_frequency(Rate::from_khz(pins::I2C_FREQ_KHZ));
        let i2c = i2c::master::I2c::new(p.I2C0, i2c_cfg)
            .map_err(|_| BoardError::I2c)?
            .with_sda(p.GPIO5)
            .with_scl(p.GPIO6);

        info!(
            "board: SPI2 sck={} mosi={} miso={}, I2C0 sda={} scl={} @ {} kHz",
            pins::SPI_SCK,
            pins::SPI_MOSI,
            pins::SPI_MISO,
            pins::I2C_SDA,
            pins::I2C_SCL,
            pins::I2C_FREQ_KHZ
        );

        Ok(Board {
            spi,
            i2c,
            tft,
            sd_cs,
        })
    }
}

// Output's pin error is Infallible, so these can't fail
pub fn sd_storage<'a>(bus: &'a RefCell<SpiBus>, cs: Output<'static>) -> Sd<'a> {
    let Ok(dev) = RefCellDevice::new(bus, cs, Delay::new());
    SdStorage::new(dev, Delay::new())
}

pub fn tft(bus: &RefCell<SpiBus>, pins: TftPins) -> (Tft<'_>, Output<'static>) {
    let Ok(dev) = RefCellDevice::new(bus, pins.cs, Delay::new());
    (St7789::new(dev, pins.dc, pins.rst), pins.backlight)
}

pub fn full_speed(bus: &RefCell<SpiBus>) {
    let cfg = spi::master::Config::default().with_frequency(Rate::from_mhz(SPI_FREQ_MHZ));
    if bus.borrow_mut().apply_config(&cfg).is_err() {
        warn!("board: SPI2 stays at {} Hz", SD_INIT_FREQ_HZ);
    }
}
