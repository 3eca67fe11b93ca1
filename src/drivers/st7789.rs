// ST7789 TFT driver (board-independent)
// 1.14" 135x240 IPS panel used in landscape (240x135). No framebuffer;
// pixels are streamed through the RGB565 StripBuffer one band at a time.
//
// The 240x320 controller RAM is larger than the glass, so every
// address window is shifted by the panel offsets.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use super::strip::{STRIP_COUNT, StripBuffer};
use crate::ui::Region;

pub const WIDTH: u16 = 240;
pub const HEIGHT: u16 = 135;

// landscape offsets into controller RAM
const X_OFFSET: u16 = 40;
const Y_OFFSET: u16 = 53;

mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const NORON: u8 = 0x13;
    pub const INVON: u8 = 0x21;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
}

// MADCTL: MX | MV -> landscape, RGB order
const MADCTL_LANDSCAPE: u8 = 0x60;
// 16 bits/pixel, 65K colour
const COLMOD_RGB565: u8 = 0x55;

// CASET/RASET payloads for a screen-space window
pub fn window_params(x: u16, y: u16, w: u16, h: u16) -> ([u8; 4], [u8; 4]) {
    let x0 = x + X_OFFSET;
    let x1 = x0 + w - 1;
    let y0 = y + Y_OFFSET;
    let y1 = y0 + h - 1;
    let [x0h, x0l] = x0.to_be_bytes();
    let [x1h, x1l] = x1.to_be_bytes();
    let [y0h, y0l] = y0.to_be_bytes();
    let [y1h, y1l] = y1.to_be_bytes();
    ([x0h, x0l, x1h, x1l], [y0h, y0l, y1h, y1l])
}

pub struct St7789<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    rst: RST,
}

impl<SPI, DC, RST> St7789<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: RST) -> Self {
        Self { spi, dc, rst }
    }

    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        let _ = self.rst.set_high();
        delay.delay_ms(10);
        let _ = self.rst.set_low();
        delay.delay_ms(10);
        let _ = self.rst.set_high();
        delay.delay_ms(120);
    }

    pub fn init<D: DelayNs>(&mut self, delay: &mut D) {
        self.reset(delay);

        self.send_command(cmd::SWRESET);
        delay.delay_ms(150);

        self.send_command(cmd::SLPOUT);
        delay.delay_ms(10);

        self.send_command(cmd::COLMOD);
        self.send_data(&[COLMOD_RGB565]);

        self.send_command(cmd::MADCTL);
        self.send_data(&[MADCTL_LANDSCAPE]);

        // IPS glass needs inversion for true colours
        self.send_command(cmd::INVON);
        self.send_command(cmd::NORON);
        delay.delay_ms(10);

        self.send_command(cmd::DISPON);
        delay.delay_ms(10);

        log::info!("st7789: {}x{} ready", WIDTH, HEIGHT);
    }

    /// Redraw the whole screen, one strip at a time.
    pub fn render_full<F>(&mut self, strip: &mut StripBuffer, draw: F)
    where
        F: Fn(&mut StripBuffer),
    {
        self.set_window(0, 0, WIDTH, HEIGHT);
        self.send_command(cmd::RAMWR);

        for i in 0..STRIP_COUNT {
            strip.begin_strip(i);
            draw(strip);
            self.send_data(strip.data());
        }
    }

    /// Redraw only `region`, split into as many windows as the strip
    /// buffer needs. Unlike e-paper there is no refresh cost, so no
    /// alignment or promotion to a full redraw.
    pub fn render_region<F>(&mut self, strip: &mut StripBuffer, region: Region, draw: F)
    where
        F: Fn(&mut StripBuffer),
    {
        let r = region.clip(WIDTH, HEIGHT);
        if r.w == 0 || r.h == 0 {
            return;
        }

        let max_rows = StripBuffer::max_rows_for_width(r.w);
        let mut y = r.y;
        while y < r.y + r.h {
            let rows = max_rows.min(r.y + r.h - y);
            strip.begin_window(r.x, y, r.w, rows);
            draw(strip);

            self.set_window(r.x, y, r.w, rows);
            self.send_command(cmd::RAMWR);
            self.send_data(strip.data());
            y += rows;
        }
    }

    fn set_window(&mut self, x: u16, y: u16, w: u16, h: u16) {
        let (cols, rows) = window_params(x, y, w, h);
        self.send_command(cmd::CASET);
        self.send_data(&cols);
        self.send_command(cmd::RASET);
        self.send_data(&rows);
    }

    fn send_command(&mut self, cmd: u8) {
        let _ = self.dc.set_low();
        let _ = self.spi.write(&[cmd]);
        let _ = self.dc.set_high();
    }

    fn send_data(&mut self, data: &[u8]) {
        let _ = self.dc.set_high();
        let _ = self.spi.write(data);
    }
}
