// Strip-based rendering buffer for the RGB565 TFT.
// 7.5KB strip instead of a 64KB framebuffer; the screen is drawn as
// horizontal bands. Widgets draw in screen coords, clipped here.
// begin_strip() for a full redraw, begin_window() for partial.

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::{
        Rgb565,
        raw::{RawData, RawU16},
    },
    primitives::Rectangle,
};

use super::st7789::{HEIGHT, WIDTH};
use crate::ui::Region;

pub const STRIP_ROWS: u16 = 16;
pub const STRIP_PIXELS: usize = WIDTH as usize * STRIP_ROWS as usize;
pub const STRIP_BUF_SIZE: usize = STRIP_PIXELS * 2; // 7680B
pub const STRIP_COUNT: u16 = HEIGHT.div_ceil(STRIP_ROWS); // 9 strips, last one short

pub struct StripBuffer {
    buf: [u8; STRIP_BUF_SIZE],
    win_x: u16,
    win_y: u16,
    win_w: u16,
    win_h: u16,
}

impl StripBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; STRIP_BUF_SIZE],
            win_x: 0,
            win_y: 0,
            win_w: WIDTH,
            win_h: STRIP_ROWS,
        }
    }

    pub fn begin_strip(&mut self, strip_idx: u16) {
        let y = strip_idx * STRIP_ROWS;
        let h = STRIP_ROWS.min(HEIGHT.saturating_sub(y));
        self.begin_window(0, y, WIDTH, h);
    }

    pub fn begin_window(&mut self, x: u16, y: u16, w: u16, mut h: u16) {
        if w == 0 {
            self.win_w = 0;
            self.win_h = 0;
            return;
        }
        let max_h = Self::max_rows_for_width(w);
        if h > max_h {
            log::warn!(
                "begin_window: {}x{} exceeds strip buf, clamping h -> {}",
                w,
                h,
                max_h
            );
            h = max_h;
        }

        self.win_x = x;
        self.win_y = y;
        self.win_w = w;
        self.win_h = h;

        let total = w as usize * h as usize * 2;
        self.buf[..total].fill(0);
    }

    // big-endian RGB565, row-major over the window
    pub fn data(&self) -> &[u8] {
        &self.buf[..self.win_w as usize * self.win_h as usize * 2]
    }

    pub fn window(&self) -> Region {
        Region::new(self.win_x, self.win_y, self.win_w, self.win_h)
    }

    pub const fn strip_count() -> u16 {
        STRIP_COUNT
    }

    pub fn max_rows_for_width(width: u16) -> u16 {
        if width == 0 {
            return 0;
        }
        (STRIP_PIXELS / width as usize) as u16
    }

    // screen coords; None outside the current window
    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb565> {
        let idx = self.index(x as i32, y as i32)?;
        let raw = u16::from_be_bytes([self.buf[idx], self.buf[idx + 1]]);
        Some(RawU16::new(raw).into())
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let lx = x - self.win_x as i32;
        let ly = y - self.win_y as i32;
        if lx < 0 || ly < 0 || lx >= self.win_w as i32 || ly >= self.win_h as i32 {
            return None;
        }
        Some((ly as usize * self.win_w as usize + lx as usize) * 2)
    }

    #[inline]
    fn put(&mut self, idx: usize, color: Rgb565) {
        let [hi, lo] = RawU16::from(color).into_inner().to_be_bytes();
        self.buf[idx] = hi;
        self.buf[idx + 1] = lo;
    }
}

impl Default for StripBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for StripBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for StripBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if let Some(idx) = self.index(coord.x, coord.y) {
                self.put(idx, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        // clip to window in i32 so negative origins work
        let x0 = area.top_left.x.max(self.win_x as i32);
        let y0 = area.top_left.y.max(self.win_y as i32);
        let x1 = (area.top_left.x + area.size.width as i32).min((self.win_x + self.win_w) as i32);
        let y1 = (area.top_left.y + area.size.height as i32).min((self.win_y + self.win_h) as i32);
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }

        let [hi, lo] = RawU16::from(color).into_inner().to_be_bytes();
        for y in y0..y1 {
            let Some(start) = self.index(x0, y) else {
                continue;
            };
            let end = start + (x1 - x0) as usize * 2;
            for px in self.buf[start..end].chunks_exact_mut(2) {
                px[0] = hi;
                px[1] = lo;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{
        pixelcolor::RgbColor,
        prelude::*,
        primitives::{PrimitiveStyle, Rectangle},
    };

    #[test]
    fn strips_cover_screen() {
        let mut s = StripBuffer::new();
        let mut rows = 0;
        for i in 0..StripBuffer::strip_count() {
            s.begin_strip(i);
            rows += s.window().h;
        }
        assert_eq!(rows, HEIGHT);
        assert_eq!(s.window().h, HEIGHT - (STRIP_COUNT - 1) * STRIP_ROWS);
    }

    #[test]
    fn fill_clips_to_window() {
        let mut s = StripBuffer::new();
        s.begin_strip(1); // rows 16..32

        Rectangle::new(Point::new(-5, 10), Size::new(20, 10))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
            .draw(&mut s)
            .unwrap();

        assert_eq!(s.pixel(0, 16), Some(Rgb565::RED));
        assert_eq!(s.pixel(14, 19), Some(Rgb565::RED));
        assert_eq!(s.pixel(15, 16), Some(Rgb565::BLACK));
        assert_eq!(s.pixel(0, 20), Some(Rgb565::BLACK));
        assert_eq!(s.pixel(0, 15), None);
    }

    #[test]
    fn pixels_are_big_endian() {
        let mut s = StripBuffer::new();
        s.begin_window(10, 10, 2, 1);
        Pixel(Point::new(11, 10), Rgb565::WHITE).draw(&mut s).unwrap();
        assert_eq!(s.data(), &[0x00, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn oversized_window_is_clamped() {
        let mut s = StripBuffer::new();
        s.begin_window(0, 0, 100, 135);
        assert_eq!(s.window().h, StripBuffer::max_rows_for_width(100));
        assert!(s.data().len() <= STRIP_BUF_SIZE);
    }
}
