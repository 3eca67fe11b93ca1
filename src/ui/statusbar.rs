// Status bar: uptime, mode, card and gamepad health, answer count.

use core::fmt::Write;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::PrimitiveStyle;
use embedded_graphics::text::{Baseline, Text};

use super::palette;
use super::stack_fmt::StackFmt;
use super::widget::Region;
use crate::drivers::st7789::WIDTH;

pub const BAR_HEIGHT: u16 = 14;

pub const CONTENT_TOP: u16 = BAR_HEIGHT;

pub const BAR_REGION: Region = Region::new(0, 0, WIDTH, BAR_HEIGHT);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemStatus {
    pub uptime_secs: u32,
    pub logging: bool,
    pub sd_ok: bool,
    pub pad_ok: bool,
    pub answers: u32,
}

pub struct StatusBar {
    text: StackFmt<48>,
    warn: bool,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBar {
    pub const fn new() -> Self {
        Self {
            text: StackFmt::new(),
            warn: false,
        }
    }

    pub fn update(&mut self, s: &SystemStatus) {
        self.text.clear();

        let secs = s.uptime_secs % 60;
        let mins = (s.uptime_secs / 60) % 60;
        let hrs = s.uptime_secs / 3600;
        let w = &mut self.text;

        if hrs > 0 {
            let _ = write!(w, "{}:{:02}:{:02}", hrs, mins, secs);
        } else {
            let _ = write!(w, "{:02}:{:02}", mins, secs);
        }

        let _ = write!(w, "  {}", if s.logging { "LOG" } else { "REVIEW" });
        let _ = write!(w, "  SD:{}", if s.sd_ok { "OK" } else { "--" });
        let _ = write!(w, "  PAD:{}", if s.pad_ok { "OK" } else { "--" });
        if s.logging {
            let _ = write!(w, "  #{}", s.answers);
        }

        // a logging device that can't log is worth shouting about
        self.warn = s.logging && !(s.sd_ok && s.pad_ok);
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn draw<D>(&self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let bg = if self.warn {
            palette::WARNING
        } else {
            palette::PANEL
        };
        BAR_REGION
            .to_rect()
            .into_styled(PrimitiveStyle::with_fill(bg))
            .draw(display)?;

        let style = MonoTextStyle::new(&FONT_6X10, palette::TEXT);
        Text::with_baseline(self.text(), Point::new(4, 2), style, Baseline::Top).draw(display)?;
        Ok(())
    }

    pub fn region(&self) -> Region {
        BAR_REGION
    }
}

#[cfg_attr(not(target_arch = "riscv32"), allow(dead_code))]
const STACK_PAINT_WORD: u32 = 0xDEAD_BEEF;

// fill unused stack with a marker so the high-water mark can be read later
pub fn paint_stack() {
    #[cfg(target_arch = "riscv32")]
    {
        let sp: usize;
        unsafe {
            core::arch::asm!("mv {}, sp", out(reg) sp);
        }

        unsafe extern "C" {
            static _stack_end_cpu0: u8;
        }
        let bottom = (&raw const _stack_end_cpu0) as usize + 256;
        let top = sp.saturating_sub(256);
        if top <= bottom {
            return;
        }

        let mut addr = (bottom + 3) & !3;
        while addr + 4 <= top {
            unsafe {
                core::ptr::write_volatile(addr as *mut u32, STACK_PAINT_WORD);
            }
            addr += 4;
        }
    }
}

/// Deepest stack use since paint_stack(), in bytes. 0 off-target.
pub fn stack_high_water_mark() -> usize {
    #[cfg(target_arch = "riscv32")]
    {
        unsafe extern "C" {
            static _stack_end_cpu0: u8;
            static _stack_start_cpu0: u8;
        }
        let bottom = (&raw const _stack_end_cpu0) as usize + 256;
        let top = (&raw const _stack_start_cpu0) as usize;

        let mut addr = (bottom + 3) & !3;
        while addr + 4 <= top {
            let val = unsafe { core::ptr::read_volatile(addr as *const u32) };
            if val != STACK_PAINT_WORD {
                break;
            }
            addr += 4;
        }
        top.saturating_sub(addr)
    }

    #[cfg(not(target_arch = "riscv32"))]
    {
        0
    }
}
