// Widget toolkit for the 240x135 colour TFT.
// Region-based layout, strip-buffered rendering, RGB565 throughout.

pub mod label;
pub mod palette;
pub mod scale;
pub mod stack_fmt;
pub mod statusbar;
mod widget;

pub use label::{Label, draw_wrapped};
pub use scale::draw_scale;
pub use stack_fmt::StackFmt;
pub use statusbar::{
    BAR_HEIGHT, CONTENT_TOP, StatusBar, SystemStatus, paint_stack, stack_high_water_mark,
};
pub use widget::{Alignment, Region, wrap_next, wrap_prev};

pub use crate::drivers::st7789::{HEIGHT as SCREEN_H, WIDTH as SCREEN_W};
