// Named colours (24-bit hex, packed to RGB565 at compile time).

use embedded_graphics::pixelcolor::Rgb565;

pub const fn rgb(hex: u32) -> Rgb565 {
    Rgb565::new(
        ((hex >> 16) & 0xFF) as u8 >> 3,
        ((hex >> 8) & 0xFF) as u8 >> 2,
        (hex & 0xFF) as u8 >> 3,
    )
}

pub const BLACK: Rgb565 = rgb(0x000000);
pub const WHITE: Rgb565 = rgb(0xFFFFFF);
pub const RED: Rgb565 = rgb(0xFF0000);
pub const GREEN: Rgb565 = rgb(0x00FF00);
pub const YELLOW: Rgb565 = rgb(0xFFFF00);
pub const GRAY: Rgb565 = rgb(0x808080);
pub const LIGHT_GRAY: Rgb565 = rgb(0xC0C0C0);
pub const DARK_GRAY: Rgb565 = rgb(0x404040);
pub const ORANGE: Rgb565 = rgb(0xFFA500);
pub const GOLD: Rgb565 = rgb(0xFFD700);
pub const SKY_BLUE: Rgb565 = rgb(0x87CEEB);
pub const TEAL: Rgb565 = rgb(0x008080);
pub const NAVY: Rgb565 = rgb(0x000080);
pub const LIME_GREEN: Rgb565 = rgb(0x32CD32);
pub const PEACH: Rgb565 = rgb(0xFFE5B4);

// roles
pub const BACKGROUND: Rgb565 = NAVY;
pub const PANEL: Rgb565 = DARK_GRAY;
pub const TEXT: Rgb565 = WHITE;
pub const TEXT_DIM: Rgb565 = LIGHT_GRAY;
pub const ACCENT: Rgb565 = GOLD;
pub const SCALE_EMPTY: Rgb565 = GRAY;
pub const WARNING: Rgb565 = ORANGE;

/// Red at `i == 0` through orange/yellow to green at `i == n - 1`.
pub fn gradient(i: u16, n: u16) -> Rgb565 {
    if n <= 1 {
        return GREEN;
    }
    // 0..=510: red ramps green up, then red down
    let t = i.min(n - 1) as u32 * 510 / (n - 1) as u32;
    let (r, g) = if t <= 255 { (255, t) } else { (510 - t, 255) };
    Rgb565::new((r >> 3) as u8, (g >> 2) as u8, 0)
}
