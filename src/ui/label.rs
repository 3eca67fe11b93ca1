// Colour text labels for the TFT
// Label borrows its text; draw() paints the optional background and
// positions the text by the region's alignment. draw_wrapped() breaks
// on spaces for multi-line prompts.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::PrimitiveStyle,
    text::{Baseline, Text},
};

use super::widget::{Alignment, Region};

pub struct Label<'a> {
    region: Region,
    text: &'a str,
    font: &'static MonoFont<'static>,
    fg: Rgb565,
    bg: Option<Rgb565>,
    alignment: Alignment,
}

impl<'a> Label<'a> {
    pub fn new(region: Region, text: &'a str, font: &'static MonoFont<'static>) -> Self {
        Self {
            region,
            text,
            font,
            fg: super::palette::TEXT,
            bg: None,
            alignment: Alignment::CenterLeft,
        }
    }

    pub const fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub const fn color(mut self, fg: Rgb565) -> Self {
        self.fg = fg;
        self
    }

    pub const fn background(mut self, bg: Rgb565) -> Self {
        self.bg = Some(bg);
        self
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn draw<D>(&self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if let Some(bg) = self.bg {
            self.region
                .to_rect()
                .into_styled(PrimitiveStyle::with_fill(bg))
                .draw(display)?;
        }

        let size = text_size(self.font, self.text);
        let pos = self.alignment.position(self.region, size);
        let style = MonoTextStyle::new(self.font, self.fg);
        Text::with_baseline(self.text, pos, style, Baseline::Top).draw(display)?;
        Ok(())
    }
}

pub fn text_size(font: &MonoFont<'_>, text: &str) -> Size {
    let advance = font.character_size.width + font.character_spacing;
    Size::new(
        text.chars().count() as u32 * advance,
        font.character_size.height,
    )
}

/// Columns of `font` that fit in `width` pixels.
pub fn columns(font: &MonoFont<'_>, width: u16) -> usize {
    let advance = font.character_size.width + font.character_spacing;
    if advance == 0 {
        return 0;
    }
    (width as u32 / advance) as usize
}

/// Next line of `text` no wider than `cols` characters, and the rest.
/// Breaks at the last space that fits; hard-breaks words that don't.
pub fn split_line(text: &str, cols: usize) -> (&str, &str) {
    let text = text.trim_start();
    if cols == 0 {
        return ("", "");
    }

    let mut end = text.len();
    let mut last_space = None;
    for (n, (i, c)) in text.char_indices().enumerate() {
        if n == cols {
            end = i;
            break;
        }
        if c == ' ' {
            last_space = Some(i);
        }
    }
    if end == text.len() {
        return (text, "");
    }
    // the char right after the cut is a space: clean break
    if text[end..].starts_with(' ') {
        return (&text[..end], &text[end..]);
    }
    match last_space {
        Some(sp) if sp > 0 => (&text[..sp], &text[sp..]),
        _ => (&text[..end], &text[end..]),
    }
}

/// Word-wrap `text` into `region`, top-aligned. Lines that would fall
/// below the region are dropped. Returns the number of lines drawn.
pub fn draw_wrapped<D>(
    display: &mut D,
    region: Region,
    text: &str,
    font: &'static MonoFont<'static>,
    fg: Rgb565,
) -> Result<u16, D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let cols = columns(font, region.w);
    let line_h = font.character_size.height as u16 + 2;
    let style = MonoTextStyle::new(font, fg);

    let mut rest = text;
    let mut y = region.y;
    let mut lines = 0;
    while !rest.trim_start().is_empty() && y + line_h <= region.y + region.h {
        let (line, tail) = split_line(rest, cols);
        if line.is_empty() {
            break;
        }
        let size = text_size(font, line);
        let pos = Alignment::TopCenter.position(Region::new(region.x, y, region.w, line_h), size);
        Text::with_baseline(line, pos, style, Baseline::Top).draw(display)?;
        rest = tail;
        y += line_h;
        lines += 1;
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::strip::StripBuffer;
    use embedded_graphics::mono_font::ascii::FONT_6X10;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn wraps_at_spaces() {
        assert_eq!(split_line("how are you today", 10), ("how are", " you today"));
        assert_eq!(split_line(" you today", 10), ("you today", ""));
        assert_eq!(split_line("abcdefghijkl", 5), ("abcde", "fghijkl"));
        assert_eq!(split_line("exactly10 rest", 9), ("exactly10", " rest"));
    }

    #[test]
    fn size_counts_chars_not_bytes() {
        assert_eq!(text_size(&FONT_6X10, "ab").width, 12);
        assert_eq!(text_size(&FONT_6X10, "äb").width, 12);
        assert_eq!(columns(&FONT_6X10, 240), 40);
    }

    #[test]
    fn label_fills_background() {
        let mut s = StripBuffer::new();
        s.begin_window(0, 0, 40, 12);
        Label::new(Region::new(0, 0, 40, 12), "", &FONT_6X10)
            .background(Rgb565::BLUE)
            .draw(&mut s)
            .unwrap();
        assert_eq!(s.pixel(39, 11), Some(Rgb565::BLUE));
    }

    #[test]
    fn wrapped_text_stops_at_region_bottom() {
        let mut s = StripBuffer::new();
        s.begin_window(0, 0, 60, 40);
        // 10 cols, line height 12: 2 lines fit in 24px
        let n = draw_wrapped(
            &mut s,
            Region::new(0, 0, 60, 24),
            "one two three four five six",
            &FONT_6X10,
            Rgb565::WHITE,
        )
        .unwrap();
        assert_eq!(n, 2);
    }
}
