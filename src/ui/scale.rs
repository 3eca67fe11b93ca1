// Answer scales: one renderer per presentation style.
// All four take the same (style, min, max, value) and draw into a
// region; the value is clamped to the range before drawing.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Arc, Circle, Line, PrimitiveStyle, PrimitiveStyleBuilder, StrokeAlignment},
};

use super::palette::{self, gradient};
use super::widget::Region;
use crate::survey::PresentationStyle;

const CELL_GAP: u16 = 3;
const FACE_GAP: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Frown,
    Neutral,
    Smile,
}

/// Face `i` of `n`, left to right from frowning to smiling.
pub fn mood(i: u16, n: u16) -> Mood {
    let last = n.saturating_sub(1);
    match (2 * i).cmp(&last) {
        core::cmp::Ordering::Less => Mood::Frown,
        core::cmp::Ordering::Equal => Mood::Neutral,
        core::cmp::Ordering::Greater => Mood::Smile,
    }
}

/// The `i`th of `n` equal cells across `region`, centred horizontally.
pub fn cell(region: Region, n: u16, gap: u16, i: u16) -> Region {
    if n == 0 {
        return Region::new(region.x, region.y, 0, region.h);
    }
    let gaps = gap * (n - 1);
    let cell_w = region.w.saturating_sub(gaps) / n;
    let total = cell_w * n + gaps;
    let x0 = region.x + region.w.saturating_sub(total) / 2;
    Region::new(x0 + i * (cell_w + gap), region.y, cell_w, region.h)
}

pub fn draw_scale<D>(
    display: &mut D,
    region: Region,
    style: PresentationStyle,
    min: i16,
    max: i16,
    value: i16,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let value = value.clamp(min, max);
    let n = (max - min + 1) as u16;
    let pos = (value - min) as u16;

    match style {
        PresentationStyle::PlainBar => plain_bar(display, region, n, pos),
        PresentationStyle::SteppedBar => stepped_bar(display, region, n, pos),
        PresentationStyle::Emoji => emoji_row(display, region, n, pos),
        PresentationStyle::VolumeBar => volume_bar(display, region, n, pos),
    }
}

fn plain_bar<D>(display: &mut D, region: Region, n: u16, pos: u16) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let frame = PrimitiveStyleBuilder::new()
        .stroke_color(palette::TEXT)
        .stroke_width(2)
        .stroke_alignment(StrokeAlignment::Inside)
        .fill_color(palette::SCALE_EMPTY)
        .build();
    region.to_rect().into_styled(frame).draw(display)?;

    let inner = region.inset(3);
    let span = n.saturating_sub(1) as u32;
    let fill_w = if span == 0 {
        inner.w
    } else {
        (inner.w as u32 * pos as u32 / span) as u16
    };
    if fill_w > 0 {
        Region::new(inner.x, inner.y, fill_w, inner.h)
            .to_rect()
            .into_styled(PrimitiveStyle::with_fill(palette::ACCENT))
            .draw(display)?;
    }
    Ok(())
}

fn stepped_bar<D>(display: &mut D, region: Region, n: u16, pos: u16) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for i in 0..n {
        let c = cell(region, n, CELL_GAP, i);
        let fill = if i <= pos {
            gradient(i, n)
        } else {
            palette::SCALE_EMPTY
        };
        let mut style = PrimitiveStyleBuilder::new().fill_color(fill);
        if i == pos {
            style = style
                .stroke_color(palette::TEXT)
                .stroke_width(2)
                .stroke_alignment(StrokeAlignment::Inside);
        }
        c.to_rect().into_styled(style.build()).draw(display)?;
    }
    Ok(())
}

fn volume_bar<D>(display: &mut D, region: Region, n: u16, pos: u16) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for i in 0..n {
        let c = cell(region, n, CELL_GAP, i);
        // bottom-aligned, rising left to right
        let h = (region.h as u32 * (i as u32 + 1) / n as u32).max(1) as u16;
        let bar = Region::new(c.x, region.y + region.h - h, c.w, h);
        let fill = if i <= pos {
            palette::ACCENT
        } else {
            palette::SCALE_EMPTY
        };
        bar.to_rect()
            .into_styled(PrimitiveStyle::with_fill(fill))
            .draw(display)?;
    }
    Ok(())
}

fn emoji_row<D>(display: &mut D, region: Region, n: u16, pos: u16) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for i in 0..n {
        let c = cell(region, n, FACE_GAP, i);
        draw_face(display, c, mood(i, n), gradient(i, n), i == pos)?;
    }
    Ok(())
}

fn draw_face<D>(
    display: &mut D,
    cell: Region,
    mood: Mood,
    tint: Rgb565,
    selected: bool,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let d = cell.w.min(cell.h) as u32;
    if d < 8 {
        return Ok(());
    }
    let center = cell.center();
    let (fill, ring) = if selected {
        (tint, palette::TEXT)
    } else {
        (palette::PANEL, tint)
    };
    let head = PrimitiveStyleBuilder::new()
        .fill_color(fill)
        .stroke_color(ring)
        .stroke_width(2)
        .stroke_alignment(StrokeAlignment::Inside)
        .build();
    Circle::with_center(center, d).into_styled(head).draw(display)?;

    let ink = if selected { palette::BLACK } else { tint };
    let eye = (d / 8).max(2);
    let dx = (d / 5) as i32;
    let dy = (d / 6) as i32;
    let eye_style = PrimitiveStyle::with_fill(ink);
    Circle::with_center(center + Point::new(-dx, -dy), eye)
        .into_styled(eye_style)
        .draw(display)?;
    Circle::with_center(center + Point::new(dx, -dy), eye)
        .into_styled(eye_style)
        .draw(display)?;

    let mouth = PrimitiveStyle::with_stroke(ink, 2);
    match mood {
        Mood::Smile => Arc::with_center(
            center,
            d / 2,
            Angle::from_degrees(20.0),
            Angle::from_degrees(140.0),
        )
        .into_styled(mouth)
        .draw(display)?,
        Mood::Frown => Arc::with_center(
            center + Point::new(0, (d / 3) as i32),
            d / 2,
            Angle::from_degrees(200.0),
            Angle::from_degrees(140.0),
        )
        .into_styled(mouth)
        .draw(display)?,
        Mood::Neutral => {
            let y = (d / 5) as i32;
            Line::new(center + Point::new(-dx, y), center + Point::new(dx, y))
                .into_styled(mouth)
                .draw(display)?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::strip::StripBuffer;

    #[test]
    fn moods_run_frown_to_smile() {
        assert_eq!(mood(0, 5), Mood::Frown);
        assert_eq!(mood(2, 5), Mood::Neutral);
        assert_eq!(mood(4, 5), Mood::Smile);
        // even count has no neutral face
        assert_eq!(mood(1, 4), Mood::Frown);
        assert_eq!(mood(2, 4), Mood::Smile);
    }

    #[test]
    fn cells_are_centred() {
        let r = Region::new(0, 0, 50, 10);
        assert_eq!(cell(r, 5, 3, 0), Region::new(1, 0, 7, 10));
        assert_eq!(cell(r, 5, 3, 4), Region::new(41, 0, 7, 10));
    }

    #[test]
    fn stepped_fills_up_to_value() {
        let mut s = StripBuffer::new();
        let r = Region::new(0, 0, 50, 10);
        s.begin_window(0, 0, 50, 10);
        draw_scale(&mut s, r, PresentationStyle::SteppedBar, 1, 5, 3).unwrap();

        assert_eq!(s.pixel(4, 5), Some(gradient(0, 5)));
        assert_eq!(s.pixel(14, 5), Some(gradient(1, 5)));
        assert_eq!(s.pixel(44, 5), Some(palette::SCALE_EMPTY));
    }

    #[test]
    fn plain_bar_fill_tracks_value() {
        let mut s = StripBuffer::new();
        let r = Region::new(0, 0, 100, 10);
        s.begin_window(0, 0, 100, 10);
        draw_scale(&mut s, r, PresentationStyle::PlainBar, 0, 10, 5).unwrap();

        assert_eq!(s.pixel(0, 0), Some(palette::TEXT));
        assert_eq!(s.pixel(10, 5), Some(palette::ACCENT));
        assert_eq!(s.pixel(90, 5), Some(palette::SCALE_EMPTY));
    }

    #[test]
    fn value_outside_range_is_clamped() {
        let mut s = StripBuffer::new();
        let r = Region::new(0, 0, 100, 10);
        s.begin_window(0, 0, 100, 10);
        draw_scale(&mut s, r, PresentationStyle::PlainBar, 0, 10, 99).unwrap();
        assert_eq!(s.pixel(95, 5), Some(palette::ACCENT));
    }

    #[test]
    fn selected_face_is_filled() {
        let mut s = StripBuffer::new();
        let r = Region::new(0, 0, 120, 30);
        s.begin_window(0, 0, 120, 30);
        draw_scale(&mut s, r, PresentationStyle::Emoji, 1, 5, 5).unwrap();

        // cells are 20 wide at x = 2 + 24i
        assert_eq!(s.pixel(108, 15), Some(gradient(4, 5)));
        assert_eq!(s.pixel(12, 12), Some(palette::PANEL));
    }

    #[test]
    fn volume_bars_rise() {
        let mut s = StripBuffer::new();
        let r = Region::new(0, 0, 50, 20);
        s.begin_window(0, 0, 50, 20);
        draw_scale(&mut s, r, PresentationStyle::VolumeBar, 1, 5, 1).unwrap();

        // first bar is 4px tall and lit, last is full height and dark
        assert_eq!(s.pixel(4, 19), Some(palette::ACCENT));
        assert_eq!(s.pixel(4, 10), Some(palette::BLACK));
        assert_eq!(s.pixel(44, 1), Some(palette::SCALE_EMPTY));
    }
}
