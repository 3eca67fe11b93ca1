// Launcher screen, entry point after boot
//
// Menu items: Start survey / Gamepad test / Answer log. In review mode
// the survey entry is shown greyed out and refuses to open.

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_9X15, FONT_10X20};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, PrimitiveStyleBuilder};

use crate::apps::{App, AppContext, AppId, Transition};
use crate::board::action::{Action, ActionEvent};
use crate::boot::BootMode;
use crate::drivers::strip::StripBuffer;
use crate::ui::{
    Alignment, CONTENT_TOP, Label, Region, SCREEN_H, SCREEN_W, StackFmt, palette, wrap_next,
    wrap_prev,
};

const ITEM_W: u16 = 180;
const ITEM_H: u16 = 22;
const ITEM_GAP: u16 = 4;
const ITEM_STRIDE: u16 = ITEM_H + ITEM_GAP;
const ITEM_X: u16 = (SCREEN_W - ITEM_W) / 2;
const ITEM_Y: u16 = CONTENT_TOP + 28;
const NUM_ITEMS: usize = 3;

const TITLE_REGION: Region = Region::new(0, CONTENT_TOP + 4, SCREEN_W, 20);
const NOTICE_REGION: Region = Region::new(0, SCREEN_H - 12, SCREEN_W, 12);

const ITEMS: [(&str, AppId); NUM_ITEMS] = [
    ("Start survey", AppId::Survey),
    ("Gamepad test", AppId::PadTest),
    ("Answer log", AppId::LogInfo),
];

const fn item_region(i: usize) -> Region {
    Region::new(ITEM_X, ITEM_Y + ITEM_STRIDE * i as u16, ITEM_W, ITEM_H)
}

pub struct HomeApp {
    mode: BootMode,
    selected: usize,
    notice: StackFmt<40>,
}

impl HomeApp {
    pub fn new(mode: BootMode) -> Self {
        Self {
            mode,
            selected: 0,
            notice: StackFmt::new(),
        }
    }

    fn enabled(&self, i: usize) -> bool {
        !(ITEMS[i].1 == AppId::Survey && !self.mode.is_logging())
    }

    fn set_notice(&mut self, text: &str, ctx: &mut AppContext) {
        self.notice.clear();
        let _ = core::fmt::Write::write_str(&mut self.notice, text);
        ctx.mark_dirty(NOTICE_REGION);
    }

    fn move_selection(&mut self, next: bool, ctx: &mut AppContext) {
        let old = self.selected;
        self.selected = if next {
            wrap_next(old, NUM_ITEMS)
        } else {
            wrap_prev(old, NUM_ITEMS)
        };
        ctx.mark_dirty(item_region(old));
        ctx.mark_dirty(item_region(self.selected));
    }

    // survey results and errors come back through the context message
    fn take_message(&mut self, ctx: &mut AppContext) {
        let msg = ctx.message();
        if !msg.is_empty() {
            let text = core::str::from_utf8(msg).unwrap_or("");
            self.notice.clear();
            let _ = core::fmt::Write::write_str(&mut self.notice, text);
            ctx.clear_message();
        }
    }
}

impl App for HomeApp {
    fn on_enter(&mut self, ctx: &mut AppContext) {
        self.selected = if self.mode.is_logging() { 0 } else { 2 };
        self.notice.clear();
        if !self.mode.is_logging() {
            let _ = core::fmt::Write::write_str(&mut self.notice, "Review mode: logging off");
        }
        self.take_message(ctx);
        ctx.request_full_redraw();
    }

    fn on_resume(&mut self, ctx: &mut AppContext) {
        self.notice.clear();
        self.take_message(ctx);
        ctx.request_full_redraw();
    }

    fn on_event(&mut self, event: ActionEvent, ctx: &mut AppContext) -> Transition {
        match event {
            ActionEvent::Press(Action::Down) => {
                self.move_selection(true, ctx);
                Transition::None
            }
            ActionEvent::Press(Action::Up) => {
                self.move_selection(false, ctx);
                Transition::None
            }
            ActionEvent::Press(Action::Confirm) => {
                if self.enabled(self.selected) {
                    Transition::Push(ITEMS[self.selected].1)
                } else {
                    self.set_notice("Survey disabled in review mode", ctx);
                    Transition::None
                }
            }
            _ => Transition::None,
        }
    }

    fn draw(&self, strip: &mut StripBuffer) {
        let _ = Region::new(0, CONTENT_TOP, SCREEN_W, SCREEN_H - CONTENT_TOP)
            .to_rect()
            .into_styled(PrimitiveStyle::with_fill(palette::BACKGROUND))
            .draw(strip);

        let _ = Label::new(TITLE_REGION, "Survey Pad", &FONT_10X20)
            .color(palette::PEACH)
            .alignment(Alignment::Center)
            .draw(strip);

        for (i, (label, _)) in ITEMS.iter().enumerate() {
            let region = item_region(i);
            let selected = i == self.selected;
            let (bg, fg) = match (selected, self.enabled(i)) {
                (true, true) => (palette::ACCENT, palette::BLACK),
                (true, false) => (palette::GRAY, palette::DARK_GRAY),
                (false, true) => (palette::PANEL, palette::TEXT),
                (false, false) => (palette::PANEL, palette::GRAY),
            };
            let style = PrimitiveStyleBuilder::new()
                .fill_color(bg)
                .stroke_color(palette::TEXT_DIM)
                .stroke_width(1)
                .build();
            let _ = region.to_rect().into_styled(style).draw(strip);
            let _ = Label::new(region, label, &FONT_9X15)
                .color(fg)
                .alignment(Alignment::Center)
                .draw(strip);
        }

        if !self.notice.is_empty() {
            let _ = Label::new(NOTICE_REGION, self.notice.as_str(), &FONT_6X10)
                .color(palette::WARNING)
                .alignment(Alignment::Center)
                .draw(strip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut HomeApp, ctx: &mut AppContext, a: Action) -> Transition {
        app.on_event(ActionEvent::Press(a), ctx)
    }

    #[test]
    fn menu_wraps_and_opens_items() {
        let mut app = HomeApp::new(BootMode::Logging);
        let mut ctx = AppContext::new();
        app.on_enter(&mut ctx);

        assert_eq!(press(&mut app, &mut ctx, Action::Confirm), Transition::Push(AppId::Survey));
        press(&mut app, &mut ctx, Action::Up);
        assert_eq!(press(&mut app, &mut ctx, Action::Confirm), Transition::Push(AppId::LogInfo));
        press(&mut app, &mut ctx, Action::Down);
        press(&mut app, &mut ctx, Action::Down);
        assert_eq!(press(&mut app, &mut ctx, Action::Confirm), Transition::Push(AppId::PadTest));
    }

    #[test]
    fn review_mode_blocks_survey() {
        let mut app = HomeApp::new(BootMode::Review);
        let mut ctx = AppContext::new();
        app.on_enter(&mut ctx);
        assert_eq!(app.notice.as_str(), "Review mode: logging off");

        // starts on the log, survey is one wrap away
        assert_eq!(press(&mut app, &mut ctx, Action::Down), Transition::None);
        assert_eq!(press(&mut app, &mut ctx, Action::Confirm), Transition::None);
        assert_eq!(app.notice.as_str(), "Survey disabled in review mode");
    }

    #[test]
    fn resume_shows_survey_result() {
        let mut app = HomeApp::new(BootMode::Logging);
        let mut ctx = AppContext::new();
        app.on_enter(&mut ctx);
        ctx.set_message(b"Thanks! 4 answers saved");
        app.on_resume(&mut ctx);
        assert_eq!(app.notice.as_str(), "Thanks! 4 answers saved");
        assert!(ctx.message().is_empty());
    }
}
