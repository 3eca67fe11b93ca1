// Answer log summary: row count, latest row, card and mode.
// Read-only, so it is the main screen in review mode.

use core::fmt::Write as _;

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_9X15};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::PrimitiveStyle;

use crate::apps::{App, AppContext, Services, Transition};
use crate::board::action::{Action, ActionEvent};
use crate::boot::BootMode;
use crate::drivers::storage::{FileStore, StorageError};
use crate::drivers::strip::StripBuffer;
use crate::survey::ANSWERS_FILE;
use crate::survey::answers::ROW_CAP;
use crate::ui::{Alignment, CONTENT_TOP, Label, Region, SCREEN_H, SCREEN_W, StackFmt, palette};

const LINE_H: u16 = 18;
const TEXT_X: u16 = 10;
const BODY_REGION: Region = Region::new(0, CONTENT_TOP, SCREEN_W, SCREEN_H - CONTENT_TOP);

fn line_region(i: u16) -> Region {
    Region::new(TEXT_X, CONTENT_TOP + 6 + i * LINE_H, SCREEN_W - 2 * TEXT_X, LINE_H)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Summary {
    Pending,
    Loaded { rows: u32 },
    Failed(StorageError),
}

pub struct LogInfoApp {
    summary: Summary,
    last: StackFmt<ROW_CAP>,
    mode: BootMode,
    card: bool,
}

impl LogInfoApp {
    pub fn new() -> Self {
        Self {
            summary: Summary::Pending,
            last: StackFmt::new(),
            mode: BootMode::Logging,
            card: false,
        }
    }
}

impl Default for LogInfoApp {
    fn default() -> Self {
        Self::new()
    }
}

impl App for LogInfoApp {
    fn on_enter(&mut self, ctx: &mut AppContext) {
        self.summary = Summary::Pending;
        self.last.clear();
        ctx.request_full_redraw();
    }

    fn on_event(&mut self, event: ActionEvent, ctx: &mut AppContext) -> Transition {
        match event {
            ActionEvent::Press(Action::Back) => Transition::Pop,
            // reload, e.g. after swapping the card
            ActionEvent::Press(Action::Confirm) => {
                self.summary = Summary::Pending;
                ctx.request_full_redraw();
                Transition::None
            }
            _ => Transition::None,
        }
    }

    fn needs_work(&self) -> bool {
        self.summary == Summary::Pending
    }

    fn on_work<S: FileStore>(
        &mut self,
        svc: &mut Services<'_, S>,
        ctx: &mut AppContext,
    ) -> Transition {
        self.mode = svc.mode();
        self.card = svc.card_present();
        self.last.clear();
        self.summary = match svc.answer_summary() {
            Ok(s) => {
                let _ = self.last.write_str(s.last.as_str());
                log::info!("log: {} rows in {}", s.rows, ANSWERS_FILE);
                Summary::Loaded { rows: s.rows }
            }
            Err(e) => {
                log::warn!("log: summary failed: {}", e);
                Summary::Failed(e)
            }
        };
        ctx.request_full_redraw();
        Transition::None
    }

    fn draw(&self, strip: &mut StripBuffer) {
        let _ = BODY_REGION
            .to_rect()
            .into_styled(PrimitiveStyle::with_fill(palette::BACKGROUND))
            .draw(strip);

        let mut line = StackFmt::<40>::new();

        let _ = write!(line, "File: {}", ANSWERS_FILE);
        let _ = Label::new(line_region(0), line.as_str(), &FONT_9X15).draw(strip);

        line.clear();
        match self.summary {
            Summary::Pending => {
                let _ = write!(line, "Reading...");
            }
            Summary::Loaded { rows } => {
                let _ = write!(line, "Answers: {}", rows);
            }
            Summary::Failed(e) => {
                let _ = write!(line, "Error: {}", e);
            }
        }
        let color = match self.summary {
            Summary::Failed(_) => palette::WARNING,
            _ => palette::TEXT,
        };
        let _ = Label::new(line_region(1), line.as_str(), &FONT_9X15)
            .color(color)
            .draw(strip);

        line.clear();
        if self.last.is_empty() {
            let _ = write!(line, "Last: -");
        } else {
            let _ = write!(line, "Last: {}", self.last.as_str());
        }
        let _ = Label::new(line_region(2), line.as_str(), &FONT_9X15)
            .color(palette::SKY_BLUE)
            .draw(strip);

        line.clear();
        let _ = write!(
            line,
            "Mode: {}   Card: {}",
            self.mode.name(),
            if self.card { "yes" } else { "no" }
        );
        let _ = Label::new(line_region(3), line.as_str(), &FONT_6X10)
            .color(palette::TEXT_DIM)
            .draw(strip);

        line.clear();
        let _ = write!(line, "Stack peak: {} B", crate::ui::stack_high_water_mark());
        let _ = Label::new(line_region(4), line.as_str(), &FONT_6X10)
            .color(palette::TEXT_DIM)
            .draw(strip);

        let help = Region::new(0, SCREEN_H - 12, SCREEN_W, 12);
        let _ = Label::new(help, "A: reload  B: back", &FONT_6X10)
            .color(palette::TEXT_DIM)
            .alignment(Alignment::Center)
            .draw(strip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::storage::mem::MemStore;
    use crate::survey::append_answer;

    fn load(app: &mut LogInfoApp, store: &MemStore, mode: BootMode) {
        let mut ctx = AppContext::new();
        app.on_enter(&mut ctx);
        assert!(app.needs_work());
        let mut svc = Services::new(store, mode, 0);
        app.on_work(&mut svc, &mut ctx);
        assert!(!app.needs_work());
    }

    #[test]
    fn shows_count_and_last_row() {
        let store = MemStore::new();
        append_answer(&store, 3, "mood", 4).unwrap();
        append_answer(&store, 9, "focus", 2).unwrap();

        let mut app = LogInfoApp::new();
        load(&mut app, &store, BootMode::Review);
        assert_eq!(app.summary, Summary::Loaded { rows: 2 });
        assert_eq!(app.last.as_str(), "9,focus,2");
        assert_eq!(app.mode, BootMode::Review);
        assert!(app.card);
    }

    #[test]
    fn missing_card_is_reported() {
        let store = MemStore::new();
        store.absent.set(true);
        let mut app = LogInfoApp::new();
        load(&mut app, &store, BootMode::Logging);
        assert_eq!(app.summary, Summary::Failed(StorageError::NoCard));
        assert!(!app.card);

        let mut strip = StripBuffer::new();
        strip.begin_strip(1);
        app.draw(&mut strip);
    }

    #[test]
    fn confirm_reloads_back_leaves() {
        let store = MemStore::new();
        let mut app = LogInfoApp::new();
        load(&mut app, &store, BootMode::Logging);
        let mut ctx = AppContext::new();
        app.on_event(ActionEvent::Press(Action::Confirm), &mut ctx);
        assert!(app.needs_work());
        assert_eq!(
            app.on_event(ActionEvent::Press(Action::Back), &mut ctx),
            Transition::Pop
        );
    }
}
