// Question-by-question survey run.
//
// Loading -> Asking(0..n) -> Done. Each question runs a ScoreFlow;
// Confirm queues the score and the write happens in on_work. A failed
// write ends the run and leaves the error on the home screen.

use core::fmt::Write as _;

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_9X15, FONT_10X20};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::PrimitiveStyle;

use crate::apps::{App, AppContext, LedCmd, Services, Transition};
use crate::board::action::{Action, ActionEvent};
use crate::drivers::storage::FileStore;
use crate::drivers::strip::StripBuffer;
use crate::survey::{FlowOutcome, Question, Questionnaire, ScoreFlow};
use crate::ui::{
    Alignment, CONTENT_TOP, Label, Region, SCREEN_H, SCREEN_W, StackFmt, draw_scale, draw_wrapped,
    palette,
};

const MARGIN: u16 = 8;
const HEADER_REGION: Region = Region::new(MARGIN, CONTENT_TOP + 2, SCREEN_W - 2 * MARGIN, 10);
const PROMPT_REGION: Region = Region::new(MARGIN, CONTENT_TOP + 14, SCREEN_W - 2 * MARGIN, 36);
const SCALE_REGION: Region = Region::new(12, CONTENT_TOP + 52, SCREEN_W - 24, 40);
const VALUE_REGION: Region = Region::new(12, CONTENT_TOP + 94, SCREEN_W - 24, 12);
const HELP_REGION: Region = Region::new(0, SCREEN_H - 11, SCREEN_W, 11);
const BODY_REGION: Region = Region::new(0, CONTENT_TOP, SCREEN_W, SCREEN_H - CONTENT_TOP);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Loading,
    Asking,
    Done,
}

pub struct SurveyApp {
    state: State,
    questions: Questionnaire,
    index: usize,
    flow: ScoreFlow,
    pending: Option<i16>,
    answered: u8,
    skipped: u8,
    led_feedback: bool,
}

impl Default for SurveyApp {
    fn default() -> Self {
        Self::new()
    }
}

impl SurveyApp {
    pub fn new() -> Self {
        Self {
            state: State::Loading,
            questions: Questionnaire::empty(),
            index: 0,
            flow: ScoreFlow::new(0, 0),
            pending: None,
            answered: 0,
            skipped: 0,
            led_feedback: true,
        }
    }

    pub fn set_led_feedback(&mut self, on: bool) {
        self.led_feedback = on;
    }

    fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    fn show_level(&self, ctx: &mut AppContext) {
        if self.led_feedback {
            ctx.set_leds(LedCmd::Level(self.flow.led_level()));
        }
    }

    // move to question `idx`, or finish
    fn ask(&mut self, idx: usize, ctx: &mut AppContext) {
        self.index = idx;
        match self.questions.get(idx) {
            Some(q) => {
                self.flow = ScoreFlow::for_question(q);
                self.state = State::Asking;
                self.show_level(ctx);
            }
            None => {
                self.state = State::Done;
                ctx.set_leds(LedCmd::Clear);
                log::info!(
                    "survey: done, {} answered, {} skipped",
                    self.answered,
                    self.skipped
                );
            }
        }
        ctx.request_full_redraw();
    }

    fn on_asking(&mut self, action: Action, ctx: &mut AppContext) -> Transition {
        if action == Action::Menu {
            log::info!("survey: abandoned at question {}", self.index + 1);
            ctx.set_leds(LedCmd::Clear);
            return Transition::Pop;
        }
        match self.flow.on_action(action) {
            FlowOutcome::Pending => {}
            FlowOutcome::Changed => {
                ctx.mark_dirty(SCALE_REGION.union(VALUE_REGION));
                self.show_level(ctx);
            }
            FlowOutcome::Answered(score) => {
                self.pending = Some(score);
            }
            FlowOutcome::Skipped => {
                self.skipped += 1;
                self.ask(self.index + 1, ctx);
            }
        }
        Transition::None
    }
}

impl App for SurveyApp {
    fn on_enter(&mut self, ctx: &mut AppContext) {
        ctx.clear_message();
        self.state = State::Loading;
        self.index = 0;
        self.pending = None;
        self.answered = 0;
        self.skipped = 0;
        ctx.request_full_redraw();
    }

    fn on_exit(&mut self) {
        self.pending = None;
    }

    fn on_event(&mut self, event: ActionEvent, ctx: &mut AppContext) -> Transition {
        let ActionEvent::Press(action) = event else {
            return Transition::None;
        };
        match self.state {
            // a queued answer must land before anything else happens
            _ if self.pending.is_some() => Transition::None,
            State::Loading => Transition::None,
            State::Asking => self.on_asking(action, ctx),
            State::Done => match action {
                Action::Confirm | Action::Back | Action::Menu => {
                    let mut msg = StackFmt::<40>::new();
                    let _ = write!(msg, "Thanks! {} answers saved", self.answered);
                    ctx.set_message(msg.as_str().as_bytes());
                    Transition::Pop
                }
                _ => Transition::None,
            },
        }
    }

    fn draw(&self, strip: &mut StripBuffer) {
        let _ = BODY_REGION
            .to_rect()
            .into_styled(PrimitiveStyle::with_fill(palette::BACKGROUND))
            .draw(strip);

        match self.state {
            State::Loading => {
                let _ = Label::new(BODY_REGION, "Loading questions...", &FONT_9X15)
                    .alignment(Alignment::Center)
                    .draw(strip);
            }
            State::Asking => self.draw_question(strip),
            State::Done => self.draw_done(strip),
        }
    }

    fn needs_work(&self) -> bool {
        self.state == State::Loading || self.pending.is_some()
    }

    fn on_work<S: FileStore>(
        &mut self,
        svc: &mut Services<'_, S>,
        ctx: &mut AppContext,
    ) -> Transition {
        if self.state == State::Loading {
            self.questions = svc.load_questions();
            self.ask(0, ctx);
            return Transition::None;
        }

        let Some(score) = self.pending.take() else {
            return Transition::None;
        };
        let Some(q) = self.current() else {
            return Transition::None;
        };

        match svc.record_answer(q.code(), score) {
            Ok(()) => {
                log::info!("survey: {}={}", q.code(), score);
                self.answered += 1;
                self.ask(self.index + 1, ctx);
                Transition::None
            }
            Err(e) => {
                log::error!("survey: could not save {}: {}", q.code(), e);
                let mut msg = StackFmt::<40>::new();
                let _ = write!(msg, "Not saved: {}", e);
                ctx.set_message(msg.as_str().as_bytes());
                ctx.set_leds(LedCmd::Clear);
                Transition::Pop
            }
        }
    }
}

// drawing
impl SurveyApp {
    fn draw_question(&self, strip: &mut StripBuffer) {
        let Some(q) = self.current() else {
            return;
        };

        let mut header = StackFmt::<24>::new();
        let _ = write!(header, "{}/{}  {}", self.index + 1, self.questions.len(), q.code());
        let _ = Label::new(HEADER_REGION, header.as_str(), &FONT_6X10)
            .color(palette::TEXT_DIM)
            .draw(strip);

        let _ = draw_wrapped(strip, PROMPT_REGION, q.prompt(), &FONT_9X15, palette::TEXT);

        let (min, max) = self.flow.range();
        let _ = draw_scale(strip, SCALE_REGION, q.style, min, max, self.flow.value());

        // min ... value ... max
        let mut n = StackFmt::<8>::new();
        let _ = write!(n, "{}", min);
        let _ = Label::new(VALUE_REGION, n.as_str(), &FONT_6X10)
            .color(palette::TEXT_DIM)
            .draw(strip);
        n.clear();
        let _ = write!(n, "{}", max);
        let w = n.len() as u16 * 6;
        let right = Region::new(VALUE_REGION.x + VALUE_REGION.w - w, VALUE_REGION.y, w, VALUE_REGION.h);
        let _ = Label::new(right, n.as_str(), &FONT_6X10)
            .color(palette::TEXT_DIM)
            .draw(strip);
        n.clear();
        let _ = write!(n, "{}", self.flow.value());
        let _ = Label::new(VALUE_REGION, n.as_str(), &FONT_6X10)
            .color(palette::ACCENT)
            .alignment(Alignment::Center)
            .draw(strip);

        let _ = Label::new(HELP_REGION, "</>: change  A: ok  B: skip  X: quit", &FONT_6X10)
            .color(palette::TEXT_DIM)
            .alignment(Alignment::Center)
            .draw(strip);
    }

    fn draw_done(&self, strip: &mut StripBuffer) {
        let title = Region::new(0, CONTENT_TOP + 20, SCREEN_W, 24);
        let _ = Label::new(title, "Thank you!", &FONT_10X20)
            .color(palette::PEACH)
            .alignment(Alignment::Center)
            .draw(strip);

        let mut line = StackFmt::<40>::new();
        let _ = write!(line, "{} answered, {} skipped", self.answered, self.skipped);
        let body = Region::new(0, CONTENT_TOP + 56, SCREEN_W, 16);
        let _ = Label::new(body, line.as_str(), &FONT_9X15)
            .alignment(Alignment::Center)
            .draw(strip);

        let _ = Label::new(HELP_REGION, "A: back to menu", &FONT_6X10)
            .color(palette::TEXT_DIM)
            .alignment(Alignment::Center)
            .draw(strip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boot::BootMode;
    use crate::drivers::storage::mem::MemStore;
    use crate::survey::ANSWERS_FILE;

    fn press(app: &mut SurveyApp, ctx: &mut AppContext, a: Action) -> Transition {
        app.on_event(ActionEvent::Press(a), ctx)
    }

    fn work(app: &mut SurveyApp, store: &MemStore, ctx: &mut AppContext) -> Transition {
        let mut svc = Services::new(store, BootMode::Logging, 60);
        app.on_work(&mut svc, ctx)
    }

    fn started(store: &MemStore) -> (SurveyApp, AppContext) {
        let mut app = SurveyApp::new();
        let mut ctx = AppContext::new();
        app.on_enter(&mut ctx);
        assert!(app.needs_work());
        work(&mut app, store, &mut ctx);
        (app, ctx)
    }

    #[test]
    fn answers_are_logged_in_order() {
        let store = MemStore::new().with_file(
            "QUESTNS.TXT",
            b"q1;bar;1;3;First?\nq2;steps;0;4;Second?\n",
        );
        let (mut app, mut ctx) = started(&store);

        // q1 starts at 2; two ups clamp at 3
        press(&mut app, &mut ctx, Action::Increase);
        press(&mut app, &mut ctx, Action::Increase);
        press(&mut app, &mut ctx, Action::Confirm);
        assert!(app.needs_work());
        assert_eq!(work(&mut app, &store, &mut ctx), Transition::None);

        // q2 starts at 2
        press(&mut app, &mut ctx, Action::Decrease);
        press(&mut app, &mut ctx, Action::Confirm);
        work(&mut app, &store, &mut ctx);

        assert_eq!(app.state, State::Done);
        assert_eq!(
            store.contents(ANSWERS_FILE).unwrap(),
            b"timestamp,variable,score\n60,q1,3\n60,q2,1\n".to_vec()
        );
        assert_eq!(press(&mut app, &mut ctx, Action::Confirm), Transition::Pop);
        assert_eq!(ctx.message_str(), "Thanks! 2 answers saved");
    }

    #[test]
    fn skip_writes_nothing() {
        let store = MemStore::new().with_file("QUESTNS.TXT", b"q1;bar;1;3;Only?\n");
        let (mut app, mut ctx) = started(&store);

        press(&mut app, &mut ctx, Action::Back);
        assert!(!app.needs_work());
        assert_eq!(app.state, State::Done);
        assert!(store.contents(ANSWERS_FILE).is_none());
    }

    #[test]
    fn failed_write_ends_run_with_message() {
        let store = MemStore::new();
        let (mut app, mut ctx) = started(&store);
        store.fail_writes.set(true);

        press(&mut app, &mut ctx, Action::Confirm);
        assert_eq!(work(&mut app, &store, &mut ctx), Transition::Pop);
        assert_eq!(ctx.message_str(), "Not saved: write failed");
        assert_eq!(ctx.take_leds(), Some(LedCmd::Clear));
    }

    #[test]
    fn input_is_held_while_answer_is_pending() {
        let store = MemStore::new();
        let (mut app, mut ctx) = started(&store);
        press(&mut app, &mut ctx, Action::Confirm);
        assert_eq!(press(&mut app, &mut ctx, Action::Menu), Transition::None);
        assert_eq!(app.index, 0);
    }

    #[test]
    fn value_changes_drive_led_level() {
        let store = MemStore::new();
        let (mut app, mut ctx) = started(&store);
        // built-in mood question, 1..=5, starts at 3
        assert_eq!(ctx.take_leds(), Some(LedCmd::Level(2)));
        press(&mut app, &mut ctx, Action::Increase);
        press(&mut app, &mut ctx, Action::Increase);
        assert_eq!(ctx.take_leds(), Some(LedCmd::Level(4)));

        app.set_led_feedback(false);
        press(&mut app, &mut ctx, Action::Decrease);
        assert_eq!(ctx.take_leds(), None);
    }

    #[test]
    fn menu_abandons_the_run() {
        let store = MemStore::new();
        let (mut app, mut ctx) = started(&store);
        // the meter for the first question is lit
        assert!(matches!(ctx.take_leds(), Some(LedCmd::Level(_))));
        assert_eq!(press(&mut app, &mut ctx, Action::Menu), Transition::Pop);
        app.on_exit();
        assert_eq!(ctx.take_leds(), Some(LedCmd::Clear));
        assert!(store.contents(crate::survey::ANSWERS_FILE).is_none());
    }

    #[test]
    fn draws_every_state_without_panicking() {
        let store = MemStore::new();
        let mut app = SurveyApp::new();
        let mut strip = StripBuffer::new();
        let mut ctx = AppContext::new();
        app.on_enter(&mut ctx);
        for i in 0..StripBuffer::strip_count() {
            strip.begin_strip(i);
            app.draw(&mut strip);
        }
        work(&mut app, &store, &mut ctx);
        for _ in 0..5 {
            for i in 0..StripBuffer::strip_count() {
                strip.begin_strip(i);
                app.draw(&mut strip);
            }
            press(&mut app, &mut ctx, Action::Back);
        }
        assert_eq!(app.state, State::Done);
    }
}
