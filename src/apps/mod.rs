// App trait, nav stack, and Services syscall boundary.

pub mod home;
pub mod log_info;
pub mod survey;

use crate::board::action::ActionEvent;
use crate::boot::BootMode;
use crate::drivers::input::Event;
use crate::drivers::qwstpad::{self, Qwstpad};
use crate::drivers::storage::{FileStore, StorageError};
use crate::drivers::strip::StripBuffer;
use crate::survey::{self as domain, LogSummary, Questionnaire};
use crate::ui::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppId {
    Home,
    Survey,
    PadTest,
    LogInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Push(AppId),
    Pop,
    Replace(AppId),
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    None,
    Partial(Region),
    Full,
}

/// Gamepad LED request; applied by the main loop after the handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCmd {
    Clear,
    Toggle(u8),
    ToggleAll,
    /// Light LEDs 1..=n.
    Level(u8),
}

impl LedCmd {
    pub fn apply<I2C, E>(self, pad: &mut Qwstpad<I2C>) -> Result<(), qwstpad::Error<E>>
    where
        I2C: embedded_hal::i2c::I2c<Error = E>,
        E: core::fmt::Debug,
    {
        match self {
            LedCmd::Clear => pad.clear_leds(),
            LedCmd::Toggle(n) => pad.toggle_led(n),
            LedCmd::ToggleAll => pad.toggle_all(),
            LedCmd::Level(n) => pad.show_level(n),
        }
    }
}

const MSG_BUF_SIZE: usize = 40;

pub struct AppContext {
    msg_buf: [u8; MSG_BUF_SIZE],
    msg_len: usize,
    redraw: Redraw,
    leds: Option<LedCmd>,
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext {
    pub const fn new() -> Self {
        Self {
            msg_buf: [0u8; MSG_BUF_SIZE],
            msg_len: 0,
            redraw: Redraw::None,
            leds: None,
        }
    }

    pub fn set_message(&mut self, data: &[u8]) {
        let len = data.len().min(MSG_BUF_SIZE);
        self.msg_buf[..len].copy_from_slice(&data[..len]);
        self.msg_len = len;
    }

    pub fn message(&self) -> &[u8] {
        &self.msg_buf[..self.msg_len]
    }

    pub fn message_str(&self) -> &str {
        core::str::from_utf8(self.message()).unwrap_or("")
    }

    pub fn clear_message(&mut self) {
        self.msg_len = 0;
    }

    pub fn request_full_redraw(&mut self) {
        self.redraw = Redraw::Full;
    }

    pub fn request_partial_redraw(&mut self, region: Region) {
        match self.redraw {
            Redraw::Full => {}
            Redraw::Partial(existing) => {
                self.redraw = Redraw::Partial(existing.union(region));
            }
            Redraw::None => self.redraw = Redraw::Partial(region),
        }
    }

    #[inline]
    pub fn mark_dirty(&mut self, region: Region) {
        self.request_partial_redraw(region);
    }

    pub fn has_redraw(&self) -> bool {
        !matches!(self.redraw, Redraw::None)
    }

    pub fn take_redraw(&mut self) -> Redraw {
        let r = self.redraw;
        self.redraw = Redraw::None;
        r
    }

    // last request wins
    pub fn set_leds(&mut self, cmd: LedCmd) {
        self.leds = Some(cmd);
    }

    pub fn take_leds(&mut self) -> Option<LedCmd> {
        self.leds.take()
    }
}

/// What apps may do with the card. Writes are refused in review mode.
pub struct Services<'a, S: FileStore> {
    store: &'a S,
    mode: BootMode,
    uptime_secs: u32,
}

impl<'a, S: FileStore> Services<'a, S> {
    pub fn new(store: &'a S, mode: BootMode, uptime_secs: u32) -> Self {
        Self {
            store,
            mode,
            uptime_secs,
        }
    }

    pub fn mode(&self) -> BootMode {
        self.mode
    }

    pub fn card_present(&self) -> bool {
        self.store.is_present()
    }

    pub fn load_questions(&self) -> Questionnaire {
        Questionnaire::load(self.store)
    }

    /// Log one answer stamped with the current uptime.
    pub fn record_answer(&self, code: &str, score: i16) -> Result<(), StorageError> {
        if !self.mode.is_logging() {
            return Err(StorageError::ReadOnly);
        }
        domain::append_answer(self.store, self.uptime_secs, code, score)
    }

    pub fn answer_summary(&self) -> Result<LogSummary, StorageError> {
        domain::summarize(self.store)
    }
}

pub trait App {
    fn on_enter(&mut self, ctx: &mut AppContext);
    fn on_exit(&mut self) {}
    fn on_suspend(&mut self) {
        self.on_exit();
    }
    fn on_resume(&mut self, ctx: &mut AppContext) {
        self.on_enter(ctx);
    }
    fn on_event(&mut self, event: ActionEvent, ctx: &mut AppContext) -> Transition;

    /// Apps that care which physical button was pressed opt in here;
    /// they then get on_button() instead of on_event().
    fn wants_buttons(&self) -> bool {
        false
    }
    fn on_button(&mut self, _event: Event, _ctx: &mut AppContext) -> Transition {
        Transition::None
    }

    fn draw(&self, strip: &mut StripBuffer);

    fn needs_work(&self) -> bool {
        false
    }
    fn on_work<S: FileStore>(
        &mut self,
        _services: &mut Services<'_, S>,
        _ctx: &mut AppContext,
    ) -> Transition {
        Transition::None
    }
}

const MAX_STACK_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct NavEvent {
    pub from: AppId,
    pub to: AppId,
    pub suspend: bool,
    pub resume: bool,
}

pub struct Launcher {
    stack: [AppId; MAX_STACK_DEPTH],
    depth: usize,
    pub ctx: AppContext,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher {
    pub const fn new() -> Self {
        Self {
            stack: [AppId::Home; MAX_STACK_DEPTH],
            depth: 1,
            ctx: AppContext::new(),
        }
    }

    pub fn active(&self) -> AppId {
        self.stack[self.depth - 1]
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn apply(&mut self, transition: Transition) -> Option<NavEvent> {
        let old = self.active();

        let (suspend, resume) = match transition {
            Transition::None => return None,

            Transition::Push(id) => {
                if self.depth >= MAX_STACK_DEPTH {
                    log::warn!(
                        "nav stack full (depth {}), Push({:?}) degraded to Replace",
                        self.depth,
                        id
                    );
                    self.stack[self.depth - 1] = id;
                    (false, false)
                } else {
                    self.stack[self.depth] = id;
                    self.depth += 1;
                    (true, false)
                }
            }

            Transition::Pop => {
                if self.depth > 1 {
                    self.depth -= 1;
                    (false, true)
                } else {
                    return None;
                }
            }

            Transition::Replace(id) => {
                self.stack[self.depth - 1] = id;
                (false, false)
            }

            Transition::Home => {
                self.depth = 1;
                self.stack[0] = AppId::Home;
                (false, true)
            }
        };

        let new = self.active();
        if new != old {
            Some(NavEvent {
                from: old,
                to: new,
                suspend,
                resume,
            })
        } else {
            None
        }
    }
}
