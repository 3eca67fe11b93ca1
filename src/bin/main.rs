// survey-pad entry point and main loop
//
// Boot sequence: timer -> hardware -> card + settings -> gamepad and
// boot mode -> UI -> enter Home app
// Main loop: drain scheduler -> WFI -> translate wake flags -> repeat
//
// Apps are stack allocated and dispatched via with_app! macro (no dyn).
// The gamepad has no interrupt line, so the timer period is the poll
// interval; it comes from SETTINGS.TXT.
//
// Input events go through ButtonMapper into semantic ActionEvents,
// except for apps that ask for raw buttons (the gamepad test).

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::time::Duration;
use esp_hal::timer::PeriodicTimer;
use esp_hal::timer::timg::TimerGroup;
use log::{info, warn};

use core::cell::RefCell;
use critical_section::Mutex;

use survey_pad::apps::home::HomeApp;
use survey_pad::apps::log_info::LogInfoApp;
use survey_pad::apps::pad_test::PadTestApp;
use survey_pad::apps::survey::SurveyApp;
use survey_pad::apps::{App, AppContext, AppId, Launcher, NavEvent, Redraw, Services};
use survey_pad::board::{self, Board, ButtonMapper, ButtonMask, Pad};
use survey_pad::boot::{self, BootMode};
use survey_pad::drivers::input::InputDriver;
use survey_pad::drivers::strip::StripBuffer;
use survey_pad::kernel::wake::{self, signal_timer, try_wake};
use survey_pad::kernel::{Job, Scheduler};
use survey_pad::settings::SurveySettings;
use survey_pad::survey;
use survey_pad::ui::{BAR_HEIGHT, StatusBar, SystemStatus, paint_stack};

esp_bootloader_esp_idf::esp_app_desc!();

const STATUSBAR_INTERVAL_MS: u64 = 5000;

// until SETTINGS.TXT has been read
const BOOT_TIMER_MS: u32 = 100;

static TIMER0: Mutex<RefCell<Option<PeriodicTimer<'static, esp_hal::Blocking>>>> =
    Mutex::new(RefCell::new(None));

#[esp_hal::handler(priority = esp_hal::interrupt::Priority::Priority1)]
fn timer0_handler() {
    critical_section::with(|cs| {
        if let Some(timer) = TIMER0.borrow_ref_mut(cs).as_mut() {
            timer.clear_interrupt();
        }
    });
    signal_timer();
}

fn set_timer_period(ms: u32) {
    wake::set_tick_ms(ms);
    critical_section::with(|cs| {
        if let Some(timer) = TIMER0.borrow_ref_mut(cs).as_mut() {
            let _ = timer.start(Duration::from_millis(ms as u64));
        }
    });
}

macro_rules! with_app {
    ($id:expr, $home:expr, $survey:expr, $pad_test:expr, $log_info:expr, |$app:ident| $body:expr) => {
        match $id {
            AppId::Home => {
                let $app = &mut $home;
                $body
            }
            AppId::Survey => {
                let $app = &mut $survey;
                $body
            }
            AppId::PadTest => {
                let $app = &mut $pad_test;
                $body
            }
            AppId::LogInfo => {
                let $app = &mut $log_info;
                $body
            }
        }
    };
}

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    paint_stack();
    info!("booting...");

    let timg0 = TimerGroup::new(unsafe { peripherals.TIMG0.clone_unchecked() });
    let mut timer0 = PeriodicTimer::new(timg0.timer0);
    critical_section::with(|cs| {
        timer0.set_interrupt_handler(timer0_handler);
        if timer0.start(Duration::from_millis(BOOT_TIMER_MS as u64)).is_err() {
            warn!("timer: start failed");
        }
        timer0.listen();
        TIMER0.borrow_ref_mut(cs).replace(timer0);
    });
    wake::set_tick_ms(BOOT_TIMER_MS);
    info!("timer initialized.");

    let hw = match Board::init(peripherals) {
        Ok(b) => b,
        Err(e) => panic!("board: {}", e),
    };
    let Board {
        spi,
        i2c,
        tft: tft_pins,
        sd_cs,
    } = hw;
    let spi = RefCell::new(spi);
    let mut delay = Delay::new();

    // card first, while the bus is still at the init rate
    let sd = board::sd_storage(&spi, sd_cs);
    board::full_speed(&spi);
    let (mut tft, _backlight) = board::tft(&spi, tft_pins);
    tft.init(&mut delay);
    info!("hardware initialized.");

    let settings = SurveySettings::load(&sd);
    set_timer_period(settings.poll_ms as u32);

    let mut pad = Pad::new(i2c);
    let pad_ok = pad.initialize().is_ok();
    let first = if pad_ok {
        boot::sample_held(&mut pad)
    } else {
        None
    };
    let mode = BootMode::select(first, settings.review_button);
    info!("boot: {} mode", mode.name());
    if pad_ok && let Err(e) = boot::blink(&mut pad, &mut delay, mode.blinks()) {
        warn!("boot: blink failed: {}", e);
    }

    // buttons held through boot (the review button) don't count as presses
    let mut input = InputDriver::with_initial(pad, first.unwrap_or(ButtonMask::NONE));

    let mut strip = StripBuffer::new();
    let mut statusbar = StatusBar::new();
    let mut sd_ok = sd.is_present();
    let mut answers = survey::count_rows(&sd).unwrap_or(0);

    let mut home = HomeApp::new(mode);
    let mut survey_app = SurveyApp::new();
    survey_app.set_led_feedback(settings.led_feedback);
    let mut pad_test = PadTestApp::new(settings.led_profile);
    let mut log_info = LogInfoApp::new();

    let mut launcher = Launcher::new();
    let mapper = ButtonMapper::new();
    let mut sched = Scheduler::new();
    let mut last_statusbar_ms: u64 = 0;

    home.on_enter(&mut launcher.ctx);
    update_statusbar(&mut statusbar, mode, sd_ok, !input.is_faulted() && pad_ok, answers);
    tft.render_full(&mut strip, |s| {
        let _ = statusbar.draw(s);
        home.draw(s);
    });
    let _ = launcher.ctx.take_redraw();
    info!("ui ready.");

    loop {
        // drain pending jobs, most urgent first
        while let Some(job) = sched.pop() {
            match job {
                Job::PollInput => {
                    let mut next = input.poll();
                    while let Some(hw_event) = next {
                        let active = launcher.active();
                        let transition =
                            with_app!(active, home, survey_app, pad_test, log_info, |app| {
                                if app.wants_buttons() {
                                    app.on_button(hw_event, &mut launcher.ctx)
                                } else {
                                    app.on_event(mapper.map_event(hw_event), &mut launcher.ctx)
                                }
                            });
                        apply_leds(&mut input, &mut launcher.ctx);

                        if let Some(nav) = launcher.apply(transition) {
                            switch_app(
                                nav,
                                &mut home,
                                &mut survey_app,
                                &mut pad_test,
                                &mut log_info,
                                &mut launcher.ctx,
                            );
                            apply_leds(&mut input, &mut launcher.ctx);
                        }
                        next = input.next_queued();
                    }

                    let active = launcher.active();
                    let needs = with_app!(active, home, survey_app, pad_test, log_info, |app| {
                        app.needs_work()
                    });
                    if needs {
                        sched.push(Job::AppWork);
                    }
                    if launcher.ctx.has_redraw() {
                        sched.push(Job::Render);
                    }
                }

                Job::Render => {
                    let active = launcher.active();
                    match launcher.ctx.take_redraw() {
                        Redraw::Full => {
                            with_app!(active, home, survey_app, pad_test, log_info, |app| {
                                tft.render_full(&mut strip, |s| {
                                    let _ = statusbar.draw(s);
                                    app.draw(s);
                                });
                            });
                        }
                        Redraw::Partial(r) => {
                            let bar_overlaps = r.y < BAR_HEIGHT;
                            with_app!(active, home, survey_app, pad_test, log_info, |app| {
                                tft.render_region(&mut strip, r, |s| {
                                    if bar_overlaps {
                                        let _ = statusbar.draw(s);
                                    }
                                    app.draw(s);
                                });
                            });
                        }
                        Redraw::None => {}
                    }
                }

                Job::AppWork => {
                    let active = launcher.active();
                    let mut svc = Services::new(&sd, mode, wake::uptime_secs());
                    let transition =
                        with_app!(active, home, survey_app, pad_test, log_info, |app| {
                            app.on_work(&mut svc, &mut launcher.ctx)
                        });
                    apply_leds(&mut input, &mut launcher.ctx);

                    if let Some(nav) = launcher.apply(transition) {
                        switch_app(
                            nav,
                            &mut home,
                            &mut survey_app,
                            &mut pad_test,
                            &mut log_info,
                            &mut launcher.ctx,
                        );
                        apply_leds(&mut input, &mut launcher.ctx);
                    }

                    if active == AppId::Survey && mode.is_logging() {
                        answers = survey::count_rows(&sd).unwrap_or(answers);
                        sched.push(Job::UpdateStatus);
                    }

                    // an app may chain work, e.g. the survey loading then asking
                    let active = launcher.active();
                    let needs = with_app!(active, home, survey_app, pad_test, log_info, |app| {
                        app.needs_work()
                    });
                    if needs {
                        sched.push(Job::AppWork);
                    }
                    if launcher.ctx.has_redraw() {
                        sched.push(Job::Render);
                    }
                }

                Job::UpdateStatus => {
                    sd_ok = sd.is_present();
                    let pad_ok = pad_ok && !input.is_faulted();
                    update_statusbar(&mut statusbar, mode, sd_ok, pad_ok, answers);
                    launcher.ctx.mark_dirty(statusbar.region());
                    sched.push(Job::Render);
                }
            }
        }

        // wait for wake event then translate flags into jobs
        let wake = match try_wake() {
            Some(w) => w,
            None => {
                wake::wait_for_interrupt();
                continue;
            }
        };

        if wake.timer {
            sched.push(Job::PollInput);

            let now = wake::uptime_ms();
            if now.wrapping_sub(last_statusbar_ms) >= STATUSBAR_INTERVAL_MS {
                last_statusbar_ms = now;
                sched.push(Job::UpdateStatus);
            }
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn update_statusbar(bar: &mut StatusBar, mode: BootMode, sd_ok: bool, pad_ok: bool, answers: u32) {
    bar.update(&SystemStatus {
        uptime_secs: wake::uptime_secs(),
        logging: mode.is_logging(),
        sd_ok,
        pad_ok,
        answers,
    });
}

fn apply_leds(input: &mut InputDriver<board::I2cBus>, ctx: &mut AppContext) {
    if let Some(cmd) = ctx.take_leds()
        && let Err(e) = cmd.apply(input.pad_mut())
    {
        warn!("leds: {:?} failed: {}", cmd, e);
    }
}

fn switch_app(
    nav: NavEvent,
    home: &mut HomeApp,
    survey_app: &mut SurveyApp,
    pad_test: &mut PadTestApp,
    log_info: &mut LogInfoApp,
    ctx: &mut AppContext,
) {
    info!("app: {:?} -> {:?}", nav.from, nav.to);

    if nav.suspend {
        with_app!(nav.from, *home, *survey_app, *pad_test, *log_info, |app| {
            app.on_suspend();
        });
    } else {
        with_app!(nav.from, *home, *survey_app, *pad_test, *log_info, |app| {
            app.on_exit();
        });
    }

    if nav.resume {
        with_app!(nav.to, *home, *survey_app, *pad_test, *log_info, |app| {
            app.on_resume(ctx);
        });
    } else {
        with_app!(nav.to, *home, *survey_app, *pad_test, *log_info, |app| {
            app.on_enter(ctx);
        });
    }
}
