// Wake flag signaling between the timer ISR and the main loop
//
// The ISR sets an atomic flag; the main loop consumes it via try_wake().
// Critical section guards riscv32imc (no atomic RMW).
// Uptime is tracked in milliseconds; each tick adds the current
// poll period so it stays correct when the period changes.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

static WAKE_TIMER: AtomicBool = AtomicBool::new(false);

// ms added per timer interrupt
static TICK_MS: AtomicU32 = AtomicU32::new(100);

// cs: riscv32imc has no atomic add
// u64: a u32 of ms wraps after ~49.7 days
static UPTIME_MS: critical_section::Mutex<core::cell::Cell<u64>> =
    critical_section::Mutex::new(core::cell::Cell::new(0));

#[derive(Debug, Clone, Copy)]
pub struct WakeFlags {
    pub timer: bool,
}

fn take_wake_flags() -> Option<WakeFlags> {
    critical_section::with(|_| {
        let timer = WAKE_TIMER.load(Ordering::Relaxed);
        if !timer {
            return None;
        }
        WAKE_TIMER.store(false, Ordering::Relaxed);
        Some(WakeFlags { timer })
    })
}

#[inline]
pub fn signal_timer() {
    WAKE_TIMER.store(true, Ordering::Release);
    let step = TICK_MS.load(Ordering::Relaxed);
    critical_section::with(|cs| {
        let ms = UPTIME_MS.borrow(cs);
        ms.set(ms.get() + step as u64);
    });
}

pub fn set_tick_ms(ms: u32) {
    TICK_MS.store(ms, Ordering::Release);
}

pub fn uptime_ms() -> u64 {
    critical_section::with(|cs| UPTIME_MS.borrow(cs).get())
}

pub fn uptime_secs() -> u32 {
    (uptime_ms() / 1000) as u32
}

#[inline]
pub fn wait_for_interrupt() {
    #[cfg(target_arch = "riscv32")]
    unsafe {
        core::arch::asm!("wfi", options(nomem, nostack));
    }

    #[cfg(not(target_arch = "riscv32"))]
    core::hint::spin_loop();
}

pub fn try_wake() -> Option<WakeFlags> {
    take_wake_flags()
}

#[cfg(test)]
mod tests {
    use super::*;

    // single test: the statics are process-wide
    #[test]
    fn timer_signal_sets_flag_and_advances_uptime() {
        while try_wake().is_some() {}
        set_tick_ms(250);
        let before = uptime_ms();

        signal_timer();
        signal_timer();

        assert!(try_wake().is_some_and(|w| w.timer));
        assert!(try_wake().is_none());
        assert_eq!(uptime_ms() - before, 500);

        // run well past u32::MAX ms; seconds keep counting up
        let before = uptime_ms();
        set_tick_ms(u32::MAX);
        signal_timer();
        signal_timer();
        assert_eq!(uptime_ms() - before, 2 * u32::MAX as u64);
        assert!(uptime_secs() > u32::MAX / 1000);
        assert_eq!(uptime_secs() as u64, uptime_ms() / 1000);
        while try_wake().is_some() {}
        set_tick_ms(100);
    }
}
