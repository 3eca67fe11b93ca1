// Polled gamepad input with edge detection
//
// One I2C read per poll. Press/Release are derived from the previous
// mask, so a button held across polls reports exactly one Press.
// A failed read yields no events and keeps the previous mask; the
// next good read is compared against the last good one.

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::board::button::{BUTTON_TABLE, Button, ButtonMask};
use crate::drivers::qwstpad::Qwstpad;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Press(Button),
    Release(Button),
}

// every button can change in a single poll
const QUEUE_LEN: usize = BUTTON_TABLE.len() * 2;

struct EventQueue {
    buf: [Option<Event>; QUEUE_LEN],
    head: usize,
    len: usize,
}

impl EventQueue {
    const fn new() -> Self {
        Self {
            buf: [None; QUEUE_LEN],
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, ev: Event) {
        if self.len >= QUEUE_LEN {
            return;
        }
        let tail = (self.head + self.len) % QUEUE_LEN;
        self.buf[tail] = Some(ev);
        self.len += 1;
    }

    fn pop(&mut self) -> Option<Event> {
        if self.len == 0 {
            return None;
        }
        let ev = self.buf[self.head].take();
        self.head = (self.head + 1) % QUEUE_LEN;
        self.len -= 1;
        ev
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub struct InputDriver<I2C> {
    pad: Qwstpad<I2C>,
    last: ButtonMask,
    queue: EventQueue,
    bus_fault: bool,
}

impl<I2C, E> InputDriver<I2C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    pub fn new(pad: Qwstpad<I2C>) -> Self {
        Self {
            pad,
            last: ButtonMask::NONE,
            queue: EventQueue::new(),
            bus_fault: false,
        }
    }

    // start from a known mask, e.g. the buttons sampled at boot,
    // so a button held through boot doesn't report a Press
    pub fn with_initial(pad: Qwstpad<I2C>, held: ButtonMask) -> Self {
        let mut drv = Self::new(pad);
        drv.last = held;
        drv
    }

    /// Next pending event, reading the pad when the queue is empty.
    pub fn poll(&mut self) -> Option<Event> {
        if self.queue.is_empty() {
            self.sample();
        }
        self.queue.pop()
    }

    // drains events already queued without touching the bus
    pub fn next_queued(&mut self) -> Option<Event> {
        self.queue.pop()
    }

    fn sample(&mut self) {
        let curr = match self.pad.read_buttons() {
            Ok(raw) => ButtonMask(raw),
            Err(e) => {
                if !self.bus_fault {
                    warn!("input: {}", e);
                    self.bus_fault = true;
                }
                return;
            }
        };

        if self.bus_fault {
            info!("input: gamepad back");
            self.bus_fault = false;
        }

        let prev = self.last;
        for (b, _) in BUTTON_TABLE {
            if curr.just_pressed(prev, b) {
                self.queue.push(Event::Press(b));
            } else if curr.just_released(prev, b) {
                self.queue.push(Event::Release(b));
            }
        }
        self.last = curr;
    }

    pub fn held(&self) -> ButtonMask {
        self.last
    }

    pub fn is_faulted(&self) -> bool {
        self.bus_fault
    }

    pub fn pad_mut(&mut self) -> &mut Qwstpad<I2C> {
        &mut self.pad
    }

    pub fn release(self) -> Qwstpad<I2C> {
        self.pad
    }
}
