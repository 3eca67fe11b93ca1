// One question, one score.
//
// Every question style goes through the same flow: start at the
// midpoint, nudge with Increase/Decrease (clamped), Confirm answers,
// Back skips. Style only changes how the value is drawn.

use crate::board::action::Action;
use crate::drivers::qwstpad::NUM_LEDS;
use crate::survey::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Still waiting for Confirm or Back.
    Pending,
    /// Value changed; redraw the scale.
    Changed,
    Answered(i16),
    Skipped,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoreFlow {
    min: i16,
    max: i16,
    value: i16,
}

impl ScoreFlow {
    pub fn new(min: i16, max: i16) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            value: min + (max - min) / 2,
        }
    }

    pub fn for_question(q: &Question) -> Self {
        Self::new(q.min, q.max)
    }

    pub fn value(&self) -> i16 {
        self.value
    }

    pub fn range(&self) -> (i16, i16) {
        (self.min, self.max)
    }

    pub fn on_action(&mut self, action: Action) -> FlowOutcome {
        match action {
            Action::Increase | Action::Up => self.step(1),
            Action::Decrease | Action::Down => self.step(-1),
            Action::Confirm => FlowOutcome::Answered(self.value),
            Action::Back => FlowOutcome::Skipped,
            Action::Menu => FlowOutcome::Pending,
        }
    }

    fn step(&mut self, delta: i16) -> FlowOutcome {
        let v = (self.value + delta).clamp(self.min, self.max);
        if v == self.value {
            FlowOutcome::Pending
        } else {
            self.value = v;
            FlowOutcome::Changed
        }
    }

    /// Gamepad LEDs lit for the current value: ceil(4 * fraction).
    pub fn led_level(&self) -> u8 {
        let span = (self.max - self.min) as u32;
        if span == 0 {
            return NUM_LEDS;
        }
        let pos = (self.value - self.min) as u32;
        (pos * NUM_LEDS as u32).div_ceil(span) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_midpoint() {
        assert_eq!(ScoreFlow::new(1, 5).value(), 3);
        assert_eq!(ScoreFlow::new(0, 10).value(), 5);
        assert_eq!(ScoreFlow::new(1, 7).value(), 4);
        assert_eq!(ScoreFlow::new(1, 2).value(), 1);
        assert_eq!(ScoreFlow::new(-2, 2).value(), 0);
    }

    #[test]
    fn clamps_at_both_ends() {
        let mut f = ScoreFlow::new(1, 3);
        assert_eq!(f.on_action(Action::Increase), FlowOutcome::Changed);
        assert_eq!(f.on_action(Action::Increase), FlowOutcome::Pending);
        assert_eq!(f.value(), 3);
        for _ in 0..5 {
            f.on_action(Action::Decrease);
        }
        assert_eq!(f.value(), 1);
    }

    #[test]
    fn confirm_and_back_finish() {
        let mut f = ScoreFlow::new(1, 5);
        f.on_action(Action::Up);
        assert_eq!(f.on_action(Action::Confirm), FlowOutcome::Answered(4));
        assert_eq!(f.on_action(Action::Back), FlowOutcome::Skipped);
        assert_eq!(f.on_action(Action::Menu), FlowOutcome::Pending);
    }

    #[test]
    fn led_level_rounds_up() {
        let mut f = ScoreFlow::new(0, 10);
        for _ in 0..10 {
            f.on_action(Action::Decrease);
        }
        assert_eq!(f.led_level(), 0);
        f.on_action(Action::Increase); // 1/10
        assert_eq!(f.led_level(), 1);
        for _ in 0..4 {
            f.on_action(Action::Increase); // 5/10
        }
        assert_eq!(f.led_level(), 2);
        for _ in 0..5 {
            f.on_action(Action::Increase);
        }
        assert_eq!(f.led_level(), 4);
    }
}
