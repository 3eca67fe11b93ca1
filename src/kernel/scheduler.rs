// Job scheduler for the cooperative main loop
//
// Every job is idempotent (poll the pad, repaint what is dirty, run the
// active app's pending work, refresh the status bar), so a job is either
// pending or not. The pending set is a bitmask; pop hands out the most
// urgent pending job first.
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Job {
    PollInput = 0,
    Render = 1,
    AppWork = 2,
    UpdateStatus = 3,
}

// pop order
const ORDER: [Job; 4] = [Job::PollInput, Job::Render, Job::AppWork, Job::UpdateStatus];

impl Job {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::PollInput => write!(f, "PollInput"),
            Job::Render => write!(f, "Render"),
            Job::AppWork => write!(f, "AppWork"),
            Job::UpdateStatus => write!(f, "UpdateStatus"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    pending: u8,
}

impl Scheduler {
    pub const fn new() -> Self {
        Self { pending: 0 }
    }

    /// Mark `job` pending. Already-pending jobs are not queued twice.
    pub fn push(&mut self, job: Job) {
        self.pending |= job.bit();
    }

    pub fn is_pending(&self, job: Job) -> bool {
        self.pending & job.bit() != 0
    }

    pub fn pop(&mut self) -> Option<Job> {
        let job = ORDER.into_iter().find(|j| self.is_pending(*j))?;
        self.pending &= !job.bit();
        Some(job)
    }

    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    pub fn pending(&self) -> usize {
        self.pending.count_ones() as usize
    }
}
