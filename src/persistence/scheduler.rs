use chrono::{DateTime, TimeDelta, Utc};
use std::cell::Cell;
use std::rc::Rc;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock tests move by hand. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Coalesces bursts of changes into one write after a quiet period.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    debounce: TimeDelta,
    deadline: Option<DateTime<Utc>>,
}

impl SaveScheduler {
    pub fn new(debounce: TimeDelta) -> Self {
        Self {
            debounce,
            deadline: None,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(TimeDelta::milliseconds(millis as i64))
    }

    /// Push the deadline out to `now + debounce`.
    pub fn mark_dirty(&mut self, now: DateTime<Utc>) {
        self.deadline = Some(now + self.debounce);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once, when the quiet period has elapsed. Clears the deadline.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending write; a forced save supersedes it.
    pub fn force(&mut self) {
        self.deadline = None;
    }
}

impl Default for SaveScheduler {
    fn default() -> Self {
        Self::from_millis(1000)
    }
}
