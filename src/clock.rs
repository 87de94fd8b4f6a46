//! Wall-clock sources.
//!
//! The rewriter samples "now" once per input tag through [`Clock`], so tests
//! and replays can drive elapsed time deterministically.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Clock returning a scripted sequence of readings.
///
/// Each call pops the next reading; once the script is exhausted the last
/// reading repeats.
#[derive(Debug, Default)]
pub struct ScriptedClock {
    readings: RefCell<VecDeque<u64>>,
    last: Cell<u64>,
}

impl ScriptedClock {
    pub fn new(readings: impl IntoIterator<Item = u64>) -> Self {
        Self {
            readings: RefCell::new(readings.into_iter().collect()),
            last: Cell::new(0),
        }
    }

    /// Append more readings.
    pub fn push(&self, reading: u64) {
        self.readings.borrow_mut().push_back(reading);
    }
}

impl Clock for ScriptedClock {
    fn now_ms(&self) -> u64 {
        if let Some(next) = self.readings.borrow_mut().pop_front() {
            self.last.set(next);
        }
        self.last.get()
    }
}
