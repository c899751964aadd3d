//! Time and randomness sources used when creating entries.

use std::cell::Cell;

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

pub trait RandomSource {
    fn next_u64(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_u64(&self) -> u64 {
        rand::random()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        ManualClock {
            now: Cell::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

/// Replays a fixed list of values, cycling when exhausted.
#[derive(Debug)]
pub struct SequenceRandom {
    values: Vec<u64>,
    cursor: Cell<usize>,
}

impl SequenceRandom {
    pub fn new(values: Vec<u64>) -> Self {
        SequenceRandom {
            values,
            cursor: Cell::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_u64(&self) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let index = self.cursor.get();
        self.cursor.set(index + 1);
        self.values[index % self.values.len()]
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &T {
    fn next_u64(&self) -> u64 {
        (**self).next_u64()
    }
}
