use std::cell::Cell;
use std::path::PathBuf;

use crate::domain::power_state::{Clock, TimestampMs};

pub struct FakeClock {
    now: Cell<i64>,
}

impl FakeClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> TimestampMs {
        TimestampMs(self.now.get())
    }
}

pub fn temp_path(name: &str) -> PathBuf {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join(name);
    std::mem::forget(dir);
    path
}
