use std::thread;
use std::time::{Duration, Instant};

/// Time source for the polling loops.
pub trait Clock {
    fn get_us(&self) -> u64;

    fn get_ms(&self) -> u64 {
        self.get_us() / 1_000
    }

    fn spin_us(&self, interval: u64);
}

impl<'a, C: Clock + ?Sized> Clock for &'a C {
    fn get_us(&self) -> u64 { (**self).get_us() }
    fn spin_us(&self, interval: u64) { (**self).spin_us(interval) }
}

pub struct SystemClock {
    epoch: Instant
}

impl SystemClock {
    pub fn new() -> SystemClock {
        SystemClock { epoch: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn get_us(&self) -> u64 {
        let elapsed = self.epoch.elapsed();
        elapsed.as_secs() * 1_000_000 + (elapsed.subsec_nanos() / 1_000) as u64
    }

    fn spin_us(&self, interval: u64) {
        thread::sleep(Duration::from_micros(interval))
    }
}
