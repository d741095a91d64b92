#[cfg_attr(test, macro_use)]
extern crate log;
extern crate log_buffer;

use std::io::{self, Write as IoWrite};
use std::fmt::Write;
use std::ptr;
use std::sync::{Mutex, Once};
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use log_buffer::LogBuffer;

pub const DEFAULT_BUFFER_SIZE: usize = 1 << 16;

pub struct BufferLogger {
    buffer:         Mutex<LogBuffer<Vec<u8>>>,
    console_filter: AtomicUsize,
    clock:          Mutex<Option<fn() -> u64>>,
    epoch:          Instant,
}

static LOGGER: AtomicPtr<BufferLogger> = AtomicPtr::new(ptr::null_mut());

fn filter_from_usize(v: usize) -> LevelFilter {
    match v {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

impl BufferLogger {
    pub fn new(size: usize) -> BufferLogger {
        BufferLogger {
            buffer: Mutex::new(LogBuffer::new(vec![0; size])),
            console_filter: AtomicUsize::new(LevelFilter::Warn as usize),
            clock: Mutex::new(None),
            epoch: Instant::now(),
        }
    }

    /// Installs the logger as the global `log` backend. It lives until the
    /// process exits.
    pub fn register(self) -> Result<&'static BufferLogger, SetLoggerError> {
        let logger: &'static BufferLogger = Box::leak(Box::new(self));
        log::set_logger(logger)?;
        log::set_max_level(LevelFilter::Info);
        LOGGER.store(logger as *const _ as *mut _, Ordering::SeqCst);
        Ok(logger)
    }

    pub fn with_instance<R, F: FnOnce(&BufferLogger) -> R>(f: F) -> Option<R> {
        let logger = LOGGER.load(Ordering::SeqCst);
        if logger.is_null() {
            None
        } else {
            // Registered loggers are leaked, so the pointer stays valid.
            Some(f(unsafe { &*logger }))
        }
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear()
        }
    }

    pub fn extract<R, F: FnOnce(&str) -> R>(&self, f: F) -> R {
        match self.buffer.lock() {
            Ok(mut buffer) => f(buffer.extract()),
            Err(_) => f("")
        }
    }

    pub fn set_max_log_level(&self, max_level: LevelFilter) {
        log::set_max_level(max_level)
    }

    /// Records at or above `max_level` are also written to stderr.
    pub fn set_console_log_level(&self, max_level: LevelFilter) {
        self.console_filter.store(max_level as usize, Ordering::SeqCst)
    }

    pub fn console_log_level(&self) -> LevelFilter {
        filter_from_usize(self.console_filter.load(Ordering::SeqCst))
    }

    /// Timestamp source in microseconds; process uptime by default.
    pub fn set_clock(&self, clock: fn() -> u64) {
        if let Ok(mut c) = self.clock.lock() {
            *c = Some(clock)
        }
    }

    fn get_us(&self) -> u64 {
        if let Ok(c) = self.clock.lock() {
            if let Some(clock) = *c {
                return clock()
            }
        }
        let elapsed = self.epoch.elapsed();
        elapsed.as_secs() * 1_000_000 + (elapsed.subsec_nanos() / 1_000) as u64
    }
}

/// Registers a logger with the default buffer size once per process and
/// returns it.
pub fn init() -> Option<&'static BufferLogger> {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = BufferLogger::new(DEFAULT_BUFFER_SIZE).register();
    });
    let logger = LOGGER.load(Ordering::SeqCst);
    if logger.is_null() {
        None
    } else {
        Some(unsafe { &*logger })
    }
}

impl Log for BufferLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let timestamp = self.get_us();
            let force_console = match self.buffer.try_lock() {
                Ok(mut buffer) => {
                    let _ = writeln!(buffer, "[{:12}us] {:>5}({}): {}",
                                     timestamp, record.level(),
                                     record.target(), record.args());
                    false
                }
                // Logging from inside `extract`; keep the record on the console.
                Err(_) => true
            };

            if record.level() <= self.console_log_level() || force_console {
                let _ = writeln!(io::stderr(), "[{:12}us] {:>5}({}): {}",
                                 timestamp, record.level(),
                                 record.target(), record.args());
            }
        }
    }

    fn flush(&self) {
    }
}

impl Default for BufferLogger {
    fn default() -> BufferLogger {
        BufferLogger::new(DEFAULT_BUFFER_SIZE)
    }
}
