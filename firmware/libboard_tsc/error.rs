use config;
use firmware;
use sbus::BusError;
use uc::Command;

#[derive(Fail, Debug, Clone, PartialEq)]
pub enum Error {
    #[fail(display = "bad lane mask 0x{:x}", _0)]
    InvalidLaneMask(u16),
    #[fail(display = "unsupported number of lanes {}", _0)]
    InvalidLaneCount(usize),
    #[fail(display = "unsupported speed/lane mask combination {:e} 0x{:x}", speed, lanes)]
    UnsupportedSpeed { speed: f64, lanes: u16 },
    #[fail(display = "invalid register access: {}", _0)]
    InvalidAccess(&'static str),
    #[fail(display = "invalid configuration: {}", _0)]
    InvalidConfig(String),
    #[fail(display = "uc command error: {} (sub command {})", command, sub_command)]
    UcCommand { command: Command, sub_command: u8 },
    #[fail(display = "uc command timeout: {} (sub command {})", command, sub_command)]
    UcTimeout { command: Command, sub_command: u8 },
    #[fail(display = "timed out: {}", _0)]
    Timeout(&'static str),
    #[fail(display = "pmd not locked on lane {}", _0)]
    PmdNotLocked(usize),
    #[fail(display = "link training restart pending")]
    TrainingPending,
    #[fail(display = "bring-up failed: {}", _0)]
    BringUp(&'static str),
    #[fail(display = "uc ucode crc does not match got {:04x} != want {:04x}", actual, expected)]
    CrcMismatch { expected: u16, actual: u16 },
    #[fail(display = "bus error: {}", _0)]
    Bus(#[cause] BusError),
    #[fail(display = "firmware: {}", _0)]
    Firmware(#[cause] firmware::Error),
    #[fail(display = "config: {}", _0)]
    Config(#[cause] config::Error),
}

impl Error {
    /// Bring-up fatal errors abort initialization of the whole core.
    /// Everything else is scoped to the port and may be retried from a
    /// clean reset.
    pub fn is_fatal(&self) -> bool {
        match self {
            &Error::BringUp(_) |
            &Error::CrcMismatch { .. } |
            &Error::Firmware(_) => true,
            _ => false
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            &Error::Timeout(_) | &Error::UcTimeout { .. } => true,
            _ => false
        }
    }
}

impl From<BusError> for Error {
    fn from(value: BusError) -> Error {
        Error::Bus(value)
    }
}

impl From<firmware::Error> for Error {
    fn from(value: firmware::Error) -> Error {
        Error::Firmware(value)
    }
}

impl From<config::Error> for Error {
    fn from(value: config::Error) -> Error {
        Error::Config(value)
    }
}
