extern crate byteorder;
extern crate crc;
extern crate failure;
#[macro_use]
extern crate failure_derive;
#[macro_use]
extern crate log;

pub mod clock;
pub mod config;
pub mod config_word;
pub mod dma;
pub mod error;
pub mod event_log;
pub mod eyescan;
pub mod firmware;
pub mod hw;
pub mod lane;
pub mod lane_map;
pub mod phy;
pub mod reg;
pub mod sbus;
pub mod settings;
pub mod speed;
pub mod status;
pub mod tsc;
pub mod tsce_reg;
pub mod tscf_reg;
pub mod uc;
pub mod uc_mem;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;
