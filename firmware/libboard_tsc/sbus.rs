//! Batched transfers to a port block over the internal serial bus.
//!
//! Only the transfer list is modelled here; how a `Transfer` is encoded on
//! the wire is up to the `Bus` implementation.

/// Port block register enabling direct microcontroller memory access.
pub const PHY_UC_DATA_ACCESS_MODE: u32 = 0x219;
/// Port block memory window tunnelling PHY register accesses.
pub const WC_UCMEM_DATA: u32 = 0;

#[derive(Fail, Debug, Clone, PartialEq)]
pub enum BusError {
    #[fail(display = "no acknowledge from block {} address 0x{:x}", block, address)]
    Nack { block: u8, address: u32 },
    #[fail(display = "transaction timed out")]
    Timeout,
    #[fail(display = "{}", _0)]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    WriteRegister,
    /// `count` entries of 128 bits each.
    WriteMemory,
    ReadMemory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub opcode:  Opcode,
    pub block:   u8,
    pub address: u32,
    pub count:   usize,
    pub tx:      Vec<u32>,
    pub rx:      [u32; 4],
}

impl Transfer {
    pub fn write_register(block: u8, address: u32, value: u32) -> Transfer {
        Transfer {
            opcode: Opcode::WriteRegister,
            block: block,
            address: address,
            count: 1,
            tx: vec![value],
            rx: [0; 4],
        }
    }

    pub fn write_memory(block: u8, address: u32, words: Vec<u32>, count: usize) -> Transfer {
        Transfer {
            opcode: Opcode::WriteMemory,
            block: block,
            address: address,
            count: count,
            tx: words,
            rx: [0; 4],
        }
    }

    pub fn read_memory(block: u8, address: u32) -> Transfer {
        Transfer {
            opcode: Opcode::ReadMemory,
            block: block,
            address: address,
            count: 1,
            tx: Vec::new(),
            rx: [0; 4],
        }
    }
}

pub trait Bus {
    /// Runs the batch in order, stopping at the first failing transfer.
    /// `rx` of every `ReadMemory` transfer is filled in place.
    fn execute(&mut self, batch: &mut [Transfer]) -> Result<(), BusError>;
}

impl<'a, B: Bus + ?Sized> Bus for &'a mut B {
    fn execute(&mut self, batch: &mut [Transfer]) -> Result<(), BusError> {
        (**self).execute(batch)
    }
}
