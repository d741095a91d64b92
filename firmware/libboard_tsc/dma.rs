use lane::LaneMask;
use reg::Reg;
use sbus::{self, Bus, Transfer};
use Error;
use Result;

/// Where a request's PHY accesses go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub block:  u8,
    pub phy_id: u8,
}

/// Handle to a value read by a queued `get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot(usize);

#[derive(Debug, Clone, Copy)]
struct PendingRead {
    transfer: usize,
    slot:     usize,
    high:     bool,
}

/// An ordered batch of PHY register operations.
///
/// Nothing reaches the hardware before `flush`. The first failure is kept
/// and every later flush fails without touching the bus until `clear_err`.
pub struct DmaRequest {
    target:    Target,
    transfers: Vec<Transfer>,
    reads:     Vec<PendingRead>,
    values:    Vec<u32>,
    err:       Option<Error>,
}

impl DmaRequest {
    pub fn new(target: Target) -> DmaRequest {
        DmaRequest {
            target: target,
            transfers: Vec::new(),
            reads: Vec::new(),
            values: Vec::new(),
            err: None,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    pub fn clear_err(&mut self) {
        self.err = None
    }

    /// Clears the kept failure and returns it.
    pub fn take_err(&mut self) -> Option<Error> {
        self.err.take()
    }

    fn fail(&mut self, err: Error) {
        if self.err.is_none() {
            self.err = Some(err)
        }
    }

    fn begin(&mut self) {
        // Values of the previous batch stay readable until a new one starts.
        if self.transfers.is_empty() {
            self.values.clear();
        }
    }

    fn window_write(&mut self, address: u32, data: u16, mask: u16, is_write: bool) {
        let tx = vec![address,
                      (data as u32) << 16 | (0xffff & !(mask as u32)),
                      is_write as u32,
                      0];
        self.transfers.push(Transfer::write_memory(self.target.block, sbus::WC_UCMEM_DATA, tx, 1));
    }

    fn window_read(&mut self, address: u32, slot: usize, high: bool) {
        self.window_write(address, 0, 0, false);
        self.reads.push(PendingRead { transfer: self.transfers.len(), slot: slot, high: high });
        self.transfers.push(Transfer::read_memory(self.target.block, sbus::WC_UCMEM_DATA));
    }

    /// Queues a read of `reg`; the value is available after `flush`.
    pub fn get(&mut self, reg: Reg, lanes: LaneMask) -> Slot {
        self.begin();
        let slot = self.values.len();
        self.values.push(0);

        let lo = match reg.address(self.target.phy_id, lanes, 0) {
            Ok(a) => a,
            Err(e) => { self.fail(e); return Slot(slot) }
        };
        if reg.is_32bit() {
            let hi = lo + 1;
            // Reading the low half latches the high half.
            self.window_read(lo, slot, false);
            self.window_read(hi, slot, true);
        } else {
            self.window_read(lo, slot, false);
        }
        Slot(slot)
    }

    pub fn set(&mut self, reg: Reg, lanes: LaneMask, value: u32) {
        self.begin();
        let lo = match reg.address(self.target.phy_id, lanes, 0) {
            Ok(a) => a,
            Err(e) => return self.fail(e)
        };
        if reg.is_32bit() {
            // Writing the low half commits both.
            self.window_write(lo + 1, (value >> 16) as u16, 0xffff, true);
            self.window_write(lo, value as u16, 0xffff, true);
        } else {
            self.window_write(lo, value as u16, 0xffff, true);
        }
    }

    /// Read-modify-write done by the hardware: `(old & !mask) | (value & mask)`.
    pub fn modify(&mut self, reg: Reg, lanes: LaneMask, value: u16, mask: u16) {
        self.begin();
        if reg.is_32bit() {
            return self.fail(Error::InvalidAccess("modify of a 32 bit register"))
        }
        match reg.address(self.target.phy_id, lanes, 0) {
            Ok(a) => self.window_write(a, value, mask, true),
            Err(e) => self.fail(e)
        }
    }

    /// Queues a raw port block transfer.
    pub fn push(&mut self, transfer: Transfer) {
        self.begin();
        self.transfers.push(transfer)
    }

    pub fn value(&self, slot: Slot) -> u32 {
        self.values.get(slot.0).cloned().unwrap_or(0)
    }

    pub fn value16(&self, slot: Slot) -> u16 {
        self.value(slot) as u16
    }

    pub fn flush<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<()> {
        let mut transfers = ::std::mem::replace(&mut self.transfers, Vec::new());
        let reads = ::std::mem::replace(&mut self.reads, Vec::new());

        if let Some(ref err) = self.err {
            return Err(err.clone())
        }
        if transfers.is_empty() {
            return Ok(())
        }

        if let Err(e) = bus.execute(&mut transfers) {
            let err = Error::from(e);
            self.fail(err.clone());
            return Err(err)
        }

        for read in reads {
            let v = transfers[read.transfer].rx[1] as u16 as u32;
            let slot = &mut self.values[read.slot];
            if read.high {
                *slot |= v << 16;
            } else {
                *slot = v;
            }
        }
        Ok(())
    }

    /// Queues a read and flushes.
    pub fn get_do<B: Bus + ?Sized>(&mut self, bus: &mut B, reg: Reg, lanes: LaneMask) -> Result<u32> {
        let slot = self.get(reg, lanes);
        self.flush(bus)?;
        Ok(self.value(slot))
    }

    /// Reads a status register on each lane and ands the results.
    pub fn get_do_foreach<B: Bus + ?Sized>(&mut self, bus: &mut B, reg: Reg,
                                           lanes: LaneMask) -> Result<u32> {
        let slots: Vec<Slot> = lanes.masks().map(|m| self.get(reg, m)).collect();
        self.flush(bus)?;
        Ok(slots.iter().fold(!0, |acc, &s| acc & self.value(s)))
    }
}
