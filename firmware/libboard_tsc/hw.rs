use clock::Clock;
use dma::{DmaRequest, Target};
use lane::LaneMask;
use reg::Reg;
use sbus::Bus;
use Error;
use Result;

/// Bus, clock and request queue of one port block.
pub struct Hw<B, C> {
    pub bus:   B,
    pub clock: C,
    pub req:   DmaRequest,
}

impl<B: Bus, C: Clock> Hw<B, C> {
    pub fn new(bus: B, clock: C, target: Target) -> Hw<B, C> {
        Hw { bus: bus, clock: clock, req: DmaRequest::new(target) }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.req.flush(&mut self.bus)
    }

    pub fn get_do(&mut self, reg: Reg, lanes: LaneMask) -> Result<u16> {
        self.req.get_do(&mut self.bus, reg, lanes).map(|v| v as u16)
    }

    pub fn get_do32(&mut self, reg: Reg, lanes: LaneMask) -> Result<u32> {
        self.req.get_do(&mut self.bus, reg, lanes)
    }

    pub fn get_do_foreach(&mut self, reg: Reg, lanes: LaneMask) -> Result<u16> {
        self.req.get_do_foreach(&mut self.bus, reg, lanes).map(|v| v as u16)
    }

    pub fn modify_do(&mut self, reg: Reg, lanes: LaneMask, value: u16, mask: u16) -> Result<()> {
        self.req.modify(reg, lanes, value, mask);
        self.flush()
    }

    pub fn set_do(&mut self, reg: Reg, lanes: LaneMask, value: u32) -> Result<()> {
        self.req.set(reg, lanes, value);
        self.flush()
    }

    /// Polls `reg` until `done` holds for its value, sleeping `interval_us`
    /// between reads.
    pub fn poll<F>(&mut self, reg: Reg, lanes: LaneMask, interval_us: u64, timeout_us: u64,
                   what: &'static str, done: F) -> Result<u16>
        where F: Fn(u16) -> bool
    {
        let start = self.clock.get_us();
        loop {
            let v = self.get_do(reg, lanes)?;
            if done(v) {
                return Ok(v)
            }
            if self.clock.get_us() > start + timeout_us {
                return Err(Error::Timeout(what))
            }
            self.clock.spin_us(interval_us);
        }
    }
}
