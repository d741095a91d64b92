//! Horizontal eye scan through the microcontroller diagnostics.

use std::fmt;

use clock::Clock;
use hw::Hw;
use lane::{LaneMask, N_LANE};
use sbus::Bus;
use tsc::Generation;
use uc::{self, Command, UcCommand};
use uc_mem;
use Error;
use Result;

pub const Y_MAX: i32 = 31;
pub const N_Y: usize = 2 * Y_MAX as usize + 1;
pub const X_MAX: i32 = 31;
pub const N_X: usize = 2 * X_MAX as usize + 1;

const DIAG_STATUS_DONE: u16 = 1 << 15;
const DIAG_POLL_INTERVAL_US: u64 = 500;
const DIAG_TIMEOUT_US: u64 = 100_000;

/// Bit error rate of one count.
const BER_PER_COUNT: f64 = 1.0 / 18350080.0;

const AXIS: &'static str =
    "UI/64\t: -30  -25  -20  -15  -10  -5    0    5    10   15   20   25   30";
const BORDER: &'static str =
    "\t: -|----|----|----|----|----|----|----|----|----|----|----|----|-";

/// Diagnostic sample: 3 bit fraction in bits 7:5, 5 bit exponent in bits 4:0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Float8(pub u8);

impl Float8 {
    pub fn count(self) -> u32 {
        if self.0 == 0 {
            return 0
        }
        let fraction = (1 << 3) + (self.0 >> 5) as u32;
        let exp = (self.0 & 0x1f) as u32;
        if exp < 3 {
            fraction >> (3 - exp)
        } else {
            fraction << (exp - 3)
        }
    }

    pub fn bit_error_rate(self) -> f64 {
        self.count() as f64 * BER_PER_COUNT
    }
}

/// Bit error rates over voltage (rows, top first) and phase (columns)
/// offsets.
#[derive(Debug, Clone)]
pub struct EyeScan {
    ber: Vec<[f64; N_X]>,
}

impl EyeScan {
    pub fn new() -> EyeScan {
        EyeScan { ber: vec![[0.0; N_X]; N_Y] }
    }

    /// Vertical offset of row `iy`.
    pub fn y(iy: usize) -> i32 {
        Y_MAX - iy as i32
    }

    pub fn bit_error_rate(&self, iy: usize, x: usize) -> f64 {
        self.ber[iy][x]
    }

    pub fn set_bit_error_rate(&mut self, iy: usize, x: usize, ber: f64) {
        self.ber[iy][x] = ber
    }

    fn mark(x: usize, y: i32, ber: f64) -> char {
        if ber < 1e-8 {
            let (on_x, on_y) = (x % 5 == 0, y % 5 == 0);
            return match (on_x, on_y) {
                (true, true)   => '+',
                (false, true)  => '-',
                (true, false)  => ':',
                (false, false) => ' ',
            }
        }
        let decades = [(1e-7, '7'), (1e-6, '6'), (1e-5, '5'), (1e-4, '4'),
                       (1e-3, '3'), (1e-2, '2'), (1e-1, '1')];
        for &(limit, c) in decades.iter() {
            if ber < limit {
                return c
            }
        }
        '0'
    }
}

impl fmt::Display for EyeScan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Sample of I for bit error rate < 1e-I")?;
        writeln!(f, "{}", AXIS)?;
        writeln!(f, "{}", BORDER)?;
        for (iy, row) in self.ber.iter().enumerate() {
            let y = EyeScan::y(iy);
            write!(f, "{:4.0} mV\t: ", (y * 600 / 127) as f64)?;
            for (x, &ber) in row.iter().enumerate() {
                write!(f, "{}", EyeScan::mark(x, y, ber))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{}", BORDER)?;
        writeln!(f, "{}", AXIS)
    }
}

fn wait_diag_samples<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation,
                                       lane: usize) -> Result<()> {
    let field = generation.uc_mem().lane.diag_status;
    let start = hw.clock.get_us();
    loop {
        let v = uc_mem::read_lane(hw, generation, lane, field)?;
        // Finished, or at least two samples buffered.
        if v & DIAG_STATUS_DONE != 0 || (v & 0xff) > 2 {
            return Ok(())
        }
        if hw.clock.get_us() > start + DIAG_TIMEOUT_US {
            warn!("timeout diag status: 0x{:x}", v);
            return Err(Error::Timeout("diag status"))
        }
        hw.clock.spin_us(DIAG_POLL_INTERVAL_US);
    }
}

fn sample<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation,
                            lane: usize) -> Result<EyeScan> {
    let regs = generation.regs();
    let lm = LaneMask::lane(lane);
    uc::do_command(hw, &regs.uc, lm,
                   &UcCommand::new(Command::Diagnostics, uc::DIAGNOSTICS_START_HORIZONTAL_EYE))?;

    let mut scan = EyeScan::new();
    for iy in 0..N_Y {
        for x in (0..N_X).step_by(2) {
            wait_diag_samples(hw, generation, lane)?;
            let reply = uc::do_command(hw, &regs.uc, lm,
                                       &UcCommand::new(Command::ReadDiagnosticDataWord, 0).output())?;
            let v = reply.output.unwrap_or(0);
            // Two samples per word, high byte first.
            scan.ber[iy][x] = Float8((v >> 8) as u8).bit_error_rate();
            if x + 1 < N_X {
                scan.ber[iy][x + 1] = Float8(v as u8).bit_error_rate();
            }
        }
    }
    Ok(scan)
}

/// Scans the eye of `lane`. Diagnostics are disabled again exactly once
/// after the scan has been started, whether or not it completes.
pub fn scan<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation,
                              lane: usize) -> Result<EyeScan> {
    if lane >= N_LANE {
        return Err(Error::InvalidAccess("lane out of range"))
    }
    let regs = generation.regs();
    let lm = LaneMask::lane(lane);
    if hw.get_do(regs.tlb_rx_pmd_lock_status, lm)? & (1 << 0) == 0 {
        return Err(Error::PmdNotLocked(lane))
    }

    info!("starting eye scan on lane {}", lane);
    let result = sample(hw, generation, lane);
    // The disable goes out even after a failed batch.
    if let Some(e) = hw.req.take_err() {
        debug!("eye scan batch failed: {}", e);
    }
    let disable = uc::do_command(hw, &regs.uc, lm,
                                 &UcCommand::new(Command::Diagnostics, uc::DIAGNOSTICS_DISABLE));
    match (result, disable) {
        (Ok(scan), Ok(_)) => {
            info!("  ...done");
            Ok(scan)
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), disable) => {
            if let Err(d) = disable {
                warn!("disabling diagnostics after failed eye scan: {}", d);
            }
            Err(e)
        }
    }
}
