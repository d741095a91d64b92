//! Register level model of a port block, enough to run the driver against.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;

use board_tsc::clock::Clock;
use board_tsc::firmware::Blob;
use board_tsc::lane::LaneMask;
use board_tsc::phy::Phy;
use board_tsc::reg::{self, Dev, Reg};
use board_tsc::sbus::{self, Bus, BusError, Opcode, Transfer};
use board_tsc::settings::PortBlockSettings;
use board_tsc::tsc::Generation;
use board_tsc::tsce_reg;
use board_tsc::tscf_reg;
use board_tsc::uc::Command;

pub const PHY_ID: u8 = 3;
pub const BLOCK: u8 = 7;
pub const UCODE_CRC: u16 = 0xbeef;

const BROADCAST: u32 = 6;
const CONTROL_DONE: u16 = 1 << 7;
const CONTROL_ERROR: u16 = 1 << 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Write { dev: Dev, lane: u32, offset: u16, value: u16, mask: u16 },
    Read { dev: Dev, lane: u32, offset: u16 },
}

impl Op {
    pub fn offset(&self) -> u16 {
        match *self {
            Op::Write { offset, .. } | Op::Read { offset, .. } => offset
        }
    }

    pub fn is_write_to(&self, reg: Reg) -> bool {
        match *self {
            Op::Write { dev, offset, .. } => dev == reg.dev && offset == reg.offset,
            _ => false
        }
    }

    pub fn is_read_of(&self, reg: Reg) -> bool {
        match *self {
            Op::Read { dev, offset, .. } => dev == reg.dev && offset == reg.offset,
            _ => false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UcMode {
    Normal,
    /// Every command completes with the error bit.
    Error,
    /// Commands never complete.
    NeverDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UcCall {
    pub lane:        u32,
    pub command:     u16,
    pub sub_command: u8,
}

pub struct SimBus {
    pub generation:        Generation,
    regs:                  HashMap<(Dev, u32, u16), u16>,
    pub uc_mem:            HashMap<u16, u16>,
    pub ops:               Vec<Op>,
    pub batches:           usize,
    /// The batch with this number times out.
    pub failing_batch:     Option<usize>,
    pub uc_calls:          Vec<UcCall>,
    pub uc_mode:           UcMode,
    /// Commands with this code complete with the error bit.
    pub failing:           Option<Command>,
    pub crc:               u16,
    pub diag_word:         u16,
    pub event_log:         Vec<u8>,
    event_log_pos:         usize,
    pub downloaded:        Vec<u32>,
    access_mode:           u32,
    pending_read:          Option<u32>,
    pub speed_change_hang: bool,
}

impl SimBus {
    pub fn new(generation: Generation) -> SimBus {
        let mut sim = SimBus {
            generation: generation,
            regs: HashMap::new(),
            uc_mem: HashMap::new(),
            ops: Vec::new(),
            batches: 0,
            failing_batch: None,
            uc_calls: Vec::new(),
            uc_mode: UcMode::Normal,
            failing: None,
            crc: UCODE_CRC,
            diag_word: 0,
            event_log: Vec::new(),
            event_log_pos: 0,
            downloaded: Vec::new(),
            access_mode: 0,
            pending_read: None,
            speed_change_hang: false,
        };
        let uc = generation.regs().uc.control;
        for lane in 0..4 {
            sim.poke(uc, lane, CONTROL_DONE);
        }
        match generation {
            Generation::Tscf => sim.poke(tscf_reg::UC_AHB_STATUS, 0, 1),
            Generation::Tsce => sim.poke(tsce_reg::UC_MDIO_8051_FSM_STATUS, 0, 1 << 15),
        }
        sim
    }

    pub fn peek(&self, reg: Reg, lane: u32) -> u16 {
        self.regs.get(&(reg.dev, lane, reg.offset)).cloned().unwrap_or(0)
    }

    pub fn poke(&mut self, reg: Reg, lane: u32, value: u16) {
        self.regs.insert((reg.dev, lane, reg.offset), value);
    }

    pub fn writes_to(&self, reg: Reg) -> Vec<Op> {
        self.ops.iter().filter(|op| op.is_write_to(reg)).cloned().collect()
    }

    pub fn uc_calls_of(&self, command: Command) -> Vec<UcCall> {
        self.uc_calls.iter().filter(|c| c.command == command.code()).cloned().collect()
    }

    fn lanes(lane_select: u32) -> Vec<u32> {
        if lane_select == BROADCAST { vec![0, 1, 2, 3] } else { vec![lane_select] }
    }

    fn read(&mut self, address: u32) -> u16 {
        let (_, dev, lane, offset) = reg::decode_address(address);
        self.ops.push(Op::Read { dev: dev, lane: lane, offset: offset });
        let lane = if lane == BROADCAST { 0 } else { lane };
        self.regs.get(&(dev, lane, offset)).cloned().unwrap_or(0)
    }

    fn write(&mut self, address: u32, data: u16, mask: u16) {
        let (_, dev, lane_select, offset) = reg::decode_address(address);
        self.ops.push(Op::Write { dev: dev, lane: lane_select, offset: offset, value: data,
                                  mask: mask });
        for lane in SimBus::lanes(lane_select) {
            let old = self.regs.get(&(dev, lane, offset)).cloned().unwrap_or(0);
            let new = (old & !mask) | (data & mask);
            self.regs.insert((dev, lane, offset), new);
            self.side_effects(dev, lane, offset, new);
        }
    }

    fn side_effects(&mut self, dev: Dev, lane: u32, offset: u16, value: u16) {
        let regs = self.generation.regs();
        if dev == Dev::Pmd && offset == regs.uc.control.offset {
            return self.uc_command(lane, value)
        }
        if dev == Dev::Pcs && offset == regs.speed_change_control.offset {
            if value & (1 << 8) != 0 && !self.speed_change_hang {
                let status = self.peek(regs.speed_change_status, lane);
                self.poke(regs.speed_change_status, lane, status | 1 << 1);
            }
            return
        }
        if dev != Dev::Pmd {
            return
        }
        match self.generation {
            Generation::Tscf => {
                if offset == tscf_reg::UC_WRITE_DATA.offset {
                    let addr = self.peek(tscf_reg::UC_WRITE_ADDRESS, lane);
                    self.uc_mem.insert(addr, value);
                } else if offset == tscf_reg::UC_READ_ADDRESS.offset {
                    let v = self.uc_mem.get(&value).cloned().unwrap_or(0);
                    self.poke(tscf_reg::UC_READ_DATA, lane, v);
                }
            }
            Generation::Tsce => {
                if offset == tsce_reg::UC_WRITE_DATA.offset {
                    let addr = self.peek(tsce_reg::UC_ADDRESS, lane);
                    self.uc_mem.insert(addr, value);
                } else if offset == tsce_reg::UC_ADDRESS.offset {
                    let v = self.uc_mem.get(&value).cloned().unwrap_or(0);
                    self.poke(tsce_reg::UC_READ_DATA, lane, v);
                }
            }
        }
    }

    fn uc_command(&mut self, lane: u32, word: u16) {
        let regs = self.generation.regs();
        let command = word & 0x3f;
        let sub_command = (word >> 8) as u8;
        self.uc_calls.push(UcCall { lane: lane, command: command, sub_command: sub_command });

        let mut aux = 0;
        let output = if command == Command::ComputeUcodeCrc.code() {
            Some(self.crc)
        } else if command == Command::ReadDiagnosticDataWord.code() {
            Some(self.diag_word)
        } else if command == Command::EventLogRead.code() {
            match sub_command {
                0 => { self.event_log_pos = 0; None }
                1 => {
                    let b = self.event_log.get(self.event_log_pos).cloned().unwrap_or(0);
                    self.event_log_pos += 1;
                    if self.event_log_pos >= self.event_log.len() {
                        aux = 1;
                    }
                    Some(b as u16)
                }
                _ => None
            }
        } else {
            None
        };
        if let Some(v) = output {
            self.poke(regs.uc.data, lane, v);
        }

        let failing = self.failing.map_or(false, |c| c.code() == command);
        let status = match self.uc_mode {
            UcMode::Normal if failing => CONTROL_DONE | CONTROL_ERROR,
            UcMode::Normal => CONTROL_DONE | aux << 8,
            UcMode::Error => CONTROL_DONE | CONTROL_ERROR,
            UcMode::NeverDone => 0,
        };
        self.poke(regs.uc.control, lane, status | command);
    }

    fn transfer(&mut self, t: &mut Transfer) {
        match t.opcode {
            Opcode::WriteRegister => {
                if t.address == sbus::PHY_UC_DATA_ACCESS_MODE {
                    self.access_mode = t.tx[0];
                }
            }
            Opcode::WriteMemory if self.access_mode == 1 => {
                self.downloaded.extend_from_slice(&t.tx);
            }
            Opcode::WriteMemory => {
                let address = t.tx[0];
                let data = (t.tx[1] >> 16) as u16;
                let mask = !(t.tx[1] as u16);
                if t.tx[2] != 0 {
                    self.write(address, data, mask);
                } else {
                    self.pending_read = Some(address);
                }
            }
            Opcode::ReadMemory => {
                let v = match self.pending_read.take() {
                    Some(address) => self.read(address),
                    None => 0
                };
                t.rx[1] = v as u32;
            }
        }
    }
}

impl Bus for SimBus {
    fn execute(&mut self, batch: &mut [Transfer]) -> Result<(), BusError> {
        self.batches += 1;
        if self.failing_batch == Some(self.batches) {
            return Err(BusError::Timeout)
        }
        for t in batch.iter_mut() {
            if t.block != BLOCK {
                return Err(BusError::Nack { block: t.block, address: t.address })
            }
            self.transfer(t);
        }
        Ok(())
    }
}

/// Time only moves when the driver sleeps.
pub struct SimClock {
    now: Cell<u64>,
}

impl SimClock {
    pub fn new() -> SimClock {
        SimClock { now: Cell::new(0) }
    }
}

impl Clock for SimClock {
    fn get_us(&self) -> u64 {
        self.now.get()
    }

    fn spin_us(&self, interval: u64) {
        self.now.set(self.now.get() + interval)
    }
}

pub fn settings(generation: Generation) -> PortBlockSettings {
    PortBlockSettings::new(generation, PHY_ID, BLOCK)
}

pub fn blob() -> Blob {
    Blob::new(0xd105, UCODE_CRC, (0..40).collect()).unwrap()
}

/// A driver on a fresh simulated block, microcode preset.
pub fn phy(generation: Generation) -> Phy<SimBus, SimClock> {
    phy_with(settings(generation))
}

pub fn phy_with(settings: PortBlockSettings) -> Phy<SimBus, SimClock> {
    let generation = settings.generation;
    let mut phy = Phy::new(SimBus::new(generation), SimClock::new(), settings).unwrap();
    phy.set_firmware(blob());
    phy
}

/// A driver whose core has been brought up, with the bring-up traffic
/// cleared from the log.
pub fn ready_phy(generation: Generation) -> Phy<SimBus, SimClock> {
    let mut phy = phy(generation);
    phy.init().unwrap();
    phy.hw.bus.ops.clear();
    phy.hw.bus.uc_calls.clear();
    phy
}

pub fn lane(l: usize) -> LaneMask {
    LaneMask::lane(l)
}

pub fn init_logging() {
    let _ = ::logger_tsc::init();
}
