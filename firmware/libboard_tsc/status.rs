//! Link status and debug snapshots.

use std::fmt;

use clock::Clock;
use dma::Slot;
use hw::Hw;
use lane::{LaneMask, Porter, N_LANE};
use sbus::Bus;
use speed;
use tsc::Generation;
use tsce_reg;
use tscf_reg;
use uc_mem;
use Error;
use Result;

/// CL72 link training status of a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cl72Status(pub u16);

impl Cl72Status {
    pub fn receiver_trained(self) -> bool {
        self.0 & (1 << 0) != 0
    }

    pub fn frame_lock(self) -> bool {
        self.0 & (1 << 1) != 0
    }

    pub fn training_in_progress(self) -> bool {
        self.0 & (1 << 2) != 0
    }

    pub fn training_failure(self) -> bool {
        self.0 & (1 << 3) != 0
    }
}

impl fmt::Display for Cl72Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = [
            (self.receiver_trained(), "receiver trained"),
            (self.frame_lock(), "frame lock"),
            (self.training_in_progress(), "training"),
            (self.training_failure(), "training failure"),
        ];
        let mut first = true;
        for &(_, name) in names.iter().filter(|n| n.0) {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", name)?;
            first = false;
        }
        if first {
            write!(f, "none")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutonegStatus {
    pub enable: bool,
    pub done:   bool,
}

/// Snapshot of one lane of a port.
#[derive(Debug, Clone, PartialEq)]
pub struct PortStatus {
    /// `<port>:<lane>`
    pub name:            String,
    pub live_link:       bool,
    pub signal_detect:   bool,
    pub pmd_lock:        bool,
    pub speed:           String,
    pub autoneg:         AutonegStatus,
    pub sigdet_status:   u16,
    pub cl72:            Cl72Status,
    pub sc_debug:        u16,
    pub pmd_lane_status: u16,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: link {} sigdet {} pmd lock {} speed {:?} an {}/{} cl72 [{}]",
               self.name, self.live_link as u8, self.signal_detect as u8, self.pmd_lock as u8,
               self.speed, self.autoneg.enable as u8, self.autoneg.done as u8, self.cl72)
    }
}

fn lane_mask(lane: usize) -> Result<LaneMask> {
    if lane >= N_LANE {
        return Err(Error::InvalidAccess("lane out of range"))
    }
    Ok(LaneMask::lane(lane))
}

/// Reads the status of `lane` of `port` in a single batch.
pub fn read<B: Bus, C: Clock, P: Porter + ?Sized>(hw: &mut Hw<B, C>, generation: Generation,
                                                  port: &P, lane: usize) -> Result<PortStatus> {
    let regs = generation.regs();
    let lm = lane_mask(lane)?;
    let (sc_debug, pmd_lane_status) = match generation {
        Generation::Tscf => (tscf_reg::SC_X4_DEBUG, tscf_reg::PMD_X4_LANE_STATUS),
        Generation::Tsce => (tsce_reg::SC_X4_DEBUG, tsce_reg::PMD_X4_LANE_STATUS),
    };

    let live = hw.req.get(regs.pcs_live_status, lm);
    let sigdet = hw.req.get(regs.sigdet_status, lm);
    let pmd_lock = hw.req.get(regs.tlb_rx_pmd_lock_status, lm);
    let final_speed = hw.req.get(regs.final_speed_config, lm);
    let an_control = hw.req.get(regs.an_control, lm);
    let an_status = hw.req.get(regs.an_misc_status, lm);
    let debug = hw.req.get(sc_debug, lm);
    let lane_status = hw.req.get(pmd_lane_status, lm);
    let cl72 = hw.req.get(regs.cl93n72_status, lm);
    hw.flush()?;

    let v = |slot: Slot| hw.req.value16(slot);
    let (an_enable_bit, an_done_bit) = (1 << 8, 1 << 15);
    Ok(PortStatus {
        name: format!("{}:{}", port.name(), lane),
        live_link: v(live) & (1 << 1) != 0,
        signal_detect: v(sigdet) & (1 << 0) != 0,
        pmd_lock: v(pmd_lock) & (1 << 0) != 0,
        speed: speed::speed_name(generation, v(final_speed) >> 8),
        autoneg: AutonegStatus {
            enable: v(an_control) & an_enable_bit != 0,
            done: v(an_status) & an_done_bit != 0,
        },
        sigdet_status: v(sigdet),
        cl72: Cl72Status(v(cl72)),
        sc_debug: v(debug),
        pmd_lane_status: v(lane_status),
    })
}

/// Core wide part of a debug snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoreDebug {
    pub datapath_reset_status: u16,
    pub uc_status:             u16,
    pub config_word:           u16,
    pub ucode_version:         u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaneDebug {
    pub lane:                  usize,
    pub datapath_reset_status: u16,
    pub uc_stopped:            u16,
    pub top_user_control:      u16,
    pub config_word:           u16,
    pub restarts:              u16,
    pub resets:                u16,
    pub pmd_locks:             u16,
    pub link_status:           u16,
    pub pll_multiplier:        u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugSnapshot {
    pub core:  CoreDebug,
    pub lanes: Vec<LaneDebug>,
}

impl fmt::Display for DebugSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "core status {:04x} uc status {:02x} config 0x{:04x} uc version 0x{:04x}",
                 self.core.datapath_reset_status, self.core.uc_status, self.core.config_word,
                 self.core.ucode_version)?;
        for l in self.lanes.iter() {
            writeln!(f, "  lane {}: status {:04x} uc {:02x} top {:04x} config 0x{:04x} \
                         restarts {} resets {} pmd locks {} link_status {:x} pll 0x{:x}",
                     l.lane, l.datapath_reset_status, l.uc_stopped, l.top_user_control,
                     l.config_word, l.restarts, l.resets, l.pmd_locks, l.link_status,
                     l.pll_multiplier)?;
        }
        Ok(())
    }
}

/// Reads reset state, microcontroller variables and counters of the core
/// and of each lane in `lanes`.
pub fn debug_snapshot<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation,
                                        lanes: LaneMask) -> Result<DebugSnapshot> {
    let regs = generation.regs();
    let mem = generation.uc_mem();
    let core = LaneMask::lane(0);

    let core_debug = CoreDebug {
        datapath_reset_status: hw.get_do(regs.core_datapath_reset_status, core)?,
        uc_status: uc_mem::read(hw, generation, core, mem.status_byte)?,
        config_word: uc_mem::read(hw, generation, core, mem.config_word)?,
        ucode_version: uc_mem::read(hw, generation, core, mem.common_ucode_version)?,
    };

    let mut lane_debug = Vec::new();
    for lane in lanes.iter() {
        let lm = lane_mask(lane)?;
        lane_debug.push(LaneDebug {
            lane: lane,
            datapath_reset_status: hw.get_do(regs.lane_data_path_reset_status, lm)?,
            uc_stopped: uc_mem::read_lane(hw, generation, lane, mem.lane.uc_stopped)?,
            top_user_control: hw.get_do(regs.top_user_control, lm)?,
            config_word: uc_mem::read_lane(hw, generation, lane, mem.lane.config_word)?,
            restarts: uc_mem::read_lane(hw, generation, lane, mem.lane.restart_counter)?,
            resets: uc_mem::read_lane(hw, generation, lane, mem.lane.reset_counter)?,
            pmd_locks: uc_mem::read_lane(hw, generation, lane, mem.lane.pmd_lock_counter)?,
            link_status: hw.get_do(regs.pcs_live_status, lm)?,
            pll_multiplier: hw.get_do(regs.pll_multiplier, lm)?,
        });
    }
    Ok(DebugSnapshot { core: core_debug, lanes: lane_debug })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cl72_bits() {
        let s = Cl72Status(0b0011);
        assert!(s.receiver_trained() && s.frame_lock());
        assert!(!s.training_in_progress() && !s.training_failure());
        assert_eq!(s.to_string(), "receiver trained, frame lock");
        assert_eq!(Cl72Status(1 << 3).to_string(), "training failure");
        assert_eq!(Cl72Status(0).to_string(), "none");
    }

    #[test]
    fn snapshot_format() {
        let snapshot = DebugSnapshot {
            core: CoreDebug { datapath_reset_status: 0x1, uc_status: 0x2, config_word: 0xd6,
                              ucode_version: 0xd105 },
            lanes: vec![LaneDebug { lane: 2, restarts: 3, pll_multiplier: 7, ..Default::default() }],
        };
        let s = snapshot.to_string();
        assert!(s.starts_with("core status 0001 uc status 02 config 0x00d6 uc version 0xd105\n"));
        assert!(s.contains("  lane 2: status 0000 uc 00 top 0000 config 0x0000 restarts 3"));
        assert!(s.ends_with("pll 0x7\n"));
    }
}
