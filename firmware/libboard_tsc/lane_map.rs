//! Logical to physical lane swapping, polarity and port mode.
//!
//! Rx lanes are swapped in the PCS only. Tx lanes go through the PCS swap
//! first and then through the PMD swap, so the PMD table is composed with
//! the Rx map.

use clock::Clock;
use hw::Hw;
use lane::{LaneMask, PortMode, N_LANE};
use sbus::Bus;
use tsc::Generation;
use Error;
use Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneMap {
    pub rx_logical_by_phys: [u8; N_LANE],
    pub tx_logical_by_phys: [u8; N_LANE],
    pub rx_invert:          LaneMask,
    pub tx_invert:          LaneMask,
}

impl Default for LaneMap {
    fn default() -> LaneMap {
        LaneMap {
            rx_logical_by_phys: [0, 1, 2, 3],
            tx_logical_by_phys: [0, 1, 2, 3],
            rx_invert: LaneMask::NONE,
            tx_invert: LaneMask::NONE,
        }
    }
}

fn is_permutation(map: &[u8; N_LANE]) -> bool {
    let mut seen = 0u8;
    for &l in map.iter() {
        if l as usize >= N_LANE || seen & (1 << l) != 0 {
            return false
        }
        seen |= 1 << l;
    }
    true
}

fn invert(map: &[u8; N_LANE]) -> [u16; N_LANE] {
    let mut inv = [0; N_LANE];
    for (p, &l) in map.iter().enumerate() {
        inv[l as usize] = p as u16;
    }
    inv
}

/// Register values derived from a `LaneMap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneSwap {
    /// `main.rx_lane_swap`, two bits of physical lane per logical lane.
    pub rx_swap:          u16,
    pub tx_map_012:       u16,
    pub tx_map_3_addr_01: u16,
    pub tx_addr_23:       u16,
}

impl LaneMap {
    pub fn new(rx_logical_by_phys: [u8; N_LANE], tx_logical_by_phys: [u8; N_LANE])
              -> Result<LaneMap> {
        let map = LaneMap {
            rx_logical_by_phys: rx_logical_by_phys,
            tx_logical_by_phys: tx_logical_by_phys,
            ..Default::default()
        };
        map.check()?;
        Ok(map)
    }

    pub fn check(&self) -> Result<()> {
        if !is_permutation(&self.rx_logical_by_phys) {
            return Err(Error::InvalidConfig(format!("rx lane map {:?} is not a permutation",
                                                    self.rx_logical_by_phys)))
        }
        if !is_permutation(&self.tx_logical_by_phys) {
            return Err(Error::InvalidConfig(format!("tx lane map {:?} is not a permutation",
                                                    self.tx_logical_by_phys)))
        }
        Ok(())
    }

    pub fn rx_swap(&self) -> u16 {
        invert(&self.rx_logical_by_phys).iter().enumerate()
            .fold(0, |m, (l, &p)| m | p << (2 * l))
    }

    /// Tx physical lane reached through the Rx PCS swap of each physical lane.
    pub fn pmd_map(&self) -> [u16; N_LANE] {
        let tx_phys_by_logical = invert(&self.tx_logical_by_phys);
        let mut pmd_map = [0; N_LANE];
        for p in 0..N_LANE {
            pmd_map[p] = tx_phys_by_logical[self.rx_logical_by_phys[p] as usize];
        }
        pmd_map
    }

    /// Register values for `generation`. The 100G core wants the PMD table
    /// indexed by destination lane, the 40G core by source lane.
    pub fn swap(&self, generation: Generation) -> LaneSwap {
        let pmd_map = self.pmd_map();
        let pmd_tx = match generation {
            Generation::Tscf => {
                let mut pmd_tx = [0; N_LANE];
                for p in 0..N_LANE {
                    pmd_tx[pmd_map[p] as usize] = p as u16;
                }
                pmd_tx
            }
            Generation::Tsce => pmd_map,
        };
        let rx = |p: usize| self.rx_logical_by_phys[p] as u16;

        LaneSwap {
            rx_swap: self.rx_swap(),
            tx_map_012: pmd_tx[0] | pmd_tx[1] << 5 | pmd_tx[2] << 10,
            tx_map_3_addr_01: pmd_tx[3] | rx(0) << 5 | rx(1) << 10,
            tx_addr_23: rx(2) | rx(3) << 8,
        }
    }
}

/// Queues the lane swap registers. `lanes` are the populated lanes of the
/// core; the 100G core only takes the PMD table on lane 0.
pub fn apply<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation, map: &LaneMap,
                               lanes: LaneMask) -> Result<()> {
    map.check()?;
    let regs = generation.regs();
    let swap = map.swap(generation);
    debug!("lane map rx {:?} tx {:?}: {:?}", map.rx_logical_by_phys, map.tx_logical_by_phys, swap);

    let core = LaneMask::lane(0);
    let targets = match generation {
        Generation::Tscf => {
            hw.req.modify(regs.rx_lane_swap, core, swap.rx_swap, 0xff);
            core
        }
        Generation::Tsce => {
            hw.req.set(regs.rx_lane_swap, core, swap.rx_swap as u32);
            lanes
        }
    };
    for lm in targets.masks() {
        hw.req.set(regs.tx_lane_map_012, lm, swap.tx_map_012 as u32);
        hw.req.set(regs.tx_lane_map_3_addr_01, lm, swap.tx_map_3_addr_01 as u32);
        hw.req.set(regs.tx_lane_addr_23, lm, swap.tx_addr_23 as u32);
    }
    hw.flush()
}

/// Rx and Tx polarity inversion of every lane in `lanes`.
pub fn apply_polarity<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation, map: &LaneMap,
                                        lanes: LaneMask) -> Result<()> {
    let regs = generation.regs();
    for lane in lanes.iter() {
        let lm = LaneMask::lane(lane);
        hw.req.modify(regs.tlb_rx_misc_control, lm, map.rx_invert.contains(lane) as u16, 1 << 0);
        hw.req.modify(regs.tlb_tx_misc_control, lm, map.tx_invert.contains(lane) as u16, 1 << 0);
    }
    hw.flush()
}

pub fn set_port_mode<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation,
                                       mode: PortMode) -> Result<()> {
    info!("{} port mode {}", generation, mode);
    let setup = generation.regs().setup;
    // Field position is the same on both cores.
    hw.modify_do(setup, LaneMask::lane(0), mode.code() << 4, 7 << 4)
}

/// Queues the master port field of `main.setup`.
pub fn set_master_port<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation,
                                         port: usize) -> Result<()> {
    if port >= N_LANE {
        return Err(Error::InvalidAccess("master port out of range"))
    }
    let regs = generation.regs();
    hw.req.modify(regs.setup, LaneMask::lane(0), (port as u16) << regs.master_port_shift,
                  regs.master_port_mask);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(rx: [u8; 4], tx: [u8; 4]) -> LaneMap {
        LaneMap::new(rx, tx).unwrap()
    }

    #[test]
    fn identity() {
        let m = LaneMap::default();
        assert_eq!(m.rx_swap(), 0b11_10_01_00);
        assert_eq!(m.pmd_map(), [0, 1, 2, 3]);
        let s = m.swap(Generation::Tscf);
        assert_eq!(s.tx_map_012, 0 | 1 << 5 | 2 << 10);
        assert_eq!(s.tx_map_3_addr_01, 3 | 0 << 5 | 1 << 10);
        assert_eq!(s.tx_addr_23, 2 | 3 << 8);
        assert_eq!(m.swap(Generation::Tsce), s);
    }

    #[test]
    fn rx_remap_with_tx_identity() {
        // Rx logical by physical 2,0,3,1 gives physical by logical 1,3,0,2.
        let m = map([2, 0, 3, 1], [0, 1, 2, 3]);
        assert_eq!(m.rx_swap(), 1 | 3 << 2 | 0 << 4 | 2 << 6);
        assert_eq!(m.rx_swap(), 0x8d);

        // Tx is the identity, so the PMD map is the Rx map itself.
        assert_eq!(m.pmd_map(), [2, 0, 3, 1]);

        let e = m.swap(Generation::Tsce);
        assert_eq!(e.tx_map_012, 2 | 0 << 5 | 3 << 10);
        assert_eq!(e.tx_map_3_addr_01, 1 | 2 << 5 | 0 << 10);
        assert_eq!(e.tx_addr_23, 3 | 1 << 8);

        // Inverted once more for the 100G core.
        let f = m.swap(Generation::Tscf);
        assert_eq!(f.tx_map_012, 1 | 3 << 5 | 0 << 10);
        assert_eq!(f.tx_map_3_addr_01, 2 | 2 << 5 | 0 << 10);
        assert_eq!(f.tx_addr_23, e.tx_addr_23);
        assert_eq!(f.rx_swap, e.rx_swap);
    }

    #[test]
    fn tx_composes_through_rx() {
        let m = map([1, 0, 2, 3], [1, 0, 2, 3]);
        assert_eq!(m.pmd_map(), [0, 1, 2, 3]);
        let m = map([0, 1, 2, 3], [3, 2, 1, 0]);
        assert_eq!(m.pmd_map(), [3, 2, 1, 0]);
    }

    #[test]
    fn non_permutations_are_refused() {
        assert!(LaneMap::new([0, 0, 2, 3], [0, 1, 2, 3]).is_err());
        assert!(LaneMap::new([0, 1, 2, 3], [0, 1, 2, 4]).is_err());
    }
}
