use std::fmt;

use Error;
use Result;

/// Number of SerDes lanes in one core.
pub const N_LANE: usize = 4;

/// Bitmask over the physical lanes of a core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LaneMask(pub u16);

impl LaneMask {
    pub const NONE: LaneMask = LaneMask(0);
    pub const ALL:  LaneMask = LaneMask((1 << N_LANE) - 1);

    pub fn lane(lane: usize) -> LaneMask {
        LaneMask(1 << lane)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, lane: usize) -> bool {
        lane < 16 && self.0 & (1 << lane) != 0
    }

    pub fn is_single(self) -> bool {
        self.0.count_ones() == 1
    }

    pub fn n_lanes(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Lowest set lane, if any.
    pub fn first_lane(self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    pub fn first_lane_mask(self) -> Option<LaneMask> {
        self.first_lane().map(LaneMask::lane)
    }

    /// Lane indices in ascending order.
    pub fn iter(self) -> Lanes {
        Lanes { rest: self.0 }
    }

    /// Single-lane masks in ascending lane order.
    pub fn masks(self) -> LaneMasks {
        LaneMasks { lanes: self.iter() }
    }

    pub fn foreach<F: FnMut(usize)>(self, mut f: F) {
        for lane in self.iter() {
            f(lane)
        }
    }

    pub fn foreach_mask<F: FnMut(LaneMask)>(self, mut f: F) {
        for mask in self.masks() {
            f(mask)
        }
    }

    /// Lane count field used by autonegotiation.
    pub fn log2_lanes(self) -> Result<u16> {
        match self.n_lanes() {
            1  => Ok(0),
            2  => Ok(1),
            4  => Ok(2),
            10 => Ok(3),
            n  => Err(Error::InvalidLaneCount(n))
        }
    }
}

impl fmt::LowerHex for LaneMask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone)]
pub struct Lanes {
    rest: u16
}

impl Iterator for Lanes {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.rest == 0 {
            return None
        }
        let lane = self.rest.trailing_zeros() as usize;
        self.rest &= self.rest - 1;
        Some(lane)
    }
}

#[derive(Debug, Clone)]
pub struct LaneMasks {
    lanes: Lanes
}

impl Iterator for LaneMasks {
    type Item = LaneMask;

    fn next(&mut self) -> Option<LaneMask> {
        self.lanes.next().map(LaneMask::lane)
    }
}

/// Physical medium attached to a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhyInterface {
    /// Backplane.
    Kr,
    /// Copper cable.
    Cr,
    Optics,
}

/// Split of a four lane core into ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortMode {
    /// Four single-lane ports.
    Mode4x1,
    /// Two single-lane ports on lanes 0/1, one dual-lane port on lanes 2/3.
    Mode2x1_1x2,
    /// One dual-lane port on lanes 0/1, two single-lane ports on lanes 2/3.
    Mode1x2_2x1,
    Mode2x2,
    Mode1x4,
}

impl PortMode {
    /// Value of the `main.setup` port mode field.
    pub fn code(self) -> u16 {
        match self {
            PortMode::Mode4x1     => 0,
            PortMode::Mode2x1_1x2 => 1,
            PortMode::Mode1x2_2x1 => 2,
            PortMode::Mode2x2     => 3,
            PortMode::Mode1x4     => 4,
        }
    }

    pub fn parse(s: &str) -> Option<PortMode> {
        match s {
            "4x1"     => Some(PortMode::Mode4x1),
            "2x1_1x2" => Some(PortMode::Mode2x1_1x2),
            "1x2_2x1" => Some(PortMode::Mode1x2_2x1),
            "2x2"     => Some(PortMode::Mode2x2),
            "1x4"     => Some(PortMode::Mode1x4),
            _         => None
        }
    }
}

impl fmt::Display for PortMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &PortMode::Mode4x1     => write!(f, "4x1"),
            &PortMode::Mode2x1_1x2 => write!(f, "2x1_1x2"),
            &PortMode::Mode1x2_2x1 => write!(f, "1x2_2x1"),
            &PortMode::Mode2x2     => write!(f, "2x2"),
            &PortMode::Mode1x4     => write!(f, "1x4"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loopback {
    None,
    Mac,
    /// PCS local loopback.
    PhyLocal,
    PhyRemote,
}

/// What the driver needs to know about a port owned by the caller.
pub trait Porter {
    fn lane_mask(&self) -> LaneMask;
    fn phy_interface(&self) -> PhyInterface;
    fn name(&self) -> &str;
    fn port_mode(&self) -> PortMode;
}

/// Plain port description.
#[derive(Debug, Clone)]
pub struct Port {
    pub name:          String,
    pub lane_mask:     LaneMask,
    pub phy_interface: PhyInterface,
    pub port_mode:     PortMode,
}

impl Port {
    pub fn new(name: &str, lane_mask: LaneMask, phy_interface: PhyInterface,
               port_mode: PortMode) -> Port {
        Port {
            name: name.to_owned(),
            lane_mask: lane_mask,
            phy_interface: phy_interface,
            port_mode: port_mode,
        }
    }
}

impl Porter for Port {
    fn lane_mask(&self) -> LaneMask { self.lane_mask }
    fn phy_interface(&self) -> PhyInterface { self.phy_interface }
    fn name(&self) -> &str { &self.name }
    fn port_mode(&self) -> PortMode { self.port_mode }
}
