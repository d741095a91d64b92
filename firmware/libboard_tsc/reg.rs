use lane::LaneMask;
use Error;
use Result;

/// Device class; PMD registers set the DEVAD bit of the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dev {
    Pcs,
    Pmd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Select {
    /// One instance per core, always addressed through lane 0.
    Core,
    /// Per lane, and may be broadcast to all four lanes at once.
    LaneBroadcast,
    /// Per lane, single lane addressing only.
    LaneIndexed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    W16,
    /// Two consecutive 16 bit halves, low half at `offset`.
    W32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg {
    pub offset: u16,
    pub select: Select,
    pub dev:    Dev,
    pub width:  Width,
}

const LANE_SELECT_ALL: u32 = 6;

impl Reg {
    pub const fn pcs(offset: u16) -> Reg {
        Reg { offset: offset, select: Select::Core, dev: Dev::Pcs, width: Width::W16 }
    }

    pub const fn pcs32(offset: u16) -> Reg {
        Reg { offset: offset, select: Select::Core, dev: Dev::Pcs, width: Width::W32 }
    }

    pub const fn pcs_lane(offset: u16) -> Reg {
        Reg { offset: offset, select: Select::LaneBroadcast, dev: Dev::Pcs, width: Width::W16 }
    }

    pub const fn pmd_lane(offset: u16) -> Reg {
        Reg { offset: offset, select: Select::LaneIndexed, dev: Dev::Pmd, width: Width::W16 }
    }

    pub const fn pmd_lane32(offset: u16) -> Reg {
        Reg { offset: offset, select: Select::LaneIndexed, dev: Dev::Pmd, width: Width::W32 }
    }

    pub fn is_32bit(&self) -> bool {
        self.width == Width::W32
    }

    /// Lane selector field for an access to `lanes`.
    pub fn lane_select(&self, lanes: LaneMask) -> Result<u32> {
        if self.select == Select::Core {
            return Ok(0)
        }
        if lanes.is_single() && lanes.0 < (1 << 4) {
            return Ok(lanes.0.trailing_zeros())
        }
        // Multi lane broadcast does not work reliably for all serdes registers.
        if lanes == LaneMask::ALL && self.select == Select::LaneBroadcast {
            return Ok(LANE_SELECT_ALL)
        }
        Err(Error::InvalidLaneMask(lanes.0))
    }

    /// Full PHY address of the 16 bit half at `index`.
    pub fn address(&self, phy_id: u8, lanes: LaneMask, index: u16) -> Result<u32> {
        let lane_select = self.lane_select(lanes)?;
        Ok(phy_address(phy_id, self.dev, lane_select, self.offset + index))
    }
}

pub fn phy_address(phy_id: u8, dev: Dev, lane_select: u32, offset: u16) -> u32 {
    let mut a = offset as u32;
    if dev == Dev::Pmd {
        a |= 1 << 27;
    }
    a |= (phy_id as u32) << 19;
    a |= lane_select << 16;
    a
}

/// Splits a PHY address back into (phy id, device, lane selector, offset).
pub fn decode_address(a: u32) -> (u8, Dev, u32, u16) {
    let dev = if a & (1 << 27) != 0 { Dev::Pmd } else { Dev::Pcs };
    (((a >> 19) & 0xff) as u8, dev, (a >> 16) & 0x7, a as u16)
}
