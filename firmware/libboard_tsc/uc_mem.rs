//! Microcontroller data RAM, reached through the PMD register interface.

use clock::Clock;
use hw::Hw;
use lane::LaneMask;
use sbus::Bus;
use tsc::Generation;
use tsce_reg;
use tscf_reg;
use Result;

/// ARM AHB device address space.
const TSCF_AHB_DEVICE_SPACE: u32 = 0x2000_0000;
/// Data RAM select in `command1`.
const TSCE_RAM_SELECT_DATA: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Byte,
    Word,
}

impl Size {
    fn log2_bytes(self) -> u16 {
        match self {
            Size::Byte => 0,
            Size::Word => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub offset: u16,
    pub size:   Size,
}

const fn byte(offset: u16) -> Field { Field { offset: offset, size: Size::Byte } }
const fn word(offset: u16) -> Field { Field { offset: offset, size: Size::Word } }

/// Per lane variables, offsets relative to the lane's block.
#[derive(Debug)]
pub struct LaneVars {
    pub config_word:       Field,
    pub event_log_level:   Field,
    pub restart_counter:   Field,
    pub reset_counter:     Field,
    pub pmd_lock_counter:  Field,
    pub uc_stopped:        Field,
    pub link_time:         Field,
    pub diag_status:       Field,
    pub diag_read_pointer: Field,
    pub diag_mode:         Field,
}

#[derive(Debug)]
pub struct UcMemLayout {
    pub config_word:          Field,
    pub common_ucode_version: Field,
    pub event_log_level:      Field,
    pub status_byte:          Field,
    pub config_pll1_word:     Option<Field>,
    pub lane_base:            u16,
    pub lane_stride:          u16,
    pub lane:                 LaneVars,
}

impl UcMemLayout {
    pub fn lane_field(&self, lane: usize, field: Field) -> Field {
        Field {
            offset: self.lane_base + self.lane_stride * lane as u16 + field.offset,
            size: field.size,
        }
    }
}

pub static TSCE_UC_MEM: UcMemLayout = UcMemLayout {
    config_word:          word(0x50),
    common_ucode_version: word(0x54),
    event_log_level:      byte(0x5d),
    status_byte:          byte(0x60),
    config_pll1_word:     None,
    lane_base:            0x400,
    lane_stride:          0x100,
    lane: LaneVars {
        config_word:       word(0x00),
        event_log_level:   byte(0x05),
        restart_counter:   byte(0x0a),
        reset_counter:     byte(0x0b),
        pmd_lock_counter:  byte(0x0c),
        uc_stopped:        byte(0x11),
        link_time:         word(0x12),
        diag_status:       word(0x14),
        diag_read_pointer: byte(0x16),
        diag_mode:         byte(0x17),
    },
};

pub static TSCF_UC_MEM: UcMemLayout = UcMemLayout {
    config_word:          word(0x400),
    common_ucode_version: word(0x404),
    event_log_level:      byte(0x40d),
    status_byte:          byte(0x410),
    config_pll1_word:     Some(word(0x414)),
    lane_base:            0x420,
    lane_stride:          0x130,
    lane: LaneVars {
        config_word:       word(0x00),
        event_log_level:   byte(0x05),
        restart_counter:   byte(0x0e),
        reset_counter:     byte(0x0f),
        pmd_lock_counter:  byte(0x10),
        uc_stopped:        byte(0x15),
        link_time:         word(0x16),
        diag_status:       word(0x18),
        diag_read_pointer: byte(0x1a),
        diag_mode:         byte(0x1b),
    },
};

fn access_tscf<B: Bus, C: Clock>(hw: &mut Hw<B, C>, lanes: LaneMask, field: Field,
                                 write: Option<u16>) -> Result<u16> {
    let addr = field.offset as u32 | TSCF_AHB_DEVICE_SPACE;

    // Read and write sizes live in separate fields.
    let (mut v, mut m) = (field.size.log2_bytes(), 3);
    if write.is_none() {
        v <<= 4;
        m <<= 4;
    }
    hw.req.modify(tscf_reg::UC_AHB_CONTROL, lanes, v, m);

    match write {
        Some(data) => {
            hw.req.set(tscf_reg::UC_WRITE_ADDRESS, lanes, addr);
            hw.req.set(tscf_reg::UC_WRITE_DATA, lanes, data as u32);
            hw.flush()?;
            Ok(data)
        }
        None => {
            hw.req.set(tscf_reg::UC_READ_ADDRESS, lanes, addr);
            let slot = hw.req.get(tscf_reg::UC_READ_DATA, lanes);
            hw.flush()?;
            Ok(hw.req.value(slot) as u16)
        }
    }
}

fn access_tsce<B: Bus, C: Clock>(hw: &mut Hw<B, C>, lanes: LaneMask, field: Field,
                                 write: Option<u16>) -> Result<u16> {
    hw.req.modify(tsce_reg::UC_COMMAND1, lanes,
                  TSCE_RAM_SELECT_DATA << tsce_reg::COMMAND1_RAM_SELECT_SHIFT,
                  tsce_reg::COMMAND1_RAM_SELECT_MASK);
    let width = match field.size {
        Size::Byte => tsce_reg::COMMAND1_BYTE_ACCESS,
        Size::Word => 0,
    };
    hw.req.modify(tsce_reg::UC_COMMAND1, lanes, width, tsce_reg::COMMAND1_BYTE_ACCESS);
    hw.req.set(tsce_reg::UC_ADDRESS, lanes, field.offset as u32);

    match write {
        Some(data) => {
            hw.req.set(tsce_reg::UC_WRITE_DATA, lanes, data as u32);
            hw.flush()?;
            Ok(data)
        }
        None => {
            let slot = hw.req.get(tsce_reg::UC_READ_DATA, lanes);
            hw.flush()?;
            Ok(hw.req.value16(slot))
        }
    }
}

fn access<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation, lanes: LaneMask,
                            field: Field, write: Option<u16>) -> Result<u16> {
    let v = match generation {
        Generation::Tscf => access_tscf(hw, lanes, field, write)?,
        Generation::Tsce => access_tsce(hw, lanes, field, write)?,
    };
    Ok(match field.size {
        Size::Byte => v & 0xff,
        Size::Word => v,
    })
}

/// Reads a core variable through the microcontroller of `lanes`.
pub fn read<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation, lanes: LaneMask,
                              field: Field) -> Result<u16> {
    access(hw, generation, lanes, field, None)
}

pub fn write<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation, lanes: LaneMask,
                               field: Field, value: u16) -> Result<()> {
    access(hw, generation, lanes, field, Some(value)).map(|_| ())
}

/// Reads a variable of `lane`'s block through that lane.
pub fn read_lane<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation, lane: usize,
                                   field: Field) -> Result<u16> {
    let field = generation.uc_mem().lane_field(lane, field);
    access(hw, generation, LaneMask::lane(lane), field, None)
}

pub fn write_lane<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation, lane: usize,
                                    field: Field, value: u16) -> Result<()> {
    let field = generation.uc_mem().lane_field(lane, field);
    access(hw, generation, LaneMask::lane(lane), field, Some(value)).map(|_| ())
}
