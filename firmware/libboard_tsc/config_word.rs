//! Core and lane configuration words shared with the microcontroller.

use lane::PhyInterface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Backplane,
    CopperCable,
    Optics,
}

impl MediaType {
    pub fn code(self) -> u16 {
        match self {
            MediaType::Backplane   => 0,
            MediaType::CopperCable => 1,
            MediaType::Optics      => 2,
        }
    }

    /// Code 3 is reserved and reads back as backplane.
    pub fn from_code(code: u16) -> MediaType {
        match code & 3 {
            1 => MediaType::CopperCable,
            2 => MediaType::Optics,
            _ => MediaType::Backplane,
        }
    }

    pub fn from_interface(interface: PhyInterface) -> MediaType {
        match interface {
            PhyInterface::Kr     => MediaType::Backplane,
            PhyInterface::Cr     => MediaType::CopperCable,
            PhyInterface::Optics => MediaType::Optics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreConfigWord {
    pub vco_rate_hz: f64,
    pub from_pcs: bool,
    /// TSCF only.
    pub disable_write_pll_charge_pump_current: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneConfigWord {
    pub cl72_restart_timeout_enable: bool,
    pub cl72_auto_polarity_enable:   bool,
    pub scrambling_disable:          bool,
    pub unreliable_los:              bool,
    pub force_br_dfe_on:             bool,
    /// TSCF only.
    pub dfe_low_power_mode:          bool,
    pub dfe_on:                      bool,
    pub autoneg_enable:              bool,
    pub from_pcs:                    bool,
    pub media_type:                  MediaType,
}

impl Default for LaneConfigWord {
    fn default() -> LaneConfigWord {
        LaneConfigWord {
            cl72_restart_timeout_enable: false,
            cl72_auto_polarity_enable: false,
            scrambling_disable: false,
            unreliable_los: false,
            force_br_dfe_on: false,
            dfe_low_power_mode: false,
            dfe_on: false,
            autoneg_enable: false,
            from_pcs: false,
            media_type: MediaType::Backplane,
        }
    }
}

/// Encoding of the configuration words for one core generation.
///
/// `encode_core` expects a VCO rate on the generation's grid; use
/// `snap_vco` first.
pub trait ConfigCodec: Sync {
    /// VCO rate step in Hz.
    fn vco_unit(&self) -> f64;
    /// VCO rate code 0 in units of `vco_unit`.
    fn vco_base(&self) -> u16;
    fn vco_code_mask(&self) -> u16;

    fn encode_core(&self, w: &CoreConfigWord) -> u16;
    fn decode_core(&self, v: u16) -> CoreConfigWord;
    fn encode_lane(&self, w: &LaneConfigWord) -> u16;
    fn decode_lane(&self, v: u16) -> LaneConfigWord;

    fn vco_code(&self, vco_rate_hz: f64) -> u16 {
        let steps = (vco_rate_hz / self.vco_unit() + 0.5) as u16;
        steps.wrapping_sub(self.vco_base()) & self.vco_code_mask()
    }

    /// Nearest representable VCO rate.
    fn snap_vco(&self, vco_rate_hz: f64) -> f64 {
        let code = self.vco_code(vco_rate_hz);
        self.vco_unit() * (self.vco_base() + code) as f64
    }
}

fn bit(v: u16, n: u16) -> bool {
    v & (1 << n) != 0
}

fn flag(b: bool, n: u16) -> u16 {
    (b as u16) << n
}

pub struct TscfCodec;
pub struct TsceCodec;

pub static TSCF_CODEC: TscfCodec = TscfCodec;
pub static TSCE_CODEC: TsceCodec = TsceCodec;

impl ConfigCodec for TscfCodec {
    fn vco_unit(&self) -> f64 { 62.5e6 }
    fn vco_base(&self) -> u16 { 224 }
    fn vco_code_mask(&self) -> u16 { 0xff }

    fn encode_core(&self, w: &CoreConfigWord) -> u16 {
        self.vco_code(w.vco_rate_hz) |
            flag(w.from_pcs, 8) |
            flag(w.disable_write_pll_charge_pump_current, 9)
    }

    fn decode_core(&self, v: u16) -> CoreConfigWord {
        CoreConfigWord {
            vco_rate_hz: self.vco_unit() * (self.vco_base() + (v & 0xff)) as f64,
            from_pcs: bit(v, 8),
            disable_write_pll_charge_pump_current: bit(v, 9),
        }
    }

    fn encode_lane(&self, w: &LaneConfigWord) -> u16 {
        flag(w.cl72_restart_timeout_enable, 10) |
            flag(w.cl72_auto_polarity_enable, 9) |
            flag(w.scrambling_disable, 8) |
            flag(w.unreliable_los, 7) |
            w.media_type.code() << 5 |
            flag(w.force_br_dfe_on, 4) |
            flag(w.dfe_low_power_mode, 3) |
            flag(w.dfe_on, 2) |
            flag(w.autoneg_enable, 1) |
            flag(w.from_pcs, 0)
    }

    fn decode_lane(&self, v: u16) -> LaneConfigWord {
        LaneConfigWord {
            cl72_restart_timeout_enable: bit(v, 10),
            cl72_auto_polarity_enable: bit(v, 9),
            scrambling_disable: bit(v, 8),
            unreliable_los: bit(v, 7),
            media_type: MediaType::from_code(v >> 5),
            force_br_dfe_on: bit(v, 4),
            dfe_low_power_mode: bit(v, 3),
            dfe_on: bit(v, 2),
            autoneg_enable: bit(v, 1),
            from_pcs: bit(v, 0),
        }
    }
}

impl ConfigCodec for TsceCodec {
    fn vco_unit(&self) -> f64 { 250e6 }
    fn vco_base(&self) -> u16 { 22 }
    fn vco_code_mask(&self) -> u16 { 0x1f }

    fn encode_core(&self, w: &CoreConfigWord) -> u16 {
        flag(w.from_pcs, 0) | self.vco_code(w.vco_rate_hz) << 1
    }

    fn decode_core(&self, v: u16) -> CoreConfigWord {
        CoreConfigWord {
            vco_rate_hz: self.vco_unit() * (self.vco_base() + ((v >> 1) & 0x1f)) as f64,
            from_pcs: bit(v, 0),
            disable_write_pll_charge_pump_current: false,
        }
    }

    fn encode_lane(&self, w: &LaneConfigWord) -> u16 {
        flag(w.cl72_restart_timeout_enable, 9) |
            flag(w.cl72_auto_polarity_enable, 8) |
            flag(w.scrambling_disable, 7) |
            flag(w.unreliable_los, 6) |
            w.media_type.code() << 4 |
            flag(w.force_br_dfe_on, 3) |
            flag(w.dfe_on, 2) |
            flag(w.autoneg_enable, 1) |
            flag(w.from_pcs, 0)
    }

    fn decode_lane(&self, v: u16) -> LaneConfigWord {
        LaneConfigWord {
            cl72_restart_timeout_enable: bit(v, 9),
            cl72_auto_polarity_enable: bit(v, 8),
            scrambling_disable: bit(v, 7),
            unreliable_los: bit(v, 6),
            media_type: MediaType::from_code(v >> 4),
            force_br_dfe_on: bit(v, 3),
            dfe_low_power_mode: false,
            dfe_on: bit(v, 2),
            autoneg_enable: bit(v, 1),
            from_pcs: bit(v, 0),
        }
    }
}
