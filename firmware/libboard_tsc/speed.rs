//! Speed id, oversampling divider and PLL multiplier selection.

use config_word::{CoreConfigWord, LaneConfigWord, MediaType};
use lane::{LaneMask, PhyInterface};
use tsc::Generation;
use Error;
use Result;

/// The only supported PHY reference clock.
pub const REF_CLOCK_HZ: f64 = 156.25e6;

pub const TSCF_PLL_MULTIPLIERS: [u16; 16] = [
    64, 66, 80, 128, 132, 140, 160, 165,
    168, 170, 175, 180, 184, 200, 224, 264,
];

pub const TSCE_PLL_MULTIPLIERS: [u16; 16] = [
    46, 72, 40, 42, 48, 50, 52, 54,
    60, 64, 66, 68, 70, 80, 92, 100,
];

pub const TSCF_OVER_SAMPLING_DIVIDER_1:      u16 = 0;
pub const TSCF_OVER_SAMPLING_DIVIDER_2:      u16 = 1;
pub const TSCF_OVER_SAMPLING_DIVIDER_4:      u16 = 2;
pub const TSCF_OVER_SAMPLING_DIVIDER_16_5:   u16 = 8;
pub const TSCF_OVER_SAMPLING_DIVIDER_20_625: u16 = 12;

/// Divider ratio by code.
pub const TSCE_OVER_SAMPLING_DIVIDERS: [f64; 10] = [
    1.0, 2.0, 3.0, 3.3, 4.0, 5.0, 7.25, 8.0, 8.25, 10.0
];
pub const TSCE_OVER_SAMPLING_DIVIDER_1:    u16 = 0;
pub const TSCE_OVER_SAMPLING_DIVIDER_8_25: u16 = 8;

pub const TSCF_SPEED_CR:     u16 = 0 << 0;
pub const TSCF_SPEED_KR:     u16 = 1 << 0;
pub const TSCF_SPEED_OPTICS: u16 = 2 << 0;
pub const TSCF_SPEED_HG2:    u16 = 1 << 2;

pub const TSCF_SPEED_10G_X1:       u16 = 0 << 3;
pub const TSCF_SPEED_20G_X1:       u16 = 1 << 3;
pub const TSCF_SPEED_25G_X1:       u16 = 2 << 3;
pub const TSCF_SPEED_20G_X2:       u16 = 3 << 3;
pub const TSCF_SPEED_40G_X2:       u16 = 4 << 3;
pub const TSCF_SPEED_40G_X4:       u16 = 5 << 3;
pub const TSCF_SPEED_50G_X2:       u16 = 6 << 3;
pub const TSCF_SPEED_50G_X4:       u16 = 7 << 3;
pub const TSCF_SPEED_100G_X4:      u16 = 8 << 3;
pub const TSCF_SPEED_CL73_20G_VCO: u16 = 9 << 3;
pub const TSCF_SPEED_CL73_25G_VCO: u16 = 10 << 3;
pub const TSCF_SPEED_CL36_20G_VCO: u16 = 11 << 3;
pub const TSCF_SPEED_CL36_25G_VCO: u16 = 12 << 3;

pub const TSCE_SPEED_1G_KX1:  u16 = 5;
pub const TSCE_SPEED_10G_CX4: u16 = 8;
pub const TSCE_SPEED_10G_X4:  u16 = 10;
pub const TSCE_SPEED_10G_KR1: u16 = 28;

static TSCE_SPEED_NAMES: [(u16, &'static str); 46] = [
    (0, "invalid"), (1, "10M"), (2, "100M"), (3, "1000M"), (4, "1G CX1"), (5, "1G KX1"),
    (6, "2.5G X1"), (7, "5G X1"), (8, "10G CX4"), (9, "10G KX4"), (10, "10G X4"),
    (11, "13G X4"), (12, "15G X4"), (13, "16G X4"), (14, "20G CX4"), (15, "10G CX2"),
    (16, "10G X2"), (17, "20G X4"), (18, "10.5G X2"), (19, "21G X4"), (20, "12.7G X2"),
    (21, "25.45G X4"), (22, "15.75G X2"), (23, "31.5G X4"), (24, "31.5G KR4"),
    (25, "20G CX2"), (26, "20G X2"), (27, "40G X4"), (28, "10G KR1"), (29, "10.6G X1"),
    (30, "20G KR2"), (31, "20G CR2"), (32, "21G X2"), (33, "40G KR4"), (34, "40G CR4"),
    (35, "42G X4"), (36, "100G CR10"), (37, "107G X10"), (38, "120G X12"),
    (39, "127G X12"), (49, "5G KR1"), (50, "10.5G X4"), (53, "10m 10.3125"),
    (54, "100m 10.3125"), (55, "1000m 10.3125"), (56, "2.5g X1 10.3125"),
];

/// Hardware encoding of one supported speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedConfig {
    pub speed_id:   u16,
    /// Oversampling divider code.
    pub divider:    u16,
    /// PLL multiplier register code.
    pub multiplier: u16,
}

/// A speed change worked out but not yet applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedPlan {
    pub config: SpeedConfig,
    pub core:   CoreConfigWord,
    pub lane:   LaneConfigWord,
}

pub fn pll_multiplier(generation: Generation, code: u16) -> Option<u16> {
    let table = match generation {
        Generation::Tscf => &TSCF_PLL_MULTIPLIERS,
        Generation::Tsce => &TSCE_PLL_MULTIPLIERS,
    };
    table.get(code as usize).cloned()
}

/// Register code of a PLL multiplier; unknown multipliers map to code 0.
pub fn multiplier_code(generation: Generation, multiplier: u16) -> u16 {
    let table = match generation {
        Generation::Tscf => &TSCF_PLL_MULTIPLIERS,
        Generation::Tsce => &TSCE_PLL_MULTIPLIERS,
    };
    table.iter().position(|&m| m == multiplier).unwrap_or(0) as u16
}

fn tscf_plan(n_lanes: usize, interface: PhyInterface, speed: f64, higig: bool,
             lane: &mut LaneConfigWord) -> Option<(u16, u16, u16)> {
    lane.dfe_on = true;
    lane.cl72_restart_timeout_enable = true;
    lane.media_type = MediaType::from_interface(interface);

    let mut id = match interface {
        PhyInterface::Optics => TSCF_SPEED_OPTICS,
        PhyInterface::Kr     => TSCF_SPEED_KR,
        PhyInterface::Cr     => TSCF_SPEED_CR,
    };
    if higig {
        id |= TSCF_SPEED_HG2;
    }

    // Rates below 10G use 8b/10b encoding, the others 64b/66b.
    let (id, multiplier, divider) = match (speed as u64, n_lanes) {
        // 1e9 = (8/10) * ref * 132 / 16.5
        (1_000_000_000, 1) => {
            lane.dfe_on = false;
            (TSCF_SPEED_CL36_20G_VCO, 132, TSCF_OVER_SAMPLING_DIVIDER_16_5)
        }
        // 10e9 = (64/66) * ref * 132 / 2
        (10_000_000_000, 1) => {
            lane.dfe_on = lane.media_type != MediaType::Optics;
            (id | TSCF_SPEED_10G_X1, 132, TSCF_OVER_SAMPLING_DIVIDER_2)
        }
        (20_000_000_000, 1) => (id | TSCF_SPEED_20G_X1, 132, TSCF_OVER_SAMPLING_DIVIDER_1),
        (20_000_000_000, 2) => (id | TSCF_SPEED_20G_X2, 132, TSCF_OVER_SAMPLING_DIVIDER_2),
        (25_000_000_000, 1) => (id | TSCF_SPEED_25G_X1, 165, TSCF_OVER_SAMPLING_DIVIDER_1),
        (40_000_000_000, 2) => {
            lane.dfe_on = true;
            lane.dfe_low_power_mode = true;
            (id | TSCF_SPEED_40G_X2, 132, TSCF_OVER_SAMPLING_DIVIDER_1)
        }
        (40_000_000_000, 4) => {
            lane.dfe_on = lane.media_type != MediaType::Optics;
            lane.dfe_low_power_mode = lane.dfe_on;
            (id | TSCF_SPEED_40G_X4, 132, TSCF_OVER_SAMPLING_DIVIDER_2)
        }
        (50_000_000_000, 2) => (id | TSCF_SPEED_50G_X2, 165, TSCF_OVER_SAMPLING_DIVIDER_1),
        (50_000_000_000, 4) => (id | TSCF_SPEED_50G_X4, 165, TSCF_OVER_SAMPLING_DIVIDER_2),
        // 100e9 = 4 lanes * (64/66) * ref * 165
        (100_000_000_000, 4) => {
            lane.dfe_on = true;
            (id | TSCF_SPEED_100G_X4, 165, TSCF_OVER_SAMPLING_DIVIDER_1)
        }
        _ => return None
    };
    Some((id, multiplier, divider))
}

fn tsce_plan(n_lanes: usize, interface: PhyInterface, speed: f64,
             lane: &mut LaneConfigWord) -> Option<(u16, u16, u16)> {
    lane.cl72_restart_timeout_enable = true;
    lane.media_type = MediaType::from_interface(interface);

    match (speed as u64, n_lanes) {
        // 10e9 = (64/66) * ref * 66
        (10_000_000_000, 1) => {
            lane.dfe_on = true;
            lane.scrambling_disable = false;
            // 10G KR1 does not come up without it.
            lane.cl72_auto_polarity_enable = true;
            Some((TSCE_SPEED_10G_KR1, 66, TSCE_OVER_SAMPLING_DIVIDER_1))
        }
        // 1e9 = (8/10) * ref * 66 / 8.25
        (1_000_000_000, 1) => {
            lane.dfe_on = false;
            lane.scrambling_disable = true;
            Some((TSCE_SPEED_1G_KX1, 66, TSCE_OVER_SAMPLING_DIVIDER_8_25))
        }
        _ => None
    }
}

/// Works out the encoding of `speed` on the lanes of a port, starting from
/// the current core and lane configuration words. Touches no hardware.
pub fn speed_plan(generation: Generation, lanes: LaneMask, interface: PhyInterface,
                  speed: f64, higig: bool, core: &CoreConfigWord,
                  lane: &LaneConfigWord) -> Result<SpeedPlan> {
    let mut lane = *lane;
    let n_lanes = lanes.n_lanes();
    let plan = if speed.fract() != 0.0 || speed < 0.0 {
        None
    } else {
        match generation {
            Generation::Tscf => tscf_plan(n_lanes, interface, speed, higig, &mut lane),
            Generation::Tsce => tsce_plan(n_lanes, interface, speed, &mut lane),
        }
    };
    let (speed_id, multiplier, divider) = match plan {
        Some(p) => p,
        None => return Err(Error::UnsupportedSpeed { speed: speed, lanes: lanes.0 })
    };

    let mut core = *core;
    core.vco_rate_hz = multiplier as f64 * REF_CLOCK_HZ;

    Ok(SpeedPlan {
        config: SpeedConfig {
            speed_id: speed_id,
            divider: divider,
            multiplier: multiplier_code(generation, multiplier),
        },
        core: core,
        lane: lane,
    })
}

/// Whether `speed` is supported on the lanes of a port.
pub fn validate_speed(generation: Generation, lanes: LaneMask, interface: PhyInterface,
                      speed: f64, higig: bool) -> bool {
    let core = CoreConfigWord {
        vco_rate_hz: 0.0,
        from_pcs: false,
        disable_write_pll_charge_pump_current: false,
    };
    speed_plan(generation, lanes, interface, speed, higig, &core, &LaneConfigWord::default()).is_ok()
}

fn tscf_speed_name(x: u16) -> String {
    if x == 0 {
        return String::new()
    }
    let mut s = match x & (0xf << 3) {
        TSCF_SPEED_10G_X1       => "10G X1",
        TSCF_SPEED_20G_X1       => "20G X1",
        TSCF_SPEED_25G_X1       => "25G X1",
        TSCF_SPEED_20G_X2       => "20G X2",
        TSCF_SPEED_40G_X2       => "40G X2",
        TSCF_SPEED_40G_X4       => "40G X4",
        TSCF_SPEED_50G_X2       => "50G X2",
        TSCF_SPEED_50G_X4       => "50G X4",
        TSCF_SPEED_100G_X4      => "100G X4",
        TSCF_SPEED_CL73_20G_VCO => "1G CL73 20g",
        TSCF_SPEED_CL73_25G_VCO => "1G CL73",
        TSCF_SPEED_CL36_20G_VCO => "1G CL36 20g",
        TSCF_SPEED_CL36_25G_VCO => "1G CL36",
        _                       => "invalid",
    }.to_owned();
    s.push_str(match x & 3 {
        TSCF_SPEED_CR     => " CR",
        TSCF_SPEED_KR     => " KR",
        TSCF_SPEED_OPTICS => " OPTICS",
        _                 => " INVALID",
    });
    if x & TSCF_SPEED_HG2 != 0 {
        s.push_str(" HG2");
    }
    s
}

fn tsce_speed_name(x: u16) -> String {
    match TSCE_SPEED_NAMES.iter().find(|&&(id, _)| id == x) {
        Some(&(_, name)) => name.to_owned(),
        None => format!("{}", x)
    }
}

/// Name of a resolved speed id as read from `final_speed_config`.
pub fn speed_name(generation: Generation, speed_id: u16) -> String {
    match generation {
        Generation::Tscf => tscf_speed_name(speed_id),
        Generation::Tsce => tsce_speed_name(speed_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(generation: Generation, lanes: u16, interface: PhyInterface, speed: f64,
            higig: bool) -> Result<SpeedPlan> {
        let core = CoreConfigWord { vco_rate_hz: 0.0, from_pcs: false,
                                    disable_write_pll_charge_pump_current: false };
        speed_plan(generation, LaneMask(lanes), interface, speed, higig, &core,
                   &LaneConfigWord::default())
    }

    #[test]
    fn hundred_gig_backplane() {
        let p = plan(Generation::Tscf, 0xf, PhyInterface::Kr, 100e9, false).unwrap();
        assert_eq!(p.config, SpeedConfig { speed_id: 0x41, divider: 0, multiplier: 7 });
        assert_eq!(TSCF_PLL_MULTIPLIERS[p.config.multiplier as usize], 165);
        assert_eq!(p.core.vco_rate_hz, 165.0 * 156.25e6);
        assert!(p.lane.dfe_on);
        assert!(p.lane.cl72_restart_timeout_enable);

        assert_eq!(plan(Generation::Tscf, 0x3, PhyInterface::Kr, 100e9, false),
                   Err(Error::UnsupportedSpeed { speed: 100e9, lanes: 0x3 }));
    }

    #[test]
    fn validation_is_deterministic() {
        for &(lanes, speed) in [(0x1, 1e9), (0x1, 10e9), (0x3, 20e9), (0xf, 40e9), (0x3, 50e9),
                                (0x1, 40e9), (0xf, 25e9), (0x3, 1e9)].iter() {
            let a = validate_speed(Generation::Tscf, LaneMask(lanes), PhyInterface::Cr, speed, true);
            let b = validate_speed(Generation::Tscf, LaneMask(lanes), PhyInterface::Cr, speed, true);
            assert_eq!(a, b);
        }
        assert!(validate_speed(Generation::Tscf, LaneMask(0x3), PhyInterface::Cr, 20e9, false));
        assert!(!validate_speed(Generation::Tscf, LaneMask(0xf), PhyInterface::Cr, 25e9, false));
        assert!(!validate_speed(Generation::Tscf, LaneMask(0x1), PhyInterface::Cr, 10.5e9, false));
    }

    #[test]
    fn one_gig_ignores_media_bits() {
        let p = plan(Generation::Tscf, 0x1, PhyInterface::Optics, 1e9, true).unwrap();
        assert_eq!(p.config.speed_id, TSCF_SPEED_CL36_20G_VCO);
        assert_eq!(p.config.divider, TSCF_OVER_SAMPLING_DIVIDER_16_5);
        assert!(!p.lane.dfe_on);
    }

    #[test]
    fn forty_gig_dfe() {
        let p = plan(Generation::Tscf, 0xf, PhyInterface::Optics, 40e9, false).unwrap();
        assert!(!p.lane.dfe_on && !p.lane.dfe_low_power_mode);
        let p = plan(Generation::Tscf, 0xf, PhyInterface::Cr, 40e9, false).unwrap();
        assert!(p.lane.dfe_on && p.lane.dfe_low_power_mode);
        let p = plan(Generation::Tscf, 0x3, PhyInterface::Optics, 40e9, false).unwrap();
        assert!(p.lane.dfe_on && p.lane.dfe_low_power_mode);
    }

    #[test]
    fn tsce_speeds() {
        let p = plan(Generation::Tsce, 0x1, PhyInterface::Kr, 10e9, false).unwrap();
        assert_eq!(p.config, SpeedConfig { speed_id: TSCE_SPEED_10G_KR1, divider: 0, multiplier: 10 });
        assert!(p.lane.cl72_auto_polarity_enable);
        assert_eq!(p.core.vco_rate_hz, 10.3125e9);

        let p = plan(Generation::Tsce, 0x4, PhyInterface::Cr, 1e9, false).unwrap();
        assert_eq!(p.config.speed_id, TSCE_SPEED_1G_KX1);
        assert_eq!(TSCE_OVER_SAMPLING_DIVIDERS[p.config.divider as usize], 8.25);
        assert!(p.lane.scrambling_disable);

        assert!(!validate_speed(Generation::Tsce, LaneMask(0xf), PhyInterface::Kr, 40e9, false));
    }

    #[test]
    fn speed_names() {
        assert_eq!(speed_name(Generation::Tscf, 0x41), "100G X4 KR");
        assert_eq!(speed_name(Generation::Tscf, TSCF_SPEED_50G_X2 | TSCF_SPEED_OPTICS | TSCF_SPEED_HG2),
                   "50G X2 OPTICS HG2");
        assert_eq!(speed_name(Generation::Tscf, 0), "");
        assert_eq!(speed_name(Generation::Tsce, 28), "10G KR1");
        assert_eq!(speed_name(Generation::Tsce, 45), "45");
    }
}
