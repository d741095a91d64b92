use std::fmt;
use std::str::FromStr;

use config::Config;
use dma::Target;
use lane::{LaneMask, PortMode, N_LANE};
use lane_map::LaneMap;
use speed::REF_CLOCK_HZ;
use tsc::Generation;
use Error;
use Result;

/// Static description of one port block.
#[derive(Debug, Clone, PartialEq)]
pub struct PortBlockSettings {
    pub phy_id:           u8,
    pub sbus_block:       u8,
    pub generation:       Generation,
    pub port_mode:        PortMode,
    /// Lanes bonded out on this core.
    pub lanes:            LaneMask,
    pub lane_map:         LaneMap,
    pub ref_clock_hz:     f64,
    pub verify_ucode_crc: bool,
    pub firmware_dir:     Option<String>,
}

impl PortBlockSettings {
    pub fn new(generation: Generation, phy_id: u8, sbus_block: u8) -> PortBlockSettings {
        PortBlockSettings {
            phy_id: phy_id,
            sbus_block: sbus_block,
            generation: generation,
            port_mode: PortMode::Mode1x4,
            lanes: LaneMask::ALL,
            lane_map: LaneMap::default(),
            ref_clock_hz: REF_CLOCK_HZ,
            verify_ucode_crc: generation.verify_crc_by_default(),
            firmware_dir: None,
        }
    }

    pub fn target(&self) -> Target {
        Target { block: self.sbus_block, phy_id: self.phy_id }
    }

    pub fn from_config(config: &Config) -> Result<PortBlockSettings> {
        let generation = match read_opt(config, "generation")? {
            Some(s) => Generation::parse(&s).ok_or_else(|| invalid("generation", &s))?,
            None => return Err(Error::InvalidConfig("generation is not set".to_owned()))
        };
        let phy_id = parse_key(config, "phy_id")?.unwrap_or(0);
        let sbus_block = parse_key(config, "sbus_block")?.unwrap_or(0);
        let mut settings = PortBlockSettings::new(generation, phy_id, sbus_block);

        if let Some(s) = read_opt(config, "port_mode")? {
            settings.port_mode = PortMode::parse(&s).ok_or_else(|| invalid("port_mode", &s))?;
        }
        if let Some(s) = read_opt(config, "lanes")? {
            settings.lanes = parse_lane_mask("lanes", &s)?;
        }
        if let Some(s) = read_opt(config, "rx_lane_map")? {
            settings.lane_map.rx_logical_by_phys = parse_lane_list("rx_lane_map", &s)?;
        }
        if let Some(s) = read_opt(config, "tx_lane_map")? {
            settings.lane_map.tx_logical_by_phys = parse_lane_list("tx_lane_map", &s)?;
        }
        if let Some(s) = read_opt(config, "rx_invert")? {
            settings.lane_map.rx_invert = parse_lane_mask("rx_invert", &s)?;
        }
        if let Some(s) = read_opt(config, "tx_invert")? {
            settings.lane_map.tx_invert = parse_lane_mask("tx_invert", &s)?;
        }
        if let Some(hz) = parse_key(config, "ref_clock_hz")? {
            settings.ref_clock_hz = hz;
        }
        if let Some(s) = read_opt(config, "verify_ucode_crc")? {
            settings.verify_ucode_crc = match s.as_str() {
                "1" => true,
                "0" => false,
                _ => return Err(invalid("verify_ucode_crc", &s))
            };
        }
        settings.firmware_dir = read_opt(config, "firmware_dir")?;

        settings.check()?;
        Ok(settings)
    }

    pub fn check(&self) -> Result<()> {
        if self.ref_clock_hz != REF_CLOCK_HZ {
            return Err(Error::InvalidConfig(format!("unsupported reference clock {} Hz",
                                                    self.ref_clock_hz)))
        }
        if self.lanes.is_empty() || self.lanes.0 & !LaneMask::ALL.0 != 0 {
            return Err(invalid("lanes", &format!("0x{:x}", self.lanes)))
        }
        self.lane_map.check()
    }
}

impl fmt::Display for PortBlockSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} phy {} block {} mode {} lanes 0x{:x} rx map {:?} tx map {:?}",
               self.generation, self.phy_id, self.sbus_block, self.port_mode, self.lanes,
               self.lane_map.rx_logical_by_phys, self.lane_map.tx_logical_by_phys)?;
        if !self.lane_map.rx_invert.is_empty() || !self.lane_map.tx_invert.is_empty() {
            write!(f, " invert rx 0x{:x} tx 0x{:x}",
                   self.lane_map.rx_invert, self.lane_map.tx_invert)?;
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> Error {
    Error::InvalidConfig(format!("{}: bad value {:?}", key, value))
}

fn read_opt(config: &Config, key: &str) -> Result<Option<String>> {
    let value = config.read_str(key, |r| r.map(|s| s.trim().to_owned()))?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

fn parse_key<T: FromStr>(config: &Config, key: &str) -> Result<Option<T>> {
    match read_opt(config, key)? {
        Some(s) => s.parse().map(Some).map_err(|_| invalid(key, &s)),
        None => Ok(None)
    }
}

fn parse_lane_mask(key: &str, s: &str) -> Result<LaneMask> {
    let v = if s.starts_with("0x") {
        u16::from_str_radix(&s[2..], 16)
    } else {
        s.parse()
    };
    match v {
        Ok(v) if v & !LaneMask::ALL.0 == 0 => Ok(LaneMask(v)),
        _ => Err(invalid(key, s))
    }
}

fn parse_lane_list(key: &str, s: &str) -> Result<[u8; N_LANE]> {
    let mut map = [0; N_LANE];
    let mut n = 0;
    for item in s.split(',') {
        if n == N_LANE {
            return Err(invalid(key, s))
        }
        map[n] = item.trim().parse().map_err(|_| invalid(key, s))?;
        n += 1;
    }
    if n != N_LANE {
        return Err(invalid(key, s))
    }
    Ok(map)
}
