//! Port block driver: bring-up of one SerDes core and the per port
//! operations on top of it.

use clock::Clock;
use config::Config;
use config_word::{CoreConfigWord, LaneConfigWord, MediaType};
use event_log::{self, Event};
use eyescan::{self, EyeScan};
use firmware::{self, Blob};
use hw::Hw;
use lane::{LaneMask, Loopback, Porter, N_LANE};
use lane_map;
use reg::Reg;
use sbus::Bus;
use settings::PortBlockSettings;
use speed::{self, REF_CLOCK_HZ};
use status::{self, DebugSnapshot, PortStatus};
use tsc::Generation;
use tsce_reg;
use tscf_reg;
use uc;
use uc_mem;
use Error;
use Result;

const CODE_RAM_INIT_TIMEOUT_US: u64 = 100_000;
const SPEED_CHANGE_TIMEOUT_US: u64 = 100_000;
const TSCE_CODE_RAM_INIT_SETTLE_US: u64 = 500;

const TSCF_VCO_MULTIPLIER: u16 = 175;
const TSCE_VCO_RATE_HZ: f64 = 10.3125e9;

const SPEED_CHANGE_ENABLE: u16 = 1 << 8;
const SPEED_CHANGE_DONE: u16 = 1 << 1;
const LANE_DATA_PATH_RELEASE: u16 = 1 << 1;
const CORE_DATA_PATH_RELEASE: u16 = tscf_reg::TOP_USER_CORE_DP_RESET_RELEASE;
const UC_ACTIVE: u16 = tscf_reg::TOP_USER_UC_ACTIVE;
const TX_DISABLE_FROM_PIN: u16 = 1 << 1;
const CL72_RESTART_TRAINING: u16 = tscf_reg::CL93N72_RESTART_TRAINING;
const CL72_ENABLE_TRAINING: u16 = tscf_reg::CL93N72_TRAINING_ENABLE;

/// Timeouts during bring-up leave the core unusable.
fn fatal<T>(r: Result<T>, what: &'static str) -> Result<T> {
    r.map_err(|e| if e.is_timeout() { Error::BringUp(what) } else { e })
}

fn first_lane(lanes: LaneMask) -> Result<(usize, LaneMask)> {
    match lanes.first_lane() {
        Some(lane) if lanes.0 & !LaneMask::ALL.0 == 0 => Ok((lane, LaneMask::lane(lane))),
        _ => Err(Error::InvalidLaneMask(lanes.0))
    }
}

pub struct Phy<B, C> {
    pub hw:      Hw<B, C>,
    settings:    PortBlockSettings,
    firmware:    Option<Blob>,
    core_config: CoreConfigWord,
    lane_config: [LaneConfigWord; N_LANE],
}

impl<B: Bus, C: Clock> Phy<B, C> {
    pub fn new(bus: B, clock: C, settings: PortBlockSettings) -> Result<Phy<B, C>> {
        settings.check()?;
        Ok(Phy {
            hw: Hw::new(bus, clock, settings.target()),
            settings: settings,
            firmware: None,
            core_config: CoreConfigWord {
                vco_rate_hz: 0.0,
                from_pcs: false,
                disable_write_pll_charge_pump_current: false,
            },
            lane_config: [LaneConfigWord::default(); N_LANE],
        })
    }

    pub fn from_config(bus: B, clock: C, config: &Config) -> Result<Phy<B, C>> {
        Phy::new(bus, clock, PortBlockSettings::from_config(config)?)
    }

    pub fn settings(&self) -> &PortBlockSettings {
        &self.settings
    }

    pub fn generation(&self) -> Generation {
        self.settings.generation
    }

    pub fn core_config(&self) -> &CoreConfigWord {
        &self.core_config
    }

    pub fn lane_config(&self, lane: usize) -> Option<&LaneConfigWord> {
        self.lane_config.get(lane)
    }

    /// Uses `blob` for the next bring-up instead of searching for a file.
    pub fn set_firmware(&mut self, blob: Blob) {
        self.firmware = Some(blob)
    }

    pub fn load_firmware(&mut self) -> Result<()> {
        let dirs = firmware::search_dirs(self.settings.firmware_dir.as_ref().map(|s| s.as_str()));
        let blob = firmware::load(self.generation().firmware_name(), &dirs)?;
        self.firmware = Some(blob);
        Ok(())
    }

    fn write_core_config(&mut self, lanes: LaneMask) -> Result<()> {
        let generation = self.generation();
        let codec = generation.codec();
        self.core_config.vco_rate_hz = codec.snap_vco(self.core_config.vco_rate_hz);
        let v = codec.encode_core(&self.core_config);
        let (_, lm) = first_lane(lanes)?;
        debug!("core config word 0x{:04x}", v);
        uc_mem::write(&mut self.hw, generation, lm, generation.uc_mem().config_word, v)
    }

    fn write_lane_config(&mut self, lane: usize) -> Result<()> {
        let generation = self.generation();
        let v = generation.codec().encode_lane(&self.lane_config[lane]);
        uc_mem::write_lane(&mut self.hw, generation, lane, generation.uc_mem().lane.config_word, v)
    }

    fn modify_each(&mut self, reg: Reg, lanes: LaneMask, value: u16,
                   mask: u16) -> Result<()> {
        for lm in lanes.masks() {
            self.hw.req.modify(reg, lm, value, mask);
        }
        self.hw.flush()
    }

    fn set_each(&mut self, reg: Reg, lanes: LaneMask, value: u32) -> Result<()> {
        for lm in lanes.masks() {
            self.hw.req.set(reg, lm, value);
        }
        self.hw.flush()
    }

    fn core_data_path(&mut self, lm: LaneMask, release: bool) -> Result<()> {
        let top = self.generation().regs().top_user_control;
        self.hw.modify_do(top, lm, if release { CORE_DATA_PATH_RELEASE } else { 0 },
                          CORE_DATA_PATH_RELEASE)
    }

    fn lane_data_path(&mut self, lanes: LaneMask, release: bool) -> Result<()> {
        let reg = self.generation().regs().lane_reset_and_powerdown;
        self.modify_each(reg, lanes, if release { LANE_DATA_PATH_RELEASE } else { 0 },
                         LANE_DATA_PATH_RELEASE)
    }

    /// Brings the core up from reset: microcode download, PLL, lane map,
    /// autonegotiation timers and the default transmit equalization.
    pub fn init(&mut self) -> Result<()> {
        info!("initializing {}", self.settings);
        if self.firmware.is_none() {
            self.load_firmware()?;
        }
        self.hw.req.clear_err();
        let result = match self.generation() {
            Generation::Tscf => self.init_tscf(),
            Generation::Tsce => self.init_tsce(),
        };
        match result {
            Ok(()) => info!("{} phy {} up", self.generation(), self.settings.phy_id),
            Err(ref e) => error!("{} phy {} bring-up failed: {}",
                                 self.generation(), self.settings.phy_id, e),
        }
        result
    }

    fn finish_download(&mut self, core: LaneMask) -> Result<()> {
        let regs = self.generation().regs();
        fatal(uc::wait_ready(&mut self.hw, &regs.uc, core), "ucode not ready")?;
        if self.settings.verify_ucode_crc {
            if let Some(ref blob) = self.firmware {
                firmware::verify_crc(&mut self.hw, &regs.uc, core, blob)?;
            }
        }
        // Re-enable the lane reset pin.
        self.hw.modify_do(regs.pin_disable, core, 0, 1 << 0)
    }

    fn download(&mut self) -> Result<()> {
        match self.firmware {
            Some(ref blob) => firmware::download(&mut self.hw, blob),
            None => Err(Error::BringUp("no microcode"))
        }
    }

    fn init_tscf(&mut self) -> Result<()> {
        use tscf_reg as f;

        let regs = Generation::Tscf.regs();
        let core = LaneMask::lane(0);
        let lanes = self.settings.lanes;

        // Core and data path out of reset.
        self.hw.set_do(regs.pmd_x1_reset, core, 1 << 0 | 1 << 1)?;

        self.hw.modify_do(f::UC_CLOCK_CONTROL, core, 1 << 0, 1 << 0)?;
        self.hw.modify_do(f::UC_RESET_CONTROL, core, 1 << 0, 1 << 0)?;

        self.hw.modify_do(f::UC_AHB_CONTROL, core, f::AHB_CONTROL_INIT_CODE_RAM,
                          f::AHB_CONTROL_INIT_CODE_RAM)?;
        fatal(self.hw.poll(f::UC_AHB_STATUS, core, uc::POLL_INTERVAL_US,
                           CODE_RAM_INIT_TIMEOUT_US, "code ram init", |v| v & 1 != 0),
              "code ram init")?;

        self.hw.set_do(f::UC_PROGRAM_RAM_WRITE_ADDRESS, core, 0)?;
        self.hw.modify_do(f::UC_RESET_CONTROL, core, 1 << 3, 1 << 3)?;
        self.hw.modify_do(f::UC_PROGRAM_RAM_INTERFACE_ENABLE, core, 1 << 0, 1 << 0)?;
        self.download()?;
        self.hw.modify_do(f::UC_PROGRAM_RAM_INTERFACE_ENABLE, core, 0, 1 << 0)?;

        self.hw.modify_do(regs.pin_disable, core, 1 << 0, 1 << 0)?;
        self.hw.modify_do(regs.top_user_control, core, UC_ACTIVE, UC_ACTIVE)?;
        self.hw.modify_do(f::UC_CLOCK_CONTROL, core, 1 << 1, 1 << 1)?;
        self.hw.modify_do(f::UC_RESET_CONTROL, core, 1 << 1, 1 << 1)?;
        self.finish_download(core)?;

        // PLL charge pump current.
        self.hw.modify_do(f::AMS_PLL_CONTROL2, core, 0x5 << 1, 0xf << 1)?;

        self.core_config.vco_rate_hz = TSCF_VCO_MULTIPLIER as f64 * REF_CLOCK_HZ;
        let code = speed::multiplier_code(Generation::Tscf, TSCF_VCO_MULTIPLIER);
        self.hw.modify_do(regs.pll_multiplier, core, code, 0xf)?;

        lane_map::apply(&mut self.hw, Generation::Tscf, &self.settings.lane_map, lanes)?;

        self.hw.req.set(f::CL73_IGNORE_LINK_TIMER, core, 0x29a);
        self.hw.req.set(f::CL73_BREAK_LINK_TIMER, core, 0x10ed);
        self.hw.req.set(f::CL73_PD_DME_LOCK_TIMER, core, 0x14d4);
        self.hw.req.set(f::CL73_PD_SIGNAL_DETECT_TIMER, core, 0xa6a);
        self.hw.req.set(f::CL73_QUALIFY_LINK_NO_CL72, core, 0x3080);
        self.hw.req.set(f::CL73_QUALIFY_LINK_YES_CL72, core, 0x8382);
        lane_map::set_master_port(&mut self.hw, Generation::Tscf, 0)?;
        self.hw.flush()?;

        self.core_data_path(core, false)?;
        self.write_core_config(core)?;
        // FEC error counting from zero.
        self.set_each(f::RX_X4_FEC_CONTROL[1], lanes, 0)?;
        self.core_data_path(core, true)?;

        self.modify_each(regs.lane_reset_control, lanes, 1 << 0 | 1 << 1, 1 << 0 | 1 << 1)?;
        self.lane_data_path(lanes, true)?;
        lane_map::apply_polarity(&mut self.hw, Generation::Tscf, &self.settings.lane_map, lanes)?;

        // Transmit FIR: main, pre/post1, post2, post3 taps and amplitude.
        for lm in lanes.masks() {
            self.hw.req.modify(f::CL93N72_TX_CONTROL[3], lm, 0x64, 0x7f);
            self.hw.req.modify(f::CL93N72_TX_CONTROL[2], lm, 0xc, 0x1f);
            self.hw.req.modify(regs.tx_equalizer_control[1], lm, 0, 0x1f);
            self.hw.req.modify(regs.tx_equalizer_control[2], lm, 0, 0xf);
            self.hw.req.modify(regs.ams_tx_control[2], lm, 0x8, 0xf);
        }
        self.hw.flush()?;

        self.finish_init(lanes)?;
        self.modify_each(regs.rx_pma_control, lanes, 1 << 0, 1 << 0)?;
        self.modify_each(regs.tx_x4_control, lanes, 1 << 0 | 1 << 1, 1 << 0 | 1 << 1)
    }

    fn init_tsce(&mut self) -> Result<()> {
        use tsce_reg as e;

        let regs = Generation::Tsce.regs();
        let core = LaneMask::lane(0);
        let lanes = self.settings.lanes;

        self.hw.set_do(regs.pmd_x1_reset, core, 1 << 0 | 1 << 1)?;
        self.hw.modify_do(regs.setup, core, e::REFCLK_SELECT_156P25MHZ << e::SETUP_REFCLK_SELECT_SHIFT,
                          e::SETUP_REFCLK_SELECT_MASK)?;

        // Microcontroller held in reset while the code RAM is cleared.
        self.hw.modify_do(e::UC_COMMAND3, core, 0, 1 << 1)?;
        self.hw.modify_do(e::UC_COMMAND4, core, 3, 3)?;
        self.hw.modify_do(e::UC_COMMAND4, core, 0, e::COMMAND4_MICRO_RESET)?;
        self.hw.modify_do(e::UC_COMMAND4, core, e::COMMAND4_MICRO_RESET, e::COMMAND4_MICRO_RESET)?;

        self.hw.req.modify(e::UC_COMMAND1, core, 0 << e::COMMAND1_RAM_SELECT_SHIFT,
                           e::COMMAND1_RAM_SELECT_MASK);
        self.hw.req.set(e::UC_ADDRESS, core, 0);
        self.hw.req.modify(e::UC_COMMAND1, core, 0, e::COMMAND1_INIT_CODE_RAM);
        self.hw.req.modify(e::UC_COMMAND1, core, e::COMMAND1_INIT_CODE_RAM,
                           e::COMMAND1_INIT_CODE_RAM);
        self.hw.flush()?;
        self.hw.clock.spin_us(TSCE_CODE_RAM_INIT_SETTLE_US);
        self.hw.modify_do(e::UC_COMMAND1, core, 0, e::COMMAND1_INIT_CODE_RAM)?;
        fatal(self.hw.poll(e::UC_MDIO_8051_FSM_STATUS, core, uc::POLL_INTERVAL_US,
                           CODE_RAM_INIT_TIMEOUT_US, "code ram init",
                           |v| v & e::FSM_STATUS_INIT_DONE != 0),
              "code ram init")?;

        self.hw.modify_do(regs.pmd_x1_reset, core, e::PMD_X1_RESET_UC_RAM_ACCESS,
                          e::PMD_X1_RESET_UC_RAM_ACCESS)?;
        self.hw.modify_do(e::UC_COMMAND3, core, 0b101, 0b111)?;
        self.download()?;
        self.hw.modify_do(e::UC_COMMAND3, core, 0b010, 0b111)?;
        self.hw.modify_do(regs.pmd_x1_reset, core, 0, e::PMD_X1_RESET_UC_RAM_ACCESS)?;

        self.hw.modify_do(regs.pin_disable, core, 1 << 0, 1 << 0)?;
        self.hw.modify_do(regs.top_user_control, core, UC_ACTIVE, UC_ACTIVE)?;
        self.hw.modify_do(e::UC_COMMAND1, core, e::COMMAND1_UC_RUN, e::COMMAND1_UC_RUN)?;
        self.finish_download(core)?;

        lane_map::apply(&mut self.hw, Generation::Tsce, &self.settings.lane_map, lanes)?;

        self.hw.req.set(e::CL37_RESTART_TIMER, core, 0x29a);
        self.hw.req.set(e::CL37_COMPLETE_ACK_TIMER, core, 0x29a);
        self.hw.req.set(e::CL73_BREAK_LINK_TIMER, core, 0x10ed);
        self.hw.req.set(e::CL73_TIMEOUT_ERROR_TIMER, core, 0x100);
        self.hw.req.set(e::CL73_PD_DME_LOCK_TIMER, core, 0x14d4);
        self.hw.req.set(e::CL73_LINK_UP_TIMER, core, 0x29a);
        self.hw.req.set(e::CL73_QUALIFY_LINK_STATUS_TIMER[0], core, 0x8382);
        self.hw.req.set(e::CL73_QUALIFY_LINK_STATUS_TIMER[1], core, 0x8382);
        self.hw.req.set(e::CL73_PD_SIGNAL_DETECT_TIMER, core, 0xa6a);
        self.hw.req.set(e::CL73_IGNORE_CL37_SYNC_TIMER, core, 0x29a);
        self.hw.req.set(e::CL73_PERIOD_WAIT_LINK_CL37, core, 0xa6a);
        self.hw.req.set(e::CL73_IGNORE_LINK_TIMER, core, 0x29a);
        self.hw.req.set(e::CL73_DME_PAGE_TIMERS, core, 0x3b5f);
        self.hw.req.set(e::CL73_SGMII_TIMER, core, 0x6b);
        self.hw.flush()?;

        self.set_each(e::TX_X2_MLD_SWAP_COUNT, lanes, 0xfffc)?;
        lane_map::set_master_port(&mut self.hw, Generation::Tsce, 0)?;
        self.hw.flush()?;
        self.modify_each(e::TX_X2_CL48_CONTROL, lanes, 0x70, 0x70)?;

        self.core_config.vco_rate_hz = TSCE_VCO_RATE_HZ;
        self.core_data_path(core, false)?;
        self.write_core_config(core)?;
        self.core_data_path(core, true)?;

        self.modify_each(regs.lane_reset_control, lanes, 1 << 0 | 1 << 1, 1 << 0 | 1 << 1)?;
        self.lane_data_path(lanes, true)?;
        lane_map::apply_polarity(&mut self.hw, Generation::Tsce, &self.settings.lane_map, lanes)?;

        for lm in lanes.masks() {
            self.hw.req.modify(regs.tx_equalizer_control[0], lm, 0xc, 0x1f);
            self.hw.req.modify(regs.tx_equalizer_control[1], lm, 0x64, 0x7f);
            self.hw.req.modify(regs.tx_equalizer_control[0], lm, 0, 0x7e0);
            self.hw.req.modify(regs.tx_equalizer_control[1], lm, 0, 0xf80);
            self.hw.req.modify(e::TX_EQUALIZER_CONTROL4, lm, 0, 0xf);
            self.hw.req.modify(regs.ams_tx_control[2], lm, 0xc, 0xf);
        }
        self.hw.flush()?;

        self.finish_init(lanes)?;
        self.modify_each(regs.rx_pma_control, lanes, 0, 1 << 0)?;
        self.modify_each(regs.rx_pma_control, lanes, 1 << 0, 1 << 0)?;
        self.modify_each(regs.tx_x4_control, lanes, 0, 1 << 0 | 1 << 1)?;
        self.modify_each(regs.tx_x4_control, lanes, 1 << 0 | 1 << 1, 1 << 0 | 1 << 1)
    }

    /// Clears the lane configuration words and applies the configured port
    /// mode.
    fn finish_init(&mut self, lanes: LaneMask) -> Result<()> {
        let generation = self.generation();
        for lane in lanes.iter() {
            self.lane_config[lane] = LaneConfigWord::default();
            self.write_lane_config(lane)?;
        }
        lane_map::set_port_mode(&mut self.hw, generation, self.settings.port_mode)
    }

    /// Whether `speed` can be set on the lanes of `port`. Touches no
    /// hardware.
    pub fn validate_speed<P: Porter + ?Sized>(&self, port: &P, speed: f64, higig: bool) -> bool {
        speed::validate_speed(self.generation(), port.lane_mask(), port.phy_interface(),
                              speed, higig)
    }

    pub fn set_speed<P: Porter + ?Sized>(&mut self, port: &P, speed: f64,
                                         higig: bool) -> Result<()> {
        let generation = self.generation();
        let regs = generation.regs();
        let lanes = port.lane_mask();
        let (first, flm) = first_lane(lanes)?;

        let plan = speed::speed_plan(generation, lanes, port.phy_interface(), speed, higig,
                                     &self.core_config, &self.lane_config[first])?;
        info!("{}: speed {} ({})", port.name(), speed::speed_name(generation, plan.config.speed_id),
              speed);

        self.lane_data_path(lanes, false)?;
        self.modify_each(regs.tx_equalizer_misc_control, lanes, TX_DISABLE_FROM_PIN,
                         TX_DISABLE_FROM_PIN)?;
        lane_map::set_port_mode(&mut self.hw, generation, port.port_mode())?;

        // Forced oversampling divider.
        self.set_each(regs.over_sampling_mode_control, lanes,
                      (1 << 15 | plan.config.divider) as u32)?;

        let current = self.hw.get_do(regs.pll_multiplier, flm)? & 0xf;
        if current != plan.config.multiplier {
            debug!("pll multiplier code {} -> {}", current, plan.config.multiplier);
            self.core_data_path(flm, false)?;
            if generation == Generation::Tsce {
                self.hw.modify_do(tsce_reg::UC_COMMAND4, flm, tsce_reg::COMMAND4_MICRO_RESET,
                                  tsce_reg::COMMAND4_MICRO_RESET)?;
            }
            self.modify_each(regs.pll_multiplier, lanes, plan.config.multiplier, 0xf)?;
            // PLL reset by the speed control logic.
            match generation {
                Generation::Tscf => {
                    self.hw.modify_do(regs.rx_lane_swap, flm, tscf_reg::RX_LANE_SWAP_PLL_RESET_ENABLE,
                                      tscf_reg::RX_LANE_SWAP_PLL_RESET_ENABLE)?;
                }
                Generation::Tsce => {
                    self.hw.req.modify(regs.setup, flm, tsce_reg::SETUP_PLL_RESET_ENABLE,
                                       tsce_reg::SETUP_PLL_RESET_ENABLE);
                    lane_map::set_master_port(&mut self.hw, generation, first)?;
                    self.hw.flush()?;
                }
            }
            self.core_config = plan.core;
            self.write_core_config(flm)?;
            self.core_data_path(flm, true)?;
        }

        let id = plan.config.speed_id as u32;
        self.hw.set_do(regs.speed_change_control, flm, id)?;
        self.hw.set_do(regs.speed_change_control, flm, id | SPEED_CHANGE_ENABLE as u32)?;
        self.hw.poll(regs.speed_change_status, flm, uc::POLL_INTERVAL_US, SPEED_CHANGE_TIMEOUT_US,
                     "port speed set", |v| v & SPEED_CHANGE_DONE != 0)?;

        for lane in lanes.iter() {
            self.lane_config[lane] = plan.lane;
            self.write_lane_config(lane)?;
        }
        self.lane_data_path(lanes, true)
    }

    /// Enables or disables clause 73 autonegotiation, with clause 72 link
    /// training following it.
    pub fn set_autoneg<P: Porter + ?Sized>(&mut self, port: &P, enable: bool) -> Result<()> {
        let generation = self.generation();
        let regs = generation.regs();
        let lanes = port.lane_mask();
        let (first, flm) = first_lane(lanes)?;
        let log2_lanes = lanes.log2_lanes()?;
        info!("{}: autoneg {}", port.name(), if enable { "on" } else { "off" });

        let mut la = self.lane_config[first];
        la.from_pcs = enable;
        la.autoneg_enable = enable;
        if generation == Generation::Tscf {
            la.cl72_restart_timeout_enable = !enable;
            if enable {
                // Module media type is not known here.
                la.media_type = MediaType::CopperCable;
            }
        }
        self.core_config.from_pcs = enable;

        if generation == Generation::Tsce {
            self.modify_each(regs.over_sampling_mode_control, lanes, 0, 1 << 15)?;
        }
        self.modify_each(regs.speed_change_control, lanes, 0, SPEED_CHANGE_ENABLE)?;
        // Single port mode resets the PLL once autonegotiation is done.
        let single_port_mode = match generation {
            Generation::Tscf => tscf_reg::SETUP_SINGLE_PORT_MODE,
            Generation::Tsce => tsce_reg::SETUP_SINGLE_PORT_MODE,
        };
        self.hw.modify_do(regs.setup, flm, if enable { single_port_mode } else { 0 },
                          single_port_mode)?;

        self.core_data_path(flm, false)?;
        self.write_core_config(flm)?;
        self.core_data_path(flm, true)?;

        self.lane_data_path(lanes, false)?;
        for lane in lanes.iter() {
            self.lane_config[lane] = la;
            self.write_lane_config(lane)?;
        }
        self.lane_data_path(lanes, true)?;

        if generation == Generation::Tsce {
            self.hw.modify_do(regs.speed_change_control, flm, 0, SPEED_CHANGE_ENABLE)?;
            self.hw.modify_do(regs.speed_change_control, flm, SPEED_CHANGE_ENABLE,
                              SPEED_CHANGE_ENABLE)?;
        }
        lane_map::set_master_port(&mut self.hw, generation, first)?;
        self.hw.flush()?;

        self.set_local_advert(lanes, flm)?;
        self.set_cl72(lanes, flm, enable)?;
        self.set_an_enable(flm, log2_lanes, enable)
    }

    fn set_local_advert(&mut self, lanes: LaneMask, flm: LaneMask) -> Result<()> {
        let generation = self.generation();
        let regs = generation.regs();
        let single = lanes.n_lanes() == 1;

        let abilities = match generation {
            Generation::Tscf => {
                const FEC: u16      = 1 << 8;
                const PAUSE: u16    = 1 << 6;
                const KX1_1G: u16   = 1 << 5;
                const CR4_100G: u16 = 1 << 4;
                const KR4_100G: u16 = 1 << 3;
                const CR4_40G: u16  = 1 << 2;
                const KR4_40G: u16  = 1 << 1;
                const KR1_10G: u16  = 1 << 0;
                if single {
                    FEC | PAUSE | KR1_10G | KX1_1G
                } else {
                    FEC | PAUSE | CR4_100G | CR4_40G | KR4_100G | KR4_40G
                }
            }
            Generation::Tsce => {
                const FEC: u16       = 3 << 8;
                const PAUSE: u16     = 3 << 6;
                const KX1_1G: u16    = 1 << 5;
                const KR_10G: u16    = 1 << 3;
                const KR4_40G: u16   = 1 << 2;
                const CR4_40G: u16   = 1 << 1;
                const CR10_100G: u16 = 1 << 0;
                if single {
                    FEC | PAUSE | KX1_1G | KR_10G
                } else {
                    FEC | PAUSE | KR4_40G | CR4_40G | CR10_100G
                }
            }
        };
        self.hw.set_do(regs.an_base_abilities[1], flm, abilities as u32)?;

        const BASE_PAGE_SELECT: u16 = 1 << 0;
        const TX_NONCE: u16 = 0x15 << 5;
        self.hw.set_do(regs.an_base_abilities[0], flm, (BASE_PAGE_SELECT | TX_NONCE) as u32)?;

        if generation == Generation::Tsce {
            const RETRY_COUNT: u16 = 0xf << 6;
            self.hw.modify_do(regs.an_misc_control, flm, RETRY_COUNT, RETRY_COUNT)?;
        }
        Ok(())
    }

    fn set_cl72(&mut self, lanes: LaneMask, flm: LaneMask, enable: bool) -> Result<()> {
        let generation = self.generation();
        let regs = generation.regs();

        // The 40G core trains through the first lane only.
        let lanes = match generation {
            Generation::Tscf => lanes,
            Generation::Tsce => flm,
        };
        let value = match (generation, enable) {
            (_, false) => 0,
            (Generation::Tscf, true) => CL72_ENABLE_TRAINING,
            (Generation::Tsce, true) => CL72_ENABLE_TRAINING | CL72_RESTART_TRAINING,
        };
        let mask = match (generation, enable) {
            (Generation::Tsce, true) => CL72_ENABLE_TRAINING | CL72_RESTART_TRAINING,
            _ => CL72_ENABLE_TRAINING,
        };
        self.modify_each(regs.cl93n72_control, lanes, value, mask)?;

        if self.hw.get_do(regs.speed_change_control, flm)? & SPEED_CHANGE_ENABLE != 0 {
            self.modify_each(regs.speed_change_control, lanes, 0, SPEED_CHANGE_ENABLE)?;
            self.modify_each(regs.speed_change_control, lanes, SPEED_CHANGE_ENABLE,
                             SPEED_CHANGE_ENABLE)?;
        }
        Ok(())
    }

    fn set_an_enable(&mut self, flm: LaneMask, log2_lanes: u16, enable: bool) -> Result<()> {
        let generation = self.generation();
        let regs = generation.regs();
        const AN_RESTART: u16 = 1 << 0;
        const CL73_ENABLE: u16 = 1 << 8;

        self.hw.modify_do(regs.speed_change_control, flm,
                          if enable { 0 } else { SPEED_CHANGE_ENABLE }, SPEED_CHANGE_ENABLE)?;
        let multiplier = self.hw.get_do(regs.pll_multiplier, flm)? & 0xf;

        match generation {
            Generation::Tscf => {
                const ENABLE_1GKX: u16 = 1 << 1;
                let hvco = multiplier == speed::multiplier_code(Generation::Tscf, 165);
                self.hw.modify_do(regs.setup, flm,
                                  if hvco { tscf_reg::SETUP_CL73_VCO } else { 0 },
                                  tscf_reg::SETUP_CL73_VCO)?;
                // Stabilizes four lane autonegotiation.
                self.hw.set_do(tscf_reg::CL73_AUTONEG_ERROR_TIMER, flm, 0x1000)?;
                self.hw.set_do(regs.an_control, flm, 0)?;
                if enable {
                    let v = AN_RESTART | CL73_ENABLE | log2_lanes << 11 | ENABLE_1GKX;
                    self.hw.set_do(regs.an_control, flm, v as u32)?;
                    self.hw.set_do(regs.an_control, flm, (v & !AN_RESTART) as u32)?;
                }
            }
            Generation::Tsce => {
                const PD_KX4: u16 = 1 << 0;
                const PD_KX: u16 = 1 << 1;
                const LANES_MASK: u16 = 3 << 12;
                let hvco = multiplier == speed::multiplier_code(Generation::Tsce, 66);
                let pll_reset = tsce_reg::SETUP_PLL_RESET_ENABLE;
                self.hw.modify_do(regs.setup, flm,
                                  (if hvco { tsce_reg::SETUP_CL73_VCO } else { 0 }) | pll_reset,
                                  tsce_reg::SETUP_CL73_VCO | pll_reset)?;
                self.hw.set_do(regs.an_control, flm, 0)?;
                if enable {
                    self.hw.modify_do(regs.an_misc_control, flm, PD_KX4 | PD_KX, PD_KX4 | PD_KX)?;
                    // Restart clears itself.
                    self.hw.modify_do(regs.an_control, flm,
                                      AN_RESTART | CL73_ENABLE | log2_lanes << 12,
                                      AN_RESTART | CL73_ENABLE | LANES_MASK)?;
                    self.hw.modify_do(regs.setup, flm, pll_reset, pll_reset)?;
                } else {
                    self.hw.modify_do(regs.an_control, flm, 0, CL73_ENABLE | LANES_MASK)?;
                }
            }
        }
        Ok(())
    }

    /// Enables or disables the transmitter of `port`; a disabled port also
    /// forces signal detect low. The 40G core has no per port control.
    pub fn set_enable<P: Porter + ?Sized>(&mut self, port: &P, enable: bool) -> Result<()> {
        if self.generation() == Generation::Tsce {
            return Ok(())
        }
        const FORCE_SIGNAL_DETECT: u16 = 1 << 7;
        const SIGNAL_DETECT_VALUE: u16 = 1 << 8;

        let regs = self.generation().regs();
        let lanes = port.lane_mask();
        first_lane(lanes)?;
        info!("{}: {}", port.name(), if enable { "enable" } else { "disable" });
        self.modify_each(regs.tx_equalizer_misc_control, lanes, !enable as u16, 1 << 0)?;
        let sigdet = if enable { 0 } else { FORCE_SIGNAL_DETECT };
        self.modify_each(regs.sigdet_control[1], lanes, sigdet,
                         FORCE_SIGNAL_DETECT | SIGNAL_DETECT_VALUE)
    }

    pub fn set_loopback<P: Porter + ?Sized>(&mut self, port: &P, loopback: Loopback) -> Result<()> {
        if self.generation() == Generation::Tsce {
            return Ok(())
        }
        let regs = self.generation().regs();
        let lanes = port.lane_mask();
        let (_, flm) = first_lane(lanes)?;

        if self.hw.get_do(regs.cl93n72_control, flm)? & CL72_RESTART_TRAINING != 0 {
            return Err(Error::TrainingPending)
        }
        info!("{}: loopback {:?}", port.name(), loopback);

        let mut lm = lanes.0;
        let mut modify_mask = 0xffff;
        match loopback {
            Loopback::None | Loopback::Mac => {
                lm |= lm << 4;
                modify_mask = 0;
            }
            Loopback::PhyRemote => lm <<= 4,
            Loopback::PhyLocal => (),
        }
        self.hw.req.modify(regs.loopback_control, flm, lm & modify_mask, lm);

        // Rx lock, signal detect and tx disable overrides.
        const LANE_OVERRIDE: u16 = 1 << 0 | 1 << 1 | 1 << 5;
        const TX_DISABLE: u16 = 1 << 8;
        for l in lanes.masks() {
            self.hw.req.modify(regs.lane_override, l, LANE_OVERRIDE & modify_mask, LANE_OVERRIDE);
            self.hw.req.modify(regs.lane_reset_control, l, TX_DISABLE & modify_mask, TX_DISABLE);
        }
        self.hw.flush()
    }

    /// Whether the PMD of every lane in `lanes` is locked.
    pub fn pmd_locked(&mut self, lanes: LaneMask) -> Result<bool> {
        first_lane(lanes)?;
        let regs = self.generation().regs();
        Ok(self.hw.get_do_foreach(regs.tlb_rx_pmd_lock_status, lanes)? & 1 != 0)
    }

    pub fn status<P: Porter + ?Sized>(&mut self, port: &P, lane: usize) -> Result<PortStatus> {
        status::read(&mut self.hw, self.settings.generation, port, lane)
    }

    pub fn debug_snapshot(&mut self) -> Result<DebugSnapshot> {
        status::debug_snapshot(&mut self.hw, self.settings.generation, self.settings.lanes)
    }

    pub fn eye_scan(&mut self, lane: usize) -> Result<EyeScan> {
        eyescan::scan(&mut self.hw, self.settings.generation, lane)
    }

    pub fn event_log(&mut self) -> Result<Vec<Event>> {
        event_log::dump(&mut self.hw, self.settings.generation)
    }

    /// Sets the microcontroller event log level of the core and of every
    /// populated lane.
    pub fn set_event_log_level(&mut self, level: u8) -> Result<()> {
        let generation = self.generation();
        let mem = generation.uc_mem();
        uc_mem::write(&mut self.hw, generation, LaneMask::lane(0), mem.event_log_level,
                      level as u16)?;
        for lane in self.settings.lanes.iter() {
            uc_mem::write_lane(&mut self.hw, generation, lane, mem.lane.event_log_level,
                               level as u16)?;
        }
        Ok(())
    }
}
