use std::fmt;

use config_word::{ConfigCodec, TSCE_CODEC, TSCF_CODEC};
use reg::Reg;
use tsce_reg as e;
use tscf_reg as f;
use uc::UcRegs;
use uc_mem::{UcMemLayout, TSCE_UC_MEM, TSCF_UC_MEM};

/// Core generation, chosen when a port block is set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// 100G core, 25G lanes.
    Tscf,
    /// 40G core, 10G lanes.
    Tsce,
}

impl Generation {
    pub fn parse(s: &str) -> Option<Generation> {
        match s {
            "tscf" => Some(Generation::Tscf),
            "tsce" => Some(Generation::Tsce),
            _      => None
        }
    }

    pub fn regs(self) -> &'static Regs {
        match self {
            Generation::Tscf => &TSCF_REGS,
            Generation::Tsce => &TSCE_REGS,
        }
    }

    pub fn codec(self) -> &'static dyn ConfigCodec {
        match self {
            Generation::Tscf => &TSCF_CODEC,
            Generation::Tsce => &TSCE_CODEC,
        }
    }

    pub fn uc_mem(self) -> &'static UcMemLayout {
        match self {
            Generation::Tscf => &TSCF_UC_MEM,
            Generation::Tsce => &TSCE_UC_MEM,
        }
    }

    pub fn firmware_name(self) -> &'static str {
        match self {
            Generation::Tscf => "tscf.ucode",
            Generation::Tsce => "tsce.ucode",
        }
    }

    /// Whether bring-up checks the microcode CRC unless told otherwise.
    pub fn verify_crc_by_default(self) -> bool {
        self == Generation::Tscf
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &Generation::Tscf => write!(f, "tscf"),
            &Generation::Tsce => write!(f, "tsce"),
        }
    }
}

/// Registers both generations have, under their generation specific offsets.
pub struct Regs {
    pub setup:                       Reg,
    pub master_port_shift:           u16,
    pub master_port_mask:            u16,
    pub rx_lane_swap:                Reg,
    pub loopback_control:            Reg,
    pub pmd_x1_reset:                Reg,

    pub lane_reset_control:          Reg,
    pub lane_override:               Reg,
    pub speed_change_control:        Reg,
    pub speed_change_status:         Reg,
    pub final_speed_config:          Reg,
    pub tx_x4_control:               Reg,
    pub rx_pma_control:              Reg,
    pub pcs_live_status:             Reg,

    pub an_control:                  Reg,
    pub an_base_abilities:           [Reg; 2],
    pub an_misc_control:             Reg,
    pub an_misc_status:              Reg,

    pub uc:                          UcRegs,

    pub over_sampling_mode_control:  Reg,
    pub lane_reset_and_powerdown:    Reg,
    pub pin_disable:                 Reg,
    pub lane_data_path_reset_status: Reg,
    pub ams_tx_control:              [Reg; 4],
    pub sigdet_control:              [Reg; 3],
    pub sigdet_status:               Reg,

    pub revision_id0:                Reg,
    pub top_user_control:            Reg,
    pub core_datapath_reset_status:  Reg,
    pub tx_lane_map_012:             Reg,
    pub tx_lane_map_3_addr_01:       Reg,
    pub tx_lane_addr_23:             Reg,

    pub tx_equalizer_control:        [Reg; 3],
    pub tx_equalizer_misc_control:   Reg,
    pub pll_multiplier:              Reg,
    pub tlb_rx_misc_control:         Reg,
    pub tlb_rx_pmd_lock_status:      Reg,
    pub tlb_tx_misc_control:         Reg,
    pub cl93n72_control:             Reg,
    pub cl93n72_status:              Reg,
}

pub static TSCF_REGS: Regs = Regs {
    setup:                       f::MAIN_SETUP,
    master_port_shift:           f::SETUP_MASTER_PORT_SHIFT,
    master_port_mask:            f::SETUP_MASTER_PORT_MASK,
    rx_lane_swap:                f::MAIN_RX_LANE_SWAP,
    loopback_control:            f::MAIN_LOOPBACK_CONTROL,
    pmd_x1_reset:                f::PMD_X1_RESET,

    lane_reset_control:          f::PMD_X4_LANE_RESET_CONTROL,
    lane_override:               f::PMD_X4_LANE_OVERRIDE,
    speed_change_control:        f::SC_X4_CONTROL,
    speed_change_status:         f::SC_X4_STATUS_READ_TO_CLEAR,
    final_speed_config:          f::SC_X4_FINAL_SPEED_CONFIG,
    tx_x4_control:               f::TX_X4_CONTROL,
    rx_pma_control:              f::RX_X4_PMA_CONTROL,
    pcs_live_status:             f::RX_X4_PCS_LIVE_STATUS,

    an_control:                  f::AN_X4_CONTROL,
    an_base_abilities:           f::AN_X4_BASE_ABILITIES,
    an_misc_control:             f::AN_X4_MISC_CONTROL,
    an_misc_status:              f::AN_X4_MISC_STATUS,

    uc:                          UcRegs { control: f::UC_CMD_CONTROL, data: f::UC_CMD_DATA },

    over_sampling_mode_control:  f::CKRST_OVER_SAMPLING_MODE_CONTROL,
    lane_reset_and_powerdown:    f::CKRST_LANE_RESET_AND_POWERDOWN,
    pin_disable:                 f::CKRST_PIN_DISABLE,
    lane_data_path_reset_status: f::CKRST_LANE_DATA_PATH_RESET_STATUS,
    ams_tx_control:              f::AMS_TX_CONTROL,
    sigdet_control:              f::SIGDET_CONTROL,
    sigdet_status:               f::SIGDET_STATUS,

    revision_id0:                f::DIG_REVISION_ID0,
    top_user_control:            f::DIG_TOP_USER_CONTROL,
    core_datapath_reset_status:  f::DIG_CORE_DATAPATH_RESET_STATUS,
    tx_lane_map_012:             f::DIG_TX_LANE_MAP_012,
    tx_lane_map_3_addr_01:       f::DIG_TX_LANE_MAP_3_ADDR_01,
    tx_lane_addr_23:             f::DIG_TX_LANE_ADDR_23,

    tx_equalizer_control:        f::TX_EQUALIZER_CONTROL,
    tx_equalizer_misc_control:   f::TX_EQUALIZER_MISC_CONTROL,
    pll_multiplier:              f::PLL_MULTIPLIER,
    tlb_rx_misc_control:         f::TLB_RX_MISC_CONTROL,
    tlb_rx_pmd_lock_status:      f::TLB_RX_PMD_LOCK_STATUS,
    tlb_tx_misc_control:         f::TLB_TX_MISC_CONTROL,
    cl93n72_control:             f::CL93N72_COMMON_CONTROL,
    cl93n72_status:              f::CL93N72_COMMON_STATUS,
};

pub static TSCE_REGS: Regs = Regs {
    setup:                       e::MAIN_SETUP,
    master_port_shift:           e::SETUP_MASTER_PORT_SHIFT,
    master_port_mask:            e::SETUP_MASTER_PORT_MASK,
    rx_lane_swap:                e::MAIN_RX_LANE_SWAP,
    loopback_control:            e::MAIN_LOOPBACK_CONTROL,
    pmd_x1_reset:                e::PMD_X1_RESET,

    lane_reset_control:          e::PMD_X4_LANE_RESET_CONTROL,
    lane_override:               e::PMD_X4_LANE_OVERRIDE,
    speed_change_control:        e::SC_X4_CONTROL,
    speed_change_status:         e::SC_X4_STATUS_READ_TO_CLEAR,
    final_speed_config:          e::SC_X4_FINAL_SPEED_CONFIG,
    tx_x4_control:               e::TX_X4_MISC,
    rx_pma_control:              e::RX_X4_PMA_CONTROL0,
    pcs_live_status:             e::RX_X4_PCS_LIVE_STATUS,

    an_control:                  e::AN_X4_ENABLES,
    an_base_abilities:           e::AN_X4_CL73_BASE_ABILITIES,
    an_misc_control:             e::AN_X4_MISC_CONTROLS,
    an_misc_status:              e::AN_X4_MISC_STATUS,

    uc:                          UcRegs { control: e::UC_CMD_CONTROL, data: e::UC_CMD_DATA },

    over_sampling_mode_control:  e::CKRST_OVER_SAMPLING_MODE_CONTROL,
    lane_reset_and_powerdown:    e::CKRST_LANE_RESET_AND_POWERDOWN,
    pin_disable:                 e::CKRST_PIN_DISABLE,
    lane_data_path_reset_status: e::CKRST_LANE_DATA_PATH_RESET_STATUS,
    ams_tx_control:              e::AMS_TX_CONTROL,
    sigdet_control:              e::SIGDET_CONTROL,
    sigdet_status:               e::SIGDET_STATUS,

    revision_id0:                e::DIG_REVISION_ID0,
    top_user_control:            e::DIG_TOP_USER_CONTROL,
    core_datapath_reset_status:  e::DIG_CORE_DATAPATH_RESET_STATUS,
    tx_lane_map_012:             e::DIG_TX_LANE_MAP_012,
    tx_lane_map_3_addr_01:       e::DIG_TX_LANE_MAP_3_ADDR_01,
    tx_lane_addr_23:             e::DIG_TX_LANE_ADDR_23,

    tx_equalizer_control:        e::TX_EQUALIZER_CONTROL,
    tx_equalizer_misc_control:   e::TX_EQUALIZER_MISC_CONTROL,
    pll_multiplier:              e::PLL_MULTIPLIER,
    tlb_rx_misc_control:         e::TLB_RX_MISC_CONTROL,
    tlb_rx_pmd_lock_status:      e::TLB_RX_PMD_LOCK_STATUS,
    tlb_tx_misc_control:         e::TLB_TX_MISC_CONTROL,
    cl93n72_control:             e::CL93N72_COMMON_CONTROL,
    cl93n72_status:              e::CL93N72_COMMON_STATUS,
};
