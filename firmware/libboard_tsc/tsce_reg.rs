#![allow(dead_code)]

// 40G (TSCE) core register map.

use reg::Reg;

pub const CL93N72_COMMON_CONTROL           : Reg = Reg::pmd_lane(0x0096);
pub const CL93N72_TRAINING_ENABLE          : u16 = 1 << 1;
pub const CL93N72_RESTART_TRAINING         : u16 = 1 << 0;
pub const CL93N72_COMMON_STATUS            : Reg = Reg::pmd_lane(0x0097);

pub const MAIN_SETUP                       : Reg = Reg::pcs(0x9000);
pub const SETUP_SINGLE_PORT_MODE           : u16 = 1 << 3;
pub const SETUP_PORT_MODE_SHIFT            : u16 = 4;
pub const SETUP_PORT_MODE_MASK             : u16 = 7 << 4;
pub const SETUP_MASTER_PORT_SHIFT          : u16 = 8;
pub const SETUP_MASTER_PORT_MASK           : u16 = 3 << 8;
pub const SETUP_PLL_RESET_ENABLE           : u16 = 1 << 10;
pub const SETUP_CL73_VCO                   : u16 = 1 << 12;
pub const SETUP_REFCLK_SELECT_SHIFT        : u16 = 13;
pub const SETUP_REFCLK_SELECT_MASK         : u16 = 7 << 13;
pub const REFCLK_SELECT_156P25MHZ          : u16 = 3;
pub const MAIN_RX_LANE_SWAP                : Reg = Reg::pcs(0x9003);
pub const MAIN_LOOPBACK_CONTROL            : Reg = Reg::pcs(0x9008);

pub const PMD_X1_RESET                     : Reg = Reg::pcs(0x9010);
pub const PMD_X1_RESET_UC_RAM_ACCESS       : u16 = 1 << 8;

pub const CL37_RESTART_TIMER               : Reg = Reg::pcs(0x9250);
pub const CL37_COMPLETE_ACK_TIMER          : Reg = Reg::pcs(0x9251);
pub const CL37_TIMEOUT_ERROR_TIMER         : Reg = Reg::pcs(0x9252);
pub const CL73_BREAK_LINK_TIMER            : Reg = Reg::pcs(0x9253);
pub const CL73_TIMEOUT_ERROR_TIMER         : Reg = Reg::pcs(0x9254);
pub const CL73_PD_DME_LOCK_TIMER           : Reg = Reg::pcs(0x9255);
pub const CL73_LINK_UP_TIMER               : Reg = Reg::pcs(0x9256);
pub const CL73_QUALIFY_LINK_STATUS_TIMER   : [Reg; 2] = [Reg::pcs(0x9257), Reg::pcs(0x9258)];
pub const CL73_PD_SIGNAL_DETECT_TIMER      : Reg = Reg::pcs(0x9259);
pub const CL73_IGNORE_CL37_SYNC_TIMER      : Reg = Reg::pcs(0x925a);
pub const CL73_PERIOD_WAIT_LINK_CL37       : Reg = Reg::pcs(0x925b);
pub const CL73_IGNORE_LINK_TIMER           : Reg = Reg::pcs(0x925c);
pub const CL73_DME_PAGE_TIMERS             : Reg = Reg::pcs(0x925d);
pub const CL73_SGMII_TIMER                 : Reg = Reg::pcs(0x925e);

pub const TX_X2_MLD_SWAP_COUNT             : Reg = Reg::pcs_lane(0xa000);
pub const TX_X2_CL48_CONTROL               : Reg = Reg::pcs_lane(0xa001);

pub const PMD_X4_LANE_RESET_CONTROL        : Reg = Reg::pcs_lane(0xc010);
pub const PMD_X4_LANE_MODE_CONFIG          : Reg = Reg::pcs_lane(0xc011);
pub const PMD_X4_LANE_STATUS               : Reg = Reg::pcs_lane(0xc012);
pub const PMD_X4_LANE_OVERRIDE             : Reg = Reg::pcs_lane(0xc014);

pub const SC_X4_CONTROL                    : Reg = Reg::pcs_lane(0xc050);
pub const SC_X4_STATUS_READ_TO_CLEAR       : Reg = Reg::pcs_lane(0xc051);
pub const SC_X4_ERROR                      : Reg = Reg::pcs_lane(0xc052);
pub const SC_X4_DEBUG                      : Reg = Reg::pcs_lane(0xc054);
pub const SC_X4_FINAL_SPEED_CONFIG         : Reg = Reg::pcs_lane(0xc070);

pub const TX_X4_MISC                       : Reg = Reg::pcs_lane(0xc113);

pub const RX_X4_PMA_CONTROL0               : Reg = Reg::pcs_lane(0xc137);
pub const RX_X4_PCS_LIVE_STATUS            : Reg = Reg::pcs_lane(0xc154);

pub const AN_X4_ENABLES                    : Reg = Reg::pcs_lane(0xc180);
pub const AN_X4_CL73_BASE_ABILITIES        : [Reg; 2] = [Reg::pcs_lane(0xc185), Reg::pcs_lane(0xc186)];
pub const AN_X4_MISC_CONTROLS              : Reg = Reg::pcs_lane(0xc188);
pub const AN_X4_MISC_STATUS                : Reg = Reg::pcs_lane(0xc1ac);

pub const UC_CMD_CONTROL                   : Reg = Reg::pmd_lane(0xd00d);
pub const UC_CMD_DATA                      : Reg = Reg::pmd_lane(0xd00e);

pub const CKRST_OVER_SAMPLING_MODE_CONTROL : Reg = Reg::pmd_lane(0xd080);
pub const CKRST_LANE_RESET_AND_POWERDOWN   : Reg = Reg::pmd_lane(0xd081);
pub const CKRST_PIN_DISABLE                : Reg = Reg::pmd_lane(0xd083);
pub const CKRST_UC_ACK                     : Reg = Reg::pmd_lane(0xd085);
pub const CKRST_PMD_LANE_MODE_STATUS       : Reg = Reg::pmd_lane(0xd088);
pub const CKRST_LANE_DATA_PATH_RESET_STATUS: Reg = Reg::pmd_lane(0xd089);

pub const AMS_TX_CONTROL                   : [Reg; 4] = [
    Reg::pmd_lane(0xd0a0), Reg::pmd_lane(0xd0a1), Reg::pmd_lane(0xd0a2), Reg::pmd_lane(0xd0a3)
];

pub const SIGDET_CONTROL                   : [Reg; 3] = [
    Reg::pmd_lane(0xd0c0), Reg::pmd_lane(0xd0c1), Reg::pmd_lane(0xd0c2)
];
pub const SIGDET_STATUS                    : Reg = Reg::pmd_lane(0xd0c8);

pub const TLB_RX_MISC_CONTROL              : Reg = Reg::pmd_lane(0xd0d3);
pub const TLB_RX_PMD_LOCK_STATUS           : Reg = Reg::pmd_lane(0xd0dc);
pub const TLB_TX_MISC_CONTROL              : Reg = Reg::pmd_lane(0xd0e3);

pub const DIG_REVISION_ID0                 : Reg = Reg::pmd_lane(0xd0f0);
pub const DIG_TOP_USER_CONTROL             : Reg = Reg::pmd_lane(0xd0f4);
pub const TOP_USER_CORE_DP_RESET_RELEASE   : u16 = 1 << 13;
pub const TOP_USER_UC_ACTIVE               : u16 = 1 << 15;
pub const DIG_CORE_DATAPATH_RESET_STATUS   : Reg = Reg::pmd_lane(0xd0f8);
pub const DIG_REVISION_ID1                 : Reg = Reg::pmd_lane(0xd0fa);
pub const DIG_TX_LANE_MAP_012              : Reg = Reg::pmd_lane(0xd0fb);
pub const DIG_TX_LANE_MAP_3_ADDR_01        : Reg = Reg::pmd_lane(0xd0fc);
pub const DIG_TX_LANE_ADDR_23              : Reg = Reg::pmd_lane(0xd0fd);

pub const TX_EQUALIZER_CONTROL             : [Reg; 3] = [
    Reg::pmd_lane(0xd110), Reg::pmd_lane(0xd111), Reg::pmd_lane(0xd112)
];
pub const TX_EQUALIZER_MISC_CONTROL        : Reg = Reg::pmd_lane(0xd118);
pub const TX_EQUALIZER_CONTROL4            : Reg = Reg::pmd_lane(0xd119);

pub const PLL_MULTIPLIER                   : Reg = Reg::pmd_lane(0xd127);

pub const UC_RAM_WORD                      : Reg = Reg::pmd_lane(0xd200);
pub const UC_ADDRESS                       : Reg = Reg::pmd_lane(0xd201);
pub const UC_COMMAND1                      : Reg = Reg::pmd_lane(0xd202);
pub const COMMAND1_RAM_SELECT_SHIFT        : u16 = 7;
pub const COMMAND1_RAM_SELECT_MASK         : u16 = 3 << 7;
pub const COMMAND1_BYTE_ACCESS             : u16 = 1 << 9;
pub const COMMAND1_INIT_CODE_RAM           : u16 = 1 << 15;
pub const COMMAND1_UC_RUN                  : u16 = 1 << 4;
pub const UC_WRITE_DATA                    : Reg = Reg::pmd_lane(0xd203);
pub const UC_READ_DATA                     : Reg = Reg::pmd_lane(0xd204);
pub const UC_MDIO_8051_FSM_STATUS          : Reg = Reg::pmd_lane(0xd205);
pub const FSM_STATUS_INIT_DONE             : u16 = 1 << 15;
pub const UC_COMMAND2                      : Reg = Reg::pmd_lane(0xd20a);
pub const UC_COMMAND3                      : Reg = Reg::pmd_lane(0xd20c);
pub const UC_COMMAND4                      : Reg = Reg::pmd_lane(0xd20d);
pub const COMMAND4_MICRO_RESET             : u16 = 1 << 1;
