#![allow(dead_code)]

// 100G (TSCF) core register map.

use reg::Reg;

pub const CL93N72_COMMON_CONTROL           : Reg = Reg::pmd_lane(0x0096);
pub const CL93N72_TRAINING_ENABLE          : u16 = 1 << 1;
pub const CL93N72_RESTART_TRAINING         : u16 = 1 << 0;
pub const CL93N72_COMMON_STATUS            : Reg = Reg::pmd_lane(0x0097);

pub const MAIN_SETUP                       : Reg = Reg::pcs(0x9000);
pub const SETUP_SINGLE_PORT_MODE           : u16 = 1 << 3;
pub const SETUP_CL73_VCO                   : u16 = 1 << 1;
pub const SETUP_PORT_MODE_SHIFT            : u16 = 4;
pub const SETUP_PORT_MODE_MASK             : u16 = 7 << 4;
pub const SETUP_MASTER_PORT_SHIFT          : u16 = 14;
pub const SETUP_MASTER_PORT_MASK           : u16 = 3 << 14;
pub const MAIN_RX_LANE_SWAP                : Reg = Reg::pcs(0x9003);
pub const RX_LANE_SWAP_PLL_RESET_ENABLE    : u16 = 1 << 8;
pub const MAIN_LOOPBACK_CONTROL            : Reg = Reg::pcs(0x9009);

pub const PMD_X1_RESET                     : Reg = Reg::pcs(0x9010);

pub const CL73_BREAK_LINK_TIMER            : Reg = Reg::pcs(0x9250);
pub const CL73_AUTONEG_ERROR_TIMER         : Reg = Reg::pcs(0x9251);
pub const CL73_PD_DME_LOCK_TIMER           : Reg = Reg::pcs(0x9252);
pub const CL73_PD_SIGNAL_DETECT_TIMER      : Reg = Reg::pcs(0x9253);
pub const CL73_IGNORE_LINK_TIMER           : Reg = Reg::pcs(0x9254);
pub const CL73_QUALIFY_LINK_YES_CL72       : Reg = Reg::pcs(0x9255);
pub const CL73_QUALIFY_LINK_NO_CL72        : Reg = Reg::pcs(0x9256);

pub const PMD_X4_LANE_RESET_CONTROL        : Reg = Reg::pcs_lane(0xc010);
pub const PMD_X4_LANE_MODE_CONFIG          : Reg = Reg::pcs_lane(0xc011);
pub const PMD_X4_LANE_STATUS               : Reg = Reg::pcs_lane(0xc012);
pub const PMD_X4_LANE_OVERRIDE             : Reg = Reg::pcs_lane(0xc014);

pub const SC_X4_CONTROL                    : Reg = Reg::pcs_lane(0xc050);
pub const SC_X4_STATUS_READ_TO_CLEAR       : Reg = Reg::pcs_lane(0xc051);
pub const SC_X4_ERROR                      : Reg = Reg::pcs_lane(0xc052);
pub const SC_X4_DEBUG                      : Reg = Reg::pcs_lane(0xc054);
pub const SC_X4_FINAL_SPEED_CONFIG         : Reg = Reg::pcs_lane(0xc070);

pub const TX_X4_CONTROL                    : Reg = Reg::pcs_lane(0xc113);

pub const RX_X4_PMA_CONTROL                : Reg = Reg::pcs_lane(0xc137);
pub const RX_X4_FEC_CONTROL                : [Reg; 4] = [
    Reg::pcs_lane(0xc140), Reg::pcs_lane(0xc141), Reg::pcs_lane(0xc142), Reg::pcs_lane(0xc143)
];
pub const RX_X4_PCS_LIVE_STATUS            : Reg = Reg::pcs_lane(0xc161);

pub const AN_X4_CONTROL                    : Reg = Reg::pcs_lane(0xc1c0);
pub const AN_X4_BASE_ABILITIES             : [Reg; 2] = [Reg::pcs_lane(0xc1c3), Reg::pcs_lane(0xc1c4)];
pub const AN_X4_MISC_CONTROL               : Reg = Reg::pcs_lane(0xc1c6);
pub const AN_X4_MISC_STATUS                : Reg = Reg::pcs_lane(0xc1e9);

pub const UC_CMD_CONTROL                   : Reg = Reg::pmd_lane(0xd03d);
pub const UC_CMD_DATA                      : Reg = Reg::pmd_lane(0xd03e);

pub const CL93N72_TX_CONTROL               : [Reg; 4] = [
    Reg::pmd_lane(0xd092), Reg::pmd_lane(0xd093), Reg::pmd_lane(0xd094), Reg::pmd_lane(0xd095)
];

pub const CKRST_OVER_SAMPLING_MODE_CONTROL : Reg = Reg::pmd_lane(0xd0b0);
pub const CKRST_LANE_RESET_AND_POWERDOWN   : Reg = Reg::pmd_lane(0xd0b1);
pub const CKRST_PIN_DISABLE                : Reg = Reg::pmd_lane(0xd0b3);
pub const CKRST_UC_ACK                     : Reg = Reg::pmd_lane(0xd0b5);
pub const CKRST_PMD_LANE_MODE_STATUS       : Reg = Reg::pmd_lane(0xd0b8);
pub const CKRST_LANE_DATA_PATH_RESET_STATUS: Reg = Reg::pmd_lane(0xd0b9);

pub const AMS_TX_CONTROL                   : [Reg; 4] = [
    Reg::pmd_lane(0xd0d0), Reg::pmd_lane(0xd0d1), Reg::pmd_lane(0xd0d2), Reg::pmd_lane(0xd0d3)
];

pub const SIGDET_CONTROL                   : [Reg; 3] = [
    Reg::pmd_lane(0xd0e0), Reg::pmd_lane(0xd0e1), Reg::pmd_lane(0xd0e2)
];
pub const SIGDET_STATUS                    : Reg = Reg::pmd_lane(0xd0e8);

pub const DIG_REVISION_ID0                 : Reg = Reg::pmd_lane(0xd100);
pub const DIG_TOP_USER_CONTROL             : Reg = Reg::pmd_lane(0xd104);
pub const TOP_USER_CORE_DP_RESET_RELEASE   : u16 = 1 << 13;
pub const TOP_USER_UC_ACTIVE               : u16 = 1 << 15;
pub const DIG_CORE_DATAPATH_RESET_STATUS   : Reg = Reg::pmd_lane(0xd108);
pub const DIG_REVISION_ID1                 : Reg = Reg::pmd_lane(0xd10a);
pub const DIG_TX_LANE_MAP_012              : Reg = Reg::pmd_lane(0xd10b);
pub const DIG_TX_LANE_MAP_3_ADDR_01        : Reg = Reg::pmd_lane(0xd10c);
pub const DIG_TX_LANE_ADDR_23              : Reg = Reg::pmd_lane(0xd10d);

pub const AMS_PLL_CONTROL2                 : Reg = Reg::pmd_lane(0xd112);

pub const TX_EQUALIZER_CONTROL             : [Reg; 3] = [
    Reg::pmd_lane(0xd130), Reg::pmd_lane(0xd131), Reg::pmd_lane(0xd132)
];
pub const TX_EQUALIZER_MISC_CONTROL        : Reg = Reg::pmd_lane(0xd139);

pub const PLL_MULTIPLIER                   : Reg = Reg::pmd_lane(0xd147);

pub const TLB_RX_MISC_CONTROL              : Reg = Reg::pmd_lane(0xd163);
pub const TLB_RX_PMD_LOCK_STATUS           : Reg = Reg::pmd_lane(0xd16c);
pub const TLB_TX_MISC_CONTROL              : Reg = Reg::pmd_lane(0xd173);

pub const UC_CLOCK_CONTROL                 : Reg = Reg::pmd_lane(0xd200);
pub const UC_RESET_CONTROL                 : Reg = Reg::pmd_lane(0xd201);
pub const UC_AHB_CONTROL                   : Reg = Reg::pmd_lane(0xd202);
pub const AHB_CONTROL_INIT_CODE_RAM        : u16 = 1 << 8;
pub const UC_AHB_STATUS                    : Reg = Reg::pmd_lane(0xd203);
pub const UC_WRITE_ADDRESS                 : Reg = Reg::pmd_lane32(0xd204);
pub const UC_WRITE_DATA                    : Reg = Reg::pmd_lane32(0xd206);
pub const UC_READ_ADDRESS                  : Reg = Reg::pmd_lane32(0xd208);
pub const UC_READ_DATA                     : Reg = Reg::pmd_lane32(0xd20a);
pub const UC_PROGRAM_RAM_INTERFACE_ENABLE  : Reg = Reg::pmd_lane(0xd20c);
pub const UC_PROGRAM_RAM_WRITE_ADDRESS     : Reg = Reg::pmd_lane32(0xd20d);

pub const MDIO_BLOCK_ADDRESS               : Reg = Reg::pcs(0xffdb);
