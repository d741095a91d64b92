extern crate board_tsc;
extern crate logger_tsc;

mod sim;

use board_tsc::config_word::MediaType;
use board_tsc::lane::{LaneMask, Loopback, PhyInterface, Port, PortMode};
use board_tsc::speed;
use board_tsc::tsc::Generation;
use board_tsc::tsce_reg;
use board_tsc::tscf_reg;
use board_tsc::Error;

use sim::Op;

fn port(name: &str, lanes: LaneMask, interface: PhyInterface) -> Port {
    let mode = if lanes.n_lanes() == 4 { PortMode::Mode1x4 } else { PortMode::Mode4x1 };
    Port::new(name, lanes, interface, mode)
}

fn values(ops: &[Op]) -> Vec<u16> {
    ops.iter().filter_map(|op| match *op {
        Op::Write { value, .. } => Some(value),
        _ => None
    }).collect()
}

#[test]
fn speed_change_reprograms_pll_once() {
    sim::init_logging();
    let mut phy = sim::ready_phy(Generation::Tscf);
    let regs = Generation::Tscf.regs();
    let ce0 = port("ce0", LaneMask::ALL, PhyInterface::Cr);

    let plan = speed::speed_plan(Generation::Tscf, LaneMask::ALL, PhyInterface::Cr, 100e9, false,
                                 phy.core_config(), phy.lane_config(0).unwrap()).unwrap();
    phy.set_speed(&ce0, 100e9, false).unwrap();

    // 165 times the reference clock.
    for lane in 0..4 {
        assert_eq!(phy.hw.bus.peek(regs.pll_multiplier, lane) & 0xf, 7);
        assert_eq!(*phy.lane_config(lane as usize).unwrap(), plan.lane);
    }
    let id = plan.config.speed_id;
    assert_eq!(values(&phy.hw.bus.writes_to(regs.speed_change_control)), vec![id, id | 1 << 8]);
    assert!(phy.lane_config(0).unwrap().dfe_on);

    phy.hw.bus.ops.clear();
    phy.set_speed(&ce0, 100e9, false).unwrap();
    assert!(phy.hw.bus.writes_to(regs.pll_multiplier).is_empty());
    assert!(phy.hw.bus.writes_to(regs.top_user_control).is_empty());
    assert!(phy.hw.bus.ops.iter().any(|op| op.is_read_of(regs.pll_multiplier)));
}

#[test]
fn speed_change_on_one_lane_of_the_40g_core() {
    let mut phy = sim::ready_phy(Generation::Tsce);
    let regs = Generation::Tsce.regs();
    let xe2 = port("xe2", LaneMask::lane(2), PhyInterface::Kr);
    phy.set_speed(&xe2, 10e9, false).unwrap();

    let bus = &phy.hw.bus;
    assert_eq!(bus.peek(regs.pll_multiplier, 2) & 0xf,
               speed::multiplier_code(Generation::Tsce, 66));
    assert_eq!(bus.peek(regs.pll_multiplier, 0), 0);
    assert!(bus.writes_to(tsce_reg::UC_COMMAND4).iter().all(|op| match *op {
        Op::Write { lane, .. } => lane == 2,
        _ => false
    }));
    // Master port follows the first lane of the port.
    assert_eq!(bus.peek(regs.setup, 0) & regs.master_port_mask, 2 << regs.master_port_shift);
    assert!(phy.lane_config(2).unwrap().cl72_auto_polarity_enable);
    assert!(!phy.lane_config(1).unwrap().cl72_auto_polarity_enable);
}

#[test]
fn unsupported_speed_touches_nothing() {
    let mut phy = sim::ready_phy(Generation::Tscf);
    let ce0 = port("ce0", LaneMask::ALL, PhyInterface::Cr);
    assert_eq!(phy.set_speed(&ce0, 30e9, false),
               Err(Error::UnsupportedSpeed { speed: 30e9, lanes: 0xf }));
    assert!(phy.hw.bus.ops.is_empty());

    let none = port("none", LaneMask::NONE, PhyInterface::Cr);
    assert_eq!(phy.set_speed(&none, 10e9, false), Err(Error::InvalidLaneMask(0)));
    assert!(phy.hw.bus.ops.is_empty());
}

#[test]
fn validate_speed_is_pure() {
    let phy = sim::ready_phy(Generation::Tscf);
    let ce0 = port("ce0", LaneMask::ALL, PhyInterface::Cr);
    let xe0 = port("xe0", LaneMask(0b0111), PhyInterface::Kr);
    assert!(phy.validate_speed(&ce0, 100e9, false));
    assert!(phy.validate_speed(&ce0, 40e9, true));
    assert!(!phy.validate_speed(&ce0, 25e9, false));
    assert!(!phy.validate_speed(&xe0, 40e9, false));
    assert!(!phy.validate_speed(&ce0, 100e9 + 0.5, false));
    assert!(phy.hw.bus.ops.is_empty());
}

#[test]
fn speed_change_timeout() {
    let mut phy = sim::ready_phy(Generation::Tscf);
    phy.hw.bus.speed_change_hang = true;
    let xe0 = port("xe0", LaneMask::lane(0), PhyInterface::Kr);
    let err = phy.set_speed(&xe0, 10e9, false).unwrap_err();
    assert_eq!(err, Error::Timeout("port speed set"));
    assert!(err.is_timeout());
    assert!(!err.is_fatal());
}

#[test]
fn autoneg_100g_core() {
    let mut phy = sim::ready_phy(Generation::Tscf);
    let regs = Generation::Tscf.regs();
    let ce0 = port("ce0", LaneMask::ALL, PhyInterface::Cr);
    phy.set_speed(&ce0, 100e9, false).unwrap();
    phy.hw.bus.ops.clear();

    phy.set_autoneg(&ce0, true).unwrap();
    let bus = &phy.hw.bus;
    // Restart, then enable alone: clause 73, four lanes, 1G KX.
    assert_eq!(values(&bus.writes_to(regs.an_control)), vec![0, 0x1103, 0x1102]);
    assert_eq!(bus.peek(regs.setup, 0) & tscf_reg::SETUP_SINGLE_PORT_MODE,
               tscf_reg::SETUP_SINGLE_PORT_MODE);
    // High VCO after the 100G speed change.
    assert_eq!(bus.peek(regs.setup, 0) & tscf_reg::SETUP_CL73_VCO, tscf_reg::SETUP_CL73_VCO);
    for lane in 0..4 {
        assert_eq!(bus.peek(regs.cl93n72_control, lane) & tscf_reg::CL93N72_TRAINING_ENABLE,
                   tscf_reg::CL93N72_TRAINING_ENABLE);
    }
    let la = phy.lane_config(3).unwrap();
    assert!(la.autoneg_enable && la.from_pcs && !la.cl72_restart_timeout_enable);
    assert_eq!(la.media_type, MediaType::CopperCable);
    assert!(phy.core_config().from_pcs);

    phy.hw.bus.ops.clear();
    phy.set_autoneg(&ce0, false).unwrap();
    assert_eq!(values(&phy.hw.bus.writes_to(regs.an_control)), vec![0]);
    assert_eq!(phy.hw.bus.peek(regs.cl93n72_control, 2) & tscf_reg::CL93N72_TRAINING_ENABLE, 0);
    assert!(!phy.lane_config(0).unwrap().autoneg_enable);
}

#[test]
fn autoneg_40g_core_trains_first_lane() {
    let mut phy = sim::ready_phy(Generation::Tsce);
    let regs = Generation::Tsce.regs();
    let xl0 = port("xl0", LaneMask::ALL, PhyInterface::Kr);
    phy.set_autoneg(&xl0, true).unwrap();

    let bus = &phy.hw.bus;
    let training = tsce_reg::CL93N72_TRAINING_ENABLE | tsce_reg::CL93N72_RESTART_TRAINING;
    assert_eq!(bus.peek(regs.cl93n72_control, 0) & training, training);
    assert_eq!(bus.peek(regs.cl93n72_control, 1), 0);
    // Clause 73 on four lanes.
    assert_eq!(bus.peek(regs.an_control, 0) & (1 << 8 | 3 << 12), 1 << 8 | 2 << 12);
}

#[test]
fn loopback_waits_for_training() {
    let mut phy = sim::ready_phy(Generation::Tscf);
    let regs = Generation::Tscf.regs();
    let ce0 = port("ce0", LaneMask::ALL, PhyInterface::Cr);

    phy.hw.bus.poke(regs.cl93n72_control, 0, tscf_reg::CL93N72_RESTART_TRAINING);
    assert_eq!(phy.set_loopback(&ce0, Loopback::PhyLocal), Err(Error::TrainingPending));
    assert!(phy.hw.bus.ops.iter().all(|op| match *op {
        Op::Read { .. } => true,
        _ => false
    }));

    phy.hw.bus.poke(regs.cl93n72_control, 0, 0);
    phy.set_loopback(&ce0, Loopback::PhyLocal).unwrap();
    assert_eq!(phy.hw.bus.peek(regs.loopback_control, 0) & 0xff, 0x0f);
    for lane in 0..4 {
        assert_eq!(phy.hw.bus.peek(regs.lane_override, lane), 1 << 0 | 1 << 1 | 1 << 5);
        assert_eq!(phy.hw.bus.peek(regs.lane_reset_control, lane) & (1 << 8), 1 << 8);
    }

    phy.set_loopback(&ce0, Loopback::None).unwrap();
    assert_eq!(phy.hw.bus.peek(regs.loopback_control, 0) & 0xff, 0);
    for lane in 0..4 {
        assert_eq!(phy.hw.bus.peek(regs.lane_override, lane), 0);
        assert_eq!(phy.hw.bus.peek(regs.lane_reset_control, lane) & (1 << 8), 0);
    }

    phy.set_loopback(&ce0, Loopback::PhyRemote).unwrap();
    assert_eq!(phy.hw.bus.peek(regs.loopback_control, 0) & 0xff, 0xf0);
}

#[test]
fn enable_and_disable() {
    let mut phy = sim::ready_phy(Generation::Tscf);
    let regs = Generation::Tscf.regs();
    let xe1 = port("xe1", LaneMask::lane(1), PhyInterface::Optics);

    phy.set_enable(&xe1, false).unwrap();
    assert_eq!(phy.hw.bus.peek(regs.tx_equalizer_misc_control, 1) & 1, 1);
    assert_eq!(phy.hw.bus.peek(regs.sigdet_control[1], 1) & (3 << 7), 1 << 7);
    assert_eq!(phy.hw.bus.peek(regs.tx_equalizer_misc_control, 0) & 1, 0);

    phy.set_enable(&xe1, true).unwrap();
    assert_eq!(phy.hw.bus.peek(regs.tx_equalizer_misc_control, 1) & 1, 0);
    assert_eq!(phy.hw.bus.peek(regs.sigdet_control[1], 1) & (3 << 7), 0);

    let mut phy = sim::ready_phy(Generation::Tsce);
    phy.set_enable(&xe1, false).unwrap();
    phy.set_loopback(&xe1, Loopback::PhyLocal).unwrap();
    assert!(phy.hw.bus.ops.is_empty());
}

#[test]
fn pmd_lock_on_every_lane() {
    let mut phy = sim::ready_phy(Generation::Tscf);
    let lock = Generation::Tscf.regs().tlb_rx_pmd_lock_status;
    for lane in 0..4 {
        phy.hw.bus.poke(lock, lane, 1);
    }
    assert_eq!(phy.pmd_locked(LaneMask::ALL), Ok(true));
    phy.hw.bus.poke(lock, 2, 0);
    assert_eq!(phy.pmd_locked(LaneMask::ALL), Ok(false));
    assert_eq!(phy.pmd_locked(LaneMask(0b0011)), Ok(true));
    assert_eq!(phy.pmd_locked(LaneMask::NONE), Err(Error::InvalidLaneMask(0)));
}

#[test]
fn lane_status() {
    let mut phy = sim::ready_phy(Generation::Tscf);
    let regs = Generation::Tscf.regs();
    let ce0 = port("ce0", LaneMask::ALL, PhyInterface::Cr);
    phy.set_speed(&ce0, 100e9, false).unwrap();

    let id = speed::speed_plan(Generation::Tscf, LaneMask::ALL, PhyInterface::Cr, 100e9, false,
                               phy.core_config(), phy.lane_config(0).unwrap())
        .unwrap().config.speed_id;
    phy.hw.bus.poke(regs.final_speed_config, 1, id << 8);
    phy.hw.bus.poke(regs.pcs_live_status, 1, 1 << 1);
    phy.hw.bus.poke(regs.tlb_rx_pmd_lock_status, 1, 1);
    phy.hw.bus.poke(regs.cl93n72_status, 1, 0b0011);

    let status = phy.status(&ce0, 1).unwrap();
    assert_eq!(status.name, "ce0:1");
    assert!(status.live_link && status.pmd_lock && !status.signal_detect);
    assert_eq!(status.speed, "100G X4 CR");
    assert!(status.cl72.receiver_trained() && status.cl72.frame_lock());
    assert!(!status.autoneg.enable);

    assert_eq!(phy.status(&ce0, 4), Err(Error::InvalidAccess("lane out of range")));
}

#[test]
fn debug_snapshot_of_populated_lanes() {
    let mut settings = sim::settings(Generation::Tscf);
    settings.lanes = LaneMask(0b0101);
    let mut phy = sim::phy_with(settings);
    phy.init().unwrap();

    let mem = Generation::Tscf.uc_mem();
    phy.hw.bus.uc_mem.insert(mem.lane_field(2, mem.lane.restart_counter).offset, 0x0103);

    let snapshot = phy.debug_snapshot().unwrap();
    assert_eq!(snapshot.lanes.iter().map(|l| l.lane).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(snapshot.lanes[0].pll_multiplier & 0xf, 10);
    // Byte variables.
    assert_eq!(snapshot.lanes[1].restarts, 0x03);
    assert_eq!(snapshot.core.config_word,
               phy.hw.bus.uc_mem.get(&mem.config_word.offset).cloned().unwrap_or(0));
}
