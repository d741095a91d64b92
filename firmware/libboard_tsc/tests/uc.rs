extern crate board_tsc;
extern crate logger_tsc;

mod sim;

use board_tsc::clock::Clock;
use board_tsc::event_log;
use board_tsc::eyescan::{self, Float8};
use board_tsc::hw::Hw;
use board_tsc::lane::LaneMask;
use board_tsc::sbus::BusError;
use board_tsc::tsc::Generation;
use board_tsc::tscf_reg;
use board_tsc::uc::{self, Command, UcCommand};
use board_tsc::uc_mem;
use board_tsc::Error;

use sim::{Op, SimBus, SimClock, UcCall, UcMode};

fn hw(generation: Generation) -> Hw<SimBus, SimClock> {
    Hw::new(SimBus::new(generation), SimClock::new(), sim::settings(generation).target())
}

fn call(command: Command, sub_command: u8) -> UcCall {
    UcCall { lane: 0, command: command.code(), sub_command: sub_command }
}

#[test]
fn command_timeout_is_bounded() {
    let mut hw = hw(Generation::Tscf);
    hw.bus.uc_mode = UcMode::NeverDone;
    let regs = Generation::Tscf.regs();

    let cmd = UcCommand::new(Command::Control, uc::CONTROL_RESUME).output().timeout_us(1_000);
    let start = hw.clock.get_us();
    assert_eq!(uc::do_command(&mut hw, &regs.uc, LaneMask::lane(0), &cmd),
               Err(Error::UcTimeout { command: Command::Control, sub_command: 2 }));
    let elapsed = hw.clock.get_us() - start;
    assert!(elapsed > 1_000 && elapsed <= 1_000 + uc::POLL_INTERVAL_US);
    assert!(!hw.bus.ops.iter().any(|op| op.is_read_of(regs.uc.data)));
}

#[test]
fn command_error_bit() {
    let mut hw = hw(Generation::Tsce);
    hw.bus.uc_mode = UcMode::Error;
    let regs = Generation::Tsce.regs();
    assert_eq!(uc::stop_immediate(&mut hw, &regs.uc, LaneMask::lane(3)),
               Err(Error::UcCommand { command: Command::Control, sub_command: 1 }));
    assert_eq!(hw.bus.uc_calls, vec![UcCall { lane: 3, command: 1, sub_command: 1 }]);
}

#[test]
fn control_sub_commands() {
    let mut hw = hw(Generation::Tscf);
    let regs = Generation::Tscf.regs();
    uc::stop_gracefully(&mut hw, &regs.uc, LaneMask::lane(2)).unwrap();
    uc::resume(&mut hw, &regs.uc, LaneMask::lane(2)).unwrap();
    assert_eq!(hw.bus.uc_calls, vec![
        UcCall { lane: 2, command: 1, sub_command: uc::CONTROL_STOP_GRACEFULLY },
        UcCall { lane: 2, command: 1, sub_command: uc::CONTROL_RESUME },
    ]);
}

#[test]
fn command_input_and_output() {
    let mut hw = hw(Generation::Tscf);
    hw.bus.crc = 0x5a5a;
    let regs = Generation::Tscf.regs();
    assert_eq!(uc::compute_ucode_crc(&mut hw, &regs.uc, LaneMask::lane(1), 0x4000), Ok(0x5a5a));

    let data = hw.bus.ops.iter().position(|op| op.is_write_to(regs.uc.data)).unwrap();
    let control = hw.bus.ops.iter().position(|op| op.is_write_to(regs.uc.control)).unwrap();
    assert!(data < control);
    assert_eq!(hw.bus.ops[data], Op::Write { dev: regs.uc.data.dev, lane: 1,
                                             offset: regs.uc.data.offset, value: 0x4000,
                                             mask: 0xffff });
    assert_eq!(hw.bus.ops[control], Op::Write { dev: regs.uc.control.dev, lane: 1,
                                                offset: regs.uc.control.offset,
                                                value: Command::ComputeUcodeCrc.code(),
                                                mask: 0xffff });
    assert!(hw.bus.ops.last().unwrap().is_read_of(regs.uc.data));
}

#[test]
fn wide_registers_high_half_first() {
    let mut hw = hw(Generation::Tscf);
    hw.set_do(tscf_reg::UC_WRITE_ADDRESS, LaneMask::lane(2), 0x2000_0438).unwrap();
    assert_eq!(hw.bus.ops, vec![
        Op::Write { dev: tscf_reg::UC_WRITE_ADDRESS.dev, lane: 2, offset: 0xd205, value: 0x2000,
                    mask: 0xffff },
        Op::Write { dev: tscf_reg::UC_WRITE_ADDRESS.dev, lane: 2, offset: 0xd204, value: 0x0438,
                    mask: 0xffff },
    ]);

    hw.bus.ops.clear();
    hw.bus.poke(tscf_reg::UC_READ_DATA, 2, 0xbeef);
    assert_eq!(hw.get_do32(tscf_reg::UC_READ_DATA, LaneMask::lane(2)), Ok(0xbeef));
    let offsets: Vec<u16> = hw.bus.ops.iter().map(|op| op.offset()).collect();
    assert_eq!(offsets, vec![0xd20a, 0xd20b]);
}

#[test]
fn data_ram_variables() {
    for &generation in [Generation::Tscf, Generation::Tsce].iter() {
        let mut hw = hw(generation);
        let mem = generation.uc_mem();

        uc_mem::write_lane(&mut hw, generation, 3, mem.lane.link_time, 0x1234).unwrap();
        assert_eq!(uc_mem::read_lane(&mut hw, generation, 3, mem.lane.link_time), Ok(0x1234));
        assert_eq!(uc_mem::read_lane(&mut hw, generation, 2, mem.lane.link_time), Ok(0));

        // Byte variables only keep their low byte.
        uc_mem::write(&mut hw, generation, LaneMask::lane(0), mem.event_log_level, 0x1203).unwrap();
        assert_eq!(uc_mem::read(&mut hw, generation, LaneMask::lane(0), mem.event_log_level),
                   Ok(0x03));
    }
}

#[test]
fn eye_scan_needs_pmd_lock() {
    let mut phy = sim::phy(Generation::Tscf);
    assert_eq!(phy.eye_scan(1).unwrap_err(), Error::PmdNotLocked(1));
    assert!(phy.hw.bus.uc_calls.is_empty());
    assert_eq!(phy.eye_scan(4).unwrap_err(), Error::InvalidAccess("lane out of range"));
}

#[test]
fn eye_scan_disables_diagnostics_after_timeout() {
    let generation = Generation::Tscf;
    let mut phy = sim::phy(generation);
    phy.hw.bus.poke(generation.regs().tlb_rx_pmd_lock_status, 1, 1);

    assert_eq!(phy.eye_scan(1).unwrap_err(), Error::Timeout("diag status"));
    let diagnostics: Vec<u8> = phy.hw.bus.uc_calls_of(Command::Diagnostics).iter()
        .map(|c| c.sub_command).collect();
    assert_eq!(diagnostics, vec![uc::DIAGNOSTICS_START_HORIZONTAL_EYE, uc::DIAGNOSTICS_DISABLE]);
    assert!(phy.hw.bus.uc_calls_of(Command::ReadDiagnosticDataWord).is_empty());
}

#[test]
fn eye_scan_disables_diagnostics_after_bus_failure() {
    let generation = Generation::Tsce;
    let mut phy = sim::phy(generation);
    let mem = generation.uc_mem();
    phy.hw.bus.poke(generation.regs().tlb_rx_pmd_lock_status, 0, 1);
    phy.hw.bus.uc_mem.insert(mem.lane_field(0, mem.lane.diag_status).offset, 1 << 15);
    phy.hw.bus.failing_batch = Some(phy.hw.bus.batches + 20);

    assert_eq!(phy.eye_scan(0).unwrap_err(), Error::Bus(BusError::Timeout));
    let diagnostics: Vec<u8> = phy.hw.bus.uc_calls_of(Command::Diagnostics).iter()
        .map(|c| c.sub_command).collect();
    assert_eq!(diagnostics, vec![uc::DIAGNOSTICS_START_HORIZONTAL_EYE, uc::DIAGNOSTICS_DISABLE]);
    assert!(phy.hw.req.err().is_none());
}

#[test]
fn eye_scan_samples() {
    let generation = Generation::Tsce;
    let mut phy = sim::phy(generation);
    let mem = generation.uc_mem();
    phy.hw.bus.poke(generation.regs().tlb_rx_pmd_lock_status, 0, 1);
    phy.hw.bus.uc_mem.insert(mem.lane_field(0, mem.lane.diag_status).offset, 1 << 15);
    phy.hw.bus.diag_word = 0x0300;

    let scan = phy.eye_scan(0).unwrap();
    assert_eq!(scan.bit_error_rate(0, 0), Float8(0x03).bit_error_rate());
    assert_eq!(scan.bit_error_rate(0, 1), 0.0);
    assert_eq!(scan.bit_error_rate(eyescan::N_Y - 1, eyescan::N_X - 1),
               Float8(0x03).bit_error_rate());

    let words = phy.hw.bus.uc_calls_of(Command::ReadDiagnosticDataWord).len();
    assert_eq!(words, eyescan::N_Y * (eyescan::N_X + 1) / 2);
    let diagnostics = phy.hw.bus.uc_calls_of(Command::Diagnostics);
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[1].sub_command, uc::DIAGNOSTICS_DISABLE);
}

#[test]
fn event_log_read() {
    let mut phy = sim::phy(Generation::Tscf);
    phy.hw.bus.event_log = vec![
        4 << 5 | 2, 0x00, 0x20, 13,
        0xff, 0x00, 0x01,
        5 << 5 | 1, 0x00, 0x08, 21, 0x7f,
        0,
    ];
    let events = phy.event_log().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].time, 0x1_0020);
    assert_eq!(events[0].code_name(), Some("uc_dsc_lock"));
    assert_eq!(events[1].data, [0x7f, 0, 0, 0]);

    let bus = &phy.hw.bus;
    assert_eq!(bus.uc_calls.first(), Some(&call(Command::Control, uc::CONTROL_STOP_IMMEDIATE)));
    assert_eq!(bus.uc_calls.last(), Some(&call(Command::Control, uc::CONTROL_RESUME)));
    let reads: Vec<u8> = bus.uc_calls_of(Command::EventLogRead).iter()
        .map(|c| c.sub_command).collect();
    assert_eq!(reads.len(), bus.event_log.len() + 2);
    assert_eq!(reads[0], uc::EVENT_LOG_READ_START);
    assert_eq!(*reads.last().unwrap(), uc::EVENT_LOG_READ_DONE);
}

#[test]
fn event_log_resumes_after_failure() {
    let mut phy = sim::phy(Generation::Tsce);
    phy.hw.bus.failing = Some(Command::EventLogRead);
    assert_eq!(phy.event_log().unwrap_err(),
               Error::UcCommand { command: Command::EventLogRead,
                                  sub_command: uc::EVENT_LOG_READ_START });
    assert_eq!(phy.hw.bus.uc_calls.last(),
               Some(&call(Command::Control, uc::CONTROL_RESUME)));
    assert_eq!(phy.hw.bus.uc_calls.len(), 3);
}

#[test]
fn raw_event_log_is_bounded() {
    let mut hw = hw(Generation::Tscf);
    hw.bus.event_log = vec![4 << 5; 0x2000];
    let log = event_log::read(&mut hw, Generation::Tscf).unwrap();
    assert_eq!(log.len(), 0x1000);
}

#[test]
fn event_log_level() {
    let generation = Generation::Tscf;
    let mut settings = sim::settings(generation);
    settings.lanes = LaneMask(0b0011);
    let mut phy = sim::phy_with(settings);
    phy.set_event_log_level(4).unwrap();

    let mem = generation.uc_mem();
    let bus = &phy.hw.bus;
    assert_eq!(bus.uc_mem.get(&mem.event_log_level.offset), Some(&4));
    for lane in 0..2 {
        let field = mem.lane_field(lane, mem.lane.event_log_level);
        assert_eq!(bus.uc_mem.get(&field.offset), Some(&4));
    }
    let lane3 = mem.lane_field(3, mem.lane.event_log_level);
    assert_eq!(bus.uc_mem.get(&lane3.offset), None);
}
