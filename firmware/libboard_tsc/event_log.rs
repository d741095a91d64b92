//! Microcontroller event log.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use clock::Clock;
use hw::Hw;
use lane::LaneMask;
use sbus::Bus;
use tsc::Generation;
use uc::{self, Command, UcCommand};
use Result;

/// Upper bound on the bytes read from one log.
const MAX_LOG_BYTES: usize = 0x1000;

const END_OF_LOG: u8 = 0;
const TIMESTAMP_WRAP: u8 = 0xff;

/// Seconds per timestamp tick.
const TICK: f64 = 1e-5;

pub static EVENT_CODE_NAMES: [&'static str; 50] = [
    "uc_unknown",
    "uc_entry_to_dsc_reset",
    "uc_release_user_reset",
    "uc_exit_from_dsc_reset",
    "uc_entry_to_core_reset",
    "uc_release_user_core_reset",
    "uc_active_restart_condition",
    "uc_exit_from_restart",
    "uc_write_tr_coarse_lock",
    "uc_cl72_ready_for_command",
    "uc_each_write_to_cl72_tx_change_request",
    "uc_frame_lock",
    "uc_local_rx_trained",
    "uc_dsc_lock",
    "uc_first_rx_pmd_lock",
    "uc_pmd_restart_from_cl72_cmd_intf_timeout",
    "uc_lp_rx_ready",
    "uc_stop_event_log",
    "uc_general_event_0",
    "uc_general_event_1",
    "uc_general_event_2",
    "uc_error_event",
    "uc_num_timestamp_wraparound_maxout",
    "uc_restart_pmd_on_cdr_lock_lost",
    "uc_sm_status_restart",
    "uc_core_programming",
    "uc_lane_programming",
    "uc_restart_pmd_on_close_eye",
    "uc_restart_pmd_on_dfe_tap_config",
    "uc_cl72_auto_polarity_change",
    "uc_restart_from_cl72_max_timeout",
    "uc_cl72_local_tx_changed",
    "uc_first_write_to_cl72_tx_change_request",
    "uc_frame_unlock",
    "uc_entry_to_core_pll1_reset",
    "uc_release_user_core_pll1_reset",
    "uc_active_wait_for_sig",
    "uc_exit_from_wait_for_sig",
    "uc_start_vga_tuning",
    "uc_start_fx_dfe_tuning",
    "uc_start_pf_tuning",
    "uc_start_eye_meas_tuning",
    "uc_start_main_tap_tuning",
    "uc_start_fl_tap_tuning",
    "uc_exit_from_dsc_init",
    "uc_entry_to_dsc_init",
    "uc_dsc_pause",
    "uc_dsc_uc_tune",
    "uc_dsc_done",
    "uc_restart_pmd_on_short_channel_detected",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub lane: u8,
    /// Timestamp ticks, wraps already accounted for.
    pub time: u64,
    pub code: u8,
    pub data: [u8; 4],
}

impl Event {
    pub fn code_name(&self) -> Option<&'static str> {
        EVENT_CODE_NAMES.get(self.code as usize).cloned()
    }

    pub fn seconds(&self) -> f64 {
        self.time as f64 * TICK
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.4e}: lane {}, ", self.seconds(), self.lane)?;
        match self.code_name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.code)
        }
    }
}

/// Decodes a raw log into events, oldest first.
///
/// Each record starts with a byte holding its length in bits 7:5 and the
/// lane in bits 4:0, followed by a 16 bit timestamp, the event code and
/// the event data. A `0xff` byte followed by a 16 bit count marks
/// timestamp wraps of everything logged before it.
pub fn decode(log: &[u8]) -> Vec<Event> {
    let mut events: Vec<Event> = Vec::new();
    let mut i = 0;
    while i < log.len() {
        let x = log[i];
        if x == END_OF_LOG {
            break
        }

        if x == TIMESTAMP_WRAP {
            if i + 2 >= log.len() {
                break
            }
            let wraps = BigEndian::read_u16(&log[i + 1..]) as u64;
            for e in events.iter_mut() {
                e.time += wraps << 16;
            }
            i += 3;
            continue
        }

        let n_bytes = (x >> 5) as usize;
        if n_bytes < 4 || i + n_bytes > log.len() {
            if n_bytes < 4 {
                warn!("event log record of {} bytes at offset {}", n_bytes, i);
            }
            break
        }
        let mut event = Event {
            lane: x & 0x1f,
            time: BigEndian::read_u16(&log[i + 1..]) as u64,
            code: log[i + 3],
            data: [0; 4],
        };
        let data = &log[i + 4..i + n_bytes];
        event.data[..data.len()].copy_from_slice(data);
        events.push(event);
        i += n_bytes;
    }
    events
}

/// Renders events newest first, one per line.
pub fn render(events: &[Event]) -> String {
    let mut s = String::new();
    for e in events.iter().rev() {
        s.push_str(&format!("  {}\n", e));
    }
    s
}

fn read_bytes<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation,
                                lanes: LaneMask) -> Result<Vec<u8>> {
    let regs = generation.regs();
    uc::do_command(hw, &regs.uc, lanes,
                   &UcCommand::new(Command::EventLogRead, uc::EVENT_LOG_READ_START))?;

    let mut log = Vec::new();
    loop {
        let reply = uc::do_command(hw, &regs.uc, lanes,
                                   &UcCommand::new(Command::EventLogRead, uc::EVENT_LOG_READ_NEXT)
                                       .output())?;
        log.push(reply.output.unwrap_or(0) as u8);
        // Auxiliary status 1 flags the last byte.
        if reply.aux == 1 {
            break
        }
        if log.len() >= MAX_LOG_BYTES {
            warn!("event log truncated at {} bytes", log.len());
            break
        }
    }

    uc::do_command(hw, &regs.uc, lanes,
                   &UcCommand::new(Command::EventLogRead, uc::EVENT_LOG_READ_DONE))?;
    Ok(log)
}

/// Reads the raw event log with the microcontroller stopped. It is resumed
/// afterwards even when reading fails.
pub fn read<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation) -> Result<Vec<u8>> {
    let regs = generation.regs();
    let core = LaneMask::lane(0);
    uc::stop_immediate(hw, &regs.uc, core)?;
    let log = read_bytes(hw, generation, core);
    let resumed = uc::resume(hw, &regs.uc, core);
    let log = log?;
    resumed?;
    debug!("event log: {} bytes", log.len());
    Ok(log)
}

pub fn dump<B: Bus, C: Clock>(hw: &mut Hw<B, C>, generation: Generation) -> Result<Vec<Event>> {
    Ok(decode(&read(hw, generation)?))
}
