use std::fmt;

use clock::Clock;
use hw::Hw;
use lane::LaneMask;
use reg::Reg;
use sbus::Bus;
use Error;
use Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Null,
    Control,
    HorizontalEyeOffset,
    VerticalEyeOffset,
    Debug,
    Diagnostics,
    ReadLaneByte,
    WriteLaneByte,
    ReadCoreByte,
    WriteCoreByte,
    ReadLaneWord,
    WriteLaneWord,
    ReadCoreWord,
    WriteCoreWord,
    EventLogControl,
    EventLogRead,
    CaptureBitErrorRateStart,
    ReadDiagnosticDataByte,
    ReadDiagnosticDataWord,
    CaptureBitErrorRateEnd,
    ComputeUcodeCrc,
    FreezeSteadyState,
}

impl Command {
    pub fn code(self) -> u16 {
        self as u16
    }

    fn name(self) -> &'static str {
        match self {
            Command::Null                     => "null",
            Command::Control                  => "control",
            Command::HorizontalEyeOffset      => "horizontal eye offset",
            Command::VerticalEyeOffset        => "vertical eye offset",
            Command::Debug                    => "debug",
            Command::Diagnostics              => "diagnostics",
            Command::ReadLaneByte             => "read lane byte",
            Command::WriteLaneByte            => "write lane byte",
            Command::ReadCoreByte             => "read core byte",
            Command::WriteCoreByte            => "write core byte",
            Command::ReadLaneWord             => "read lane word",
            Command::WriteLaneWord            => "write lane word",
            Command::ReadCoreWord             => "read core word",
            Command::WriteCoreWord            => "write core word",
            Command::EventLogControl          => "event log control",
            Command::EventLogRead             => "event log read",
            Command::CaptureBitErrorRateStart => "capture bit error rate start",
            Command::ReadDiagnosticDataByte   => "read diagnostic data byte",
            Command::ReadDiagnosticDataWord   => "read diagnostic data word",
            Command::CaptureBitErrorRateEnd   => "capture bit error rate end",
            Command::ComputeUcodeCrc          => "compute ucode crc",
            Command::FreezeSteadyState        => "freeze steady state",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub const CONTROL_STOP_GRACEFULLY: u8 = 0;
pub const CONTROL_STOP_IMMEDIATE:  u8 = 1;
pub const CONTROL_RESUME:          u8 = 2;

pub const DIAGNOSTICS_NONE:                 u8 = 0;
pub const DIAGNOSTICS_PASSIVE:              u8 = 1;
pub const DIAGNOSTICS_DENSITY:              u8 = 2;
pub const DIAGNOSTICS_DISABLE:              u8 = 3;
pub const DIAGNOSTICS_START_VERTICAL_EYE:   u8 = 4;
pub const DIAGNOSTICS_START_HORIZONTAL_EYE: u8 = 5;
pub const DIAGNOSTICS_GET_EYE_SAMPLE:       u8 = 6;

pub const EVENT_LOG_READ_START: u8 = 0;
pub const EVENT_LOG_READ_NEXT:  u8 = 1;
pub const EVENT_LOG_READ_DONE:  u8 = 2;

pub const DEBUG_DIE_TEMPERATURE: u8 = 0;
pub const DEBUG_TIMESTAMP:       u8 = 1;
pub const DEBUG_LANE_INDEX:      u8 = 2;
pub const DEBUG_LANE_TIMER:      u8 = 3;

const CONTROL_DONE:  u16 = 1 << 7;
const CONTROL_ERROR: u16 = 1 << 6;

pub const POLL_INTERVAL_US:   u64 = 100;
pub const DEFAULT_TIMEOUT_US: u64 = 100_000;

/// Command/data register pair of the microcontroller mailbox.
#[derive(Debug, Clone, Copy)]
pub struct UcRegs {
    pub control: Reg,
    pub data:    Reg,
}

#[derive(Debug, Clone, Copy)]
pub struct UcCommand {
    pub command:     Command,
    pub sub_command: u8,
    pub input:       Option<u16>,
    pub want_output: bool,
    pub timeout_us:  u64,
}

impl UcCommand {
    pub fn new(command: Command, sub_command: u8) -> UcCommand {
        UcCommand {
            command: command,
            sub_command: sub_command,
            input: None,
            want_output: false,
            timeout_us: DEFAULT_TIMEOUT_US,
        }
    }

    pub fn input(mut self, value: u16) -> UcCommand {
        self.input = Some(value);
        self
    }

    pub fn output(mut self) -> UcCommand {
        self.want_output = true;
        self
    }

    pub fn timeout_us(mut self, timeout_us: u64) -> UcCommand {
        self.timeout_us = timeout_us;
        self
    }

    fn control_word(&self) -> u16 {
        (self.command.code() & 0x3f) | (self.sub_command as u16) << 8
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UcReply {
    pub output: Option<u16>,
    /// Upper byte of the control word on completion.
    pub aux:    u16,
}

/// Runs one command to completion on the lane(s) of `lanes`.
pub fn do_command<B: Bus, C: Clock>(hw: &mut Hw<B, C>, regs: &UcRegs, lanes: LaneMask,
                                    cmd: &UcCommand) -> Result<UcReply> {
    if let Some(input) = cmd.input {
        hw.req.set(regs.data, lanes, input as u32);
    }
    hw.req.set(regs.control, lanes, cmd.control_word() as u32);
    hw.flush()?;

    let start = hw.clock.get_us();
    loop {
        hw.clock.spin_us(POLL_INTERVAL_US);
        let s = hw.get_do(regs.control, lanes)?;
        if s & CONTROL_DONE != 0 {
            if s & CONTROL_ERROR != 0 {
                return Err(Error::UcCommand { command: cmd.command, sub_command: cmd.sub_command })
            }
            let output = if cmd.want_output {
                Some(hw.get_do(regs.data, lanes)?)
            } else {
                None
            };
            return Ok(UcReply { output: output, aux: s >> 8 })
        }
        if hw.clock.get_us() > start + cmd.timeout_us {
            return Err(Error::UcTimeout { command: cmd.command, sub_command: cmd.sub_command })
        }
    }
}

pub fn control<B: Bus, C: Clock>(hw: &mut Hw<B, C>, regs: &UcRegs, lanes: LaneMask,
                                 sub_command: u8) -> Result<()> {
    do_command(hw, regs, lanes, &UcCommand::new(Command::Control, sub_command)).map(|_| ())
}

pub fn stop_gracefully<B: Bus, C: Clock>(hw: &mut Hw<B, C>, regs: &UcRegs,
                                         lanes: LaneMask) -> Result<()> {
    control(hw, regs, lanes, CONTROL_STOP_GRACEFULLY)
}

pub fn stop_immediate<B: Bus, C: Clock>(hw: &mut Hw<B, C>, regs: &UcRegs,
                                        lanes: LaneMask) -> Result<()> {
    control(hw, regs, lanes, CONTROL_STOP_IMMEDIATE)
}

pub fn resume<B: Bus, C: Clock>(hw: &mut Hw<B, C>, regs: &UcRegs, lanes: LaneMask) -> Result<()> {
    control(hw, regs, lanes, CONTROL_RESUME)
}

/// Asks the microcontroller for the CRC of the first `len` bytes of
/// program RAM.
pub fn compute_ucode_crc<B: Bus, C: Clock>(hw: &mut Hw<B, C>, regs: &UcRegs, lanes: LaneMask,
                                           len: u16) -> Result<u16> {
    let cmd = UcCommand::new(Command::ComputeUcodeCrc, 0).input(len).output();
    let reply = do_command(hw, regs, lanes, &cmd)?;
    Ok(reply.output.unwrap_or(0))
}

/// Waits for the microcontroller to report ready after it leaves reset.
pub fn wait_ready<B: Bus, C: Clock>(hw: &mut Hw<B, C>, regs: &UcRegs, lanes: LaneMask) -> Result<()> {
    info!("waiting for ucode ready...");
    hw.poll(regs.control, lanes, POLL_INTERVAL_US, DEFAULT_TIMEOUT_US, "ucode not ready",
            |v| v & CONTROL_DONE != 0)?;
    info!("  ...ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_word_layout() {
        let cmd = UcCommand::new(Command::Diagnostics, DIAGNOSTICS_START_HORIZONTAL_EYE);
        assert_eq!(cmd.control_word(), 0x0505);
        let cmd = UcCommand::new(Command::FreezeSteadyState, 0xff);
        assert_eq!(cmd.control_word(), 0xff15);
    }

    #[test]
    fn command_codes_and_names() {
        assert_eq!(Command::ComputeUcodeCrc.code(), 20);
        assert_eq!(Command::ReadDiagnosticDataWord.code(), 18);
        assert_eq!(Command::ReadDiagnosticDataWord.to_string(), "read diagnostic data word");
    }
}
