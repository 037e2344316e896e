//! Fitipower EK79007 MIPI-DSI panel controller
//!
//! Drives 1024×600 panels over 2 or 4 data lanes. The vendor registers
//! `0x80`–`0x86` set the gate/source voltages; `0xB2` selects the lane count
//! and must match the bus.

use platform::{HalStatus, PixelFormat};

use super::{InitCommand, PanelProtocol, ResetTiming};

/// Lane-select register.
pub const REG_LANE_SELECT: u16 = 0xB2;
/// `REG_LANE_SELECT` value for two data lanes.
pub const LANE_SELECT_2: u8 = 0x10;
/// `REG_LANE_SELECT` value for four data lanes.
pub const LANE_SELECT_4: u8 = 0x30;

const INIT_2_LANE: [InitCommand; 8] = [
    InitCommand::new(0x80, &[0x8B]),
    InitCommand::new(0x81, &[0x78]),
    InitCommand::new(0x82, &[0x84]),
    InitCommand::new(0x83, &[0x88]),
    InitCommand::new(0x84, &[0xA8]),
    InitCommand::new(0x85, &[0xE3]),
    InitCommand::new(0x86, &[0x88]),
    InitCommand::new(REG_LANE_SELECT, &[LANE_SELECT_2]),
];

const INIT_4_LANE: [InitCommand; 8] = [
    InitCommand::new(0x80, &[0x8B]),
    InitCommand::new(0x81, &[0x78]),
    InitCommand::new(0x82, &[0x84]),
    InitCommand::new(0x83, &[0x88]),
    InitCommand::new(0x84, &[0xA8]),
    InitCommand::new(0x85, &[0xE3]),
    InitCommand::new(0x86, &[0x88]),
    InitCommand::new(REG_LANE_SELECT, &[LANE_SELECT_4]),
];

/// EK79007 protocol.
#[derive(Debug, Clone, Copy)]
pub struct Ek79007;

impl PanelProtocol for Ek79007 {
    fn name(&self) -> &'static str {
        "EK79007"
    }

    fn supports(&self, lanes: u8, _format: PixelFormat) -> Result<(), HalStatus> {
        match lanes {
            2 | 4 => Ok(()),
            _ => Err(HalStatus::NotSupported),
        }
    }

    fn reset_timing(&self) -> ResetTiming {
        ResetTiming {
            assert_ms: 10,
            settle_ms: 20,
        }
    }

    fn init_sequence(&self, lanes: u8) -> &'static [InitCommand] {
        if lanes == 4 {
            &INIT_4_LANE
        } else {
            &INIT_2_LANE
        }
    }
}
