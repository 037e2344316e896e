//! Ilitek ILI9881C MIPI-DSI panel controller
//!
//! Registers live in pages selected through `0xFF 98 81 <page>`. Page 1
//! holds the lane configuration; the sequence always returns to page 0 (the
//! standard DCS set) before the driver sends sleep-out.

use platform::{HalStatus, PixelFormat};

use super::{InitCommand, PanelProtocol, ResetTiming};

/// Page-select register.
pub const REG_PAGE_SELECT: u16 = 0xFF;
/// Lane configuration register (page 1).
pub const REG_LANE_CONFIG: u16 = 0xB7;

const INIT_2_LANE: [InitCommand; 5] = [
    InitCommand::new(REG_PAGE_SELECT, &[0x98, 0x81, 0x01]),
    InitCommand::new(REG_LANE_CONFIG, &[0x03]),
    InitCommand::new(REG_PAGE_SELECT, &[0x98, 0x81, 0x04]),
    InitCommand::new(0x6C, &[0x15]),
    InitCommand::new(REG_PAGE_SELECT, &[0x98, 0x81, 0x00]),
];

const INIT_4_LANE: [InitCommand; 5] = [
    InitCommand::new(REG_PAGE_SELECT, &[0x98, 0x81, 0x01]),
    InitCommand::new(REG_LANE_CONFIG, &[0x02]),
    InitCommand::new(REG_PAGE_SELECT, &[0x98, 0x81, 0x04]),
    InitCommand::new(0x6C, &[0x15]),
    InitCommand::new(REG_PAGE_SELECT, &[0x98, 0x81, 0x00]),
];

/// ILI9881C protocol.
#[derive(Debug, Clone, Copy)]
pub struct Ili9881c;

impl PanelProtocol for Ili9881c {
    fn name(&self) -> &'static str {
        "ILI9881C"
    }

    fn supports(&self, lanes: u8, format: PixelFormat) -> Result<(), HalStatus> {
        if !matches!(lanes, 2 | 4) {
            return Err(HalStatus::NotSupported);
        }
        // No 18-bit loosely packed mode on this controller.
        if format == PixelFormat::Rgb666 {
            return Err(HalStatus::NotSupported);
        }
        Ok(())
    }

    fn reset_timing(&self) -> ResetTiming {
        ResetTiming {
            assert_ms: 10,
            settle_ms: 120,
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
