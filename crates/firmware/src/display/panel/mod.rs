//! Panel controller protocols
//!
//! Each supported controller describes itself through [`PanelProtocol`]: which
//! lane counts and pixel formats it accepts, how long its reset pulse is, and
//! the vendor register sequence it needs before the video stream starts. The
//! generic driver in [`crate::display::driver`] runs the sequence; adding a
//! panel means adding a table, not a code branch.

pub mod ek79007;
pub mod ili9881c;

use platform::{HalStatus, PixelFormat};

/// MIPI DCS command codes shared by every supported controller.
pub mod dcs {
    /// Software reset.
    pub const SOFT_RESET: u16 = 0x01;
    /// Exit sleep mode.
    pub const SLEEP_OUT: u16 = 0x11;
    /// Display on.
    pub const DISPLAY_ON: u16 = 0x29;
    /// Memory data access control (colour order, scan direction).
    pub const MADCTL: u16 = 0x36;
    /// Interface pixel format.
    pub const COLMOD: u16 = 0x3A;
}

/// One register write of a vendor init sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitCommand {
    /// Command code.
    pub cmd: u16,
    /// Parameter bytes.
    pub params: &'static [u8],
}

impl InitCommand {
    /// Register write; vendor registers need no settle time.
    pub const fn new(cmd: u16, params: &'static [u8]) -> Self {
        Self { cmd, params }
    }
}

/// Reset timing in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetTiming {
    /// Reset line held low.
    pub assert_ms: u32,
    /// Wait after release (or after a soft reset) before the first command.
    pub settle_ms: u32,
}

/// Vendor protocol of one panel controller.
///
/// Implementors are zero-sized statics; the driver holds a
/// `&'static dyn PanelProtocol` selected by [`PanelModel::protocol`].
pub trait PanelProtocol: Sync {
    /// Part name used in logs.
    fn name(&self) -> &'static str;

    /// Reject unsupported lane counts or pixel formats.
    fn supports(&self, lanes: u8, format: PixelFormat) -> Result<(), HalStatus>;

    /// Reset pulse and settle time.
    fn reset_timing(&self) -> ResetTiming;

    /// Vendor register writes sent after COLMOD/MADCTL and before sleep-out.
    fn init_sequence(&self, lanes: u8) -> &'static [InitCommand];

    /// Settle time after sleep-out.
    fn sleep_out_delay_ms(&self) -> u32 {
        120
    }
}

/// Supported panel controllers, keyed by part identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PanelModel {
    /// Fitipower EK79007 (1024×600 MIPI panels).
    Ek79007,
    /// Ilitek ILI9881C (720×1280 / 800×1280 MIPI panels).
    Ili9881c,
}

impl PanelModel {
    /// Protocol implementation for this part.
    pub fn protocol(self) -> &'static dyn PanelProtocol {
        match self {
            Self::Ek79007 => &ek79007::Ek79007,
            Self::Ili9881c => &ili9881c::Ili9881c,
        }
    }

    /// Look a part up by name, ignoring ASCII case.
    pub fn from_part(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("ek79007") {
            Some(Self::Ek79007)
        } else if name.eq_ignore_ascii_case("ili9881c") {
            Some(Self::Ili9881c)
        } else {
            None
        }
    }
}

impl core::fmt::Display for PanelModel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.protocol().name())
    }
}
