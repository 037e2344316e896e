//! Bring-up error taxonomy
//!
//! One error type per stage of the display chain. Each carries the [`Stage`]
//! it came from and the [`HalStatus`] of the failing vendor call, so a single
//! log line tells where the chain stopped and why. Nothing here is retried:
//! the first error aborts the chain.

use platform::HalStatus;

/// A step of the display bring-up chain, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// Board configuration validation (before any hardware is touched).
    Config,
    /// LDO channel feeding the DSI PHY.
    PowerRail,
    /// MIPI-DSI bus.
    BusTransport,
    /// DBI command channel on the bus.
    PanelIo,
    /// Panel driver construction.
    PanelConstruct,
    /// Panel reset.
    PanelReset,
    /// Panel init (vendor registers, pixel format, video timing).
    PanelInit,
    /// Display surface creation.
    Surface,
}

impl Stage {
    /// Number of stages.
    pub const COUNT: usize = 8;

    /// Every stage, in execution order.
    pub const ALL: [Stage; Self::COUNT] = [
        Stage::Config,
        Stage::PowerRail,
        Stage::BusTransport,
        Stage::PanelIo,
        Stage::PanelConstruct,
        Stage::PanelReset,
        Stage::PanelInit,
        Stage::Surface,
    ];

    /// Short lowercase name used in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::PowerRail => "power-rail",
            Self::BusTransport => "bus-transport",
            Self::PanelIo => "panel-io",
            Self::PanelConstruct => "panel-construct",
            Self::PanelReset => "panel-reset",
            Self::PanelInit => "panel-init",
            Self::Surface => "surface",
        }
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Stage errors
// ---------------------------------------------------------------------------

/// The LDO channel could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerError {
    /// Requested channel.
    pub channel: u8,
    /// Requested voltage in millivolts.
    pub voltage_mv: u16,
    /// Regulator status.
    pub status: HalStatus,
}

impl PowerError {
    /// Always [`Stage::PowerRail`].
    pub const fn stage(&self) -> Stage {
        Stage::PowerRail
    }
}

impl core::fmt::Display for PowerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}: LDO channel {} at {} mV: {}",
            self.stage(),
            self.channel,
            self.voltage_mv,
            self.status
        )
    }
}

/// The DSI bus could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusError {
    /// DSI bus number.
    pub bus_id: u8,
    /// Host status.
    pub status: HalStatus,
}

impl BusError {
    /// Always [`Stage::BusTransport`].
    pub const fn stage(&self) -> Stage {
        Stage::BusTransport
    }
}

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: DSI bus {}: {}", self.stage(), self.bus_id, self.status)
    }
}

/// Why a command-channel operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoErrorKind {
    /// The host rejected the call.
    Host(HalStatus),
    /// Command code does not fit the configured command width.
    CommandTooWide {
        /// Offending command code.
        cmd: u16,
        /// Configured width in bits.
        bits: u8,
    },
    /// Parameter count is not a multiple of the parameter width in bytes.
    ParamsMisaligned {
        /// Number of parameter bytes supplied.
        len: usize,
        /// Configured width in bits.
        bits: u8,
    },
}

impl IoErrorKind {
    /// Status code to report: the host's own, or `InvalidArg` for widths.
    pub const fn status(&self) -> HalStatus {
        match self {
            Self::Host(status) => *status,
            Self::CommandTooWide { .. } | Self::ParamsMisaligned { .. } => HalStatus::InvalidArg,
        }
    }
}

/// The DBI command channel failed to attach or to carry a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoError {
    /// Command being sent, `None` while attaching.
    pub cmd: Option<u16>,
    /// What went wrong.
    pub kind: IoErrorKind,
}

impl IoError {
    /// Always [`Stage::PanelIo`].
    pub const fn stage(&self) -> Stage {
        Stage::PanelIo
    }

    /// Underlying status code.
    pub const fn status(&self) -> HalStatus {
        self.kind.status()
    }
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: ", self.stage())?;
        if let Some(cmd) = self.cmd {
            write!(f, "command {cmd:#04x}: ")?;
        }
        match self.kind {
            IoErrorKind::Host(status) => write!(f, "{status}"),
            IoErrorKind::CommandTooWide { cmd, bits } => {
                write!(f, "command {cmd:#x} does not fit in {bits} bits")
            }
            IoErrorKind::ParamsMisaligned { len, bits } => {
                write!(f, "{len} parameter bytes are not a multiple of {bits} bits")
            }
        }
    }
}

/// The panel driver failed to construct, reset or initialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverError {
    /// [`Stage::PanelConstruct`], [`Stage::PanelReset`] or [`Stage::PanelInit`].
    pub stage: Stage,
    /// Underlying status.
    pub status: HalStatus,
    /// Command being sent when the failure happened, if any.
    pub cmd: Option<u16>,
}

impl DriverError {
    pub(crate) const fn new(stage: Stage, status: HalStatus) -> Self {
        Self {
            stage,
            status,
            cmd: None,
        }
    }

    /// Wrap a command-channel error raised while the panel was in `stage`.
    pub(crate) const fn from_io(stage: Stage, err: IoError) -> Self {
        Self {
            stage,
            status: err.status(),
            cmd: err.cmd,
        }
    }
}

impl core::fmt::Display for DriverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: ", self.stage)?;
        if let Some(cmd) = self.cmd {
            write!(f, "command {cmd:#04x}: ")?;
        }
        write!(f, "{}", self.status)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// A board configuration field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Display width or height is zero.
    ZeroGeometry,
    /// DSI lane count outside 1..=4.
    LaneCount(u8),
    /// DSI lane bit rate is zero.
    ZeroLaneRate,
    /// DBI command width is neither 8 nor 16.
    CommandBits(u8),
    /// DBI parameter width is not 8; every panel command table is byte-wide.
    ParamBits(u8),
    /// Framebuffer count outside 1..=3.
    FramebufferCount(u8),
    /// DPI pixel clock is zero.
    ZeroDpiClock,
    /// Video timing active area is zero or its totals overflow.
    VideoTiming,
    /// An audio sample rate is zero.
    ZeroSampleRate,
    /// Display size differs from the panel's active area (after `swap_xy`).
    GeometryMismatch {
        /// Configured display width.
        width: u16,
        /// Configured display height.
        height: u16,
        /// Horizontal active pixels of the video timing.
        h_size: u32,
        /// Vertical active lines of the video timing.
        v_size: u32,
    },
    /// The configuration names a reset GPIO but no pin was supplied, or the
    /// other way round.
    ResetPinMismatch {
        /// `display.reset_pin` is set.
        configured: bool,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroGeometry => write!(f, "display width and height must be non-zero"),
            Self::LaneCount(n) => write!(f, "DSI lane count {n} outside 1..=4"),
            Self::ZeroLaneRate => write!(f, "DSI lane bit rate must be non-zero"),
            Self::CommandBits(n) => write!(f, "DBI command width {n} must be 8 or 16"),
            Self::ParamBits(n) => write!(f, "DBI parameter width {n} must be 8"),
            Self::FramebufferCount(n) => write!(f, "framebuffer count {n} outside 1..=3"),
            Self::ZeroDpiClock => write!(f, "DPI clock must be non-zero"),
            Self::VideoTiming => write!(f, "invalid video timing"),
            Self::ZeroSampleRate => write!(f, "audio sample rates must be non-zero"),
            Self::GeometryMismatch {
                width,
                height,
                h_size,
                v_size,
            } => write!(
                f,
                "display {width}x{height} does not match panel timing {h_size}x{v_size}"
            ),
            Self::ResetPinMismatch { configured: true } => {
                write!(f, "reset GPIO configured but no reset pin supplied")
            }
            Self::ResetPinMismatch { configured: false } => {
                write!(f, "reset pin supplied but no reset GPIO configured")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Umbrella
// ---------------------------------------------------------------------------

/// Any failure of the display bring-up chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BringUpError {
    /// Configuration rejected before any hardware was touched.
    Config(ConfigError),
    /// Power rail stage failed.
    Power(PowerError),
    /// Bus transport stage failed.
    Bus(BusError),
    /// Command channel stage failed.
    Io(IoError),
    /// Panel construct, reset or init failed.
    Driver(DriverError),
}

impl BringUpError {
    /// Stage at which the chain stopped.
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Config(_) => Stage::Config,
            Self::Power(e) => e.stage(),
            Self::Bus(e) => e.stage(),
            Self::Io(e) => e.stage(),
            Self::Driver(e) => e.stage,
        }
    }

    /// Status code of the failing call (`InvalidArg` for configuration).
    pub const fn status(&self) -> HalStatus {
        match self {
            Self::Config(_) => HalStatus::InvalidArg,
            Self::Power(e) => e.status,
            Self::Bus(e) => e.status,
            Self::Io(e) => e.status(),
            Self::Driver(e) => e.status,
        }
    }
}

impl From<ConfigError> for BringUpError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<PowerError> for BringUpError {
    fn from(e: PowerError) -> Self {
        Self::Power(e)
    }
}

impl From<BusError> for BringUpError {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

impl From<IoError> for BringUpError {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

impl From<DriverError> for BringUpError {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

impl core::fmt::Display for BringUpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{}: {e}", Stage::Config),
            Self::Power(e) => e.fmt(f),
            Self::Bus(e) => e.fmt(f),
            Self::Io(e) => e.fmt(f),
            Self::Driver(e) => e.fmt(f),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PowerError {}
#[cfg(feature = "std")]
impl std::error::Error for BusError {}
#[cfg(feature = "std")]
impl std::error::Error for IoError {}
#[cfg(feature = "std")]
impl std::error::Error for DriverError {}
#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
#[cfg(feature = "std")]
impl std::error::Error for BringUpError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_stage_order_matches_chain() {
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL, "Stage ordering must follow the chain");
    }

    #[test]
    fn test_power_error_format() {
        let e = PowerError {
            channel: 3,
            voltage_mv: 5000,
            status: HalStatus::InvalidArg,
        };
        assert_eq!(
            e.to_string(),
            "power-rail: LDO channel 3 at 5000 mV: ESP_ERR_INVALID_ARG (0x102)"
        );
    }

    #[test]
    fn test_io_error_width_maps_to_invalid_arg() {
        let e = IoError {
            cmd: Some(0x1FF),
            kind: IoErrorKind::CommandTooWide { cmd: 0x1FF, bits: 8 },
        };
        assert_eq!(e.status(), HalStatus::InvalidArg);
        assert!(e.to_string().contains("does not fit in 8 bits"));
    }

    #[test]
    fn test_driver_error_keeps_command_from_io() {
        let io = IoError {
            cmd: Some(0x29),
            kind: IoErrorKind::Host(HalStatus::Timeout),
        };
        let e = DriverError::from_io(Stage::PanelInit, io);
        assert_eq!(e.stage, Stage::PanelInit);
        assert_eq!(e.status, HalStatus::Timeout);
        assert_eq!(e.cmd, Some(0x29));
        assert_eq!(e.to_string(), "panel-init: command 0x29: ESP_ERR_TIMEOUT (0x107)");
    }

    #[test]
    fn test_bring_up_error_stage_and_status() {
        let e: BringUpError = BusError {
            bus_id: 0,
            status: HalStatus::NoMem,
        }
        .into();
        assert_eq!(e.stage(), Stage::BusTransport);
        assert_eq!(e.status(), HalStatus::NoMem);

        let e: BringUpError = ConfigError::LaneCount(5).into();
        assert_eq!(e.stage(), Stage::Config);
        assert_eq!(e.to_string(), "config: DSI lane count 5 outside 1..=4");
    }
}
