//! MIPI-DSI host abstraction
//!
//! The DSI host carries two kinds of traffic over the same lanes:
//!
//! ```text
//! DBI (command mode)  — register writes to the panel controller
//! DPI (video mode)    — continuous pixel stream framed by the video timing
//! ```
//!
//! [`DsiHost`] exposes exactly the calls the display bring-up needs, in the
//! order it needs them: open the bus, attach a DBI command IO, push
//! register writes, then program and start the DPI video stream.

use crate::HalStatus;

// ---------------------------------------------------------------------------
// Bus / IO configuration
// ---------------------------------------------------------------------------

/// Physical DSI bus parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DsiBusConfig {
    /// Host bus index.
    pub bus_id: u8,
    /// Number of data lanes (1–4).
    pub num_data_lanes: u8,
    /// Per-lane bit rate in Mbps.
    pub lane_bit_rate_mbps: u32,
    /// Largest single transfer the bus must accept, in bytes.
    pub max_transfer_bytes: u32,
}

/// DBI command-mode IO parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DbiIoConfig {
    /// DSI virtual channel the panel listens on (0–3).
    pub virtual_channel: u8,
    /// Width of a command field in bits.
    pub cmd_bits: u8,
    /// Width of a parameter field in bits.
    pub param_bits: u8,
}

// ---------------------------------------------------------------------------
// Pixel format / colour order
// ---------------------------------------------------------------------------

/// Pixel format of the DPI stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelFormat {
    /// 16 bpp, 5-6-5.
    Rgb565,
    /// 18 bpp, 6-6-6 (loosely packed in 24 bits on the wire).
    Rgb666,
    /// 24 bpp, 8-8-8.
    Rgb888,
}

impl PixelFormat {
    /// Bits per pixel as seen by the panel controller.
    pub const fn bits_per_pixel(self) -> u8 {
        match self {
            Self::Rgb565 => 16,
            Self::Rgb666 => 18,
            Self::Rgb888 => 24,
        }
    }

    /// DCS `COLMOD` (0x3A) parameter for this format.
    pub const fn colmod(self) -> u8 {
        match self {
            Self::Rgb565 => 0x55,
            Self::Rgb666 => 0x66,
            Self::Rgb888 => 0x77,
        }
    }

    /// Bytes one pixel occupies in the framebuffer.
    pub const fn bytes_per_pixel(self) -> u8 {
        match self {
            Self::Rgb565 => 2,
            Self::Rgb666 | Self::Rgb888 => 3,
        }
    }

    /// Pixel format matching a bits-per-pixel value, if any.
    pub const fn from_bits_per_pixel(bpp: u8) -> Option<Self> {
        match bpp {
            16 => Some(Self::Rgb565),
            18 => Some(Self::Rgb666),
            24 => Some(Self::Rgb888),
            _ => None,
        }
    }
}

/// Order of the colour elements on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorOrder {
    /// Red, green, blue.
    #[default]
    Rgb,
    /// Blue, green, red.
    Bgr,
}

impl ColorOrder {
    /// DCS `MADCTL` (0x36) parameter selecting this order.
    pub const fn madctl(self) -> u8 {
        match self {
            Self::Rgb => 0x00,
            Self::Bgr => 0x08,
        }
    }
}

// ---------------------------------------------------------------------------
// Video timing
// ---------------------------------------------------------------------------

/// DPI video timing.
///
/// Built with the same chained style as the vendor SDK wrappers:
///
/// ```
/// use platform::VideoTiming;
///
/// let timing = VideoTiming::new(1024, 600)
///     .hsync_pulse_width(10)
///     .hsync_back_porch(160)
///     .hsync_front_porch(160)
///     .vsync_pulse_width(1)
///     .vsync_back_porch(23)
///     .vsync_front_porch(12);
/// assert_eq!(timing.h_total(), Some(1354));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoTiming {
    /// Active pixels per line.
    pub h_size: u32,
    /// Active lines per frame.
    pub v_size: u32,
    /// HSYNC pulse width in pixel clocks.
    pub hsync_pulse_width: u32,
    /// Horizontal back porch in pixel clocks.
    pub hsync_back_porch: u32,
    /// Horizontal front porch in pixel clocks.
    pub hsync_front_porch: u32,
    /// VSYNC pulse width in lines.
    pub vsync_pulse_width: u32,
    /// Vertical back porch in lines.
    pub vsync_back_porch: u32,
    /// Vertical front porch in lines.
    pub vsync_front_porch: u32,
}

impl VideoTiming {
    /// Timing with the given active area and all sync/porch values zero.
    pub const fn new(h_size: u32, v_size: u32) -> Self {
        Self {
            h_size,
            v_size,
            hsync_pulse_width: 0,
            hsync_back_porch: 0,
            hsync_front_porch: 0,
            vsync_pulse_width: 0,
            vsync_back_porch: 0,
            vsync_front_porch: 0,
        }
    }

    /// Set the HSYNC pulse width.
    #[must_use]
    pub const fn hsync_pulse_width(mut self, value: u32) -> Self {
        self.hsync_pulse_width = value;
        self
    }

    /// Set the horizontal back porch.
    #[must_use]
    pub const fn hsync_back_porch(mut self, value: u32) -> Self {
        self.hsync_back_porch = value;
        self
    }

    /// Set the horizontal front porch.
    #[must_use]
    pub const fn hsync_front_porch(mut self, value: u32) -> Self {
        self.hsync_front_porch = value;
        self
    }

    /// Set the VSYNC pulse width.
    #[must_use]
    pub const fn vsync_pulse_width(mut self, value: u32) -> Self {
        self.vsync_pulse_width = value;
        self
    }

    /// Set the vertical back porch.
    #[must_use]
    pub const fn vsync_back_porch(mut self, value: u32) -> Self {
        self.vsync_back_porch = value;
        self
    }

    /// Set the vertical front porch.
    #[must_use]
    pub const fn vsync_front_porch(mut self, value: u32) -> Self {
        self.vsync_front_porch = value;
        self
    }

    /// Total pixel clocks per line (active + sync + porches).
    ///
    /// `None` on overflow.
    pub fn h_total(&self) -> Option<u32> {
        self.h_size
            .checked_add(self.hsync_pulse_width)?
            .checked_add(self.hsync_back_porch)?
            .checked_add(self.hsync_front_porch)
    }

    /// Total lines per frame (active + sync + porches).
    ///
    /// `None` on overflow.
    pub fn v_total(&self) -> Option<u32> {
        self.v_size
            .checked_add(self.vsync_pulse_width)?
            .checked_add(self.vsync_back_porch)?
            .checked_add(self.vsync_front_porch)
    }

    /// Frame rate in millihertz for the given pixel clock.
    ///
    /// `None` if the totals overflow or are zero.
    pub fn refresh_millihz(&self, pixel_clock_mhz: u32) -> Option<u32> {
        let frame = u64::from(self.h_total()?).checked_mul(u64::from(self.v_total()?))?;
        let clock_millihz = u64::from(pixel_clock_mhz).checked_mul(1_000_000_000)?;
        let rate = clock_millihz.checked_div(frame)?;
        u32::try_from(rate).ok()
    }
}

/// Everything the DPI controller needs to start the video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DpiPanelConfig {
    /// Virtual channel of the video stream.
    pub virtual_channel: u8,
    /// DPI pixel clock in MHz.
    pub dpi_clock_mhz: u32,
    /// Pixel format of the stream.
    pub pixel_format: PixelFormat,
    /// Number of framebuffers the controller allocates.
    pub num_fbs: u8,
    /// Frame timing.
    pub timing: VideoTiming,
    /// Use the 2D-DMA engine for framebuffer copies.
    pub use_dma2d: bool,
}

// ---------------------------------------------------------------------------
// Host trait
// ---------------------------------------------------------------------------

/// MIPI-DSI host controller.
///
/// Calls block until the hardware operation completes. Implementations must
/// reject calls made out of order (e.g. a DBI write before a bus exists)
/// with [`HalStatus::InvalidState`].
pub trait DsiHost {
    /// Bring up the DSI PHY and bus.
    fn new_bus(&mut self, config: &DsiBusConfig) -> Result<(), HalStatus>;

    /// Attach a DBI command IO to the open bus.
    fn new_dbi_io(&mut self, config: &DbiIoConfig) -> Result<(), HalStatus>;

    /// Send one command and its parameters on `virtual_channel`.
    fn write_command(
        &mut self,
        virtual_channel: u8,
        cmd: u16,
        params: &[u8],
    ) -> Result<(), HalStatus>;

    /// Program the DPI controller and start streaming video.
    fn start_video(&mut self, config: &DpiPanelConfig) -> Result<(), HalStatus>;
}
