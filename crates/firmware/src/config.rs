//! Board configuration
//!
//! One layered, plain-data object describes everything bring-up needs. It is
//! validated once before any hardware is touched; afterwards every stage
//! takes its own slice of it.
//!
//! # Reference board (ESP32-P4 Function EV)
//!
//! | Block       | Setting                                   |
//! |-------------|-------------------------------------------|
//! | DSI PHY LDO | channel 3, 2500 mV                        |
//! | DSI bus     | bus 0, 2 lanes, 1000 Mbps/lane            |
//! | DBI IO      | virtual channel 0, 8-bit cmd, 8-bit param |
//! | Panel       | EK79007, RGB565, 1024×600, DPI 52 MHz     |
//! | Timing      | H 10/160/160, V 1/23/12 (pulse/back/front)|
//! | Codec       | ES8311 @ 0x18, 24 kHz in/out, PA GPIO53   |
//!
//! # Pin Assignments
//!
//! | Function      | GPIO |
//! |---------------|------|
//! | LCD_RST       | —    |
//! | LCD_BL (PWM)  | 26   |
//! | I2S_MCLK      | 13   |
//! | I2S_BCLK      | 12   |
//! | I2S_WS        | 10   |
//! | I2S_DOUT      | 9    |
//! | I2S_DIN       | 11   |
//! | CODEC_PA      | 53   |
//! | BOOT button   | 35   |
//!
//! The panel reset line is not routed on this board; the driver falls back
//! to a DCS soft reset.

use platform::{
    ColorOrder, DbiIoConfig, DpiPanelConfig, DsiBusConfig, LdoChannelConfig, PixelFormat,
    VideoTiming,
};

use crate::display::panel::PanelModel;
use crate::error::ConfigError;

/// LDO channel feeding the DSI PHY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerConfig {
    /// Regulator channel.
    pub ldo_channel: u8,
    /// Channel voltage in millivolts.
    pub ldo_voltage_mv: u16,
}

impl PowerConfig {
    /// Regulator request for this channel.
    pub const fn ldo_config(&self) -> LdoChannelConfig {
        LdoChannelConfig {
            chan_id: self.ldo_channel,
            voltage_mv: self.ldo_voltage_mv,
        }
    }
}

/// MIPI-DSI bus parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DsiConfig {
    /// DSI bus number.
    pub bus_id: u8,
    /// Data lanes in use (1..=4).
    pub num_data_lanes: u8,
    /// Per-lane bit rate in Mbps.
    pub lane_bit_rate_mbps: u32,
    /// Largest single transfer in bytes (0 = host default).
    pub max_transfer_bytes: u32,
}

impl DsiConfig {
    /// Host bus request.
    pub const fn bus_config(&self) -> DsiBusConfig {
        DsiBusConfig {
            bus_id: self.bus_id,
            num_data_lanes: self.num_data_lanes,
            lane_bit_rate_mbps: self.lane_bit_rate_mbps,
            max_transfer_bytes: self.max_transfer_bytes,
        }
    }
}

/// DBI command channel parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanelIoConfig {
    /// Virtual channel for commands and video.
    pub virtual_channel: u8,
    /// Command field width in bits (8 or 16).
    pub cmd_bits: u8,
    /// Parameter field width in bits (8).
    pub param_bits: u8,
}

impl PanelIoConfig {
    /// Host IO request.
    pub const fn dbi_config(&self) -> DbiIoConfig {
        DbiIoConfig {
            virtual_channel: self.virtual_channel,
            cmd_bits: self.cmd_bits,
            param_bits: self.param_bits,
        }
    }
}

/// Panel controller and video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanelConfig {
    /// Controller part; selects the init protocol.
    pub model: PanelModel,
    /// Pixel format on the wire.
    pub pixel_format: PixelFormat,
    /// Sub-pixel order.
    pub color_order: ColorOrder,
    /// Framebuffers allocated by the DPI controller (1..=3).
    pub num_fbs: u8,
    /// DPI pixel clock in MHz.
    pub dpi_clock_mhz: u32,
    /// Frame timing.
    pub timing: VideoTiming,
    /// Use 2D-DMA for framebuffer copies.
    pub use_dma2d: bool,
}

impl PanelConfig {
    /// Bits per pixel of the configured format.
    pub const fn bits_per_pixel(&self) -> u8 {
        self.pixel_format.bits_per_pixel()
    }

    /// DPI controller request on `virtual_channel`.
    pub const fn dpi_config(&self, virtual_channel: u8) -> DpiPanelConfig {
        DpiPanelConfig {
            virtual_channel,
            dpi_clock_mhz: self.dpi_clock_mhz,
            pixel_format: self.pixel_format,
            num_fbs: self.num_fbs,
            timing: self.timing,
            use_dma2d: self.use_dma2d,
        }
    }
}

/// Logical display geometry and board wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayConfig {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Horizontal offset of the visible area.
    pub offset_x: i16,
    /// Vertical offset of the visible area.
    pub offset_y: i16,
    /// Mirror along the X axis.
    pub mirror_x: bool,
    /// Mirror along the Y axis.
    pub mirror_y: bool,
    /// Swap X and Y axes.
    pub swap_xy: bool,
    /// Panel reset GPIO; `None` falls back to a DCS soft reset.
    pub reset_pin: Option<u8>,
    /// Backlight PWM GPIO, if the backlight is dimmable.
    pub backlight_pin: Option<u8>,
    /// Backlight driver is active-low.
    pub backlight_invert: bool,
}

impl DisplayConfig {
    /// Check that a reset line was supplied exactly when one is configured.
    pub fn check_reset_line(&self, pin_supplied: bool) -> Result<(), ConfigError> {
        let configured = self.reset_pin.is_some();
        if configured == pin_supplied {
            Ok(())
        } else {
            Err(ConfigError::ResetPinMismatch { configured })
        }
    }
}

/// I2S pins of the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct I2sPins {
    /// Master clock.
    pub mclk: u8,
    /// Bit clock.
    pub bclk: u8,
    /// Word select.
    pub ws: u8,
    /// Data out (to codec DAC).
    pub dout: u8,
    /// Data in (from codec ADC).
    pub din: u8,
}

/// Audio codec and power amplifier.
///
/// GPIO numbers and I2S wiring describe the board for the HAL that hands out
/// the pins; [`Es8311Output::from_config`](crate::audio::Es8311Output::from_config)
/// reads the codec address and output volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AudioConfig {
    /// Microphone sample rate in Hz.
    pub input_sample_rate: u32,
    /// Speaker sample rate in Hz.
    pub output_sample_rate: u32,
    /// Codec 7-bit I2C address.
    pub codec_address: u8,
    /// Power amplifier enable GPIO. Shared with the display on this board.
    pub pa_pin: Option<u8>,
    /// I2S wiring.
    pub i2s: I2sPins,
    /// Feed MCLK to the codec.
    pub use_mclk: bool,
    /// Output volume applied on enable (0–100).
    pub output_volume: u8,
}

/// Complete board configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardConfig {
    /// DSI PHY power.
    pub power: PowerConfig,
    /// DSI bus.
    pub dsi: DsiConfig,
    /// DBI command channel.
    pub panel_io: PanelIoConfig,
    /// Panel controller.
    pub panel: PanelConfig,
    /// Display geometry.
    pub display: DisplayConfig,
    /// Audio path.
    pub audio: AudioConfig,
    /// BOOT button GPIO.
    pub boot_button_pin: u8,
}

impl BoardConfig {
    /// ESP32-P4 Function EV board with the 7" EK79007 panel.
    pub const fn esp32_p4_function_ev() -> Self {
        const WIDTH: u16 = 1024;
        const HEIGHT: u16 = 600;
        Self {
            power: PowerConfig {
                ldo_channel: 3,
                ldo_voltage_mv: 2500,
            },
            dsi: DsiConfig {
                bus_id: 0,
                num_data_lanes: 2,
                lane_bit_rate_mbps: 1000,
                max_transfer_bytes: 0,
            },
            panel_io: PanelIoConfig {
                virtual_channel: 0,
                cmd_bits: 8,
                param_bits: 8,
            },
            panel: PanelConfig {
                model: PanelModel::Ek79007,
                pixel_format: PixelFormat::Rgb565,
                color_order: ColorOrder::Rgb,
                num_fbs: 1,
                dpi_clock_mhz: 52,
                timing: VideoTiming::new(WIDTH as u32, HEIGHT as u32)
                    .hsync_pulse_width(10)
                    .hsync_back_porch(160)
                    .hsync_front_porch(160)
                    .vsync_pulse_width(1)
                    .vsync_back_porch(23)
                    .vsync_front_porch(12),
                use_dma2d: true,
            },
            display: DisplayConfig {
                width: WIDTH,
                height: HEIGHT,
                offset_x: 0,
                offset_y: 0,
                mirror_x: false,
                mirror_y: false,
                swap_xy: false,
                reset_pin: None,
                backlight_pin: Some(26),
                backlight_invert: false,
            },
            audio: AudioConfig {
                input_sample_rate: 24_000,
                output_sample_rate: 24_000,
                codec_address: crate::audio::es8311::ES8311_I2C_ADDR,
                pa_pin: Some(53),
                i2s: I2sPins {
                    mclk: 13,
                    bclk: 12,
                    ws: 10,
                    dout: 9,
                    din: 11,
                },
                use_mclk: true,
                output_volume: 70,
            },
            boot_button_pin: 35,
        }
    }

    /// Check every field bring-up depends on.
    ///
    /// Reports the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::ZeroGeometry);
        }
        if !(1..=4).contains(&self.dsi.num_data_lanes) {
            return Err(ConfigError::LaneCount(self.dsi.num_data_lanes));
        }
        if self.dsi.lane_bit_rate_mbps == 0 {
            return Err(ConfigError::ZeroLaneRate);
        }
        if !matches!(self.panel_io.cmd_bits, 8 | 16) {
            return Err(ConfigError::CommandBits(self.panel_io.cmd_bits));
        }
        if self.panel_io.param_bits != 8 {
            return Err(ConfigError::ParamBits(self.panel_io.param_bits));
        }
        if !(1..=3).contains(&self.panel.num_fbs) {
            return Err(ConfigError::FramebufferCount(self.panel.num_fbs));
        }
        if self.panel.dpi_clock_mhz == 0 {
            return Err(ConfigError::ZeroDpiClock);
        }
        let timing = &self.panel.timing;
        if timing.h_size == 0
            || timing.v_size == 0
            || timing.h_total().is_none()
            || timing.v_total().is_none()
        {
            return Err(ConfigError::VideoTiming);
        }
        let (active_w, active_h) = if self.display.swap_xy {
            (timing.v_size, timing.h_size)
        } else {
            (timing.h_size, timing.v_size)
        };
        if u32::from(self.display.width) != active_w || u32::from(self.display.height) != active_h {
            return Err(ConfigError::GeometryMismatch {
                width: self.display.width,
                height: self.display.height,
                h_size: timing.h_size,
                v_size: timing.v_size,
            });
        }
        if self.audio.input_sample_rate == 0 || self.audio.output_sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::esp32_p4_function_ev()
    }
}
