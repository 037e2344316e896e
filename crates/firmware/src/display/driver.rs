//! MIPI-DSI panel driver
//!
//! Generic over the controller protocol (see [`crate::display::panel`]) and
//! the board's reset line and delay source. The bring-up order is enforced
//! with typestate:
//!
//! ```text
//! Panel::construct() ──► Panel<Constructed>
//!        .reset()    ──► Panel<ResetDone>
//!        .init()     ──► Panel<Ready>  ──► DisplaySurface::create()
//! ```
//!
//! Attempting to init a panel that was never reset is a compile error:
//!
//! ```compile_fail
//! use firmware::display::driver::{Constructed, NoResetPin, Panel};
//! use platform::mocks::MockDsiHost;
//! use embedded_hal_mock::eh1::delay::NoopDelay;
//!
//! fn skip_reset(panel: Panel<MockDsiHost, NoResetPin, NoopDelay, Constructed>) {
//!     let _ = panel.init();
//! }
//! ```
//!
//! # Init sequence
//!
//! | Step | Command                | Source                      |
//! |------|------------------------|-----------------------------|
//! | 1    | MADCTL `0x36`          | colour order                |
//! | 2    | COLMOD `0x3A`          | pixel format                |
//! | 3    | vendor registers       | [`PanelProtocol::init_sequence`] |
//! | 4    | SLEEP OUT `0x11`       | + sleep-out settle          |
//! | 5    | DPI video stream start | [`PanelConfig::dpi_config`] |
//! | 6    | DISPLAY ON `0x29`      |                             |

use core::marker::PhantomData;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use platform::{ColorOrder, DsiHost, HalStatus, PixelFormat, VideoTiming};

use super::panel::{dcs, PanelModel, PanelProtocol};
use super::panel_io::PanelIo;
use crate::config::PanelConfig;
use crate::error::{DriverError, Stage};

mod sealed {
    pub trait Sealed {}
}

/// Bring-up state of a [`Panel`].
pub trait PanelState: sealed::Sealed {}

/// Driver built, panel not yet reset.
#[derive(Debug)]
pub struct Constructed;
/// Panel reset, not yet initialised.
#[derive(Debug)]
pub struct ResetDone;
/// Panel initialised and streaming video.
#[derive(Debug)]
pub struct Ready;

impl sealed::Sealed for Constructed {}
impl sealed::Sealed for ResetDone {}
impl sealed::Sealed for Ready {}
impl PanelState for Constructed {}
impl PanelState for ResetDone {}
impl PanelState for Ready {}

/// Placeholder reset line for boards without one.
///
/// Use `None::<NoResetPin>` to request a DCS soft reset.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResetPin;

impl embedded_hal::digital::ErrorType for NoResetPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for NoResetPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A panel controller in bring-up state `S`.
pub struct Panel<H, RST, D, S>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
    S: PanelState,
{
    io: PanelIo<H>,
    protocol: &'static dyn PanelProtocol,
    config: PanelConfig,
    reset_pin: Option<RST>,
    delay: D,
    _state: PhantomData<S>,
}

impl<H, RST, D> Panel<H, RST, D, Constructed>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
{
    /// Build the driver for `config.model` on an attached command channel.
    ///
    /// `bits_per_pixel` must agree with `config.pixel_format`, and the
    /// controller must support the bus lane count. No command is sent.
    pub fn construct(
        io: PanelIo<H>,
        config: &PanelConfig,
        bits_per_pixel: u8,
        reset_pin: Option<RST>,
        delay: D,
    ) -> Result<Self, DriverError> {
        let protocol = config.model.protocol();
        info!("Install {} LCD control panel", protocol.name());

        if bits_per_pixel != config.pixel_format.bits_per_pixel() {
            error!(
                "{}: {} bpp does not match pixel format ({} bpp)",
                protocol.name(),
                bits_per_pixel,
                config.pixel_format.bits_per_pixel()
            );
            return Err(DriverError::new(Stage::PanelConstruct, HalStatus::InvalidArg));
        }
        let lanes = io.bus().lane_count();
        if let Err(status) = protocol.supports(lanes, config.pixel_format) {
            error!(
                "New LCD panel {} failed: {} lanes / {} bpp: {}",
                protocol.name(),
                lanes,
                bits_per_pixel,
                status
            );
            return Err(DriverError::new(Stage::PanelConstruct, status));
        }

        Ok(Self {
            io,
            protocol,
            config: *config,
            reset_pin,
            delay,
            _state: PhantomData,
        })
    }

    /// Reset the controller.
    ///
    /// Pulses the reset line low when one is wired, otherwise sends the DCS
    /// soft-reset command. Either way waits the controller's settle time.
    pub fn reset(mut self) -> Result<Panel<H, RST, D, ResetDone>, DriverError> {
        let timing = self.protocol.reset_timing();
        if let Some(pin) = self.reset_pin.as_mut() {
            debug!("{}: hardware reset", self.protocol.name());
            pin.set_low()
                .map_err(|_| DriverError::new(Stage::PanelReset, HalStatus::Fail))?;
            self.delay.delay_ms(timing.assert_ms);
            pin.set_high()
                .map_err(|_| DriverError::new(Stage::PanelReset, HalStatus::Fail))?;
        } else {
            debug!("{}: soft reset", self.protocol.name());
            self.io
                .tx_param(dcs::SOFT_RESET, &[])
                .map_err(|e| DriverError::from_io(Stage::PanelReset, e))?;
        }
        self.delay.delay_ms(timing.settle_ms);
        Ok(self.into_state())
    }
}

impl<H, RST, D> Panel<H, RST, D, ResetDone>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
{
    /// Program pixel format, colour order and vendor registers, then start
    /// the video stream and switch the display on.
    pub fn init(mut self) -> Result<Panel<H, RST, D, Ready>, DriverError> {
        let name = self.protocol.name();
        let lanes = self.io.bus().lane_count();

        self.send(dcs::MADCTL, &[self.config.color_order.madctl()], 0)?;
        self.send(dcs::COLMOD, &[self.config.pixel_format.colmod()], 0)?;
        for command in self.protocol.init_sequence(lanes) {
            self.send(command.cmd, command.params, 0)?;
        }
        let settle = self.protocol.sleep_out_delay_ms();
        self.send(dcs::SLEEP_OUT, &[], settle)?;

        let dpi = self.config.dpi_config(self.io.virtual_channel());
        if let Err(status) = self.io.start_video(&dpi) {
            error!("{}: DPI start failed: {}", name, status);
            return Err(DriverError::new(Stage::PanelInit, status));
        }
        self.send(dcs::DISPLAY_ON, &[], 0)?;

        info!(
            "{} ready: {}x{} @ {} MHz",
            name, self.config.timing.h_size, self.config.timing.v_size, self.config.dpi_clock_mhz
        );
        Ok(self.into_state())
    }

    fn send(&mut self, cmd: u16, params: &[u8], delay_ms: u32) -> Result<(), DriverError> {
        if let Err(e) = self.io.tx_param(cmd, params) {
            error!("{}: LCD panel init failed: {}", self.protocol.name(), e);
            return Err(DriverError::from_io(Stage::PanelInit, e));
        }
        if delay_ms > 0 {
            self.delay.delay_ms(delay_ms);
        }
        Ok(())
    }
}

impl<H, RST, D, S> Panel<H, RST, D, S>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
    S: PanelState,
{
    fn into_state<T: PanelState>(self) -> Panel<H, RST, D, T> {
        Panel {
            io: self.io,
            protocol: self.protocol,
            config: self.config,
            reset_pin: self.reset_pin,
            delay: self.delay,
            _state: PhantomData,
        }
    }

    /// Controller part.
    pub fn model(&self) -> PanelModel {
        self.config.model
    }

    /// Controller name.
    pub fn name(&self) -> &'static str {
        self.protocol.name()
    }

    /// Pixel format on the wire.
    pub fn pixel_format(&self) -> PixelFormat {
        self.config.pixel_format
    }

    /// Sub-pixel order.
    pub fn color_order(&self) -> ColorOrder {
        self.config.color_order
    }

    /// Framebuffers allocated by the DPI controller.
    pub fn num_fbs(&self) -> u8 {
        self.config.num_fbs
    }

    /// Frame timing.
    pub fn timing(&self) -> &VideoTiming {
        &self.config.timing
    }

    /// Command channel the panel is driven through.
    pub fn io(&self) -> &PanelIo<H> {
        &self.io
    }
}

impl<H, RST, D, S> core::fmt::Debug for Panel<H, RST, D, S>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
    S: PanelState,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Panel")
            .field("model", &self.config.model)
            .field("io", &self.io)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::display::panel::ek79007;
    use crate::display::panel_io::tests::open_bus;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use platform::mocks::{DsiCall, DsiOp, MockDsiHost};

    /// Delay source that adds up everything it was asked to wait.
    #[derive(Default)]
    struct TotalDelay {
        total_ns: u64,
    }

    impl DelayNs for TotalDelay {
        #[allow(clippy::arithmetic_side_effects)]
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn panel_config() -> PanelConfig {
        BoardConfig::esp32_p4_function_ev().panel
    }

    fn io(host: &MockDsiHost) -> PanelIo<MockDsiHost> {
        PanelIo::attach(open_bus(host.clone()), 8, 8, 0).unwrap()
    }

    fn rst_pulse() -> PinMock {
        PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ])
    }

    #[test]
    fn test_construct_sends_nothing() {
        let host = MockDsiHost::new();
        let mut rst = PinMock::new(&[]);
        let panel = Panel::construct(io(&host), &panel_config(), 16, Some(rst.clone()), NoopDelay)
            .unwrap();
        assert_eq!(panel.name(), "EK79007");
        assert_eq!(panel.pixel_format(), PixelFormat::Rgb565);
        assert_eq!(host.count(DsiOp::AnyCommand), 0);
        rst.done();
    }

    #[test]
    fn test_construct_rejects_bpp_mismatch() {
        let host = MockDsiHost::new();
        let err = Panel::construct(io(&host), &panel_config(), 24, None::<NoResetPin>, NoopDelay)
            .unwrap_err();
        assert_eq!(err.stage, Stage::PanelConstruct);
        assert_eq!(err.status, HalStatus::InvalidArg);
    }

    #[test]
    fn test_construct_rejects_unsupported_lanes() {
        let host = MockDsiHost::new();
        let bus = {
            use crate::display::bus::BusTransport;
            use crate::power::PowerRailController;
            use platform::mocks::MockLdo;
            let power = PowerRailController::new(MockLdo::new()).enable(3, 2500).unwrap();
            BusTransport::new(host.clone())
                .open(
                    &power,
                    platform::DsiBusConfig {
                        bus_id: 0,
                        num_data_lanes: 3,
                        lane_bit_rate_mbps: 1000,
                        max_transfer_bytes: 0,
                    },
                )
                .unwrap()
        };
        let io = PanelIo::attach(bus, 8, 8, 0).unwrap();
        let err = Panel::construct(io, &panel_config(), 16, None::<NoResetPin>, NoopDelay)
            .unwrap_err();
        assert_eq!(err.status, HalStatus::NotSupported);
    }

    #[test]
    fn test_hardware_reset_pulses_pin() {
        let host = MockDsiHost::new();
        let mut rst = rst_pulse();
        let panel = Panel::construct(io(&host), &panel_config(), 16, Some(rst.clone()), NoopDelay)
            .unwrap();
        panel.reset().unwrap();
        assert_eq!(host.count(DsiOp::Command(dcs::SOFT_RESET)), 0);
        rst.done();
    }

    #[test]
    fn test_soft_reset_without_pin() {
        let host = MockDsiHost::new();
        let panel = Panel::construct(
            io(&host),
            &panel_config(),
            16,
            None::<NoResetPin>,
            TotalDelay::default(),
        )
        .unwrap();
        let panel = panel.reset().unwrap();
        assert_eq!(host.commands(), vec![(dcs::SOFT_RESET, vec![])]);
        assert_eq!(panel.delay.total_ns, 20_000_000, "EK79007 settles 20 ms after reset");
    }

    #[test]
    fn test_soft_reset_failure_is_a_reset_error() {
        let host = MockDsiHost::new().fail_on(DsiOp::Command(dcs::SOFT_RESET), HalStatus::Timeout);
        let panel = Panel::construct(io(&host), &panel_config(), 16, None::<NoResetPin>, NoopDelay)
            .unwrap();
        let err = panel.reset().unwrap_err();
        assert_eq!(err.stage, Stage::PanelReset);
        assert_eq!(err.status, HalStatus::Timeout);
        assert_eq!(err.cmd, Some(dcs::SOFT_RESET));
    }

    #[test]
    fn test_init_sequence_order() {
        let host = MockDsiHost::new();
        let mut rst = rst_pulse();
        let panel = Panel::construct(io(&host), &panel_config(), 16, Some(rst.clone()), NoopDelay)
            .unwrap()
            .reset()
            .unwrap()
            .init()
            .unwrap();

        let cmds: std::vec::Vec<u16> = host.commands().iter().map(|(c, _)| *c).collect();
        let expected: [u16; 12] = [
            dcs::MADCTL,
            dcs::COLMOD,
            0x80,
            0x81,
            0x82,
            0x83,
            0x84,
            0x85,
            0x86,
            ek79007::REG_LANE_SELECT,
            dcs::SLEEP_OUT,
            dcs::DISPLAY_ON,
        ];
        assert_eq!(cmds, expected);
        assert!(host.video_running());
        assert_eq!(panel.num_fbs(), 1);
        rst.done();
    }

    #[test]
    fn test_video_starts_between_sleep_out_and_display_on() {
        let host = MockDsiHost::new();
        Panel::construct(io(&host), &panel_config(), 16, None::<NoResetPin>, NoopDelay)
            .unwrap()
            .reset()
            .unwrap()
            .init()
            .unwrap();

        let calls = host.calls();
        let pos = |wanted: &DsiCall| calls.iter().position(|c| c == wanted).unwrap();
        let sleep_out = pos(&DsiCall::Command { channel: 0, cmd: dcs::SLEEP_OUT, params: vec![] });
        let display_on = pos(&DsiCall::Command {
            channel: 0,
            cmd: dcs::DISPLAY_ON,
            params: vec![],
        });
        let video = calls
            .iter()
            .position(|c| matches!(c, DsiCall::StartVideo(_)))
            .unwrap();
        assert!(sleep_out < video && video < display_on);

        match &calls[video] {
            DsiCall::StartVideo(dpi) => {
                assert_eq!(dpi.dpi_clock_mhz, 52);
                assert_eq!(dpi.pixel_format, PixelFormat::Rgb565);
                assert_eq!(dpi.timing.hsync_back_porch, 160);
                assert_eq!(dpi.timing.vsync_back_porch, 23);
            }
            other => panic!("expected StartVideo, got {other:?}"),
        }
    }

    #[test]
    fn test_init_writes_format_and_colour_order() {
        let host = MockDsiHost::new();
        let mut cfg = panel_config();
        cfg.pixel_format = PixelFormat::Rgb888;
        cfg.color_order = ColorOrder::Bgr;
        Panel::construct(io(&host), &cfg, 24, None::<NoResetPin>, NoopDelay)
            .unwrap()
            .reset()
            .unwrap()
            .init()
            .unwrap();
        let cmds = host.commands();
        assert!(cmds.contains(&(dcs::MADCTL, vec![0x08])));
        assert!(cmds.contains(&(dcs::COLMOD, vec![0x77])));
    }

    #[test]
    fn test_init_failure_stops_sequence() {
        let host = MockDsiHost::new().fail_on(DsiOp::Command(0x83), HalStatus::Timeout);
        let err = Panel::construct(io(&host), &panel_config(), 16, None::<NoResetPin>, NoopDelay)
            .unwrap()
            .reset()
            .unwrap()
            .init()
            .unwrap_err();
        assert_eq!(err.stage, Stage::PanelInit);
        assert_eq!(err.cmd, Some(0x83));
        assert_eq!(host.count(DsiOp::Command(dcs::SLEEP_OUT)), 0);
        assert_eq!(host.count(DsiOp::StartVideo), 0);
        assert!(!host.video_running());
    }

    #[test]
    fn test_video_start_failure() {
        let host = MockDsiHost::new().fail_on(DsiOp::StartVideo, HalStatus::NoMem);
        let err = Panel::construct(io(&host), &panel_config(), 16, None::<NoResetPin>, NoopDelay)
            .unwrap()
            .reset()
            .unwrap()
            .init()
            .unwrap_err();
        assert_eq!(err, DriverError::new(Stage::PanelInit, HalStatus::NoMem));
        assert_eq!(host.count(DsiOp::Command(dcs::DISPLAY_ON)), 0);
    }

    #[test]
    fn test_init_delays() {
        let host = MockDsiHost::new();
        let panel = Panel::construct(
            io(&host),
            &panel_config(),
            16,
            None::<NoResetPin>,
            TotalDelay::default(),
        )
        .unwrap()
        .reset()
        .unwrap()
        .init()
        .unwrap();
        // 20 ms reset settle + 120 ms sleep-out
        assert_eq!(panel.delay.total_ns, 140_000_000);
    }
}
