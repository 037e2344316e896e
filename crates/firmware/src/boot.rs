//! Display bring-up sequence
//!
//! Runs the display chain once, in order, and stops at the first failure:
//!
//! | # | Stage            | Call                                   | Produces        |
//! |---|------------------|----------------------------------------|-----------------|
//! | 0 | `config`         | [`BoardConfig::validate`]              | —               |
//! | 1 | `power-rail`     | [`PowerRailController::enable`]        | [`PowerChannel`] |
//! | 2 | `bus-transport`  | [`BusTransport::open`]                 | `BusHandle`     |
//! | 3 | `panel-io`       | [`PanelIo::attach`]                    | [`PanelIo`]     |
//! | 4 | `panel-construct`| [`Panel::construct`]                   | `Panel<Constructed>` |
//! | 5 | `panel-reset`    | [`Panel::reset`]                       | `Panel<ResetDone>` |
//! | 6 | `panel-init`     | [`Panel::init`]                        | `Panel<Ready>`  |
//! | 7 | `surface`        | [`DisplaySurface::create`]             | [`DisplaySurface`] |
//!
//! Each stage consumes the previous stage's output, so a later stage cannot
//! run after an earlier one failed. Nothing is retried. The power channel is
//! kept even when a later stage fails: the rail stays claimed for the rest of
//! the boot cycle.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;
use platform::{DsiHost, LdoRegulator};

use crate::config::BoardConfig;
use crate::display::{BusTransport, DisplayFonts, DisplaySurface, Panel, PanelIo};
use crate::error::{BringUpError, Stage};
use crate::power::{PowerChannel, PowerRailController};

/// Which stages ran, and where the chain stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootReport {
    completed: Vec<Stage, { Stage::COUNT }>,
    failed: Option<Stage>,
}

impl BootReport {
    /// Empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages that succeeded, in execution order.
    pub fn completed(&self) -> &[Stage] {
        &self.completed
    }

    /// Stage that failed, if any.
    pub fn failed(&self) -> Option<Stage> {
        self.failed
    }

    /// Whether `stage` succeeded.
    pub fn has_completed(&self, stage: Stage) -> bool {
        self.completed.contains(&stage)
    }

    /// Whether every stage succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_none() && self.completed.len() == Stage::COUNT
    }

    fn complete(&mut self, stage: Stage) {
        debug!("Bring-up stage {} done", stage);
        // One slot per stage; each stage completes at most once.
        let _ = self.completed.push(stage);
    }

    fn fail(&mut self, stage: Stage) {
        self.failed = Some(stage);
    }
}

/// Hardware handed to the display chain.
pub struct DisplayHardware<L, H, RST, D> {
    /// Regulator feeding the DSI PHY.
    pub ldo: L,
    /// DSI host controller.
    pub host: H,
    /// Panel reset line; `None` uses a DCS soft reset.
    pub reset_pin: Option<RST>,
    /// Delay source for reset and init timing.
    pub delay: D,
}

/// Result of [`bring_up_display`].
pub struct DisplayBringUp<H, RST, D>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
{
    /// LDO channel, if the power stage succeeded.
    pub power: Option<PowerChannel>,
    /// The live surface, or the error that stopped the chain.
    pub display: Result<DisplaySurface<H, RST, D>, BringUpError>,
    /// Stage log.
    pub report: BootReport,
}

/// Run the display chain described by `config` on `hw`.
///
/// Never panics and never returns a partially built display: either every
/// stage succeeded and `display` is `Ok`, or `display` holds the error of the
/// first failing stage and nothing after it was invoked.
pub fn bring_up_display<L, H, RST, D>(
    config: &BoardConfig,
    hw: DisplayHardware<L, H, RST, D>,
    fonts: DisplayFonts,
) -> DisplayBringUp<H, RST, D>
where
    L: LdoRegulator,
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
{
    info!("Display bring-up: {} panel", config.panel.model);
    let mut report = BootReport::new();
    let mut power = None;

    let display = run_chain(config, hw, fonts, &mut power, &mut report);
    match &display {
        Ok(surface) => info!(
            "Display bring-up complete: {}x{}",
            surface.width(),
            surface.height()
        ),
        Err(err) => {
            report.fail(err.stage());
            error!("Display bring-up aborted at {}: {}", err.stage(), err);
        }
    }

    DisplayBringUp {
        power,
        display,
        report,
    }
}

fn run_chain<L, H, RST, D>(
    config: &BoardConfig,
    hw: DisplayHardware<L, H, RST, D>,
    fonts: DisplayFonts,
    power: &mut Option<PowerChannel>,
    report: &mut BootReport,
) -> Result<DisplaySurface<H, RST, D>, BringUpError>
where
    L: LdoRegulator,
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
{
    config.validate()?;
    config.display.check_reset_line(hw.reset_pin.is_some())?;
    report.complete(Stage::Config);

    let channel = PowerRailController::new(hw.ldo)
        .enable(config.power.ldo_channel, config.power.ldo_voltage_mv)?;
    let channel = power.insert(channel);
    report.complete(Stage::PowerRail);

    let bus = BusTransport::new(hw.host).open(channel, config.dsi.bus_config())?;
    report.complete(Stage::BusTransport);

    let io = PanelIo::attach(
        bus,
        config.panel_io.cmd_bits,
        config.panel_io.param_bits,
        config.panel_io.virtual_channel,
    )?;
    report.complete(Stage::PanelIo);

    let panel = Panel::construct(
        io,
        &config.panel,
        config.panel.bits_per_pixel(),
        hw.reset_pin,
        hw.delay,
    )?;
    report.complete(Stage::PanelConstruct);

    let panel = panel.reset()?;
    report.complete(Stage::PanelReset);

    let panel = panel.init()?;
    report.complete(Stage::PanelInit);

    let surface = DisplaySurface::create(panel, &config.display, fonts);
    report.complete(Stage::Surface);

    Ok(surface)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::display::NoResetPin;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use platform::mocks::{DsiOp, MockDsiHost, MockLdo};
    use platform::HalStatus;

    fn hardware(
        ldo: MockLdo,
        host: MockDsiHost,
    ) -> DisplayHardware<MockLdo, MockDsiHost, NoResetPin, NoopDelay> {
        DisplayHardware {
            ldo,
            host,
            reset_pin: None,
            delay: NoopDelay::new(),
        }
    }

    #[test]
    fn test_preset_brings_up_every_stage() {
        let host = MockDsiHost::new();
        let out = bring_up_display(
            &BoardConfig::esp32_p4_function_ev(),
            hardware(MockLdo::new(), host.clone()),
            DisplayFonts::default(),
        );
        let surface = out.display.unwrap();
        assert_eq!((surface.width(), surface.height()), (1024, 600));
        assert_eq!(out.report.completed(), &Stage::ALL[..]);
        assert!(out.report.is_complete());
        assert_eq!(out.power.unwrap().voltage_mv(), 2500);
        assert!(host.video_running());
    }

    #[test]
    fn test_bus_failure_keeps_power_channel() {
        let host = MockDsiHost::new().fail_on(DsiOp::NewBus, HalStatus::NoMem);
        let out = bring_up_display(
            &BoardConfig::esp32_p4_function_ev(),
            hardware(MockLdo::new(), host.clone()),
            DisplayFonts::default(),
        );
        let Err(err) = out.display else {
            panic!("bus failure must leave no display");
        };
        assert_eq!(err.stage(), Stage::BusTransport);
        assert_eq!(err.status(), HalStatus::NoMem);
        assert!(out.power.is_some(), "rail stays claimed");
        assert_eq!(out.report.failed(), Some(Stage::BusTransport));
        assert_eq!(out.report.completed(), &[Stage::Config, Stage::PowerRail][..]);
        assert_eq!(host.count(DsiOp::NewDbiIo), 0);
    }

    #[test]
    fn test_invalid_config_touches_nothing() {
        let mut config = BoardConfig::esp32_p4_function_ev();
        config.dsi.num_data_lanes = 0;
        let ldo = MockLdo::new();
        let host = MockDsiHost::new();
        let out = bring_up_display(
            &config,
            hardware(ldo.clone(), host.clone()),
            DisplayFonts::default(),
        );
        assert!(out.display.is_err());
        assert!(out.power.is_none());
        assert!(out.report.completed().is_empty());
        assert_eq!(out.report.failed(), Some(Stage::Config));
        assert!(ldo.requests().is_empty());
        assert!(host.calls().is_empty());
    }

    struct IdlePin;

    impl embedded_hal::digital::ErrorType for IdlePin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for IdlePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_reset_line_without_config_is_rejected() {
        let ldo = MockLdo::new();
        let host = MockDsiHost::new();
        let out = bring_up_display(
            &BoardConfig::esp32_p4_function_ev(),
            DisplayHardware {
                ldo: ldo.clone(),
                host: host.clone(),
                reset_pin: Some(IdlePin),
                delay: NoopDelay::new(),
            },
            DisplayFonts::default(),
        );
        let Err(BringUpError::Config(err)) = out.display else {
            panic!("unconfigured reset pin must be rejected");
        };
        assert_eq!(err, crate::error::ConfigError::ResetPinMismatch { configured: false });
        assert!(ldo.requests().is_empty());
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_report_default_is_empty() {
        let report = BootReport::new();
        assert!(!report.is_complete());
        assert!(!report.has_completed(Stage::Config));
        assert_eq!(report.failed(), None);
    }
}
