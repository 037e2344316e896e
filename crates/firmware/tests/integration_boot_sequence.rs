//! Integration test: runs the display bring-up chain against mock hardware.
//!
//! Tests that:
//!   1. The reference preset brings every stage up, in order
//!   2. A failure at stage k stops the chain: no later stage touches hardware,
//!      and no display is handed out
//!   3. A 5000 mV request on a 0-3300 mV regulator never opens the DSI bus
//!   4. A panel whose reset succeeded but whose init failed never reaches
//!      surface creation
//!   5. An invalid configuration is rejected before the regulator is touched
//!   6. Capability registration follows the display outcome
//!
//! Does NOT require physical hardware.
//!
//! Run with: cargo test -p firmware --test integration_boot_sequence

// Integration test file -- intentional test patterns permitted.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation,
    clippy::arithmetic_side_effects,
)]

use embedded_hal_mock::eh1::delay::NoopDelay;
use firmware::audio::MockAmp;
use firmware::board::Board;
use firmware::boot::{bring_up_display, DisplayBringUp, DisplayHardware};
use firmware::config::BoardConfig;
use firmware::display::{DisplayFonts, NoResetPin};
use firmware::error::{BringUpError, ConfigError, Stage};
use platform::mocks::{DsiOp, MockDsiHost, MockInput, MockLdo, MockRegistry};
use platform::HalStatus;

// -- Mock reset line --------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PinFault;

impl embedded_hal::digital::Error for PinFault {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// Reset GPIO that can be told to fail.
#[derive(Default)]
struct MockResetPin {
    broken: bool,
}

impl embedded_hal::digital::ErrorType for MockResetPin {
    type Error = PinFault;
}

impl embedded_hal::digital::OutputPin for MockResetPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.broken {
            return Err(PinFault);
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.broken {
            return Err(PinFault);
        }
        Ok(())
    }
}

// -- Mock backlight PWM -----------------------------------------------------

struct NullPwm;

impl embedded_hal::pwm::ErrorType for NullPwm {
    type Error = core::convert::Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for NullPwm {
    fn max_duty_cycle(&self) -> u16 {
        100
    }

    fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> {
        Ok(())
    }
}

// -- Helpers ----------------------------------------------------------------

fn run(
    config: &BoardConfig,
    ldo: MockLdo,
    host: MockDsiHost,
) -> DisplayBringUp<MockDsiHost, NoResetPin, NoopDelay> {
    bring_up_display(
        config,
        DisplayHardware {
            ldo,
            host,
            reset_pin: None,
            delay: NoopDelay::new(),
        },
        DisplayFonts::default(),
    )
}

/// Preset with the panel reset GPIO routed.
fn wired_reset_config() -> BoardConfig {
    let mut config = BoardConfig::esp32_p4_function_ev();
    config.display.reset_pin = Some(27);
    config
}

/// Assert the chain stopped at `stage` with nothing after it recorded.
fn assert_stopped_at(out: &DisplayBringUp<MockDsiHost, NoResetPin, NoopDelay>, stage: Stage) {
    let err = out.display.as_ref().err().expect("display must be absent");
    assert_eq!(err.stage(), stage);
    assert_eq!(out.report.failed(), Some(stage));
    assert_eq!(out.report.completed(), &Stage::ALL[..stage as usize]);
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[test]
fn test_preset_runs_every_stage_in_order() {
    let ldo = MockLdo::new();
    let host = MockDsiHost::new();
    let out = run(&BoardConfig::esp32_p4_function_ev(), ldo.clone(), host.clone());

    assert!(out.display.is_ok());
    assert_eq!(out.report.completed(), &Stage::ALL[..]);
    assert_eq!(ldo.requests().len(), 1);
    assert!(ldo.is_claimed(3));
    assert_eq!(host.count(DsiOp::NewBus), 1);
    assert_eq!(host.count(DsiOp::NewDbiIo), 1);
    assert_eq!(host.count(DsiOp::StartVideo), 1);
    assert_eq!(host.commands().last().map(|(cmd, _)| *cmd), Some(0x29));
}

#[test]
fn test_reset_line_replaces_soft_reset() {
    let host = MockDsiHost::new();
    let out = bring_up_display(
        &wired_reset_config(),
        DisplayHardware {
            ldo: MockLdo::new(),
            host: host.clone(),
            reset_pin: Some(MockResetPin::default()),
            delay: NoopDelay::new(),
        },
        DisplayFonts::default(),
    );
    assert!(out.display.is_ok());
    assert_eq!(
        host.count(DsiOp::Command(0x01)),
        0,
        "no soft reset when a reset line is wired"
    );
}

// ---------------------------------------------------------------------------
// Fail-fast per stage
// ---------------------------------------------------------------------------

#[test]
fn test_power_rail_failure_never_opens_bus() {
    let mut config = BoardConfig::esp32_p4_function_ev();
    config.power.ldo_voltage_mv = 5000;
    let ldo = MockLdo::with_range(0, 3300);
    let host = MockDsiHost::new();

    let out = run(&config, ldo.clone(), host.clone());

    assert_stopped_at(&out, Stage::PowerRail);
    assert_eq!(
        out.display.as_ref().err().map(BringUpError::status),
        Some(HalStatus::InvalidArg)
    );
    assert!(out.power.is_none());
    assert_eq!(ldo.requests().len(), 1);
    assert_eq!(host.count(DsiOp::NewBus), 0, "bus must never be opened");
    assert!(host.calls().is_empty());
}

#[test]
fn test_claimed_channel_is_power_failure() {
    let host = MockDsiHost::new();
    let out = run(
        &BoardConfig::esp32_p4_function_ev(),
        MockLdo::new().pre_claim(3),
        host.clone(),
    );
    assert_stopped_at(&out, Stage::PowerRail);
    assert_eq!(
        out.display.as_ref().err().map(BringUpError::status),
        Some(HalStatus::InvalidState)
    );
    assert!(host.calls().is_empty());
}

#[test]
fn test_bus_failure_stops_before_panel_io() {
    let host = MockDsiHost::new().fail_on(DsiOp::NewBus, HalStatus::NoMem);
    let out = run(&BoardConfig::esp32_p4_function_ev(), MockLdo::new(), host.clone());
    assert_stopped_at(&out, Stage::BusTransport);
    assert!(out.power.is_some(), "rail is never released");
    assert_eq!(host.count(DsiOp::NewDbiIo), 0);
    assert_eq!(host.count(DsiOp::AnyCommand), 0);
}

#[test]
fn test_panel_io_failure_sends_no_command() {
    let host = MockDsiHost::new().fail_on(DsiOp::NewDbiIo, HalStatus::NoMem);
    let out = run(&BoardConfig::esp32_p4_function_ev(), MockLdo::new(), host.clone());
    assert_stopped_at(&out, Stage::PanelIo);
    assert_eq!(host.count(DsiOp::AnyCommand), 0);
    assert_eq!(host.count(DsiOp::StartVideo), 0);
}

#[test]
fn test_unsupported_lane_count_fails_construct() {
    let mut config = BoardConfig::esp32_p4_function_ev();
    config.dsi.num_data_lanes = 3;
    let host = MockDsiHost::new();
    let out = run(&config, MockLdo::new(), host.clone());
    assert_stopped_at(&out, Stage::PanelConstruct);
    assert_eq!(
        out.display.as_ref().err().map(BringUpError::status),
        Some(HalStatus::NotSupported)
    );
    assert_eq!(host.count(DsiOp::AnyCommand), 0);
}

#[test]
fn test_soft_reset_failure_skips_init() {
    let host = MockDsiHost::new().fail_on(DsiOp::Command(0x01), HalStatus::Timeout);
    let out = run(&BoardConfig::esp32_p4_function_ev(), MockLdo::new(), host.clone());
    assert_stopped_at(&out, Stage::PanelReset);
    assert_eq!(host.count(DsiOp::AnyCommand), 1, "only the reset was attempted");
    assert_eq!(host.count(DsiOp::StartVideo), 0);
}

#[test]
fn test_reset_line_failure_skips_init() {
    let host = MockDsiHost::new();
    let out = bring_up_display(
        &wired_reset_config(),
        DisplayHardware {
            ldo: MockLdo::new(),
            host: host.clone(),
            reset_pin: Some(MockResetPin { broken: true }),
            delay: NoopDelay::new(),
        },
        DisplayFonts::default(),
    );
    let err = out.display.err().expect("display must be absent");
    assert_eq!(err.stage(), Stage::PanelReset);
    assert_eq!(err.status(), HalStatus::Fail);
    assert_eq!(host.count(DsiOp::AnyCommand), 0);
}

#[test]
fn test_init_failure_after_reset_never_creates_surface() {
    let host = MockDsiHost::new().fail_on(DsiOp::StartVideo, HalStatus::Timeout);
    let out = run(&BoardConfig::esp32_p4_function_ev(), MockLdo::new(), host.clone());
    assert_stopped_at(&out, Stage::PanelInit);
    assert!(out.report.has_completed(Stage::PanelReset));
    assert!(!out.report.has_completed(Stage::Surface));
    assert_eq!(host.count(DsiOp::Command(0x29)), 0, "display never switched on");
}

#[test]
fn test_display_on_failure_reports_command() {
    let host = MockDsiHost::new().fail_on(DsiOp::Command(0x29), HalStatus::Timeout);
    let out = run(&BoardConfig::esp32_p4_function_ev(), MockLdo::new(), host.clone());
    assert_stopped_at(&out, Stage::PanelInit);
    let err = out.display.err().unwrap();
    assert_eq!(
        err.to_string(),
        "panel-init: command 0x29: ESP_ERR_TIMEOUT (0x107)"
    );
}

#[test]
fn test_invalid_config_touches_no_hardware() {
    let mut config = BoardConfig::esp32_p4_function_ev();
    config.panel.num_fbs = 0;
    let ldo = MockLdo::new();
    let host = MockDsiHost::new();
    let out = run(&config, ldo.clone(), host.clone());
    assert_stopped_at(&out, Stage::Config);
    assert!(ldo.requests().is_empty());
    assert!(host.calls().is_empty());
}

#[test]
fn test_sixteen_bit_params_rejected_before_power() {
    let mut config = BoardConfig::esp32_p4_function_ev();
    config.panel_io.param_bits = 16;
    let ldo = MockLdo::new();
    let host = MockDsiHost::new();
    let out = run(&config, ldo.clone(), host.clone());
    assert_stopped_at(&out, Stage::Config);
    assert_eq!(
        out.display.as_ref().err(),
        Some(&BringUpError::Config(ConfigError::ParamBits(16)))
    );
    assert!(ldo.requests().is_empty());
    assert!(host.calls().is_empty(), "panel never reset");
}

#[test]
fn test_display_size_mismatch_rejected_before_power() {
    let mut config = BoardConfig::esp32_p4_function_ev();
    config.display.width = 1280;
    config.display.height = 800;
    let ldo = MockLdo::new();
    let host = MockDsiHost::new();
    let out = run(&config, ldo.clone(), host.clone());
    assert_stopped_at(&out, Stage::Config);
    assert!(matches!(
        out.display.as_ref().err(),
        Some(BringUpError::Config(ConfigError::GeometryMismatch { .. }))
    ));
    assert!(ldo.requests().is_empty());
    assert!(host.calls().is_empty());
}

#[test]
fn test_configured_reset_gpio_without_pin_rejected() {
    let host = MockDsiHost::new();
    let out = run(&wired_reset_config(), MockLdo::new(), host.clone());
    assert_stopped_at(&out, Stage::Config);
    assert_eq!(
        out.display.as_ref().err(),
        Some(&BringUpError::Config(ConfigError::ResetPinMismatch { configured: true }))
    );
    assert!(host.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

fn board(
    ldo: MockLdo,
    host: MockDsiHost,
) -> Board<MockDsiHost, NoResetPin, NoopDelay, MockAmp, MockInput, NullPwm> {
    Board::new(
        BoardConfig::esp32_p4_function_ev(),
        DisplayHardware {
            ldo,
            host,
            reset_pin: None,
            delay: NoopDelay::new(),
        },
        DisplayFonts::default(),
        MockAmp::new(),
        MockInput::new(),
        None,
    )
}

#[test]
fn test_board_registers_screen_only_with_display() {
    let up = board(MockLdo::new(), MockDsiHost::new());
    let mut registry = MockRegistry::new();
    up.register_capabilities(&mut registry).unwrap();
    assert_eq!(registry.things(), ["Speaker", "Screen"]);

    let down = board(
        MockLdo::new(),
        MockDsiHost::new().fail_on(DsiOp::NewBus, HalStatus::Fail),
    );
    assert!(down.display().is_none());
    let mut registry = MockRegistry::new();
    down.register_capabilities(&mut registry).unwrap();
    assert_eq!(registry.things(), ["Speaker"]);
}
