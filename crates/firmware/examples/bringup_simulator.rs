//! Bring-up Simulator
//!
//! Runs the full board bring-up on the desktop against the platform mocks,
//! with the firmware's log output routed through `tracing`.
//!
//! Run with: cargo run -p firmware --example bringup_simulator --features emulator
//!
//! Inject a failure at one stage to watch the chain stop there:
//!
//! ```bash
//! cargo run -p firmware --example bringup_simulator --features emulator -- power-rail
//! RUST_LOG=debug cargo run -p firmware --example bringup_simulator --features emulator -- panel-init
//! ```

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use firmware::audio::MockAmp;
use firmware::board::Board;
use firmware::boot::DisplayHardware;
use firmware::config::BoardConfig;
use firmware::display::{DisplayFonts, NoResetPin, PwmBacklight};
use firmware::error::Stage;
use platform::mocks::{DsiOp, MockDsiHost, MockInput, MockLdo, MockRegistry};
use platform::{Button, HalStatus, InputDevice, InputEvent};

/// Delay that really sleeps, so the log timestamps show the panel timing.
struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// PWM channel that logs the duty it is given.
struct LoggingPwm;

impl embedded_hal::pwm::ErrorType for LoggingPwm {
    type Error = core::convert::Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for LoggingPwm {
    fn max_duty_cycle(&self) -> u16 {
        100
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        info!(duty, "backlight PWM");
        Ok(())
    }
}

fn stage_from_arg(arg: &str) -> Option<Stage> {
    Stage::ALL.into_iter().find(|stage| stage.name() == arg)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let fail_at = match std::env::args().nth(1) {
        Some(arg) => Some(stage_from_arg(&arg).ok_or_else(|| format!("unknown stage: {arg}"))?),
        None => None,
    };

    let mut config = BoardConfig::esp32_p4_function_ev();
    let ldo = MockLdo::with_range(0, 3300);
    let mut host = MockDsiHost::new();
    match fail_at {
        None | Some(Stage::Surface) => {}
        Some(Stage::Config) => config.panel.num_fbs = 0,
        Some(Stage::PowerRail) => config.power.ldo_voltage_mv = 5000,
        Some(Stage::BusTransport) => host = host.fail_on(DsiOp::NewBus, HalStatus::NoMem),
        Some(Stage::PanelIo) => host = host.fail_on(DsiOp::NewDbiIo, HalStatus::NoMem),
        Some(Stage::PanelConstruct) => config.dsi.num_data_lanes = 3,
        Some(Stage::PanelReset) => {
            host = host.fail_on(DsiOp::Command(0x01), HalStatus::Timeout);
        }
        Some(Stage::PanelInit) => {
            host = host.fail_on(DsiOp::StartVideo, HalStatus::Timeout);
        }
    }
    if fail_at == Some(Stage::Surface) {
        warn!("surface creation cannot fail; running the normal sequence");
    }

    println!("=== Board Bring-up Simulator ===\n");

    let mut input = MockInput::new();
    input.add_event(InputEvent::Click(Button::Boot));

    let mut board = Board::new(
        config,
        DisplayHardware {
            ldo: ldo.clone(),
            host: host.clone(),
            reset_pin: None::<NoResetPin>,
            delay: StdDelay,
        },
        DisplayFonts::default(),
        MockAmp::new(),
        input,
        Some(PwmBacklight::new(LoggingPwm, config.display.backlight_invert)),
    );

    let mut registry = MockRegistry::new();
    board.register_capabilities(&mut registry)?;

    println!("\nStages completed: {:?}", board.boot_report().completed());
    if let Some(err) = board.display_error() {
        println!("Display:          absent ({err})");
    } else if let Some(surface) = board.display() {
        println!(
            "Display:          {}x{} on {}",
            surface.width(),
            surface.height(),
            surface.panel().name()
        );
    }
    println!("Capabilities:     {:?}", registry.things());
    println!("LDO requests:     {}", ldo.requests().len());
    println!("DSI calls:        {}", host.calls().len());

    let gate = board.audio_path();
    for request in [true, true, false, true] {
        let outcome = gate.set_enabled(request)?;
        println!("Speaker {request:<5} -> {outcome:?}");
    }
    let amp_calls = gate.with_gate(|g| (g.amp().enable_count, g.amp().disable_count));
    println!("Amp enables/disables: {}/{}", amp_calls.0, amp_calls.1);

    if let Some(event) = board.input_button().poll_event() {
        println!("Input:            {event:?}");
    }

    Ok(())
}
