//! Board object
//!
//! Owns every singleton the bring-up produces: the DSI power channel, the
//! display surface (when it came up), the speaker gate, the input button and
//! the backlight. Created once at boot, before any task that consumes it is
//! spawned.
//!
//! # Example
//!
//! ```rust
//! use firmware::board::Board;
//! use firmware::boot::DisplayHardware;
//! use firmware::config::BoardConfig;
//! use firmware::display::{DisplayFonts, NoResetPin};
//! use firmware::audio::MockAmp;
//! use platform::mocks::{MockDsiHost, MockInput, MockLdo, MockRegistry};
//! # use embedded_hal::delay::DelayNs;
//! # struct Spin;
//! # impl DelayNs for Spin { fn delay_ns(&mut self, _ns: u32) {} }
//! # struct Pwm;
//! # impl embedded_hal::pwm::ErrorType for Pwm { type Error = core::convert::Infallible; }
//! # impl embedded_hal::pwm::SetDutyCycle for Pwm {
//! #     fn max_duty_cycle(&self) -> u16 { 100 }
//! #     fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! let hw = DisplayHardware {
//!     ldo: MockLdo::new(),
//!     host: MockDsiHost::new(),
//!     reset_pin: None::<NoResetPin>,
//!     delay: Spin,
//! };
//! let board = Board::<_, _, _, _, _, Pwm>::new(
//!     BoardConfig::esp32_p4_function_ev(),
//!     hw,
//!     DisplayFonts::default(),
//!     MockAmp::new(),
//!     MockInput::new(),
//!     None,
//! );
//! assert!(board.display().is_some());
//!
//! let mut registry = MockRegistry::new();
//! board.register_capabilities(&mut registry).unwrap();
//! assert_eq!(registry.things(), ["Speaker", "Screen"]);
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use platform::{names, CapabilityRegistry, DsiHost, InputDevice, LdoRegulator, RegistryFull};

use crate::audio::{AmpDriver, SharedAudioGate};
use crate::boot::{bring_up_display, BootReport, DisplayBringUp, DisplayHardware};
use crate::config::BoardConfig;
use crate::display::{DisplayFonts, DisplaySurface, PwmBacklight};
use crate::error::BringUpError;
use crate::power::PowerChannel;

/// Speaker gate type owned by the board.
pub type AudioPath<A> = SharedAudioGate<CriticalSectionRawMutex, A>;

/// Every device the board brings up or hands out.
pub struct Board<H, RST, D, A, I, P>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
    A: AmpDriver,
    I: InputDevice,
    P: SetDutyCycle,
{
    config: BoardConfig,
    power: Option<PowerChannel>,
    display: Option<DisplaySurface<H, RST, D>>,
    display_error: Option<BringUpError>,
    report: BootReport,
    audio: AudioPath<A>,
    input: I,
    backlight: Option<PwmBacklight<P>>,
}

impl<H, RST, D, A, I, P> Board<H, RST, D, A, I, P>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
    A: AmpDriver,
    I: InputDevice,
    P: SetDutyCycle,
{
    /// Bring the board up.
    ///
    /// A display failure is logged and leaves [`display`](Self::display)
    /// empty; the rest of the board is still usable. The backlight is
    /// restored only when the display came up.
    pub fn new<L: LdoRegulator>(
        config: BoardConfig,
        display_hw: DisplayHardware<L, H, RST, D>,
        fonts: DisplayFonts,
        amp: A,
        input: I,
        backlight: Option<PwmBacklight<P>>,
    ) -> Self {
        info!("Board init: boot button on GPIO {}", config.boot_button_pin);

        let DisplayBringUp {
            power,
            display,
            report,
        } = bring_up_display(&config, display_hw, fonts);
        let (display, display_error) = match display {
            Ok(surface) => (Some(surface), None),
            Err(err) => {
                warn!("Continuing without display");
                (None, Some(err))
            }
        };

        let mut board = Self {
            config,
            power,
            display,
            display_error,
            report,
            audio: SharedAudioGate::new(amp),
            input,
            backlight,
        };
        board.restore_backlight();
        board
    }

    fn restore_backlight(&mut self) {
        if self.display.is_none() {
            return;
        }
        if let Some(backlight) = self.backlight.as_mut() {
            if backlight.restore_brightness().is_err() {
                warn!("Backlight restore failed");
            }
        }
    }

    /// The display surface; `None` if bring-up failed.
    pub fn display(&self) -> Option<&DisplaySurface<H, RST, D>> {
        self.display.as_ref()
    }

    /// Why the display is absent.
    pub fn display_error(&self) -> Option<&BringUpError> {
        self.display_error.as_ref()
    }

    /// Stage log of the display bring-up.
    pub fn boot_report(&self) -> &BootReport {
        &self.report
    }

    /// DSI PHY power channel, if it was acquired.
    pub fn power_channel(&self) -> Option<&PowerChannel> {
        self.power.as_ref()
    }

    /// Speaker output gate.
    pub fn audio_path(&self) -> &AudioPath<A> {
        &self.audio
    }

    /// BOOT button.
    pub fn input_button(&mut self) -> &mut I {
        &mut self.input
    }

    /// Backlight, if the board has a dimmable one.
    pub fn backlight(&mut self) -> Option<&mut PwmBacklight<P>> {
        self.backlight.as_mut()
    }

    /// Configuration the board was brought up with.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Announce the board's capabilities.
    ///
    /// `Speaker` is always registered; `Screen` only when the display is up.
    pub fn register_capabilities<R: CapabilityRegistry>(
        &self,
        registry: &mut R,
    ) -> Result<(), RegistryFull> {
        registry.add_thing(names::SPEAKER)?;
        if self.display.is_some() {
            registry.add_thing(names::SCREEN)?;
        }
        Ok(())
    }
}

impl<H, RST, D, A, I, P> core::fmt::Debug for Board<H, RST, D, A, I, P>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
    A: AmpDriver,
    I: InputDevice,
    P: SetDutyCycle,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Board")
            .field("display", &self.display)
            .field("display_error", &self.display_error)
            .field("report", &self.report)
            .field("audio", &self.audio.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::audio::{GateOutcome, MockAmp, OutputState};
    use crate::display::backlight::tests::RecordingPwm;
    use crate::display::NoResetPin;
    use crate::error::Stage;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use platform::mocks::{DsiOp, MockDsiHost, MockInput, MockLdo, MockRegistry};
    use platform::{Button, HalStatus, InputEvent};

    type TestBoard = Board<MockDsiHost, NoResetPin, NoopDelay, MockAmp, MockInput, RecordingPwm>;

    fn board_with(ldo: MockLdo, host: MockDsiHost) -> TestBoard {
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
            Some(PwmBacklight::new(RecordingPwm::default(), false)),
        )
    }

    #[test]
    fn test_board_brings_display_up() {
        let mut board = board_with(MockLdo::new(), MockDsiHost::new());
        assert!(board.display().is_some());
        assert!(board.display_error().is_none());
        assert!(board.boot_report().is_complete());
        assert_eq!(board.power_channel().unwrap().channel(), 3);
        assert_eq!(board.backlight().unwrap().brightness(), 75);
    }

    #[test]
    fn test_display_failure_leaves_board_usable() {
        let host = MockDsiHost::new().fail_on(DsiOp::StartVideo, HalStatus::Timeout);
        let mut board = board_with(MockLdo::new(), host);
        assert!(board.display().is_none());
        assert_eq!(board.display_error().unwrap().stage(), Stage::PanelInit);
        assert_eq!(board.backlight().unwrap().brightness(), 0, "backlight stays dark");
        assert_eq!(board.audio_path().set_enabled(true), Ok(GateOutcome::Enabled));
        assert_eq!(board.audio_path().state(), OutputState::Enabled);
    }

    #[test]
    fn test_capabilities_follow_display() {
        let up = board_with(MockLdo::new(), MockDsiHost::new());
        let mut registry = MockRegistry::new();
        up.register_capabilities(&mut registry).unwrap();
        assert_eq!(registry.things(), [names::SPEAKER, names::SCREEN]);

        let ldo = MockLdo::new().failing_with(HalStatus::InvalidState);
        let down = board_with(ldo, MockDsiHost::new());
        let mut registry = MockRegistry::new();
        down.register_capabilities(&mut registry).unwrap();
        assert_eq!(registry.things(), [names::SPEAKER]);
    }

    #[test]
    fn test_registry_full_is_reported() {
        let board = board_with(MockLdo::new(), MockDsiHost::new());
        let mut registry = MockRegistry::with_capacity(1);
        assert_eq!(board.register_capabilities(&mut registry), Err(RegistryFull));
    }

    #[test]
    fn test_input_button_is_handed_out() {
        let mut board = board_with(MockLdo::new(), MockDsiHost::new());
        assert_eq!(board.input_button().poll_event(), None);
        board.input_button().add_event(InputEvent::Click(Button::Boot));
        assert_eq!(
            board.input_button().poll_event(),
            Some(InputEvent::Click(Button::Boot))
        );
    }
}
