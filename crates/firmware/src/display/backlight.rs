//! PWM backlight
//!
//! Brightness is a percentage (0–100). Boards whose backlight driver is
//! active-low set `invert`, and the duty cycle is flipped before it reaches
//! the PWM channel. The last brightness the user chose is kept so the board
//! can restore it once bring-up is done.

use embedded_hal::pwm::SetDutyCycle;

/// Brightness applied when nothing was saved.
pub const DEFAULT_BRIGHTNESS: u8 = 75;

/// Floor for restored brightness; a saved 0 must not leave the screen dark.
pub const MIN_RESTORE_BRIGHTNESS: u8 = 10;

/// PWM-driven backlight.
#[derive(Debug)]
pub struct PwmBacklight<P: SetDutyCycle> {
    pwm: P,
    invert: bool,
    saved: u8,
    current: u8,
}

impl<P: SetDutyCycle> PwmBacklight<P> {
    /// Wrap a PWM channel. Starts off, with [`DEFAULT_BRIGHTNESS`] saved.
    pub fn new(pwm: P, invert: bool) -> Self {
        Self {
            pwm,
            invert,
            saved: DEFAULT_BRIGHTNESS,
            current: 0,
        }
    }

    /// Seed the saved brightness (e.g. from persistent settings).
    pub fn with_saved_brightness(mut self, percent: u8) -> Self {
        self.saved = percent.min(100);
        self
    }

    /// Set brightness now and remember it.
    pub fn set_brightness(&mut self, percent: u8) -> Result<(), P::Error> {
        let percent = percent.min(100);
        self.apply(percent)?;
        self.saved = percent;
        Ok(())
    }

    /// Re-apply the saved brightness, never below [`MIN_RESTORE_BRIGHTNESS`].
    pub fn restore_brightness(&mut self) -> Result<(), P::Error> {
        let percent = self.saved.max(MIN_RESTORE_BRIGHTNESS);
        debug!("Restore backlight to {}%", percent);
        self.apply(percent)
    }

    /// Brightness currently driven.
    pub fn brightness(&self) -> u8 {
        self.current
    }

    /// Brightness that [`restore_brightness`](Self::restore_brightness) would apply.
    pub fn saved_brightness(&self) -> u8 {
        self.saved
    }

    fn apply(&mut self, percent: u8) -> Result<(), P::Error> {
        let duty = if self.invert {
            100u8.saturating_sub(percent)
        } else {
            percent
        };
        self.pwm.set_duty_cycle_percent(duty)?;
        self.current = percent;
        Ok(())
    }
}
