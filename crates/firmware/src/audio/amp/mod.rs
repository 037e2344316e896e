//! Speaker power-path abstractions
//!
//! Concrete drivers:
//! - [`crate::audio::es8311::Es8311Output`] — ES8311 DAC + external PA pin
//! - `mock` — In-process mock for host tests (always available)

pub mod mock;

pub use mock::MockAmp;

/// Speaker output power path.
///
/// On the reference board this is the codec DAC plus an external power
/// amplifier whose enable line is shared with the display. Calls block until
/// the hardware has switched.
pub trait AmpDriver {
    /// Error type returned by amplifier operations.
    type Error: core::fmt::Debug;

    /// Power the output path up.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Power the output path down.
    fn disable(&mut self) -> Result<(), Self::Error>;

    /// Returns `true` if the output path is currently powered.
    fn is_enabled(&self) -> bool;
}

impl<T: AmpDriver + ?Sized> AmpDriver for &mut T {
    type Error = T::Error;

    fn enable(&mut self) -> Result<(), Self::Error> {
        T::enable(self)
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        T::disable(self)
    }

    fn is_enabled(&self) -> bool {
        T::is_enabled(self)
    }
}
