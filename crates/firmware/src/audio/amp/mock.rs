//! Mock speaker power path for host-side testing
//!
//! Implements [`AmpDriver`] without any hardware dependency. Records all calls
//! for assertion in tests.

use super::AmpDriver;

/// Failure reported by a [`MockAmp`] set up to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MockAmpFault;

impl core::fmt::Display for MockAmpFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "mock amplifier fault")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MockAmpFault {}

/// Mock amplifier — records all calls for test assertions.
#[derive(Debug, Default)]
pub struct MockAmp {
    /// Whether the amplifier is currently enabled.
    pub enabled: bool,
    /// Total number of times [`AmpDriver::enable`] has been called.
    pub enable_count: usize,
    /// Total number of times [`AmpDriver::disable`] has been called.
    pub disable_count: usize,
    /// When set, every call fails without changing state.
    pub fail: bool,
}

impl MockAmp {
    /// Create a new mock amplifier. Starts in the disabled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock whose every call fails with [`MockAmpFault`].
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl AmpDriver for MockAmp {
    type Error = MockAmpFault;

    #[allow(clippy::arithmetic_side_effects)] // Mock counter; overflow not a concern in tests
    fn enable(&mut self) -> Result<(), Self::Error> {
        self.enable_count += 1;
        if self.fail {
            return Err(MockAmpFault);
        }
        self.enabled = true;
        Ok(())
    }

    #[allow(clippy::arithmetic_side_effects)] // Mock counter; overflow not a concern in tests
    fn disable(&mut self) -> Result<(), Self::Error> {
        self.disable_count += 1;
        if self.fail {
            return Err(MockAmpFault);
        }
        self.enabled = false;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
