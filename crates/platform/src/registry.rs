//! Device-capability registry
//!
//! Higher-level application logic discovers what the board can do by name
//! ("Speaker", "Screen", ...). The registry lives outside this workspace;
//! the board only announces its capabilities once bring-up is done.

/// Registry full or name rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegistryFull;

impl core::fmt::Display for RegistryFull {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "capability registry is full")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RegistryFull {}

/// Capability names announced by the board.
pub mod names {
    /// Audio output path.
    pub const SPEAKER: &str = "Speaker";
    /// Display panel.
    pub const SCREEN: &str = "Screen";
}

/// External registry of board capabilities.
pub trait CapabilityRegistry {
    /// Announce a capability by name.
    fn add_thing(&mut self, name: &'static str) -> Result<(), RegistryFull>;
}

impl<T: CapabilityRegistry + ?Sized> CapabilityRegistry for &mut T {
    fn add_thing(&mut self, name: &'static str) -> Result<(), RegistryFull> {
        T::add_thing(self, name)
    }
}
