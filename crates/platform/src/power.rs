//! Power management abstraction
//!
//! On-chip LDO regulators feed the analog blocks (e.g. the MIPI-DSI PHY).
//! A channel is acquired once at a fixed voltage and stays energised for the
//! rest of the boot cycle; there is deliberately no release path.

use crate::HalStatus;

/// Request for one LDO output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LdoChannelConfig {
    /// Regulator channel number.
    pub chan_id: u8,
    /// Output voltage in millivolts.
    pub voltage_mv: u16,
}

/// On-chip LDO regulator.
///
/// The regulator validates the request itself: an out-of-range voltage is
/// reported as [`HalStatus::InvalidArg`], a channel that is already in use as
/// [`HalStatus::InvalidState`].
pub trait LdoRegulator {
    /// Acquire `config.chan_id` and drive it at `config.voltage_mv`.
    fn acquire_channel(&mut self, config: LdoChannelConfig) -> Result<(), HalStatus>;
}

impl<T: LdoRegulator + ?Sized> LdoRegulator for &mut T {
    fn acquire_channel(&mut self, config: LdoChannelConfig) -> Result<(), HalStatus> {
        T::acquire_channel(self, config)
    }
}
