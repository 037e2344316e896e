//! DSI PHY power rail
//!
//! The MIPI-DSI PHY is fed from an on-chip LDO channel that must be live
//! before the bus can be opened. The channel is acquired once and never
//! released; [`PowerChannel`] is the proof that it happened, and
//! [`crate::display::bus::BusTransport::open`] will not run without one.

use platform::{LdoChannelConfig, LdoRegulator};

use crate::error::PowerError;

/// An energised LDO channel. Lives for the rest of the boot cycle.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerChannel {
    config: LdoChannelConfig,
}

impl PowerChannel {
    /// Regulator channel number.
    pub const fn channel(&self) -> u8 {
        self.config.chan_id
    }

    /// Output voltage in millivolts.
    pub const fn voltage_mv(&self) -> u16 {
        self.config.voltage_mv
    }
}

/// Enables regulator channels.
pub struct PowerRailController<L: LdoRegulator> {
    ldo: L,
}

impl<L: LdoRegulator> PowerRailController<L> {
    /// Wrap a regulator.
    pub fn new(ldo: L) -> Self {
        Self { ldo }
    }

    /// Acquire `channel` at `voltage_mv`.
    ///
    /// Range checking is left to the regulator; its status is carried in the
    /// returned [`PowerError`].
    pub fn enable(&mut self, channel: u8, voltage_mv: u16) -> Result<PowerChannel, PowerError> {
        let config = LdoChannelConfig {
            chan_id: channel,
            voltage_mv,
        };
        match self.ldo.acquire_channel(config) {
            Ok(()) => {
                info!("LDO channel {} on at {} mV", channel, voltage_mv);
                Ok(PowerChannel { config })
            }
            Err(status) => {
                error!("LDO channel {} at {} mV failed: {}", channel, voltage_mv, status);
                Err(PowerError {
                    channel,
                    voltage_mv,
                    status,
                })
            }
        }
    }

    /// Release the regulator handle.
    pub fn into_inner(self) -> L {
        self.ldo
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::MockLdo;
    use platform::HalStatus;

    #[test]
    fn test_enable_returns_channel() {
        let ldo = MockLdo::new();
        let mut rail = PowerRailController::new(ldo.clone());
        let chan = rail.enable(3, 2500).unwrap();
        assert_eq!(chan.channel(), 3);
        assert_eq!(chan.voltage_mv(), 2500);
        assert!(ldo.is_claimed(3));
    }

    #[test]
    fn test_out_of_range_voltage_is_reported_by_regulator() {
        let mut rail = PowerRailController::new(MockLdo::with_range(0, 3300));
        let err = rail.enable(3, 5000).unwrap_err();
        assert_eq!(err.status, HalStatus::InvalidArg);
        assert_eq!(err.channel, 3);
        assert_eq!(err.voltage_mv, 5000);
    }

    #[test]
    fn test_second_claim_fails() {
        let mut rail = PowerRailController::new(MockLdo::new());
        rail.enable(3, 2500).unwrap();
        let err = rail.enable(3, 2500).unwrap_err();
        assert_eq!(err.status, HalStatus::InvalidState);
    }
}
