//! MIPI-DSI bus transport
//!
//! Opens the physical multi-lane link that carries both panel commands and
//! the video stream. Opening requires a live [`PowerChannel`]; there is no
//! retry and no lane/rate fallback.

use platform::{DsiBusConfig, DsiHost};

use crate::error::BusError;
use crate::power::PowerChannel;

/// Unopened DSI host.
pub struct BusTransport<H: DsiHost> {
    host: H,
}

impl<H: DsiHost> BusTransport<H> {
    /// Wrap a host controller.
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Bring the bus up on a powered PHY.
    ///
    /// Consumes the transport: on failure the host is dropped with it and the
    /// display stays absent for this boot.
    pub fn open(
        mut self,
        _phy_power: &PowerChannel,
        config: DsiBusConfig,
    ) -> Result<BusHandle<H>, BusError> {
        info!(
            "DSI bus {}: {} lanes @ {} Mbps",
            config.bus_id, config.num_data_lanes, config.lane_bit_rate_mbps
        );
        if let Err(status) = self.host.new_bus(&config) {
            error!("DSI bus {} init failed: {}", config.bus_id, status);
            return Err(BusError {
                bus_id: config.bus_id,
                status,
            });
        }
        Ok(BusHandle {
            host: self.host,
            config,
        })
    }
}

/// An open DSI bus. Exclusively owns the host controller.
pub struct BusHandle<H: DsiHost> {
    host: H,
    config: DsiBusConfig,
}

impl<H: DsiHost> BusHandle<H> {
    /// DSI bus number.
    pub const fn bus_id(&self) -> u8 {
        self.config.bus_id
    }

    /// Data lanes in use.
    pub const fn lane_count(&self) -> u8 {
        self.config.num_data_lanes
    }

    /// Per-lane bit rate in Mbps.
    pub const fn lane_bit_rate_mbps(&self) -> u32 {
        self.config.lane_bit_rate_mbps
    }

    /// Largest single transfer in bytes (0 = host default).
    pub const fn max_transfer_bytes(&self) -> u32 {
        self.config.max_transfer_bytes
    }

    pub(crate) fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: DsiHost> core::fmt::Debug for BusHandle<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BusHandle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::power::PowerRailController;
    use platform::mocks::{DsiCall, DsiOp, MockDsiHost, MockLdo};
    use platform::HalStatus;

    fn bus_config() -> DsiBusConfig {
        DsiBusConfig {
            bus_id: 0,
            num_data_lanes: 2,
            lane_bit_rate_mbps: 1000,
            max_transfer_bytes: 0,
        }
    }

    fn powered() -> PowerChannel {
        PowerRailController::new(MockLdo::new()).enable(3, 2500).unwrap()
    }

    #[test]
    fn test_open_records_bus_parameters() {
        let host = MockDsiHost::new();
        let bus = BusTransport::new(host.clone())
            .open(&powered(), bus_config())
            .unwrap();
        assert_eq!(bus.lane_count(), 2);
        assert_eq!(bus.lane_bit_rate_mbps(), 1000);
        assert_eq!(bus.bus_id(), 0);
        assert_eq!(host.calls(), vec![DsiCall::NewBus(bus_config())]);
    }

    #[test]
    fn test_open_failure_carries_status() {
        let host = MockDsiHost::new().fail_on(DsiOp::NewBus, HalStatus::NoMem);
        let err = BusTransport::new(host).open(&powered(), bus_config()).unwrap_err();
        assert_eq!(err, BusError { bus_id: 0, status: HalStatus::NoMem });
    }
}
