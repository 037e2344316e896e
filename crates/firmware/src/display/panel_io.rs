//! DBI panel command channel
//!
//! Register-style command protocol layered on the DSI bus: every write is a
//! fixed-width command code followed by zero or more fixed-width parameters,
//! sent on one virtual channel. Field widths are checked here so a 16-bit
//! code never gets silently truncated onto an 8-bit channel.

use platform::{DbiIoConfig, DsiHost, HalStatus};

use super::bus::BusHandle;
use crate::error::{IoError, IoErrorKind};

/// Command channel to one panel. Owns the bus it runs on.
pub struct PanelIo<H: DsiHost> {
    bus: BusHandle<H>,
    config: DbiIoConfig,
}

impl<H: DsiHost> PanelIo<H> {
    /// Attach a DBI command IO to an open bus.
    pub fn attach(
        mut bus: BusHandle<H>,
        cmd_bits: u8,
        param_bits: u8,
        virtual_channel: u8,
    ) -> Result<Self, IoError> {
        let config = DbiIoConfig {
            virtual_channel,
            cmd_bits,
            param_bits,
        };
        info!(
            "DBI IO on vc {}: {}-bit cmd, {}-bit param",
            virtual_channel, cmd_bits, param_bits
        );
        if let Err(status) = bus.host_mut().new_dbi_io(&config) {
            error!("New panel IO failed: {}", status);
            return Err(IoError {
                cmd: None,
                kind: IoErrorKind::Host(status),
            });
        }
        Ok(Self { bus, config })
    }

    /// Send `cmd` with `params`.
    pub fn tx_param(&mut self, cmd: u16, params: &[u8]) -> Result<(), IoError> {
        if self.config.cmd_bits == 8 && cmd > 0xFF {
            return Err(IoError {
                cmd: Some(cmd),
                kind: IoErrorKind::CommandTooWide {
                    cmd,
                    bits: self.config.cmd_bits,
                },
            });
        }
        if self.config.param_bits == 16 && params.len() % 2 != 0 {
            return Err(IoError {
                cmd: Some(cmd),
                kind: IoErrorKind::ParamsMisaligned {
                    len: params.len(),
                    bits: self.config.param_bits,
                },
            });
        }
        let vc = self.config.virtual_channel;
        self.bus
            .host_mut()
            .write_command(vc, cmd, params)
            .map_err(|status| IoError {
                cmd: Some(cmd),
                kind: IoErrorKind::Host(status),
            })
    }

    /// Virtual channel commands are sent on.
    pub const fn virtual_channel(&self) -> u8 {
        self.config.virtual_channel
    }

    /// Command field width in bits.
    pub const fn cmd_bits(&self) -> u8 {
        self.config.cmd_bits
    }

    /// Parameter field width in bits.
    pub const fn param_bits(&self) -> u8 {
        self.config.param_bits
    }

    /// Bus this channel runs on.
    pub fn bus(&self) -> &BusHandle<H> {
        &self.bus
    }

    /// Program the DPI controller through the underlying bus.
    pub(crate) fn start_video(
        &mut self,
        config: &platform::DpiPanelConfig,
    ) -> Result<(), HalStatus> {
        self.bus.host_mut().start_video(config)
    }
}

impl<H: DsiHost> core::fmt::Debug for PanelIo<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PanelIo")
            .field("bus", &self.bus)
            .field("config", &self.config)
            .finish()
    }
}
