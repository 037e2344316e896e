//! Display bring-up chain for the MIPI-DSI panel
//!
//! One module per stage, in dependency order:
//!
//! ```text
//! power rail (crate::power) → bus → panel_io → driver (panel/) → surface
//! ```
//!
//! Each stage consumes the handle produced by the previous one, so a stage
//! cannot run unless everything before it succeeded.

pub mod backlight;
pub mod bus;
pub mod driver;
pub mod panel;
pub mod panel_io;
pub mod surface;

pub use backlight::PwmBacklight;
pub use bus::{BusHandle, BusTransport};
pub use driver::{Constructed, NoResetPin, Panel, Ready, ResetDone};
pub use panel::{PanelModel, PanelProtocol};
pub use panel_io::PanelIo;
pub use surface::{DisplayFonts, DisplaySurface, Orientation, Rotation};
