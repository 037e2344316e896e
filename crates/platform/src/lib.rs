//! Hardware Abstraction Layer (HAL) for the SparkBot P4 board
//!
//! This crate provides trait-based abstractions for the peripherals touched
//! during board bring-up, enabling development and testing without physical
//! hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (chat, wake word, UI - out of tree)
//!         ↓
//! Board bring-up (firmware crate)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Vendor driver layer (LDO, MIPI-DSI host, ...)
//! ```
//!
//! # Abstraction Levels
//!
//! - [`LdoRegulator`] - On-chip LDO channels
//! - [`DsiHost`] - MIPI-DSI bus, DBI command IO and DPI video stream
//! - [`InputDevice`] - Push buttons
//! - [`CapabilityRegistry`] - Announcing board capabilities by name
//!
//! Every fallible vendor call reports a [`HalStatus`].
//!
//! # Features
//!
//! - `std`: Enable standard library support and the [`mocks`] module
//! - `defmt`: Enable defmt formatting for all public types
//! - `serde`: Serialize configuration types
//!
//! # Example
//!
//! ```
//! use platform::VideoTiming;
//!
//! let timing = VideoTiming::new(1024, 600)
//!     .hsync_pulse_width(10)
//!     .hsync_back_porch(160)
//!     .hsync_front_porch(160);
//! assert_eq!(timing.h_total(), Some(1354));
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod dsi;
pub mod input;
pub mod mocks;
pub mod power;
pub mod registry;
pub mod status;

pub use dsi::{
    ColorOrder, DbiIoConfig, DpiPanelConfig, DsiBusConfig, DsiHost, PixelFormat, VideoTiming,
};
pub use input::{Button, InputDevice, InputEvent};
pub use power::{LdoChannelConfig, LdoRegulator};
pub use registry::{names, CapabilityRegistry, RegistryFull};
pub use status::HalStatus;
