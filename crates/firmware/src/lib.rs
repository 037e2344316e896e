//! ESP32-P4 Function EV board bring-up core
//!
//! Ordered bring-up of the MIPI-DSI display and the speaker output path.
//!
//! # Architecture
//!
//! ```text
//! Board (board.rs)
//!   ├── boot::bring_up_display
//!   │     power rail → bus → panel io → panel (construct, reset, init) → surface
//!   ├── audio::SharedAudioGate<_, AmpDriver>   (PA pin shared with the display)
//!   ├── backlight, input button
//!   └── capability registration
//!         ↓
//! Platform HAL (platform crate: LdoRegulator, DsiHost, InputDevice, ...)
//! ```
//!
//! # Features
//!
//! - `defmt` - Log through `defmt` (target builds)
//! - `emulator` - Log through `tracing` (desktop simulator)
//! - `std` - Enable standard library (host tests, platform mocks)
//! - `serde` - Serialize/deserialize the board configuration
//!
//! # Examples
//!
//! ```bash
//! cargo run -p firmware --example bringup_simulator --features emulator
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]

#[macro_use]
mod log;

pub mod audio;
pub mod board;
pub mod boot;
pub mod config;
pub mod display;
pub mod error;
pub mod power;

// Re-export key types
pub use audio::{AmpDriver, AudioOutputGate, GateOutcome, MockAmp, OutputState, SharedAudioGate};
pub use board::Board;
pub use boot::{bring_up_display, BootReport, DisplayHardware};
pub use config::BoardConfig;
pub use display::DisplaySurface;
pub use error::{BringUpError, Stage};
