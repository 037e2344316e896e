//! Audio subsystem — speaker power path and its gate
//!
//! Vertically sliced: one module per concern.
//!
//! # Structure
//!
//! - `amp/` — Output power-path capability (`AmpDriver`, `MockAmp` for tests)
//! - `es8311` — ES8311 codec DAC + PA pin implementing `AmpDriver`
//! - `gate` — Shared-pin arbitration (`AudioOutputGate`, `SharedAudioGate`)
//!
//! # Dependency Injection
//!
//! The gate composes any [`amp::AmpDriver`]; concrete types are injected at
//! the call site:
//!
//! ```rust,ignore
//! // Hardware:
//! let gate = AudioOutputGate::new(Es8311Output::from_config(i2c, Some(pa), &config.audio)?);
//! // Tests:
//! let gate = AudioOutputGate::new(MockAmp::new());
//! ```

pub mod amp;
pub mod es8311;
pub mod gate;

pub use amp::mock::MockAmp;
pub use amp::AmpDriver;
pub use es8311::Es8311Output;
pub use gate::{AudioOutputGate, GateOutcome, OutputState, SharedAudioGate};
