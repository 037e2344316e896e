//! Speaker output gate
//!
//! On the reference board the power-amplifier enable line is electrically
//! shared with the display driver. Driving it low to silence the speaker
//! would also disturb the panel, so the gate never performs the hardware
//! disable: it records the request and leaves the pin alone.
//!
//! | Current  | Request | Hardware call     | Outcome                      |
//! |----------|---------|-------------------|------------------------------|
//! | Disabled | enable  | `enable()`        | [`GateOutcome::Enabled`]     |
//! | Enabled  | disable | none (shared pin) | [`GateOutcome::DisableSkipped`] |
//! | same     | same    | none              | [`GateOutcome::Unchanged`]   |
//!
//! After a skipped disable the gate reports `Disabled` while the amplifier
//! is still powered; the next enable powers it again, which is harmless.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::amp::AmpDriver;

/// Logical state of the speaker output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputState {
    /// Output off (initial state).
    #[default]
    Disabled,
    /// Output on.
    Enabled,
}

impl OutputState {
    const fn from_bool(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// What [`AudioOutputGate::set_enabled`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateOutcome {
    /// Request matched the current state; nothing happened.
    Unchanged,
    /// Hardware enabled.
    Enabled,
    /// State recorded as disabled; hardware left untouched.
    DisableSkipped,
}

/// Speaker output gate over an amplifier capability.
#[derive(Debug)]
pub struct AudioOutputGate<A: AmpDriver> {
    amp: A,
    state: OutputState,
    last_requested: bool,
}

impl<A: AmpDriver> AudioOutputGate<A> {
    /// Wrap `amp`. The gate starts disabled whatever the amplifier reports.
    pub const fn new(amp: A) -> Self {
        Self {
            amp,
            state: OutputState::Disabled,
            last_requested: false,
        }
    }

    /// Request the output on or off.
    ///
    /// A failed hardware enable leaves the state `Disabled` and returns the
    /// amplifier's error.
    pub fn set_enabled(&mut self, enable: bool) -> Result<GateOutcome, A::Error> {
        self.last_requested = enable;
        if OutputState::from_bool(enable) == self.state {
            return Ok(GateOutcome::Unchanged);
        }
        if enable {
            self.amp.enable()?;
            self.state = OutputState::Enabled;
            info!("Speaker output enabled");
            Ok(GateOutcome::Enabled)
        } else {
            // PA pin is shared with the display; leave it driven.
            debug!("Speaker output disable skipped: PA pin shared with display");
            self.state = OutputState::Disabled;
            Ok(GateOutcome::DisableSkipped)
        }
    }

    /// Current logical state.
    pub fn state(&self) -> OutputState {
        self.state
    }

    /// Whether the output is logically enabled.
    pub fn is_enabled(&self) -> bool {
        self.state == OutputState::Enabled
    }

    /// Value of the most recent request (`false` before any).
    pub fn last_requested(&self) -> bool {
        self.last_requested
    }

    /// The wrapped amplifier.
    pub fn amp(&self) -> &A {
        &self.amp
    }

    /// Unwrap the amplifier.
    pub fn into_inner(self) -> A {
        self.amp
    }
}

/// [`AudioOutputGate`] behind a blocking mutex, for several callers.
///
/// The read-compare-write of `set_enabled` runs entirely inside the lock, so
/// two concurrent enable requests still produce one hardware enable.
pub struct SharedAudioGate<M: RawMutex, A: AmpDriver> {
    inner: Mutex<M, RefCell<AudioOutputGate<A>>>,
}

impl<M: RawMutex, A: AmpDriver> SharedAudioGate<M, A> {
    /// Wrap `amp` in a new, disabled gate.
    pub const fn new(amp: A) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(AudioOutputGate::new(amp))),
        }
    }

    /// See [`AudioOutputGate::set_enabled`].
    pub fn set_enabled(&self, enable: bool) -> Result<GateOutcome, A::Error> {
        self.inner.lock(|gate| gate.borrow_mut().set_enabled(enable))
    }

    /// Current logical state.
    pub fn state(&self) -> OutputState {
        self.inner.lock(|gate| gate.borrow().state())
    }

    /// Whether the output is logically enabled.
    pub fn is_enabled(&self) -> bool {
        self.state() == OutputState::Enabled
    }

    /// Run `f` with exclusive access to the gate.
    pub fn with_gate<R>(&self, f: impl FnOnce(&mut AudioOutputGate<A>) -> R) -> R {
        self.inner.lock(|gate| f(&mut gate.borrow_mut()))
    }

    /// Unwrap the gate.
    pub fn into_inner(self) -> AudioOutputGate<A> {
        self.inner.into_inner().into_inner()
    }
}
