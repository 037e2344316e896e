//! Mock implementations for testing
//!
//! Every mock records the calls it receives so tests can assert exactly which
//! hardware stages ran. Mocks are cheap clones sharing one state cell: keep a
//! clone in the test, move the other into the code under test, inspect the
//! kept clone afterwards (the same pattern `embedded-hal-mock` uses).

#![cfg(any(test, feature = "std"))]

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;
use std::vec::Vec;

use crate::*;

// ---------------------------------------------------------------------------
// LDO regulator
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct LdoState {
    min_mv: u16,
    max_mv: u16,
    claimed: BTreeSet<u8>,
    requests: Vec<LdoChannelConfig>,
    forced_failure: Option<HalStatus>,
}

/// Mock LDO regulator.
///
/// Accepts any channel whose voltage lies in the supported range (default
/// 0–3300 mV); a second acquisition of the same channel is rejected.
#[derive(Debug, Clone)]
pub struct MockLdo {
    state: Rc<RefCell<LdoState>>,
}

impl MockLdo {
    /// Regulator supporting 0–3300 mV on every channel.
    pub fn new() -> Self {
        Self::with_range(0, 3300)
    }

    /// Regulator supporting `min_mv..=max_mv`.
    pub fn with_range(min_mv: u16, max_mv: u16) -> Self {
        Self {
            state: Rc::new(RefCell::new(LdoState {
                min_mv,
                max_mv,
                claimed: BTreeSet::new(),
                requests: Vec::new(),
                forced_failure: None,
            })),
        }
    }

    /// Fail every acquisition with `status`.
    pub fn failing_with(self, status: HalStatus) -> Self {
        self.state.borrow_mut().forced_failure = Some(status);
        self
    }

    /// Mark `chan_id` as already in use by someone else.
    pub fn pre_claim(self, chan_id: u8) -> Self {
        self.state.borrow_mut().claimed.insert(chan_id);
        self
    }

    /// Every acquisition attempted so far, successful or not.
    pub fn requests(&self) -> Vec<LdoChannelConfig> {
        self.state.borrow().requests.clone()
    }

    /// Whether `chan_id` is currently claimed.
    pub fn is_claimed(&self, chan_id: u8) -> bool {
        self.state.borrow().claimed.contains(&chan_id)
    }
}

impl Default for MockLdo {
    fn default() -> Self {
        Self::new()
    }
}

impl LdoRegulator for MockLdo {
    fn acquire_channel(&mut self, config: LdoChannelConfig) -> Result<(), HalStatus> {
        let mut state = self.state.borrow_mut();
        state.requests.push(config);
        if let Some(status) = state.forced_failure {
            return Err(status);
        }
        if config.voltage_mv < state.min_mv || config.voltage_mv > state.max_mv {
            return Err(HalStatus::InvalidArg);
        }
        if !state.claimed.insert(config.chan_id) {
            return Err(HalStatus::InvalidState);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DSI host
// ---------------------------------------------------------------------------

/// One call received by [`MockDsiHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DsiCall {
    /// [`DsiHost::new_bus`]
    NewBus(DsiBusConfig),
    /// [`DsiHost::new_dbi_io`]
    NewDbiIo(DbiIoConfig),
    /// [`DsiHost::write_command`]
    Command {
        /// Virtual channel the command was sent on.
        channel: u8,
        /// Command code.
        cmd: u16,
        /// Parameter bytes.
        params: Vec<u8>,
    },
    /// [`DsiHost::start_video`]
    StartVideo(DpiPanelConfig),
}

/// Selector for failure injection in [`MockDsiHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DsiOp {
    /// Fail `new_bus`.
    NewBus,
    /// Fail `new_dbi_io`.
    NewDbiIo,
    /// Fail the write of one specific command code.
    Command(u16),
    /// Fail every command write.
    AnyCommand,
    /// Fail `start_video`.
    StartVideo,
}

impl DsiOp {
    fn matches(self, call: &DsiCall) -> bool {
        match (self, call) {
            (Self::NewBus, DsiCall::NewBus(_))
            | (Self::NewDbiIo, DsiCall::NewDbiIo(_))
            | (Self::AnyCommand, DsiCall::Command { .. })
            | (Self::StartVideo, DsiCall::StartVideo(_)) => true,
            (Self::Command(code), DsiCall::Command { cmd, .. }) => code == *cmd,
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
struct DsiState {
    calls: Vec<DsiCall>,
    failures: Vec<(DsiOp, HalStatus)>,
    bus_open: bool,
    io_attached: bool,
    video_running: bool,
}

impl DsiState {
    fn record(&mut self, call: DsiCall) -> Result<(), HalStatus> {
        let failure = self
            .failures
            .iter()
            .find(|(op, _)| op.matches(&call))
            .map(|(_, status)| *status);
        self.calls.push(call);
        failure.map_or(Ok(()), Err)
    }
}

/// Mock MIPI-DSI host.
///
/// Enforces the host's ordering rules (no IO without a bus, no command
/// without an IO) and reports violations as [`HalStatus::InvalidState`].
#[derive(Debug, Clone, Default)]
pub struct MockDsiHost {
    state: Rc<RefCell<DsiState>>,
}

impl MockDsiHost {
    /// Host on which every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail calls selected by `op` with `status`.
    pub fn fail_on(self, op: DsiOp, status: HalStatus) -> Self {
        self.state.borrow_mut().failures.push((op, status));
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<DsiCall> {
        self.state.borrow().calls.clone()
    }

    /// `(cmd, params)` of every command write, in order.
    pub fn commands(&self) -> Vec<(u16, Vec<u8>)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                DsiCall::Command { cmd, params, .. } => Some((*cmd, params.clone())),
                _ => None,
            })
            .collect()
    }

    /// Number of received calls matching `op`.
    pub fn count(&self, op: DsiOp) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| op.matches(call))
            .count()
    }

    /// Whether the video stream was started successfully.
    pub fn video_running(&self) -> bool {
        self.state.borrow().video_running
    }
}

impl DsiHost for MockDsiHost {
    fn new_bus(&mut self, config: &DsiBusConfig) -> Result<(), HalStatus> {
        let mut state = self.state.borrow_mut();
        state.record(DsiCall::NewBus(*config))?;
        if state.bus_open {
            return Err(HalStatus::InvalidState);
        }
        state.bus_open = true;
        Ok(())
    }

    fn new_dbi_io(&mut self, config: &DbiIoConfig) -> Result<(), HalStatus> {
        let mut state = self.state.borrow_mut();
        state.record(DsiCall::NewDbiIo(*config))?;
        if !state.bus_open {
            return Err(HalStatus::InvalidState);
        }
        state.io_attached = true;
        Ok(())
    }

    fn write_command(
        &mut self,
        virtual_channel: u8,
        cmd: u16,
        params: &[u8],
    ) -> Result<(), HalStatus> {
        let mut state = self.state.borrow_mut();
        state.record(DsiCall::Command {
            channel: virtual_channel,
            cmd,
            params: params.to_vec(),
        })?;
        if !state.io_attached {
            return Err(HalStatus::InvalidState);
        }
        Ok(())
    }

    fn start_video(&mut self, config: &DpiPanelConfig) -> Result<(), HalStatus> {
        let mut state = self.state.borrow_mut();
        state.record(DsiCall::StartVideo(*config))?;
        if !state.bus_open {
            return Err(HalStatus::InvalidState);
        }
        state.video_running = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Capability registry
// ---------------------------------------------------------------------------

/// Mock capability registry, optionally bounded.
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    things: Rc<RefCell<Vec<&'static str>>>,
    capacity: Option<usize>,
}

impl MockRegistry {
    /// Unbounded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that accepts at most `capacity` names.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            things: Rc::default(),
            capacity: Some(capacity),
        }
    }

    /// Registered names, in registration order.
    pub fn things(&self) -> Vec<&'static str> {
        self.things.borrow().clone()
    }
}

impl CapabilityRegistry for MockRegistry {
    fn add_thing(&mut self, name: &'static str) -> Result<(), RegistryFull> {
        let mut things = self.things.borrow_mut();
        if self.capacity.is_some_and(|cap| things.len() >= cap) {
            return Err(RegistryFull);
        }
        things.push(name);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Mock input device
#[derive(Debug, Default)]
pub struct MockInput {
    events: VecDeque<InputEvent>,
}

impl MockInput {
    /// Create new mock input
    pub fn new() -> Self {
        Self::default()
    }

    /// Add event to queue
    pub fn add_event(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl InputDevice for MockInput {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }
}
