//! Input device abstraction
//!
//! Button handling itself lives outside the bring-up core; the board only
//! owns the device and hands it to the application layer.

/// Input device trait for board buttons.
pub trait InputDevice {
    /// Poll for an event (non-blocking).
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// Input events from a push button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Button pressed
    ButtonPress(Button),
    /// Button released
    ButtonRelease(Button),
    /// Press followed by release within the click window
    Click(Button),
    /// Button held for extended period
    ButtonLongPress(Button),
}

/// Physical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// BOOT strapping button, doubles as the chat toggle
    Boot,
    /// Volume up
    VolumeUp,
    /// Volume down
    VolumeDown,
}
