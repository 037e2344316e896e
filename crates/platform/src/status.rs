//! Status codes returned by the underlying hardware layer
//!
//! Every HAL call in this crate reports failure as a [`HalStatus`]. The
//! numeric codes follow the vendor SDK convention so that a status logged on
//! target can be looked up directly in the SDK documentation.

/// Failure status of a hardware call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalStatus {
    /// Out of memory while allocating driver state (`0x101`).
    NoMem,
    /// An argument was rejected, e.g. a voltage outside the channel range (`0x102`).
    InvalidArg,
    /// The resource is in the wrong state, e.g. a channel already claimed (`0x103`).
    InvalidState,
    /// The requested resource does not exist (`0x105`).
    NotFound,
    /// The hardware does not support the requested mode (`0x106`).
    NotSupported,
    /// The operation timed out (`0x107`).
    Timeout,
    /// Generic failure (`-1`).
    Fail,
}

impl HalStatus {
    /// Numeric status code as reported by the vendor SDK.
    pub const fn code(self) -> i32 {
        match self {
            Self::NoMem => 0x101,
            Self::InvalidArg => 0x102,
            Self::InvalidState => 0x103,
            Self::NotFound => 0x105,
            Self::NotSupported => 0x106,
            Self::Timeout => 0x107,
            Self::Fail => -1,
        }
    }

    /// Map a raw SDK status code back to a [`HalStatus`].
    ///
    /// Returns `None` for `0` (success). Unknown non-zero codes map to
    /// [`HalStatus::Fail`].
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => None,
            0x101 => Some(Self::NoMem),
            0x102 => Some(Self::InvalidArg),
            0x103 => Some(Self::InvalidState),
            0x105 => Some(Self::NotFound),
            0x106 => Some(Self::NotSupported),
            0x107 => Some(Self::Timeout),
            _ => Some(Self::Fail),
        }
    }

    /// Short SDK-style name, e.g. `"ESP_ERR_INVALID_ARG"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoMem => "ESP_ERR_NO_MEM",
            Self::InvalidArg => "ESP_ERR_INVALID_ARG",
            Self::InvalidState => "ESP_ERR_INVALID_STATE",
            Self::NotFound => "ESP_ERR_NOT_FOUND",
            Self::NotSupported => "ESP_ERR_NOT_SUPPORTED",
            Self::Timeout => "ESP_ERR_TIMEOUT",
            Self::Fail => "ESP_FAIL",
        }
    }
}

impl core::fmt::Display for HalStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({:#x})", self.name(), self.code())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalStatus {}
