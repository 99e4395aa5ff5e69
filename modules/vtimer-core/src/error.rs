//! Error codes of the virtual timer API

use core::fmt;

use vtimer_platform::DriverError;

/// Everything a virtual timer call can report back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "log-base", derive(defmt::Format))]
pub enum Error {
    /// Every timer slot is in use. Nothing was scheduled.
    ResourceExhausted,
    /// The timer id is not pending: it already fired, was cancelled, or was
    /// never handed out. Cancelling such an id is harmless.
    InvalidHandle,
    /// The delay reaches half a counter wrap, or a repeating period is zero.
    InvalidDuration,
    /// The hardware timer could not be brought up.
    HardwareFault(DriverError),
}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Error::HardwareFault(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ResourceExhausted => f.write_str("no free timer slot"),
            Error::InvalidHandle => f.write_str("timer id is not pending"),
            Error::InvalidDuration => f.write_str("timer delay out of range"),
            Error::HardwareFault(e) => write!(f, "hardware timer fault: {}", e),
        }
    }
}
