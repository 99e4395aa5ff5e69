//! Timer Driver Traits and Types
//!
//! This module defines the interface between the virtual timer scheduler and
//! the one hardware timer it multiplexes.
//!
//! ## Timer Architecture
//!
//! The hardware is modelled as:
//! - a free-running counter, `BITS` wide, that wraps to zero
//! - a single compare register that raises one interrupt line on match
//! - an event flag that stays set until it is cleared by software
//!
//! The driver does not know about logical timers. The scheduler decides what
//! the compare register holds; the driver only guarantees that an armed
//! compare eventually interrupts, even when the target is already behind the
//! counter.

use core::fmt;

/// Errors raised while bringing up the hardware timer.
///
/// These only occur in [`Driver::init`]; a running timer has no failure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "log-base", derive(defmt::Format))]
pub enum DriverError {
    /// The counter width is outside `1..=32`.
    UnsupportedWidth {
        /// width that was requested
        bits: u32,
    },
    /// The input clock cannot be divided down to `TICK_HZ` by the prescaler.
    PrescalerOutOfRange {
        /// input clock divided by the tick rate
        ratio: u32,
    },
    /// The input clock of the timer was never provided.
    ClockNotConfigured,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::UnsupportedWidth { bits } => {
                write!(f, "unsupported counter width: {} bits", bits)
            }
            DriverError::PrescalerOutOfRange { ratio } => {
                write!(f, "prescaler out of range for clock ratio {}", ratio)
            }
            DriverError::ClockNotConfigured => f.write_str("timer input clock not configured"),
        }
    }
}

/// Timer driver trait for the hardware abstraction layer
///
/// Implemented once per hardware timer. Every method takes `&self` because
/// the driver is reached from thread mode and from its own interrupt.
///
/// ## Implementation Requirements
///
/// - `now` is safe to call from both contexts and never blocks
/// - `arm` with a target that is already due must still produce an interrupt
/// - `clear_event` acknowledges the compare event so it does not re-enter
pub trait Driver: Send + Sync {
    /// Width of the counter in bits. Tick values wrap at `2^BITS`.
    const BITS: u32;

    /// Configure the tick rate and counter width, clear the counter, enable
    /// the compare interrupt line and start counting.
    ///
    /// Called exactly once, before any other method.
    fn init(&self) -> Result<(), DriverError>;

    /// Current counter value, already reduced to `BITS` bits.
    fn now(&self) -> u32;

    /// Load the compare register with `at` and enable its interrupt.
    ///
    /// If `at` is not ahead of the counter any more, the driver raises the
    /// compare event itself so the interrupt still runs.
    fn arm(&self, at: u32);

    /// Leave the compare register inert; no compare interrupt until the next
    /// [`arm`](Driver::arm).
    fn disarm(&self);

    /// Acknowledge the compare event. First thing the interrupt handler does.
    fn clear_event(&self);
}
