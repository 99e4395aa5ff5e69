#![no_std]

//! Build-time configuration shared by the virtual timer crates.
//!
//! - [`TICK_HZ`]: rate of the hardware counter, chosen with a `tick-hz-*` feature
//! - [`MAX_TIMERS`]: default number of timer slots, from `VTIMER_MAX_TIMERS`

/// timer timebase tick
mod tick;

include!(concat!(env!("OUT_DIR"), "/config.rs"));

/// Ticks per second of the hardware counter. The reference rate is 1 MHz,
/// one tick per microsecond.
///
/// This value is specified by the Cargo features "`tick-hz-*`"
pub const TICK_HZ: u64 = tick::TICK_HZ;
