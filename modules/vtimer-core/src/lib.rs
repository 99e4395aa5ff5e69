#![no_std]

//! Virtual timers over one hardware compare interrupt
//!
//! Any number of one-shot and repeating software timers, up to
//! [`MAX_TIMERS`], share a single free-running counter. Pending timers are
//! kept in a list sorted by fire time; the compare register always holds the
//! earliest one, and its interrupt runs every callback that has come due.
//!
//! ## Organization
//!
//! - [`VirtualTimer`]: the scheduler, `start_one_shot`, `start_repeating`,
//!   `cancel` and the `on_interrupt` entry point
//! - [`duration`]: wall-clock to tick conversion at `TICK_HZ`
//! - [`error`]: the error codes every call can return
//!
//! The hardware side is the [`Driver`] trait from `vtimer-platform`, re-exported
//! here together with the simulated counter used by the tests.

#[macro_use]
extern crate vtimer_log;

mod arena;
pub mod duration;
pub mod error;
mod timer_queue;
mod virtual_timer;

pub use arena::{Callback, TimerId};
pub use duration::Duration;
pub use error::Error;
pub use virtual_timer::VirtualTimer;

pub use vtimer_cfg::{MAX_TIMERS, TICK_HZ};
pub use vtimer_platform::{CounterSpace, Driver, DriverError, SimDriver};
