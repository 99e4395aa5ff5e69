#![no_std]

//! Hardware timer layer for the virtual timer scheduler
//!
//! One free-running counter with one compare register is all the scheduler
//! needs. This crate describes that resource as a trait and ships the
//! implementations of it.
//!
//! ## Organization
//!
//! - [`traits`]: the [`Driver`] trait and [`DriverError`]
//! - [`counter`]: modular arithmetic over a counter of any width up to 32 bits
//! - [`sim`]: a software counter for host tests
//! - `chip`: the STM32F401RE driver (feature `stm32f401re`)

#[macro_use]
extern crate vtimer_log;

pub mod counter;
pub mod sim;
pub mod traits;

pub use counter::CounterSpace;
pub use sim::SimDriver;
pub use traits::timer::{Driver, DriverError};

// ===== PLATFORM SELECTION =====

// ARM Cortex-M platforms
#[cfg(feature = "arm")]
pub mod arm;

#[cfg(feature = "stm32f401re")]
pub use arm::chip::stm32f401re as chip;

#[cfg(feature = "stm32f401re")]
pub use stm32_metapac as pac;
