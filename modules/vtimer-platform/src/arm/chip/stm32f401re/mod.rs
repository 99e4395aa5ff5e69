//! STM32F401RE support
//!
//! The virtual timer runs on one of the two 32-bit general purpose timers,
//! TIM2 or TIM5, selected with `time_driver_tim2` / `time_driver_tim5`.

pub mod timer_driver;

pub use timer_driver::{TimDriver, TIMER_INTERRUPT};
