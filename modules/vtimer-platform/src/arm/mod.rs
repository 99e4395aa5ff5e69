//! ARM Cortex-M platforms

pub mod chip;
