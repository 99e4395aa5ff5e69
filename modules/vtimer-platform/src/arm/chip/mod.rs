//! Chip support for ARM Cortex-M

#[cfg(feature = "stm32f401re")]
pub mod stm32f401re;
