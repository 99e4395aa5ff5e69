//! Platform trait definitions

pub mod timer;

pub use timer::{Driver, DriverError};
