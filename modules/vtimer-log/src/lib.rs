//! Logging macros for the virtual timer crates
//!
//! The base macros wrap the `defmt` crate. When the "log-base" feature is
//! enabled they forward to `defmt`, otherwise they expand to nothing, so a
//! host build never links a logger. The category macros (`timer_log!`,
//! `driver_log!`, `mem_log!`) are switched on one by one with their own
//! features and pick the level at the call site:
//!
//! ```ignore
//! timer_log!(trace, "armed compare at {}", at);
//! driver_log!(error, "prescaler out of range: {}", ratio);
//! ```

#![no_std]

#[cfg(feature = "log-base")]
use defmt_rtt as _;

#[cfg(feature = "log-base")]
#[doc(hidden)]
pub use defmt;

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { $crate::__log!(debug, $($arg)*) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { $crate::__log!(error, $($arg)*) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { $crate::__log!(info, $($arg)*) };
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { $crate::__log!(trace, $($arg)*) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { $crate::__log!(warn, $($arg)*) };
}

// Forward to defmt or become no-op based on features
#[cfg(feature = "log-base")]
#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:ident, $($arg:tt)*) => {
        $crate::defmt::$level!($($arg)*)
    };
}

#[cfg(not(feature = "log-base"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:ident, $($arg:tt)*) => {};
}

// Scheduler logging macros
#[cfg(feature = "log-timer")]
#[macro_export]
macro_rules! timer_log {
    ($level:ident, $($args:tt)*) => { $crate::$level!($($args)*); };
}

#[cfg(not(feature = "log-timer"))]
#[macro_export]
macro_rules! timer_log {
    ($level:ident, $($args:tt)*) => {};
}

// Hardware driver logging macros
#[cfg(feature = "log-driver")]
#[macro_export]
macro_rules! driver_log {
    ($level:ident, $($args:tt)*) => { $crate::$level!($($args)*); };
}

#[cfg(not(feature = "log-driver"))]
#[macro_export]
macro_rules! driver_log {
    ($level:ident, $($args:tt)*) => {};
}

// Slot arena logging macros
#[cfg(feature = "log-mem")]
#[macro_export]
macro_rules! mem_log {
    ($level:ident, $($args:tt)*) => { $crate::$level!($($args)*); };
}

#[cfg(not(feature = "log-mem"))]
#[macro_export]
macro_rules! mem_log {
    ($level:ident, $($args:tt)*) => {};
}
