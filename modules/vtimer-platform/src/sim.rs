//! Software-simulated hardware timer
//!
//! `SimDriver` behaves like a free-running counter with one compare channel,
//! except that time only moves when the test says so. Width is a const
//! parameter so wraparound can be reached in a handful of ticks:
//!
//! ```
//! use vtimer_platform::{Driver, SimDriver};
//!
//! let hw: SimDriver<8> = SimDriver::new();
//! hw.init().unwrap();
//! hw.set_now(250);
//! hw.arm(4);
//! assert!(!hw.event_pending());
//! hw.advance(10); // 250 -> 4, through the wrap
//! assert!(hw.event_pending());
//! ```

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::counter::CounterSpace;
use crate::traits::timer::{Driver, DriverError};

/// Simulated counter of `BITS` bits with a single compare register.
pub struct SimDriver<const BITS: u32 = 32> {
    counter: AtomicU32,
    compare: AtomicU32,
    armed: AtomicBool,
    event: AtomicBool,
}

impl<const BITS: u32> SimDriver<BITS> {
    const SPACE: CounterSpace = CounterSpace::new(BITS);

    /// A stopped counter at zero with nothing armed.
    pub const fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
            compare: AtomicU32::new(0),
            armed: AtomicBool::new(false),
            event: AtomicBool::new(false),
        }
    }

    /// Move the counter forward by `ticks`. Returns whether a compare event
    /// is pending afterwards.
    pub fn advance(&self, ticks: u32) -> bool {
        let from = self.counter.load(Ordering::Relaxed);
        let to = Self::SPACE.add(from, ticks);
        self.counter.store(to, Ordering::Relaxed);

        if self.armed.load(Ordering::Relaxed) {
            let at = self.compare.load(Ordering::Relaxed);
            let distance = Self::SPACE.elapsed(from, at);
            // the match happens when the counter steps onto `at`
            if (distance != 0 && distance <= ticks) || ticks > Self::SPACE.mask() {
                driver_log!(trace, "sim compare match at {}", at);
                self.event.store(true, Ordering::Relaxed);
            }
        }
        self.event.load(Ordering::Relaxed)
    }

    /// Move the counter forward until it reads `t`. Always moves forward, so a
    /// value behind the counter means "after the next wrap".
    pub fn set_now(&self, t: u32) -> bool {
        let from = self.counter.load(Ordering::Relaxed);
        self.advance(Self::SPACE.elapsed(from, t))
    }

    /// Whether the compare event flag is set and waiting to be serviced.
    pub fn event_pending(&self) -> bool {
        self.event.load(Ordering::Relaxed)
    }

    /// The armed compare value, if any.
    pub fn compare(&self) -> Option<u32> {
        if self.armed.load(Ordering::Relaxed) {
            Some(self.compare.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// Whether the compare interrupt is enabled.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Relaxed)
    }
}

impl<const BITS: u32> Default for SimDriver<BITS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BITS: u32> Driver for SimDriver<BITS> {
    const BITS: u32 = BITS;

    fn init(&self) -> Result<(), DriverError> {
        if BITS == 0 || BITS > 32 {
            driver_log!(error, "sim counter width {} not supported", BITS);
            return Err(DriverError::UnsupportedWidth { bits: BITS });
        }
        self.counter.store(0, Ordering::Relaxed);
        self.armed.store(false, Ordering::Relaxed);
        self.event.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn now(&self) -> u32 {
        self.counter.load(Ordering::Relaxed)
    }

    fn arm(&self, at: u32) {
        let at = Self::SPACE.wrap(at);
        self.compare.store(at, Ordering::Relaxed);
        self.armed.store(true, Ordering::Relaxed);
        // already reached: real hardware would miss it until the next wrap
        if Self::SPACE.is_due(at, self.now()) {
            self.event.store(true, Ordering::Relaxed);
        }
    }

    fn disarm(&self) {
        self.armed.store(false, Ordering::Relaxed);
        self.compare.store(0, Ordering::Relaxed);
    }

    fn clear_event(&self) {
        self.event.store(false, Ordering::Relaxed);
    }
}
