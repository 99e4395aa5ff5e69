use core::ops::Add;

use vtimer_cfg::TICK_HZ;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "log-base", derive(defmt::Format))]
/// A span of counter ticks.
///
/// Converts wall-clock units to ticks at `TICK_HZ`. Conversions round up so a
/// timer never fires early, and saturate at `u32::MAX` ticks; a duration
/// that long is still rejected when a timer is started with it.
pub struct Duration {
    ticks: u32,
}

const fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
const GCD_1K: u64 = gcd(TICK_HZ, 1_000);
const GCD_1M: u64 = gcd(TICK_HZ, 1_000_000);

impl Duration {
    /// Tick count of the `Duration`.
    pub const fn as_ticks(&self) -> u32 {
        self.ticks
    }

    /// Convert the `Duration` to microseconds, rounding down.
    pub const fn as_micros(&self) -> u64 {
        self.ticks as u64 * (1_000_000 / GCD_1M) / (TICK_HZ / GCD_1M)
    }

    /// Creates a duration from the specified number of clock ticks
    pub const fn from_ticks(ticks: u32) -> Duration {
        Duration { ticks }
    }

    /// Creates a duration from the specified number of seconds.
    pub const fn from_secs(secs: u64) -> Duration {
        Duration {
            ticks: saturate(secs.saturating_mul(TICK_HZ)),
        }
    }

    /// Creates a duration from the specified number of milliseconds, rounding up.
    pub const fn from_millis(millis: u64) -> Duration {
        Duration {
            ticks: saturate(div_ceil(millis.saturating_mul(TICK_HZ / GCD_1K), 1000 / GCD_1K)),
        }
    }

    /// Creates a duration from the specified number of microseconds, rounding up.
    /// NOTE: Delays this small may be inaccurate.
    pub const fn from_micros(micros: u64) -> Duration {
        Duration {
            ticks: saturate(div_ceil(micros.saturating_mul(TICK_HZ / GCD_1M), 1_000_000 / GCD_1M)),
        }
    }

    /// Adds one Duration to another, returning None in the event of an overflow.
    pub fn checked_add(self, rhs: Duration) -> Option<Duration> {
        self.ticks.checked_add(rhs.ticks).map(|ticks| Duration { ticks })
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration {
            ticks: self.ticks.saturating_add(rhs.ticks),
        }
    }
}

impl From<Duration> for u32 {
    fn from(d: Duration) -> u32 {
        d.ticks
    }
}

#[inline]
const fn div_ceil(num: u64, den: u64) -> u64 {
    num / den + (num % den != 0) as u64
}

#[inline]
const fn saturate(ticks: u64) -> u32 {
    if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}
