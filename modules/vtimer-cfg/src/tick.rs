// When several rates are enabled by feature unification the fastest one wins.

#[cfg(feature = "tick-hz-1_000_000")]
pub const TICK_HZ: u64 = 1_000_000;

#[cfg(all(feature = "tick-hz-32_768", not(feature = "tick-hz-1_000_000")))]
pub const TICK_HZ: u64 = 32_768;

#[cfg(all(
    feature = "tick-hz-1_000",
    not(any(feature = "tick-hz-32_768", feature = "tick-hz-1_000_000"))
))]
pub const TICK_HZ: u64 = 1_000;

#[cfg(not(any(
    feature = "tick-hz-1_000",
    feature = "tick-hz-32_768",
    feature = "tick-hz-1_000_000"
)))]
pub const TICK_HZ: u64 = 1_000_000;
