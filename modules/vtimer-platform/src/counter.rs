//! Tick arithmetic on a wrapping hardware counter
//!
//! A `BITS`-wide counter runs from `0` to `2^BITS - 1` and starts over. Two
//! tick values can only be ordered relative to a reference point, so every
//! comparison here is done on distances modulo `2^BITS`:
//!
//! - a timer is *due* when the counter is at most half a wrap past it
//! - pending timers are *ordered* by their distance from the point half a
//!   wrap behind the counter, which keeps overdue timers ahead of future ones
//!
//! Both rules hold as long as no delay reaches half a wrap and no timer stays
//! overdue for half a wrap, so delays are capped at [`CounterSpace::max_delay`].

/// Modular arithmetic for one counter width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSpace {
    mask: u32,
}

impl CounterSpace {
    /// Arithmetic for a counter `bits` wide. Widths above 32 are clamped to
    /// 32 and a width of 0 is treated as 1.
    pub const fn new(bits: u32) -> Self {
        let mask = if bits >= 32 {
            u32::MAX
        } else if bits == 0 {
            1
        } else {
            (1u32 << bits) - 1
        };
        Self { mask }
    }

    /// Largest counter value.
    pub const fn mask(self) -> u32 {
        self.mask
    }

    /// Half a wrap, in ticks.
    pub const fn half(self) -> u32 {
        (self.mask >> 1) + 1
    }

    /// Longest delay that can still be ordered against the current time.
    pub const fn max_delay(self) -> u32 {
        self.half() - 1
    }

    /// Reduce a raw value to the counter width.
    pub const fn wrap(self, t: u32) -> u32 {
        t & self.mask
    }

    /// `t + ticks`, wrapped.
    pub const fn add(self, t: u32, ticks: u32) -> u32 {
        t.wrapping_add(ticks) & self.mask
    }

    /// Ticks from `from` forward to `to`.
    pub const fn elapsed(self, from: u32, to: u32) -> u32 {
        to.wrapping_sub(from) & self.mask
    }

    /// Whether a timer that fires at `at` is due when the counter reads `now`.
    pub const fn is_due(self, at: u32, now: u32) -> bool {
        self.elapsed(at, now) < self.half()
    }

    /// Sort key of `at` relative to `now`. Smaller keys fire earlier.
    pub const fn order_key(self, at: u32, now: u32) -> u32 {
        self.elapsed(now.wrapping_sub(self.half()), at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_follow_width() {
        assert_eq!(CounterSpace::new(8).mask(), 0xff);
        assert_eq!(CounterSpace::new(16).mask(), 0xffff);
        assert_eq!(CounterSpace::new(32).mask(), u32::MAX);
        assert_eq!(CounterSpace::new(8).half(), 0x80);
        assert_eq!(CounterSpace::new(32).max_delay(), 0x7fff_ffff);
    }

    #[test]
    fn add_wraps_at_width() {
        let space = CounterSpace::new(8);
        assert_eq!(space.add(250, 10), 4);
        assert_eq!(space.add(0, 255), 255);
        let space = CounterSpace::new(32);
        assert_eq!(space.add(u32::MAX, 1), 0);
    }

    #[test]
    fn due_across_the_wrap() {
        let space = CounterSpace::new(8);
        // fires at 4, i.e. after the counter wrapped past 255
        assert!(!space.is_due(4, 250));
        assert!(!space.is_due(4, 255));
        assert!(!space.is_due(4, 3));
        assert!(space.is_due(4, 4));
        assert!(space.is_due(4, 20));
        // a naive `at <= now` would call this due straight away
        assert!(!space.is_due(200, 100));
    }

    #[test]
    fn order_key_puts_overdue_first() {
        let space = CounterSpace::new(8);
        let now = 250;
        let overdue = 240;
        let soon = 253;
        let wrapped = 5;
        let far = space.add(now, space.max_delay());
        let keys = [
            space.order_key(overdue, now),
            space.order_key(now, now),
            space.order_key(soon, now),
            space.order_key(wrapped, now),
            space.order_key(far, now),
        ];
        assert!(keys.windows(2).all(|w| w[0] < w[1]), "{:?}", keys);
    }
}
