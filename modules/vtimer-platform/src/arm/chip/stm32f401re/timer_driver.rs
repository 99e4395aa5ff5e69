/*
*********************************************************************************************************
*                                 Platform Timer Driver - STM32F401RE
*********************************************************************************************************
*/

//! STM32F401RE Timer Driver Implementation
//!
//! A 32-bit general purpose timer (TIM2 or TIM5) counts at `TICK_HZ` and
//! wraps at `u32::MAX`. Capture/compare channel 1 is the single compare
//! register the scheduler arms; no other channel is touched, so arming,
//! disarming and cancellation always agree on which register holds the next
//! wake time.
//!
//! ## Hardware Configuration
//!
//! - **Clock source**: timer kernel clock on APB1, passed to [`TimDriver::new`]
//! - **Timer frequency**: `TICK_HZ` (1 MHz by default) via the prescaler
//! - **Interrupts**: CC1 only; the update interrupt stays off
//!
//! The interrupt vector belongs to the application, which forwards it to the
//! scheduler:
//!
//! ```ignore
//! #[no_mangle]
//! pub extern "C" fn TIM2() {
//!     VTIMER.on_interrupt();
//! }
//! ```
use core::sync::atomic::{compiler_fence, Ordering};

use cortex_m::peripheral::NVIC;
use stm32_metapac::timer::{regs, vals};
use stm32_metapac::{Interrupt, RCC};
use vtimer_cfg::TICK_HZ;

use crate::counter::CounterSpace;
use crate::traits::timer::{Driver, DriverError};

/// Timer peripheral selection based on feature flags
#[cfg(feature = "time_driver_tim2")]
pub const TIMER: stm32_metapac::timer::TimGp32 = stm32_metapac::TIM2;
#[cfg(feature = "time_driver_tim5")]
pub const TIMER: stm32_metapac::timer::TimGp32 = stm32_metapac::TIM5;

/// Interrupt line of the selected timer.
#[cfg(feature = "time_driver_tim2")]
pub const TIMER_INTERRUPT: Interrupt = Interrupt::TIM2;
#[cfg(feature = "time_driver_tim5")]
pub const TIMER_INTERRUPT: Interrupt = Interrupt::TIM5;

/// Timer enable/disable constants for readability
const DISABLE: bool = false;
const ENABLE: bool = true;

/// The compare channel used for every wake time.
const COMPARE_CHANNEL: usize = 0;

const SPACE: CounterSpace = CounterSpace::new(32);

/// Virtual timer driver on a 32-bit STM32 general purpose timer.
pub struct TimDriver {
    /// Input clock of the timer kernel in Hz
    timer_clock_hz: u32,
}

impl TimDriver {
    /// A driver for a timer clocked at `timer_clock_hz`.
    ///
    /// With APB1 divided down from the system clock the timer kernel runs at
    /// twice the APB1 frequency; pass that doubled value.
    pub const fn new(timer_clock_hz: u32) -> Self {
        Self { timer_clock_hz }
    }

    fn prescaler(&self) -> Result<u16, DriverError> {
        if self.timer_clock_hz == 0 {
            return Err(DriverError::ClockNotConfigured);
        }
        let ratio = self.timer_clock_hz as u64 / TICK_HZ;
        ratio
            .checked_sub(1)
            .and_then(|psc| u16::try_from(psc).ok())
            .ok_or(DriverError::PrescalerOutOfRange { ratio: ratio as u32 })
    }
}

impl Driver for TimDriver {
    const BITS: u32 = 32;

    fn init(&self) -> Result<(), DriverError> {
        driver_log!(trace, "init of TimDriver");

        let psc = self.prescaler().map_err(|e| {
            driver_log!(error, "timer prescaler: {}", e);
            e
        })?;

        enable_timer();

        // disable the Timer while it is configured
        TIMER.cr1().modify(|w| w.set_cen(DISABLE));
        TIMER.cnt().write(|w| w.set_cnt(0));

        TIMER.psc().write_value(psc);
        TIMER.arr().write(|w| w.set_arr(u32::MAX));

        // Setting UG generates an update event immediately, which reloads the
        // prescaler and clears the counter. URS keeps that event from setting
        // the update flag.
        TIMER.cr1().modify(|w| w.set_urs(vals::Urs::COUNTERONLY));
        TIMER.egr().write(|w| w.set_ug(true));
        TIMER.cr1().modify(|w| w.set_urs(vals::Urs::ANYEVENT));

        // nothing is armed until the first timer starts
        TIMER.dier().write(|w| w.set_ccie(COMPARE_CHANNEL, DISABLE));
        TIMER.sr().write_value(regs::SrGp16(0));

        NVIC::unpend(TIMER_INTERRUPT);
        unsafe {
            compiler_fence(Ordering::SeqCst);
            NVIC::unmask(TIMER_INTERRUPT);
        }

        TIMER.cr1().modify(|w| w.set_cen(ENABLE));
        driver_log!(info, "timer running, psc {}", psc);
        Ok(())
    }

    fn now(&self) -> u32 {
        TIMER.cnt().read().cnt()
    }

    fn arm(&self, at: u32) {
        driver_log!(trace, "arm compare at {}", at);
        TIMER.ccr(COMPARE_CHANNEL).write(|w| w.set_ccr(at));
        TIMER.dier().modify(|w| w.set_ccie(COMPARE_CHANNEL, ENABLE));

        // A compare only matches when the counter steps onto `at`. If the
        // counter is already there or past it, generate the event by hand.
        if SPACE.is_due(at, self.now()) {
            driver_log!(trace, "compare {} already reached", at);
            TIMER.egr().write(|w| w.set_ccg(COMPARE_CHANNEL, true));
        }
    }

    fn disarm(&self) {
        driver_log!(trace, "disarm compare");
        TIMER.dier().modify(|w| w.set_ccie(COMPARE_CHANNEL, DISABLE));
    }

    fn clear_event(&self) {
        // Bits in SR are "write 0 to clear", so write the bitwise NOT.
        // Writing all zeros or read-modify-write can lose an event that lands
        // between the read and the write.
        let sr = TIMER.sr().read();
        TIMER.sr().write_value(regs::SrGp16(!sr.0));
    }
}

fn enable_timer() {
    #[cfg(feature = "time_driver_tim2")]
    RCC.apb1enr().modify(|v| v.set_tim2en(ENABLE));
    #[cfg(feature = "time_driver_tim5")]
    RCC.apb1enr().modify(|v| v.set_tim5en(ENABLE));
}
