#![no_main]
#![no_std]

//! Flag polling on a repeating timer
//!
//! A repeating timer raises a flag every 500 ms from the TIM2 interrupt. The
//! main loop sleeps until an interrupt, services the flag in thread mode,
//! logs the counter value and toggles the user LED (PA5).

use core::sync::atomic::{AtomicBool, Ordering};

use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_probe as _;
use vtimer_core::{Duration, VirtualTimer};
use vtimer_log::info;
use vtimer_platform::chip::TimDriver;
use vtimer_platform::pac::{gpio::vals, GPIOA, RCC};

/// TIM2 kernel clock after reset: 16 MHz HSI with APB1 undivided
const TIMER_CLOCK_HZ: u32 = 16_000_000;
const LED_PIN: usize = 5;

static VTIMER: VirtualTimer<TimDriver> = VirtualTimer::new(TimDriver::new(TIMER_CLOCK_HZ));

static POLL_FLAG: AtomicBool = AtomicBool::new(false);

#[no_mangle]
pub extern "C" fn TIM2() {
    VTIMER.on_interrupt();
}

fn poll() {
    POLL_FLAG.store(true, Ordering::Release);
}

fn led_init() {
    RCC.ahb1enr().modify(|v| v.set_gpioaen(true));
    GPIOA.moder().modify(|v| v.set_moder(LED_PIN, vals::Moder::OUTPUT));
    GPIOA.otyper().modify(|v| v.set_ot(LED_PIN, vals::Ot::PUSHPULL));
}

fn toggle_led() {
    GPIOA.odr().modify(|v| {
        let next = match v.odr(LED_PIN) {
            vals::Odr::HIGH => vals::Odr::LOW,
            _ => vals::Odr::HIGH,
        };
        v.set_odr(LED_PIN, next);
    });
}

#[entry]
fn main() -> ! {
    led_init();
    defmt::unwrap!(VTIMER.init());
    info!("virtual timer up, {} Hz ticks", vtimer_core::TICK_HZ);

    let period = Duration::from_millis(500);
    defmt::unwrap!(VTIMER.start_repeating(period.into(), poll));

    let mut polls: u32 = 0;
    loop {
        cortex_m::asm::wfi();
        if POLL_FLAG.swap(false, Ordering::Acquire) {
            polls += 1;
            info!("poll {} at tick {}", polls, VTIMER.now());
            toggle_led();
        }
    }
}
