#![no_main]
#![no_std]

//! LED blink from a self-restarting one-shot
//!
//! Each toggle of the user LED (PA5) starts the next one-shot from inside
//! the TIM2 interrupt, so the blink runs without a repeating timer and with
//! the main loop asleep.

use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_probe as _;
use vtimer_core::{Duration, VirtualTimer};
use vtimer_log::{info, warn};
use vtimer_platform::chip::TimDriver;
use vtimer_platform::pac::{gpio::vals, GPIOA, RCC};

/// TIM2 kernel clock after reset: 16 MHz HSI with APB1 undivided
const TIMER_CLOCK_HZ: u32 = 16_000_000;
const LED_PIN: usize = 5;
const HALF_PERIOD_MS: u64 = 500;

static VTIMER: VirtualTimer<TimDriver> = VirtualTimer::new(TimDriver::new(TIMER_CLOCK_HZ));

#[no_mangle]
pub extern "C" fn TIM2() {
    VTIMER.on_interrupt();
}

fn led_init() {
    RCC.ahb1enr().modify(|v| v.set_gpioaen(true));
    GPIOA.moder().modify(|v| v.set_moder(LED_PIN, vals::Moder::OUTPUT));
    GPIOA.otyper().modify(|v| v.set_ot(LED_PIN, vals::Ot::PUSHPULL));
    GPIOA.ospeedr().modify(|v| v.set_ospeedr(LED_PIN, vals::Ospeedr::LOWSPEED));
    GPIOA.pupdr().modify(|v| v.set_pupdr(LED_PIN, vals::Pupdr::FLOATING));
}

fn blink() {
    GPIOA.odr().modify(|v| {
        let next = match v.odr(LED_PIN) {
            vals::Odr::HIGH => vals::Odr::LOW,
            _ => vals::Odr::HIGH,
        };
        v.set_odr(LED_PIN, next);
    });

    if let Err(e) = VTIMER.start_one_shot(Duration::from_millis(HALF_PERIOD_MS).into(), blink) {
        warn!("blink stopped: {}", e);
    }
}

#[entry]
fn main() -> ! {
    led_init();
    defmt::unwrap!(VTIMER.init());

    defmt::unwrap!(VTIMER.start_one_shot(Duration::from_millis(HALF_PERIOD_MS).into(), blink));
    info!("blinking every {} ms", HALF_PERIOD_MS);

    loop {
        cortex_m::asm::wfi();
    }
}
