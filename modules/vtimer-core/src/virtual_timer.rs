//! The virtual timer scheduler
//!
//! `VirtualTimer` owns one hardware [`Driver`] and a pool of timer slots.
//! Thread-mode code starts and cancels timers; the driver's compare interrupt
//! calls [`VirtualTimer::on_interrupt`], which runs every due callback and
//! re-arms the compare register for the next one.
//!
//! ## Concurrency
//!
//! The slot pool and the queue sit behind a `critical_section::Mutex`. Every
//! public method takes the critical section for its own bookkeeping only, and
//! callbacks run with it released. A callback may therefore start or cancel
//! timers, including its own, from interrupt context.
//!
//! Callbacks run in the timer interrupt and must be short. A repeating
//! callback that takes longer than its period keeps the drain loop busy for
//! as long as it keeps falling behind.

use core::cell::RefCell;

use critical_section::Mutex;
use vtimer_cfg::MAX_TIMERS;
use vtimer_platform::{CounterSpace, Driver};

use crate::arena::{Callback, SlotState, TimerArena, TimerId, TimerNode};
use crate::error::Error;
use crate::timer_queue::TimerQueue;

struct TimerState<const N: usize> {
    arena: TimerArena<N>,
    queue: TimerQueue,
}

/// Many one-shot and repeating timers on one hardware compare register.
///
/// `N` is the number of timers that can be pending at once. Because
/// [`new`](VirtualTimer::new) is `const`, the scheduler can be a `static`
/// shared by thread mode and the interrupt vector:
///
/// ```ignore
/// static VTIMER: VirtualTimer<TimDriver> = VirtualTimer::new(TimDriver::new(84_000_000));
///
/// #[no_mangle]
/// pub extern "C" fn TIM2() {
///     VTIMER.on_interrupt();
/// }
/// ```
pub struct VirtualTimer<D: Driver, const N: usize = MAX_TIMERS> {
    driver: D,
    space: CounterSpace,
    state: Mutex<RefCell<TimerState<N>>>,
}

impl<D: Driver, const N: usize> VirtualTimer<D, N> {
    /// A scheduler over `driver` with no timers. Call [`init`](Self::init)
    /// before starting any.
    pub const fn new(driver: D) -> Self {
        Self {
            driver,
            space: CounterSpace::new(D::BITS),
            state: Mutex::new(RefCell::new(TimerState {
                arena: TimerArena::new(),
                queue: TimerQueue::new(),
            })),
        }
    }

    /// Bring up the hardware timer. Called once at start-up.
    pub fn init(&self) -> Result<(), Error> {
        timer_log!(info, "virtual timer init: {} slots, {}-bit counter", N, D::BITS);
        self.driver.init()?;
        Ok(())
    }

    /// Current counter value, on the same clock the timers use.
    pub fn now(&self) -> u32 {
        self.space.wrap(self.driver.now())
    }

    /// Run `callback` once, `delay` ticks from now.
    pub fn start_one_shot(&self, delay: u32, callback: Callback) -> Result<TimerId, Error> {
        self.start(delay, callback, false)
    }

    /// Run `callback` every `period` ticks, the first time `period` ticks from
    /// now, until cancelled.
    pub fn start_repeating(&self, period: u32, callback: Callback) -> Result<TimerId, Error> {
        self.start(period, callback, true)
    }

    fn start(&self, delay: u32, callback: Callback, repeat: bool) -> Result<TimerId, Error> {
        if delay > self.space.max_delay() || (repeat && delay == 0) {
            timer_log!(warn, "timer delay {} out of range", delay);
            return Err(Error::InvalidDuration);
        }

        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let TimerState { arena, queue } = &mut *state;

            let now = self.now();
            let fire_time = self.space.add(now, delay);
            let id = arena.alloc(TimerNode {
                fire_time,
                period: delay,
                callback,
                repeat,
            })?;
            queue.insert_sorted(arena, id.index(), self.space, now);
            timer_log!(trace, "timer {} due at {}", id.index(), fire_time);

            if queue.peek_first() == Some(id.index()) {
                self.driver.arm(fire_time);
            }
            Ok(id)
        })
    }

    /// Stop a timer so it never fires again.
    ///
    /// Returns [`Error::InvalidHandle`] when `id` is not pending any more: a
    /// one-shot that already fired, a timer cancelled before, or an id from a
    /// slot that has been reused. That outcome is expected when cancelling
    /// races with firing and is safe to ignore.
    ///
    /// Called from inside a timer's own callback, it stops a repeating timer
    /// from being scheduled again.
    pub fn cancel(&self, id: TimerId) -> Result<(), Error> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let TimerState { arena, queue } = &mut *state;

            let index = arena.lookup(id).ok_or(Error::InvalidHandle)?;
            match arena.slot(index).state {
                SlotState::Pending => {
                    let was_first = queue.peek_first() == Some(index);
                    queue.remove(arena, index);
                    arena.release(index);
                    timer_log!(trace, "timer {} cancelled", index);
                    if was_first {
                        self.rearm(arena, queue);
                    }
                    Ok(())
                }
                SlotState::Firing => {
                    // released by the drain loop once the callback returns
                    arena.slot_mut(index).state = SlotState::Cancelled;
                    Ok(())
                }
                SlotState::Cancelled | SlotState::Free => Err(Error::InvalidHandle),
            }
        })
    }

    /// Compare interrupt entry. Call from the timer's interrupt vector.
    ///
    /// Runs every timer that is due, oldest first, re-queues repeating ones one
    /// period after their scheduled time, and arms the compare register for
    /// the earliest timer left. The counter is read again before each timer,
    /// so timers that came due while callbacks ran are not left waiting for an
    /// interrupt that was already consumed.
    pub fn on_interrupt(&self) {
        // acknowledge first: an event raised from here on interrupts again
        self.driver.clear_event();
        timer_log!(trace, "compare interrupt at {}", self.now());

        while let Some((index, callback)) = self.take_due() {
            callback();
            self.finish(index);
        }

        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            self.rearm(&state.arena, &state.queue);
        });
    }

    /// Unlink the earliest timer if it is due and mark it as firing.
    fn take_due(&self) -> Option<(u16, Callback)> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let TimerState { arena, queue } = &mut *state;

            let head = queue.peek_first()?;
            if !self.space.is_due(arena.slot(head).node.fire_time, self.now()) {
                return None;
            }
            queue.remove_first(arena);
            let slot = arena.slot_mut(head);
            slot.state = SlotState::Firing;
            timer_log!(trace, "timer {} fired, due at {}", head, slot.node.fire_time);
            Some((head, slot.node.callback))
        })
    }

    /// Re-queue a repeating timer after its callback, or free the slot.
    fn finish(&self, index: u16) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let TimerState { arena, queue } = &mut *state;

            let slot = arena.slot_mut(index);
            if slot.state == SlotState::Firing && slot.node.repeat {
                // from the scheduled time, so interrupt latency does not add up
                slot.node.fire_time = self.space.add(slot.node.fire_time, slot.node.period);
                slot.state = SlotState::Pending;
                queue.insert_sorted(arena, index, self.space, self.now());
            } else {
                arena.release(index);
            }
        })
    }

    fn rearm(&self, arena: &TimerArena<N>, queue: &TimerQueue) {
        match queue.peek_first() {
            Some(index) => self.driver.arm(arena.slot(index).node.fire_time),
            None => self.driver.disarm(),
        }
    }

    /// Whether `id` is waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            state
                .arena
                .lookup(id)
                .is_some_and(|index| state.arena.slot(index).state == SlotState::Pending)
        })
    }

    /// Number of timers waiting to fire.
    pub fn pending_count(&self) -> usize {
        critical_section::with(|cs| self.state.borrow_ref(cs).queue.len())
    }

    /// Number of occupied slots, pending or with a callback running.
    pub fn slots_in_use(&self) -> usize {
        critical_section::with(|cs| self.state.borrow_ref(cs).arena.in_use())
    }

    /// Visit the pending timers from earliest to latest with their fire times.
    ///
    /// `f` runs inside the critical section and must not call back into the
    /// scheduler.
    pub fn for_each_pending(&self, mut f: impl FnMut(TimerId, u32)) {
        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            for index in state.queue.iter(&state.arena) {
                f(state.arena.id_of(index), state.arena.slot(index).node.fire_time);
            }
        })
    }

    /// The hardware driver underneath.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::sync::atomic::{AtomicU32, Ordering};
    use std::vec::Vec;

    use vtimer_platform::SimDriver;

    use super::*;

    fn noop() {}

    fn ready<const BITS: u32, const N: usize>() -> VirtualTimer<SimDriver<BITS>, N> {
        let vt = VirtualTimer::new(SimDriver::new());
        vt.init().unwrap();
        vt
    }

    fn service<const BITS: u32, const N: usize>(vt: &VirtualTimer<SimDriver<BITS>, N>) {
        while vt.driver().event_pending() {
            vt.on_interrupt();
        }
    }

    #[test]
    fn compare_follows_the_earliest_timer() {
        let vt: VirtualTimer<SimDriver, 4> = ready();
        assert_eq!(vt.driver().compare(), None);

        vt.start_one_shot(100, noop).unwrap();
        assert_eq!(vt.driver().compare(), Some(100));

        // a later timer leaves the compare alone
        vt.start_one_shot(300, noop).unwrap();
        assert_eq!(vt.driver().compare(), Some(100));

        let early = vt.start_one_shot(50, noop).unwrap();
        assert_eq!(vt.driver().compare(), Some(50));

        vt.cancel(early).unwrap();
        assert_eq!(vt.driver().compare(), Some(100));
    }

    #[test]
    fn cancelling_a_later_timer_keeps_the_compare() {
        let vt: VirtualTimer<SimDriver, 4> = ready();
        vt.start_one_shot(10, noop).unwrap();
        let later = vt.start_one_shot(20, noop).unwrap();
        vt.cancel(later).unwrap();
        assert_eq!(vt.driver().compare(), Some(10));
        assert_eq!(vt.pending_count(), 1);
    }

    #[test]
    fn last_cancel_disarms() {
        let vt: VirtualTimer<SimDriver, 4> = ready();
        let id = vt.start_one_shot(10, noop).unwrap();
        vt.cancel(id).unwrap();
        assert!(!vt.driver().is_armed());
        assert_eq!(vt.slots_in_use(), 0);
    }

    #[test]
    fn interrupt_frees_one_shots_and_disarms() {
        static FIRED: AtomicU32 = AtomicU32::new(0);
        fn hit() {
            FIRED.fetch_add(1, Ordering::Relaxed);
        }

        let vt: VirtualTimer<SimDriver, 4> = ready();
        let id = vt.start_one_shot(5, hit).unwrap();
        assert!(vt.is_pending(id));

        vt.driver().advance(5);
        service(&vt);

        assert_eq!(FIRED.load(Ordering::Relaxed), 1);
        assert!(!vt.is_pending(id));
        assert_eq!(vt.slots_in_use(), 0);
        assert!(!vt.driver().is_armed());
    }

    #[test]
    fn zero_delay_fires_on_the_next_interrupt() {
        static FIRED: AtomicU32 = AtomicU32::new(0);
        fn hit() {
            FIRED.fetch_add(1, Ordering::Relaxed);
        }

        let vt: VirtualTimer<SimDriver, 2> = ready();
        vt.start_one_shot(0, hit).unwrap();
        assert!(vt.driver().event_pending());
        service(&vt);
        assert_eq!(FIRED.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn repeating_timer_keeps_its_slot() {
        let vt: VirtualTimer<SimDriver, 2> = ready();
        let id = vt.start_repeating(10, noop).unwrap();

        vt.driver().set_now(10);
        service(&vt);

        assert!(vt.is_pending(id));
        assert_eq!(vt.slots_in_use(), 1);
        assert_eq!(vt.driver().compare(), Some(20));
    }

    #[test]
    fn pending_timers_listed_in_fire_order() {
        let vt: VirtualTimer<SimDriver, 4> = ready();
        let a = vt.start_one_shot(30, noop).unwrap();
        let b = vt.start_one_shot(10, noop).unwrap();
        let c = vt.start_one_shot(20, noop).unwrap();

        let mut seen = Vec::new();
        vt.for_each_pending(|id, at| seen.push((id, at)));
        assert_eq!(seen, [(b, 10), (c, 20), (a, 30)]);
    }

    #[test]
    fn delay_limit_is_half_the_counter() {
        let vt: VirtualTimer<SimDriver<8>, 2> = ready();
        assert_eq!(vt.start_one_shot(128, noop), Err(Error::InvalidDuration));
        assert!(vt.start_one_shot(127, noop).is_ok());
        assert_eq!(vt.start_repeating(0, noop), Err(Error::InvalidDuration));
        assert_eq!(vt.pending_count(), 1);
    }

    #[test]
    fn now_reads_the_driver() {
        let vt: VirtualTimer<SimDriver<8>, 2> = ready();
        vt.driver().advance(300);
        assert_eq!(vt.now(), 300 % 256);
    }
}
