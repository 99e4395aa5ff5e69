//! Timer Queue of pending timers
//!
//! A singly linked list threaded through the arena slots, sorted by fire
//! time. The head is always the next timer due. Timers with the same fire
//! time keep the order they were inserted in.
//!
//! Fire times wrap with the counter, so they are compared with
//! [`CounterSpace::order_key`] relative to the current time rather than by
//! value. The queue itself holds no lock: every method expects the caller to
//! be inside the scheduler's critical section.

use vtimer_platform::CounterSpace;

use crate::arena::TimerArena;

pub(crate) struct TimerQueue {
    /// head of the timer queue, the earliest timer
    head: Option<u16>,
    len: usize,
}

impl TimerQueue {
    pub(crate) const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Link slot `index` in behind every timer due no later than it.
    pub(crate) fn insert_sorted<const N: usize>(
        &mut self,
        arena: &mut TimerArena<N>,
        index: u16,
        space: CounterSpace,
        now: u32,
    ) {
        let key = space.order_key(arena.slot(index).node.fire_time, now);

        // range from head to find the first one due strictly later
        let mut prev: Option<u16> = None;
        let mut cur = self.head;
        while let Some(cur_index) = cur {
            let cur_slot = arena.slot(cur_index);
            if space.order_key(cur_slot.node.fire_time, now) > key {
                break;
            }
            prev = cur;
            cur = cur_slot.next;
        }

        arena.slot_mut(index).next = cur;
        match prev {
            Some(prev_index) => arena.slot_mut(prev_index).next = Some(index),
            None => self.head = Some(index),
        }
        self.len += 1;
    }

    /// The earliest timer, left in place.
    pub(crate) fn peek_first(&self) -> Option<u16> {
        self.head
    }

    /// Unlink and return the earliest timer.
    pub(crate) fn remove_first<const N: usize>(&mut self, arena: &mut TimerArena<N>) -> Option<u16> {
        let head = self.head?;
        let slot = arena.slot_mut(head);
        self.head = slot.next.take();
        self.len -= 1;
        Some(head)
    }

    /// Unlink slot `index` wherever it is. Returns false if it is not queued.
    pub(crate) fn remove<const N: usize>(&mut self, arena: &mut TimerArena<N>, index: u16) -> bool {
        let mut prev: Option<u16> = None;
        let mut cur = self.head;
        while let Some(cur_index) = cur {
            if cur_index == index {
                let next = arena.slot_mut(index).next.take();
                match prev {
                    Some(prev_index) => arena.slot_mut(prev_index).next = next,
                    None => self.head = next,
                }
                self.len -= 1;
                return true;
            }
            prev = cur;
            cur = arena.slot(cur_index).next;
        }
        false
    }

    /// Slot indexes from earliest to latest.
    pub(crate) fn iter<'a, const N: usize>(
        &self,
        arena: &'a TimerArena<N>,
    ) -> impl Iterator<Item = u16> + 'a {
        core::iter::successors(self.head, move |&index| arena.slot(index).next)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::arena::TimerNode;

    fn noop() {}

    struct Fixture {
        arena: TimerArena<8>,
        queue: TimerQueue,
        space: CounterSpace,
        now: u32,
    }

    impl Fixture {
        fn new(bits: u32, now: u32) -> Self {
            Self {
                arena: TimerArena::new(),
                queue: TimerQueue::new(),
                space: CounterSpace::new(bits),
                now,
            }
        }

        fn push(&mut self, fire_time: u32) -> u16 {
            let id = self
                .arena
                .alloc(TimerNode {
                    fire_time,
                    period: 0,
                    callback: noop,
                    repeat: false,
                })
                .unwrap();
            self.queue
                .insert_sorted(&mut self.arena, id.index(), self.space, self.now);
            id.index()
        }

        fn fire_times(&self) -> Vec<u32> {
            self.queue
                .iter(&self.arena)
                .map(|i| self.arena.slot(i).node.fire_time)
                .collect()
        }

        fn order(&self) -> Vec<u16> {
            self.queue.iter(&self.arena).collect()
        }
    }

    #[test]
    fn insert_keeps_ascending_order() {
        let mut f = Fixture::new(32, 0);
        for t in [100, 50, 75, 10, 200] {
            f.push(t);
        }
        assert_eq!(f.fire_times(), [10, 50, 75, 100, 200]);
        assert_eq!(f.queue.len(), 5);
    }

    #[test]
    fn equal_fire_times_are_fifo() {
        let mut f = Fixture::new(32, 0);
        let a = f.push(50);
        let b = f.push(50);
        let early = f.push(20);
        let c = f.push(50);
        assert_eq!(f.order(), [early, a, b, c]);
    }

    #[test]
    fn remove_first_pops_in_order() {
        let mut f = Fixture::new(32, 0);
        let late = f.push(30);
        let early = f.push(10);
        assert_eq!(f.queue.peek_first(), Some(early));
        assert_eq!(f.queue.remove_first(&mut f.arena), Some(early));
        assert_eq!(f.arena.slot(early).next, None);
        assert_eq!(f.queue.remove_first(&mut f.arena), Some(late));
        assert_eq!(f.queue.remove_first(&mut f.arena), None);
        assert_eq!(f.queue.peek_first(), None);
        assert_eq!(f.queue.len(), 0);
    }

    #[test]
    fn remove_by_identity() {
        let mut f = Fixture::new(32, 0);
        let a = f.push(10);
        let b = f.push(20);
        let c = f.push(30);

        assert!(f.queue.remove(&mut f.arena, b));
        assert_eq!(f.order(), [a, c]);
        // already gone
        assert!(!f.queue.remove(&mut f.arena, b));

        assert!(f.queue.remove(&mut f.arena, a));
        assert_eq!(f.order(), [c]);
        assert!(f.queue.remove(&mut f.arena, c));
        assert_eq!(f.queue.peek_first(), None);
        assert!(!f.queue.remove(&mut f.arena, c));
    }

    #[test]
    fn wrapped_fire_times_sort_after_the_wrap_point() {
        // 8-bit counter at 240: 250 comes before 4, which comes before 40
        let mut f = Fixture::new(8, 240);
        f.push(40);
        f.push(4);
        f.push(250);
        assert_eq!(f.fire_times(), [250, 4, 40]);
    }

    #[test]
    fn overdue_timers_stay_ahead() {
        // re-queued during a late interrupt, 30 is already behind the counter
        let mut f = Fixture::new(32, 35);
        f.push(100);
        f.push(30);
        f.push(35);
        assert_eq!(f.fire_times(), [30, 35, 100]);
    }
}
