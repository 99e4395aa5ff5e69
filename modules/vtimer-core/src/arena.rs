//! Fixed pool of timer slots
//!
//! Every pending timer lives in one slot of a `TimerArena`. Slots are handed
//! out from a free list and identified outside the crate by a [`TimerId`]:
//! the slot index plus the generation the slot had when it was handed out.
//! Releasing a slot bumps its generation, so an id kept after its timer is
//! gone no longer matches, even once the slot is reused.

use crate::error::Error;

/// Action run when a timer fires. Runs in interrupt context.
pub type Callback = fn();

/// Identity of a started timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "log-base", derive(defmt::Format))]
pub struct TimerId {
    index: u16,
    generation: u16,
}

impl TimerId {
    /// Slot the timer occupies.
    pub fn index(&self) -> u16 {
        self.index
    }
}

/// Lifecycle of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    Free,
    /// linked into the timer queue
    Pending,
    /// taken off the queue, callback running
    Firing,
    /// cancelled while its callback was running
    Cancelled,
}

/// One scheduled callback
#[derive(Clone, Copy)]
pub(crate) struct TimerNode {
    /// absolute tick at which the callback is due
    pub(crate) fire_time: u32,
    /// ticks between fires of a repeating timer
    pub(crate) period: u32,
    pub(crate) callback: Callback,
    pub(crate) repeat: bool,
}

#[derive(Clone, Copy)]
pub(crate) struct Slot {
    pub(crate) node: TimerNode,
    pub(crate) state: SlotState,
    generation: u16,
    /// next slot in the timer queue, or in the free list when free
    pub(crate) next: Option<u16>,
}

fn unset() {}

impl Slot {
    const EMPTY: Slot = Slot {
        node: TimerNode {
            fire_time: 0,
            period: 0,
            callback: unset,
            repeat: false,
        },
        state: SlotState::Free,
        generation: 0,
        next: None,
    };
}

pub(crate) struct TimerArena<const N: usize> {
    slots: [Slot; N],
    free: Option<u16>,
    in_use: usize,
}

impl<const N: usize> TimerArena<N> {
    const INDEX_FITS: () = assert!(N <= u16::MAX as usize, "timer slot index must fit in u16");

    pub(crate) const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::INDEX_FITS;

        let mut slots = [Slot::EMPTY; N];
        let mut i = 0;
        while i < N {
            slots[i].next = if i + 1 < N { Some((i + 1) as u16) } else { None };
            i += 1;
        }
        Self {
            slots,
            free: if N > 0 { Some(0) } else { None },
            in_use: 0,
        }
    }

    /// Take a free slot for `node`, marked pending but not yet queued.
    pub(crate) fn alloc(&mut self, node: TimerNode) -> Result<TimerId, Error> {
        let Some(index) = self.free else {
            mem_log!(warn, "timer arena is full, {} slots in use", self.in_use);
            return Err(Error::ResourceExhausted);
        };
        let slot = &mut self.slots[index as usize];
        self.free = slot.next;
        slot.next = None;
        slot.node = node;
        slot.state = SlotState::Pending;
        self.in_use += 1;
        mem_log!(trace, "alloc timer slot {}", index);
        Ok(TimerId {
            index,
            generation: slot.generation,
        })
    }

    /// Return a slot to the free list. Every id that pointed at it goes stale.
    pub(crate) fn release(&mut self, index: u16) {
        mem_log!(trace, "release timer slot {}", index);
        let slot = &mut self.slots[index as usize];
        slot.state = SlotState::Free;
        slot.generation = slot.generation.wrapping_add(1);
        slot.node.callback = unset;
        slot.next = self.free;
        self.free = Some(index);
        self.in_use -= 1;
    }

    /// Slot index of `id` if it still names a live timer.
    pub(crate) fn lookup(&self, id: TimerId) -> Option<u16> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation == id.generation && slot.state != SlotState::Free {
            Some(id.index)
        } else {
            None
        }
    }

    /// The id currently naming slot `index`.
    pub(crate) fn id_of(&self, index: u16) -> TimerId {
        TimerId {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    pub(crate) fn slot(&self, index: u16) -> &Slot {
        &self.slots[index as usize]
    }

    pub(crate) fn slot_mut(&mut self, index: u16) -> &mut Slot {
        &mut self.slots[index as usize]
    }

    pub(crate) fn in_use(&self) -> usize {
        self.in_use
    }
}
