use std::collections::HashSet;

/// Slot handed out when every slot in `[1, max_slots]` is taken.
pub const OVERFLOW_SLOT: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotAllocation {
    Free(u32),
    /// Pool exhausted; the slot is shared with an existing track.
    Overflow(u32),
}

impl SlotAllocation {
    pub fn slot(&self) -> u32 {
        match self {
            SlotAllocation::Free(s) | SlotAllocation::Overflow(s) => *s,
        }
    }
}

/// Lowest slot in `[1, max_slots]` not present in `in_use`.
pub fn allocate_slot<I>(in_use: I, max_slots: u32) -> SlotAllocation
where
    I: IntoIterator<Item = u32>,
{
    let taken: HashSet<u32> = in_use.into_iter().collect();
    // The first gap is at most `taken.len() + 1` steps in.
    (1..=max_slots)
        .find(|slot| !taken.contains(slot))
        .map(SlotAllocation::Free)
        .unwrap_or(SlotAllocation::Overflow(OVERFLOW_SLOT))
}
