//! In-flight request tag table.

/// Number of load-queue tags the unit can have outstanding.
pub const TAG_COUNT: usize = 16;

/// Maps each tag to the index of the entry currently waiting on it.
///
/// Direct-indexed so that a tag reused before its response is visible as an
/// overwrite of an occupied slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTable {
    slots: [Option<usize>; TAG_COUNT],
}

impl TagTable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None; TAG_COUNT],
        }
    }

    /// Pending entry for `tag`.
    #[must_use]
    pub fn get(&self, tag: u8) -> Option<usize> {
        self.slots.get(usize::from(tag)).copied().flatten()
    }

    /// Point `tag` at `entry`, returning the entry it displaced.
    pub fn occupy(&mut self, tag: u8, entry: usize) -> Option<usize> {
        self.slots
            .get_mut(usize::from(tag))
            .and_then(|slot| slot.replace(entry))
    }

    /// Free `tag`, returning the entry that was waiting on it.
    pub fn release(&mut self, tag: u8) -> Option<usize> {
        self.slots.get_mut(usize::from(tag)).and_then(Option::take)
    }

    /// Empty every slot, returning the pending entries in tag order.
    pub fn drain(&mut self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter_mut().filter_map(Option::take)
    }

    /// Occupied slots as `(tag, entry)` in tag order.
    pub fn pending(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        (0u8..)
            .zip(self.slots.iter())
            .filter_map(|(tag, slot)| slot.map(|entry| (tag, entry)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
