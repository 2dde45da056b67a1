//! Slot storage with index reuse.
//!
//! Indices handed out by [`IndexArena`] are stable for the lifetime of the
//! element. A removed index goes onto a free list and is the first one handed
//! out again, so the index space stays dense under churn but is never required
//! to be contiguous. An index is either a live slot or on the free list, never
//! both.

#[derive(Debug, Clone)]
pub(crate) struct IndexArena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
}

impl<T> IndexArena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Store `value`, reusing the most recently freed index if there is one.
    pub(crate) fn insert(&mut self, value: T) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(value);
                index
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        }
    }

    /// Store `value` at exactly `index`.
    ///
    /// Slots between the current capacity and `index` are created free.
    /// Returns `false` (and drops nothing) when `index` is already live.
    pub(crate) fn insert_at(&mut self, index: usize, value: T) -> bool {
        if index < self.slots.len() {
            if self.slots[index].is_some() {
                return false;
            }
            self.free.retain(|&free| free != index);
            self.slots[index] = Some(value);
        } else {
            for padding in self.slots.len()..index {
                self.slots.push(None);
                self.free.push(padding);
            }
            self.slots.push(Some(value));
        }
        true
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        let value = self.slots.get_mut(index)?.take()?;
        self.free.push(index);
        Some(value)
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.as_mut()
    }

    pub(crate) fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Number of live slots.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One past the highest index ever assigned (live or free).
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop every slot, returning the live values in index order.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        self.free.clear();
        self.slots.drain(..).flatten().collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (index, value)))
    }

    pub(crate) fn indices(&self) -> Vec<usize> {
        self.iter().map(|(index, _)| index).collect()
    }
}
