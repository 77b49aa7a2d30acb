//! Slot-based storage with stable handles.
//!
//! Values live in a `Vec<Option<T>>`; freed slots are recycled through a
//! free list so a `SlotId` stays valid until its value is removed. Linked
//! structures in this crate (recency lists, frequency buckets) refer to
//! each other by `SlotId` instead of pointers.
//!
//! ## Layout
//!
//! ```text
//!   slots      ┌─────────┬─────────┬─────────┬─────────┐
//!              │ Some(A) │  None   │ Some(C) │  None   │
//!              └─────────┴─────────┴─────────┴─────────┘
//!                  0         1         2         3
//!
//!   free_list  [3, 1]  ── next insert pops 1, then 3, then grows `slots`
//! ```
//!
//! A removed slot's index can be handed out again, so holding a `SlotId`
//! past `remove` may observe an unrelated value. Owners (the intrusive list)
//! drop their handles when they remove.
//!
//! | Operation | Time |
//! |-----------|------|
//! | `insert`  | O(1) amortized |
//! | `remove`  | O(1) |
//! | `get`     | O(1) |
//!
//! ## Example
//!
//! ```
//! use edgesim::ds::SlotArena;
//!
//! let mut arena = SlotArena::new();
//! let a = arena.insert("edge_bos");
//! let b = arena.insert("edge_chi");
//! assert_eq!(arena.remove(a), Some("edge_bos"));
//!
//! // the freed slot is reused
//! let c = arena.insert("edge_sf");
//! assert_eq!(c.index(), a.index());
//! assert_eq!(arena.get(b), Some(&"edge_chi"));
//! assert_eq!(arena.len(), 2);
//! ```

/// Handle to an occupied slot in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Raw slot index, stable for the lifetime of the value.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Vector of optional slots plus a free list of vacated indices.
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    /// Vacated indices; popped before `slots` grows.
    free_list: Vec<usize>,
    /// Occupied slots, i.e. `slots.len() - free_list.len()`.
    len: usize,
}

impl<T> SlotArena<T> {
    /// Creates an empty arena without allocating.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty arena with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value`, reusing a freed slot when one is available.
    pub fn insert(&mut self, value: T) -> SlotId {
        let idx = match self.free_list.pop() {
            Some(idx) => {
                self.slots[idx] = Some(value);
                idx
            },
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            },
        };
        self.len += 1;
        SlotId(idx)
    }

    /// Takes the value out of `id` and frees the slot. Returns `None` for a
    /// vacant or out-of-range handle, leaving the arena untouched.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.free_list.push(id.0);
        self.len -= 1;
        Some(value)
    }

    /// Value at `id`, or `None` if the slot is vacant.
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// `true` if `id` currently holds a value.
    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every value. All outstanding `SlotId`s become vacant.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
