// message storage part of a channel.
//
// a not-itself-concurrent FIFO which the channel's mutex guards. the first N elements live
// inline, so a channel whose queue stays short never touches the heap after creation. an empty
// queue with no spill allocation is the Default, which makes mem::take of the whole buffer an
// O(1) pointer swap -- that is what the atomic drain operation relies on.

use std::{
    mem::MaybeUninit,
    ptr::drop_in_place,
    ops::Index,
    fmt::{self, Formatter, Debug},
};


// spill allocation size in elements to make upon first spilling to the heap
const INITIAL_SPILL_CAP: usize = 8;


/// FIFO queue that stores its first `N` elements inline.
pub(crate) struct InlineQueue<T, const N: usize> {
    // memory layout:
    //
    // - `inline` and `spill` concatenated form the space of "storage indices"
    // - a "logical index" (what len and Index talk about) exists if it's in [0, len)
    // - logical index i maps to storage index (start + i) % cap
    // - a storage slot is initialized iff some logical index maps to it
    start: usize,
    len: usize,
    inline: [MaybeUninit<T>; N],
    // stdlib fakes the heap allocation for ZSTs, so no Option is needed here
    spill: Box<[MaybeUninit<T>]>,
}

impl<T, const N: usize> InlineQueue<T, N> {
    /// Construct empty, with no spill allocation.
    pub(crate) fn new() -> Self {
        Self::with_spill_cap(0)
    }

    /// Construct empty with the given spill allocation capacity.
    pub(crate) fn with_spill_cap(spill_cap: usize) -> Self {
        InlineQueue {
            start: 0,
            len: 0,
            inline: [const { MaybeUninit::uninit() }; N],
            spill: Box::new_uninit_slice(spill_cap),
        }
    }

    /// Current length in elements.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Whether the queue is empty.
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    // currently available capacity, counting both the inline and spill parts.
    fn cap(&self) -> usize {
        N + self.spill.len()
    }

    // convert a logical index to a storage index, or panic on out-of-bounds.
    fn storage_idx(&self, idx: usize) -> usize {
        debug_assert!(self.len() <= self.cap(), "InlineQueue len > cap (internal bug)");
        assert!(idx < self.len(), "InlineQueue index out of bounds");
        (self.start + idx) % self.cap()
    }

    // raw pointer to the slot at a logical index, or panic on out-of-bounds.
    fn slot(&self, idx: usize) -> *const T {
        let storage_idx = self.storage_idx(idx);
        if storage_idx < N {
            self.inline[storage_idx].as_ptr()
        } else {
            self.spill[storage_idx - N].as_ptr()
        }
    }

    // raw pointer to the slot at a logical index (mutably), or panic on out-of-bounds.
    fn slot_mut(&mut self, idx: usize) -> *mut T {
        let storage_idx = self.storage_idx(idx);
        if storage_idx < N {
            self.inline[storage_idx].as_mut_ptr()
        } else {
            self.spill[storage_idx - N].as_mut_ptr()
        }
    }

    /// Push to the back of the queue.
    pub(crate) fn push_back(&mut self, elem: T) {
        // maybe grow the spill part
        if self.len() == self.cap() {
            let new_spill_cap = (self.spill.len() * 2).max(INITIAL_SPILL_CAP);
            let mut grown = Self::with_spill_cap(new_spill_cap);
            grown.len = self.len();
            // relocate elements to the front of the new storage space
            for i in 0..self.len() {
                unsafe { grown.slot_mut(i).write(self.slot(i).read()); }
            }
            // mark the old slots uninitialized so their destructors don't run
            self.len = 0;
            *self = grown;
        }

        let idx = self.len;
        self.len += 1;
        unsafe { self.slot_mut(idx).write(elem); }
    }

    /// Pop from the front of the queue.
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        if self.len() == 0 { return None; }

        // read the element out and mark its slot uninitialized
        let elem = unsafe { self.slot(0).read() };
        self.start = (self.start + 1) % self.cap();
        self.len -= 1;
        if self.len == 0 {
            self.start = 0;
        }

        Some(elem)
    }

    /// Iterate from front to back by reference.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.len()).map(move |i| &self[i])
    }
}

impl<T, const N: usize> Drop for InlineQueue<T, N> {
    fn drop(&mut self) {
        for i in 0..self.len() {
            unsafe { drop_in_place(self.slot_mut(i)); }
        }
    }
}

impl<T, const N: usize> Index<usize> for InlineQueue<T, N> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        // safety: `slot` does bounds checking
        unsafe { &*self.slot(idx) }
    }
}

impl<T, const N: usize> Default for InlineQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug, const N: usize> Debug for InlineQueue<T, N> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, const N: usize> Iterator for InlineQueue<T, N> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl<T, const N: usize> ExactSizeIterator for InlineQueue<T, N> {}
