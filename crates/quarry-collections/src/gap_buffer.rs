//! Edit-optimised sequence with a movable gap.
//!
//! The storage block is split into two live runs around an uninitialised
//! gap:
//!
//! ```text
//! [0, gap_start)                    live prefix
//! [gap_start, gap_start + gap_len)  gap
//! [gap_start + gap_len, capacity)   live suffix
//! ```
//!
//! Edits happen at the gap. Moving the gap copies only the elements it
//! passes over, so a run of edits near one position costs time
//! proportional to how far the cursor travels, not to the buffer size.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::ptr;
use std::slice;

use quarry_alloc::{context_allocator, AllocError, Allocator};

use crate::raw_buf::RawBuf;

/// Slots added whenever an insertion finds the gap exhausted. Also the
/// minimum capacity of a pre-sized buffer.
pub const DEFAULT_GAP_SIZE: usize = 256;

/// A sequence with cheap insertion and removal near a moving edit point.
pub struct GapBuffer<'a, T> {
    buf: RawBuf<'a, T>,
    gap_start: usize,
    gap_len: usize,
}

impl<T> GapBuffer<'static, T> {
    /// An empty buffer drawing from this thread's context allocator.
    pub fn new() -> Self {
        Self::new_in(context_allocator())
    }

    /// A pre-sized buffer drawing from the context allocator.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Self::with_capacity_in(capacity, context_allocator())
    }

    /// A buffer holding clones of `items`, drawing from the context
    /// allocator.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn from_slice(items: &[T]) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::from_slice_in(items, context_allocator())
    }
}

impl<'a, T> GapBuffer<'a, T> {
    /// An empty buffer drawing from `alloc`. Allocates nothing.
    pub fn new_in(alloc: Allocator<'a>) -> Self {
        Self {
            buf: RawBuf::new_in(alloc),
            gap_start: 0,
            gap_len: 0,
        }
    }

    /// An empty buffer whose gap spans at least
    /// `max(capacity, DEFAULT_GAP_SIZE)` slots.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn with_capacity_in(capacity: usize, alloc: Allocator<'a>) -> Result<Self, AllocError> {
        let capacity = capacity.max(DEFAULT_GAP_SIZE);
        let mut buffer = Self::new_in(alloc);
        buffer.buf.grow_to(capacity)?;
        buffer.gap_len = capacity;
        Ok(buffer)
    }

    /// A buffer holding clones of `items`, with the gap after them.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn from_slice_in(items: &[T], alloc: Allocator<'a>) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut buffer = Self::with_capacity_in(items.len(), alloc)?;
        buffer.insert_slice(0, items)?;
        Ok(buffer)
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.buf.capacity() - self.gap_len
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slots in the block, gap included.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Logical index the gap currently sits at.
    pub fn gap_position(&self) -> usize {
        self.gap_start
    }

    /// Number of free slots in the gap.
    pub fn gap_len(&self) -> usize {
        self.gap_len
    }

    /// The allocator this buffer draws from.
    pub fn allocator(&self) -> Allocator<'a> {
        self.buf.allocator()
    }

    fn gap_end(&self) -> usize {
        self.gap_start + self.gap_len
    }

    /// Physical slot of logical index `index`.
    fn physical(&self, index: usize) -> usize {
        if index < self.gap_start {
            index
        } else {
            index + self.gap_len
        }
    }

    /// Slide the gap so that it starts at logical index `index`.
    ///
    /// Copies exactly the elements between the old and new gap position.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn move_gap_to(&mut self, index: usize) {
        assert!(
            index <= self.len(),
            "gap position {index} out of bounds for gap buffer of length {}",
            self.len()
        );
        let base = self.buf.ptr();
        if index < self.gap_start {
            let count = self.gap_start - index;
            // SAFETY: both ranges lie inside the block; `ptr::copy`
            // tolerates the overlap when the gap is shorter than `count`.
            unsafe { ptr::copy(base.add(index), base.add(index + self.gap_len), count) };
        } else if index > self.gap_start {
            let count = index - self.gap_start;
            // SAFETY: as above; the source run starts right after the gap.
            unsafe { ptr::copy(base.add(self.gap_end()), base.add(self.gap_start), count) };
        }
        self.gap_start = index;
    }

    /// Slide the gap to the tail, then grow the block by `extra` slots,
    /// all of which join the gap.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure. The contents are unchanged,
    /// though the gap may have moved.
    pub fn resize(&mut self, extra: usize) -> Result<(), AllocError> {
        let len = self.len();
        self.move_gap_to(len);
        let new_cap = self
            .capacity()
            .checked_add(extra)
            .ok_or(AllocError::CapacityOverflow)?;
        self.buf.grow_to(new_cap)?;
        self.gap_len += extra;
        Ok(())
    }

    /// Insert `value` so that it ends up at logical index `index`.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure; `value` is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), AllocError> {
        assert!(
            index <= self.len(),
            "insertion index {index} out of bounds for gap buffer of length {}",
            self.len()
        );
        if self.gap_len == 0 {
            self.resize(DEFAULT_GAP_SIZE)?;
        }
        self.move_gap_to(index);
        // SAFETY: the gap is non-empty, so `gap_start` is a free slot.
        unsafe { self.buf.ptr().add(self.gap_start).write(value) };
        self.gap_start += 1;
        self.gap_len -= 1;
        Ok(())
    }

    /// Append `value`.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn push(&mut self, value: T) -> Result<(), AllocError> {
        self.insert(self.len(), value)
    }

    /// Insert clones of `items` starting at logical index `index`.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure; nothing is inserted.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_slice(&mut self, index: usize, items: &[T]) -> Result<(), AllocError>
    where
        T: Clone,
    {
        assert!(
            index <= self.len(),
            "insertion index {index} out of bounds for gap buffer of length {}",
            self.len()
        );
        if self.gap_len < items.len() {
            self.resize((items.len() - self.gap_len).max(DEFAULT_GAP_SIZE))?;
        }
        self.move_gap_to(index);
        for item in items {
            // SAFETY: the gap was sized for every item above.
            unsafe { self.buf.ptr().add(self.gap_start).write(item.clone()) };
            self.gap_start += 1;
            self.gap_len -= 1;
        }
        Ok(())
    }

    /// Remove and return the element at logical index `index`.
    ///
    /// This is a forward delete: the element *at* `index` goes and the gap
    /// ends up at `index`. For deleting the element before a cursor, see
    /// [`backspace`](Self::backspace).
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len(),
            "removal index {index} out of bounds for gap buffer of length {}",
            self.len()
        );
        self.move_gap_to(index);
        // SAFETY: the slot right after the gap holds logical `index`; the
        // gap then widens over it, so it is never read again.
        let value = unsafe { self.buf.ptr().add(self.gap_end()).read() };
        self.gap_len += 1;
        value
    }

    /// Remove and return the element just before `cursor`, leaving the gap
    /// at `cursor - 1`. Returns `None` at the start of the buffer.
    ///
    /// # Panics
    ///
    /// Panics if `cursor > len`.
    pub fn backspace(&mut self, cursor: usize) -> Option<T> {
        assert!(
            cursor <= self.len(),
            "cursor {cursor} out of bounds for gap buffer of length {}",
            self.len()
        );
        if cursor == 0 {
            return None;
        }
        self.move_gap_to(cursor);
        self.gap_start -= 1;
        self.gap_len += 1;
        // SAFETY: the slot now at the gap's leading edge held logical
        // `cursor - 1` and is inside the gap from here on.
        Some(unsafe { self.buf.ptr().add(self.gap_start).read() })
    }

    /// Drop `count` elements starting at logical index `index`.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past `len`.
    pub fn remove_range(&mut self, index: usize, count: usize) {
        let end = index.checked_add(count);
        assert!(
            end.is_some_and(|end| end <= self.len()),
            "removal range {index}+{count} out of bounds for gap buffer of length {}",
            self.len()
        );
        self.move_gap_to(index);
        let first = self.gap_end();
        self.gap_len += count;
        // SAFETY: the `count` slots after the old gap end were live and now
        // belong to the gap, so they are dropped exactly once.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.ptr().add(first), count));
        }
    }

    /// Drop every element, keeping the block.
    pub fn clear(&mut self) {
        self.remove_range(0, self.len());
    }

    /// Drop every element, release the block and return to the empty
    /// state. The buffer stays usable.
    pub fn free(&mut self) {
        self.clear();
        self.buf.release();
        self.gap_start = 0;
        self.gap_len = 0;
    }

    /// The element at logical index `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        // SAFETY: in-range logical indices map to live slots.
        Some(unsafe { &*self.buf.ptr().add(self.physical(index)) })
    }

    /// The element at logical index `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        // SAFETY: as for `get`, with exclusive access.
        Some(unsafe { &mut *self.buf.ptr().add(self.physical(index)) })
    }

    /// The live prefix and suffix around the gap.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let base = self.buf.ptr();
        let end = self.gap_end();
        // SAFETY: both runs are initialised and disjoint from the gap.
        unsafe {
            (
                slice::from_raw_parts(base, self.gap_start),
                slice::from_raw_parts(base.add(end), self.capacity() - end),
            )
        }
    }

    /// The live prefix and suffix around the gap, mutably.
    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let base = self.buf.ptr();
        let end = self.gap_end();
        // SAFETY: as for `as_slices`; the runs do not overlap.
        unsafe {
            (
                slice::from_raw_parts_mut(base, self.gap_start),
                slice::from_raw_parts_mut(base.add(end), self.capacity() - end),
            )
        }
    }

    /// Elements in logical order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (front, back) = self.as_slices();
        front.iter().chain(back)
    }
}

impl<T> Drop for GapBuffer<'_, T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for GapBuffer<'static, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for GapBuffer<'_, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let len = self.len();
        match self.get(index) {
            Some(value) => value,
            None => panic!("index {index} out of bounds for gap buffer of length {len}"),
        }
    }
}

impl<T> IndexMut<usize> for GapBuffer<'_, T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index {index} out of bounds for gap buffer of length {len}"),
        }
    }
}

impl<T: PartialEq> PartialEq for GapBuffer<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for GapBuffer<'_, T> {}

impl<T: PartialEq> PartialEq<[T]> for GapBuffer<'_, T> {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: fmt::Debug> fmt::Debug for GapBuffer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
