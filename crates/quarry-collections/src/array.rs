//! Contiguous growable sequence.
//!
//! [`Array`] is a `Vec`-like container that draws its single storage block
//! from an [`Allocator`]. Growth follows a 1.5x-plus-one geometric policy
//! and never shrinks on its own.

use std::fmt;
use std::mem::MaybeUninit;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::slice;

use quarry_alloc::{context_allocator, AllocError, Allocator};

use crate::raw_buf::RawBuf;

/// A contiguous growable array.
///
/// Invariants: `len <= capacity`, and `capacity == 0` exactly when no block
/// is held. Any operation that grows the storage may move it, so element
/// references never outlive a mutation (enforced by borrowing).
///
/// Indexing goes through `Deref<Target = [T]>` and is bounds-checked in
/// every build.
pub struct Array<'a, T> {
    buf: RawBuf<'a, T>,
    len: usize,
}

impl<T> Array<'static, T> {
    /// An empty array drawing from this thread's context allocator.
    pub fn new() -> Self {
        Self::new_in(context_allocator())
    }

    /// An array with room for at least `capacity` elements, drawing from
    /// the context allocator.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Self::with_capacity_in(capacity, context_allocator())
    }

    /// An array holding clones of `items`, drawing from the context
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

impl<'a, T> Array<'a, T> {
    /// An empty array drawing from `alloc`. Allocates nothing.
    pub fn new_in(alloc: Allocator<'a>) -> Self {
        Self {
            buf: RawBuf::new_in(alloc),
            len: 0,
        }
    }

    /// An empty array with room for at least `capacity` elements.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn with_capacity_in(capacity: usize, alloc: Allocator<'a>) -> Result<Self, AllocError> {
        let mut array = Self::new_in(alloc);
        array.reserve(capacity)?;
        Ok(array)
    }

    /// An array holding clones of `items`.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn from_slice_in(items: &[T], alloc: Allocator<'a>) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut array = Self::with_capacity_in(items.len(), alloc)?;
        array.extend_from_slice(items)?;
        Ok(array)
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current block can hold.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The allocator this array draws from.
    pub fn allocator(&self) -> Allocator<'a> {
        self.buf.allocator()
    }

    /// Grow the capacity by at least `extra` slots.
    ///
    /// Capacity grows by `capacity / 2 + 1` repeatedly until it reaches
    /// `capacity + extra`. Existing elements keep their order and values
    /// but may move in memory.
    ///
    /// # Errors
    ///
    /// Returns the allocator's error and leaves the array unchanged, or
    /// [`AllocError::CapacityOverflow`] if the target does not fit `usize`.
    pub fn reserve(&mut self, extra: usize) -> Result<(), AllocError> {
        if extra == 0 {
            return Ok(());
        }
        let new_cap = grown_capacity(self.capacity(), extra).ok_or(AllocError::CapacityOverflow)?;
        self.buf.grow_to(new_cap)
    }

    /// Append `value`, returning its index.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure; `value` is dropped in that case.
    pub fn push(&mut self, value: T) -> Result<usize, AllocError> {
        let index = self.len;
        self.insert(index, value)?;
        Ok(index)
    }

    /// Append `value` only if no growth is needed.
    ///
    /// Hands `value` back when the array is full.
    pub fn push_within_capacity(&mut self, value: T) -> Result<usize, T> {
        if self.len == self.capacity() {
            return Err(value);
        }
        // SAFETY: len < capacity was checked above.
        unsafe { self.push_unchecked(value) };
        Ok(self.len - 1)
    }

    /// Append without checking capacity.
    ///
    /// # Safety
    ///
    /// `len < capacity`.
    unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.capacity());
        // SAFETY: the slot at `len` is in bounds and unused per the caller.
        unsafe { self.as_mut_ptr().add(self.len).write(value) };
        self.len += 1;
    }

    /// Insert `value` at `index`, shifting the tail right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure; the array is unchanged.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), AllocError> {
        self.open_slot(index)?;
        // SAFETY: open_slot made `index` an unused in-bounds slot.
        unsafe { self.as_mut_ptr().add(index).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Append an element whose bytes are all zero, returning its index.
    ///
    /// # Safety
    ///
    /// The all-zero bit pattern must be a valid `T`.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub unsafe fn push_zeroed(&mut self) -> Result<usize, AllocError> {
        let index = self.len;
        // SAFETY: forwarded caller contract.
        unsafe { self.insert_zeroed(index)? };
        Ok(index)
    }

    /// Insert an all-zero element at `index`, shifting the tail right.
    ///
    /// # Safety
    ///
    /// The all-zero bit pattern must be a valid `T`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub unsafe fn insert_zeroed(&mut self, index: usize) -> Result<(), AllocError> {
        self.open_slot(index)?;
        // SAFETY: the slot is in bounds; zero is a valid T per the caller.
        unsafe { ptr::write_bytes(self.as_mut_ptr().add(index), 0, 1) };
        self.len += 1;
        Ok(())
    }

    /// Make room for one element at `index` and shift the tail right.
    /// Leaves `len` untouched and the slot uninitialised.
    fn open_slot(&mut self, index: usize) -> Result<(), AllocError> {
        assert!(
            index <= self.len,
            "insertion index {index} out of bounds for array of length {}",
            self.len
        );
        if self.len == self.capacity() {
            self.reserve(1)?;
        }
        if index < self.len {
            let p = self.as_mut_ptr();
            // SAFETY: len < capacity after the reserve, so [index, len]
            // and [index + 1, len + 1) are in bounds; copy handles overlap.
            unsafe { ptr::copy(p.add(index), p.add(index + 1), self.len - index) };
        }
        Ok(())
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` is initialised and is no
        // longer counted as live.
        Some(unsafe { self.as_ptr().add(self.len).read() })
    }

    /// Remove the element at `index`, shifting the tail left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "removal index {index} out of bounds for array of length {}",
            self.len
        );
        let p = self.as_mut_ptr();
        // SAFETY: index < len, so the read is of a live element and the
        // shifted run [index + 1, len) is live.
        unsafe {
            let value = p.add(index).read();
            ptr::copy(p.add(index + 1), p.add(index), self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Drop every element past `len`. No-op if `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = ptr::slice_from_raw_parts_mut(
            // SAFETY: len < self.len <= capacity.
            unsafe { self.as_mut_ptr().add(len) },
            self.len - len,
        );
        self.len = len;
        // SAFETY: the tail was live and is no longer counted.
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Drop every element, keeping the storage.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resize to `new_len`, filling new slots with clones of `value`.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn resize(&mut self, new_len: usize, value: T) -> Result<(), AllocError>
    where
        T: Clone,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        self.reserve(new_len.saturating_sub(self.capacity()))?;
        while self.len < new_len {
            // SAFETY: capacity >= new_len after the reserve above.
            unsafe { self.push_unchecked(value.clone()) };
        }
        Ok(())
    }

    /// Append clones of every element of `items`.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure; nothing is appended in that case.
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<(), AllocError>
    where
        T: Clone,
    {
        let needed = self.len.checked_add(items.len()).ok_or(AllocError::CapacityOverflow)?;
        self.reserve(needed.saturating_sub(self.capacity()))?;
        for item in items {
            // SAFETY: capacity >= len + items.len() after the reserve above.
            unsafe { self.push_unchecked(item.clone()) };
        }
        Ok(())
    }

    /// Index of the first element equal to `value`.
    pub fn find(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|item| item == value)
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.find(value).is_some()
    }

    /// Duplicate the live range into a fresh block from the same allocator.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn copy(&self) -> Result<Self, AllocError>
    where
        T: Copy,
    {
        self.copy_in(self.allocator())
    }

    /// Duplicate the live range into a fresh block from `alloc`.
    ///
    /// This is a bitwise copy, hence the `Copy` bound: types that own
    /// resources cannot be duplicated this way.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's failure.
    pub fn copy_in<'b>(&self, alloc: Allocator<'b>) -> Result<Array<'b, T>, AllocError>
    where
        T: Copy,
    {
        let mut copy = Array::with_capacity_in(self.len, alloc)?;
        // SAFETY: the destination holds at least `len` slots, the regions
        // belong to distinct blocks, and T: Copy makes a bitwise copy valid.
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr(), copy.as_mut_ptr(), self.len);
            copy.set_len(self.len);
        }
        Ok(copy)
    }

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialised; the pointer is
        // non-null and aligned even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for `as_slice`, with exclusive access.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// Raw pointer to the first slot.
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr()
    }

    /// Raw mutable pointer to the first slot.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr()
    }

    /// The unused slots between `len` and `capacity`.
    ///
    /// Fill them and then call [`set_len`](Self::set_len) to hand a sized
    /// buffer to code that writes into raw memory.
    pub fn spare_capacity_mut(&mut self) -> &mut [MaybeUninit<T>] {
        // SAFETY: [len, capacity) lies within the block; MaybeUninit has no
        // validity requirement.
        unsafe {
            slice::from_raw_parts_mut(
                self.buf.ptr().add(self.len).cast::<MaybeUninit<T>>(),
                self.capacity() - self.len,
            )
        }
    }

    /// Force the length.
    ///
    /// # Safety
    ///
    /// `new_len <= capacity`, and every slot below `new_len` must be
    /// initialised.
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        self.len = new_len;
    }

    /// Drop every element, release the block and return to the empty,
    /// zero-capacity state. The array stays usable.
    pub fn free(&mut self) {
        self.clear();
        self.buf.release();
    }
}

/// Capacity after growing `cap` by 1.5x-plus-one steps until it covers
/// `cap + extra`.
fn grown_capacity(cap: usize, extra: usize) -> Option<usize> {
    let target = cap.checked_add(extra)?;
    let mut grown = cap;
    while grown < target {
        grown = grown.checked_add(grown / 2 + 1)?;
    }
    Some(grown)
}

impl<T> Drop for Array<'_, T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for Array<'static, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Array<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Array<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'s, T> IntoIterator for &'s Array<'_, T> {
    type Item = &'s T;
    type IntoIter = slice::Iter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'s, T> IntoIterator for &'s mut Array<'_, T> {
    type Item = &'s mut T;
    type IntoIter = slice::IterMut<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: PartialEq> PartialEq<Array<'_, T>> for Array<'_, T> {
    fn eq(&self, other: &Array<'_, T>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for Array<'_, T> {}

impl<T: PartialEq> PartialEq<[T]> for Array<'_, T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: fmt::Debug> fmt::Debug for Array<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
