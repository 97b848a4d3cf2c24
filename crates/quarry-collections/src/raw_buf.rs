//! Typed storage block shared by [`Array`](crate::Array) and
//! [`GapBuffer`](crate::GapBuffer).
//!
//! `RawBuf` owns `capacity` uninitialised slots obtained through an
//! [`Allocator`]. It knows nothing about which slots are live; the
//! containers on top track that and drop their elements before the block
//! is released.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use quarry_alloc::{AllocError, Allocator};
use tracing::trace;

pub(crate) struct RawBuf<'a, T> {
    /// Start of the block; dangling while `cap == 0`.
    ptr: NonNull<T>,
    cap: usize,
    alloc: Allocator<'a>,
    _owns: PhantomData<T>,
}

impl<'a, T> RawBuf<'a, T> {
    pub(crate) fn new_in(alloc: Allocator<'a>) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            alloc,
            _owns: PhantomData,
        }
    }

    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    pub(crate) fn allocator(&self) -> Allocator<'a> {
        self.alloc
    }

    /// Grow the block to exactly `new_cap` slots.
    ///
    /// Slot contents up to the old capacity are preserved; the block may
    /// move. On error nothing changes.
    pub(crate) fn grow_to(&mut self, new_cap: usize) -> Result<(), AllocError> {
        debug_assert!(new_cap >= self.cap, "RawBuf never shrinks");
        if new_cap == self.cap {
            return Ok(());
        }
        let new_layout = Layout::array::<T>(new_cap)?;
        let ptr = if self.cap == 0 {
            self.alloc.allocate(new_layout)?
        } else {
            // SAFETY: the block was obtained from `alloc` with
            // `current_layout()` and is still live.
            unsafe {
                self.alloc
                    .reallocate(self.ptr.cast(), self.current_layout(), new_layout.size())?
            }
        };
        trace!(
            old = self.cap,
            new = new_cap,
            elem = std::any::type_name::<T>(),
            "storage grown"
        );
        self.ptr = ptr.cast();
        self.cap = new_cap;
        Ok(())
    }

    /// Give the block back to the allocator and return to the empty state.
    ///
    /// Live elements must already have been dropped or moved out.
    pub(crate) fn release(&mut self) {
        if self.cap != 0 {
            // SAFETY: the block is live and was obtained with this layout.
            unsafe { self.alloc.free(self.ptr.cast(), self.current_layout()) };
        }
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }

    fn current_layout(&self) -> Layout {
        // SAFETY: `Layout::array::<T>(cap)` succeeded when the block was
        // allocated, so size and alignment are valid.
        unsafe { Layout::from_size_align_unchecked(mem::size_of::<T>() * self.cap, mem::align_of::<T>()) }
    }
}

impl<T> Drop for RawBuf<'_, T> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_alloc::Arena;

    #[test]
    fn starts_unallocated() {
        let buf = RawBuf::<u32>::new_in(Allocator::heap());
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn grow_preserves_slots() {
        let mut buf = RawBuf::<u32>::new_in(Allocator::heap());
        buf.grow_to(2).unwrap();
        // SAFETY: capacity is 2.
        unsafe {
            buf.ptr().write(7);
            buf.ptr().add(1).write(9);
        }
        buf.grow_to(64).unwrap();
        // SAFETY: the first two slots were written before the grow.
        unsafe {
            assert_eq!(buf.ptr().read(), 7);
            assert_eq!(buf.ptr().add(1).read(), 9);
        }
    }

    #[test]
    fn failed_grow_keeps_block() {
        let arena = Arena::new(64).unwrap();
        let mut buf = RawBuf::<u64>::new_in(arena.allocator());
        buf.grow_to(4).unwrap();
        let before = buf.ptr();
        assert!(buf.grow_to(100).is_err());
        assert_eq!(buf.capacity(), 4);
        assert_eq!(buf.ptr(), before);
    }

    #[test]
    fn release_resets() {
        let mut buf = RawBuf::<u8>::new_in(Allocator::heap());
        buf.grow_to(16).unwrap();
        buf.release();
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn zero_sized_elements_grow_and_release() {
        let mut buf = RawBuf::<()>::new_in(Allocator::heap());
        buf.grow_to(10).unwrap();
        assert_eq!(buf.capacity(), 10);
        buf.release();
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn null_allocator_surfaces_error() {
        let mut buf = RawBuf::<u8>::new_in(Allocator::null());
        assert_eq!(buf.grow_to(10).unwrap_err(), AllocError::NullAllocator);
        assert_eq!(buf.capacity(), 0);
    }
}
