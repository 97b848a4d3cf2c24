//! Low-level primitives over the system heap.
//!
//! Thin wrappers around `std::alloc` that turn null returns into
//! [`AllocError`] and keep zero-sized requests away from the system
//! allocator. Every `unsafe` block carries a `// SAFETY:` comment.

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use crate::error::AllocError;

/// A non-null pointer aligned to `align` that owns no memory.
pub(crate) fn dangling(align: usize) -> NonNull<u8> {
    debug_assert!(align.is_power_of_two());
    // SAFETY: a power-of-two alignment is never zero.
    unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(align)) }
}

/// Allocate uninitialised memory for `layout` from the system heap.
pub(crate) fn heap_alloc(layout: Layout) -> Result<NonNull<u8>, AllocError> {
    if layout.size() == 0 {
        return Ok(dangling(layout.align()));
    }
    // SAFETY: layout has a non-zero size.
    let raw = unsafe { alloc::alloc(layout) };
    NonNull::new(raw).ok_or(AllocError::OutOfMemory {
        requested: layout.size(),
    })
}

/// Resize a heap block, preserving its leading `min(old, new)` bytes.
///
/// # Safety
///
/// `ptr` must have been returned by [`heap_alloc`] or [`heap_realloc`]
/// with exactly `old` as its layout, and must not have been freed.
pub(crate) unsafe fn heap_realloc(
    ptr: NonNull<u8>,
    old: Layout,
    new_size: usize,
) -> Result<NonNull<u8>, AllocError> {
    let new = Layout::from_size_align(new_size, old.align())?;
    if old.size() == 0 {
        return heap_alloc(new);
    }
    if new_size == 0 {
        // SAFETY: forwarded caller contract.
        unsafe { heap_free(ptr, old) };
        return Ok(dangling(old.align()));
    }
    // SAFETY: ptr/old come from this allocator per the caller contract,
    // new_size is non-zero and fits a valid layout (checked above).
    let raw = unsafe { alloc::realloc(ptr.as_ptr(), old, new_size) };
    NonNull::new(raw).ok_or(AllocError::OutOfMemory {
        requested: new_size,
    })
}

/// Return a heap block to the system.
///
/// # Safety
///
/// Same contract as [`heap_realloc`].
pub(crate) unsafe fn heap_free(ptr: NonNull<u8>, layout: Layout) {
    if layout.size() != 0 {
        // SAFETY: forwarded caller contract; zero-sized blocks never
        // reached the system allocator.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
    }
}
