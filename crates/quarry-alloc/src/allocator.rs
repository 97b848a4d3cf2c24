//! The allocator handle shared by every container.
//!
//! An [`Allocator`] is a small `Copy` value naming where memory comes
//! from. It never owns itself; it only hands out and takes back memory.
//! Containers store one and route every allocate / reallocate / free
//! through it.

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;

use crate::arena::Arena;
use crate::context;
use crate::error::AllocError;
use crate::raw;

/// Handle to a memory source.
///
/// Three kinds exist:
///
/// - **Heap:** the system allocator (`std::alloc`).
/// - **Arena:** a borrowed bump [`Arena`]. Frees are no-ops; memory comes
///   back only when the arena is reset or destroyed.
/// - **Null:** an inert handle that refuses every allocation. Useful as a
///   guard where no allocator has been configured yet.
///
/// The lifetime `'a` is the borrow of the arena, if any. Heap and null
/// handles are `Allocator<'static>`.
#[derive(Clone, Copy)]
pub enum Allocator<'a> {
    /// The process heap.
    Heap,
    /// A borrowed bump arena.
    Arena(&'a Arena<'a>),
    /// The invalid allocator.
    Null,
}

impl Allocator<'static> {
    /// The general-purpose heap allocator.
    pub const fn heap() -> Self {
        Allocator::Heap
    }

    /// The invalid allocator: every allocation fails with
    /// [`AllocError::NullAllocator`].
    pub const fn null() -> Self {
        Allocator::Null
    }
}

impl<'a> Allocator<'a> {
    /// Whether this handle can hand out memory at all.
    pub fn is_valid(&self) -> bool {
        !self.is_null()
    }

    /// Whether this is the null allocator.
    pub fn is_null(&self) -> bool {
        matches!(self, Allocator::Null)
    }

    /// Allocate an uninitialised region described by `layout`.
    ///
    /// Zero-sized requests succeed with a dangling, well-aligned pointer.
    ///
    /// # Errors
    ///
    /// [`AllocError::NullAllocator`] for the null handle,
    /// [`AllocError::ArenaExhausted`] when an arena is full, and
    /// [`AllocError::OutOfMemory`] when the heap refuses.
    pub fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        match self {
            Allocator::Heap => raw::heap_alloc(layout),
            Allocator::Arena(arena) => arena.allocate(layout),
            Allocator::Null => Err(AllocError::NullAllocator),
        }
    }

    /// Resize a region to `new_size` bytes, keeping `old.align()`.
    ///
    /// The leading `min(old.size(), new_size)` bytes are preserved. The
    /// region may move; on success `ptr` and anything derived from it must
    /// no longer be used. On failure the original region is untouched.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator (or a copy of it)
    /// with layout `old`, and must not have been freed.
    ///
    /// # Errors
    ///
    /// Same as [`allocate`](Self::allocate), plus
    /// [`AllocError::CapacityOverflow`] if `new_size` is not a valid layout
    /// size.
    pub unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        match self {
            // SAFETY: forwarded caller contract.
            Allocator::Heap => unsafe { raw::heap_realloc(ptr, old, new_size) },
            // SAFETY: forwarded caller contract.
            Allocator::Arena(arena) => unsafe { arena.reallocate(ptr, old, new_size) },
            Allocator::Null => Err(AllocError::NullAllocator),
        }
    }

    /// Release a region.
    ///
    /// A no-op for arenas. Freeing through the null allocator is a
    /// programmer error (it never handed anything out).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator with layout
    /// `layout`, and must not be used afterwards.
    pub unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        match self {
            // SAFETY: forwarded caller contract.
            Allocator::Heap => unsafe { raw::heap_free(ptr, layout) },
            Allocator::Arena(_) => {}
            Allocator::Null => {
                debug_assert!(
                    layout.size() == 0,
                    "free of {} bytes through the null allocator",
                    layout.size()
                );
            }
        }
    }

    /// The arena behind this handle, if any.
    pub fn arena(&self) -> Option<&'a Arena<'a>> {
        match *self {
            Allocator::Arena(arena) => Some(arena),
            _ => None,
        }
    }

    /// Whether two handles draw from the same memory source.
    pub fn same_source(&self, other: &Allocator<'_>) -> bool {
        match (self, other) {
            (Allocator::Heap, Allocator::Heap) | (Allocator::Null, Allocator::Null) => true,
            (Allocator::Arena(a), Allocator::Arena(b)) => std::ptr::addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl Default for Allocator<'_> {
    /// The current context allocator of this thread.
    fn default() -> Self {
        context::context_allocator()
    }
}

impl<'a> From<&'a Arena<'a>> for Allocator<'a> {
    fn from(arena: &'a Arena<'a>) -> Self {
        Allocator::Arena(arena)
    }
}

impl fmt::Debug for Allocator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allocator::Heap => write!(f, "Allocator::Heap"),
            Allocator::Arena(arena) => f.debug_tuple("Allocator::Arena").field(arena).finish(),
            Allocator::Null => write!(f, "Allocator::Null"),
        }
    }
}
