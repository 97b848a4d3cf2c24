//! Fixed-capacity bump arena.
//!
//! An [`Arena`] reserves one backing block from a parent allocator at
//! construction and hands out bump offsets into it. Individual frees are
//! no-ops; memory comes back all at once through [`Arena::reset`] or when
//! the arena is destroyed. The arena never grows.

use std::alloc::Layout;
use std::cell::Cell;
use std::fmt;
use std::ptr::{self, NonNull};

use tracing::debug;

use crate::allocator::Allocator;
use crate::config::ArenaConfig;
use crate::error::AllocError;

/// A bump allocator over a single fixed block.
///
/// Allocation takes `&self` (the cursor lives in a [`Cell`]), so any
/// number of containers can draw from one arena through
/// [`Arena::allocator`] handles. Those handles borrow the arena, which is
/// what makes [`reset`](Arena::reset) safe: it needs `&mut self`, so it
/// cannot run while any container still holds arena memory.
///
/// The lifetime `'p` is the parent allocator the backing block came from.
/// Arenas built with [`Arena::new`] are heap-backed (`Arena<'static>`).
///
/// Not thread-safe: the cursor is unsynchronised shared state, and the
/// type is neither `Send` nor `Sync`.
pub struct Arena<'p> {
    /// Start of the backing block.
    block: NonNull<u8>,
    /// Layout the block was obtained with; needed to give it back.
    block_layout: Layout,
    /// Minimum alignment / size granularity of each allocation.
    min_align: usize,
    /// Bump pointer: bytes handed out so far.
    cursor: Cell<usize>,
    /// `(start, end)` offsets of the most recent allocation, for in-place
    /// reallocation. Both are needed: a zero-sized allocation shares its
    /// start with the one after it.
    last: Cell<Option<(usize, usize)>>,
    /// Allocator that owns the backing block.
    parent: Allocator<'p>,
}

impl Arena<'static> {
    /// Create a heap-backed arena of `capacity` bytes with default alignment.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::OutOfMemory`] if the heap refuses the block.
    pub fn new(capacity: usize) -> Result<Self, AllocError> {
        Self::with_config_in(ArenaConfig::new(capacity), Allocator::heap())
    }

    /// Create a heap-backed arena from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidConfig`] if `config` fails validation,
    /// or [`AllocError::OutOfMemory`] if the heap refuses the block.
    pub fn with_config(config: ArenaConfig) -> Result<Self, AllocError> {
        Self::with_config_in(config, Allocator::heap())
    }

    /// Move the arena to the heap and leak it, yielding a `'static`
    /// reference suitable for
    /// [`push_context_allocator`](crate::push_context_allocator).
    ///
    /// The backing block is never returned to the heap. Use
    /// [`reset_unchecked`](Arena::reset_unchecked) to recycle it.
    pub fn leak(self) -> &'static Arena<'static> {
        Box::leak(Box::new(self))
    }
}

impl<'p> Arena<'p> {
    /// Create an arena whose backing block is drawn from `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidConfig`] if `config` fails validation,
    /// or whatever `parent` reports when it cannot supply the block.
    pub fn with_config_in(config: ArenaConfig, parent: Allocator<'p>) -> Result<Self, AllocError> {
        config.validate()?;
        let block_layout = Layout::from_size_align(config.capacity, config.block_align())?;
        let block = parent.allocate(block_layout)?;
        debug!(
            capacity = config.capacity,
            min_align = config.min_align,
            "arena created"
        );
        Ok(Self {
            block,
            block_layout,
            min_align: config.min_align,
            cursor: Cell::new(0),
            last: Cell::new(None),
            parent,
        })
    }

    /// A handle that allocates from this arena.
    pub fn allocator(&self) -> Allocator<'_> {
        Allocator::Arena(self)
    }

    /// Bump-allocate a region for `layout`.
    ///
    /// The start offset is aligned to `max(layout.align(), min_align)` and
    /// the size is rounded up to a multiple of `min_align`. Returns the
    /// pre-advance address.
    ///
    /// # Errors
    ///
    /// [`AllocError::ArenaExhausted`] when the rounded request does not fit
    /// in the remaining capacity. The arena is left unchanged.
    pub fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let size = round_up(layout.size(), self.min_align).ok_or(AllocError::CapacityOverflow)?;
        let align = layout.align().max(self.min_align);
        let cursor = self.cursor.get();
        let base = self.block.as_ptr().addr();
        let start = base
            .checked_add(cursor)
            .and_then(|addr| round_up(addr, align))
            .map(|addr| addr - base)
            .ok_or(AllocError::CapacityOverflow)?;
        let end = start.checked_add(size).ok_or(AllocError::CapacityOverflow)?;
        if end > self.capacity() {
            debug!(
                requested = size,
                used = cursor,
                capacity = self.capacity(),
                "arena exhausted"
            );
            return Err(AllocError::ArenaExhausted {
                requested: size,
                used: cursor,
                capacity: self.capacity(),
            });
        }
        self.cursor.set(end);
        self.last.set(Some((start, end)));
        // SAFETY: start <= end <= capacity, so the result stays within (or
        // one past the end of) the backing block.
        Ok(unsafe { NonNull::new_unchecked(self.block.as_ptr().add(start)) })
    }

    /// Resize a region previously handed out by this arena.
    ///
    /// The most recent allocation is resized in place when capacity
    /// allows. Anything else is copied into a freshly bumped region; the
    /// old bytes stay reserved until the next reset.
    ///
    /// # Safety
    ///
    /// `ptr` must come from this arena with layout `old`, handed out since
    /// the last reset.
    pub(crate) unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        let new_layout = Layout::from_size_align(new_size, old.align())?;
        if let Some(offset) = self.offset_of(ptr).filter(|&o| self.is_last(o, old.size())) {
            let size = round_up(new_size, self.min_align).ok_or(AllocError::CapacityOverflow)?;
            let end = offset.checked_add(size).ok_or(AllocError::CapacityOverflow)?;
            if end <= self.capacity() {
                self.cursor.set(end);
                self.last.set(Some((offset, end)));
                return Ok(ptr);
            }
        }
        let fresh = self.allocate(new_layout)?;
        // SAFETY: `fresh` was bumped past the cursor, so it cannot overlap
        // `ptr`; both are valid for at least the copied length.
        unsafe {
            ptr::copy_nonoverlapping(ptr.as_ptr(), fresh.as_ptr(), old.size().min(new_size));
        }
        Ok(fresh)
    }

    /// Whether the region at `offset` of `size` bytes is exactly the most
    /// recent allocation and ends at the cursor.
    fn is_last(&self, offset: usize, size: usize) -> bool {
        let end = round_up(size, self.min_align).and_then(|size| offset.checked_add(size));
        match (self.last.get(), end) {
            (Some(last), Some(end)) => last == (offset, end) && end == self.cursor.get(),
            _ => false,
        }
    }

    /// Rewind the cursor to zero, invalidating every allocation at once.
    ///
    /// The backing block is kept. Requires exclusive access, so no handle
    /// (and therefore no container) can still be using the arena.
    pub fn reset(&mut self) {
        self.rewind();
    }

    /// Rewind the cursor through a shared reference.
    ///
    /// For arenas that are shared for `'static`, e.g. via [`Arena::leak`].
    ///
    /// # Safety
    ///
    /// Nothing allocated from this arena may be used after the call.
    pub unsafe fn reset_unchecked(&self) {
        self.rewind();
    }

    fn rewind(&self) {
        debug!(
            used = self.cursor.get(),
            capacity = self.capacity(),
            "arena reset"
        );
        self.cursor.set(0);
        self.last.set(None);
    }

    /// Release the backing block through the parent allocator.
    ///
    /// Equivalent to dropping the arena.
    pub fn destroy(self) {
        drop(self);
    }

    /// Byte offset of `ptr` from the start of the backing block, if it
    /// points inside it (one-past-the-end included).
    pub fn offset_of(&self, ptr: NonNull<u8>) -> Option<usize> {
        let offset = ptr.as_ptr().addr().checked_sub(self.block.as_ptr().addr())?;
        (offset <= self.capacity()).then_some(offset)
    }

    /// Total size of the backing block in bytes.
    pub fn capacity(&self) -> usize {
        self.block_layout.size()
    }

    /// Bytes handed out since creation or the last reset (padding included).
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    /// Bytes still available before the arena is exhausted.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.cursor.get()
    }

    /// Minimum alignment of each allocation.
    pub fn min_align(&self) -> usize {
        self.min_align
    }

    /// The allocator that supplied the backing block.
    pub fn parent(&self) -> Allocator<'p> {
        self.parent
    }
}

impl Drop for Arena<'_> {
    fn drop(&mut self) {
        debug!(
            used = self.cursor.get(),
            capacity = self.capacity(),
            "arena destroyed"
        );
        // SAFETY: the block was obtained from `parent` with `block_layout`
        // and is released exactly once.
        unsafe { self.parent.free(self.block, self.block_layout) };
    }
}

impl fmt::Debug for Arena<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .field("min_align", &self.min_align)
            .finish()
    }
}

/// Round `value` up to a multiple of the power-of-two `align`.
fn round_up(value: usize, align: usize) -> Option<usize> {
    Some(value.checked_add(align - 1)? & !(align - 1))
}
