//! Scoped, per-thread default allocator.
//!
//! Containers built with `new()` draw from the *context allocator*: the
//! top of a thread-local stack whose base is the heap. A region of code
//! can redirect those constructions (for example into a leaked arena) by
//! pushing an override and holding the returned [`ContextGuard`]:
//!
//! ```
//! use quarry_alloc::{context_allocator, push_context_allocator, Allocator, Arena};
//!
//! let arena = Arena::new(1024).unwrap().leak();
//! {
//!     let _guard = push_context_allocator(arena.allocator());
//!     assert!(context_allocator().arena().is_some());
//! }
//! assert!(matches!(context_allocator(), Allocator::Heap));
//! ```
//!
//! Only `'static` allocators can be installed; arenas with a shorter
//! lifetime are passed explicitly through the `*_in` constructors.

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::allocator::Allocator;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Allocator<'static>>> = const { RefCell::new(Vec::new()) };
}

/// The allocator `new()` constructors use on this thread.
pub fn context_allocator() -> Allocator<'static> {
    CONTEXT_STACK
        .try_with(|stack| stack.borrow().last().copied())
        .ok()
        .flatten()
        .unwrap_or(Allocator::Heap)
}

/// Number of overrides currently pushed on this thread.
pub fn context_depth() -> usize {
    CONTEXT_STACK.with(|stack| stack.borrow().len())
}

/// Install `allocator` as this thread's context allocator until the
/// returned guard is dropped.
///
/// Guards must be dropped in reverse push order; a violation trips a
/// debug assertion.
pub fn push_context_allocator(allocator: Allocator<'static>) -> ContextGuard {
    let depth = CONTEXT_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.push(allocator);
        stack.len()
    });
    ContextGuard {
        depth,
        _not_send: PhantomData,
    }
}

/// Run `f` with `allocator` installed as the context allocator.
pub fn with_context_allocator<R>(allocator: Allocator<'static>, f: impl FnOnce() -> R) -> R {
    let _guard = push_context_allocator(allocator);
    f()
}

/// Pops a context allocator override when dropped.
///
/// Bound to the thread that created it.
#[must_use = "the override is popped as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let _ = CONTEXT_STACK.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            debug_assert_eq!(
                stack.len(),
                self.depth,
                "context allocator guards dropped out of order"
            );
            stack.truncate(self.depth - 1);
        });
    }
}
