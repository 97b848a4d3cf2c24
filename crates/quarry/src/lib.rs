//! Quarry: allocator-aware containers with explicit memory management.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Quarry sub-crates. Containers never reach for a hidden global heap:
//! each one is bound to an [`Allocator`](alloc::Allocator) when it is
//! built, either passed explicitly (`*_in` constructors) or taken from the
//! thread's context allocator (`new()`).
//!
//! # Quick start
//!
//! ```rust
//! use quarry::prelude::*;
//!
//! // Scratch memory for one unit of work.
//! let mut arena = Arena::new(16 * 1024).unwrap();
//!
//! {
//!     let mut lines: Array<'_, &str> = Array::new_in(arena.allocator());
//!     lines.push("fn main() {}").unwrap();
//!
//!     let mut symbols = HashTable::new_in(arena.allocator());
//!     symbols.push("main", 0usize).unwrap();
//!     assert_eq!(symbols.find("main"), Some(&0));
//!
//!     let mut text = GapBuffer::from_slice_in(b"hllo", arena.allocator()).unwrap();
//!     text.insert(1, b'e').unwrap();
//!     assert_eq!(text.len(), 5);
//! }
//!
//! // Everything above is reclaimed at once.
//! arena.reset();
//! assert_eq!(arena.used(), 0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`alloc`] | `quarry-alloc` | `Allocator`, `Arena`, context allocator, `AllocError` |
//! | [`collections`] | `quarry-collections` | `Array`, `HashTable`, `GapBuffer` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Allocator handles, arenas and the context allocator (`quarry-alloc`).
///
/// [`alloc::Allocator`] is the handle every container stores;
/// [`alloc::Arena`] is the bump allocator; [`alloc::push_context_allocator`]
/// scopes the default used by `new()` constructors.
pub use quarry_alloc as alloc;

/// Containers (`quarry-collections`).
///
/// [`collections::Array`], [`collections::HashTable`] and
/// [`collections::GapBuffer`].
pub use quarry_collections as collections;

/// Common imports for typical Quarry usage.
///
/// ```rust
/// use quarry::prelude::*;
/// ```
pub mod prelude {
    // Allocation
    pub use quarry_alloc::{
        context_allocator, push_context_allocator, with_context_allocator, AllocError, Allocator,
        Arena, ArenaConfig, ContextGuard,
    };

    // Containers
    pub use quarry_collections::{Array, GapBuffer, HashTable};
}
