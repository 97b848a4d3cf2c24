//! Allocator handles, bump arenas and the scoped context allocator.
//!
//! Every Quarry container stores an [`Allocator`] and routes all of its
//! memory traffic through it. This crate provides the three memory
//! sources and the per-thread default:
//!
//! ```text
//! Allocator<'a> (Copy handle)
//! ├── Heap        → std::alloc
//! ├── Arena(&'a)  → Arena<'p>: one fixed block from a parent allocator,
//! │                 bump cursor, bulk reset / destroy
//! └── Null        → refuses every request
//!
//! context stack (thread-local) → default for `new()` constructors
//! ```
//!
//! # Failure model
//!
//! Allocation failure is an ordinary [`AllocError`] value. Nothing here
//! traps or silently ignores a failed request.
//!
//! # Safety
//!
//! This crate and `quarry-collections` are the only library crates that
//! contain `unsafe` code. Raw heap calls live in a private `raw` module.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod allocator;
pub mod arena;
pub mod config;
pub mod context;
pub mod error;
mod raw;

// Public re-exports for the primary API surface.
pub use allocator::Allocator;
pub use arena::Arena;
pub use config::ArenaConfig;
pub use context::{
    context_allocator, context_depth, push_context_allocator, with_context_allocator,
    ContextGuard,
};
pub use error::AllocError;
