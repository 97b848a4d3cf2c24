//! Allocator-aware containers.
//!
//! Every container here holds an [`Allocator`] chosen at construction and
//! routes all of its storage through it:
//!
//! - [`Array`]: contiguous growable sequence.
//! - [`HashTable`]: chained hash map over two arrays, with index links.
//! - [`GapBuffer`]: sequence with cheap edits near a movable gap.
//!
//! Growing operations return `Result<_, AllocError>`; on error the
//! container keeps its previous contents. Index violations panic.
//!
//! ```
//! use quarry_alloc::Arena;
//! use quarry_collections::{Array, HashTable};
//!
//! let arena = Arena::new(4096).unwrap();
//! let mut words = Array::new_in(arena.allocator());
//! words.push("left").unwrap();
//! words.push("right").unwrap();
//!
//! let mut index = HashTable::new_in(arena.allocator());
//! for (i, word) in words.iter().enumerate() {
//!     index.push(*word, i).unwrap();
//! }
//! assert_eq!(index.find("right"), Some(&1));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod array;
pub mod gap_buffer;
pub mod hash_table;
mod raw_buf;

pub use array::Array;
pub use gap_buffer::{GapBuffer, DEFAULT_GAP_SIZE};
pub use hash_table::{DefaultHashBuilder, HashTable};
pub use quarry_alloc::{AllocError, Allocator, Arena};
