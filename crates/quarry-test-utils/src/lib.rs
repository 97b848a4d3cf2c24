//! Test utilities and fixtures for Quarry development.
//!
//! - [`CollidingKey`]: a key type whose hashes all collide, for driving
//!   every hash-table pair into one chain.
//! - [`DropCounter`]: counts drops so tests can check element ownership.
//! - [`init_tracing`]: installs a test-writer subscriber once per process.
//! - [`fixtures`]: prebuilt containers.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::Cell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use tracing_subscriber::EnvFilter;

/// A key that compares by `id` but always hashes to the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollidingKey(pub u32);

impl Hash for CollidingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        0u8.hash(state);
    }
}

/// Increments a shared counter when dropped.
#[derive(Debug)]
pub struct DropCounter {
    drops: Rc<Cell<usize>>,
}

impl DropCounter {
    /// A counter and the shared cell it reports to.
    pub fn new() -> (Self, Rc<Cell<usize>>) {
        let drops = Rc::new(Cell::new(0));
        (
            Self {
                drops: Rc::clone(&drops),
            },
            drops,
        )
    }

    /// Another counter reporting to the same cell.
    pub fn sibling(&self) -> Self {
        Self {
            drops: Rc::clone(&self.drops),
        }
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// Install a `fmt` subscriber writing through the test harness.
///
/// Honours `RUST_LOG`, defaulting to `quarry_alloc=debug`. Safe to call
/// from every test; only the first call installs anything.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quarry_alloc=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
