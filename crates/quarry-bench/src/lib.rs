//! Benchmark inputs for the Quarry containers.
//!
//! Every generator is seeded, so runs compare like with like:
//!
//! - [`random_keys`]: distinct-ish `u64` keys for hash-table workloads.
//! - [`edit_script`]: a cursor-local editing session for gap buffers.
//! - [`SAMPLE_TEXT`]: a fixed document to seed text buffers with.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Fixed prose used to pre-fill text buffers.
pub const SAMPLE_TEXT: &str = "The quarry opened at dawn. Carts rolled down the ramp, \
cutters marked the face in chalk, and by noon the first blocks were sorted by size on the \
lower terrace, waiting for the masons to claim them.";

/// `n` pseudo-random keys from `seed`.
pub fn random_keys(n: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.random()).collect()
}

/// One step of a simulated editing session.
#[derive(Clone, Copy, Debug)]
pub enum Edit {
    /// Type a byte at the cursor and advance.
    Type(u8),
    /// Delete the byte under the cursor.
    Delete,
    /// Move the cursor by a signed distance, clamped to the text.
    Jump(i32),
}

/// `n` edits that mostly type and delete near the cursor, with an
/// occasional short jump.
pub fn edit_script(n: usize, seed: u64) -> Vec<Edit> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| match rng.random_range(0..10) {
            0..=5 => Edit::Type(rng.random_range(b'a'..=b'z')),
            6..=8 => Edit::Delete,
            _ => Edit::Jump(rng.random_range(-40..=40)),
        })
        .collect()
}

/// Apply `delta` to `cursor`, clamped to `0..=len`.
pub fn clamp_cursor(cursor: usize, delta: i32, len: usize) -> usize {
    let moved = cursor as i64 + i64::from(delta);
    moved.clamp(0, len as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generators_are_deterministic() {
        assert_eq!(random_keys(32, 7), random_keys(32, 7));
        assert_ne!(random_keys(32, 7), random_keys(32, 8));
        assert_eq!(edit_script(64, 1).len(), 64);
    }

    #[test]
    fn cursor_clamps() {
        assert_eq!(clamp_cursor(3, -10, 20), 0);
        assert_eq!(clamp_cursor(3, 100, 20), 20);
        assert_eq!(clamp_cursor(3, 4, 20), 7);
    }
}
