//! Prebuilt containers for integration tests and benchmarks.

use quarry_alloc::{AllocError, Allocator};
use quarry_collections::{Array, GapBuffer, HashTable};

/// A byte gap buffer holding `text`, with the gap moved to `gap_at`.
pub fn gap_buffer_from_str<'a>(
    text: &str,
    gap_at: usize,
    alloc: Allocator<'a>,
) -> Result<GapBuffer<'a, u8>, AllocError> {
    let mut buffer = GapBuffer::from_slice_in(text.as_bytes(), alloc)?;
    buffer.move_gap_to(gap_at);
    Ok(buffer)
}

/// The bytes of a byte gap buffer as a `String`.
///
/// # Panics
///
/// Panics if the contents are not UTF-8.
pub fn gap_buffer_to_string(buffer: &GapBuffer<'_, u8>) -> String {
    String::from_utf8(buffer.iter().copied().collect()).expect("gap buffer holds UTF-8")
}

/// An array holding `0..len`.
pub fn counting_array(len: u32, alloc: Allocator<'_>) -> Result<Array<'_, u32>, AllocError> {
    let mut array = Array::with_capacity_in(len as usize, alloc)?;
    for i in 0..len {
        array.push(i)?;
    }
    Ok(array)
}

/// A table mapping `k` to `k * k` for every `k` in `0..len`.
pub fn squares_table(len: u64, alloc: Allocator<'_>) -> Result<HashTable<'_, u64, u64>, AllocError> {
    let mut table = HashTable::with_capacity_in(len as usize, alloc)?;
    for k in 0..len {
        table.push(k, k * k)?;
    }
    Ok(table)
}
