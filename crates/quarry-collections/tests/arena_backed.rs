//! Containers backed by arenas: shared blocks, exhaustion, bulk reset.

use quarry_alloc::{AllocError, Allocator, Arena, ArenaConfig};
use quarry_collections::{Array, GapBuffer, HashTable, DEFAULT_GAP_SIZE};
use quarry_test_utils::fixtures::{
    counting_array, gap_buffer_from_str, gap_buffer_to_string, squares_table,
};
use quarry_test_utils::{init_tracing, DropCounter};

#[test]
fn three_containers_share_one_arena() {
    init_tracing();
    let arena = Arena::new(64 * 1024).unwrap();
    let alloc = arena.allocator();

    let array = counting_array(100, alloc).unwrap();
    let table = squares_table(100, alloc).unwrap();
    let text = gap_buffer_from_str("shared arena", 6, alloc).unwrap();

    assert_eq!(array.len(), 100);
    assert_eq!(table.find(&12), Some(&144));
    assert_eq!(gap_buffer_to_string(&text), "shared arena");
    assert!(arena.used() > 0);
    assert!(array.allocator().same_source(&table.allocator()));
}

#[test]
fn exhaustion_is_reported_not_fatal() {
    init_tracing();
    let arena = Arena::new(128).unwrap();
    let mut array = Array::new_in(arena.allocator());
    let err = loop {
        if let Err(err) = array.push(0u64) {
            break err;
        }
    };
    assert!(matches!(err, AllocError::ArenaExhausted { capacity: 128, .. }));
    let len = array.len();
    assert!(len > 0);
    assert!(array.iter().all(|&x| x == 0));

    // A growing call keeps failing, and keeps the contents.
    assert!(array.reserve(1000).is_err());
    assert_eq!(array.len(), len);
}

#[test]
fn exhausted_table_keeps_its_pairs() {
    let arena = Arena::new(512).unwrap();
    let mut table = HashTable::new_in(arena.allocator());
    let mut k = 0u32;
    while table.push(k, k.to_string().len()).is_ok() {
        k += 1;
    }
    assert_eq!(table.len(), k as usize);
    for key in 0..k {
        assert!(table.contains(&key));
    }
}

#[test]
fn gap_buffer_larger_than_arena_fails_cleanly() {
    let arena = Arena::new(DEFAULT_GAP_SIZE / 2).unwrap();
    let err = GapBuffer::<u8>::with_capacity_in(0, arena.allocator()).unwrap_err();
    assert!(matches!(err, AllocError::ArenaExhausted { .. }));
    assert_eq!(arena.used(), 0);
}

#[test]
fn reset_reclaims_after_containers_drop() {
    init_tracing();
    let mut arena = Arena::new(4096).unwrap();
    for round in 0..3u32 {
        {
            let mut array = Array::new_in(arena.allocator());
            for i in 0..64 {
                array.push(i * round).unwrap();
            }
            assert_eq!(array[63], 63 * round);
        }
        assert!(arena.used() > 0);
        arena.reset();
        assert_eq!(arena.used(), 0);
    }
}

#[test]
fn nested_arena_draws_from_parent() {
    let parent = Arena::new(8192).unwrap();
    let child = Arena::with_config_in(ArenaConfig::new(1024), parent.allocator()).unwrap();
    assert!(parent.used() >= 1024);

    let mut text = GapBuffer::with_capacity_in(0, child.allocator()).unwrap();
    text.insert_slice(0, b"nested").unwrap();
    assert_eq!(gap_buffer_to_string(&text), "nested");
    drop(text);
    drop(child);
}

#[test]
fn arena_copy_outlives_source_arena() {
    let heap_copy;
    {
        let arena = Arena::new(4096).unwrap();
        let table = squares_table(20, arena.allocator()).unwrap();
        heap_copy = table.copy_in(Allocator::heap()).unwrap();
    }
    assert_eq!(heap_copy.len(), 20);
    assert_eq!(heap_copy.find(&7), Some(&49));
}

#[test]
fn elements_are_dropped_before_the_arena() {
    let arena = Arena::new(4096).unwrap();
    let (counter, drops) = DropCounter::new();
    {
        let mut text = GapBuffer::new_in(arena.allocator());
        let mut array = Array::new_in(arena.allocator());
        for _ in 0..5 {
            text.push(counter.sibling()).unwrap();
            array.push(counter.sibling()).unwrap();
        }
        text.remove_range(1, 2);
        assert_eq!(drops.get(), 2);
    }
    assert_eq!(drops.get(), 10);
    drop(counter);
    assert_eq!(drops.get(), 11);
}

#[test]
fn null_allocator_containers_stay_empty() {
    let mut array: Array<'_, u8> = Array::new_in(Allocator::null());
    let mut table: HashTable<'_, u8, u8> = HashTable::new_in(Allocator::null());
    let mut text: GapBuffer<'_, u8> = GapBuffer::new_in(Allocator::null());
    assert_eq!(array.push(1).unwrap_err(), AllocError::NullAllocator);
    assert_eq!(table.push(1, 1).unwrap_err(), AllocError::NullAllocator);
    assert_eq!(text.push(1).unwrap_err(), AllocError::NullAllocator);
    assert!(array.is_empty() && table.is_empty() && text.is_empty());
}
