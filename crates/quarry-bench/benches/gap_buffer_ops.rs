//! Criterion micro-benchmarks for gap-buffer editing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quarry_alloc::Allocator;
use quarry_bench::{clamp_cursor, edit_script, Edit, SAMPLE_TEXT};
use quarry_collections::{Array, GapBuffer};

fn bench_local_edits(c: &mut Criterion) {
    let script = edit_script(5000, 3);
    let mut seed_text = Vec::new();
    for _ in 0..64 {
        seed_text.extend_from_slice(SAMPLE_TEXT.as_bytes());
    }

    c.bench_function("gap_buffer_edit_session_5k", |b| {
        b.iter(|| {
            let mut text = GapBuffer::from_slice_in(&seed_text, Allocator::heap()).unwrap();
            let mut cursor = text.len() / 2;
            for edit in &script {
                match *edit {
                    Edit::Type(byte) => {
                        text.insert(cursor, byte).unwrap();
                        cursor += 1;
                    }
                    Edit::Delete if cursor < text.len() => {
                        text.remove(cursor);
                    }
                    Edit::Delete => {}
                    Edit::Jump(delta) => cursor = clamp_cursor(cursor, delta, text.len()),
                }
            }
            black_box(text.len());
        });
    });

    c.bench_function("array_edit_session_5k", |b| {
        b.iter(|| {
            let mut text = Array::from_slice_in(&seed_text, Allocator::heap()).unwrap();
            let mut cursor = text.len() / 2;
            for edit in &script {
                match *edit {
                    Edit::Type(byte) => {
                        text.insert(cursor, byte).unwrap();
                        cursor += 1;
                    }
                    Edit::Delete if cursor < text.len() => {
                        text.remove(cursor);
                    }
                    Edit::Delete => {}
                    Edit::Jump(delta) => cursor = clamp_cursor(cursor, delta, text.len()),
                }
            }
            black_box(text.len());
        });
    });
}

fn bench_random_access(c: &mut Criterion) {
    let mut text = GapBuffer::from_slice_in(SAMPLE_TEXT.as_bytes(), Allocator::heap()).unwrap();
    text.move_gap_to(text.len() / 3);
    c.bench_function("gap_buffer_index_scan", |b| {
        b.iter(|| {
            let mut sum = 0u32;
            for i in 0..text.len() {
                sum += u32::from(text[i]);
            }
            black_box(sum)
        });
    });
}

criterion_group!(benches, bench_local_edits, bench_random_access);
criterion_main!(benches);
