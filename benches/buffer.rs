//! Line store and document performance benchmarks.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use richtext_core::text::wrap::{WrapMode, WrapOptions};
use richtext_core::text::{BufferRef, Document, EditorSettings, LineStore, Place, Range};
use std::hint::black_box;

fn sample_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("\tfn item_{i}(value: u32) -> u32 {{ value * {i} }} // trailing comment"))
        .collect::<Vec<_>>()
        .join("\r\n")
}

fn store_creation(c: &mut Criterion) {
    let text = sample_text(1_000);
    c.bench_function("linestore_from_text_1k", |b| {
        b.iter(|| LineStore::from_text(black_box(&text)));
    });

    let store = LineStore::from_text(&text);
    c.bench_function("linestore_text_1k", |b| {
        b.iter(|| black_box(&store).text());
    });
}

fn typing(c: &mut Criterion) {
    c.bench_function("document_type_line", |b| {
        b.iter_batched(
            Document::new,
            |mut doc| {
                for ch in "let answer = 42;\n".chars() {
                    doc.insert_char(ch).unwrap();
                }
                doc
            },
            BatchSize::SmallInput,
        );
    });

    let text = sample_text(200);
    c.bench_function("document_insert_text_200", |b| {
        b.iter_batched(
            Document::new,
            |mut doc| {
                doc.insert_text(black_box(&text)).unwrap();
                doc
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("document_undo_redo_200", |b| {
        b.iter_batched(
            || {
                let mut doc = Document::new();
                for ch in text.chars().take(200) {
                    doc.insert_char(ch).unwrap();
                }
                doc
            },
            |mut doc| {
                while doc.undo().unwrap() {}
                while doc.redo().unwrap() {}
                doc
            },
            BatchSize::SmallInput,
        );
    });
}

fn search(c: &mut Criterion) {
    let store = LineStore::from_text(&sample_text(1_000));
    let buf = BufferRef::new(&store, 4);
    let all = Range::all(buf);
    let regex = regex::Regex::new(r"item_\d+").unwrap();

    c.bench_function("range_find_ranges_1k", |b| {
        b.iter(|| all.find_ranges_regex(buf, black_box(&regex)).unwrap());
    });

    c.bench_function("range_find_ranges_by_lines_1k", |b| {
        b.iter(|| all.find_ranges_by_lines(buf, black_box(&regex)).unwrap());
    });

    c.bench_function("store_place_to_position", |b| {
        b.iter(|| store.place_to_position(black_box(Place::new(20, 900)), 4).unwrap());
    });
}

fn wrapping(c: &mut Criterion) {
    let text = sample_text(1_000);
    for (name, mode) in [("word", WrapMode::Word), ("char", WrapMode::Char)] {
        let settings = EditorSettings::default().with_wrap(WrapOptions::new(mode, 24));
        c.bench_function(&format!("document_relayout_{name}_1k"), |b| {
            b.iter_batched(
                || {
                    let mut doc = Document::with_settings(settings);
                    doc.set_text(&text);
                    doc
                },
                |mut doc| {
                    doc.relayout();
                    doc
                },
                BatchSize::LargeInput,
            );
        });
    }
}

criterion_group!(benches, store_creation, typing, search, wrapping);
criterion_main!(benches);
