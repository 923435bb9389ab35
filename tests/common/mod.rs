#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)] // Not every test binary uses every helper

use std::sync::Once;

use richtext_core::text::{Document, Place};

pub fn setup_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

pub fn p(column: usize, line: usize) -> Place {
    Place::new(column, line)
}

/// A place on an existing line of `doc`, clamped to the line's width.
pub fn clamped_place(doc: &Document, line: usize, column: usize) -> Place {
    let line = line % doc.line_count();
    let width = doc
        .store()
        .display_width(line, doc.settings().tab_length())
        .unwrap_or(0);
    p(column.min(width), line)
}
