//! Fuzz target for document editing.
//!
//! Runs arbitrary edit sequences, then checks that undoing everything
//! restores the starting text and that no operation panics.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use richtext_core::text::{Command, Document, EditorSettings, Place, Range};

#[derive(Arbitrary, Debug)]
enum Op {
    Type(char),
    Paste(String),
    Backspace,
    Delete,
    Select { line: u8, column: u8, back: u8, column_mode: bool },
    Indent,
    Unindent,
    RemoveLine(u8),
    Replace(String),
    Undo,
    Redo,
}

#[derive(Arbitrary, Debug)]
struct Input {
    start: String,
    tab_length: u8,
    convert_tabs: bool,
    ops: Vec<Op>,
}

fn clamp(doc: &Document, line: u8, column: u8) -> Place {
    let line = usize::from(line) % doc.line_count();
    let width = doc
        .store()
        .display_width(line, doc.settings().tab_length())
        .unwrap_or(0);
    Place::new(usize::from(column).min(width), line)
}

fuzz_target!(|input: Input| {
    let settings = EditorSettings::default()
        .with_tab_length(usize::from(input.tab_length % 9))
        .with_convert_tabs_to_spaces(input.convert_tabs);
    let mut doc = Document::with_settings(settings);
    doc.set_text(&input.start);
    let start = doc.text();

    for op in input.ops.iter().take(64) {
        let _ = match op {
            Op::Type(c) => doc.insert_char(*c),
            Op::Paste(text) => doc.insert_text(text),
            Op::Backspace => doc.backspace(),
            Op::Delete => doc.delete_forward(),
            Op::Select { line, column, back, column_mode } => {
                let end = clamp(&doc, *line, *column);
                let start = Place::new(0, end.line.saturating_sub(usize::from(*back)));
                let range = if *column_mode {
                    Range::column(end, start)
                } else {
                    Range::new(end, start)
                };
                doc.execute(Command::select(range))
            }
            Op::Indent => doc.increase_indent(),
            Op::Unindent => doc.decrease_indent(),
            Op::RemoveLine(line) => {
                let line = usize::from(*line) % doc.line_count();
                doc.remove_lines([line])
            }
            Op::Replace(pattern) => doc.replace_all(pattern, "_").map(|_| ()),
            Op::Undo => doc.undo().map(|_| ()),
            Op::Redo => doc.redo().map(|_| ()),
        };
        assert!(doc.line_count() >= 1);
    }

    while let Ok(true) = doc.undo() {}
    assert_eq!(doc.text(), start);
});
