//! End-to-end editing scenarios and round-trip properties.

mod common;

use common::{p, setup_test_logging};
use proptest::prelude::*;
use richtext_core::text::tabs::{TabSnap, display_to_string, string_to_display};
use richtext_core::text::wrap::{WrapMode, WrapOptions, cut_offs};
use richtext_core::text::{
    BufferRef, Document, EditorSettings, EolFormat, LineStore, Range,
};
use richtext_core::unicode::is_break_after;
use richtext_core::{Error, TextEvent};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn crlf_text_becomes_two_lines() {
    setup_test_logging();
    let mut doc = Document::new();
    doc.insert_text("foo\r\nbar").unwrap();
    assert_eq!(doc.line_count(), 2);
    assert_eq!(doc.store()[0].eol(), EolFormat::CrLf);
    assert_eq!(doc.store()[1].eol(), EolFormat::None);
    assert_eq!(doc.text(), "foo\r\nbar");
}

#[test]
fn tab_width_follows_tab_stops() {
    setup_test_logging();
    let store = LineStore::from_text("a\tb");
    assert_eq!(store.display_width(0, 4).unwrap(), 5);
    assert_eq!(store[0].string_to_display(2, 4), 4);
    assert_eq!(store.display_width(0, 8).unwrap(), 9);
}

#[test]
fn backspace_at_line_start_takes_next_terminator() {
    setup_test_logging();
    let mut doc = Document::from_text("one\r\ntwo\rthree");
    doc.set_selection(Range::caret(p(0, 2))).unwrap();
    doc.backspace().unwrap();
    assert_eq!(doc.line_count(), 2);
    assert_eq!(doc.store()[1].text(), "twothree");
    assert_eq!(doc.store()[1].eol(), EolFormat::None);
    assert_eq!(doc.selection().start(), p(3, 1));

    let mut doc = Document::from_text("one\ntwo\r\nthree\n");
    doc.set_selection(Range::caret(p(0, 1))).unwrap();
    doc.backspace().unwrap();
    assert_eq!(doc.store()[0].text(), "onetwo");
    assert_eq!(doc.store()[0].eol(), EolFormat::CrLf);
    assert_eq!(doc.text(), "onetwo\r\nthree\n");
}

#[test]
fn typed_cr_then_lf_is_one_break() {
    setup_test_logging();
    let mut doc = Document::new();
    for c in "ab\r\ncd".chars() {
        doc.insert_char(c).unwrap();
    }
    assert_eq!(doc.line_count(), 2);
    assert_eq!(doc.text(), "ab\r\ncd");
}

#[test]
fn auto_indent_keeps_typed_cr_lf_as_one_break() {
    setup_test_logging();
    let settings = EditorSettings::default().with_auto_indent(true);
    let mut doc = Document::with_settings(settings);
    for c in "  a\r\nb".chars() {
        doc.insert_char(c).unwrap();
    }
    assert_eq!(doc.line_count(), 2);
    assert_eq!(doc.store()[0].eol(), EolFormat::CrLf);
    assert_eq!(doc.text(), "  a\r\n  b");

    doc.undo().unwrap();
    doc.undo().unwrap();
    assert_eq!(doc.text(), "  a\r  ");
    doc.redo().unwrap();
    doc.redo().unwrap();
    assert_eq!(doc.text(), "  a\r\n  b");
    assert_eq!(doc.line_count(), 2);
}

#[test]
fn pasting_with_auto_indent_round_trips() {
    setup_test_logging();
    let settings = EditorSettings::default().with_auto_indent(true);
    for text in ["  a\r\nb", "  a\n  b", "\tx\r\n\ty\rz"] {
        let mut doc = Document::with_settings(settings);
        doc.insert_text(text).unwrap();
        assert_eq!(doc.text(), text);
    }
}

#[test]
fn default_eol_applies_to_typed_breaks() {
    setup_test_logging();
    let settings = EditorSettings::default().with_default_eol(EolFormat::CrLf);
    let mut doc = Document::with_settings(settings);
    doc.insert_char('a').unwrap();
    doc.insert_char('\n').unwrap();
    doc.insert_char('b').unwrap();
    doc.insert_char('\r').unwrap();
    doc.insert_char('\n').unwrap();
    assert_eq!(doc.text(), "a\r\nb\r\n");
    assert_eq!(doc.line_count(), 3);
}

#[test]
fn normalize_eol_rewrites_inserted_text() {
    setup_test_logging();
    let settings = EditorSettings::default()
        .with_default_eol(EolFormat::Lf)
        .with_normalize_eol(true);
    let mut doc = Document::with_settings(settings);
    doc.insert_text("a\r\nb\rc").unwrap();
    assert_eq!(doc.text(), "a\nb\nc");
}

#[test]
fn single_line_mode_rejects_breaks() {
    setup_test_logging();
    let settings = EditorSettings::default().with_multiline(false);
    let mut doc = Document::with_settings(settings);
    doc.insert_text("abc").unwrap();
    let err = doc.insert_text("x\ny").unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));
    assert!(doc.insert_char('\r').is_err());
    assert_eq!(doc.text(), "abc");
    assert_eq!(doc.line_count(), 1);
}

#[test]
fn out_of_range_selection_is_rejected() {
    setup_test_logging();
    let mut doc = Document::from_text("ab\ncd");
    let err = doc.set_selection(Range::caret(p(0, 5))).unwrap_err();
    assert!(matches!(err, Error::LineOutOfRange { line: 5, count: 2 }));
    let err = doc.set_selection(Range::caret(p(9, 1))).unwrap_err();
    assert!(matches!(
        err,
        Error::ColumnOutOfRange {
            line: 1,
            column: 9,
            width: 2
        }
    ));
    assert_eq!(doc.selection(), &Range::default());
}

#[test]
fn text_changing_handler_rewrites_and_cancels() {
    setup_test_logging();
    let mut doc = Document::new();
    doc.set_text_changing_handler(|change| {
        if change.text == "!" {
            change.cancel = true;
        } else {
            change.text = change.text.to_uppercase();
        }
    });
    doc.insert_text("abc").unwrap();
    doc.insert_char('!').unwrap();
    assert_eq!(doc.text(), "ABC");
    assert!(doc.undo().unwrap());
    assert_eq!(doc.text(), "");
    assert!(doc.redo().unwrap());
    assert_eq!(doc.text(), "ABC");
}

#[test]
fn structural_events_carry_retired_ids() {
    setup_test_logging();
    let mut doc = Document::from_text("a\nb\nc\nd");
    let ids: Vec<_> = doc.store().iter().map(|line| line.id()).collect();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    doc.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    doc.remove_lines([1, 2]).unwrap();
    assert_eq!(doc.text(), "a\nd");
    let removed: Vec<_> = events
        .borrow()
        .iter()
        .filter_map(|event| match event {
            TextEvent::LineRemoved { removed_ids, .. } => Some(removed_ids.clone()),
            _ => None,
        })
        .flatten()
        .collect();
    assert_eq!(removed.len(), 2);
    assert!(removed.contains(&ids[1]));
    assert!(removed.contains(&ids[2]));

    doc.undo().unwrap();
    assert_eq!(doc.text(), "a\nb\nc\nd");
    let restored: Vec<_> = doc.store().iter().map(|line| line.id()).collect();
    assert_eq!(restored[0], ids[0]);
    assert_eq!(restored[3], ids[3]);
    assert!(restored[1].get() > ids[3].get());
}

#[test]
fn batch_update_coalesces_text_changed() {
    setup_test_logging();
    let mut doc = Document::from_text("a\nb\nc\nd");
    let changed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changed);
    doc.subscribe(move |event| {
        if let TextEvent::TextChanged { from_line, to_line } = event {
            sink.borrow_mut().push((*from_line, *to_line));
        }
    });

    doc.begin_update();
    doc.set_selection(Range::caret(p(1, 0))).unwrap();
    doc.insert_char('x').unwrap();
    doc.set_selection(Range::caret(p(1, 3))).unwrap();
    doc.insert_char('y').unwrap();
    assert!(changed.borrow().is_empty());
    doc.end_update();
    assert_eq!(*changed.borrow(), vec![(0, 3)]);
}

#[test]
fn search_maps_matches_across_lines() {
    setup_test_logging();
    let doc = Document::from_text("alpha\r\n\tbeta gamma\nbeta");
    let found = doc.find_all("beta").unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].from(), p(4, 1));
    assert_eq!(found[0].to(), p(8, 1));
    assert_eq!(found[1].from(), p(0, 2));

    let across = doc.find_all(r"alpha\r\n\t").unwrap();
    assert_eq!(across.len(), 1);
    assert_eq!(across[0].to(), p(4, 1));

    assert!(matches!(doc.find_all("(unclosed"), Err(Error::Pattern(_))));
}

#[test]
fn folding_markers_can_be_undone() {
    setup_test_logging();
    let mut doc = Document::from_text("fn a() {\n  body\n}\n");
    doc.set_folding_markers(r"\{\s*$", r"^\s*\}").unwrap();
    assert!(doc.store()[0].fold_start().is_some());
    assert!(doc.store()[2].fold_end().is_some());
    assert!(doc.store()[1].fold_start().is_none());
    doc.undo().unwrap();
    assert!(doc.store()[0].fold_start().is_none());
    assert!(doc.store()[2].fold_end().is_none());
}

// ============================================================================
// Properties
// ============================================================================

/// Text with line terminators but no other control characters.
fn editor_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "a", "b", "z", " ", "\t", "_", "漢", "é", "\n", "\r\n", "\r", "word",
        ]),
        0..40,
    )
    .prop_map(|parts| parts.concat())
}

fn wordy_line() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::collection::vec(prop::sample::select(vec!['a', 'b', 'é', 'z']), 0..30),
        prop::collection::vec(
            prop::sample::select(vec!['a', 'b', '1', '7', '.', ',', ' ', ' ', '\t', '-', '_', '漢']),
            0..40,
        ),
    ]
    .prop_map(|chars| chars.into_iter().collect())
}

fn tabbed_line() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!['a', 'b', ' ', '\t', '漢']), 0..30)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    /// Inserting text into an empty buffer reads it back unchanged.
    #[test]
    fn insert_then_read_round_trips(text in editor_text()) {
        let mut doc = Document::new();
        doc.insert_text(&text).unwrap();
        prop_assert_eq!(doc.text(), text.clone());
        let buf = doc.buf();
        prop_assert_eq!(Range::all(buf).text(buf).unwrap(), text);
    }

    /// Typing character by character builds the same lines.
    #[test]
    fn typing_matches_pasting(text in editor_text()) {
        let mut typed = Document::new();
        for c in text.chars() {
            typed.insert_char(c).unwrap();
        }
        prop_assert_eq!(typed.text(), text);
    }

    /// Display-to-string inverts string-to-display away from tab interiors,
    /// and tab interiors follow the center-of-tab rule.
    #[test]
    fn coordinate_mapping_inverts(line in tabbed_line(), tab in 1usize..9) {
        let chars: Vec<char> = line.chars().collect();
        for i in 0..=chars.len() {
            let column = string_to_display(chars.iter().copied(), i, tab);
            prop_assert_eq!(display_to_string(chars.iter().copied(), column, tab, TabSnap::Nearest), i);
        }
        let mut start = 0;
        for (i, &c) in chars.iter().enumerate() {
            let width = string_to_display(chars.iter().copied(), i + 1, tab) - start;
            for offset in 1..width {
                let got = display_to_string(chars.iter().copied(), start + offset, tab, TabSnap::Nearest);
                let expected = if 2 * offset <= width { i } else { i + 1 };
                prop_assert_eq!(got, expected, "char {:?} offset {}", c, offset);
            }
            start += width;
        }
    }

    /// Every wrapped row fits its budget unless a single character is wider.
    #[test]
    fn wrap_rows_fit_budget(
        line in tabbed_line(),
        width in 1usize..12,
        secondary in 1usize..12,
        word in any::<bool>(),
    ) {
        let mode = if word { WrapMode::Word } else { WrapMode::Char };
        let opts = WrapOptions::new(mode, width).with_secondary_width(secondary);
        let chars: Vec<char> = line.chars().collect();
        let cuts = cut_offs(&chars, 4, &opts);
        let mut bounds = vec![0];
        bounds.extend(cuts.iter().copied());
        bounds.push(chars.len());
        for (row, pair) in bounds.windows(2).enumerate() {
            prop_assert!(pair[0] < pair[1] || chars.is_empty());
            let from = string_to_display(chars.iter().copied(), pair[0], 4);
            let to = string_to_display(chars.iter().copied(), pair[1], 4);
            let budget = if row == 0 { width } else { secondary };
            prop_assert!(to - from <= budget || pair[1] - pair[0] == 1);
        }
    }

    /// Word wrap cuts inside a word (or number like `3.14`) only when that
    /// word alone is wider than the row it starts on.
    #[test]
    fn word_wrap_keeps_words_whole(
        line in wordy_line(),
        width in 1usize..12,
        secondary in 1usize..12,
    ) {
        let opts = WrapOptions::new(WrapMode::Word, width).with_secondary_width(secondary);
        let chars: Vec<char> = line.chars().collect();
        let glued = |i: usize| !is_break_after(chars[i], chars.get(i + 1).copied());
        let cuts = cut_offs(&chars, 4, &opts);
        for (row, &cut) in cuts.iter().enumerate() {
            if !glued(cut - 1) {
                continue;
            }
            let mut lo = cut - 1;
            while lo > 0 && glued(lo - 1) {
                lo -= 1;
            }
            let mut hi = cut;
            while hi + 1 < chars.len() && glued(hi) {
                hi += 1;
            }
            let run = string_to_display(chars.iter().copied(), hi + 1, 4)
                - string_to_display(chars.iter().copied(), lo, 4);
            let budget = if row == 0 { width } else { secondary };
            prop_assert!(
                run > budget,
                "cut {} splits {:?} of width {} under budget {}",
                cut,
                chars[lo..=hi].iter().collect::<String>(),
                run,
                budget
            );
        }
    }
}

#[test]
fn store_and_range_agree_on_positions() {
    setup_test_logging();
    let store = LineStore::from_text("ab\r\n\tc\nd");
    let buf = BufferRef::new(&store, 4);
    for position in 0..=8 {
        let place = store.position_to_place(position, 4).unwrap();
        info!(position, %place, "mapped");
        let back = store.place_to_position(place, 4).unwrap();
        assert!(back <= position);
    }
    assert_eq!(store.position_to_place(5, 4).unwrap(), p(4, 1));
    assert_eq!(Range::all(buf).to(), p(1, 2));
}
