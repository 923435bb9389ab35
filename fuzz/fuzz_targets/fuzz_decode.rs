//! Fuzz target for file decoding and line splitting.
//!
//! Arbitrary bytes must either decode or fail with an error, and whatever
//! decodes must survive a store round trip.

#![no_main]

use libfuzzer_sys::fuzz_target;
use richtext_core::text::{LineStore, TextEncoding};

fuzz_target!(|data: &[u8]| {
    let encoding = TextEncoding::detect(data);
    let Ok(text) = encoding.decode(data) else {
        return;
    };
    let store = LineStore::from_text(&text);
    assert!(!store.is_empty());
    assert_eq!(store.text(), text);

    let bytes = encoding.encode(&text);
    assert_eq!(encoding.decode(&bytes).ok().as_deref(), Some(text.as_str()));
});
