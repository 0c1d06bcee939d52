//! Fuzz target for the permissive literal parser.
//!
//! The parser must never panic or overflow the stack, and whatever it accepts
//! must survive the trip through `Cell` and back to JSON.

#![no_main]

use colwright::Cell;
use colwright::literal::{is_json_like, parse_literal, parse_structured};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = is_json_like(text);
        if let Some(value) = parse_literal(text) {
            let _ = Cell::from_json(value).to_json_string();
        }
        let _ = parse_structured(text);
    }
});
