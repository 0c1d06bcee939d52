//! Fuzz target for the datetime cascade and explicit formats.
//!
//! Splits the input at the first newline: the head is used as a strftime
//! pattern, the tail as the value to parse.

#![no_main]

use colwright::temporal::{
    format_datetime, looks_like_temporal, parse_datetime, parse_time, parse_with_format, validate_format,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = looks_like_temporal(text);
    let _ = parse_time(text);
    let parsed = parse_datetime(text);

    let (format, value) = text.split_once('\n').unwrap_or((text, ""));
    let _ = parse_with_format(value, format);

    // Only validated formats may be rendered.
    if let (Some(dt), Ok(())) = (parsed, validate_format(format)) {
        let _ = format_datetime(&dt, format);
    }
});
