//! Fuzz target for the CSV/TSV importer.
//!
//! Import must never panic on malformed input, whatever delimiter detection
//! decides, and every imported dataset must go through inference.

#![no_main]

use colwright::{Parser, TypeInferenceEngine};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(dataset) = Parser::new().parse_str(text) {
            let _ = TypeInferenceEngine::new().infer_dataset(&dataset);
        }
    }
});
