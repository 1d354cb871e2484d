//! Fuzz target for checks-file loading.
//!
//! Goal: the loader should **never panic** on any input.
//! Malformed definitions must come back as `RuleError`s.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_checks_loader
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = blockguard_rules::load_checks("fuzz_tfchecks.json", text);
        let _ = blockguard_rules::load_checks("fuzz_tfchecks.yaml", text);
    }
});
