//! Fuzz target: `AppCommand::decode`
//!
//! Splits arbitrary bytes at the first space into a property path and a
//! payload, then asserts that decoding never panics and that any start
//! command it accepts carries strictly positive limits.
//!
//! cargo fuzz run fuzz_command_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use podctl::app::commands::AppCommand;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    let (property, payload) = line.split_once(' ').unwrap_or((line, ""));

    if let Ok(AppCommand::Start { max_ml, max_seconds, .. }) = AppCommand::decode(property, payload) {
        assert!(max_ml > 0, "accepted non-positive volume limit");
        assert!(max_seconds > 0, "accepted non-positive time limit");
    }
});
