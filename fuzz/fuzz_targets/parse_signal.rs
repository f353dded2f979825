/*
 * fuzz_targets/parse_signal.rs
 *
 * fuzz target for signal resolution. parse_signal must never panic, and
 * must only accept the three supported names.
 *
 * edge cases: "SIGFOO", "9", "sigterm", " SIGTERM", "", non-ASCII case folds
 */

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = core::str::from_utf8(data) {
        if timelimitx::signal::parse_signal(s).is_ok() {
            let upper = s.to_ascii_uppercase();
            assert!(upper == "SIGTERM" || upper == "SIGINT" || upper == "SIGKILL");
        }
    }
});
