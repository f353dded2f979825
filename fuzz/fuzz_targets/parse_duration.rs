/*
 * fuzz_targets/parse_duration.rs
 *
 * fuzz target for the duration parser. parse_duration must never panic,
 * and anything it accepts must be a whole number of seconds.
 *
 * edge cases: "", "s", "-1s", "+0d", "9223372036854775807d", multibyte units
 */

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = core::str::from_utf8(data) {
        if let Ok(d) = timelimitx::duration::parse_duration(s) {
            assert_eq!(d.subsec_nanos(), 0);
        }
    }
});
