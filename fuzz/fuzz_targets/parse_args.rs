/*
 * fuzz_targets/parse_args.rs
 *
 * fuzz target for CLI argument parsing plus config construction.
 * neither Args::try_parse_from nor RunConfig::from_args may panic on
 * arbitrary argument combinations.
 *
 * edge cases: "-t" (missing value), "--time=-5s", "-s9", "--", very long args
 */

#![no_main]

use clap::Parser;
use libfuzzer_sys::fuzz_target;
use timelimitx::args::Args;
use timelimitx::supervisor::RunConfig;

fuzz_target!(|data: &[u8]| {
    /* split input on null bytes to simulate multiple arguments */
    let args: Vec<String> = core::iter::once(String::from("timelimitx"))
        .chain(
            data.split(|&b| b == 0)
                .filter_map(|chunk| core::str::from_utf8(chunk).ok())
                .filter(|s| !s.is_empty())
                .map(String::from),
        )
        .collect();

    if let Ok(parsed) = Args::try_parse_from(&args) {
        let _ = RunConfig::from_args(&parsed);
        let _ = parsed.command_line();
    }
});
