/*
 * proptest.rs
 *
 * property-based tests for parsing functions.
 * generates thousands of inputs to find edge cases.
 */

use proptest::prelude::*;
use std::time::Duration;

use timelimitx::duration::parse_duration;
use timelimitx::signal::{Signal, parse_signal, signal_name};

/* ============================================================================
 * Duration Parsing Properties
 * ============================================================================ */

/* well-formed <n><unit> tokens parse to exactly n * scale(unit) */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn duration_valid_tokens_scale_exactly(
        n in 0u64..10_000_000,
        (unit, scale) in prop::sample::select(vec![('s', 1u64), ('m', 60), ('h', 3600), ('d', 86_400)])
    ) {
        let s = format!("{n}{unit}");
        let d = parse_duration(&s).expect("valid token should parse");
        prop_assert_eq!(d, Duration::from_secs(n * scale));
        prop_assert_eq!(d.subsec_nanos(), 0);
    }
}

/* duration ordering: if a > b numerically, then parse(a) >= parse(b) */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn duration_ordering_preserved(a in 0u64..100_000, b in 0u64..100_000) {
        let da = parse_duration(&format!("{a}m")).unwrap();
        let db = parse_duration(&format!("{b}m")).unwrap();
        prop_assert_eq!(a.cmp(&b), da.cmp(&db));
    }
}

/* any unit character outside s/m/h/d is rejected */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn duration_invalid_unit_errors(
        n in 0u64..1000,
        unit in any::<char>().prop_filter("not a valid unit", |c| !matches!(c, 's' | 'm' | 'h' | 'd'))
    ) {
        let s = format!("{n}{unit}");
        prop_assert!(parse_duration(&s).is_err());
    }
}

/* non-numeric amounts are rejected */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn duration_non_numeric_amount_errors(amount in "[a-zA-Z. _]{1,8}", unit in "[smhd]") {
        let s = format!("{amount}{unit}");
        prop_assert!(parse_duration(&s).is_err());
    }
}

/* single character tokens never parse */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn duration_too_short_errors(c in proptest::char::range('\0', '\u{7f}')) {
        prop_assert!(parse_duration(&c.to_string()).is_err());
    }
}

/* negative always errors */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn duration_negative_errors(n in 1i64..1_000_000, unit in "[smhd]") {
        let s = format!("-{n}{unit}");
        prop_assert!(parse_duration(&s).is_err());
    }
}

/* parser is total: arbitrary strings return Ok or Err, never panic */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn duration_never_panics(s in ".{0,24}") {
        let _ = parse_duration(&s);
    }
}

/* ============================================================================
 * Signal Parsing Properties
 * ============================================================================ */

/* random casing of the three names always resolves to the same signal */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn signal_case_insensitive(
        sig in prop::sample::select(vec![Signal::SIGTERM, Signal::SIGINT, Signal::SIGKILL]),
        mask in prop::collection::vec(any::<bool>(), 7)
    ) {
        let name: String = signal_name(sig)
            .chars()
            .zip(mask.iter().cycle())
            .map(|(c, &upper)| if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
            .collect();
        prop_assert_eq!(parse_signal(&name).unwrap(), sig);
    }
}

/* anything that isn't one of the three names is rejected */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn signal_closed_set(s in ".{0,12}") {
        let upper = s.to_ascii_uppercase();
        prop_assume!(upper != "SIGTERM" && upper != "SIGINT" && upper != "SIGKILL");
        prop_assert!(parse_signal(&s).is_err());
    }
}

/* numbers are never accepted, even valid signal numbers */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn signal_numbers_rejected(n in -100i32..100) {
        prop_assert!(parse_signal(&n.to_string()).is_err());
    }
}
