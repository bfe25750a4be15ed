//! Property-based tests for output comparison
//!
//! These tests use proptest to verify invariants across many randomly
//! generated outputs, catching edge cases that hand-written tests might miss.

use infoarena_core::{Comparison, DiffMode, compare_outputs};
use proptest::prelude::*;

/// Lines of printable text without trailing whitespace.
fn output_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z0-9 ]{0,12}[a-z0-9]", 0..8)
}

proptest! {
    /// Property: every output matches itself in both modes
    #[test]
    fn comparison_is_reflexive(text in "[ -~\n]{0,64}") {
        prop_assert_eq!(compare_outputs(&text, &text, DiffMode::Exact), Comparison::Match);
        prop_assert_eq!(compare_outputs(&text, &text, DiffMode::Loose), Comparison::Match);
    }

    /// Property: loose mode ignores trailing spaces on lines and trailing blank lines
    #[test]
    fn loose_ignores_trailing_whitespace(
        lines in output_lines(),
        pads in prop::collection::vec(" {0,3}\t?", 8),
        blank_tail in 0usize..4,
    ) {
        let expected = lines.iter().map(|l| format!("{}\n", l)).collect::<String>();
        let mut actual = lines
            .iter()
            .zip(&pads)
            .map(|(l, pad)| format!("{}{}\n", l, pad))
            .collect::<String>();
        actual.push_str(&"\n".repeat(blank_tail));

        prop_assert_eq!(compare_outputs(&expected, &actual, DiffMode::Loose), Comparison::Match);
    }

    /// Property: changing one line is reported at that line in both modes
    #[test]
    fn changed_line_is_located(lines in prop::collection::vec("[a-z]{1,6}", 1..8), index in any::<prop::sample::Index>()) {
        let changed = index.index(lines.len());
        let expected = lines.join("\n");
        let mut altered = lines.clone();
        altered[changed] = format!("{}X", altered[changed]);
        let actual = altered.join("\n");

        let mismatch = Comparison::Mismatch { first_difference_line: changed + 1 };
        prop_assert_eq!(compare_outputs(&expected, &actual, DiffMode::Loose), mismatch);
        prop_assert_eq!(compare_outputs(&expected, &actual, DiffMode::Exact), mismatch);
    }

    /// Property: a match in exact mode is always a match in loose mode
    #[test]
    fn exact_match_implies_loose_match(a in "[ab \n]{0,16}", b in "[ab \n]{0,16}") {
        if compare_outputs(&a, &b, DiffMode::Exact).is_match() {
            prop_assert!(compare_outputs(&a, &b, DiffMode::Loose).is_match());
        }
    }
}
