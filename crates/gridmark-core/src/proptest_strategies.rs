//! Proptest strategies for markup pipeline property tests
//!
//! Provides reusable generators for tokenizer, layout and paint tests.

use proptest::prelude::*;

/// Target width: narrow (1-20) and normal (21-120) columns
pub fn arb_width() -> impl Strategy<Value = usize> {
    prop_oneof![
        1 => Just(1usize),         // Edge case: single column
        3 => 2usize..=20,          // Narrow viewports
        6 => 21usize..=120,        // Normal viewports
    ]
}

/// ASCII words with single spaces.
pub fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9]{0,30}", 0..12).prop_map(|words| words.join(" "))
}

pub fn arb_color_name() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(vec!["red", "lime", "blue", "white", "gray", "orange"])
            .prop_map(str::to_string),
        1 => Just("reset".to_string()),
        1 => "[a-z]{3,8}",          // mostly unknown names
    ]
}

/// One inline tag in any of the accepted spellings.
pub fn arb_inline_tag() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_color_name().prop_map(|c| format!("<text:{c}>")),
        arb_color_name().prop_map(|c| format!("<bg color:\"{c}\">")),
        arb_color_name().prop_map(|c| format!("<fillBg \"{c}\">")),
        prop::sample::select(vec!["<reset>", "<br>", "<unknown thing>"]).prop_map(str::to_string),
        "[a-z]{1,6}".prop_map(|id| format!("<id:\"{id}\">")),
        ("[a-z]{1,8}", "[a-zA-Z?]{1,25}").prop_map(|(t, l)| format!("<link \"{t}\",\"{l}\">")),
        "[a-zA-Z ]{1,30}".prop_map(|l| format!("<button \"{l}\" onClick:go>")),
        "[a-zA-Z]{1,12}".prop_map(|l| format!("<checkbox label:\"{l}\">")),
        (1usize..40).prop_map(|w| format!("<textbox width:{w}>")),
    ]
}

/// Text with escapes and stray brackets mixed in.
pub fn arb_literal() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => arb_text(),
        1 => Just("\\<".to_string()),
        1 => Just("\\>".to_string()),
        1 => Just("\\\\".to_string()),
        1 => Just("\\\"".to_string()),
    ]
}

/// One source line: blank, rule, or content with tags and alignment markers.
pub fn arb_line() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        1 => "[=~*-]{0,4}".prop_map(|p| format!("<hr:\"{p}\">")),
        8 => (
            0usize..4,
            prop::collection::vec(prop_oneof![2 => arb_literal(), 1 => arb_inline_tag()], 0..8),
        )
            .prop_map(|(markers, parts)| format!("{}{}", "#".repeat(markers), parts.concat())),
    ]
}

/// A whole document.
pub fn arb_markup() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_line(), 0..12).prop_map(|lines| lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn arb_width_produces_valid_values() {
        let mut runner = TestRunner::default();
        for _ in 0..100 {
            let w = arb_width().new_tree(&mut runner).unwrap().current();
            assert!((1..=120).contains(&w));
        }
    }

    #[test]
    fn arb_markup_produces_line_oriented_text() {
        let mut runner = TestRunner::default();
        for _ in 0..20 {
            let source = arb_markup().new_tree(&mut runner).unwrap().current();
            assert!(source.lines().count() <= 12);
        }
    }
}
