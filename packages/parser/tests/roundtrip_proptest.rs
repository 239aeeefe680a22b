//! Property-based tests for lossless parsing
//!
//! Any text built from the reader grammar must serialize back byte for
//! byte, whatever mix of nesting, prefixes and trivia it contains.

use paren_parser::{parse, serialize};
use proptest::prelude::*;

fn atom_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Symbols
        "[a-z][a-z0-9?!*-]{0,6}",
        "[a-z]{1,4}/[a-z]{1,4}",
        // Keywords
        ":[a-z][a-z0-9-]{0,5}",
        "::[a-z]{1,4}",
        // Numbers
        "[1-9][0-9]{0,3}",
        "-?[0-9]{1,2}\\.[0-9]{1,2}",
        "[1-9]/[1-9]",
        // Strings and characters
        "\"[a-z ]{0,6}\"",
        "\\\\[a-z]",
        Just("nil".to_string()),
        Just("true".to_string()),
    ]
}

fn separator_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(" ".to_string()),
        Just(", ".to_string()),
        Just("\n  ".to_string()),
        Just(" ; note\n".to_string()),
    ]
}

/// Forms separated by generated trivia
fn join(forms: Vec<(String, String)>) -> String {
    let mut out = String::new();
    for (i, (form, separator)) in forms.into_iter().enumerate() {
        if i > 0 {
            out.push_str(&separator);
        }
        out.push_str(&form);
    }
    out
}

fn form_strategy() -> impl Strategy<Value = String> {
    atom_strategy().prop_recursive(4, 48, 6, |inner| {
        let body = |forms: BoxedStrategy<String>| {
            prop::collection::vec((forms, separator_strategy()), 0..5).prop_map(join)
        };
        prop_oneof![
            body(inner.clone()).prop_map(|b| format!("({})", b)),
            body(inner.clone()).prop_map(|b| format!("[{}]", b)),
            body(inner.clone()).prop_map(|b| format!("{{{}}}", b)),
            body(inner.clone()).prop_map(|b| format!("#{{{}}}", b)),
            body(inner.clone()).prop_map(|b| format!("#?(:clj {})", b)),
            inner.clone().prop_map(|f| format!("'{}", f)),
            inner.clone().prop_map(|f| format!("@{}", f)),
            inner.clone().prop_map(|f| format!("#_{}", f)),
            inner.clone().prop_map(|f| format!("^:private {}", f)),
            inner.prop_map(|f| format!("#inst {}", f)),
        ]
    })
}

fn document_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec((form_strategy(), separator_strategy()), 0..6),
        prop_oneof![Just(String::new()), Just("\n".to_string())],
    )
        .prop_map(|(forms, trailing)| format!("{}{}", join(forms), trailing))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_generated_documents_roundtrip(source in document_strategy()) {
        let tree = parse(&source);
        prop_assert!(tree.is_ok(), "Failed to parse: {:?}", source);
        if let Ok(tree) = tree {
            prop_assert_eq!(serialize(&tree), source);
        }
    }

    #[test]
    fn test_forms_are_counted(forms in prop::collection::vec(form_strategy(), 1..5)) {
        let source = forms.join("\n");
        let tree = parse(&source).unwrap();
        prop_assert_eq!(tree.forms().count(), forms.len());
    }
}
