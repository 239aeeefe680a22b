//! Integration tests for editor crate

use paren_editor::{
    parse, CursorError, Direction, EditorConfig, EditorError, MatchOptions, Mutation, Origin,
    SaveOutcome, SessionManager, ThreadStyle,
};
use std::fs;

const SOURCE: &str = r#"(ns app.orders
  (:require [clojure.string :as str]))

;; Totals
(defn order-total [order]
  (let [items (:items order)]
    (reduce + (map :price (filter :taxable items)))))

(defn describe [order]
  (str "Order " (:id order) ": " (order-total order)))
"#;

#[test]
fn test_document_lifecycle() -> anyhow::Result<()> {
    let manager = SessionManager::new();
    manager.create("orders", SOURCE, false)?;

    assert_eq!(manager.serialize("orders")?, SOURCE);
    assert_eq!(manager.save("orders", None)?, SaveOutcome::Text(SOURCE.to_string()));

    let info = manager.info("orders")?;
    assert_eq!(info.origin, Origin::Text);
    assert!(info.path.is_empty());
    assert_eq!(info.version, 0);

    manager.close("orders")?;
    assert!(manager.list().is_empty());
    Ok(())
}

#[test]
fn test_bulk_replace_counts_every_occurrence() {
    let manager = SessionManager::new();
    manager.create("s", "(foo (bar foo) foo)", false).unwrap();

    let count = manager
        .bulk_replace("s", "foo", "baz", MatchOptions::default())
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(manager.serialize("s").unwrap(), "(baz (bar baz) baz)");
}

#[test]
fn test_zero_match_replace_is_noop() {
    let manager = SessionManager::new();
    manager.create("s", SOURCE, false).unwrap();

    let count = manager
        .bulk_replace("s", "no-such-name", "x", MatchOptions::default())
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(manager.serialize("s").unwrap(), SOURCE);
    assert!(!manager.info("s").unwrap().can_undo);
}

#[test]
fn test_extract_only_selected_occurrence() {
    let manager = SessionManager::new();
    manager.create("s", "[(+ 1 2) (+ 1 2)]", false).unwrap();
    manager.goto("s", &[0, 0]).unwrap();

    manager.extract_to_let("s", "x").unwrap();
    assert_eq!(manager.serialize("s").unwrap(), "(let [x (+ 1 2)] [x (+ 1 2)])");
}

#[test]
fn test_extract_into_existing_let() {
    let manager = SessionManager::new();
    manager.create("s", SOURCE, false).unwrap();

    // (filter :taxable items) inside the let body
    manager.goto("s", &[1, 3, 2, 2, 2]).unwrap();
    assert_eq!(
        manager.info("s").unwrap().current.preview,
        "(filter :taxable items)"
    );

    let result = manager.extract_to_let("s", "taxable").unwrap();
    assert_eq!(result.location.path, vec![1, 3]);

    let text = manager.serialize("s").unwrap();
    assert!(text.contains("(let [items (:items order) taxable (filter :taxable items)]"));
    assert!(text.contains("(reduce + (map :price taxable))"));
}

#[test]
fn test_thread_last_in_session() {
    let manager = SessionManager::new();
    manager.create("s", SOURCE, false).unwrap();
    manager.goto("s", &[1, 3, 2]).unwrap();

    manager.thread("s", ThreadStyle::Last).unwrap();
    let text = manager.serialize("s").unwrap();
    assert!(text.contains("(->> items (filter :taxable) (map :price) (reduce +))"));
    assert!(parse(&text).is_ok());
}

#[test]
fn test_not_nested_call_leaves_session_unchanged() {
    let manager = SessionManager::new();
    manager.create("s", "(inc x)", false).unwrap();
    manager.goto("s", &[0]).unwrap();
    let before = manager.info("s").unwrap();

    assert!(matches!(
        manager.thread("s", ThreadStyle::First),
        Err(EditorError::NotNestedCall)
    ));
    let after = manager.info("s").unwrap();
    assert_eq!(after.version, before.version);
    assert_eq!(manager.serialize("s").unwrap(), "(inc x)");
}

#[test]
fn test_unknown_session_everywhere() {
    let manager = SessionManager::new();
    manager.create("known", "(a)", false).unwrap();

    let unknown = |result: Result<(), EditorError>| {
        assert!(matches!(result, Err(EditorError::UnknownSession(ref id)) if id == "ghost"));
    };
    unknown(manager.info("ghost").map(|_| ()));
    unknown(manager.serialize("ghost").map(|_| ()));
    unknown(manager.save("ghost", None).map(|_| ()));
    unknown(manager.replace("ghost", "(b)").map(|_| ()));
    unknown(manager.bulk_replace("ghost", "a", "b", MatchOptions::default()).map(|_| ()));
    unknown(manager.extract_to_let("ghost", "x").map(|_| ()));
    unknown(manager.thread("ghost", ThreadStyle::First).map(|_| ()));
    unknown(manager.find("ghost", "a", MatchOptions::default()).map(|_| ()));
    unknown(manager.undo("ghost").map(|_| ()));
    unknown(manager.close("ghost"));

    assert_eq!(manager.list(), vec!["known"]);
    assert_eq!(manager.serialize("known").unwrap(), "(a)");
}

#[test]
fn test_navigation_boundaries_keep_tree() {
    let manager = SessionManager::new();
    manager.create("s", "(a b)", false).unwrap();

    assert!(matches!(
        manager.navigate("s", Direction::Up),
        Err(EditorError::Cursor(CursorError::AtRoot))
    ));
    manager.goto("s", &[0, 1]).unwrap();
    assert!(matches!(
        manager.navigate("s", Direction::Right),
        Err(EditorError::Cursor(CursorError::NoSibling))
    ));

    let info = manager.info("s").unwrap();
    assert_eq!(info.current.preview, "b");
    assert_eq!(manager.serialize("s").unwrap(), "(a b)");
}

#[test]
fn test_replace_fragment_errors() {
    let manager = SessionManager::new();
    manager.create("s", "(a b)", false).unwrap();
    manager.goto("s", &[0, 0]).unwrap();

    assert!(matches!(manager.replace("s", "(x"), Err(EditorError::InvalidFragment(_))));
    assert!(matches!(manager.replace("s", "x y"), Err(EditorError::MultipleNodes(2))));
    manager.replace("s", "(x y)").unwrap();
    assert_eq!(manager.serialize("s").unwrap(), "((x y) b)");
}

#[test]
fn test_find_reports_locations() {
    let manager = SessionManager::new();
    manager.create("s", SOURCE, false).unwrap();

    let matches = manager.find("s", "order", MatchOptions::default()).unwrap();
    let lines: Vec<usize> = matches.iter().map(|m| m.location.line).collect();
    assert_eq!(lines, vec![5, 6, 9, 10, 10]);

    let loose = manager
        .find("s", "ORDER", MatchOptions::substring().ignore_case())
        .unwrap();
    assert!(loose.iter().any(|m| m.text == "order-total"));
    assert!(loose.iter().any(|m| m.text == "app.orders"));
}

#[test]
fn test_find_next_moves_cursor() {
    let manager = SessionManager::new();
    manager.create("s", SOURCE, false).unwrap();

    let first = manager.find_next("s", "order-total", MatchOptions::default()).unwrap();
    assert_eq!(first.location.line, 5);
    let second = manager.find_next("s", "order-total", MatchOptions::default()).unwrap();
    assert_eq!(second.location.line, 10);
    assert!(matches!(
        manager.find_next("s", "missing", MatchOptions::default()),
        Err(EditorError::NoMatch(_))
    ));
}

#[test]
fn test_file_backed_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("core.clj");
    fs::write(&path, "(defn f [x] (inc x))\n").unwrap();

    let manager = SessionManager::new();
    manager.create("core", path.to_str().unwrap(), true).unwrap();
    assert_eq!(manager.info("core").unwrap().origin, Origin::File(path.clone()));

    manager.bulk_replace("core", "f", "g", MatchOptions::default()).unwrap();
    assert_eq!(manager.save("core", None).unwrap(), SaveOutcome::WrittenTo(path.clone()));
    assert_eq!(fs::read_to_string(&path).unwrap(), "(defn g [x] (inc x))\n");

    let copy = dir.path().join("copy.clj");
    assert_eq!(
        manager.save("core", Some(&copy)).unwrap(),
        SaveOutcome::WrittenTo(copy.clone())
    );
    assert_eq!(fs::read_to_string(&copy).unwrap(), "(defn g [x] (inc x))\n");
}

#[test]
fn test_missing_file_is_io_error() {
    let manager = SessionManager::new();
    let result = manager.create("s", "/definitely/not/here.clj", true);
    assert!(matches!(result, Err(EditorError::Io(_))));
    assert!(manager.is_empty());
}

#[test]
fn test_apply_json_batch() {
    let ops: Vec<Mutation> = serde_json::from_str(
        r#"[
            {"op": "goto", "path": [0, 3]},
            {"op": "thread", "style": "first"},
            {"op": "navigate", "direction": "root"},
            {"op": "bulk_replace", "query": "x", "replacement": "n"}
        ]"#,
    )
    .unwrap();

    let manager = SessionManager::new();
    manager.create("s", "(defn f [x] (str (inc x)))", false).unwrap();
    let result = manager.apply_all("s", &ops).unwrap();

    assert_eq!(result.replacements, Some(2));
    assert_eq!(manager.serialize("s").unwrap(), "(defn f [n] (-> n inc str))");

    // one batch, one undo step
    manager.undo("s").unwrap();
    assert_eq!(manager.serialize("s").unwrap(), "(defn f [x] (str (inc x)))");
}

#[test]
fn test_history_limit_from_config() {
    let manager = SessionManager::with_config(EditorConfig {
        history_limit: 1,
        ..EditorConfig::default()
    });
    manager.create("s", "(a)", false).unwrap();
    manager.goto("s", &[0, 0]).unwrap();
    manager.replace("s", "b").unwrap();
    manager.replace("s", "c").unwrap();

    manager.undo("s").unwrap();
    assert_eq!(manager.serialize("s").unwrap(), "(b)");
    assert!(matches!(manager.undo("s"), Err(EditorError::NothingToUndo)));
}

#[test]
fn test_concurrent_sessions() {
    let manager = std::sync::Arc::new(SessionManager::new());
    for i in 0..4 {
        manager
            .create(&format!("s{}", i), "(foo (foo foo))", false)
            .unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let manager = manager.clone();
            std::thread::spawn(move || {
                let id = format!("s{}", i);
                let name = format!("n{}", i);
                manager
                    .bulk_replace(&id, "foo", &name, MatchOptions::default())
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3);
    }
    for i in 0..4 {
        assert_eq!(
            manager.serialize(&format!("s{}", i)).unwrap(),
            format!("(n{0} (n{0} n{0}))", i)
        );
    }
}

#[test]
fn test_same_session_edits_are_serialized() {
    let manager = std::sync::Arc::new(SessionManager::new());
    manager.create("s", "[]", false).unwrap();
    manager.goto("s", &[0]).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = manager.clone();
            std::thread::spawn(move || {
                manager
                    .apply(
                        "s",
                        Mutation::AppendChild {
                            fragment: i.to_string(),
                        },
                    )
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let text = manager.serialize("s").unwrap();
    let tree = parse(&text).unwrap();
    let vector = tree.forms().next().unwrap();
    assert_eq!(vector.significant_children().count(), 8);
    assert_eq!(manager.info("s").unwrap().version, 9);
}
