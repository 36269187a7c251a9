mod common;
use crate::common::{NodeBuilder, init_tracing};

use std::error::Error;

use expconf::config::{merge, merge_all};
use expconf::diagnostics::{ConfigWarning, Diagnostics};
use expconf::errors::ConfigError;
use expconf::types::NewKeyPolicy;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn pass_adds_new_keys_silently() -> TestResult {
    init_tracing();

    let base = NodeBuilder::new().value("a", 1).build();
    let overlay = NodeBuilder::new().value("b", 2).build();
    let mut diagnostics = Diagnostics::new();

    let out = merge(&base, &overlay, NewKeyPolicy::Pass, &mut diagnostics)?;

    assert_eq!(out, NodeBuilder::new().value("a", 1).value("b", 2).build());
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn warn_adds_new_keys_with_warning() -> TestResult {
    init_tracing();

    let base = NodeBuilder::new().value("a", 1).build();
    let overlay = NodeBuilder::new().value("b", 2).build();
    let mut diagnostics = Diagnostics::new();

    let out = merge(&base, &overlay, NewKeyPolicy::Warn, &mut diagnostics)?;

    assert_eq!(out, NodeBuilder::new().value("a", 1).value("b", 2).build());
    assert_eq!(
        diagnostics.warnings(),
        &[ConfigWarning::NewKeyAdded { key: "b".into() }]
    );
    Ok(())
}

#[test]
fn raise_rejects_new_keys() {
    init_tracing();

    let base = NodeBuilder::new().value("a", 1).build();
    let overlay = NodeBuilder::new().value("b", 2).build();

    match merge(&base, &overlay, NewKeyPolicy::Raise, &mut Diagnostics::new()) {
        Err(ConfigError::MergeKey { key }) => assert_eq!(key, "b"),
        other => panic!("expected MergeKey, got {other:?}"),
    }
}

#[test]
fn raise_reports_full_path_of_nested_new_key() {
    init_tracing();

    let base = NodeBuilder::new()
        .node("model", NodeBuilder::new().value("lr", 0.1))
        .build();
    let overlay = NodeBuilder::new()
        .node("model", NodeBuilder::new().value("momentum", 0.9))
        .build();

    match merge(&base, &overlay, NewKeyPolicy::Raise, &mut Diagnostics::new()) {
        Err(ConfigError::MergeKey { key }) => assert_eq!(key, "model.momentum"),
        other => panic!("expected MergeKey, got {other:?}"),
    }
}

#[test]
fn reserved_keys_are_added_even_under_raise() -> TestResult {
    init_tracing();

    let base = NodeBuilder::new().value("a", 1).build();
    let overlay = NodeBuilder::new()
        .node("__run__", NodeBuilder::new().value("__main__", "hello:main"))
        .build();
    let mut diagnostics = Diagnostics::new();

    let out = merge(&base, &overlay, NewKeyPolicy::Raise, &mut diagnostics)?;

    assert_eq!(
        out.get_path("__run__.__main__").and_then(|e| e.as_str()),
        Some("hello:main")
    );
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn type_change_replaces_value_with_warning() -> TestResult {
    init_tracing();

    let base = NodeBuilder::new().value("a", 1).build();
    let overlay = NodeBuilder::new().value("a", "one").build();
    let mut diagnostics = Diagnostics::new();

    let out = merge(&base, &overlay, NewKeyPolicy::Raise, &mut diagnostics)?;

    assert_eq!(out.get("a").and_then(|e| e.as_str()), Some("one"));
    assert_eq!(
        diagnostics.warnings(),
        &[ConfigWarning::TypeOverridden {
            key: "a".into(),
            from: "int",
            to: "string",
        }]
    );
    Ok(())
}

#[test]
fn bool_over_int_is_a_type_change() -> TestResult {
    init_tracing();

    let base = NodeBuilder::new().value("flag", 1).build();
    let overlay = NodeBuilder::new().value("flag", true).build();
    let mut diagnostics = Diagnostics::new();

    merge(&base, &overlay, NewKeyPolicy::Pass, &mut diagnostics)?;

    assert!(matches!(
        diagnostics.warnings(),
        [ConfigWarning::TypeOverridden { from: "int", to: "bool", .. }]
    ));
    Ok(())
}

#[test]
fn mapping_replaced_by_scalar_is_a_type_change() -> TestResult {
    init_tracing();

    let base = NodeBuilder::new()
        .node("opt", NodeBuilder::new().value("lr", 0.1))
        .build();
    let overlay = NodeBuilder::new().value("opt", "sgd").build();
    let mut diagnostics = Diagnostics::new();

    let out = merge(&base, &overlay, NewKeyPolicy::Pass, &mut diagnostics)?;

    assert_eq!(out.get("opt").and_then(|e| e.as_str()), Some("sgd"));
    assert_eq!(diagnostics.len(), 1);
    Ok(())
}

#[test]
fn nested_mappings_merge_recursively_without_touching_inputs() -> TestResult {
    init_tracing();

    let base = NodeBuilder::new()
        .node("a", NodeBuilder::new().value("x", 1).value("y", 2))
        .build();
    let overlay = NodeBuilder::new()
        .node("a", NodeBuilder::new().value("y", 10).value("z", 3))
        .build();
    let base_before = base.clone();
    let overlay_before = overlay.clone();
    let mut diagnostics = Diagnostics::new();

    let out = merge(&base, &overlay, NewKeyPolicy::Warn, &mut diagnostics)?;

    let expected = NodeBuilder::new()
        .node(
            "a",
            NodeBuilder::new().value("x", 1).value("y", 10).value("z", 3),
        )
        .build();
    assert_eq!(out, expected);
    assert_eq!(base, base_before);
    assert_eq!(overlay, overlay_before);
    assert_eq!(
        diagnostics.warnings(),
        &[ConfigWarning::NewKeyAdded { key: "a.z".into() }]
    );
    Ok(())
}

#[test]
fn lists_are_replaced_not_concatenated() -> TestResult {
    init_tracing();

    let base = NodeBuilder::new().list("items", [1, 2, 3]).build();
    let overlay = NodeBuilder::new().list("items", ["a"]).build();
    let mut diagnostics = Diagnostics::new();

    let out = merge(&base, &overlay, NewKeyPolicy::Raise, &mut diagnostics)?;

    assert_eq!(out, overlay);
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn merge_all_later_layers_win() -> TestResult {
    init_tracing();

    let layers = [
        NodeBuilder::new().value("a", 1).value("z", "z").build(),
        NodeBuilder::new().value("a", 2).value("b", 2.0).build(),
    ];
    let mut diagnostics = Diagnostics::new();

    let out = merge_all(&layers, NewKeyPolicy::Pass, &mut diagnostics)?;

    assert_eq!(
        out,
        NodeBuilder::new()
            .value("a", 2)
            .value("b", 2.0)
            .value("z", "z")
            .build()
    );
    Ok(())
}

#[test]
fn policy_parses_case_insensitively_and_rejects_unknown() {
    assert_eq!("RAISE".parse::<NewKeyPolicy>().ok(), Some(NewKeyPolicy::Raise));
    assert_eq!(" pass ".parse::<NewKeyPolicy>().ok(), Some(NewKeyPolicy::Pass));
    assert_eq!(NewKeyPolicy::default(), NewKeyPolicy::Warn);
    assert!(matches!(
        "nope".parse::<NewKeyPolicy>(),
        Err(ConfigError::InvalidPolicy(p)) if p == "nope"
    ));
}
