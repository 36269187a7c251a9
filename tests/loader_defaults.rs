mod common;
use crate::common::{NodeBuilder, init_tracing, write_config};

use std::error::Error;

use expconf::config::{ConfigEntry, ConfigValue, Loader, load, save};
use expconf::diagnostics::{ConfigWarning, Diagnostics};
use expconf::errors::ConfigError;
use expconf::fs::mock::MockFileSystem;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn int(i: i64) -> ConfigEntry {
    ConfigEntry::Value(ConfigValue::Int(i))
}

#[test]
fn child_inherits_and_overrides_parent() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("cfg/base.yaml", "a: 1\nb:\n  c: 2\n  d: 3\n");
    fs.add_file(
        "cfg/child.yaml",
        "__default__: ./base.yaml\nb:\n  c: 20\n",
    );

    let cfg = Loader::new(&fs).load("cfg/child.yaml")?;

    let expected = NodeBuilder::new()
        .value("a", 1)
        .node("b", NodeBuilder::new().value("c", 20).value("d", 3))
        .build();
    assert_eq!(cfg, expected);
    Ok(())
}

#[test]
fn parent_directory_defaults_are_relative_to_the_including_file() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("project/base.yaml", "lr: 0.1\n");
    fs.add_file("project/exps/deep/run.yaml", "__default__: ../../base.yaml\n");

    let cfg = Loader::new(&fs).load("project/exps/deep/run.yaml")?;

    assert_eq!(cfg.get("lr"), Some(&ConfigEntry::Value(ConfigValue::Float(0.1))));
    Ok(())
}

#[test]
fn later_defaults_win_and_the_child_wins_over_all() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("one.yaml", "x: 1\ny: 1\nz: 1\n");
    fs.add_file("two.yaml", "y: 2\nz: 2\n");
    fs.add_file(
        "child.yaml",
        "__default__: [./one.yaml, ./two.yaml]\nz: 3\n",
    );

    let cfg = Loader::new(&fs).load("child.yaml")?;

    assert_eq!(cfg.get("x"), Some(&int(1)));
    assert_eq!(cfg.get("y"), Some(&int(2)));
    assert_eq!(cfg.get("z"), Some(&int(3)));
    Ok(())
}

#[test]
fn defaults_may_add_keys_among_themselves_under_raise() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("one.yaml", "x: 1\n");
    fs.add_file("two.yaml", "y: 2\n");
    fs.add_file(
        "child.yaml",
        "__default__: [./one.yaml, ./two.yaml]\n__new_key_policy__: raise\ny: 3\n",
    );
    let mut diagnostics = Diagnostics::new();

    let cfg = Loader::new(&fs).load_with("child.yaml", &mut diagnostics)?;

    assert_eq!(cfg.get("y"), Some(&int(3)));
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn reserved_keys_are_stripped() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("base.yaml", "__new_key_policy__: pass\na: 1\n");
    fs.add_file("child.yaml", "__default__: ./base.yaml\n__new_key_policy__: warn\n");

    let cfg = Loader::new(&fs).load("child.yaml")?;

    assert!(!cfg.contains_key("__default__"));
    assert!(!cfg.contains_key("__new_key_policy__"));
    assert_eq!(cfg.get("a"), Some(&int(1)));
    Ok(())
}

#[test]
fn raise_policy_rejects_keys_absent_from_defaults() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("base.yaml", "a: 1\n");
    fs.add_file(
        "child.yaml",
        "__default__: ./base.yaml\n__new_key_policy__: raise\nb: 2\n",
    );

    match Loader::new(&fs).load("child.yaml") {
        Err(ConfigError::MergeKey { key }) => assert_eq!(key, "b"),
        other => panic!("expected MergeKey, got {other:?}"),
    }
}

#[test]
fn default_policy_warns_about_new_keys() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("base.yaml", "a: 1\n");
    fs.add_file("child.yaml", "__default__: ./base.yaml\nb: 2\n");
    let mut diagnostics = Diagnostics::new();

    let cfg = Loader::new(&fs).load_with("child.yaml", &mut diagnostics)?;

    assert_eq!(cfg.get("b"), Some(&int(2)));
    assert_eq!(
        diagnostics.warnings(),
        &[ConfigWarning::NewKeyAdded { key: "b".into() }]
    );
    Ok(())
}

#[test]
fn file_without_defaults_ignores_its_policy() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("solo.yaml", "__new_key_policy__: raise\nanything: new\n");

    let cfg = Loader::new(&fs).load("solo.yaml")?;

    assert_eq!(cfg.len(), 1);
    Ok(())
}

#[test]
fn invalid_policy_is_rejected() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("bad.yaml", "__new_key_policy__: sometimes\n");

    assert!(matches!(
        Loader::new(&fs).load("bad.yaml"),
        Err(ConfigError::InvalidPolicy(p)) if p == "sometimes"
    ));
}

#[test]
fn default_must_be_string_or_list_of_strings() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("num.yaml", "__default__: 3\n");
    fs.add_file("mixed.yaml", "__default__: [./a.yaml, 4]\n");

    for path in ["num.yaml", "mixed.yaml"] {
        assert!(
            matches!(
                Loader::new(&fs).load(path),
                Err(ConfigError::MalformedConfig { .. })
            ),
            "{path} should be rejected"
        );
    }
}

#[test]
fn inheritance_cycle_is_detected() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("a.yaml", "__default__: ./b.yaml\n");
    fs.add_file("b.yaml", "__default__: ./a.yaml\n");

    match Loader::new(&fs).load("a.yaml") {
        Err(ConfigError::CyclicDefault { path }) => assert!(path.ends_with("a.yaml")),
        other => panic!("expected CyclicDefault, got {other:?}"),
    }
}

#[test]
fn shared_ancestor_is_not_a_cycle() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("root.yaml", "r: 0\n");
    fs.add_file("left.yaml", "__default__: ./root.yaml\nl: 1\n");
    fs.add_file("right.yaml", "__default__: ./root.yaml\nq: 2\n");
    fs.add_file(
        "top.yaml",
        "__default__: [./left.yaml, ./right.yaml]\n",
    );

    let cfg = Loader::new(&fs).load("top.yaml")?;

    assert_eq!(cfg.len(), 3);
    Ok(())
}

#[test]
fn missing_default_is_not_found() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("child.yaml", "__default__: ./gone.yaml\n");

    match Loader::new(&fs).load("child.yaml") {
        Err(ConfigError::NotFound { path }) => assert!(path.ends_with("gone.yaml")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn unparsable_and_unsupported_files_are_rejected() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("broken.yaml", "a: [1, 2\n");
    fs.add_file("broken.toml", "a = \n");
    fs.add_file("dotted.yaml", "a.b: 1\n");
    fs.add_file("nulls.yaml", "a: ~\n");
    fs.add_file("nested.toml", "a = [[1], [2]]\n");
    fs.add_file("config.json", "{}");

    let loader = Loader::new(&fs);
    for path in ["broken.yaml", "broken.toml", "dotted.yaml", "nulls.yaml", "nested.toml"] {
        assert!(
            matches!(loader.load(path), Err(ConfigError::MalformedConfig { .. })),
            "{path} should be malformed"
        );
    }
    assert!(matches!(
        loader.load("config.json"),
        Err(ConfigError::UnsupportedFormat { .. })
    ));
}

#[test]
fn empty_yaml_document_is_an_empty_tree() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("empty.yaml", "");

    assert!(Loader::new(&fs).load("empty.yaml")?.is_empty());
    Ok(())
}

#[test]
fn toml_child_may_inherit_from_yaml_parent_on_disk() -> TestResult {
    init_tracing();

    let dir = TempDir::new()?;
    write_config(dir.path(), "base.yaml", "model:\n  lr: 0.1\n  depth: 18\n")?;
    let child = write_config(
        dir.path(),
        "exp/child.toml",
        "__default__ = \"../base.yaml\"\n\n[model]\ndepth = 50\n",
    )?;

    let cfg = load(&child)?;

    assert_eq!(cfg.get_path("model.depth"), Some(&int(50)));
    assert_eq!(
        cfg.get_path("model.lr"),
        Some(&ConfigEntry::Value(ConfigValue::Float(0.1)))
    );
    Ok(())
}

#[test]
fn absolute_default_path_is_used_as_is() -> TestResult {
    init_tracing();

    let dir = TempDir::new()?;
    let base = write_config(dir.path(), "somewhere/base.yaml", "a: 1\n")?;
    let child = write_config(
        dir.path(),
        "elsewhere/child.yaml",
        &format!("__default__: {}\nb: 2\n", base.display()),
    )?;

    let cfg = load(&child)?;

    assert_eq!(cfg.get("a"), Some(&int(1)));
    assert_eq!(cfg.get("b"), Some(&int(2)));
    Ok(())
}

#[test]
fn saved_config_loads_back_in_both_formats() -> TestResult {
    init_tracing();

    let dir = TempDir::new()?;
    let cfg = NodeBuilder::new()
        .value("seed", 666)
        .value("ratio", 1.0)
        .value("name", "exp-{seed}")
        .list("splits", [0.8, 0.2])
        .node(
            "model",
            NodeBuilder::new()
                .value("shuffle", true)
                .node("optim", NodeBuilder::new().value("lr", 0.01)),
        )
        .build();

    for name in ["out.yaml", "out.toml"] {
        let path = dir.path().join("saved").join(name);
        save(&cfg, &path)?;
        assert_eq!(load(&path)?, cfg, "{name} should round-trip");
    }
    Ok(())
}

#[test]
fn save_through_mock_writes_rendered_text() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    let cfg = NodeBuilder::new().value("a", 1).build();

    Loader::new(&fs).save(&cfg, "out/cfg.toml")?;

    assert_eq!(fs.contents("out/cfg.toml").as_deref(), Some("a = 1\n"));
    Ok(())
}
