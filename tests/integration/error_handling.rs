// tests/integration/error_handling.rs

use std::io::Write;
use tempfile::NamedTempFile;
use dagmake::config::{load_and_validate, load_optional};
use dagmake::errors::PipelineError;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_scalar_context_values_are_stringified() {
    let file = config_file(
        r#"
[context]
data_dir = "data"
limit = 10
ratio = 0.5
dry = false
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    let ctx = cfg.to_context();
    assert_eq!(ctx.get("data_dir"), Some("data"));
    assert_eq!(ctx.get("limit"), Some("10"));
    assert_eq!(ctx.get("ratio"), Some("0.5"));
    assert_eq!(ctx.get("dry"), Some("false"));
}

#[test]
fn test_empty_file_gives_empty_context() {
    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();
    assert!(cfg.to_context().is_empty());
}

#[test]
fn test_invalid_key_returns_config_error() {
    let file = config_file(
        r#"
[context]
"data-dir" = "data"
"#,
    );

    match load_and_validate(file.path()) {
        Err(PipelineError::ConfigError(msg)) => {
            assert!(msg.contains("data-dir"), "{msg}");
        }
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_table_value_returns_config_error() {
    let file = config_file(
        r#"
[context]
paths = ["a", "b"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(PipelineError::ConfigError(msg)) => {
            assert!(msg.contains("paths"), "{msg}");
            assert!(msg.contains("array"), "{msg}");
        }
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_unknown_section_returns_toml_error() {
    let file = config_file(
        r#"
[tasks]
a = 1
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(PipelineError::TomlError(_))
    ));
}

#[test]
fn test_explicit_missing_config_is_an_io_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    assert!(matches!(
        load_optional(Some(missing.as_path())),
        Err(PipelineError::IoError(_))
    ));
}
