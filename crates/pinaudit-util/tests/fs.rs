use pinaudit_util::errors::AuditError;
use pinaudit_util::fs::{ensure_dir, find_ancestor_with, read_input};
use tempfile::TempDir;

#[test]
fn test_find_ancestor_with_nested() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("pinaudit.toml"), "").unwrap();
    let nested = tmp.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();
    let result = find_ancestor_with(&nested, "pinaudit.toml");
    assert_eq!(result, Some(tmp.path().to_path_buf()));
}

#[test]
fn test_find_ancestor_with_not_found() {
    let tmp = TempDir::new().unwrap();
    let result = find_ancestor_with(tmp.path(), "NonExistent.file");
    assert_eq!(result, None);
}

#[test]
fn test_ensure_dir_creates_nested() {
    let tmp = TempDir::new().unwrap();
    let deep = tmp.path().join("x").join("y");
    ensure_dir(&deep).unwrap();
    assert!(deep.is_dir());
    ensure_dir(&deep).unwrap();
}

#[test]
fn test_read_input_names_the_file() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("roots.txt");
    let err = read_input(&missing, "root list").unwrap_err();
    assert!(matches!(err, AuditError::Input { .. }));
    assert!(err.to_string().contains("root list"), "got: {err}");
}
