use std::fs;

use tempfile::TempDir;
use uploader_engine::{select_directory, select_file, SelectionError};

#[test]
fn directory_selection_is_recursive_sorted_and_rooted_at_dir_name() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("project");
    fs::create_dir_all(root.join("docs").join("deep")).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::write(root.join("b.png"), b"b").unwrap();
    fs::write(root.join("a.pdf"), b"aa").unwrap();
    fs::write(root.join("docs").join("deep").join("c.docx"), b"ccc").unwrap();

    let files = select_directory(&root).unwrap();

    let rel: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
    assert_eq!(
        rel,
        vec!["project/a.pdf", "project/b.png", "project/docs/deep/c.docx"]
    );
    assert_eq!(files[0].name, "a.pdf");
    assert_eq!(files[0].size, 2);
    assert_eq!(files[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(files[1].content_type.as_deref(), Some("image/png"));
    assert!(files.iter().all(|f| f.path.is_absolute()));
}

#[test]
fn empty_directory_selects_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("nothing");
    fs::create_dir_all(&root).unwrap();

    assert!(select_directory(&root).unwrap().is_empty());
}

#[test]
fn selecting_a_file_as_directory_fails() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("x.png");
    fs::write(&file, b"x").unwrap();

    let err = select_directory(&file).unwrap_err();
    assert!(matches!(err, SelectionError::NotADirectory(_)));
}

#[test]
fn missing_directory_is_an_io_error() {
    let temp = TempDir::new().unwrap();
    let err = select_directory(&temp.path().join("absent")).unwrap_err();
    assert!(matches!(err, SelectionError::Io { .. }));
}

#[test]
fn single_file_keeps_declared_type() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("holiday.jpg");
    fs::write(&path, b"data").unwrap();

    let file = select_file(&path, Some("image/png".to_string())).unwrap();
    assert_eq!(file.name, "holiday.jpg");
    assert_eq!(file.relative_path, "holiday.jpg");
    assert_eq!(file.size, 4);
    assert_eq!(file.content_type.as_deref(), Some("image/png"));

    let guessed = select_file(&path, None).unwrap();
    assert_eq!(guessed.content_type.as_deref(), Some("image/jpeg"));
}

#[test]
fn selecting_a_directory_as_file_fails() {
    let temp = TempDir::new().unwrap();
    let err = select_file(temp.path(), None).unwrap_err();
    assert!(matches!(err, SelectionError::NotAFile(_)));
}
