use protosync_fs::{StagingArea, TreeFilter, copy_filtered, io, list_files};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("test.txt");
    fs::write(&file_path, "original").unwrap();

    io::write_atomic(&file_path, b"updated").unwrap();

    let content = fs::read_to_string(&file_path).unwrap();
    assert_eq!(content, "updated");
}

#[test]
fn test_read_text_nonexistent_file() {
    let result = io::read_text(std::path::Path::new("/nonexistent/file.txt"));
    assert!(result.is_err());
}

#[test]
fn test_copy_file_creates_parents() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.proto");
    fs::write(&src, "syntax = \"proto3\";\n").unwrap();

    let dst = temp.path().join("deep/nested/dst.proto");
    io::copy_file(&src, &dst).unwrap();

    assert_eq!(fs::read_to_string(dst).unwrap(), "syntax = \"proto3\";\n");
}

#[test]
fn test_staging_current_copy_round_trip() {
    let api = TempDir::new().unwrap();
    fs::create_dir_all(api.path().join("envoy/foo/v3")).unwrap();
    fs::write(api.path().join("envoy/foo/v3/foo.proto"), "foo").unwrap();
    fs::write(api.path().join("envoy/foo/v3/BUILD"), "build").unwrap();

    let area = StagingArea::new().unwrap();
    let filter = TreeFilter {
        roots: vec!["envoy".into()],
        ..TreeFilter::default()
    };
    copy_filtered(api.path(), &area.current(), &filter).unwrap();

    assert_eq!(
        list_files(&area.current()).unwrap(),
        list_files(api.path()).unwrap()
    );
    assert!(list_files(&area.proposed()).unwrap().is_empty());
}
