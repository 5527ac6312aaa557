use super::*;
use std::fs;

#[test]
fn known_digest_of_empty_input() {
    assert_eq!(
        compute_checksum(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn digest_is_lowercase_hex_of_256_bits() {
    let sum = compute_checksum(b"CREATE TABLE t (id INTEGER);");
    assert_eq!(sum.len(), 64);
    assert!(sum
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

#[test]
fn identical_content_gives_identical_digest() {
    let a = compute_checksum(b"SELECT 1;");
    let b = compute_checksum(b"SELECT 1;");
    assert_eq!(a, b);
}

#[test]
fn different_content_gives_different_digest() {
    let a = compute_checksum(b"SELECT 1;");
    let b = compute_checksum(b"SELECT 2;");
    let c = compute_checksum(b"SELECT 1; ");
    assert_ne!(a, b);
    assert_ne!(a, c);
}

#[test]
fn file_digest_matches_in_memory_digest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("m.up.sql");
    let content = "CREATE TABLE events (id BIGINT);\nINSERT INTO events VALUES (1);\n";
    fs::write(&path, content).unwrap();

    assert_eq!(
        checksum_file(&path).unwrap(),
        compute_checksum(content.as_bytes())
    );
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.up.sql");
    match checksum_file(&path) {
        Err(CoreError::IoWithPath { path: p, source }) => {
            assert!(p.ends_with("absent.up.sql"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected IoWithPath, got {other:?}"),
    }
}
