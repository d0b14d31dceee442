use super::*;

#[test]
fn test_known_digests() {
    assert_eq!(compute_checksum(""), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(compute_checksum("hello"), "5d41402abc4b2a76b9719d911017c592");
}

#[test]
fn test_whitespace_changes_checksum() {
    let a = compute_checksum("CREATE TABLE t (id UInt32) ENGINE = Memory;");
    let b = compute_checksum("CREATE TABLE t (id UInt32) ENGINE = Memory;\n");
    assert_ne!(a, b);
    assert_eq!(a.len(), 32);
}
