//! Integration tests for the append-only index file.

use std::fs;

use mapc::index::{ArtifactIndex, IndexEntry};

use crate::common::fixtures::TestCollection;

const FP: &str = "abc0000000000000000000000000000000000000000000000000000000000def";

#[test]
fn test_append_then_contains() {
    let collection = TestCollection::new();
    let index = ArtifactIndex::new(collection.paths.index_file());

    index.append(&IndexEntry::new("My Art", "42", FP)).unwrap();

    assert_eq!(
        index.contains(FP).unwrap(),
        Some(IndexEntry::new("My Art", "42", FP))
    );
    assert_eq!(index.contains("never-appended").unwrap(), None);
}

#[test]
fn test_append_never_rewrites() {
    let collection = TestCollection::new();
    let index = ArtifactIndex::new(collection.paths.index_file());
    fs::create_dir_all(collection.paths.collection_dir()).unwrap();
    fs::write(collection.paths.index_file(), "Old,1,aaa\n").unwrap();

    index.append(&IndexEntry::new("New", "2", "bbb")).unwrap();

    assert_eq!(collection.index_lines(), vec!["Old,1,aaa", "New,2,bbb"]);
}

#[test]
fn test_comma_names_are_stripped() {
    let collection = TestCollection::new();
    let index = ArtifactIndex::new(collection.paths.index_file());

    index.append(&IndexEntry::new("a,b,c", "7", FP)).unwrap();

    assert_eq!(collection.index_lines(), vec![format!("abc,7,{FP}")]);
    assert_eq!(index.contains(FP).unwrap().unwrap().name, "abc");
}

#[test]
fn test_crlf_lines_are_read() {
    let collection = TestCollection::new();
    fs::create_dir_all(collection.paths.collection_dir()).unwrap();
    fs::write(collection.paths.index_file(), "Win,3,ccc\r\n").unwrap();

    let index = ArtifactIndex::new(collection.paths.index_file());
    assert_eq!(index.contains("ccc").unwrap().unwrap().name, "Win");
}
