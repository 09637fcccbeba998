//! Integration tests for the persisted duplicate policy.

use std::fs;

use mapc::policy::{DuplicatePolicy, PolicyStore};

use crate::common::fixtures::TestCollection;

#[test]
fn test_first_run_creates_config() {
    let collection = TestCollection::new();
    let path = collection.paths.config_file();
    assert!(!path.exists());

    let (store, err) = PolicyStore::load(&path);

    assert!(err.is_none());
    assert_eq!(store.current(), DuplicatePolicy::Warn);
    assert!(path.is_file());
}

#[test]
fn test_existing_config_is_respected() {
    let collection = TestCollection::new();
    let path = collection.paths.config_file();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "duplicateBehaviour: allow\n").unwrap();

    let (store, _) = PolicyStore::load(&path);
    assert_eq!(store.current(), DuplicatePolicy::Allow);
    // Loading a valid value does not rewrite the file.
    assert_eq!(fs::read_to_string(&path).unwrap(), "duplicateBehaviour: allow\n");
}

#[test]
fn test_every_change_rewrites_whole_file() {
    let collection = TestCollection::new();
    let path = collection.paths.config_file();
    let (mut store, _) = PolicyStore::load(&path);

    for policy in [DuplicatePolicy::Deny, DuplicatePolicy::Allow, DuplicatePolicy::Warn] {
        store.set(policy).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), format!("duplicateBehaviour: {policy}"));
    }
}

#[test]
fn test_missing_key_defaults_to_warn() {
    let collection = TestCollection::new();
    let path = collection.paths.config_file();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "somethingElse: 1\n").unwrap();

    let (store, err) = PolicyStore::load(&path);
    assert!(err.is_none());
    assert_eq!(store.current(), DuplicatePolicy::Warn);
    assert!(fs::read_to_string(&path).unwrap().contains("duplicateBehaviour: warn"));
}
