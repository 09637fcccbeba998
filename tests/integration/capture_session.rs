//! Integration tests for the capture session state machine.
//!
//! Each scenario starts from a collection that already holds a map and
//! saves the same buffer again under one of the duplicate policies.

use mapc::error::{HeldItemError, MapError};
use mapc::fingerprint::fingerprint;
use mapc::host::HostEvent;
use mapc::host::mock::MockArtifactSource;
use mapc::policy::DuplicatePolicy;
use mapc::session::{CaptureSession, CheckOutcome, ConfirmOutcome, SaveOutcome, SessionState};

use crate::common::fixtures::{TestCollection, gradient_buffer, uniform_buffer};
use crate::common::init_test_logging;

/// Collection with the gradient buffer saved once, plus a session using `policy`.
fn seeded(policy: DuplicatePolicy) -> (TestCollection, CaptureSession, MockArtifactSource) {
    init_test_logging();
    let collection = TestCollection::new();
    let mut session = collection.session(policy);
    let source = MockArtifactSource::holding(gradient_buffer(), "17", "Gradient");
    assert!(matches!(
        session.save(&source, None).unwrap(),
        SaveOutcome::Saved(_)
    ));
    assert_eq!(collection.index_lines().len(), 1);
    (collection, session, source)
}

// ===== Unique Saves =====

#[test]
fn test_unique_save_writes_raster_and_line() {
    let collection = TestCollection::new();
    let mut session = collection.session(DuplicatePolicy::Warn);
    let source = MockArtifactSource::holding(uniform_buffer(0x04), "3", "Field");

    let SaveOutcome::Saved(saved) = session.save(&source, Some("Meadow")).unwrap() else {
        panic!("expected a save");
    };

    let fp = fingerprint(&uniform_buffer(0x04));
    assert_eq!(saved.file_name, format!("map_{fp}.png"));
    assert!(saved.path.is_file());
    assert_eq!(collection.index_lines(), vec![format!("Meadow,3,{fp}")]);
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn test_held_item_failure_changes_nothing() {
    let collection = TestCollection::new();
    let mut session = collection.session(DuplicatePolicy::Allow);
    let source = MockArtifactSource::failing(HeldItemError::NotLoaded);

    let err = session.save(&source, None).unwrap_err();
    assert!(matches!(err, MapError::HeldItem(HeldItemError::NotLoaded)));
    assert!(collection.index_lines().is_empty());
    assert_eq!(session.state(), SessionState::Idle);
}

// ===== Duplicate Policies =====

#[test]
fn test_deny_aborts_without_new_line() {
    let (collection, mut session, source) = seeded(DuplicatePolicy::Deny);

    let outcome = session.save(&source, None).unwrap();

    assert!(matches!(outcome, SaveOutcome::Denied { ref existing } if existing.name == "Gradient"));
    assert_eq!(collection.index_lines().len(), 1);
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn test_warn_parks_then_confirm_appends_once() {
    let (collection, mut session, source) = seeded(DuplicatePolicy::Warn);
    let fp = fingerprint(&gradient_buffer());

    let outcome = session.save(&source, Some("Again")).unwrap();
    assert!(matches!(outcome, SaveOutcome::Pending { .. }));
    assert_eq!(session.state(), SessionState::PendingConfirmation);
    assert_eq!(session.pending().unwrap().fingerprint, fp);
    assert_eq!(collection.index_lines().len(), 1);

    let ConfirmOutcome::Saved(saved) = session.confirm().unwrap() else {
        panic!("expected the pending save to be written");
    };
    assert_eq!(saved.entry.name, "Again");
    assert_eq!(session.state(), SessionState::Idle);

    let lines = collection.index_lines();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.ends_with(&fp)));

    assert_eq!(session.confirm().unwrap(), ConfirmOutcome::NothingPending);
    assert_eq!(collection.index_lines().len(), 2);
}

#[test]
fn test_allow_saves_duplicate_immediately() {
    let (collection, mut session, source) = seeded(DuplicatePolicy::Allow);
    let fp = fingerprint(&gradient_buffer());

    assert!(matches!(
        session.save(&source, None).unwrap(),
        SaveOutcome::Saved(_)
    ));

    let lines = collection.index_lines();
    assert_eq!(lines, vec![format!("Gradient,17,{fp}"), format!("Gradient,17,{fp}")]);
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn test_confirm_uses_buffered_copy() {
    let (collection, mut session, source) = seeded(DuplicatePolicy::Warn);
    session.save(&source, None).unwrap();

    // The held map changes after the warning; confirm still writes the original.
    source.hold(uniform_buffer(0x07), "99", "Other");
    session.confirm().unwrap();

    let fp = fingerprint(&gradient_buffer());
    assert_eq!(collection.index_lines()[1], format!("Gradient,17,{fp}"));
}

// ===== Clearing =====

#[test]
fn test_new_save_clears_stale_pending() {
    let (collection, mut session, source) = seeded(DuplicatePolicy::Warn);
    session.save(&source, None).unwrap();
    assert_eq!(session.state(), SessionState::PendingConfirmation);

    source.hold(uniform_buffer(0x05), "20", "Fresh");
    assert!(matches!(
        session.save(&source, None).unwrap(),
        SaveOutcome::Saved(_)
    ));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.confirm().unwrap(), ConfirmOutcome::NothingPending);
    assert_eq!(collection.index_lines().len(), 2);
}

#[test]
fn test_second_duplicate_replaces_first_pending() {
    let (collection, mut session, source) = seeded(DuplicatePolicy::Warn);
    session.save(&source, Some("First")).unwrap();
    session.save(&source, Some("Second")).unwrap();

    assert_eq!(session.pending().unwrap().name, "Second");
    session.confirm().unwrap();
    assert_eq!(collection.index_lines().len(), 2);
    assert!(collection.index_lines()[1].starts_with("Second,"));
}

#[test]
fn test_check_clears_pending() {
    let (_collection, mut session, source) = seeded(DuplicatePolicy::Warn);
    session.save(&source, None).unwrap();

    let outcome = session.check(&source).unwrap();
    assert!(matches!(outcome, CheckOutcome::Duplicate(ref e) if e.id == "17"));
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn test_disconnect_clears_pending() {
    let (_collection, mut session, source) = seeded(DuplicatePolicy::Warn);
    session.save(&source, None).unwrap();

    session.notify(HostEvent::Disconnected);
    assert_eq!(session.state(), SessionState::Idle);
}

// ===== Check =====

#[test]
fn test_check_without_index() {
    let collection = TestCollection::new();
    let mut session = collection.session(DuplicatePolicy::Warn);
    let source = MockArtifactSource::holding(uniform_buffer(0), "1", "Blank");

    assert_eq!(session.check(&source).unwrap(), CheckOutcome::NoIndex);
}

#[test]
fn test_check_unknown_map() {
    let (collection, mut session, source) = seeded(DuplicatePolicy::Warn);
    source.hold(uniform_buffer(0x09), "2", "Unseen");

    assert_eq!(session.check(&source).unwrap(), CheckOutcome::NotInCollection);
    assert_eq!(collection.index_lines().len(), 1);
}
