//! Object lifecycle: add, remove, in-use guarding, bulk removal, and
//! registry teardown.

use warden_core::{ChangeFlags, RegistryError};
use warden_registry::{Handle, Registry};
use warden_test_utils::{RecordingClient, Slot};

#[test]
fn end_to_end_scenario() {
    let registry = Registry::new();
    let a = Handle::new(Slot::new(1, "A"));
    let b = Handle::new(Slot::new(2, "B"));
    registry.add(&a).unwrap();
    registry.add(&b).unwrap();

    let recorder = RecordingClient::new();
    recorder.attach(&registry).unwrap();

    // add id=3 succeeds, store covers {1, 2, 3}
    let c = Handle::new(Slot::new(3, "C"));
    registry.add(&c).unwrap();
    assert_eq!(registry.len().unwrap(), 3);
    for id in [1, 2, 3] {
        assert!(registry.find_by_identity(&id).unwrap().is_some());
    }

    // colliding add fails and leaves the store untouched
    let d = Handle::new(Slot::new(2, "D"));
    assert!(matches!(
        registry.add(&d),
        Err(RegistryError::AlreadyExists { .. })
    ));
    assert_eq!(registry.len().unwrap(), 3);
    let still_b = registry.find_by_identity(&2).unwrap().unwrap();
    assert!(Handle::ptr_eq(&still_b, &b));
    assert_eq!(still_b.borrow().label(), "B");
    drop(still_b);

    // two batched edits to A: exactly one flush, one entry, CONTENT
    recorder.clear();
    registry.begin_cache().unwrap();
    registry
        .modify_content(&a, &Slot::new(1, "A edit one"))
        .unwrap();
    registry
        .modify_content(&a, &Slot::new(1, "A edit two"))
        .unwrap();
    registry.end_cache().unwrap();
    assert_eq!(recorder.message_count(), 1);
    let message = recorder.last().unwrap();
    assert_eq!(message.len(), 1);
    assert_eq!(message.change_flags_for(&a), ChangeFlags::CONTENT);
    assert_eq!(a.borrow().label(), "A edit two");
    drop(message);

    // two extra holders of B block removal; releasing them unblocks it
    recorder.clear();
    let extra1 = b.clone();
    let extra2 = b.clone();
    assert!(matches!(
        registry.remove(&b),
        Err(RegistryError::InUse { .. })
    ));
    drop(extra1);
    drop(extra2);
    registry.remove(&b).unwrap();
    assert_eq!(registry.len().unwrap(), 2);
    assert!(registry.find_by_identity(&2).unwrap().is_none());
    assert!(registry.find_by_identity(&1).unwrap().is_some());
    assert!(registry.find_by_identity(&3).unwrap().is_some());
    let message = recorder.last().unwrap();
    assert_eq!(message.change_flags_for(&b), ChangeFlags::REMOVE);
}

#[test]
fn add_reports_add_flag() {
    let registry = Registry::new();
    let recorder = RecordingClient::new();
    recorder.attach(&registry).unwrap();

    let a = Handle::new(Slot::new(1, "a"));
    registry.add(&a).unwrap();
    assert_eq!(recorder.message_count(), 1);
    assert_eq!(
        recorder.last().unwrap().change_flags_for(&a),
        ChangeFlags::ADD
    );
    assert!(a.is_managed());
}

#[test]
fn cannot_add_to_two_registries() {
    let first = Registry::new();
    let second = Registry::new();
    let a = Handle::new(Slot::new(1, "a"));
    first.add(&a).unwrap();
    assert!(matches!(
        second.add(&a),
        Err(RegistryError::AlreadyManaged)
    ));
    // a second add to the owner is refused the same way
    assert!(matches!(first.add(&a), Err(RegistryError::AlreadyManaged)));
}

#[test]
fn removed_object_can_be_managed_again() {
    let first = Registry::new();
    let second = Registry::new();
    let a = Handle::new(Slot::new(1, "a"));
    first.add(&a).unwrap();
    first.remove(&a).unwrap();
    assert!(!a.is_managed());
    second.add(&a).unwrap();
    assert!(second.is_managed(&a).unwrap());
    assert!(!first.is_managed(&a).unwrap());
}

#[test]
fn remove_rejects_foreign_objects() {
    let registry = Registry::new();
    let other = Registry::new();
    let a = Handle::new(Slot::new(1, "a"));
    other.add(&a).unwrap();
    assert!(matches!(registry.remove(&a), Err(RegistryError::NotManaged)));

    let unmanaged = Handle::new(Slot::new(2, "b"));
    assert!(matches!(
        registry.remove(&unmanaged),
        Err(RegistryError::NotManaged)
    ));
}

#[test]
fn removed_object_lives_until_the_message_is_released() {
    let registry = Registry::new();
    let recorder = RecordingClient::new();
    recorder.attach(&registry).unwrap();

    let a = Handle::new(Slot::new(1, "a"));
    registry.add(&a).unwrap();
    recorder.clear();
    registry.remove(&a).unwrap();

    // ours + the entry in the retained removal message
    assert_eq!(Handle::ref_count(&a), 2);
    recorder.clear();
    assert_eq!(Handle::ref_count(&a), 1);
}

#[test]
fn not_in_use_probe_tracks_external_holders() {
    let registry = Registry::new();
    let a = Handle::new(Slot::new(1, "a"));
    registry.add(&a).unwrap();

    assert!(registry.not_in_use(&a).unwrap());
    let extra = a.clone();
    assert!(!registry.not_in_use(&a).unwrap());
    drop(extra);
    assert!(registry.not_in_use(&a).unwrap());

    let stranger = Handle::new(Slot::new(2, "b"));
    assert!(matches!(
        registry.not_in_use(&stranger),
        Err(RegistryError::NotManaged)
    ));
}

#[test]
fn remove_all_empties_the_registry_in_one_message() {
    let registry = Registry::new();
    let recorder = RecordingClient::new();
    recorder.attach(&registry).unwrap();

    registry.begin_cache().unwrap();
    for id in 0..5 {
        registry.add(&Handle::new(Slot::new(id, "s"))).unwrap();
    }
    registry.end_cache().unwrap();
    recorder.clear();

    registry.remove_all().unwrap();
    assert_eq!(registry.len().unwrap(), 0);
    assert_eq!(recorder.message_count(), 1);
    let message = recorder.last().unwrap();
    assert_eq!(message.len(), 5);
    assert_eq!(message.change_summary(), ChangeFlags::REMOVE);
}

#[test]
fn remove_all_reports_survivors() {
    let registry = Registry::new();
    let a = Handle::new(Slot::new(1, "a"));
    let b = Handle::new(Slot::new(2, "b"));
    registry.add(&a).unwrap();
    registry.add(&b).unwrap();
    drop(a); // b stays pinned by our handle

    assert_eq!(
        registry.remove_all(),
        Err(RegistryError::RemovalIncomplete { remaining: 1 })
    );
    assert_eq!(registry.len().unwrap(), 1);
    assert!(registry.is_managed(&b).unwrap());

    drop(b);
    registry.remove_all().unwrap();
    assert_eq!(registry.len().unwrap(), 0);
}

#[test]
fn dropping_the_registry_detaches_members() {
    let registry = Registry::new();
    let a = Handle::new(Slot::new(1, "a"));
    registry.add(&a).unwrap();
    assert!(a.is_managed());

    drop(registry);
    assert!(!a.is_managed());
    assert_eq!(a.borrow().label(), "a");

    // free to join another registry afterwards
    let next = Registry::new();
    next.add(&a).unwrap();
}

#[test]
fn registry_clones_share_the_store() {
    let registry = Registry::new();
    let alias = registry.clone();
    let a = Handle::new(Slot::new(1, "a"));
    registry.add(&a).unwrap();
    assert_eq!(alias.len().unwrap(), 1);
    alias.remove(&a).unwrap();
    assert_eq!(registry.len().unwrap(), 0);
}
