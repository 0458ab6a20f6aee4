//! The immutable [`Message`] dispatched to clients after a flush.

use smallvec::SmallVec;
use warden_core::ChangeFlags;

use crate::handle::Handle;
use crate::managed::Managed;

/// Record of one object's coalesced change within a message.
pub struct ObjectChange<T: Managed> {
    object: Handle<T>,
    flags: ChangeFlags,
    detail: Option<T::ChangeDetail>,
}

impl<T: Managed> ObjectChange<T> {
    pub(crate) fn new(object: Handle<T>, flags: ChangeFlags, detail: Option<T::ChangeDetail>) -> Self {
        Self {
            object,
            flags,
            detail,
        }
    }

    /// The changed object. Removed objects stay alive at least as long
    /// as the message that reports their removal.
    pub fn object(&self) -> &Handle<T> {
        &self.object
    }

    /// The OR of all change bits recorded for the object in the window.
    pub fn flags(&self) -> ChangeFlags {
        self.flags
    }

    /// The per-object change detail, if the type supplies one.
    pub fn detail(&self) -> Option<&T::ChangeDetail> {
        self.detail.as_ref()
    }
}

/// One batch of coalesced change records, built during a flush and
/// dispatched synchronously to every registered client.
///
/// Messages are immutable and shared: every client in one dispatch
/// receives the same `Rc<Message>`, and a client may retain its clone
/// past the dispatch — the message (and the removed objects it keeps
/// alive) is freed when the last holder drops it. Each entry holds a
/// real handle, so a retained message counts as an external holder of
/// every object it references and blocks their removal until released.
///
/// Entries are ordered: changed objects first, in pending order, then
/// removed objects.
pub struct Message<T: Managed> {
    entries: SmallVec<[ObjectChange<T>; 4]>,
    summary: ChangeFlags,
}

impl<T: Managed> Message<T> {
    pub(crate) fn new(entries: SmallVec<[ObjectChange<T>; 4]>, summary: ChangeFlags) -> Self {
        Self { entries, summary }
    }

    /// Bitwise OR of the change bits of every entry.
    ///
    /// Clients typically test this first and ignore messages whose
    /// summary does not intersect the changes they care about.
    pub fn change_summary(&self) -> ChangeFlags {
        self.summary
    }

    /// The change bits recorded for `object`, or the empty mask if the
    /// message carries no entry for it.
    pub fn change_flags_for(&self, object: &Handle<T>) -> ChangeFlags {
        self.entries
            .iter()
            .find(|entry| Handle::ptr_eq(&entry.object, object))
            .map_or(ChangeFlags::empty(), |entry| entry.flags)
    }

    /// Like [`change_flags_for`](Message::change_flags_for), also
    /// exposing the per-object change detail.
    pub fn change_flags_and_detail_for(
        &self,
        object: &Handle<T>,
    ) -> (ChangeFlags, Option<&T::ChangeDetail>) {
        self.entries
            .iter()
            .find(|entry| Handle::ptr_eq(&entry.object, object))
            .map_or((ChangeFlags::empty(), None), |entry| {
                (entry.flags, entry.detail.as_ref())
            })
    }

    /// All objects whose change bits intersect `mask`, in message order.
    pub fn objects_with_change_matching(&self, mask: ChangeFlags) -> Vec<Handle<T>> {
        if !self.summary.intersects(mask) {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| entry.flags.intersects(mask))
            .map(|entry| entry.object.clone())
            .collect()
    }

    /// Whether any object whose change bits intersect `mask` also
    /// satisfies `predicate`.
    pub fn any_changed_object_matches(
        &self,
        mask: ChangeFlags,
        mut predicate: impl FnMut(&Handle<T>) -> bool,
    ) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.flags.intersects(mask) && predicate(&entry.object))
    }

    /// The change records, changed objects first, removed objects last.
    pub fn entries(&self) -> &[ObjectChange<T>] {
        &self.entries
    }

    /// Number of object entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the message carries no object entries.
    ///
    /// Possible when a flush was forced by an external change with no
    /// pending object mutations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    /// Minimal managed fixture mirroring `warden_test_utils::Slot`,
    /// defined locally so these in-crate unit tests implement the
    /// `Managed` trait of the `cfg(test)` build rather than the
    /// separately-compiled copy a dev-dependency would link against.
    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Slot {
        id: u32,
        label: String,
    }

    impl Slot {
        fn new(id: u32, label: impl Into<String>) -> Self {
            Self {
                id,
                label: label.into(),
            }
        }

        fn label(&self) -> &str {
            &self.label
        }
    }

    impl Managed for Slot {
        type Identity = u32;
        type ChangeDetail = ();

        fn identity(&self) -> u32 {
            self.id
        }

        fn copy_identifier(&mut self, identity: &u32) {
            self.id = *identity;
        }

        fn copy_content(&mut self, source: &Self) {
            self.label.clone_from(&source.label);
        }
    }

    fn message(entries: Vec<(Handle<Slot>, ChangeFlags)>) -> Message<Slot> {
        let summary = entries
            .iter()
            .fold(ChangeFlags::empty(), |acc, (_, f)| acc | *f);
        let entries: SmallVec<[ObjectChange<Slot>; 4]> = entries
            .into_iter()
            .map(|(object, flags)| ObjectChange::new(object, flags, None))
            .collect();
        Message::new(entries, summary)
    }

    #[test]
    fn summary_is_union() {
        let a = Handle::new(Slot::new(1, "a"));
        let b = Handle::new(Slot::new(2, "b"));
        let msg = message(vec![
            (a, ChangeFlags::ADD),
            (b, ChangeFlags::CONTENT | ChangeFlags::IDENTIFIER),
        ]);
        assert_eq!(
            msg.change_summary(),
            ChangeFlags::ADD | ChangeFlags::CONTENT | ChangeFlags::IDENTIFIER
        );
    }

    #[test]
    fn flags_lookup_by_object() {
        let a = Handle::new(Slot::new(1, "a"));
        let b = Handle::new(Slot::new(2, "b"));
        let stranger = Handle::new(Slot::new(3, "c"));
        let msg = message(vec![
            (a.clone(), ChangeFlags::CONTENT),
            (b.clone(), ChangeFlags::REMOVE),
        ]);
        assert_eq!(msg.change_flags_for(&a), ChangeFlags::CONTENT);
        assert_eq!(msg.change_flags_for(&b), ChangeFlags::REMOVE);
        assert_eq!(msg.change_flags_for(&stranger), ChangeFlags::empty());
    }

    #[test]
    fn matching_preserves_message_order() {
        let a = Handle::new(Slot::new(1, "a"));
        let b = Handle::new(Slot::new(2, "b"));
        let c = Handle::new(Slot::new(3, "c"));
        let msg = message(vec![
            (a.clone(), ChangeFlags::CONTENT),
            (b, ChangeFlags::ADD),
            (c.clone(), ChangeFlags::CONTENT | ChangeFlags::IDENTIFIER),
        ]);
        let matched = msg.objects_with_change_matching(ChangeFlags::CONTENT);
        assert_eq!(matched.len(), 2);
        assert!(Handle::ptr_eq(&matched[0], &a));
        assert!(Handle::ptr_eq(&matched[1], &c));
    }

    #[test]
    fn matching_short_circuits_on_summary() {
        let a = Handle::new(Slot::new(1, "a"));
        let msg = message(vec![(a, ChangeFlags::CONTENT)]);
        assert!(msg.objects_with_change_matching(ChangeFlags::REMOVE).is_empty());
    }

    #[test]
    fn any_matches_applies_mask_and_predicate() {
        let a = Handle::new(Slot::new(1, "target"));
        let b = Handle::new(Slot::new(2, "other"));
        let msg = message(vec![
            (a, ChangeFlags::CONTENT),
            (b, ChangeFlags::REMOVE),
        ]);
        assert!(msg.any_changed_object_matches(ChangeFlags::CONTENT, |h| {
            h.borrow().label() == "target"
        }));
        assert!(!msg.any_changed_object_matches(ChangeFlags::REMOVE, |h| {
            h.borrow().label() == "target"
        }));
    }

    #[test]
    fn empty_message() {
        let msg: Message<Slot> = Message::new(smallvec![], ChangeFlags::empty());
        assert!(msg.is_empty());
        assert_eq!(msg.len(), 0);
        assert_eq!(msg.change_summary(), ChangeFlags::empty());
    }
}
