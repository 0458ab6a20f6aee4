//! The [`Managed`] trait: the per-type contract for registry membership.

use std::fmt;
use std::hash::Hash;

use crate::handle::Handle;
use crate::registry::Registry;

/// Contract a domain type must satisfy to live in a [`Registry`].
///
/// The required methods cover identity access and the two copy
/// operations the registry performs internally during modify and
/// rename. The provided methods are optional hooks with no-op
/// defaults; override them when the domain type carries per-change
/// detail, depends on other managed objects, or holds structural
/// cross-references that the generic in-use check cannot see.
///
/// Implementations hold no registry state: change status and ownership
/// bookkeeping live entirely inside the registry.
pub trait Managed: Sized + 'static {
    /// Value uniquely identifying an object among the live members of
    /// one registry (a name, a numeric id, ...).
    type Identity: Clone + Eq + Hash + fmt::Debug;

    /// Optional per-object change payload carried in message entries.
    ///
    /// Use `()` when the type has nothing to report. The detail is
    /// extracted once per object when the message is built and dropped
    /// with the message.
    type ChangeDetail;

    /// The object's current identity.
    fn identity(&self) -> Self::Identity;

    /// Overwrite the identity with `identity`.
    ///
    /// Called by the registry while the object is temporarily
    /// un-indexed; after the call the object must report exactly the
    /// identity it was given, or the operation fails with a corrupted
    /// index error.
    fn copy_identifier(&mut self, identity: &Self::Identity);

    /// Overwrite every field except the identity with `source`'s.
    fn copy_content(&mut self, source: &Self);

    /// Harvest the detail describing the changes since the last report.
    ///
    /// Called once per changed or removed object while a message is
    /// being built. The default reports nothing.
    fn extract_change_detail(&mut self) -> Option<Self::ChangeDetail> {
        None
    }

    /// Hook invoked at the start of every flush, before the message is
    /// built, so objects depending on other members can mark themselves
    /// changed (via [`Registry::mark_changed`]) and be reported in the
    /// same message as the change they depend on.
    ///
    /// The default does nothing.
    fn update_dependencies(registry: &Registry<Self>) {
        let _ = registry;
    }

    /// Whether `object` may be removed from its registry.
    ///
    /// `registry_refs` is the number of strong references the registry
    /// accounts for at the call site: the object store's own reference,
    /// the handle naming the object in the removal call, and one more
    /// if the object sits in the pending-change table awaiting a flush.
    /// The default treats the object as removable exactly when no
    /// further holder exists. Types whose members reference each other
    /// (a parent holding a handle to a managed child, say) must
    /// override this to discount those internal references.
    fn not_in_use(object: &Handle<Self>, registry_refs: usize) -> bool {
        Handle::ref_count(object) == registry_refs
    }
}
