//! The reference-counted [`Handle`] through which managed objects are shared.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::managed::Managed;
use crate::registry::Inner;

/// The shared cell behind a [`Handle`]: the domain value plus a
/// non-owning back-reference to the registry that currently owns it.
///
/// The back-reference is a `Weak`, so an object that outlives its
/// registry observes a dead link, never a dangling pointer. It is
/// cleared on removal and on registry drop.
pub(crate) struct ManagedCell<T: Managed> {
    pub(crate) value: RefCell<T>,
    pub(crate) registry: RefCell<Weak<RefCell<Inner<T>>>>,
}

/// Reference-counted handle to a (potentially) managed object.
///
/// A handle is cheap to clone; every clone counts as one holder for
/// the purposes of the registry's in-use guard. The registry's object
/// store keeps exactly one handle per live member, so an object with
/// no handles outside the registry can be removed, and one with any
/// extra holder cannot.
///
/// The payload is read through [`borrow`](Handle::borrow). Mutating a
/// *managed* object must go through its registry (`modify_content`,
/// `modify`, `rename`, `mark_changed`) so the change is recorded and
/// reported; [`borrow_mut`](Handle::borrow_mut) exists for unmanaged
/// objects and for registry-driven copy hooks.
pub struct Handle<T: Managed> {
    pub(crate) cell: Rc<ManagedCell<T>>,
}

impl<T: Managed> Handle<T> {
    /// Wrap a freshly constructed, unmanaged value.
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(ManagedCell {
                value: RefCell::new(value),
                registry: RefCell::new(Weak::new()),
            }),
        }
    }

    /// Immutably borrow the payload.
    ///
    /// # Panics
    ///
    /// Panics if the payload is currently mutably borrowed, e.g. from
    /// inside a copy hook operating on the same object.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.cell.value.borrow()
    }

    /// Mutably borrow the payload.
    ///
    /// For unmanaged objects only: direct mutation of a managed object
    /// bypasses change recording and the coalescing protocol. See the
    /// type-level docs.
    ///
    /// # Panics
    ///
    /// Panics if the payload is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.cell.value.borrow_mut()
    }

    /// The object's current identity.
    pub fn identity(&self) -> T::Identity {
        self.cell.value.borrow().identity()
    }

    /// Whether some registry currently owns this object.
    pub fn is_managed(&self) -> bool {
        self.cell.registry.borrow().upgrade().is_some()
    }

    /// Whether two handles refer to the same object.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.cell, &b.cell)
    }

    /// Number of live handles to this object, the registry's included.
    ///
    /// This is the count the default in-use guard compares against the
    /// registry-accounted baseline.
    pub fn ref_count(handle: &Self) -> usize {
        Rc::strong_count(&handle.cell)
    }

    /// Point the back-reference at `inner`.
    pub(crate) fn attach(&self, inner: &Rc<RefCell<Inner<T>>>) {
        *self.cell.registry.borrow_mut() = Rc::downgrade(inner);
    }

    /// Clear the back-reference.
    pub(crate) fn detach(&self) {
        *self.cell.registry.borrow_mut() = Weak::new();
    }

    /// Whether the back-reference points at exactly `inner`.
    pub(crate) fn belongs_to(&self, inner: &Rc<RefCell<Inner<T>>>) -> bool {
        self.cell
            .registry
            .borrow()
            .upgrade()
            .is_some_and(|rc| Rc::ptr_eq(&rc, inner))
    }

    /// Harvest the change detail from the payload.
    pub(crate) fn take_change_detail(&self) -> Option<T::ChangeDetail> {
        self.cell.value.borrow_mut().extract_change_detail()
    }
}

impl<T: Managed> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: Managed> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Handle");
        match self.cell.value.try_borrow() {
            Ok(value) => dbg.field("identity", &value.identity()),
            Err(_) => dbg.field("identity", &"<borrowed>"),
        };
        dbg.field("managed", &self.is_managed())
            .field("holders", &Self::ref_count(self))
            .finish()
    }
}
