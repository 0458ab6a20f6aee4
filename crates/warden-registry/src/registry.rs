//! The [`Registry`] itself: object store, batching cache, and flush.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use smallvec::SmallVec;
use warden_core::{ChangeFlags, ClientToken, RegistryError};

use crate::clients::{ClientFn, ClientTable};
use crate::handle::Handle;
use crate::managed::Managed;
use crate::message::{Message, ObjectChange};

/// An object with unreported changes, held alive until the next flush.
struct PendingChange<T: Managed> {
    object: Handle<T>,
    flags: ChangeFlags,
}

/// An object removed since the last flush, held alive so the message
/// that reports the removal can still reference it.
struct PendingRemoval<T: Managed> {
    object: Handle<T>,
}

/// Registry state shared by every [`Registry`] clone.
///
/// `objects` is the sole owner of the live members: one handle per
/// object, keyed and unique by identity, in insertion order. `changed`
/// and `removed` are the transient side tables feeding the next flush;
/// change bits live here, never inside the domain type.
pub(crate) struct Inner<T: Managed> {
    objects: IndexMap<T::Identity, Handle<T>>,
    changed: IndexMap<T::Identity, PendingChange<T>>,
    removed: SmallVec<[PendingRemoval<T>; 4]>,
    clients: ClientTable<T>,
    cache_depth: u32,
    external_change: bool,
}

impl<T: Managed> Inner<T> {
    fn new() -> Self {
        Self {
            objects: IndexMap::new(),
            changed: IndexMap::new(),
            removed: SmallVec::new(),
            clients: ClientTable::new(),
            cache_depth: 0,
            external_change: false,
        }
    }

    /// Record `flags` against the object's pending entry, creating one
    /// if needed. Changes recorded on top of an uncommitted add stay a
    /// plain add: the observer has not seen the object yet, so the one
    /// entry it eventually gets already covers everything.
    fn record_change(&mut self, object: &Handle<T>, flags: ChangeFlags) {
        match self.changed.entry(object.identity()) {
            Entry::Occupied(mut occupied) => {
                let pending = occupied.get_mut();
                if !pending.flags.contains(ChangeFlags::ADD) {
                    pending.flags |= flags;
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(PendingChange {
                    object: object.clone(),
                    flags,
                });
            }
        }
    }

    /// Move `object` from `old_identity` to `new_identity` in every
    /// identity-keyed table, applying `apply` while the object is
    /// temporarily un-indexed. No lookup can observe the object under a
    /// stale or half-updated identity: it is either fully indexed under
    /// the old identity, fully indexed under the new one, or absent.
    fn reindex(
        &mut self,
        object: &Handle<T>,
        old_identity: &T::Identity,
        new_identity: &T::Identity,
        apply: impl FnOnce(&mut T),
    ) -> Result<(), RegistryError> {
        let Some(entry) = self.objects.shift_remove(old_identity) else {
            tracing::error!(
                identity = ?old_identity,
                "reindex: object missing from the identity index"
            );
            return Err(RegistryError::Corrupted {
                reason: format!("object with identity {old_identity:?} is not indexed"),
            });
        };
        let pending = self.changed.shift_remove(old_identity);

        let applied = match object.cell.value.try_borrow_mut() {
            Ok(mut value) => {
                apply(&mut value);
                true
            }
            Err(_) => false,
        };
        if !applied {
            self.objects.insert(old_identity.clone(), entry);
            if let Some(p) = pending {
                self.changed.insert(old_identity.clone(), p);
            }
            tracing::warn!(identity = ?old_identity, "reindex: object payload is borrowed");
            return Err(RegistryError::Locked);
        }

        let reported = object.identity();
        if reported != *new_identity {
            // Restore the old index entry so no object is lost; the
            // store now maps an identity the object no longer reports.
            self.objects.insert(old_identity.clone(), entry);
            if let Some(p) = pending {
                self.changed.insert(old_identity.clone(), p);
            }
            tracing::error!(
                requested = ?new_identity,
                reported = ?reported,
                "reindex failed: copy hook left the object under an unexpected identity"
            );
            return Err(RegistryError::Corrupted {
                reason: format!(
                    "object reports identity {reported:?} after a change to {new_identity:?}"
                ),
            });
        }

        self.objects.insert(new_identity.clone(), entry);
        if let Some(p) = pending {
            self.changed.insert(new_identity.clone(), p);
        }
        Ok(())
    }
}

impl<T: Managed> Drop for Inner<T> {
    fn drop(&mut self) {
        if self.cache_depth != 0 {
            tracing::warn!(
                depth = self.cache_depth,
                pending = self.changed.len() + self.removed.len(),
                "registry dropped while a batching cache is still open"
            );
        }
        // Members may outlive the registry; leave them detached.
        for handle in self.objects.values() {
            handle.detach();
        }
    }
}

/// Typed, identity-indexed registry of shared domain objects with
/// batched, coalesced change notification.
///
/// A `Registry` hands out [`Handle`]s to its members and accumulates
/// change bits across mutations. Whenever the batching cache is not
/// open, it builds one immutable [`Message`] and dispatches it
/// synchronously to every registered client in registration order.
/// Wrapping several mutations in [`begin_cache`](Registry::begin_cache)
/// / [`end_cache`](Registry::end_cache) coalesces them into a single
/// message; nesting extends the window.
///
/// Cloning a `Registry` clones a cheap shared reference to the same
/// underlying store, in the manner of `Rc`. The registry is inherently
/// single-threaded; wrap it in an external lock (and a thread-safe
/// host) if that ever has to change.
pub struct Registry<T: Managed> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T: Managed> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::new())),
        }
    }

    /// Acquire the store for mutation, or report `Locked`.
    fn lock_mut(&self) -> Result<RefMut<'_, Inner<T>>, RegistryError> {
        self.inner.try_borrow_mut().map_err(|_| {
            tracing::warn!("registry is locked by a re-entrant operation");
            RegistryError::Locked
        })
    }

    /// Acquire the store for reading, or report `Locked`.
    fn lock_ref(&self) -> Result<Ref<'_, Inner<T>>, RegistryError> {
        self.inner.try_borrow().map_err(|_| {
            tracing::warn!("registry is locked by a mutation in progress");
            RegistryError::Locked
        })
    }

    /// Add an object to the registry.
    ///
    /// The registry takes shared ownership (the caller's handle stays
    /// valid and counts as an external holder). The addition is
    /// reported as [`ChangeFlags::ADD`], immediately unless a cache
    /// window is open.
    ///
    /// # Errors
    ///
    /// [`AlreadyManaged`](RegistryError::AlreadyManaged) if the object
    /// is already owned by a registry,
    /// [`AlreadyExists`](RegistryError::AlreadyExists) if the identity
    /// collides with a live member, or
    /// [`Locked`](RegistryError::Locked).
    pub fn add(&self, object: &Handle<T>) -> Result<(), RegistryError> {
        {
            let mut inner = self.lock_mut()?;
            if object.is_managed() {
                tracing::warn!("add rejected: object is already owned by a registry");
                return Err(RegistryError::AlreadyManaged);
            }
            let identity = object.identity();
            if inner.objects.contains_key(&identity) {
                tracing::warn!(identity = ?identity, "add rejected: identity already present");
                return Err(RegistryError::AlreadyExists {
                    identity: format!("{identity:?}"),
                });
            }
            inner.objects.insert(identity.clone(), object.clone());
            object.attach(&self.inner);
            inner.changed.insert(
                identity,
                PendingChange {
                    object: object.clone(),
                    flags: ChangeFlags::ADD,
                },
            );
        }
        self.flush_if_idle();
        Ok(())
    }

    /// Remove an object from the registry.
    ///
    /// Succeeds only while the object is not in use (see
    /// [`Managed::not_in_use`]; the handle passed here accounts for one
    /// reference). On success the object's back-reference is cleared
    /// and the removal is reported as [`ChangeFlags::REMOVE`] — unless
    /// the object was added inside the still-open cache window, in
    /// which case it vanishes unreported: no observer ever saw it.
    ///
    /// # Errors
    ///
    /// [`NotManaged`](RegistryError::NotManaged),
    /// [`InUse`](RegistryError::InUse), or
    /// [`Locked`](RegistryError::Locked).
    pub fn remove(&self, object: &Handle<T>) -> Result<(), RegistryError> {
        {
            let mut inner = self.lock_mut()?;
            if !object.belongs_to(&self.inner) {
                tracing::warn!("remove rejected: object is not in this registry");
                return Err(RegistryError::NotManaged);
            }
            let identity = object.identity();
            let baseline = 2 + usize::from(inner.changed.contains_key(&identity));
            if !T::not_in_use(object, baseline) {
                tracing::warn!(
                    identity = ?identity,
                    holders = Handle::ref_count(object),
                    "remove rejected: object is in use"
                );
                return Err(RegistryError::InUse {
                    identity: format!("{identity:?}"),
                });
            }
            object.detach();
            let pending = inner.changed.shift_remove(&identity);
            let uncommitted_add = pending
                .as_ref()
                .is_some_and(|p| p.flags.contains(ChangeFlags::ADD));
            if !uncommitted_add {
                inner.removed.push(PendingRemoval {
                    object: object.clone(),
                });
            }
            inner.objects.shift_remove(&identity);
        }
        self.flush_if_idle();
        Ok(())
    }

    /// Remove every object not currently in use, inside one cache
    /// window, then report whether the registry is empty.
    ///
    /// # Errors
    ///
    /// [`RemovalIncomplete`](RegistryError::RemovalIncomplete) with the
    /// count of surviving objects if any removal was blocked; there is
    /// no partial silent success. [`Locked`](RegistryError::Locked) if
    /// the registry cannot be mutated at all.
    pub fn remove_all(&self) -> Result<(), RegistryError> {
        self.begin_cache()?;
        let mut result = loop {
            let candidate = match self.lock_ref() {
                Ok(inner) => inner.objects.values().find_map(|handle| {
                    let probe = handle.clone();
                    let baseline = 2 + usize::from(inner.changed.contains_key(&probe.identity()));
                    T::not_in_use(&probe, baseline).then_some(probe)
                }),
                Err(err) => break Err(err),
            };
            match candidate {
                Some(handle) => {
                    if let Err(err) = self.remove(&handle) {
                        break Err(err);
                    }
                }
                None => break Ok(()),
            }
        };
        if result.is_ok() {
            let remaining = self.inner.borrow().objects.len();
            if remaining > 0 {
                tracing::error!(remaining, "remove_all: objects left in use");
                result = Err(RegistryError::RemovalIncomplete { remaining });
            }
        }
        let ended = self.end_cache();
        result.and(ended)
    }

    /// Copy `source`'s content *and* identity onto a managed object.
    ///
    /// When the identities differ this runs the full identifier-change
    /// protocol (un-index, copy, re-index) and reports
    /// `CONTENT | IDENTIFIER`; when they match it degenerates to
    /// [`modify_content`](Registry::modify_content).
    ///
    /// # Errors
    ///
    /// [`NotManaged`](RegistryError::NotManaged),
    /// [`AlreadyExists`](RegistryError::AlreadyExists) if `source`'s
    /// identity names a different live member,
    /// [`Locked`](RegistryError::Locked), or
    /// [`Corrupted`](RegistryError::Corrupted) if re-indexing fails.
    pub fn modify(&self, object: &Handle<T>, source: &T) -> Result<(), RegistryError> {
        {
            let mut inner = self.lock_mut()?;
            if !object.belongs_to(&self.inner) {
                tracing::warn!("modify rejected: object is not in this registry");
                return Err(RegistryError::NotManaged);
            }
            let old_identity = object.identity();
            let new_identity = source.identity();
            if new_identity == old_identity {
                let mut value = object.cell.value.try_borrow_mut().map_err(|_| {
                    tracing::warn!(identity = ?old_identity, "modify rejected: payload is borrowed");
                    RegistryError::Locked
                })?;
                value.copy_content(source);
                drop(value);
                inner.record_change(object, ChangeFlags::CONTENT);
            } else {
                if inner.objects.contains_key(&new_identity) {
                    tracing::warn!(
                        identity = ?new_identity,
                        "modify rejected: source identity already in use"
                    );
                    return Err(RegistryError::AlreadyExists {
                        identity: format!("{new_identity:?}"),
                    });
                }
                inner.reindex(object, &old_identity, &new_identity, |value| {
                    value.copy_content(source);
                    value.copy_identifier(&new_identity);
                })?;
                inner.record_change(object, ChangeFlags::CONTENT | ChangeFlags::IDENTIFIER);
            }
        }
        self.flush_if_idle();
        Ok(())
    }

    /// Copy `source`'s content (identity excluded) onto a managed
    /// object and report it as [`ChangeFlags::CONTENT`].
    ///
    /// # Errors
    ///
    /// [`NotManaged`](RegistryError::NotManaged) or
    /// [`Locked`](RegistryError::Locked).
    pub fn modify_content(&self, object: &Handle<T>, source: &T) -> Result<(), RegistryError> {
        {
            let mut inner = self.lock_mut()?;
            if !object.belongs_to(&self.inner) {
                tracing::warn!("modify_content rejected: object is not in this registry");
                return Err(RegistryError::NotManaged);
            }
            let mut value = object.cell.value.try_borrow_mut().map_err(|_| {
                tracing::warn!("modify_content rejected: payload is borrowed");
                RegistryError::Locked
            })?;
            value.copy_content(source);
            drop(value);
            inner.record_change(object, ChangeFlags::CONTENT);
        }
        self.flush_if_idle();
        Ok(())
    }

    /// Change a managed object's identity.
    ///
    /// Renaming to the current identity is an idempotent no-op: no
    /// store mutation, no message. Otherwise the object is removed from
    /// every identity-keyed table, mutated via
    /// [`Managed::copy_identifier`], re-inserted under the new
    /// identity, and only then reported as
    /// [`ChangeFlags::IDENTIFIER`]. No lookup, however re-entrant, can
    /// observe it under a stale or half-updated identity.
    ///
    /// # Errors
    ///
    /// [`NotManaged`](RegistryError::NotManaged),
    /// [`AlreadyExists`](RegistryError::AlreadyExists) if the identity
    /// names a different live member,
    /// [`Locked`](RegistryError::Locked), or
    /// [`Corrupted`](RegistryError::Corrupted) if the copy hook left
    /// the object reporting some other identity — non-recoverable for
    /// this registry; see the error's documentation.
    pub fn rename(&self, object: &Handle<T>, new_identity: T::Identity) -> Result<(), RegistryError> {
        {
            let mut inner = self.lock_mut()?;
            if !object.belongs_to(&self.inner) {
                tracing::warn!("rename rejected: object is not in this registry");
                return Err(RegistryError::NotManaged);
            }
            let old_identity = object.identity();
            if new_identity == old_identity {
                return Ok(());
            }
            if inner.objects.contains_key(&new_identity) {
                tracing::warn!(identity = ?new_identity, "rename rejected: identity already in use");
                return Err(RegistryError::AlreadyExists {
                    identity: format!("{new_identity:?}"),
                });
            }
            inner.reindex(object, &old_identity, &new_identity, |value| {
                value.copy_identifier(&new_identity);
            })?;
            inner.record_change(object, ChangeFlags::IDENTIFIER);
        }
        self.flush_if_idle();
        Ok(())
    }

    /// Record change bits for an object mutated in place.
    ///
    /// This is the reporting path for domain code that edits a member
    /// directly (and for [`Managed::update_dependencies`] hooks).
    /// Callers pass bits from [`ChangeFlags::RECORDABLE`]; add/remove
    /// bits are recorded by the registry itself. Recording empty flags
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// [`NotManaged`](RegistryError::NotManaged) or
    /// [`Locked`](RegistryError::Locked).
    pub fn mark_changed(&self, object: &Handle<T>, flags: ChangeFlags) -> Result<(), RegistryError> {
        if flags.is_empty() {
            return Ok(());
        }
        {
            let mut inner = self.lock_mut()?;
            if !object.belongs_to(&self.inner) {
                tracing::warn!("mark_changed rejected: object is not in this registry");
                return Err(RegistryError::NotManaged);
            }
            inner.record_change(object, flags);
        }
        self.flush_if_idle();
        Ok(())
    }

    /// Flag a change that happened outside any managed object, forcing
    /// the next flush to dispatch a message even if no object entries
    /// are pending.
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn notify_external_change(&self) -> Result<(), RegistryError> {
        {
            let mut inner = self.lock_mut()?;
            inner.external_change = true;
        }
        self.flush_if_idle();
        Ok(())
    }

    /// Look up a member by identity.
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn find_by_identity(
        &self,
        identity: &T::Identity,
    ) -> Result<Option<Handle<T>>, RegistryError> {
        let inner = self.lock_ref()?;
        Ok(inner.objects.get(identity).cloned())
    }

    /// Whether `object` is a member of this registry.
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn is_managed(&self, object: &Handle<T>) -> Result<bool, RegistryError> {
        let _inner = self.lock_ref()?;
        Ok(object.belongs_to(&self.inner))
    }

    /// Number of live members.
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn len(&self) -> Result<usize, RegistryError> {
        let inner = self.lock_ref()?;
        Ok(inner.objects.len())
    }

    /// Whether the registry has no members.
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        let inner = self.lock_ref()?;
        Ok(inner.objects.is_empty())
    }

    /// Visit every member in store order.
    ///
    /// The store is read-locked for the duration of the walk:
    /// structural mutation from inside the visitor fails `Locked`.
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn for_each(&self, mut visit: impl FnMut(&Handle<T>)) -> Result<(), RegistryError> {
        let inner = self.lock_ref()?;
        for handle in inner.objects.values() {
            visit(handle);
        }
        Ok(())
    }

    /// First member satisfying `predicate`, in store order.
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn first_matching(
        &self,
        mut predicate: impl FnMut(&Handle<T>) -> bool,
    ) -> Result<Option<Handle<T>>, RegistryError> {
        let inner = self.lock_ref()?;
        Ok(inner.objects.values().find(|h| predicate(h)).cloned())
    }

    /// Whether `object` could be removed right now.
    ///
    /// Same predicate as [`remove`](Registry::remove); the handle
    /// passed here accounts for one reference.
    ///
    /// # Errors
    ///
    /// [`NotManaged`](RegistryError::NotManaged) or
    /// [`Locked`](RegistryError::Locked).
    pub fn not_in_use(&self, object: &Handle<T>) -> Result<bool, RegistryError> {
        let inner = self.lock_ref()?;
        if !object.belongs_to(&self.inner) {
            tracing::warn!("not_in_use: object is not in this registry");
            return Err(RegistryError::NotManaged);
        }
        let baseline = 2 + usize::from(inner.changed.contains_key(&object.identity()));
        Ok(T::not_in_use(object, baseline))
    }

    /// Register a notification client; returns its deregistration
    /// token. Clients are dispatched in registration order.
    ///
    /// The callback is `Fn`: dispatch may re-enter it if some client
    /// mutates the registry outside a cache window, so keep mutable
    /// state behind a `Cell`/`RefCell`.
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn register(
        &self,
        client: impl Fn(Rc<Message<T>>) + 'static,
    ) -> Result<ClientToken, RegistryError> {
        let mut inner = self.lock_mut()?;
        Ok(inner.clients.register(Rc::new(client)))
    }

    /// Remove a previously registered client.
    ///
    /// # Errors
    ///
    /// [`UnknownClient`](RegistryError::UnknownClient) if the token
    /// does not match a live registration, or
    /// [`Locked`](RegistryError::Locked).
    pub fn deregister(&self, token: ClientToken) -> Result<(), RegistryError> {
        let mut inner = self.lock_mut()?;
        inner.clients.deregister(token)
    }

    /// Number of registered clients.
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn client_count(&self) -> Result<usize, RegistryError> {
        let inner = self.lock_ref()?;
        Ok(inner.clients.len())
    }

    /// Open (or deepen) the batching window. Every `begin_cache` needs
    /// a matching [`end_cache`](Registry::end_cache); no message is
    /// dispatched while the window is open.
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn begin_cache(&self) -> Result<(), RegistryError> {
        let mut inner = self.lock_mut()?;
        inner.cache_depth += 1;
        Ok(())
    }

    /// Unwind one level of the batching window; at depth zero, flush
    /// the accumulated changes as a single message.
    ///
    /// # Errors
    ///
    /// [`NotCaching`](RegistryError::NotCaching) if no window is open,
    /// or [`Locked`](RegistryError::Locked).
    pub fn end_cache(&self) -> Result<(), RegistryError> {
        {
            let mut inner = self.lock_mut()?;
            if inner.cache_depth == 0 {
                tracing::warn!("end_cache called while caching is not enabled");
                return Err(RegistryError::NotCaching);
            }
            inner.cache_depth -= 1;
            if inner.cache_depth > 0 {
                return Ok(());
            }
        }
        self.flush();
        Ok(())
    }

    /// RAII wrapper pairing [`begin_cache`](Registry::begin_cache) with
    /// [`end_cache`](Registry::end_cache).
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn cache_scope(&self) -> Result<CacheGuard<T>, RegistryError> {
        self.begin_cache()?;
        Ok(CacheGuard {
            registry: self.clone(),
            done: false,
        })
    }

    /// Whether a batching window is currently open.
    pub fn is_caching(&self) -> bool {
        self.inner
            .try_borrow()
            .is_ok_and(|inner| inner.cache_depth > 0)
    }

    /// Flush immediately unless a cache window is open.
    fn flush_if_idle(&self) {
        if self.inner.borrow().cache_depth == 0 {
            self.flush();
        }
    }

    /// Build one message from the pending side tables and dispatch it.
    ///
    /// Does nothing when there is nothing to report. Clients run with
    /// the store unlocked, so they may query the registry, mutate it
    /// (triggering a nested flush over the then-pending state), or
    /// open a new cache window.
    fn flush(&self) {
        {
            let inner = self.inner.borrow();
            if inner.changed.is_empty() && inner.removed.is_empty() && !inner.external_change {
                return;
            }
        }
        // Dependency pass: dependent objects mark themselves changed so
        // they are reported in the same message as their sources. The
        // hook records through the public API, so the cache is held
        // open for its duration to keep those recordings from
        // re-entering the flush.
        self.inner.borrow_mut().cache_depth += 1;
        T::update_dependencies(self);
        self.inner.borrow_mut().cache_depth -= 1;

        let (message, clients): (Rc<Message<T>>, Vec<ClientFn<T>>) = {
            let mut inner = self.inner.borrow_mut();
            inner.external_change = false;
            let changed: Vec<PendingChange<T>> =
                inner.changed.drain(..).map(|(_, pending)| pending).collect();
            let removed = std::mem::take(&mut inner.removed);

            let mut entries: SmallVec<[ObjectChange<T>; 4]> = SmallVec::new();
            let mut summary = ChangeFlags::empty();
            for pending in changed {
                let detail = pending.object.take_change_detail();
                summary |= pending.flags;
                entries.push(ObjectChange::new(pending.object, pending.flags, detail));
            }
            for removal in removed {
                let detail = removal.object.take_change_detail();
                summary |= ChangeFlags::REMOVE;
                entries.push(ObjectChange::new(
                    removal.object,
                    ChangeFlags::REMOVE,
                    detail,
                ));
            }
            (
                Rc::new(Message::new(entries, summary)),
                inner.clients.snapshot(),
            )
        };

        tracing::debug!(
            entries = message.len(),
            summary = ?message.change_summary(),
            clients = clients.len(),
            "dispatching change message"
        );
        for client in clients {
            client(Rc::clone(&message));
        }
    }
}

impl<T: Managed> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Managed> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Drop guard returned by [`Registry::cache_scope`].
///
/// Calls `end_cache` when dropped; use
/// [`finish`](CacheGuard::finish) to observe the result instead.
pub struct CacheGuard<T: Managed> {
    registry: Registry<T>,
    done: bool,
}

impl<T: Managed> CacheGuard<T> {
    /// Close the window now, reporting any `end_cache` failure.
    ///
    /// # Errors
    ///
    /// [`Locked`](RegistryError::Locked).
    pub fn finish(mut self) -> Result<(), RegistryError> {
        self.done = true;
        self.registry.end_cache()
    }
}

impl<T: Managed> Drop for CacheGuard<T> {
    fn drop(&mut self) {
        if !self.done {
            if let Err(err) = self.registry.end_cache() {
                tracing::warn!(%err, "end_cache failed while dropping a cache guard");
            }
        }
    }
}
