//! Insertion-ordered table of registered notification clients.

use std::rc::Rc;

use indexmap::IndexMap;
use warden_core::{ClientToken, RegistryError};

use crate::managed::Managed;
use crate::message::Message;

/// A registered client callback.
///
/// `Fn`, not `FnMut`: dispatch may re-enter a client when a callback
/// mutates the registry outside a cache window, so clients keep any
/// state behind interior mutability.
pub(crate) type ClientFn<T> = Rc<dyn Fn(Rc<Message<T>>)>;

/// Token-keyed client table preserving registration order.
///
/// Registration allocates a fresh [`ClientToken`]; deregistration is a
/// direct lookup by token. Iteration (and therefore dispatch) follows
/// registration order among the live entries.
pub(crate) struct ClientTable<T: Managed> {
    clients: IndexMap<ClientToken, ClientFn<T>>,
}

impl<T: Managed> ClientTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            clients: IndexMap::new(),
        }
    }

    pub(crate) fn register(&mut self, client: ClientFn<T>) -> ClientToken {
        let token = ClientToken::next();
        self.clients.insert(token, client);
        token
    }

    pub(crate) fn deregister(&mut self, token: ClientToken) -> Result<(), RegistryError> {
        // shift_remove keeps the registration order of the survivors
        match self.clients.shift_remove(&token) {
            Some(_) => Ok(()),
            None => {
                tracing::warn!(%token, "deregister: unknown client token");
                Err(RegistryError::UnknownClient)
            }
        }
    }

    /// Snapshot of the dispatch list in registration order.
    ///
    /// Flush dispatches against the snapshot, so clients registered
    /// while a message is in flight are not invoked for it, and a
    /// client deregistered mid-dispatch still receives the in-flight
    /// message it was registered for when the flush began.
    pub(crate) fn snapshot(&self) -> Vec<ClientFn<T>> {
        self.clients.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.clients.len()
    }
}
