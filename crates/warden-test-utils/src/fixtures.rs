//! Reusable registry fixtures.

use std::cell::RefCell;
use std::rc::Rc;

use warden_core::{ChangeFlags, ClientToken, RegistryError};
use warden_registry::{Managed, Message, Registry};

/// Minimal managed fixture: numeric identity, string payload, no
/// change detail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    id: u32,
    label: String,
}

impl Slot {
    pub fn new(id: u32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn label(&self) -> &str {
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

/// Named scalar fixture exercising the change-detail plumbing.
///
/// `copy_content` accumulates the value shift since the last report;
/// `extract_change_detail` hands it out once, so a detail describes
/// exactly one batching window.
#[derive(Clone, Debug, PartialEq)]
pub struct Probe {
    name: String,
    value: f64,
    shift: Option<f64>,
}

impl Probe {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            shift: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Change detail reported by [`Probe`]: the net value shift across one
/// batching window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeDelta {
    pub shift: f64,
}

impl Managed for Probe {
    type Identity = String;
    type ChangeDetail = ProbeDelta;

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn copy_identifier(&mut self, identity: &String) {
        self.name.clone_from(identity);
    }

    fn copy_content(&mut self, source: &Self) {
        let shift = source.value - self.value;
        self.shift = Some(self.shift.map_or(shift, |s| s + shift));
        self.value = source.value;
    }

    fn extract_change_detail(&mut self) -> Option<ProbeDelta> {
        self.shift.take().map(|shift| ProbeDelta { shift })
    }
}

/// Client that records every dispatched message.
///
/// Cloning shares the underlying buffer, so a clone moved into the
/// registration closure feeds the copy the test keeps.
pub struct RecordingClient<T: Managed> {
    messages: Rc<RefCell<Vec<Rc<Message<T>>>>>,
}

impl<T: Managed> RecordingClient<T> {
    pub fn new() -> Self {
        Self {
            messages: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register this recorder with `registry`.
    pub fn attach(&self, registry: &Registry<T>) -> Result<ClientToken, RegistryError> {
        let sink = Rc::clone(&self.messages);
        registry.register(move |message| sink.borrow_mut().push(message))
    }

    /// Number of messages received so far.
    pub fn message_count(&self) -> usize {
        self.messages.borrow().len()
    }

    /// All received messages, oldest first.
    pub fn messages(&self) -> Vec<Rc<Message<T>>> {
        self.messages.borrow().clone()
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<Rc<Message<T>>> {
        self.messages.borrow().last().cloned()
    }

    /// The change summaries of all received messages, oldest first.
    pub fn summaries(&self) -> Vec<ChangeFlags> {
        self.messages
            .borrow()
            .iter()
            .map(|m| m.change_summary())
            .collect()
    }

    /// Forget everything received so far.
    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
    }
}

impl<T: Managed> Default for RecordingClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Managed> Clone for RecordingClient<T> {
    fn clone(&self) -> Self {
        Self {
            messages: Rc::clone(&self.messages),
        }
    }
}
