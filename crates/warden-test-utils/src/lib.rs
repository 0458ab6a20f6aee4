//! Shared fixtures for Warden development and testing.
//!
//! Provides two small [`Managed`](warden_registry::Managed)
//! implementations and a message-recording client:
//!
//! - [`Slot`] — numeric identity, no change detail.
//! - [`Probe`] — string identity, reports a [`ProbeDelta`] detail.
//! - [`RecordingClient`] — captures every dispatched message for
//!   assertions.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod fixtures;

pub use fixtures::{Probe, ProbeDelta, RecordingClient, Slot};
