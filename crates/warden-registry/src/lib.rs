//! Identity-indexed registry with batched, coalesced change notification.
//!
//! A [`Registry`] owns a set of domain objects, unique by identity, and
//! reports every mutation to registered clients as an immutable
//! [`Message`]: one entry per changed object with OR-ed [change
//! bits](warden_core::ChangeFlags), built when the batching cache
//! unwinds to depth zero and dispatched synchronously in registration
//! order.
//!
//! Domain types opt in by implementing the [`Managed`] trait; they hold
//! no registry bookkeeping themselves. Change state lives in
//! registry-local side tables and shared ownership is expressed through
//! the reference-counted [`Handle`] type, whose back-reference to the
//! owning registry is a non-owning weak link.
//!
//! The registry is single-threaded by construction. All operations run
//! on the caller's thread, client dispatch is a plain synchronous call,
//! and re-entrant structural mutation (from a `for_each` visitor or a
//! copy hook) is refused with `Locked` rather than left undefined.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod clients;
pub mod handle;
pub mod managed;
pub mod message;
pub mod registry;

pub use handle::Handle;
pub use managed::Managed;
pub use message::{Message, ObjectChange};
pub use registry::{CacheGuard, Registry};
