//! Warden: typed, identity-indexed registries with batched, coalesced
//! change notification.
//!
//! A [`Registry`](prelude::Registry) holds shared domain objects,
//! unique by identity, and reports every mutation to registered
//! clients as one immutable message per batching window. This is the
//! top-level facade crate re-exporting the public API from the Warden
//! sub-crates; for most users, adding `warden` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use warden::prelude::*;
//!
//! // A minimal managed type: identity plus payload.
//! #[derive(Clone, Debug)]
//! struct Material {
//!     name: String,
//!     density: f64,
//! }
//!
//! impl Managed for Material {
//!     type Identity = String;
//!     type ChangeDetail = ();
//!
//!     fn identity(&self) -> String {
//!         self.name.clone()
//!     }
//!     fn copy_identifier(&mut self, name: &String) {
//!         self.name.clone_from(name);
//!     }
//!     fn copy_content(&mut self, source: &Self) {
//!         self.density = source.density;
//!     }
//! }
//!
//! let registry = Registry::new();
//!
//! // Observe changes: one synchronous message per batching window.
//! let observed = Rc::new(Cell::new(ChangeFlags::empty()));
//! let sink = Rc::clone(&observed);
//! registry
//!     .register(move |message: Rc<Message<Material>>| {
//!         sink.set(sink.get() | message.change_summary());
//!     })
//!     .unwrap();
//!
//! let steel = Handle::new(Material {
//!     name: "steel".into(),
//!     density: 7.85,
//! });
//! registry.add(&steel).unwrap();
//! assert_eq!(observed.get(), ChangeFlags::ADD);
//!
//! // Batch two edits into a single message.
//! registry.begin_cache().unwrap();
//! registry
//!     .modify_content(
//!         &steel,
//!         &Material {
//!             name: "steel".into(),
//!             density: 7.9,
//!         },
//!     )
//!     .unwrap();
//! registry.rename(&steel, "carbon steel".into()).unwrap();
//! registry.end_cache().unwrap();
//!
//! assert!(observed.get().contains(ChangeFlags::CONTENT | ChangeFlags::IDENTIFIER));
//! assert!(registry
//!     .find_by_identity(&"carbon steel".to_string())
//!     .unwrap()
//!     .is_some());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `warden-core` | Change bits, error taxonomy, client tokens |
//! | [`registry`] | `warden-registry` | `Registry`, `Handle`, `Message`, the `Managed` trait |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Change bits, error taxonomy, and client tokens (`warden-core`).
pub use warden_core as types;

/// The registry, handles, messages, and the `Managed` trait
/// (`warden-registry`).
pub use warden_registry as registry;

/// Common imports for typical Warden usage.
///
/// ```rust
/// use warden::prelude::*;
/// ```
pub mod prelude {
    pub use warden_core::{ChangeFlags, ClientToken, RegistryError};
    pub use warden_registry::{CacheGuard, Handle, Managed, Message, ObjectChange, Registry};
}
