//! Core types for the Warden managed-registry framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the change-bit mask attached to every reported mutation, the error
//! taxonomy shared by all registry operations, and the opaque client
//! registration token.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod change;
pub mod error;
pub mod id;

pub use change::ChangeFlags;
pub use error::RegistryError;
pub use id::ClientToken;
