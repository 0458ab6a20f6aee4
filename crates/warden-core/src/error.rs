//! Error types shared by all registry operations.
//!
//! Every registry operation returns a [`RegistryError`] on contract
//! violation and logs a diagnostic at the call site. Errors never cross
//! the crate boundary as panics: collisions, in-use removals and locked
//! mutations are ordinary recoverable results. The single exception in
//! severity is [`RegistryError::Corrupted`], which reports an identity
//! index that can no longer be trusted; it is still returned, not thrown,
//! but the registry makes no consistency guarantees afterwards.

use std::error::Error;
use std::fmt;

/// Errors returned by registry operations.
///
/// Identity values are rendered into the error at construction time so
/// the type stays independent of the managed object type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// An object with the same identity is already present.
    ///
    /// Returned by `add`, and by the modify/rename operations when the
    /// requested identity names a different live object. Recoverable;
    /// the store is left unchanged.
    AlreadyExists {
        /// Display form of the colliding identity.
        identity: String,
    },
    /// The object is already owned by a registry.
    ///
    /// An object can be a member of at most one registry at a time; it
    /// must be removed before it can be added elsewhere.
    AlreadyManaged,
    /// The object is not a member of this registry.
    NotManaged,
    /// The registry refused a re-entrant operation.
    ///
    /// Raised when a mutation is attempted while the registry state is
    /// held elsewhere on the call stack, e.g. from inside a `for_each`
    /// visitor or from a copy hook running under a modify operation.
    Locked,
    /// Removal was blocked by external references to the object.
    ///
    /// Recoverable: the caller may drop the extra handles and retry.
    InUse {
        /// Display form of the identity of the object still in use.
        identity: String,
    },
    /// `remove_all` could not remove every object.
    ///
    /// Reported instead of partial silent success; `remaining` objects
    /// were still in use after all removable objects were removed.
    RemovalIncomplete {
        /// Number of objects left in the registry.
        remaining: usize,
    },
    /// A deregistration token did not match any registered client.
    UnknownClient,
    /// `end_cache` was called without a matching `begin_cache`.
    NotCaching,
    /// The identity index is in an inconsistent state.
    ///
    /// Produced when reindexing after an identifier change fails, e.g.
    /// a copy hook left the object reporting an identity other than the
    /// requested one. Non-recoverable for this registry instance: the
    /// error is reported and logged, but the index is not auto-corrected.
    Corrupted {
        /// Human-readable description of the inconsistency.
        reason: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists { identity } => {
                write!(f, "an object with identity {identity} already exists")
            }
            Self::AlreadyManaged => write!(f, "object is already owned by a registry"),
            Self::NotManaged => write!(f, "object is not a member of this registry"),
            Self::Locked => write!(f, "registry is locked by a re-entrant operation"),
            Self::InUse { identity } => {
                write!(f, "object {identity} is still referenced outside the registry")
            }
            Self::RemovalIncomplete { remaining } => {
                write!(f, "{remaining} object(s) could not be removed")
            }
            Self::UnknownClient => write!(f, "no client registered under that token"),
            Self::NotCaching => write!(f, "end_cache called while caching is not enabled"),
            Self::Corrupted { reason } => {
                write!(f, "identity index is inconsistent: {reason}")
            }
        }
    }
}

impl Error for RegistryError {}
