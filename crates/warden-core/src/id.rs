//! The opaque [`ClientToken`] returned by client registration.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ClientToken`] allocation.
static CLIENT_TOKEN_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque token identifying one registered client of a registry.
///
/// Allocated from a monotonic atomic counter via [`ClientToken::next`],
/// so a token is unique for the lifetime of the process and a stale
/// token can never alias a later registration. Deregistration is a
/// direct map lookup by token, never a scan by callback address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientToken(u64);

impl ClientToken {
    /// Allocate a fresh, unique token.
    ///
    /// Called by the registry when a client registers; user code only
    /// ever stores and returns tokens.
    pub fn next() -> Self {
        Self(CLIENT_TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ClientToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}
