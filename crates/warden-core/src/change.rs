//! The [`ChangeFlags`] bitmask describing how a managed object changed.

use bitflags::bitflags;

bitflags! {
    /// Bitmask describing the nature of a change to a managed object.
    ///
    /// One mask accompanies every object entry in a dispatched message,
    /// and the bitwise OR of all entry masks forms the message's change
    /// summary. Within a single batching window, repeated changes to the
    /// same object coalesce into one mask.
    ///
    /// `CONTENT` and `IDENTIFIER` may combine (a whole-object modify that
    /// also renames). `ADD` and `REMOVE` are terminal states for one
    /// insertion cycle: changes recorded after an uncommitted add stay
    /// reported as a plain `ADD`, and a removed object is reported as
    /// `REMOVE` regardless of edits made before the removal.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ChangeFlags: u32 {
        /// The object was added to the registry.
        const ADD = 1 << 0;
        /// The object was removed from the registry.
        const REMOVE = 1 << 1;
        /// Fields other than the identity changed.
        const CONTENT = 1 << 2;
        /// The identity itself changed.
        const IDENTIFIER = 1 << 3;
    }
}

impl ChangeFlags {
    /// Mask of the two change kinds a caller may record directly via
    /// `mark_changed`. `ADD` and `REMOVE` are recorded by the registry
    /// itself during insertion and removal.
    pub const RECORDABLE: Self = Self::CONTENT.union(Self::IDENTIFIER);
}
