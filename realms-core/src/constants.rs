/// Word width of the original field-element storage (felt252 minus the
/// reserved top bit).
pub const DEFAULT_WORD_BITS: u32 = 251;

/// Widest word `Word` can hold.
pub const MAX_WORD_BITS: u32 = 256;

/// Kind id that is accepted without whitelisting.
pub const UNCLASSIFIED_KIND: u64 = 0;

pub const FIRST_ENTITY_ID: u64 = 1;
pub const FIRST_REVISION_ID: u64 = 1;
