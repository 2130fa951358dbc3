use quorum_action::codec::{GROUP_INDEX_BITS, TARGET_INDEX_BITS};

/// Tree heights are aligned with the codec sub-field widths, so every
/// index a well-formed action can carry is addressable by a witness.
pub const GROUP_TREE_HEIGHT: usize = GROUP_INDEX_BITS;
pub const MEMBER_TREE_HEIGHT: usize = TARGET_INDEX_BITS;
pub const REQUEST_TREE_HEIGHT: usize = TARGET_INDEX_BITS;

/// The process record is keyed by log position, which is not bounded by
/// the codec.
pub const PROCESS_TREE_HEIGHT: usize = 32;
