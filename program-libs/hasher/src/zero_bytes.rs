/// Highest tree height supported by the zero-subtree table.
pub const MAX_HEIGHT: usize = 32;

pub const ZERO_BYTES_LEN: usize = MAX_HEIGHT + 1;

/// Roots of fully empty subtrees by height, `zero_bytes[0]` being the
/// empty leaf.
pub type ZeroBytes = [[u8; 32]; ZERO_BYTES_LEN];
