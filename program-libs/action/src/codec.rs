use crate::errors::ActionError;

/// Declared sub-field widths. The packed word is the fixed-order
/// concatenation kind | group_index | target_index | threshold | size,
/// kind in the most significant position.
pub const KIND_BITS: usize = 8;
pub const GROUP_INDEX_BITS: usize = 16;
pub const TARGET_INDEX_BITS: usize = 16;
pub const THRESHOLD_BITS: usize = 8;
pub const SIZE_BITS: usize = 8;

/// Offsets from the least significant bit, each derived from the widths of
/// the sub-fields packed below it.
pub const SIZE_OFFSET: usize = 0;
pub const THRESHOLD_OFFSET: usize = SIZE_OFFSET + SIZE_BITS;
pub const TARGET_INDEX_OFFSET: usize = THRESHOLD_OFFSET + THRESHOLD_BITS;
pub const GROUP_INDEX_OFFSET: usize = TARGET_INDEX_OFFSET + TARGET_INDEX_BITS;
pub const KIND_OFFSET: usize = GROUP_INDEX_OFFSET + GROUP_INDEX_BITS;

pub const PACKED_BITS: usize = KIND_OFFSET + KIND_BITS;

/// Sub-fields of one action in packed order. Kinds which do not use a
/// sub-field leave it zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionFields {
    pub kind: u64,
    pub group_index: u64,
    pub target_index: u64,
    pub threshold: u64,
    pub size: u64,
}

fn check_width(field: &'static str, value: u64, bits: usize) -> Result<(), ActionError> {
    if value >= 1u64 << bits {
        return Err(ActionError::FieldExceedsWidth(field, value, bits));
    }
    Ok(())
}

/// Packs the sub-fields into one 32-byte big-endian word.
///
/// Every sub-field is range-checked against its declared width first;
/// silent truncation would alias two different logical actions onto the
/// same packed bits.
pub fn pack(fields: &ActionFields) -> Result<[u8; 32], ActionError> {
    check_width("kind", fields.kind, KIND_BITS)?;
    check_width("group_index", fields.group_index, GROUP_INDEX_BITS)?;
    check_width("target_index", fields.target_index, TARGET_INDEX_BITS)?;
    check_width("threshold", fields.threshold, THRESHOLD_BITS)?;
    check_width("size", fields.size, SIZE_BITS)?;

    let word = fields.size << SIZE_OFFSET
        | fields.threshold << THRESHOLD_OFFSET
        | fields.target_index << TARGET_INDEX_OFFSET
        | fields.group_index << GROUP_INDEX_OFFSET
        | fields.kind << KIND_OFFSET;

    let mut packed = [0u8; 32];
    packed[24..].copy_from_slice(&word.to_be_bytes());
    Ok(packed)
}

fn slice_bits(word: u64, offset: usize, bits: usize) -> u64 {
    (word >> offset) & ((1u64 << bits) - 1)
}

/// Bit-slices the sub-fields back out of a packed word. Rejects words with
/// bits set outside the declared layout.
pub fn unpack(packed: &[u8; 32]) -> Result<ActionFields, ActionError> {
    if packed[..24].iter().any(|byte| *byte != 0) {
        return Err(ActionError::MalformedPackedWord);
    }
    let word = u64::from_be_bytes(packed[24..].try_into().unwrap());
    if word >= 1u64 << PACKED_BITS {
        return Err(ActionError::MalformedPackedWord);
    }
    Ok(ActionFields {
        kind: slice_bits(word, KIND_OFFSET, KIND_BITS),
        group_index: slice_bits(word, GROUP_INDEX_OFFSET, GROUP_INDEX_BITS),
        target_index: slice_bits(word, TARGET_INDEX_OFFSET, TARGET_INDEX_BITS),
        threshold: slice_bits(word, THRESHOLD_OFFSET, THRESHOLD_BITS),
        size: slice_bits(word, SIZE_OFFSET, SIZE_BITS),
    })
}
