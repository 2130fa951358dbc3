use quorum_action::Element;
use quorum_hasher::{Hasher, Poseidon};

use crate::errors::RollupError;

/// A u64 in the tail bytes of a 32-byte big-endian word.
pub const fn be_word(value: u64) -> [u8; 32] {
    let bytes = value.to_be_bytes();
    let mut word = [0u8; 32];
    let mut i = 0;
    while i < 8 {
        word[24 + i] = bytes[i];
        i += 1;
    }
    word
}

/// Member slot sentinels. An unoccupied slot is zero; a slot initialized by
/// group creation but not yet joined holds the inactive marker; a joined
/// slot holds the hash of the member public key.
pub const MEMBER_SLOT_EMPTY: [u8; 32] = [0u8; 32];
pub const MEMBER_SLOT_INACTIVE: [u8; 32] = be_word(1);

/// Process record marks, keyed by log position.
pub const PROCESS_UNSEEN: [u8; 32] = [0u8; 32];
pub const PROCESS_APPLIED: [u8; 32] = be_word(1);
pub const PROCESS_SKIPPED: [u8; 32] = be_word(2);

/// Request status words folded into the request leaf hash.
pub const W_REQUESTED: [u8; 32] = be_word(1);
pub const W_RESOLVED: [u8; 32] = be_word(2);

/// Key lifecycle, one-way:
/// Empty -> Contribution -> Active -> Deprecated.
#[derive(Clone, Debug, PartialEq, Eq, Copy)]
#[repr(u64)]
pub enum KeyState {
    Empty = 0,
    Contribution = 1,
    Active = 2,
    Deprecated = 3,
}

impl TryFrom<u64> for KeyState {
    type Error = RollupError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(KeyState::Empty),
            1 => Ok(KeyState::Contribution),
            2 => Ok(KeyState::Active),
            3 => Ok(KeyState::Deprecated),
            _ => Err(RollupError::InvalidKeyState(value)),
        }
    }
}

/// Key leaf: state in bytes 16..24, contribution count in bytes 24..32.
pub fn pack_key_leaf(state: KeyState, count: u64) -> [u8; 32] {
    let mut leaf = [0u8; 32];
    leaf[16..24].copy_from_slice(&(state as u64).to_be_bytes());
    leaf[24..].copy_from_slice(&count.to_be_bytes());
    leaf
}

pub fn unpack_key_leaf(leaf: &[u8; 32]) -> Result<(KeyState, u64), RollupError> {
    if leaf[..16].iter().any(|byte| *byte != 0) {
        return Err(RollupError::InvalidLeafEncoding);
    }
    let state = u64::from_be_bytes(leaf[16..24].try_into().unwrap());
    let count = u64::from_be_bytes(leaf[24..].try_into().unwrap());
    Ok((KeyState::try_from(state)?, count))
}

/// Setting leaf: threshold in bytes 16..24, size in bytes 24..32. A zero
/// leaf means the group has no settings, so group creation requires
/// threshold >= 1.
pub fn pack_setting_leaf(threshold: u64, size: u64) -> [u8; 32] {
    let mut leaf = [0u8; 32];
    leaf[16..24].copy_from_slice(&threshold.to_be_bytes());
    leaf[24..].copy_from_slice(&size.to_be_bytes());
    leaf
}

pub fn unpack_setting_leaf(leaf: &[u8; 32]) -> Result<(u64, u64), RollupError> {
    if leaf[..16].iter().any(|byte| *byte != 0) {
        return Err(RollupError::InvalidLeafEncoding);
    }
    let threshold = u64::from_be_bytes(leaf[16..24].try_into().unwrap());
    let size = u64::from_be_bytes(leaf[24..].try_into().unwrap());
    Ok((threshold, size))
}

/// Leaf of a joined member slot.
pub fn active_member_leaf(public_key: &[Element; 2]) -> Result<[u8; 32], RollupError> {
    Ok(Poseidon::hashv(&[&public_key[0], &public_key[1]])?)
}

/// Leaf of a submitted contribution slot.
pub fn contribution_leaf(commitment: &[Element; 2]) -> Result<[u8; 32], RollupError> {
    Ok(Poseidon::hashv(&[&commitment[0], &commitment[1]])?)
}

/// Leaf of an open request, committing to the requesting group and the
/// ciphertext accumulator.
pub fn requested_leaf(
    group_index: u64,
    accumulator: &[Element; 2],
) -> Result<[u8; 32], RollupError> {
    Ok(Poseidon::hashv(&[
        &W_REQUESTED,
        &be_word(group_index),
        &accumulator[0],
        &accumulator[1],
    ])?)
}

/// Leaf of a resolved request, chaining the response onto the open-request
/// leaf.
pub fn resolved_leaf(
    requested: &[u8; 32],
    response: &[Element; 2],
) -> Result<[u8; 32], RollupError> {
    Ok(Poseidon::hashv(&[
        &W_RESOLVED,
        requested,
        &response[0],
        &response[1],
    ])?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_be_word_layout() {
        let word = be_word(0x0102);
        assert_eq!(word[30], 1);
        assert_eq!(word[31], 2);
        assert!(word[..30].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn test_key_leaf_round_trip() {
        for state in [
            KeyState::Empty,
            KeyState::Contribution,
            KeyState::Active,
            KeyState::Deprecated,
        ] {
            let leaf = pack_key_leaf(state, 7);
            assert_eq!(unpack_key_leaf(&leaf).unwrap(), (state, 7));
        }
    }

    #[test]
    fn test_empty_key_leaf_is_zero() {
        assert_eq!(pack_key_leaf(KeyState::Empty, 0), [0u8; 32]);
    }

    #[test]
    fn test_unpack_rejects_unknown_state() {
        let mut leaf = [0u8; 32];
        leaf[23] = 9;
        assert_eq!(unpack_key_leaf(&leaf), Err(RollupError::InvalidKeyState(9)));
    }

    #[test]
    fn test_unpack_rejects_high_bytes() {
        let mut leaf = pack_key_leaf(KeyState::Active, 1);
        leaf[0] = 1;
        assert_eq!(unpack_key_leaf(&leaf), Err(RollupError::InvalidLeafEncoding));
    }

    #[test]
    fn test_setting_leaf_round_trip() {
        let leaf = pack_setting_leaf(2, 3);
        assert_eq!(unpack_setting_leaf(&leaf).unwrap(), (2, 3));
    }

    #[test]
    fn test_request_leaves_are_status_distinct() {
        let accumulator = [[4u8; 32], [5u8; 32]];
        let requested = requested_leaf(3, &accumulator).unwrap();
        let resolved = resolved_leaf(&requested, &accumulator).unwrap();
        assert_ne!(requested, resolved);
    }
}
