use borsh::{BorshDeserialize, BorshSerialize};
use quorum_hasher::hash_chain::create_hash_chain_from_array;

use crate::{errors::RollupError, leaves::be_word};

/// One committed state: the root of every logical store plus the action
/// cursor. This is the entirety of contract-held state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StateSnapshot {
    pub member_root: [u8; 32],
    pub setting_root: [u8; 32],
    pub key_root: [u8; 32],
    pub contribution_root: [u8; 32],
    pub request_root: [u8; 32],
    pub process_root: [u8; 32],
    pub cursor: [u8; 32],
}

impl StateSnapshot {
    pub fn digest(&self) -> Result<[u8; 32], RollupError> {
        Ok(create_hash_chain_from_array([
            self.member_root,
            self.setting_root,
            self.key_root,
            self.contribution_root,
            self.request_root,
            self.process_root,
            self.cursor,
        ])?)
    }
}

/// Public output threaded through the recursive fold. `initial` is copied
/// unchanged through every step so the final proof compares against the
/// contract state in one check; `next` is the running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RollupOutput {
    pub initial: StateSnapshot,
    pub next: StateSnapshot,
    pub num_actions: u64,
}

impl RollupOutput {
    /// Identity output of the Init step: no actions consumed, both
    /// snapshots equal to the observed contract state.
    pub fn init(snapshot: StateSnapshot) -> Self {
        Self {
            initial: snapshot,
            next: snapshot,
            num_actions: 0,
        }
    }

    pub fn digest(&self) -> Result<[u8; 32], RollupError> {
        Ok(create_hash_chain_from_array([
            self.initial.digest()?,
            self.next.digest()?,
            be_word(self.num_actions),
        ])?)
    }
}
