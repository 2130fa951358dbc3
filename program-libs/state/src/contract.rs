use borsh::{BorshDeserialize, BorshSerialize};
use quorum_rollup::{RollupBackend, RollupProof, StateSnapshot};
use tracing::info;

use crate::errors::StateError;

/// Default ceiling on actions consumed per apply, keeping proof size and
/// verification cost predictable. A longer pending log takes multiple
/// sequential applies.
pub const DEFAULT_ACTION_CEILING: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractConfig {
    pub max_actions_per_apply: u64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            max_actions_per_apply: DEFAULT_ACTION_CEILING,
        }
    }
}

/// Emitted once per successful apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ApplyEvent {
    pub sequence_number: u64,
    pub num_actions: u64,
    pub previous_cursor: [u8; 32],
    pub cursor: [u8; 32],
    pub snapshot: StateSnapshot,
}

/// The single point where off-chain-computed transitions become canonical.
///
/// Holds one committed snapshot; at most one apply can succeed against a
/// given snapshot, which serializes concurrent off-chain folds into one
/// consistent history.
#[derive(Debug, Clone)]
pub struct StateContract {
    snapshot: StateSnapshot,
    config: ContractConfig,
    sequence_number: u64,
}

impl StateContract {
    pub fn new(genesis: StateSnapshot, config: ContractConfig) -> Self {
        Self {
            snapshot: genesis,
            config,
            sequence_number: 0,
        }
    }

    pub fn snapshot(&self) -> &StateSnapshot {
        &self.snapshot
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Verifies one final rollup proof and swaps the whole snapshot.
    ///
    /// 1. Verify the proof.
    /// 2. Check the action ceiling.
    /// 3. Compare the proof's initial values against the committed values
    ///    as one all-or-nothing equality.
    /// 4. Overwrite every root and the cursor as a unit.
    ///
    /// Any rejection leaves the contract untouched, so a failed apply is
    /// always safely retryable after rebasing.
    pub fn apply<B>(&mut self, backend: &B, proof: &RollupProof) -> Result<ApplyEvent, StateError>
    where
        B: RollupBackend,
    {
        backend.verify(proof)?;

        let output = &proof.output;
        if output.num_actions == 0 {
            return Err(StateError::EmptyBatch);
        }
        if output.num_actions > self.config.max_actions_per_apply {
            return Err(StateError::BatchCeilingExceeded {
                num_actions: output.num_actions,
                ceiling: self.config.max_actions_per_apply,
            });
        }
        if output.initial != self.snapshot {
            return Err(StateError::StateMismatch);
        }

        let previous_cursor = self.snapshot.cursor;
        self.snapshot = output.next;
        self.sequence_number += 1;

        info!(
            sequence_number = self.sequence_number,
            num_actions = output.num_actions,
            "applied rollup proof"
        );

        Ok(ApplyEvent {
            sequence_number: self.sequence_number,
            num_actions: output.num_actions,
            previous_cursor,
            cursor: self.snapshot.cursor,
            snapshot: self.snapshot,
        })
    }
}
