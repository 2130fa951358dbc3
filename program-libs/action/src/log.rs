use borsh::{BorshDeserialize, BorshSerialize};
use quorum_hasher::{Hasher, Poseidon};

use crate::{action::Action, errors::ActionError};

/// One dispatched action together with its chain position and the
/// cumulative hash of the log up to and including it.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LogEntry {
    pub action: Action,
    pub action_hash: [u8; 32],
    pub cumulative_hash: [u8; 32],
    pub position: u64,
}

/// Append-only, content-addressed action log. Each dispatch extends the
/// chain from the prior cumulative hash; nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: Vec<LogEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: Action) -> Result<&LogEntry, ActionError> {
        let action_hash = action.hash()?;
        let previous = self
            .entries
            .last()
            .map(|entry| entry.cumulative_hash)
            .unwrap_or([0u8; 32]);
        let cumulative_hash = Poseidon::hashv(&[&previous, &action_hash])?;
        let position = self.entries.len() as u64;
        self.entries.push(LogEntry {
            action,
            action_hash,
            cumulative_hash,
            position,
        });
        // Just pushed.
        Ok(self.entries.last().unwrap())
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cumulative hash of the whole log, zero when empty.
    pub fn cumulative_hash(&self) -> [u8; 32] {
        self.entries
            .last()
            .map(|entry| entry.cumulative_hash)
            .unwrap_or([0u8; 32])
    }
}
