use quorum_rollup::RollupError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("Rollup error: {0}")]
    Rollup(#[from] RollupError),
    #[error("Proof initial values do not match the committed state")]
    StateMismatch,
    #[error("Proof consumes no actions")]
    EmptyBatch,
    #[error("Proof consumes {num_actions} actions, ceiling is {ceiling}")]
    BatchCeilingExceeded { num_actions: u64, ceiling: u64 },
}

impl From<StateError> for u32 {
    fn from(e: StateError) -> u32 {
        match e {
            StateError::Rollup(e) => e.into(),
            StateError::StateMismatch => 12001,
            StateError::EmptyBatch => 12002,
            StateError::BatchCeilingExceeded { .. } => 12003,
        }
    }
}
