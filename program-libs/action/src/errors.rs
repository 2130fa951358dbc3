use quorum_hasher::HasherError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ActionError {
    #[error("Sub-field {0} value {1} exceeds its declared width of {2} bits")]
    FieldExceedsWidth(&'static str, u64, usize),
    #[error("Packed word carries bits outside the declared layout")]
    MalformedPackedWord,
    #[error("Unknown action kind tag {0}")]
    UnknownActionKind(u64),
    #[error("Hasher error: {0}")]
    Hasher(#[from] HasherError),
}

impl From<ActionError> for u32 {
    fn from(e: ActionError) -> u32 {
        match e {
            ActionError::FieldExceedsWidth(_, _, _) => 10001,
            ActionError::MalformedPackedWord => 10002,
            ActionError::UnknownActionKind(_) => 10003,
            ActionError::Hasher(e) => e.into(),
        }
    }
}
