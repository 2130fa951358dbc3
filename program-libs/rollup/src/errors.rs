use quorum_action::ActionError;
use quorum_hasher::HasherError;
use quorum_merkle_tree::MerkleTreeError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RollupError {
    #[error("Hasher error: {0}")]
    Hasher(#[from] HasherError),
    #[error("Merkle tree error: {0}")]
    MerkleTree(#[from] MerkleTreeError),
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    #[error("Witness bundle does not match the action kind")]
    WitnessKindMismatch,
    #[error("Witness addresses index {actual}, action declares {expected}")]
    WitnessIndexMismatch { expected: u64, actual: u64 },
    #[error("Process witness for position {0} is inconsistent with the carried root")]
    ProcessWitnessMismatch(u64),
    #[error("Group {0} already exists")]
    GroupAlreadyExists(u64),
    #[error("Request {0} already exists")]
    RequestAlreadyExists(u64),
    #[error("Invalid group parameters, threshold {threshold} of size {size}")]
    InvalidGroupParameters { threshold: u64, size: u64 },
    #[error("Leaf does not decode as a packed status word")]
    InvalidLeafEncoding,
    #[error("Unknown key state {0}")]
    InvalidKeyState(u64),
    #[error("Init output must carry identical snapshots and no actions")]
    InvalidInitOutput,
    #[error("Step output does not extend the previous proof")]
    BrokenProofChain,
    #[error("Proof verification failed")]
    ProofVerificationFailed,
}

impl From<RollupError> for u32 {
    fn from(e: RollupError) -> u32 {
        match e {
            RollupError::Hasher(e) => e.into(),
            RollupError::MerkleTree(e) => e.into(),
            RollupError::Action(e) => e.into(),
            RollupError::WitnessKindMismatch => 11001,
            RollupError::WitnessIndexMismatch { .. } => 11002,
            RollupError::ProcessWitnessMismatch(_) => 11003,
            RollupError::GroupAlreadyExists(_) => 11004,
            RollupError::RequestAlreadyExists(_) => 11005,
            RollupError::InvalidGroupParameters { .. } => 11006,
            RollupError::InvalidLeafEncoding => 11007,
            RollupError::InvalidKeyState(_) => 11008,
            RollupError::InvalidInitOutput => 11009,
            RollupError::BrokenProofChain => 11010,
            RollupError::ProofVerificationFailed => 11011,
        }
    }
}
