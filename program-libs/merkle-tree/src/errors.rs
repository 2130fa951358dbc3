use quorum_hasher::HasherError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MerkleTreeError {
    #[error("Hasher error: {0}")]
    Hasher(#[from] HasherError),
    #[error("Leaf index {0} out of bounds for capacity {1}")]
    IndexOutOfBounds(usize, usize),
    #[error("Tree height {0} exceeds the supported maximum {1}")]
    HeightOutOfBounds(usize, usize),
    #[error("Proof has {0} siblings but {1} path bits")]
    InvalidProofShape(usize, usize),
    #[error("Tree is full")]
    TreeIsFull,
}

impl From<MerkleTreeError> for u32 {
    fn from(e: MerkleTreeError) -> u32 {
        match e {
            MerkleTreeError::Hasher(e) => e.into(),
            MerkleTreeError::IndexOutOfBounds(_, _) => 9001,
            MerkleTreeError::HeightOutOfBounds(_, _) => 9002,
            MerkleTreeError::InvalidProofShape(_, _) => 9003,
            MerkleTreeError::TreeIsFull => 9004,
        }
    }
}
