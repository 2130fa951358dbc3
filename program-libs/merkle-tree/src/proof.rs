use borsh::{BorshDeserialize, BorshSerialize};
use quorum_hasher::Hasher;

use crate::errors::MerkleTreeError;

/// Authenticated path from a leaf to a root.
///
/// Siblings and direction bits are ordered leaf to root; a set bit means the
/// node on the path is the right child at that level. The committed index is
/// recoverable from the direction bits alone, independent of any leaf value.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MerkleProof {
    siblings: Vec<[u8; 32]>,
    path_bits: Vec<bool>,
}

impl MerkleProof {
    pub fn new(siblings: Vec<[u8; 32]>, path_bits: Vec<bool>) -> Result<Self, MerkleTreeError> {
        if siblings.len() != path_bits.len() {
            return Err(MerkleTreeError::InvalidProofShape(
                siblings.len(),
                path_bits.len(),
            ));
        }
        Ok(Self {
            siblings,
            path_bits,
        })
    }

    pub fn height(&self) -> usize {
        self.siblings.len()
    }

    /// Recomputes the root for the given leaf value.
    pub fn root_from_leaf<H>(&self, leaf: &[u8; 32]) -> Result<[u8; 32], MerkleTreeError>
    where
        H: Hasher,
    {
        let mut node = *leaf;
        for (sibling, is_right) in self.siblings.iter().zip(self.path_bits.iter()) {
            node = if *is_right {
                H::hashv(&[sibling, &node])?
            } else {
                H::hashv(&[&node, sibling])?
            };
        }
        Ok(node)
    }

    /// Recovers the committed leaf index from the direction bits.
    pub fn leaf_index(&self) -> u64 {
        let mut index = 0u64;
        for (level, is_right) in self.path_bits.iter().enumerate() {
            if *is_right {
                index |= 1 << level;
            }
        }
        index
    }

    /// Whether this witness proves `leaf` under `root`.
    pub fn matches<H>(&self, root: &[u8; 32], leaf: &[u8; 32]) -> Result<bool, MerkleTreeError>
    where
        H: Hasher,
    {
        Ok(self.root_from_leaf::<H>(leaf)? == *root)
    }
}

#[cfg(test)]
mod test {
    use quorum_hasher::Poseidon;

    use super::*;

    #[test]
    fn test_proof_shape_mismatch_is_rejected() {
        let res = MerkleProof::new(vec![[0u8; 32]; 3], vec![false; 2]);
        assert_eq!(res, Err(MerkleTreeError::InvalidProofShape(3, 2)));
    }

    #[test]
    fn test_leaf_index_from_path_bits() {
        let proof = MerkleProof::new(
            vec![[0u8; 32]; 4],
            vec![true, false, true, false],
        )
        .unwrap();
        assert_eq!(proof.leaf_index(), 0b0101);
    }

    #[test]
    fn test_root_changes_with_leaf() {
        let proof = MerkleProof::new(vec![[7u8; 32]; 4], vec![false; 4]).unwrap();
        let r1 = proof.root_from_leaf::<Poseidon>(&[1u8; 32]).unwrap();
        let r2 = proof.root_from_leaf::<Poseidon>(&[2u8; 32]).unwrap();
        assert_ne!(r1, r2);
    }
}
