use std::marker::PhantomData;

use num_bigint::BigUint;
use quorum_hasher::{zero_bytes::MAX_HEIGHT, Hasher};

use crate::errors::MerkleTreeError;

/// Append-only Merkle tree keeping one filled subtree per level.
///
/// Cheap way to derive the root of a tree whose occupied leaves form a
/// prefix, without materializing the nodes.
#[derive(Clone, Debug)]
pub struct SparseMerkleTree<H: Hasher> {
    subtrees: Vec<[u8; 32]>,
    next_index: usize,
    root: [u8; 32],
    height: usize,
    _hasher: PhantomData<H>,
}

impl<H> SparseMerkleTree<H>
where
    H: Hasher,
{
    pub fn new_empty(height: usize) -> Result<Self, MerkleTreeError> {
        if height > MAX_HEIGHT {
            return Err(MerkleTreeError::HeightOutOfBounds(height, MAX_HEIGHT));
        }
        Ok(Self {
            subtrees: H::zero_bytes()[..height].to_vec(),
            next_index: 0,
            root: H::zero_bytes()[height],
            height,
            _hasher: PhantomData,
        })
    }

    pub fn append(&mut self, leaf: [u8; 32]) -> Result<(), MerkleTreeError> {
        if self.next_index == 1 << self.height {
            return Err(MerkleTreeError::TreeIsFull);
        }
        let mut current_index = self.next_index;
        let mut current_level_hash = leaf;

        for i in 0..self.height {
            let (left, right) = if current_index % 2 == 0 {
                self.subtrees[i] = current_level_hash;
                (current_level_hash, H::zero_bytes()[i])
            } else {
                (self.subtrees[i], current_level_hash)
            };
            current_level_hash = H::hashv(&[&left, &right])?;
            current_index /= 2;
        }
        self.root = current_level_hash;
        self.next_index += 1;

        Ok(())
    }

    pub fn root(&self) -> [u8; 32] {
        self.root
    }

    pub fn get_height(&self) -> usize {
        self.height
    }

    pub fn get_next_index(&self) -> usize {
        self.next_index
    }
}

/// Root of a tree of the given height whose first leaves are `leaves` and
/// whose remaining slots are empty.
pub fn subtree_root_with_leaves<H>(
    leaves: &[[u8; 32]],
    height: usize,
) -> Result<[u8; 32], MerkleTreeError>
where
    H: Hasher,
{
    let mut tree = SparseMerkleTree::<H>::new_empty(height)?;
    for leaf in leaves {
        tree.append(*leaf)?;
    }
    Ok(tree.root())
}

pub fn arr_to_string(arr: [u8; 32]) -> String {
    format!("0x{}", BigUint::from_bytes_be(&arr).to_str_radix(16))
}

#[cfg(test)]
mod test {
    use quorum_hasher::Poseidon;

    use super::*;
    use crate::reference::MerkleTree;

    const HEIGHT: usize = 5;

    #[test]
    fn test_sparse_matches_reference() {
        let mut sparse = SparseMerkleTree::<Poseidon>::new_empty(HEIGHT).unwrap();
        let mut reference = MerkleTree::<Poseidon>::new(HEIGHT).unwrap();
        assert_eq!(sparse.root(), reference.root());

        for i in 0..1 << HEIGHT {
            let mut leaf = [0u8; 32];
            leaf[24..].copy_from_slice(&(i as u64).to_be_bytes());
            sparse.append(leaf).unwrap();
            reference.update(&leaf, i).unwrap();
            assert_eq!(sparse.root(), reference.root());
            assert_eq!(sparse.get_next_index(), i + 1);
        }

        assert_eq!(sparse.append([1u8; 32]), Err(MerkleTreeError::TreeIsFull));
    }

    #[test]
    fn test_subtree_root_with_prefix_leaves() {
        let leaves = [[1u8; 32], [2u8; 32], [3u8; 32]];
        let root = subtree_root_with_leaves::<Poseidon>(&leaves, HEIGHT).unwrap();

        let mut reference = MerkleTree::<Poseidon>::new(HEIGHT).unwrap();
        for (i, leaf) in leaves.iter().enumerate() {
            reference.update(leaf, i).unwrap();
        }
        assert_eq!(root, reference.root());
    }

    #[test]
    fn test_empty_subtree_root_is_zero_root() {
        let root = subtree_root_with_leaves::<Poseidon>(&[], HEIGHT).unwrap();
        assert_eq!(root, Poseidon::zero_bytes()[HEIGHT]);
    }
}
