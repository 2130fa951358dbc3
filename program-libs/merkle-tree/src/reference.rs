use std::marker::PhantomData;

use quorum_hasher::{zero_bytes::MAX_HEIGHT, Hasher};

use crate::{errors::MerkleTreeError, proof::MerkleProof};

/// Full-node Merkle tree which stores every written leaf. Backs the
/// off-chain indexer: the proof logic only ever consumes witnesses produced
/// from it.
///
/// The empty-leaf value is configurable so that a level-1 tree of a
/// two-level store can treat the empty level-2 subtree root as its
/// unoccupied value.
#[derive(Debug, Clone)]
pub struct MerkleTree<H>
where
    H: Hasher,
{
    pub height: usize,
    pub capacity: usize,
    pub layers: Vec<Vec<[u8; 32]>>,
    pub roots: Vec<[u8; 32]>,
    pub sequence_number: usize,
    zero_hashes: Vec<[u8; 32]>,
    _hasher: PhantomData<H>,
}

impl<H> MerkleTree<H>
where
    H: Hasher,
{
    pub fn new(height: usize) -> Result<Self, MerkleTreeError> {
        if height > MAX_HEIGHT {
            return Err(MerkleTreeError::HeightOutOfBounds(height, MAX_HEIGHT));
        }
        let zero_hashes = H::zero_bytes()[..=height].to_vec();
        Ok(Self {
            height,
            capacity: 1 << height,
            layers: vec![Vec::new(); height],
            roots: vec![zero_hashes[height]],
            sequence_number: 0,
            zero_hashes,
            _hasher: PhantomData,
        })
    }

    pub fn new_with_empty_leaf(
        height: usize,
        empty_leaf: [u8; 32],
    ) -> Result<Self, MerkleTreeError> {
        if height > MAX_HEIGHT {
            return Err(MerkleTreeError::HeightOutOfBounds(height, MAX_HEIGHT));
        }
        let mut zero_hashes = Vec::with_capacity(height + 1);
        zero_hashes.push(empty_leaf);
        for level in 0..height {
            let child = zero_hashes[level];
            zero_hashes.push(H::hashv(&[&child, &child])?);
        }
        Ok(Self {
            height,
            capacity: 1 << height,
            layers: vec![Vec::new(); height],
            roots: vec![zero_hashes[height]],
            sequence_number: 0,
            zero_hashes,
            _hasher: PhantomData,
        })
    }

    pub fn root(&self) -> [u8; 32] {
        // The roots vector is seeded with the empty root at construction.
        *self.roots.last().unwrap()
    }

    pub fn empty_leaf(&self) -> [u8; 32] {
        self.zero_hashes[0]
    }

    pub fn leaf(&self, index: usize) -> [u8; 32] {
        self.layers[0]
            .get(index)
            .cloned()
            .unwrap_or(self.zero_hashes[0])
    }

    fn node(&self, level: usize, index: usize) -> [u8; 32] {
        self.layers[level]
            .get(index)
            .cloned()
            .unwrap_or(self.zero_hashes[level])
    }

    fn update_upper_layers(&mut self, mut i: usize) -> Result<(), MerkleTreeError> {
        for level in 1..self.height {
            i /= 2;

            let left_child = self.node(level - 1, i * 2);
            let right_child = self.node(level - 1, i * 2 + 1);

            let node = H::hashv(&[&left_child, &right_child])?;
            if self.layers[level].len() > i {
                self.layers[level][i] = node;
            } else {
                self.layers[level].resize(i, self.zero_hashes[level]);
                self.layers[level].push(node);
            }
        }

        let left_child = self.node(self.height - 1, 0);
        let right_child = self.node(self.height - 1, 1);
        let root = H::hashv(&[&left_child, &right_child])?;
        self.roots.push(root);

        Ok(())
    }

    pub fn update(&mut self, leaf: &[u8; 32], leaf_index: usize) -> Result<(), MerkleTreeError> {
        if leaf_index >= self.capacity {
            return Err(MerkleTreeError::IndexOutOfBounds(leaf_index, self.capacity));
        }
        if self.layers[0].len() <= leaf_index {
            self.layers[0].resize(leaf_index + 1, self.zero_hashes[0]);
        }
        self.layers[0][leaf_index] = *leaf;

        self.update_upper_layers(leaf_index)?;

        self.sequence_number += 1;
        Ok(())
    }

    /// Produces the witness for the leaf under `index`, against the current
    /// root.
    pub fn get_proof_of_leaf(&self, mut index: usize) -> Result<MerkleProof, MerkleTreeError> {
        if index >= self.capacity {
            return Err(MerkleTreeError::IndexOutOfBounds(index, self.capacity));
        }
        let mut siblings = Vec::with_capacity(self.height);
        let mut path_bits = Vec::with_capacity(self.height);

        for level in 0..self.height {
            let is_right = index % 2 == 1;
            let sibling_index = if is_right { index - 1 } else { index + 1 };
            siblings.push(self.node(level, sibling_index));
            path_bits.push(is_right);

            index /= 2;
        }

        MerkleProof::new(siblings, path_bits)
    }
}

#[cfg(test)]
mod test {
    use quorum_hasher::Poseidon;

    use super::*;

    #[test]
    fn test_empty_tree_root_is_zero_subtree_root() {
        let tree = MerkleTree::<Poseidon>::new(6).unwrap();
        assert_eq!(tree.root(), Poseidon::zero_bytes()[6]);
    }

    #[test]
    fn test_proof_round_trip_sparse_updates() {
        let mut tree = MerkleTree::<Poseidon>::new(6).unwrap();
        for index in [0usize, 5, 37, 63] {
            let mut leaf = [0u8; 32];
            leaf[24..].copy_from_slice(&(index as u64 + 1).to_be_bytes());
            tree.update(&leaf, index).unwrap();

            let proof = tree.get_proof_of_leaf(index).unwrap();
            assert_eq!(proof.leaf_index(), index as u64);
            assert_eq!(proof.root_from_leaf::<Poseidon>(&leaf).unwrap(), tree.root());
        }
    }

    #[test]
    fn test_proof_round_trip_random_updates() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        let mut tree = MerkleTree::<Poseidon>::new(8).unwrap();
        for _ in 0..50 {
            let index = rng.gen_range(0..tree.capacity);
            let mut leaf = [0u8; 32];
            rng.fill(&mut leaf[8..]);
            tree.update(&leaf, index).unwrap();

            let proof = tree.get_proof_of_leaf(index).unwrap();
            assert_eq!(proof.leaf_index(), index as u64);
            assert_eq!(proof.root_from_leaf::<Poseidon>(&leaf).unwrap(), tree.root());
        }
    }

    #[test]
    fn test_update_out_of_bounds() {
        let mut tree = MerkleTree::<Poseidon>::new(3).unwrap();
        let res = tree.update(&[1u8; 32], 8);
        assert_eq!(res, Err(MerkleTreeError::IndexOutOfBounds(8, 8)));
    }

    #[test]
    fn test_custom_empty_leaf_root() {
        let empty_leaf = Poseidon::zero_bytes()[4];
        let tree = MerkleTree::<Poseidon>::new_with_empty_leaf(3, empty_leaf).unwrap();
        // Height 3 over empty leaves equal to the height 4 zero root is the
        // height 7 zero root.
        assert_eq!(tree.root(), Poseidon::zero_bytes()[7]);
        assert_eq!(tree.leaf(2), empty_leaf);
    }
}
