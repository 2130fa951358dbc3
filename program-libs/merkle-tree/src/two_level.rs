use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use quorum_hasher::Hasher;

use crate::{
    errors::MerkleTreeError,
    proof::MerkleProof,
    reference::MerkleTree,
};

/// Two-hop witness authenticating a single member slot against the level-1
/// root: the member path proves the slot within its group subtree, the group
/// path proves that subtree root as a level-1 leaf.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TwoLevelProof {
    pub group: MerkleProof,
    pub member: MerkleProof,
}

impl TwoLevelProof {
    pub fn group_index(&self) -> u64 {
        self.group.leaf_index()
    }

    pub fn member_index(&self) -> u64 {
        self.member.leaf_index()
    }

    /// calculateRoot applied twice: member leaf -> level-2 root -> level-1
    /// root.
    pub fn root_from_member_leaf<H>(
        &self,
        member_leaf: &[u8; 32],
    ) -> Result<[u8; 32], MerkleTreeError>
    where
        H: Hasher,
    {
        let subtree_root = self.member.root_from_leaf::<H>(member_leaf)?;
        self.group.root_from_leaf::<H>(&subtree_root)
    }

    /// Whether this witness proves `member_leaf` under the level-1 `root`.
    pub fn matches<H>(
        &self,
        root: &[u8; 32],
        member_leaf: &[u8; 32],
    ) -> Result<bool, MerkleTreeError>
    where
        H: Hasher,
    {
        Ok(self.root_from_member_leaf::<H>(member_leaf)? == *root)
    }
}

/// Indexer-side two-level store: a level-1 tree over group subtrees. The
/// level-1 empty leaf is the empty subtree root, so an untouched group index
/// proves out as nonexistent.
#[derive(Debug, Clone)]
pub struct TwoLevelTree<H>
where
    H: Hasher,
{
    level1: MerkleTree<H>,
    subtrees: BTreeMap<usize, MerkleTree<H>>,
    member_height: usize,
}

impl<H> TwoLevelTree<H>
where
    H: Hasher,
{
    pub fn new(group_height: usize, member_height: usize) -> Result<Self, MerkleTreeError> {
        let empty_subtree_root = H::zero_bytes()[member_height];
        let level1 = MerkleTree::new_with_empty_leaf(group_height, empty_subtree_root)?;
        Ok(Self {
            level1,
            subtrees: BTreeMap::new(),
            member_height,
        })
    }

    pub fn root(&self) -> [u8; 32] {
        self.level1.root()
    }

    pub fn group_capacity(&self) -> usize {
        self.level1.capacity
    }

    pub fn member_capacity(&self) -> usize {
        1 << self.member_height
    }

    pub fn empty_subtree_root(&self) -> [u8; 32] {
        self.level1.empty_leaf()
    }

    pub fn subtree_root(&self, group_index: usize) -> [u8; 32] {
        self.subtrees
            .get(&group_index)
            .map(|t| t.root())
            .unwrap_or(self.level1.empty_leaf())
    }

    pub fn member_leaf(&self, group_index: usize, member_index: usize) -> [u8; 32] {
        self.subtrees
            .get(&group_index)
            .map(|t| t.leaf(member_index))
            .unwrap_or([0u8; 32])
    }

    /// Level-1-only witness for the subtree root under `group_index`.
    pub fn get_group_proof(&self, group_index: usize) -> Result<MerkleProof, MerkleTreeError> {
        self.level1.get_proof_of_leaf(group_index)
    }

    /// Witness for one member slot. Also valid for untouched groups, the
    /// member path then runs through an empty subtree.
    pub fn get_proof(
        &self,
        group_index: usize,
        member_index: usize,
    ) -> Result<TwoLevelProof, MerkleTreeError> {
        let group = self.level1.get_proof_of_leaf(group_index)?;
        let member = match self.subtrees.get(&group_index) {
            Some(subtree) => subtree.get_proof_of_leaf(member_index)?,
            None => MerkleTree::<H>::new(self.member_height)?.get_proof_of_leaf(member_index)?,
        };
        Ok(TwoLevelProof { group, member })
    }

    pub fn update(
        &mut self,
        group_index: usize,
        member_index: usize,
        leaf: [u8; 32],
    ) -> Result<(), MerkleTreeError> {
        if group_index >= self.level1.capacity {
            return Err(MerkleTreeError::IndexOutOfBounds(
                group_index,
                self.level1.capacity,
            ));
        }
        let member_height = self.member_height;
        let subtree = match self.subtrees.entry(group_index) {
            std::collections::btree_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(MerkleTree::new(member_height)?)
            }
        };
        subtree.update(&leaf, member_index)?;
        let subtree_root = subtree.root();
        self.level1.update(&subtree_root, group_index)
    }

    /// Replaces the subtree under `group_index` with a fresh one whose first
    /// leaves are `leaves`.
    pub fn init_subtree(
        &mut self,
        group_index: usize,
        leaves: &[[u8; 32]],
    ) -> Result<(), MerkleTreeError> {
        if group_index >= self.level1.capacity {
            return Err(MerkleTreeError::IndexOutOfBounds(
                group_index,
                self.level1.capacity,
            ));
        }
        let mut subtree = MerkleTree::new(self.member_height)?;
        for (i, leaf) in leaves.iter().enumerate() {
            subtree.update(leaf, i)?;
        }
        let subtree_root = subtree.root();
        self.subtrees.insert(group_index, subtree);
        self.level1.update(&subtree_root, group_index)
    }
}
