use quorum_action::{Action, LogEntry};
use quorum_hasher::Poseidon;
use quorum_merkle_tree::{MerkleTree, TwoLevelTree};

use crate::{
    constants::{GROUP_TREE_HEIGHT, MEMBER_TREE_HEIGHT, PROCESS_TREE_HEIGHT, REQUEST_TREE_HEIGHT},
    errors::RollupError,
    leaves::{MEMBER_SLOT_INACTIVE, PROCESS_UNSEEN},
    output::StateSnapshot,
    steps::{StepOutcome, StoreWrite},
    witnesses::{
        ContributionWitnesses, CreateGroupWitnesses, DeprecateWitnesses, LeafWitness,
        MembershipWitnesses, RequestWitnesses, StepWitnesses,
    },
};

/// Indexer-side mirror of every store, passed explicitly to the driver.
///
/// The arena produces witnesses consistent with the last-applied roots and
/// replays the writes of each verified step; the proof logic validates
/// witnesses and never constructs them.
#[derive(Debug, Clone)]
pub struct StoreArena {
    members: TwoLevelTree<Poseidon>,
    settings: MerkleTree<Poseidon>,
    keys: MerkleTree<Poseidon>,
    contributions: TwoLevelTree<Poseidon>,
    requests: MerkleTree<Poseidon>,
    process: MerkleTree<Poseidon>,
    cursor: [u8; 32],
}

impl StoreArena {
    pub fn new() -> Result<Self, RollupError> {
        Ok(Self {
            members: TwoLevelTree::new(GROUP_TREE_HEIGHT, MEMBER_TREE_HEIGHT)?,
            settings: MerkleTree::new(GROUP_TREE_HEIGHT)?,
            keys: MerkleTree::new(GROUP_TREE_HEIGHT)?,
            contributions: TwoLevelTree::new(GROUP_TREE_HEIGHT, MEMBER_TREE_HEIGHT)?,
            requests: MerkleTree::new(REQUEST_TREE_HEIGHT)?,
            process: MerkleTree::new(PROCESS_TREE_HEIGHT)?,
            cursor: [0u8; 32],
        })
    }

    /// Snapshot a fresh deployment starts from.
    pub fn genesis() -> Result<StateSnapshot, RollupError> {
        Ok(Self::new()?.snapshot())
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            member_root: self.members.root(),
            setting_root: self.settings.root(),
            key_root: self.keys.root(),
            contribution_root: self.contributions.root(),
            request_root: self.requests.root(),
            process_root: self.process.root(),
            cursor: self.cursor,
        }
    }

    pub fn cursor(&self) -> [u8; 32] {
        self.cursor
    }

    pub fn is_processed(&self, position: u64) -> bool {
        self.process.leaf(position as usize) != PROCESS_UNSEEN
    }

    pub fn member_slot(&self, group_index: u64, member_index: u64) -> [u8; 32] {
        self.members
            .member_leaf(group_index as usize, member_index as usize)
    }

    pub fn member_subtree_root(&self, group_index: u64) -> [u8; 32] {
        self.members.subtree_root(group_index as usize)
    }

    pub fn empty_member_subtree_root(&self) -> [u8; 32] {
        self.members.empty_subtree_root()
    }

    pub fn setting_slot(&self, group_index: u64) -> [u8; 32] {
        self.settings.leaf(group_index as usize)
    }

    pub fn key_slot(&self, group_index: u64) -> [u8; 32] {
        self.keys.leaf(group_index as usize)
    }

    pub fn contribution_slot(&self, group_index: u64, member_index: u64) -> [u8; 32] {
        self.contributions
            .member_leaf(group_index as usize, member_index as usize)
    }

    pub fn request_slot(&self, request_index: u64) -> [u8; 32] {
        self.requests.leaf(request_index as usize)
    }

    fn process_witness(&self, position: u64) -> Result<LeafWitness, RollupError> {
        let index = position as usize;
        Ok(LeafWitness {
            proof: self.process.get_proof_of_leaf(index)?,
            prior_leaf: self.process.leaf(index),
        })
    }

    fn setting_witness(&self, group_index: u64) -> Result<LeafWitness, RollupError> {
        let index = group_index as usize;
        Ok(LeafWitness {
            proof: self.settings.get_proof_of_leaf(index)?,
            prior_leaf: self.settings.leaf(index),
        })
    }

    fn key_witness(&self, group_index: u64) -> Result<LeafWitness, RollupError> {
        let index = group_index as usize;
        Ok(LeafWitness {
            proof: self.keys.get_proof_of_leaf(index)?,
            prior_leaf: self.keys.leaf(index),
        })
    }

    /// Builds the witness bundle one step needs for `entry`, consistent
    /// with the current roots.
    pub fn witnesses_for(&self, entry: &LogEntry) -> Result<StepWitnesses, RollupError> {
        let process = self.process_witness(entry.position)?;
        match &entry.action {
            Action::CreateGroup { group_index, .. } => {
                let group_index = *group_index as u64;
                Ok(StepWitnesses::CreateGroup(CreateGroupWitnesses {
                    process,
                    setting: self.settings.get_proof_of_leaf(group_index as usize)?,
                    key: self.keys.get_proof_of_leaf(group_index as usize)?,
                    member_group: self.members.get_group_proof(group_index as usize)?,
                }))
            }
            Action::JoinGroup {
                group_index,
                member_index,
                ..
            } => Ok(StepWitnesses::JoinGroup(MembershipWitnesses {
                process,
                member: self
                    .members
                    .get_proof(*group_index as usize, *member_index as usize)?,
            })),
            Action::LeaveGroup {
                group_index,
                member_index,
                ..
            } => Ok(StepWitnesses::LeaveGroup(MembershipWitnesses {
                process,
                member: self
                    .members
                    .get_proof(*group_index as usize, *member_index as usize)?,
            })),
            Action::SubmitContribution {
                group_index,
                member_index,
                ..
            } => Ok(StepWitnesses::SubmitContribution(ContributionWitnesses {
                process,
                setting: self.setting_witness(*group_index as u64)?,
                key: self.key_witness(*group_index as u64)?,
                contribution: self
                    .contributions
                    .get_proof(*group_index as usize, *member_index as usize)?,
            })),
            Action::DeprecateKey { group_index } => {
                Ok(StepWitnesses::DeprecateKey(DeprecateWitnesses {
                    process,
                    key: self.key_witness(*group_index as u64)?,
                }))
            }
            Action::CreateRequest { request_index, .. } => {
                Ok(StepWitnesses::CreateRequest(RequestWitnesses {
                    process,
                    request: self.requests.get_proof_of_leaf(*request_index as usize)?,
                }))
            }
            Action::ResolveRequest { request_index, .. } => {
                Ok(StepWitnesses::ResolveRequest(RequestWitnesses {
                    process,
                    request: self.requests.get_proof_of_leaf(*request_index as usize)?,
                }))
            }
        }
    }

    /// Mirrors the writes of one executed step and adopts its cursor.
    pub fn apply(&mut self, outcome: &StepOutcome) -> Result<(), RollupError> {
        for write in &outcome.writes {
            match write {
                StoreWrite::Member {
                    group_index,
                    member_index,
                    leaf,
                } => self
                    .members
                    .update(*group_index as usize, *member_index as usize, *leaf)?,
                StoreWrite::MemberSubtreeInit { group_index, size } => self.members.init_subtree(
                    *group_index as usize,
                    &vec![MEMBER_SLOT_INACTIVE; *size as usize],
                )?,
                StoreWrite::Setting { group_index, leaf } => {
                    self.settings.update(leaf, *group_index as usize)?
                }
                StoreWrite::Key { group_index, leaf } => {
                    self.keys.update(leaf, *group_index as usize)?
                }
                StoreWrite::Contribution {
                    group_index,
                    member_index,
                    leaf,
                } => self
                    .contributions
                    .update(*group_index as usize, *member_index as usize, *leaf)?,
                StoreWrite::Request {
                    request_index,
                    leaf,
                } => self.requests.update(leaf, *request_index as usize)?,
                StoreWrite::Process { position, leaf } => {
                    self.process.update(leaf, *position as usize)?
                }
            }
        }
        self.cursor = outcome.output.next.cursor;
        Ok(())
    }
}
