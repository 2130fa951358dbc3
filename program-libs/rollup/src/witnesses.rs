use borsh::{BorshDeserialize, BorshSerialize};
use quorum_merkle_tree::{MerkleProof, TwoLevelProof};

/// Witness plus the claimed prior leaf it authenticates. Used where the
/// expected prior value is dynamic (process marks, key state, settings);
/// the root check inside the step is what makes the claim trustworthy.
/// Kinds whose expected prior is a known constant carry the bare proof and
/// recompute the value in-step.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LeafWitness {
    pub proof: MerkleProof,
    pub prior_leaf: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CreateGroupWitnesses {
    pub process: LeafWitness,
    pub setting: MerkleProof,
    pub key: MerkleProof,
    /// Level-1 witness of the members store; must prove the empty subtree
    /// root at the group index.
    pub member_group: MerkleProof,
}

/// Shared by join and leave, both touch one member slot.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MembershipWitnesses {
    pub process: LeafWitness,
    pub member: TwoLevelProof,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ContributionWitnesses {
    pub process: LeafWitness,
    pub setting: LeafWitness,
    pub key: LeafWitness,
    pub contribution: TwoLevelProof,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DeprecateWitnesses {
    pub process: LeafWitness,
    pub key: LeafWitness,
}

/// Shared by request creation and resolution, both touch one request slot.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RequestWitnesses {
    pub process: LeafWitness,
    pub request: MerkleProof,
}

/// Witness bundle for one step, one variant per action kind.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum StepWitnesses {
    CreateGroup(CreateGroupWitnesses),
    JoinGroup(MembershipWitnesses),
    LeaveGroup(MembershipWitnesses),
    SubmitContribution(ContributionWitnesses),
    DeprecateKey(DeprecateWitnesses),
    CreateRequest(RequestWitnesses),
    ResolveRequest(RequestWitnesses),
}
