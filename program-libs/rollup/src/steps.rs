use quorum_action::{Action, LogEntry};
use quorum_hasher::{Hasher, Poseidon};
use quorum_merkle_tree::{subtree_root_with_leaves, MerkleProof};

use crate::{
    constants::MEMBER_TREE_HEIGHT,
    errors::RollupError,
    leaves::{
        active_member_leaf, contribution_leaf, pack_key_leaf, pack_setting_leaf, requested_leaf,
        resolved_leaf, unpack_key_leaf, unpack_setting_leaf, KeyState, MEMBER_SLOT_INACTIVE,
        PROCESS_APPLIED, PROCESS_SKIPPED, PROCESS_UNSEEN,
    },
    output::RollupOutput,
    witnesses::{
        ContributionWitnesses, CreateGroupWitnesses, DeprecateWitnesses, LeafWitness,
        MembershipWitnesses, RequestWitnesses, StepWitnesses,
    },
};

/// One slot mutation a step commits to, mirrored into the indexer arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    Member {
        group_index: u64,
        member_index: u64,
        leaf: [u8; 32],
    },
    /// Fresh member subtree with `size` initialized-inactive slots.
    MemberSubtreeInit { group_index: u64, size: u64 },
    Setting { group_index: u64, leaf: [u8; 32] },
    Key { group_index: u64, leaf: [u8; 32] },
    Contribution {
        group_index: u64,
        member_index: u64,
        leaf: [u8; 32],
    },
    Request { request_index: u64, leaf: [u8; 32] },
    Process { position: u64, leaf: [u8; 32] },
}

/// Result of one step: the new public output, whether the action took
/// effect, and the writes the indexer must mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub output: RollupOutput,
    pub applied: bool,
    pub writes: Vec<StoreWrite>,
}

enum ProcessGate {
    AlreadyProcessed,
    Fresh {
        applied_root: [u8; 32],
        skipped_root: [u8; 32],
    },
}

/// The process witness is validated first for every kind. A bad process
/// witness is a malformed proof input and always a hard error; an already
/// processed action is a pure pass-through regardless of kind.
fn check_process(
    prev: &RollupOutput,
    position: u64,
    witness: &LeafWitness,
) -> Result<ProcessGate, RollupError> {
    let actual = witness.proof.leaf_index();
    if actual != position {
        return Err(RollupError::WitnessIndexMismatch {
            expected: position,
            actual,
        });
    }
    if !witness
        .proof
        .matches::<Poseidon>(&prev.next.process_root, &witness.prior_leaf)?
    {
        return Err(RollupError::ProcessWitnessMismatch(position));
    }
    if witness.prior_leaf != PROCESS_UNSEEN {
        return Ok(ProcessGate::AlreadyProcessed);
    }
    Ok(ProcessGate::Fresh {
        applied_root: witness.proof.root_from_leaf::<Poseidon>(&PROCESS_APPLIED)?,
        skipped_root: witness.proof.root_from_leaf::<Poseidon>(&PROCESS_SKIPPED)?,
    })
}

fn check_witness_index(proof: &MerkleProof, expected: u64) -> Result<(), RollupError> {
    let actual = proof.leaf_index();
    if actual != expected {
        return Err(RollupError::WitnessIndexMismatch { expected, actual });
    }
    Ok(())
}

fn advance_cursor(cursor: &[u8; 32], action_hash: &[u8; 32]) -> Result<[u8; 32], RollupError> {
    Ok(Poseidon::hashv(&[cursor, action_hash])?)
}

/// Already-processed action: every root and the cursor carry over, only the
/// step count moves.
fn pass_through(prev: &RollupOutput) -> StepOutcome {
    StepOutcome {
        output: RollupOutput {
            initial: prev.initial,
            next: prev.next,
            num_actions: prev.num_actions + 1,
        },
        applied: false,
        writes: vec![],
    }
}

/// Stale or misdirected soft-skip action: the affected store roots and the
/// cursor pass through unchanged, the action is consumed as skipped and is
/// not folded into the cursor.
fn skip(prev: &RollupOutput, position: u64, skipped_root: [u8; 32]) -> StepOutcome {
    let mut next = prev.next;
    next.process_root = skipped_root;
    StepOutcome {
        output: RollupOutput {
            initial: prev.initial,
            next,
            num_actions: prev.num_actions + 1,
        },
        applied: false,
        writes: vec![StoreWrite::Process {
            position,
            leaf: PROCESS_SKIPPED,
        }],
    }
}

/// Executes one rollup step against the carried output.
///
/// The hard-fail/soft-skip split per kind is security policy: creation
/// kinds abort the whole fold on a failed precondition, transition kinds on
/// existing entities degrade to no-ops so one stale action cannot block the
/// batch.
pub fn execute_step(
    prev: &RollupOutput,
    entry: &LogEntry,
    witnesses: &StepWitnesses,
) -> Result<StepOutcome, RollupError> {
    match (&entry.action, witnesses) {
        (Action::CreateGroup { .. }, StepWitnesses::CreateGroup(w)) => {
            step_create_group(prev, entry, w)
        }
        (Action::JoinGroup { .. }, StepWitnesses::JoinGroup(w)) => step_join_group(prev, entry, w),
        (Action::LeaveGroup { .. }, StepWitnesses::LeaveGroup(w)) => {
            step_leave_group(prev, entry, w)
        }
        (Action::SubmitContribution { .. }, StepWitnesses::SubmitContribution(w)) => {
            step_submit_contribution(prev, entry, w)
        }
        (Action::DeprecateKey { .. }, StepWitnesses::DeprecateKey(w)) => {
            step_deprecate_key(prev, entry, w)
        }
        (Action::CreateRequest { .. }, StepWitnesses::CreateRequest(w)) => {
            step_create_request(prev, entry, w)
        }
        (Action::ResolveRequest { .. }, StepWitnesses::ResolveRequest(w)) => {
            step_resolve_request(prev, entry, w)
        }
        _ => Err(RollupError::WitnessKindMismatch),
    }
}

fn step_create_group(
    prev: &RollupOutput,
    entry: &LogEntry,
    w: &CreateGroupWitnesses,
) -> Result<StepOutcome, RollupError> {
    let Action::CreateGroup {
        group_index,
        threshold,
        size,
    } = &entry.action
    else {
        return Err(RollupError::WitnessKindMismatch);
    };
    let (group_index, threshold, size) = (*group_index as u64, *threshold as u64, *size as u64);

    let gate = check_process(prev, entry.position, &w.process)?;
    let ProcessGate::Fresh { applied_root, .. } = gate else {
        return Ok(pass_through(prev));
    };

    if threshold < 1 || threshold > size || size > 1u64 << MEMBER_TREE_HEIGHT {
        return Err(RollupError::InvalidGroupParameters { threshold, size });
    }

    check_witness_index(&w.setting, group_index)?;
    check_witness_index(&w.key, group_index)?;
    check_witness_index(&w.member_group, group_index)?;

    // The group must not exist in any store.
    if !w
        .setting
        .matches::<Poseidon>(&prev.next.setting_root, &[0u8; 32])?
    {
        return Err(RollupError::GroupAlreadyExists(group_index));
    }
    if !w.key.matches::<Poseidon>(&prev.next.key_root, &[0u8; 32])? {
        return Err(RollupError::GroupAlreadyExists(group_index));
    }
    let empty_subtree_root = Poseidon::zero_bytes()[MEMBER_TREE_HEIGHT];
    if !w
        .member_group
        .matches::<Poseidon>(&prev.next.member_root, &empty_subtree_root)?
    {
        return Err(RollupError::GroupAlreadyExists(group_index));
    }

    let member_subtree_root = subtree_root_with_leaves::<Poseidon>(
        &vec![MEMBER_SLOT_INACTIVE; size as usize],
        MEMBER_TREE_HEIGHT,
    )?;
    let setting_leaf = pack_setting_leaf(threshold, size);
    let key_leaf = pack_key_leaf(KeyState::Contribution, 0);

    let mut next = prev.next;
    next.member_root = w.member_group.root_from_leaf::<Poseidon>(&member_subtree_root)?;
    next.setting_root = w.setting.root_from_leaf::<Poseidon>(&setting_leaf)?;
    next.key_root = w.key.root_from_leaf::<Poseidon>(&key_leaf)?;
    next.process_root = applied_root;
    next.cursor = advance_cursor(&prev.next.cursor, &entry.action_hash)?;

    Ok(StepOutcome {
        output: RollupOutput {
            initial: prev.initial,
            next,
            num_actions: prev.num_actions + 1,
        },
        applied: true,
        writes: vec![
            StoreWrite::MemberSubtreeInit { group_index, size },
            StoreWrite::Setting {
                group_index,
                leaf: setting_leaf,
            },
            StoreWrite::Key {
                group_index,
                leaf: key_leaf,
            },
            StoreWrite::Process {
                position: entry.position,
                leaf: PROCESS_APPLIED,
            },
        ],
    })
}

fn step_join_group(
    prev: &RollupOutput,
    entry: &LogEntry,
    w: &MembershipWitnesses,
) -> Result<StepOutcome, RollupError> {
    let Action::JoinGroup {
        group_index,
        member_index,
        public_key,
    } = &entry.action
    else {
        return Err(RollupError::WitnessKindMismatch);
    };

    let gate = check_process(prev, entry.position, &w.process)?;
    let ProcessGate::Fresh {
        applied_root,
        skipped_root,
    } = gate
    else {
        return Ok(pass_through(prev));
    };

    // Only an initialized, not-yet-joined slot can be joined.
    let invalid = w.member.group_index() != *group_index as u64
        || w.member.member_index() != *member_index as u64
        || !w
            .member
            .matches::<Poseidon>(&prev.next.member_root, &MEMBER_SLOT_INACTIVE)?;
    if invalid {
        return Ok(skip(prev, entry.position, skipped_root));
    }

    let leaf = active_member_leaf(public_key)?;
    let mut next = prev.next;
    next.member_root = w.member.root_from_member_leaf::<Poseidon>(&leaf)?;
    next.process_root = applied_root;
    next.cursor = advance_cursor(&prev.next.cursor, &entry.action_hash)?;

    Ok(StepOutcome {
        output: RollupOutput {
            initial: prev.initial,
            next,
            num_actions: prev.num_actions + 1,
        },
        applied: true,
        writes: vec![
            StoreWrite::Member {
                group_index: *group_index as u64,
                member_index: *member_index as u64,
                leaf,
            },
            StoreWrite::Process {
                position: entry.position,
                leaf: PROCESS_APPLIED,
            },
        ],
    })
}

fn step_leave_group(
    prev: &RollupOutput,
    entry: &LogEntry,
    w: &MembershipWitnesses,
) -> Result<StepOutcome, RollupError> {
    let Action::LeaveGroup {
        group_index,
        member_index,
        public_key,
    } = &entry.action
    else {
        return Err(RollupError::WitnessKindMismatch);
    };

    let gate = check_process(prev, entry.position, &w.process)?;
    let ProcessGate::Fresh {
        applied_root,
        skipped_root,
    } = gate
    else {
        return Ok(pass_through(prev));
    };

    // Leaving requires the slot to hold exactly the presented key.
    let expected_prior = active_member_leaf(public_key)?;
    let invalid = w.member.group_index() != *group_index as u64
        || w.member.member_index() != *member_index as u64
        || !w
            .member
            .matches::<Poseidon>(&prev.next.member_root, &expected_prior)?;
    if invalid {
        return Ok(skip(prev, entry.position, skipped_root));
    }

    let mut next = prev.next;
    next.member_root = w
        .member
        .root_from_member_leaf::<Poseidon>(&MEMBER_SLOT_INACTIVE)?;
    next.process_root = applied_root;
    next.cursor = advance_cursor(&prev.next.cursor, &entry.action_hash)?;

    Ok(StepOutcome {
        output: RollupOutput {
            initial: prev.initial,
            next,
            num_actions: prev.num_actions + 1,
        },
        applied: true,
        writes: vec![
            StoreWrite::Member {
                group_index: *group_index as u64,
                member_index: *member_index as u64,
                leaf: MEMBER_SLOT_INACTIVE,
            },
            StoreWrite::Process {
                position: entry.position,
                leaf: PROCESS_APPLIED,
            },
        ],
    })
}

fn step_submit_contribution(
    prev: &RollupOutput,
    entry: &LogEntry,
    w: &ContributionWitnesses,
) -> Result<StepOutcome, RollupError> {
    let Action::SubmitContribution {
        group_index,
        member_index,
        commitment,
    } = &entry.action
    else {
        return Err(RollupError::WitnessKindMismatch);
    };
    let group_index = *group_index as u64;
    let member_index = *member_index as u64;

    let gate = check_process(prev, entry.position, &w.process)?;
    let ProcessGate::Fresh {
        applied_root,
        skipped_root,
    } = gate
    else {
        return Ok(pass_through(prev));
    };

    // The claimed settings and key leaves are trusted only once they
    // authenticate against the carried roots.
    let mut invalid = w.setting.proof.leaf_index() != group_index
        || !w
            .setting
            .proof
            .matches::<Poseidon>(&prev.next.setting_root, &w.setting.prior_leaf)?;
    let (_threshold, size) = match unpack_setting_leaf(&w.setting.prior_leaf) {
        Ok(setting) => setting,
        Err(_) => {
            invalid = true;
            (0, 0)
        }
    };

    invalid |= w.key.proof.leaf_index() != group_index
        || !w
            .key
            .proof
            .matches::<Poseidon>(&prev.next.key_root, &w.key.prior_leaf)?;
    let (state, count) = match unpack_key_leaf(&w.key.prior_leaf) {
        Ok(key) => key,
        Err(_) => {
            invalid = true;
            (KeyState::Empty, 0)
        }
    };

    invalid |= state != KeyState::Contribution;
    invalid |= size == 0 || member_index >= size;
    invalid |= w.contribution.group_index() != group_index
        || w.contribution.member_index() != member_index
        || !w
            .contribution
            .matches::<Poseidon>(&prev.next.contribution_root, &[0u8; 32])?;
    if invalid {
        return Ok(skip(prev, entry.position, skipped_root));
    }

    let new_count = count + 1;
    let new_state = if new_count == size {
        KeyState::Active
    } else {
        KeyState::Contribution
    };
    let key_leaf = pack_key_leaf(new_state, new_count);
    let leaf = contribution_leaf(commitment)?;

    let mut next = prev.next;
    next.contribution_root = w.contribution.root_from_member_leaf::<Poseidon>(&leaf)?;
    next.key_root = w.key.proof.root_from_leaf::<Poseidon>(&key_leaf)?;
    next.process_root = applied_root;
    next.cursor = advance_cursor(&prev.next.cursor, &entry.action_hash)?;

    Ok(StepOutcome {
        output: RollupOutput {
            initial: prev.initial,
            next,
            num_actions: prev.num_actions + 1,
        },
        applied: true,
        writes: vec![
            StoreWrite::Contribution {
                group_index,
                member_index,
                leaf,
            },
            StoreWrite::Key {
                group_index,
                leaf: key_leaf,
            },
            StoreWrite::Process {
                position: entry.position,
                leaf: PROCESS_APPLIED,
            },
        ],
    })
}

fn step_deprecate_key(
    prev: &RollupOutput,
    entry: &LogEntry,
    w: &DeprecateWitnesses,
) -> Result<StepOutcome, RollupError> {
    let Action::DeprecateKey { group_index } = &entry.action else {
        return Err(RollupError::WitnessKindMismatch);
    };
    let group_index = *group_index as u64;

    let gate = check_process(prev, entry.position, &w.process)?;
    let ProcessGate::Fresh {
        applied_root,
        skipped_root,
    } = gate
    else {
        return Ok(pass_through(prev));
    };

    let mut invalid = w.key.proof.leaf_index() != group_index
        || !w
            .key
            .proof
            .matches::<Poseidon>(&prev.next.key_root, &w.key.prior_leaf)?;
    let (state, count) = match unpack_key_leaf(&w.key.prior_leaf) {
        Ok(key) => key,
        Err(_) => {
            invalid = true;
            (KeyState::Empty, 0)
        }
    };
    invalid |= state != KeyState::Active;
    if invalid {
        return Ok(skip(prev, entry.position, skipped_root));
    }

    let key_leaf = pack_key_leaf(KeyState::Deprecated, count);
    let mut next = prev.next;
    next.key_root = w.key.proof.root_from_leaf::<Poseidon>(&key_leaf)?;
    next.process_root = applied_root;
    next.cursor = advance_cursor(&prev.next.cursor, &entry.action_hash)?;

    Ok(StepOutcome {
        output: RollupOutput {
            initial: prev.initial,
            next,
            num_actions: prev.num_actions + 1,
        },
        applied: true,
        writes: vec![
            StoreWrite::Key {
                group_index,
                leaf: key_leaf,
            },
            StoreWrite::Process {
                position: entry.position,
                leaf: PROCESS_APPLIED,
            },
        ],
    })
}

fn step_create_request(
    prev: &RollupOutput,
    entry: &LogEntry,
    w: &RequestWitnesses,
) -> Result<StepOutcome, RollupError> {
    let Action::CreateRequest {
        request_index,
        group_index,
        accumulator,
    } = &entry.action
    else {
        return Err(RollupError::WitnessKindMismatch);
    };
    let request_index = *request_index as u64;

    let gate = check_process(prev, entry.position, &w.process)?;
    let ProcessGate::Fresh { applied_root, .. } = gate else {
        return Ok(pass_through(prev));
    };

    check_witness_index(&w.request, request_index)?;
    if !w
        .request
        .matches::<Poseidon>(&prev.next.request_root, &[0u8; 32])?
    {
        return Err(RollupError::RequestAlreadyExists(request_index));
    }

    let leaf = requested_leaf(*group_index as u64, accumulator)?;
    let mut next = prev.next;
    next.request_root = w.request.root_from_leaf::<Poseidon>(&leaf)?;
    next.process_root = applied_root;
    next.cursor = advance_cursor(&prev.next.cursor, &entry.action_hash)?;

    Ok(StepOutcome {
        output: RollupOutput {
            initial: prev.initial,
            next,
            num_actions: prev.num_actions + 1,
        },
        applied: true,
        writes: vec![
            StoreWrite::Request {
                request_index,
                leaf,
            },
            StoreWrite::Process {
                position: entry.position,
                leaf: PROCESS_APPLIED,
            },
        ],
    })
}

fn step_resolve_request(
    prev: &RollupOutput,
    entry: &LogEntry,
    w: &RequestWitnesses,
) -> Result<StepOutcome, RollupError> {
    let Action::ResolveRequest {
        request_index,
        group_index,
        accumulator,
        response,
    } = &entry.action
    else {
        return Err(RollupError::WitnessKindMismatch);
    };
    let request_index = *request_index as u64;

    let gate = check_process(prev, entry.position, &w.process)?;
    let ProcessGate::Fresh {
        applied_root,
        skipped_root,
    } = gate
    else {
        return Ok(pass_through(prev));
    };

    // Resolution must reference the open request by content; anything else
    // (absent, already resolved, different accumulator) is stale.
    let expected_prior = requested_leaf(*group_index as u64, accumulator)?;
    let invalid = w.request.leaf_index() != request_index
        || !w
            .request
            .matches::<Poseidon>(&prev.next.request_root, &expected_prior)?;
    if invalid {
        return Ok(skip(prev, entry.position, skipped_root));
    }

    let leaf = resolved_leaf(&expected_prior, response)?;
    let mut next = prev.next;
    next.request_root = w.request.root_from_leaf::<Poseidon>(&leaf)?;
    next.process_root = applied_root;
    next.cursor = advance_cursor(&prev.next.cursor, &entry.action_hash)?;

    Ok(StepOutcome {
        output: RollupOutput {
            initial: prev.initial,
            next,
            num_actions: prev.num_actions + 1,
        },
        applied: true,
        writes: vec![
            StoreWrite::Request {
                request_index,
                leaf,
            },
            StoreWrite::Process {
                position: entry.position,
                leaf: PROCESS_APPLIED,
            },
        ],
    })
}
