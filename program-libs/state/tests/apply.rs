use quorum_action::{Action, ActionLog, Element};
use quorum_rollup::{MockBackend, RollupDriver, StoreArena};
use quorum_state::{ContractConfig, StateContract, StateError};

fn element(tag: u64) -> Element {
    let mut element = [0u8; 32];
    element[24..].copy_from_slice(&tag.to_be_bytes());
    element
}

fn create_group(group_index: u16, threshold: u8, size: u8) -> Action {
    Action::CreateGroup {
        group_index,
        threshold,
        size,
    }
}

fn join(group_index: u16, member_index: u16, tag: u64) -> Action {
    Action::JoinGroup {
        group_index,
        member_index,
        public_key: [element(tag), element(tag + 1000)],
    }
}

fn genesis_contract() -> StateContract {
    StateContract::new(StoreArena::genesis().unwrap(), ContractConfig::default())
}

#[test]
fn test_apply_swaps_snapshot_and_bumps_sequence() {
    let backend = MockBackend::new();
    let driver = RollupDriver::new(&backend);
    let mut arena = StoreArena::new().unwrap();
    let mut contract = genesis_contract();
    let mut log = ActionLog::new();
    log.dispatch(create_group(3, 2, 3)).unwrap();
    log.dispatch(join(3, 1, 1)).unwrap();

    let proof = driver.fold(&mut arena, log.entries()).unwrap();
    let event = contract.apply(&backend, &proof).unwrap();

    assert_eq!(contract.snapshot(), &arena.snapshot());
    assert_eq!(contract.sequence_number(), 1);
    assert_eq!(event.sequence_number, 1);
    assert_eq!(event.num_actions, 2);
    assert_eq!(event.previous_cursor, [0u8; 32]);
    assert_eq!(event.cursor, arena.cursor());
}

#[test]
fn test_replayed_proof_is_rejected_without_state_change() {
    let backend = MockBackend::new();
    let driver = RollupDriver::new(&backend);
    let mut arena = StoreArena::new().unwrap();
    let mut contract = genesis_contract();
    let mut log = ActionLog::new();
    log.dispatch(create_group(3, 2, 3)).unwrap();

    let proof = driver.fold(&mut arena, log.entries()).unwrap();
    contract.apply(&backend, &proof).unwrap();

    let held = *contract.snapshot();
    assert_eq!(
        contract.apply(&backend, &proof),
        Err(StateError::StateMismatch)
    );
    assert_eq!(contract.snapshot(), &held);
    assert_eq!(contract.sequence_number(), 1);
}

#[test]
fn test_racing_applies_serialize_to_one_winner() {
    let backend = MockBackend::new();
    let driver = RollupDriver::new(&backend);
    let mut contract = genesis_contract();
    let mut log = ActionLog::new();
    log.dispatch(create_group(3, 2, 3)).unwrap();
    log.dispatch(join(3, 0, 1)).unwrap();

    // Two agents fold against the same committed snapshot.
    let mut arena_a = StoreArena::new().unwrap();
    let proof_a = driver.fold(&mut arena_a, log.entries()).unwrap();
    let mut arena_b = StoreArena::new().unwrap();
    let proof_b = driver.fold(&mut arena_b, &log.entries()[..1]).unwrap();

    contract.apply(&backend, &proof_a).unwrap();
    // The loser must rebase; its proof is rejected in full.
    assert_eq!(
        contract.apply(&backend, &proof_b),
        Err(StateError::StateMismatch)
    );
    assert_eq!(contract.sequence_number(), 1);
}

#[test]
fn test_overlapping_batches_apply_each_action_at_most_once() {
    let backend = MockBackend::new();
    let driver = RollupDriver::new(&backend);
    let mut arena = StoreArena::new().unwrap();
    let mut contract = genesis_contract();
    let mut log = ActionLog::new();
    log.dispatch(create_group(3, 2, 3)).unwrap();
    log.dispatch(join(3, 0, 1)).unwrap();
    log.dispatch(join(3, 1, 2)).unwrap();
    log.dispatch(join(3, 2, 3)).unwrap();

    let proof = driver.fold(&mut arena, &log.entries()[..2]).unwrap();
    contract.apply(&backend, &proof).unwrap();

    // The second batch re-covers the first two entries; the process record
    // turns them into pass-throughs instead of double-applying them.
    let proof = driver.fold(&mut arena, log.entries()).unwrap();
    contract.apply(&backend, &proof).unwrap();

    assert_eq!(contract.snapshot(), &arena.snapshot());
    assert_eq!(contract.sequence_number(), 2);
}

#[test]
fn test_batch_ceiling_boundary() {
    let backend = MockBackend::new();
    let driver = RollupDriver::new(&backend);
    let config = ContractConfig {
        max_actions_per_apply: 3,
    };

    // Exactly at the ceiling.
    let mut arena = StoreArena::new().unwrap();
    let mut contract = StateContract::new(StoreArena::genesis().unwrap(), config);
    let mut log = ActionLog::new();
    log.dispatch(create_group(3, 2, 3)).unwrap();
    log.dispatch(join(3, 0, 1)).unwrap();
    log.dispatch(join(3, 1, 2)).unwrap();
    let proof = driver.fold(&mut arena, log.entries()).unwrap();
    contract.apply(&backend, &proof).unwrap();

    // One past the ceiling.
    let mut arena = StoreArena::new().unwrap();
    let mut contract = StateContract::new(StoreArena::genesis().unwrap(), config);
    log.dispatch(join(3, 2, 3)).unwrap();
    let proof = driver.fold(&mut arena, log.entries()).unwrap();
    assert_eq!(
        contract.apply(&backend, &proof),
        Err(StateError::BatchCeilingExceeded {
            num_actions: 4,
            ceiling: 3,
        })
    );
    assert_eq!(contract.sequence_number(), 0);
}

#[test]
fn test_empty_batch_is_rejected() {
    let backend = MockBackend::new();
    let driver = RollupDriver::new(&backend);
    let arena = StoreArena::new().unwrap();
    let mut contract = genesis_contract();

    let proof = driver.prove_init(&arena).unwrap();
    assert_eq!(contract.apply(&backend, &proof), Err(StateError::EmptyBatch));
}

#[test]
fn test_sequential_applies_continue_where_previous_left_off() {
    let backend = MockBackend::new();
    let driver = RollupDriver::new(&backend);
    let config = ContractConfig {
        max_actions_per_apply: 2,
    };
    let mut arena = StoreArena::new().unwrap();
    let mut contract = StateContract::new(StoreArena::genesis().unwrap(), config);
    let mut log = ActionLog::new();
    log.dispatch(create_group(3, 2, 3)).unwrap();
    log.dispatch(join(3, 0, 1)).unwrap();
    log.dispatch(join(3, 1, 2)).unwrap();
    log.dispatch(join(3, 2, 3)).unwrap();

    // A pending log longer than the ceiling takes several applies.
    let proof = driver.fold(&mut arena, &log.entries()[..2]).unwrap();
    contract.apply(&backend, &proof).unwrap();
    let proof = driver.fold(&mut arena, &log.entries()[2..]).unwrap();
    contract.apply(&backend, &proof).unwrap();

    assert_eq!(contract.snapshot(), &arena.snapshot());
    assert_eq!(contract.sequence_number(), 2);
}
