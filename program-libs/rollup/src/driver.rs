use quorum_action::LogEntry;
use tracing::debug;

use crate::{
    arena::StoreArena,
    backend::{RollupBackend, RollupProof},
    errors::RollupError,
    output::RollupOutput,
    steps::execute_step,
};

/// Off-chain driver running the rollup program action by action.
///
/// The fold is explicit: the accumulated proof is verified before every
/// extension, so any agent holding a valid intermediate proof can continue
/// the chain. The driver waits on nothing but the backend; there is no
/// suspension inside the proof logic itself.
pub struct RollupDriver<'a, B>
where
    B: RollupBackend,
{
    backend: &'a B,
}

impl<'a, B> RollupDriver<'a, B>
where
    B: RollupBackend,
{
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Init step: adopts the arena's current snapshot as the identity
    /// output. The arena must mirror the contract state the final proof
    /// will be applied against.
    pub fn prove_init(&self, arena: &StoreArena) -> Result<RollupProof, RollupError> {
        let output = RollupOutput::init(arena.snapshot());
        self.backend.prove_init(&output)
    }

    /// Folds one entry onto an accumulated proof.
    pub fn fold_step(
        &self,
        arena: &mut StoreArena,
        previous: &RollupProof,
        entry: &LogEntry,
    ) -> Result<RollupProof, RollupError> {
        self.backend.verify(previous)?;
        let witnesses = arena.witnesses_for(entry)?;
        let outcome = execute_step(&previous.output, entry, &witnesses)?;
        arena.apply(&outcome)?;
        debug_assert_eq!(arena.snapshot(), outcome.output.next);
        debug!(
            position = entry.position,
            kind = ?entry.action.kind(),
            applied = outcome.applied,
            "folded action"
        );
        self.backend.prove_step(previous, &outcome.output)
    }

    /// Folds a contiguous run of pending entries into one final proof.
    pub fn fold(
        &self,
        arena: &mut StoreArena,
        entries: &[LogEntry],
    ) -> Result<RollupProof, RollupError> {
        let mut proof = self.prove_init(arena)?;
        for entry in entries {
            proof = self.fold_step(arena, &proof, entry)?;
        }
        Ok(proof)
    }
}
