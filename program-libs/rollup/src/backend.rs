use borsh::{BorshDeserialize, BorshSerialize};
use quorum_hasher::{Hasher, Poseidon};

use crate::{errors::RollupError, leaves::be_word, output::RollupOutput};

/// One (possibly recursively composed) rollup proof over a public output.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RollupProof {
    pub output: RollupOutput,
    pub attestation: [u8; 32],
}

/// Seam to the succinct proof system. The backend owns zero-knowledge and
/// succinctness; the step logic in this crate is what it must enforce.
///
/// `prove_step` embeds verification of the previous proof, which is what
/// lets a single final proof vouch for an arbitrarily long fold.
pub trait RollupBackend {
    fn prove_init(&self, output: &RollupOutput) -> Result<RollupProof, RollupError>;
    fn prove_step(
        &self,
        previous: &RollupProof,
        output: &RollupOutput,
    ) -> Result<RollupProof, RollupError>;
    fn verify(&self, proof: &RollupProof) -> Result<(), RollupError>;
}

const ATTESTATION_DOMAIN: [u8; 32] = be_word(0x51554f52554d);

/// Development backend attesting outputs with a Poseidon tag. Stands in
/// for the succinct backend in tests and local drivers; it checks the
/// recursion bookkeeping it can see but proves nothing in zero knowledge.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }

    fn attest(&self, output: &RollupOutput) -> Result<[u8; 32], RollupError> {
        Ok(Poseidon::hashv(&[&ATTESTATION_DOMAIN, &output.digest()?])?)
    }
}

impl RollupBackend for MockBackend {
    fn prove_init(&self, output: &RollupOutput) -> Result<RollupProof, RollupError> {
        if output.initial != output.next || output.num_actions != 0 {
            return Err(RollupError::InvalidInitOutput);
        }
        Ok(RollupProof {
            output: *output,
            attestation: self.attest(output)?,
        })
    }

    fn prove_step(
        &self,
        previous: &RollupProof,
        output: &RollupOutput,
    ) -> Result<RollupProof, RollupError> {
        self.verify(previous)?;
        if output.initial != previous.output.initial
            || output.num_actions != previous.output.num_actions + 1
        {
            return Err(RollupError::BrokenProofChain);
        }
        Ok(RollupProof {
            output: *output,
            attestation: self.attest(output)?,
        })
    }

    fn verify(&self, proof: &RollupProof) -> Result<(), RollupError> {
        if self.attest(&proof.output)? != proof.attestation {
            return Err(RollupError::ProofVerificationFailed);
        }
        Ok(())
    }
}
