//! The sub-verifiers the orchestrator hands its challenges to.
//!
//! Checking the PLONK identity at `zeta` and checking the FRI openings are
//! outside this crate. Implementations receive range-checked openings and the
//! derived challenges, and emit their constraints through the same chip.

use ark_ff::PrimeField;

use crate::{
    error::VerifierResult,
    fri::{FriInstanceInfo, FriOpenings},
    gadgets::{GoldilocksChip, HashOutVar, MerkleCapVar, QuadraticExtensionVar},
    gates::Gate,
    proof::{FriChallengesVar, FriProofVar, OpeningSetVar, ProofChallengesVar},
};

/// Checks the vanishing-polynomial identity, including the permutation argument.
pub trait PlonkVerifierChip<F: PrimeField> {
    fn verify(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        gates: &[Box<dyn Gate<F>>],
        challenges: &ProofChallengesVar<F>,
        openings: &OpeningSetVar<F>,
        public_inputs_hash: &HashOutVar<F>,
    ) -> VerifierResult<()>;
}

/// Checks a batch FRI opening proof.
pub trait FriVerifierChip<F: PrimeField> {
    fn verify_fri_proof(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        instance: &FriInstanceInfo<QuadraticExtensionVar<F>>,
        openings: &FriOpenings<QuadraticExtensionVar<F>>,
        challenges: &FriChallengesVar<F>,
        initial_merkle_caps: &[MerkleCapVar<F>],
        proof: &FriProofVar<F>,
    ) -> VerifierResult<()>;
}
