//! The verifier circuit: range checks, public-input hashing, the transcript,
//! then delegation to the PLONK and FRI sub-verifiers.

use std::marker::PhantomData;

use ark_ff::PrimeField;
use goldilocks_field::{Fq, Fq2};
use log::debug;
use wrap_snarky::prelude::*;

use crate::{
    challenger::ChallengerChip,
    config::{CommonCircuitData, VerifierOnlyCircuitData},
    error::{ConfigError, ProofShapeError, VerifierResult},
    gadgets::{
        goldilocks::{read_extension, read_goldilocks},
        poseidon2, GoldilocksChip, GoldilocksVar, HashOutVar, MerkleCapVar, QuadraticExtensionVar,
    },
    gates::{gate_from_id, Gate},
    plonk::{FriVerifierChip, PlonkVerifierChip},
    proof::{
        FriChallenges, NativeProofWithPublicInputs, ProofChallenges, ProofChallengesVar, ProofVar,
        VerifierDataVar,
    },
};

/// Smallest outer field the Goldilocks emulation is run over. Unreduced
/// extension products reach 134 bits before they are decomposed.
pub const MIN_NATIVE_FIELD_BITS: u32 = 140;

pub struct VerifierChip<F: PrimeField, P, R> {
    common: CommonCircuitData,
    gates: Vec<Box<dyn Gate<F>>>,
    plonk: P,
    fri: R,
    _field: PhantomData<F>,
}

impl<F, P, R> VerifierChip<F, P, R>
where
    F: PrimeField,
    P: PlonkVerifierChip<F>,
    R: FriVerifierChip<F>,
{
    /// Validates the circuit data once. Every later failure is a property of
    /// the proof and makes the circuit unsatisfiable instead.
    pub fn new(common: CommonCircuitData, plonk: P, fri: R) -> Result<Self, ConfigError> {
        if F::MODULUS_BIT_SIZE < MIN_NATIVE_FIELD_BITS {
            return Err(ConfigError::NativeFieldTooSmall {
                required: MIN_NATIVE_FIELD_BITS,
                got: F::MODULUS_BIT_SIZE,
            });
        }
        common.validate()?;

        let mut gates = vec![];
        for id in &common.gate_ids {
            if let Some(gate) = gate_from_id(id, common.config.num_wires)? {
                gates.push(gate);
            }
        }
        debug!(
            "verifier over a {}-bit field, {} gate template(s)",
            F::MODULUS_BIT_SIZE,
            gates.len()
        );

        Ok(Self {
            common,
            gates,
            plonk,
            fri,
            _field: PhantomData,
        })
    }

    pub fn common(&self) -> &CommonCircuitData {
        &self.common
    }

    pub fn gates(&self) -> &[Box<dyn Gate<F>>] {
        &self.gates
    }

    pub fn plonk(&self) -> &P {
        &self.plonk
    }

    pub fn fri(&self) -> &R {
        &self.fri
    }

    pub fn get_public_inputs_hash(
        &self,
        gl: &mut GoldilocksChip<'_, F>,
        public_inputs: &[GoldilocksVar<F>],
    ) -> SnarkyResult<HashOutVar<F>> {
        poseidon2::hash_no_pad(gl, public_inputs)
    }

    /// Range checks every proof element that is used as a Goldilocks value.
    ///
    /// Public inputs are not checked here; bounding them is up to whoever
    /// supplies them.
    pub fn range_check_proof(
        &self,
        gl: &mut GoldilocksChip<'_, F>,
        proof: &ProofVar<F>,
    ) -> SnarkyResult<()> {
        for cap in [
            &proof.wires_cap,
            &proof.plonk_zs_partial_products_cap,
            &proof.quotient_polys_cap,
        ] {
            range_check_cap(gl, cap)?;
        }

        for value in proof.openings.to_fri_openings().values() {
            gl.range_check_extension(value)?;
        }

        let fri = &proof.opening_proof;
        for cap in &fri.commit_phase_merkle_caps {
            range_check_cap(gl, cap)?;
        }
        for round in &fri.query_round_proofs {
            for (leaf, path) in &round.initial_trees_proof.evals_proofs {
                for element in leaf {
                    gl.range_check(element)?;
                }
                range_check_cap(gl, &path.siblings)?;
            }
            for step in &round.steps {
                for eval in &step.evals {
                    gl.range_check_extension(eval)?;
                }
                range_check_cap(gl, &step.merkle_proof.siblings)?;
            }
        }
        for coeff in &fri.final_poly {
            gl.range_check_extension(coeff)?;
        }
        gl.range_check(&fri.pow_witness)
    }

    /// Derives every challenge, observing in the fixed transcript order.
    pub fn get_challenges(
        &self,
        gl: &mut GoldilocksChip<'_, F>,
        proof: &ProofVar<F>,
        public_inputs_hash: &HashOutVar<F>,
        verifier_data: &VerifierDataVar<F>,
    ) -> VerifierResult<ProofChallengesVar<F>> {
        let num_challenges = self.common.num_challenges();
        let mut challenger = ChallengerChip::new(gl)?;

        for element in self.common.fri_params.to_transcript_elements()? {
            challenger.observe_element(gl, &GoldilocksVar::constant(element))?;
        }

        challenger.observe_bn254_hash(gl, &verifier_data.circuit_digest)?;
        challenger.observe_hash(gl, public_inputs_hash)?;

        challenger.observe_cap(gl, &proof.wires_cap)?;
        let plonk_betas = challenger.get_n_challenges(gl, num_challenges)?;
        let plonk_gammas = challenger.get_n_challenges(gl, num_challenges)?;

        challenger.observe_cap(gl, &proof.plonk_zs_partial_products_cap)?;
        let plonk_alphas = challenger.get_n_challenges(gl, num_challenges)?;

        challenger.observe_cap(gl, &proof.quotient_polys_cap)?;
        let plonk_zeta = challenger.get_extension_challenge(gl)?;

        challenger.observe_openings(gl, &proof.openings.to_fri_openings())?;

        let fri = &proof.opening_proof;
        let fri_challenges = challenger.get_fri_challenges(
            gl,
            &fri.commit_phase_merkle_caps,
            &fri.final_poly,
            &fri.pow_witness,
            &self.common.fri_params,
        )?;
        debug!("derived {num_challenges} challenge(s) per PLONK batch");

        Ok(ProofChallenges {
            plonk_betas,
            plonk_gammas,
            plonk_alphas,
            plonk_zeta,
            fri_challenges,
        })
    }

    /// Emits the whole verification and returns the derived challenges.
    pub fn verify(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        proof: &ProofVar<F>,
        public_inputs: &[GoldilocksVar<F>],
        verifier_data: &VerifierDataVar<F>,
    ) -> VerifierResult<ProofChallengesVar<F>> {
        self.range_check_proof(gl, proof)?;

        let public_inputs_hash = self.get_public_inputs_hash(gl, public_inputs)?;
        let challenges = self.get_challenges(gl, proof, &public_inputs_hash, verifier_data)?;

        self.plonk.verify(
            gl,
            &self.gates,
            &challenges,
            &proof.openings,
            &public_inputs_hash,
        )?;

        let initial_merkle_caps = [
            verifier_data.constants_sigmas_cap.clone(),
            proof.wires_cap.clone(),
            proof.plonk_zs_partial_products_cap.clone(),
            proof.quotient_polys_cap.clone(),
        ];
        let instance = self
            .common
            .get_fri_instance_circuit(gl, &challenges.plonk_zeta)?;
        self.fri.verify_fri_proof(
            gl,
            &instance,
            &proof.openings.to_fri_openings(),
            &challenges.fri_challenges,
            &initial_merkle_caps,
            &proof.opening_proof,
        )?;

        Ok(challenges)
    }

    /// Checks the proof's shape, allocates it and verifies it.
    ///
    /// Shape errors are returned before any constraint is emitted. In compile
    /// mode pass [crate::proof::NativeProof::dummy] to get the circuit shared
    /// by every proof of this shape.
    pub fn verify_proof_with_public_inputs(
        &mut self,
        sys: &mut RunState<F>,
        proof: &NativeProofWithPublicInputs,
        verifier_data: &VerifierOnlyCircuitData,
    ) -> VerifierResult<ProofChallengesVar<F>> {
        proof.validate_shape(&self.common)?;
        if verifier_data.num_cap_elements() != self.common.fri_params.config.num_cap_elements() {
            return Err(ProofShapeError::Length {
                what: "constants and sigmas cap",
                expected: self.common.fri_params.config.num_cap_elements(),
                got: verifier_data.num_cap_elements(),
            }
            .into());
        }

        let mut gl = GoldilocksChip::new(sys);
        let verifier_data = verifier_data.alloc(&mut gl)?;
        let proof = proof.alloc(&mut gl)?;
        let challenges = self.verify(&mut gl, &proof.proof, &proof.public_inputs, &verifier_data)?;

        debug!(
            "verifier circuit: {} constraints, {} variables",
            gl.sys().num_constraints(),
            gl.sys().num_vars()
        );
        Ok(challenges)
    }
}

fn range_check_cap<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    cap: &MerkleCapVar<F>,
) -> SnarkyResult<()> {
    for hash in cap {
        for element in hash {
            gl.range_check(element)?;
        }
    }
    Ok(())
}

/// Reads circuit challenges back as native values, in witness mode.
pub fn read_challenges<F: PrimeField>(
    env: &dyn WitnessGeneration<F>,
    challenges: &ProofChallengesVar<F>,
) -> ProofChallenges<Fq, Fq2> {
    let base = |x: &GoldilocksVar<F>| read_goldilocks(env, x);
    let ext = |x: &QuadraticExtensionVar<F>| read_extension(env, x);
    let fri = &challenges.fri_challenges;
    ProofChallenges {
        plonk_betas: challenges.plonk_betas.iter().map(base).collect(),
        plonk_gammas: challenges.plonk_gammas.iter().map(base).collect(),
        plonk_alphas: challenges.plonk_alphas.iter().map(base).collect(),
        plonk_zeta: ext(&challenges.plonk_zeta),
        fri_challenges: FriChallenges {
            fri_alpha: ext(&fri.fri_alpha),
            fri_betas: fri.fri_betas.iter().map(ext).collect(),
            fri_pow_response: base(&fri.fri_pow_response),
            fri_query_indices: fri.fri_query_indices.iter().map(base).collect(),
        },
    }
}
