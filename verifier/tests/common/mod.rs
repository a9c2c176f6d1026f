#![allow(dead_code)]

use ark_ff::PrimeField;
use plonky2_wrap_verifier::{
    config::{CircuitConfig, FriConfig, FriReductionStrategy},
    fri::{FriInstanceInfo, FriOpenings},
    gadgets::{GoldilocksChip, HashOutVar, MerkleCapVar, QuadraticExtensionVar},
    gates::Gate,
    proof::{FriChallengesVar, FriProofVar, OpeningSetVar, ProofChallengesVar, ProofWithPublicInputs},
    CommonCircuitData, FriVerifierChip, NativeProof, NativeProofWithPublicInputs,
    PlonkVerifierChip, VerifierOnlyCircuitData, VerifierResult,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const POSEIDON2_GATE_ID: &str = "Poseidon2Gate(PhantomData<GoldilocksField>)<WIDTH=12>";

pub const PROOF_OF_WORK_BITS: u32 = 2;

/// A small circuit: 4 rows, rate 1/2, a single cap element and two FRI folds.
pub fn common_data() -> CommonCircuitData {
    let config = CircuitConfig {
        fri_config: FriConfig {
            rate_bits: 1,
            cap_height: 0,
            proof_of_work_bits: PROOF_OF_WORK_BITS,
            reduction_strategy: FriReductionStrategy::ConstantArityBits(1, 0),
            num_query_rounds: 2,
        },
        ..CircuitConfig::standard_recursion_config()
    };
    let fri_params = config
        .fri_config
        .fri_params(2, false)
        .expect("valid FRI config");
    CommonCircuitData {
        config,
        fri_params,
        gate_ids: vec![
            "NoopGate".to_string(),
            POSEIDON2_GATE_ID.to_string(),
            "ArithmeticGate { num_ops: 20 }".to_string(),
        ],
        degree_bits: 2,
        quotient_degree_factor: 8,
        num_gate_constraints: 123,
        num_constants: 2,
        num_public_inputs: 3,
        k_is: (1..=80).collect(),
        num_partial_products: 9,
    }
}

pub fn verifier_data() -> VerifierOnlyCircuitData {
    let mut circuit_digest = [0u8; 32];
    for (i, byte) in circuit_digest.iter_mut().enumerate() {
        *byte = (i as u8).wrapping_mul(37);
    }
    // keep the digest below the BN254 modulus
    circuit_digest[0] = 0x01;
    VerifierOnlyCircuitData {
        constants_sigmas_cap: vec![[11, 12, 13, 14]],
        circuit_digest,
    }
}

fn element(rng: &mut StdRng) -> u64 {
    rng.gen_range(0..goldilocks_field::MODULUS)
}

fn fill_cap(rng: &mut StdRng, cap: &mut [[u64; 4]]) {
    for hash in cap {
        *hash = std::array::from_fn(|_| element(rng));
    }
}

fn fill_extensions(rng: &mut StdRng, values: &mut [[u64; 2]]) {
    for value in values {
        *value = [element(rng), element(rng)];
    }
}

/// A proof of the right shape filled with arbitrary canonical values. Its
/// proof-of-work witness is not ground yet.
pub fn random_proof(common: &CommonCircuitData, seed: u64) -> NativeProofWithPublicInputs {
    let rng = &mut StdRng::seed_from_u64(seed);
    let mut proof = NativeProof::dummy(common);

    fill_cap(rng, &mut proof.wires_cap);
    fill_cap(rng, &mut proof.plonk_zs_partial_products_cap);
    fill_cap(rng, &mut proof.quotient_polys_cap);

    let openings = &mut proof.openings;
    for values in [
        &mut openings.constants,
        &mut openings.plonk_sigmas,
        &mut openings.wires,
        &mut openings.plonk_zs,
        &mut openings.plonk_zs_next,
        &mut openings.partial_products,
        &mut openings.quotient_polys,
    ] {
        fill_extensions(rng, values);
    }

    let fri = &mut proof.opening_proof;
    for cap in &mut fri.commit_phase_merkle_caps {
        fill_cap(rng, cap);
    }
    for round in &mut fri.query_round_proofs {
        for (leaf, path) in &mut round.initial_trees_proof.evals_proofs {
            for x in leaf.iter_mut() {
                *x = element(rng);
            }
            fill_cap(rng, &mut path.siblings);
        }
        for step in &mut round.steps {
            fill_extensions(rng, &mut step.evals);
            fill_cap(rng, &mut step.merkle_proof.siblings);
        }
    }
    fill_extensions(rng, &mut fri.final_poly);

    let public_inputs = (0..common.num_public_inputs).map(|_| element(rng)).collect();
    ProofWithPublicInputs {
        proof,
        public_inputs,
    }
}

/// Searches for a proof-of-work witness that passes (or, with `valid` unset,
/// fails) the check the verifier performs.
pub fn grind<F: PrimeField>(
    proof: &mut NativeProofWithPublicInputs,
    verifier_data: &VerifierOnlyCircuitData,
    common: &CommonCircuitData,
    valid: bool,
) {
    let bits = common.fri_params.config.proof_of_work_bits;
    for witness in 0.. {
        proof.proof.opening_proof.pow_witness = witness;
        let challenges = proof
            .get_challenges::<F>(verifier_data, common)
            .expect("valid verifier data");
        if challenges.fri_challenges.pow_is_valid(bits) == valid {
            return;
        }
    }
}

/// Records what the PLONK sub-verifier is handed.
#[derive(Debug, Default)]
pub struct RecordingPlonkChip {
    pub calls: usize,
    pub gate_ids: Vec<String>,
    pub num_betas: usize,
    pub num_wire_openings: usize,
}

impl<F: PrimeField> PlonkVerifierChip<F> for RecordingPlonkChip {
    fn verify(
        &mut self,
        _gl: &mut GoldilocksChip<'_, F>,
        gates: &[Box<dyn Gate<F>>],
        challenges: &ProofChallengesVar<F>,
        openings: &OpeningSetVar<F>,
        _public_inputs_hash: &HashOutVar<F>,
    ) -> VerifierResult<()> {
        self.calls += 1;
        self.gate_ids = gates.iter().map(|gate| gate.id()).collect();
        self.num_betas = challenges.plonk_betas.len();
        self.num_wire_openings = openings.wires.len();
        Ok(())
    }
}

/// Records what the FRI sub-verifier is handed.
#[derive(Debug, Default)]
pub struct RecordingFriChip {
    pub calls: usize,
    pub num_initial_caps: usize,
    pub num_batches: usize,
    pub num_opened_values: usize,
    pub num_query_indices: usize,
    pub num_query_rounds: usize,
}

impl<F: PrimeField> FriVerifierChip<F> for RecordingFriChip {
    fn verify_fri_proof(
        &mut self,
        _gl: &mut GoldilocksChip<'_, F>,
        instance: &FriInstanceInfo<QuadraticExtensionVar<F>>,
        openings: &FriOpenings<QuadraticExtensionVar<F>>,
        challenges: &FriChallengesVar<F>,
        initial_merkle_caps: &[MerkleCapVar<F>],
        proof: &FriProofVar<F>,
    ) -> VerifierResult<()> {
        self.calls += 1;
        self.num_initial_caps = initial_merkle_caps.len();
        self.num_batches = instance.batches.len();
        self.num_opened_values = openings.values().count();
        self.num_query_indices = challenges.fri_query_indices.len();
        self.num_query_rounds = proof.query_round_proofs.len();
        Ok(())
    }
}
