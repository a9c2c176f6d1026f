//! Proofs and the challenges derived from them.
//!
//! Every proof type is generic over the base element `B` and the extension
//! element `E`. The serialized form uses canonical limbs (`u64`, `[u64; 2]`);
//! the circuit form uses [GoldilocksVar] and [QuadraticExtensionVar].

use ark_ff::PrimeField;
use goldilocks_field::{Fq, Fq2, GoldilocksField, QuadraticExtension};
use goldilocks_poseidon2::{Challenger, HashOut};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use wrap_snarky::{errors::SnarkyResult, prelude::*};

use crate::{
    config::{pow2, CommonCircuitData, FriParams, VerifierOnlyCircuitData},
    error::{ProofShapeError, VerifierResult},
    fri::{FriOpeningBatch, FriOpenings},
    gadgets::{GoldilocksChip, GoldilocksVar, HashOutVar, MerkleCapVar, QuadraticExtensionVar},
};

/// Number of random elements appended to the leaves of blinded oracles.
pub const SALT_SIZE: usize = 4;

/// The nodes on the path from a leaf up to the Merkle cap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof<B> {
    pub siblings: Vec<HashOut<B>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningSet<E> {
    pub constants: Vec<E>,
    pub plonk_sigmas: Vec<E>,
    pub wires: Vec<E>,
    pub plonk_zs: Vec<E>,
    pub plonk_zs_next: Vec<E>,
    pub partial_products: Vec<E>,
    pub quotient_polys: Vec<E>,
}

impl<E: Clone> OpeningSet<E> {
    /// The openings grouped by point: everything at `zeta`, then the `Z`s at `g * zeta`.
    pub fn to_fri_openings(&self) -> FriOpenings<E> {
        let zeta_batch = FriOpeningBatch {
            values: [
                self.constants.as_slice(),
                self.plonk_sigmas.as_slice(),
                self.wires.as_slice(),
                self.plonk_zs.as_slice(),
                self.partial_products.as_slice(),
                self.quotient_polys.as_slice(),
            ]
            .concat(),
        };
        let zeta_next_batch = FriOpeningBatch {
            values: self.plonk_zs_next.clone(),
        };
        FriOpenings {
            batches: vec![zeta_batch, zeta_next_batch],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriInitialTreeProof<B> {
    /// One leaf and its path per committed oracle.
    pub evals_proofs: Vec<(Vec<B>, MerkleProof<B>)>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriQueryStep<B, E> {
    pub evals: Vec<E>,
    pub merkle_proof: MerkleProof<B>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriQueryRound<B, E> {
    pub initial_trees_proof: FriInitialTreeProof<B>,
    pub steps: Vec<FriQueryStep<B, E>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriProof<B, E> {
    /// A Merkle cap for each reduced polynomial in the commit phase.
    pub commit_phase_merkle_caps: Vec<Vec<HashOut<B>>>,
    /// Query rounds proofs
    pub query_round_proofs: Vec<FriQueryRound<B, E>>,
    /// The final polynomial in coefficient form.
    pub final_poly: Vec<E>,
    /// Witness showing that the prover did PoW.
    pub pow_witness: B,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof<B, E> {
    /// Merkle cap of LDEs of wire values.
    pub wires_cap: Vec<HashOut<B>>,
    /// Merkle cap of LDEs of Z, in the context of Plonk's permutation argument.
    pub plonk_zs_partial_products_cap: Vec<HashOut<B>>,
    /// Merkle cap of LDEs of the quotient polynomial components.
    pub quotient_polys_cap: Vec<HashOut<B>>,
    /// Purported values of each polynomial at the challenge point.
    pub openings: OpeningSet<E>,
    /// A batch FRI argument for all openings.
    pub opening_proof: FriProof<B, E>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofWithPublicInputs<B, E> {
    pub proof: Proof<B, E>,
    pub public_inputs: Vec<B>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FriChallenges<B, E> {
    /// Scaling factor to combine polynomials.
    pub fri_alpha: E,
    /// Betas used in the FRI commit phase reductions.
    pub fri_betas: Vec<E>,
    pub fri_pow_response: B,
    /// Raw query challenges. Indices are these reduced modulo the LDE size.
    pub fri_query_indices: Vec<B>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofChallenges<B, E> {
    /// Random values used in Plonk's permutation argument.
    pub plonk_betas: Vec<B>,
    /// Random values used in Plonk's permutation argument.
    pub plonk_gammas: Vec<B>,
    /// Random values used to combine PLONK constraints.
    pub plonk_alphas: Vec<B>,
    /// Point at which the PLONK polynomials are opened.
    pub plonk_zeta: E,
    pub fri_challenges: FriChallenges<B, E>,
}

pub type NativeProof = Proof<u64, [u64; 2]>;
pub type NativeProofWithPublicInputs = ProofWithPublicInputs<u64, [u64; 2]>;

pub type OpeningSetVar<F> = OpeningSet<QuadraticExtensionVar<F>>;
pub type FriProofVar<F> = FriProof<GoldilocksVar<F>, QuadraticExtensionVar<F>>;
pub type ProofVar<F> = Proof<GoldilocksVar<F>, QuadraticExtensionVar<F>>;
pub type ProofWithPublicInputsVar<F> = ProofWithPublicInputs<GoldilocksVar<F>, QuadraticExtensionVar<F>>;
pub type FriChallengesVar<F> = FriChallenges<GoldilocksVar<F>, QuadraticExtensionVar<F>>;
pub type ProofChallengesVar<F> = ProofChallenges<GoldilocksVar<F>, QuadraticExtensionVar<F>>;

/// Verifier-only data as circuit variables.
#[derive(Clone, Debug)]
pub struct VerifierDataVar<F: PrimeField> {
    pub constants_sigmas_cap: MerkleCapVar<F>,
    /// The circuit digest, an outer-field element.
    pub circuit_digest: FieldVar<F>,
}

impl FriChallenges<Fq, Fq2> {
    /// Query positions in the LDE domain.
    pub fn query_indices(&self, lde_size: usize) -> Vec<usize> {
        self.fri_query_indices
            .iter()
            .map(|x| (x.to_canonical_u64() % lde_size as u64) as usize)
            .collect()
    }

    /// Whether the proof-of-work response has `proof_of_work_bits` leading zeros.
    pub fn pow_is_valid(&self, proof_of_work_bits: u32) -> bool {
        self.fri_pow_response.to_canonical_u64().leading_zeros() >= proof_of_work_bits
    }
}

//
// Shapes
//

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), ProofShapeError> {
    if expected != got {
        return Err(ProofShapeError::Length {
            what,
            expected,
            got,
        });
    }
    Ok(())
}

fn check_cap<B>(what: &'static str, cap: &[HashOut<B>], params: &FriParams) -> Result<(), ProofShapeError> {
    check_len(what, params.config.num_cap_elements(), cap.len())
}

/// Leaf length of each initial oracle, salt included.
fn initial_leaf_lens(common: &CommonCircuitData) -> Vec<usize> {
    common
        .fri_oracles()
        .iter()
        .map(|oracle| oracle.num_polys.saturating_add(if oracle.blinding { SALT_SIZE } else { 0 }))
        .collect()
}

impl<B, E> Proof<B, E> {
    /// Checks every length in the proof against the circuit it claims to be for.
    pub fn validate_shape(&self, common: &CommonCircuitData) -> Result<(), ProofShapeError> {
        let params = &common.fri_params;
        let config = &common.config;

        check_cap("wires cap", &self.wires_cap, params)?;
        check_cap("zs and partial products cap", &self.plonk_zs_partial_products_cap, params)?;
        check_cap("quotient cap", &self.quotient_polys_cap, params)?;

        let openings = &self.openings;
        check_len("constants openings", common.num_constants, openings.constants.len())?;
        check_len("sigmas openings", config.num_routed_wires, openings.plonk_sigmas.len())?;
        check_len("wires openings", config.num_wires, openings.wires.len())?;
        check_len("zs openings", config.num_challenges, openings.plonk_zs.len())?;
        check_len("next zs openings", config.num_challenges, openings.plonk_zs_next.len())?;
        check_len(
            "partial products openings",
            config.num_challenges.saturating_mul(common.num_partial_products),
            openings.partial_products.len(),
        )?;
        check_len("quotient openings", common.num_quotient_polys(), openings.quotient_polys.len())?;

        let fri = &self.opening_proof;
        check_len(
            "commit phase caps",
            params.reduction_arity_bits.len(),
            fri.commit_phase_merkle_caps.len(),
        )?;
        for cap in &fri.commit_phase_merkle_caps {
            check_cap("commit phase cap", cap, params)?;
        }
        check_len("final polynomial", params.final_poly_len(), fri.final_poly.len())?;
        check_len(
            "query rounds",
            params.config.num_query_rounds,
            fri.query_round_proofs.len(),
        )?;

        let leaf_lens = initial_leaf_lens(common);
        let initial_height = params.lde_bits().saturating_sub(params.config.cap_height);
        for round in &fri.query_round_proofs {
            let evals_proofs = &round.initial_trees_proof.evals_proofs;
            check_len("initial trees", leaf_lens.len(), evals_proofs.len())?;
            for ((leaf, path), &leaf_len) in evals_proofs.iter().zip_eq(&leaf_lens) {
                check_len("initial leaf", leaf_len, leaf.len())?;
                check_len("initial siblings", initial_height, path.siblings.len())?;
            }

            check_len("query steps", params.reduction_arity_bits.len(), round.steps.len())?;
            let mut reduced_bits = 0usize;
            for (step, &arity_bits) in round.steps.iter().zip_eq(&params.reduction_arity_bits) {
                reduced_bits = reduced_bits.saturating_add(arity_bits);
                check_len("step evaluations", pow2(arity_bits), step.evals.len())?;
                check_len(
                    "step siblings",
                    initial_height.saturating_sub(reduced_bits),
                    step.merkle_proof.siblings.len(),
                )?;
            }
        }
        Ok(())
    }
}

impl<B, E> ProofWithPublicInputs<B, E> {
    pub fn validate_shape(&self, common: &CommonCircuitData) -> Result<(), ProofShapeError> {
        check_len("public inputs", common.num_public_inputs, self.public_inputs.len())?;
        self.proof.validate_shape(common)
    }
}

impl NativeProof {
    /// A zero-filled proof with the shape `common` expects. Allocating it in
    /// compile mode gives the same circuit as allocating a real proof.
    ///
    /// `common` must have passed [CommonCircuitData::validate], which bounds
    /// every size allocated here.
    pub fn dummy(common: &CommonCircuitData) -> Self {
        let params = &common.fri_params;
        let config = &common.config;
        let num_challenges = config.num_challenges;
        let cap = || vec![[0u64; 4]; params.config.num_cap_elements()];
        let path = |height: usize| MerkleProof {
            siblings: vec![[0u64; 4]; height],
        };
        let zeros = |n: usize| vec![[0u64; 2]; n];

        let initial_height = params.lde_bits() - params.config.cap_height;
        let initial_trees_proof = FriInitialTreeProof {
            evals_proofs: initial_leaf_lens(common)
                .into_iter()
                .map(|len| (vec![0; len], path(initial_height)))
                .collect(),
        };
        let mut steps = vec![];
        let mut reduced_bits = 0;
        for &arity_bits in &params.reduction_arity_bits {
            reduced_bits += arity_bits;
            steps.push(FriQueryStep {
                evals: zeros(1 << arity_bits),
                merkle_proof: path(initial_height - reduced_bits),
            });
        }

        Proof {
            wires_cap: cap(),
            plonk_zs_partial_products_cap: cap(),
            quotient_polys_cap: cap(),
            openings: OpeningSet {
                constants: zeros(common.num_constants),
                plonk_sigmas: zeros(config.num_routed_wires),
                wires: zeros(config.num_wires),
                plonk_zs: zeros(num_challenges),
                plonk_zs_next: zeros(num_challenges),
                partial_products: zeros(num_challenges * common.num_partial_products),
                quotient_polys: zeros(common.num_quotient_polys()),
            },
            opening_proof: FriProof {
                commit_phase_merkle_caps: params.reduction_arity_bits.iter().map(|_| cap()).collect(),
                query_round_proofs: vec![
                    FriQueryRound {
                        initial_trees_proof,
                        steps,
                    };
                    params.config.num_query_rounds
                ],
                final_poly: zeros(params.final_poly_len()),
                pow_witness: 0,
            },
        }
    }

    /// Replays the transcript natively.
    pub fn get_challenges(
        &self,
        public_inputs_hash: &HashOut<Fq>,
        digest_chunks: &[u64],
        common: &CommonCircuitData,
    ) -> VerifierResult<ProofChallenges<Fq, Fq2>> {
        let num_challenges = common.num_challenges();
        let mut challenger = Challenger::new();

        for element in common.fri_params.to_transcript_elements()? {
            challenger.observe_element(Fq::from_noncanonical_u64(element));
        }
        for &chunk in digest_chunks {
            challenger.observe_element(Fq::from_noncanonical_u64(chunk));
        }
        challenger.observe_hash(public_inputs_hash);

        challenger.observe_cap(&native_cap(&self.wires_cap));
        let plonk_betas = challenger.get_n_challenges(num_challenges);
        let plonk_gammas = challenger.get_n_challenges(num_challenges);

        challenger.observe_cap(&native_cap(&self.plonk_zs_partial_products_cap));
        let plonk_alphas = challenger.get_n_challenges(num_challenges);

        challenger.observe_cap(&native_cap(&self.quotient_polys_cap));
        let plonk_zeta = challenger.get_extension_challenge();

        for value in self.openings.to_fri_openings().values() {
            challenger.observe_extension_element(&Fq2::from_noncanonical_u64s(*value));
        }

        let fri = &self.opening_proof;
        let fri_alpha = challenger.get_extension_challenge();
        let fri_betas = fri
            .commit_phase_merkle_caps
            .iter()
            .map(|cap| {
                challenger.observe_cap(&native_cap(cap));
                challenger.get_extension_challenge()
            })
            .collect();
        for coeff in &fri.final_poly {
            challenger.observe_extension_element(&Fq2::from_noncanonical_u64s(*coeff));
        }
        challenger.observe_element(Fq::from_noncanonical_u64(fri.pow_witness));
        let fri_pow_response = challenger.get_challenge();
        let fri_query_indices =
            challenger.get_n_challenges(common.fri_params.config.num_query_rounds);

        Ok(ProofChallenges {
            plonk_betas,
            plonk_gammas,
            plonk_alphas,
            plonk_zeta,
            fri_challenges: FriChallenges {
                fri_alpha,
                fri_betas,
                fri_pow_response,
                fri_query_indices,
            },
        })
    }
}

impl NativeProofWithPublicInputs {
    pub fn get_public_inputs_hash(&self) -> HashOut<Fq> {
        let inputs: Vec<Fq> = self
            .public_inputs
            .iter()
            .map(|&x| Fq::from_noncanonical_u64(x))
            .collect();
        goldilocks_poseidon2::hash_no_pad(&inputs)
    }

    /// The challenges a verifier over the outer field `F` derives for this proof.
    pub fn get_challenges<F: PrimeField>(
        &self,
        verifier_data: &VerifierOnlyCircuitData,
        common: &CommonCircuitData,
    ) -> VerifierResult<ProofChallenges<Fq, Fq2>> {
        let digest_chunks = verifier_data.digest_chunks::<F>()?;
        self.proof
            .get_challenges(&self.get_public_inputs_hash(), &digest_chunks, common)
    }

    /// Allocates every element of the proof as a witness.
    pub fn alloc<F: PrimeField>(
        &self,
        gl: &mut GoldilocksChip<'_, F>,
    ) -> SnarkyResult<ProofWithPublicInputsVar<F>> {
        let proof = alloc_proof(gl, &self.proof)?;
        let public_inputs = self
            .public_inputs
            .iter()
            .map(|&x| gl.alloc(x))
            .collect::<SnarkyResult<_>>()?;
        debug!(
            "allocated a proof with {} public input(s)",
            self.public_inputs.len()
        );
        Ok(ProofWithPublicInputs {
            proof,
            public_inputs,
        })
    }
}

impl VerifierOnlyCircuitData {
    pub fn alloc<F: PrimeField>(
        &self,
        gl: &mut GoldilocksChip<'_, F>,
    ) -> VerifierResult<VerifierDataVar<F>> {
        let digest: F = self.digest()?;
        let constants_sigmas_cap = alloc_cap(gl, &self.constants_sigmas_cap)?;
        let circuit_digest = gl.sys().compute(&loc!(), |_| digest)?;
        Ok(VerifierDataVar {
            constants_sigmas_cap,
            circuit_digest,
        })
    }
}

fn native_cap(cap: &[HashOut<u64>]) -> Vec<HashOut<Fq>> {
    cap.iter()
        .map(|hash| hash.map(Fq::from_noncanonical_u64))
        .collect()
}

fn alloc_hash<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    hash: &HashOut<u64>,
) -> SnarkyResult<HashOutVar<F>> {
    Ok([
        gl.alloc(hash[0])?,
        gl.alloc(hash[1])?,
        gl.alloc(hash[2])?,
        gl.alloc(hash[3])?,
    ])
}

fn alloc_cap<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    cap: &[HashOut<u64>],
) -> SnarkyResult<MerkleCapVar<F>> {
    cap.iter().map(|hash| alloc_hash(gl, hash)).collect()
}

fn alloc_extensions<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    values: &[[u64; 2]],
) -> SnarkyResult<Vec<QuadraticExtensionVar<F>>> {
    values.iter().map(|&v| gl.alloc_extension(v)).collect()
}

fn alloc_merkle_proof<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    proof: &MerkleProof<u64>,
) -> SnarkyResult<MerkleProof<GoldilocksVar<F>>> {
    Ok(MerkleProof {
        siblings: alloc_cap(gl, &proof.siblings)?,
    })
}

fn alloc_openings<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    openings: &OpeningSet<[u64; 2]>,
) -> SnarkyResult<OpeningSetVar<F>> {
    Ok(OpeningSet {
        constants: alloc_extensions(gl, &openings.constants)?,
        plonk_sigmas: alloc_extensions(gl, &openings.plonk_sigmas)?,
        wires: alloc_extensions(gl, &openings.wires)?,
        plonk_zs: alloc_extensions(gl, &openings.plonk_zs)?,
        plonk_zs_next: alloc_extensions(gl, &openings.plonk_zs_next)?,
        partial_products: alloc_extensions(gl, &openings.partial_products)?,
        quotient_polys: alloc_extensions(gl, &openings.quotient_polys)?,
    })
}

fn alloc_query_round<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    round: &FriQueryRound<u64, [u64; 2]>,
) -> SnarkyResult<FriQueryRound<GoldilocksVar<F>, QuadraticExtensionVar<F>>> {
    let mut evals_proofs = Vec::with_capacity(round.initial_trees_proof.evals_proofs.len());
    for (leaf, path) in &round.initial_trees_proof.evals_proofs {
        let leaf = leaf.iter().map(|&x| gl.alloc(x)).collect::<SnarkyResult<_>>()?;
        evals_proofs.push((leaf, alloc_merkle_proof(gl, path)?));
    }

    let mut steps = Vec::with_capacity(round.steps.len());
    for step in &round.steps {
        steps.push(FriQueryStep {
            evals: alloc_extensions(gl, &step.evals)?,
            merkle_proof: alloc_merkle_proof(gl, &step.merkle_proof)?,
        });
    }

    Ok(FriQueryRound {
        initial_trees_proof: FriInitialTreeProof { evals_proofs },
        steps,
    })
}

fn alloc_proof<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    proof: &NativeProof,
) -> SnarkyResult<ProofVar<F>> {
    let fri = &proof.opening_proof;
    let commit_phase_merkle_caps = fri
        .commit_phase_merkle_caps
        .iter()
        .map(|cap| alloc_cap(gl, cap))
        .collect::<SnarkyResult<_>>()?;
    let query_round_proofs = fri
        .query_round_proofs
        .iter()
        .map(|round| alloc_query_round(gl, round))
        .collect::<SnarkyResult<_>>()?;

    Ok(Proof {
        wires_cap: alloc_cap(gl, &proof.wires_cap)?,
        plonk_zs_partial_products_cap: alloc_cap(gl, &proof.plonk_zs_partial_products_cap)?,
        quotient_polys_cap: alloc_cap(gl, &proof.quotient_polys_cap)?,
        openings: alloc_openings(gl, &proof.openings)?,
        opening_proof: FriProof {
            commit_phase_merkle_caps,
            query_round_proofs,
            final_poly: alloc_extensions(gl, &fri.final_poly)?,
            pow_witness: gl.alloc(fri.pow_witness)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CircuitConfig, FriConfig, FriReductionStrategy};

    fn common(hiding: bool) -> CommonCircuitData {
        let config = CircuitConfig {
            zero_knowledge: hiding,
            fri_config: FriConfig {
                rate_bits: 1,
                cap_height: 1,
                proof_of_work_bits: 0,
                reduction_strategy: FriReductionStrategy::ConstantArityBits(1, 0),
                num_query_rounds: 2,
            },
            ..CircuitConfig::standard_recursion_config()
        };
        let fri_params = config.fri_config.fri_params(3, hiding).unwrap();
        CommonCircuitData {
            config,
            fri_params,
            gate_ids: vec![],
            degree_bits: 3,
            quotient_degree_factor: 8,
            num_gate_constraints: 0,
            num_constants: 2,
            num_public_inputs: 1,
            k_is: vec![],
            num_partial_products: 9,
        }
    }

    #[test]
    fn test_dummy_has_valid_shape() {
        for hiding in [false, true] {
            let common = common(hiding);
            let proof = Proof::dummy(&common);
            assert_eq!(proof.validate_shape(&common), Ok(()));

            let params = &common.fri_params;
            assert_eq!(params.reduction_arity_bits, vec![1, 1, 1]);
            let round = &proof.opening_proof.query_round_proofs[0];
            // lde_bits = 4, cap_height = 1
            assert_eq!(round.initial_trees_proof.evals_proofs[0].1.siblings.len(), 3);
            let siblings: Vec<usize> = round
                .steps
                .iter()
                .map(|step| step.merkle_proof.siblings.len())
                .collect();
            assert_eq!(siblings, vec![2, 1, 0]);

            let wires_leaf = round.initial_trees_proof.evals_proofs[1].0.len();
            assert_eq!(wires_leaf, 135 + if hiding { SALT_SIZE } else { 0 });
            assert_eq!(round.initial_trees_proof.evals_proofs[0].0.len(), 82);
        }
    }

    #[test]
    fn test_shape_errors() {
        let common = common(false);
        let proof = Proof::dummy(&common);

        let mut bad = proof.clone();
        bad.wires_cap.pop();
        assert_eq!(
            bad.validate_shape(&common),
            Err(ProofShapeError::Length {
                what: "wires cap",
                expected: 2,
                got: 1
            })
        );

        let mut bad = proof.clone();
        bad.opening_proof.query_round_proofs[1].steps[2]
            .merkle_proof
            .siblings
            .push([0; 4]);
        assert!(matches!(
            bad.validate_shape(&common),
            Err(ProofShapeError::Length {
                what: "step siblings",
                ..
            })
        ));

        let mut bad = proof.clone();
        bad.opening_proof.final_poly.push([0; 2]);
        assert!(bad.validate_shape(&common).is_err());

        let with_inputs = ProofWithPublicInputs {
            proof,
            public_inputs: vec![],
        };
        assert_eq!(
            with_inputs.validate_shape(&common),
            Err(ProofShapeError::Length {
                what: "public inputs",
                expected: 1,
                got: 0
            })
        );
    }

    #[test]
    fn test_shape_check_survives_unvalidated_data() {
        let valid = common(false);
        let proof = Proof::dummy(&valid);

        let mut bad = valid.clone();
        bad.fri_params.config.cap_height = 200;
        assert_eq!(
            proof.validate_shape(&bad),
            Err(ProofShapeError::Length {
                what: "wires cap",
                expected: usize::MAX,
                got: 2
            })
        );

        let mut bad = valid;
        bad.fri_params.reduction_arity_bits = vec![usize::MAX, usize::MAX, 1];
        assert_eq!(
            proof.validate_shape(&bad),
            Err(ProofShapeError::Length {
                what: "step evaluations",
                expected: usize::MAX,
                got: 2
            })
        );
    }

    #[test]
    fn test_fri_openings_order() {
        let openings = OpeningSet {
            constants: vec![1],
            plonk_sigmas: vec![2],
            wires: vec![3],
            plonk_zs: vec![4],
            plonk_zs_next: vec![7],
            partial_products: vec![5],
            quotient_polys: vec![6],
        };
        let fri = openings.to_fri_openings();
        assert_eq!(fri.batches[0].values, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(fri.batches[1].values, vec![7]);
    }

    #[test]
    fn test_native_challenges() {
        let common = common(false);
        let proof = Proof::dummy(&common);
        let hash = [Fq::from(0u64); 4];

        let challenges = proof.get_challenges(&hash, &[1, 2], &common).unwrap();
        assert_eq!(challenges.plonk_betas.len(), 2);
        assert_eq!(challenges.plonk_alphas.len(), 2);
        assert_eq!(challenges.fri_challenges.fri_betas.len(), 3);
        assert_eq!(challenges.fri_challenges.fri_query_indices.len(), 2);
        assert!(challenges.fri_challenges.pow_is_valid(0));
        assert!(challenges
            .fri_challenges
            .query_indices(common.fri_params.lde_size())
            .iter()
            .all(|&i| i < 16));

        // the same transcript gives the same challenges
        assert_eq!(
            proof.get_challenges(&hash, &[1, 2], &common).unwrap(),
            challenges
        );

        let other = proof.get_challenges(&hash, &[1, 3], &common).unwrap();
        assert_ne!(other.plonk_betas, challenges.plonk_betas);
        assert_ne!(other.plonk_zeta, challenges.plonk_zeta);

        // the proof-of-work witness only changes what is drawn after it
        let mut ground = proof.clone();
        ground.opening_proof.pow_witness = 1;
        let after = ground.get_challenges(&hash, &[1, 2], &common).unwrap();
        assert_eq!(after.plonk_zeta, challenges.plonk_zeta);
        assert_eq!(after.fri_challenges.fri_betas, challenges.fri_challenges.fri_betas);
        assert_ne!(
            after.fri_challenges.fri_pow_response,
            challenges.fri_challenges.fri_pow_response
        );
    }

    #[test]
    fn test_json() {
        let common = common(false);
        let proof = ProofWithPublicInputs {
            proof: Proof::dummy(&common),
            public_inputs: vec![42],
        };
        let json = serde_json::to_string(&proof).unwrap();
        let parsed: NativeProofWithPublicInputs = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, proof);
    }
}
