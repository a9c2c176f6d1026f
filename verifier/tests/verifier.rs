mod common;

use ark_bn254::Fr;
use common::*;
use goldilocks_field::Fq;
use plonky2_wrap_verifier::{
    proof::ProofWithPublicInputs, verifier::read_challenges, ConfigError, NativeProof,
    NativeProofWithPublicInputs, ProofShapeError, VerifierChip, VerifierError,
    MIN_NATIVE_FIELD_BITS,
};
use wrap_snarky::{constraint_system::SnarkyConstraintSystem, prelude::*};

type Chip<F> = VerifierChip<F, RecordingPlonkChip, RecordingFriChip>;

fn chip() -> Chip<Fr> {
    VerifierChip::new(
        common_data(),
        RecordingPlonkChip::default(),
        RecordingFriChip::default(),
    )
    .unwrap()
}

#[test]
fn test_valid_proof_is_satisfied() {
    let common = common_data();
    let verifier_data = verifier_data();
    let mut proof = random_proof(&common, 0);
    grind::<Fr>(&mut proof, &verifier_data, &common, true);

    let mut verifier = chip();
    let mut sys = RunState::<Fr>::witness();
    let challenges = verifier
        .verify_proof_with_public_inputs(&mut sys, &proof, &verifier_data)
        .unwrap();
    assert!(sys.check_satisfied().is_ok());

    let expected = proof.get_challenges::<Fr>(&verifier_data, &common).unwrap();
    assert_eq!(read_challenges(&sys, &challenges), expected);
    assert!(expected
        .fri_challenges
        .pow_is_valid(PROOF_OF_WORK_BITS));
}

#[test]
fn test_sub_verifiers_receive_the_proof() {
    let common = common_data();
    let verifier_data = verifier_data();
    let mut proof = random_proof(&common, 1);
    grind::<Fr>(&mut proof, &verifier_data, &common, true);

    let mut verifier = chip();
    let mut sys = RunState::<Fr>::witness();
    verifier
        .verify_proof_with_public_inputs(&mut sys, &proof, &verifier_data)
        .unwrap();

    let plonk = verifier.plonk();
    assert_eq!(plonk.calls, 1);
    assert_eq!(plonk.gate_ids, vec![POSEIDON2_GATE_ID.to_string()]);
    assert_eq!(plonk.num_betas, common.num_challenges());
    assert_eq!(plonk.num_wire_openings, common.config.num_wires);

    let fri = verifier.fri();
    assert_eq!(fri.calls, 1);
    assert_eq!(fri.num_initial_caps, 4);
    assert_eq!(fri.num_batches, 2);
    assert_eq!(
        fri.num_opened_values,
        proof.proof.openings.to_fri_openings().values().count()
    );
    assert_eq!(fri.num_query_indices, 2);
    assert_eq!(fri.num_query_rounds, 2);
}

#[test]
fn test_failed_proof_of_work_is_unsatisfiable() {
    let common = common_data();
    let verifier_data = verifier_data();
    let mut proof = random_proof(&common, 2);
    grind::<Fr>(&mut proof, &verifier_data, &common, false);

    let mut verifier = chip();
    let mut sys = RunState::<Fr>::witness();
    verifier
        .verify_proof_with_public_inputs(&mut sys, &proof, &verifier_data)
        .unwrap();
    assert!(sys.check_satisfied().is_err());
}

#[test]
fn test_non_canonical_proof_element_is_unsatisfiable() {
    let common = common_data();
    let verifier_data = verifier_data();
    let mut proof = random_proof(&common, 3);
    grind::<Fr>(&mut proof, &verifier_data, &common, true);
    // the same element of Goldilocks, encoded as x + p
    let x = &mut proof.proof.opening_proof.query_round_proofs[0].initial_trees_proof.evals_proofs[1].0[0];
    *x %= 1 << 31;
    *x += goldilocks_field::MODULUS;

    let mut verifier = chip();
    let mut sys = RunState::<Fr>::witness();
    verifier
        .verify_proof_with_public_inputs(&mut sys, &proof, &verifier_data)
        .unwrap();
    assert!(sys.check_satisfied().is_err());
}

fn compile(proof: &NativeProofWithPublicInputs) -> SnarkyConstraintSystem<Fr> {
    let mut sys = RunState::<Fr>::compile();
    chip()
        .verify_proof_with_public_inputs(&mut sys, proof, &verifier_data())
        .unwrap();
    sys.into_system().unwrap()
}

fn witness(proof: &NativeProofWithPublicInputs) -> RunState<Fr> {
    let mut sys = RunState::<Fr>::witness();
    chip()
        .verify_proof_with_public_inputs(&mut sys, proof, &verifier_data())
        .unwrap();
    sys
}

#[test]
fn test_compiled_circuit_does_not_depend_on_the_proof() {
    let common = common_data();
    let verifier_data = verifier_data();

    let compiled = compile(&ProofWithPublicInputs {
        proof: NativeProof::dummy(&common),
        public_inputs: vec![0; 3],
    });
    assert!(compiled.num_constraints() > 0);

    let mut proof = random_proof(&common, 4);
    grind::<Fr>(&mut proof, &verifier_data, &common, true);
    assert_eq!(compile(&proof), compiled);

    // two different valid proofs both satisfy the one compiled system
    let mut other = random_proof(&common, 8);
    grind::<Fr>(&mut other, &verifier_data, &common, true);
    for proof in [&proof, &other] {
        let sys = witness(proof);
        assert!(sys.check_satisfied().is_ok());
        assert_eq!(sys.num_constraints(), compiled.num_constraints());
        assert!(compiled.check_satisfied(sys.witness_values()).is_ok());
    }
}

#[test]
fn test_compiled_circuit_rejects_a_tampered_proof() {
    let common = common_data();
    let verifier_data = verifier_data();
    let compiled = compile(&ProofWithPublicInputs {
        proof: NativeProof::dummy(&common),
        public_inputs: vec![0; 3],
    });

    let mut proof = random_proof(&common, 9);
    grind::<Fr>(&mut proof, &verifier_data, &common, false);
    let sys = witness(&proof);
    assert_eq!(sys.witness_values().len(), compiled.num_vars());
    assert!(compiled.check_satisfied(sys.witness_values()).is_err());

    let mut proof = random_proof(&common, 10);
    grind::<Fr>(&mut proof, &verifier_data, &common, true);
    // a non-canonical encoding of an opened wire
    let x = &mut proof.proof.openings.wires[0][0];
    *x %= 1 << 31;
    *x += goldilocks_field::MODULUS;
    let sys = witness(&proof);
    assert!(compiled.check_satisfied(sys.witness_values()).is_err());
}

#[test]
fn test_shape_errors_are_reported_before_any_constraint() {
    let common = common_data();
    let verifier_data = verifier_data();
    let mut verifier = chip();

    let mut proof = random_proof(&common, 5);
    proof.public_inputs.pop();
    let mut sys = RunState::<Fr>::witness();
    let err = verifier
        .verify_proof_with_public_inputs(&mut sys, &proof, &verifier_data)
        .unwrap_err();
    assert_eq!(
        err,
        VerifierError::ProofShape(ProofShapeError::Length {
            what: "public inputs",
            expected: 3,
            got: 2
        })
    );
    assert_eq!(sys.num_constraints(), 0);

    let proof = random_proof(&common, 5);
    let mut bad_data = verifier_data.clone();
    bad_data.constants_sigmas_cap.push([0; 4]);
    let err = verifier
        .verify_proof_with_public_inputs(&mut sys, &proof, &bad_data)
        .unwrap_err();
    assert!(matches!(err, VerifierError::ProofShape(_)));
    assert_eq!(sys.num_constraints(), 0);
}

#[test]
fn test_non_canonical_digest_is_rejected() {
    let common = common_data();
    let mut verifier_data = verifier_data();
    verifier_data.circuit_digest = [0xff; 32];
    let proof = random_proof(&common, 6);

    let mut sys = RunState::<Fr>::witness();
    let err = chip()
        .verify_proof_with_public_inputs(&mut sys, &proof, &verifier_data)
        .unwrap_err();
    assert_eq!(err, VerifierError::Config(ConfigError::NonCanonicalDigest));
}

#[test]
fn test_configuration_errors() {
    let mut common = common_data();
    common.config.num_challenges = 0;
    let err = Chip::<Fr>::new(
        common,
        RecordingPlonkChip::default(),
        RecordingFriChip::default(),
    )
    .err();
    assert_eq!(err, Some(ConfigError::NoChallenges));

    let mut common = common_data();
    common.gate_ids.push("Poseidon2Gate<WIDTH=8>".to_string());
    let err = Chip::<Fr>::new(
        common,
        RecordingPlonkChip::default(),
        RecordingFriChip::default(),
    )
    .err();
    assert_eq!(
        err,
        Some(ConfigError::GateWidthMismatch {
            expected: 12,
            got: 8
        })
    );

    // Goldilocks itself is far too small to emulate Goldilocks
    let err = Chip::<Fq>::new(
        common_data(),
        RecordingPlonkChip::default(),
        RecordingFriChip::default(),
    )
    .err();
    assert_eq!(
        err,
        Some(ConfigError::NativeFieldTooSmall {
            required: MIN_NATIVE_FIELD_BITS,
            got: 64
        })
    );
}

#[test]
fn test_changing_a_public_input_changes_the_challenges() {
    let common = common_data();
    let verifier_data = verifier_data();
    let proof = random_proof(&common, 7);
    let mut other = proof.clone();
    other.public_inputs[0] = (other.public_inputs[0] + 1) % goldilocks_field::MODULUS;

    let a = proof.get_challenges::<Fr>(&verifier_data, &common).unwrap();
    let b = other.get_challenges::<Fr>(&verifier_data, &common).unwrap();
    assert_ne!(a.plonk_betas, b.plonk_betas);
    assert_ne!(a.plonk_zeta, b.plonk_zeta);
    assert_ne!(a.fri_challenges.fri_query_indices, b.fri_challenges.fri_query_indices);
}
