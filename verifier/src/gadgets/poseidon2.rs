//! In-circuit Poseidon2 hashing.

use ark_ff::PrimeField;
use goldilocks_poseidon2::{constants::WIDTH, hashing, permutation, HashOut};
use wrap_snarky::errors::SnarkyResult;

use super::{
    algebra::ExtensionAlgebra,
    goldilocks::{GoldilocksChip, GoldilocksVar, QuadraticExtensionVar},
};

pub type HashOutVar<F> = HashOut<GoldilocksVar<F>>;

pub type MerkleCapVar<F> = Vec<HashOutVar<F>>;

pub fn permute<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    state: [GoldilocksVar<F>; WIDTH],
) -> SnarkyResult<[GoldilocksVar<F>; WIDTH]> {
    permutation::permute(gl, state)
}

/// The permutation applied lane-wise over the quadratic extension.
pub fn permute_extension<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    state: [QuadraticExtensionVar<F>; WIDTH],
) -> SnarkyResult<[QuadraticExtensionVar<F>; WIDTH]> {
    permutation::permute(&mut ExtensionAlgebra(gl), state)
}

pub fn hash_no_pad<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    inputs: &[GoldilocksVar<F>],
) -> SnarkyResult<HashOutVar<F>> {
    hashing::hash_no_pad(gl, inputs)
}

pub fn hash_pad<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    inputs: &[GoldilocksVar<F>],
) -> SnarkyResult<HashOutVar<F>> {
    hashing::hash_pad(gl, inputs)
}

pub fn hash_or_noop<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    inputs: &[GoldilocksVar<F>],
) -> SnarkyResult<HashOutVar<F>> {
    hashing::hash_or_noop(gl, inputs)
}

pub fn two_to_one<F: PrimeField>(
    gl: &mut GoldilocksChip<'_, F>,
    left: &HashOutVar<F>,
    right: &HashOutVar<F>,
) -> SnarkyResult<HashOutVar<F>> {
    hashing::two_to_one(gl, left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadgets::goldilocks::to_goldilocks;
    use ark_bn254::Fr;
    use goldilocks_field::{Fq, Fq2, GoldilocksField, QuadraticExtension};
    use rand::Rng;
    use wrap_snarky::prelude::*;

    fn read(sys: &RunState<Fr>, x: &GoldilocksVar<Fr>) -> u64 {
        to_goldilocks(sys.read_var(&x.value)).to_canonical_u64()
    }

    #[test]
    fn test_permute_matches_native() {
        let mut rng = ark_std::test_rng();
        let input: [u64; WIDTH] = std::array::from_fn(|_| rng.gen_range(0..goldilocks_field::MODULUS));

        let mut sys = RunState::<Fr>::witness();
        let mut gl = GoldilocksChip::new(&mut sys);
        let mut state = Vec::with_capacity(WIDTH);
        for x in input {
            state.push(gl.alloc(x).unwrap());
        }
        let state: [GoldilocksVar<Fr>; WIDTH] = state.try_into().unwrap();
        let output = permute(&mut gl, state).unwrap();

        assert!(sys.check_satisfied().is_ok());
        let expected = goldilocks_poseidon2::permute_u64(input);
        let got: Vec<u64> = output.iter().map(|x| read(&sys, x)).collect();
        assert_eq!(got, expected.to_vec());
    }

    #[test]
    fn test_permute_constants_emit_no_constraints() {
        let mut sys = RunState::<Fr>::witness();
        let mut gl = GoldilocksChip::new(&mut sys);
        let state = std::array::from_fn(|i| GoldilocksVar::constant(i as u64));
        let output = permute(&mut gl, state).unwrap();

        let expected = goldilocks_poseidon2::permute_u64(std::array::from_fn(|i| i as u64));
        for (lane, expected) in output.iter().zip(expected) {
            let c = lane.value.to_constant().unwrap();
            assert_eq!(to_goldilocks(c).to_canonical_u64(), expected);
        }
        assert_eq!(sys.num_constraints(), 0);
    }

    #[test]
    fn test_permute_extension_matches_native() {
        let mut rng = ark_std::test_rng();
        let input: [[u64; 2]; WIDTH] = std::array::from_fn(|_| {
            [
                rng.gen_range(0..goldilocks_field::MODULUS),
                rng.gen_range(0..goldilocks_field::MODULUS),
            ]
        });

        let mut sys = RunState::<Fr>::witness();
        let mut gl = GoldilocksChip::new(&mut sys);
        let mut state = Vec::with_capacity(WIDTH);
        for x in input {
            state.push(gl.alloc_extension(x).unwrap());
        }
        let state: [QuadraticExtensionVar<Fr>; WIDTH] = state.try_into().unwrap();
        let output = permute_extension(&mut gl, state).unwrap();

        assert!(sys.check_satisfied().is_ok());
        let expected = goldilocks_poseidon2::permute_extension(input.map(Fq2::from_noncanonical_u64s));
        for (lane, expected) in output.iter().zip(expected) {
            assert_eq!([read(&sys, &lane.c0), read(&sys, &lane.c1)], expected.to_canonical_u64s());
        }
    }

    #[test]
    fn test_hash_no_pad_matches_native() {
        let inputs: Vec<u64> = (1..=10).collect();

        let mut sys = RunState::<Fr>::witness();
        let mut gl = GoldilocksChip::new(&mut sys);
        let vars: Vec<_> = inputs.iter().map(|&x| gl.alloc(x).unwrap()).collect();
        let hash = hash_no_pad(&mut gl, &vars).unwrap();
        let short = hash_or_noop(&mut gl, &vars[..3]).unwrap();
        let compressed = two_to_one(&mut gl, &hash, &short).unwrap();

        assert!(sys.check_satisfied().is_ok());
        let native_inputs: Vec<Fq> = inputs.iter().map(|&x| Fq::from(x)).collect();
        let expected = goldilocks_poseidon2::hash_no_pad(&native_inputs);
        let expected_short = goldilocks_poseidon2::hash_or_noop(&native_inputs[..3]);
        let expected_compressed = goldilocks_poseidon2::two_to_one(&expected, &expected_short);

        let got = hash.map(|x| read(&sys, &x));
        assert_eq!(got, expected.map(|x| x.to_canonical_u64()));
        assert_eq!(got[0], 0xfddf29d21e34b1ca);
        assert_eq!(short.map(|x| read(&sys, &x)), [1, 2, 3, 0]);
        assert_eq!(
            compressed.map(|x| read(&sys, &x)),
            expected_compressed.map(|x| x.to_canonical_u64())
        );
    }

    #[test]
    fn test_hash_pad_matches_native() {
        let mut sys = RunState::<Fr>::witness();
        let mut gl = GoldilocksChip::new(&mut sys);
        let vars: Vec<_> = (0..5u64).map(|x| gl.alloc(x).unwrap()).collect();
        let hash = hash_pad(&mut gl, &vars).unwrap();

        assert!(sys.check_satisfied().is_ok());
        let expected = goldilocks_poseidon2::hash_pad(&(0..5u64).map(Fq::from).collect::<Vec<_>>());
        assert_eq!(hash.map(|x| read(&sys, &x)), expected.map(|x| x.to_canonical_u64()));
    }

    #[test]
    fn test_non_canonical_input_is_reduced() {
        let mut sys = RunState::<Fr>::witness();
        let mut gl = GoldilocksChip::new(&mut sys);
        let mut state = Vec::with_capacity(WIDTH);
        for i in 0..WIDTH as u64 {
            // p + i is congruent to i
            state.push(gl.alloc(goldilocks_field::MODULUS + i).unwrap());
        }
        let state: [GoldilocksVar<Fr>; WIDTH] = state.try_into().unwrap();
        let output = permute(&mut gl, state).unwrap();

        assert!(sys.check_satisfied().is_ok());
        let expected = goldilocks_poseidon2::permute_u64(std::array::from_fn(|i| i as u64));
        let got: Vec<u64> = output.iter().map(|x| read(&sys, x)).collect();
        assert_eq!(got, expected.to_vec());
    }
}
