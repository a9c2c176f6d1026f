use ark_bn254::Fr;
use ark_ff::{One, PrimeField, UniformRand, Zero};
use num_bigint::BigUint;
use proptest::prelude::*;

use super::{
    bits::{assert_le_constant, pack, unpack_bits, unpack_bits_strict},
    errors::SnarkyRuntimeError,
    prelude::*,
};

fn mul_circuit(sys: &mut RunState<Fr>, x: Fr, y: Fr, z: Fr) -> SnarkyResult<()> {
    let x: FieldVar<Fr> = sys.compute(&loc!(), |_| x)?;
    let y: FieldVar<Fr> = sys.compute(&loc!(), |_| y)?;
    let z: FieldVar<Fr> = sys.compute(&loc!(), |_| z)?;

    sys.assert_r1cs(Some("x * y = z"), x, y, z)
}

fn alloc_bits(sys: &mut RunState<Fr>, value: &BigUint, num_bits: usize) -> Vec<Boolean<Fr>> {
    (0..num_bits)
        .map(|i| sys.compute(&loc!(), |_| value.bit(i as u64)).unwrap())
        .collect()
}

#[test]
fn test_simple_circuit() {
    let mut sys = RunState::witness();
    mul_circuit(&mut sys, Fr::one(), Fr::from(2u64), Fr::from(2u64)).unwrap();
    assert_eq!(sys.num_constraints(), 1);
    sys.check_satisfied().unwrap();

    let mut sys = RunState::witness();
    mul_circuit(&mut sys, Fr::one(), Fr::from(2u64), Fr::from(3u64)).unwrap();
    assert!(matches!(
        sys.check_satisfied(),
        Err(SnarkyRuntimeError::UnsatisfiedR1CSConstraint(_, _, _, "x * y = z"))
    ));
}

#[test]
fn test_eval_constraints_fails_fast() {
    let mut sys = RunState::witness();
    sys.eval_constraints = true;
    let err = mul_circuit(&mut sys, Fr::one(), Fr::from(2u64), Fr::from(3u64)).unwrap_err();
    assert!(matches!(err, SnarkyError::RuntimeError(_)));
}

#[test]
fn test_compiled_system_checks_witness() {
    let mut compile = RunState::compile();
    mul_circuit(&mut compile, Fr::zero(), Fr::zero(), Fr::zero()).unwrap();
    let cs = compile.into_system().unwrap();
    assert_eq!(cs.num_constraints(), 1);
    assert_eq!(cs.num_vars(), 3);

    let mut good = RunState::witness();
    mul_circuit(&mut good, Fr::from(3u64), Fr::from(5u64), Fr::from(15u64)).unwrap();
    cs.check_satisfied(good.witness_values()).unwrap();

    let mut bad = RunState::witness();
    mul_circuit(&mut bad, Fr::from(3u64), Fr::from(5u64), Fr::from(16u64)).unwrap();
    assert!(cs.check_satisfied(bad.witness_values()).is_err());
    assert!(matches!(
        cs.check_satisfied(&[Fr::one()]),
        Err(SnarkyRuntimeError::WitnessLength(1, 3))
    ));
}

#[test]
fn test_constant_assertions_fold() {
    let mut sys = RunState::<Fr>::compile();
    let four = FieldVar::constant(Fr::from(4u64));
    let five = FieldVar::constant(Fr::from(5u64));

    sys.assert_eq(None, four.clone(), four.clone()).unwrap();
    assert_eq!(sys.num_constraints(), 0);
    sys.check_satisfied().unwrap();

    // a false constant assertion is kept, and the system can never be satisfied
    sys.assert_eq(None, four, five).unwrap();
    assert_eq!(sys.num_constraints(), 1);
    assert!(sys.check_satisfied().is_err());
    let cs = sys.into_system().unwrap();
    assert!(cs.check_satisfied(&[]).is_err());
}

#[test]
fn test_linear_combinations_are_free() {
    let mut sys = RunState::<Fr>::witness();
    let x: FieldVar<Fr> = sys.compute(&loc!(), |_| Fr::from(7u64)).unwrap();
    let y = (&x + &x).scale(Fr::from(3u64)) - FieldVar::constant(Fr::from(2u64));
    assert_eq!(sys.read_var(&y), Fr::from(40u64));
    assert_eq!(sys.num_constraints(), 0);

    let (c, terms) = y.to_constant_and_terms();
    assert_eq!(c, Some(-Fr::from(2u64)));
    assert_eq!(terms.len(), 2);
}

#[test]
fn test_equal_and_if() {
    let mut sys = RunState::<Fr>::witness();
    let x: FieldVar<Fr> = sys.compute(&loc!(), |_| Fr::from(9u64)).unwrap();
    let y: FieldVar<Fr> = sys.compute(&loc!(), |_| Fr::from(9u64)).unwrap();
    let z: FieldVar<Fr> = sys.compute(&loc!(), |_| Fr::from(10u64)).unwrap();

    let eq = x.equal(&mut sys, &y).unwrap();
    let neq = x.equal(&mut sys, &z).unwrap();
    assert!(eq.read(&sys));
    assert!(!neq.read(&sys));

    let picked = sys.if_(&neq, x.clone(), z.clone()).unwrap();
    assert_eq!(sys.read_var(&picked), Fr::from(10u64));

    let picked = sys.if_(&Boolean::true_(), x, z).unwrap();
    assert!(matches!(picked, FieldVar::Var(_)));
    sys.check_satisfied().unwrap();
}

#[test]
fn test_inverse_of_zero_is_unsatisfiable() {
    let mut sys = RunState::<Fr>::witness();
    let x: FieldVar<Fr> = sys.compute(&loc!(), |_| Fr::zero()).unwrap();
    x.inv(None, &mut sys).unwrap();
    assert!(sys.check_satisfied().is_err());

    let mut sys = RunState::<Fr>::witness();
    let x: FieldVar<Fr> = sys.compute(&loc!(), |_| Fr::from(5u64)).unwrap();
    let inv = x.inv(None, &mut sys).unwrap();
    assert_eq!(sys.read_var(&inv) * Fr::from(5u64), Fr::one());
    sys.check_satisfied().unwrap();
}

#[test]
fn test_unpack_constant_too_large() {
    let mut sys = RunState::<Fr>::compile();
    let bits = unpack_bits(&mut sys, &FieldVar::constant(Fr::from(256u64)), 8, None).unwrap();
    assert_eq!(bits.len(), 8);
    assert!(sys.check_satisfied().is_err());

    let mut sys = RunState::<Fr>::compile();
    unpack_bits(&mut sys, &FieldVar::constant(Fr::from(255u64)), 8, None).unwrap();
    sys.check_satisfied().unwrap();
    assert_eq!(sys.num_constraints(), 0);
}

#[test]
fn test_unpack_bits_rejects_wide_value() {
    let mut sys = RunState::<Fr>::witness();
    let x: FieldVar<Fr> = sys.compute(&loc!(), |_| Fr::from(1u64 << 40)).unwrap();
    unpack_bits(&mut sys, &x, 40, None).unwrap();
    assert!(sys.check_satisfied().is_err());
}

#[test]
#[should_panic]
fn test_unpack_bits_full_width_is_a_programmer_error() {
    let mut sys = RunState::<Fr>::witness();
    let x: FieldVar<Fr> = sys.compute(&loc!(), |_| Fr::one()).unwrap();
    let _ = unpack_bits(&mut sys, &x, Fr::MODULUS_BIT_SIZE as usize, None);
}

#[test]
fn test_strict_unpack_random() {
    let mut rng = ark_std::test_rng();
    for _ in 0..4 {
        let value = Fr::rand(&mut rng);
        let mut sys = RunState::<Fr>::witness();
        let x: FieldVar<Fr> = sys.compute(&loc!(), |_| value).unwrap();
        let bits = unpack_bits_strict(&mut sys, &x).unwrap();
        assert_eq!(bits.len(), Fr::MODULUS_BIT_SIZE as usize);
        assert_eq!(sys.read_var(&pack(&bits)), value);
        sys.check_satisfied().unwrap();
    }
}

#[test]
fn test_le_constant_rejects_modulus() {
    // the bits of p itself recompose to zero, so only the comparison catches them
    let modulus: BigUint = Fr::MODULUS.into();
    let num_bits = Fr::MODULUS_BIT_SIZE as usize;

    let mut sys = RunState::<Fr>::witness();
    let bits = alloc_bits(&mut sys, &modulus, num_bits);
    assert_eq!(sys.read_var(&pack(&bits)), Fr::zero());
    assert_le_constant(&mut sys, &bits, &(modulus.clone() - 1u32)).unwrap();
    assert!(sys.check_satisfied().is_err());

    let mut sys = RunState::<Fr>::witness();
    let bits = alloc_bits(&mut sys, &(modulus.clone() - 1u32), num_bits);
    assert_le_constant(&mut sys, &bits, &(modulus - 1u32)).unwrap();
    sys.check_satisfied().unwrap();
}

proptest! {
    #[test]
    fn test_le_constant_matches_integers(a in 0u64..1024, c in 0u64..1024) {
        let mut sys = RunState::<Fr>::witness();
        let bits = alloc_bits(&mut sys, &BigUint::from(a), 10);
        assert_le_constant(&mut sys, &bits, &BigUint::from(c)).unwrap();
        prop_assert_eq!(sys.check_satisfied().is_ok(), a <= c);
    }

    #[test]
    fn test_unpack_bits_round_trip(a in any::<u64>()) {
        let mut sys = RunState::<Fr>::witness();
        let x: FieldVar<Fr> = sys.compute(&loc!(), |_| Fr::from(a)).unwrap();
        let bits = unpack_bits(&mut sys, &x, 64, None).unwrap();
        for (i, bit) in bits.iter().enumerate() {
            prop_assert_eq!(bit.read(&sys), (a >> i) & 1 == 1);
        }
        prop_assert!(sys.check_satisfied().is_ok());
    }
}
