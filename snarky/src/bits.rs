//! Bit decompositions of field variables.

use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;

use crate::{
    boolean::Boolean,
    cvar::FieldVar,
    errors::SnarkyResult,
    loc,
    runner::RunState,
};

/// Recomposes little-endian bits into a field variable, without constraints.
pub fn pack<F: PrimeField>(bits: &[Boolean<F>]) -> FieldVar<F> {
    let mut coeff = F::one();
    let mut terms = Vec::with_capacity(bits.len());
    for bit in bits {
        terms.push((coeff, bit.to_field_var()));
        coeff.double_in_place();
    }
    FieldVar::linear_combination(&terms)
}

/// Decomposes `x` into `num_bits` little-endian bits and constrains the
/// recomposition to equal `x`.
///
/// Panics if `num_bits` is not smaller than the bit size of the modulus, since
/// the decomposition would not be unique.
///
/// A constant that does not fit makes the circuit unsatisfiable.
pub fn unpack_bits<F: PrimeField>(
    cs: &mut RunState<F>,
    x: &FieldVar<F>,
    num_bits: usize,
    label: Option<&'static str>,
) -> SnarkyResult<Vec<Boolean<F>>> {
    assert!(
        num_bits < F::MODULUS_BIT_SIZE as usize,
        "cannot unpack {num_bits} bits of a {}-bit field",
        F::MODULUS_BIT_SIZE
    );
    unpack_bits_inner(cs, x, num_bits, label)
}

fn unpack_bits_inner<F: PrimeField>(
    cs: &mut RunState<F>,
    x: &FieldVar<F>,
    num_bits: usize,
    label: Option<&'static str>,
) -> SnarkyResult<Vec<Boolean<F>>> {
    let bits: Vec<Boolean<F>> = match x.to_constant() {
        Some(c) => {
            let c = c.into_bigint();
            (0..num_bits)
                .map(|i| Boolean::from_constant(c.get_bit(i)))
                .collect()
        }
        None => {
            let mut bits = Vec::with_capacity(num_bits);
            for i in 0..num_bits {
                let bit: Boolean<F> =
                    cs.compute(&loc!(), |env| env.read_var(x).into_bigint().get_bit(i))?;
                bits.push(bit);
            }
            bits
        }
    };

    cs.assert_eq(label.or(Some("unpack_bits")), pack(&bits), x.clone())?;
    Ok(bits)
}

/// Constrains the little-endian number held by `bits` to be at most `c`.
pub fn assert_le_constant<F: PrimeField>(
    cs: &mut RunState<F>,
    bits: &[Boolean<F>],
    c: &BigUint,
) -> SnarkyResult<()> {
    if c.bits() as usize > bits.len() {
        return Ok(());
    }

    // `run` is the product of the bits seen so far at positions where `c` has a one,
    // i.e. whether the prefix of `bits` equals the prefix of `c`.
    let mut run: Option<Boolean<F>> = None;
    for (i, bit) in bits.iter().enumerate().rev() {
        if c.bit(i as u64) {
            run = Some(match run {
                None => bit.clone(),
                Some(r) => r.and(bit, cs)?,
            });
        } else {
            match &run {
                // above the top bit of c
                None => cs.assert_eq(Some("le_constant_high"), bit.to_field_var(), FieldVar::zero())?,
                // (1 - run - bit) * bit = 0
                Some(r) => {
                    let lhs = FieldVar::one() - &r.to_field_var() - &bit.to_field_var();
                    cs.assert_r1cs(
                        Some("le_constant"),
                        lhs,
                        bit.to_field_var(),
                        FieldVar::zero(),
                    )?
                }
            }
        }
    }
    Ok(())
}

/// Decomposes `x` into exactly as many bits as the modulus has, and constrains
/// the decomposition to be canonical (strictly less than the modulus).
pub fn unpack_bits_strict<F: PrimeField>(
    cs: &mut RunState<F>,
    x: &FieldVar<F>,
) -> SnarkyResult<Vec<Boolean<F>>> {
    let num_bits = F::MODULUS_BIT_SIZE as usize;
    if let Some(c) = x.to_constant() {
        let c = c.into_bigint();
        return Ok((0..num_bits)
            .map(|i| Boolean::from_constant(c.get_bit(i)))
            .collect());
    }

    let bits = unpack_bits_inner(cs, x, num_bits, Some("unpack_bits_strict"))?;
    let modulus: BigUint = F::MODULUS.into();
    assert_le_constant(cs, &bits, &(modulus - 1u32))?;
    Ok(bits)
}
