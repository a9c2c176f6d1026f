//! Goldilocks arithmetic emulated over a larger native field.
//!
//! A [GoldilocksVar] is a native variable together with an upper bound on the
//! bit length of the integer it holds. Additions and multiplications are done
//! natively and only grow the bound. [GoldilocksChip::reduce] then proves
//! `x = q * p + r` with `r < p` and `q` range-checked against the bound, so
//! the equation can never wrap around the native modulus.

use std::cmp::max;

use ark_ff::{Field, PrimeField};
use goldilocks_field::{Fq, Fq2, GoldilocksField, MODULUS, W};
use num_bigint::BigUint;
use num_integer::Integer;
use wrap_snarky::{
    bits::{pack, unpack_bits},
    errors::SnarkyCompilationError,
    prelude::*,
};

/// Bit bound of a reduced element.
pub const GOLDILOCKS_BITS: usize = 64;

/// Values below `2^63` are below `p`, hence already canonical.
const CANONICAL_BITS: usize = 63;

/// A Goldilocks element, held as an integer in `[0, 2^max_bits)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoldilocksVar<F: PrimeField> {
    pub value: FieldVar<F>,
    pub max_bits: usize,
}

impl<F: PrimeField> GoldilocksVar<F> {
    pub fn new(value: FieldVar<F>, max_bits: usize) -> Self {
        Self { value, max_bits }
    }

    pub fn constant(x: u64) -> Self {
        Self {
            value: FieldVar::constant(F::from(x)),
            max_bits: (u64::BITS - x.leading_zeros()) as usize,
        }
    }

    pub fn zero() -> Self {
        Self::constant(0)
    }

    pub fn one() -> Self {
        Self::constant(1)
    }
}

/// `c0 + c1 * w` with `w^2 = 7`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuadraticExtensionVar<F: PrimeField> {
    pub c0: GoldilocksVar<F>,
    pub c1: GoldilocksVar<F>,
}

impl<F: PrimeField> QuadraticExtensionVar<F> {
    pub fn new(c0: GoldilocksVar<F>, c1: GoldilocksVar<F>) -> Self {
        Self { c0, c1 }
    }

    pub fn from_base(c0: GoldilocksVar<F>) -> Self {
        Self {
            c0,
            c1: GoldilocksVar::zero(),
        }
    }

    pub fn constant(limbs: [u64; 2]) -> Self {
        Self::new(
            GoldilocksVar::constant(limbs[0]),
            GoldilocksVar::constant(limbs[1]),
        )
    }

    pub fn limbs(&self) -> [GoldilocksVar<F>; 2] {
        [self.c0.clone(), self.c1.clone()]
    }
}

/// Reads a native value as a Goldilocks element, reducing modulo `p`.
pub fn to_goldilocks<F: PrimeField>(x: F) -> Fq {
    let x: BigUint = x.into();
    Fq::from_le_bytes_mod_order(&x.to_bytes_le())
}

pub fn from_goldilocks<F: PrimeField>(x: Fq) -> F {
    F::from(x.to_canonical_u64())
}

pub fn read_goldilocks<F: PrimeField>(env: &dyn WitnessGeneration<F>, x: &GoldilocksVar<F>) -> Fq {
    to_goldilocks(env.read_var(&x.value))
}

pub fn read_extension<F: PrimeField>(
    env: &dyn WitnessGeneration<F>,
    x: &QuadraticExtensionVar<F>,
) -> Fq2 {
    Fq2::new(read_goldilocks(env, &x.c0), read_goldilocks(env, &x.c1))
}

/// Decomposing a value needs `q * p + r` to stay below the native modulus,
/// which leaves 3 bits of headroom over `max_bits`.
fn check_width<F: PrimeField>(max_bits: usize) -> SnarkyResult<()> {
    if max_bits.saturating_add(3) > F::MODULUS_BIT_SIZE as usize {
        return Err(SnarkyCompilationError::ValueTooWide {
            bits: max_bits,
            field_bits: F::MODULUS_BIT_SIZE,
        }
        .into());
    }
    Ok(())
}

/// Goldilocks and quadratic-extension arithmetic on top of a [RunState].
pub struct GoldilocksChip<'a, F: PrimeField> {
    sys: &'a mut RunState<F>,
}

impl<'a, F: PrimeField> GoldilocksChip<'a, F> {
    pub fn new(sys: &'a mut RunState<F>) -> Self {
        Self { sys }
    }

    pub fn sys(&mut self) -> &mut RunState<F> {
        &mut *self.sys
    }

    /// Tags `value` with its bit bound, rejecting bounds [Self::reduce] could not handle.
    fn bounded(&self, value: FieldVar<F>, max_bits: usize) -> SnarkyResult<GoldilocksVar<F>> {
        check_width::<F>(max_bits)?;
        Ok(GoldilocksVar::new(value, max_bits))
    }

    /// Allocates a witness value. It is only known to be below `2^64`, and is
    /// canonical once passed through [Self::range_check].
    pub fn alloc(&mut self, value: u64) -> SnarkyResult<GoldilocksVar<F>> {
        let var: FieldVar<F> = self.sys.compute(&loc!(), |_| F::from(value))?;
        Ok(GoldilocksVar::new(var, GOLDILOCKS_BITS))
    }

    pub fn alloc_extension(&mut self, limbs: [u64; 2]) -> SnarkyResult<QuadraticExtensionVar<F>> {
        Ok(QuadraticExtensionVar::new(
            self.alloc(limbs[0])?,
            self.alloc(limbs[1])?,
        ))
    }

    /// Constrains `x` to fit in `num_bits` bits and returns those bits, little-endian.
    pub fn bounded_range_check(
        &mut self,
        x: &GoldilocksVar<F>,
        num_bits: usize,
    ) -> SnarkyResult<Vec<Boolean<F>>> {
        if num_bits == 0 {
            self.sys
                .assert_eq(Some("goldilocks_zero_bits"), x.value.clone(), FieldVar::zero())?;
            return Ok(vec![]);
        }
        unpack_bits(self.sys, &x.value, num_bits, Some("goldilocks_bounded_range_check"))
    }

    /// Constrains `x` to be canonical, i.e. below `p = 2^64 - 2^32 + 1`.
    ///
    /// With `x = hi * 2^32 + lo` on 32-bit limbs, `x < p` iff `hi = 2^32 - 1`
    /// implies `lo = 0`.
    pub fn range_check(&mut self, x: &GoldilocksVar<F>) -> SnarkyResult<()> {
        let bits = unpack_bits(
            self.sys,
            &x.value,
            GOLDILOCKS_BITS,
            Some("goldilocks_range_check"),
        )?;
        let lo = pack(&bits[..32]);
        let hi = pack(&bits[32..]);

        let hi_is_max = hi.equal(self.sys, &FieldVar::constant(F::from(u64::from(u32::MAX))))?;
        self.sys.assert_r1cs(
            Some("goldilocks_canonical"),
            hi_is_max.to_field_var(),
            lo,
            FieldVar::zero(),
        )
    }

    /// Splits `x < 2^max_bits` into `x = q * p + r`, with `r` canonical.
    pub fn decompose(
        &mut self,
        x: &GoldilocksVar<F>,
        max_bits: usize,
    ) -> SnarkyResult<(GoldilocksVar<F>, GoldilocksVar<F>)> {
        // p > 2^63, so q < 2^(max_bits - 63)
        let quotient_bits = max_bits.saturating_sub(CANONICAL_BITS);
        let modulus = BigUint::from(MODULUS);

        if let Some(c) = x.value.to_constant() {
            let (q, r) = Into::<BigUint>::into(c).div_rem(&modulus);
            let q = GoldilocksVar::new(FieldVar::constant(F::from(q)), quotient_bits);
            let r = GoldilocksVar::new(FieldVar::constant(F::from(r)), GOLDILOCKS_BITS);
            return Ok((q, r));
        }

        let (q, r): (FieldVar<F>, FieldVar<F>) = self.sys.compute(&loc!(), |env| {
            let x: BigUint = env.read_var(&x.value).into();
            let (q, r) = x.div_rem(&modulus);
            (F::from(q), F::from(r))
        })?;
        let q = self.bounded(q, quotient_bits)?;
        let r = GoldilocksVar::new(r, GOLDILOCKS_BITS);

        self.bounded_range_check(&q, quotient_bits)?;
        self.range_check(&r)?;

        let recomposed = q.value.scale(F::from(MODULUS)) + &r.value;
        self.sys
            .assert_eq(Some("goldilocks_decompose"), recomposed, x.value.clone())?;
        Ok((q, r))
    }

    /// Returns the canonical representative of `x`.
    pub fn reduce(&mut self, x: &GoldilocksVar<F>) -> SnarkyResult<GoldilocksVar<F>> {
        if x.max_bits <= CANONICAL_BITS {
            return Ok(x.clone());
        }
        let (_, r) = self.decompose(x, x.max_bits)?;
        Ok(r)
    }

    /// `a + b` without reduction. Errors once the sum could exceed the
    /// headroom the native field leaves for a later [Self::reduce].
    pub fn add_no_reduce(
        &self,
        a: &GoldilocksVar<F>,
        b: &GoldilocksVar<F>,
    ) -> SnarkyResult<GoldilocksVar<F>> {
        self.bounded(&a.value + &b.value, max(a.max_bits, b.max_bits).saturating_add(1))
    }

    pub fn mul_no_reduce(
        &mut self,
        a: &GoldilocksVar<F>,
        b: &GoldilocksVar<F>,
    ) -> SnarkyResult<GoldilocksVar<F>> {
        let max_bits = a.max_bits.saturating_add(b.max_bits);
        check_width::<F>(max_bits)?;
        let value = a.value.mul(&b.value, Some("goldilocks_mul"), self.sys)?;
        Ok(GoldilocksVar::new(value, max_bits))
    }

    /// `a + k * p - b`, with `k` a power of two such that `k * p` covers `b`.
    pub fn sub_no_reduce(
        &self,
        a: &GoldilocksVar<F>,
        b: &GoldilocksVar<F>,
    ) -> SnarkyResult<GoldilocksVar<F>> {
        let k_bits = b.max_bits.saturating_sub(CANONICAL_BITS);
        let max_bits = max(a.max_bits, GOLDILOCKS_BITS.saturating_add(k_bits)).saturating_add(1);
        check_width::<F>(max_bits)?;
        let offset = BigUint::from(MODULUS) << k_bits;
        let value = &a.value + &FieldVar::constant(F::from(offset)) - &b.value;
        Ok(GoldilocksVar::new(value, max_bits))
    }

    pub fn add(
        &mut self,
        a: &GoldilocksVar<F>,
        b: &GoldilocksVar<F>,
    ) -> SnarkyResult<GoldilocksVar<F>> {
        let sum = self.add_no_reduce(a, b)?;
        self.reduce(&sum)
    }

    pub fn sub(
        &mut self,
        a: &GoldilocksVar<F>,
        b: &GoldilocksVar<F>,
    ) -> SnarkyResult<GoldilocksVar<F>> {
        let diff = self.sub_no_reduce(a, b)?;
        self.reduce(&diff)
    }

    pub fn mul(
        &mut self,
        a: &GoldilocksVar<F>,
        b: &GoldilocksVar<F>,
    ) -> SnarkyResult<GoldilocksVar<F>> {
        let product = self.mul_no_reduce(a, b)?;
        self.reduce(&product)
    }

    /// The inverse of `a`. The circuit is unsatisfiable if `a = 0`.
    pub fn inverse(&mut self, a: &GoldilocksVar<F>) -> SnarkyResult<GoldilocksVar<F>> {
        let a = self.reduce(a)?;
        let inv: FieldVar<F> = self.sys.compute(&loc!(), |env| {
            let x = read_goldilocks(env, &a);
            from_goldilocks(x.inverse().unwrap_or_default())
        })?;
        let inv = GoldilocksVar::new(inv, GOLDILOCKS_BITS);
        self.range_check(&inv)?;

        let product = self.mul(&a, &inv)?;
        self.sys
            .assert_eq(Some("goldilocks_inverse"), product.value, FieldVar::one())?;
        Ok(inv)
    }

    pub fn assert_is_equal(
        &mut self,
        a: &GoldilocksVar<F>,
        b: &GoldilocksVar<F>,
    ) -> SnarkyResult<()> {
        let a = self.reduce(a)?;
        let b = self.reduce(b)?;
        self.sys
            .assert_eq(Some("goldilocks_equal"), a.value, b.value)
    }

    /// `if selector { x } else { y }`, constraining `selector` to a single bit.
    pub fn select(
        &mut self,
        selector: &GoldilocksVar<F>,
        x: &GoldilocksVar<F>,
        y: &GoldilocksVar<F>,
    ) -> SnarkyResult<GoldilocksVar<F>> {
        let bits = self.bounded_range_check(selector, 1)?;
        let value = self.sys.if_(&bits[0], x.value.clone(), y.value.clone())?;
        Ok(GoldilocksVar::new(value, max(x.max_bits, y.max_bits)))
    }

    //
    // Quadratic extension
    //

    pub fn zero_extension(&self) -> QuadraticExtensionVar<F> {
        QuadraticExtensionVar::constant([0, 0])
    }

    pub fn one_extension(&self) -> QuadraticExtensionVar<F> {
        QuadraticExtensionVar::constant([1, 0])
    }

    pub fn range_check_extension(&mut self, x: &QuadraticExtensionVar<F>) -> SnarkyResult<()> {
        self.range_check(&x.c0)?;
        self.range_check(&x.c1)
    }

    pub fn reduce_extension(
        &mut self,
        x: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        Ok(QuadraticExtensionVar::new(
            self.reduce(&x.c0)?,
            self.reduce(&x.c1)?,
        ))
    }

    pub fn add_extension_no_reduce(
        &self,
        a: &QuadraticExtensionVar<F>,
        b: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        Ok(QuadraticExtensionVar::new(
            self.add_no_reduce(&a.c0, &b.c0)?,
            self.add_no_reduce(&a.c1, &b.c1)?,
        ))
    }

    pub fn add_extension(
        &mut self,
        a: &QuadraticExtensionVar<F>,
        b: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        let sum = self.add_extension_no_reduce(a, b)?;
        self.reduce_extension(&sum)
    }

    pub fn sub_extension(
        &mut self,
        a: &QuadraticExtensionVar<F>,
        b: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        Ok(QuadraticExtensionVar::new(
            self.sub(&a.c0, &b.c0)?,
            self.sub(&a.c1, &b.c1)?,
        ))
    }

    /// `(a0 b0 + 7 a1 b1) + (a0 b1 + a1 b0) w`, unreduced.
    pub fn mul_extension_no_reduce(
        &mut self,
        a: &QuadraticExtensionVar<F>,
        b: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        let a0b0 = self.mul_no_reduce(&a.c0, &b.c0)?;
        let a1b1 = self.mul_no_reduce(&a.c1, &b.c1)?;
        let w_a1b1 = self.mul_no_reduce(&a1b1, &GoldilocksVar::constant(W))?;
        let c0 = self.add_no_reduce(&a0b0, &w_a1b1)?;

        let a0b1 = self.mul_no_reduce(&a.c0, &b.c1)?;
        let a1b0 = self.mul_no_reduce(&a.c1, &b.c0)?;
        let c1 = self.add_no_reduce(&a0b1, &a1b0)?;

        Ok(QuadraticExtensionVar::new(c0, c1))
    }

    pub fn mul_extension(
        &mut self,
        a: &QuadraticExtensionVar<F>,
        b: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        let product = self.mul_extension_no_reduce(a, b)?;
        self.reduce_extension(&product)
    }

    pub fn scalar_mul_extension(
        &mut self,
        scalar: &GoldilocksVar<F>,
        a: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        Ok(QuadraticExtensionVar::new(
            self.mul(scalar, &a.c0)?,
            self.mul(scalar, &a.c1)?,
        ))
    }

    /// The inverse of `a`. The circuit is unsatisfiable if `a = 0`.
    pub fn inverse_extension(
        &mut self,
        a: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        let a = self.reduce_extension(a)?;
        let (c0, c1): (FieldVar<F>, FieldVar<F>) = self.sys.compute(&loc!(), |env| {
            let inv = read_extension(env, &a).inverse().unwrap_or_default();
            (from_goldilocks(inv.c0), from_goldilocks(inv.c1))
        })?;
        let inv = QuadraticExtensionVar::new(
            GoldilocksVar::new(c0, GOLDILOCKS_BITS),
            GoldilocksVar::new(c1, GOLDILOCKS_BITS),
        );
        self.range_check_extension(&inv)?;

        let product = self.mul_extension(&a, &inv)?;
        let one = self.one_extension();
        self.assert_is_equal_extension(&product, &one)?;
        Ok(inv)
    }

    pub fn assert_is_equal_extension(
        &mut self,
        a: &QuadraticExtensionVar<F>,
        b: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<()> {
        self.assert_is_equal(&a.c0, &b.c0)?;
        self.assert_is_equal(&a.c1, &b.c1)
    }
}
