use std::ops::{Add, Neg, Sub};

use ark_ff::PrimeField;

use crate::{
    boolean::Boolean,
    errors::SnarkyResult,
    loc,
    runner::{RunState, WitnessGeneration},
    snarky_type::SnarkyType,
};

/// A circuit variable represents a field element in the circuit.
///
/// Linear combinations are kept symbolic: only [FieldVar::mul] and friends
/// allocate new variables and constraints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldVar<F>
where
    F: PrimeField,
{
    Constant(F),
    Var(usize),
    Add(Box<FieldVar<F>>, Box<FieldVar<F>>),
    Scale(F, Box<FieldVar<F>>),
}

pub type Term<F> = (F, usize);

pub type ScaledCVar<F> = (F, FieldVar<F>);

impl<F> FieldVar<F>
where
    F: PrimeField,
{
    pub fn zero() -> Self {
        FieldVar::Constant(F::zero())
    }

    pub fn one() -> Self {
        FieldVar::Constant(F::one())
    }

    pub fn constant(c: F) -> Self {
        FieldVar::Constant(c)
    }

    /// Returns the value if the variable is a constant expression.
    pub fn to_constant(&self) -> Option<F> {
        match self {
            FieldVar::Constant(c) => Some(*c),
            FieldVar::Var(_) => None,
            FieldVar::Add(a, b) => Some(a.to_constant()? + b.to_constant()?),
            FieldVar::Scale(s, v) => Some(*s * v.to_constant()?),
        }
    }

    fn eval_inner(&self, context: &impl Fn(usize) -> F, scale: F, res: &mut F) {
        match self {
            FieldVar::Constant(c) => {
                *res += scale * c;
            }
            FieldVar::Var(v) => {
                let v = context(*v);
                *res += scale * v;
            }
            FieldVar::Add(a, b) => {
                a.eval_inner(context, scale, res);
                b.eval_inner(context, scale, res);
            }
            FieldVar::Scale(s, v) => {
                v.eval_inner(context, scale * s, res);
            }
        }
    }

    /// Evaluate the field element associated to a variable (used during witness generation)
    pub fn eval(&self, context: &impl Fn(usize) -> F) -> F {
        let mut res = F::zero();
        self.eval_inner(context, F::one(), &mut res);
        res
    }

    fn to_constant_and_terms_inner(
        &self,
        scale: F,
        constant: F,
        mut terms: Vec<Term<F>>,
    ) -> (F, Vec<Term<F>>) {
        match self {
            FieldVar::Constant(c) => (constant + (scale * c), terms),
            FieldVar::Var(v) => {
                terms.push((scale, *v));
                (constant, terms)
            }
            FieldVar::Scale(s, t) => t.to_constant_and_terms_inner(scale * s, constant, terms),
            FieldVar::Add(x1, x2) => {
                let (c1, terms1) = x1.to_constant_and_terms_inner(scale, constant, terms);
                x2.to_constant_and_terms_inner(scale, c1, terms1)
            }
        }
    }

    pub fn to_constant_and_terms(&self) -> (Option<F>, Vec<Term<F>>) {
        let (constant, terms) = self.to_constant_and_terms_inner(F::one(), F::zero(), vec![]);
        let constant = if constant.is_zero() {
            None
        } else {
            Some(constant)
        };
        (constant, terms)
    }

    pub fn scale(&self, scalar: F) -> Self {
        if scalar.is_zero() {
            return FieldVar::Constant(scalar);
        } else if scalar.is_one() {
            return self.clone();
        }

        match self {
            FieldVar::Constant(x) => FieldVar::Constant(*x * scalar),
            FieldVar::Scale(s, v) => FieldVar::Scale(*s * scalar, v.clone()),
            FieldVar::Var(_) | FieldVar::Add(..) => FieldVar::Scale(scalar, Box::new(self.clone())),
        }
    }

    pub fn linear_combination(terms: &[ScaledCVar<F>]) -> Self {
        let mut res = FieldVar::zero();
        for (cst, term) in terms {
            res = &res + &term.scale(*cst);
        }
        res
    }

    pub fn sum(vs: &[&Self]) -> Self {
        let terms: Vec<_> = vs.iter().map(|v| (F::one(), (*v).clone())).collect();
        Self::linear_combination(&terms)
    }

    pub fn mul(
        &self,
        other: &Self,
        label: Option<&'static str>,
        cs: &mut RunState<F>,
    ) -> SnarkyResult<Self> {
        let res = match (self, other) {
            (FieldVar::Constant(x), FieldVar::Constant(y)) => FieldVar::Constant(*x * y),

            (FieldVar::Constant(cst), _) | (_, FieldVar::Constant(cst)) if cst.is_zero() => {
                FieldVar::zero()
            }

            (FieldVar::Constant(cst), cvar) | (cvar, FieldVar::Constant(cst)) if cst.is_one() => {
                cvar.clone()
            }

            (FieldVar::Constant(cst), cvar) | (cvar, FieldVar::Constant(cst)) => cvar.scale(*cst),

            (_, _) => {
                let res: FieldVar<F> = cs.compute(&loc!(), |env| {
                    let x: F = env.read_var(self);
                    let y: F = env.read_var(other);
                    x * y
                })?;

                let label = label.or(Some("checked_mul"));

                cs.assert_r1cs(label, self.clone(), other.clone(), res.clone())?;
                res
            }
        };

        Ok(res)
    }

    pub fn square(&self, label: Option<&'static str>, cs: &mut RunState<F>) -> SnarkyResult<Self> {
        match self {
            FieldVar::Constant(x) => Ok(FieldVar::Constant(x.square())),
            _ => {
                let res: FieldVar<F> = cs.compute(&loc!(), |env| env.read_var(self).square())?;
                cs.assert_square(label.or(Some("checked_square")), self.clone(), res.clone())?;
                Ok(res)
            }
        }
    }

    /// Returns the inverse of a non-zero variable.
    ///
    /// If the variable is zero the witness gets a zero inverse and the
    /// constraint `x * x_inv = 1` fails.
    pub fn inv(&self, label: Option<&'static str>, cs: &mut RunState<F>) -> SnarkyResult<Self> {
        match self {
            FieldVar::Constant(x) => match x.inverse() {
                Some(inv) => Ok(FieldVar::Constant(inv)),
                None => {
                    cs.assert_eq(label.or(Some("field_inverse")), Self::one(), Self::zero())?;
                    Ok(Self::zero())
                }
            },
            _ => {
                let res: FieldVar<F> = cs.compute(&loc!(), |env| {
                    env.read_var(self).inverse().unwrap_or_else(F::zero)
                })?;
                cs.assert_r1cs(
                    label.or(Some("field_inverse")),
                    self.clone(),
                    res.clone(),
                    Self::one(),
                )?;
                Ok(res)
            }
        }
    }

    /** [equal_constraints z z_inv r] asserts that
       if z = 0 then r = 1, or
       if z <> 0 then r = 0 and z * z_inv = 1
    */
    fn equal_constraints(
        state: &mut RunState<F>,
        z: Self,
        z_inv: Self,
        r: Self,
    ) -> SnarkyResult<()> {
        let one_minus_r = FieldVar::one() - &r;
        state.assert_r1cs(Some("equals_1"), z_inv, z.clone(), one_minus_r)?;
        state.assert_r1cs(Some("equals_2"), r, z, FieldVar::zero())
    }

    /** [equal_vars z] computes [(r, z_inv)] that satisfy the constraints in
    [equal_constraints z z_inv r].

    In particular, [r] is [1] if [z = 0] and [0] otherwise.
    */
    fn equal_vars(env: &dyn WitnessGeneration<F>, z: &FieldVar<F>) -> (F, F) {
        let z: F = env.read_var(z);
        if let Some(z_inv) = z.inverse() {
            (F::zero(), z_inv)
        } else {
            (F::one(), F::zero())
        }
    }

    /// Returns a boolean that is true iff `self == other`.
    pub fn equal(&self, state: &mut RunState<F>, other: &FieldVar<F>) -> SnarkyResult<Boolean<F>> {
        let z = self - other;
        match z.to_constant() {
            Some(z) => Ok(Boolean::from_constant(z.is_zero())),
            None => {
                let (res, z_inv): (FieldVar<F>, FieldVar<F>) =
                    state.compute(&loc!(), |env| Self::equal_vars(env, &z))?;
                Self::equal_constraints(state, z, z_inv, res.clone())?;
                Ok(Boolean::create_unsafe(res))
            }
        }
    }
}

//
// Traits
//

impl<F> SnarkyType<F> for FieldVar<F>
where
    F: PrimeField,
{
    type Auxiliary = ();

    type OutOfCircuit = F;

    const SIZE_IN_FIELD_ELEMENTS: usize = 1;

    fn to_cvars(&self) -> (Vec<FieldVar<F>>, Self::Auxiliary) {
        (vec![self.clone()], ())
    }

    fn from_cvars_unsafe(cvars: Vec<FieldVar<F>>, _aux: Self::Auxiliary) -> Self {
        assert_eq!(cvars.len(), Self::SIZE_IN_FIELD_ELEMENTS);
        cvars[0].clone()
    }

    fn check(&self, _cs: &mut RunState<F>) -> SnarkyResult<()> {
        // do nothing
        Ok(())
    }

    fn constraint_system_auxiliary() -> Self::Auxiliary {}

    fn value_to_field_elements(x: &Self::OutOfCircuit) -> (Vec<F>, Self::Auxiliary) {
        (vec![*x], ())
    }

    fn value_of_field_elements(fields: Vec<F>, _aux: Self::Auxiliary) -> Self::OutOfCircuit {
        assert_eq!(fields.len(), 1);

        fields[0]
    }
}

//
// Operations
//

impl<F> Add for &FieldVar<F>
where
    F: PrimeField,
{
    type Output = FieldVar<F>;

    fn add(self, other: Self) -> Self::Output {
        match (self, other) {
            (FieldVar::Constant(x), y) | (y, FieldVar::Constant(x)) if x.is_zero() => y.clone(),
            (FieldVar::Constant(x), FieldVar::Constant(y)) => FieldVar::Constant(*x + y),
            (_, _) => FieldVar::Add(Box::new(self.clone()), Box::new(other.clone())),
        }
    }
}

impl<F> Add<Self> for FieldVar<F>
where
    F: PrimeField,
{
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        &self + &other
    }
}

impl<'a, F> Add<&'a Self> for FieldVar<F>
where
    F: PrimeField,
{
    type Output = Self;

    fn add(self, other: &Self) -> Self::Output {
        &self + other
    }
}

impl<F> Add<FieldVar<F>> for &FieldVar<F>
where
    F: PrimeField,
{
    type Output = FieldVar<F>;

    fn add(self, other: FieldVar<F>) -> Self::Output {
        self + &other
    }
}

impl<F> Sub for &FieldVar<F>
where
    F: PrimeField,
{
    type Output = FieldVar<F>;

    fn sub(self, other: Self) -> Self::Output {
        match (self, other) {
            (x, FieldVar::Constant(y)) if y.is_zero() => x.clone(),
            (FieldVar::Constant(x), FieldVar::Constant(y)) => FieldVar::Constant(*x - y),
            _ => self + &other.scale(-F::one()),
        }
    }
}

impl<F> Sub<FieldVar<F>> for FieldVar<F>
where
    F: PrimeField,
{
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        &self - &other
    }
}

impl<'a, F> Sub<&'a FieldVar<F>> for FieldVar<F>
where
    F: PrimeField,
{
    type Output = Self;

    fn sub(self, other: &Self) -> Self::Output {
        &self - other
    }
}

impl<F> Sub<FieldVar<F>> for &FieldVar<F>
where
    F: PrimeField,
{
    type Output = FieldVar<F>;

    fn sub(self, other: FieldVar<F>) -> Self::Output {
        self - &other
    }
}

impl<F> Neg for &FieldVar<F>
where
    F: PrimeField,
{
    type Output = FieldVar<F>;

    fn neg(self) -> Self::Output {
        self.scale(-F::one())
    }
}

impl<F> Neg for FieldVar<F>
where
    F: PrimeField,
{
    type Output = FieldVar<F>;

    fn neg(self) -> Self::Output {
        self.scale(-F::one())
    }
}
