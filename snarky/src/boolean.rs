use ark_ff::PrimeField;

use crate::{
    constraint_system::BasicSnarkyConstraint, cvar::FieldVar, errors::SnarkyResult,
    runner::RunState, snarky_type::SnarkyType,
};

/// A boolean variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boolean<F: PrimeField>(FieldVar<F>);

impl<F> SnarkyType<F> for Boolean<F>
where
    F: PrimeField,
{
    type Auxiliary = ();

    type OutOfCircuit = bool;

    const SIZE_IN_FIELD_ELEMENTS: usize = 1;

    fn to_cvars(&self) -> (Vec<FieldVar<F>>, Self::Auxiliary) {
        (vec![self.0.clone()], ())
    }

    fn from_cvars_unsafe(cvars: Vec<FieldVar<F>>, _aux: Self::Auxiliary) -> Self {
        assert_eq!(cvars.len(), Self::SIZE_IN_FIELD_ELEMENTS);
        Self(cvars[0].clone())
    }

    fn check(&self, cs: &mut RunState<F>) -> SnarkyResult<()> {
        let constraint = BasicSnarkyConstraint::Boolean(self.0.clone());
        cs.assert_(Some("boolean check"), vec![constraint])
    }

    fn constraint_system_auxiliary() -> Self::Auxiliary {}

    fn value_to_field_elements(value: &Self::OutOfCircuit) -> (Vec<F>, Self::Auxiliary) {
        if *value {
            (vec![F::one()], ())
        } else {
            (vec![F::zero()], ())
        }
    }

    fn value_of_field_elements(fields: Vec<F>, _aux: Self::Auxiliary) -> Self::OutOfCircuit {
        assert_eq!(fields.len(), 1);

        fields[0] != F::zero()
    }
}

impl<F> Boolean<F>
where
    F: PrimeField,
{
    pub fn true_() -> Self {
        Self(FieldVar::one())
    }

    pub fn false_() -> Self {
        Self(FieldVar::zero())
    }

    pub fn from_constant(b: bool) -> Self {
        if b {
            Self::true_()
        } else {
            Self::false_()
        }
    }

    /// Wraps a variable without constraining it to be 0 or 1.
    pub fn create_unsafe(x: FieldVar<F>) -> Self {
        Self(x)
    }

    pub fn to_field_var(&self) -> FieldVar<F> {
        self.0.clone()
    }

    pub fn to_constant(&self) -> Option<bool> {
        self.0.to_constant().map(|x| x == F::one())
    }

    pub fn not(&self) -> Self {
        Self(FieldVar::one() - &self.0)
    }

    pub fn and(&self, other: &Self, cs: &mut RunState<F>) -> SnarkyResult<Self> {
        let res = self.0.mul(&other.0, Some("bool.and"), cs)?;
        Ok(Self(res))
    }

    pub fn or(&self, other: &Self, cs: &mut RunState<F>) -> SnarkyResult<Self> {
        let both_false = self.not().and(&other.not(), cs)?;
        Ok(both_false.not())
    }

    pub fn all(xs: &[Self], cs: &mut RunState<F>) -> SnarkyResult<Self> {
        let mut res = Self::true_();
        for x in xs {
            res = res.and(x, cs)?;
        }
        Ok(res)
    }

    /// Constrains the boolean to be true.
    pub fn assert_true(&self, label: Option<&'static str>, cs: &mut RunState<F>) -> SnarkyResult<()> {
        cs.assert_eq(label, self.0.clone(), FieldVar::one())
    }
}
