//! Traits.

use ark_ff::PrimeField;

use crate::{
    cvar::FieldVar,
    errors::SnarkyResult,
    runner::{RunState, WitnessGeneration},
};

/// A snarky type is a type that can be used in a circuit.
/// It references an equivalent "out-of-circuit" type that one can use outside of the circuit.
pub trait SnarkyType<F>: Sized
where
    F: PrimeField,
{
    /// Some 'out-of-circuit' data, which is carried as part of Self.
    type Auxiliary;

    /// The equivalent "out-of-circuit" type.
    /// For example, the [crate::boolean::Boolean] snarky type has an out-of-circuit type of [bool].
    type OutOfCircuit;

    /// The number of field elements that this type takes.
    const SIZE_IN_FIELD_ELEMENTS: usize;

    /// Returns the circuit variables (and auxiliary data) behind this type.
    fn to_cvars(&self) -> (Vec<FieldVar<F>>, Self::Auxiliary);

    /// Creates a new instance of this type from the given circuit variables (And some auxiliary data).
    fn from_cvars_unsafe(cvars: Vec<FieldVar<F>>, aux: Self::Auxiliary) -> Self;

    /// Checks that the circuit variables behind this type are valid,
    /// by adding constraints to the run state.
    fn check(&self, cs: &mut RunState<F>) -> SnarkyResult<()>;

    /// The "default" value of [Self::Auxiliary].
    /// This is passed to [Self::from_cvars_unsafe] when we are not generating a witness.
    fn constraint_system_auxiliary() -> Self::Auxiliary;

    /// Converts an out-of-circuit value
    fn value_to_field_elements(value: &Self::OutOfCircuit) -> (Vec<F>, Self::Auxiliary);

    fn value_of_field_elements(fields: Vec<F>, aux: Self::Auxiliary) -> Self::OutOfCircuit;

    fn read<G>(&self, g: G) -> Self::OutOfCircuit
    where
        G: WitnessGeneration<F>,
    {
        let (cvars, aux) = self.to_cvars();
        let values = cvars.iter().map(|cvar| g.read_var(cvar)).collect();
        Self::value_of_field_elements(values, aux)
    }
}

//
// Auto traits
//

impl<F> SnarkyType<F> for ()
where
    F: PrimeField,
{
    type Auxiliary = ();

    type OutOfCircuit = ();

    const SIZE_IN_FIELD_ELEMENTS: usize = 0;

    fn to_cvars(&self) -> (Vec<FieldVar<F>>, Self::Auxiliary) {
        (vec![], ())
    }

    fn from_cvars_unsafe(_cvars: Vec<FieldVar<F>>, _aux: Self::Auxiliary) -> Self {}

    fn check(&self, _cs: &mut RunState<F>) -> SnarkyResult<()> {
        Ok(())
    }

    fn constraint_system_auxiliary() -> Self::Auxiliary {}

    fn value_to_field_elements(_value: &Self::OutOfCircuit) -> (Vec<F>, Self::Auxiliary) {
        (vec![], ())
    }

    fn value_of_field_elements(_fields: Vec<F>, _aux: Self::Auxiliary) -> Self::OutOfCircuit {}
}

impl<F, T1, T2> SnarkyType<F> for (T1, T2)
where
    F: PrimeField,
    T1: SnarkyType<F>,
    T2: SnarkyType<F>,
{
    type Auxiliary = (T1::Auxiliary, T2::Auxiliary);

    type OutOfCircuit = (T1::OutOfCircuit, T2::OutOfCircuit);

    const SIZE_IN_FIELD_ELEMENTS: usize = T1::SIZE_IN_FIELD_ELEMENTS + T2::SIZE_IN_FIELD_ELEMENTS;

    fn to_cvars(&self) -> (Vec<FieldVar<F>>, Self::Auxiliary) {
        let (mut cvars1, aux1) = self.0.to_cvars();
        let (cvars2, aux2) = self.1.to_cvars();
        cvars1.extend(cvars2);
        (cvars1, (aux1, aux2))
    }

    fn from_cvars_unsafe(mut cvars: Vec<FieldVar<F>>, aux: Self::Auxiliary) -> Self {
        assert_eq!(cvars.len(), Self::SIZE_IN_FIELD_ELEMENTS);
        let cvars2 = cvars.split_off(T1::SIZE_IN_FIELD_ELEMENTS);
        let t1 = T1::from_cvars_unsafe(cvars, aux.0);
        let t2 = T2::from_cvars_unsafe(cvars2, aux.1);
        (t1, t2)
    }

    fn check(&self, cs: &mut RunState<F>) -> SnarkyResult<()> {
        self.0.check(cs)?;
        self.1.check(cs)
    }

    fn constraint_system_auxiliary() -> Self::Auxiliary {
        (
            T1::constraint_system_auxiliary(),
            T2::constraint_system_auxiliary(),
        )
    }

    fn value_to_field_elements(value: &Self::OutOfCircuit) -> (Vec<F>, Self::Auxiliary) {
        let (mut v1, aux1) = T1::value_to_field_elements(&value.0);
        let (v2, aux2) = T2::value_to_field_elements(&value.1);
        v1.extend(v2);
        (v1, (aux1, aux2))
    }

    fn value_of_field_elements(mut fields: Vec<F>, aux: Self::Auxiliary) -> Self::OutOfCircuit {
        let fields2 = fields.split_off(T1::SIZE_IN_FIELD_ELEMENTS);
        let out1 = T1::value_of_field_elements(fields, aux.0);
        let out2 = T2::value_of_field_elements(fields2, aux.1);
        (out1, out2)
    }
}

impl<F, T, const N: usize> SnarkyType<F> for [T; N]
where
    F: PrimeField,
    T: SnarkyType<F>,
{
    type Auxiliary = Vec<T::Auxiliary>;

    type OutOfCircuit = [T::OutOfCircuit; N];

    const SIZE_IN_FIELD_ELEMENTS: usize = N * T::SIZE_IN_FIELD_ELEMENTS;

    fn to_cvars(&self) -> (Vec<FieldVar<F>>, Self::Auxiliary) {
        let mut cvars = Vec::with_capacity(Self::SIZE_IN_FIELD_ELEMENTS);
        let mut aux = Vec::with_capacity(N);
        for t in self {
            let (c, a) = t.to_cvars();
            cvars.extend(c);
            aux.push(a);
        }
        (cvars, aux)
    }

    fn from_cvars_unsafe(cvars: Vec<FieldVar<F>>, aux: Self::Auxiliary) -> Self {
        assert_eq!(cvars.len(), Self::SIZE_IN_FIELD_ELEMENTS);
        assert_eq!(aux.len(), N);
        let mut cvars = cvars.into_iter();
        let mut aux = aux.into_iter();
        std::array::from_fn(|_| {
            let chunk = cvars.by_ref().take(T::SIZE_IN_FIELD_ELEMENTS).collect();
            let a = aux.next().unwrap_or_else(T::constraint_system_auxiliary);
            T::from_cvars_unsafe(chunk, a)
        })
    }

    fn check(&self, cs: &mut RunState<F>) -> SnarkyResult<()> {
        for t in self {
            t.check(cs)?;
        }
        Ok(())
    }

    fn constraint_system_auxiliary() -> Self::Auxiliary {
        (0..N).map(|_| T::constraint_system_auxiliary()).collect()
    }

    fn value_to_field_elements(value: &Self::OutOfCircuit) -> (Vec<F>, Self::Auxiliary) {
        let mut fields = Vec::with_capacity(Self::SIZE_IN_FIELD_ELEMENTS);
        let mut aux = Vec::with_capacity(N);
        for v in value {
            let (f, a) = T::value_to_field_elements(v);
            fields.extend(f);
            aux.push(a);
        }
        (fields, aux)
    }

    fn value_of_field_elements(fields: Vec<F>, aux: Self::Auxiliary) -> Self::OutOfCircuit {
        let mut fields = fields.into_iter();
        let mut aux = aux.into_iter();
        std::array::from_fn(|_| {
            let chunk = fields.by_ref().take(T::SIZE_IN_FIELD_ELEMENTS).collect();
            let a = aux.next().unwrap_or_else(T::constraint_system_auxiliary);
            T::value_of_field_elements(chunk, a)
        })
    }
}
