//! The constraints a circuit is made of, and a compiled constraint system that
//! can be checked against a full witness.

use ark_ff::PrimeField;

use crate::{
    cvar::FieldVar,
    errors::{SnarkyRuntimeError, SnarkyRuntimeResult},
    runner::WitnessGeneration,
};

/// The basic R1CS-like constraints snarky knows about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BasicSnarkyConstraint<Var> {
    Boolean(Var),
    Equal(Var, Var),
    Square(Var, Var),
    R1CS(Var, Var, Var),
}

impl<F> BasicSnarkyConstraint<FieldVar<F>>
where
    F: PrimeField,
{
    /// Checks that the constraint holds for the values in `env`.
    pub fn check_constraint(
        &self,
        env: &impl WitnessGeneration<F>,
        label: &'static str,
    ) -> SnarkyRuntimeResult<()> {
        match self {
            BasicSnarkyConstraint::Boolean(v) => {
                let v = env.read_var(v);
                if !(v.is_one() || v.is_zero()) {
                    return Err(SnarkyRuntimeError::UnsatisfiedBooleanConstraint(
                        v.to_string(),
                        label,
                    ));
                }
            }
            BasicSnarkyConstraint::Equal(v1, v2) => {
                let v1 = env.read_var(v1);
                let v2 = env.read_var(v2);
                if v1 != v2 {
                    return Err(SnarkyRuntimeError::UnsatisfiedEqualConstraint(
                        v1.to_string(),
                        v2.to_string(),
                        label,
                    ));
                }
            }
            BasicSnarkyConstraint::Square(v1, v2) => {
                let v1 = env.read_var(v1);
                let v2 = env.read_var(v2);
                if v1.square() != v2 {
                    return Err(SnarkyRuntimeError::UnsatisfiedSquareConstraint(
                        v1.to_string(),
                        v2.to_string(),
                        label,
                    ));
                }
            }
            BasicSnarkyConstraint::R1CS(v1, v2, v3) => {
                let v1 = env.read_var(v1);
                let v2 = env.read_var(v2);
                let v3 = env.read_var(v3);
                if v1 * v2 != v3 {
                    return Err(SnarkyRuntimeError::UnsatisfiedR1CSConstraint(
                        v1.to_string(),
                        v2.to_string(),
                        v3.to_string(),
                        label,
                    ));
                }
            }
        }

        Ok(())
    }
}

/// A wrapper around [BasicSnarkyConstraint] that allows for an optional label (for debugging).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedConstraint<F: PrimeField> {
    pub annotation: Option<&'static str>,
    pub constraint: BasicSnarkyConstraint<FieldVar<F>>,
}

impl<F> AnnotatedConstraint<F>
where
    F: PrimeField,
{
    pub fn check_constraint(&self, env: &impl WitnessGeneration<F>) -> SnarkyRuntimeResult<()> {
        self.constraint
            .check_constraint(env, self.annotation.unwrap_or("<unknown>"))
    }
}

/// The constraints collected while compiling a circuit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnarkyConstraintSystem<F: PrimeField> {
    constraints: Vec<AnnotatedConstraint<F>>,
    num_vars: usize,
}

/// A full assignment of the variables of a compiled circuit.
struct Assignment<'a, F>(&'a [F]);

impl<F> WitnessGeneration<F> for Assignment<'_, F>
where
    F: PrimeField,
{
    fn read_var(&self, var: &FieldVar<F>) -> F {
        var.eval(&|idx| self.0[idx])
    }
}

impl<F> SnarkyConstraintSystem<F>
where
    F: PrimeField,
{
    pub fn new() -> Self {
        Self {
            constraints: vec![],
            num_vars: 0,
        }
    }

    pub(crate) fn add_constraint(&mut self, constraint: AnnotatedConstraint<F>) {
        self.constraints.push(constraint);
    }

    pub(crate) fn set_num_vars(&mut self, num_vars: usize) {
        self.num_vars = num_vars;
    }

    pub fn constraints(&self) -> &[AnnotatedConstraint<F>] {
        &self.constraints
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Checks every constraint against a full assignment of the variables,
    /// returning the first unsatisfied one.
    pub fn check_satisfied(&self, witness: &[F]) -> SnarkyRuntimeResult<()> {
        if witness.len() != self.num_vars {
            return Err(SnarkyRuntimeError::WitnessLength(
                witness.len(),
                self.num_vars,
            ));
        }
        let env = Assignment(witness);
        self.constraints
            .iter()
            .try_for_each(|c| c.check_constraint(&env))
    }
}
