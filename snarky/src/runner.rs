//! The circuit-generation and witness-generation logic.

use ark_ff::PrimeField;
use log::{debug, trace};

use crate::{
    boolean::Boolean,
    constraint_system::{AnnotatedConstraint, BasicSnarkyConstraint, SnarkyConstraintSystem},
    cvar::FieldVar,
    errors::{SnarkyError, SnarkyResult, SnarkyRuntimeError, SnarkyRuntimeResult},
    loc,
    snarky_type::SnarkyType,
};

/// The state used when compiling a circuit in snarky, or used in witness generation as well.
#[derive(Debug)]
pub struct RunState<F>
where
    F: PrimeField,
{
    /// The constraint system used to build the circuit.
    /// If not set, the constraint system is not built.
    system: Option<SnarkyConstraintSystem<F>>,

    /// The values of every allocated variable, in witness generation.
    witness: Vec<F>,

    /// If set, the witness generation returns an error as soon as an assertion fails,
    /// instead of only remembering it.
    pub eval_constraints: bool,

    /// The first constraint found unsatisfied, in witness generation or on constants.
    unsatisfied: Option<SnarkyRuntimeError>,

    /// A counter used to track variables as they're being created.
    next_var: usize,

    /// Indication that we're running the witness generation.
    has_witness: bool,

    /// Number of non-trivial constraints seen so far, in either mode.
    num_constraints: usize,
}

/// A witness generation environment.
/// This is passed to any closure in [RunState::compute] so that they can access the witness generation environment.
pub trait WitnessGeneration<F>
where
    F: PrimeField,
{
    /// Allows the caller to obtain the value behind a circuit variable.
    fn read_var(&self, var: &FieldVar<F>) -> F;
}

impl<F: PrimeField, G: WitnessGeneration<F>> WitnessGeneration<F> for &G {
    fn read_var(&self, var: &FieldVar<F>) -> F {
        G::read_var(*self, var)
    }
}

impl<F: PrimeField> WitnessGeneration<F> for &dyn WitnessGeneration<F> {
    fn read_var(&self, var: &FieldVar<F>) -> F {
        (**self).read_var(var)
    }
}

impl<F> WitnessGeneration<F> for RunState<F>
where
    F: PrimeField,
{
    fn read_var(&self, var: &FieldVar<F>) -> F {
        var.eval(&|idx| self.read_var_idx(idx))
    }
}

/// Only used on constraints that contain no variables.
struct ConstantEnv;

impl<F> WitnessGeneration<F> for ConstantEnv
where
    F: PrimeField,
{
    fn read_var(&self, var: &FieldVar<F>) -> F {
        var.eval(&|_| F::zero())
    }
}

fn is_constant<F: PrimeField>(c: &BasicSnarkyConstraint<FieldVar<F>>) -> bool {
    match c {
        BasicSnarkyConstraint::Boolean(v) => v.to_constant().is_some(),
        BasicSnarkyConstraint::Equal(a, b) | BasicSnarkyConstraint::Square(a, b) => {
            a.to_constant().is_some() && b.to_constant().is_some()
        }
        BasicSnarkyConstraint::R1CS(a, b, c) => {
            a.to_constant().is_some() && b.to_constant().is_some() && c.to_constant().is_some()
        }
    }
}

impl<F> RunState<F>
where
    F: PrimeField,
{
    /// A run state that only builds the constraint system.
    pub fn compile() -> Self {
        Self {
            system: Some(SnarkyConstraintSystem::new()),
            witness: vec![],
            eval_constraints: false,
            unsatisfied: None,
            next_var: 0,
            has_witness: false,
            num_constraints: 0,
        }
    }

    /// A run state that computes a witness and checks every constraint on the way.
    pub fn witness() -> Self {
        Self {
            system: None,
            witness: vec![],
            eval_constraints: false,
            unsatisfied: None,
            next_var: 0,
            has_witness: true,
            num_constraints: 0,
        }
    }

    pub fn has_witness(&self) -> bool {
        self.has_witness
    }

    pub fn num_constraints(&self) -> usize {
        self.num_constraints
    }

    pub fn num_vars(&self) -> usize {
        self.next_var
    }

    pub fn system(&self) -> Option<&SnarkyConstraintSystem<F>> {
        self.system.as_ref()
    }

    /// Returns the compiled constraint system, if this run state was compiling.
    pub fn into_system(self) -> Option<SnarkyConstraintSystem<F>> {
        let num_vars = self.next_var;
        self.system.map(|mut cs| {
            cs.set_num_vars(num_vars);
            cs
        })
    }

    /// The values assigned so far, indexed by variable.
    pub fn witness_values(&self) -> &[F] {
        &self.witness
    }

    /// Returns the first unsatisfied constraint seen so far, if any.
    ///
    /// In compile mode this only reports assertions between constants.
    pub fn check_satisfied(&self) -> SnarkyRuntimeResult<()> {
        match &self.unsatisfied {
            None => Ok(()),
            Some(e) => Err(e.clone()),
        }
    }

    fn record_unsatisfied(&mut self, e: SnarkyRuntimeError) -> SnarkyResult<()> {
        debug!("{e}");
        if self.eval_constraints {
            return Err(SnarkyError::RuntimeError(e));
        }
        if self.unsatisfied.is_none() {
            self.unsatisfied = Some(e);
        }
        Ok(())
    }

    /// Can panic if used with a wrong index.
    pub fn read_var_idx(&self, idx: usize) -> F {
        self.witness[idx]
    }

    /// Allocates a new var.
    fn alloc_var(&mut self) -> FieldVar<F> {
        let v = self.next_var;
        self.next_var += 1;
        FieldVar::Var(v)
    }

    /// Stores a field element as an unconstrained private input.
    fn store_field_elt(&mut self, x: F) -> FieldVar<F> {
        let v = self.next_var;
        self.next_var += 1;
        self.witness.push(x);
        FieldVar::Var(v)
    }

    /// Creates a new non-deterministic variable associated to a value type ([SnarkyType]),
    /// and a closure that can compute it when in witness generation mode.
    pub fn compute<T, FUNC>(&mut self, loc: &str, to_compute_value: FUNC) -> SnarkyResult<T>
    where
        T: SnarkyType<F>,
        FUNC: FnOnce(&dyn WitnessGeneration<F>) -> T::OutOfCircuit,
    {
        self.compute_inner(true, loc, to_compute_value)
    }

    /// Same as [Self::compute] except that it does not attempt to constrain the value it computes.
    /// This is to be used when the caller constrains the value itself.
    pub fn compute_unsafe<T, FUNC>(&mut self, loc: &str, to_compute_value: FUNC) -> SnarkyResult<T>
    where
        T: SnarkyType<F>,
        FUNC: FnOnce(&dyn WitnessGeneration<F>) -> T::OutOfCircuit,
    {
        self.compute_inner(false, loc, to_compute_value)
    }

    fn compute_inner<T, FUNC>(
        &mut self,
        checked: bool,
        loc: &str,
        to_compute_value: FUNC,
    ) -> SnarkyResult<T>
    where
        T: SnarkyType<F>,
        FUNC: FnOnce(&dyn WitnessGeneration<F>) -> T::OutOfCircuit,
    {
        let snarky_type = if self.has_witness {
            // compute the value by running the closure
            let value: T::OutOfCircuit = to_compute_value(&*self);

            // convert the value into field elements
            let (fields, aux) = T::value_to_field_elements(&value);
            let field_vars = fields
                .into_iter()
                .map(|field| self.store_field_elt(field))
                .collect();

            T::from_cvars_unsafe(field_vars, aux)
        } else {
            // create enough variables to store the given type
            let cvars = (0..T::SIZE_IN_FIELD_ELEMENTS)
                .map(|_| self.alloc_var())
                .collect();

            let aux = T::constraint_system_auxiliary();
            T::from_cvars_unsafe(cvars, aux)
        };

        trace!(
            "{loc}: allocated {} variable(s)",
            T::SIZE_IN_FIELD_ELEMENTS
        );

        // constrain the created circuit variables
        if checked {
            snarky_type.check(self)?;
        }

        Ok(snarky_type)
    }

    /// Handles a list of [BasicSnarkyConstraint].
    pub fn assert_(
        &mut self,
        annotation: Option<&'static str>,
        basic_constraints: Vec<BasicSnarkyConstraint<FieldVar<F>>>,
    ) -> SnarkyResult<()> {
        let constraints: Vec<_> = basic_constraints
            .into_iter()
            .map(|constraint| AnnotatedConstraint {
                annotation,
                constraint,
            })
            .collect();

        self.add_constraints(constraints)
    }

    /// Creates a constraint for `assert_eq!(a * b, c)`.
    pub fn assert_r1cs(
        &mut self,
        annotation: Option<&'static str>,
        a: FieldVar<F>,
        b: FieldVar<F>,
        c: FieldVar<F>,
    ) -> SnarkyResult<()> {
        let constraint = BasicSnarkyConstraint::R1CS(a, b, c);
        self.assert_(annotation, vec![constraint])
    }

    /// Creates a constraint for `assert_eq!(x, y)`;
    pub fn assert_eq(
        &mut self,
        annotation: Option<&'static str>,
        x: FieldVar<F>,
        y: FieldVar<F>,
    ) -> SnarkyResult<()> {
        let constraint = BasicSnarkyConstraint::Equal(x, y);
        self.assert_(annotation, vec![constraint])
    }

    /// Creates a constraint for `assert_eq!(x * x, y)`;
    pub fn assert_square(
        &mut self,
        annotation: Option<&'static str>,
        x: FieldVar<F>,
        y: FieldVar<F>,
    ) -> SnarkyResult<()> {
        let constraint = BasicSnarkyConstraint::Square(x, y);
        self.assert_(annotation, vec![constraint])
    }

    /// Creates a constraint asserting that `x` is 0 or 1.
    pub fn assert_boolean(
        &mut self,
        annotation: Option<&'static str>,
        x: FieldVar<F>,
    ) -> SnarkyResult<()> {
        let constraint = BasicSnarkyConstraint::Boolean(x);
        self.assert_(annotation, vec![constraint])
    }

    /// Adds a list of [AnnotatedConstraint]s to the circuit.
    ///
    /// Satisfied constraints over constants only are dropped. Unsatisfied ones
    /// are kept, so that the compiled system is unsatisfiable too.
    pub fn add_constraints(&mut self, constraints: Vec<AnnotatedConstraint<F>>) -> SnarkyResult<()> {
        for constraint in constraints {
            if is_constant(&constraint.constraint) {
                match constraint.check_constraint(&ConstantEnv) {
                    Ok(()) => continue,
                    Err(e) => self.record_unsatisfied(e)?,
                }
            } else if self.has_witness {
                if let Err(e) = constraint.check_constraint(&*self) {
                    self.record_unsatisfied(e)?;
                }
            }

            self.num_constraints += 1;
            if let Some(cs) = &mut self.system {
                cs.add_constraint(constraint);
            }
        }

        Ok(())
    }

    /// Adds a constraint that returns `then_` if `b` is `true`, `else_` otherwise.
    /// Equivalent to `if b { then_ } else { else_ }`.
    pub fn if_(
        &mut self,
        b: &Boolean<F>,
        then_: FieldVar<F>,
        else_: FieldVar<F>,
    ) -> SnarkyResult<FieldVar<F>> {
        // r = e + b (t - e)
        // r - e = b (t - e)
        let b = b.to_field_var();
        if let Some(b) = b.to_constant() {
            if b.is_one() {
                return Ok(then_);
            } else {
                return Ok(else_);
            }
        }

        match (then_.to_constant(), else_.to_constant()) {
            (Some(t), Some(e)) => {
                let t_times_b = b.scale(t);
                let one_minus_b = FieldVar::one() - &b;
                Ok(t_times_b + &one_minus_b.scale(e))
            }
            _ => {
                let res: FieldVar<F> = self.compute(&loc!(), |env| {
                    let b = env.read_var(&b);
                    let res_var = if b == F::one() { &then_ } else { &else_ };
                    env.read_var(res_var)
                })?;
                let then_ = &then_ - &else_;
                let else_ = &res - &else_;
                self.assert_r1cs(Some("if_"), b, then_, else_)?;

                Ok(res)
            }
        }
    }
}
