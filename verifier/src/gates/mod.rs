//! Gates whose constraints the verifier re-evaluates at the opening point.

pub mod poseidon2;

use ark_ff::PrimeField;

use crate::{
    error::{ConfigError, VerifierResult},
    gadgets::{GoldilocksChip, HashOutVar, QuadraticExtensionVar},
};

pub use poseidon2::{Poseidon2Gate, Poseidon2GateLayout};

/// The values a gate sees on its row, opened at `zeta`.
#[derive(Clone, Copy, Debug)]
pub struct EvaluationVars<'a, F: PrimeField> {
    pub local_constants: &'a [QuadraticExtensionVar<F>],
    pub local_wires: &'a [QuadraticExtensionVar<F>],
    pub public_inputs_hash: &'a HashOutVar<F>,
}

/// A constraint template covering one row.
///
/// The caller multiplies every returned constraint by the gate's selector
/// before folding it into the vanishing polynomial.
pub trait Gate<F: PrimeField> {
    fn id(&self) -> String;

    fn num_wires(&self) -> usize;

    fn num_constraints(&self) -> usize;

    fn degree(&self) -> usize;

    fn eval_unfiltered_circuit(
        &self,
        gl: &mut GoldilocksChip<'_, F>,
        vars: EvaluationVars<'_, F>,
    ) -> VerifierResult<Vec<QuadraticExtensionVar<F>>>;
}

/// Builds the gate behind a serialized gate id.
///
/// Returns `Ok(None)` for gates this crate has no template for.
pub fn gate_from_id<F: PrimeField>(
    id: &str,
    num_wires: usize,
) -> Result<Option<Box<dyn Gate<F>>>, ConfigError> {
    Ok(Poseidon2Gate::from_id(id, num_wires)?.map(|gate| Box::new(gate) as Box<dyn Gate<F>>))
}
