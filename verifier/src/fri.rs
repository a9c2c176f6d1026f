//! The structure of a FRI instance: which oracles are committed, which
//! polynomials are opened, and at which points.

use std::ops::Range;

use ark_ff::PrimeField;
use goldilocks_field::GoldilocksField;
use wrap_snarky::errors::SnarkyResult;

use crate::{
    config::CommonCircuitData,
    gadgets::{GoldilocksChip, GoldilocksVar, QuadraticExtensionVar},
};

/// Describes an instance of a FRI-based batch opening.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FriInstanceInfo<P> {
    /// The oracles involved, not counting oracles created during the commit phase.
    pub oracles: Vec<FriOracleInfo>,
    /// Batches of openings, where each batch is associated with a particular point.
    pub batches: Vec<FriBatchInfo<P>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FriOracleInfo {
    pub num_polys: usize,
    /// Whether the leaves of this oracle are salted.
    pub blinding: bool,
}

/// A batch of openings at a particular point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FriBatchInfo<P> {
    pub point: P,
    pub polynomials: Vec<FriPolynomialInfo>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FriPolynomialInfo {
    /// Index into `FriInstanceInfo`'s `oracles` list.
    pub oracle_index: usize,
    /// Index of the polynomial within the oracle.
    pub polynomial_index: usize,
}

impl FriPolynomialInfo {
    pub fn from_range(oracle_index: usize, polynomial_indices: Range<usize>) -> Vec<Self> {
        polynomial_indices
            .map(|polynomial_index| FriPolynomialInfo {
                oracle_index,
                polynomial_index,
            })
            .collect()
    }
}

/// Opened values of each polynomial, batched by opening point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FriOpenings<E> {
    pub batches: Vec<FriOpeningBatch<E>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FriOpeningBatch<E> {
    pub values: Vec<E>,
}

impl<E> FriOpenings<E> {
    /// All opened values, batch after batch.
    pub fn values(&self) -> impl Iterator<Item = &E> {
        self.batches.iter().flat_map(|batch| batch.values.iter())
    }
}

impl CommonCircuitData {
    /// The FRI instance for an opening at `zeta`, with `g * zeta` computed in the circuit.
    pub fn get_fri_instance_circuit<F: PrimeField>(
        &self,
        gl: &mut GoldilocksChip<'_, F>,
        zeta: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<FriInstanceInfo<QuadraticExtensionVar<F>>> {
        let g = GoldilocksVar::constant(self.subgroup_generator().to_canonical_u64());
        let zeta_next = gl.scalar_mul_extension(&g, zeta)?;
        Ok(self.fri_instance_at(zeta.clone(), zeta_next))
    }
}
