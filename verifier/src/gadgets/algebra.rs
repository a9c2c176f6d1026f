//! Plugs the emulated Goldilocks arithmetic into the generic Poseidon2 rounds.

use ark_ff::PrimeField;
use goldilocks_poseidon2::Poseidon2Algebra;
use wrap_snarky::errors::{SnarkyError, SnarkyResult};

use super::goldilocks::{GoldilocksChip, GoldilocksVar, QuadraticExtensionVar};

impl<F: PrimeField> Poseidon2Algebra for GoldilocksChip<'_, F> {
    type Elem = GoldilocksVar<F>;
    type Error = SnarkyError;

    fn constant(&mut self, value: u64) -> SnarkyResult<GoldilocksVar<F>> {
        Ok(GoldilocksVar::constant(value))
    }

    fn add_no_reduce(
        &mut self,
        a: &GoldilocksVar<F>,
        b: &GoldilocksVar<F>,
    ) -> SnarkyResult<GoldilocksVar<F>> {
        GoldilocksChip::add_no_reduce(self, a, b)
    }

    fn mul_no_reduce(
        &mut self,
        a: &GoldilocksVar<F>,
        b: &GoldilocksVar<F>,
    ) -> SnarkyResult<GoldilocksVar<F>> {
        GoldilocksChip::mul_no_reduce(self, a, b)
    }

    fn sub(&mut self, a: &GoldilocksVar<F>, b: &GoldilocksVar<F>) -> SnarkyResult<GoldilocksVar<F>> {
        GoldilocksChip::sub(self, a, b)
    }

    fn reduce(&mut self, a: &GoldilocksVar<F>) -> SnarkyResult<GoldilocksVar<F>> {
        GoldilocksChip::reduce(self, a)
    }
}

/// The same chip, viewed as arithmetic over the quadratic extension.
pub struct ExtensionAlgebra<'c, 'a, F: PrimeField>(pub &'c mut GoldilocksChip<'a, F>);

impl<F: PrimeField> Poseidon2Algebra for ExtensionAlgebra<'_, '_, F> {
    type Elem = QuadraticExtensionVar<F>;
    type Error = SnarkyError;

    fn constant(&mut self, value: u64) -> SnarkyResult<QuadraticExtensionVar<F>> {
        Ok(QuadraticExtensionVar::from_base(GoldilocksVar::constant(
            value,
        )))
    }

    fn add_no_reduce(
        &mut self,
        a: &QuadraticExtensionVar<F>,
        b: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        self.0.add_extension_no_reduce(a, b)
    }

    fn mul_no_reduce(
        &mut self,
        a: &QuadraticExtensionVar<F>,
        b: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        self.0.mul_extension_no_reduce(a, b)
    }

    fn sub(
        &mut self,
        a: &QuadraticExtensionVar<F>,
        b: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        self.0.sub_extension(a, b)
    }

    fn reduce(&mut self, a: &QuadraticExtensionVar<F>) -> SnarkyResult<QuadraticExtensionVar<F>> {
        self.0.reduce_extension(a)
    }
}
