use ark_ff::{
    fields::{Fp2, Fp2Config},
    MontFp,
};

use crate::fq::{Fq, GoldilocksField};

/// The quadratic non-residue defining the extension, `w^2 = 7`.
pub const W: u64 = 7;

pub struct Fq2Config;

impl Fp2Config for Fq2Config {
    type Fp = Fq;

    const NONRESIDUE: Fq = MontFp!("7");

    /// Coefficients for the Frobenius automorphism: `7^((p^i - 1) / 2)` for `i = 0, 1`.
    const FROBENIUS_COEFF_FP2_C1: &'static [Fq] = &[MontFp!("1"), MontFp!("18446744069414584320")];
}

pub type Fq2 = Fp2<Fq2Config>;

/// Conversions between extension elements and pairs of `u64` limbs `[c0, c1]`.
pub trait QuadraticExtension: Sized {
    fn from_noncanonical_u64s(limbs: [u64; 2]) -> Self;

    fn to_canonical_u64s(&self) -> [u64; 2];
}

impl QuadraticExtension for Fq2 {
    fn from_noncanonical_u64s(limbs: [u64; 2]) -> Self {
        Fq2::new(
            Fq::from_noncanonical_u64(limbs[0]),
            Fq::from_noncanonical_u64(limbs[1]),
        )
    }

    fn to_canonical_u64s(&self) -> [u64; 2] {
        [self.c0.to_canonical_u64(), self.c1.to_canonical_u64()]
    }
}
