use ark_ff::{
    fields::{MontBackend, MontConfig},
    Fp64, PrimeField,
};

/// The Goldilocks modulus, `2^64 - 2^32 + 1`.
pub const MODULUS: u64 = 0xFFFF_FFFF_0000_0001;

/// `2^64 - p`, so that `2^64 = EPSILON` in the field.
pub const EPSILON: u64 = 0xFFFF_FFFF;

/// A primitive `2^32`-th root of unity, `7^((p - 1) / 2^32)`.
pub const TWO_ADIC_GENERATOR: u64 = 0x1856_29dc_da58_878c;

#[derive(MontConfig)]
#[modulus = "18446744069414584321"]
#[generator = "7"]
pub struct FqConfig;
pub type Fq = Fp64<MontBackend<FqConfig, 1>>;

/// Conversions between Goldilocks elements and their `u64` representation.
pub trait GoldilocksField: Sized {
    /// Reduces any `u64` modulo `p`.
    fn from_noncanonical_u64(x: u64) -> Self;

    /// Returns the unique representative in `[0, p)`.
    fn to_canonical_u64(&self) -> u64;

    /// Returns `Some` only if `x < p`.
    fn from_canonical_u64(x: u64) -> Option<Self> {
        (x < MODULUS).then(|| Self::from_noncanonical_u64(x))
    }
}

impl GoldilocksField for Fq {
    fn from_noncanonical_u64(x: u64) -> Self {
        Fq::from_le_bytes_mod_order(&x.to_le_bytes())
    }

    fn to_canonical_u64(&self) -> u64 {
        self.into_bigint().0[0]
    }
}
