//! Poseidon2 over Goldilocks with width 12, rate 8, 8 full rounds, 22 partial
//! rounds and the `x^7` S-box.
//!
//! The round functions are generic over [algebra::Poseidon2Algebra], so the
//! native hashers below and in-circuit gadgets share one implementation.

pub mod algebra;
pub mod constants;
pub mod hashing;
pub mod permutation;
pub mod sponge;

use goldilocks_field::{Fq, Fq2, GoldilocksField};

use algebra::{infallible, NativeAlgebra};
use constants::WIDTH;

pub use algebra::Poseidon2Algebra;
pub use hashing::HashOut;
pub use permutation::SBoxSite;
pub use sponge::{Challenger, DuplexSponge};

/// Permutes a native Goldilocks state.
pub fn permute(state: [Fq; WIDTH]) -> [Fq; WIDTH] {
    infallible(permutation::permute(&mut NativeAlgebra::new(), state))
}

/// Permutes a state of extension elements, lane by lane in the extension.
pub fn permute_extension(state: [Fq2; WIDTH]) -> [Fq2; WIDTH] {
    infallible(permutation::permute(&mut NativeAlgebra::new(), state))
}

/// Permutes canonical `u64` lanes.
pub fn permute_u64(state: [u64; WIDTH]) -> [u64; WIDTH] {
    let state = permute(state.map(Fq::from_noncanonical_u64));
    state.map(|x| x.to_canonical_u64())
}

pub fn hash_no_pad(inputs: &[Fq]) -> HashOut<Fq> {
    infallible(hashing::hash_no_pad(&mut NativeAlgebra::new(), inputs))
}

pub fn hash_pad(inputs: &[Fq]) -> HashOut<Fq> {
    infallible(hashing::hash_pad(&mut NativeAlgebra::new(), inputs))
}

pub fn hash_or_noop(inputs: &[Fq]) -> HashOut<Fq> {
    infallible(hashing::hash_or_noop(&mut NativeAlgebra::new(), inputs))
}

pub fn two_to_one(left: &HashOut<Fq>, right: &HashOut<Fq>) -> HashOut<Fq> {
    infallible(hashing::two_to_one(&mut NativeAlgebra::new(), left, right))
}
