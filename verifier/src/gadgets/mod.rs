pub mod algebra;
pub mod goldilocks;
pub mod poseidon2;

pub use algebra::ExtensionAlgebra;
pub use goldilocks::{GoldilocksChip, GoldilocksVar, QuadraticExtensionVar, GOLDILOCKS_BITS};
pub use poseidon2::{HashOutVar, MerkleCapVar};
