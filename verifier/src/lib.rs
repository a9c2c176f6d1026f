//! A verifier for Goldilocks PLONK proofs, written as a circuit over a larger
//! prime field such as the BN254 scalar field.
//!
//! [verifier::VerifierChip] range checks the proof, hashes the public inputs,
//! replays the Fiat-Shamir transcript with Poseidon2 and hands the resulting
//! challenges to a PLONK and a FRI sub-verifier. The whole verification is
//! expressed as constraints, so a proof that does not verify leaves the
//! circuit unsatisfiable.

pub mod challenger;
pub mod config;
pub mod error;
pub mod fri;
pub mod gadgets;
pub mod gates;
pub mod plonk;
pub mod proof;
pub mod verifier;

pub use config::{CircuitConfig, CommonCircuitData, FriConfig, FriParams, VerifierOnlyCircuitData};
pub use error::{ConfigError, ProofShapeError, VerifierError, VerifierResult};
pub use plonk::{FriVerifierChip, PlonkVerifierChip};
pub use proof::{NativeProof, NativeProofWithPublicInputs};
pub use verifier::{VerifierChip, MIN_NATIVE_FIELD_BITS};
