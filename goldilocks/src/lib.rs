//! The Goldilocks field `p = 2^64 - 2^32 + 1` and its quadratic extension
//! `F_p[w] / (w^2 - 7)`, as arkworks fields.

pub mod fq;
pub mod fq2;

pub use fq::{Fq, FqConfig, GoldilocksField, EPSILON, MODULUS, TWO_ADIC_GENERATOR};
pub use fq2::{Fq2, Fq2Config, QuadraticExtension, W};
