//! The arithmetic the permutation is written against.
//!
//! The same round functions drive native hashing over [Fq] and [Fq2], and
//! in-circuit hashing over non-native Goldilocks variables. Implementations
//! may defer modular reduction: `*_no_reduce` results are only ever fed to
//! further additions, multiplications or an explicit [Poseidon2Algebra::reduce].

use std::{convert::Infallible, marker::PhantomData};

use ark_ff::Field;
use goldilocks_field::{Fq, Fq2, GoldilocksField};

pub trait Poseidon2Algebra {
    type Elem: Clone;
    type Error;

    /// Lifts a canonical Goldilocks constant.
    fn constant(&mut self, value: u64) -> Result<Self::Elem, Self::Error>;

    fn add_no_reduce(&mut self, a: &Self::Elem, b: &Self::Elem) -> Result<Self::Elem, Self::Error>;

    fn mul_no_reduce(&mut self, a: &Self::Elem, b: &Self::Elem) -> Result<Self::Elem, Self::Error>;

    /// `a - b`, with `b` reduced or not.
    fn sub(&mut self, a: &Self::Elem, b: &Self::Elem) -> Result<Self::Elem, Self::Error>;

    /// Brings an element back to a canonical representative.
    fn reduce(&mut self, a: &Self::Elem) -> Result<Self::Elem, Self::Error>;

    fn add(&mut self, a: &Self::Elem, b: &Self::Elem) -> Result<Self::Elem, Self::Error> {
        let sum = self.add_no_reduce(a, b)?;
        self.reduce(&sum)
    }

    fn mul(&mut self, a: &Self::Elem, b: &Self::Elem) -> Result<Self::Elem, Self::Error> {
        let product = self.mul_no_reduce(a, b)?;
        self.reduce(&product)
    }

    fn zero(&mut self) -> Result<Self::Elem, Self::Error> {
        self.constant(0)
    }

    fn one(&mut self) -> Result<Self::Elem, Self::Error> {
        self.constant(1)
    }
}

/// Plain field arithmetic over [Fq] or [Fq2].
#[derive(Clone, Copy, Debug)]
pub struct NativeAlgebra<T>(PhantomData<T>);

impl<T> NativeAlgebra<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for NativeAlgebra<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Native fields whose elements can be built from Goldilocks constants.
pub trait GoldilocksLike: Field {
    fn from_goldilocks(x: Fq) -> Self;
}

impl GoldilocksLike for Fq {
    fn from_goldilocks(x: Fq) -> Self {
        x
    }
}

impl GoldilocksLike for Fq2 {
    fn from_goldilocks(x: Fq) -> Self {
        Fq2::new(x, Fq::from(0u64))
    }
}

impl<T: GoldilocksLike> Poseidon2Algebra for NativeAlgebra<T> {
    type Elem = T;
    type Error = Infallible;

    fn constant(&mut self, value: u64) -> Result<T, Infallible> {
        Ok(T::from_goldilocks(Fq::from_noncanonical_u64(value)))
    }

    fn add_no_reduce(&mut self, a: &T, b: &T) -> Result<T, Infallible> {
        Ok(*a + b)
    }

    fn mul_no_reduce(&mut self, a: &T, b: &T) -> Result<T, Infallible> {
        Ok(*a * b)
    }

    fn sub(&mut self, a: &T, b: &T) -> Result<T, Infallible> {
        Ok(*a - b)
    }

    fn reduce(&mut self, a: &T) -> Result<T, Infallible> {
        Ok(*a)
    }
}

/// Unwraps a result that cannot fail.
pub fn infallible<T>(res: Result<T, Infallible>) -> T {
    match res {
        Ok(v) => v,
        Err(e) => match e {},
    }
}
