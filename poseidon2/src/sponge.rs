//! A duplex sponge for Fiat-Shamir transcripts.

use goldilocks_field::{Fq, Fq2};
use log::trace;

use crate::{
    algebra::{infallible, NativeAlgebra, Poseidon2Algebra},
    constants::{OUT, RATE, WIDTH},
    hashing::HashOut,
    permutation::permute,
};

/// Overwrite-mode duplex sponge state.
///
/// Observed elements are buffered and written over the first lanes of the
/// state once `RATE` of them are pending or a challenge is requested.
/// Challenges are popped from the back of the first `OUT` lanes of the last
/// permutation. Observing anything discards unread challenges.
#[derive(Clone, Debug)]
pub struct DuplexSponge<E> {
    sponge_state: [E; WIDTH],
    input_buffer: Vec<E>,
    output_buffer: Vec<E>,
}

impl<E: Clone> DuplexSponge<E> {
    pub fn new<A: Poseidon2Algebra<Elem = E>>(alg: &mut A) -> Result<Self, A::Error> {
        let zero = alg.zero()?;
        Ok(Self {
            sponge_state: std::array::from_fn(|_| zero.clone()),
            input_buffer: Vec::with_capacity(RATE),
            output_buffer: Vec::with_capacity(OUT),
        })
    }

    pub fn observe_element<A: Poseidon2Algebra<Elem = E>>(
        &mut self,
        alg: &mut A,
        element: E,
    ) -> Result<(), A::Error> {
        self.output_buffer.clear();
        self.input_buffer.push(element);

        if self.input_buffer.len() == RATE {
            self.duplex(alg)?;
        }
        Ok(())
    }

    pub fn observe_elements<A: Poseidon2Algebra<Elem = E>>(
        &mut self,
        alg: &mut A,
        elements: &[E],
    ) -> Result<(), A::Error> {
        for element in elements {
            self.observe_element(alg, element.clone())?;
        }
        Ok(())
    }

    pub fn observe_hash<A: Poseidon2Algebra<Elem = E>>(
        &mut self,
        alg: &mut A,
        hash: &HashOut<E>,
    ) -> Result<(), A::Error> {
        self.observe_elements(alg, hash)
    }

    pub fn observe_cap<A: Poseidon2Algebra<Elem = E>>(
        &mut self,
        alg: &mut A,
        cap: &[HashOut<E>],
    ) -> Result<(), A::Error> {
        for hash in cap {
            self.observe_hash(alg, hash)?;
        }
        Ok(())
    }

    pub fn get_challenge<A: Poseidon2Algebra<Elem = E>>(
        &mut self,
        alg: &mut A,
    ) -> Result<E, A::Error> {
        if !self.input_buffer.is_empty() || self.output_buffer.is_empty() {
            self.duplex(alg)?;
        }

        match self.output_buffer.pop() {
            Some(challenge) => Ok(challenge),
            None => unreachable!("a duplex always refills the output buffer"),
        }
    }

    pub fn get_n_challenges<A: Poseidon2Algebra<Elem = E>>(
        &mut self,
        alg: &mut A,
        n: usize,
    ) -> Result<Vec<E>, A::Error> {
        (0..n).map(|_| self.get_challenge(alg)).collect()
    }

    pub fn get_hash<A: Poseidon2Algebra<Elem = E>>(
        &mut self,
        alg: &mut A,
    ) -> Result<HashOut<E>, A::Error> {
        Ok([
            self.get_challenge(alg)?,
            self.get_challenge(alg)?,
            self.get_challenge(alg)?,
            self.get_challenge(alg)?,
        ])
    }

    /// Two challenges, as the `[c0, c1]` limbs of an extension element.
    pub fn get_extension_challenge<A: Poseidon2Algebra<Elem = E>>(
        &mut self,
        alg: &mut A,
    ) -> Result<[E; 2], A::Error> {
        let c0 = self.get_challenge(alg)?;
        let c1 = self.get_challenge(alg)?;
        Ok([c0, c1])
    }

    fn duplex<A: Poseidon2Algebra<Elem = E>>(&mut self, alg: &mut A) -> Result<(), A::Error> {
        trace!("duplexing {} buffered element(s)", self.input_buffer.len());

        for (lane, element) in self.sponge_state.iter_mut().zip(self.input_buffer.drain(..)) {
            *lane = element;
        }

        let state = self.sponge_state.clone();
        self.sponge_state = permute(alg, state)?;

        self.output_buffer.clear();
        self.output_buffer
            .extend_from_slice(&self.sponge_state[..OUT]);
        Ok(())
    }
}

/// A native transcript over Goldilocks, mirroring the in-circuit one.
#[derive(Clone, Debug)]
pub struct Challenger {
    alg: NativeAlgebra<Fq>,
    sponge: DuplexSponge<Fq>,
}

impl Default for Challenger {
    fn default() -> Self {
        Self::new()
    }
}

impl Challenger {
    pub fn new() -> Self {
        let mut alg = NativeAlgebra::new();
        let sponge = infallible(DuplexSponge::new(&mut alg));
        Self { alg, sponge }
    }

    pub fn observe_element(&mut self, element: Fq) {
        infallible(self.sponge.observe_element(&mut self.alg, element))
    }

    pub fn observe_elements(&mut self, elements: &[Fq]) {
        infallible(self.sponge.observe_elements(&mut self.alg, elements))
    }

    pub fn observe_extension_element(&mut self, element: &Fq2) {
        self.observe_elements(&[element.c0, element.c1])
    }

    pub fn observe_hash(&mut self, hash: &HashOut<Fq>) {
        infallible(self.sponge.observe_hash(&mut self.alg, hash))
    }

    pub fn observe_cap(&mut self, cap: &[HashOut<Fq>]) {
        infallible(self.sponge.observe_cap(&mut self.alg, cap))
    }

    pub fn get_challenge(&mut self) -> Fq {
        infallible(self.sponge.get_challenge(&mut self.alg))
    }

    pub fn get_n_challenges(&mut self, n: usize) -> Vec<Fq> {
        infallible(self.sponge.get_n_challenges(&mut self.alg, n))
    }

    pub fn get_hash(&mut self) -> HashOut<Fq> {
        infallible(self.sponge.get_hash(&mut self.alg))
    }

    pub fn get_extension_challenge(&mut self) -> Fq2 {
        let [c0, c1] = infallible(self.sponge.get_extension_challenge(&mut self.alg));
        Fq2::new(c0, c1)
    }
}
