//! Plonky2-style hashing on top of the permutation.

use crate::{
    algebra::Poseidon2Algebra,
    constants::{OUT, RATE, WIDTH},
    permutation::permute,
};

/// The four lanes a hash is made of.
pub type HashOut<E> = [E; OUT];

/// Overwrite-mode sponge without padding: every chunk of `RATE` inputs is
/// written over the first lanes of the state before permuting, and outputs
/// are read from the first `RATE` lanes.
pub fn hash_n_to_m_no_pad<A: Poseidon2Algebra>(
    alg: &mut A,
    inputs: &[A::Elem],
    num_outputs: usize,
) -> Result<Vec<A::Elem>, A::Error> {
    let zero = alg.zero()?;
    let mut state: [A::Elem; WIDTH] = std::array::from_fn(|_| zero.clone());

    for chunk in inputs.chunks(RATE) {
        state[..chunk.len()].clone_from_slice(chunk);
        state = permute(alg, state)?;
    }

    let mut outputs = Vec::with_capacity(num_outputs);
    loop {
        for lane in &state[..RATE] {
            if outputs.len() == num_outputs {
                return Ok(outputs);
            }
            outputs.push(lane.clone());
        }
        state = permute(alg, state)?;
    }
}

/// Hashes `inputs` to four elements. The empty input hashes to zero.
pub fn hash_no_pad<A: Poseidon2Algebra>(
    alg: &mut A,
    inputs: &[A::Elem],
) -> Result<HashOut<A::Elem>, A::Error> {
    let out = hash_n_to_m_no_pad(alg, inputs, OUT)?;
    Ok(to_hash(out))
}

/// Applies `10*1` padding up to a multiple of `RATE`, then hashes.
pub fn hash_pad<A: Poseidon2Algebra>(
    alg: &mut A,
    inputs: &[A::Elem],
) -> Result<HashOut<A::Elem>, A::Error> {
    let zero = alg.zero()?;
    let one = alg.one()?;

    let mut padded = inputs.to_vec();
    padded.push(one.clone());
    while (padded.len() + 1) % RATE != 0 {
        padded.push(zero.clone());
    }
    padded.push(one);

    hash_no_pad(alg, &padded)
}

/// Short inputs (at most four elements) are zero-padded instead of hashed.
pub fn hash_or_noop<A: Poseidon2Algebra>(
    alg: &mut A,
    inputs: &[A::Elem],
) -> Result<HashOut<A::Elem>, A::Error> {
    if inputs.len() <= OUT {
        let zero = alg.zero()?;
        let mut out = inputs.to_vec();
        out.resize(OUT, zero);
        Ok(to_hash(out))
    } else {
        hash_no_pad(alg, inputs)
    }
}

/// Compresses two hashes: `left || right || 0...`, permuted, first four lanes.
pub fn two_to_one<A: Poseidon2Algebra>(
    alg: &mut A,
    left: &HashOut<A::Elem>,
    right: &HashOut<A::Elem>,
) -> Result<HashOut<A::Elem>, A::Error> {
    let zero = alg.zero()?;
    let mut state: [A::Elem; WIDTH] = std::array::from_fn(|_| zero.clone());
    state[..OUT].clone_from_slice(left);
    state[OUT..2 * OUT].clone_from_slice(right);

    let state = permute(alg, state)?;
    Ok(to_hash(state[..OUT].to_vec()))
}

fn to_hash<T>(lanes: Vec<T>) -> HashOut<T> {
    match lanes.try_into() {
        Ok(hash) => hash,
        Err(_) => unreachable!("a hash always has OUT lanes"),
    }
}
