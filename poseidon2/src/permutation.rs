//! The Poseidon2 round structure, written once over [Poseidon2Algebra].

use crate::{
    algebra::Poseidon2Algebra,
    constants::{
        EXTERNAL_CONSTANTS, INTERNAL_CONSTANTS, INTERNAL_MATRIX_DIAG, ROUNDS_F_HALF, ROUNDS_P,
        WIDTH,
    },
};

/// Where an S-box input sits in the permutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SBoxSite {
    /// Lane `lane` of full round `round` in half `half` (0 before the partial rounds, 1 after).
    Full {
        half: usize,
        round: usize,
        lane: usize,
    },
    /// Lane 0 of partial round `round`.
    Partial { round: usize },
}

/// Multiplies four lanes by the circulant-like matrix
///
/// ```text
/// [2 3 1 1]
/// [1 2 3 1]
/// [1 1 2 3]
/// [3 1 1 2]
/// ```
///
/// without reducing. Every output is at most 7 times the largest input.
pub fn apply_mat4<A: Poseidon2Algebra>(
    alg: &mut A,
    x: &[A::Elem],
) -> Result<[A::Elem; 4], A::Error> {
    let t01 = alg.add_no_reduce(&x[0], &x[1])?;
    let t23 = alg.add_no_reduce(&x[2], &x[3])?;
    let t0123 = alg.add_no_reduce(&t01, &t23)?;
    let t01123 = alg.add_no_reduce(&t0123, &x[1])?;
    let t01233 = alg.add_no_reduce(&t0123, &x[3])?;

    let x00 = alg.add_no_reduce(&x[0], &x[0])?;
    let x22 = alg.add_no_reduce(&x[2], &x[2])?;

    let out3 = alg.add_no_reduce(&t01233, &x00)?;
    let out1 = alg.add_no_reduce(&t01123, &x22)?;
    let out0 = alg.add_no_reduce(&t01123, &t01)?;
    let out2 = alg.add_no_reduce(&t01233, &t23)?;

    Ok([out0, out1, out2, out3])
}

/// The external matrix `circ(2 M4, M4, M4)`: [apply_mat4] on each chunk of
/// four lanes, then every lane gets the sum of its position across chunks.
pub fn external_linear_layer<A: Poseidon2Algebra>(
    alg: &mut A,
    state: &[A::Elem; WIDTH],
) -> Result<[A::Elem; WIDTH], A::Error> {
    let mut chunks = Vec::with_capacity(WIDTH / 4);
    for chunk in state.chunks(4) {
        chunks.push(apply_mat4(alg, chunk)?);
    }

    let mut sums = Vec::with_capacity(4);
    for l in 0..4 {
        let mut sum = chunks[0][l].clone();
        for chunk in &chunks[1..] {
            sum = alg.add_no_reduce(&sum, &chunk[l])?;
        }
        sums.push(sum);
    }

    let mut out = Vec::with_capacity(WIDTH);
    for i in 0..WIDTH {
        let lane = alg.add_no_reduce(&chunks[i / 4][i % 4], &sums[i % 4])?;
        out.push(alg.reduce(&lane)?);
    }
    Ok(to_state(out))
}

/// `lane_i = sum(state) + d_i * state_i`.
pub fn internal_linear_layer<A: Poseidon2Algebra>(
    alg: &mut A,
    state: &[A::Elem; WIDTH],
) -> Result<[A::Elem; WIDTH], A::Error> {
    let mut sum = state[0].clone();
    for lane in &state[1..] {
        sum = alg.add_no_reduce(&sum, lane)?;
    }

    let mut out = Vec::with_capacity(WIDTH);
    for (lane, d) in state.iter().zip(INTERNAL_MATRIX_DIAG) {
        let d = alg.constant(d)?;
        let scaled = alg.mul_no_reduce(lane, &d)?;
        let lane = alg.add_no_reduce(&scaled, &sum)?;
        out.push(alg.reduce(&lane)?);
    }
    Ok(to_state(out))
}

/// Adds the constants of full round `round` (`0..ROUNDS_F`) to every lane.
pub fn add_external_constants<A: Poseidon2Algebra>(
    alg: &mut A,
    state: &[A::Elem; WIDTH],
    round: usize,
) -> Result<[A::Elem; WIDTH], A::Error> {
    let mut out = Vec::with_capacity(WIDTH);
    for (lane, c) in state.iter().zip(EXTERNAL_CONSTANTS[round]) {
        let c = alg.constant(c)?;
        out.push(alg.add(lane, &c)?);
    }
    Ok(to_state(out))
}

/// Adds the constant of partial round `round` to `x`.
pub fn add_internal_constant<A: Poseidon2Algebra>(
    alg: &mut A,
    x: &A::Elem,
    round: usize,
) -> Result<A::Elem, A::Error> {
    let c = alg.constant(INTERNAL_CONSTANTS[round])?;
    alg.add(x, &c)
}

/// `x^7`, using four multiplications.
pub fn sbox<A: Poseidon2Algebra>(alg: &mut A, x: &A::Elem) -> Result<A::Elem, A::Error> {
    let x2 = alg.mul(x, x)?;
    let x4 = alg.mul(&x2, &x2)?;
    let x3 = alg.mul(x, &x2)?;
    alg.mul(&x4, &x3)
}

fn full_round<A, H>(
    alg: &mut A,
    state: &[A::Elem; WIDTH],
    half: usize,
    round: usize,
    at_sbox: &mut H,
) -> Result<[A::Elem; WIDTH], A::Error>
where
    A: Poseidon2Algebra,
    H: FnMut(&mut A, SBoxSite, A::Elem) -> Result<A::Elem, A::Error>,
{
    let with_constants = add_external_constants(alg, state, half * ROUNDS_F_HALF + round)?;
    let mut lanes = Vec::with_capacity(WIDTH);
    for (lane, x) in with_constants.into_iter().enumerate() {
        let x = at_sbox(alg, SBoxSite::Full { half, round, lane }, x)?;
        lanes.push(sbox(alg, &x)?);
    }
    external_linear_layer(alg, &to_state(lanes))
}

fn partial_round<A, H>(
    alg: &mut A,
    mut state: [A::Elem; WIDTH],
    round: usize,
    at_sbox: &mut H,
) -> Result<[A::Elem; WIDTH], A::Error>
where
    A: Poseidon2Algebra,
    H: FnMut(&mut A, SBoxSite, A::Elem) -> Result<A::Elem, A::Error>,
{
    let x = add_internal_constant(alg, &state[0], round)?;
    let x = at_sbox(alg, SBoxSite::Partial { round }, x)?;
    state[0] = sbox(alg, &x)?;
    internal_linear_layer(alg, &state)
}

/// Runs the permutation, passing every S-box input through `at_sbox` first.
///
/// `at_sbox` may return a different element to use as the S-box input; this is
/// how the gate substitutes stored wires for recomputed values.
pub fn permute_with<A, H>(
    alg: &mut A,
    state: [A::Elem; WIDTH],
    mut at_sbox: H,
) -> Result<[A::Elem; WIDTH], A::Error>
where
    A: Poseidon2Algebra,
    H: FnMut(&mut A, SBoxSite, A::Elem) -> Result<A::Elem, A::Error>,
{
    let mut state = external_linear_layer(alg, &state)?;
    for round in 0..ROUNDS_F_HALF {
        state = full_round(alg, &state, 0, round, &mut at_sbox)?;
    }
    for round in 0..ROUNDS_P {
        state = partial_round(alg, state, round, &mut at_sbox)?;
    }
    for round in 0..ROUNDS_F_HALF {
        state = full_round(alg, &state, 1, round, &mut at_sbox)?;
    }
    Ok(state)
}

/// The Poseidon2 permutation.
pub fn permute<A: Poseidon2Algebra>(
    alg: &mut A,
    state: [A::Elem; WIDTH],
) -> Result<[A::Elem; WIDTH], A::Error> {
    permute_with(alg, state, |_, _, x| Ok(x))
}

fn to_state<T>(lanes: Vec<T>) -> [T; WIDTH] {
    match lanes.try_into() {
        Ok(state) => state,
        Err(_) => unreachable!("a state always has WIDTH lanes"),
    }
}
