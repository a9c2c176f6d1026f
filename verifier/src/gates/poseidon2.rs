//! One Poseidon2 permutation, with an optional swap of the first two
//! 4-lane chunks of its input, as a single gate.
//!
//! Wire layout:
//!
//! | wires       | content                                            |
//! |-------------|----------------------------------------------------|
//! | `0..12`     | inputs                                             |
//! | `12..24`    | outputs                                            |
//! | `24`        | swap selector                                      |
//! | `25..29`    | `delta_i = swap * (input[i + 4] - input[i])`       |
//! | `29..`      | stored S-box inputs, see [SBOX_STORED]             |

use ark_ff::{PrimeField, Zero};
use goldilocks_field::{Fq, Fq2};
use goldilocks_poseidon2::{
    algebra::{infallible, NativeAlgebra},
    constants::{ROUNDS_F_HALF, ROUNDS_P, SBOX_DEGREE, WIDTH},
    permutation::permute_with,
    Poseidon2Algebra, SBoxSite,
};
use log::debug;
use rayon::prelude::*;

use crate::{
    error::{ConfigError, VerifierResult},
    gadgets::{ExtensionAlgebra, GoldilocksChip, QuadraticExtensionVar},
};

use super::{EvaluationVars, Gate};

pub const ID_PREFIX: &str = "Poseidon2Gate";

pub const WIRE_INPUT_START: usize = 0;
pub const WIRE_OUTPUT_START: usize = WIDTH;
pub const WIRE_SWAP: usize = 2 * WIDTH;
pub const START_DELTA: usize = 2 * WIDTH + 1;
pub const NUM_DELTAS: usize = 4;
pub const START_SBOX: usize = START_DELTA + NUM_DELTAS;

/// Whether the S-box inputs of a full round are stored as wires, by half and round.
///
/// Round 0 of the first half reads the input's linear layer directly, so it
/// gets no wires.
pub const SBOX_STORED: [[bool; ROUNDS_F_HALF]; 2] = [[false, true, true, true], [true; ROUNDS_F_HALF]];

/// Wire offsets resolved from [SBOX_STORED].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poseidon2GateLayout {
    full_sbox: [[Option<usize>; ROUNDS_F_HALF]; 2],
    partial_sbox: usize,
    wires_end: usize,
}

impl Default for Poseidon2GateLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl Poseidon2GateLayout {
    pub fn new() -> Self {
        let mut next = START_SBOX;
        let mut full_sbox = [[None; ROUNDS_F_HALF]; 2];

        for (round, stored) in SBOX_STORED[0].iter().enumerate() {
            if *stored {
                full_sbox[0][round] = Some(next);
                next += WIDTH;
            }
        }
        let partial_sbox = next;
        next += ROUNDS_P;
        for (round, stored) in SBOX_STORED[1].iter().enumerate() {
            if *stored {
                full_sbox[1][round] = Some(next);
                next += WIDTH;
            }
        }

        Self {
            full_sbox,
            partial_sbox,
            wires_end: next,
        }
    }

    /// One past the last wire the gate uses.
    pub fn wires_end(&self) -> usize {
        self.wires_end
    }

    pub fn num_stored_sboxes(&self) -> usize {
        self.wires_end - START_SBOX
    }

    /// The wire storing the S-box input at `site`, if it is stored.
    pub fn sbox_wire(&self, site: SBoxSite) -> Option<usize> {
        match site {
            SBoxSite::Full { half, round, lane } if lane < WIDTH => {
                self.full_sbox.get(half)?.get(round).copied().flatten().map(|start| start + lane)
            }
            SBoxSite::Full { .. } => None,
            SBoxSite::Partial { round } => (round < ROUNDS_P).then_some(self.partial_sbox + round),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poseidon2Gate {
    layout: Poseidon2GateLayout,
}

impl Poseidon2Gate {
    /// Checks that a permutation of width `hash_width` matches the compiled
    /// gate and that a row of `num_wires` wires can hold it.
    pub fn new(hash_width: usize, num_wires: usize) -> Result<Self, ConfigError> {
        if hash_width != WIDTH {
            return Err(ConfigError::GateWidthMismatch {
                expected: WIDTH,
                got: hash_width,
            });
        }
        let layout = Poseidon2GateLayout::new();
        if num_wires < layout.wires_end() {
            return Err(ConfigError::NotEnoughWires {
                required: layout.wires_end(),
                available: num_wires,
            });
        }
        debug!(
            "Poseidon2 gate: {} wires, {} stored S-box inputs",
            layout.wires_end(),
            layout.num_stored_sboxes()
        );
        Ok(Self { layout })
    }

    /// Parses ids such as `Poseidon2Gate(PhantomData<GoldilocksField>)<WIDTH=12>`.
    /// Ids of other gates give `Ok(None)`.
    pub fn from_id(id: &str, num_wires: usize) -> Result<Option<Self>, ConfigError> {
        let Some(rest) = id.strip_prefix(ID_PREFIX) else {
            return Ok(None);
        };
        if !(rest.is_empty() || rest.starts_with('(') || rest.starts_with('<')) {
            return Ok(None);
        }

        let width = match rest.rfind("<WIDTH=") {
            Some(start) => rest[start + "<WIDTH=".len()..]
                .strip_suffix('>')
                .and_then(|digits| digits.parse().ok())
                .ok_or_else(|| ConfigError::MalformedGateId(id.to_string()))?,
            None => WIDTH,
        };
        Self::new(width, num_wires).map(Some)
    }

    pub fn layout(&self) -> &Poseidon2GateLayout {
        &self.layout
    }

    pub fn wires_end(&self) -> usize {
        self.layout.wires_end()
    }

    pub fn num_constraints(&self) -> usize {
        // swap, deltas, stored S-box inputs, outputs
        1 + NUM_DELTAS + self.layout.num_stored_sboxes() + WIDTH
    }

    pub fn wire_input(&self, i: usize) -> Result<usize, ConfigError> {
        check_index("input wire", i, WIDTH)?;
        Ok(WIRE_INPUT_START + i)
    }

    pub fn wire_output(&self, i: usize) -> Result<usize, ConfigError> {
        check_index("output wire", i, WIDTH)?;
        Ok(WIRE_OUTPUT_START + i)
    }

    pub fn wire_swap(&self) -> usize {
        WIRE_SWAP
    }

    pub fn wire_delta(&self, i: usize) -> Result<usize, ConfigError> {
        check_index("delta wire", i, NUM_DELTAS)?;
        Ok(START_DELTA + i)
    }

    pub fn wire_full_sbox_0(&self, round: usize, lane: usize) -> Result<usize, ConfigError> {
        self.full_sbox_wire(0, round, lane)
    }

    pub fn wire_partial_sbox(&self, round: usize) -> Result<usize, ConfigError> {
        check_index("partial round", round, ROUNDS_P)?;
        self.checked_wire(SBoxSite::Partial { round })
    }

    pub fn wire_full_sbox_1(&self, round: usize, lane: usize) -> Result<usize, ConfigError> {
        self.full_sbox_wire(1, round, lane)
    }

    fn full_sbox_wire(&self, half: usize, round: usize, lane: usize) -> Result<usize, ConfigError> {
        check_index("full round", round, ROUNDS_F_HALF)?;
        check_index("S-box lane", lane, WIDTH)?;
        if !SBOX_STORED[half][round] {
            return Err(ConfigError::SBoxNotStored { half, round });
        }
        self.checked_wire(SBoxSite::Full { half, round, lane })
    }

    fn checked_wire(&self, site: SBoxSite) -> Result<usize, ConfigError> {
        let wire = match self.layout.sbox_wire(site) {
            Some(wire) => wire,
            None => unreachable!("stored S-box sites always have a wire"),
        };
        check_index("S-box wire", wire, self.layout.wires_end())?;
        Ok(wire)
    }

    fn check_row(&self, num_wires: usize) -> Result<(), ConfigError> {
        if num_wires < self.layout.wires_end() {
            return Err(ConfigError::NotEnoughWires {
                required: self.layout.wires_end(),
                available: num_wires,
            });
        }
        Ok(())
    }

    /// The gate constraints, in order: swap is boolean, the four deltas, each
    /// stored S-box input against its recomputed value, then the outputs.
    ///
    /// `wires` must hold at least [Self::wires_end] values.
    fn eval_with<A: Poseidon2Algebra>(
        &self,
        alg: &mut A,
        wires: &[A::Elem],
    ) -> Result<Vec<A::Elem>, A::Error> {
        let mut constraints = Vec::with_capacity(self.num_constraints());

        let one = alg.one()?;
        let swap = wires[WIRE_SWAP].clone();
        let swap_minus_one = alg.sub(&swap, &one)?;
        constraints.push(alg.mul(&swap, &swap_minus_one)?);

        let inputs = &wires[WIRE_INPUT_START..WIRE_INPUT_START + WIDTH];
        let deltas = &wires[START_DELTA..START_DELTA + NUM_DELTAS];
        for (i, delta) in deltas.iter().enumerate() {
            let diff = alg.sub(&inputs[i + 4], &inputs[i])?;
            let expected = alg.mul(&swap, &diff)?;
            constraints.push(alg.sub(&expected, delta)?);
        }

        let mut state: [A::Elem; WIDTH] = std::array::from_fn(|i| inputs[i].clone());
        for (i, delta) in deltas.iter().enumerate() {
            state[i] = alg.add(&inputs[i], delta)?;
            state[i + 4] = alg.sub(&inputs[i + 4], delta)?;
        }

        let layout = &self.layout;
        let output = permute_with(alg, state, |alg, site, x| match layout.sbox_wire(site) {
            Some(wire) => {
                let stored = wires[wire].clone();
                constraints.push(alg.sub(&x, &stored)?);
                Ok(stored)
            }
            None => Ok(x),
        })?;

        for (lane, out) in output.iter().zip(&wires[WIRE_OUTPUT_START..WIRE_OUTPUT_START + WIDTH]) {
            constraints.push(alg.sub(lane, out)?);
        }
        Ok(constraints)
    }

    /// Evaluates the constraints on one row of native extension values.
    pub fn eval_unfiltered(&self, wires: &[Fq2]) -> Result<Vec<Fq2>, ConfigError> {
        self.check_row(wires.len())?;
        Ok(infallible(self.eval_with(&mut NativeAlgebra::new(), wires)))
    }

    /// [Self::eval_unfiltered] over many rows, in parallel. Row order is kept.
    pub fn eval_unfiltered_batch(&self, rows: &[Vec<Fq2>]) -> Result<Vec<Vec<Fq2>>, ConfigError> {
        rows.par_iter().map(|row| self.eval_unfiltered(row)).collect()
    }

    /// Fills a row: runs the permutation on `inputs` (swapped first if `swap`)
    /// and records every value the gate stores.
    pub fn generate_wires(&self, inputs: [Fq; WIDTH], swap: bool) -> Vec<Fq> {
        let mut wires = vec![Fq::zero(); self.layout.wires_end()];
        wires[WIRE_INPUT_START..WIRE_INPUT_START + WIDTH].copy_from_slice(&inputs);
        wires[WIRE_SWAP] = Fq::from(u64::from(swap));

        let mut state = inputs;
        for i in 0..NUM_DELTAS {
            let delta = if swap {
                inputs[i + 4] - inputs[i]
            } else {
                Fq::zero()
            };
            wires[START_DELTA + i] = delta;
            state[i] += delta;
            state[i + 4] -= delta;
        }

        let layout = &self.layout;
        let output = infallible(permute_with(
            &mut NativeAlgebra::new(),
            state,
            |_, site, x: Fq| {
                if let Some(wire) = layout.sbox_wire(site) {
                    wires[wire] = x;
                }
                Ok(x)
            },
        ));
        wires[WIRE_OUTPUT_START..WIRE_OUTPUT_START + WIDTH].copy_from_slice(&output);
        wires
    }
}

fn check_index(wire: &'static str, index: usize, bound: usize) -> Result<(), ConfigError> {
    if index >= bound {
        return Err(ConfigError::WireOutOfRange { wire, index, bound });
    }
    Ok(())
}

impl<F: PrimeField> Gate<F> for Poseidon2Gate {
    fn id(&self) -> String {
        format!("{ID_PREFIX}(PhantomData<GoldilocksField>)<WIDTH={WIDTH}>")
    }

    fn num_wires(&self) -> usize {
        self.layout.wires_end()
    }

    fn num_constraints(&self) -> usize {
        Poseidon2Gate::num_constraints(self)
    }

    fn degree(&self) -> usize {
        SBOX_DEGREE as usize
    }

    fn eval_unfiltered_circuit(
        &self,
        gl: &mut GoldilocksChip<'_, F>,
        vars: EvaluationVars<'_, F>,
    ) -> VerifierResult<Vec<QuadraticExtensionVar<F>>> {
        self.check_row(vars.local_wires.len())?;
        Ok(self.eval_with(&mut ExtensionAlgebra(gl), vars.local_wires)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldilocks_field::GoldilocksField;
    use rand::Rng;

    fn random_inputs() -> [Fq; WIDTH] {
        let mut rng = ark_std::test_rng();
        std::array::from_fn(|_| Fq::from_noncanonical_u64(rng.gen()))
    }

    fn lift(wires: &[Fq]) -> Vec<Fq2> {
        wires.iter().map(|&w| Fq2::new(w, Fq::zero())).collect()
    }

    #[test]
    fn test_layout() {
        let layout = Poseidon2GateLayout::new();
        assert_eq!(START_DELTA, 25);
        assert_eq!(START_SBOX, 29);
        assert_eq!(
            layout.sbox_wire(SBoxSite::Full { half: 0, round: 0, lane: 0 }),
            None
        );
        assert_eq!(
            layout.sbox_wire(SBoxSite::Full { half: 0, round: 1, lane: 0 }),
            Some(29)
        );
        assert_eq!(layout.sbox_wire(SBoxSite::Partial { round: 0 }), Some(65));
        assert_eq!(
            layout.sbox_wire(SBoxSite::Full { half: 1, round: 0, lane: 0 }),
            Some(87)
        );
        assert_eq!(
            layout.sbox_wire(SBoxSite::Full { half: 1, round: 3, lane: 11 }),
            Some(134)
        );
        assert_eq!(layout.wires_end(), 135);
        assert_eq!(layout.num_stored_sboxes(), 3 * WIDTH + ROUNDS_P + 4 * WIDTH);
    }

    #[test]
    fn test_stored_wires_are_distinct() {
        let layout = Poseidon2GateLayout::new();
        let mut seen = vec![false; layout.wires_end()];
        let mut sites = vec![];
        for half in 0..2 {
            for round in 0..ROUNDS_F_HALF {
                for lane in 0..WIDTH {
                    sites.push(SBoxSite::Full { half, round, lane });
                }
            }
        }
        sites.extend((0..ROUNDS_P).map(|round| SBoxSite::Partial { round }));

        for site in sites {
            if let Some(wire) = layout.sbox_wire(site) {
                assert!(wire >= START_SBOX);
                assert!(!seen[wire], "wire {wire} used twice");
                seen[wire] = true;
            }
        }
        assert!(seen[START_SBOX..].iter().all(|&s| s));
    }

    #[test]
    fn test_accessors() {
        let gate = Poseidon2Gate::new(WIDTH, 135).unwrap();
        assert_eq!(gate.wire_delta(3), Ok(28));
        assert_eq!(gate.wire_full_sbox_0(1, 0), Ok(29));
        assert_eq!(gate.wire_partial_sbox(21), Ok(86));
        assert_eq!(gate.wire_full_sbox_1(0, 0), Ok(87));

        assert!(matches!(
            gate.wire_delta(4),
            Err(ConfigError::WireOutOfRange { index: 4, bound: 4, .. })
        ));
        assert_eq!(
            gate.wire_full_sbox_0(0, 0),
            Err(ConfigError::SBoxNotStored { half: 0, round: 0 })
        );
        assert!(gate.wire_full_sbox_1(4, 0).is_err());
        assert!(gate.wire_full_sbox_1(0, WIDTH).is_err());
        assert!(gate.wire_partial_sbox(ROUNDS_P).is_err());
        assert!(gate.wire_output(WIDTH).is_err());
    }

    #[test]
    fn test_construction_checks() {
        assert_eq!(
            Poseidon2Gate::new(8, 135),
            Err(ConfigError::GateWidthMismatch { expected: 12, got: 8 })
        );
        assert_eq!(
            Poseidon2Gate::new(WIDTH, 134),
            Err(ConfigError::NotEnoughWires { required: 135, available: 134 })
        );
    }

    #[test]
    fn test_from_id() {
        let id = "Poseidon2Gate(PhantomData<plonky2_field::goldilocks_field::GoldilocksField>)<WIDTH=12>";
        assert!(Poseidon2Gate::from_id(id, 135).unwrap().is_some());
        assert!(Poseidon2Gate::from_id("ArithmeticGate { num_ops: 20 }", 135)
            .unwrap()
            .is_none());
        assert!(Poseidon2Gate::from_id("Poseidon2MdsGate", 135).unwrap().is_none());
        assert_eq!(
            Poseidon2Gate::from_id("Poseidon2Gate(PhantomData<F>)<WIDTH=8>", 135),
            Err(ConfigError::GateWidthMismatch { expected: 12, got: 8 })
        );
        assert!(matches!(
            Poseidon2Gate::from_id("Poseidon2Gate<WIDTH=x>", 135),
            Err(ConfigError::MalformedGateId(_))
        ));

        let gate = Poseidon2Gate::new(WIDTH, 135).unwrap();
        let own_id = <Poseidon2Gate as Gate<Fq>>::id(&gate);
        assert_eq!(Poseidon2Gate::from_id(&own_id, 135).unwrap(), Some(gate));
    }

    #[test]
    fn test_generated_wires_satisfy_constraints() {
        let gate = Poseidon2Gate::new(WIDTH, 135).unwrap();
        for swap in [false, true] {
            let wires = gate.generate_wires(random_inputs(), swap);
            let constraints = gate.eval_unfiltered(&lift(&wires)).unwrap();
            assert_eq!(constraints.len(), 123);
            assert!(constraints.iter().all(|c| c.is_zero()));
        }
    }

    #[test]
    fn test_perturbed_wire_breaks_a_constraint() {
        let gate = Poseidon2Gate::new(WIDTH, 135).unwrap();
        let wires = lift(&gate.generate_wires(random_inputs(), true));
        for i in 0..gate.wires_end() {
            let mut perturbed = wires.clone();
            perturbed[i] += Fq2::from(1u64);
            let constraints = gate.eval_unfiltered(&perturbed).unwrap();
            assert!(
                constraints.iter().any(|c| !c.is_zero()),
                "perturbing wire {i} went unnoticed"
            );
        }
    }

    #[test]
    fn test_swap() {
        let gate = Poseidon2Gate::new(WIDTH, 135).unwrap();
        let inputs = random_inputs();

        let wires = gate.generate_wires(inputs, false);
        let expected = goldilocks_poseidon2::permute(inputs);
        assert_eq!(wires[WIRE_OUTPUT_START..WIRE_OUTPUT_START + WIDTH], expected);

        let mut swapped = inputs;
        for i in 0..4 {
            swapped.swap(i, i + 4);
        }
        let wires = gate.generate_wires(inputs, true);
        let expected = goldilocks_poseidon2::permute(swapped);
        assert_eq!(wires[WIRE_OUTPUT_START..WIRE_OUTPUT_START + WIDTH], expected);
    }

    #[test]
    fn test_short_row_is_rejected() {
        let gate = Poseidon2Gate::new(WIDTH, 135).unwrap();
        let wires = lift(&gate.generate_wires(random_inputs(), false));
        assert!(gate.eval_unfiltered(&wires[..100]).is_err());
    }

    #[test]
    fn test_batch_keeps_row_order() {
        let gate = Poseidon2Gate::new(WIDTH, 135).unwrap();
        let mut rows: Vec<Vec<Fq2>> = (0..4u64)
            .map(|i| lift(&gate.generate_wires(std::array::from_fn(|j| Fq::from(i + j as u64)), i % 2 == 0)))
            .collect();
        rows[2][WIRE_OUTPUT_START] += Fq2::from(1u64);

        let results = gate.eval_unfiltered_batch(&rows).unwrap();
        for (i, constraints) in results.iter().enumerate() {
            assert_eq!(constraints.iter().all(|c| c.is_zero()), i != 2);
        }
    }

    #[test]
    fn test_circuit_evaluation_matches_native() {
        use crate::gadgets::goldilocks::read_extension;
        use ark_bn254::Fr;
        use goldilocks_field::QuadraticExtension;
        use wrap_snarky::prelude::*;

        let gate = Poseidon2Gate::new(WIDTH, 135).unwrap();
        let mut rng = ark_std::test_rng();
        // a row that is not a valid trace, so most constraints are nonzero
        let mut wires = lift(&gate.generate_wires(random_inputs(), true));
        for wire in wires.iter_mut().step_by(7) {
            *wire = Fq2::from_noncanonical_u64s([rng.gen(), rng.gen()]);
        }
        let expected = gate.eval_unfiltered(&wires).unwrap();

        let mut sys = RunState::<Fr>::witness();
        let mut gl = GoldilocksChip::new(&mut sys);
        let local_wires: Vec<_> = wires
            .iter()
            .map(|w| gl.alloc_extension(w.to_canonical_u64s()).unwrap())
            .collect();
        let public_inputs_hash = std::array::from_fn(|_| crate::gadgets::GoldilocksVar::zero());
        let vars = EvaluationVars {
            local_constants: &[],
            local_wires: &local_wires,
            public_inputs_hash: &public_inputs_hash,
        };
        let constraints =
            Gate::<Fr>::eval_unfiltered_circuit(&gate, &mut gl, vars).unwrap();
        assert!(Gate::<Fr>::eval_unfiltered_circuit(&gate, &mut gl, EvaluationVars {
            local_wires: &local_wires[..100],
            ..vars
        })
        .is_err());
        drop(gl);
        assert!(sys.check_satisfied().is_ok());

        let got: Vec<Fq2> = constraints.iter().map(|c| read_extension(&sys, c)).collect();
        assert_eq!(got, expected);
    }
}
