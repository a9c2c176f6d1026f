//! The Fiat-Shamir transcript as a circuit.
//!
//! [ChallengerChip] drives the same [DuplexSponge] as the native
//! [goldilocks_poseidon2::Challenger], with in-circuit arithmetic. Both must
//! see the same observations in the same order to agree.
//!
//! The circuit digest is hashed in the outer field by whoever builds the
//! target circuit, with a permutation native to that field. This chip never
//! runs that permutation: it takes the finished digest as an input and only
//! binds it to the transcript.

use ark_ff::PrimeField;
use goldilocks_poseidon2::DuplexSponge;
use log::debug;
use wrap_snarky::{
    bits::{pack, unpack_bits_strict},
    prelude::*,
};

use crate::{
    config::{FriParams, DIGEST_CHUNK_BITS},
    fri::FriOpenings,
    gadgets::{
        GoldilocksChip, GoldilocksVar, HashOutVar, MerkleCapVar, QuadraticExtensionVar,
        GOLDILOCKS_BITS,
    },
    proof::FriChallengesVar,
};

#[derive(Clone, Debug)]
pub struct ChallengerChip<F: PrimeField> {
    sponge: DuplexSponge<GoldilocksVar<F>>,
}

impl<F: PrimeField> ChallengerChip<F> {
    pub fn new(gl: &mut GoldilocksChip<'_, F>) -> SnarkyResult<Self> {
        Ok(Self {
            sponge: DuplexSponge::new(gl)?,
        })
    }

    pub fn observe_element(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        element: &GoldilocksVar<F>,
    ) -> SnarkyResult<()> {
        self.sponge.observe_element(gl, element.clone())
    }

    pub fn observe_elements(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        elements: &[GoldilocksVar<F>],
    ) -> SnarkyResult<()> {
        self.sponge.observe_elements(gl, elements)
    }

    pub fn observe_extension_element(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        element: &QuadraticExtensionVar<F>,
    ) -> SnarkyResult<()> {
        self.observe_elements(gl, &element.limbs())
    }

    pub fn observe_extension_elements(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        elements: &[QuadraticExtensionVar<F>],
    ) -> SnarkyResult<()> {
        for element in elements {
            self.observe_extension_element(gl, element)?;
        }
        Ok(())
    }

    pub fn observe_hash(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        hash: &HashOutVar<F>,
    ) -> SnarkyResult<()> {
        self.sponge.observe_hash(gl, hash)
    }

    pub fn observe_cap(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        cap: &MerkleCapVar<F>,
    ) -> SnarkyResult<()> {
        self.sponge.observe_cap(gl, cap)
    }

    pub fn observe_openings(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        openings: &FriOpenings<QuadraticExtensionVar<F>>,
    ) -> SnarkyResult<()> {
        for value in openings.values() {
            self.observe_extension_element(gl, value)?;
        }
        Ok(())
    }

    /// Observes an element of the outer field, split into 56-bit chunks, lowest first.
    ///
    /// `hash` is an already computed outer-field digest; nothing here
    /// recomputes it. The decomposition is strict, so a digest has exactly
    /// one encoding.
    pub fn observe_bn254_hash(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        hash: &FieldVar<F>,
    ) -> SnarkyResult<()> {
        let bits = unpack_bits_strict(gl.sys(), hash)?;
        for chunk in bits.chunks(DIGEST_CHUNK_BITS) {
            let element = GoldilocksVar::new(pack(chunk), chunk.len());
            self.observe_element(gl, &element)?;
        }
        Ok(())
    }

    pub fn get_challenge(&mut self, gl: &mut GoldilocksChip<'_, F>) -> SnarkyResult<GoldilocksVar<F>> {
        self.sponge.get_challenge(gl)
    }

    pub fn get_n_challenges(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        n: usize,
    ) -> SnarkyResult<Vec<GoldilocksVar<F>>> {
        self.sponge.get_n_challenges(gl, n)
    }

    pub fn get_hash(&mut self, gl: &mut GoldilocksChip<'_, F>) -> SnarkyResult<HashOutVar<F>> {
        self.sponge.get_hash(gl)
    }

    pub fn get_extension_challenge(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
    ) -> SnarkyResult<QuadraticExtensionVar<F>> {
        let [c0, c1] = self.sponge.get_extension_challenge(gl)?;
        Ok(QuadraticExtensionVar::new(c0, c1))
    }

    /// Draws the FRI challenges and checks the proof of work: the response
    /// drawn after observing `pow_witness` must have `proof_of_work_bits`
    /// leading zeros.
    pub fn get_fri_challenges(
        &mut self,
        gl: &mut GoldilocksChip<'_, F>,
        commit_phase_merkle_caps: &[MerkleCapVar<F>],
        final_poly: &[QuadraticExtensionVar<F>],
        pow_witness: &GoldilocksVar<F>,
        params: &FriParams,
    ) -> SnarkyResult<FriChallengesVar<F>> {
        let fri_alpha = self.get_extension_challenge(gl)?;

        let mut fri_betas = Vec::with_capacity(commit_phase_merkle_caps.len());
        for cap in commit_phase_merkle_caps {
            self.observe_cap(gl, cap)?;
            fri_betas.push(self.get_extension_challenge(gl)?);
        }

        self.observe_extension_elements(gl, final_poly)?;
        self.observe_element(gl, pow_witness)?;

        let fri_pow_response = self.get_challenge(gl)?;
        let pow_bits = params.config.proof_of_work_bits as usize;
        gl.bounded_range_check(&fri_pow_response, GOLDILOCKS_BITS.saturating_sub(pow_bits))?;

        let fri_query_indices = self.get_n_challenges(gl, params.config.num_query_rounds)?;
        debug!(
            "drew FRI challenges: {} beta(s), {} query round(s), {pow_bits} proof-of-work bit(s)",
            fri_betas.len(),
            fri_query_indices.len()
        );

        Ok(FriChallengesVar {
            fri_alpha,
            fri_betas,
            fri_pow_response,
            fri_query_indices,
        })
    }
}
