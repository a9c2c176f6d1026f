//! Verification-key data: the FRI configuration, the circuit shape and the
//! verifier-only commitments.
//!
//! Everything here is plain data loaded once, usually from JSON, and checked by
//! [CommonCircuitData::validate] before any proof is looked at.

use std::ops::Range;

use ark_ff::{Field, PrimeField};
use goldilocks_field::{Fq, Fq2, TWO_ADIC_GENERATOR};
use log::debug;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{
    error::ConfigError,
    fri::{FriBatchInfo, FriInstanceInfo, FriOracleInfo, FriPolynomialInfo},
    gates::Poseidon2Gate,
};

/// `log2` of the largest power-of-two subgroup of the Goldilocks multiplicative group.
pub const TWO_ADICITY: usize = 32;

/// Largest number of proof-of-work bits a 64-bit challenge can carry.
pub const MAX_PROOF_OF_WORK_BITS: u32 = 63;

/// Width of the chunks an outer-field digest is split into before it is
/// observed as Goldilocks elements.
pub const DIGEST_CHUNK_BITS: usize = 56;

/// `2^bits`, saturating at `usize::MAX` for sizes no validated config produces.
pub(crate) fn pow2(bits: usize) -> usize {
    u32::try_from(bits)
        .ok()
        .and_then(|bits| 1usize.checked_shl(bits))
        .unwrap_or(usize::MAX)
}

/// A method for deciding what arity to use at each reduction layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FriReductionStrategy {
    /// The exact sequence of arities, in bits.
    Fixed(Vec<usize>),

    /// `ConstantArityBits(arity_bits, final_poly_bits)` reduces by `2^arity_bits` until the
    /// polynomial has at most `2^final_poly_bits` coefficients, or until another reduction
    /// would make the last tree shorter than the cap.
    ConstantArityBits(usize, usize),

    /// Searches for the arities minimising the proof size, with an optional maximum.
    MinSize(Option<usize>),
}

impl FriReductionStrategy {
    /// The elements this strategy contributes to the transcript: `[1, arity_bits, final_poly_bits]`.
    pub fn to_transcript_elements(&self) -> Result<Vec<u64>, ConfigError> {
        match self {
            &FriReductionStrategy::ConstantArityBits(arity_bits, final_poly_bits) => {
                Ok(vec![1, arity_bits as u64, final_poly_bits as u64])
            }
            other => Err(ConfigError::UnsupportedReductionStrategy(format!("{other:?}"))),
        }
    }

    /// The arity of each reduction step, in bits.
    pub fn reduction_arity_bits(
        &self,
        mut degree_bits: usize,
        rate_bits: usize,
        cap_height: usize,
    ) -> Result<Vec<usize>, ConfigError> {
        let &FriReductionStrategy::ConstantArityBits(arity_bits, final_poly_bits) = self else {
            return Err(ConfigError::UnsupportedReductionStrategy(format!("{self:?}")));
        };
        if arity_bits == 0 {
            return Err(ConfigError::FriParamsMismatch("reduction arity must be at least 2"));
        }
        if degree_bits.checked_add(rate_bits).is_none() {
            return Err(ConfigError::DegreeTooLarge { degree_bits });
        }

        let mut result = Vec::new();
        while degree_bits > final_poly_bits
            && degree_bits >= arity_bits
            && degree_bits - arity_bits + rate_bits >= cap_height
        {
            result.push(arity_bits);
            degree_bits -= arity_bits;
        }
        Ok(result)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriConfig {
    /// `rate = 2^{-rate_bits}`.
    pub rate_bits: usize,

    /// Height of Merkle tree caps.
    pub cap_height: usize,

    /// Number of bits used for grinding.
    pub proof_of_work_bits: u32,

    pub reduction_strategy: FriReductionStrategy,

    /// Number of query rounds to perform.
    pub num_query_rounds: usize,
}

impl FriConfig {
    pub fn num_cap_elements(&self) -> usize {
        pow2(self.cap_height)
    }

    /// Bounds every field before anything is derived from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let &FriReductionStrategy::ConstantArityBits(arity_bits, final_poly_bits) =
            &self.reduction_strategy
        else {
            return Err(ConfigError::UnsupportedReductionStrategy(format!(
                "{:?}",
                self.reduction_strategy
            )));
        };
        for (what, value) in [
            ("rate bits", self.rate_bits),
            ("cap height", self.cap_height),
            ("reduction arity bits", arity_bits),
            ("final polynomial bits", final_poly_bits),
        ] {
            if value > TWO_ADICITY {
                return Err(ConfigError::ParameterTooLarge {
                    what,
                    value,
                    max: TWO_ADICITY,
                });
            }
        }
        if self.proof_of_work_bits > MAX_PROOF_OF_WORK_BITS {
            return Err(ConfigError::ProofOfWorkBitsTooLarge(self.proof_of_work_bits));
        }
        Ok(())
    }

    pub fn fri_params(&self, degree_bits: usize, hiding: bool) -> Result<FriParams, ConfigError> {
        self.validate()?;
        if degree_bits > TWO_ADICITY - self.rate_bits {
            return Err(ConfigError::DegreeTooLarge { degree_bits });
        }
        let reduction_arity_bits =
            self.reduction_strategy
                .reduction_arity_bits(degree_bits, self.rate_bits, self.cap_height)?;
        Ok(FriParams {
            config: self.clone(),
            hiding,
            degree_bits,
            reduction_arity_bits,
        })
    }
}

/// FRI parameters, including generated parameters which are specific to an instance size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriParams {
    pub config: FriConfig,

    /// Whether to use a hiding variant of Merkle trees (where random salts are added to leaves).
    pub hiding: bool,

    /// The degree of the purported codeword, measured in bits.
    pub degree_bits: usize,

    /// The arity of each FRI reduction step, expressed as the log2 of the actual arity.
    pub reduction_arity_bits: Vec<usize>,
}

impl FriParams {
    pub fn total_arities(&self) -> usize {
        self.reduction_arity_bits
            .iter()
            .fold(0, |total, &bits| total.saturating_add(bits))
    }

    pub fn max_arity_bits(&self) -> Option<usize> {
        self.reduction_arity_bits.iter().copied().max()
    }

    pub fn lde_bits(&self) -> usize {
        self.degree_bits.saturating_add(self.config.rate_bits)
    }

    pub fn lde_size(&self) -> usize {
        pow2(self.lde_bits())
    }

    pub fn final_poly_bits(&self) -> usize {
        self.degree_bits.saturating_sub(self.total_arities())
    }

    pub fn final_poly_len(&self) -> usize {
        pow2(self.final_poly_bits())
    }

    /// Every configuration value bound into the transcript, in observation order.
    pub fn to_transcript_elements(&self) -> Result<Vec<u64>, ConfigError> {
        let config = &self.config;
        let mut elements = vec![
            config.rate_bits as u64,
            config.cap_height as u64,
            u64::from(config.proof_of_work_bits),
        ];
        elements.extend(config.reduction_strategy.to_transcript_elements()?);
        elements.push(config.num_query_rounds as u64);
        elements.push(u64::from(self.hiding));
        elements.push(self.degree_bits as u64);
        elements.extend(self.reduction_arity_bits.iter().map(|&bits| bits as u64));
        Ok(elements)
    }
}

/// The shape of a circuit and its security parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitConfig {
    /// Wires per row, routed and advice.
    pub num_wires: usize,
    /// Wires that take part in copy constraints.
    pub num_routed_wires: usize,
    pub num_constants: usize,
    pub use_base_arithmetic_gate: bool,
    pub security_bits: usize,
    /// Number of independent challenges drawn for each PLONK challenge batch.
    pub num_challenges: usize,
    pub zero_knowledge: bool,
    pub max_quotient_degree_factor: usize,
    pub fri_config: FriConfig,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self::standard_recursion_config()
    }
}

impl CircuitConfig {
    pub fn num_advice_wires(&self) -> usize {
        self.num_wires.saturating_sub(self.num_routed_wires)
    }

    /// A typical recursion config, without zero-knowledge, targeting ~100 bit security.
    pub fn standard_recursion_config() -> Self {
        Self {
            num_wires: 135,
            num_routed_wires: 80,
            num_constants: 2,
            use_base_arithmetic_gate: true,
            security_bits: 100,
            num_challenges: 2,
            zero_knowledge: false,
            max_quotient_degree_factor: 8,
            fri_config: FriConfig {
                rate_bits: 3,
                cap_height: 4,
                proof_of_work_bits: 16,
                reduction_strategy: FriReductionStrategy::ConstantArityBits(4, 5),
                num_query_rounds: 28,
            },
        }
    }
}

/// Circuit data shared by the prover and the verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonCircuitData {
    pub config: CircuitConfig,
    pub fri_params: FriParams,
    /// Ids of the gates used by the circuit, in selector order.
    pub gate_ids: Vec<String>,
    pub degree_bits: usize,
    pub quotient_degree_factor: usize,
    pub num_gate_constraints: usize,
    /// Number of constant polynomials, selectors included.
    pub num_constants: usize,
    pub num_public_inputs: usize,
    /// Coset shifts of the permutation argument, as canonical Goldilocks elements.
    pub k_is: Vec<u64>,
    pub num_partial_products: usize,
}

impl CommonCircuitData {
    /// Parses and validates circuit data serialized as JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let common: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        common.validate()?;
        Ok(common)
    }

    /// Checks that the data is self-consistent and that this verifier supports it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fri = &self.fri_params;
        let fri_config = &self.config.fri_config;

        fri_config.validate()?;
        if fri.config != *fri_config {
            return Err(ConfigError::FriParamsMismatch("FRI config"));
        }
        if fri.hiding != self.config.zero_knowledge {
            return Err(ConfigError::FriParamsMismatch("hiding"));
        }
        if fri.degree_bits != self.degree_bits {
            return Err(ConfigError::DegreeBitsMismatch {
                fri: fri.degree_bits,
                common: self.degree_bits,
            });
        }
        if fri.lde_bits() > TWO_ADICITY {
            return Err(ConfigError::DegreeTooLarge {
                degree_bits: self.degree_bits,
            });
        }
        if fri.total_arities() > self.degree_bits {
            return Err(ConfigError::AritiesExceedDegree {
                total: fri.total_arities(),
                degree_bits: self.degree_bits,
            });
        }
        if fri.lde_bits() < fri.total_arities().saturating_add(fri_config.cap_height) {
            return Err(ConfigError::FriParamsMismatch("cap height exceeds the last FRI tree"));
        }
        let expected_arities = fri_config.reduction_strategy.reduction_arity_bits(
            self.degree_bits,
            fri_config.rate_bits,
            fri_config.cap_height,
        )?;
        if fri.reduction_arity_bits != expected_arities {
            return Err(ConfigError::FriParamsMismatch("reduction arities"));
        }
        if self.config.num_challenges == 0 {
            return Err(ConfigError::NoChallenges);
        }
        let poseidon2_gates = self.poseidon2_gates()?;

        debug!(
            "circuit data: degree_bits={}, lde_bits={}, arities={:?}, {} query rounds, {} Poseidon2 gate(s)",
            self.degree_bits,
            fri.lde_bits(),
            fri.reduction_arity_bits,
            fri_config.num_query_rounds,
            poseidon2_gates.len()
        );
        Ok(())
    }

    /// The Poseidon2 gates listed in [Self::gate_ids], checked against the row width.
    pub fn poseidon2_gates(&self) -> Result<Vec<Poseidon2Gate>, ConfigError> {
        let mut gates = vec![];
        for id in &self.gate_ids {
            if let Some(gate) = Poseidon2Gate::from_id(id, self.config.num_wires)? {
                gates.push(gate);
            }
        }
        Ok(gates)
    }

    pub fn degree(&self) -> usize {
        pow2(self.degree_bits)
    }

    pub fn num_challenges(&self) -> usize {
        self.config.num_challenges
    }

    pub fn constants_range(&self) -> Range<usize> {
        0..self.num_constants
    }

    pub fn sigmas_range(&self) -> Range<usize> {
        self.num_constants..self.num_constants.saturating_add(self.config.num_routed_wires)
    }

    pub fn zs_range(&self) -> Range<usize> {
        0..self.config.num_challenges
    }

    pub fn partial_products_range(&self) -> Range<usize> {
        self.config.num_challenges..self.num_zs_partial_products_polys()
    }

    pub fn num_preprocessed_polys(&self) -> usize {
        self.sigmas_range().end
    }

    pub fn num_zs_partial_products_polys(&self) -> usize {
        self.config
            .num_challenges
            .saturating_mul(self.num_partial_products.saturating_add(1))
    }

    pub fn num_quotient_polys(&self) -> usize {
        self.config
            .num_challenges
            .saturating_mul(self.quotient_degree_factor)
    }

    /// The four committed oracles, in commitment order.
    pub fn fri_oracles(&self) -> Vec<FriOracleInfo> {
        vec![
            FriOracleInfo {
                num_polys: self.num_preprocessed_polys(),
                blinding: false,
            },
            FriOracleInfo {
                num_polys: self.config.num_wires,
                blinding: self.fri_params.hiding,
            },
            FriOracleInfo {
                num_polys: self.num_zs_partial_products_polys(),
                blinding: self.fri_params.hiding,
            },
            FriOracleInfo {
                num_polys: self.num_quotient_polys(),
                blinding: self.fri_params.hiding,
            },
        ]
    }

    /// Every polynomial, all opened at `zeta`.
    pub fn fri_all_polys(&self) -> Vec<FriPolynomialInfo> {
        [
            FriPolynomialInfo::from_range(0, 0..self.num_preprocessed_polys()),
            FriPolynomialInfo::from_range(1, 0..self.config.num_wires),
            FriPolynomialInfo::from_range(2, 0..self.num_zs_partial_products_polys()),
            FriPolynomialInfo::from_range(3, 0..self.num_quotient_polys()),
        ]
        .concat()
    }

    /// The `Z` polynomials, also opened at `g * zeta`.
    pub fn fri_next_batch_polys(&self) -> Vec<FriPolynomialInfo> {
        FriPolynomialInfo::from_range(2, self.zs_range())
    }

    /// The generator of the order-`2^degree_bits` subgroup. Only meaningful
    /// once [Self::validate] has bounded `degree_bits`.
    pub fn subgroup_generator(&self) -> Fq {
        let exponent = pow2(TWO_ADICITY.saturating_sub(self.degree_bits)) as u64;
        Fq::from(TWO_ADIC_GENERATOR).pow([exponent])
    }

    /// The FRI instance for an opening at `zeta`, computed natively.
    pub fn get_fri_instance(&self, zeta: Fq2) -> FriInstanceInfo<Fq2> {
        let g = self.subgroup_generator();
        let zeta_next = zeta * Fq2::new(g, Fq::from(0u64));
        self.fri_instance_at(zeta, zeta_next)
    }

    pub(crate) fn fri_instance_at<P>(&self, zeta: P, zeta_next: P) -> FriInstanceInfo<P> {
        FriInstanceInfo {
            oracles: self.fri_oracles(),
            batches: vec![
                FriBatchInfo {
                    point: zeta,
                    polynomials: self.fri_all_polys(),
                },
                FriBatchInfo {
                    point: zeta_next,
                    polynomials: self.fri_next_batch_polys(),
                },
            ],
        }
    }
}

/// Data only the verifier needs.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierOnlyCircuitData {
    /// Cap of the constants and sigmas commitment.
    pub constants_sigmas_cap: Vec<[u64; 4]>,

    /// Digest of the circuit, an element of the outer field written big-endian.
    #[serde_as(as = "serde_with::hex::Hex")]
    pub circuit_digest: [u8; 32],
}

impl VerifierOnlyCircuitData {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// The digest as an outer-field element. It must be below the outer modulus.
    pub fn digest<F: PrimeField>(&self) -> Result<F, ConfigError> {
        let digest = BigUint::from_bytes_be(&self.circuit_digest);
        let modulus: BigUint = F::MODULUS.into();
        if digest >= modulus {
            return Err(ConfigError::NonCanonicalDigest);
        }
        Ok(F::from(digest))
    }

    /// The digest split into [DIGEST_CHUNK_BITS]-bit chunks, lowest first, as
    /// the transcript observes it.
    pub fn digest_chunks<F: PrimeField>(&self) -> Result<Vec<u64>, ConfigError> {
        let digest: BigUint = self.digest::<F>()?.into();
        let num_bits = F::MODULUS_BIT_SIZE as usize;
        let chunks = (0..num_bits)
            .step_by(DIGEST_CHUNK_BITS)
            .map(|start| {
                let len = DIGEST_CHUNK_BITS.min(num_bits - start);
                let chunk = (&digest >> start) & ((BigUint::from(1u64) << len) - 1u64);
                chunk.iter_u64_digits().next().unwrap_or(0)
            })
            .collect();
        Ok(chunks)
    }

    pub fn num_cap_elements(&self) -> usize {
        self.constants_sigmas_cap.len()
    }
}
