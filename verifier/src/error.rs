use thiserror::Error;
use wrap_snarky::errors::SnarkyError;

/// Problems with the verification key or the gate configuration.
///
/// These are detected once, before any proof data is looked at.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported FRI reduction strategy {0}, only ConstantArityBits is supported")]
    UnsupportedReductionStrategy(String),

    #[error("the FRI parameters disagree with the circuit config: {0}")]
    FriParamsMismatch(&'static str),

    #[error("the FRI parameters have {fri} degree bits but the circuit has {common}")]
    DegreeBitsMismatch { fri: usize, common: usize },

    #[error("{degree_bits} degree bits exceed the two-adicity of Goldilocks")]
    DegreeTooLarge { degree_bits: usize },

    #[error("{what} is {value}, at most {max} is supported")]
    ParameterTooLarge {
        what: &'static str,
        value: usize,
        max: usize,
    },

    #[error("reduction arities add up to {total} bits, more than the {degree_bits} degree bits")]
    AritiesExceedDegree { total: usize, degree_bits: usize },

    #[error("at least one challenge per round is required")]
    NoChallenges,

    #[error("{0} proof-of-work bits do not fit in a Goldilocks challenge")]
    ProofOfWorkBitsTooLarge(u32),

    #[error("the Poseidon2 gate is compiled for width {expected}, the hash has width {got}")]
    GateWidthMismatch { expected: usize, got: usize },

    #[error("the Poseidon2 gate needs {required} wires, only {available} are available")]
    NotEnoughWires { required: usize, available: usize },

    #[error("{wire} index {index} is out of range (must be below {bound})")]
    WireOutOfRange {
        wire: &'static str,
        index: usize,
        bound: usize,
    },

    #[error("the S-box input of round {round} in half {half} is derived, not stored")]
    SBoxNotStored { half: usize, round: usize },

    #[error("malformed gate id `{0}`")]
    MalformedGateId(String),

    #[error("the circuit digest is not a canonical element of the outer field")]
    NonCanonicalDigest,

    #[error("the outer field has {got} bits, the emulation needs at least {required}")]
    NativeFieldTooSmall { required: u32, got: u32 },

    #[error("invalid circuit data: {0}")]
    Json(String),
}

/// A proof whose shape does not match the circuit it claims to be for.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProofShapeError {
    #[error("{what}: expected {expected} elements, got {got}")]
    Length {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifierError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ProofShape(#[from] ProofShapeError),

    #[error(transparent)]
    Snarky(#[from] SnarkyError),
}

pub type VerifierResult<T> = std::result::Result<T, VerifierError>;
