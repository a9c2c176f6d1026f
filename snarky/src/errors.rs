use thiserror::Error;

/// A result type for Snarky errors.
pub type SnarkyResult<T> = std::result::Result<T, SnarkyError>;

/// A result type for Snarky runtime errors.
pub type SnarkyRuntimeResult<T> = std::result::Result<T, SnarkyRuntimeError>;

/// A result type for Snarky compilation errors.
pub type SnarkyCompileResult<T> = std::result::Result<T, SnarkyCompilationError>;

/// Errors surfaced while running a circuit.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnarkyError {
    #[error("a compilation error occurred: {0}")]
    CompilationError(SnarkyCompilationError),

    #[error("a runtime error occurred: {0}")]
    RuntimeError(SnarkyRuntimeError),
}

impl From<SnarkyRuntimeError> for SnarkyError {
    fn from(e: SnarkyRuntimeError) -> Self {
        SnarkyError::RuntimeError(e)
    }
}

impl From<SnarkyCompilationError> for SnarkyError {
    fn from(e: SnarkyCompilationError) -> Self {
        SnarkyError::CompilationError(e)
    }
}

/// Errors in the shape of a circuit, independent of any witness.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnarkyCompilationError {
    #[error("a {bits}-bit intermediate value does not fit a {field_bits}-bit native field")]
    ValueTooWide { bits: usize, field_bits: u32 },
}

/// Errors that can occur while generating a witness.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnarkyRuntimeError {
    #[error("unsatisfied constraint `{1}`: {0} is not a boolean (0 or 1)")]
    UnsatisfiedBooleanConstraint(String, &'static str),

    #[error("unsatisfied constraint `{2}`: {0} is not equal to {1}")]
    UnsatisfiedEqualConstraint(String, String, &'static str),

    #[error("unsatisfied constraint `{2}`: {0}^2 is not equal to {1}")]
    UnsatisfiedSquareConstraint(String, String, &'static str),

    #[error("unsatisfied constraint `{3}`: {0} * {1} is not equal to {2}")]
    UnsatisfiedR1CSConstraint(String, String, String, &'static str),

    #[error("the witness has {0} values but the circuit allocated {1} variables")]
    WitnessLength(usize, usize),
}
