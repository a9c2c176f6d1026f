//! A small snarky-style frontend: circuit variables, a run state that either
//! compiles constraints or generates (and checks) a witness, and a handful of
//! gadgets over the native field.
//!
//! Circuits are written once against [RunState] and run in both modes.

pub mod bits;
pub mod boolean;
pub mod constraint_system;
pub mod cvar;
pub mod errors;
pub mod runner;
pub mod snarky_type;

#[cfg(test)]
mod tests;

/// Returns the current file and line, used to annotate witness computations.
#[macro_export]
macro_rules! loc {
    () => {{
        ::std::borrow::Cow::<'static, str>::Owned(format!("{}:{}", file!(), line!()))
    }};
}

/// A handy module that you can import the content of to easily use snarky.
pub mod prelude {
    pub use super::boolean::Boolean;
    pub use super::cvar::FieldVar;
    pub use super::errors::{SnarkyError, SnarkyResult};
    pub use super::runner::{RunState, WitnessGeneration};
    pub use super::snarky_type::SnarkyType;
    pub use crate::loc;
}
