//! Build-time error types for the helper factories.
//!
//! Per-event failures are not errors in this sense: they travel as trace
//! strings inside [`TermResult`](crate::TermResult) and never abort the
//! pipeline.

use thiserror::Error;

/// Errors raised while compiling a helper definition into a term.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The operator name is not in the catalogue.
    #[error("unknown helper '{0}'")]
    UnknownHelper(String),

    /// Wrong number of parameters for the operator.
    #[error("helper '{helper}' expects {expected} parameter(s), got {got}")]
    InvalidArity {
        helper: String,
        expected: String,
        got: usize,
    },

    /// The parameter at `position` (0-based) must be a literal value.
    #[error("helper '{helper}': parameter at position {position} must be a literal value")]
    ExpectedValue { helper: String, position: usize },

    /// The parameter at `position` (0-based) must be a `$` reference.
    #[error("helper '{helper}': parameter at position {position} must be a reference")]
    ExpectedReference { helper: String, position: usize },

    /// A parameter value violates an operator-specific constraint.
    #[error("helper '{helper}': {detail}")]
    InvalidParameter { helper: String, detail: String },

    /// The regex parameter did not compile.
    #[error("helper '{helper}': invalid regex: {source}")]
    InvalidRegex {
        helper: String,
        #[source]
        source: regex::Error,
    },

    /// A literal divisor of zero was supplied to an integer division.
    #[error("helper '{helper}': literal division by zero")]
    DivisionByZero { helper: String },
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BuildError>;
