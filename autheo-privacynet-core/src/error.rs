use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("domain mismatch: expected {expected}, found {found}")]
    DomainMismatch { expected: String, found: String },
    #[error("metric mismatch: expected {expected}, found {found}")]
    MetricMismatch { expected: String, found: String },
    #[error("measures {left} and {right} cannot be combined")]
    IncompatibleMeasures { left: String, right: String },
    #[error("expected a {expected} distance, got {found}")]
    DistanceKind {
        expected: &'static str,
        found: &'static str,
    },
    #[error("value is not a member of the input domain: {0}")]
    NotInDomain(String),
    #[error("no conversion from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("composition requires at least one measurement")]
    EmptyComposition,
    #[error("numeric search did not converge after {iterations} iterations")]
    NonConvergent { iterations: usize },
    #[error("capability `{name}` is not enabled")]
    MissingCapability { name: &'static str },
    #[error("arithmetic failure: {0}")]
    Arithmetic(String),
    #[error("function failed: {0}")]
    Function(String),
}

impl CoreError {
    pub fn invalid(details: impl Into<String>) -> Self {
        CoreError::InvalidParameter(details.into())
    }

    pub fn arithmetic(details: impl Into<String>) -> Self {
        CoreError::Arithmetic(details.into())
    }

    pub fn unsupported(from: impl std::fmt::Debug, to: impl Into<String>) -> Self {
        CoreError::UnsupportedConversion {
            from: format!("{from:?}"),
            to: to.into(),
        }
    }
}
