use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicyError {
    #[error("failed to parse policy: {0}")]
    ParseError(String),

    #[error("invalid ARN: {0}")]
    InvalidArn(String),

    #[error("invalid Effect '{0}'")]
    InvalidEffect(String),

    #[error("invalid Version '{0}'")]
    InvalidVersion(String),

    #[error("unknown condition operator '{0}'")]
    UnknownOperator(String),

    #[error("unknown condition key '{0}'")]
    UnknownKey(String),

    #[error("invalid action '{0}'")]
    InvalidAction(String),

    #[error("invalid resource '{0}'")]
    InvalidResource(String),

    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("'Principal' is required in {0} policies")]
    MissingPrincipal(String),

    #[error("'Principal' is not allowed in {0} policies")]
    UnexpectedPrincipal(String),

    #[error("'{0}' must not be empty")]
    EmptySet(String),

    #[error("duplicate value '{value}' in {set}")]
    DuplicateValue { set: String, value: String },

    #[error("invalid value for {operator}: {reason}")]
    InvalidValue { operator: String, reason: String },

    #[error("duplicate statement: {0}")]
    DuplicateStatement(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("evaluation error: {0}")]
    EvalError(String),

    #[error("[{}]", .0.iter().join(", "))]
    Aggregate(Vec<PolicyError>),
}

impl PolicyError {
    pub(crate) fn duplicate(set: &str, value: impl ToString) -> Self {
        PolicyError::DuplicateValue {
            set: set.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn invalid_value(operator: impl ToString, reason: impl Into<String>) -> Self {
        PolicyError::InvalidValue {
            operator: operator.to_string(),
            reason: reason.into(),
        }
    }

    /// Fold a list of errors into one, keeping each distinct message once.
    ///
    /// Returns `None` for an empty list and the error itself when only one
    /// distinct error remains.
    pub fn aggregate(errors: Vec<PolicyError>) -> Option<PolicyError> {
        let mut unique: Vec<PolicyError> = errors
            .into_iter()
            .flat_map(|e| match e {
                PolicyError::Aggregate(inner) => inner,
                other => vec![other],
            })
            .unique_by(|e| e.to_string())
            .collect();

        match unique.len() {
            0 => None,
            1 => unique.pop(),
            _ => Some(PolicyError::Aggregate(unique)),
        }
    }
}

impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        PolicyError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for PolicyError {
    fn from(err: std::io::Error) -> Self {
        PolicyError::Io(err.to_string())
    }
}
