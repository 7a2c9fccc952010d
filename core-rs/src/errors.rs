//! Error types for the contract engine

use crate::contract::ConditionKind;
use std::any::Any;
use thiserror::Error;

/// A contract was checked and found false, or could not be checked at all.
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Precondition violated: {0}")]
    PreconditionViolated(#[source] AssertionError),

    #[error("Postcondition violated: {0}")]
    PostconditionViolated(#[source] AssertionError),

    #[error("Invariant violated: {0}")]
    InvariantViolated(#[source] AssertionError),

    #[error("{kind} not verifiable: {source}")]
    NotVerifiable {
        kind: ConditionKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl ContractError {
    /// Classify the failure of a condition body of the given kind.
    ///
    /// - `ContractError` raised by a nested contracted call passes through unchanged
    /// - `AssertionError` becomes the violation matching `kind`
    /// - anything else becomes `NotVerifiable`
    pub fn classify(kind: ConditionKind, err: anyhow::Error) -> Self {
        let err = match err.downcast::<ContractError>() {
            Ok(contract_err) => return contract_err,
            Err(err) => err,
        };

        match err.downcast::<AssertionError>() {
            Ok(assertion) => Self::violated(kind, assertion),
            Err(other) => ContractError::NotVerifiable {
                kind,
                source: other.into(),
            },
        }
    }

    /// Wrap a primitive assertion failure in the violation for `kind`
    pub fn violated(kind: ConditionKind, assertion: AssertionError) -> Self {
        match kind {
            ConditionKind::Precondition => ContractError::PreconditionViolated(assertion),
            ConditionKind::Postcondition => ContractError::PostconditionViolated(assertion),
            ConditionKind::Invariant => ContractError::InvariantViolated(assertion),
        }
    }

    /// Which category of condition produced this error
    pub fn kind(&self) -> ConditionKind {
        match self {
            ContractError::PreconditionViolated(_) => ConditionKind::Precondition,
            ContractError::PostconditionViolated(_) => ConditionKind::Postcondition,
            ContractError::InvariantViolated(_) => ConditionKind::Invariant,
            ContractError::NotVerifiable { kind, .. } => *kind,
        }
    }

    /// True when the contract was evaluated and found false
    pub fn is_violation(&self) -> bool {
        !matches!(self, ContractError::NotVerifiable { .. })
    }

    /// The underlying assertion, if this is a violation
    pub fn assertion(&self) -> Option<&AssertionError> {
        match self {
            ContractError::PreconditionViolated(a)
            | ContractError::PostconditionViolated(a)
            | ContractError::InvariantViolated(a) => Some(a),
            ContractError::NotVerifiable { .. } => None,
        }
    }
}

/// Primitive local-validation failures raised by the assertion helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssertionError {
    /// Raised by `require`
    #[error("invalid argument{}", detail(.0))]
    InvalidArgument(Option<String>),

    /// Raised by `ensure` and `check`
    #[error("illegal state{}", detail(.0))]
    IllegalState(Option<String>),
}

impl AssertionError {
    pub fn message(&self) -> Option<&str> {
        match self {
            AssertionError::InvalidArgument(msg) | AssertionError::IllegalState(msg) => {
                msg.as_deref()
            }
        }
    }
}

fn detail(msg: &Option<String>) -> String {
    match msg {
        Some(msg) if !msg.is_empty() => format!(": {}", msg),
        _ => String::new(),
    }
}

/// A condition body panicked
#[derive(Error, Debug)]
#[error("condition panicked: {message}")]
pub struct ConditionPanicked {
    pub message: String,
}

impl ConditionPanicked {
    pub(crate) fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }
}

/// The active handle holds no snapshot of the type a postcondition asked for
#[derive(Error, Debug)]
#[error("no snapshot of type {expected} captured for this contract")]
pub struct SnapshotUnavailable {
    pub expected: &'static str,
}

/// Configuration loading and installation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Contract configuration already installed")]
    AlreadyInstalled,
}

pub type Result<T> = std::result::Result<T, ContractError>;
