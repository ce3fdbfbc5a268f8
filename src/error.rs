//! Error types for Pactline
//!
//! Library errors use `thiserror`; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::entities::ValidationError;
use crate::domain::ports::StorageError;
use crate::domain::services::LifecycleError;
use crate::domain::value_objects::ContractId;

/// Result type alias for Pactline operations
pub type PactResult<T> = Result<T, PactError>;

/// Main error type for Pactline operations
#[derive(Error, Debug)]
pub enum PactError {
    #[error("contract {0} not found")]
    ContractNotFound(ContractId),

    /// The per-contract lock could not be acquired in time
    #[error("contract {contract} is busy (waited {waited_ms} ms for its lock)")]
    Busy { contract: ContractId, waited_ms: u64 },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("storage failure{}: {source}", contract_suffix(.contract))]
    Storage {
        contract: Option<ContractId>,
        #[source]
        source: StorageError,
    },

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn contract_suffix(contract: &Option<ContractId>) -> String {
    contract
        .map(|id| format!(" on contract {}", id))
        .unwrap_or_default()
}

impl From<StorageError> for PactError {
    fn from(source: StorageError) -> Self {
        match source {
            StorageError::LockTimeout {
                contract,
                waited_ms,
            } => PactError::Busy {
                contract,
                waited_ms,
            },
            source => PactError::Storage {
                contract: None,
                source,
            },
        }
    }
}

impl From<ValidationError> for PactError {
    fn from(err: ValidationError) -> Self {
        PactError::Validation {
            field: err.field.to_string(),
            message: err.message,
        }
    }
}

/// Coarse error category, used for retry decisions and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    InvalidTransition,
    /// Lost a race for the contract; retrying may succeed
    Conflict,
    StorageFailure,
    Invalid,
}

impl ErrorClass {
    /// Process exit code for the CLI
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorClass::NotFound | ErrorClass::InvalidTransition | ErrorClass::Invalid => 2,
            ErrorClass::Conflict => 3,
            ErrorClass::StorageFailure => 4,
        }
    }
}

impl PactError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PactError::ContractNotFound(_) => ErrorClass::NotFound,
            PactError::Busy { .. } => ErrorClass::Conflict,
            PactError::Lifecycle(err) => match err {
                LifecycleError::MilestoneNotFound { .. }
                | LifecycleError::InvalidContractReference { .. } => ErrorClass::NotFound,
                LifecycleError::InvalidTransition { .. } => ErrorClass::InvalidTransition,
                LifecycleError::Validation(_) => ErrorClass::Invalid,
            },
            PactError::Storage { .. } | PactError::Io(_) => ErrorClass::StorageFailure,
            PactError::Validation { .. } | PactError::Config { .. } => ErrorClass::Invalid,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::Conflict | ErrorClass::StorageFailure
        )
    }

    /// Attach the contract a storage failure happened on
    pub(crate) fn on_contract(self, id: ContractId) -> Self {
        match self {
            PactError::Storage { source, .. } => PactError::Storage {
                contract: Some(id),
                source,
            },
            other => other,
        }
    }
}
