//! Error types for Tank operations

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Image cache not found: {uuid}")]
    NotFound { uuid: String },

    #[error("Insert failed for image cache {uuid}: {reason}")]
    InsertFailed { uuid: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },
}

/// Ownership errors.
///
/// Only the identifier the caller asked for is carried, never the owner
/// or any other field of the record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Access denied to image cache {uuid}")]
    Denied { uuid: String },
}

/// Master error type for all Tank errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TankError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Access error: {0}")]
    Access(#[from] AccessError),
}

/// Abstract error kinds reported to callers.
///
/// None of these is retryable: they are caller-input or ownership problems,
/// except `Internal`, which is an opaque store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Unauthorized,
    Internal,
}

impl TankError {
    /// A required parameter was missing or empty.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::RequiredFieldMissing {
            field: field.into(),
        }
        .into()
    }

    /// A parameter was present but unusable.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
        .into()
    }

    pub fn not_found(uuid: impl Into<String>) -> Self {
        StorageError::NotFound { uuid: uuid.into() }.into()
    }

    pub fn denied(uuid: impl Into<String>) -> Self {
        AccessError::Denied { uuid: uuid.into() }.into()
    }

    pub fn backend(reason: impl Into<String>) -> Self {
        StorageError::Backend {
            reason: reason.into(),
        }
        .into()
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TankError::Validation(_) => ErrorKind::InvalidArgument,
            TankError::Storage(StorageError::NotFound { .. }) => ErrorKind::NotFound,
            TankError::Storage(_) => ErrorKind::Internal,
            TankError::Access(_) => ErrorKind::Unauthorized,
        }
    }
}

/// Result type alias for Tank operations.
pub type TankResult<T> = Result<T, TankError>;

// =============================================================================
// TESTS
// =============================================================================
