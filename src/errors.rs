// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for template generation

use thiserror::Error;

use crate::domain::NetworkError;
use crate::invariants::ValidationError;

/// Errors that can occur while building or writing a template
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A resource or parameter was declared twice under the same logical id
    #[error("Duplicate logical id: {0}")]
    DuplicateLogicalId(String),

    /// Literal layout input rejected before construction
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// CIDR block could not be parsed
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Built template violates a structural invariant
    #[error("Template validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Output file could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

impl From<serde_json::Error> for TemplateError {
    fn from(err: serde_json::Error) -> Self {
        TemplateError::Serialization(err.to_string())
    }
}
