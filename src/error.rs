use serde::Serialize;
use thiserror::Error;

/// A single rejected input field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum BuddyError {
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("An advisor with email {0} already exists")]
    DuplicateEmail(String),
    #[error("Advisor has {count} active request(s)")]
    AdvisorHasActiveRequests { count: usize },
    #[error("Cannot move request from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("All advisors are busy for the requested slot")]
    NoAdvisorAvailable,
    #[error("Invalid payment signature")]
    InvalidSignature,
    #[error("Missing or invalid admin credentials")]
    Unauthorized,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BuddyError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Stable machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::DuplicateEmail(_) => "duplicate_email",
            Self::AdvisorHasActiveRequests { .. } => "advisor_has_active_requests",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::NoAdvisorAvailable => "no_advisor_available",
            Self::InvalidSignature => "invalid_signature",
            Self::Unauthorized => "unauthorized",
            Self::Storage(_) | Self::Csv(_) | Self::Io(_) | Self::Internal(_) => "internal_error",
        }
    }
}

impl From<serde_json::Error> for BuddyError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage(format!("Serialization error: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, BuddyError>;
