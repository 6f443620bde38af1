use thiserror::Error;
use validator::ValidationErrors;

use crate::models::{first_validation_message, EntityKind};

/// Failures a store reports to its caller. Storage failures are logged and
/// absorbed inside the store, so they never show up here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid {kind}: {}", first_validation_message(.source))]
    Validation {
        kind: EntityKind,
        #[source]
        source: ValidationErrors,
    },
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: EntityKind, id: String },
}

impl StoreError {
    /// Message suitable for an inline form error.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Validation { source, .. } => first_validation_message(source),
            StoreError::DuplicateId { .. } => self.to_string(),
        }
    }
}
