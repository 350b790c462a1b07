//! Serializer errors

use dioxide_spec::SpecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("Spec error: {0}")]
    Spec(#[from] SpecError),

    #[error("Type validation failed for {ty}: {reason}")]
    TypeValidation { ty: String, reason: String },

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}

impl SerializeError {
    pub(crate) fn validation(ty: impl ToString, reason: impl Into<String>) -> Self {
        SerializeError::TypeValidation {
            ty: ty.to_string(),
            reason: reason.into(),
        }
    }

    /// Value did not fit its declared type
    pub fn is_type_validation(&self) -> bool {
        matches!(self, SerializeError::TypeValidation { .. })
    }

    /// Descriptor was unknown or malformed
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, SerializeError::Spec(e) if e.is_unsupported_type())
    }
}

pub type Result<T> = std::result::Result<T, SerializeError>;
