//! Error types for form wiring.
//!
//! Construction and binding problems (a rule naming a field that was never
//! registered, a radio value that does not exist) are reported here. Bad user
//! input never is: numeric checks absorb it as "no warning".

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;

/// Errors raised while registering, binding or driving form fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field already registered: {0}")]
    DuplicateField(String),

    #[error("radio group '{field}' has no member with value '{value}'")]
    UnknownRadioValue { field: String, value: String },

    #[error("field '{field}' is a {actual}, expected a {expected}")]
    WrongKind {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("invalid declaration: {reason}")]
    InvalidDeclaration { reason: String },
}

impl FormError {
    /// Create an unknown field error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField(field.into())
    }

    /// Create an unknown radio value error.
    pub fn unknown_radio_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownRadioValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an invalid declaration error.
    pub fn invalid_declaration(reason: impl Into<String>) -> Self {
        Self::InvalidDeclaration {
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading a form declaration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read declaration '{path}': {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("unsupported declaration format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Form(#[from] FormError),
}

impl ConfigError {
    /// Create a read failure error.
    pub fn read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
