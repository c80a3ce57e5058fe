//! Error types for the browser adapter.

use customfit_forms::FormError;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Result type alias for DOM operations.
pub type Result<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("no window object available")]
    NoWindow,

    #[error("no document available")]
    NoDocument,

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("{context}: {message}")]
    Js { context: String, message: String },

    #[error("invalid image sources: {0}")]
    Sources(#[from] serde_json::Error),

    #[error(transparent)]
    Form(#[from] FormError),
}

impl WebError {
    /// Wrap a JavaScript exception with what was being attempted.
    pub fn js(context: impl Into<String>, value: &JsValue) -> Self {
        Self::Js {
            context: context.into(),
            message: format!("{value:?}"),
        }
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        Self::from_str(&err.to_string())
    }
}
