use thiserror::Error;

/// Custom error type for WordWeave operations.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// Markup could not be processed at all (unreadable input, not a
    /// skippable element).
    #[error("Markup error: {0}")]
    Markup(String),

    /// Requested record was not found.
    #[error("Not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },

    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A suggestion or document lookup against an external provider failed.
    #[error("Lookup error: {message}")]
    Lookup {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The editing surface rejected or could not complete an operation.
    #[error("Surface error: {0}")]
    Surface(String),
}

impl WeaveError {
    /// Build a `Lookup` error from any underlying provider error.
    pub fn lookup(message: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        WeaveError::Lookup {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build a `Lookup` error with no underlying cause (e.g. empty response
    /// where one was required).
    pub fn lookup_msg(message: impl Into<String>) -> Self {
        WeaveError::Lookup {
            message: message.into(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for WeaveError {
    fn from(err: serde_json::Error) -> Self {
        WeaveError::Validation(format!("JSON serialization error: {}", err))
    }
}
