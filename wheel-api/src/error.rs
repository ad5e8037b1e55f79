use hyper::StatusCode;
use spin_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("invalid request body: {0}")]
    BadRequest(String),
    #[error("route not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(err) => match err {
                EngineError::InvalidInput(_)
                | EngineError::CodeNotFound { .. }
                | EngineError::CodeAlreadyUsed { .. }
                | EngineError::InsufficientBalance => StatusCode::BAD_REQUEST,
                EngineError::Unauthorized => StatusCode::FORBIDDEN,
                EngineError::ConfigurationMissing
                | EngineError::InvalidConfiguration(_)
                | EngineError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to clients. Storage and internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Engine(EngineError::StorageUnavailable(_)) => {
                "storage unavailable".to_string()
            }
            ApiError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiError::Engine(err) => match err {
                EngineError::InvalidInput(_) => "invalid_input",
                EngineError::CodeNotFound { .. } => "code_not_found",
                EngineError::CodeAlreadyUsed { .. } => "code_already_used",
                EngineError::InsufficientBalance => "insufficient_balance",
                EngineError::InvalidConfiguration(_) => "invalid_configuration",
                EngineError::ConfigurationMissing => "configuration_missing",
                EngineError::Unauthorized => "unauthorized",
                EngineError::StorageUnavailable(_) => "storage_unavailable",
            },
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound => "not_found",
            ApiError::MethodNotAllowed => "method_not_allowed",
            ApiError::Internal(_) => "internal",
        }
    }
}
