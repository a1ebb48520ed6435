use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::schemas::GenericResponse;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum GenericError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ConflictError(String),
    #[error("{0}")]
    SerializationError(String),
    #[error("{0}")]
    ProviderError(String, #[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for GenericError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for GenericError {
    fn status_code(&self) -> StatusCode {
        match self {
            GenericError::ValidationError(_) => StatusCode::BAD_REQUEST,
            GenericError::NotFoundError(_) => StatusCode::NOT_FOUND,
            GenericError::ConflictError(_) => StatusCode::CONFLICT,
            GenericError::SerializationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GenericError::ProviderError(_, _) => StatusCode::BAD_GATEWAY,
            GenericError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let inner_error_msg = match self {
            GenericError::ValidationError(message) => message.to_string(),
            GenericError::NotFoundError(message) => message.to_string(),
            GenericError::ConflictError(message) => message.to_string(),
            GenericError::SerializationError(message) => message.to_string(),
            GenericError::ProviderError(message, _) => message.to_string(),
            GenericError::UnexpectedError(_) => "Something went wrong".to_string(),
        };

        HttpResponse::build(status_code).json(GenericResponse::error(
            &inner_error_msg,
            status_code.as_str(),
            Some(()),
        ))
    }
}
