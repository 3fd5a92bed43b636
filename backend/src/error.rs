use actix_web::{http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use log::warn;
use thiserror::Error;

use crate::models::ErrorBody;

pub const UNLOADED_MESSAGE: &str = "Model is not loaded. Please check the server logs.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Model is not loaded. Please check the server logs.")]
    ModelUnloaded,

    #[error("{0}")]
    Validation(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Endpoint not found")]
    NotFound,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ModelUnloaded => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}

/// Turns body extraction failures (bad JSON, unknown class code, negative numbers)
/// into the same 422 shape as field validation.
pub fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected request body: {}", err);
    ApiError::Validation(err.to_string()).into()
}
