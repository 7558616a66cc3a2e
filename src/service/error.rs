use thiserror::Error;

use crate::error::HttpError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Payment provider error: {0}")]
    Provider(String),

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("Email delivery error: {0}")]
    Email(String),

    #[error("Another digest run is already in progress")]
    DigestLocked,
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Provider(err.to_string())
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::InvalidPayload(_) => HttpError::bad_request(error.to_string()),
            _ => HttpError::server_error(error.to_string()),
        }
    }
}
