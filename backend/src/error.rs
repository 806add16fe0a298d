use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::{ErrorResponse, ValidationError};
use thiserror::Error;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(#[from] ValidationError),
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("Database connection failed")]
    StoreUnavailable,
    #[error("Database error: {0}")]
    Store(String),
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::InvalidRequest(_) => Status::BadRequest,
            ApiError::PayloadTooLarge => Status::PayloadTooLarge,
            ApiError::StoreUnavailable => Status::InternalServerError,
            ApiError::Store(_) => Status::InternalServerError,
            ApiError::Internal => Status::InternalServerError,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Connect(_) => ApiError::StoreUnavailable,
            StoreError::Query(msg) => ApiError::Store(msg),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();

        rocket::Response::build_from(Json(ErrorResponse::new(self.to_string())).respond_to(req)?)
            .status(status)
            .ok()
    }
}
