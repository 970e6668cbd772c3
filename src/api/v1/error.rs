use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        code.clone()
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        warn!("rejected request body: {}", e);
        ApiErrorCode::BadRequest
    } else if err.find::<reject::UnsupportedMediaType>().is_some() {
        ApiErrorCode::UnsupportedMediaType
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        ApiErrorCode::PayloadTooLarge
    } else if err.find::<reject::LengthRequired>().is_some() {
        ApiErrorCode::BadRequest
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::NotFound
    } else {
        warn!("unhandled rejection: {:?}", err);
        ApiErrorCode::InternalError
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Incorrect email or password")]
    IncorrectCredentials,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Password does not meet security requirements")]
    WeakPassword,
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Token has been revoked")]
    TokenRevoked,
    #[error("Token has the wrong type")]
    TokenWrongType,
    #[error("Token was issued for another audience")]
    TokenWrongAudience,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("User not found")]
    UserNotFound,
    #[error("Malformed request")]
    BadRequest,
    #[error("Request body must be JSON")]
    UnsupportedMediaType,
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("Not found")]
    NotFound,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::IncorrectCredentials
            | ApiErrorCode::MissingToken
            | ApiErrorCode::TokenExpired
            | ApiErrorCode::TokenRevoked
            | ApiErrorCode::TokenWrongType
            | ApiErrorCode::TokenWrongAudience
            | ApiErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiErrorCode::EmailTaken | ApiErrorCode::WeakPassword | ApiErrorCode::BadRequest => {
                StatusCode::BAD_REQUEST
            }
            ApiErrorCode::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiErrorCode::UserNotFound | ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::IncorrectCredentials => ApiErrorCode::IncorrectCredentials,
            AuthError::UserExists => ApiErrorCode::EmailTaken,
            AuthError::WeakPassword(_) => ApiErrorCode::WeakPassword,
            AuthError::TokenExpired => ApiErrorCode::TokenExpired,
            AuthError::TokenRevoked => ApiErrorCode::TokenRevoked,
            AuthError::TokenWrongType => ApiErrorCode::TokenWrongType,
            AuthError::TokenWrongAudience => ApiErrorCode::TokenWrongAudience,
            AuthError::TokenInvalid => ApiErrorCode::InvalidToken,
            AuthError::UserNotFound => ApiErrorCode::UserNotFound,
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}
