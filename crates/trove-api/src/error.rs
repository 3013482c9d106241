use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use trove_types::api::ErrorResponse;

/// Handler-level error: a domain-validation failure with a user-facing
/// message, or an infrastructure failure reported generically.
#[derive(Debug)]
pub enum ApiError {
    Domain(StatusCode, String),
    Internal,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Domain(StatusCode::BAD_REQUEST, message.into())
    }
}

impl From<trove_db::Error> for ApiError {
    fn from(err: trove_db::Error) -> Self {
        use trove_db::Error::*;
        let status = match &err {
            AlreadyOwned | AlreadySold | SelfOffer | EmptyCart | NoPurchaseProof
            | OfferClosed | InvalidRating => StatusCode::BAD_REQUEST,
            Duplicate | DuplicateReview | UsernameTaken | EmailTaken => StatusCode::CONFLICT,
            InvalidCredentials => StatusCode::UNAUTHORIZED,
            NotOwner => StatusCode::FORBIDDEN,
            NotFound(_) => StatusCode::NOT_FOUND,
            LockPoisoned | Sqlite(_) => {
                error!("Storage failure: {}", err);
                return ApiError::Internal;
            }
        };
        ApiError::Domain(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Domain(status, message) => (status, message),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "something went wrong, please try again".to_string(),
            ),
        };
        (status, Json(ErrorResponse { error: message, status: "error" })).into_response()
    }
}
