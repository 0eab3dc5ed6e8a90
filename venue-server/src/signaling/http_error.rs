use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use venue_core::{ErrorBody, ErrorCode, VenueError};

/// `VenueError` as an HTTP response: status from the error code, body is
/// an `ErrorBody`.
#[derive(Debug)]
pub struct ApiError(pub VenueError);

impl From<VenueError> for ApiError {
    fn from(err: VenueError) -> Self {
        Self(err)
    }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthorized => StatusCode::FORBIDDEN,
        ErrorCode::CapacityExceeded | ErrorCode::FeedBusy => StatusCode::CONFLICT,
        ErrorCode::UnknownPeer | ErrorCode::UnknownRoom => StatusCode::NOT_FOUND,
        ErrorCode::RelayUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCode::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody::from(&self.0);
        (status_for(body.error), Json(body)).into_response()
    }
}
