use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::fetch::FetchError;

/// Everything that can go wrong past route matching.
///
/// Only the validation variants become structured JSON responses; a
/// dependency fault (fetch, decode, encode, malformed dimension) is the
/// invocation failing, rendered as a plain-text 5xx.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Required Query Parameters Missing")]
    MissingQueryParameters,

    #[error("Unsupported Image Format")]
    UnsupportedImageFormat,

    #[error("Invalid Dimension Parameter")]
    InvalidDimension(#[from] std::num::ParseIntError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Error Decoding Image")]
    Decode(#[source] image::ImageError),

    #[error("Error Encoding Image")]
    Encode(#[source] image::ImageError),
}

impl ServiceError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingQueryParameters | Self::UnsupportedImageFormat => {
                StatusCode::BAD_REQUEST
            }
            Self::Fetch(FetchError::TooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidDimension(_)
            | Self::Fetch(_)
            | Self::Decode(_)
            | Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingQueryParameters | Self::UnsupportedImageFormat
        )
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if self.is_validation() {
            return (self.status(), Json(json!({ "message": self.to_string() })))
                .into_response();
        }

        tracing::error!(error = %self, "request failed");
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(
            ServiceError::MissingQueryParameters.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::UnsupportedImageFormat.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn dependency_faults_are_server_errors() {
        assert_eq!(
            ServiceError::Fetch(FetchError::Send).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::Fetch(FetchError::TooLarge).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert!(!ServiceError::Fetch(FetchError::Send).is_validation());
    }
}
