use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::{SubmissionError, FAILURE_MESSAGE};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("RSVP submission failed")]
    Submission(#[from] SubmissionError),

    /// Body could not be buffered, e.g. over the size limit.
    #[error("RSVP request body could not be read")]
    UnreadableBody(#[from] BytesRejection),
}

/// Body shared by every RSVP response.
#[derive(Debug, Serialize)]
pub struct RsvpResponse {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = match &self {
            ApiError::Submission(SubmissionError::MalformedInput(_))
            | ApiError::UnreadableBody(_) => "malformed_input",
            ApiError::Submission(SubmissionError::Sink(_)) => "store_access",
        };
        tracing::error!(
            kind = kind,
            cause = %error_chain(&self),
            "Error processing RSVP"
        );

        let body = RsvpResponse {
            success: false,
            message: FAILURE_MESSAGE.into(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Renders an error and all of its sources as `outer: inner: root`.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
